//! # Compile Error Definitions
//!
//! The back end only ever fails on *internal invariant violations*: the
//! front end has already validated the program, so anything the frame
//! evaluator, the IR generator or the linearizer cannot consume is a defect
//! in the pipeline rather than a user error.
//!
//! Every error carries the source span of the offending node and is
//! reported immediately. No stage substitutes a default and continues.

use std::fmt;

use lachs::Span;

/// Internal invariant violated while compiling a resolved program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A function definition has no frame.
    MissingFrame { function: String, span: Span },
    /// A variable or parameter definition has no access.
    MissingAccess { name: String, span: Span },
    /// A node the back end needs a type for has none.
    MissingType { what: String, span: Span },
    /// A name or call node is not associated with a definition.
    MissingDefinition { name: String, span: Span },
    /// A definition association points at a node of the wrong kind.
    UnexpectedDefinition { name: String, span: Span },
    /// A sub-result required to be an expression lowered to a statement.
    ExpectedExpression { what: String, span: Span },
    /// A block has no trailing expression to provide its value.
    EmptyBlock { span: Span },
    /// A `for` loop whose counter is not a plain variable reference.
    InvalidCounter { span: Span },
    /// A call outside of any function body.
    CallOutsideFunction { name: String, span: Span },
    /// IR shape that cannot be brought into linear form.
    Unlinearizable { what: String },
}

impl CompileError {
    pub fn missing_frame(function: impl Into<String>, span: &Span) -> Self {
        CompileError::MissingFrame {
            function: function.into(),
            span: span.clone(),
        }
    }

    pub fn missing_access(name: impl Into<String>, span: &Span) -> Self {
        CompileError::MissingAccess {
            name: name.into(),
            span: span.clone(),
        }
    }

    pub fn missing_type(what: impl Into<String>, span: &Span) -> Self {
        CompileError::MissingType {
            what: what.into(),
            span: span.clone(),
        }
    }

    pub fn missing_definition(name: impl Into<String>, span: &Span) -> Self {
        CompileError::MissingDefinition {
            name: name.into(),
            span: span.clone(),
        }
    }

    pub fn unexpected_definition(name: impl Into<String>, span: &Span) -> Self {
        CompileError::UnexpectedDefinition {
            name: name.into(),
            span: span.clone(),
        }
    }

    pub fn expected_expression(what: impl Into<String>, span: &Span) -> Self {
        CompileError::ExpectedExpression {
            what: what.into(),
            span: span.clone(),
        }
    }

    fn message(&self) -> String {
        match self {
            CompileError::MissingFrame { function, .. } => {
                format!("no frame for function '{}'", function)
            }
            CompileError::MissingAccess { name, .. } => {
                format!("no access for definition '{}'", name)
            }
            CompileError::MissingType { what, .. } => format!("no type for {}", what),
            CompileError::MissingDefinition { name, .. } => {
                format!("'{}' is not bound to a definition", name)
            }
            CompileError::UnexpectedDefinition { name, .. } => {
                format!("'{}' is bound to a definition of the wrong kind", name)
            }
            CompileError::ExpectedExpression { what, .. } => {
                format!("{} must lower to an expression", what)
            }
            CompileError::EmptyBlock { .. } => {
                "block has no trailing expression".to_string()
            }
            CompileError::InvalidCounter { .. } => {
                "for loop counter must be a variable".to_string()
            }
            CompileError::CallOutsideFunction { name, .. } => {
                format!("call to '{}' outside of a function body", name)
            }
            CompileError::Unlinearizable { what } => {
                format!("cannot linearize {}", what)
            }
        }
    }

    fn span(&self) -> Option<&Span> {
        match self {
            CompileError::MissingFrame { span, .. }
            | CompileError::MissingAccess { span, .. }
            | CompileError::MissingType { span, .. }
            | CompileError::MissingDefinition { span, .. }
            | CompileError::UnexpectedDefinition { span, .. }
            | CompileError::ExpectedExpression { span, .. }
            | CompileError::EmptyBlock { span }
            | CompileError::InvalidCounter { span }
            | CompileError::CallOutsideFunction { span, .. } => Some(span),
            CompileError::Unlinearizable { .. } => None,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = format!("compiler error. {}", self.message());
        match self.span() {
            Some(span) if !span.source.is_empty() => write!(f, "{}", span.to_string(&msg)),
            _ => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for CompileError {}
