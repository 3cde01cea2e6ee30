use std::fmt;

/// A symbolic address.
///
/// Named labels come from source identifiers (top-level functions, globals,
/// built-ins) and compare by name. Anonymous labels are handed out by a
/// [`LabelGenerator`] and compare by their sequence number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    Named(String),
    Anonymous(usize),
}

impl Label {
    pub fn named(name: impl Into<String>) -> Self {
        Label::Named(name.into())
    }

    /// Pseudo-register holding the current frame pointer.
    pub fn frame_pointer() -> Self {
        Label::Named("{FP}".to_string())
    }

    /// Pseudo-register holding the current stack pointer.
    pub fn stack_pointer() -> Self {
        Label::Named("{SP}".to_string())
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Label::Named(name) => write!(f, "{}", name),
            Label::Anonymous(id) => write!(f, "L{}", id),
        }
    }
}

/// Source of anonymous labels for one compilation.
///
/// Both the frame evaluator (nested functions) and the IR generator (jump
/// targets, string data) draw from the same generator, so labels stay unique
/// across the whole compilation and come out in the same order on every run.
#[derive(Debug, Default)]
pub struct LabelGenerator {
    next: usize,
}

impl LabelGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_anonymous(&mut self) -> Label {
        let label = Label::Anonymous(self.next);
        self.next += 1;
        label
    }

    /// Number of anonymous labels handed out so far.
    pub fn issued(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_labels_are_distinct() {
        let mut labels = LabelGenerator::new();
        let first = labels.next_anonymous();
        let second = labels.next_anonymous();
        assert_ne!(first, second);
        assert_eq!(labels.issued(), 2);
    }

    #[test]
    fn named_labels_compare_by_value() {
        assert_eq!(Label::named("main"), Label::named("main"));
        assert_ne!(Label::named("main"), Label::named("f"));
    }

    #[test]
    fn generators_are_independent_and_deterministic() {
        let mut a = LabelGenerator::new();
        let mut b = LabelGenerator::new();
        assert_eq!(a.next_anonymous(), b.next_anonymous());
        assert_eq!(a.next_anonymous().to_string(), "L1");
    }
}
