//! Machine configuration shared by the frame layout, the IR generator and the
//! interpreter.
//!
//! The word size is a compile-time constant: every stage must agree on it or
//! addressing breaks, so it is deliberately not part of [`MachineConfig`].

use std::fmt;

/// Size of a machine word in bytes.
///
/// Atomic values (`int`, `log`, string pointers), static links, saved frame
/// pointers and every outgoing argument occupy exactly one word.
pub const WORD_SIZE: i64 = 4;

/// Default size of the simulated memory in bytes.
pub const DEFAULT_MEMORY_SIZE: i64 = 64 * 1024;

/// Largest accepted memory size in bytes.
pub const MAX_MEMORY_SIZE: i64 = 16 * 1024 * 1024;

/// Runtime configuration of the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineConfig {
    /// Total size of the simulated memory in bytes. The stack is anchored at
    /// the top of memory and grows downward.
    pub memory_size: i64,
    /// Initial seed of the random source. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
            seed: None,
        }
    }
}

impl MachineConfig {
    pub fn with_memory_size(mut self, memory_size: i64) -> Self {
        self.memory_size = memory_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check that the memory can be split into whole words and stays within
    /// [`MAX_MEMORY_SIZE`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_size <= 0 || self.memory_size % WORD_SIZE != 0 {
            return Err(ConfigError::InvalidMemorySize {
                memory_size: self.memory_size,
            });
        }
        if self.memory_size > MAX_MEMORY_SIZE {
            return Err(ConfigError::MemoryTooLarge {
                memory_size: self.memory_size,
                limit: MAX_MEMORY_SIZE,
            });
        }
        Ok(())
    }
}

/// Rejected machine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidMemorySize { memory_size: i64 },
    MemoryTooLarge { memory_size: i64, limit: i64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::InvalidMemorySize { memory_size } => write!(
                f,
                "Configuration error: memory size {} is not a positive multiple of the word size ({})",
                memory_size, WORD_SIZE
            ),
            ConfigError::MemoryTooLarge { memory_size, limit } => write!(
                f,
                "Configuration error: memory size {} exceeds the limit of {} bytes",
                memory_size, limit
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
