use std::collections::HashMap;

use crate::config::WORD_SIZE;
use crate::frame::Label;

use super::error::RuntimeError;
use super::value::Value;

/// Word-addressed simulated memory.
///
/// Addresses are byte addresses and must be word aligned. The static area
/// (code entries, string data, globals) grows upward from `WORD_SIZE`; the
/// stack is anchored at the top and grows downward. Address 0 is never
/// handed out.
#[derive(Debug)]
pub struct Memory {
    words: Vec<Value>,
    labels: HashMap<Label, i64>,
    static_top: i64,
}

impl Memory {
    /// `size` must be a positive multiple of the word size.
    pub fn new(size: i64) -> Self {
        let words = usize::try_from(size / WORD_SIZE).unwrap_or(0);
        Self {
            words: vec![Value::default(); words],
            labels: HashMap::new(),
            static_top: WORD_SIZE,
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> i64 {
        self.words.len() as i64 * WORD_SIZE
    }

    /// First address above the static area.
    pub fn static_top(&self) -> i64 {
        self.static_top
    }

    fn index(&self, address: i64) -> Result<usize, RuntimeError> {
        if address < 0 || address % WORD_SIZE != 0 || address >= self.size() {
            return Err(RuntimeError::InvalidAddress { address });
        }
        Ok((address / WORD_SIZE) as usize)
    }

    pub fn load(&self, address: i64) -> Result<&Value, RuntimeError> {
        let index = self.index(address)?;
        Ok(&self.words[index])
    }

    pub fn load_int(&self, address: i64) -> Result<i64, RuntimeError> {
        let value = self.load(address)?;
        value.as_int().ok_or_else(|| RuntimeError::NotAnInteger {
            address,
            found: value.to_string(),
        })
    }

    pub fn store(&mut self, address: i64, value: Value) -> Result<(), RuntimeError> {
        let index = self.index(address)?;
        self.words[index] = value;
        Ok(())
    }

    pub fn register_label(&mut self, label: Label, address: i64) {
        self.labels.insert(label, address);
    }

    pub fn address(&self, label: &Label) -> Option<i64> {
        self.labels.get(label).copied()
    }

    fn label_address(&self, label: &Label) -> Result<i64, RuntimeError> {
        self.address(label)
            .ok_or_else(|| RuntimeError::UnknownLabel {
                label: label.clone(),
            })
    }

    pub fn load_label(&self, label: &Label) -> Result<&Value, RuntimeError> {
        self.load(self.label_address(label)?)
    }

    /// Reserve `size` bytes (rounded up to whole words) in the static area.
    pub fn allocate_static(&mut self, size: i64) -> Result<i64, RuntimeError> {
        let words = (size.max(WORD_SIZE) + WORD_SIZE - 1) / WORD_SIZE;
        let address = self.static_top;
        let top = address + words * WORD_SIZE;
        if top > self.size() {
            return Err(RuntimeError::OutOfMemory { requested: size });
        }
        self.static_top = top;
        Ok(address)
    }
}
