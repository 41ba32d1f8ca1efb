//! # Arguments bound to a task at construction.
//!
//! [`TaskArgs`] holds positional and named values. They are bound once, in the
//! [`TaskSpec`](crate::TaskSpec), and handed to the body read-only through
//! [`TaskContext::args`](crate::TaskContext::args).

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::TaskError;

/// Positional and named arguments for one task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskArgs {
    positional: Vec<Value>,
    named: BTreeMap<String, Value>,
}

impl TaskArgs {
    /// No arguments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a named argument, replacing an earlier one with the same name.
    #[must_use]
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    pub fn named(&self) -> &BTreeMap<String, Value> {
        &self.named
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Positional string argument, or `InvalidArgs` when missing or not a string.
    pub fn require_str(&self, index: usize) -> Result<&str, TaskError> {
        match self.positional.get(index) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(TaskError::invalid_args(format!(
                "argument {index} must be a string, got {other}"
            ))),
            None => Err(TaskError::invalid_args(format!(
                "missing positional argument {index}"
            ))),
        }
    }

    /// Named string argument with a fallback when it was not supplied.
    pub fn named_str_or<'a>(&'a self, name: &str, default: &'a str) -> Result<&'a str, TaskError> {
        match self.named.get(name) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(TaskError::invalid_args(format!(
                "argument `{name}` must be a string, got {other}"
            ))),
            None => Ok(default),
        }
    }
}
