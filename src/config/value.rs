//! Raw configuration values.
//!
//! A raw configuration is an ordered mapping from parameter name to a
//! dynamically typed value, mirroring the loosely typed config dict a
//! caller assembles before the environment locks it in.

use std::error::Error;
use std::fmt;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Arguments handed to the reward callback on every step.
pub struct RewardArgs<'a> {
    /// The full history partition, read-only context for scoring.
    pub train: &'a DataFrame,
    /// The caller's predictions for the current step.
    pub prediction: &'a DataFrame,
    /// Ground-truth `[id, target]` rows for the current step.
    pub actual: &'a DataFrame,
}

/// Caller-supplied objective function, invoked once per step.
///
/// Errors returned by the callback are surfaced to the caller unmodified;
/// the harness never recovers from them.
pub type RewardFn =
    Box<dyn Fn(RewardArgs<'_>) -> Result<f64, Box<dyn Error + Send + Sync>> + Send + Sync>;

/// The type a configuration parameter is expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    /// A column name.
    Str,
    /// A fractional value.
    Float,
    /// An invocable reward callback.
    Callback,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Str => write!(f, "string"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Callback => write!(f, "callback"),
        }
    }
}

/// A dynamically typed configuration value.
pub enum ConfigValue {
    Str(String),
    Float(f64),
    Callback(RewardFn),
}

impl ConfigValue {
    /// Wrap a reward callback as a configuration value.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(RewardArgs<'_>) -> Result<f64, Box<dyn Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    {
        ConfigValue::Callback(Box::new(f))
    }

    /// The kind this value carries.
    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigValue::Str(_) => ValueKind::Str,
            ConfigValue::Float(_) => ValueKind::Float,
            ConfigValue::Callback(_) => ValueKind::Callback,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Str(s) => write!(f, "Str({:?})", s),
            ConfigValue::Float(v) => write!(f, "Float({})", v),
            ConfigValue::Callback(_) => write!(f, "Callback(..)"),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Str(s) => write!(f, "{}", s),
            ConfigValue::Float(v) => write!(f, "{}", v),
            ConfigValue::Callback(_) => write!(f, "<callback>"),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Str(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::Str(s)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

/// An ordered raw configuration mapping, consumed by validation.
#[derive(Debug, Default)]
pub struct RawConfig {
    entries: Vec<(String, ConfigValue)>,
}

impl RawConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any earlier value for the same key.
    pub fn set(mut self, key: &str, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value.into());
        self
    }

    /// Set the reward callback parameter.
    pub fn set_reward<F>(self, f: F) -> Self
    where
        F: Fn(RewardArgs<'_>) -> Result<f64, Box<dyn Error + Send + Sync>>
            + Send
            + Sync
            + 'static,
    {
        self.set("reward", ConfigValue::callback(f))
    }

    pub fn insert(&mut self, key: &str, value: ConfigValue) {
        self.entries.retain(|(k, _)| k != key);
        self.entries.push((key.to_string(), value));
    }

    pub(crate) fn into_entries(self) -> Vec<(String, ConfigValue)> {
        self.entries
    }
}

impl From<RewardFn> for ConfigValue {
    fn from(f: RewardFn) -> Self {
        ConfigValue::Callback(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_kinds() {
        assert_eq!(ConfigValue::from("day").kind(), ValueKind::Str);
        assert_eq!(ConfigValue::from(0.5).kind(), ValueKind::Float);
        assert_eq!(
            ConfigValue::callback(|_| Ok(0.0)).kind(),
            ValueKind::Callback
        );
    }

    #[test]
    fn test_set_replaces_earlier_value() {
        let raw = RawConfig::new().set("split", 0.5).set("split", 0.7);
        let entries = raw.into_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1.as_float(), Some(0.7));
    }

    #[test]
    fn test_display() {
        assert_eq!(ConfigValue::from(0.5).to_string(), "0.5");
        assert_eq!(ConfigValue::from("day").to_string(), "day");
        assert_eq!(ConfigValue::callback(|_| Ok(0.0)).to_string(), "<callback>");
    }
}
