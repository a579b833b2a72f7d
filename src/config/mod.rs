//! Configuration handling.
//!
//! Callers assemble a loosely typed [`RawConfig`] mapping; validation
//! checks it against a declarative schema of expected kinds and named
//! constraints, then locks it into an immutable [`LockedConfig`] owned by
//! the environment.

pub mod validator;
pub mod value;

pub use validator::{
    validate, ConfigError, ConfigResult, LockedConfig, ValidationContext, RECOGNIZED_KEYS,
};
pub use value::{ConfigValue, RawConfig, RewardArgs, RewardFn, ValueKind};
