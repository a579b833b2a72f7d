//! Configuration validation.
//!
//! Validates a raw configuration mapping against a declarative schema:
//! each recognized parameter maps to an expected value kind and an ordered
//! list of named constraint predicates. A predicate takes the candidate
//! value plus the dataset-derived validation context and returns whether
//! the constraint holds; a predicate that cannot evaluate (e.g. a dtype
//! lookup miss) reports a violation rather than faulting.

use std::collections::HashMap;

use polars::prelude::{DataFrame, DataType};
use thiserror::Error;

use super::value::{ConfigValue, RawConfig, RewardFn, ValueKind};

/// Recognized parameter names, in reporting order.
pub const RECOGNIZED_KEYS: &[&str] = &["splitOn", "split", "target", "id", "reward"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("parameter `{key}` is not of type {expected}")]
    InvalidType { key: String, expected: ValueKind },

    #[error("value `{value}` for parameter `{key}` violates constraint: {constraint}")]
    ConstraintViolation {
        key: String,
        value: String,
        constraint: &'static str,
    },

    #[error("missing required config parameters: {}", .0.join(", "))]
    MissingKeys(Vec<String>),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Column names and dtypes derived from the dataset.
///
/// Built by the environment from the frame being replayed; never supplied
/// by the caller.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    columns: Vec<String>,
    dtypes: HashMap<String, DataType>,
}

impl ValidationContext {
    /// Derive the context from a dataset's schema.
    pub fn from_frame(data: &DataFrame) -> Self {
        let mut columns = Vec::with_capacity(data.width());
        let mut dtypes = HashMap::with_capacity(data.width());
        for column in data.get_columns() {
            columns.push(column.name().to_string());
            dtypes.insert(column.name().to_string(), column.dtype().clone());
        }
        Self { columns, dtypes }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn dtype(&self, name: &str) -> Option<&DataType> {
        self.dtypes.get(name)
    }
}

/// The validated, immutable configuration snapshot.
///
/// Constructed exactly once per environment; validation consumes the raw
/// mapping, so the reward callback cannot be locked twice.
pub struct LockedConfig {
    split_on: String,
    split: f64,
    target: String,
    id: String,
    pub(crate) reward: RewardFn,
}

impl LockedConfig {
    /// Name of the ordering column.
    pub fn split_on(&self) -> &str {
        &self.split_on
    }

    /// Fraction of unique ordering values reserved as history.
    pub fn split(&self) -> f64 {
        self.split
    }

    /// Name of the prediction target column.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Name of the row-identity column.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Debug for LockedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockedConfig")
            .field("split_on", &self.split_on)
            .field("split", &self.split)
            .field("target", &self.target)
            .field("id", &self.id)
            .field("reward", &"<callback>")
            .finish()
    }
}

type PredicateFn = fn(&ConfigValue, &ValidationContext) -> bool;

/// A named constraint on a candidate parameter value.
struct Predicate {
    name: &'static str,
    check: PredicateFn,
}

/// Schema entry: expected kind plus ordered constraints for one parameter.
struct ParamSpec {
    key: &'static str,
    kind: ValueKind,
    predicates: &'static [Predicate],
}

fn column_exists(value: &ConfigValue, ctx: &ValidationContext) -> bool {
    value.as_str().is_some_and(|name| ctx.has_column(name))
}

fn column_is_numeric(value: &ConfigValue, ctx: &ValidationContext) -> bool {
    let Some(name) = value.as_str() else {
        return false;
    };
    match ctx.dtype(name) {
        Some(dtype) => is_numeric_dtype(dtype),
        None => false,
    }
}

fn split_below_one(value: &ConfigValue, _ctx: &ValidationContext) -> bool {
    value.as_float().is_some_and(|v| v < 1.0)
}

fn split_non_negative(value: &ConfigValue, _ctx: &ValidationContext) -> bool {
    value.as_float().is_some_and(|v| v >= 0.0)
}

fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// The declarative parameter schema.
///
/// `reward` is absent here: a callback cannot be constrained beyond being
/// invocable, which its value kind already establishes.
const SCHEMA: &[ParamSpec] = &[
    ParamSpec {
        key: "splitOn",
        kind: ValueKind::Str,
        predicates: &[
            Predicate {
                name: "must name an existing column",
                check: column_exists,
            },
            Predicate {
                name: "column dtype must be numeric",
                check: column_is_numeric,
            },
        ],
    },
    ParamSpec {
        key: "split",
        kind: ValueKind::Float,
        predicates: &[
            Predicate {
                name: "must be non-negative",
                check: split_non_negative,
            },
            Predicate {
                name: "must be strictly less than 1",
                check: split_below_one,
            },
        ],
    },
    ParamSpec {
        key: "target",
        kind: ValueKind::Str,
        predicates: &[Predicate {
            name: "must name an existing column",
            check: column_exists,
        }],
    },
    ParamSpec {
        key: "id",
        kind: ValueKind::Str,
        predicates: &[Predicate {
            name: "must name an existing column",
            check: column_exists,
        }],
    },
];

/// Validate a raw configuration against the schema, producing the locked
/// snapshot.
///
/// Every recognized key must be supplied; missing keys are reported all at
/// once. Unrecognized keys are ignored.
pub fn validate(raw: RawConfig, ctx: &ValidationContext) -> ConfigResult<LockedConfig> {
    let mut split_on = None;
    let mut split = None;
    let mut target = None;
    let mut id = None;
    let mut reward = None;

    for (key, value) in raw.into_entries() {
        if key == "reward" {
            // Exempt from the schema, but must be invocable.
            match value {
                ConfigValue::Callback(f) => reward = Some(f),
                _ => {
                    return Err(ConfigError::InvalidType {
                        key,
                        expected: ValueKind::Callback,
                    })
                }
            }
            continue;
        }

        let Some(spec) = SCHEMA.iter().find(|s| s.key == key) else {
            continue;
        };

        if value.kind() != spec.kind {
            return Err(ConfigError::InvalidType {
                key,
                expected: spec.kind,
            });
        }

        for predicate in spec.predicates {
            if !(predicate.check)(&value, ctx) {
                return Err(ConfigError::ConstraintViolation {
                    key,
                    value: value.to_string(),
                    constraint: predicate.name,
                });
            }
        }

        match key.as_str() {
            "splitOn" => split_on = value.as_str().map(str::to_string),
            "split" => split = value.as_float(),
            "target" => target = value.as_str().map(str::to_string),
            "id" => id = value.as_str().map(str::to_string),
            _ => {}
        }
    }

    let mut missing = Vec::new();
    for &key in RECOGNIZED_KEYS {
        let supplied = match key {
            "splitOn" => split_on.is_some(),
            "split" => split.is_some(),
            "target" => target.is_some(),
            "id" => id.is_some(),
            "reward" => reward.is_some(),
            _ => true,
        };
        if !supplied {
            missing.push(key.to_string());
        }
    }
    if !missing.is_empty() {
        return Err(ConfigError::MissingKeys(missing));
    }

    // All five are present past this point.
    match (split_on, split, target, id, reward) {
        (Some(split_on), Some(split), Some(target), Some(id), Some(reward)) => Ok(LockedConfig {
            split_on,
            split,
            target,
            id,
            reward,
        }),
        _ => Err(ConfigError::MissingKeys(
            RECOGNIZED_KEYS.iter().map(|k| k.to_string()).collect(),
        )),
    }
}
