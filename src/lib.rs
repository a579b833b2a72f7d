//! Local replay harness for sequential-prediction agents.
//!
//! Replays a static, time-ordered dataset as discrete steps, mimicking a
//! competition-style submission API: the dataset is partitioned once into
//! a history segment and a future segment, and the future is then served
//! one ordering-column value at a time. A caller drives the loop with
//! `reset()` followed by `step(predictions)` until `done`:
//!
//! ```no_run
//! use polars::prelude::*;
//! use replay_gym::{Environment, RawConfig};
//!
//! # fn run(data: DataFrame) -> Result<(), Box<dyn std::error::Error>> {
//! let raw = RawConfig::new()
//!     .set("splitOn", "day")
//!     .set("split", 0.7)
//!     .set("target", "y")
//!     .set("id", "id")
//!     .set_reward(|args| {
//!         let pred = args.prediction.column("y")?.f64()?.mean().unwrap_or(0.0);
//!         let actual = args.actual.column("y")?.f64()?.mean().unwrap_or(0.0);
//!         Ok(-(pred - actual).abs())
//!     });
//!
//! let mut env = Environment::new(data, raw)?;
//! let mut observation = env.reset()?.clone();
//! loop {
//!     let predictions = observation.target.clone(); // fill in real predictions here
//!     let step = env.step(&predictions)?;
//!     if step.done {
//!         break;
//!     }
//!     observation = step.observation.expect("not done");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod env;
pub mod partition;

// Re-export commonly used types
pub use config::{
    validate, ConfigError, ConfigValue, LockedConfig, RawConfig, RewardArgs, RewardFn,
    ValidationContext, ValueKind,
};
pub use env::{CursorError, EnvError, Environment, Observation, ObservationCursor, Step};
pub use partition::{split, PartitionError, PartitionSummary, Partitions};
