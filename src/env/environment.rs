//! Environment façade.
//!
//! Drives the replay loop:
//! 1. Validate and lock the raw configuration
//! 2. Partition the dataset into history and future
//! 3. Step the cursor, scoring each prediction against the actuals
//!
//! One environment instance owns one locked configuration and one pair of
//! partitions for its whole lifetime; replaying from the start only needs
//! `reset()`.

use std::collections::HashMap;
use std::error::Error;

use polars::prelude::DataFrame;
use thiserror::Error as ThisError;
use tracing::info;

use crate::config::{
    validate, ConfigError, LockedConfig, RawConfig, RewardArgs, ValidationContext,
};
use crate::partition::{split, PartitionError, PartitionSummary};

use super::cursor::{CursorError, ObservationCursor};
use super::observation::Observation;

#[derive(ThisError, Debug)]
pub enum EnvError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("partition failed: {0}")]
    Partition(#[from] PartitionError),

    #[error("cursor failed: {0}")]
    Cursor(#[from] CursorError),

    #[error("environment exhausted; call reset() to replay")]
    Exhausted,

    #[error("reward callback failed: {0}")]
    Reward(#[source] Box<dyn Error + Send + Sync>),
}

pub type EnvResult<T> = Result<T, EnvError>;

/// Outcome of one environment step.
#[derive(Debug)]
pub struct Step {
    /// The next observation, absent once the replay is exhausted.
    pub observation: Option<Observation>,
    /// Scalar produced by the reward callback for this step.
    pub reward: f64,
    /// Whether the step sequence is exhausted.
    pub done: bool,
    /// Auxiliary info, reserved for extension; always empty.
    pub info: HashMap<String, String>,
}

/// Replay environment over a time-ordered dataset.
pub struct Environment {
    config: LockedConfig,
    history: DataFrame,
    summary: PartitionSummary,
    cursor: ObservationCursor,
}

impl Environment {
    /// Validate the configuration, partition the dataset, and stand up the
    /// cursor at step 0.
    pub fn new(data: DataFrame, raw: RawConfig) -> EnvResult<Self> {
        let ctx = ValidationContext::from_frame(&data);
        let config = validate(raw, &ctx)?;
        let partitions = split(&data, &config)?;
        let cursor = ObservationCursor::new(partitions.future, &config)?;

        info!(
            split_on = config.split_on(),
            steps = cursor.steps().len(),
            "environment ready"
        );

        Ok(Self {
            config,
            history: partitions.history,
            summary: partitions.summary,
            cursor,
        })
    }

    /// The history partition, read-only context for the reward callback.
    pub fn history(&self) -> &DataFrame {
        &self.history
    }

    /// Shape of the one-time temporal split.
    pub fn partition_summary(&self) -> &PartitionSummary {
        &self.summary
    }

    /// The locked configuration parameters.
    pub fn config(&self) -> &LockedConfig {
        &self.config
    }

    pub fn is_done(&self) -> bool {
        self.cursor.is_done()
    }

    /// Rewind to step 0 and return the first observation.
    ///
    /// The partitions and step sequence are fixed, so repeated resets
    /// replay an identical observation sequence.
    pub fn reset(&mut self) -> EnvResult<&Observation> {
        self.cursor.reset(0)?;
        self.cursor.current().ok_or(EnvError::Exhausted)
    }

    /// Score the caller's predictions against the current step's actuals,
    /// then advance.
    ///
    /// The reward callback sees the history partition, the predictions,
    /// and the actuals; any error it returns surfaces unmodified. Stepping
    /// an exhausted environment fails until `reset()` is called.
    pub fn step(&mut self, predictions: &DataFrame) -> EnvResult<Step> {
        if self.cursor.is_done() {
            return Err(EnvError::Exhausted);
        }
        let current = self.cursor.current().ok_or(EnvError::Exhausted)?;

        let reward = (self.config.reward)(RewardArgs {
            train: &self.history,
            prediction: predictions,
            actual: &current.actuals,
        })
        .map_err(EnvError::Reward)?;

        self.cursor.advance()?;

        Ok(Step {
            observation: self.cursor.current().cloned(),
            reward,
            done: self.cursor.is_done(),
            info: HashMap::new(),
        })
    }
}
