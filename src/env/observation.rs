//! Per-step observation bundle.

use polars::prelude::DataFrame;

/// Snapshot of one replay step.
///
/// `features` carries every non-target column for the rows at the current
/// ordering value. `target` is a scaffold keyed by unique id with a
/// zero-initialized target column, sorted by id, for the caller to fill in
/// with predictions. `actuals` holds the ground-truth `[id, target]` rows,
/// sorted by id, and is consumed by the reward callback.
#[derive(Debug, Clone)]
pub struct Observation {
    pub features: DataFrame,
    pub target: DataFrame,
    pub actuals: DataFrame,
}
