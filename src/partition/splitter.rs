//! One-time temporal partitioning.
//!
//! Splits the dataset into a history partition (past) and a future
//! partition (replayed step by step). The boundary is the floor of
//! `unique_count * split`, compared against the raw ordering-column value:
//! the ordering column is required to be a dense, order-correlated,
//! zero-based integer-like index spanning roughly `[0, unique_count)`,
//! such as a day offset or sequence id. This is a documented precondition,
//! not a general quantile split.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::LockedConfig;

#[derive(Error, Debug)]
pub enum PartitionError {
    #[error(
        "empty {partition} partition: boundary {boundary} over {unique_count} unique `{split_on}` values"
    )]
    Empty {
        partition: &'static str,
        boundary: i64,
        unique_count: usize,
        split_on: String,
    },

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub type PartitionResult<T> = Result<T, PartitionError>;

/// Shape of a completed split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartitionSummary {
    /// Distinct values in the ordering column.
    pub unique_count: usize,
    /// Raw-value threshold separating history from future.
    pub boundary: i64,
    /// Rows below the boundary.
    pub history_rows: usize,
    /// Rows at or above the boundary.
    pub future_rows: usize,
}

/// The two disjoint row subsets produced by [`split`].
#[derive(Debug, Clone)]
pub struct Partitions {
    pub history: DataFrame,
    pub future: DataFrame,
    pub summary: PartitionSummary,
}

/// Split the dataset into history and future partitions.
///
/// `history` holds rows where the ordering column is below the boundary,
/// `future` the rest. Either partition coming out empty is an error: a
/// degenerate split would otherwise produce a cursor with no history
/// context or nothing to replay.
pub fn split(data: &DataFrame, config: &LockedConfig) -> PartitionResult<Partitions> {
    let split_on = config.split_on();
    let unique_count = data.column(split_on)?.n_unique()?;
    let boundary = (unique_count as f64 * config.split()).floor() as i64;

    let history = data
        .clone()
        .lazy()
        .filter(col(split_on).lt(lit(boundary)))
        .collect()?;
    let future = data
        .clone()
        .lazy()
        .filter(col(split_on).gt_eq(lit(boundary)))
        .collect()?;

    for (partition, frame) in [("history", &history), ("future", &future)] {
        if frame.height() == 0 {
            return Err(PartitionError::Empty {
                partition,
                boundary,
                unique_count,
                split_on: split_on.to_string(),
            });
        }
    }

    let summary = PartitionSummary {
        unique_count,
        boundary,
        history_rows: history.height(),
        future_rows: future.height(),
    };
    info!(
        split_on,
        boundary,
        unique_count,
        history_rows = summary.history_rows,
        future_rows = summary.future_rows,
        "partitioned dataset"
    );

    Ok(Partitions {
        history,
        future,
        summary,
    })
}
