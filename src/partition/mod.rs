//! Temporal dataset partitioning.

pub mod splitter;

pub use splitter::{split, PartitionError, PartitionResult, PartitionSummary, Partitions};
