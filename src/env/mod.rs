//! Replay environment.
//!
//! The caller-facing stepping surface:
//! - [`ObservationCursor`]: state machine over the future partition
//! - [`Environment`]: façade composing validation, partitioning, and the
//!   cursor into a `reset()` / `step()` loop

pub mod cursor;
pub mod environment;
pub mod observation;

pub use cursor::{CursorError, CursorResult, ObservationCursor};
pub use environment::{EnvError, EnvResult, Environment, Step};
pub use observation::Observation;
