//! Stepping cursor over the future partition.
//!
//! The cursor owns the future partition and a step index into the sorted
//! unique values of the ordering column. Each advance materializes the row
//! group for the next value into an [`Observation`]; the terminal state is
//! reached once every group has been replayed.

use polars::prelude::*;
use thiserror::Error;

use crate::config::LockedConfig;

use super::observation::Observation;

#[derive(Error, Debug)]
pub enum CursorError {
    #[error("no rows in future partition for step value {value}")]
    EmptyStep { value: f64 },

    #[error("step index {index} out of range for {len} steps")]
    InvalidStepIndex { index: usize, len: usize },

    #[error("cursor exhausted after {steps} steps")]
    Exhausted { steps: usize },

    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub type CursorResult<T> = Result<T, CursorError>;

/// State machine replaying the future partition one ordering value at a
/// time.
#[derive(Debug)]
pub struct ObservationCursor {
    future: DataFrame,
    split_on: String,
    id: String,
    target: String,
    /// Sorted unique ordering values, fixed for the cursor's lifetime.
    steps: Vec<f64>,
    /// Index into `steps`; equal to `steps.len()` once terminal.
    step_count: usize,
    current: Option<Observation>,
}

impl ObservationCursor {
    /// Build a cursor over the future partition and materialize step 0.
    pub fn new(future: DataFrame, config: &LockedConfig) -> CursorResult<Self> {
        let steps_df = future
            .clone()
            .lazy()
            .select([col(config.split_on())
                .cast(DataType::Float64)
                .unique()
                .sort(SortOptions::default())
                .alias("step")])
            .collect()?;
        let steps: Vec<f64> = steps_df.column("step")?.f64()?.into_iter().flatten().collect();

        let mut cursor = Self {
            future,
            split_on: config.split_on().to_string(),
            id: config.id().to_string(),
            target: config.target().to_string(),
            steps,
            step_count: 0,
            current: None,
        };
        cursor.reset(0)?;
        Ok(cursor)
    }

    /// The fixed step sequence.
    pub fn steps(&self) -> &[f64] {
        &self.steps
    }

    /// Current position in the step sequence.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// The observation for the current step, absent once terminal.
    pub fn current(&self) -> Option<&Observation> {
        self.current.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.step_count == self.steps.len()
    }

    /// Move to the next step, materializing its observation.
    ///
    /// Advancing a terminal cursor is an explicit error rather than a
    /// silent no-op, so callers cannot keep stepping past the end.
    pub fn advance(&mut self) -> CursorResult<()> {
        if self.is_done() {
            return Err(CursorError::Exhausted {
                steps: self.steps.len(),
            });
        }
        self.step_count += 1;
        if self.step_count < self.steps.len() {
            self.materialize(self.steps[self.step_count])?;
        } else {
            self.current = None;
        }
        Ok(())
    }

    /// Rewind (or fast-forward) to a specific step index.
    ///
    /// `num == steps.len()` sets the terminal state directly.
    pub fn reset(&mut self, num: usize) -> CursorResult<()> {
        if num > self.steps.len() {
            return Err(CursorError::InvalidStepIndex {
                index: num,
                len: self.steps.len(),
            });
        }
        self.step_count = num;
        if num < self.steps.len() {
            self.materialize(self.steps[num])?;
        } else {
            self.current = None;
        }
        Ok(())
    }

    /// Materialize the observation for one ordering value.
    fn materialize(&mut self, value: f64) -> CursorResult<()> {
        let segment = self
            .future
            .clone()
            .lazy()
            .filter(
                col(&self.split_on)
                    .cast(DataType::Float64)
                    .eq(lit(value)),
            )
            .collect()?;

        // Steps are derived from the future partition itself, so an empty
        // group means the partition was mutated out from under the cursor.
        if segment.height() == 0 {
            return Err(CursorError::EmptyStep { value });
        }

        let features = segment.drop(&self.target)?;

        let target = segment
            .clone()
            .lazy()
            .select([col(&self.id).unique().sort(SortOptions::default())])
            .with_column(lit(0.0).alias(&self.target))
            .collect()?;

        let actuals = segment
            .lazy()
            .select([col(&self.id), col(&self.target)])
            .sort([self.id.as_str()], Default::default())
            .collect()?;

        self.current = Some(Observation {
            features,
            target,
            actuals,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use polars::df;

    use crate::config::{validate, LockedConfig, RawConfig, ValidationContext};

    use super::*;

    fn future_frame() -> DataFrame {
        // Days 7..=9, two ids per day.
        df!(
            "day" => [7i64, 7, 8, 8, 9, 9],
            "id" => [2i64, 1, 2, 1, 2, 1],
            "y" => [7.2f64, 7.1, 8.2, 8.1, 9.2, 9.1],
        )
        .unwrap()
    }

    fn config(data: &DataFrame) -> LockedConfig {
        let raw = RawConfig::new()
            .set("splitOn", "day")
            .set("split", 0.5)
            .set("target", "y")
            .set("id", "id")
            .set_reward(|_| Ok(0.0));
        validate(raw, &ValidationContext::from_frame(data)).unwrap()
    }

    fn cursor() -> ObservationCursor {
        let future = future_frame();
        let cfg = config(&future);
        ObservationCursor::new(future, &cfg).unwrap()
    }

    #[test]
    fn test_steps_are_sorted_unique_values() {
        let cursor = cursor();
        assert_eq!(cursor.steps(), &[7.0, 8.0, 9.0]);
        assert_eq!(cursor.step_count(), 0);
        assert!(!cursor.is_done());
    }

    #[test]
    fn test_initial_observation_shape() {
        let cursor = cursor();
        let obs = cursor.current().unwrap();
        assert_eq!(obs.features.height(), 2);
        assert!(obs.features.column("y").is_err());
        assert!(obs.features.column("day").is_ok());
    }

    #[test]
    fn test_target_placeholder_is_zeroed_and_sorted() {
        let cursor = cursor();
        let obs = cursor.current().unwrap();
        let ids: Vec<i64> = obs
            .target
            .column("id")
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(ids, vec![1, 2]);
        let zeros: Vec<f64> = obs
            .target
            .column("y")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(zeros, vec![0.0, 0.0]);
    }

    #[test]
    fn test_actuals_sorted_by_id() {
        let cursor = cursor();
        let obs = cursor.current().unwrap();
        let ys: Vec<f64> = obs
            .actuals
            .column("y")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(ys, vec![7.1, 7.2]);
    }

    #[test]
    fn test_advance_to_terminal() {
        let mut cursor = cursor();
        for _ in 0..3 {
            assert!(!cursor.is_done());
            cursor.advance().unwrap();
        }
        assert!(cursor.is_done());
        assert!(cursor.current().is_none());
        match cursor.advance() {
            Err(CursorError::Exhausted { steps }) => assert_eq!(steps, 3),
            other => panic!("expected Exhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_reset_bounds() {
        let mut cursor = cursor();
        cursor.advance().unwrap();
        cursor.reset(0).unwrap();
        assert_eq!(cursor.step_count(), 0);
        assert!(cursor.current().is_some());

        // Resetting to len is the terminal state.
        cursor.reset(3).unwrap();
        assert!(cursor.is_done());
        assert!(cursor.current().is_none());

        match cursor.reset(4) {
            Err(CursorError::InvalidStepIndex { index, len }) => {
                assert_eq!(index, 4);
                assert_eq!(len, 3);
            }
            other => panic!("expected InvalidStepIndex, got {:?}", other),
        }
    }

    #[test]
    fn test_replay_is_deterministic() {
        let mut cursor = cursor();
        let mut first_pass = Vec::new();
        while !cursor.is_done() {
            first_pass.push(cursor.current().unwrap().actuals.clone());
            cursor.advance().unwrap();
        }
        cursor.reset(0).unwrap();
        let mut second_pass = Vec::new();
        while !cursor.is_done() {
            second_pass.push(cursor.current().unwrap().actuals.clone());
            cursor.advance().unwrap();
        }
        assert_eq!(first_pass.len(), second_pass.len());
        for (a, b) in first_pass.iter().zip(&second_pass) {
            assert!(a.equals(b));
        }
    }
}
