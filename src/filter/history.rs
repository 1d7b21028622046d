//! Sliding-window sensor history with an online moving average
//!
//! The moving average is updated incrementally on every sample. Rounding
//! error from the incremental path is bounded by recomputing the exact
//! window mean once the correction counter passes
//! [`DRIFT_CORRECTION_INTERVAL`].

use super::motion::{MotionDetector, MotionIndex};
use super::reference::ReferenceArea;
use crate::common::types::Sample;
use crate::common::{check_arity, distance_unchecked, euclidean_distance, mean};
use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::fmt;

/// Incremental updates allowed before the average is recomputed exactly
pub const DRIFT_CORRECTION_INTERVAL: u32 = 10_000;

/// Keeps the last `history_size` samples and their running mean
#[derive(Debug, Clone)]
pub struct SensorHistory {
    history: VecDeque<Sample>,
    history_size: usize,
    number_of_parameter: usize,
    moving_average: Sample,
    previous_moving_average: Sample,
    correction_cnt: u32,
    samples_seen: u64,
    motion: MotionDetector,
    reference: Option<ReferenceArea>,
}

impl SensorHistory {
    /// Create a history of `history_size` zero samples
    pub fn new(history_size: usize, number_of_parameter: usize) -> Result<Self> {
        if history_size == 0 {
            return Err(Error::InvalidConfiguration(
                "history_size must be positive".to_string(),
            ));
        }
        if number_of_parameter == 0 {
            return Err(Error::InvalidConfiguration(
                "number_of_parameter must be positive".to_string(),
            ));
        }

        // Every slot owns its own storage
        let history = (0..history_size)
            .map(|_| Sample::zeros(number_of_parameter))
            .collect();

        Ok(SensorHistory {
            history,
            history_size,
            number_of_parameter,
            moving_average: Sample::zeros(number_of_parameter),
            previous_moving_average: Sample::zeros(number_of_parameter),
            correction_cnt: 0,
            samples_seen: 0,
            motion: MotionDetector::new(),
            reference: None,
        })
    }

    /// Push a new sample, evict the oldest and update the moving average
    ///
    /// On `DimensionMismatch` the filter state is left untouched.
    pub fn update(&mut self, values: &[f64]) -> Result<()> {
        check_arity(self.number_of_parameter, values.len())?;

        let sample = Sample::from_column_slice(values);
        self.samples_seen = self.samples_seen.saturating_add(1);
        self.previous_moving_average.copy_from(&self.moving_average);

        let evicted = self
            .history
            .pop_front()
            .unwrap_or_else(|| Sample::zeros(self.number_of_parameter));

        if self.correction_cnt > DRIFT_CORRECTION_INTERVAL {
            self.history.push_back(sample);
            self.correction_cnt = 0;
            self.moving_average = self.calc_history_average();
            log::trace!("moving average recomputed from full history");
        } else {
            self.correction_cnt += 1;
            self.moving_average += (&sample - &evicted) / self.history_size as f64;
            self.history.push_back(sample);
        }

        Ok(())
    }

    /// Exact mean of the whole window
    ///
    /// Slower than reading [`moving_average`](Self::moving_average) but free
    /// of accumulated rounding error.
    pub fn calc_history_average(&self) -> Sample {
        mean(&self.history, self.number_of_parameter)
    }

    /// Euclidean distance from the moving average to `point`
    pub fn distance_to_point(&self, point: &[f64]) -> Result<f64> {
        euclidean_distance(&self.moving_average, point)
    }

    /// Filtered speed, given the number of updates per unit of time
    pub fn velocity(&self, sampling_rate: f64) -> f64 {
        distance_unchecked(
            self.moving_average.as_slice(),
            self.previous_moving_average.as_slice(),
        ) * sampling_rate
    }

    /// Displacement of the moving average over the last update
    pub fn replacement(&self) -> Sample {
        &self.moving_average - &self.previous_moving_average
    }

    /// Debounced motion classification
    ///
    /// Each call counts as one observation. Returns `None` until
    /// `min_n_samples` consecutive observations agree.
    pub fn is_moving(
        &mut self,
        velocity_threshold: f64,
        min_n_samples: usize,
        sampling_rate: f64,
    ) -> Option<bool> {
        let above = self.velocity(sampling_rate) > velocity_threshold;
        self.motion.observe(above, min_n_samples)
    }

    /// Pin the current moving average as the center of a reference sphere
    pub fn set_reference_area(&mut self, radius: f64) {
        self.reference = Some(ReferenceArea::new(self.moving_average.clone(), radius));
    }

    /// Drop the reference area
    pub fn clear_reference_area(&mut self) {
        self.reference = None;
    }

    /// `None` if no reference area is set
    pub fn is_in_reference_area(&self) -> Option<bool> {
        self.reference
            .as_ref()
            .map(|area| area.contains(&self.moving_average))
    }

    /// Currently pinned reference area, if any
    pub fn reference_area(&self) -> Option<&ReferenceArea> {
        self.reference.as_ref()
    }

    /// Window contents, oldest first
    pub fn history(&self) -> &VecDeque<Sample> {
        &self.history
    }

    /// Configured window length
    pub fn history_size(&self) -> usize {
        self.history_size
    }

    /// Values per sample
    pub fn number_of_parameter(&self) -> usize {
        self.number_of_parameter
    }

    /// Running mean of the window
    pub fn moving_average(&self) -> &Sample {
        &self.moving_average
    }

    /// Running mean before the last update
    pub fn previous_moving_average(&self) -> &Sample {
        &self.previous_moving_average
    }

    /// Current motion debounce state
    pub fn motion_index(&self) -> MotionIndex {
        self.motion.index()
    }

    /// Number of samples accepted since construction
    pub fn samples_seen(&self) -> u64 {
        self.samples_seen
    }

    /// Whether every initial zero slot has been replaced by a real sample
    pub fn is_filled(&self) -> bool {
        self.samples_seen >= self.history_size as u64
    }
}

impl fmt::Display for SensorHistory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, sample) in self.history.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "[")?;
            for (j, value) in sample.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", value)?;
            }
            write!(f, "]")?;
        }
        write!(f, "]")
    }
}
