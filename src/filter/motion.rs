//! Hysteresis debounce for moving/still classification

/// Signed run-length of consecutive velocity decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionIndex {
    /// No decision observed yet
    #[default]
    Neutral,
    /// Consecutive ticks above the velocity threshold
    Moving(usize),
    /// Consecutive ticks at or below the velocity threshold
    Still(usize),
}

impl MotionIndex {
    /// Signed view of the run: positive while moving, negative while still
    pub fn signed(self) -> i64 {
        match self {
            MotionIndex::Neutral => 0,
            MotionIndex::Moving(n) => n as i64,
            MotionIndex::Still(n) => -(n as i64),
        }
    }
}

/// Two-state debounce over velocity threshold crossings
///
/// A classification only becomes definite once `min_n_samples`
/// consecutive observations agree.
#[derive(Debug, Clone, Default)]
pub struct MotionDetector {
    index: MotionIndex,
}

impl MotionDetector {
    /// Create a detector with no observations
    pub fn new() -> Self {
        MotionDetector {
            index: MotionIndex::Neutral,
        }
    }

    /// Record one tick and return the current classification
    pub fn observe(&mut self, above_threshold: bool, min_n_samples: usize) -> Option<bool> {
        self.index = match (self.index, above_threshold) {
            (MotionIndex::Moving(n), true) => MotionIndex::Moving(n.saturating_add(1)),
            (_, true) => MotionIndex::Moving(1),
            (MotionIndex::Still(n), false) => MotionIndex::Still(n.saturating_add(1)),
            (_, false) => MotionIndex::Still(1),
        };
        self.classify(min_n_samples)
    }

    /// `Some(true)` when moving, `Some(false)` when still, `None` if undecided
    pub fn classify(&self, min_n_samples: usize) -> Option<bool> {
        match self.index {
            MotionIndex::Moving(n) if n >= min_n_samples => Some(true),
            MotionIndex::Still(n) if n >= min_n_samples => Some(false),
            _ => None,
        }
    }

    /// Current run state
    pub fn index(&self) -> MotionIndex {
        self.index
    }
}
