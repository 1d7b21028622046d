//! Online filtering of raw tracker samples
//!
//! [`SensorHistory`] keeps a fixed window of samples and derives a moving
//! average, velocity, a debounced moving/still classification and
//! containment in an optional reference sphere.

pub mod history;
pub mod motion;
pub mod reference;

pub use self::history::{SensorHistory, DRIFT_CORRECTION_INTERVAL};
pub use self::motion::{MotionDetector, MotionIndex};
pub use self::reference::ReferenceArea;
