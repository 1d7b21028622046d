//! Reference sphere for containment checks

use crate::common::distance_unchecked;
use crate::common::types::Sample;

/// A sphere pinned at a filtered position
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceArea {
    center: Sample,
    radius: f64,
}

impl ReferenceArea {
    /// Create a reference area around `center`
    pub fn new(center: Sample, radius: f64) -> Self {
        ReferenceArea { center, radius }
    }

    /// Center of the sphere
    pub fn center(&self) -> &Sample {
        &self.center
    }

    /// Radius of the sphere
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Whether `point` lies inside or on the sphere
    ///
    /// `point` must have the same arity as the center.
    pub fn contains(&self, point: &Sample) -> bool {
        distance_unchecked(self.center.as_slice(), point.as_slice()) <= self.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_boundary() {
        let area = ReferenceArea::new(Sample::from_vec(vec![0.0, 0.0]), 5.0);
        assert!(area.contains(&Sample::from_vec(vec![3.0, 4.0])));
        assert!(area.contains(&Sample::from_vec(vec![0.0, 0.0])));
        assert!(!area.contains(&Sample::from_vec(vec![3.0, 4.1])));
    }
}
