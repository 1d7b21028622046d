//! Common utilities and types shared by the filter and the relay

use crate::error::{Error, Result};
use nalgebra::DVector;

/// Common types used across the codebase
pub mod types {
    use nalgebra::DVector;

    /// One tick worth of sensor parameters
    pub type Sample = DVector<f64>;
}

use self::types::Sample;

/// Fail with `DimensionMismatch` unless `actual == expected`
pub fn check_arity(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Euclidean distance between two points of equal arity
pub fn euclidean_distance(a: &Sample, b: &[f64]) -> Result<f64> {
    check_arity(a.len(), b.len())?;
    Ok(distance_unchecked(a.as_slice(), b))
}

/// Euclidean distance over the common prefix of `a` and `b`
pub(crate) fn distance_unchecked(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (y - x).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Exact component-wise mean of `samples`, each of arity `dim`
///
/// Returns the zero vector for an empty iterator.
pub fn mean<'a, I>(samples: I, dim: usize) -> Sample
where
    I: IntoIterator<Item = &'a Sample>,
{
    let mut sum = DVector::zeros(dim);
    let mut count = 0usize;
    for sample in samples {
        sum += sample;
        count += 1;
    }
    if count > 0 {
        sum /= count as f64;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_distance_is_symmetric() {
        let a = Sample::from_vec(vec![1.0, 2.0, 3.0]);
        let b = Sample::from_vec(vec![4.0, 6.0, 3.0]);
        let ab = euclidean_distance(&a, b.as_slice()).unwrap();
        let ba = euclidean_distance(&b, a.as_slice()).unwrap();
        assert_relative_eq!(ab, 5.0);
        assert_relative_eq!(ab, ba);
    }

    #[test]
    fn test_distance_rejects_arity_mismatch() {
        let a = Sample::from_vec(vec![1.0, 2.0]);
        let err = euclidean_distance(&a, &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(
            err,
            Error::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_mean() {
        let samples = vec![
            Sample::from_vec(vec![0.0, 10.0]),
            Sample::from_vec(vec![2.0, 20.0]),
        ];
        let m = mean(&samples, 2);
        assert_relative_eq!(m[0], 1.0);
        assert_relative_eq!(m[1], 15.0);

        let empty: Vec<Sample> = Vec::new();
        assert_eq!(mean(&empty, 2), Sample::zeros(2));
    }
}
