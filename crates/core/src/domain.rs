use ndarray::ArrayView1;
use thiserror::Error;

use crate::Point;

/// Errors that can occur when building or using a [`EuclideanDomain`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("domain must have at least one dimension")]
    Empty,

    #[error("bounds at index {index} must be finite with lower < upper")]
    InvalidBounds { index: usize },

    #[error("expected a vector of dimension {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// An axis-aligned box in `R^d`.
///
/// Each dimension is described by a `[lower, upper]` pair with
/// `lower < upper`. The domain knows how to test membership and how to map
/// vectors to and from the unit hypercube `[0, 1]^d`.
#[derive(Debug, Clone, PartialEq)]
pub struct EuclideanDomain {
    bounds: Vec<[f64; 2]>,
}

impl EuclideanDomain {
    /// Creates a domain from per-dimension `[lower, upper]` bounds.
    ///
    /// # Errors
    ///
    /// Returns an error if `bounds` is empty or any pair is non-finite or
    /// not strictly increasing.
    pub fn new(bounds: Vec<[f64; 2]>) -> Result<Self, DomainError> {
        if bounds.is_empty() {
            return Err(DomainError::Empty);
        }
        for (index, &[lower, upper]) in bounds.iter().enumerate() {
            if !lower.is_finite() || !upper.is_finite() || lower >= upper {
                return Err(DomainError::InvalidBounds { index });
            }
        }
        Ok(Self { bounds })
    }

    /// Returns the unit hypercube `[0, 1]^dim`.
    ///
    /// # Panics
    ///
    /// Panics if `dim` is zero.
    #[must_use]
    pub fn unit(dim: usize) -> Self {
        assert!(dim > 0, "unit cube must have at least one dimension");
        Self {
            bounds: vec![[0.0, 1.0]; dim],
        }
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.bounds.len()
    }

    /// Returns the per-dimension bounds.
    #[must_use]
    pub fn bounds(&self) -> &[[f64; 2]] {
        &self.bounds
    }

    /// Returns the vector of lower bounds.
    #[must_use]
    pub fn lower(&self) -> Point {
        self.bounds.iter().map(|b| b[0]).collect()
    }

    /// Returns the vector of upper bounds.
    #[must_use]
    pub fn upper(&self) -> Point {
        self.bounds.iter().map(|b| b[1]).collect()
    }

    /// Returns the Euclidean length of the domain's main diagonal.
    #[must_use]
    pub fn diameter(&self) -> f64 {
        self.bounds
            .iter()
            .map(|[lower, upper]| (upper - lower).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// Returns true if `x` has the right dimension and lies within the bounds.
    #[must_use]
    pub fn is_member(&self, x: ArrayView1<'_, f64>) -> bool {
        x.len() == self.dim()
            && x.iter()
                .zip(&self.bounds)
                .all(|(&v, &[lower, upper])| lower <= v && v <= upper)
    }

    /// Maps `x` from this domain onto the unit hypercube.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DimensionMismatch`] if `x` has the wrong length.
    pub fn to_unit_cube(&self, x: ArrayView1<'_, f64>) -> Result<Point, DomainError> {
        self.check_dim(x.len())?;
        Ok(x.iter()
            .zip(&self.bounds)
            .map(|(&v, &[lower, upper])| (v - lower) / (upper - lower))
            .collect())
    }

    /// Maps `x` from the unit hypercube into this domain.
    ///
    /// Endpoints map exactly onto the bounds, so a unit-cube vertex always
    /// lands on a domain vertex.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DimensionMismatch`] if `x` has the wrong length.
    pub fn from_unit_cube(&self, x: ArrayView1<'_, f64>) -> Result<Point, DomainError> {
        self.check_dim(x.len())?;
        Ok(x.iter()
            .zip(&self.bounds)
            .map(|(&t, &[lower, upper])| lower * (1.0 - t) + upper * t)
            .collect())
    }

    /// Checks that a vector of length `found` matches this domain.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::DimensionMismatch`] on a length mismatch.
    pub fn check_dim(&self, found: usize) -> Result<(), DomainError> {
        if found == self.dim() {
            Ok(())
        } else {
            Err(DomainError::DimensionMismatch {
                expected: self.dim(),
                found,
            })
        }
    }
}

impl TryFrom<Vec<[f64; 2]>> for EuclideanDomain {
    type Error = DomainError;

    fn try_from(bounds: Vec<[f64; 2]>) -> Result<Self, Self::Error> {
        Self::new(bounds)
    }
}

/// Returns the Euclidean distance between two vectors of equal length.
///
/// # Panics
///
/// Panics if the vectors differ in length.
#[must_use]
pub fn euclidean_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    assert_eq!(a.len(), b.len(), "vectors must have equal length");
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;
    use proptest::prelude::*;

    fn box_2d() -> EuclideanDomain {
        EuclideanDomain::new(vec![[-5.0, 10.0], [0.0, 15.0]]).expect("valid bounds")
    }

    #[test]
    fn rejects_empty_and_inverted_bounds() {
        assert_eq!(EuclideanDomain::new(vec![]), Err(DomainError::Empty));
        assert_eq!(
            EuclideanDomain::new(vec![[0.0, 1.0], [2.0, 2.0]]),
            Err(DomainError::InvalidBounds { index: 1 })
        );
        assert_eq!(
            EuclideanDomain::new(vec![[f64::NEG_INFINITY, 1.0]]),
            Err(DomainError::InvalidBounds { index: 0 })
        );
    }

    #[test]
    fn membership_checks_bounds_and_dimension() {
        let domain = box_2d();

        assert!(domain.is_member(array![-5.0, 15.0].view()));
        assert!(domain.is_member(array![0.0, 7.5].view()));
        assert!(!domain.is_member(array![-5.1, 7.5].view()));
        assert!(!domain.is_member(array![0.0].view()));
    }

    #[test]
    fn maps_to_unit_cube() {
        let domain = box_2d();

        let unit = domain.to_unit_cube(array![2.5, 3.0].view()).unwrap();

        assert_relative_eq!(unit[0], 0.5);
        assert_relative_eq!(unit[1], 0.2);
    }

    #[test]
    fn unit_cube_vertices_land_on_bounds() {
        let domain = EuclideanDomain::new(vec![[0.1, 0.3]]).unwrap();

        let upper = domain.from_unit_cube(array![1.0].view()).unwrap();
        let lower = domain.from_unit_cube(array![0.0].view()).unwrap();

        assert_eq!(upper[0], 0.3);
        assert_eq!(lower[0], 0.1);
        assert!(domain.is_member(upper.view()));
    }

    #[test]
    fn mapping_rejects_wrong_dimension() {
        let domain = box_2d();

        let err = domain.from_unit_cube(array![0.5].view()).unwrap_err();

        assert_eq!(
            err,
            DomainError::DimensionMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn unit_cube_diameter_is_sqrt_dim() {
        assert_relative_eq!(EuclideanDomain::unit(4).diameter(), 2.0);
        assert_relative_eq!(box_2d().diameter(), (2.0 * 225.0_f64).sqrt());
    }

    proptest! {
        #[test]
        fn unit_cube_round_trip(a in 0.0..1.0_f64, b in 0.0..1.0_f64) {
            let domain = box_2d();
            let x = domain.from_unit_cube(array![a, b].view()).unwrap();
            prop_assert!(domain.is_member(x.view()));

            let back = domain.to_unit_cube(x.view()).unwrap();
            prop_assert!((back[0] - a).abs() < 1e-12);
            prop_assert!((back[1] - b).abs() < 1e-12);
        }
    }
}
