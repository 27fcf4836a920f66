use std::collections::BTreeMap;

use crate::{Point, objective::is_eval_error};

/// A pending request to evaluate an objective.
///
/// A query either targets a domain point directly, or a `(fidelity, point)`
/// pair on a multi-fidelity objective.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Query {
    /// Evaluate at a domain point.
    Domain { point: Point },

    /// Evaluate at a domain point using the given fidelity.
    Fidelity { fidel: Point, point: Point },
}

impl Query {
    /// Returns the queried domain point.
    #[must_use]
    pub fn point(&self) -> &Point {
        match self {
            Self::Domain { point } | Self::Fidelity { point, .. } => point,
        }
    }

    /// Returns the queried fidelity, if any.
    #[must_use]
    pub fn fidel(&self) -> Option<&Point> {
        match self {
            Self::Domain { .. } => None,
            Self::Fidelity { fidel, .. } => Some(fidel),
        }
    }
}

/// The inputs and outputs of one evaluation.
///
/// Records are only produced fully populated: a domain record has no
/// fidelity cost, and a fidelity record always carries one.
///
/// Annotations belong to the host (timestamps, worker ids, and similar
/// bookkeeping). They are carried over when a record is handed back to a
/// caller for re-evaluation and are never read by the evaluation itself.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueryRecord {
    query: Query,
    true_val: f64,
    val: f64,
    cost_at_fidel: Option<f64>,
    annotations: BTreeMap<String, f64>,
}

impl QueryRecord {
    /// Creates a record for an evaluation at a domain point.
    #[must_use]
    pub fn domain(point: Point, true_val: f64, val: f64) -> Self {
        Self {
            query: Query::Domain { point },
            true_val,
            val,
            cost_at_fidel: None,
            annotations: BTreeMap::new(),
        }
    }

    /// Creates a record for an evaluation at a `(fidelity, point)` pair.
    #[must_use]
    pub fn fidelity(fidel: Point, point: Point, true_val: f64, val: f64, cost_at_fidel: f64) -> Self {
        Self {
            query: Query::Fidelity { fidel, point },
            true_val,
            val,
            cost_at_fidel: Some(cost_at_fidel),
            annotations: BTreeMap::new(),
        }
    }

    /// Replaces the annotations with `annotations`.
    #[must_use]
    pub fn with_annotations(mut self, annotations: BTreeMap<String, f64>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Returns the evaluated query.
    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Returns the evaluated domain point.
    #[must_use]
    pub fn point(&self) -> &Point {
        self.query.point()
    }

    /// Returns the fidelity used, if this was a fidelity query.
    #[must_use]
    pub fn fidel(&self) -> Option<&Point> {
        self.query.fidel()
    }

    /// Returns the noiseless objective value.
    #[must_use]
    pub fn true_val(&self) -> f64 {
        self.true_val
    }

    /// Returns the observed value, which may include noise.
    #[must_use]
    pub fn val(&self) -> f64 {
        self.val
    }

    /// Returns the cost of the evaluation at its fidelity.
    #[must_use]
    pub fn cost_at_fidel(&self) -> Option<f64> {
        self.cost_at_fidel
    }

    /// Returns the evaluation cost reported by the caller.
    ///
    /// Single-fidelity callers do not report a cost.
    #[must_use]
    pub fn caller_eval_cost(&self) -> Option<f64> {
        self.cost_at_fidel
    }

    /// Returns true if the objective signalled a failed evaluation.
    #[must_use]
    pub fn is_eval_error(&self) -> bool {
        is_eval_error(self.true_val)
    }

    /// Returns the host annotations.
    #[must_use]
    pub fn annotations(&self) -> &BTreeMap<String, f64> {
        &self.annotations
    }

    /// Returns the host annotations for modification.
    pub fn annotations_mut(&mut self) -> &mut BTreeMap<String, f64> {
        &mut self.annotations
    }

    /// Consumes the record and returns its query and annotations.
    #[must_use]
    pub fn into_parts(self) -> (Query, BTreeMap<String, f64>) {
        (self.query, self.annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    #[test]
    fn domain_record_has_no_fidelity() {
        let record = QueryRecord::domain(array![0.5], 2.0, 2.1);

        assert_eq!(record.point(), &array![0.5]);
        assert!(record.fidel().is_none());
        assert!(record.cost_at_fidel().is_none());
        assert!(record.caller_eval_cost().is_none());
        assert_eq!(record.val(), 2.1);
    }

    #[test]
    fn fidelity_record_carries_cost() {
        let record = QueryRecord::fidelity(array![1.0], array![0.5, 0.5], 3.0, 3.0, 7.0);

        assert_eq!(record.fidel(), Some(&array![1.0]));
        assert_eq!(record.cost_at_fidel(), Some(7.0));
        assert_eq!(record.caller_eval_cost(), Some(7.0));
        assert!(matches!(record.query(), Query::Fidelity { .. }));
    }

    #[test]
    fn annotations_survive_into_parts() {
        let mut record = QueryRecord::domain(array![0.0], 1.0, 1.0);
        record.annotations_mut().insert("worker".into(), 3.0);

        let (query, annotations) = record.into_parts();

        assert_eq!(query, Query::Domain { point: array![0.0] });
        assert_eq!(annotations.get("worker"), Some(&3.0));
    }

    #[test]
    fn reports_eval_error() {
        let record = QueryRecord::domain(array![0.0], crate::EVAL_ERROR, crate::EVAL_ERROR);
        assert!(record.is_eval_error());
    }
}
