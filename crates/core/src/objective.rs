use ndarray::ArrayD;

/// Value an objective returns in place of a valid result when it fails.
///
/// Any `NaN` is treated as this sentinel; see [`is_eval_error`].
pub const EVAL_ERROR: f64 = f64::NAN;

/// Returns true if `value` signals a failed evaluation.
#[must_use]
pub fn is_eval_error(value: f64) -> bool {
    value.is_nan()
}

/// A black-box objective evaluated at a single point.
///
/// The argument is a 1-D array of shape `(d,)`, or a `(d, 1)` column when
/// the owning caller is configured as vectorised.
///
/// Implemented for every `Fn(&ArrayD<f64>) -> f64`.
pub trait Objective {
    /// Evaluates the objective at `point`.
    fn call(&self, point: &ArrayD<f64>) -> f64;
}

impl<F> Objective for F
where
    F: Fn(&ArrayD<f64>) -> f64,
{
    fn call(&self, point: &ArrayD<f64>) -> f64 {
        self(point)
    }
}

/// A black-box objective evaluated at a `(fidelity, point)` pair.
///
/// Implemented for every `Fn(&ArrayD<f64>, &ArrayD<f64>) -> f64`.
pub trait FidelObjective {
    /// Evaluates the objective at `point` using fidelity `fidel`.
    fn call(&self, fidel: &ArrayD<f64>, point: &ArrayD<f64>) -> f64;
}

impl<F> FidelObjective for F
where
    F: Fn(&ArrayD<f64>, &ArrayD<f64>) -> f64,
{
    fn call(&self, fidel: &ArrayD<f64>, point: &ArrayD<f64>) -> f64 {
        self(fidel, point)
    }
}

/// The cost of evaluating an objective at a given fidelity.
///
/// Implemented for every `Fn(&ArrayD<f64>) -> f64`.
pub trait CostFunction {
    /// Returns the cost of one evaluation at `fidel`.
    fn cost(&self, fidel: &ArrayD<f64>) -> f64;
}

impl<F> CostFunction for F
where
    F: Fn(&ArrayD<f64>) -> f64,
{
    fn cost(&self, fidel: &ArrayD<f64>) -> f64 {
        self(fidel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    #[test]
    fn closures_are_objectives() {
        let sum = |x: &ArrayD<f64>| x.sum();
        let point = array![1.0, 2.0, 3.0].into_dyn();

        assert_eq!(Objective::call(&sum, &point), 6.0);
        assert_eq!(CostFunction::cost(&sum, &point), 6.0);
    }

    #[test]
    fn closures_are_fidel_objectives() {
        let scaled = |z: &ArrayD<f64>, x: &ArrayD<f64>| z.sum() * x.sum();
        let fidel = array![0.5].into_dyn();
        let point = array![2.0, 2.0].into_dyn();

        assert_eq!(FidelObjective::call(&scaled, &fidel, &point), 2.0);
    }

    #[test]
    fn nan_is_eval_error() {
        assert!(is_eval_error(EVAL_ERROR));
        assert!(is_eval_error((-1.0_f64).sqrt()));
        assert!(!is_eval_error(f64::INFINITY));
        assert!(!is_eval_error(1.0));
    }
}
