//! A caller that hands coordinates to the objective unchanged.

use mfcall_core::{CostFunction, EuclideanDomain, FidelObjective, Objective, Point};

use crate::{
    CallerConfig, ConfigError,
    caller::{CallerCore, FunctionCaller, Mode, MultiFidelity},
};

/// An objective whose signature is only known at runtime.
pub enum ObjectiveFn {
    /// Evaluated at a point.
    Plain(Box<dyn Objective>),

    /// Evaluated at a `(fidelity, point)` pair.
    AtFidel(Box<dyn FidelObjective>),
}

/// Optional multi-fidelity settings, for hosts that assemble a caller from
/// loosely-typed configuration.
///
/// Either every field is set or none is.
#[derive(Default)]
pub struct FidelityParts {
    pub fidel_space: Option<EuclideanDomain>,
    pub fidel_cost_func: Option<Box<dyn CostFunction>>,
    pub fidel_to_opt: Option<Point>,
}

/// A function caller without coordinate mapping.
///
/// Points and fidelities are passed to the objective and cost function as
/// given. Candidate fidelities and the information gap are not available.
#[derive(Debug)]
pub struct BaseCaller {
    core: CallerCore,
}

impl BaseCaller {
    /// Creates a single-fidelity caller.
    pub fn single<O>(func: O, domain: EuclideanDomain, config: CallerConfig) -> Self
    where
        O: Objective + 'static,
    {
        Self {
            core: CallerCore::single(func, domain, config),
        }
    }

    /// Creates a multi-fidelity caller.
    #[must_use]
    pub fn multi(mf: MultiFidelity, domain: EuclideanDomain, config: CallerConfig) -> Self {
        Self {
            core: CallerCore::multi(mf, domain, config),
        }
    }

    /// Creates a caller from an objective and optional fidelity settings.
    ///
    /// With no fidelity settings the objective must be
    /// [`ObjectiveFn::Plain`]; with all of them it must be
    /// [`ObjectiveFn::AtFidel`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PartialMultiFidelity`] if only some fidelity
    /// settings are given, [`ConfigError::ObjectiveMismatch`] if the
    /// objective does not fit the mode, or a dimension error.
    pub fn from_parts(
        func: ObjectiveFn,
        domain: EuclideanDomain,
        parts: FidelityParts,
        config: CallerConfig,
    ) -> Result<Self, ConfigError> {
        let FidelityParts {
            fidel_space,
            fidel_cost_func,
            fidel_to_opt,
        } = parts;

        let mode = match (func, fidel_space, fidel_cost_func, fidel_to_opt) {
            (ObjectiveFn::Plain(func), None, None, None) => Mode::Single(func),
            (ObjectiveFn::AtFidel(func), Some(space), Some(cost), Some(fidel_to_opt)) => {
                Mode::Multi(MultiFidelity::from_boxed(func, space, cost, fidel_to_opt)?)
            }
            (_, None, None, None) | (_, Some(_), Some(_), Some(_)) => {
                return Err(ConfigError::ObjectiveMismatch);
            }
            _ => return Err(ConfigError::PartialMultiFidelity),
        };

        Ok(Self {
            core: CallerCore::new(mode, domain, config),
        })
    }
}

impl FunctionCaller for BaseCaller {
    fn core(&self) -> &CallerCore {
        &self.core
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::{ArrayD, array};

    use crate::Error;

    fn sum(x: &ArrayD<f64>) -> f64 {
        x.sum()
    }

    fn identity_cost(z: &ArrayD<f64>) -> f64 {
        z.sum()
    }

    fn fidel_parts() -> FidelityParts {
        FidelityParts {
            fidel_space: Some(EuclideanDomain::unit(1)),
            fidel_cost_func: Some(Box::new(identity_cost)),
            fidel_to_opt: Some(array![1.0]),
        }
    }

    #[test]
    fn from_parts_builds_single_fidelity() {
        let caller = BaseCaller::from_parts(
            ObjectiveFn::Plain(Box::new(sum)),
            EuclideanDomain::unit(2),
            FidelityParts::default(),
            CallerConfig::named("plain"),
        )
        .expect("valid parts");

        assert!(!caller.is_mf());
        let (val, _) = caller.eval_single(&array![0.25, 0.5], None, true).unwrap();
        assert_relative_eq!(val, 0.75);
    }

    #[test]
    fn from_parts_builds_multi_fidelity() {
        let caller = BaseCaller::from_parts(
            ObjectiveFn::AtFidel(Box::new(|z: &ArrayD<f64>, x: &ArrayD<f64>| {
                z.sum() * x.sum()
            })),
            EuclideanDomain::unit(1),
            fidel_parts(),
            CallerConfig::named("mf"),
        )
        .expect("valid parts");

        assert!(caller.is_mf());
        let (val, record) = caller
            .eval_at_fidel_single(&array![0.5], &array![0.8], None, true)
            .unwrap();
        assert_relative_eq!(val, 0.4);
        assert_eq!(record.cost_at_fidel(), Some(0.5));
    }

    #[test]
    fn partial_fidelity_settings_are_rejected() {
        for parts in [
            FidelityParts {
                fidel_space: None,
                ..fidel_parts()
            },
            FidelityParts {
                fidel_cost_func: None,
                ..fidel_parts()
            },
            FidelityParts {
                fidel_space: Some(EuclideanDomain::unit(1)),
                ..FidelityParts::default()
            },
        ] {
            let result = BaseCaller::from_parts(
                ObjectiveFn::AtFidel(Box::new(|_: &ArrayD<f64>, x: &ArrayD<f64>| x.sum())),
                EuclideanDomain::unit(1),
                parts,
                CallerConfig::default(),
            );
            assert!(matches!(result, Err(ConfigError::PartialMultiFidelity)));
        }
    }

    #[test]
    fn objective_must_match_mode() {
        let result = BaseCaller::from_parts(
            ObjectiveFn::Plain(Box::new(sum)),
            EuclideanDomain::unit(1),
            fidel_parts(),
            CallerConfig::default(),
        );

        assert!(matches!(result, Err(ConfigError::ObjectiveMismatch)));
    }

    #[test]
    fn base_caller_has_no_candidate_generation() {
        let mf = MultiFidelity::new(
            |_: &ArrayD<f64>, x: &ArrayD<f64>| x.sum(),
            EuclideanDomain::unit(1),
            identity_cost,
            array![1.0],
        )
        .unwrap();
        let caller = BaseCaller::multi(mf, EuclideanDomain::unit(1), CallerConfig::default());

        assert_eq!(
            caller.get_candidate_fidels(&array![0.5], true),
            Err(Error::NotImplemented("candidate fidelity generation"))
        );
        assert_eq!(
            caller.get_information_gap(&[array![0.5]]),
            Err(Error::NotImplemented("information gap"))
        );
    }

    #[test]
    fn base_fidel_to_opt_is_exact() {
        let mf = MultiFidelity::new(
            |_: &ArrayD<f64>, x: &ArrayD<f64>| x.sum(),
            EuclideanDomain::unit(1),
            identity_cost,
            array![1.0],
        )
        .unwrap();
        let caller = BaseCaller::multi(mf, EuclideanDomain::unit(1), CallerConfig::default());

        assert_eq!(caller.is_fidel_to_opt(&array![1.0]), Ok(true));
        assert_eq!(caller.is_fidel_to_opt(&array![0.999]), Ok(false));
    }
}
