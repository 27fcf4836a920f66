use std::{cell::RefCell, fmt};

use mfcall_core::{
    CostFunction, EVAL_ERROR, EuclideanDomain, FidelObjective, Objective, Optimum, Point,
    is_eval_error,
};
use rand::{SeedableRng, rngs::StdRng};

use crate::{CallerConfig, ConfigError, Error, noise::Noise};

/// The multi-fidelity part of a caller.
///
/// The fidelity objective, fidelity space, cost function, and target
/// fidelity only exist together, so a caller is either fully multi-fidelity
/// or not at all.
pub struct MultiFidelity {
    func: Box<dyn FidelObjective>,
    fidel_space: EuclideanDomain,
    cost: Box<dyn CostFunction>,
    fidel_to_opt: Point,
}

impl MultiFidelity {
    /// Bundles a fidelity objective with its fidelity space and cost.
    ///
    /// # Errors
    ///
    /// Returns an error if `fidel_to_opt` does not match the dimension of
    /// `fidel_space`.
    pub fn new<F, C>(
        func: F,
        fidel_space: EuclideanDomain,
        cost: C,
        fidel_to_opt: Point,
    ) -> Result<Self, ConfigError>
    where
        F: FidelObjective + 'static,
        C: CostFunction + 'static,
    {
        Self::from_boxed(Box::new(func), fidel_space, Box::new(cost), fidel_to_opt)
    }

    /// Same as [`MultiFidelity::new`], for callables that are already boxed.
    ///
    /// # Errors
    ///
    /// Returns an error if `fidel_to_opt` does not match the dimension of
    /// `fidel_space`.
    pub fn from_boxed(
        func: Box<dyn FidelObjective>,
        fidel_space: EuclideanDomain,
        cost: Box<dyn CostFunction>,
        fidel_to_opt: Point,
    ) -> Result<Self, ConfigError> {
        fidel_space.check_dim(fidel_to_opt.len())?;
        Ok(Self {
            func,
            fidel_space,
            cost,
            fidel_to_opt,
        })
    }

    /// Returns the fidelity objective.
    #[must_use]
    pub fn objective(&self) -> &dyn FidelObjective {
        &*self.func
    }

    /// Returns the fidelity cost function.
    #[must_use]
    pub fn cost_function(&self) -> &dyn CostFunction {
        &*self.cost
    }

    /// Returns the fidelity space.
    #[must_use]
    pub fn fidel_space(&self) -> &EuclideanDomain {
        &self.fidel_space
    }

    /// Returns the fidelity at which the objective equals the true objective.
    #[must_use]
    pub fn fidel_to_opt(&self) -> &Point {
        &self.fidel_to_opt
    }
}

impl fmt::Debug for MultiFidelity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiFidelity")
            .field("fidel_space", &self.fidel_space)
            .field("fidel_to_opt", &self.fidel_to_opt)
            .finish_non_exhaustive()
    }
}

/// Whether a caller evaluates a plain objective or a fidelity objective.
pub enum Mode {
    Single(Box<dyn Objective>),
    Multi(MultiFidelity),
}

impl fmt::Debug for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(_) => f.write_str("Single"),
            Self::Multi(mf) => f.debug_tuple("Multi").field(mf).finish(),
        }
    }
}

/// State shared by every function caller.
///
/// Holds the objective (through [`Mode`]), the public domain, known optima,
/// noise, and the random generator used for noise and candidate sampling.
pub struct CallerCore {
    descr: String,
    domain: EuclideanDomain,
    optimum: Optimum,
    noise: Noise,
    rng: RefCell<StdRng>,
    mode: Mode,
}

impl CallerCore {
    /// Creates the state for a single-fidelity caller.
    pub fn single<O>(func: O, domain: EuclideanDomain, config: CallerConfig) -> Self
    where
        O: Objective + 'static,
    {
        Self::new(Mode::Single(Box::new(func)), domain, config)
    }

    /// Creates the state for a multi-fidelity caller.
    #[must_use]
    pub fn multi(mf: MultiFidelity, domain: EuclideanDomain, config: CallerConfig) -> Self {
        Self::new(Mode::Multi(mf), domain, config)
    }

    /// Creates the state from an explicit mode.
    #[must_use]
    pub fn new(mode: Mode, domain: EuclideanDomain, config: CallerConfig) -> Self {
        let CallerConfig {
            descr,
            optimum,
            noise,
            seed,
        } = config;
        let rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        tracing::debug!(
            descr = %descr,
            dim = domain.dim(),
            mf = matches!(mode, Mode::Multi(_)),
            noise = %noise.kind(),
            "function caller constructed"
        );

        Self {
            descr,
            domain,
            optimum,
            noise,
            rng: RefCell::new(rng),
            mode,
        }
    }

    /// Returns the caller's label.
    #[must_use]
    pub fn descr(&self) -> &str {
        &self.descr
    }

    /// Returns the public domain.
    #[must_use]
    pub fn domain(&self) -> &EuclideanDomain {
        &self.domain
    }

    /// Returns the known optima in public coordinates.
    #[must_use]
    pub fn optimum(&self) -> &Optimum {
        &self.optimum
    }

    /// Returns the noise configuration.
    #[must_use]
    pub fn noise(&self) -> &Noise {
        &self.noise
    }

    /// Returns the evaluation mode.
    #[must_use]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Returns true if observations are perturbed by noise.
    #[must_use]
    pub fn is_noisy(&self) -> bool {
        self.noise.is_noisy()
    }

    /// Returns true if this is a multi-fidelity caller.
    #[must_use]
    pub fn is_mf(&self) -> bool {
        matches!(self.mode, Mode::Multi(_))
    }

    /// Returns the plain objective.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSingleFidelity`] on a multi-fidelity caller.
    pub fn objective(&self) -> Result<&dyn Objective, Error> {
        match &self.mode {
            Mode::Single(func) => Ok(&**func),
            Mode::Multi(_) => Err(Error::NotSingleFidelity {
                descr: self.descr.clone(),
            }),
        }
    }

    /// Returns the multi-fidelity configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMultiFidelity`] on a single-fidelity caller.
    pub fn multi_fidelity(&self) -> Result<&MultiFidelity, Error> {
        match &self.mode {
            Mode::Multi(mf) => Ok(mf),
            Mode::Single(_) => Err(Error::NotMultiFidelity {
                descr: self.descr.clone(),
            }),
        }
    }

    /// Turns a true value into an observed value.
    ///
    /// A failed evaluation stays failed. Otherwise one noise draw is added
    /// when `noisy` is requested and the caller is noisy.
    pub fn observe(&self, true_val: f64, noisy: bool) -> f64 {
        if is_eval_error(true_val) {
            tracing::debug!(descr = %self.descr, "objective reported an evaluation error");
            return EVAL_ERROR;
        }
        if noisy && self.is_noisy() {
            true_val + self.with_rng(|rng| self.noise.sample(rng))
        } else {
            true_val
        }
    }

    /// Runs `f` with exclusive access to the caller's random generator.
    pub fn with_rng<T>(&self, f: impl FnOnce(&mut StdRng) -> T) -> T {
        f(&mut self.rng.borrow_mut())
    }
}

impl fmt::Debug for CallerCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallerCore")
            .field("descr", &self.descr)
            .field("domain", &self.domain)
            .field("optimum", &self.optimum)
            .field("noise", &self.noise)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::{ArrayD, array};

    use crate::noise::NoiseKind;

    fn sum(x: &ArrayD<f64>) -> f64 {
        x.sum()
    }

    fn noisy_core(scale: f64) -> CallerCore {
        let config = CallerConfig::named("noisy")
            .with_noise(Noise::new(NoiseKind::Gauss, Some(scale)).unwrap())
            .with_seed(1);
        CallerCore::single(sum, EuclideanDomain::unit(1), config)
    }

    #[test]
    fn observe_keeps_eval_error() {
        let core = noisy_core(1.0);
        assert!(core.observe(EVAL_ERROR, true).is_nan());
    }

    #[test]
    fn observe_skips_noise_when_not_requested() {
        let core = noisy_core(1.0);
        assert_eq!(core.observe(2.5, false), 2.5);
        assert_ne!(core.observe(2.5, true), 2.5);
    }

    #[test]
    fn multi_fidelity_dimension_is_checked() {
        let result = MultiFidelity::new(
            |_: &ArrayD<f64>, x: &ArrayD<f64>| x.sum(),
            EuclideanDomain::unit(2),
            sum,
            array![1.0],
        );

        assert!(matches!(result, Err(ConfigError::Domain(_))));
    }

    #[test]
    fn mode_accessors_report_wrong_mode() {
        let core = noisy_core(0.0);

        assert!(!core.is_mf());
        assert!(core.objective().is_ok());
        assert!(matches!(
            core.multi_fidelity(),
            Err(Error::NotMultiFidelity { .. })
        ));
    }
}
