use crate::CallerConfig;

/// Configuration for a [`EuclideanCaller`](super::EuclideanCaller).
#[derive(Debug, Clone, PartialEq)]
pub struct EuclideanConfig {
    /// Shared caller settings.
    ///
    /// The optimum is given in raw domain coordinates and is normalized
    /// along with the domain.
    pub caller: CallerConfig,

    /// Expose the domain and fidelity space as unit hypercubes.
    pub normalise: bool,

    /// Pass coordinates to the objective and cost as `(d, 1)` columns
    /// instead of `(d,)` vectors.
    pub vectorised: bool,
}

impl Default for EuclideanConfig {
    fn default() -> Self {
        Self {
            caller: CallerConfig::default(),
            normalise: true,
            vectorised: false,
        }
    }
}

impl EuclideanConfig {
    /// Returns a normalizing, non-vectorised config around `caller`.
    #[must_use]
    pub fn new(caller: CallerConfig) -> Self {
        Self {
            caller,
            ..Self::default()
        }
    }

    /// Returns this config with raw coordinates exposed unchanged.
    #[must_use]
    pub fn raw(self) -> Self {
        Self {
            normalise: false,
            ..self
        }
    }

    /// Returns this config with column-layout arguments.
    #[must_use]
    pub fn vectorised(self) -> Self {
        Self {
            vectorised: true,
            ..self
        }
    }
}
