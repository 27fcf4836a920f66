use mfcall_core::Optimum;

use crate::noise::Noise;

/// Settings shared by every function caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallerConfig {
    /// Human-readable label used in logs and errors.
    pub descr: String,

    /// Known optima of the objective, in the caller's public coordinates.
    pub optimum: Optimum,

    /// Observation noise.
    pub noise: Noise,

    /// Seed for noise and random candidate sampling.
    ///
    /// `None` seeds from system entropy.
    pub seed: Option<u64>,
}

impl CallerConfig {
    /// Returns a config with the given label and defaults elsewhere.
    #[must_use]
    pub fn named(descr: impl Into<String>) -> Self {
        Self {
            descr: descr.into(),
            ..Self::default()
        }
    }

    /// Returns this config with `noise` set.
    #[must_use]
    pub fn with_noise(self, noise: Noise) -> Self {
        Self { noise, ..self }
    }

    /// Returns this config with `seed` set.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    /// Returns this config with `optimum` set.
    #[must_use]
    pub fn with_optimum(self, optimum: Optimum) -> Self {
        Self { optimum, ..self }
    }
}
