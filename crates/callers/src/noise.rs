//! Observation noise added to objective values.

use std::{fmt, str::FromStr};

use rand::Rng;
use rand_distr::StandardNormal;

use crate::ConfigError;

/// The distribution observation noise is drawn from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NoiseKind {
    /// Observations equal the true value.
    #[default]
    NoNoise,

    /// Standard normal variates, scaled.
    Gauss,

    /// Uniform variates on `[-0.5, 0.5)`, scaled.
    Uniform,
}

impl NoiseKind {
    /// Returns the canonical name of this kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::NoNoise => "no_noise",
            Self::Gauss => "gauss",
            Self::Uniform => "uniform",
        }
    }
}

impl fmt::Display for NoiseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NoiseKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_noise" => Ok(Self::NoNoise),
            "gauss" => Ok(Self::Gauss),
            "uniform" => Ok(Self::Uniform),
            other => Err(ConfigError::UnsupportedNoise(other.to_owned())),
        }
    }
}

/// A validated noise configuration that can draw perturbations.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Noise {
    kind: NoiseKind,
    scale: f64,
}

impl Noise {
    /// Returns a configuration that never perturbs observations.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a noise configuration.
    ///
    /// The scale is ignored for [`NoiseKind::NoNoise`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoiseScale`] if a noisy kind is given no scale,
    /// or a scale that is negative or non-finite.
    pub fn new(kind: NoiseKind, scale: Option<f64>) -> Result<Self, ConfigError> {
        if kind == NoiseKind::NoNoise {
            return Ok(Self::none());
        }
        match scale {
            Some(scale) if scale.is_finite() && scale >= 0.0 => Ok(Self { kind, scale }),
            _ => Err(ConfigError::NoiseScale),
        }
    }

    /// Creates a noise configuration from a kind name such as `"gauss"`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedNoise`] for unknown names, or any
    /// error from [`Noise::new`].
    pub fn parse(kind: &str, scale: Option<f64>) -> Result<Self, ConfigError> {
        Self::new(kind.parse()?, scale)
    }

    /// Returns the noise kind.
    #[must_use]
    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    /// Returns the scale, or `None` when there is no noise.
    #[must_use]
    pub fn scale(&self) -> Option<f64> {
        self.is_noisy().then_some(self.scale)
    }

    /// Returns true unless the kind is [`NoiseKind::NoNoise`].
    #[must_use]
    pub fn is_noisy(&self) -> bool {
        self.kind != NoiseKind::NoNoise
    }

    /// Draws one perturbation.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self.kind {
            NoiseKind::NoNoise => 0.0,
            NoiseKind::Gauss => self.scale * rng.sample::<f64, _>(StandardNormal),
            NoiseKind::Uniform => self.scale * rng.gen_range(-0.5..0.5),
        }
    }

    /// Draws `n` independent perturbations.
    pub fn sample_many<R: Rng + ?Sized>(&self, n: usize, rng: &mut R) -> Vec<f64> {
        (0..n).map(|_| self.sample(rng)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn parses_known_kinds() {
        assert_eq!("no_noise".parse::<NoiseKind>(), Ok(NoiseKind::NoNoise));
        assert_eq!("gauss".parse::<NoiseKind>(), Ok(NoiseKind::Gauss));
        assert_eq!("uniform".parse::<NoiseKind>(), Ok(NoiseKind::Uniform));
        assert_eq!(NoiseKind::Gauss.to_string(), "gauss");
    }

    #[test]
    fn unknown_kind_is_not_implemented() {
        let err = Noise::parse("laplace", Some(1.0)).unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedNoise("laplace".into()));
    }

    #[test]
    fn noisy_kinds_need_a_valid_scale() {
        assert_eq!(Noise::new(NoiseKind::Gauss, None), Err(ConfigError::NoiseScale));
        assert_eq!(
            Noise::new(NoiseKind::Uniform, Some(-1.0)),
            Err(ConfigError::NoiseScale)
        );
        assert_eq!(
            Noise::new(NoiseKind::Gauss, Some(f64::NAN)),
            Err(ConfigError::NoiseScale)
        );
    }

    #[test]
    fn no_noise_discards_scale() {
        let noise = Noise::new(NoiseKind::NoNoise, Some(3.0)).unwrap();

        assert!(!noise.is_noisy());
        assert_eq!(noise.scale(), None);
        assert_eq!(noise.sample(&mut StdRng::seed_from_u64(0)), 0.0);
    }

    #[test]
    fn uniform_noise_stays_within_half_scale() {
        let noise = Noise::new(NoiseKind::Uniform, Some(2.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        let draws = noise.sample_many(500, &mut rng);

        assert_eq!(draws.len(), 500);
        assert!(draws.iter().all(|d| (-1.0..1.0).contains(d)));
    }

    #[test]
    fn gaussian_noise_is_centred() {
        let noise = Noise::new(NoiseKind::Gauss, Some(0.5)).unwrap();
        let mut rng = StdRng::seed_from_u64(11);

        let draws = noise.sample_many(4000, &mut rng);
        #[allow(clippy::cast_precision_loss)]
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;

        assert!(mean.abs() < 0.05, "mean {mean} too far from zero");
        assert!(draws.iter().any(|d| *d != draws[0]));
    }

    #[test]
    fn zero_scale_gauss_is_silent() {
        let noise = Noise::new(NoiseKind::Gauss, Some(0.0)).unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        assert!(noise.is_noisy());
        assert!(noise.sample_many(10, &mut rng).iter().all(|d| *d == 0.0));
    }

    #[test]
    fn seeded_draws_repeat() {
        let noise = Noise::new(NoiseKind::Gauss, Some(1.0)).unwrap();

        let a = noise.sample_many(5, &mut StdRng::seed_from_u64(42));
        let b = noise.sample_many(5, &mut StdRng::seed_from_u64(42));

        assert_eq!(a, b);
    }
}
