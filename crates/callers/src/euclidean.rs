//! A function caller for objectives defined on axis-aligned boxes.
//!
//! [`EuclideanCaller`] wraps an objective whose domain (and, for
//! multi-fidelity objectives, fidelity space) is a [`EuclideanDomain`] in
//! raw units. By default it exposes both spaces to the optimizer as unit
//! hypercubes: points handed to the caller are in `[0, 1]^d`, and are mapped
//! back to raw coordinates before the objective or cost function sees them.
//!
//! On top of the base protocol it adds:
//!
//! - Coordinate mapping between public and raw spaces
//! - A distance-based test for the target fidelity
//! - The information gap of a fidelity, as its normalized distance to the
//!   target
//! - Candidate fidelity generation, by grid or uniform sampling depending on
//!   the fidelity dimension

mod candidates;
mod config;


pub use config::EuclideanConfig;

use mfcall_core::{
    CostFunction, DomainError, EuclideanDomain, FidelObjective, Objective, Optimum, Point,
    euclidean_distance,
};
use ndarray::{ArrayD, Axis};

use crate::{
    CallerConfig, ConfigError, Error,
    caller::{CallerCore, FunctionCaller, MultiFidelity},
};

use candidates::unit_cube_candidates;

/// Fraction of the fidelity space diameter within which a fidelity counts
/// as the target.
const FIDEL_TOL: f64 = 1e-2;

/// A function caller over box-bounded domain and fidelity spaces.
///
/// Public coordinates are unit-cube coordinates when normalization is on,
/// and raw coordinates otherwise. Records, optima, candidates, and the
/// target fidelity returned by the caller are all in public coordinates.
#[derive(Debug)]
pub struct EuclideanCaller {
    core: CallerCore,
    raw_domain: EuclideanDomain,
    raw_fidel_space: Option<EuclideanDomain>,
    raw_fidel_to_opt: Option<Point>,
    raw_optimum: Optimum,
    normalise: bool,
    vectorised: bool,
}

impl EuclideanCaller {
    /// Creates a single-fidelity caller over `raw_domain`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured optimum does not match the
    /// dimension of `raw_domain`.
    pub fn single<O>(
        func: O,
        raw_domain: EuclideanDomain,
        config: EuclideanConfig,
    ) -> Result<Self, ConfigError>
    where
        O: Objective + 'static,
    {
        let domain = public_space(&raw_domain, config.normalise);
        let caller_config = normalised_config(&raw_domain, &config)?;

        Ok(Self {
            core: CallerCore::single(func, domain, caller_config),
            raw_domain,
            raw_fidel_space: None,
            raw_fidel_to_opt: None,
            raw_optimum: config.caller.optimum,
            normalise: config.normalise,
            vectorised: config.vectorised,
        })
    }

    /// Creates a multi-fidelity caller over `raw_domain` and
    /// `raw_fidel_space`.
    ///
    /// `raw_fidel_to_opt` is the fidelity at which `func` equals the true
    /// objective, in raw fidelity coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw_fidel_to_opt` or the configured optimum has
    /// the wrong dimension.
    pub fn multi<F, C>(
        func: F,
        raw_domain: EuclideanDomain,
        raw_fidel_space: EuclideanDomain,
        cost: C,
        raw_fidel_to_opt: Point,
        config: EuclideanConfig,
    ) -> Result<Self, ConfigError>
    where
        F: FidelObjective + 'static,
        C: CostFunction + 'static,
    {
        let domain = public_space(&raw_domain, config.normalise);
        let fidel_space = public_space(&raw_fidel_space, config.normalise);
        let fidel_to_opt = to_public(&raw_fidel_space, &raw_fidel_to_opt, config.normalise)?;
        let mf = MultiFidelity::new(func, fidel_space, cost, fidel_to_opt)?;
        let caller_config = normalised_config(&raw_domain, &config)?;

        Ok(Self {
            core: CallerCore::multi(mf, domain, caller_config),
            raw_domain,
            raw_fidel_space: Some(raw_fidel_space),
            raw_fidel_to_opt: Some(raw_fidel_to_opt),
            raw_optimum: config.caller.optimum,
            normalise: config.normalise,
            vectorised: config.vectorised,
        })
    }

    /// Returns the domain in raw coordinates.
    #[must_use]
    pub fn raw_domain(&self) -> &EuclideanDomain {
        &self.raw_domain
    }

    /// Returns the fidelity space in raw coordinates, if multi-fidelity.
    #[must_use]
    pub fn raw_fidel_space(&self) -> Option<&EuclideanDomain> {
        self.raw_fidel_space.as_ref()
    }

    /// Returns the target fidelity in raw coordinates, if multi-fidelity.
    #[must_use]
    pub fn raw_fidel_to_opt(&self) -> Option<&Point> {
        self.raw_fidel_to_opt.as_ref()
    }

    /// Returns the known optima in raw coordinates.
    #[must_use]
    pub fn raw_optimum(&self) -> &Optimum {
        &self.raw_optimum
    }

    /// Returns true if public coordinates are unit-cube coordinates.
    #[must_use]
    pub fn domain_is_normalised(&self) -> bool {
        self.normalise
    }

    /// Returns true if the objective receives `(d, 1)` columns.
    #[must_use]
    pub fn is_vectorised(&self) -> bool {
        self.vectorised
    }

    /// Returns the diameter of the public fidelity space, if multi-fidelity.
    #[must_use]
    pub fn fidel_space_diam(&self) -> Option<f64> {
        self.fidel_space().map(EuclideanDomain::diameter)
    }

    // Coordinate mapping -----------------------------------------------------

    /// Maps a raw domain point to public coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if `raw` has the wrong dimension.
    pub fn get_normalised_domain_coords(&self, raw: &Point) -> Result<Point, Error> {
        Ok(to_public(&self.raw_domain, raw, self.normalise)?)
    }

    /// Maps a public domain point to raw coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if `point` has the wrong dimension.
    pub fn get_raw_domain_coords(&self, point: &Point) -> Result<Point, Error> {
        Ok(to_raw(&self.raw_domain, point, self.normalise)?)
    }

    /// Maps a raw fidelity to public coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMultiFidelity`] on a single-fidelity caller, or an
    /// error if `raw` has the wrong dimension.
    pub fn get_normalised_fidel_coords(&self, raw: &Point) -> Result<Point, Error> {
        Ok(to_public(self.require_raw_fidel_space()?, raw, self.normalise)?)
    }

    /// Maps a public fidelity to raw coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMultiFidelity`] on a single-fidelity caller, or an
    /// error if `fidel` has the wrong dimension.
    pub fn get_raw_fidel_coords(&self, fidel: &Point) -> Result<Point, Error> {
        Ok(to_raw(self.require_raw_fidel_space()?, fidel, self.normalise)?)
    }

    /// Maps a raw fidelity and a raw domain point to public coordinates.
    ///
    /// Either half may be omitted.
    ///
    /// # Errors
    ///
    /// Returns any error from the individual mappings.
    pub fn get_normalised_fidel_domain_coords(
        &self,
        raw_fidel: Option<&Point>,
        raw_point: Option<&Point>,
    ) -> Result<(Option<Point>, Option<Point>), Error> {
        Ok((
            raw_fidel
                .map(|z| self.get_normalised_fidel_coords(z))
                .transpose()?,
            raw_point
                .map(|x| self.get_normalised_domain_coords(x))
                .transpose()?,
        ))
    }

    /// Maps a public fidelity and a public domain point to raw coordinates.
    ///
    /// Either half may be omitted.
    ///
    /// # Errors
    ///
    /// Returns any error from the individual mappings.
    pub fn get_raw_fidel_domain_coords(
        &self,
        fidel: Option<&Point>,
        point: Option<&Point>,
    ) -> Result<(Option<Point>, Option<Point>), Error> {
        Ok((
            fidel.map(|z| self.get_raw_fidel_coords(z)).transpose()?,
            point.map(|x| self.get_raw_domain_coords(x)).transpose()?,
        ))
    }

    // Helpers ----------------------------------------------------------------

    fn require_raw_fidel_space(&self) -> Result<&EuclideanDomain, Error> {
        self.raw_fidel_space
            .as_ref()
            .ok_or_else(|| Error::NotMultiFidelity {
                descr: self.core.descr().to_owned(),
            })
    }

    /// Maps a public point into the raw domain for evaluation.
    ///
    /// # Panics
    ///
    /// Panics if the raw point lies outside the raw domain.
    fn raw_domain_arg(&self, point: &Point) -> Result<ArrayD<f64>, Error> {
        let raw = self.get_raw_domain_coords(point)?;
        assert!(
            self.raw_domain.is_member(raw.view()),
            "point {raw} is outside the domain of `{}`",
            self.core.descr()
        );
        Ok(self.layout(raw))
    }

    /// Maps a public fidelity into the raw fidelity space for evaluation.
    ///
    /// # Panics
    ///
    /// Panics if the raw fidelity lies outside the raw fidelity space.
    fn raw_fidel_arg(&self, fidel: &Point) -> Result<ArrayD<f64>, Error> {
        let space = self.require_raw_fidel_space()?;
        let raw = to_raw(space, fidel, self.normalise)?;
        assert!(
            space.is_member(raw.view()),
            "fidelity {raw} is outside the fidelity space of `{}`",
            self.core.descr()
        );
        Ok(self.layout(raw))
    }

    fn layout(&self, raw: Point) -> ArrayD<f64> {
        if self.vectorised {
            raw.insert_axis(Axis(1)).into_dyn()
        } else {
            raw.into_dyn()
        }
    }
}

impl FunctionCaller for EuclideanCaller {
    fn core(&self) -> &CallerCore {
        &self.core
    }

    fn true_val_at_point(&self, point: &Point) -> Result<f64, Error> {
        let func = self.core.objective()?;
        let arg = self.raw_domain_arg(point)?;
        Ok(func.call(&arg))
    }

    fn true_val_at_fidel_point(&self, fidel: &Point, point: &Point) -> Result<f64, Error> {
        let mf = self.core.multi_fidelity()?;
        let fidel_arg = self.raw_fidel_arg(fidel)?;
        let point_arg = self.raw_domain_arg(point)?;
        Ok(mf.objective().call(&fidel_arg, &point_arg))
    }

    fn true_cost_at_fidel(&self, fidel: &Point) -> Result<f64, Error> {
        let mf = self.core.multi_fidelity()?;
        let fidel_arg = self.raw_fidel_arg(fidel)?;
        Ok(mf.cost_function().cost(&fidel_arg))
    }

    fn child_candidate_fidels(
        &self,
        _domain_point: &Point,
        filter_by_cost: bool,
    ) -> Result<Vec<Point>, Error> {
        let mf = self.core.multi_fidelity()?;
        let space = mf.fidel_space();

        let unit = self
            .core
            .with_rng(|rng| unit_cube_candidates(space.dim(), rng));
        let mut candidates = if self.normalise {
            unit
        } else {
            unit.iter()
                .map(|c| space.from_unit_cube(c.view()))
                .collect::<Result<Vec<_>, _>>()?
        };
        let generated = candidates.len();

        if filter_by_cost {
            let target_cost = self.cost_single(mf.fidel_to_opt())?;
            let costs = self.cost_multiple(&candidates)?;
            candidates = candidates
                .into_iter()
                .zip(costs)
                .filter(|(_, cost)| *cost < target_cost)
                .map(|(candidate, _)| candidate)
                .collect();
        }
        candidates.push(mf.fidel_to_opt().clone());

        tracing::debug!(
            descr = self.core.descr(),
            dim = space.dim(),
            generated,
            kept = candidates.len(),
            filter_by_cost,
            "generated candidate fidelities"
        );
        Ok(candidates)
    }

    fn get_information_gap(&self, fidels: &[Point]) -> Result<Vec<f64>, Error> {
        let mf = self.core.multi_fidelity()?;
        fidels
            .iter()
            .map(|fidel| distance_to_target(mf, fidel))
            .collect()
    }

    fn is_fidel_to_opt(&self, fidel: &Point) -> Result<bool, Error> {
        let mf = self.core.multi_fidelity()?;
        Ok(distance_to_target(mf, fidel)? < FIDEL_TOL)
    }
}

/// Returns the distance from `fidel` to the target, as a fraction of the
/// fidelity space diameter.
fn distance_to_target(mf: &MultiFidelity, fidel: &Point) -> Result<f64, Error> {
    let space = mf.fidel_space();
    space.check_dim(fidel.len())?;
    Ok(euclidean_distance(fidel.view(), mf.fidel_to_opt().view()) / space.diameter())
}

/// Returns the unit cube of `raw`'s dimension, or `raw` itself.
fn public_space(raw: &EuclideanDomain, normalise: bool) -> EuclideanDomain {
    if normalise {
        EuclideanDomain::unit(raw.dim())
    } else {
        raw.clone()
    }
}

/// Converts the raw optimum in `config` to public coordinates.
fn normalised_config(
    raw_domain: &EuclideanDomain,
    config: &EuclideanConfig,
) -> Result<CallerConfig, ConfigError> {
    let optimum = config
        .caller
        .optimum
        .try_map_points(|p| to_public(raw_domain, p, config.normalise))?;
    Ok(config.caller.clone().with_optimum(optimum))
}

fn to_public(
    raw_space: &EuclideanDomain,
    raw: &Point,
    normalise: bool,
) -> Result<Point, DomainError> {
    if normalise {
        raw_space.to_unit_cube(raw.view())
    } else {
        raw_space.check_dim(raw.len())?;
        Ok(raw.clone())
    }
}

fn to_raw(
    raw_space: &EuclideanDomain,
    point: &Point,
    normalise: bool,
) -> Result<Point, DomainError> {
    if normalise {
        raw_space.from_unit_cube(point.view())
    } else {
        raw_space.check_dim(point.len())?;
        Ok(point.clone())
    }
}
