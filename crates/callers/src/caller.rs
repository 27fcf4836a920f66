//! The function-caller protocol.
//!
//! A [`FunctionCaller`] evaluates an objective on behalf of an optimizer. It
//! handles the parts every caller shares: dispatch between single- and
//! multi-fidelity evaluation, observation noise, cost lookup, and candidate
//! fidelity selection.
//!
//! Implementors provide [`FunctionCaller::core`] and may override the hook
//! methods to change how the objective and cost are reached (for example,
//! to map public coordinates into a raw space first). Capabilities that
//! only make sense for some domains, such as candidate generation and the
//! information gap, fail with [`Error::NotImplemented`] unless overridden.

mod state;


use std::collections::BTreeMap;

use mfcall_core::{EuclideanDomain, Optimum, Point, Query, QueryRecord};

use crate::Error;

pub use state::{CallerCore, Mode, MultiFidelity};

/// Evaluates an objective, possibly at different fidelities.
pub trait FunctionCaller {
    /// Returns the state shared by all callers.
    fn core(&self) -> &CallerCore;

    // Hooks ------------------------------------------------------------------

    /// Returns the noiseless objective value at `point`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSingleFidelity`] on a multi-fidelity caller.
    fn true_val_at_point(&self, point: &Point) -> Result<f64, Error> {
        let func = self.core().objective()?;
        Ok(func.call(&point.clone().into_dyn()))
    }

    /// Returns the noiseless objective value at `point` using `fidel`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMultiFidelity`] on a single-fidelity caller.
    fn true_val_at_fidel_point(&self, fidel: &Point, point: &Point) -> Result<f64, Error> {
        let mf = self.core().multi_fidelity()?;
        Ok(mf
            .objective()
            .call(&fidel.clone().into_dyn(), &point.clone().into_dyn()))
    }

    /// Returns the cost of one evaluation at `fidel`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMultiFidelity`] on a single-fidelity caller.
    fn true_cost_at_fidel(&self, fidel: &Point) -> Result<f64, Error> {
        let mf = self.core().multi_fidelity()?;
        Ok(mf.cost_function().cost(&fidel.clone().into_dyn()))
    }

    /// Returns candidate fidelities at `domain_point`.
    ///
    /// Called by [`FunctionCaller::get_candidate_fidels`] after the caller
    /// has been checked to be multi-fidelity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotImplemented`] unless overridden.
    fn child_candidate_fidels(
        &self,
        _domain_point: &Point,
        _filter_by_cost: bool,
    ) -> Result<Vec<Point>, Error> {
        Err(Error::NotImplemented("candidate fidelity generation"))
    }

    /// Returns how far each fidelity is from the target fidelity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotImplemented`] unless overridden.
    fn get_information_gap(&self, _fidels: &[Point]) -> Result<Vec<f64>, Error> {
        Err(Error::NotImplemented("information gap"))
    }

    /// Returns true if `fidel` is the target fidelity.
    ///
    /// Compares for exact equality unless overridden.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMultiFidelity`] on a single-fidelity caller.
    fn is_fidel_to_opt(&self, fidel: &Point) -> Result<bool, Error> {
        let mf = self.core().multi_fidelity()?;
        Ok(fidel == mf.fidel_to_opt())
    }

    // Properties -------------------------------------------------------------

    /// Returns the caller's label.
    fn descr(&self) -> &str {
        self.core().descr()
    }

    /// Returns the public domain.
    fn domain(&self) -> &EuclideanDomain {
        self.core().domain()
    }

    /// Returns the known optima in public coordinates.
    fn optimum(&self) -> &Optimum {
        self.core().optimum()
    }

    /// Returns the public fidelity space, if multi-fidelity.
    fn fidel_space(&self) -> Option<&EuclideanDomain> {
        self.core()
            .multi_fidelity()
            .ok()
            .map(MultiFidelity::fidel_space)
    }

    /// Returns the target fidelity in public coordinates, if multi-fidelity.
    fn fidel_to_opt(&self) -> Option<&Point> {
        self.core()
            .multi_fidelity()
            .ok()
            .map(MultiFidelity::fidel_to_opt)
    }

    /// Returns true if observations are perturbed by noise.
    fn is_noisy(&self) -> bool {
        self.core().is_noisy()
    }

    /// Returns true if this is a multi-fidelity caller.
    fn is_mf(&self) -> bool {
        self.core().is_mf()
    }

    // Evaluation -------------------------------------------------------------

    /// Evaluates the objective at `point`.
    ///
    /// On a multi-fidelity caller this evaluates at the target fidelity.
    /// Pass `noisy = false` to get the noiseless value from a noisy caller.
    /// If `qinfo` is given it is repopulated and returned, keeping its
    /// annotations.
    ///
    /// # Errors
    ///
    /// Returns an error if a hook fails.
    fn eval_single(
        &self,
        point: &Point,
        qinfo: Option<QueryRecord>,
        noisy: bool,
    ) -> Result<(f64, QueryRecord), Error> {
        let core = self.core();
        if let Mode::Multi(mf) = core.mode() {
            return self.eval_at_fidel_single(mf.fidel_to_opt(), point, qinfo, noisy);
        }

        let true_val = self.true_val_at_point(point)?;
        let val = core.observe(true_val, noisy);
        tracing::trace!(descr = core.descr(), true_val, val, "evaluated point");

        let record =
            QueryRecord::domain(point.clone(), true_val, val).with_annotations(annotations(qinfo));
        Ok((val, record))
    }

    /// Evaluates the objective at each point, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if `qinfos` and `points` differ in
    /// length, or the first error from [`FunctionCaller::eval_single`].
    fn eval_multiple(
        &self,
        points: &[Point],
        qinfos: Option<Vec<QueryRecord>>,
        noisy: bool,
    ) -> Result<(Vec<f64>, Vec<QueryRecord>), Error> {
        let slots = record_slots(qinfos, points.len())?;
        let mut vals = Vec::with_capacity(points.len());
        let mut records = Vec::with_capacity(points.len());
        for (point, qinfo) in points.iter().zip(slots) {
            let (val, record) = self.eval_single(point, qinfo, noisy)?;
            vals.push(val);
            records.push(record);
        }
        Ok((vals, records))
    }

    /// Evaluates the objective at `point` using fidelity `fidel`.
    ///
    /// The record carries the fidelity and the cost of evaluating at it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMultiFidelity`] on a single-fidelity caller, or
    /// an error from a hook.
    fn eval_at_fidel_single(
        &self,
        fidel: &Point,
        point: &Point,
        qinfo: Option<QueryRecord>,
        noisy: bool,
    ) -> Result<(f64, QueryRecord), Error> {
        let core = self.core();
        core.multi_fidelity()?;

        let true_val = self.true_val_at_fidel_point(fidel, point)?;
        let cost_at_fidel = self.true_cost_at_fidel(fidel)?;
        let val = core.observe(true_val, noisy);
        tracing::trace!(
            descr = core.descr(),
            true_val,
            val,
            cost_at_fidel,
            "evaluated point at fidelity"
        );

        let record = QueryRecord::fidelity(fidel.clone(), point.clone(), true_val, val, cost_at_fidel)
            .with_annotations(annotations(qinfo));
        Ok((val, record))
    }

    /// Evaluates the objective at each `(fidel, point)` pair, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LengthMismatch`] if the inputs differ in length, or
    /// the first error from [`FunctionCaller::eval_at_fidel_single`].
    fn eval_at_fidel_multiple(
        &self,
        fidels: &[Point],
        points: &[Point],
        qinfos: Option<Vec<QueryRecord>>,
        noisy: bool,
    ) -> Result<(Vec<f64>, Vec<QueryRecord>), Error> {
        if fidels.len() != points.len() {
            return Err(Error::LengthMismatch {
                expected: points.len(),
                found: fidels.len(),
            });
        }
        let slots = record_slots(qinfos, points.len())?;
        let mut vals = Vec::with_capacity(points.len());
        let mut records = Vec::with_capacity(points.len());
        for ((fidel, point), qinfo) in fidels.iter().zip(points).zip(slots) {
            let (val, record) = self.eval_at_fidel_single(fidel, point, qinfo, noisy)?;
            vals.push(val);
            records.push(record);
        }
        Ok((vals, records))
    }

    /// Evaluates a pending query and returns a fresh record.
    ///
    /// # Errors
    ///
    /// Returns any error from the evaluation the query dispatches to.
    fn eval_from_query(&self, query: &Query, noisy: bool) -> Result<QueryRecord, Error> {
        let (_, record) = match query {
            Query::Domain { point } => self.eval_single(point, None, noisy)?,
            Query::Fidelity { fidel, point } => {
                self.eval_at_fidel_single(fidel, point, None, noisy)?
            }
        };
        Ok(record)
    }

    /// Re-evaluates the query held by `qinfo`, keeping its annotations.
    ///
    /// A record with a fidelity is evaluated at that fidelity; a record
    /// without one goes through [`FunctionCaller::eval_single`].
    ///
    /// # Errors
    ///
    /// Returns any error from the evaluation the query dispatches to.
    fn eval_from_qinfo(&self, qinfo: QueryRecord, noisy: bool) -> Result<QueryRecord, Error> {
        let (query, annotations) = qinfo.into_parts();
        let record = self.eval_from_query(&query, noisy)?;
        Ok(record.with_annotations(annotations))
    }

    // Cost -------------------------------------------------------------------

    /// Returns the cost of one evaluation at `fidel`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMultiFidelity`] on a single-fidelity caller.
    fn cost_single(&self, fidel: &Point) -> Result<f64, Error> {
        self.true_cost_at_fidel(fidel)
    }

    /// Returns the cost of one evaluation at each fidelity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMultiFidelity`] on a single-fidelity caller.
    fn cost_multiple(&self, fidels: &[Point]) -> Result<Vec<f64>, Error> {
        fidels.iter().map(|fidel| self.cost_single(fidel)).collect()
    }

    /// Returns `cost(numerator) / cost(denominator)`.
    ///
    /// The denominator defaults to the target fidelity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMultiFidelity`] on a single-fidelity caller.
    fn cost_ratio_single(
        &self,
        numerator: &Point,
        denominator: Option<&Point>,
    ) -> Result<f64, Error> {
        let denominator = match denominator {
            Some(fidel) => fidel,
            None => self.core().multi_fidelity()?.fidel_to_opt(),
        };
        Ok(self.cost_single(numerator)? / self.cost_single(denominator)?)
    }

    /// Returns the cost ratio of each numerator against one denominator.
    ///
    /// The denominator defaults to the target fidelity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMultiFidelity`] on a single-fidelity caller.
    fn cost_ratio_multiple(
        &self,
        numerators: &[Point],
        denominator: Option<&Point>,
    ) -> Result<Vec<f64>, Error> {
        let denominator = match denominator {
            Some(fidel) => fidel,
            None => self.core().multi_fidelity()?.fidel_to_opt(),
        };
        let denom_cost = self.cost_single(denominator)?;
        Ok(self
            .cost_multiple(numerators)?
            .into_iter()
            .map(|cost| cost / denom_cost)
            .collect())
    }

    // Candidate fidelities ---------------------------------------------------

    /// Returns candidate fidelities at `domain_point`.
    ///
    /// With `filter_by_cost`, only fidelities cheaper than the target are
    /// kept. The target fidelity is always included.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotMultiFidelity`] on a single-fidelity caller, or
    /// [`Error::NotImplemented`] if the caller cannot generate candidates.
    fn get_candidate_fidels(
        &self,
        domain_point: &Point,
        filter_by_cost: bool,
    ) -> Result<Vec<Point>, Error> {
        self.core().multi_fidelity()?;
        self.child_candidate_fidels(domain_point, filter_by_cost)
    }

    /// Returns candidate fidelities with their cost ratios to the target.
    ///
    /// With `filter_by_cost`, only candidates with a ratio below `1.0` are
    /// kept, and the target fidelity is appended last with ratio `1.0`.
    ///
    /// # Errors
    ///
    /// Returns any error from [`FunctionCaller::get_candidate_fidels`] or
    /// the cost lookups.
    fn get_candidate_fidels_and_cost_ratios(
        &self,
        domain_point: &Point,
        filter_by_cost: bool,
    ) -> Result<(Vec<Point>, Vec<f64>), Error> {
        let candidates = self.get_candidate_fidels(domain_point, false)?;
        let ratios = self.cost_ratio_multiple(&candidates, None)?;
        if !filter_by_cost {
            return Ok((candidates, ratios));
        }

        let fidel_to_opt = self.core().multi_fidelity()?.fidel_to_opt().clone();
        let (mut kept, mut kept_ratios): (Vec<_>, Vec<_>) = candidates
            .into_iter()
            .zip(ratios)
            .filter(|(_, ratio)| *ratio < 1.0)
            .unzip();
        kept.push(fidel_to_opt);
        kept_ratios.push(1.0);
        Ok((kept, kept_ratios))
    }
}

/// Takes the annotations out of a record passed in for reuse.
fn annotations(qinfo: Option<QueryRecord>) -> BTreeMap<String, f64> {
    qinfo.map(|record| record.into_parts().1).unwrap_or_default()
}

/// Pairs each input with an optional record, checking lengths.
fn record_slots(
    qinfos: Option<Vec<QueryRecord>>,
    len: usize,
) -> Result<Vec<Option<QueryRecord>>, Error> {
    match qinfos {
        None => Ok(std::iter::repeat_with(|| None).take(len).collect()),
        Some(qinfos) if qinfos.len() == len => Ok(qinfos.into_iter().map(Some).collect()),
        Some(qinfos) => Err(Error::LengthMismatch {
            expected: len,
            found: qinfos.len(),
        }),
    }
}
