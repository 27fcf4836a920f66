//! Function callers for single- and multi-fidelity black-box optimization.
//!
//! A function caller sits between an optimizer and an expensive objective.
//! Optimizers ask it for values at points (and, for multi-fidelity
//! objectives, at cheaper approximations), and the caller takes care of
//! observation noise, evaluation cost, and the bookkeeping that goes into a
//! [`QueryRecord`].
//!
//! - [`FunctionCaller`]: the protocol every caller implements
//! - [`BaseCaller`]: passes coordinates to the objective unchanged
//! - [`EuclideanCaller`]: exposes a box-bounded objective on the unit cube
//!   and generates candidate fidelities
//! - [`Noise`]: the observation noise a caller adds
//!
//! # Example
//!
//! ```
//! use mfcall_callers::{EuclideanCaller, EuclideanConfig, FunctionCaller};
//! use mfcall_core::EuclideanDomain;
//! use ndarray::{ArrayD, array};
//!
//! let domain = EuclideanDomain::new(vec![[0.0, 10.0]]).unwrap();
//! let caller =
//!     EuclideanCaller::single(|x: &ArrayD<f64>| x.sum(), domain, EuclideanConfig::default())
//!         .unwrap();
//!
//! // Public coordinates live on the unit interval.
//! let (val, record) = caller.eval_single(&array![0.5], None, true).unwrap();
//! assert_eq!(val, 5.0);
//! assert_eq!(record.point(), &array![0.5]);
//! ```

mod base;
mod caller;
mod config;
mod error;
mod euclidean;
pub mod noise;

pub use base::{BaseCaller, FidelityParts, ObjectiveFn};
pub use caller::{CallerCore, FunctionCaller, Mode, MultiFidelity};
pub use config::CallerConfig;
pub use error::{ConfigError, Error};
pub use euclidean::{EuclideanCaller, EuclideanConfig};
pub use noise::{Noise, NoiseKind};

pub use mfcall_core::{
    CostFunction, EVAL_ERROR, EuclideanDomain, FidelObjective, Objective, Optimum, Point, Query,
    QueryRecord, is_eval_error,
};
