//! Core types for multi-fidelity function callers.
//!
//! This crate defines the vocabulary that function callers build on:
//!
//! - [`EuclideanDomain`]: a bounded box with unit-cube mapping and membership
//! - [`Objective`], [`FidelObjective`], [`CostFunction`]: opaque callables
//!   supplied by the host
//! - [`EVAL_ERROR`]: the value an objective returns when it fails
//! - [`Query`], [`QueryRecord`]: a pending evaluation and its result
//! - [`Optimum`]: known optima, when the host has them

mod domain;
mod objective;
mod optimum;
mod query;

pub use domain::{DomainError, EuclideanDomain, euclidean_distance};
pub use objective::{CostFunction, EVAL_ERROR, FidelObjective, Objective, is_eval_error};
pub use optimum::Optimum;
pub use query::{Query, QueryRecord};

/// A point in a domain or fidelity space.
pub type Point = ndarray::Array1<f64>;
