use mfcall_core::DomainError;
use thiserror::Error;

/// Errors that can occur when using a function caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A fidelity-specific operation was called on a single-fidelity caller.
    #[error("function caller `{descr}` is not a multi-fidelity caller; use eval_single or eval_multiple")]
    NotMultiFidelity { descr: String },

    /// A single-fidelity operation was called on a multi-fidelity caller.
    #[error("function caller `{descr}` is a multi-fidelity caller; evaluate through a fidelity")]
    NotSingleFidelity { descr: String },

    /// The caller does not provide this capability.
    #[error("{0} is not implemented for this caller")]
    NotImplemented(&'static str),

    /// Parallel inputs (points, fidelities, records) have different lengths.
    #[error("expected {expected} entries, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
}

/// Errors that can occur when constructing a function caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("fidel_space, fidel_cost_func, and fidel_to_opt must all be set or all be unset")]
    PartialMultiFidelity,

    #[error("objective signature does not match the fidelity configuration")]
    ObjectiveMismatch,

    #[error("noise kind `{0}` is not implemented")]
    UnsupportedNoise(String),

    #[error("noise scale must be given, finite, and non-negative")]
    NoiseScale,

    #[error("invalid domain: {0}")]
    Domain(#[from] DomainError),
}
