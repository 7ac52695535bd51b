//! The error taxonomy shared by every crate in the workspace.
//!
//! Variant *kind* (not the Rust type name) is what downstream callers are
//! expected to match on: malformed input, a violated precondition, a
//! configuration the core does not yet handle, or a request that simply does
//! not apply to the object in hand. `Internal` is reserved for invariant
//! violations; surfacing one is a bug in this crate, not in the caller.

use thiserror::Error;

/// Errors surfaced at the boundary of the curve-complex core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CurveError {
    /// Malformed labels, a weight vector of the wrong length, a non-flippable
    /// edge passed to `flip`, and similar structural problems.
    #[error("bad input: {0}")]
    BadInput(String),

    /// The operation requires a short curve/arc, a non-peripheral component, a
    /// non-isolating curve, or a vertex-distinct arc, and the argument does
    /// not satisfy it.
    #[error("precondition violated: {0}")]
    PreconditionViolated(String),

    /// A configuration the core does not (yet) handle, such as crushing an
    /// isolating curve.
    #[error("unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// The requested property does not apply to the object in hand (e.g. a
    /// trace that fails to close, or a pseudo-Anosov-only query on a
    /// reducible class).
    #[error("not applicable: {0}")]
    NotApplicable(String),

    /// An internal invariant was violated. Indicates a bug in this crate, not
    /// a user error; callers should treat this the way they would a panic.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

/// The result type used throughout the curve-complex core.
pub type CurveResult<T> = Result<T, CurveError>;
