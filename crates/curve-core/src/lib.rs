// crates/curve-core/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(
    missing_docs,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]

//! Combinatorial data model for the curve complex: triangulations,
//! laminations, and first homology.

pub mod b64;
pub mod edge;
pub mod error;
pub mod homology;
pub mod lamination;
pub mod triangulation;
pub mod union_find;
pub mod weight;

pub use edge::{Edge, Triangle};
pub use error::{CurveError, CurveResult};
pub use homology::HomologyClass;
pub use lamination::{ComponentKind, Lamination, LaminationKind};
pub use triangulation::{SurfaceType, Triangulation};
pub use weight::Weight;
