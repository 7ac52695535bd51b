// crates/curve-shorten/src/lib.rs

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

//! The shortening engine (C5): drives a lamination to a short representative
//! via an explicit-stack flip/vertex-sweep loop, and the lamination-level
//! operations (`components`, `intersection`, `boundary`, `is_filling`, ...)
//! that are themselves defined in terms of shortening.

pub mod engine;

pub use engine::{
    boundary, components, equivalent, intersection, is_filling, is_polygonalisation, mcomponents, order,
    shorten, ShorteningConfig,
};
