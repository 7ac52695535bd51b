// crates/curve-moves/src/lib.rs

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

//! Elementary moves between triangulations (isometries, flips, twists,
//! half twists, crushes) composed into encodings and mapping classes.

pub mod crush;
pub mod edge_flip;
pub mod encoding;
pub mod half_twist;
pub mod isometry;
pub mod mapping;
pub mod move_trait;
pub mod twist;

pub use crush::{Crush, Lift};
pub use edge_flip::{EdgeFlip, MultiEdgeFlip};
pub use encoding::{Encoding, MovePackage};
pub use half_twist::HalfTwist;
pub use isometry::Isometry;
pub use mapping::{Mapping, MappingClass, Promotion};
pub use move_trait::Move;
pub use twist::Twist;
