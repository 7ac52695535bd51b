//! The closed algebra of elementary moves between triangulations.

use std::rc::Rc;

use curve_core::{CurveResult, HomologyClass, Lamination, Triangulation};

use crate::crush::{Crush, Lift};
use crate::edge_flip::{EdgeFlip, MultiEdgeFlip};
use crate::half_twist::HalfTwist;
use crate::isometry::Isometry;
use crate::twist::Twist;

/// A single elementary move from one triangulation to another, carrying
/// enough data to push laminations and homology classes through it.
///
/// This is a closed sum type rather than a trait object: the move algebra
/// is fixed (it is exactly the seven kinds below), so dispatch by `match`
/// keeps every case total and avoids an unnecessary `Box<dyn Trait>`
/// indirection.
#[derive(Clone, Debug)]
pub enum Move {
    /// A label-preserving bijection between triangulations.
    Isometry(Isometry),
    /// A single Pachner 2-2 flip.
    EdgeFlip(EdgeFlip),
    /// A set of disjoint simultaneous flips.
    MultiEdgeFlip(MultiEdgeFlip),
    /// A Dehn twist about a short non-peripheral curve.
    Twist(Twist),
    /// A half twist about a short arc joining distinct punctures.
    HalfTwist(HalfTwist),
    /// Collapse of a weight-2 non-isolating curve's annulus.
    Crush(Crush),
    /// The inverse of a `Crush`.
    Lift(Lift),
}

impl Move {
    /// The triangulation this move starts from.
    #[must_use]
    pub fn source(&self) -> &Rc<Triangulation> {
        match self {
            Self::Isometry(m) => m.source(),
            Self::EdgeFlip(m) => m.source(),
            Self::MultiEdgeFlip(m) => m.source(),
            Self::Twist(m) => m.source(),
            Self::HalfTwist(m) => m.source(),
            Self::Crush(m) => m.source(),
            Self::Lift(m) => m.source(),
        }
    }

    /// The triangulation this move lands on.
    #[must_use]
    pub fn target(&self) -> &Rc<Triangulation> {
        match self {
            Self::Isometry(m) => m.target(),
            Self::EdgeFlip(m) => m.target(),
            Self::MultiEdgeFlip(m) => m.target(),
            Self::Twist(m) => m.target(),
            Self::HalfTwist(m) => m.target(),
            Self::Crush(m) => m.target(),
            Self::Lift(m) => m.target(),
        }
    }

    /// Push a lamination defined on `source()` through this move.
    pub fn apply_lamination(&self, lamination: &Lamination) -> CurveResult<Lamination> {
        match self {
            Self::Isometry(m) => m.apply_lamination(lamination),
            Self::EdgeFlip(m) => m.apply_lamination(lamination),
            Self::MultiEdgeFlip(m) => m.apply_lamination(lamination),
            Self::Twist(m) => m.apply_lamination(lamination),
            Self::HalfTwist(m) => m.apply_lamination(lamination),
            Self::Crush(m) => m.apply_lamination(lamination),
            Self::Lift(m) => m.apply_lamination(lamination),
        }
    }

    /// Push a homology class defined on `source()` through this move.
    pub fn apply_homology(&self, homology: &HomologyClass) -> CurveResult<HomologyClass> {
        match self {
            Self::Isometry(m) => m.apply_homology(homology),
            Self::EdgeFlip(m) => m.apply_homology(homology),
            Self::MultiEdgeFlip(m) => m.apply_homology(homology),
            Self::Twist(m) => m.apply_homology(homology),
            Self::HalfTwist(m) => m.apply_homology(homology),
            Self::Crush(m) => m.apply_homology(homology),
            Self::Lift(m) => m.apply_homology(homology),
        }
    }

    /// This move's inverse, `target() -> source()`.
    #[must_use]
    pub fn inverse(&self) -> Self {
        match self {
            Self::Isometry(m) => Self::Isometry(m.inverse()),
            Self::EdgeFlip(m) => Self::EdgeFlip(m.inverse()),
            Self::MultiEdgeFlip(m) => Self::MultiEdgeFlip(m.inverse()),
            Self::Twist(m) => Self::Twist(m.inverse()),
            Self::HalfTwist(m) => Self::HalfTwist(m.inverse()),
            Self::Crush(m) => Self::Lift(m.inverse()),
            Self::Lift(m) => Self::Crush(m.inverse()),
        }
    }
}
