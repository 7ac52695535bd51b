//! Dehn twists about short, non-peripheral curves.

use std::rc::Rc;

use num_traits::ToPrimitive;

use curve_core::{CurveError, CurveResult, Edge, HomologyClass, Lamination, Triangulation, Weight};

use crate::encoding::Encoding;
use crate::isometry::Isometry;
use crate::move_trait::Move;

/// Build the one-step twist encoding about the edge `a` (assumed to be the
/// edge a short curve/arc is parallel to): flip edges out of the curve's
/// vertex until its weight is exhausted, then close up with the unique
/// isometry back to the starting triangulation.
pub(crate) fn build_twist_encoding(
    triangulation: &Rc<Triangulation>,
    curve: &Lamination,
    a: Edge,
) -> CurveResult<Encoding> {
    let num_flips = (curve.weight() - curve.dual_weight(a))
        .to_u64()
        .ok_or_else(|| CurveError::Internal("twist flip count is negative or overflows u64".into()))?;

    let mut application_order = Vec::new();
    let mut current = Rc::clone(triangulation);
    for _ in 0..num_flips {
        let corner = current.corner(a)?;
        let flip = crate::edge_flip::EdgeFlip::new(Rc::clone(&current), corner[2])?;
        current = Rc::clone(flip.target());
        application_order.push(Move::EdgeFlip(flip));
    }

    let seed = std::iter::once((a.label(), a.label())).collect();
    let label_map = current.find_isometry(triangulation, seed)?;
    let isometry = Isometry::new(Rc::clone(&current), Rc::clone(triangulation), label_map);
    application_order.push(Move::Isometry(isometry));

    Encoding::new(application_order.into_iter().rev().collect())
}

/// A power of the Dehn twist about a short, non-peripheral curve.
#[derive(Clone, Debug)]
pub struct Twist {
    triangulation: Rc<Triangulation>,
    curve: Lamination,
    parallel: Edge,
    power: i64,
    /// The encoding of a single positive twist.
    encoding: Encoding,
}

impl Twist {
    /// Build the `power`-th power of the twist about `curve`. `curve` must
    /// be short and non-peripheral; `power` must be non-zero.
    pub fn new(curve: Lamination, power: i64) -> CurveResult<Self> {
        if power == 0 {
            return Err(CurveError::PreconditionViolated("twist power must be non-zero".into()));
        }
        if !curve.is_short()? {
            return Err(CurveError::PreconditionViolated("twist curve must be short".into()));
        }
        if curve.is_peripheral()? {
            return Err(CurveError::PreconditionViolated(
                "twist curve must not be peripheral".into(),
            ));
        }
        let triangulation = Rc::clone(curve.triangulation());
        let parallel = curve.parallel_edge()?;
        let encoding = build_twist_encoding(&triangulation, &curve, parallel)?;
        Ok(Self {
            triangulation,
            curve,
            parallel,
            power,
            encoding,
        })
    }

    #[must_use]
    pub(crate) fn source(&self) -> &Rc<Triangulation> {
        &self.triangulation
    }

    #[must_use]
    pub(crate) fn target(&self) -> &Rc<Triangulation> {
        &self.triangulation
    }

    /// The label of the edge this twist's curve is parallel to.
    #[must_use]
    pub fn parallel_label(&self) -> i64 {
        self.parallel.label()
    }

    /// The twist's signed power.
    #[must_use]
    pub fn power(&self) -> i64 {
        self.power
    }

    fn signed_encoding(&self) -> Encoding {
        if self.power > 0 {
            self.encoding.clone()
        } else {
            self.encoding.inverse()
        }
    }

    /// Apply this (possibly high) power of the twist by repeating the
    /// single-step encoding `|power|` times. The reference implementation
    /// accelerates this via the twisting curve's slope against the target
    /// lamination; the shortening engine (which owns intersection-number
    /// computation) applies that acceleration when it drives twists during
    /// its main loop, so this method stays a direct, unaccelerated
    /// definition that is always correct to fall back on.
    pub(crate) fn apply_lamination(&self, lamination: &Lamination) -> CurveResult<Lamination> {
        let step = self.signed_encoding();
        let mut current = lamination.clone();
        for _ in 0..self.power.unsigned_abs() {
            current = step.apply_lamination(&current)?;
        }
        Ok(current)
    }

    pub(crate) fn apply_homology(&self, homology: &HomologyClass) -> CurveResult<HomologyClass> {
        let a = self.parallel;
        let v = self.triangulation.vertex_of(a)?;
        let v_edges = Triangulation::cyclic_slice(v, a, a.inverse());

        let mut algebraic = homology.algebraic().to_vec();
        let sum: Weight = v_edges[1..]
            .iter()
            .fold(Weight::from(0), |acc, &e| acc + homology.get(e));
        algebraic[a.index() as usize] += Weight::from(a.sign()) * Weight::from(self.power) * sum;
        HomologyClass::new(Rc::clone(&self.triangulation), algebraic)
    }

    #[must_use]
    pub(crate) fn inverse(&self) -> Self {
        Self {
            triangulation: Rc::clone(&self.triangulation),
            curve: self.curve.clone(),
            parallel: self.parallel,
            power: -self.power,
            encoding: self.encoding.clone(),
        }
    }
}
