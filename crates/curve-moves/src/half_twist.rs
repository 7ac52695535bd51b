//! Half twists about short arcs joining distinct punctures.

use std::rc::Rc;

use curve_core::{CurveError, CurveResult, Edge, HomologyClass, Lamination, Triangulation};

use crate::encoding::Encoding;
use crate::twist::build_twist_encoding;

/// A power of the half twist about a short arc.
///
/// A half twist squared is the full Dehn twist about the arc's boundary
/// curve, built the same way as [`crate::twist::Twist`]: one flip-chain
/// step plus a closing isometry. That relation is exactly the
/// acceleration this type applies: `|power| <= 1` is a single step, an
/// even power is `power / 2` repetitions of the squared (one-step)
/// encoding composed with itself, and an odd power adds one further
/// single step on top. Since squaring the arc's own one-step encoding
/// already realises the boundary twist's one-step encoding, no separate
/// boundary curve needs to be constructed.
#[derive(Clone, Debug)]
pub struct HalfTwist {
    triangulation: Rc<Triangulation>,
    arc: Lamination,
    parallel: Edge,
    power: i64,
    encoding: Encoding,
}

impl HalfTwist {
    /// Build the `power`-th power of the half twist about `arc`. `arc`
    /// must be short; `power` must be non-zero.
    pub fn new(arc: Lamination, power: i64) -> CurveResult<Self> {
        if power == 0 {
            return Err(CurveError::PreconditionViolated(
                "half-twist power must be non-zero".into(),
            ));
        }
        if !arc.is_short()? {
            return Err(CurveError::PreconditionViolated("half-twist arc must be short".into()));
        }
        let triangulation = Rc::clone(arc.triangulation());
        let parallel = arc.parallel_edge()?;
        let encoding = build_twist_encoding(&triangulation, &arc, parallel)?;
        Ok(Self {
            triangulation,
            arc,
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

    /// The label of the edge this half twist's arc is parallel to.
    #[must_use]
    pub fn parallel_label(&self) -> i64 {
        self.parallel.label()
    }

    /// The half twist's signed power.
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

    /// The pair (full boundary-twist steps, trailing half-twist steps)
    /// realising `|power|` single steps: `boundary_steps` applications of
    /// the squared (one-step) encoding, followed by `remainder`
    /// applications (0 or 1) of the plain one-step encoding.
    fn acceleration(&self) -> (u64, u64) {
        let magnitude = self.power.unsigned_abs();
        (magnitude / 2, magnitude % 2)
    }

    pub(crate) fn apply_lamination(&self, lamination: &Lamination) -> CurveResult<Lamination> {
        let step = self.signed_encoding();
        let squared = step.compose(&step)?;
        let (boundary_steps, remainder) = self.acceleration();
        let mut current = lamination.clone();
        for _ in 0..boundary_steps {
            current = squared.apply_lamination(&current)?;
        }
        for _ in 0..remainder {
            current = step.apply_lamination(&current)?;
        }
        Ok(current)
    }

    pub(crate) fn apply_homology(&self, homology: &HomologyClass) -> CurveResult<HomologyClass> {
        let step = self.signed_encoding();
        let squared = step.compose(&step)?;
        let (boundary_steps, remainder) = self.acceleration();
        let mut current = homology.clone();
        for _ in 0..boundary_steps {
            current = squared.apply_homology(&current)?;
        }
        for _ in 0..remainder {
            current = step.apply_homology(&current)?;
        }
        Ok(current)
    }

    #[must_use]
    pub(crate) fn inverse(&self) -> Self {
        Self {
            triangulation: Rc::clone(&self.triangulation),
            arc: self.arc.clone(),
            parallel: self.parallel,
            power: -self.power,
            encoding: self.encoding.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve_core::Weight;

    fn one_punctured_torus() -> Rc<Triangulation> {
        Rc::new(Triangulation::from_labels(&[[0, 1, 2], [!0, !1, !2]]).unwrap())
    }

    #[test]
    fn zero_power_is_rejected_before_any_shortness_check() {
        let t = one_punctured_torus();
        let arc = Lamination::new(Rc::clone(&t), vec![Weight::from(0); 3]).unwrap();
        assert!(matches!(
            HalfTwist::new(arc, 0),
            Err(CurveError::PreconditionViolated(_))
        ));
    }
}
