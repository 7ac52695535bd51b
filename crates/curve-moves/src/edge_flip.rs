//! Pachner 2-2 flips.

use std::rc::Rc;

use curve_core::{CurveError, CurveResult, Edge, HomologyClass, Lamination, Triangulation, Weight};

/// The change to a triangulation (and to laminations/homology passing
/// through it) caused by flipping one flippable edge.
#[derive(Clone, Debug)]
pub struct EdgeFlip {
    source: Rc<Triangulation>,
    target: Rc<Triangulation>,
    edge: Edge,
    square: [Edge; 4],
}

impl EdgeFlip {
    /// Build the flip of `edge` in `source`. Fails with
    /// [`CurveError::PreconditionViolated`] if `edge` is not flippable.
    pub fn new(source: Rc<Triangulation>, edge: Edge) -> CurveResult<Self> {
        let square = source.square(edge)?;
        let target = Rc::new(Self::flipped_triangulation(&source, edge, square)?);
        Ok(Self {
            source,
            target,
            edge,
            square,
        })
    }

    fn flipped_triangulation(
        source: &Triangulation,
        edge: Edge,
        square: [Edge; 4],
    ) -> CurveResult<Triangulation> {
        let [a, b, c, d] = square;
        // The positive representative of `edge` always borders the new
        // triangle with `(d, a)`; its inverse always borders `(b, c)`,
        // independent of which orientation of the edge was flipped.
        let positive = Edge::new(edge.index());
        let labels: Vec<[i64; 3]> = source
            .triangles()
            .iter()
            .filter(|t| !t.contains(edge) && !t.contains(edge.inverse()))
            .map(|t| t.edges().map(Edge::label))
            .chain([
                [positive.label(), d.label(), a.label()],
                [positive.inverse().label(), b.label(), c.label()],
            ])
            .collect();
        Triangulation::from_labels(&labels)
    }

    #[must_use]
    pub(crate) fn source(&self) -> &Rc<Triangulation> {
        &self.source
    }

    #[must_use]
    pub(crate) fn target(&self) -> &Rc<Triangulation> {
        &self.target
    }

    /// The edge being flipped, in `source`.
    #[must_use]
    pub fn edge(&self) -> Edge {
        self.edge
    }

    /// Bell's nine-case formula for how a lamination's weight on the
    /// flipped edge transforms (Lemma 5.1.3 of the reference text).
    pub(crate) fn apply_lamination(&self, lamination: &Lamination) -> CurveResult<Lamination> {
        let ei = lamination.get(self.edge);
        let [a, b, c, d] = self.square;
        let ai0 = clamp(lamination.get(a));
        let bi0 = clamp(lamination.get(b));
        let ci0 = clamp(lamination.get(c));
        let di0 = clamp(lamination.get(d));

        let zero = Weight::from(0);
        let two = Weight::from(2);

        let new_value = if ei >= &ai0 + &bi0 && ai0 >= di0 && bi0 >= ci0 {
            &ai0 + &bi0 - &ei
        } else if ei >= &ci0 + &di0 && di0 >= ai0 && ci0 >= bi0 {
            &ci0 + &di0 - &ei
        } else if ei <= zero && ai0 >= bi0 && di0 >= ci0 {
            &ai0 + &di0 - &ei
        } else if ei <= zero && bi0 >= ai0 && ci0 >= di0 {
            &bi0 + &ci0 - &ei
        } else if ei >= zero && ai0 >= &bi0 + &ei && di0 >= &ci0 + &ei {
            &ai0 + &di0 - &two * &ei
        } else if ei >= zero && bi0 >= &ai0 + &ei && ci0 >= &di0 + &ei {
            &bi0 + &ci0 - &two * &ei
        } else if &ai0 + &bi0 >= ei
            && &bi0 + &ei >= &two * &ci0 + &ai0
            && &ai0 + &ei >= &two * &di0 + &bi0
        {
            curve_core::weight::half(&(&ai0 + &bi0 - &ei))
        } else if &ci0 + &di0 >= ei
            && &di0 + &ei >= &two * &ai0 + &ci0
            && &ci0 + &ei >= &two * &bi0 + &di0
        {
            curve_core::weight::half(&(&ci0 + &di0 - &ei))
        } else {
            std::cmp::max(&ai0 + &ci0, &bi0 + &di0) - &ei
        };

        let mut geometric = lamination.geometric().to_vec();
        geometric[self.edge.index() as usize] = new_value;
        Lamination::new(Rc::clone(&self.target), geometric)
    }

    pub(crate) fn apply_homology(&self, homology: &HomologyClass) -> CurveResult<HomologyClass> {
        let [a, b, _c, _d] = self.square;
        let e = self.edge;
        let mut algebraic = homology.algebraic().to_vec();
        let e_value = homology.get(e);
        algebraic[a.index() as usize] -= Weight::from(a.sign()) * &e_value;
        algebraic[b.index() as usize] -= Weight::from(b.sign()) * &e_value;
        algebraic[e.index() as usize] = Weight::from(0);
        HomologyClass::new(Rc::clone(&self.target), algebraic)
    }

    #[must_use]
    pub(crate) fn inverse(&self) -> Self {
        let edge = self.edge.inverse();
        let square = self
            .target
            .square(edge)
            .expect("flipping back is always valid on the flipped triangulation");
        Self {
            source: Rc::clone(&self.target),
            target: Rc::clone(&self.source),
            edge,
            square,
        }
    }
}

fn clamp(w: Weight) -> Weight {
    curve_core::weight::clamp_nonneg(&w)
}

/// A set of flippable edges with pairwise disjoint supporting triangles,
/// applied simultaneously.
#[derive(Clone, Debug)]
pub struct MultiEdgeFlip {
    flips: Vec<EdgeFlip>,
    source: Rc<Triangulation>,
    target: Rc<Triangulation>,
}

impl MultiEdgeFlip {
    /// Build a simultaneous flip of `edges`. Fails with
    /// [`CurveError::PreconditionViolated`] if any two edges share a
    /// supporting triangle.
    pub fn new(source: Rc<Triangulation>, edges: &[Edge]) -> CurveResult<Self> {
        let mut seen_triangles = std::collections::HashSet::new();
        for &e in edges {
            for corner in [source.corner(e)?, source.corner(e.inverse())?] {
                if !seen_triangles.insert(corner.map(Edge::label)) {
                    return Err(CurveError::PreconditionViolated(
                        "multi-flip edges do not have disjoint supporting triangles".into(),
                    ));
                }
            }
        }

        // Flips are independent (disjoint support), so folding them through
        // a running triangulation and composing one-at-a-time is valid and
        // yields the same target regardless of order.
        let mut current = Rc::clone(&source);
        let mut flips = Vec::with_capacity(edges.len());
        for &e in edges {
            let flip = EdgeFlip::new(Rc::clone(&current), e)?;
            current = Rc::clone(flip.target());
            flips.push(flip);
        }
        let target = current;
        Ok(Self {
            flips,
            source,
            target,
        })
    }

    #[must_use]
    pub(crate) fn source(&self) -> &Rc<Triangulation> {
        &self.source
    }

    #[must_use]
    pub(crate) fn target(&self) -> &Rc<Triangulation> {
        &self.target
    }

    /// The individual flips making up this simultaneous flip, in application order.
    #[must_use]
    pub(crate) fn flips(&self) -> &[EdgeFlip] {
        &self.flips
    }

    pub(crate) fn apply_lamination(&self, lamination: &Lamination) -> CurveResult<Lamination> {
        let mut current = lamination.clone();
        for flip in &self.flips {
            current = flip.apply_lamination(&current)?;
        }
        Ok(current)
    }

    pub(crate) fn apply_homology(&self, homology: &HomologyClass) -> CurveResult<HomologyClass> {
        let mut current = homology.clone();
        for flip in &self.flips {
            current = flip.apply_homology(&current)?;
        }
        Ok(current)
    }

    #[must_use]
    pub(crate) fn inverse(&self) -> Self {
        let flips: Vec<EdgeFlip> = self.flips.iter().rev().map(EdgeFlip::inverse).collect();
        Self {
            flips,
            source: Rc::clone(&self.target),
            target: Rc::clone(&self.source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_punctured_torus() -> Rc<Triangulation> {
        Rc::new(Triangulation::from_labels(&[[0, 1, 2], [!0, !1, !2]]).unwrap())
    }

    #[test]
    fn flip_then_inverse_flip_is_identity_on_triangulations() {
        let t = one_punctured_torus();
        let e = t
            .labels()
            .into_iter()
            .map(Edge::new)
            .find(|&e| t.is_flippable(e).unwrap())
            .expect("some edge is flippable");
        let flip = EdgeFlip::new(Rc::clone(&t), e).unwrap();
        let back = flip.inverse();
        assert_eq!(back.target(), &t);
    }
}
