//! Label-preserving bijections between triangulations.

use std::collections::HashMap;
use std::rc::Rc;

use curve_core::{CurveResult, Edge, HomologyClass, Lamination, Triangulation};

/// A bijection on edge labels carrying `source` to `target`, respecting
/// triangle structure. Built from a full label map (as produced by
/// [`Triangulation::find_isometry`]).
#[derive(Clone, Debug)]
pub struct Isometry {
    source: Rc<Triangulation>,
    target: Rc<Triangulation>,
    label_map: HashMap<i64, i64>,
    inverse_label_map: HashMap<i64, i64>,
}

impl Isometry {
    /// Build an isometry from a full label map. Does not itself validate
    /// that the map respects triangle structure (use
    /// [`Triangulation::find_isometry`] to obtain one that does).
    #[must_use]
    pub fn new(
        source: Rc<Triangulation>,
        target: Rc<Triangulation>,
        label_map: HashMap<i64, i64>,
    ) -> Self {
        let inverse_label_map = label_map.iter().map(|(&k, &v)| (v, k)).collect();
        Self {
            source,
            target,
            label_map,
            inverse_label_map,
        }
    }

    /// The identity isometry on `triangulation`.
    #[must_use]
    pub fn identity(triangulation: &Rc<Triangulation>) -> Self {
        let label_map = triangulation.labels().into_iter().map(|l| (l, l)).collect();
        Self::new(Rc::clone(triangulation), Rc::clone(triangulation), label_map)
    }

    /// `true` iff this isometry fixes every label.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.label_map.iter().all(|(&k, &v)| k == v)
    }

    #[must_use]
    pub(crate) fn source(&self) -> &Rc<Triangulation> {
        &self.source
    }

    #[must_use]
    pub(crate) fn target(&self) -> &Rc<Triangulation> {
        &self.target
    }

    /// The underlying label map, `source` labels to `target` labels.
    #[must_use]
    pub fn label_map(&self) -> &HashMap<i64, i64> {
        &self.label_map
    }

    pub(crate) fn apply_lamination(&self, lamination: &Lamination) -> CurveResult<Lamination> {
        let geometric = self
            .target
            .indices()
            .into_iter()
            .map(|index| {
                let source_label = self.inverse_label_map[&index];
                lamination.get(Edge::new(source_label))
            })
            .collect();
        Lamination::new(Rc::clone(&self.target), geometric)
    }

    pub(crate) fn apply_homology(&self, homology: &HomologyClass) -> CurveResult<HomologyClass> {
        let algebraic = self
            .target
            .indices()
            .into_iter()
            .map(|index| {
                let source_label = self.inverse_label_map[&index];
                let source_edge = Edge::new(source_label);
                let value = homology.algebraic()[source_edge.index() as usize].clone();
                if source_edge.sign() < 0 {
                    -value
                } else {
                    value
                }
            })
            .collect();
        HomologyClass::new(Rc::clone(&self.target), algebraic)
    }

    #[must_use]
    pub(crate) fn inverse(&self) -> Self {
        Self {
            source: Rc::clone(&self.target),
            target: Rc::clone(&self.source),
            label_map: self.inverse_label_map.clone(),
            inverse_label_map: self.label_map.clone(),
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
    fn identity_fixes_a_lamination() {
        let t = one_punctured_torus();
        let id = Isometry::identity(&t);
        let l = Lamination::new(
            t,
            vec![
                curve_core::Weight::from(1),
                curve_core::Weight::from(0),
                curve_core::Weight::from(-1),
            ],
        )
        .unwrap();
        let moved = id.apply_lamination(&l).unwrap();
        assert_eq!(moved, l);
    }

    #[test]
    fn inverse_of_inverse_is_self() {
        let t = one_punctured_torus();
        let id = Isometry::identity(&t);
        let back = id.inverse().inverse();
        assert_eq!(back.label_map(), id.label_map());
    }
}
