//! Collapsing the annulus bounded by a short, weight-2 non-isolating curve,
//! and its inverse.

use std::rc::Rc;

use curve_core::{weight, CurveError, CurveResult, Edge, HomologyClass, Lamination, Triangulation, Weight};

/// The quadrilateral data a [`Crush`]/[`Lift`] pair is built from: the
/// diagonal edge the crushed curve is parallel to, and the square edge that
/// is identified with it once the curve is collapsed.
#[derive(Clone, Copy, Debug)]
struct CrushFrame {
    edge: Edge,
    b: Edge,
}

fn find_frame(source: &Triangulation, curve: &Lamination) -> CurveResult<CrushFrame> {
    let positive: Vec<i64> = source
        .indices()
        .into_iter()
        .filter(|&i| curve.get(Edge::new(i)) > Weight::from(0))
        .collect();
    let [mut e1, mut e2] = match positive.as_slice() {
        [e1, e2] => [*e1, *e2],
        _ => {
            return Err(CurveError::Internal(
                "a short weight-2 curve must have exactly two positively-weighted edges".into(),
            ))
        }
    };
    if source.corner(Edge::new(e1))?[2].index() != e2 {
        std::mem::swap(&mut e1, &mut e2);
    }
    let edge = Edge::new(e1);
    let [_a, b, _c, _d] = source.square(edge)?;
    Ok(CrushFrame { edge, b })
}

fn crushed_triangulation(source: &Triangulation, frame: CrushFrame) -> CurveResult<Triangulation> {
    let CrushFrame { edge, b } = frame;
    let [a, _b, c, _d] = source.square(edge)?;
    let labels: Vec<[i64; 3]> = source
        .triangles()
        .iter()
        .filter(|t| !t.contains(edge) && !t.contains(edge.inverse()))
        .map(|t| t.edges().map(Edge::label))
        .chain([
            [a.label(), b.label(), b.inverse().label()],
            [c.label(), edge.label(), edge.inverse().label()],
        ])
        .collect();
    Triangulation::from_labels(&labels)
}

/// Collapse the annulus bounded by a short, non-isolating curve of weight
/// two, identifying its two boundary strands into a single edge.
///
/// Only the non-isolating (weight-2) case is supported; isolating curves
/// require solving a linear program to locate the crushed coordinates and
/// are rejected with [`CurveError::UnsupportedConfiguration`]. Crushing
/// forgets the curve's own position, so it has no well-defined action on
/// homology classes.
#[derive(Clone, Debug)]
pub struct Crush {
    source: Rc<Triangulation>,
    target: Rc<Triangulation>,
    curve: Lamination,
    frame: CrushFrame,
}

impl Crush {
    /// Build the crush of `curve`. `curve` must be short and have weight
    /// exactly two (i.e. be non-isolating).
    pub fn new(curve: Lamination) -> CurveResult<Self> {
        if !curve.is_short()? {
            return Err(CurveError::PreconditionViolated("crush curve must be short".into()));
        }
        if curve.weight() != Weight::from(2) {
            return Err(CurveError::UnsupportedConfiguration(
                "crush currently only supports non-isolating (weight-2) curves".into(),
            ));
        }
        let source = Rc::clone(curve.triangulation());
        let frame = find_frame(&source, &curve)?;
        let target = Rc::new(crushed_triangulation(&source, frame)?);
        Ok(Self {
            source,
            target,
            curve,
            frame,
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

    /// The label of the edge the crushed curve is parallel to.
    #[must_use]
    pub fn parallel_label(&self) -> i64 {
        self.frame.edge.label()
    }

    /// Collapsing the annulus merges the coordinates of `edge` and the
    /// square edge `b` it shares a vertex with: both become their sum, the
    /// combined count of strands that used to run through either one.
    pub(crate) fn apply_lamination(&self, lamination: &Lamination) -> CurveResult<Lamination> {
        let mut geometric = lamination.geometric().to_vec();
        let combined = lamination.get(self.frame.b) + lamination.get(self.frame.edge);
        geometric[self.frame.b.index() as usize] = combined.clone();
        geometric[self.frame.edge.index() as usize] = combined;
        Lamination::new(Rc::clone(&self.target), geometric)
    }

    pub(crate) fn apply_homology(&self, _homology: &HomologyClass) -> CurveResult<HomologyClass> {
        Err(CurveError::NotApplicable(
            "crush has no well-defined action on homology classes".into(),
        ))
    }

    #[must_use]
    pub(crate) fn inverse(&self) -> Lift {
        Lift {
            source: Rc::clone(&self.target),
            target: Rc::clone(&self.source),
            curve: self.curve.clone(),
            frame: self.frame,
        }
    }
}

/// The inverse of a [`Crush`]: re-expands a crushed triangulation back
/// along the curve that was collapsed.
#[derive(Clone, Debug)]
pub struct Lift {
    source: Rc<Triangulation>,
    target: Rc<Triangulation>,
    curve: Lamination,
    frame: CrushFrame,
}

impl Lift {
    #[must_use]
    pub(crate) fn source(&self) -> &Rc<Triangulation> {
        &self.source
    }

    #[must_use]
    pub(crate) fn target(&self) -> &Rc<Triangulation> {
        &self.target
    }

    /// The label of the edge the lifted curve is parallel to.
    #[must_use]
    pub fn parallel_label(&self) -> i64 {
        self.frame.edge.label()
    }

    /// Undoes the merge [`Crush::apply_lamination`] performs: under the
    /// direct-sum narrowing (see `DESIGN.md`), crushing a lamination
    /// disjoint from the curve writes the same combined value to both
    /// `edge` and `b`, having summed two originally-equal coordinates. The
    /// lift reads that single merged value once and halves it back onto
    /// both original coordinates, rather than summing it again.
    pub(crate) fn apply_lamination(&self, lamination: &Lamination) -> CurveResult<Lamination> {
        let mut geometric = lamination.geometric().to_vec();
        let merged = lamination.get(self.frame.edge);
        let original = weight::half(&merged);
        geometric[self.frame.b.index() as usize] = original.clone();
        geometric[self.frame.edge.index() as usize] = original;
        Lamination::new(Rc::clone(&self.target), geometric)
    }

    pub(crate) fn apply_homology(&self, _homology: &HomologyClass) -> CurveResult<HomologyClass> {
        Err(CurveError::NotApplicable(
            "lift has no well-defined action on homology classes".into(),
        ))
    }

    #[must_use]
    pub(crate) fn inverse(&self) -> Crush {
        Crush {
            source: Rc::clone(&self.target),
            target: Rc::clone(&self.source),
            curve: self.curve.clone(),
            frame: self.frame,
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
    fn short_but_wrong_weight_is_unsupported() {
        let t = one_punctured_torus();
        let curve = Lamination::new(Rc::clone(&t), vec![Weight::from(0); 3]).unwrap();
        assert!(matches!(
            Crush::new(curve),
            Err(CurveError::PreconditionViolated(_)) | Err(CurveError::UnsupportedConfiguration(_))
        ));
    }
}
