//! Integer-weighted laminations (C2): multicurves and multiarcs drawn on a
//! triangulated surface, in normal coordinates.

use std::collections::HashMap;
use std::rc::Rc;

use num_traits::Zero;

use crate::edge::Edge;
use crate::error::{CurveError, CurveResult};
use crate::triangulation::Triangulation;
use crate::weight::{self, Weight};

/// Whether a single component of a lamination is an arc or a closed curve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// A properly embedded arc between (possibly equal) punctures.
    Arc,
    /// A closed curve.
    Curve,
}

/// Where a lamination sits on the type ladder
/// `Lamination ⊃ Integral ⊃ MultiArc/MultiCurve ⊃ Arc/Curve`.
///
/// This is a classification of the *current* component decomposition, not a
/// storage format: promoting a `Lamination` to e.g. `Curve` is a judgement
/// about its components, computed by the shortening engine, not a
/// conversion. `curve-core` only defines the tags; `curve-shorten` computes
/// them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LaminationKind {
    /// No components.
    Empty,
    /// A disjoint union of arcs and curves.
    Mixed,
    /// Every component is an arc.
    MultiArc,
    /// Exactly one component, an arc.
    Arc,
    /// Every component is a curve.
    MultiCurve,
    /// Exactly one component, a curve.
    Curve,
}

/// A lamination: an integer vector of edge weights bound to one
/// triangulation.
#[derive(Clone, Debug)]
pub struct Lamination {
    triangulation: Rc<Triangulation>,
    geometric: Vec<Weight>,
    dual: HashMap<i64, Weight>,
    left: HashMap<i64, Weight>,
    right: HashMap<i64, Weight>,
}

impl PartialEq for Lamination {
    fn eq(&self, other: &Self) -> bool {
        self.triangulation == other.triangulation && self.geometric == other.geometric
    }
}
impl Eq for Lamination {}

impl Lamination {
    /// Construct a lamination, validating that `geometric` has length
    /// `triangulation.zeta()`.
    pub fn new(triangulation: Rc<Triangulation>, geometric: Vec<Weight>) -> CurveResult<Self> {
        if geometric.len() != triangulation.zeta() as usize {
            return Err(CurveError::BadInput(format!(
                "expected {} weights but got {}",
                triangulation.zeta(),
                geometric.len()
            )));
        }

        let mut dual = HashMap::new();
        let mut left = HashMap::new();
        let mut right = HashMap::new();

        for triangle in triangulation.triangles() {
            let [i, j, k] = triangle.edges();
            let a = geometric[i.index() as usize].clone();
            let b = geometric[j.index() as usize].clone();
            let c = geometric[k.index() as usize].clone();
            let af = weight::clamp_nonneg(&a);
            let bf = weight::clamp_nonneg(&b);
            let cf = weight::clamp_nonneg(&c);

            let correction = weight::min5(
                &(&af + &bf - &cf),
                &(&bf + &cf - &af),
                &(&cf + &af - &bf),
                &Weight::zero(),
            );

            let dual_i = weight::half(&(&bf + &cf - &af + &correction));
            let dual_j = weight::half(&(&cf + &af - &bf + &correction));
            let dual_k = weight::half(&(&af + &bf - &cf + &correction));

            dual.insert(i.label(), dual_i.clone());
            right.insert(j.label(), dual_i.clone());
            left.insert(k.label(), dual_i);

            dual.insert(j.label(), dual_j.clone());
            right.insert(k.label(), dual_j.clone());
            left.insert(i.label(), dual_j);

            dual.insert(k.label(), dual_k.clone());
            right.insert(i.label(), dual_k.clone());
            left.insert(j.label(), dual_k);
        }

        Ok(Self {
            triangulation,
            geometric,
            dual,
            left,
            right,
        })
    }

    /// The triangulation this lamination is defined on.
    #[must_use]
    pub fn triangulation(&self) -> &Rc<Triangulation> {
        &self.triangulation
    }

    /// The raw geometric weight vector, indexed by edge index.
    #[must_use]
    pub fn geometric(&self) -> &[Weight] {
        &self.geometric
    }

    /// The geometric measure assigned to `edge` (sign-independent: this is
    /// always `geometric[edge.index()]`).
    #[must_use]
    pub fn get(&self, edge: Edge) -> Weight {
        self.geometric[edge.index() as usize].clone()
    }

    fn dual_or_zero(map: &HashMap<i64, Weight>, edge: Edge) -> Weight {
        map.get(&edge.label()).cloned().unwrap_or_else(Weight::zero)
    }

    /// The number of components dual to `edge`. Negative when there is a
    /// terminal normal arc.
    #[must_use]
    pub fn dual_weight(&self, edge: Edge) -> Weight {
        Self::dual_or_zero(&self.dual, edge)
    }

    /// The number of components dual to the left of `edge`.
    #[must_use]
    pub fn left_weight(&self, edge: Edge) -> Weight {
        Self::dual_or_zero(&self.left, edge)
    }

    /// The number of components dual to the right of `edge`.
    #[must_use]
    pub fn right_weight(&self, edge: Edge) -> Weight {
        Self::dual_or_zero(&self.right, edge)
    }

    /// `sum(max(w, 0) for w in geometric)`: the geometric intersection
    /// number with the underlying triangulation.
    #[must_use]
    pub fn weight(&self) -> Weight {
        self.geometric
            .iter()
            .fold(Weight::zero(), |acc, w| acc + weight::clamp_nonneg(w))
    }

    /// `true` iff this lamination has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometric.iter().all(Zero::is_zero)
    }

    /// For each vertex with positive peripheral multiplicity, the vertex's
    /// outgoing-edge cycle and that multiplicity.
    #[must_use]
    pub fn peripheral_components(&self) -> Vec<(Vec<Edge>, Weight)> {
        let mut out = Vec::new();
        for vertex in self.triangulation.vertices() {
            let left_weights: Vec<Weight> = vertex.iter().map(|&e| self.left_weight(e)).collect();
            let multiplicity = weight::maximin0(left_weights.iter());
            if multiplicity > Weight::zero() {
                out.push((vertex.clone(), multiplicity));
            }
        }
        out
    }

    /// For each component parallel to an edge (arcs directly, or curves
    /// winding around a self-folded vertex): its kind, multiplicity, the
    /// component's own geometric vector, and a defining edge.
    #[must_use]
    pub fn parallel_components(&self) -> Vec<(ComponentKind, Weight, Vec<i64>, Edge)> {
        let mut out = Vec::new();
        for index in self.triangulation.indices() {
            let e = Edge::new(index);

            let multiplicity = -self.get(e);
            if multiplicity > Weight::zero() {
                out.push((
                    ComponentKind::Arc,
                    multiplicity,
                    self.triangulation.edge_arc_geometric(e),
                    e,
                ));
            }

            let v_e = self.triangulation.vertex_of(e);
            let v_ne = self.triangulation.vertex_of(e.inverse());
            if let (Ok(v_e), Ok(v_ne)) = (v_e, v_ne) {
                if std::ptr::eq(v_e, v_ne) {
                    let v_edges = Triangulation::cyclic_slice(v_e, e, e.inverse());
                    if v_edges.len() > 2 {
                        let around_v_values: Vec<Weight> =
                            v_edges.iter().map(|&edgy| self.left_weight(edgy)).collect();
                        let around_v = weight::maximin0(around_v_values.iter());
                        let middle = &v_edges[1..v_edges.len() - 1];
                        let twisting_values: Vec<Weight> = middle
                            .iter()
                            .map(|&edgy| self.left_weight(edgy) - &around_v)
                            .collect();
                        let twisting = weight::maximin0(twisting_values.iter());
                        let first_ok = self.left_weight(v_edges[0]) == around_v;
                        let last_ok = self.left_weight(v_edges[v_edges.len() - 1]) == around_v;
                        if first_ok && last_ok && twisting > Weight::zero() {
                            let component = self.triangulation.cut_sequence_counts(&v_edges[1..]);
                            out.push((ComponentKind::Curve, twisting, component, e));
                        }
                    }
                }
            }
        }
        out
    }

    /// The peripheral part of this lamination: the disjoint sum of its
    /// peripheral components.
    pub fn peripheral(&self) -> CurveResult<Self> {
        let mut geometric = vec![Weight::zero(); self.triangulation.zeta() as usize];
        for (vertex, multiplicity) in self.peripheral_components() {
            let counts = self.triangulation.cut_sequence_counts(&vertex);
            for (g, c) in geometric.iter_mut().zip(counts) {
                *g += &multiplicity * Weight::from(c);
            }
        }
        Self::new(Rc::clone(&self.triangulation), geometric)
    }

    /// `self - self.peripheral()`.
    pub fn non_peripheral(&self) -> CurveResult<Self> {
        let peripheral = self.peripheral()?;
        let geometric = self
            .geometric
            .iter()
            .zip(peripheral.geometric.iter())
            .map(|(x, y)| x - y)
            .collect();
        Self::new(Rc::clone(&self.triangulation), geometric)
    }

    /// `true` iff every component of this lamination is peripheral.
    pub fn is_peripheral(&self) -> CurveResult<bool> {
        Ok(self.peripheral()? == *self)
    }

    /// A lamination is short when every non-peripheral component is
    /// parallel to an edge: subtract every detected parallel component,
    /// scaled by its multiplicity, from the non-peripheral part and check
    /// that nothing remains.
    pub fn is_short(&self) -> CurveResult<bool> {
        let non_peripheral = self.non_peripheral()?;
        let mut geometric = non_peripheral.geometric.clone();
        for (_, multiplicity, component, _) in non_peripheral.parallel_components() {
            for (g, c) in geometric.iter_mut().zip(component) {
                *g -= &multiplicity * Weight::from(c);
            }
        }
        Ok(geometric.iter().all(Zero::is_zero))
    }

    /// For a short, non-peripheral, single-component lamination (a single
    /// arc or curve), the edge it is parallel to.
    pub fn parallel_edge(&self) -> CurveResult<Edge> {
        let components = self.parallel_components();
        match components.as_slice() {
            [(_, _, _, edge)] => Ok(*edge),
            [] => Err(CurveError::PreconditionViolated(
                "lamination is not parallel to any edge".into(),
            )),
            _ => Err(CurveError::PreconditionViolated(
                "lamination has more than one component".into(),
            )),
        }
    }

    /// Follow a leaf of this lamination starting at `(edge, intersection)`
    /// for at most `max_steps` triangle-crossings, returning the cut
    /// sequence of the curve formed when the path closes without
    /// self-crossing.
    pub fn trace_curve(
        &self,
        edge: Edge,
        intersection: &Weight,
        max_steps: u64,
    ) -> CurveResult<Vec<Edge>> {
        if *intersection < Weight::zero() || *intersection >= self.get(edge) {
            return Err(CurveError::PreconditionViolated(
                "intersection point out of range for this edge".into(),
            ));
        }

        let start_edge = edge;
        let mut edge = edge;
        let mut intersection = intersection.clone();
        let mut tilde_upper = self.get(edge) + 1;
        let mut tilde_lower = Weight::from(-1);
        let tilde_intersection = self.get(edge) - &intersection;

        let mut trace = vec![edge];

        for _ in 0..max_steps {
            let corner = self.triangulation.corner(edge.inverse())?;
            let (x, y, z) = (corner[0], corner[1], corner[2]);
            let dz = self.dual_weight(z);
            let dx = self.dual_weight(x);

            if intersection < dz {
                edge = y;
                // intersection unchanged
            } else if dx < Weight::zero() && dz <= intersection && intersection < &dz - &dx {
                return Err(CurveError::NotApplicable(
                    "lamination terminates into a vertex; does not trace to a curve".into(),
                ));
            } else {
                let new_intersection = self.get(z) - self.get(x) + &intersection;
                edge = z;
                intersection = new_intersection;
            }

            if edge == start_edge {
                let tilde_return = self.get(edge) - &intersection;
                if tilde_lower < tilde_return && tilde_return < tilde_upper {
                    return Ok(trace);
                }
                return Err(CurveError::NotApplicable(
                    "curve does not close up without self-intersection".into(),
                ));
            }
            if edge == start_edge.inverse() {
                if intersection < tilde_intersection {
                    if intersection > tilde_lower {
                        tilde_lower = intersection.clone();
                    }
                } else if intersection > tilde_intersection && intersection < tilde_upper {
                    tilde_upper = intersection.clone();
                }
            }

            trace.push(edge);
        }

        Err(CurveError::NotApplicable(format!(
            "curve does not close up in {max_steps} steps"
        )))
    }

    /// Build the (un-classified) lamination determined by a cut sequence:
    /// the geometric intersection vector counting each index's occurrences.
    pub fn from_cut_sequence(triangulation: &Rc<Triangulation>, sequence: &[Edge]) -> CurveResult<Self> {
        let counts = triangulation.cut_sequence_counts(sequence);
        let geometric = counts.into_iter().map(Weight::from).collect();
        Self::new(Rc::clone(triangulation), geometric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_punctured_torus() -> Rc<Triangulation> {
        Rc::new(Triangulation::from_labels(&[[0, 1, 2], [!0, !1, !2]]).unwrap())
    }

    #[test]
    fn empty_lamination_has_zero_weight() {
        let t = one_punctured_torus();
        let l = Lamination::new(Rc::clone(&t), vec![Weight::zero(); 3]).unwrap();
        assert!(l.is_empty());
        assert_eq!(l.weight(), Weight::zero());
    }

    #[test]
    fn weight_is_sum_of_clamped_entries() {
        let t = one_punctured_torus();
        let l = Lamination::new(
            Rc::clone(&t),
            vec![Weight::from(2), Weight::from(-3), Weight::from(1)],
        )
        .unwrap();
        assert_eq!(l.weight(), Weight::from(3));
    }

    #[test]
    fn peripheral_plus_non_peripheral_is_self() {
        let t = one_punctured_torus();
        let l = Lamination::new(
            Rc::clone(&t),
            vec![Weight::from(2), Weight::from(2), Weight::from(2)],
        )
        .unwrap();
        let p = l.peripheral().unwrap();
        let np = l.non_peripheral().unwrap();
        let sum: Vec<Weight> = p
            .geometric
            .iter()
            .zip(np.geometric.iter())
            .map(|(a, b)| a + b)
            .collect();
        assert_eq!(sum, l.geometric);
    }

    #[test]
    fn wrong_length_geometric_is_bad_input() {
        let t = one_punctured_torus();
        let err = Lamination::new(Rc::clone(&t), vec![Weight::zero(); 2]);
        assert!(matches!(err, Err(CurveError::BadInput(_))));
    }
}
