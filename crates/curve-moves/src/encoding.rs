//! Ordered compositions of moves: encodings, mappings and mapping classes.

use std::collections::HashMap;
use std::rc::Rc;

use curve_core::{CurveError, CurveResult, Edge, HomologyClass, Lamination, Triangulation, Weight};

use crate::crush::Crush;
use crate::edge_flip::{EdgeFlip, MultiEdgeFlip};
use crate::half_twist::HalfTwist;
use crate::isometry::Isometry;
use crate::move_trait::Move;
use crate::twist::Twist;

/// A non-empty ordered sequence of [`Move`]s, applied right-to-left (the
/// last move in `moves` is applied first), from `source` to `target`.
#[derive(Clone, Debug)]
pub struct Encoding {
    source: Rc<Triangulation>,
    target: Rc<Triangulation>,
    moves: Vec<Move>,
}

impl Encoding {
    /// Build an encoding from a non-empty, composable sequence of moves
    /// (`moves[i].target() == moves[i + 1].source()`, read right-to-left).
    pub fn new(moves: Vec<Move>) -> CurveResult<Self> {
        let last = moves
            .last()
            .ok_or_else(|| CurveError::BadInput("an Encoding must contain at least one move".into()))?;
        let source = Rc::clone(last.source());
        let target = Rc::clone(moves.first().expect("non-empty").target());
        for pair in moves.windows(2) {
            if pair[0].target() != pair[1].source() {
                return Err(CurveError::BadInput(
                    "moves in an Encoding must compose: moves[i].target() == moves[i+1].source()".into(),
                ));
            }
        }
        Ok(Self {
            source,
            target,
            moves,
        })
    }

    /// The identity encoding on `triangulation`.
    #[must_use]
    pub fn identity(triangulation: &Rc<Triangulation>) -> Self {
        Self {
            source: Rc::clone(triangulation),
            target: Rc::clone(triangulation),
            moves: vec![Move::Isometry(Isometry::identity(triangulation))],
        }
    }

    /// The triangulation this encoding starts from.
    #[must_use]
    pub fn source(&self) -> &Rc<Triangulation> {
        &self.source
    }

    /// The triangulation this encoding lands on.
    #[must_use]
    pub fn target(&self) -> &Rc<Triangulation> {
        &self.target
    }

    /// The ordered moves, right-to-left application order.
    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Apply this encoding to a lamination on `source()`.
    pub fn apply_lamination(&self, lamination: &Lamination) -> CurveResult<Lamination> {
        self.moves
            .iter()
            .rev()
            .try_fold(lamination.clone(), |acc, mv| mv.apply_lamination(&acc))
    }

    /// Apply this encoding to a homology class on `source()`.
    pub fn apply_homology(&self, homology: &HomologyClass) -> CurveResult<HomologyClass> {
        self.moves
            .iter()
            .rev()
            .try_fold(homology.clone(), |acc, mv| mv.apply_homology(&acc))
    }

    /// `self` followed by `other` is written `other.compose(self)`
    /// (`other` applied second): the combined move list is
    /// `other.moves() ++ self.moves()`, still right-to-left.
    pub fn compose(&self, other: &Self) -> CurveResult<Self> {
        if self.target != other.source {
            return Err(CurveError::PreconditionViolated(
                "cannot compose encodings whose target/source triangulations differ".into(),
            ));
        }
        let mut moves = other.moves.clone();
        moves.extend(self.moves.clone());
        Self::new(moves)
    }

    /// The inverse encoding, `target() -> source()`.
    #[must_use]
    pub fn inverse(&self) -> Self {
        let moves: Vec<Move> = self.moves.iter().rev().map(Move::inverse).collect();
        Self {
            source: Rc::clone(&self.target),
            target: Rc::clone(&self.source),
            moves,
        }
    }

    /// The sub-encoding `self[from..to]` (Python-style half-open slice) on
    /// the move list, composed right-to-left as usual. Empty ranges
    /// return the identity encoding on the inferred intermediate
    /// triangulation.
    pub fn slice(&self, from: usize, to: usize) -> CurveResult<Self> {
        if from >= to {
            let triangulation = self.triangulation_after(from)?;
            return Ok(Self::identity(&triangulation));
        }
        if to > self.moves.len() {
            return Err(CurveError::BadInput("slice index out of range".into()));
        }
        Self::new(self.moves[from..to].to_vec())
    }

    /// The triangulation reached after applying the first `count` moves
    /// (in application order, i.e. from the end of `moves`).
    fn triangulation_after(&self, count: usize) -> CurveResult<Rc<Triangulation>> {
        if count == 0 {
            return Ok(Rc::clone(&self.source));
        }
        if count > self.moves.len() {
            return Err(CurveError::BadInput("slice index out of range".into()));
        }
        Ok(Rc::clone(self.moves[self.moves.len() - count].source()))
    }

    /// `true` iff this encoding uses only flip-graph moves (isometries and
    /// edge flips) and its source differs from its target.
    #[must_use]
    pub fn is_mapping(&self) -> bool {
        self.is_flip_graph() && self.source != self.target
    }

    /// `true` iff this encoding uses only flip-graph moves and its source
    /// equals its target.
    #[must_use]
    pub fn is_mapping_class(&self) -> bool {
        self.is_flip_graph() && self.source == self.target
    }

    fn is_flip_graph(&self) -> bool {
        self.moves.iter().all(|m| {
            matches!(
                m,
                Move::Isometry(_) | Move::EdgeFlip(_) | Move::MultiEdgeFlip(_)
            )
        })
    }

    /// A minimal serialisable descriptor of this encoding: for each move,
    /// enough data to rebuild it from its source triangulation.
    #[must_use]
    pub fn package(&self) -> Vec<MovePackage> {
        self.moves.iter().map(MovePackage::of).collect()
    }

    /// The inverse of [`Encoding::package`]: rebuild the encoding that
    /// starts at `source` from its packaged moves, in the same order
    /// `package` produced them (`packages[i]` rebuilds `self.moves()[i]`).
    pub fn encode(source: &Rc<Triangulation>, packages: &[MovePackage]) -> CurveResult<Self> {
        if packages.is_empty() {
            return Err(CurveError::BadInput("an Encoding must contain at least one move".into()));
        }
        // Packages are stored in the same order as `moves` (right-to-left
        // application), so the move actually applied first is the *last*
        // package; walk backwards from it, rebuilding forward through the
        // triangulations, then restore the original order.
        let mut current = Rc::clone(source);
        let mut moves = Vec::with_capacity(packages.len());
        for package in packages.iter().rev() {
            let mv = package.to_move(&current)?;
            current = Rc::clone(mv.target());
            moves.push(mv);
        }
        moves.reverse();
        Self::new(moves)
    }
}

/// A minimal, serialisable description of one [`Move`], sufficient to
/// reconstruct it given its source triangulation.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum MovePackage {
    /// An isometry's label map (`None` when it is the identity).
    Isometry(Option<std::collections::HashMap<i64, i64>>),
    /// A single edge flip, by edge label.
    EdgeFlip(i64),
    /// A simultaneous flip, by edge labels.
    MultiEdgeFlip(Vec<i64>),
    /// A twist, by (parallel edge label, power).
    Twist(i64, i64),
    /// A half twist, by (parallel edge label, power).
    HalfTwist(i64, i64),
    /// A crush, by the parallel edge label of the collapsed curve.
    Crush(i64),
    /// A lift, by (signature of the triangulation it expands into, parallel
    /// edge label). Unlike the other variants, a lift's own source (the
    /// already-crushed triangulation) does not determine the triangulation
    /// it re-expands into, so that triangulation has to be carried
    /// explicitly.
    Lift(String, i64),
}

impl MovePackage {
    fn of(mv: &Move) -> Self {
        match mv {
            Move::Isometry(m) => {
                if m.is_identity() {
                    Self::Isometry(None)
                } else {
                    Self::Isometry(Some(m.label_map().clone()))
                }
            }
            Move::EdgeFlip(m) => Self::EdgeFlip(m.edge().label()),
            Move::MultiEdgeFlip(m) => {
                Self::MultiEdgeFlip(m.flips().iter().map(|f| f.edge().label()).collect())
            }
            Move::Twist(m) => Self::Twist(m.parallel_label(), m.power()),
            Move::HalfTwist(m) => Self::HalfTwist(m.parallel_label(), m.power()),
            Move::Crush(m) => Self::Crush(m.parallel_label()),
            Move::Lift(m) => Self::Lift(m.target().sig(), m.parallel_label()),
        }
    }

    /// Rebuild the move this package describes, given the triangulation it
    /// starts from.
    fn to_move(&self, source: &Rc<Triangulation>) -> CurveResult<Move> {
        match self {
            Self::Isometry(None) => Ok(Move::Isometry(Isometry::identity(source))),
            Self::Isometry(Some(label_map)) => {
                let target = Rc::new(isometry_target(source, label_map)?);
                Ok(Move::Isometry(Isometry::new(Rc::clone(source), target, label_map.clone())))
            }
            Self::EdgeFlip(label) => Ok(Move::EdgeFlip(EdgeFlip::new(
                Rc::clone(source),
                Edge::new(*label),
            )?)),
            Self::MultiEdgeFlip(labels) => {
                let edges: Vec<Edge> = labels.iter().copied().map(Edge::new).collect();
                Ok(Move::MultiEdgeFlip(MultiEdgeFlip::new(Rc::clone(source), &edges)?))
            }
            Self::Twist(label, power) => {
                let curve = parallel_curve(source, Edge::new(*label))?;
                Ok(Move::Twist(Twist::new(curve, *power)?))
            }
            Self::HalfTwist(label, power) => {
                let arc = parallel_arc(source, Edge::new(*label));
                Ok(Move::HalfTwist(HalfTwist::new(arc, *power)?))
            }
            Self::Crush(label) => {
                let curve = parallel_curve(source, Edge::new(*label))?;
                Ok(Move::Crush(Crush::new(curve)?))
            }
            Self::Lift(sig, label) => {
                let original = Rc::new(Triangulation::from_sig(sig)?);
                let curve = parallel_curve(&original, Edge::new(*label))?;
                Ok(Move::Lift(Crush::new(curve)?.inverse()))
            }
        }
    }
}

/// The geometric vector of the canonical short curve parallel to `e`,
/// promoted to a [`Lamination`] on `source`.
fn parallel_curve(source: &Rc<Triangulation>, e: Edge) -> CurveResult<Lamination> {
    let geometric = source
        .edge_curve_geometric(e)?
        .into_iter()
        .map(Weight::from)
        .collect();
    Lamination::new(Rc::clone(source), geometric)
}

/// The geometric vector of the canonical short arc parallel to `e`,
/// promoted to a [`Lamination`] on `source`.
fn parallel_arc(source: &Rc<Triangulation>, e: Edge) -> Lamination {
    let geometric = source.edge_arc_geometric(e).into_iter().map(Weight::from).collect();
    Lamination::new(Rc::clone(source), geometric)
        .expect("edge_arc_geometric always has the right length")
}

/// The triangulation an isometry's label map carries `source` onto:
/// `source`'s triangles, each edge relabelled through `label_map`.
fn isometry_target(source: &Triangulation, label_map: &HashMap<i64, i64>) -> CurveResult<Triangulation> {
    let labels: Vec<[i64; 3]> = source
        .triangles()
        .iter()
        .map(|t| t.edges().map(|e| label_map[&e.label()]))
        .collect();
    Triangulation::from_labels(&labels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_punctured_torus() -> Rc<Triangulation> {
        Rc::new(Triangulation::from_labels(&[[0, 1, 2], [!0, !1, !2]]).unwrap())
    }

    #[test]
    fn identity_composed_with_itself_is_identity() {
        let t = one_punctured_torus();
        let id = Encoding::identity(&t);
        let composed = id.compose(&id).unwrap();
        assert_eq!(composed.source(), &t);
        assert_eq!(composed.target(), &t);
    }

    #[test]
    fn identity_is_a_mapping_class() {
        let t = one_punctured_torus();
        let id = Encoding::identity(&t);
        assert!(id.is_mapping_class());
        assert!(!id.is_mapping());
    }

    #[test]
    fn inverse_of_identity_is_identity() {
        let t = one_punctured_torus();
        let id = Encoding::identity(&t);
        let inv = id.inverse();
        assert_eq!(inv.source(), &t);
        assert_eq!(inv.target(), &t);
        let l = Lamination::new(
            Rc::clone(&t),
            vec![Weight::from(1), Weight::from(0), Weight::from(-1)],
        )
        .unwrap();
        assert_eq!(id.apply_lamination(&l).unwrap(), inv.apply_lamination(&l).unwrap());
    }

    #[test]
    fn package_then_encode_round_trips_an_identity() {
        let t = one_punctured_torus();
        let id = Encoding::identity(&t);
        let packages = id.package();
        let rebuilt = Encoding::encode(&t, &packages).unwrap();
        assert_eq!(rebuilt.source(), id.source());
        assert_eq!(rebuilt.target(), id.target());
        let l = Lamination::new(
            Rc::clone(&t),
            vec![Weight::from(1), Weight::from(0), Weight::from(-1)],
        )
        .unwrap();
        assert_eq!(id.apply_lamination(&l).unwrap(), rebuilt.apply_lamination(&l).unwrap());
    }

    #[test]
    fn multi_edge_flip_package_keeps_its_edge_labels() {
        let t = one_punctured_torus();
        let e = t
            .labels()
            .into_iter()
            .map(Edge::new)
            .find(|&e| t.is_flippable(e).unwrap())
            .expect("some edge is flippable");
        let flip = MultiEdgeFlip::new(Rc::clone(&t), std::slice::from_ref(&e)).unwrap();
        let mv = Move::MultiEdgeFlip(flip);
        let package = MovePackage::of(&mv);
        assert!(matches!(package, MovePackage::MultiEdgeFlip(ref labels) if labels == &vec![e.label()]));
    }
}
