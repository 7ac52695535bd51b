//! First homology classes of a triangulation, relative to its vertices.

use std::rc::Rc;

use crate::error::{CurveError, CurveResult};
use crate::triangulation::Triangulation;
use crate::weight::Weight;

/// An element of `H_1(S, vertices; Z)`, represented by an algebraic
/// (signed) vector of length `zeta`.
#[derive(Clone, Debug)]
pub struct HomologyClass {
    triangulation: Rc<Triangulation>,
    algebraic: Vec<Weight>,
}

impl HomologyClass {
    /// Construct a homology class from an algebraic vector.
    pub fn new(triangulation: Rc<Triangulation>, algebraic: Vec<Weight>) -> CurveResult<Self> {
        if algebraic.len() != triangulation.zeta() as usize {
            return Err(CurveError::BadInput(format!(
                "expected {} coordinates but got {}",
                triangulation.zeta(),
                algebraic.len()
            )));
        }
        Ok(Self {
            triangulation,
            algebraic,
        })
    }

    /// The zero homology class.
    #[must_use]
    pub fn zero(triangulation: Rc<Triangulation>) -> Self {
        let n = triangulation.zeta() as usize;
        Self {
            triangulation,
            algebraic: vec![Weight::from(0); n],
        }
    }

    /// The triangulation this class is defined relative to.
    #[must_use]
    pub fn triangulation(&self) -> &Rc<Triangulation> {
        &self.triangulation
    }

    /// The raw algebraic (signed) coordinate vector.
    #[must_use]
    pub fn algebraic(&self) -> &[Weight] {
        &self.algebraic
    }

    /// The signed value this class assigns to `edge`: `algebraic[edge.index()] * edge.sign()`.
    #[must_use]
    pub fn get(&self, edge: crate::edge::Edge) -> Weight {
        self.algebraic[edge.index() as usize].clone() * Weight::from(edge.sign())
    }

    /// The representative of this class that vanishes on every edge of the
    /// triangulation's standard dual spanning tree.
    #[must_use]
    pub fn canonical(&self) -> Self {
        let matrix = self.triangulation.homology_matrix();
        let algebraic = matrix
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.algebraic)
                    .fold(Weight::from(0), |acc, (&coeff, value)| {
                        acc + Weight::from(coeff) * value
                    })
            })
            .collect();
        Self {
            triangulation: Rc::clone(&self.triangulation),
            algebraic,
        }
    }

    /// `self + other`. Both classes must share a triangulation.
    pub fn add(&self, other: &Self) -> CurveResult<Self> {
        if self.triangulation != other.triangulation {
            return Err(CurveError::PreconditionViolated(
                "homology classes must be on the same triangulation to add them".into(),
            ));
        }
        let algebraic = self
            .algebraic
            .iter()
            .zip(&other.algebraic)
            .map(|(x, y)| x + y)
            .collect();
        Ok(Self {
            triangulation: Rc::clone(&self.triangulation),
            algebraic,
        })
    }

    /// `self - other`. Both classes must share a triangulation.
    pub fn sub(&self, other: &Self) -> CurveResult<Self> {
        self.add(&other.neg())
    }

    /// `-self`.
    #[must_use]
    pub fn neg(&self) -> Self {
        Self {
            triangulation: Rc::clone(&self.triangulation),
            algebraic: self.algebraic.iter().map(|x| -x).collect(),
        }
    }

    /// `self * scalar`.
    #[must_use]
    pub fn scale(&self, scalar: &Weight) -> Self {
        Self {
            triangulation: Rc::clone(&self.triangulation),
            algebraic: self.algebraic.iter().map(|x| x * scalar).collect(),
        }
    }
}

impl PartialEq for HomologyClass {
    fn eq(&self, other: &Self) -> bool {
        self.triangulation == other.triangulation && self.canonical().algebraic == other.canonical().algebraic
    }
}
impl Eq for HomologyClass {}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_punctured_torus() -> Rc<Triangulation> {
        Rc::new(Triangulation::from_labels(&[[0, 1, 2], [!0, !1, !2]]).unwrap())
    }

    #[test]
    fn zero_class_is_its_own_canonical_form() {
        let t = one_punctured_torus();
        let z = HomologyClass::zero(Rc::clone(&t));
        assert_eq!(z.canonical(), z);
    }

    #[test]
    fn canonical_is_idempotent() {
        let t = one_punctured_torus();
        let h = HomologyClass::new(t, vec![Weight::from(3), Weight::from(-2), Weight::from(1)]).unwrap();
        let once = h.canonical();
        let twice = once.canonical();
        assert_eq!(once.algebraic, twice.algebraic);
    }

    #[test]
    fn add_then_negate_round_trips() {
        let t = one_punctured_torus();
        let a = HomologyClass::new(Rc::clone(&t), vec![Weight::from(1), Weight::from(2), Weight::from(3)]).unwrap();
        let b = HomologyClass::new(t, vec![Weight::from(4), Weight::from(-1), Weight::from(0)]).unwrap();
        let sum = a.add(&b).unwrap();
        let back = sum.sub(&b).unwrap();
        assert_eq!(back.algebraic, a.algebraic);
    }

    #[test]
    fn mismatched_triangulation_add_errors() {
        let t1 = one_punctured_torus();
        let t2 = one_punctured_torus();
        let a = HomologyClass::zero(t1);
        let b = HomologyClass::zero(t2);
        assert!(matches!(a.add(&b), Err(CurveError::PreconditionViolated(_))));
    }
}
