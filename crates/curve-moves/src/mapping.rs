//! The promotion ladder `Encoding -> Mapping -> MappingClass`.
//!
//! Every value here wraps the same [`Encoding`] data; the tag is derived
//! from `is_mapping()`/`is_mapping_class()` rather than stored separately,
//! so a `Mapping`/`MappingClass` can never drift out of sync with the
//! encoding it wraps.

use std::rc::Rc;

use curve_core::{CurveError, CurveResult, Triangulation};

use crate::encoding::Encoding;

/// An encoding known to use only flip-graph moves, between two (possibly
/// equal) triangulations. Promote via [`Encoding::promote`].
#[derive(Clone, Debug)]
pub struct Mapping(Encoding);

/// A flip-graph encoding whose source equals its target: a mapping class
/// group element. The only case the exponent operator is defined on.
#[derive(Clone, Debug)]
pub struct MappingClass(Encoding);

/// The result of [`Encoding::promote`]: which of the three tiers an
/// encoding belongs to.
#[derive(Clone, Debug)]
pub enum Promotion {
    /// Not known to be expressible purely in flip-graph moves.
    Encoding(Encoding),
    /// A flip-graph encoding between distinct triangulations.
    Mapping(Mapping),
    /// A flip-graph self-map.
    MappingClass(MappingClass),
}

impl Encoding {
    /// Classify this encoding by its derived tag: `MappingClass` if it is a
    /// flip-graph self-map, `Mapping` if it is a flip-graph encoding
    /// between distinct triangulations, `Encoding` otherwise.
    #[must_use]
    pub fn promote(self) -> Promotion {
        if self.is_mapping_class() {
            Promotion::MappingClass(MappingClass(self))
        } else if self.is_mapping() {
            Promotion::Mapping(Mapping(self))
        } else {
            Promotion::Encoding(self)
        }
    }
}

impl Mapping {
    /// The underlying encoding.
    #[must_use]
    pub fn encoding(&self) -> &Encoding {
        &self.0
    }

    /// Discard the mapping tag, recovering the plain encoding.
    #[must_use]
    pub fn into_encoding(self) -> Encoding {
        self.0
    }
}

impl MappingClass {
    /// The underlying encoding.
    #[must_use]
    pub fn encoding(&self) -> &Encoding {
        &self.0
    }

    /// Discard the mapping-class tag, recovering the plain encoding.
    #[must_use]
    pub fn into_encoding(self) -> Encoding {
        self.0
    }

    /// The triangulation this mapping class acts on (its source, which
    /// equals its target).
    #[must_use]
    pub fn triangulation(&self) -> &Rc<Triangulation> {
        self.0.source()
    }

    /// `self` raised to `power`. Negative powers invert first; `power ==
    /// 0` gives the identity mapping class on the same triangulation. The
    /// exponent operator is defined only here, not on `Encoding`/`Mapping`,
    /// since only a self-map composes with itself arbitrarily many times
    /// without leaving the triangulation it started on.
    pub fn pow(&self, power: i64) -> CurveResult<Self> {
        if power == 0 {
            return Ok(Self(Encoding::identity(self.triangulation())));
        }
        let step = if power > 0 {
            self.0.clone()
        } else {
            self.0.inverse()
        };
        let mut acc = step.clone();
        for _ in 1..power.unsigned_abs() {
            acc = step.compose(&acc)?;
        }
        // `step.compose(&acc)` is itself a flip-graph self-map (composing
        // two flip-graph self-maps stays one), so re-wrapping is safe.
        Ok(Self(acc))
    }
}

impl TryFrom<Encoding> for MappingClass {
    type Error = CurveError;

    fn try_from(encoding: Encoding) -> CurveResult<Self> {
        if encoding.is_mapping_class() {
            Ok(Self(encoding))
        } else {
            Err(CurveError::PreconditionViolated(
                "not a flip-graph self-map".into(),
            ))
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
    fn identity_promotes_to_a_mapping_class() {
        let t = one_punctured_torus();
        let id = Encoding::identity(&t);
        assert!(matches!(id.promote(), Promotion::MappingClass(_)));
    }

    #[test]
    fn identity_mapping_class_to_the_zeroth_power_is_itself() {
        let t = one_punctured_torus();
        let mc = MappingClass::try_from(Encoding::identity(&t)).unwrap();
        let powered = mc.pow(0).unwrap();
        assert_eq!(powered.triangulation(), &t);
    }
}
