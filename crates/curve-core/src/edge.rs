//! Oriented edges and triangles of an ideal triangulation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A signed oriented edge label.
///
/// For a triangulation with `zeta` undirected edges, labels lie in
/// `{-zeta, .., -1, 0, .., zeta-1}`. Two labels with the same [`index`]
/// are inverses of one another.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge(pub i64);

impl Edge {
    /// Construct an edge from a raw label.
    #[must_use]
    pub const fn new(label: i64) -> Self {
        Self(label)
    }

    /// The raw signed label.
    #[inline]
    #[must_use]
    pub const fn label(self) -> i64 {
        self.0
    }

    /// `idx(l) = max(l, ~l)`, the unsigned normalisation of this edge.
    #[inline]
    #[must_use]
    pub const fn index(self) -> i64 {
        let inv = !self.0;
        if self.0 > inv {
            self.0
        } else {
            inv
        }
    }

    /// `+1` iff this label equals its own index (i.e. it is the "positive"
    /// representative of its pair), `-1` otherwise.
    #[inline]
    #[must_use]
    pub const fn sign(self) -> i64 {
        if self.0 == self.index() {
            1
        } else {
            -1
        }
    }

    /// The inverse edge, `~l = -1 - l`. Implemented with Rust's bitwise NOT,
    /// which computes exactly this on signed integers.
    #[inline]
    #[must_use]
    pub const fn inverse(self) -> Self {
        Self(!self.0)
    }
}

impl std::ops::Not for Edge {
    type Output = Self;
    #[inline]
    fn not(self) -> Self {
        self.inverse()
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered triple of edges, listed anticlockwise, stored in canonical
/// rotation (the rotation that starts at the edge of minimum label).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Triangle {
    edges: [Edge; 3],
}

impl Triangle {
    /// Build a triangle from three edges listed anticlockwise, rotating to
    /// canonical form (minimum label first).
    #[must_use]
    pub fn new(e0: Edge, e1: Edge, e2: Edge) -> Self {
        let raw = [e0, e1, e2];
        let min_pos = (0..3)
            .min_by_key(|&i| raw[i].label())
            .expect("three elements");
        let edges = [raw[min_pos], raw[(min_pos + 1) % 3], raw[(min_pos + 2) % 3]];
        Self { edges }
    }

    /// The three edges in canonical anticlockwise order.
    #[inline]
    #[must_use]
    pub const fn edges(&self) -> [Edge; 3] {
        self.edges
    }

    /// The edge following `e` anticlockwise within this triangle, or `None`
    /// if `e` does not border this triangle.
    #[must_use]
    pub fn next(&self, e: Edge) -> Option<Edge> {
        let pos = self.edges.iter().position(|&x| x == e)?;
        Some(self.edges[(pos + 1) % 3])
    }

    /// The edge preceding `e` anticlockwise within this triangle (i.e. the
    /// edge `e` follows), or `None` if `e` does not border this triangle.
    #[must_use]
    pub fn previous(&self, e: Edge) -> Option<Edge> {
        let pos = self.edges.iter().position(|&x| x == e)?;
        Some(self.edges[(pos + 2) % 3])
    }

    /// `true` iff `e` is one of this triangle's three edges.
    #[must_use]
    pub fn contains(&self, e: Edge) -> bool {
        self.edges.contains(&e)
    }

    /// The corner `(e, next(e), next(next(e)))` rooted at `e`, i.e. this
    /// triangle's edges rotated so that `e` comes first. `None` if `e` does
    /// not border this triangle.
    #[must_use]
    pub fn corner_edges(&self, e: Edge) -> Option<[Edge; 3]> {
        let pos = self.edges.iter().position(|&x| x == e)?;
        Some([
            self.edges[pos],
            self.edges[(pos + 1) % 3],
            self.edges[(pos + 2) % 3],
        ])
    }
}

impl fmt::Display for Triangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.edges[0], self.edges[1], self.edges[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_involution() {
        for label in -5..5 {
            let e = Edge::new(label);
            assert_eq!(e.inverse().inverse(), e);
            assert_eq!(e.index(), e.inverse().index());
            assert_eq!(e.sign(), -e.inverse().sign());
        }
    }

    #[test]
    fn triangle_is_rotated_to_min_label() {
        let t = Triangle::new(Edge::new(3), Edge::new(-1), Edge::new(0));
        assert_eq!(t.edges()[0], Edge::new(-1));
    }

    #[test]
    fn triangle_next_previous_are_inverses() {
        let t = Triangle::new(Edge::new(0), Edge::new(1), Edge::new(2));
        for e in t.edges() {
            let n = t.next(e).unwrap();
            assert_eq!(t.previous(n).unwrap(), e);
        }
    }
}
