//! Ideal triangulations of a punctured surface (C1).

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::b64;
use crate::edge::{Edge, Triangle};
use crate::error::{CurveError, CurveResult};
use crate::union_find::UnionFind;

/// Genus/puncture/Euler-characteristic data for one connected component of a
/// triangulation, as returned by [`Triangulation::surface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SurfaceType {
    /// Genus of the component.
    pub genus: i64,
    /// Number of punctures (vertices) of the component.
    pub punctures: i64,
    /// Euler characteristic of the component.
    pub chi: i64,
}

/// An ideal triangulation of a (possibly disconnected) punctured surface.
///
/// Immutable once constructed: every derived structure (`triangle_of`,
/// vertex cycles, signature) is computed at construction time. Serialises as
/// just its list of triangles; every derived field is rebuilt on
/// deserialisation by [`Triangulation::from_triangles`].
#[derive(Clone, Debug)]
pub struct Triangulation {
    zeta: i64,
    triangles: Vec<Triangle>,
    triangle_of: HashMap<i64, usize>,
    vertices: Vec<Vec<Edge>>,
    vertex_of: HashMap<i64, usize>,
    signature: Vec<i64>,
}

impl Serialize for Triangulation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.triangles.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Triangulation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let triangles = Vec::<Triangle>::deserialize(deserializer)?;
        Self::from_triangles(triangles).map_err(serde::de::Error::custom)
    }
}

impl PartialEq for Triangulation {
    fn eq(&self, other: &Self) -> bool {
        self.signature == other.signature
    }
}
impl Eq for Triangulation {}

impl Triangulation {
    /// Build from an iterable of anticlockwise edge-label triples.
    ///
    /// Fails with [`CurveError::BadInput`] if any label in
    /// `{-zeta, .., zeta-1}` is missing or duplicated.
    pub fn from_labels(edge_labels: &[[i64; 3]]) -> CurveResult<Self> {
        let zeta = (edge_labels.len() * 3 / 2) as i64;

        let mut seen = std::collections::HashSet::new();
        for labels in edge_labels {
            for &l in labels {
                if !seen.insert(l) {
                    return Err(CurveError::BadInput(format!("duplicate label {l}")));
                }
            }
        }
        for i in 0..zeta {
            if !seen.contains(&i) {
                return Err(CurveError::BadInput(format!("missing label {i}")));
            }
            if !seen.contains(&!i) {
                return Err(CurveError::BadInput(format!("missing label ~{i}")));
            }
        }

        let triangles: Vec<Triangle> = edge_labels
            .iter()
            .map(|l| Triangle::new(Edge::new(l[0]), Edge::new(l[1]), Edge::new(l[2])))
            .collect();

        Self::from_triangles(triangles)
    }

    fn from_triangles(mut triangles: Vec<Triangle>) -> CurveResult<Self> {
        triangles.sort_by_key(|t| t.edges().map(Edge::label));

        let zeta = (triangles.len() * 3 / 2) as i64;

        let mut triangle_of = HashMap::new();
        for (idx, t) in triangles.iter().enumerate() {
            for e in t.edges() {
                if triangle_of.insert(e.label(), idx).is_some() {
                    return Err(CurveError::BadInput(format!(
                        "label {} appears in more than one triangle",
                        e.label()
                    )));
                }
            }
        }

        let mut unused: std::collections::BTreeSet<i64> =
            (-zeta..zeta).collect();
        let mut vertices: Vec<Vec<Edge>> = Vec::new();
        while let Some(&start) = unused.iter().next() {
            unused.remove(&start);
            let mut vertex = vec![Edge::new(start)];
            loop {
                let last = *vertex.last().expect("non-empty vertex");
                let idx = *triangle_of
                    .get(&last.label())
                    .ok_or_else(|| CurveError::Internal("dangling edge label".into()))?;
                let corner = triangles[idx]
                    .corner_edges(last)
                    .ok_or_else(|| CurveError::Internal("corner lookup failed".into()))?;
                let neighbour = corner[2].inverse();
                if unused.remove(&neighbour.label()) {
                    vertex.push(neighbour);
                } else {
                    break;
                }
            }
            vertices.push(vertex);
        }

        let mut vertex_of = HashMap::new();
        for (idx, vertex) in vertices.iter().enumerate() {
            for e in vertex {
                vertex_of.insert(e.label(), idx);
            }
        }

        let signature: Vec<i64> = triangles
            .iter()
            .flat_map(|t| t.edges().map(Edge::label))
            .collect();

        Ok(Self {
            zeta,
            triangles,
            triangle_of,
            vertices,
            vertex_of,
            signature,
        })
    }

    /// Number of undirected edges (ζ).
    #[inline]
    #[must_use]
    pub const fn zeta(&self) -> i64 {
        self.zeta
    }

    /// The triangles, sorted into canonical order.
    #[inline]
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// All `2*zeta` edge labels.
    #[must_use]
    pub fn labels(&self) -> Vec<i64> {
        (-self.zeta..self.zeta).collect()
    }

    /// The `zeta` non-negative "positive" edge representatives.
    #[must_use]
    pub fn indices(&self) -> Vec<i64> {
        (0..self.zeta).collect()
    }

    /// Euler characteristic, `-zeta/3`.
    #[inline]
    #[must_use]
    pub const fn euler_characteristic(&self) -> i64 {
        -(self.zeta / 3)
    }

    /// The triangle bordering `e`.
    fn triangle_of(&self, e: Edge) -> CurveResult<&Triangle> {
        let idx = *self
            .triangle_of
            .get(&e.label())
            .ok_or_else(|| CurveError::BadInput(format!("label {} not in this triangulation", e.label())))?;
        Ok(&self.triangles[idx])
    }

    fn triangle_index_of(&self, e: Edge) -> CurveResult<usize> {
        self.triangle_of
            .get(&e.label())
            .copied()
            .ok_or_else(|| CurveError::BadInput(format!("label {} not in this triangulation", e.label())))
    }

    /// The corner `(e, next(e), next(next(e)))` rooted at `e`.
    pub fn corner(&self, e: Edge) -> CurveResult<[Edge; 3]> {
        self.triangle_of(e)?
            .corner_edges(e)
            .ok_or_else(|| CurveError::Internal("edge missing from its own triangle".into()))
    }

    /// The cyclic sequence of outgoing edges around `e`'s tail vertex.
    pub fn vertex_of(&self, e: Edge) -> CurveResult<&[Edge]> {
        let idx = *self
            .vertex_of
            .get(&e.label())
            .ok_or_else(|| CurveError::BadInput(format!("label {} not in this triangulation", e.label())))?;
        Ok(&self.vertices[idx])
    }

    /// All vertex cycles.
    #[must_use]
    pub fn vertices(&self) -> &[Vec<Edge>] {
        &self.vertices
    }

    /// `true` iff `e` lies in two distinct triangles (a once-punctured
    /// monogon edge is never flippable).
    pub fn is_flippable(&self, e: Edge) -> CurveResult<bool> {
        Ok(self.triangle_index_of(e)? != self.triangle_index_of(e.inverse())?)
    }

    /// The square `(a, b, c, d)` around flippable edge `e`, in the fixed
    /// orientation described in the data model.
    pub fn square(&self, e: Edge) -> CurveResult<[Edge; 4]> {
        if !self.is_flippable(e)? {
            return Err(CurveError::PreconditionViolated(format!(
                "edge {} is not flippable",
                e.label()
            )));
        }
        let corner_a = self.corner(e)?;
        let corner_b = self.corner(e.inverse())?;
        Ok([corner_a[1], corner_a[2], corner_b[1], corner_b[2]])
    }

    /// Connected components, as sorted lists of (signed) edge labels.
    #[must_use]
    pub fn components(&self) -> Vec<Vec<i64>> {
        let n = (2 * self.zeta) as usize;
        let label_to_slot = |l: i64| (l + self.zeta) as usize;

        let mut uf = UnionFind::new(n);
        for l in -self.zeta..self.zeta {
            uf.union(label_to_slot(l), label_to_slot(!l));
        }
        for t in &self.triangles {
            let es = t.edges();
            uf.union(label_to_slot(es[0].label()), label_to_slot(es[1].label()));
            uf.union(label_to_slot(es[1].label()), label_to_slot(es[2].label()));
        }

        let mut groups: HashMap<usize, Vec<i64>> = HashMap::new();
        for l in -self.zeta..self.zeta {
            let root = uf.find(label_to_slot(l));
            groups.entry(root).or_default().push(l);
        }
        let mut out: Vec<Vec<i64>> = groups.into_values().collect();
        for g in &mut out {
            g.sort_unstable();
        }
        out.sort();
        out
    }

    /// `true` iff this triangulation has a single component.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.components().len() == 1
    }

    /// A maximal spanning forest of the dual 1-skeleton, as a set of edge
    /// indices, computed by Kruskal's algorithm over increasing index and
    /// skipping every index in `avoid`. Deterministic and unique.
    #[must_use]
    pub fn dual_tree(&self, avoid: &std::collections::HashSet<i64>) -> std::collections::HashSet<i64> {
        let mut tree = std::collections::HashSet::new();
        let mut uf = UnionFind::new(self.triangles.len());
        for index in 0..self.zeta {
            if avoid.contains(&index) {
                continue;
            }
            let a = self.triangle_index_of(Edge::new(index)).expect("index in range");
            let b = self
                .triangle_index_of(Edge::new(index).inverse())
                .expect("index in range");
            if uf.union(a, b) {
                tree.insert(index);
            }
        }
        tree
    }

    /// The homology matrix: the linear map, as a dense `zeta x zeta` matrix
    /// of coefficients in `{-1, 0, 1}`, that kills every entry of
    /// [`Triangulation::dual_tree`] (with no avoided edges).
    #[must_use]
    pub fn homology_matrix(&self) -> Vec<Vec<i64>> {
        let dual_tree = self.dual_tree(&std::collections::HashSet::new());
        let z = self.zeta as usize;
        let mut m = vec![vec![0i64; z]; z];

        for index in 0..self.zeta {
            let mut row = vec![0i64; z];
            if dual_tree.contains(&index) {
                let mut edge = Edge::new(index);
                loop {
                    let corner = self.corner(edge).expect("edge in triangulation");
                    edge = corner[2];
                    if !dual_tree.contains(&edge.index()) {
                        row[edge.index() as usize] -= edge.sign();
                    } else {
                        edge = edge.inverse();
                    }
                    if edge.label() == !index {
                        break;
                    }
                }
            } else {
                row[index as usize] = 1;
            }
            m[index as usize] = row;
        }

        // Transpose.
        let mut out = vec![vec![0i64; z]; z];
        for (i, row) in m.iter().enumerate() {
            for (j, &val) in row.iter().enumerate() {
                out[j][i] = val;
            }
        }
        out
    }

    /// Per-component `(genus, punctures, chi)`.
    #[must_use]
    pub fn surface(&self) -> Vec<SurfaceType> {
        self.components()
            .into_iter()
            .map(|component| {
                let set: std::collections::HashSet<i64> = component.iter().copied().collect();
                let v = self
                    .vertices
                    .iter()
                    .filter(|vertex| set.contains(&vertex[0].label()))
                    .count() as i64;
                let e = component.len() as i64 / 2;
                let genus = (2 - v + e / 3) / 2;
                let chi = -(e / 3);
                SurfaceType {
                    genus,
                    punctures: v,
                    chi,
                }
            })
            .collect()
    }

    /// Enumerate all label-preserving isometries `self -> other`, in
    /// deterministic order. Empty iff the triangulations are not isometric.
    #[must_use]
    pub fn isometries_to(&self, other: &Self) -> Vec<HashMap<i64, i64>> {
        if self.zeta != other.zeta {
            return Vec::new();
        }
        let mut self_surface = self.surface();
        let mut other_surface = other.surface();
        self_surface.sort();
        other_surface.sort();
        if self_surface != other_surface {
            return Vec::new();
        }

        let components = self.components();
        let mut sources = Vec::new();
        for component in &components {
            let best = component
                .iter()
                .copied()
                .max_by_key(|&l| self.vertex_of(Edge::new(l)).map(<[Edge]>::len).unwrap_or(0))
                .expect("non-empty component");
            sources.push(best);
        }

        let values: Vec<usize> = sources
            .iter()
            .map(|&l| self.vertex_of(Edge::new(l)).map(<[Edge]>::len).unwrap_or(0))
            .collect();

        let targets: Vec<Vec<i64>> = values
            .iter()
            .map(|&want| {
                other
                    .labels()
                    .into_iter()
                    .filter(|&l| other.vertex_of(Edge::new(l)).map(<[Edge]>::len).unwrap_or(0) == want)
                    .collect()
            })
            .collect();

        let mut results = Vec::new();
        for chosen in MixedRadixProduct::new(&targets) {
            let seed: HashMap<i64, i64> = sources.iter().copied().zip(chosen.iter().copied()).collect();
            if let Ok(map) = self.find_isometry(other, seed) {
                results.push(map);
            }
        }
        results
    }

    /// Extend a partial label map into a full isometry `self -> other`,
    /// using an explicit stack (not recursion) to propagate constraints.
    pub fn find_isometry(
        &self,
        other: &Self,
        mut label_map: HashMap<i64, i64>,
    ) -> CurveResult<HashMap<i64, i64>> {
        let mut to_process: Vec<(i64, i64)> = label_map.iter().map(|(&k, &v)| (k, v)).collect();

        while let Some((from_label, to_label)) = to_process.pop() {
            let from_corner = self.corner(Edge::new(from_label))?;
            let to_corner = other.corner(Edge::new(to_label))?;
            let neighbours = [
                (!from_label, !to_label),
                (from_corner[1].label(), to_corner[1].label()),
            ];
            for (new_from, new_to) in neighbours {
                if let Some(&existing) = label_map.get(&new_from) {
                    if existing != new_to {
                        return Err(CurveError::BadInput(
                            "label map does not extend to an isometry".into(),
                        ));
                    }
                } else {
                    let from_order = self.vertex_of(Edge::new(new_from))?.len();
                    let to_order = other.vertex_of(Edge::new(new_to))?.len();
                    if from_order != to_order {
                        return Err(CurveError::BadInput(
                            "label map does not extend to an isometry".into(),
                        ));
                    }
                    label_map.insert(new_from, new_to);
                    to_process.push((new_from, new_to));
                }
            }
        }

        for l in self.labels() {
            label_map.entry(l).or_insert(l);
        }

        let mut seen = std::collections::HashSet::new();
        for &v in label_map.values() {
            if !seen.insert(v) {
                return Err(CurveError::BadInput("label map is not injective".into()));
            }
        }
        if label_map.len() != (2 * self.zeta) as usize {
            return Err(CurveError::BadInput("label map is not defined everywhere".into()));
        }

        Ok(label_map)
    }

    /// `b64(zeta) + "_" + b64(lehmer index of the flattened signature)`.
    #[must_use]
    pub fn sig(&self) -> String {
        let perm: Vec<usize> = self
            .signature
            .iter()
            .map(|&x| (x + self.zeta) as usize)
            .collect();
        let index = b64::permutation_index(&perm);
        format!("{}_{}", b64::encode(self.zeta as u128), b64::encode(index))
    }

    /// Inverse of [`Triangulation::sig`].
    pub fn from_sig(sig: &str) -> CurveResult<Self> {
        let mut parts = sig.split('_');
        let zeta_s = parts
            .next()
            .ok_or_else(|| CurveError::BadInput("malformed signature".into()))?;
        let index_s = parts
            .next()
            .ok_or_else(|| CurveError::BadInput("malformed signature".into()))?;
        if parts.next().is_some() {
            return Err(CurveError::BadInput("malformed signature".into()));
        }

        let zeta = b64::decode(zeta_s)? as i64;
        let index = b64::decode(index_s)?;
        let perm = b64::permutation_from_index((2 * zeta) as usize, index);
        let flattened: Vec<i64> = perm.iter().map(|&p| p as i64 - zeta).collect();

        if flattened.len() % 3 != 0 {
            return Err(CurveError::BadInput("signature has wrong length".into()));
        }
        let triples: Vec<[i64; 3]> = flattened
            .chunks(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Self::from_labels(&triples)
    }

    /// The arc consisting solely of the given edge (weight `-1` there, `0`
    /// elsewhere), un-promoted.
    #[must_use]
    pub fn edge_arc_geometric(&self, e: Edge) -> Vec<i64> {
        let mut g = vec![0i64; self.zeta as usize];
        g[e.index() as usize] = -1;
        g
    }

    /// For each edge index, the number of times that index (in either
    /// orientation) occurs in `sequence` — the geometric intersection
    /// vector of a cut sequence.
    #[must_use]
    pub fn cut_sequence_counts(&self, sequence: &[Edge]) -> Vec<i64> {
        let mut counts = vec![0i64; self.zeta as usize];
        for e in sequence {
            counts[e.index() as usize] += 1;
        }
        counts
    }

    /// The cyclic sub-sequence of `seq` starting at `from` and ending at
    /// `to` inclusive, walking forward. Both edges must occur in `seq`.
    #[must_use]
    pub fn cyclic_slice(seq: &[Edge], from: Edge, to: Edge) -> Vec<Edge> {
        let Some(start) = seq.iter().position(|&e| e == from) else {
            return Vec::new();
        };
        let Some(end) = seq.iter().position(|&e| e == to) else {
            return Vec::new();
        };
        let n = seq.len();
        let mut out = Vec::new();
        let mut i = start;
        loop {
            out.push(seq[i]);
            if i == end {
                break;
            }
            i = (i + 1) % n;
        }
        out
    }

    /// The `HomologyClass` geometric vector of the given edge: `sign(e)` at
    /// its index, zero elsewhere.
    #[must_use]
    pub fn edge_homology_geometric(&self, e: Edge) -> Vec<i64> {
        let mut g = vec![0i64; self.zeta as usize];
        g[e.index() as usize] = e.sign();
        g
    }

    /// The geometric vector of the short curve parallel to `e`: `e` must sit
    /// at a self-folded vertex (one whose edge cycle returns to `e` via
    /// `e.inverse()`), and the curve winds once around that vertex, cutting
    /// every other edge of the cycle exactly once.
    pub fn edge_curve_geometric(&self, e: Edge) -> CurveResult<Vec<i64>> {
        let v_e = self.vertex_of(e)?;
        let v_ne = self.vertex_of(e.inverse())?;
        if !std::ptr::eq(v_e, v_ne) {
            return Err(CurveError::PreconditionViolated(
                "edge_curve_geometric requires a self-folded vertex".into(),
            ));
        }
        let v_edges = Self::cyclic_slice(v_e, e, e.inverse());
        Ok(self.cut_sequence_counts(&v_edges[1..]))
    }
}

/// Iterative (odometer-style) enumeration of the cartesian product of
/// `slots`, used in place of recursive backtracking.
struct MixedRadixProduct<'a> {
    slots: &'a [Vec<i64>],
    counters: Vec<usize>,
    done: bool,
}

impl<'a> MixedRadixProduct<'a> {
    fn new(slots: &'a [Vec<i64>]) -> Self {
        let done = slots.iter().any(Vec::is_empty);
        Self {
            slots,
            counters: vec![0; slots.len()],
            done,
        }
    }
}

impl<'a> Iterator for MixedRadixProduct<'a> {
    type Item = Vec<i64>;

    fn next(&mut self) -> Option<Vec<i64>> {
        if self.done {
            return None;
        }
        let current: Vec<i64> = self
            .counters
            .iter()
            .zip(self.slots.iter())
            .map(|(&c, slot)| slot[c])
            .collect();

        // Advance the odometer.
        let mut pos = self.counters.len();
        loop {
            if pos == 0 {
                self.done = true;
                break;
            }
            pos -= 1;
            self.counters[pos] += 1;
            if self.counters[pos] < self.slots[pos].len() {
                break;
            }
            self.counters[pos] = 0;
            if pos == 0 {
                self.done = true;
            }
        }

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_punctured_torus() -> Triangulation {
        // Two triangles glued along all three edge pairs (S_{1,1}).
        Triangulation::from_labels(&[[0, 1, 2], [!0, !1, !2]]).unwrap()
    }

    #[test]
    fn zeta_matches_triangle_count() {
        let t = one_punctured_torus();
        assert_eq!(t.zeta(), 3);
        assert_eq!(t.triangles().len(), 2);
    }

    #[test]
    fn every_edge_is_flippable_or_not_consistently() {
        let t = one_punctured_torus();
        for l in t.labels() {
            // Should not error: every label is in the triangulation.
            t.is_flippable(Edge::new(l)).unwrap();
        }
    }

    #[test]
    fn sig_round_trips() {
        let t = one_punctured_torus();
        let s = t.sig();
        let back = Triangulation::from_sig(&s).unwrap();
        assert_eq!(t, back);
    }

    #[test]
    fn missing_label_is_bad_input() {
        let err = Triangulation::from_labels(&[[0, 1, 5], [!0, !1, !5]]);
        assert!(matches!(err, Err(CurveError::BadInput(_))));
    }

    #[test]
    fn euler_characteristic_is_minus_zeta_over_three() {
        let t = one_punctured_torus();
        assert_eq!(t.euler_characteristic(), -(t.zeta() / 3));
    }
}
