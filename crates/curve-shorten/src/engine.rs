//! Driving a lamination to a short representative, and the lamination-level
//! operations defined in terms of that reduction.
//!
//! The driving loop is explicit-stack in spirit: each round strips fully-
//! formed parallel components, then repeatedly picks the best-scoring
//! flippable edge and applies it, then (if nothing flippable remains but
//! the lamination is not yet empty) performs one vertex sweep and recurses
//! on the derived sub-lamination it finds. There is no recursion on the
//! call stack for the flip search itself, only the one, bounded recursive
//! call per vertex sweep (itself strictly decreasing in weight).

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use num_traits::Zero;

use curve_core::{
    weight, ComponentKind, CurveError, CurveResult, Edge, HomologyClass, Lamination, Triangulation, Weight,
};
use curve_moves::{EdgeFlip, Encoding, MappingClass, Move};

/// Tuning knobs for [`shorten`].
///
/// `drop` mirrors the reference algorithm's acceleration threshold: a flip
/// that drops the weight by less than `drop` (as a fraction) is, in the
/// reference implementation, a candidate for replacement by an
/// intersection-number-driven Dehn twist. That acceleration depends on a
/// `slope` computation with no surviving definition anywhere in the
/// retrieved reference sources (only call sites), so it is not implemented
/// here; `drop` is retained and range-checked for interface fidelity; every
/// run currently takes the unaccelerated Mosher flip sequence the reference
/// algorithm itself falls back to when `drop == 0`. See `DESIGN.md`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShorteningConfig {
    /// Fraction in `[0, 1]`; validated but currently inert (see above).
    pub drop: f64,
}

impl Default for ShorteningConfig {
    fn default() -> Self {
        Self { drop: 0.1 }
    }
}

/// A safety bound on the number of flips a single `shorten` call will
/// attempt before giving up, scaled to the lamination's own weight. The
/// reference algorithm's termination argument (Erickson-Nayyeri) guarantees
/// a polynomial flip count; this bound exists to turn a latent bug into a
/// typed error instead of a silent infinite loop.
fn flip_budget(triangulation: &Triangulation, lamination: &Lamination) -> u64 {
    let zeta = triangulation.zeta().unsigned_abs();
    let weight = lamination.weight().to_string().len() as u64 + lamination.weight().bits();
    64 * (zeta + weight) + 64
}

/// How good flipping `edge` is for shortening `lamination`: `1.0` for a
/// non-parallel arc, `0.5` for a bipod, `0.0` otherwise.
fn shorten_score(triangulation: &Triangulation, lamination: &Lamination, edge: Edge) -> CurveResult<f64> {
    if !triangulation.is_flippable(edge)? {
        return Ok(0.0);
    }
    let ed = lamination.dual_weight(edge);
    if ed < Weight::zero() {
        return Ok(1.0);
    }
    let [a, b, _c, _d] = triangulation.square(edge)?;
    let ad = lamination.dual_weight(a);
    let bd = lamination.dual_weight(b);
    if ed.is_zero() && ad > Weight::zero() && bd > Weight::zero() {
        return Ok(0.5);
    }
    Ok(0.0)
}

/// The best-scoring edge to flip next, ties broken by smallest index.
/// `None` when every edge scores zero.
fn best_shortening_edge(triangulation: &Triangulation, lamination: &Lamination) -> CurveResult<Option<(Edge, f64)>> {
    let mut best: Option<(Edge, f64)> = None;
    for index in triangulation.indices() {
        let edge = Edge::new(index);
        let score = shorten_score(triangulation, lamination, edge)?;
        if score > 0.0 && !best.is_some_and(|(_, b)| b >= score) {
            best = Some((edge, score));
        }
    }
    Ok(best)
}

/// Subtract every currently fully-formed parallel component from
/// `lamination`, recording each one's multiplicity by the edge it is
/// parallel to and its kind.
fn strip_parallel_components(
    lamination: &Lamination,
    arc_multiplicities: &mut HashMap<i64, Weight>,
    curve_multiplicities: &mut HashMap<i64, Weight>,
) -> CurveResult<Lamination> {
    let triangulation = Rc::clone(lamination.triangulation());
    let mut geometric = lamination.geometric().to_vec();
    for (kind, multiplicity, component, edge) in lamination.parallel_components() {
        if multiplicity <= Weight::zero() {
            continue;
        }
        for (g, c) in geometric.iter_mut().zip(component) {
            *g -= &multiplicity * Weight::from(c);
        }
        let table = match kind {
            ComponentKind::Arc => &mut *arc_multiplicities,
            ComponentKind::Curve => &mut *curve_multiplicities,
        };
        *table.entry(edge.label()).or_insert_with(Weight::zero) += multiplicity;
    }
    Lamination::new(triangulation, geometric)
}

/// The vertex-sweep sequence used once no bipod or non-parallel arc
/// remains: walk each unvisited, outward-pointing, non-right-turning edge
/// around to where it closes up, recording the edges crossed after the
/// first right turn away from its vertex. `None` if nothing qualifies.
fn vertex_sweep_sequence(triangulation: &Triangulation, lamination: &Lamination) -> CurveResult<Option<Vec<Edge>>> {
    let mut sequence = Vec::new();
    let mut used: HashSet<i64> = HashSet::new();

    for label in triangulation.labels() {
        let starting_edge = Edge::new(label);
        if used.contains(&label)
            || lamination.left_weight(starting_edge) <= Weight::zero()
            || lamination.right_weight(starting_edge) > Weight::zero()
        {
            continue;
        }

        let mut edge = starting_edge;
        let mut add_sequence = false;
        loop {
            used.insert(edge.label());
            if add_sequence {
                sequence.push(edge);
            }

            let corner = triangulation.corner(edge.inverse())?;
            edge = if lamination.left_weight(edge.inverse()) > Weight::zero() {
                corner[2]
            } else {
                corner[1]
            };

            add_sequence = add_sequence || lamination.right_weight(edge) <= Weight::zero();
            if edge == starting_edge {
                break;
            }
        }
    }

    Ok(if sequence.is_empty() { None } else { Some(sequence) })
}

/// Conjugate `lamination` to a short representative, returning the short
/// lamination (on the resulting triangulation) and the encoding that
/// carries the original triangulation to it.
pub fn shorten(lamination: &Lamination, config: &ShorteningConfig) -> CurveResult<(Lamination, Encoding)> {
    if !(0.0..=1.0).contains(&config.drop) {
        return Err(CurveError::BadInput("shortening drop must lie in [0, 1]".into()));
    }

    let peripheral = lamination.peripheral()?;
    let mut current = lamination.non_peripheral()?;
    let mut triangulation = Rc::clone(current.triangulation());
    let mut conjugator = Encoding::identity(&triangulation);
    let mut peripheral_image = peripheral;

    let mut arc_multiplicities: HashMap<i64, Weight> = HashMap::new();
    let mut curve_multiplicities: HashMap<i64, Weight> = HashMap::new();

    let budget = flip_budget(&triangulation, &current);
    let mut flips_done = 0u64;

    loop {
        current = strip_parallel_components(&current, &mut arc_multiplicities, &mut curve_multiplicities)?;
        if current.is_empty() {
            break;
        }

        loop {
            let Some((edge, score)) = best_shortening_edge(&triangulation, &current)? else {
                break;
            };
            if score <= 0.0 {
                break;
            }
            flips_done += 1;
            if flips_done > budget {
                return Err(CurveError::Internal(
                    "shortening exceeded its flip budget; this indicates a bug, not non-termination by design".into(),
                ));
            }

            let flip = EdgeFlip::new(Rc::clone(&triangulation), edge)?;
            let step = Encoding::new(vec![Move::EdgeFlip(flip)])?;
            current = step.apply_lamination(&current)?;
            peripheral_image = step.apply_lamination(&peripheral_image)?;
            triangulation = Rc::clone(step.target());
            conjugator = step.compose(&conjugator)?;
        }

        if let Some(sequence) = vertex_sweep_sequence(&triangulation, &current)? {
            let multiarc = Lamination::from_cut_sequence(&triangulation, &sequence)?;
            let (_short_multiarc, sub_conjugator) = shorten(&multiarc, config)?;
            current = sub_conjugator.apply_lamination(&current)?;
            peripheral_image = sub_conjugator.apply_lamination(&peripheral_image)?;
            triangulation = Rc::clone(sub_conjugator.target());
            conjugator = sub_conjugator.compose(&conjugator)?;
        }
    }

    let mut geometric = peripheral_image.geometric().to_vec();
    for (label, multiplicity) in arc_multiplicities {
        let component = triangulation.edge_arc_geometric(Edge::new(label));
        for (g, c) in geometric.iter_mut().zip(component) {
            *g += &multiplicity * Weight::from(c);
        }
    }
    for (label, multiplicity) in curve_multiplicities {
        let component = triangulation.edge_curve_geometric(Edge::new(label))?;
        for (g, c) in geometric.iter_mut().zip(component) {
            *g += &multiplicity * Weight::from(c);
        }
    }

    let short = Lamination::new(Rc::clone(&triangulation), geometric)?;
    Ok((short, conjugator))
}

/// Every component of `lamination`, tagged by kind, with its multiplicity,
/// expressed back on `lamination`'s own triangulation.
pub fn components(
    lamination: &Lamination,
    config: &ShorteningConfig,
) -> CurveResult<Vec<(ComponentKind, Lamination, Weight)>> {
    let (short, conjugator) = shorten(lamination, config)?;
    let conjugator_inv = conjugator.inverse();
    let short_triangulation = Rc::clone(short.triangulation());
    let mut out = Vec::new();

    for (vertex, multiplicity) in short.peripheral_components() {
        let component = Lamination::from_cut_sequence(&short_triangulation, &vertex)?;
        out.push((
            ComponentKind::Curve,
            conjugator_inv.apply_lamination(&component)?,
            multiplicity,
        ));
    }
    for (kind, multiplicity, geometric, _edge) in short.parallel_components() {
        let geometric = geometric.into_iter().map(Weight::from).collect();
        let component = Lamination::new(Rc::clone(&short_triangulation), geometric)?;
        out.push((kind, conjugator_inv.apply_lamination(&component)?, multiplicity));
    }

    Ok(out)
}

/// The same breakdown as [`components`], flattened to (component,
/// multiplicity) pairs without the kind tag — the general form of what a
/// single already-short arc or curve trivially returns for itself, a list
/// of one.
pub fn mcomponents(lamination: &Lamination, config: &ShorteningConfig) -> CurveResult<Vec<(Lamination, Weight)>> {
    Ok(components(lamination, config)?
        .into_iter()
        .map(|(_, component, multiplicity)| (component, multiplicity))
        .collect())
}

/// The maximal sub-lamination of `lamination` made of components of kind
/// `wanted`, as a single combined lamination on the same triangulation.
fn multi_of_kind(lamination: &Lamination, config: &ShorteningConfig, wanted: ComponentKind) -> CurveResult<Lamination> {
    let triangulation = Rc::clone(lamination.triangulation());
    let mut geometric = vec![Weight::zero(); triangulation.zeta() as usize];
    for (kind, component, multiplicity) in components(lamination, config)? {
        if kind != wanted {
            continue;
        }
        for (g, c) in geometric.iter_mut().zip(component.geometric()) {
            *g += &multiplicity * c;
        }
    }
    Lamination::new(triangulation, geometric)
}

fn boundary_of_multi(lamination: &Lamination, config: &ShorteningConfig) -> CurveResult<Lamination> {
    let triangulation = Rc::clone(lamination.triangulation());
    if lamination.is_empty() {
        return Ok(lamination.clone());
    }

    let (short, conjugator) = shorten(lamination, config)?;
    let short_triangulation = Rc::clone(short.triangulation());
    let mut geometric: Vec<Weight> = short
        .geometric()
        .iter()
        .map(|w| if *w < Weight::zero() { Weight::zero() } else { Weight::from(2) })
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for triangle in short_triangulation.triangles() {
            let sum: Weight = triangle
                .edges()
                .iter()
                .fold(Weight::zero(), |acc, e| acc + &geometric[e.index() as usize]);
            if sum == Weight::from(2) {
                for e in triangle.edges() {
                    geometric[e.index() as usize] = Weight::zero();
                }
                changed = true;
            }
        }
    }

    let boundary = Lamination::new(short_triangulation, geometric)?;
    let _ = triangulation;
    conjugator.inverse().apply_lamination(&boundary)
}

/// The boundary of a regular neighbourhood of `lamination`.
pub fn boundary(lamination: &Lamination, config: &ShorteningConfig) -> CurveResult<Lamination> {
    if lamination.is_empty() {
        return Ok(lamination.clone());
    }
    let multiarc = multi_of_kind(lamination, config, ComponentKind::Arc)?;
    let multicurve = multi_of_kind(lamination, config, ComponentKind::Curve)?;
    let arc_boundary = boundary_of_multi(&multiarc, config)?;
    let curve_boundary = boundary_of_multi(&multicurve, config)?;
    let geometric = arc_boundary
        .geometric()
        .iter()
        .zip(curve_boundary.geometric())
        .map(|(a, b)| a + b)
        .collect();
    Lamination::new(Rc::clone(lamination.triangulation()), geometric)
}

/// The geometric intersection number `i(lamination, other)`.
pub fn intersection(lamination: &Lamination, other: &Lamination, config: &ShorteningConfig) -> CurveResult<Weight> {
    let (short, conjugator) = shorten(lamination, config)?;
    let other_short = conjugator.apply_lamination(other)?;
    let mut total = Weight::zero();

    for (vertex, multiplicity) in short.peripheral_components() {
        let mut per_vertex = Weight::zero();
        for &e in &vertex {
            per_vertex += weight::clamp_nonneg(&-other_short.get(e));
            per_vertex += weight::clamp_nonneg(&-other_short.left_weight(e));
        }
        total += multiplicity * per_vertex;
    }

    for (kind, multiplicity, _component, p) in short.parallel_components() {
        match kind {
            ComponentKind::Arc => {
                total += multiplicity * weight::clamp_nonneg(&other_short.get(p));
            }
            ComponentKind::Curve => {
                let v = short.triangulation().vertex_of(p)?;
                let v_edges = Triangulation::cyclic_slice(v, p, p.inverse());
                let lefts: Vec<Weight> = v_edges.iter().map(|&e| other_short.left_weight(e)).collect();
                let around = weight::maximin0(lefts.iter());

                let out_left: Weight = v_edges
                    .iter()
                    .fold(Weight::zero(), |acc, &e| acc + weight::clamp_nonneg(&-other_short.left_weight(e)));
                let out_self: Weight = v_edges[1..]
                    .iter()
                    .fold(Weight::zero(), |acc, &e| acc + weight::clamp_nonneg(&-other_short.get(e)));
                let out = out_left + out_self;

                total += multiplicity * (weight::clamp_nonneg(&other_short.get(p)) - Weight::from(2) * around + out);
            }
        }
    }

    Ok(total)
}

/// Whether `lamination` intersects every curve on its surface.
pub fn is_filling(lamination: &Lamination, config: &ShorteningConfig) -> CurveResult<bool> {
    if components(lamination, config)?
        .iter()
        .any(|(kind, _, _)| *kind == ComponentKind::Curve)
    {
        return Ok(false);
    }

    let triangulation = lamination.triangulation();
    for component in triangulation.components() {
        let label_set: HashSet<i64> = component.iter().copied().collect();
        let vertex_count = triangulation
            .vertices()
            .iter()
            .filter(|vertex| label_set.contains(&vertex[0].label()))
            .count();
        let edge_count = component.len() / 2;
        if (vertex_count, edge_count) != (3, 3) && component.iter().all(|&l| lamination.get(Edge::new(l)).is_zero()) {
            return Ok(false);
        }
    }

    boundary(lamination, config)?.is_peripheral()
}

/// Whether `lamination` cuts its surface into polygons.
pub fn is_polygonalisation(lamination: &Lamination, config: &ShorteningConfig) -> CurveResult<bool> {
    if components(lamination, config)?
        .iter()
        .any(|(kind, _, _)| *kind == ComponentKind::Curve)
    {
        return Ok(false);
    }

    let (short, _) = shorten(lamination, config)?;
    let triangulation = short.triangulation();
    let avoid: HashSet<i64> = triangulation
        .indices()
        .into_iter()
        .filter(|&i| short.get(Edge::new(i)) < Weight::zero())
        .collect();
    let dual_tree = triangulation.dual_tree(&avoid);
    let all_indices: HashSet<i64> = triangulation.indices().into_iter().collect();
    let covered: HashSet<i64> = dual_tree.union(&avoid).copied().collect();
    Ok(covered == all_indices)
}

/// The geometric vector of `edge_arc(e).boundary()` pushed through `enc`,
/// used to test equality of encodings by their action on a generating
/// family. Lives here (rather than on `Encoding` itself) because it needs
/// `boundary`, which in turn needs `shorten`.
fn generating_image(enc: &Encoding, e: Edge, config: &ShorteningConfig) -> CurveResult<Vec<Weight>> {
    let geometric: Vec<Weight> = enc
        .source()
        .edge_arc_geometric(e)
        .into_iter()
        .map(Weight::from)
        .collect();
    let arc = Lamination::new(Rc::clone(enc.source()), geometric)?;
    let edge_boundary = boundary(&arc, config)?;
    let image = enc.apply_lamination(&edge_boundary)?;
    Ok(image.geometric().to_vec())
}

/// `true` iff `a` and `b` have the same source and target and agree on
/// the image of `edge_arc(e).boundary()` for every edge `e` (a generating
/// family for the action on laminations), plus (on the once-punctured
/// torus only, where that family alone does not separate mapping
/// classes) agreement on first homology.
pub fn equivalent(a: &Encoding, b: &Encoding, config: &ShorteningConfig) -> CurveResult<bool> {
    if a.source() != b.source() || a.target() != b.target() {
        return Ok(false);
    }
    for index in a.source().indices() {
        let e = Edge::new(index);
        if generating_image(a, e, config)? != generating_image(b, e, config)? {
            return Ok(false);
        }
    }
    if a.source().zeta() == 3 {
        let basis: Vec<HomologyClass> = a
            .source()
            .indices()
            .into_iter()
            .map(|i| {
                let mut algebraic = vec![Weight::zero(); a.source().zeta() as usize];
                algebraic[i as usize] = Weight::from(1);
                HomologyClass::new(Rc::clone(a.source()), algebraic)
            })
            .collect::<CurveResult<Vec<_>>>()?;
        for class in &basis {
            if a.apply_homology(class)? != b.apply_homology(class)? {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

/// The order of a mapping class: the smallest `1 <= n <= max_power` with
/// `mc.pow(n)` equivalent to the identity, or `None` if no such `n` turns
/// up within that bound (an infinite-order class, or too small a bound).
pub fn order(mc: &MappingClass, config: &ShorteningConfig, max_power: u64) -> CurveResult<Option<u64>> {
    let identity = Encoding::identity(mc.triangulation());
    for n in 1..=max_power {
        let exponent = i64::try_from(n)
            .map_err(|_| CurveError::BadInput("max_power overflows a signed exponent".into()))?;
        let powered = mc.pow(exponent)?;
        if equivalent(powered.encoding(), &identity, config)? {
            return Ok(Some(n));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_punctured_torus() -> Rc<Triangulation> {
        Rc::new(Triangulation::from_labels(&[[0, 1, 2], [!0, !1, !2]]).unwrap())
    }

    #[test]
    fn identity_is_equivalent_to_its_own_inverse() {
        let t = one_punctured_torus();
        let id = Encoding::identity(&t);
        let inv = id.inverse();
        assert!(equivalent(&id, &inv, &ShorteningConfig::default()).unwrap());
    }

    #[test]
    fn identity_mapping_class_has_order_one() {
        let t = one_punctured_torus();
        let mc = MappingClass::try_from(Encoding::identity(&t)).unwrap();
        let got = order(&mc, &ShorteningConfig::default(), 4).unwrap();
        assert_eq!(got, Some(1));
    }

    #[test]
    fn shortening_the_empty_lamination_is_a_no_op() {
        let t = one_punctured_torus();
        let empty = Lamination::new(Rc::clone(&t), vec![Weight::zero(); 3]).unwrap();
        let (short, conjugator) = shorten(&empty, &ShorteningConfig::default()).unwrap();
        assert!(short.is_empty());
        assert_eq!(conjugator.source(), &t);
    }

    #[test]
    fn out_of_range_drop_is_bad_input() {
        let t = one_punctured_torus();
        let empty = Lamination::new(Rc::clone(&t), vec![Weight::zero(); 3]).unwrap();
        let config = ShorteningConfig { drop: 1.5 };
        assert!(matches!(shorten(&empty, &config), Err(CurveError::BadInput(_))));
    }

    #[test]
    fn intersection_of_empty_laminations_is_zero() {
        let t = one_punctured_torus();
        let empty = Lamination::new(Rc::clone(&t), vec![Weight::zero(); 3]).unwrap();
        let got = intersection(&empty, &empty, &ShorteningConfig::default()).unwrap();
        assert_eq!(got, Weight::zero());
    }

    #[test]
    fn boundary_of_the_empty_lamination_is_empty() {
        let t = one_punctured_torus();
        let empty = Lamination::new(Rc::clone(&t), vec![Weight::zero(); 3]).unwrap();
        let got = boundary(&empty, &ShorteningConfig::default()).unwrap();
        assert!(got.is_empty());
    }
}
