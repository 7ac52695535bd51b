//! End-to-end scenarios that exercise the move algebra and the shortening
//! engine together, grounded in known facts about mapping class groups and
//! in fixtures ported from `curver`'s `load.S_1_n`.

use std::rc::Rc;

use curve_core::{Edge, Lamination, Triangulation, Weight};
use curve_moves::{Crush, Encoding, HalfTwist, MappingClass, Move, Twist};
use curve_shorten::{equivalent, intersection, order, shorten, ShorteningConfig};

/// `curver.load.S_1_n(1)`: a single ideal triangle glued to its mirror,
/// giving the once-punctured torus with a single vertex.
fn one_punctured_torus() -> Rc<Triangulation> {
    Rc::new(Triangulation::from_labels(&[[0, 1, 2], [!0, !1, !2]]).unwrap())
}

/// `a_0` on the once-punctured torus, `curve_from_cut_sequence([0, 2])` in
/// `curver`: geometric vector `[1, 0, 1]`.
fn a0(t: &Rc<Triangulation>) -> Lamination {
    Lamination::from_cut_sequence(t, &[Edge::new(0), Edge::new(2)]).unwrap()
}

/// `b_0` on the once-punctured torus, `curve_from_cut_sequence([0, 1])` in
/// `curver`: geometric vector `[1, 1, 0]`.
fn b0(t: &Rc<Triangulation>) -> Lamination {
    Lamination::from_cut_sequence(t, &[Edge::new(0), Edge::new(1)]).unwrap()
}

/// `curver.load.S_1_n(2)`: a four-triangle triangulation of the
/// twice-punctured torus.
fn twice_punctured_torus() -> Rc<Triangulation> {
    Rc::new(
        Triangulation::from_labels(&[[0, 1, 2], [!1, 3, 4], [5, !4, !3], [!0, !5, !2]]).unwrap(),
    )
}

fn twist_encoding(curve: Lamination, power: i64) -> Encoding {
    let twist = Twist::new(curve, power).unwrap();
    Encoding::new(vec![Move::Twist(twist)]).unwrap()
}

#[test]
fn twist_about_a_nonseparating_curve_has_infinite_order() {
    let t = one_punctured_torus();
    let twist = Twist::new(a0(&t), 1).unwrap();
    let encoding = Encoding::new(vec![Move::Twist(twist)]).unwrap();
    let mc = MappingClass::try_from(encoding).unwrap();
    let config = ShorteningConfig::default();
    // A Dehn twist about a non-separating simple closed curve has infinite
    // order in the mapping class group; none of its first 20 powers should
    // agree with the identity.
    assert_eq!(order(&mc, &config, 20).unwrap(), None);
}

#[test]
fn a_dehn_twist_fixes_the_curve_it_twists_about() {
    let t = one_punctured_torus();
    let curve = a0(&t);
    let encoding = twist_encoding(curve.clone(), 1);
    let image = encoding.apply_lamination(&curve).unwrap();
    assert_eq!(image, curve);
}

#[test]
fn dehn_twist_braid_relation_holds_for_curves_meeting_once() {
    let t = twice_punctured_torus();
    let a = Lamination::from_cut_sequence(
        &t,
        &[Edge::new(0), Edge::new(1), Edge::new(3), Edge::new(5)],
    )
    .unwrap();
    let b = Lamination::from_cut_sequence(&t, &[Edge::new(0), Edge::new(2)]).unwrap();

    let config = ShorteningConfig::default();
    assert_eq!(intersection(&a, &b, &config).unwrap(), Weight::from(1));

    let ta = twist_encoding(a, 1);
    let tb = twist_encoding(b, 1);

    // T_a T_b T_a == T_b T_a T_b whenever i(a, b) == 1 (Farb-Margalit,
    // Prop. 3.11). Chain `apply_lamination` directly rather than compose,
    // applying right-to-left so `ta_tb_ta(l)` means "apply T_a, then T_b,
    // then T_a".
    let probe = Lamination::from_cut_sequence(&t, &[Edge::new(1), Edge::new(4)]).unwrap();

    let lhs = ta
        .apply_lamination(&tb.apply_lamination(&ta.apply_lamination(&probe).unwrap()).unwrap())
        .unwrap();
    let rhs = tb
        .apply_lamination(&ta.apply_lamination(&tb.apply_lamination(&probe).unwrap()).unwrap())
        .unwrap();
    assert_eq!(lhs, rhs);
}

#[test]
fn shortening_a_curve_twice_is_the_same_as_once() {
    let t = one_punctured_torus();
    let config = ShorteningConfig::default();
    let curve = a0(&t);
    let (short_once, _) = shorten(&curve, &config).unwrap();
    let (short_twice, _) = shorten(&short_once, &config).unwrap();
    assert_eq!(short_once.geometric(), short_twice.geometric());
}

#[test]
fn half_twist_squared_matches_two_applications_of_the_single_half_twist() {
    let t = one_punctured_torus();
    let arc_geometric: Vec<Weight> = t
        .edge_arc_geometric(Edge::new(0))
        .into_iter()
        .map(Weight::from)
        .collect();
    let arc = Lamination::new(Rc::clone(&t), arc_geometric).unwrap();

    let half = HalfTwist::new(arc.clone(), 1).unwrap();
    let half_encoding = Encoding::new(vec![Move::HalfTwist(half)]).unwrap();
    let squared_via_half = half_encoding.compose(&half_encoding).unwrap();

    let half_squared = HalfTwist::new(arc, 2).unwrap();
    let squared_direct = Encoding::new(vec![Move::HalfTwist(half_squared)]).unwrap();

    let probe = b0(&t);
    let lhs = squared_via_half.apply_lamination(&probe).unwrap();
    let rhs = squared_direct.apply_lamination(&probe).unwrap();
    assert_eq!(lhs, rhs);
}

#[test]
fn crushing_preserves_total_euler_characteristic() {
    let t = one_punctured_torus();
    let crush = Crush::new(a0(&t)).unwrap();
    let crush_encoding = Encoding::new(vec![Move::Crush(crush)]).unwrap();
    let source_chi: i64 = crush_encoding.source().surface().iter().map(|s| s.chi).sum();
    let target_chi: i64 = crush_encoding.target().surface().iter().map(|s| s.chi).sum();
    assert_eq!(source_chi, target_chi);
}

#[test]
fn crush_then_lift_is_the_identity_on_a_disjoint_curve() {
    let t = one_punctured_torus();
    let crush = Crush::new(a0(&t)).unwrap();
    let crush_encoding = Encoding::new(vec![Move::Crush(crush)]).unwrap();
    let lift_encoding = crush_encoding.inverse();

    // The link of the single puncture: the one vertex cycle of
    // `one_punctured_torus()`, traversed as a cut sequence. It is
    // peripheral, hence disjoint from every curve including `a_0`, so
    // crushing along `a_0` and lifting back must return it unchanged.
    let peripheral = Lamination::from_cut_sequence(
        &t,
        &[
            Edge::new(-3),
            Edge::new(1),
            Edge::new(-1),
            Edge::new(2),
            Edge::new(-2),
            Edge::new(0),
        ],
    )
    .unwrap();
    assert!(peripheral.is_peripheral().unwrap());

    let crushed = crush_encoding.apply_lamination(&peripheral).unwrap();
    let lifted = lift_encoding.apply_lamination(&crushed).unwrap();
    assert_eq!(lifted, peripheral);
}

#[test]
fn equivalent_identifies_an_encoding_with_itself() {
    let t = one_punctured_torus();
    let twist = twist_encoding(a0(&t), 1);
    let config = ShorteningConfig::default();
    assert!(equivalent(&twist, &twist, &config).unwrap());
}
