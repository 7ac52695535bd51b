//! Quantified invariants of the encoding algebra: slicing, packaging, and
//! the twist power law.

use std::rc::Rc;

use proptest::prelude::*;

use curve_core::{Edge, Lamination, Triangulation};
use curve_moves::{Encoding, Move, Twist};

fn one_punctured_torus() -> Rc<Triangulation> {
    Rc::new(Triangulation::from_labels(&[[0, 1, 2], [!0, !1, !2]]).unwrap())
}

fn a0(t: &Rc<Triangulation>) -> Lamination {
    Lamination::from_cut_sequence(t, &[Edge::new(0), Edge::new(2)]).unwrap()
}

/// `b_0`, used as a probe lamination that a twist about `a_0` actually
/// moves (unlike `a_0` itself, which every twist about it fixes).
fn b0(t: &Rc<Triangulation>) -> Lamination {
    Lamination::from_cut_sequence(t, &[Edge::new(0), Edge::new(1)]).unwrap()
}

fn twist_encoding(curve: Lamination, power: i64) -> Encoding {
    Encoding::new(vec![Move::Twist(Twist::new(curve, power).unwrap())]).unwrap()
}

#[test]
fn encoding_package_round_trips_through_encode() {
    let t = one_punctured_torus();
    let twist = twist_encoding(a0(&t), 3);
    let packages = twist.package();
    let rebuilt = Encoding::encode(twist.source(), &packages).unwrap();
    assert_eq!(rebuilt.source(), twist.source());
    assert_eq!(rebuilt.target(), twist.target());
    assert_eq!(rebuilt.package().len(), packages.len());

    let probe = b0(&t);
    assert_eq!(
        twist.apply_lamination(&probe).unwrap(),
        rebuilt.apply_lamination(&probe).unwrap()
    );
}

#[test]
fn slicing_the_full_range_reproduces_the_encoding() {
    let t = one_punctured_torus();
    let twist = twist_encoding(a0(&t), 2);
    let whole = twist.slice(0, twist.moves().len()).unwrap();
    let probe = b0(&t);
    assert_eq!(
        whole.apply_lamination(&probe).unwrap(),
        twist.apply_lamination(&probe).unwrap()
    );
}

#[test]
fn slicing_an_empty_range_gives_the_identity() {
    let t = one_punctured_torus();
    let twist = twist_encoding(a0(&t), 2);
    let empty = twist.slice(0, 0).unwrap();
    let probe = a0(&t);
    assert_eq!(empty.apply_lamination(&probe).unwrap(), probe);
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    /// `T_a^m` followed by `T_a^n` is `T_a^{m+n}`, for any non-zero powers
    /// whose sum is also non-zero (power `0` is not itself constructible).
    #[test]
    fn twist_powers_add_under_composition(m in 1i64..6, n in 1i64..6) {
        let t = one_punctured_torus();
        let tm = twist_encoding(a0(&t), m);
        let tn = twist_encoding(a0(&t), n);
        let tmn = twist_encoding(a0(&t), m + n);

        let probe = b0(&t);
        let composed = tn.apply_lamination(&tm.apply_lamination(&probe).unwrap()).unwrap();
        let direct = tmn.apply_lamination(&probe).unwrap();
        prop_assert_eq!(composed, direct);
    }

    /// Negating a twist's power and reapplying undoes it.
    #[test]
    fn twist_and_its_negative_power_cancel(power in 1i64..6) {
        let t = one_punctured_torus();
        let forward = twist_encoding(a0(&t), power);
        let backward = twist_encoding(a0(&t), -power);

        let probe = b0(&t);
        let round_tripped = backward
            .apply_lamination(&forward.apply_lamination(&probe).unwrap())
            .unwrap();
        prop_assert_eq!(round_tripped, probe);
    }
}
