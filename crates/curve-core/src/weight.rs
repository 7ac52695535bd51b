//! Arbitrary-precision edge weights and the small arithmetic helpers shared
//! by [`crate::lamination`] and the move algebra.
//!
//! Every edge weight, homology entry, matrix product, and intersection
//! number in this crate is an arbitrary-precision integer: fixed-width
//! overflow here would be a defect, not an acceptable approximation.

use num_bigint::BigInt;
use num_traits::Zero;

/// The weight type used throughout the curve complex core.
pub type Weight = BigInt;

/// `max(x, 0)`.
#[must_use]
pub fn clamp_nonneg(x: &Weight) -> Weight {
    if *x > Weight::zero() {
        x.clone()
    } else {
        Weight::zero()
    }
}

/// Exact halving. The dual-weight and Pachner-move formulas only ever halve
/// a value already proved even by the accompanying case guard; this
/// asserts that invariant rather than silently truncating.
#[must_use]
pub fn half(x: &Weight) -> Weight {
    let two = Weight::from(2);
    debug_assert!(
        (x.clone() % two.clone()).is_zero(),
        "half() called on an odd value: {x}"
    );
    x.clone() / two
}

/// `max(min(values), 0)`, or `0` for an empty iterator. This is the
/// "winding amount can't be negative" clamp used throughout the peripheral-
/// and parallel-component detection formulas.
#[must_use]
pub fn maximin0<'a, I: IntoIterator<Item = &'a Weight>>(values: I) -> Weight {
    let min = values
        .into_iter()
        .fold(None::<Weight>, |acc, v| match acc {
            None => Some(v.clone()),
            Some(cur) if *v < cur => Some(v.clone()),
            Some(cur) => Some(cur),
        });
    match min {
        Some(m) if m > Weight::zero() => m,
        _ => Weight::zero(),
    }
}

/// `min(a, b, c, d, 0)`, the dual-weight correction term.
#[must_use]
pub fn min5(a: &Weight, b: &Weight, c: &Weight, d: &Weight) -> Weight {
    let mut m = Weight::zero();
    for v in [a, b, c, d] {
        if v < &m {
            m = v.clone();
        }
    }
    m
}
