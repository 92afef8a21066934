// Backing-type capability for finite-field elements.
//
// A field element delegates all of its arithmetic to the modular operations
// of its backing integer type; this trait adds the handful of conversions
// and the ranged sampling the element type needs on top of those.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use mathrs_numeric::{BigUint, ModularOps};
use rand::Rng;

/// An unsigned integer type able to back a finite-field element.
pub trait FieldBacking:
    ModularOps + Clone + Ord + Eq + Hash + Debug + Display + FromStr
{
    fn zero() -> Self;

    fn one() -> Self;

    /// Convert a 128-bit source into `[0, order)`: directly when the source
    /// fits the representation exactly, otherwise by reducing the source
    /// modulo the order first.
    fn from_u128_reduced(source: u128, order: &Self) -> Self;

    /// Lossy conversion for float interop; inexact above 2^53.
    fn to_f64(&self) -> f64;

    /// Uniformly random value in `[0, bound)` via rejection sampling.
    fn random_below<R: Rng + ?Sized>(bound: &Self, rng: &mut R) -> Self;
}

macro_rules! impl_field_backing {
    ($($t:ty),*) => {$(
        impl FieldBacking for $t {
            fn zero() -> Self {
                0
            }

            fn one() -> Self {
                1
            }

            fn from_u128_reduced(source: u128, order: &Self) -> Self {
                match <$t>::try_from(source) {
                    Ok(value) => value.modulo(order),
                    Err(_) => (source % (*order as u128)) as $t,
                }
            }

            fn to_f64(&self) -> f64 {
                *self as f64
            }

            fn random_below<R: Rng + ?Sized>(bound: &Self, rng: &mut R) -> Self {
                assert!(*bound > 0, "bound must be positive");
                let threshold = <$t>::MAX - <$t>::MAX % *bound;
                loop {
                    let candidate: $t = rng.random();
                    if candidate < threshold {
                        return candidate % *bound;
                    }
                }
            }
        }
    )*};
}

impl_field_backing!(u8, u16, u32, u64, u128);

impl FieldBacking for BigUint {
    fn zero() -> Self {
        BigUint::zero()
    }

    fn one() -> Self {
        BigUint::one()
    }

    fn from_u128_reduced(source: u128, order: &Self) -> Self {
        BigUint::from(source).modulo(order)
    }

    fn to_f64(&self) -> f64 {
        self.words()
            .iter()
            .rev()
            .fold(0.0, |acc, &word| acc * 18446744073709551616.0 + word as f64)
    }

    fn random_below<R: Rng + ?Sized>(bound: &Self, rng: &mut R) -> Self {
        BigUint::random_below(bound, rng)
    }
}
