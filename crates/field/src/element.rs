// Finite-field element, generic over a field configuration.
//
// The element is a thin value wrapper: every arithmetic operation delegates
// to the backing type's modular operations with the field order as the
// modulus, so the stored value is fully reduced into `[0, order)` after
// every construction and every result.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Rem, RemAssign, Sub, SubAssign};
use std::str::FromStr;

use mathrs_numeric::modular::fmodulo;
use mathrs_numeric::ModularOps;
use rand::Rng;

use crate::backing::FieldBacking;

/// Beyond 2^53 a double cannot represent the order exactly, so float
/// reduction would silently lose precision.
const MAX_EXACT_F64: f64 = 9007199254740992.0;

/// Defines a finite field: the backing integer type and the field order.
///
/// The order must be prime for division to be total over non-zero divisors.
///
/// ```
/// use mathrs_field::{FieldConfig, FieldElement};
///
/// struct F31;
///
/// impl FieldConfig for F31 {
///     type Repr = u8;
///     fn order() -> u8 {
///         31
///     }
/// }
///
/// let x: FieldElement<F31> = FieldElement::from_integer(25);
/// let y = FieldElement::from_integer(10);
/// assert_eq!(x + y, FieldElement::from_integer(4));
/// ```
pub trait FieldConfig: 'static {
    type Repr: FieldBacking;

    /// The field order.
    fn order() -> Self::Repr;
}

/// An element of the finite field described by `C`, with its value always
/// reduced into `[0, order)`.
pub struct FieldElement<C: FieldConfig> {
    value: C::Repr,
    _config: PhantomData<C>,
}

// Manual Clone because C itself carries no bounds.
impl<C: FieldConfig> Clone for FieldElement<C> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _config: PhantomData,
        }
    }
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl<C: FieldConfig> FieldElement<C> {
    /// Wrap a value that is already known to lie in `[0, order)`.
    #[inline]
    fn raw(value: C::Repr) -> Self {
        Self {
            value,
            _config: PhantomData,
        }
    }

    /// Construct from a backing value, reducing it modulo the order.
    pub fn new(value: C::Repr) -> Self {
        Self::raw(value.modulo(&C::order()))
    }

    /// Construct from any integer source, reducing it modulo the order
    /// (even when the source is wider than the backing type).
    pub fn from_integer(source: u128) -> Self {
        Self::raw(C::Repr::from_u128_reduced(source, &C::order()))
    }

    /// Construct from a float, truncating toward zero and reducing
    /// cyclically (so negative sources wrap below the order). `None` for
    /// non-finite sources, or when the order is too large for the
    /// reduction to be exact.
    pub fn from_f64(source: f64) -> Option<Self> {
        if !source.is_finite() {
            return None;
        }
        let value = source.trunc();
        let order = C::order().to_f64();
        if order > MAX_EXACT_F64 {
            return None;
        }
        Some(Self::from_integer(fmodulo(value, order) as u128))
    }

    pub fn zero() -> Self {
        Self::new(C::Repr::zero())
    }

    pub fn one() -> Self {
        Self::new(C::Repr::one())
    }

    /// The field order.
    pub fn order() -> C::Repr {
        C::order()
    }

    /// The reduced backing value.
    pub fn value(&self) -> &C::Repr {
        &self.value
    }

    /// Consume self, yielding the reduced backing value.
    pub fn into_value(self) -> C::Repr {
        self.value
    }
}

// ---------------------------------------------------------------------------
// Field arithmetic
// ---------------------------------------------------------------------------

impl<C: FieldConfig> Add for FieldElement<C> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::raw(self.value.adding(&rhs.value, &C::order()))
    }
}

impl<C: FieldConfig> Sub for FieldElement<C> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::raw(self.value.subtracting(&rhs.value, &C::order()))
    }
}

impl<C: FieldConfig> Mul for FieldElement<C> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::raw(self.value.multiplying(&rhs.value, &C::order()))
    }
}

impl<C: FieldConfig> Div for FieldElement<C> {
    type Output = Self;

    /// # Panics
    ///
    /// Panics when dividing by zero, or when the divisor has no inverse
    /// (which means the configured order is not prime).
    fn div(self, rhs: Self) -> Self {
        if rhs.value == C::Repr::zero() {
            panic!("division by zero in finite field");
        }
        let inverse = match rhs.value.inverse(&C::order()) {
            Some(inverse) => inverse,
            None => panic!("field order is not prime"),
        };
        Self::raw(self.value.multiplying(&inverse, &C::order()))
    }
}

impl<C: FieldConfig> Rem for FieldElement<C> {
    type Output = Self;

    fn rem(self, rhs: Self) -> Self {
        Self::raw(self.value.modulo(&rhs.value))
    }
}

macro_rules! impl_assign {
    ($($imp:ident, $method:ident, $op:ident);*;) => {$(
        impl<C: FieldConfig> $imp for FieldElement<C> {
            fn $method(&mut self, rhs: Self) {
                *self = self.clone().$op(rhs);
            }
        }
    )*};
}

impl_assign! {
    AddAssign, add_assign, add;
    SubAssign, sub_assign, sub;
    MulAssign, mul_assign, mul;
    DivAssign, div_assign, div;
    RemAssign, rem_assign, rem;
}

impl<C: FieldConfig> FieldElement<C> {
    /// `self^exponent` within the field.
    pub fn pow(&self, exponent: &C::Repr) -> Self {
        Self::raw(self.value.exponentiating(exponent, &C::order()))
    }

    /// `self^exponent` with the exponent given as a field element.
    pub fn pow_element(&self, exponent: &Self) -> Self {
        self.pow(&exponent.value)
    }

    /// The multiplicative inverse, or `None` for zero (or, with a
    /// non-prime order, for any divisor of the order).
    pub fn inverse(&self) -> Option<Self> {
        self.value.inverse(&C::order()).map(Self::raw)
    }

    /// Wrap-forward distance from `self` to `other`: the number of
    /// single-step increments (modulo the order) needed to reach `other`.
    pub fn distance_to(&self, other: &Self) -> C::Repr {
        other.value.subtracting(&self.value, &C::order())
    }

    /// Step forward (or, for negative `n`, backward) by `n`, wrapping at
    /// the order.
    pub fn advanced_by(&self, n: i64) -> Self {
        let order = C::order();
        let step = C::Repr::from_u128_reduced(n.unsigned_abs() as u128, &order);
        if n < 0 {
            Self::raw(self.value.subtracting(&step, &order))
        } else {
            Self::raw(self.value.adding(&step, &order))
        }
    }
}

// ---------------------------------------------------------------------------
// Random sampling
// ---------------------------------------------------------------------------

impl<C: FieldConfig> FieldElement<C> {
    /// Uniformly random element of the field.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::raw(C::Repr::random_below(&C::order(), rng))
    }

    /// Random element of the closed, possibly wrapping range
    /// `[low, high]`: the wrap-forward span from `low` to `high` is
    /// sampled inclusively.
    pub fn random_range_inclusive<R: Rng + ?Sized>(low: &Self, high: &Self, rng: &mut R) -> Self {
        let order = C::order();
        let span = high
            .value
            .subtracting(&low.value, &order)
            .adding(&C::Repr::one(), &order);
        if span == C::Repr::zero() {
            // The range covers the whole field.
            return Self::random(rng);
        }
        let offset = C::Repr::random_below(&span, rng);
        Self::raw(low.value.adding(&offset, &order))
    }
}

// ---------------------------------------------------------------------------
// Range iteration
// ---------------------------------------------------------------------------

/// Iterator over a closed range of field elements, stepping by one and
/// wrapping at the field order (so the end may precede the start).
pub struct FieldRange<C: FieldConfig> {
    next: Option<FieldElement<C>>,
    end: FieldElement<C>,
}

impl<C: FieldConfig> FieldRange<C> {
    pub fn inclusive(start: FieldElement<C>, end: FieldElement<C>) -> Self {
        Self {
            next: Some(start),
            end,
        }
    }
}

impl<C: FieldConfig> Iterator for FieldRange<C> {
    type Item = FieldElement<C>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if current != self.end {
            self.next = Some(current.clone() + FieldElement::one());
        }
        Some(current)
    }
}

// ---------------------------------------------------------------------------
// Comparison, hashing, formatting
// ---------------------------------------------------------------------------

impl<C: FieldConfig> PartialEq for FieldElement<C> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<C: FieldConfig> Eq for FieldElement<C> {}

impl<C: FieldConfig> Ord for FieldElement<C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<C: FieldConfig> PartialOrd for FieldElement<C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<C: FieldConfig> Hash for FieldElement<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state)
    }
}

impl<C: FieldConfig> fmt::Display for FieldElement<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<C: FieldConfig> fmt::Debug for FieldElement<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement({:?} mod {:?})", self.value, C::order())
    }
}

impl<C: FieldConfig> FromStr for FieldElement<C> {
    type Err = <C::Repr as FromStr>::Err;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(C::Repr::from_str(text)?))
    }
}
