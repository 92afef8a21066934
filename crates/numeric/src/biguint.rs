// Arbitrary-precision unsigned integer.
//
// Stores its value as a `Vec<u64>` of little-endian words (least significant
// word first), kept in canonical form: no trailing zero words, except the
// single-word sequence `[0]` for zero. Size is limited only by memory.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div,
    DivAssign, Mul, MulAssign, Not, Rem, RemAssign, Shl, ShlAssign, Shr, ShrAssign, Sub,
    SubAssign,
};
use std::str::FromStr;

use thiserror::Error;

use crate::modular::ModularOps;

// ---------------------------------------------------------------------------
// Word-level helpers
// ---------------------------------------------------------------------------

/// Add with carry: a + b + carry_in -> (result, carry_out).
#[inline(always)]
const fn addc(a: u64, b: u64, carry_in: u64) -> (u64, u64) {
    let res = a as u128 + b as u128 + carry_in as u128;
    (res as u64, (res >> 64) as u64)
}

/// Subtract with borrow: a - b - borrow_in -> (result, borrow_out).
/// borrow_out is 0 or 1.
#[inline(always)]
const fn sbb(a: u64, b: u64, borrow_in: u64) -> (u64, u64) {
    let res = (a as u128).wrapping_sub(b as u128 + borrow_in as u128);
    (res as u64, (res >> 64) as u64 & 1)
}

/// Multiply-accumulate: a + b*c + carry_in -> (result, carry_out).
#[inline(always)]
const fn mac(a: u64, b: u64, c: u64, carry_in: u64) -> (u64, u64) {
    let res = a as u128 + (b as u128 * c as u128) + carry_in as u128;
    (res as u64, (res >> 64) as u64)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to parse a [`BigUint`] from a string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ParseBigUintError {
    #[error("cannot parse integer from empty string")]
    Empty,
    #[error("invalid digit found in string")]
    InvalidDigit,
}

/// Failure to convert a floating-point value into a [`BigUint`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum FromFloatError {
    #[error("floating-point value is not finite")]
    NotFinite,
    #[error("floating-point value is negative")]
    Negative,
    #[error("floating-point value has a fractional part")]
    NotInteger,
}

// ---------------------------------------------------------------------------
// BigUint
// ---------------------------------------------------------------------------

/// Unsigned arbitrary-precision integer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BigUint {
    words: Vec<u64>,
}

impl BigUint {
    /// Construct from little-endian words. Trailing zero words are trimmed.
    pub fn from_words(words: Vec<u64>) -> Self {
        let mut value = BigUint { words };
        value.canonicalize();
        value
    }

    /// The additive identity.
    pub fn zero() -> Self {
        BigUint { words: vec![0] }
    }

    /// The multiplicative identity.
    pub fn one() -> Self {
        BigUint { words: vec![1] }
    }

    /// Little-endian words of the canonical representation.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Consume self, yielding the canonical word vector.
    pub fn into_words(self) -> Vec<u64> {
        self.words
    }

    pub fn is_zero(&self) -> bool {
        self.words.len() == 1 && self.words[0] == 0
    }

    /// Total storage width in bits (always a multiple of the word width).
    pub fn bit_width(&self) -> usize {
        self.words.len() * 64
    }

    /// Position of the highest set bit plus one. Zero for the value zero.
    pub fn used_bits(&self) -> usize {
        let last = self.words[self.words.len() - 1];
        self.bit_width() - last.leading_zeros() as usize
    }

    /// Number of zero bits below the lowest set bit. For the value zero this
    /// reports the full storage width.
    pub fn trailing_zero_bits(&self) -> usize {
        let zero_words = self.words.iter().take_while(|&&w| w == 0).count();
        let first_value_bits = match self.words.get(zero_words) {
            Some(word) => word.trailing_zeros() as usize,
            None => 0,
        };
        zero_words * 64 + first_value_bits
    }

    /// Strip trailing (most significant) zero words, leaving `[0]` for zero.
    fn canonicalize(&mut self) {
        while self.words.len() > 1 && self.words[self.words.len() - 1] == 0 {
            self.words.pop();
        }
        if self.words.is_empty() {
            self.words.push(0);
        }
    }
}

impl Default for BigUint {
    fn default() -> Self {
        BigUint::zero()
    }
}

// ---------------------------------------------------------------------------
// Conversions from native integers and floats
// ---------------------------------------------------------------------------

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {$(
        impl From<$t> for BigUint {
            #[inline]
            fn from(value: $t) -> BigUint {
                BigUint::from_words(vec![value as u64])
            }
        }
    )*};
}

impl_from_unsigned!(u8, u16, u32, u64, usize);

impl From<u128> for BigUint {
    fn from(value: u128) -> BigUint {
        BigUint::from_words(vec![value as u64, (value >> 64) as u64])
    }
}

impl BigUint {
    /// Convert a float by first truncating toward zero. Fails only on
    /// non-finite or negative input.
    pub fn from_f64(source: f64) -> Result<Self, FromFloatError> {
        Self::try_from(source.trunc())
    }
}

impl TryFrom<f64> for BigUint {
    type Error = FromFloatError;

    /// Exact conversion: fails on non-finite, negative, or fractional input.
    fn try_from(source: f64) -> Result<Self, FromFloatError> {
        if !source.is_finite() {
            return Err(FromFloatError::NotFinite);
        }
        if source < 0.0 {
            return Err(FromFloatError::Negative);
        }
        if source == 0.0 {
            return Ok(BigUint::zero());
        }
        if source.trunc() != source {
            return Err(FromFloatError::NotInteger);
        }

        // Decompose the IEEE 754 representation. An integral double is
        // mantissa * 2^exponent with the implicit leading bit restored.
        let bits = source.to_bits();
        let exponent = ((bits >> 52) & 0x7ff) as i64 - 1075;
        let mantissa = (bits & ((1u64 << 52) - 1)) | (1u64 << 52);
        if exponent >= 0 {
            Ok(BigUint::from(mantissa).shl_bits(exponent as usize))
        } else {
            // Integral, so the low bits being shifted out are all zero.
            Ok(BigUint::from(mantissa >> (-exponent) as u32))
        }
    }
}

// ---------------------------------------------------------------------------
// Radix string parsing and decimal formatting
// ---------------------------------------------------------------------------

impl BigUint {
    /// How many digits of the given radix fit losslessly in one word, and the
    /// radix raised to that count. The returned power is 0 when the radix
    /// packs the word exactly (e.g. 16 hex digits per 64-bit word), in which
    /// case parsed chunks are directly the word sequence.
    fn chars_per_word(radix: u32) -> (usize, u64) {
        let radix = radix as u64;
        let mut power: u64 = 0;
        let mut new_power: u64 = 1;
        let mut overflow = false;
        let mut count: i64 = -1;
        while !overflow {
            count += 1;
            power = new_power;
            let (next, did_overflow) = power.overflowing_mul(radix);
            new_power = next;
            overflow = did_overflow;
        }
        if new_power == 0 {
            ((count + 1) as usize, 0)
        } else {
            (count as usize, power)
        }
    }

    /// Parse from a string in the given radix (2..=36). Underscores are
    /// ignored as digit-group separators.
    ///
    /// # Panics
    ///
    /// Panics if `radix` is outside `2..=36`.
    pub fn from_str_radix(text: &str, radix: u32) -> Result<Self, ParseBigUintError> {
        assert!((2..=36).contains(&radix), "radix must be in 2..=36");
        let text: String = text.chars().filter(|&c| c != '_').collect();
        if text.is_empty() {
            return Err(ParseBigUintError::Empty);
        }
        if !text.is_ascii() || !text.chars().all(|c| c.is_digit(radix)) {
            return Err(ParseBigUintError::InvalidDigit);
        }

        let (chars_per_word, power) = Self::chars_per_word(radix);

        // Consume the input from the least significant end in word-sized
        // chunks.
        let bytes = text.as_bytes();
        let mut chunks: Vec<u64> = Vec::new();
        let mut end = bytes.len();
        while end > 0 {
            let start = end.saturating_sub(chars_per_word);
            let chunk = &text[start..end];
            let value =
                u64::from_str_radix(chunk, radix).map_err(|_| ParseBigUintError::InvalidDigit)?;
            chunks.push(value);
            end = start;
        }

        if power == 0 {
            return Ok(BigUint::from_words(chunks));
        }
        let word_power = BigUint::from(power);
        let mut value = BigUint::zero();
        for &chunk in chunks.iter().rev() {
            value = value.mul_impl(&word_power).add_impl(&BigUint::from(chunk));
        }
        Ok(value)
    }
}

impl FromStr for BigUint {
    type Err = ParseBigUintError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        BigUint::from_str_radix(text, 10)
    }
}

impl fmt::Display for BigUint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        // Peel off word-sized decimal chunks, the inverse of the chunked
        // parser.
        let (chars_per_word, power) = Self::chars_per_word(10);
        let divisor = BigUint::from(power);
        let mut chunks: Vec<u64> = Vec::new();
        let mut value = self.clone();
        while !value.is_zero() {
            let (quotient, remainder) = value.div_rem(&divisor);
            chunks.push(remainder.words[0]);
            value = quotient;
        }
        let mut chunks = chunks.into_iter().rev();
        if let Some(first) = chunks.next() {
            write!(f, "{}", first)?;
        }
        for chunk in chunks {
            write!(f, "{:0width$}", chunk, width = chars_per_word)?;
        }
        Ok(())
    }
}

impl fmt::Debug for BigUint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigUint({})", self)
    }
}

// ---------------------------------------------------------------------------
// Comparison
// ---------------------------------------------------------------------------

impl Ord for BigUint {
    fn cmp(&self, other: &Self) -> Ordering {
        // Canonical form makes the word count the primary key.
        if self.words.len() != other.words.len() {
            return self.words.len().cmp(&other.words.len());
        }
        for i in (0..self.words.len()).rev() {
            match self.words[i].cmp(&other.words[i]) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for BigUint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Core arithmetic
// ---------------------------------------------------------------------------

impl BigUint {
    fn add_impl(&self, rhs: &BigUint) -> BigUint {
        let (short, long) = if self.words.len() < rhs.words.len() {
            (&self.words, &rhs.words)
        } else {
            (&rhs.words, &self.words)
        };
        let mut new = Vec::with_capacity(long.len() + 1);
        let mut carry = 0u64;
        for i in 0..short.len() {
            let (value, c) = addc(short[i], long[i], carry);
            new.push(value);
            carry = c;
        }
        for i in short.len()..long.len() {
            let (value, c) = addc(long[i], 0, carry);
            new.push(value);
            carry = c;
        }
        new.push(carry);
        BigUint::from_words(new)
    }

    fn sub_impl(&self, rhs: &BigUint) -> BigUint {
        if self.words.len() < rhs.words.len() {
            panic!("subtracting past zero on BigUint");
        }
        let mut new = Vec::with_capacity(self.words.len());
        let mut borrow = 0u64;
        for i in 0..self.words.len() {
            let subtrahend = if i < rhs.words.len() { rhs.words[i] } else { 0 };
            let (value, b) = sbb(self.words[i], subtrahend, borrow);
            new.push(value);
            borrow = b;
        }
        if borrow != 0 {
            panic!("subtracting past zero on BigUint");
        }
        BigUint::from_words(new)
    }

    fn mul_impl(&self, rhs: &BigUint) -> BigUint {
        let (short, long) = if self.words.len() < rhs.words.len() {
            (&self.words, &rhs.words)
        } else {
            (&rhs.words, &self.words)
        };
        // Schoolbook multiplication with full double-width partial products.
        let mut new = vec![0u64; short.len() + long.len()];
        for i in 0..long.len() {
            let mut carry = 0u64;
            for j in 0..short.len() {
                let (value, c) = mac(new[i + j], long[i], short[j], carry);
                new[i + j] = value;
                carry = c;
            }
            new[i + short.len()] = carry;
        }
        BigUint::from_words(new)
    }

    /// Binary long division.
    ///
    /// # Panics
    ///
    /// Panics when dividing by zero.
    pub fn div_rem(&self, rhs: &BigUint) -> (BigUint, BigUint) {
        if rhs.is_zero() {
            panic!("division by zero on BigUint");
        }
        if self < rhs {
            return (BigUint::zero(), self.clone());
        }
        if self == rhs {
            return (BigUint::one(), BigUint::zero());
        }

        let n = self.used_bits() - rhs.used_bits();
        let mut remainder = self.clone();
        let mut quotient = BigUint::zero();
        let mut shifted_rhs = rhs.shl_bits(n);
        let mut quotient_bit = BigUint::one().shl_bits(n);

        for _ in 0..=n {
            if shifted_rhs <= remainder {
                remainder = remainder.sub_impl(&shifted_rhs);
                quotient = quotient.add_impl(&quotient_bit);
            }
            shifted_rhs = shifted_rhs.shr_bits(1);
            quotient_bit = quotient_bit.shr_bits(1);
        }

        (quotient, remainder)
    }

    fn div_impl(&self, rhs: &BigUint) -> BigUint {
        self.div_rem(rhs).0
    }

    fn rem_impl(&self, rhs: &BigUint) -> BigUint {
        self.div_rem(rhs).1
    }

    fn shl_bits(&self, bits: usize) -> BigUint {
        if bits == 0 {
            return self.clone();
        }
        let word_shift = bits / 64;
        let bit_shift = bits % 64;

        let mut new = self.words.clone();
        new.push(0);
        if bit_shift != 0 {
            for i in (1..new.len()).rev() {
                new[i] = new[i] << bit_shift | new[i - 1] >> (64 - bit_shift);
            }
            new[0] <<= bit_shift;
        }

        let mut shifted = vec![0u64; word_shift];
        shifted.extend(new);
        BigUint::from_words(shifted)
    }

    fn shr_bits(&self, bits: usize) -> BigUint {
        if bits == 0 {
            return self.clone();
        }
        let word_shift = bits / 64;
        let bit_shift = bits % 64;

        if word_shift >= self.words.len() {
            return BigUint::zero();
        }
        let mut new: Vec<u64> = self.words[word_shift..].to_vec();
        if bit_shift != 0 {
            for i in 0..new.len() - 1 {
                new[i] = new[i] >> bit_shift | new[i + 1] << (64 - bit_shift);
            }
            let last = new.len() - 1;
            new[last] >>= bit_shift;
        }
        BigUint::from_words(new)
    }

    fn and_impl(&self, rhs: &BigUint) -> BigUint {
        // High words of the longer operand meet implicit zeros.
        let count = self.words.len().min(rhs.words.len());
        BigUint::from_words((0..count).map(|i| self.words[i] & rhs.words[i]).collect())
    }

    fn or_impl(&self, rhs: &BigUint) -> BigUint {
        let (short, long) = if self.words.len() < rhs.words.len() {
            (&self.words, &rhs.words)
        } else {
            (&rhs.words, &self.words)
        };
        let mut new: Vec<u64> = short.iter().zip(long.iter()).map(|(s, l)| s | l).collect();
        new.extend_from_slice(&long[short.len()..]);
        BigUint::from_words(new)
    }

    fn xor_impl(&self, rhs: &BigUint) -> BigUint {
        let (short, long) = if self.words.len() < rhs.words.len() {
            (&self.words, &rhs.words)
        } else {
            (&rhs.words, &self.words)
        };
        let mut new: Vec<u64> = short.iter().zip(long.iter()).map(|(s, l)| s ^ l).collect();
        new.extend_from_slice(&long[short.len()..]);
        BigUint::from_words(new)
    }

    fn not_impl(&self) -> BigUint {
        // Complements only the currently stored words. This is a finite-width
        // complement over the present word count, not an infinite-precision
        // two's-complement negation.
        BigUint::from_words(self.words.iter().map(|&w| !w).collect())
    }

    /// Raise to a non-negative integer power by square-and-multiply.
    /// A negative exponent yields zero (no fractional results exist for an
    /// unsigned integer type).
    pub fn pow(&self, exponent: i64) -> BigUint {
        if exponent == 0 {
            return BigUint::one();
        }
        if exponent == 1 {
            return self.clone();
        }
        if *self <= BigUint::one() {
            return self.clone();
        }
        if exponent < 0 {
            return BigUint::zero();
        }

        let mut result = BigUint::one();
        let mut base = self.clone();
        let mut exp = exponent as u64;
        while exp > 0 {
            if exp & 1 == 1 {
                result = result.mul_impl(&base);
            }
            exp >>= 1;
            base = base.mul_impl(&base);
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Operator impls
// ---------------------------------------------------------------------------

macro_rules! impl_binop {
    ($imp:ident, $method:ident, $inner:ident) => {
        impl $imp<BigUint> for BigUint {
            type Output = BigUint;
            #[inline]
            fn $method(self, rhs: BigUint) -> BigUint {
                (&self).$inner(&rhs)
            }
        }
        impl $imp<&BigUint> for BigUint {
            type Output = BigUint;
            #[inline]
            fn $method(self, rhs: &BigUint) -> BigUint {
                (&self).$inner(rhs)
            }
        }
        impl $imp<BigUint> for &BigUint {
            type Output = BigUint;
            #[inline]
            fn $method(self, rhs: BigUint) -> BigUint {
                self.$inner(&rhs)
            }
        }
        impl $imp<&BigUint> for &BigUint {
            type Output = BigUint;
            #[inline]
            fn $method(self, rhs: &BigUint) -> BigUint {
                self.$inner(rhs)
            }
        }
    };
}

macro_rules! impl_binop_assign {
    ($imp:ident, $method:ident, $inner:ident) => {
        impl $imp<BigUint> for BigUint {
            #[inline]
            fn $method(&mut self, rhs: BigUint) {
                *self = (&*self).$inner(&rhs);
            }
        }
        impl $imp<&BigUint> for BigUint {
            #[inline]
            fn $method(&mut self, rhs: &BigUint) {
                *self = (&*self).$inner(rhs);
            }
        }
    };
}

impl_binop!(Add, add, add_impl);
impl_binop!(Sub, sub, sub_impl);
impl_binop!(Mul, mul, mul_impl);
impl_binop!(Div, div, div_impl);
impl_binop!(Rem, rem, rem_impl);
impl_binop!(BitAnd, bitand, and_impl);
impl_binop!(BitOr, bitor, or_impl);
impl_binop!(BitXor, bitxor, xor_impl);

impl_binop_assign!(AddAssign, add_assign, add_impl);
impl_binop_assign!(SubAssign, sub_assign, sub_impl);
impl_binop_assign!(MulAssign, mul_assign, mul_impl);
impl_binop_assign!(DivAssign, div_assign, div_impl);
impl_binop_assign!(RemAssign, rem_assign, rem_impl);
impl_binop_assign!(BitAndAssign, bitand_assign, and_impl);
impl_binop_assign!(BitOrAssign, bitor_assign, or_impl);
impl_binop_assign!(BitXorAssign, bitxor_assign, xor_impl);

impl Not for BigUint {
    type Output = BigUint;
    #[inline]
    fn not(self) -> BigUint {
        (&self).not_impl()
    }
}

impl Not for &BigUint {
    type Output = BigUint;
    #[inline]
    fn not(self) -> BigUint {
        self.not_impl()
    }
}

macro_rules! impl_shift_unsigned {
    ($($t:ty),*) => {$(
        impl Shl<$t> for &BigUint {
            type Output = BigUint;
            #[inline]
            fn shl(self, rhs: $t) -> BigUint {
                self.shl_bits(rhs as usize)
            }
        }
        impl Shl<$t> for BigUint {
            type Output = BigUint;
            #[inline]
            fn shl(self, rhs: $t) -> BigUint {
                (&self).shl_bits(rhs as usize)
            }
        }
        impl Shr<$t> for &BigUint {
            type Output = BigUint;
            #[inline]
            fn shr(self, rhs: $t) -> BigUint {
                self.shr_bits(rhs as usize)
            }
        }
        impl Shr<$t> for BigUint {
            type Output = BigUint;
            #[inline]
            fn shr(self, rhs: $t) -> BigUint {
                (&self).shr_bits(rhs as usize)
            }
        }
        impl ShlAssign<$t> for BigUint {
            #[inline]
            fn shl_assign(&mut self, rhs: $t) {
                *self = (&*self).shl_bits(rhs as usize);
            }
        }
        impl ShrAssign<$t> for BigUint {
            #[inline]
            fn shr_assign(&mut self, rhs: $t) {
                *self = (&*self).shr_bits(rhs as usize);
            }
        }
    )*};
}

// Negative shift counts invert the direction.
macro_rules! impl_shift_signed {
    ($($t:ty),*) => {$(
        impl Shl<$t> for &BigUint {
            type Output = BigUint;
            #[inline]
            fn shl(self, rhs: $t) -> BigUint {
                if rhs < 0 {
                    self.shr_bits(rhs.unsigned_abs() as usize)
                } else {
                    self.shl_bits(rhs as usize)
                }
            }
        }
        impl Shl<$t> for BigUint {
            type Output = BigUint;
            #[inline]
            fn shl(self, rhs: $t) -> BigUint {
                &self << rhs
            }
        }
        impl Shr<$t> for &BigUint {
            type Output = BigUint;
            #[inline]
            fn shr(self, rhs: $t) -> BigUint {
                if rhs < 0 {
                    self.shl_bits(rhs.unsigned_abs() as usize)
                } else {
                    self.shr_bits(rhs as usize)
                }
            }
        }
        impl Shr<$t> for BigUint {
            type Output = BigUint;
            #[inline]
            fn shr(self, rhs: $t) -> BigUint {
                &self >> rhs
            }
        }
        impl ShlAssign<$t> for BigUint {
            #[inline]
            fn shl_assign(&mut self, rhs: $t) {
                *self = &*self << rhs;
            }
        }
        impl ShrAssign<$t> for BigUint {
            #[inline]
            fn shr_assign(&mut self, rhs: $t) {
                *self = &*self >> rhs;
            }
        }
    )*};
}

impl_shift_unsigned!(u8, u16, u32, u64, u128, usize);
impl_shift_signed!(i8, i16, i32, i64, i128, isize);

// ---------------------------------------------------------------------------
// Modular arithmetic
// ---------------------------------------------------------------------------

impl ModularOps for BigUint {
    fn modulo(&self, modulus: &Self) -> Self {
        assert!(!modulus.is_zero(), "modulus must be positive");
        self.rem_impl(modulus)
    }

    fn adding(&self, other: &Self, modulus: &Self) -> Self {
        assert!(!modulus.is_zero(), "modulus must be positive");
        let lhs = self.modulo(modulus);
        let rhs = other.modulo(modulus);
        lhs.add_impl(&rhs).modulo(modulus)
    }

    fn subtracting(&self, other: &Self, modulus: &Self) -> Self {
        assert!(!modulus.is_zero(), "modulus must be positive");
        let lhs = self.modulo(modulus);
        let rhs = other.modulo(modulus);
        if lhs >= rhs {
            lhs.sub_impl(&rhs)
        } else {
            // Add the modulus back: wrapping below zero is undefined here.
            modulus.add_impl(&lhs).sub_impl(&rhs)
        }
    }

    fn multiplying(&self, other: &Self, modulus: &Self) -> Self {
        assert!(!modulus.is_zero(), "modulus must be positive");
        // Double-and-reduce over the value's own bit width, so the full
        // product is never materialized.
        let last_bit = BigUint::one().shl_bits(self.bit_width() - 1);
        let mut lhs = self.modulo(modulus);
        let rhs = other.modulo(modulus);
        let mut d = BigUint::zero();
        let mp2 = modulus.shr_bits(1);
        for _ in 0..self.bit_width() {
            d = if d > mp2 {
                d.shl_bits(1).sub_impl(modulus)
            } else {
                d.shl_bits(1)
            };
            if !lhs.and_impl(&last_bit).is_zero() {
                d = d.adding(&rhs, modulus);
            }
            lhs = lhs.shl_bits(1);
        }
        d.modulo(modulus)
    }

    fn exponentiating(&self, exponent: &Self, modulus: &Self) -> Self {
        assert!(!modulus.is_zero(), "modulus must be positive");
        let mut lhs = self.clone();
        let mut rhs = exponent.clone();
        let mut result = BigUint::one();
        while !rhs.is_zero() {
            if rhs.words[0] & 1 == 1 {
                result = result.multiplying(&lhs, modulus);
            }
            rhs = rhs.shr_bits(1);
            lhs = lhs.multiplying(&lhs, modulus);
        }
        result.modulo(modulus)
    }

    fn inverse(&self, modulus: &Self) -> Option<Self> {
        assert!(*modulus > BigUint::one(), "modulus must be greater than one");
        // Iterative extended Euclid, with the Bezout coefficient tracked via
        // subtraction under the modulus so no negative intermediate value is
        // ever formed.
        let mut r0 = modulus.clone();
        let mut r1 = self.modulo(modulus);
        let mut t0 = BigUint::zero();
        let mut t1 = BigUint::one();
        while !r1.is_zero() {
            let (quotient, remainder) = r0.div_rem(&r1);
            let t2 = t0.subtracting(&quotient.multiplying(&t1, modulus), modulus);
            r0 = r1;
            r1 = remainder;
            t0 = t1;
            t1 = t2;
        }
        if r0 == BigUint::one() {
            Some(t0)
        } else {
            None
        }
    }

    /// Negative numbers cannot be represented and wrapping around is not an
    /// option for an arbitrary-precision integer, so the returned Bezout
    /// coefficients are meaningless and fixed at zero (one for the
    /// degenerate `other == 0` case).
    fn gcd_decomposition(&self, other: &Self) -> (Self, Self, Self) {
        if other.is_zero() {
            return (self.clone(), BigUint::one(), BigUint::zero());
        }
        let mut a = self.clone();
        let mut b = other.clone();
        while !b.is_zero() {
            let remainder = a.rem_impl(&b);
            a = b;
            b = remainder;
        }
        (a, BigUint::zero(), BigUint::zero())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::DebugRng;

    const MAX: u64 = u64::MAX;

    fn words(words: &[u64]) -> BigUint {
        BigUint::from_words(words.to_vec())
    }

    fn parse(text: &str) -> BigUint {
        text.parse().unwrap()
    }

    #[test]
    fn init_trims_trailing_zero_words() {
        assert_eq!(words(&[0, 0, 0, 0, 0]).words(), &[0]);
        assert_eq!(words(&[0, 1, 0, 0, 0]).words(), &[0, 1]);
        assert_eq!(words(&[0, 0, 0, 0, 1]).words(), &[0, 0, 0, 0, 1]);
        assert_eq!(BigUint::from_words(vec![]).words(), &[0]);
    }

    #[test]
    fn string_round_trip() {
        let text = "245436734638587562330084522450672087566546356742200100037";
        assert_eq!(parse(text).to_string(), text);
        assert_eq!(parse("0").to_string(), "0");
    }

    #[test]
    fn parse_failures() {
        assert_eq!("".parse::<BigUint>(), Err(ParseBigUintError::Empty));
        assert_eq!("_".parse::<BigUint>(), Err(ParseBigUintError::Empty));
        assert_eq!("12a".parse::<BigUint>(), Err(ParseBigUintError::InvalidDigit));
        assert_eq!("-1".parse::<BigUint>(), Err(ParseBigUintError::InvalidDigit));
        assert_eq!(
            BigUint::from_str_radix("102", 2),
            Err(ParseBigUintError::InvalidDigit)
        );
    }

    #[test]
    fn parse_ignores_underscores() {
        assert_eq!(parse("1_000_000"), BigUint::from(1_000_000u64));
    }

    #[test]
    fn parse_radix_16_packs_words_directly() {
        assert_eq!(BigUint::from_str_radix("ff", 16).unwrap(), BigUint::from(255u64));
        // 2^64 is a 17-digit hex value crossing the word boundary.
        let crossing = BigUint::from_str_radix("10000000000000000", 16).unwrap();
        assert_eq!(crossing.words(), &[0, 1]);
    }

    #[test]
    fn parse_radix_3_accumulates() {
        assert_eq!(BigUint::from_str_radix("120", 3), Ok(BigUint::from(15u64)));
    }

    #[test]
    #[should_panic(expected = "radix must be in 2..=36")]
    fn parse_radix_below_two_is_a_precondition_violation() {
        let _ = BigUint::from_str_radix("10", 1);
    }

    #[test]
    fn equality() {
        assert_eq!(BigUint::from(3u64), BigUint::from(3u64));
        assert_ne!(BigUint::from(3u64), BigUint::from(5u64));
    }

    #[test]
    fn comparison() {
        assert!(words(&[0]) < words(&[1]));
        assert!(words(&[MAX - 1]) < words(&[MAX]));
        assert!(words(&[MAX, MAX]) + BigUint::one() < words(&[1, 0, 1]));
    }

    #[test]
    fn shifts() {
        assert_eq!(words(&[0]) << 12, words(&[0]));
        assert_eq!(words(&[1]) << 0, words(&[1]));
        assert_eq!(words(&[1]) << 1, words(&[2]));
        assert_eq!(words(&[1]) << 64, words(&[0, 1]));

        assert_eq!(words(&[0]) >> 12, words(&[0]));
        assert_eq!(words(&[1]) >> 0, words(&[1]));
        assert_eq!(words(&[2]) >> 1, words(&[1]));
        assert_eq!(words(&[0, 1]) >> 64, words(&[1]));
    }

    #[test]
    fn negative_shift_counts_invert_direction() {
        assert_eq!(words(&[2]) << -1, words(&[1]));
        assert_eq!(words(&[1]) >> -65, words(&[0, 2]));
    }

    #[test]
    fn shift_crosses_word_boundaries() {
        assert_eq!(words(&[1]) << 70, words(&[0, 64]));
        assert_eq!(words(&[0, 64]) >> 70, words(&[1]));
        assert_eq!(words(&[MAX]) << 4, words(&[MAX << 4, 0xF]));
    }

    #[test]
    fn addition() {
        assert_eq!((words(&[0]) + BigUint::one()).words(), &[1]);
        assert_eq!((words(&[MAX]) + BigUint::one()).words(), &[0, 1]);
        assert_eq!((words(&[MAX, MAX]) + BigUint::one()).words(), &[0, 0, 1]);
        assert_eq!((words(&[MAX, MAX, MAX]) + BigUint::one()).words(), &[0, 0, 0, 1]);
        assert_eq!((words(&[MAX - 1, MAX]) + BigUint::one()).words(), &[MAX, MAX]);
    }

    #[test]
    fn subtraction() {
        assert_eq!((words(&[1]) - BigUint::one()).words(), &[0]);
        assert_eq!((words(&[0, 1]) - BigUint::one()).words(), &[MAX]);
        assert_eq!((words(&[0, 0, 1]) - BigUint::one()).words(), &[MAX, MAX]);
        assert_eq!((words(&[0, 0, 0, 1]) - BigUint::one()).words(), &[MAX, MAX, MAX]);
        assert_eq!((words(&[MAX, MAX]) - BigUint::one()).words(), &[MAX - 1, MAX]);
    }

    #[test]
    #[should_panic(expected = "subtracting past zero")]
    fn subtraction_past_zero_is_fatal() {
        let _ = BigUint::one() - BigUint::from(2u64);
    }

    #[test]
    fn multiplication() {
        assert_eq!((words(&[0]) * words(&[0])).words(), &[0]);
        assert_eq!((words(&[MAX]) * words(&[0])).words(), &[0]);
        assert_eq!((words(&[24]) * words(&[2])).words(), &[48]);
        assert_eq!((words(&[MAX]) * words(&[1])).words(), &[MAX]);
        assert_eq!((words(&[MAX]) * words(&[2])).words(), &[MAX - 1, 1]);
        assert_eq!((words(&[MAX]) * words(&[MAX])).words(), &[1, MAX - 1]);
        assert_eq!(
            (words(&[MAX, MAX]) * words(&[MAX, MAX])).words(),
            &[1, 0, MAX - 1, MAX]
        );
    }

    #[test]
    fn division() {
        assert_eq!((words(&[48]) / words(&[2])).words(), &[24]);
        assert_eq!((words(&[MAX]) / words(&[1])).words(), &[MAX]);
        assert_eq!((words(&[MAX - 1, 1]) / words(&[2])).words(), &[MAX]);
        assert_eq!((words(&[1, MAX - 1]) / words(&[MAX])).words(), &[MAX]);
        assert_eq!(
            (words(&[1, 0, MAX - 1, MAX]) / words(&[MAX, MAX])).words(),
            &[MAX, MAX]
        );
    }

    #[test]
    fn remainder() {
        assert_eq!((words(&[48]) % words(&[2])).words(), &[0]);
        assert_eq!((words(&[MAX]) % words(&[1])).words(), &[0]);
        assert_eq!((words(&[MAX, 1]) % words(&[2])).words(), &[1]);
        assert_eq!((words(&[3, MAX - 1]) % words(&[MAX])).words(), &[2]);
        assert_eq!((words(&[10, 0, MAX, MAX]) % words(&[MAX, MAX])).words(), &[10]);
    }

    #[test]
    #[should_panic(expected = "division by zero")]
    fn division_by_zero_is_fatal() {
        let _ = BigUint::one() / BigUint::zero();
    }

    #[test]
    fn power() {
        assert_eq!(BigUint::from(2u64).pow(10), BigUint::from(1024u64));
        assert_eq!((words(&[10]).pow(5)).words(), &[100_000]);
        assert_eq!(
            words(&[10]).pow(50).to_string(),
            format!("1{}", "0".repeat(50))
        );
        assert_eq!(BigUint::from(7u64).pow(0), BigUint::one());
        assert_eq!(BigUint::from(7u64).pow(1), BigUint::from(7u64));
        assert_eq!(BigUint::from(7u64).pow(-3), BigUint::zero());
        assert_eq!(BigUint::one().pow(-3), BigUint::one());
    }

    #[test]
    fn bitwise_and_zips_to_the_shorter_operand() {
        assert_eq!((words(&[5]) & words(&[11])).words(), &[1]);
        assert_eq!((words(&[5]) & words(&[7])).words(), &[5]);
        assert_eq!((words(&[2, 13]) & words(&[4])).words(), &[0]);
        assert_eq!((words(&[2, 13]) & words(&[11, 3])).words(), &[2, 1]);
    }

    #[test]
    fn bitwise_or_extends_to_the_longer_operand() {
        assert_eq!((words(&[5]) | words(&[11])).words(), &[15]);
        assert_eq!((words(&[5]) | words(&[7])).words(), &[7]);
        assert_eq!((words(&[2, 13]) | words(&[4])).words(), &[6, 13]);
        assert_eq!((words(&[2, 13]) | words(&[11, 3])).words(), &[11, 15]);
    }

    #[test]
    fn bitwise_xor_extends_to_the_longer_operand() {
        assert_eq!((words(&[5]) ^ words(&[11])).words(), &[14]);
        assert_eq!((words(&[5]) ^ words(&[7])).words(), &[2]);
        assert_eq!((words(&[2, 13]) ^ words(&[4])).words(), &[6, 13]);
        assert_eq!((words(&[2, 13]) ^ words(&[11, 3])).words(), &[9, 14]);
    }

    #[test]
    fn trailing_zero_bits() {
        assert_eq!(words(&[0]).trailing_zero_bits(), 64);
        assert_eq!(words(&[1]).trailing_zero_bits(), 0);
        assert_eq!(words(&[0, 1]).trailing_zero_bits(), 64);
        assert_eq!(words(&[0, 0, 1]).trailing_zero_bits(), 128);
    }

    #[test]
    fn used_bits() {
        assert_eq!(words(&[0]).used_bits(), 0);
        assert_eq!(words(&[1]).used_bits(), 1);
        assert_eq!(words(&[MAX]).used_bits(), 64);
        assert_eq!(words(&[0, 1]).used_bits(), 65);
    }

    #[test]
    fn not_complements_only_the_stored_words() {
        assert_eq!(!words(&[0]), words(&[MAX]));
        assert_eq!(!words(&[1]), words(&[MAX - 1]));
        assert_eq!(!words(&[0, 0, 1]), words(&[MAX, MAX, MAX - 1]));
        // The complement of an all-ones word collapses to zero.
        assert_eq!(!words(&[MAX]), BigUint::zero());
    }

    #[test]
    fn float_conversion() {
        assert_eq!(BigUint::try_from(1.0), Ok(words(&[1])));
        assert_eq!(BigUint::try_from(1.0e10), Ok(words(&[10_000_000_000])));
        assert_eq!(BigUint::from_f64(1.23456e2), Ok(words(&[123])));
        assert_eq!(BigUint::from_f64(12345e40).unwrap().to_string().len(), 45);
        assert_eq!(BigUint::try_from(0.0), Ok(BigUint::zero()));

        assert_eq!(BigUint::try_from(f64::NAN), Err(FromFloatError::NotFinite));
        assert_eq!(BigUint::try_from(f64::INFINITY), Err(FromFloatError::NotFinite));
        assert_eq!(BigUint::try_from(-1.0), Err(FromFloatError::Negative));
        assert_eq!(BigUint::try_from(0.5), Err(FromFloatError::NotInteger));
        assert_eq!(BigUint::from_f64(1.5), Ok(words(&[1])));
    }

    #[test]
    fn float_conversion_round_trips_through_display() {
        // 2^90 is exactly representable as a double.
        let value = BigUint::try_from(2f64.powi(90)).unwrap();
        assert_eq!(value, BigUint::from(2u64).pow(90));
    }

    #[test]
    fn compound_assignments() {
        let mut a = BigUint::from(3u64);
        a += BigUint::from(3u64);
        a -= BigUint::one();
        a *= BigUint::from(4u64);
        a /= BigUint::from(5u64);
        a %= BigUint::from(3u64);
        a <<= 3;
        a >>= 2;
        a |= BigUint::from(3u64);
        a &= BigUint::from(6u64);
        a ^= BigUint::from(5u64);
        assert_eq!(a, BigUint::from(7u64));
    }

    #[test]
    fn recreation_from_parsed_value() {
        let a = parse("6189700642690137449562111");
        assert_eq!(a.words(), &[6349221339662123007, 335544]);
        let b = a.clone();
        assert_eq!(b, a);
    }

    #[test]
    fn carry_into_a_new_word() {
        assert_eq!((words(&[MAX]) + BigUint::one()).words(), &[0, 1]);
    }

    #[test]
    fn long_division_matches_manual_remainder() {
        let n = parse("123456789012345678901234567890");
        assert_eq!(n % BigUint::from(97u64), BigUint::from(52u64));
    }

    #[test]
    fn add_sub_round_trip_on_random_values() {
        let mut rng = DebugRng::new(42);
        for _ in 0..100 {
            let a_len = (rng.get_random_u64() % 8 + 1) as usize;
            let b_len = (rng.get_random_u64() % 8 + 1) as usize;
            let a = words(&(0..a_len).map(|_| rng.get_random_u64()).collect::<Vec<_>>());
            let b = words(&(0..b_len).map(|_| rng.get_random_u64()).collect::<Vec<_>>());
            assert_eq!(&(&a + &b) - &b, a);
        }
    }

    #[test]
    fn division_identity_on_random_values() {
        let mut rng = DebugRng::new(43);
        for _ in 0..100 {
            let a_len = (rng.get_random_u64() % 8 + 1) as usize;
            let b_len = (rng.get_random_u64() % 4 + 1) as usize;
            let a = words(&(0..a_len).map(|_| rng.get_random_u64()).collect::<Vec<_>>());
            let b = words(&(0..b_len).map(|_| rng.get_random_u64()).collect::<Vec<_>>());
            if b.is_zero() {
                continue;
            }
            let (q, r) = a.div_rem(&b);
            assert!(r < b);
            assert_eq!(&(&q * &b) + &r, a);
        }
    }

    #[test]
    fn modular_operations() {
        let m = BigUint::from(97u64);
        let a = parse("123456789012345678901234567890");
        let b = parse("98765432109876543210");

        let reduced = a.modulo(&m);
        assert!(reduced < m);
        assert_eq!(reduced, BigUint::from(52u64));

        assert_eq!(
            a.adding(&b, &m),
            (&a + &b).modulo(&m)
        );
        assert_eq!(
            a.multiplying(&b, &m),
            (&a * &b).modulo(&m)
        );
        // Subtraction adds the modulus back instead of wrapping.
        let x = BigUint::from(5u64);
        let y = BigUint::from(90u64);
        assert_eq!(x.subtracting(&y, &m), BigUint::from(12u64));
        assert_eq!(y.subtracting(&x, &m), BigUint::from(85u64));
        assert_eq!(x.subtracting(&x, &m), BigUint::zero());
    }

    #[test]
    fn modular_exponentiation() {
        let m = BigUint::from(1000u64);
        assert_eq!(
            BigUint::from(2u64).exponentiating(&BigUint::from(10u64), &m),
            BigUint::from(24u64)
        );
        // Fermat: a^(p-1) = 1 mod p for prime p.
        let p = BigUint::from(97u64);
        let a = parse("123456789");
        assert_eq!(a.exponentiating(&BigUint::from(96u64), &p), BigUint::one());
    }

    #[test]
    fn modular_inverse() {
        let p = BigUint::from(97u64);
        assert_eq!(BigUint::from(3u64).inverse(&p), Some(BigUint::from(65u64)));
        for a in 1u64..97 {
            let a = BigUint::from(a);
            let inv = a.inverse(&p).unwrap();
            assert_eq!(a.multiplying(&inv, &p), BigUint::one());
        }
        // Not coprime: no inverse.
        assert_eq!(BigUint::from(6u64).inverse(&BigUint::from(9u64)), None);
        assert_eq!(BigUint::zero().inverse(&p), None);
    }

    #[test]
    fn gcd_decomposition_coefficients_are_zeroed() {
        let a = BigUint::from(12u64);
        let b = BigUint::from(18u64);
        let (gcd, x, y) = a.gcd_decomposition(&b);
        assert_eq!(gcd, BigUint::from(6u64));
        assert_eq!(x, BigUint::zero());
        assert_eq!(y, BigUint::zero());

        let (gcd, x, y) = a.gcd_decomposition(&BigUint::zero());
        assert_eq!(gcd, a);
        assert_eq!(x, BigUint::one());
        assert_eq!(y, BigUint::zero());
    }

    #[test]
    fn matches_crypto_bigint_on_256_bit_operands() {
        use crypto_bigint::U256;

        let mut rng = DebugRng::new(1234);
        for _ in 0..200 {
            let a_limbs = [
                rng.get_random_u64(),
                rng.get_random_u64(),
                rng.get_random_u64(),
                rng.get_random_u64(),
            ];
            let b_limbs = [
                rng.get_random_u64(),
                rng.get_random_u64(),
                rng.get_random_u64(),
                rng.get_random_u64(),
            ];
            let a = words(&a_limbs);
            let b = words(&b_limbs);
            let ca = U256::from_words(a_limbs);
            let cb = U256::from_words(b_limbs);

            // Full 512-bit product.
            let (lo, hi) = ca.widening_mul(&cb).split();
            let mut product_words = lo.as_words().to_vec();
            product_words.extend_from_slice(hi.as_words());
            assert_eq!(&a * &b, words(&product_words));

            // Quotient and remainder.
            if !b.is_zero() {
                let (q, r) = ca.div_rem(&cb.to_nz().unwrap());
                let (big_q, big_r) = a.div_rem(&b);
                assert_eq!(big_q, words(q.as_words()));
                assert_eq!(big_r, words(r.as_words()));
            }

            // Sum, reconstructed from the wrapped low part plus the carry.
            let sum = &a + &b;
            let low = words(ca.wrapping_add(&cb).as_words());
            let high = &sum >> 256;
            assert!(high <= BigUint::one());
            assert_eq!(&(&high << 256) + &low, sum);
        }
    }
}
