// Random number generation.
//
// OS-entropy helpers, a deterministic RNG for reproducible tests, and
// ranged sampling for `BigUint` via rejection sampling (drawing from a
// power-of-two range and discarding draws past an unbiased threshold).

use std::ops::{Range, RangeInclusive};

use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

use crate::biguint::BigUint;

/// Get a random u64 from OS entropy.
pub fn get_random_u64() -> u64 {
    rand::rng().random()
}

/// Get a uniformly random `BigUint` spanning the given number of words.
pub fn get_random_biguint(word_count: usize) -> BigUint {
    let mut rng = rand::rng();
    BigUint::from_words((0..word_count).map(|_| rng.random()).collect())
}

/// Deterministic RNG for testing, seeded from a u64.
pub struct DebugRng {
    inner: StdRng,
}

impl DebugRng {
    pub fn new(seed: u64) -> Self {
        Self { inner: StdRng::seed_from_u64(seed) }
    }

    pub fn get_random_u64(&mut self) -> u64 {
        self.inner.random()
    }
}

impl RngCore for DebugRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }
}

impl BigUint {
    /// A value built from `count` generator words.
    fn random_words<R: Rng + ?Sized>(count: usize, rng: &mut R) -> BigUint {
        BigUint::from_words((0..count).map(|_| rng.random()).collect())
    }

    /// Uniformly random value in `[0, bound)`.
    ///
    /// Rejection sampling: candidates are drawn from the all-ones range
    /// spanning `bound`'s word count and discarded at or past the largest
    /// multiple of `bound` below it. The retry loop is the only
    /// potentially-unbounded iteration in this crate; fewer than half of
    /// all candidates can be rejected, so the expected rejection count is
    /// O(1).
    ///
    /// # Panics
    ///
    /// Panics if `bound` is zero.
    pub fn random_below<R: Rng + ?Sized>(bound: &BigUint, rng: &mut R) -> BigUint {
        assert!(!bound.is_zero(), "bound must be positive");
        let binary_max = BigUint::from_words(vec![u64::MAX; bound.words().len()]);
        let threshold = &binary_max - &(&binary_max % bound);
        loop {
            let candidate = Self::random_words(bound.words().len(), rng);
            if candidate < threshold {
                return &candidate % bound;
            }
        }
    }

    /// Uniformly random value in the half-open range.
    ///
    /// # Panics
    ///
    /// Panics if the range is empty.
    pub fn random_range<R: Rng + ?Sized>(range: &Range<BigUint>, rng: &mut R) -> BigUint {
        assert!(range.start < range.end, "cannot sample from an empty range");
        let span = &range.end - &range.start;
        Self::random_below(&span, rng) + &range.start
    }

    /// Random value in the closed range.
    ///
    /// The span is sampled like [`BigUint::random_below`], except that a
    /// candidate equal to the rejection threshold is also admitted.
    ///
    /// # Panics
    ///
    /// Panics if the range is empty (`start > end`).
    pub fn random_range_inclusive<R: Rng + ?Sized>(
        range: &RangeInclusive<BigUint>,
        rng: &mut R,
    ) -> BigUint {
        let (low, high) = (range.start(), range.end());
        assert!(low <= high, "cannot sample from an empty range");
        if low == high {
            return low.clone();
        }
        let span = high - low;
        let binary_max = BigUint::from_words(vec![u64::MAX; span.words().len()]);
        let threshold = &binary_max - &(&binary_max % &span);
        let candidate = loop {
            let candidate = Self::random_words(span.words().len(), rng);
            if candidate <= threshold {
                break candidate;
            }
        };
        &(&candidate % &span) + low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_rng_is_deterministic() {
        let mut rng1 = DebugRng::new(42);
        let mut rng2 = DebugRng::new(42);
        for _ in 0..10 {
            assert_eq!(rng1.get_random_u64(), rng2.get_random_u64());
        }
    }

    #[test]
    fn debug_rng_different_seeds_differ() {
        let mut rng1 = DebugRng::new(1);
        let mut rng2 = DebugRng::new(2);
        // Overwhelmingly likely to differ
        assert_ne!(rng1.get_random_u64(), rng2.get_random_u64());
    }

    #[test]
    fn os_rng_produces_values() {
        let a = get_random_u64();
        let b = get_random_u64();
        // Extremely unlikely to be equal
        assert_ne!(a, b);
    }

    #[test]
    fn random_below_stays_below_the_bound() {
        let mut rng = DebugRng::new(7);
        let bound = BigUint::from(97u64);
        for _ in 0..1000 {
            assert!(BigUint::random_below(&bound, &mut rng) < bound);
        }
    }

    #[test]
    fn random_range_respects_both_bounds() {
        let mut rng = DebugRng::new(8);
        let range = BigUint::from(50u64)..BigUint::from(60u64);
        for _ in 0..1000 {
            let value = BigUint::random_range(&range, &mut rng);
            assert!(value >= range.start && value < range.end);
        }
    }

    #[test]
    fn random_range_inclusive_respects_both_bounds() {
        let mut rng = DebugRng::new(9);
        let range = BigUint::from(3u64)..=BigUint::from(10u64);
        for _ in 0..1000 {
            let value = BigUint::random_range_inclusive(&range, &mut rng);
            assert!(value >= *range.start() && value <= *range.end());
        }
    }

    #[test]
    fn random_range_inclusive_with_equal_bounds_is_constant() {
        let mut rng = DebugRng::new(10);
        let range = BigUint::from(5u64)..=BigUint::from(5u64);
        assert_eq!(
            BigUint::random_range_inclusive(&range, &mut rng),
            BigUint::from(5u64)
        );
    }

    #[test]
    fn random_range_over_multiple_words() {
        let mut rng = DebugRng::new(11);
        let start = BigUint::from(2u64).pow(100);
        let end = BigUint::from(2u64).pow(130);
        let range = start.clone()..end.clone();
        for _ in 0..100 {
            let value = BigUint::random_range(&range, &mut rng);
            assert!(value >= start && value < end);
        }
    }

    #[test]
    #[should_panic(expected = "empty range")]
    fn empty_range_is_fatal() {
        let mut rng = DebugRng::new(12);
        let range = BigUint::from(5u64)..BigUint::from(5u64);
        let _ = BigUint::random_range(&range, &mut rng);
    }

    #[test]
    fn random_word_count_is_respected() {
        let value = get_random_biguint(4);
        assert!(value.words().len() <= 4);
    }
}
