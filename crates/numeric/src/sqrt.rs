// Integer square root.
//
// Binary digit-by-digit method, no floating point: the result satisfies
// `root * root <= value < (root + 1) * (root + 1)`.

use crate::biguint::BigUint;

/// Integer square root capability.
pub trait Sqrt {
    /// The largest `root` with `root * root <= self`.
    ///
    /// # Panics
    ///
    /// Panics for negative signed values.
    fn sqrt(&self) -> Self;
}

macro_rules! impl_sqrt_unsigned {
    ($($t:ty),*) => {$(
        impl Sqrt for $t {
            fn sqrt(&self) -> $t {
                let mut op = *self;
                let mut res: $t = 0;

                // Start the trial bit at the highest even bit position.
                let mut one: $t = (1 as $t) << (<$t>::BITS - 2);
                while one > op {
                    one >>= 2;
                }

                while one != 0 {
                    if op >= res + one {
                        op -= res + one;
                        res += one << 1;
                    }
                    res >>= 1;
                    one >>= 2;
                }
                res
            }
        }
    )*};
}

macro_rules! impl_sqrt_signed {
    ($(($t:ty, $u:ty)),*) => {$(
        impl Sqrt for $t {
            fn sqrt(&self) -> $t {
                assert!(*self >= 0, "cannot take the square root of a negative number");
                (*self as $u).sqrt() as $t
            }
        }
    )*};
}

impl_sqrt_unsigned!(u8, u16, u32, u64, u128, usize);
impl_sqrt_signed!((i8, u8), (i16, u16), (i32, u32), (i64, u64), (i128, u128), (isize, usize));

impl Sqrt for BigUint {
    fn sqrt(&self) -> BigUint {
        let mut op = self.clone();
        let mut res = BigUint::zero();

        let mut one = BigUint::one() << (self.bit_width() - 2);
        while one > op {
            one = one >> 2;
        }

        while !one.is_zero() {
            let step = &res + &one;
            if op >= step {
                op = &op - &step;
                res = &res + &(&one << 1);
            }
            res = res >> 1;
            one = one >> 2;
        }
        res
    }
}
