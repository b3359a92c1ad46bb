//! Tolerant numeric comparison.
//!
//! Floating values compare with a tolerance scaled by the larger magnitude of
//! the two operands; integers compare exactly.
//!
//! ```
//! use xbeam_solver::ValueCompare;
//!
//! let cmp = ValueCompare::<f64>::default();
//! assert!(cmp.equal(0.1 + 0.2, 0.3));
//! assert!(cmp.less_than(1.0, 1.0 + 1e-9));
//! assert!(!cmp.less_than(0.3, 0.1 + 0.2));
//! ```

use std::marker::PhantomData;

/// Default relative tolerance.
pub const DEFAULT_EPSILON: f64 = 1e-14;

/// Scalar types accepted by [`ValueCompare`].
pub trait Comparable: Copy + PartialOrd {
    fn tolerant_eq(a: Self, b: Self, epsilon: f64) -> bool;
    fn tolerant_lt(a: Self, b: Self, epsilon: f64) -> bool;
    fn tolerant_gt(a: Self, b: Self, epsilon: f64) -> bool;
}

macro_rules! impl_comparable_float {
    ($($t:ty),*) => {$(
        impl Comparable for $t {
            fn tolerant_eq(a: Self, b: Self, epsilon: f64) -> bool {
                let scale = (a.abs()).max(b.abs()) as f64;
                ((a - b).abs() as f64) <= scale * epsilon
            }

            fn tolerant_lt(a: Self, b: Self, epsilon: f64) -> bool {
                let scale = (a.abs()).max(b.abs()) as f64;
                ((b - a) as f64) > scale * epsilon
            }

            fn tolerant_gt(a: Self, b: Self, epsilon: f64) -> bool {
                let scale = (a.abs()).max(b.abs()) as f64;
                ((a - b) as f64) > scale * epsilon
            }
        }
    )*};
}

macro_rules! impl_comparable_exact {
    ($($t:ty),*) => {$(
        impl Comparable for $t {
            fn tolerant_eq(a: Self, b: Self, _epsilon: f64) -> bool {
                a == b
            }

            fn tolerant_lt(a: Self, b: Self, _epsilon: f64) -> bool {
                a < b
            }

            fn tolerant_gt(a: Self, b: Self, _epsilon: f64) -> bool {
                a > b
            }
        }
    )*};
}

impl_comparable_float!(f32, f64);
impl_comparable_exact!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Comparator with a fixed relative epsilon.
#[derive(Debug, Clone, Copy)]
pub struct ValueCompare<T> {
    epsilon: f64,
    _marker: PhantomData<T>,
}

impl<T: Comparable> ValueCompare<T> {
    pub fn new(epsilon: f64) -> Self {
        Self {
            epsilon,
            _marker: PhantomData,
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn equal(&self, a: T, b: T) -> bool {
        T::tolerant_eq(a, b, self.epsilon)
    }

    pub fn less_than(&self, a: T, b: T) -> bool {
        T::tolerant_lt(a, b, self.epsilon)
    }

    pub fn greater_than(&self, a: T, b: T) -> bool {
        T::tolerant_gt(a, b, self.epsilon)
    }
}

impl<T: Comparable> Default for ValueCompare<T> {
    fn default() -> Self {
        Self::new(DEFAULT_EPSILON)
    }
}
