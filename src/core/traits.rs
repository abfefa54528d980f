//! Core traits for kernel computation

use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul};

/// Floating point type a kernel matrix is stored in
///
/// Implemented for `f32` and `f64`. `f32` halves the memory of an n² matrix
/// at the cost of precision for long sequences and small decay factors.
pub trait KernelFloat:
    Copy
    + Send
    + Sync
    + Debug
    + Display
    + PartialOrd
    + Add<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + AddAssign
    + Sum
    + 'static
{
    /// Additive identity
    fn zero() -> Self;

    /// Multiplicative identity
    fn one() -> Self;

    /// Convert from `f64`, rounding if needed
    fn from_f64(value: f64) -> Self;

    /// Widen to `f64`
    fn to_f64(self) -> f64;

    /// Square root
    fn sqrt(self) -> Self;

    /// True unless NaN or infinite
    fn is_finite(self) -> bool;
}

macro_rules! impl_kernel_float {
    ($t:ty) => {
        impl KernelFloat for $t {
            #[inline]
            fn zero() -> Self {
                0.0
            }

            #[inline]
            fn one() -> Self {
                1.0
            }

            #[inline]
            fn from_f64(value: f64) -> Self {
                value as $t
            }

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn sqrt(self) -> Self {
                <$t>::sqrt(self)
            }

            #[inline]
            fn is_finite(self) -> bool {
                <$t>::is_finite(self)
            }
        }
    };
}

impl_kernel_float!(f32);
impl_kernel_float!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    fn half<T: KernelFloat>() -> T {
        T::one() / (T::one() + T::one())
    }

    #[test]
    fn test_generic_arithmetic() {
        assert_eq!(half::<f32>(), 0.5f32);
        assert_eq!(half::<f64>(), 0.5f64);
        assert_eq!(<f64 as KernelFloat>::sqrt(16.0), 4.0);
    }

    #[test]
    fn test_conversions() {
        assert_eq!(f32::from_f64(0.25), 0.25f32);
        assert_eq!(0.5f32.to_f64(), 0.5f64);
        assert!(!KernelFloat::is_finite(f64::NAN));
        assert!(KernelFloat::is_finite(1.0f32));
    }
}
