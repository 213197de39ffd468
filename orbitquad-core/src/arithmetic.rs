use crate::{QuadError, QuadResult};
use num_rational::BigRational;
use num_traits::ToPrimitive;
use std::fmt;

/// Selects exact or floating-point arithmetic for one construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticMode {
    /// Rationals extended by square roots, compared for exact equality.
    Exact,
    /// `f64`, compared within a [`Tolerance`].
    Floating,
}

impl fmt::Display for ArithmeticMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArithmeticMode::Exact => write!(f, "exact"),
            ArithmeticMode::Floating => write!(f, "floating"),
        }
    }
}

/// Absolute and relative tolerance for floating comparisons:
/// `|a - b| <= abs + rel * |b|`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerance {
    pub abs: f64,
    pub rel: f64,
}

impl Tolerance {
    pub fn new(abs: f64, rel: f64) -> Self {
        Self { abs, rel }
    }

    /// Same bound for the absolute and relative parts.
    pub fn uniform(tol: f64) -> Self {
        Self { abs: tol, rel: tol }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::uniform(1e-13)
    }
}

/// Arithmetic capability shared by the exact and floating number types.
///
/// Generators, the assembler and the verifier are written once against this
/// trait. `MODE` ties each implementation to its [`ArithmeticMode`], which is
/// how a call detects values of the wrong mode.
pub trait Scalar: Clone + fmt::Debug + fmt::Display + PartialEq {
    const MODE: ArithmeticMode;

    fn zero() -> Self;
    fn one() -> Self;
    fn from_int(n: i64) -> Self;
    fn from_rational(q: &BigRational) -> Self;

    fn add(&self, other: &Self) -> Self;
    fn sub(&self, other: &Self) -> Self;
    fn mul(&self, other: &Self) -> Self;
    fn neg(&self) -> Self;
    fn div(&self, other: &Self) -> QuadResult<Self>;
    fn sqrt(&self) -> QuadResult<Self>;

    /// π, where the mode can represent it.
    fn pi() -> QuadResult<Self>;

    fn is_zero(&self) -> bool;

    /// Equality under the mode's comparison policy. Exact values ignore `tol`.
    fn agrees(&self, other: &Self, tol: &Tolerance) -> bool;

    fn to_f64(&self) -> f64;

    fn powi(&self, k: usize) -> Self {
        let mut acc = Self::one();
        for _ in 0..k {
            acc = acc.mul(self);
        }
        acc
    }
}

/// Rational constant `numer / denom` for literal coefficients; `denom` is
/// never zero at a call site.
pub(crate) fn frac<T: Scalar>(numer: i64, denom: i64) -> T {
    T::from_rational(&BigRational::new(numer.into(), denom.into()))
}

impl Scalar for f64 {
    const MODE: ArithmeticMode = ArithmeticMode::Floating;

    fn zero() -> Self {
        0.0
    }
    fn one() -> Self {
        1.0
    }
    fn from_int(n: i64) -> Self {
        n as f64
    }
    fn from_rational(q: &BigRational) -> Self {
        q.to_f64().unwrap_or(f64::NAN)
    }

    fn add(&self, other: &Self) -> Self {
        self + other
    }
    fn sub(&self, other: &Self) -> Self {
        self - other
    }
    fn mul(&self, other: &Self) -> Self {
        self * other
    }
    fn neg(&self) -> Self {
        -self
    }
    fn div(&self, other: &Self) -> QuadResult<Self> {
        if *other == 0.0 {
            return Err(QuadError::DivisionByZero);
        }
        Ok(self / other)
    }
    fn sqrt(&self) -> QuadResult<Self> {
        if *self < 0.0 {
            return Err(QuadError::NotRepresentable(format!(
                "square root of negative value {}",
                self
            )));
        }
        Ok(f64::sqrt(*self))
    }

    fn pi() -> QuadResult<Self> {
        Ok(std::f64::consts::PI)
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn agrees(&self, other: &Self, tol: &Tolerance) -> bool {
        (self - other).abs() <= tol.abs + tol.rel * other.abs()
    }

    fn to_f64(&self) -> f64 {
        *self
    }

    fn powi(&self, k: usize) -> Self {
        match i32::try_from(k) {
            Ok(k) => f64::powi(*self, k),
            Err(_) => f64::powf(*self, k as f64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_agrees_uses_abs_and_rel() {
        let tol = Tolerance::new(1e-12, 1e-6);
        assert!(1.0e6_f64.agrees(&(1.0e6 + 0.5), &tol));
        assert!(!1.0_f64.agrees(&1.001, &tol));
        assert!(1e-13_f64.agrees(&0.0, &tol));
    }

    #[test]
    fn test_float_sqrt_of_negative_fails() {
        assert!(matches!(
            Scalar::sqrt(&-4.0_f64),
            Err(QuadError::NotRepresentable(_))
        ));
        assert_eq!(Scalar::sqrt(&4.0_f64), Ok(2.0));
    }

    #[test]
    fn test_float_div_by_zero() {
        assert_eq!(Scalar::div(&1.0_f64, &0.0), Err(QuadError::DivisionByZero));
    }

    #[test]
    fn test_frac_and_powi() {
        assert_eq!(frac::<f64>(3, 4), 0.75);
        assert_eq!(Scalar::powi(&2.0_f64, 10), 1024.0);
        assert_eq!(Scalar::powi(&2.0_f64, 0), 1.0);
    }
}
