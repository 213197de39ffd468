use crate::{QuadError, QuadResult, Scalar};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::fmt;

/// Reference domain with a closed-form monomial integral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    /// `[-1, 1]`
    Interval,
    /// `[-1, 1]^dim`
    Cube { dim: usize },
    /// Triangle with vertices (0,0), (1,0), (0,1).
    Triangle,
    /// Tetrahedron with vertices at the origin and the three unit vectors.
    Tetrahedron,
    /// `Triangle × [-1, 1]`
    Wedge,
    /// Unit disk.
    Disk,
    /// Surface of the unit sphere in `dim` dimensions.
    Sphere { dim: usize },
    /// Unit ball in `dim` dimensions.
    Ball { dim: usize },
    /// `ℝ^dim` with weight `exp(-|x|²)`.
    Enr2 { dim: usize },
}

/// `coeff · π^(half_pi / 2)`
#[derive(Debug, Clone, PartialEq)]
struct PiMultiple {
    coeff: BigRational,
    half_pi: i64,
}

impl PiMultiple {
    fn rational(coeff: BigRational) -> Self {
        Self { coeff, half_pi: 0 }
    }

    fn int(n: i64) -> Self {
        Self::rational(BigRational::from_integer(n.into()))
    }

    fn mul(&self, other: &Self) -> Self {
        Self {
            coeff: &self.coeff * &other.coeff,
            half_pi: self.half_pi + other.half_pi,
        }
    }

    fn div(&self, other: &Self) -> QuadResult<Self> {
        if other.coeff.is_zero() {
            return Err(QuadError::DivisionByZero);
        }
        Ok(Self {
            coeff: &self.coeff / &other.coeff,
            half_pi: self.half_pi - other.half_pi,
        })
    }

    fn eval<T: Scalar>(&self) -> QuadResult<T> {
        let q = T::from_rational(&self.coeff);
        if self.coeff.is_zero() || self.half_pi == 0 {
            return Ok(q);
        }
        let root_pi = T::pi()?.sqrt()?;
        let factor = root_pi.powi(self.half_pi.unsigned_abs() as usize);
        if self.half_pi > 0 {
            Ok(q.mul(&factor))
        } else {
            q.div(&factor)
        }
    }
}

fn factorial(n: usize) -> BigInt {
    (1..=n).fold(BigInt::one(), |acc, k| acc * BigInt::from(k))
}

/// `Γ(k / 2)` for `k ≥ 1`.
fn gamma_half(k: usize) -> PiMultiple {
    if k % 2 == 0 {
        PiMultiple::rational(BigRational::from_integer(factorial(k / 2 - 1)))
    } else {
        // Γ(m + 1/2) = (2m)! / (4^m m!) · √π
        let m = (k - 1) / 2;
        let denom = num_traits::pow(BigInt::from(4), m) * factorial(m);
        PiMultiple {
            coeff: BigRational::new(factorial(2 * m), denom),
            half_pi: 1,
        }
    }
}

/// `∫_{[-1,1]} x^k`
fn interval(k: usize) -> PiMultiple {
    if k % 2 == 1 {
        PiMultiple::int(0)
    } else {
        PiMultiple::rational(BigRational::new(2.into(), (k + 1).into()))
    }
}

/// `∫` over the unit simplex of `Π xᵢ^kᵢ`: `Π kᵢ! / (Σkᵢ + n)!`
fn simplex(exponents: &[usize]) -> PiMultiple {
    let numer = exponents
        .iter()
        .fold(BigInt::one(), |acc, &k| acc * factorial(k));
    let total: usize = exponents.iter().sum::<usize>() + exponents.len();
    PiMultiple::rational(BigRational::new(numer, factorial(total)))
}

/// `∫_{ℝⁿ} Π xᵢ^kᵢ e^{-|x|²}`, or `None` when some exponent is odd.
fn gamma_product(exponents: &[usize]) -> Option<PiMultiple> {
    if exponents.iter().any(|k| k % 2 == 1) {
        return None;
    }
    Some(
        exponents
            .iter()
            .fold(PiMultiple::int(1), |acc, &k| acc.mul(&gamma_half(k + 1))),
    )
}

/// `∫_{S^{n-1}} Π xᵢ^kᵢ dσ = 2 Π Γ((kᵢ+1)/2) / Γ((Σkᵢ + n)/2)`
fn sphere(exponents: &[usize]) -> QuadResult<PiMultiple> {
    match gamma_product(exponents) {
        None => Ok(PiMultiple::int(0)),
        Some(g) => {
            let total = exponents.iter().sum::<usize>() + exponents.len();
            PiMultiple::int(2).mul(&g).div(&gamma_half(total))
        }
    }
}

impl Domain {
    pub fn dimension(&self) -> usize {
        match self {
            Domain::Interval => 1,
            Domain::Triangle | Domain::Disk => 2,
            Domain::Tetrahedron | Domain::Wedge => 3,
            Domain::Cube { dim }
            | Domain::Sphere { dim }
            | Domain::Ball { dim }
            | Domain::Enr2 { dim } => *dim,
        }
    }

    fn exact_integral(&self, exponents: &[usize]) -> QuadResult<PiMultiple> {
        let n = self.dimension();
        if n == 0 {
            return Err(QuadError::config(format!("{} has dimension 0", self)));
        }
        if exponents.len() != n {
            return Err(QuadError::config(format!(
                "{} exponents for {} of dimension {}",
                exponents.len(),
                self,
                n
            )));
        }
        Ok(match self {
            Domain::Interval | Domain::Cube { .. } => exponents
                .iter()
                .fold(PiMultiple::int(1), |acc, &k| acc.mul(&interval(k))),
            Domain::Triangle | Domain::Tetrahedron => simplex(exponents),
            Domain::Wedge => simplex(&exponents[..2]).mul(&interval(exponents[2])),
            Domain::Sphere { .. } => sphere(exponents)?,
            Domain::Disk | Domain::Ball { .. } => {
                // radial factor ∫₀¹ r^(|k| + n - 1) dr
                let total = exponents.iter().sum::<usize>() + n;
                sphere(exponents)?.mul(&PiMultiple::rational(BigRational::new(
                    1.into(),
                    total.into(),
                )))
            }
            Domain::Enr2 { .. } => gamma_product(exponents).unwrap_or_else(|| PiMultiple::int(0)),
        })
    }

    /// Exact integral of `Π xᵢ^kᵢ` over the domain.
    ///
    /// Round domains carry powers of π, which the exact mode cannot represent
    /// unless the integral vanishes.
    pub fn integrate_monomial<T: Scalar>(&self, exponents: &[usize]) -> QuadResult<T> {
        self.exact_integral(exponents)?.eval()
    }

    /// Integral of the constant 1.
    pub fn measure<T: Scalar>(&self) -> QuadResult<T> {
        self.exact_integral(&vec![0; self.dimension()])?.eval()
    }

    /// Integral divided by the measure. Always rational, so it is available
    /// in both modes; rules with weights summing to one are checked against it.
    pub fn mean_monomial<T: Scalar>(&self, exponents: &[usize]) -> QuadResult<T> {
        let measure = self.exact_integral(&vec![0; self.dimension()])?;
        self.exact_integral(exponents)?.div(&measure)?.eval()
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Interval => write!(f, "interval"),
            Domain::Cube { dim } => write!(f, "cube{}", dim),
            Domain::Triangle => write!(f, "triangle"),
            Domain::Tetrahedron => write!(f, "tetrahedron"),
            Domain::Wedge => write!(f, "wedge"),
            Domain::Disk => write!(f, "disk"),
            Domain::Sphere { dim } => write!(f, "sphere{}", dim),
            Domain::Ball { dim } => write!(f, "ball{}", dim),
            Domain::Enr2 { dim } => write!(f, "enr2_{}", dim),
        }
    }
}
