use crate::{ArithmeticMode, Expr, QuadError, QuadResult, Scalar, Tolerance};
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// Trial division bound used when pulling squares out of radicands.
const TRIAL_LIMIT: u64 = 1 << 20;

/// Exact value `Σ qᵢ·√rᵢ` with rational `qᵢ` and distinct square-free
/// integer radicands `rᵢ ≥ 1`.
///
/// Square roots of distinct square-free integers are linearly independent
/// over the rationals, so the normalized term map is canonical and equality
/// is structural.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Surd {
    terms: BTreeMap<BigInt, BigRational>, // radicand -> coefficient
}

impl Surd {
    pub fn rational(q: BigRational) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(BigInt::one(), q);
        let mut out = Self { terms };
        out.simplify();
        out
    }

    /// Literal constant; `denom` is never zero at a call site.
    pub(crate) fn ratio(numer: i64, denom: i64) -> Self {
        Self::rational(BigRational::new(numer.into(), denom.into()))
    }

    /// Exact square root of a non-negative rational.
    pub fn sqrt_rational(q: &BigRational) -> QuadResult<Self> {
        if q.is_negative() {
            return Err(QuadError::NotRepresentable(format!(
                "square root of negative value {}",
                q
            )));
        }
        if q.is_zero() {
            return Ok(<Self as Scalar>::zero());
        }
        // sqrt(p/d) = sqrt(p*d)/d
        let (outside, inside) = split_square(&(q.numer() * q.denom()))?;
        let mut terms = BTreeMap::new();
        terms.insert(inside, BigRational::new(outside, q.denom().clone()));
        Ok(Self { terms })
    }

    /// The value as a rational, if it has no irrational part.
    pub fn as_rational(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => self.terms.get(&BigInt::one()).cloned(),
            _ => None,
        }
    }

    /// Iterate `(radicand, coefficient)` pairs in ascending radicand order.
    pub fn terms(&self) -> impl Iterator<Item = (&BigInt, &BigRational)> {
        self.terms.iter()
    }

    fn simplify(&mut self) {
        self.terms.retain(|_, c| !c.is_zero());
    }

    fn scale(&self, factor: &BigRational) -> Self {
        let mut out = Self {
            terms: self
                .terms
                .iter()
                .map(|(r, c)| (r.clone(), c * factor))
                .collect(),
        };
        out.simplify();
        out
    }

    /// Flip the sign of every term whose radicand is divisible by `p`.
    fn conjugate_at(&self, p: &BigInt) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|(r, c)| {
                    if (r % p).is_zero() {
                        (r.clone(), -c.clone())
                    } else {
                        (r.clone(), c.clone())
                    }
                })
                .collect(),
        }
    }
}

impl Scalar for Surd {
    const MODE: ArithmeticMode = ArithmeticMode::Exact;

    fn zero() -> Self {
        Self {
            terms: BTreeMap::new(),
        }
    }
    fn one() -> Self {
        Self::rational(BigRational::one())
    }
    fn from_int(n: i64) -> Self {
        Self::rational(BigRational::from_integer(n.into()))
    }
    fn from_rational(q: &BigRational) -> Self {
        Self::rational(q.clone())
    }

    fn add(&self, other: &Self) -> Self {
        let mut terms = self.terms.clone();
        for (r, c) in &other.terms {
            *terms.entry(r.clone()).or_insert_with(BigRational::zero) += c;
        }
        let mut out = Self { terms };
        out.simplify();
        out
    }

    fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let mut terms: BTreeMap<BigInt, BigRational> = BTreeMap::new();
        for (r1, c1) in &self.terms {
            for (r2, c2) in &other.terms {
                // square-free r1, r2: r1*r2 = g^2 * (r1/g)*(r2/g)
                let g = r1.gcd(r2);
                let radicand = (r1 / &g) * (r2 / &g);
                let coeff = c1 * c2 * BigRational::from_integer(g);
                *terms.entry(radicand).or_insert_with(BigRational::zero) += coeff;
            }
        }
        let mut out = Self { terms };
        out.simplify();
        out
    }

    fn neg(&self) -> Self {
        Self {
            terms: self
                .terms
                .iter()
                .map(|(r, c)| (r.clone(), -c.clone()))
                .collect(),
        }
    }

    fn div(&self, other: &Self) -> QuadResult<Self> {
        if other.is_zero() {
            return Err(QuadError::DivisionByZero);
        }
        // Multiply through by conjugates until the divisor is rational. Each
        // round removes one prime from the divisor's radicands.
        let mut numer = self.clone();
        let mut denom = other.clone();
        loop {
            if let Some(q) = denom.as_rational() {
                return Ok(numer.scale(&q.recip()));
            }
            let radicand = denom
                .terms
                .keys()
                .find(|r| !r.is_one())
                .cloned()
                .unwrap_or_else(BigInt::one);
            let p = smallest_prime_factor(&radicand)?;
            let conj = denom.conjugate_at(&p);
            numer = numer.mul(&conj);
            denom = denom.mul(&conj);
        }
    }

    fn sqrt(&self) -> QuadResult<Self> {
        match self.as_rational() {
            Some(q) => Self::sqrt_rational(&q),
            None => Err(QuadError::NotRepresentable(format!(
                "nested square root of {}",
                self
            ))),
        }
    }

    fn pi() -> QuadResult<Self> {
        Err(QuadError::NotRepresentable("pi".into()))
    }

    fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    fn agrees(&self, other: &Self, _tol: &Tolerance) -> bool {
        self == other
    }

    fn to_f64(&self) -> f64 {
        self.terms
            .iter()
            .map(|(r, c)| {
                let c = c.to_f64().unwrap_or(f64::NAN);
                if r.is_one() {
                    c
                } else {
                    c * r.to_f64().unwrap_or(f64::NAN).sqrt()
                }
            })
            .sum()
    }
}

impl fmt::Display for Surd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (i, (r, c)) in self.terms.iter().enumerate() {
            let magnitude = c.abs();
            if i == 0 {
                if c.is_negative() {
                    write!(f, "-")?;
                }
            } else if c.is_negative() {
                write!(f, " - ")?;
            } else {
                write!(f, " + ")?;
            }
            if r.is_one() {
                write!(f, "{}", magnitude)?;
            } else if magnitude.is_one() {
                write!(f, "sqrt({})", r)?;
            } else {
                write!(f, "{}*sqrt({})", magnitude, r)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Surd {
    type Err = QuadError;

    fn from_str(s: &str) -> QuadResult<Self> {
        Expr::parse(s)?.eval()
    }
}

/// Split `n > 0` into `(s, f)` with `n = s² · f` and `f` square-free.
fn split_square(n: &BigInt) -> QuadResult<(BigInt, BigInt)> {
    let limit = BigInt::from(TRIAL_LIMIT);
    let mut rest = n.clone();
    let mut outside = BigInt::one();
    let mut inside = BigInt::one();
    let mut p = BigInt::from(2u32);
    let mut exhausted = true;
    while &p * &p <= rest {
        if p > limit {
            exhausted = false;
            break;
        }
        let mut count = 0u32;
        while (&rest % &p).is_zero() {
            rest /= &p;
            count += 1;
        }
        if count >= 2 {
            outside *= p.pow(count / 2);
        }
        if count % 2 == 1 {
            inside *= &p;
        }
        p += 1u32;
    }
    if rest.is_one() {
        return Ok((outside, inside));
    }
    if exhausted {
        // no factor up to sqrt(rest): prime
        inside *= rest;
        return Ok((outside, inside));
    }
    // Every prime factor of `rest` exceeds the trial limit.
    let root = rest.sqrt();
    if &root * &root == rest {
        outside *= root;
    } else if rest < &limit * &limit * &limit {
        // at most two such primes, and not a square: square-free
        inside *= rest;
    } else {
        return Err(QuadError::NotRepresentable(format!(
            "radicand {} is too large to factor",
            n
        )));
    }
    Ok((outside, inside))
}

fn smallest_prime_factor(n: &BigInt) -> QuadResult<BigInt> {
    let limit = BigInt::from(TRIAL_LIMIT);
    let mut p = BigInt::from(2u32);
    while &p * &p <= *n {
        if (n % &p).is_zero() {
            return Ok(p);
        }
        if p > limit {
            return Err(QuadError::NotRepresentable(format!(
                "radicand {} is too large to factor",
                n
            )));
        }
        p += 1u32;
    }
    Ok(n.clone())
}
