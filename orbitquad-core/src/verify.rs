use crate::{
    ensure_mode, evaluate_monomial, monomial_exponents, ArithmeticMode, QuadError, QuadResult,
    Scalar, SchemeTable, Tolerance,
};
use std::fmt;
use tracing::{debug, warn};

/// Knobs for [`verify_degree`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerifyOptions {
    /// Highest degree checked (inclusive).
    pub degree_bound: usize,
    /// Floating comparison bound; ignored in exact mode.
    pub tolerance: Tolerance,
    /// After the first failing degree `d`, also check `d + 1` and report an
    /// anomaly if it passes.
    pub probe_next_degree: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            degree_bound: 30,
            tolerance: Tolerance::default(),
            probe_next_degree: false,
        }
    }
}

impl VerifyOptions {
    pub fn with_degree_bound(mut self, degree_bound: usize) -> Self {
        self.degree_bound = degree_bound;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_probe(mut self, probe: bool) -> Self {
        self.probe_next_degree = probe;
        self
    }
}

/// Outcome of a degree search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegreeCertificate {
    /// Every monomial up to this degree is integrated exactly, and some
    /// monomial of the next degree is not.
    Exact(usize),
    /// Already the constant fails.
    NotExact,
    /// No failure up to the bound.
    Undetermined { at_least: usize },
}

impl DegreeCertificate {
    /// Degree that is certainly integrated exactly, if any.
    pub fn lower_bound(&self) -> Option<usize> {
        match *self {
            DegreeCertificate::Exact(d) => Some(d),
            DegreeCertificate::NotExact => None,
            DegreeCertificate::Undetermined { at_least } => Some(at_least),
        }
    }
}

impl fmt::Display for DegreeCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegreeCertificate::Exact(d) => write!(f, "degree {}", d),
            DegreeCertificate::NotExact => write!(f, "not exact"),
            DegreeCertificate::Undetermined { at_least } => {
                write!(f, "undetermined, degree ≥ {}", at_least)
            }
        }
    }
}

/// First monomial whose quadrature value disagreed with its exact integral.
#[derive(Debug, Clone, PartialEq)]
pub struct MonomialMismatch<T> {
    pub exponents: Vec<usize>,
    pub quadrature: T,
    pub exact: T,
}

/// The degree after the first failure passed completely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExactnessAnomaly {
    pub failed_degree: usize,
    pub passed_degree: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Verification<T> {
    pub certificate: DegreeCertificate,
    pub mismatch: Option<MonomialMismatch<T>>,
    pub anomaly: Option<ExactnessAnomaly>,
    /// Monomials compared, probe included.
    pub monomials_checked: usize,
}

/// Determine the largest degree up to which `table` integrates every monomial
/// exactly.
///
/// `evaluate(table, exponents)` returns the quadrature value of the monomial
/// and `exact_integral(exponents)` its reference value. Degrees run from 0 to
/// `options.degree_bound`; the search stops at the first disagreeing monomial.
pub fn verify_degree<T, E, I>(
    table: &SchemeTable<T>,
    evaluate: E,
    exact_integral: I,
    options: &VerifyOptions,
    mode: ArithmeticMode,
) -> QuadResult<Verification<T>>
where
    T: Scalar,
    E: Fn(&SchemeTable<T>, &[usize]) -> QuadResult<T>,
    I: Fn(&[usize]) -> QuadResult<T>,
{
    ensure_mode(mode, T::MODE)?;
    if table.is_empty() {
        return Err(QuadError::config("cannot verify a table without points"));
    }
    let check = |degree: usize, checked: &mut usize| -> QuadResult<Option<MonomialMismatch<T>>> {
        for exponents in monomial_exponents(table.dimension(), degree) {
            *checked += 1;
            let quadrature = evaluate(table, &exponents)?;
            let exact = exact_integral(&exponents)?;
            if !quadrature.agrees(&exact, &options.tolerance) {
                return Ok(Some(MonomialMismatch {
                    exponents,
                    quadrature,
                    exact,
                }));
            }
        }
        Ok(None)
    };

    let mut checked = 0;
    for degree in 0..=options.degree_bound {
        let Some(mismatch) = check(degree, &mut checked)? else {
            debug!(degree, "degree integrated exactly");
            continue;
        };
        debug!(degree, exponents = ?mismatch.exponents, "first failing monomial");
        let certificate = match degree {
            0 => DegreeCertificate::NotExact,
            d => DegreeCertificate::Exact(d - 1),
        };
        let mut anomaly = None;
        if options.probe_next_degree && check(degree + 1, &mut checked)?.is_none() {
            warn!(
                failed = degree,
                passed = degree + 1,
                "scheme integrates a higher degree than its certificate"
            );
            anomaly = Some(ExactnessAnomaly {
                failed_degree: degree,
                passed_degree: degree + 1,
            });
        }
        return Ok(Verification {
            certificate,
            mismatch: Some(mismatch),
            anomaly,
            monomials_checked: checked,
        });
    }
    Ok(Verification {
        certificate: DegreeCertificate::Undetermined {
            at_least: options.degree_bound,
        },
        mismatch: None,
        anomaly: None,
        monomials_checked: checked,
    })
}

/// Weighted sum of the monomial over the table's points.
pub fn quadrature_sum<T: Scalar>(table: &SchemeTable<T>, exponents: &[usize]) -> QuadResult<T> {
    Ok(table.integrate(|x| evaluate_monomial(x, exponents)))
}

/// [`verify_degree`] with the plain weighted sum as evaluation function.
pub fn verify_table<T, I>(
    table: &SchemeTable<T>,
    exact_integral: I,
    options: &VerifyOptions,
    mode: ArithmeticMode,
) -> QuadResult<Verification<T>>
where
    T: Scalar,
    I: Fn(&[usize]) -> QuadResult<T>,
{
    verify_degree(table, quadrature_sum, exact_integral, options, mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arithmetic::frac;
    use crate::{assemble, Domain, OrbitDescriptor, OrbitEntry, Surd};

    const F: ArithmeticMode = ArithmeticMode::Floating;
    const E: ArithmeticMode = ArithmeticMode::Exact;

    fn gauss2<T: Scalar>() -> SchemeTable<T> {
        let x = frac::<T>(1, 3).sqrt().unwrap();
        SchemeTable::new(1, vec![T::one(), T::one()], vec![vec![x.neg()], vec![x]]).unwrap()
    }

    fn gauss3<T: Scalar>() -> SchemeTable<T> {
        let x = frac::<T>(3, 5).sqrt().unwrap();
        let entries = vec![
            OrbitEntry::orbit(frac::<T>(8, 9), OrbitDescriptor::origin()),
            OrbitEntry::orbit(frac::<T>(5, 9), OrbitDescriptor::pm(x)),
        ];
        assemble(&entries, 1, T::MODE).unwrap()
    }

    fn interval<T: Scalar>(e: &[usize]) -> QuadResult<T> {
        Domain::Interval.integrate_monomial(e)
    }

    #[test]
    fn test_gauss_legendre_two_points_is_degree_three() {
        let v = verify_table(&gauss2::<f64>(), interval, &VerifyOptions::default(), F).unwrap();
        assert_eq!(v.certificate, DegreeCertificate::Exact(3));
        let m = v.mismatch.unwrap();
        assert_eq!(m.exponents, vec![4]);
        assert!(v.anomaly.is_none());

        let v = verify_table(&gauss2::<Surd>(), interval, &VerifyOptions::default(), E).unwrap();
        assert_eq!(v.certificate, DegreeCertificate::Exact(3));
        assert_eq!(v.mismatch.unwrap().quadrature, Surd::ratio(2, 9));
    }

    #[test]
    fn test_bound_reached_is_undetermined() {
        let options = VerifyOptions::default().with_degree_bound(1);
        let v = verify_table(&gauss3::<f64>(), interval, &options, F).unwrap();
        assert_eq!(v.certificate, DegreeCertificate::Undetermined { at_least: 1 });
        assert_eq!(v.certificate.to_string(), "undetermined, degree ≥ 1");
        assert_eq!(v.monomials_checked, 2);

        let v = verify_table(&gauss3::<Surd>(), interval, &VerifyOptions::default(), E).unwrap();
        assert_eq!(v.certificate, DegreeCertificate::Exact(5));
    }

    #[test]
    fn test_constant_failure_is_not_exact() {
        let t = SchemeTable::new(1, vec![1.0], vec![vec![0.0]]).unwrap();
        let v = verify_table(&t, interval, &VerifyOptions::default(), F).unwrap();
        assert_eq!(v.certificate, DegreeCertificate::NotExact);
        assert_eq!(v.certificate.lower_bound(), None);
    }

    #[test]
    fn test_probe_reports_anomaly() {
        // one point at 1/√3 with weight 2: fails x, passes x²
        let x = Surd::ratio(1, 3).sqrt().unwrap();
        let t = SchemeTable::new(1, vec![Surd::from_int(2)], vec![vec![x]]).unwrap();
        let options = VerifyOptions::default().with_probe(true);
        let v = verify_table(&t, interval, &options, E).unwrap();
        assert_eq!(v.certificate, DegreeCertificate::Exact(0));
        assert_eq!(
            v.anomaly,
            Some(ExactnessAnomaly {
                failed_degree: 1,
                passed_degree: 2
            })
        );

        let v = verify_table(&t, interval, &VerifyOptions::default(), E).unwrap();
        assert!(v.anomaly.is_none());
    }

    #[test]
    fn test_tolerance_is_configurable() {
        let x = (1.0_f64 / 3.0).sqrt() + 1e-9;
        let t = SchemeTable::new(1, vec![1.0, 1.0], vec![vec![-x], vec![x]]).unwrap();
        let strict = verify_table(&t, interval, &VerifyOptions::default(), F).unwrap();
        assert_eq!(strict.certificate, DegreeCertificate::Exact(1));
        let loose = VerifyOptions::default().with_tolerance(Tolerance::uniform(1e-6));
        let v = verify_table(&t, interval, &loose, F).unwrap();
        assert_eq!(v.certificate, DegreeCertificate::Exact(3));
    }

    #[test]
    fn test_custom_evaluation_function() {
        // evaluation that ignores the table and always answers the exact value
        let v = verify_degree(
            &gauss2::<f64>(),
            |_, e| interval(e),
            interval,
            &VerifyOptions::default().with_degree_bound(6),
            F,
        )
        .unwrap();
        assert_eq!(v.certificate, DegreeCertificate::Undetermined { at_least: 6 });
    }

    #[test]
    fn test_errors() {
        let empty = SchemeTable::<f64>::new(1, vec![], vec![]).unwrap();
        assert!(matches!(
            verify_table(&empty, interval, &VerifyOptions::default(), F),
            Err(QuadError::Configuration(_))
        ));
        assert!(matches!(
            verify_table(&gauss2::<f64>(), interval, &VerifyOptions::default(), E),
            Err(QuadError::ModeMismatch { .. })
        ));
        // the exact disk measure needs π
        let t = SchemeTable::new(2, vec![Surd::one()], vec![vec![Surd::zero(); 2]]).unwrap();
        let disk = |e: &[usize]| Domain::Disk.integrate_monomial::<Surd>(e);
        assert!(matches!(
            verify_table(&t, disk, &VerifyOptions::default(), E),
            Err(QuadError::NotRepresentable(_))
        ));
    }
}
