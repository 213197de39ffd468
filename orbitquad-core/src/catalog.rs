use crate::arithmetic::frac;
use crate::{
    assemble, verify_table, BarycentricOrbit, Domain, OrbitDescriptor, OrbitEntry, QuadError,
    QuadResult, Scalar, SchemeTable, Verification, VerifyOptions,
};

/// A literature rule together with the degree its authors claim.
///
/// Weights sum to one: the rule approximates the mean of a function over its
/// domain, and [`verify`](Self::verify) checks it against
/// [`Domain::mean_monomial`].
#[derive(Debug, Clone, PartialEq)]
pub struct NamedScheme<T> {
    pub name: String,
    pub domain: Domain,
    pub degree: usize,
    pub table: SchemeTable<T>,
}

impl<T: Scalar> NamedScheme<T> {
    /// Certify the degree against the domain's mean values.
    pub fn verify(&self, options: &VerifyOptions) -> QuadResult<Verification<T>> {
        let domain = self.domain;
        verify_table(&self.table, |e| domain.mean_monomial(e), options, T::MODE)
    }
}

/// Every name [`by_name`] accepts.
pub const SCHEME_NAMES: &[&str] = &[
    "gl2",
    "gl3",
    "cube-gauss",
    "disk3",
    "lj1",
    "lj2",
    "lj3",
    "lj4",
    "lj6",
    "lj8",
    "mclaren1",
    "mclaren2",
    "mclaren5",
    "stroud-enr2-5-3",
    "stroud-enr2-5-4",
    "stroud-enr2-5-5a",
    "kym1",
    "kym2b",
];

const DEFAULT_DIM: usize = 3;

/// Build a catalog rule in `T`'s arithmetic.
///
/// `dim` selects the dimension of the cube and `E_n^{r²}` rules (default 3);
/// fixed-dimension rules reject any other value.
pub fn by_name<T: Scalar>(name: &str, dim: Option<usize>) -> QuadResult<NamedScheme<T>> {
    let n = dim.unwrap_or(DEFAULT_DIM);
    let scheme = match name {
        "gl2" => gauss_legendre_2(),
        "gl3" => gauss_legendre_3(),
        "cube-gauss" => cube_gauss(n),
        "disk3" => disk_3(),
        "lj1" => lyness_jespersen(1),
        "lj2" => lyness_jespersen(2),
        "lj3" => lyness_jespersen(3),
        "lj4" => lyness_jespersen(4),
        "lj6" => lyness_jespersen(6),
        "lj8" => lyness_jespersen(8),
        "mclaren1" => mclaren_1(),
        "mclaren2" => mclaren_2(),
        "mclaren5" => mclaren_5(),
        "stroud-enr2-5-3" => stroud_enr2_5_3(n),
        "stroud-enr2-5-4" => stroud_enr2_5_4(n),
        "stroud-enr2-5-5a" => stroud_enr2_5_5a(n),
        "kym1" => kubatko_yeager_maggi_1(),
        "kym2b" => kubatko_yeager_maggi_2b(),
        _ => Err(QuadError::config(format!("unknown scheme '{}'", name))),
    }?;
    if let Some(d) = dim {
        if d != scheme.domain.dimension() {
            return Err(QuadError::config(format!(
                "{} lives on {}, not in dimension {}",
                name, scheme.domain, d
            )));
        }
    }
    Ok(scheme)
}

fn named<T: Scalar>(
    name: &str,
    domain: Domain,
    degree: usize,
    entries: &[OrbitEntry<T>],
) -> QuadResult<NamedScheme<T>> {
    Ok(NamedScheme {
        name: name.to_string(),
        domain,
        degree,
        table: assemble(entries, domain.dimension(), T::MODE)?,
    })
}

/// `√(p/q)`
fn root<T: Scalar>(p: i64, q: i64) -> QuadResult<T> {
    frac::<T>(p, q).sqrt()
}

fn int<T: Scalar>(n: usize) -> QuadResult<T> {
    i64::try_from(n)
        .map(T::from_int)
        .map_err(|_| QuadError::config(format!("{} does not fit in i64", n)))
}

/// `1 / 2^k`
fn inv_pow2<T: Scalar>(k: usize) -> QuadResult<T> {
    T::one().div(&T::from_int(2).powi(k))
}

fn gauss_legendre_2<T: Scalar>() -> QuadResult<NamedScheme<T>> {
    let entries = [OrbitEntry::orbit(frac::<T>(1, 2), OrbitDescriptor::pm(root(1, 3)?))];
    named("gl2", Domain::Interval, 3, &entries)
}

fn gauss_legendre_3<T: Scalar>() -> QuadResult<NamedScheme<T>> {
    let entries = [
        OrbitEntry::orbit(frac::<T>(4, 9), OrbitDescriptor::origin()),
        OrbitEntry::orbit(frac::<T>(5, 18), OrbitDescriptor::pm(root(3, 5)?)),
    ];
    named("gl3", Domain::Interval, 5, &entries)
}

/// Tensor product of the two-point Gauss rule.
fn cube_gauss<T: Scalar>(n: usize) -> QuadResult<NamedScheme<T>> {
    let entries = [OrbitEntry::orbit(inv_pow2(n)?, OrbitDescriptor::pm(root(1, 3)?))];
    named("cube-gauss", Domain::Cube { dim: n }, 3, &entries)
}

/// Four points on the circle of radius `√(1/2)`.
fn disk_3<T: Scalar>() -> QuadResult<NamedScheme<T>> {
    let entries = [OrbitEntry::orbit(
        frac::<T>(1, 4),
        OrbitDescriptor::fsd([(root(1, 2)?, 1)])?,
    )];
    named("disk3", Domain::Disk, 3, &entries)
}

/// Lyness and Jespersen, "Moderate degree symmetric quadrature rules for the
/// triangle" (1975).
fn lyness_jespersen<T: Scalar>(index: usize) -> QuadResult<NamedScheme<T>> {
    use BarycentricOrbit::{S111, S21, S3};
    let f = frac::<T>;
    let (degree, entries) = match index {
        1 => (2, vec![OrbitEntry::barycentric(f(1, 3), S21 { a: f(1, 2) })]),
        2 => (
            2,
            vec![
                OrbitEntry::barycentric(f(3, 4), S3),
                OrbitEntry::barycentric(f(1, 12), S21 { a: T::zero() }),
            ],
        ),
        3 => (
            3,
            vec![
                OrbitEntry::barycentric(f(-9, 16), S3),
                OrbitEntry::barycentric(f(25, 48), S21 { a: f(1, 5) }),
            ],
        ),
        4 => (
            3,
            vec![
                OrbitEntry::barycentric(f(9, 20), S3),
                OrbitEntry::barycentric(f(1, 20), S21 { a: T::zero() }),
                OrbitEntry::barycentric(f(2, 15), S21 { a: f(1, 2) }),
            ],
        ),
        6 => {
            // (3 ± √3) / 6
            let r3 = root::<T>(3, 1)?;
            let a = T::from_int(3).add(&r3).mul(&f(1, 6));
            let b = T::from_int(3).sub(&r3).mul(&f(1, 6));
            (
                4,
                vec![
                    OrbitEntry::barycentric(f(9, 20), S3),
                    OrbitEntry::barycentric(f(-1, 60), S21 { a: T::zero() }),
                    OrbitEntry::barycentric(f(1, 10), S111 { a, b }),
                ],
            )
        }
        8 => {
            let r15 = root::<T>(15, 1)?;
            let w1 = T::from_int(155).sub(&r15).mul(&f(1, 1200));
            let w2 = T::from_int(155).add(&r15).mul(&f(1, 1200));
            let a1 = T::from_int(6).sub(&r15).mul(&f(1, 21));
            let a2 = T::from_int(6).add(&r15).mul(&f(1, 21));
            (
                5,
                vec![
                    OrbitEntry::barycentric(f(9, 40), S3),
                    OrbitEntry::barycentric(w1, S21 { a: a1 }),
                    OrbitEntry::barycentric(w2, S21 { a: a2 }),
                ],
            )
        }
        _ => return Err(QuadError::config(format!("no Lyness-Jespersen rule {}", index))),
    };
    // barycentric (λ₀, λ₁, λ₂) maps to (λ₁, λ₂) on the reference triangle
    let table = assemble(&entries, 3, T::MODE)?.drop_leading_coordinate()?;
    Ok(NamedScheme {
        name: format!("lj{}", index),
        domain: Domain::Triangle,
        degree,
        table,
    })
}

/// McLaren, "Optimal numerical integration on a sphere" (1963).
fn mclaren_1<T: Scalar>() -> QuadResult<NamedScheme<T>> {
    let entries = [OrbitEntry::orbit(
        frac::<T>(1, 12),
        OrbitDescriptor::fsd([(root(1, 2)?, 2)])?,
    )];
    named("mclaren1", Domain::Sphere { dim: 3 }, 3, &entries)
}

fn mclaren_2<T: Scalar>() -> QuadResult<NamedScheme<T>> {
    let w = frac::<T>(1, 30);
    let r = frac::<T>(1, 2);
    // (√5 ± 1) / 4
    let r5 = root::<T>(5, 1)?;
    let s = r5.add(&T::one()).mul(&frac::<T>(1, 4));
    let t = r5.sub(&T::one()).mul(&frac::<T>(1, 4));
    let entries = [
        OrbitEntry::orbit(w.clone(), OrbitDescriptor::fsd([(T::one(), 1)])?),
        OrbitEntry::orbit(
            w.clone(),
            OrbitDescriptor::pm_array(vec![r.clone(), s.clone(), t.clone()])?,
        ),
        OrbitEntry::orbit(
            w.clone(),
            OrbitDescriptor::pm_array(vec![t.clone(), r.clone(), s.clone()])?,
        ),
        OrbitEntry::orbit(w, OrbitDescriptor::pm_array(vec![s, t, r])?),
    ];
    named("mclaren2", Domain::Sphere { dim: 3 }, 5, &entries)
}

/// Degree 9; its abscissas are nested square roots.
fn mclaren_5<T: Scalar>() -> QuadResult<NamedScheme<T>> {
    let r5 = root::<T>(5, 1)?;
    let nested = |sign: i64, base: i64, denom: i64| -> QuadResult<T> {
        T::from_int(base)
            .add(&T::from_int(sign).mul(&r5))
            .div(&T::from_int(denom))?
            .sqrt()
    };
    let (r, s) = (nested(1, 5, 10)?, nested(-1, 5, 10)?);
    let (u, v) = (nested(-1, 3, 6)?, nested(1, 3, 6)?);
    let b1 = frac::<T>(25, 840);
    let b2 = frac::<T>(27, 840);
    let mut entries = Vec::new();
    for (weight, pair) in [(&b1, [&r, &s]), (&b2, [&u, &v])] {
        for indices in [[0, 1], [1, 2], [2, 0]] {
            let magnitudes = vec![pair[0].clone(), pair[1].clone()];
            entries.push(OrbitEntry::orbit(
                weight.clone(),
                OrbitDescriptor::pm_array0(magnitudes, indices.to_vec())?,
            ));
        }
    }
    entries.push(OrbitEntry::orbit(b2, OrbitDescriptor::pm(root(1, 3)?)));
    named("mclaren5", Domain::Sphere { dim: 3 }, 9, &entries)
}

/// Stroud, "Approximate calculation of multiple integrals" (1971), `E_n^{r²}`
/// formulas of degree 5.
fn stroud_enr2_5_3<T: Scalar>(n: usize) -> QuadResult<NamedScheme<T>> {
    if n < 3 {
        return Err(QuadError::config("Stroud E_n^r2 5-3 needs n >= 3"));
    }
    let (np2, nm2) = (int::<T>(n + 2)?, int::<T>(n - 2)?);
    let r = np2.div(&T::from_int(4))?.sqrt()?;
    let s = np2.div(&T::from_int(2).mul(&nm2))?.sqrt()?;
    let sq = np2.mul(&np2);
    let a = T::from_int(4).div(&sq)?;
    let b = nm2.mul(&nm2).div(&sq)?.mul(&inv_pow2(n)?);
    let entries = [
        OrbitEntry::orbit(a, OrbitDescriptor::fsd([(r, 1)])?),
        OrbitEntry::orbit(b, OrbitDescriptor::pm(s)),
    ];
    named("stroud-enr2-5-3", Domain::Enr2 { dim: n }, 5, &entries)
}

/// Spherical product Lobatto rule.
fn stroud_enr2_5_4<T: Scalar>(n: usize) -> QuadResult<NamedScheme<T>> {
    if n == 0 {
        return Err(QuadError::config("dimension must be at least 1"));
    }
    let s = root::<T>(1, 2)?;
    let mut entries = vec![OrbitEntry::point(
        T::from_int(2).div(&int(n + 2)?)?,
        vec![T::zero(); n],
    )];
    for k in 1..=n {
        let rk = int::<T>(k + 2)?.div(&T::from_int(2))?.sqrt()?;
        let mut magnitudes = vec![rk];
        magnitudes.extend(std::iter::repeat(s.clone()).take(n - k));
        // 2^(k-n) / ((k+1)(k+2))
        let weight = inv_pow2::<T>(n - k)?.div(&int::<T>(k + 1)?.mul(&int(k + 2)?))?;
        entries.push(OrbitEntry::orbit(
            weight,
            OrbitDescriptor::pm_array0(magnitudes, (k - 1..n).collect())?,
        ));
    }
    named("stroud-enr2-5-4", Domain::Enr2 { dim: n }, 5, &entries)
}

fn stroud_enr2_5_5a<T: Scalar>(n: usize) -> QuadResult<NamedScheme<T>> {
    if n < 2 {
        return Err(QuadError::config("Stroud E_n^r2 5-5a needs n >= 2"));
    }
    let (np2, nm1, two_n) = (int::<T>(n + 2)?, int::<T>(n - 1)?, int::<T>(2 * n)?);
    let q = T::from_int(2).mul(&np2).sqrt()?;
    let r = np2.add(&nm1.mul(&q)).div(&two_n)?.sqrt()?;
    let s = np2.sub(&q).div(&two_n)?.sqrt()?;
    let a = T::from_int(2).div(&np2)?;
    let b = inv_pow2::<T>(n)?.div(&np2)?;
    let entries = [
        OrbitEntry::point(a, vec![T::zero(); n]),
        OrbitEntry::orbit(b, OrbitDescriptor::fsd([(r, 1), (s, n - 1)])?),
    ];
    named("stroud-enr2-5-5a", Domain::Enr2 { dim: n }, 5, &entries)
}

/// Kubatko, Yeager and Maggi, "New computationally efficient quadrature
/// formulas for triangular prism elements" (2013).
fn kubatko_yeager_maggi_1<T: Scalar>() -> QuadResult<NamedScheme<T>> {
    let entries = [OrbitEntry::point(
        T::one(),
        vec![frac::<T>(1, 3), frac::<T>(1, 3), T::zero()],
    )];
    named("kym1", Domain::Wedge, 1, &entries)
}

fn kubatko_yeager_maggi_2b<T: Scalar>() -> QuadResult<NamedScheme<T>> {
    let (zero, one, third) = (T::zero(), T::one(), frac::<T>(1, 3));
    let z = frac::<T>(2, 3);
    let entries = [
        OrbitEntry::rows(
            frac::<T>(1, 12),
            vec![
                vec![zero.clone(), one.clone(), zero.clone()],
                vec![one, zero.clone(), zero.clone()],
                vec![zero.clone(), zero.clone(), zero],
            ],
        ),
        // above and below the triangle centroid
        OrbitEntry::rows(
            frac::<T>(3, 8),
            vec![
                vec![third.clone(), third.clone(), z.clone()],
                vec![third.clone(), third, z.neg()],
            ],
        ),
    ];
    named("kym2b", Domain::Wedge, 2, &entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DegreeCertificate, ExactnessAnomaly, Surd};
    use approx::assert_relative_eq;

    /// Rules whose abscissas leave the exact field in dimension 3.
    const FLOAT_ONLY: &[&str] = &["mclaren5", "stroud-enr2-5-5a"];

    #[test]
    fn test_floating_rules_reach_their_degree() {
        for &name in SCHEME_NAMES {
            let scheme = by_name::<f64>(name, None).unwrap();
            assert_relative_eq!(scheme.table.weight_sum(), 1.0, epsilon = 1e-14);
            let v = scheme.verify(&VerifyOptions::default()).unwrap();
            assert_eq!(v.certificate, DegreeCertificate::Exact(scheme.degree), "{}", name);
        }
    }

    #[test]
    fn test_exact_rules_reach_their_degree() {
        for &name in SCHEME_NAMES.iter().filter(|n| !FLOAT_ONLY.contains(*n)) {
            let scheme = by_name::<Surd>(name, None).unwrap();
            assert_eq!(scheme.table.weight_sum(), Surd::one(), "{}", name);
            let v = scheme.verify(&VerifyOptions::default()).unwrap();
            assert_eq!(v.certificate, DegreeCertificate::Exact(scheme.degree), "{}", name);
        }
    }

    #[test]
    fn test_nested_roots_not_representable() {
        for &name in FLOAT_ONLY {
            assert!(matches!(
                by_name::<Surd>(name, None),
                Err(QuadError::NotRepresentable(_))
            ));
        }
        // √(2(n+2)) is rational for n = 6
        let scheme = by_name::<Surd>("stroud-enr2-5-5a", Some(6)).unwrap();
        assert_eq!(scheme.table.len(), 1 + 6 * 64);
        let v = scheme.verify(&VerifyOptions::default()).unwrap();
        assert_eq!(v.certificate, DegreeCertificate::Exact(5));
    }

    #[test]
    fn test_dimension_parameter() {
        for n in 2..=5 {
            let scheme = by_name::<f64>("stroud-enr2-5-4", Some(n)).unwrap();
            assert_eq!(scheme.table.dimension(), n);
            let v = scheme.verify(&VerifyOptions::default()).unwrap();
            assert_eq!(v.certificate, DegreeCertificate::Exact(5));
        }
        let scheme = by_name::<f64>("stroud-enr2-5-3", Some(4)).unwrap();
        assert_eq!(scheme.table.len(), 24);
        assert_eq!(by_name::<f64>("cube-gauss", Some(2)).unwrap().table.len(), 4);
        assert!(by_name::<f64>("stroud-enr2-5-3", Some(2)).is_err());
        assert!(matches!(
            by_name::<f64>("gl2", Some(2)),
            Err(QuadError::Configuration(_))
        ));
        assert!(by_name::<f64>("lj5", None).is_err());
        for name in ["cube-gauss", "stroud-enr2-5-3"] {
            assert!(matches!(
                by_name::<f64>(name, Some(64)),
                Err(QuadError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_symmetric_rule_passes_next_odd_degree() {
        let scheme = by_name::<f64>("mclaren5", None).unwrap();
        let v = scheme.verify(&VerifyOptions::default().with_probe(true)).unwrap();
        assert_eq!(v.certificate, DegreeCertificate::Exact(9));
        assert_eq!(
            v.anomaly,
            Some(ExactnessAnomaly {
                failed_degree: 10,
                passed_degree: 11
            })
        );
    }

    #[test]
    fn test_triangle_points_inside_reference_triangle() {
        let scheme = by_name::<f64>("lj8", None).unwrap();
        assert_eq!(scheme.table.len(), 7);
        for (_, p) in scheme.table.iter() {
            assert!(p[0] >= 0.0 && p[1] >= 0.0 && p[0] + p[1] <= 1.0);
        }
    }
}
