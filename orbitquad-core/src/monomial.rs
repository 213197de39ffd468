use crate::orbit::binomial;
use crate::Scalar;

/// Every exponent tuple of length `dimension` with total degree `degree`.
///
/// Ordered by descending first exponent, then recursively by the rest:
/// `(2,0), (1,1), (0,2)`.
pub fn monomial_exponents(dimension: usize, degree: usize) -> Vec<Vec<usize>> {
    if dimension == 0 {
        return if degree == 0 { vec![vec![]] } else { vec![] };
    }
    if dimension == 1 {
        return vec![vec![degree]];
    }
    let mut out = Vec::new();
    for first in (0..=degree).rev() {
        for mut tail in monomial_exponents(dimension - 1, degree - first) {
            tail.insert(0, first);
            out.push(tail);
        }
    }
    out
}

/// `C(degree + dimension - 1, dimension - 1)`, or `None` on overflow.
pub fn monomial_count(dimension: usize, degree: usize) -> Option<usize> {
    if dimension == 0 {
        return Some(usize::from(degree == 0));
    }
    binomial(degree + dimension - 1, dimension - 1)
}

/// `Π xᵢ^kᵢ`
pub fn evaluate_monomial<T: Scalar>(point: &[T], exponents: &[usize]) -> T {
    point
        .iter()
        .zip(exponents)
        .fold(T::one(), |acc, (x, &k)| if k == 0 { acc } else { acc.mul(&x.powi(k)) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Surd;

    #[test]
    fn test_exponent_order() {
        assert_eq!(
            monomial_exponents(2, 2),
            vec![vec![2, 0], vec![1, 1], vec![0, 2]]
        );
        assert_eq!(monomial_exponents(1, 4), vec![vec![4]]);
        assert_eq!(monomial_exponents(3, 0), vec![vec![0, 0, 0]]);
    }

    #[test]
    fn test_counts_match_enumeration() {
        for dim in 1..5 {
            for deg in 0..7 {
                let all = monomial_exponents(dim, deg);
                assert_eq!(Some(all.len()), monomial_count(dim, deg));
                assert!(all.iter().all(|e| e.iter().sum::<usize>() == deg));
            }
        }
    }

    #[test]
    fn test_evaluate() {
        assert_eq!(evaluate_monomial(&[2.0, 3.0], &[3, 1]), 24.0);
        assert_eq!(evaluate_monomial(&[0.0, 3.0], &[0, 2]), 9.0);
        let r = Surd::ratio(1, 2).sqrt().unwrap();
        assert_eq!(evaluate_monomial(&[r.clone(), r], &[1, 1]), Surd::ratio(1, 2));
    }
}
