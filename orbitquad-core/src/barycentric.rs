use crate::arithmetic::frac;
use crate::{ensure_mode, ArithmeticMode, QuadResult, Scalar};

/// Symmetry class of a point set in barycentric coordinates.
///
/// Triangle classes carry three coordinates, tetrahedron classes four. The
/// number of rows depends only on the tag, never on the parameter values.
#[derive(Debug, Clone, PartialEq)]
pub enum BarycentricOrbit<T> {
    /// Triangle centroid.
    S3,
    /// `(a, a, 1-2a)`
    S21 { a: T },
    /// `(a, b, 1-a-b)`
    S111 { a: T, b: T },
    /// Tetrahedron centroid.
    S4,
    /// `(a, a, a, 1-3a)`
    S31 { a: T },
    /// `(a, a, 1/2-a, 1/2-a)`
    S22 { a: T },
    /// `(a, a, b, 1-2a-b)`
    S211 { a: T, b: T },
    /// `(a, b, c, 1-a-b-c)`
    S1111 { a: T, b: T, c: T },
}

impl<T: Scalar> BarycentricOrbit<T> {
    /// Number of barycentric coordinates per row.
    pub fn components(&self) -> usize {
        match self {
            BarycentricOrbit::S3 | BarycentricOrbit::S21 { .. } | BarycentricOrbit::S111 { .. } => 3,
            _ => 4,
        }
    }

    pub fn orbit_size(&self) -> usize {
        match self {
            BarycentricOrbit::S3 | BarycentricOrbit::S4 => 1,
            BarycentricOrbit::S21 { .. } => 3,
            BarycentricOrbit::S31 { .. } => 4,
            BarycentricOrbit::S111 { .. } | BarycentricOrbit::S22 { .. } => 6,
            BarycentricOrbit::S211 { .. } => 12,
            BarycentricOrbit::S1111 { .. } => 24,
        }
    }

    /// Lower-case tag, as accepted on the command line.
    pub fn tag(&self) -> &'static str {
        match self {
            BarycentricOrbit::S3 => "s3",
            BarycentricOrbit::S21 { .. } => "s21",
            BarycentricOrbit::S111 { .. } => "s111",
            BarycentricOrbit::S4 => "s4",
            BarycentricOrbit::S31 { .. } => "s31",
            BarycentricOrbit::S22 { .. } => "s22",
            BarycentricOrbit::S211 { .. } => "s211",
            BarycentricOrbit::S1111 { .. } => "s1111",
        }
    }

    /// Distinct values of the representative point, and which value sits at
    /// each coordinate.
    fn pattern(&self) -> (Vec<T>, Vec<usize>) {
        let one = T::one();
        match self {
            BarycentricOrbit::S3 => (vec![frac::<T>(1, 3)], vec![0, 0, 0]),
            BarycentricOrbit::S21 { a } => {
                let rest = one.sub(&a.add(a));
                (vec![a.clone(), rest], vec![0, 0, 1])
            }
            BarycentricOrbit::S111 { a, b } => {
                let rest = one.sub(a).sub(b);
                (vec![a.clone(), b.clone(), rest], vec![0, 1, 2])
            }
            BarycentricOrbit::S4 => (vec![frac::<T>(1, 4)], vec![0, 0, 0, 0]),
            BarycentricOrbit::S31 { a } => {
                let rest = one.sub(&T::from_int(3).mul(a));
                (vec![a.clone(), rest], vec![0, 0, 0, 1])
            }
            BarycentricOrbit::S22 { a } => {
                let rest = frac::<T>(1, 2).sub(a);
                (vec![a.clone(), rest], vec![0, 0, 1, 1])
            }
            BarycentricOrbit::S211 { a, b } => {
                let rest = one.sub(&a.add(a)).sub(b);
                (vec![a.clone(), b.clone(), rest], vec![0, 0, 1, 2])
            }
            BarycentricOrbit::S1111 { a, b, c } => {
                let rest = one.sub(a).sub(b).sub(c);
                (vec![a.clone(), b.clone(), c.clone(), rest], vec![0, 1, 2, 3])
            }
        }
    }

    /// Expand into explicit barycentric rows.
    ///
    /// Rows are the distinct rearrangements of the representative's value
    /// labels, so degenerate parameters (e.g. `S21 { a: 1/3 }`) still yield
    /// `orbit_size()` rows.
    pub fn expand(&self, mode: ArithmeticMode) -> QuadResult<Vec<Vec<T>>> {
        ensure_mode(mode, T::MODE)?;
        let (values, labels) = self.pattern();
        Ok(label_permutations(labels)
            .into_iter()
            .map(|perm| perm.into_iter().map(|l| values[l].clone()).collect())
            .collect())
    }
}

/// All distinct rearrangements of `labels`, in lexicographic order.
fn label_permutations(mut labels: Vec<usize>) -> Vec<Vec<usize>> {
    labels.sort_unstable();
    let mut out = vec![labels.clone()];
    while next_permutation(&mut labels) {
        out.push(labels.clone());
    }
    out
}

fn next_permutation(v: &mut [usize]) -> bool {
    let Some(i) = (1..v.len()).rev().find(|&i| v[i - 1] < v[i]) else {
        return false;
    };
    let pivot = i - 1;
    let Some(j) = (i..v.len()).rev().find(|&j| v[j] > v[pivot]) else {
        return false;
    };
    v.swap(pivot, j);
    v[i..].reverse();
    true
}
