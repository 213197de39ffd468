use crate::{ensure_mode, ArithmeticMode, QuadError, QuadResult, Scalar};

/// `multiplicity` coordinates carrying `magnitude` (with every sign).
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeGroup<T> {
    pub magnitude: T,
    pub multiplicity: usize,
}

/// Compact description of one symmetry class of points in `n` dimensions.
///
/// Build values through the constructors ([`fsd`](Self::fsd), [`pm`](Self::pm),
/// [`pm_array`](Self::pm_array), [`pm_array0`](Self::pm_array0)) so that
/// malformed shapes are rejected up front. [`expand`](Self::expand) validates
/// again against the target dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum OrbitDescriptor<T> {
    /// Every placement of the groups on disjoint coordinate positions, with
    /// every sign choice on the nonzero magnitudes. Uncovered positions are 0.
    FullSignPermutation { groups: Vec<MagnitudeGroup<T>> },
    /// `(±m, ±m, …, ±m)`.
    UniformSign { magnitude: T },
    /// `(±v₀, ±v₁, …)`; zero entries keep a single sign.
    PerCoordinateSign { magnitudes: Vec<T> },
    /// `magnitudes[i]` written at `indices[i]`, zeros elsewhere, every sign.
    PlacedSubsetSign { magnitudes: Vec<T>, indices: Vec<usize> },
}

impl<T: Scalar> OrbitDescriptor<T> {
    /// Full-symmetric descriptor from `(magnitude, multiplicity)` pairs.
    pub fn fsd(groups: impl IntoIterator<Item = (T, usize)>) -> QuadResult<Self> {
        let groups: Vec<MagnitudeGroup<T>> = groups
            .into_iter()
            .map(|(magnitude, multiplicity)| MagnitudeGroup {
                magnitude,
                multiplicity,
            })
            .collect();
        validate_groups(&groups)?;
        Ok(OrbitDescriptor::FullSignPermutation { groups })
    }

    pub fn pm(magnitude: T) -> Self {
        OrbitDescriptor::UniformSign { magnitude }
    }

    /// The single point at the origin.
    pub fn origin() -> Self {
        OrbitDescriptor::UniformSign {
            magnitude: T::zero(),
        }
    }

    pub fn pm_array(magnitudes: Vec<T>) -> QuadResult<Self> {
        if magnitudes.is_empty() {
            return Err(QuadError::config("pm_array needs at least one magnitude"));
        }
        Ok(OrbitDescriptor::PerCoordinateSign { magnitudes })
    }

    pub fn pm_array0(magnitudes: Vec<T>, indices: Vec<usize>) -> QuadResult<Self> {
        validate_placement(&magnitudes, &indices, None)?;
        Ok(OrbitDescriptor::PlacedSubsetSign {
            magnitudes,
            indices,
        })
    }

    /// Number of rows [`expand`](Self::expand) yields for `dimension`,
    /// computed from the descriptor's shape alone.
    pub fn orbit_size(&self, dimension: usize) -> QuadResult<usize> {
        self.validate(dimension)?;
        match self {
            OrbitDescriptor::FullSignPermutation { groups } => {
                let nonzero: Vec<usize> = groups
                    .iter()
                    .filter(|g| !g.magnitude.is_zero())
                    .map(|g| g.multiplicity)
                    .collect();
                let placements = multinomial(dimension, &nonzero)?;
                let signs = pow2(nonzero.iter().sum())?;
                placements
                    .checked_mul(signs)
                    .ok_or_else(|| QuadError::config("orbit size overflows usize"))
            }
            OrbitDescriptor::UniformSign { magnitude } => {
                if magnitude.is_zero() {
                    Ok(1)
                } else {
                    pow2(dimension)
                }
            }
            OrbitDescriptor::PerCoordinateSign { magnitudes }
            | OrbitDescriptor::PlacedSubsetSign { magnitudes, .. } => {
                pow2(magnitudes.iter().filter(|m| !m.is_zero()).count())
            }
        }
    }

    /// Expand into explicit coordinate rows of length `dimension`.
    ///
    /// Rows are pairwise distinct. Their order is deterministic but carries
    /// no meaning.
    pub fn expand(&self, dimension: usize, mode: ArithmeticMode) -> QuadResult<Vec<Vec<T>>> {
        ensure_mode(mode, T::MODE)?;
        // Shapes whose row count overflows fail here, before enumeration.
        let size = self.orbit_size(dimension)?;
        let rows = match self {
            OrbitDescriptor::FullSignPermutation { groups } => {
                let nonzero: Vec<&MagnitudeGroup<T>> =
                    groups.iter().filter(|g| !g.magnitude.is_zero()).collect();
                let mut rows = Vec::new();
                let mut base = vec![T::zero(); dimension];
                let free: Vec<usize> = (0..dimension).collect();
                place_groups(&nonzero, &free, &mut base, &mut rows);
                rows
            }
            OrbitDescriptor::UniformSign { magnitude } => {
                sign_variants(&vec![magnitude.clone(); dimension])
            }
            OrbitDescriptor::PerCoordinateSign { magnitudes } => sign_variants(magnitudes),
            OrbitDescriptor::PlacedSubsetSign {
                magnitudes,
                indices,
            } => {
                let mut base = vec![T::zero(); dimension];
                for (m, &i) in magnitudes.iter().zip(indices) {
                    base[i] = m.clone();
                }
                sign_variants(&base)
            }
        };
        debug_assert_eq!(rows.len(), size);
        Ok(rows)
    }

    fn validate(&self, dimension: usize) -> QuadResult<()> {
        if dimension == 0 {
            return Err(QuadError::config("dimension must be at least 1"));
        }
        match self {
            OrbitDescriptor::FullSignPermutation { groups } => {
                validate_groups(groups)?;
                let total: usize = groups.iter().map(|g| g.multiplicity).sum();
                if total > dimension {
                    return Err(QuadError::config(format!(
                        "multiplicities sum to {} but dimension is {}",
                        total, dimension
                    )));
                }
                Ok(())
            }
            OrbitDescriptor::UniformSign { .. } => Ok(()),
            OrbitDescriptor::PerCoordinateSign { magnitudes } => {
                if magnitudes.len() != dimension {
                    return Err(QuadError::config(format!(
                        "pm_array has {} magnitudes but dimension is {}",
                        magnitudes.len(),
                        dimension
                    )));
                }
                Ok(())
            }
            OrbitDescriptor::PlacedSubsetSign {
                magnitudes,
                indices,
            } => validate_placement(magnitudes, indices, Some(dimension)),
        }
    }
}

fn validate_groups<T: Scalar>(groups: &[MagnitudeGroup<T>]) -> QuadResult<()> {
    for (i, g) in groups.iter().enumerate() {
        if g.multiplicity == 0 {
            return Err(QuadError::config(format!("group {} has multiplicity 0", i)));
        }
        // Equal nonzero magnitudes in two groups would place the same value
        // twice and produce duplicate rows.
        if !g.magnitude.is_zero()
            && groups[..i]
                .iter()
                .any(|h| h.magnitude == g.magnitude || h.magnitude == g.magnitude.neg())
        {
            return Err(QuadError::config(format!(
                "group {} repeats magnitude {}; merge the groups",
                i, g.magnitude
            )));
        }
    }
    Ok(())
}

fn validate_placement<T>(
    magnitudes: &[T],
    indices: &[usize],
    dimension: Option<usize>,
) -> QuadResult<()> {
    if magnitudes.len() != indices.len() {
        return Err(QuadError::config(format!(
            "{} magnitudes placed at {} indices",
            magnitudes.len(),
            indices.len()
        )));
    }
    for (k, &i) in indices.iter().enumerate() {
        if indices[..k].contains(&i) {
            return Err(QuadError::config(format!("index {} placed twice", i)));
        }
        if let Some(n) = dimension {
            if i >= n {
                return Err(QuadError::config(format!(
                    "index {} out of range for dimension {}",
                    i, n
                )));
            }
        }
    }
    Ok(())
}

/// Assign each group to a subset of the free positions, recursively, and
/// emit the sign variants of every complete assignment.
fn place_groups<T: Scalar>(
    groups: &[&MagnitudeGroup<T>],
    free: &[usize],
    base: &mut Vec<T>,
    out: &mut Vec<Vec<T>>,
) {
    let Some((group, rest)) = groups.split_first() else {
        out.extend(sign_variants(base));
        return;
    };
    for chosen in combinations(free, group.multiplicity) {
        for &i in &chosen {
            base[i] = group.magnitude.clone();
        }
        let remaining: Vec<usize> = free.iter().copied().filter(|i| !chosen.contains(i)).collect();
        place_groups(rest, &remaining, base, out);
        for &i in &chosen {
            base[i] = T::zero();
        }
    }
}

/// All `k`-element subsets of `items`, in lexicographic order.
pub(crate) fn combinations(items: &[usize], k: usize) -> Vec<Vec<usize>> {
    if k == 0 {
        return vec![vec![]];
    }
    if items.len() < k {
        return vec![];
    }
    let mut out = Vec::new();
    for (i, &first) in items.iter().enumerate() {
        for mut tail in combinations(&items[i + 1..], k - 1) {
            tail.insert(0, first);
            out.push(tail);
        }
    }
    out
}

/// Every sign combination over the nonzero entries of `base`.
fn sign_variants<T: Scalar>(base: &[T]) -> Vec<Vec<T>> {
    let nonzero: Vec<usize> = (0..base.len()).filter(|&i| !base[i].is_zero()).collect();
    let count = 1usize << nonzero.len();
    let mut out = Vec::with_capacity(count);
    for mask in 0..count {
        let mut row = base.to_vec();
        for (bit, &i) in nonzero.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                row[i] = row[i].neg();
            }
        }
        out.push(row);
    }
    out
}

fn pow2(k: usize) -> QuadResult<usize> {
    u32::try_from(k)
        .ok()
        .and_then(|k| 1usize.checked_shl(k))
        .filter(|&v| v != 0)
        .ok_or_else(|| QuadError::config("orbit size overflows usize"))
}

/// `n! / (k₁! ⋯ k_m! (n - Σk)!)`
fn multinomial(n: usize, parts: &[usize]) -> QuadResult<usize> {
    let mut remaining = n;
    let mut acc: usize = 1;
    for &k in parts {
        let c = binomial(remaining, k)
            .ok_or_else(|| QuadError::config("orbit size overflows usize"))?;
        acc = acc
            .checked_mul(c)
            .ok_or_else(|| QuadError::config("orbit size overflows usize"))?;
        remaining -= k;
    }
    Ok(acc)
}

pub(crate) fn binomial(n: usize, k: usize) -> Option<usize> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    let mut acc: usize = 1;
    for i in 0..k {
        acc = acc.checked_mul(n - i)? / (i + 1);
    }
    Some(acc)
}
