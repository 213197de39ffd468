use crate::{
    ensure_mode, ArithmeticMode, BarycentricOrbit, OrbitDescriptor, QuadError, QuadResult, Scalar,
    SchemeTable,
};
use tracing::trace;

/// Where the points of one weighted entry come from.
#[derive(Debug, Clone, PartialEq)]
pub enum PointSource<T> {
    Orbit(OrbitDescriptor<T>),
    Barycentric(BarycentricOrbit<T>),
    /// Explicit rows, taken as given.
    Rows(Vec<Vec<T>>),
}

/// One weight shared by every point its source expands to.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitEntry<T> {
    pub weight: T,
    pub source: PointSource<T>,
}

impl<T: Scalar> OrbitEntry<T> {
    pub fn orbit(weight: T, descriptor: OrbitDescriptor<T>) -> Self {
        Self {
            weight,
            source: PointSource::Orbit(descriptor),
        }
    }

    pub fn barycentric(weight: T, orbit: BarycentricOrbit<T>) -> Self {
        Self {
            weight,
            source: PointSource::Barycentric(orbit),
        }
    }

    pub fn rows(weight: T, rows: Vec<Vec<T>>) -> Self {
        Self {
            weight,
            source: PointSource::Rows(rows),
        }
    }

    /// A single explicit point.
    pub fn point(weight: T, point: Vec<T>) -> Self {
        Self::rows(weight, vec![point])
    }

    fn expand(&self, dimension: usize, mode: ArithmeticMode) -> QuadResult<Vec<Vec<T>>> {
        match &self.source {
            PointSource::Orbit(d) => d.expand(dimension, mode),
            PointSource::Barycentric(b) => b.expand(mode),
            PointSource::Rows(rows) => Ok(rows.clone()),
        }
    }
}

/// Flatten weighted entries into a [`SchemeTable`].
///
/// Entries keep their order and each entry's rows stay in generator order.
/// Every row of an entry is paired with a copy of that entry's weight.
pub fn assemble<T: Scalar>(
    entries: &[OrbitEntry<T>],
    dimension: usize,
    mode: ArithmeticMode,
) -> QuadResult<SchemeTable<T>> {
    ensure_mode(mode, T::MODE)?;
    if entries.is_empty() {
        return Err(QuadError::config("no entries to assemble"));
    }
    let mut weights = Vec::new();
    let mut points = Vec::new();
    for (i, entry) in entries.iter().enumerate() {
        let rows = entry.expand(dimension, mode)?;
        if rows.is_empty() {
            return Err(QuadError::config(format!("entry {} expands to no points", i)));
        }
        if let Some(row) = rows.iter().find(|r| r.len() != dimension) {
            return Err(QuadError::config(format!(
                "entry {} yields rows of width {}, table dimension is {}",
                i,
                row.len(),
                dimension
            )));
        }
        trace!(entry = i, rows = rows.len(), weight = %entry.weight, "expanded entry");
        weights.extend(std::iter::repeat(entry.weight.clone()).take(rows.len()));
        points.extend(rows);
    }
    SchemeTable::new(dimension, weights, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Surd;

    const F: ArithmeticMode = ArithmeticMode::Floating;
    const E: ArithmeticMode = ArithmeticMode::Exact;

    #[test]
    fn test_assemble_pm_one_dimension() {
        let t = assemble(&[OrbitEntry::orbit(5.0, OrbitDescriptor::pm(1.0))], 1, F).unwrap();
        assert_eq!(t.weights(), &[5.0, 5.0]);
        let mut xs: Vec<f64> = t.points().iter().map(|p| p[0]).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(xs, vec![-1.0, 1.0]);
    }

    #[test]
    fn test_assemble_preserves_entry_order() {
        let entries = vec![
            OrbitEntry::point(0.5, vec![0.0, 0.0]),
            OrbitEntry::orbit(0.25, OrbitDescriptor::fsd([(1.0, 1)]).unwrap()),
            OrbitEntry::rows(0.125, vec![vec![2.0, 2.0], vec![3.0, 3.0]]),
        ];
        let t = assemble(&entries, 2, F).unwrap();
        assert_eq!(t.len(), 7);
        assert_eq!(t.weights()[0], 0.5);
        assert!(t.weights()[1..5].iter().all(|&w| w == 0.25));
        assert_eq!(t.points()[5], vec![2.0, 2.0]);
        assert_eq!(t.points()[6], vec![3.0, 3.0]);
    }

    #[test]
    fn test_assemble_barycentric_exact() {
        let entries = vec![
            OrbitEntry::barycentric(Surd::ratio(1, 4), BarycentricOrbit::S3),
            OrbitEntry::barycentric(Surd::ratio(1, 4), BarycentricOrbit::S21 { a: Surd::ratio(1, 6) }),
        ];
        let t = assemble(&entries, 3, E).unwrap();
        assert_eq!(t.len(), 4);
        assert_eq!(t.weight_sum(), Surd::one());
    }

    #[test]
    fn test_assemble_errors() {
        assert!(matches!(
            assemble::<f64>(&[], 1, F),
            Err(QuadError::Configuration(_))
        ));
        assert!(matches!(
            assemble(&[OrbitEntry::rows(1.0, vec![])], 1, F),
            Err(QuadError::Configuration(_))
        ));
        assert!(matches!(
            assemble(&[OrbitEntry::point(1.0, vec![0.0, 0.0])], 3, F),
            Err(QuadError::Configuration(_))
        ));
        // triangle orbit in a 2-D table
        assert!(matches!(
            assemble(&[OrbitEntry::barycentric(1.0, BarycentricOrbit::S3)], 2, F),
            Err(QuadError::Configuration(_))
        ));
        assert!(matches!(
            assemble(&[OrbitEntry::orbit(1.0, OrbitDescriptor::pm(1.0))], 1, E),
            Err(QuadError::ModeMismatch { .. })
        ));
    }

    #[test]
    fn test_assemble_is_repeatable() {
        let entries = vec![OrbitEntry::orbit(
            1.0,
            OrbitDescriptor::fsd([(0.5, 1), (0.25, 1)]).unwrap(),
        )];
        assert_eq!(assemble(&entries, 3, F), assemble(&entries, 3, F));
    }
}
