use crate::{QuadError, QuadResult, Scalar};
use nalgebra::DMatrix;

/// Flat scheme: one weight per point, every point of width `dimension`.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemeTable<T> {
    dimension: usize,
    weights: Vec<T>,
    points: Vec<Vec<T>>,
}

impl<T: Scalar> SchemeTable<T> {
    /// Build a table, checking that weights and points pair up and that every
    /// row has `dimension` coordinates.
    pub fn new(dimension: usize, weights: Vec<T>, points: Vec<Vec<T>>) -> QuadResult<Self> {
        if dimension == 0 {
            return Err(QuadError::config("dimension must be at least 1"));
        }
        if weights.len() != points.len() {
            return Err(QuadError::config(format!(
                "{} weights for {} points",
                weights.len(),
                points.len()
            )));
        }
        if let Some((i, row)) = points.iter().enumerate().find(|(_, r)| r.len() != dimension) {
            return Err(QuadError::config(format!(
                "point {} has width {}, expected {}",
                i,
                row.len(),
                dimension
            )));
        }
        Ok(Self {
            dimension,
            weights,
            points,
        })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    pub fn points(&self) -> &[Vec<T>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// `(weight, point)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, &[T])> {
        self.weights.iter().zip(self.points.iter().map(|p| p.as_slice()))
    }

    /// Weighted sum `Σ wᵢ f(xᵢ)`.
    pub fn integrate<F>(&self, f: F) -> T
    where
        F: Fn(&[T]) -> T,
    {
        self.iter()
            .fold(T::zero(), |acc, (w, x)| acc.add(&w.mul(&f(x))))
    }

    pub fn weight_sum(&self) -> T {
        self.weights.iter().fold(T::zero(), |acc, w| acc.add(w))
    }

    /// Multiply every weight by `factor`.
    pub fn scale_weights(&self, factor: &T) -> Self {
        Self {
            dimension: self.dimension,
            weights: self.weights.iter().map(|w| w.mul(factor)).collect(),
            points: self.points.clone(),
        }
    }

    /// Replace every point by `f(point)`, which must have width `dimension`.
    pub fn map_points<F>(&self, dimension: usize, f: F) -> QuadResult<Self>
    where
        F: Fn(&[T]) -> QuadResult<Vec<T>>,
    {
        let points = self
            .points
            .iter()
            .map(|p| f(p))
            .collect::<QuadResult<Vec<_>>>()?;
        Self::new(dimension, self.weights.clone(), points)
    }

    /// Remove the first coordinate of every point.
    ///
    /// Turns barycentric triangle rows `(λ₀, λ₁, λ₂)` into coordinates on the
    /// reference triangle with vertices (0,0), (1,0), (0,1).
    pub fn drop_leading_coordinate(&self) -> QuadResult<Self> {
        if self.dimension < 2 {
            return Err(QuadError::config(
                "cannot drop the only coordinate of a one-dimensional table",
            ));
        }
        self.map_points(self.dimension - 1, |p| Ok(p[1..].to_vec()))
    }

    /// Floating-point copy of the table.
    pub fn to_f64(&self) -> SchemeTable<f64> {
        SchemeTable {
            dimension: self.dimension,
            weights: self.weights.iter().map(Scalar::to_f64).collect(),
            points: self
                .points
                .iter()
                .map(|p| p.iter().map(Scalar::to_f64).collect())
                .collect(),
        }
    }
}

impl SchemeTable<f64> {
    /// Points as a `len() × dimension` matrix.
    pub fn points_matrix(&self) -> DMatrix<f64> {
        let flat: Vec<f64> = self.points.iter().flatten().copied().collect();
        DMatrix::from_row_slice(self.points.len(), self.dimension, &flat)
    }

    /// Map barycentric rows onto the simplex whose vertices are the rows of
    /// `vertices` (`dimension × d` for a simplex embedded in `d` dimensions).
    pub fn barycentric_to_cartesian(&self, vertices: &DMatrix<f64>) -> QuadResult<Self> {
        if vertices.nrows() != self.dimension {
            return Err(QuadError::config(format!(
                "{} vertices for barycentric width {}",
                vertices.nrows(),
                self.dimension
            )));
        }
        let mapped = self.points_matrix() * vertices;
        let points = mapped
            .row_iter()
            .map(|row| row.iter().copied().collect())
            .collect();
        Self::new(vertices.ncols(), self.weights.clone(), points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Surd;
    use approx::assert_relative_eq;

    fn gauss2() -> SchemeTable<f64> {
        let x = 1.0 / 3.0_f64.sqrt();
        SchemeTable::new(1, vec![1.0, 1.0], vec![vec![-x], vec![x]]).unwrap()
    }

    #[test]
    fn test_new_rejects_shape_errors() {
        assert!(matches!(
            SchemeTable::new(1, vec![1.0], vec![]),
            Err(QuadError::Configuration(_))
        ));
        assert!(matches!(
            SchemeTable::new(2, vec![1.0], vec![vec![0.0]]),
            Err(QuadError::Configuration(_))
        ));
        assert!(matches!(
            SchemeTable::<f64>::new(0, vec![], vec![]),
            Err(QuadError::Configuration(_))
        ));
    }

    #[test]
    fn test_integrate_and_weight_sum() {
        let t = gauss2();
        assert_eq!(t.len(), 2);
        assert_eq!(t.weight_sum(), 2.0);
        assert_relative_eq!(t.integrate(|x| x[0] * x[0]), 2.0 / 3.0, epsilon = 1e-15);
        assert_relative_eq!(t.scale_weights(&0.5).weight_sum(), 1.0);
    }

    #[test]
    fn test_map_points_to_unit_interval() {
        let t = gauss2()
            .scale_weights(&0.5)
            .map_points(1, |x| Ok(vec![(x[0] + 1.0) / 2.0]))
            .unwrap();
        // ∫₀¹ x² dx
        assert_relative_eq!(t.integrate(|x| x[0] * x[0]), 1.0 / 3.0, epsilon = 1e-15);
        assert!(t.map_points(2, |x| Ok(x.to_vec())).is_err());
    }

    #[test]
    fn test_drop_leading_coordinate() {
        let t = SchemeTable::new(3, vec![1.0], vec![vec![0.2, 0.3, 0.5]]).unwrap();
        let r = t.drop_leading_coordinate().unwrap();
        assert_eq!(r.dimension(), 2);
        assert_eq!(r.points()[0], vec![0.3, 0.5]);
        assert!(gauss2().drop_leading_coordinate().is_err());
    }

    #[test]
    fn test_exact_to_f64() {
        let t = SchemeTable::new(
            1,
            vec![Surd::ratio(1, 2), Surd::ratio(1, 2)],
            vec![vec![Surd::ratio(1, 3).sqrt().unwrap()], vec![Surd::ratio(-1, 2)]],
        )
        .unwrap();
        assert_eq!(t.weight_sum(), Surd::one());
        let f = t.to_f64();
        assert_relative_eq!(f.points()[0][0], 1.0 / 3.0_f64.sqrt(), epsilon = 1e-15);
        assert_eq!(f.weights(), &[0.5, 0.5]);
    }

    #[test]
    fn test_barycentric_to_cartesian() {
        let t = SchemeTable::new(3, vec![1.0, 1.0], vec![vec![1.0, 0.0, 0.0], vec![1.0 / 3.0; 3]])
            .unwrap();
        let vertices = DMatrix::from_row_slice(3, 2, &[0.0, 0.0, 2.0, 0.0, 0.0, 2.0]);
        let c = t.barycentric_to_cartesian(&vertices).unwrap();
        assert_eq!(c.dimension(), 2);
        assert_eq!(c.points()[0], vec![0.0, 0.0]);
        assert_relative_eq!(c.points()[1][0], 2.0 / 3.0, epsilon = 1e-15);
        assert_relative_eq!(c.points()[1][1], 2.0 / 3.0, epsilon = 1e-15);
        assert_eq!(c.points_matrix().shape(), (2, 2));

        let bad = DMatrix::from_row_slice(2, 2, &[0.0, 0.0, 1.0, 0.0]);
        assert!(t.barycentric_to_cartesian(&bad).is_err());
    }
}
