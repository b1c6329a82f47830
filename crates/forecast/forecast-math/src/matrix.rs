//! Dense `f64` matrix storage and the Gauss-Jordan inverse used by
//! least-squares regression.
//!
//! Small sizes are special-cased: a 1x1 inverse is a reciprocal and a 2x2
//! inverse is the closed-form adjugate-over-determinant, both cheaper and
//! more accurate than running full elimination through them. Everything
//! `3x3` and up goes through partial-pivot Gauss-Jordan elimination on an
//! augmented `[A | I]` matrix.

use forecast_types::ForecastError;
use std::ops::{Index, IndexMut};

/// Row-major dense matrix of `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Result<Self, ForecastError> {
        if rows == 0 || cols == 0 {
            return Err(ForecastError::InvalidDims { rows, cols });
        }
        Ok(Matrix {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        })
    }

    pub fn identity(n: usize) -> Result<Self, ForecastError> {
        let mut m = Matrix::zeros(n, n)?;
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        Ok(m)
    }

    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, ForecastError> {
        let nrows = rows.len();
        if nrows == 0 {
            return Err(ForecastError::InvalidDims { rows: 0, cols: 0 });
        }
        let ncols = rows[0].len();
        if ncols == 0 || rows.iter().any(|r| r.len() != ncols) {
            return Err(ForecastError::InvalidDims { rows: nrows, cols: ncols });
        }
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            data.extend(row);
        }
        Ok(Matrix { rows: nrows, cols: ncols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// A x B.
    pub fn mul(&self, other: &Matrix) -> Result<Matrix, ForecastError> {
        if self.cols != other.rows {
            return Err(ForecastError::DimMismatch { left: self.cols, right: other.rows });
        }
        let mut out = Matrix::zeros(self.rows, other.cols)?;
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self[(i, k)];
                if a == 0.0 {
                    continue;
                }
                for j in 0..other.cols {
                    out[(i, j)] += a * other[(k, j)];
                }
            }
        }
        Ok(out)
    }

    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows).expect("non-zero dims preserved");
        for i in 0..self.rows {
            for j in 0..self.cols {
                out[(j, i)] = self[(i, j)];
            }
        }
        out
    }

    /// Inverts a square matrix in place-equivalent fashion, returning a new
    /// matrix. `n == 1` and `n == 2` use closed forms; `n >= 3` uses
    /// Gauss-Jordan elimination with partial (max-magnitude) pivoting.
    pub fn inverse(&self) -> Result<Matrix, ForecastError> {
        if self.rows != self.cols {
            return Err(ForecastError::NotSquare { rows: self.rows, cols: self.cols });
        }
        let n = self.rows;
        match n {
            1 => {
                let a = self[(0, 0)];
                if a == 0.0 {
                    return Err(ForecastError::Singular);
                }
                let mut out = Matrix::zeros(1, 1)?;
                out[(0, 0)] = 1.0 / a;
                Ok(out)
            }
            2 => {
                let (a, b, c, d) = (self[(0, 0)], self[(0, 1)], self[(1, 0)], self[(1, 1)]);
                let det = a * d - b * c;
                if det == 0.0 {
                    return Err(ForecastError::Singular);
                }
                let inv_det = 1.0 / det;
                let mut out = Matrix::zeros(2, 2)?;
                out[(0, 0)] = d * inv_det;
                out[(0, 1)] = -b * inv_det;
                out[(1, 0)] = -c * inv_det;
                out[(1, 1)] = a * inv_det;
                Ok(out)
            }
            _ => gauss_jordan_inverse(self),
        }
    }
}

fn gauss_jordan_inverse(m: &Matrix) -> Result<Matrix, ForecastError> {
    let n = m.rows;
    // augmented[i] holds [A row i | I row i] contiguously.
    let mut aug = vec![vec![0.0; 2 * n]; n];
    for i in 0..n {
        for j in 0..n {
            aug[i][j] = m[(i, j)];
        }
        aug[i][n + i] = 1.0;
    }

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&a, &b| aug[a][col].abs().partial_cmp(&aug[b][col].abs()).unwrap())
            .unwrap();
        if aug[pivot_row][col].abs() < f64::EPSILON {
            return Err(ForecastError::Singular);
        }
        aug.swap(col, pivot_row);

        let pivot = aug[col][col];
        for j in 0..2 * n {
            aug[col][j] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[row][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..2 * n {
                aug[row][j] -= factor * aug[col][j];
            }
        }
    }

    let mut out = Matrix::zeros(n, n)?;
    for i in 0..n {
        for j in 0..n {
            out[(i, j)] = aug[i][n + j];
        }
    }
    Ok(out)
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[row * self.cols + col]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_1x1() {
        let m = Matrix::from_rows(vec![vec![4.0]]).unwrap();
        let inv = m.inverse().unwrap();
        assert_eq!(inv[(0, 0)], 0.25);
    }

    #[test]
    fn inverts_2x2() {
        let m = Matrix::from_rows(vec![vec![4.0, 7.0], vec![2.0, 6.0]]).unwrap();
        let inv = m.inverse().unwrap();
        let identity = m.mul(&inv).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((identity[(i, j)] - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn inverts_3x3_with_pivoting() {
        let m = Matrix::from_rows(vec![
            vec![0.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 10.0],
        ])
        .unwrap();
        let inv = m.inverse().unwrap();
        let identity = m.mul(&inv).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((identity[(i, j)] - expected).abs() < 1e-8);
            }
        }
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0], vec![2.0, 4.0]]).unwrap();
        assert!(matches!(m.inverse(), Err(ForecastError::Singular)));
    }

    #[test]
    fn rejects_non_square() {
        let m = Matrix::from_rows(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
        assert!(matches!(m.inverse(), Err(ForecastError::NotSquare { .. })));
    }
}
