//! Dense matrix used by the relaxation solvers.
//!
//! `LinearSystemMatrix` is a thin wrapper around `nalgebra::DMatrix<f64>` whose arithmetic
//! never panics on shape errors: every binary operation checks dimensions and returns
//! [`LinearSystemError::DimensionMismatch`] instead. Operands are never mutated, every
//! operation allocates its result. A column vector is an N×1 matrix.
//!
//! # Example
//! ```
//! use RustedRelax::somelinalg::linear_sys_matrix::LinearSystemMatrix;
//! let a = LinearSystemMatrix::from_rows(&[vec![4.0, 1.0], vec![2.0, 3.0]]).unwrap();
//! let (d, l, u) = a.dlu_decompose().unwrap();
//! let restored = d.add(&l).unwrap().add(&u).unwrap();
//! assert_eq!(restored, a);
//! let inv = a.inverse().unwrap();
//! let e = a.mul(&inv).unwrap();
//! assert!((e[(0, 0)] - 1.0).abs() < 1e-12);
//! ```
use crate::somelinalg::linear_sys_errors::{LinearSystemError, Result};
use nalgebra::DMatrix;
use std::fmt;
use std::ops::Index;

#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystemMatrix(DMatrix<f64>);

impl LinearSystemMatrix {
    ////////////////////////////CONSTRUCTORS///////////////////////////////////////////////
    pub fn from_dmatrix(matrix: DMatrix<f64>) -> LinearSystemMatrix {
        LinearSystemMatrix(matrix)
    }
    /// build from a vector of rows, all rows must have the same length and finite entries
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<LinearSystemMatrix> {
        let nrows = rows.len();
        let ncols = rows.first().map(|row| row.len()).unwrap_or(0);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != ncols) {
            return Err(LinearSystemError::InvalidParameter(format!(
                "ragged rows: row 0 has {} entries, row {} has {}",
                ncols,
                i,
                row.len()
            )));
        }
        let data: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::from_row_slice(nrows, ncols, &data)
    }
    /// row-major data of length nrows*ncols
    pub fn from_row_slice(nrows: usize, ncols: usize, data: &[f64]) -> Result<LinearSystemMatrix> {
        if data.len() != nrows * ncols {
            return Err(LinearSystemError::InvalidParameter(format!(
                "{} values can not fill a {}x{} matrix",
                data.len(),
                nrows,
                ncols
            )));
        }
        if let Some(bad) = data.iter().find(|v| !v.is_finite()) {
            return Err(LinearSystemError::InvalidParameter(format!(
                "matrix entries must be finite, found {}",
                bad
            )));
        }
        Ok(LinearSystemMatrix(DMatrix::from_row_slice(
            nrows, ncols, data,
        )))
    }
    /// N×1 column vector
    pub fn column(values: &[f64]) -> Result<LinearSystemMatrix> {
        Self::from_row_slice(values.len(), 1, values)
    }
    /// 1×N row vector
    pub fn row(values: &[f64]) -> Result<LinearSystemMatrix> {
        Self::from_row_slice(1, values.len(), values)
    }
    pub fn zeros(nrows: usize, ncols: usize) -> LinearSystemMatrix {
        LinearSystemMatrix(DMatrix::zeros(nrows, ncols))
    }
    pub fn identity(n: usize) -> LinearSystemMatrix {
        LinearSystemMatrix(DMatrix::identity(n, n))
    }
    ////////////////////////////ACCESSORS//////////////////////////////////////////////////
    pub fn nrows(&self) -> usize {
        self.0.nrows()
    }
    pub fn ncols(&self) -> usize {
        self.0.ncols()
    }
    pub fn shape(&self) -> (usize, usize) {
        self.0.shape()
    }
    pub fn is_square(&self) -> bool {
        self.0.is_square()
    }
    pub fn as_dmatrix(&self) -> &DMatrix<f64> {
        &self.0
    }
    pub fn into_dmatrix(self) -> DMatrix<f64> {
        self.0
    }
    /// entries in row-major order
    pub fn to_vec(&self) -> Vec<f64> {
        let m = &self.0;
        (0..m.nrows())
            .flat_map(|i| (0..m.ncols()).map(move |j| m[(i, j)]))
            .collect()
    }
    /////////////////////////////////////////////////////////////////////////////////////////////
    //                ARITHMETICS
    /////////////////////////////////////////////////////////////////////////////////////////////
    fn same_shape(&self, other: &LinearSystemMatrix, operation: &'static str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(LinearSystemError::DimensionMismatch {
                operation,
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(())
    }

    pub fn add(&self, other: &LinearSystemMatrix) -> Result<LinearSystemMatrix> {
        self.same_shape(other, "add")?;
        Ok(LinearSystemMatrix(&self.0 + &other.0))
    }

    pub fn sub(&self, other: &LinearSystemMatrix) -> Result<LinearSystemMatrix> {
        self.same_shape(other, "sub")?;
        Ok(LinearSystemMatrix(&self.0 - &other.0))
    }
    /// matrix product, requires self.ncols == other.nrows
    pub fn mul(&self, other: &LinearSystemMatrix) -> Result<LinearSystemMatrix> {
        if self.ncols() != other.nrows() {
            return Err(LinearSystemError::DimensionMismatch {
                operation: "mul",
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(LinearSystemMatrix(&self.0 * &other.0))
    }

    pub fn scale(&self, scalar: f64) -> LinearSystemMatrix {
        LinearSystemMatrix(&self.0 * scalar)
    }

    pub fn transpose(&self) -> LinearSystemMatrix {
        LinearSystemMatrix(self.0.transpose())
    }
    /// Euclidean (Frobenius) norm, for a column vector this is the usual L2 norm.
    /// Entries are scaled by max|a_ij| first, so squares neither underflow nor overflow.
    pub fn linear_norm(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        let m = self.0.amax();
        if m == 0.0 || !m.is_finite() {
            return self.0.norm();
        }
        m * (&self.0 / m).norm()
    }
    /// Gauss-Jordan elimination with partial pivoting on the augmented pair [A | I].
    /// A pivot below `n * eps * max|a_ij|` is treated as zero.
    pub fn inverse(&self) -> Result<LinearSystemMatrix> {
        if !self.is_square() {
            return Err(LinearSystemError::DimensionMismatch {
                operation: "inverse",
                left: self.shape(),
                right: (self.ncols(), self.nrows()),
            });
        }
        let n = self.nrows();
        if n == 0 {
            return Ok(LinearSystemMatrix::zeros(0, 0));
        }
        let mut a = self.0.clone();
        let mut inv: DMatrix<f64> = DMatrix::identity(n, n);
        let threshold = f64::EPSILON * n as f64 * self.0.amax();

        for col in 0..n {
            // row with the largest entry in this column, at or below the diagonal
            let mut pivot_row = col;
            for r in col + 1..n {
                if a[(r, col)].abs() > a[(pivot_row, col)].abs() {
                    pivot_row = r;
                }
            }
            let pivot = a[(pivot_row, col)];
            if pivot.abs() <= threshold || !pivot.is_finite() {
                return Err(LinearSystemError::SingularMatrix {
                    operation: "inverse",
                    pivot,
                });
            }
            if pivot_row != col {
                a.swap_rows(col, pivot_row);
                inv.swap_rows(col, pivot_row);
            }
            for j in 0..n {
                a[(col, j)] /= pivot;
                inv[(col, j)] /= pivot;
            }
            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = a[(r, col)];
                if factor == 0.0 {
                    continue;
                }
                for j in 0..n {
                    let a_cj = a[(col, j)];
                    let inv_cj = inv[(col, j)];
                    a[(r, j)] -= factor * a_cj;
                    inv[(r, j)] -= factor * inv_cj;
                }
            }
        }
        Ok(LinearSystemMatrix(inv))
    }
    /// split A = D + L + U: diagonal, strictly lower and strictly upper parts.
    /// Every entry of A lands in exactly one part, so the sum restores A bit for bit.
    pub fn dlu_decompose(
        &self,
    ) -> Result<(LinearSystemMatrix, LinearSystemMatrix, LinearSystemMatrix)> {
        if !self.is_square() {
            return Err(LinearSystemError::DimensionMismatch {
                operation: "dlu_decompose",
                left: self.shape(),
                right: (self.ncols(), self.nrows()),
            });
        }
        let n = self.nrows();
        let a = &self.0;
        let D = DMatrix::from_fn(n, n, |i, j| if i == j { a[(i, j)] } else { 0.0 });
        let L = DMatrix::from_fn(n, n, |i, j| if i > j { a[(i, j)] } else { 0.0 });
        let U = DMatrix::from_fn(n, n, |i, j| if i < j { a[(i, j)] } else { 0.0 });
        Ok((
            LinearSystemMatrix(D),
            LinearSystemMatrix(L),
            LinearSystemMatrix(U),
        ))
    }
}

impl Index<(usize, usize)> for LinearSystemMatrix {
    type Output = f64;
    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.0[index]
    }
}

impl fmt::Display for LinearSystemMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
