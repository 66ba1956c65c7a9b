use crate::somelinalg::iterative_solvers_cpu::IterativeMethod;
use crate::somelinalg::iterative_solvers_cpu::iteration_rules::iteration_matrix;
use crate::somelinalg::linear_sys_errors::{LinearSystemError, Result};
use crate::somelinalg::linear_sys_matrix::LinearSystemMatrix;
use log::{info, warn};

fn require_square(A: &LinearSystemMatrix, operation: &'static str) -> Result<()> {
    if !A.is_square() {
        return Err(LinearSystemError::DimensionMismatch {
            operation,
            left: A.shape(),
            right: (A.ncols(), A.nrows()),
        });
    }
    Ok(())
}

/// Strict row diagonal dominance: |a_ii| > sum_{j != i} |a_ij| for every row.
/// Sufficient (not necessary) for Jacobi and Gauss-Seidel to converge from any start.
pub fn is_diagonally_dominant(A: &LinearSystemMatrix) -> bool {
    if !A.is_square() {
        return false;
    }
    let n = A.nrows();
    (0..n).all(|i| {
        let off: f64 = (0..n).filter(|&j| j != i).map(|j| A[(i, j)].abs()).sum();
        A[(i, i)].abs() > off
    })
}

/// largest modulus among the (complex) eigenvalues
pub fn spectral_radius(M: &LinearSystemMatrix) -> Result<f64> {
    require_square(M, "spectral_radius")?;
    if M.nrows() == 0 {
        return Ok(0.0);
    }
    let eigenvalues = M.as_dmatrix().complex_eigenvalues();
    Ok(eigenvalues.iter().map(|z| z.norm()).fold(0.0, f64::max))
}

/// A stationary iteration x_new = M*x + c converges from every start iff rho(M) < 1
pub fn predicts_convergence(A: &LinearSystemMatrix, method: &IterativeMethod) -> Result<bool> {
    let M = iteration_matrix(A, method)?;
    let rho = spectral_radius(&M)?;
    info!("{}: spectral radius of iteration matrix = {}", method, rho);
    if rho >= 1.0 {
        warn!(
            "{} is not expected to converge: spectral radius = {} >= 1",
            method, rho
        );
    }
    Ok(rho < 1.0)
}

/// Relaxation factor w = 2 / (1 + sqrt(1 - rho_J^2)) (Young's formula, exact for
/// consistently ordered matrices such as tridiagonal ones). `None` when Jacobi itself
/// does not converge. Advisory only: SOR takes whatever w it is given.
pub fn optimal_sor_factor(A: &LinearSystemMatrix) -> Result<Option<f64>> {
    let rho_j = spectral_radius(&iteration_matrix(A, &IterativeMethod::Jacobi)?)?;
    if rho_j >= 1.0 {
        warn!("Jacobi spectral radius {} >= 1, no SOR factor suggested", rho_j);
        return Ok(None);
    }
    Ok(Some(2.0 / (1.0 + (1.0 - rho_j * rho_j).sqrt())))
}

pub fn is_singular(A: &LinearSystemMatrix, epsilon: f64) -> Result<bool> {
    require_square(A, "is_singular")?;
    let det = A.as_dmatrix().determinant();
    let is_singular = det.abs() < epsilon; // tolerance for singularity check
    if is_singular {
        warn!("Matrix is singular. Determinant = {:.8}", det);
    }
    Ok(is_singular)
}
/// condition number = largest singular value / smallest singular value
pub fn condition_number(A: &LinearSystemMatrix) -> f64 {
    let singular_values = A.as_dmatrix().singular_values();
    let max_sigma = singular_values.iter().cloned().fold(0.0, f64::max);
    let min_sigma = singular_values.iter().cloned().fold(f64::INFINITY, f64::min);
    max_sigma / min_sigma
}

pub fn poorly_conditioned(A: &LinearSystemMatrix, threshold: f64) -> bool {
    let condition_number = condition_number(A);
    let poorly_conditioned = condition_number > threshold;
    if poorly_conditioned {
        warn!(
            "The system of linear equations is poorly conditioned. Condition number = {:.2}",
            condition_number
        );
    }
    poorly_conditioned
}

/// famous example of ill-conditioned matrix
pub fn hilbert_matrix(n: usize) -> LinearSystemMatrix {
    let data: Vec<f64> = (0..n * n)
        .map(|k| 1.0 / ((k / n) as f64 + (k % n) as f64 + 1.0))
        .collect();
    LinearSystemMatrix::from_dmatrix(nalgebra::DMatrix::from_row_slice(n, n, &data))
}
