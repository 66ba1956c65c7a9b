//! dense linear algebra and relaxation-type iterative solvers
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// error type shared by the linear algebra modules
pub mod linear_sys_errors;
/// dense matrix wrapper: arithmetic, inverse, norm and D/L/U split
pub mod linear_sys_matrix;

pub mod convergence;
/// Jacobi, Gauss-Seidel, SOR, gradient descent and conjugate gradient
pub mod iterative_solvers_cpu;
/// diagnostics for linear systems and matrices: diagonal dominance, spectral radius
/// of the iteration matrix, if it is singular or poorly conditioned
pub mod linear_sys_diagnostics;
