//! Error types shared by the matrix algebra, the convergence checker and the iterative solvers
use std::fmt;

/// Everything that can go wrong while building or solving a linear system
#[derive(Debug, Clone, PartialEq)]
pub enum LinearSystemError {
    /// shapes of the operands are incompatible for `operation`
    DimensionMismatch {
        operation: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },
    /// inversion met a numerically zero pivot (or a zero diagonal entry)
    SingularMatrix { operation: &'static str, pivot: f64 },
    /// negative tolerance, non-finite parameter, ragged rows, bad config value...
    InvalidParameter(String),
    /// iteration cap hit before the tolerance was satisfied
    MaxIterationsExceeded {
        iterations: usize,
        last_increment: f64,
    },
}

impl fmt::Display for LinearSystemError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LinearSystemError::DimensionMismatch {
                operation,
                left,
                right,
            } => write!(
                f,
                "dimension mismatch in {}: {}x{} vs {}x{}",
                operation, left.0, left.1, right.0, right.1
            ),
            LinearSystemError::SingularMatrix { operation, pivot } => {
                write!(f, "singular matrix in {}: pivot = {:e}", operation, pivot)
            }
            LinearSystemError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            LinearSystemError::MaxIterationsExceeded {
                iterations,
                last_increment,
            } => write!(
                f,
                "no convergence after {} iterations, last increment = {:e}",
                iterations, last_increment
            ),
        }
    }
}

impl std::error::Error for LinearSystemError {}

pub type Result<T> = std::result::Result<T, LinearSystemError>;
