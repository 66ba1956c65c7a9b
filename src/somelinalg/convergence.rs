//! Convergence checking for the iterative solvers.
//!
//! The same predicate is used both to stop an iteration (reference = previous iterate)
//! and to validate a solution against a known answer (reference = exact solution).
use crate::somelinalg::linear_sys_errors::{LinearSystemError, Result};
use crate::somelinalg::linear_sys_matrix::LinearSystemMatrix;

/// default floor on acceptable absolute error
pub const DEFAULT_TOLL: f64 = 1e-16;

/// (absolute, relative) pair: converged when ||x - x_ref|| < relative*||x_ref|| + absolute
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub absolute: f64,
    pub relative: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Tolerances {
            absolute: DEFAULT_TOLL,
            relative: 0.0,
        }
    }
}

impl Tolerances {
    pub fn new(absolute: f64, relative: f64) -> Result<Tolerances> {
        for (name, value) in [("absolute", absolute), ("relative", relative)] {
            if !value.is_finite() || value < 0.0 {
                return Err(LinearSystemError::InvalidParameter(format!(
                    "{} tolerance must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(Tolerances { absolute, relative })
    }
    /// right-hand side of the convergence inequality for a given reference
    pub fn threshold(&self, x_reference: &LinearSystemMatrix) -> f64 {
        x_reference.linear_norm() * self.relative + self.absolute
    }
}

/// distance between an iterate and its reference
pub fn get_error(x: &LinearSystemMatrix, x_reference: &LinearSystemMatrix) -> Result<f64> {
    Ok(x.sub(x_reference)?.linear_norm())
}

/// false when either side is missing or shapes disagree
pub fn check(
    x: Option<&LinearSystemMatrix>,
    x_reference: Option<&LinearSystemMatrix>,
    abs_toll: f64,
    rel_toll: f64,
) -> bool {
    let (Some(x), Some(x_reference)) = (x, x_reference) else {
        return false;
    };
    let tolerances = Tolerances {
        absolute: abs_toll,
        relative: rel_toll,
    };
    match get_error(x, x_reference) {
        Ok(diff) => diff < tolerances.threshold(x_reference),
        Err(_) => false,
    }
}

/// [`check`] with a [`Tolerances`] pair
pub fn check_with(
    x: Option<&LinearSystemMatrix>,
    x_reference: Option<&LinearSystemMatrix>,
    tolerances: &Tolerances,
) -> bool {
    check(x, x_reference, tolerances.absolute, tolerances.relative)
}
