//! Update rules of the relaxation family.
//!
//! [`IterativeMethod`] is what the user picks, [`IterationRule`] is the same method prepared
//! for one particular system: the DLU split and every inverse the rule needs are computed
//! once in [`IterationRule::prepare`], so [`IterationRule::step`] only does products and sums.
//! The products are evaluated in the same order as the textbook formulas
//!
//! | method | x_new |
//! |---|---|
//! | Jacobi | D⁻¹·(−(L+U)·x + b) |
//! | Gauss-Seidel | −(D+L)⁻¹·U·x + (D+L)⁻¹·b |
//! | SOR(w) | T·x + C·b,  T = (D+L·w)⁻¹·(−U·w + D·(1−w)),  C = w·(D+L·w)⁻¹ |
//! | gradient descent(α) | x − α·(A·x + b) |
//! | conjugate gradient | x + α·p with the usual residual/direction recurrence |
use crate::somelinalg::linear_sys_errors::{LinearSystemError, Result};
use crate::somelinalg::linear_sys_matrix::LinearSystemMatrix;
use log::warn;
use strum_macros::Display;

#[derive(Debug, Clone, Copy, PartialEq, Display)]
pub enum IterativeMethod {
    #[strum(to_string = "Jacobi")]
    Jacobi,
    #[strum(to_string = "Gauss-Seidel")]
    GaussSeidel,
    /// successive over-relaxation with relaxation factor `w`
    #[strum(to_string = "SOR")]
    Sor { w: f64 },
    #[strum(to_string = "gradient descent")]
    GradientDescent { step_size: f64 },
    #[strum(to_string = "conjugate gradient")]
    ConjugateGradient,
}

impl IterativeMethod {
    /// parse a method name as it appears in config files;
    /// `w` is required for "sor", `step_size` for "gradient_descent"
    pub fn from_name(
        name: &str,
        w: Option<f64>,
        step_size: Option<f64>,
    ) -> Result<IterativeMethod> {
        let method = match name.to_lowercase().replace('-', "_").as_str() {
            "jacobi" => IterativeMethod::Jacobi,
            "gauss_seidel" | "gs" => IterativeMethod::GaussSeidel,
            "sor" => {
                let w = w.ok_or_else(|| {
                    LinearSystemError::InvalidParameter(
                        "SOR needs a relaxation factor w".to_string(),
                    )
                })?;
                IterativeMethod::Sor { w }
            }
            "gradient_descent" | "gradient" => {
                let step_size = step_size.ok_or_else(|| {
                    LinearSystemError::InvalidParameter(
                        "gradient descent needs a step_size".to_string(),
                    )
                })?;
                IterativeMethod::GradientDescent { step_size }
            }
            "conjugate_gradient" | "cg" => IterativeMethod::ConjugateGradient,
            other => {
                return Err(LinearSystemError::InvalidParameter(format!(
                    "unknown iterative method '{}', expected jacobi, gauss_seidel, sor, gradient_descent or conjugate_gradient",
                    other
                )));
            }
        };
        method.validate()?;
        Ok(method)
    }
    /// Parameters must be finite. Their values are otherwise the caller's business,
    /// see [`IterativeMethod::parameter_warning`].
    pub fn validate(&self) -> Result<()> {
        match *self {
            IterativeMethod::Sor { w } => {
                if !w.is_finite() {
                    return Err(LinearSystemError::InvalidParameter(format!(
                        "relaxation factor must be finite, got {}",
                        w
                    )));
                }
            }
            IterativeMethod::GradientDescent { step_size } => {
                if !step_size.is_finite() {
                    return Err(LinearSystemError::InvalidParameter(format!(
                        "step size must be finite, got {}",
                        step_size
                    )));
                }
            }
            _ => {}
        }
        Ok(())
    }
    /// finite but suspicious parameter values; logged once per solve by [`IterationRule::prepare`]
    pub fn parameter_warning(&self) -> Option<String> {
        match *self {
            IterativeMethod::Sor { w } if w <= 0.0 || w >= 2.0 => Some(format!(
                "SOR relaxation factor w = {} is outside (0, 2), expect divergence",
                w
            )),
            IterativeMethod::GradientDescent { step_size } if step_size <= 0.0 => Some(format!(
                "gradient descent step size {} is not positive",
                step_size
            )),
            _ => None,
        }
    }
}

/// An [`IterativeMethod`] bound to one system, ready to be stepped
#[derive(Debug, Clone)]
pub enum IterationRule<'a> {
    /// x_new = D⁻¹·(S·x + b) with S = −(L+U)
    Jacobi {
        d_inv: LinearSystemMatrix,
        s: LinearSystemMatrix,
        b: &'a LinearSystemMatrix,
    },
    /// x_new = T·x + c, shared by Gauss-Seidel and SOR
    Splitting {
        t: LinearSystemMatrix,
        c: LinearSystemMatrix,
    },
    Gradient {
        a: &'a LinearSystemMatrix,
        b: &'a LinearSystemMatrix,
        step_size: f64,
    },
    /// residual r, search direction p and rho = rᵀr carried between steps
    Conjugate {
        a: &'a LinearSystemMatrix,
        r: LinearSystemMatrix,
        p: LinearSystemMatrix,
        rho: f64,
    },
}

/// Gauss-Seidel: T = −(D+L)⁻¹·U and (D+L)⁻¹
fn gauss_seidel_parts(
    D: &LinearSystemMatrix,
    L: &LinearSystemMatrix,
    U: &LinearSystemMatrix,
) -> Result<(LinearSystemMatrix, LinearSystemMatrix)> {
    let a = D.add(L)?.inverse()?;
    let t = a.scale(-1.0).mul(U)?;
    Ok((t, a))
}

/// SOR: T_sor = (D+L·w)⁻¹·(−U·w + D·(1−w)) and C_sor = w·(D+L·w)⁻¹
fn sor_parts(
    D: &LinearSystemMatrix,
    L: &LinearSystemMatrix,
    U: &LinearSystemMatrix,
    w: f64,
) -> Result<(LinearSystemMatrix, LinearSystemMatrix)> {
    let a = D.add(&L.scale(w))?.inverse()?;
    let t_sor = a.mul(&U.scale(-w).add(&D.scale(1.0 - w))?)?;
    let c_sor = a.scale(w);
    Ok((t_sor, c_sor))
}

/// Linear part of the stationary update x_new = M·x + const.
/// Conjugate gradient is not stationary and has none.
pub fn iteration_matrix(
    A: &LinearSystemMatrix,
    method: &IterativeMethod,
) -> Result<LinearSystemMatrix> {
    match *method {
        IterativeMethod::Jacobi => {
            let (D, L, U) = A.dlu_decompose()?;
            D.inverse()?.mul(&L.add(&U)?.scale(-1.0))
        }
        IterativeMethod::GaussSeidel => {
            let (D, L, U) = A.dlu_decompose()?;
            Ok(gauss_seidel_parts(&D, &L, &U)?.0)
        }
        IterativeMethod::Sor { w } => {
            let (D, L, U) = A.dlu_decompose()?;
            Ok(sor_parts(&D, &L, &U, w)?.0)
        }
        IterativeMethod::GradientDescent { step_size } => {
            if !A.is_square() {
                return Err(LinearSystemError::DimensionMismatch {
                    operation: "iteration_matrix",
                    left: A.shape(),
                    right: (A.ncols(), A.nrows()),
                });
            }
            LinearSystemMatrix::identity(A.nrows()).sub(&A.scale(step_size))
        }
        IterativeMethod::ConjugateGradient => Err(LinearSystemError::InvalidParameter(
            "conjugate gradient has no stationary iteration matrix".to_string(),
        )),
    }
}

fn dot(u: &LinearSystemMatrix, v: &LinearSystemMatrix) -> f64 {
    u.as_dmatrix().dot(v.as_dmatrix())
}

impl<'a> IterationRule<'a> {
    /// Precompute everything that does not change between iterations.
    /// `x0` is only needed by conjugate gradient, to seed its residual.
    pub fn prepare(
        method: &IterativeMethod,
        A: &'a LinearSystemMatrix,
        b: &'a LinearSystemMatrix,
        x0: &LinearSystemMatrix,
    ) -> Result<IterationRule<'a>> {
        if let Some(message) = method.parameter_warning() {
            warn!("{}", message);
        }
        let rule = match *method {
            IterativeMethod::Jacobi => {
                let (D, L, U) = A.dlu_decompose()?;
                IterationRule::Jacobi {
                    d_inv: D.inverse()?,
                    s: L.add(&U)?.scale(-1.0),
                    b,
                }
            }
            IterativeMethod::GaussSeidel => {
                let (D, L, U) = A.dlu_decompose()?;
                let (t, a) = gauss_seidel_parts(&D, &L, &U)?;
                IterationRule::Splitting { t, c: a.mul(b)? }
            }
            IterativeMethod::Sor { w } => {
                let (D, L, U) = A.dlu_decompose()?;
                let (t, c_sor) = sor_parts(&D, &L, &U, w)?;
                IterationRule::Splitting {
                    t,
                    c: c_sor.mul(b)?,
                }
            }
            IterativeMethod::GradientDescent { step_size } => {
                IterationRule::Gradient { a: A, b, step_size }
            }
            IterativeMethod::ConjugateGradient => {
                let r = b.sub(&A.mul(x0)?)?;
                let rho = dot(&r, &r);
                IterationRule::Conjugate {
                    a: A,
                    p: r.clone(),
                    r,
                    rho,
                }
            }
        };
        Ok(rule)
    }
    /// next iterate from the current one
    pub fn step(&mut self, x: &LinearSystemMatrix) -> Result<LinearSystemMatrix> {
        match self {
            IterationRule::Jacobi { d_inv, s, b } => d_inv.mul(&s.mul(x)?.add(b)?),
            IterationRule::Splitting { t, c } => t.mul(x)?.add(c),
            IterationRule::Gradient { a, b, step_size } => {
                x.sub(&a.mul(x)?.add(b)?.scale(*step_size))
            }
            IterationRule::Conjugate { a, r, p, rho } => {
                let q = a.mul(p)?;
                let pq = dot(p, &q);
                let alpha = *rho / pq;
                // search direction collapsed: exact solution reached or A not SPD
                if *rho == 0.0 || !alpha.is_finite() {
                    return Ok(x.clone());
                }
                let x_new = x.add(&p.scale(alpha))?;
                let r_new = r.sub(&q.scale(alpha))?;
                let rho_new = dot(&r_new, &r_new);
                let beta = rho_new / *rho;
                *p = r_new.add(&p.scale(beta))?;
                *r = r_new;
                *rho = rho_new;
                Ok(x_new)
            }
        }
    }
}
