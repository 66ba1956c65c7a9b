//! Relaxation-type iterative solvers for dense linear systems A*x = b.
//!
//!  Example#1
//! ```
//! use RustedRelax::somelinalg::iterative_solvers_cpu::{IterativeMethod, LinearSystemSolver};
//! let A = vec![vec![4.0, 1.0], vec![2.0, 3.0]];
//! let b = vec![1.0, 2.0];
//! let mut solver = LinearSystemSolver::from_vecs(&A, &b, IterativeMethod::GaussSeidel).unwrap();
//! let iterations = solver.solve(&[0.0, 0.0], 1e-10, 0.0).unwrap();
//! assert!(iterations < 100);
//! assert!(solver.check_solution(1e-8, 0.0));
//! let x = solver.get_solution().unwrap();
//! assert!((x[(0, 0)] - 0.1).abs() < 1e-8);
//! ```
//! Example#2
//! ```
//! // the loop itself is a plain function of its inputs
//! use RustedRelax::somelinalg::convergence::Tolerances;
//! use RustedRelax::somelinalg::iterative_solvers_cpu::{iterate, IterativeMethod};
//! use RustedRelax::somelinalg::linear_sys_matrix::LinearSystemMatrix;
//! let A = LinearSystemMatrix::from_rows(&[vec![4.0, 1.0], vec![2.0, 3.0]]).unwrap();
//! let b = LinearSystemMatrix::column(&[1.0, 2.0]).unwrap();
//! let x0 = LinearSystemMatrix::zeros(2, 1);
//! let tol = Tolerances::new(1e-10, 0.0).unwrap();
//! let outcome = iterate(&A, &b, &x0, &IterativeMethod::Sor { w: 1.1 }, &tol, Some(1000)).unwrap();
//! assert!((outcome.x[(1, 0)] - 0.6).abs() < 1e-8);
//! ```
pub mod iteration_rules;
mod iterative_tests;

pub use iteration_rules::{IterationRule, IterativeMethod};

use crate::Utils::logger::init_logger;
use crate::Utils::solver_config::SolverConfig;
use crate::somelinalg::convergence::{Tolerances, check, check_with, get_error};
use crate::somelinalg::linear_sys_errors::{LinearSystemError, Result};
use crate::somelinalg::linear_sys_matrix::LinearSystemMatrix;
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::time::Instant;
use tabled::{builder::Builder, settings::Style};

/// what the loop hands back: final iterate, number of passes and the last ||x_new - x||
#[derive(Debug, Clone, PartialEq)]
pub struct IterationOutcome {
    pub x: LinearSystemMatrix,
    pub iterations: usize,
    pub last_increment: f64,
}

fn check_system_shapes(
    A: &LinearSystemMatrix,
    b: &LinearSystemMatrix,
    x0: &LinearSystemMatrix,
) -> Result<()> {
    let n = A.nrows();
    if !A.is_square() || n == 0 {
        return Err(LinearSystemError::DimensionMismatch {
            operation: "coefficient matrix",
            left: A.shape(),
            right: (A.ncols(), A.nrows()),
        });
    }
    for (operation, v) in [("right-hand side", b), ("initial guess", x0)] {
        if v.shape() != (n, 1) {
            return Err(LinearSystemError::DimensionMismatch {
                operation,
                left: A.shape(),
                right: v.shape(),
            });
        }
    }
    Ok(())
}

/////////////////////////////////////////////////////////////////////////////////////////////
//                ITERATIONS
/////////////////////////////////////////////////////////////////////////////////////////////
/// Shared convergence-checked loop.
/// Each pass computes x_new with the method's rule and stops once
/// ||x_new - x|| < rel*||x|| + abs. With `max_iterations == None` a non-convergent
/// method/tolerance pair never returns; with `Some(n)` it fails after n passes.
pub fn iterate(
    A: &LinearSystemMatrix,
    b: &LinearSystemMatrix,
    x0: &LinearSystemMatrix,
    method: &IterativeMethod,
    tolerances: &Tolerances,
    max_iterations: Option<usize>,
) -> Result<IterationOutcome> {
    check_system_shapes(A, b, x0)?;
    method.validate()?;
    if max_iterations == Some(0) {
        return Err(LinearSystemError::InvalidParameter(
            "max_iterations must be positive".to_string(),
        ));
    }
    // D, L, U and all inverses are computed here, once
    let mut rule = IterationRule::prepare(method, A, b, x0)?;

    let mut x = x0.clone();
    let mut it_counter: usize = 0;
    let mut last_increment = f64::INFINITY;
    let mut growth_reported = false;
    loop {
        if let Some(max_iterations) = max_iterations {
            if it_counter >= max_iterations {
                error!(
                    "{}: maximum number of iterations ({}) reached, last increment = {:e}",
                    method, max_iterations, last_increment
                );
                return Err(LinearSystemError::MaxIterationsExceeded {
                    iterations: it_counter,
                    last_increment,
                });
            }
        }
        let x_new = rule.step(&x)?;
        let enough_toll = check_with(Some(&x_new), Some(&x), tolerances);
        let increment = get_error(&x_new, &x)?;
        if increment > last_increment && !growth_reported {
            warn!(
                "{}: increment is growing ({:e} -> {:e}) at iteration {}",
                method, last_increment, increment, it_counter
            );
            growth_reported = true;
        }
        it_counter += 1;
        last_increment = increment;
        x = x_new;
        debug!("iteration = {}, increment = {:e}", it_counter, increment);
        if enough_toll {
            info!(
                "{} converged in {} iterations, last increment = {:e}",
                method, it_counter, increment
            );
            return Ok(IterationOutcome {
                x,
                iterations: it_counter,
                last_increment,
            });
        }
    }
}

/// A fixed system (A, b) plus the latest solution estimate
#[derive(Debug, Clone)]
pub struct LinearSystemSolver {
    A: LinearSystemMatrix,
    b: LinearSystemMatrix,
    x: Option<LinearSystemMatrix>,
    pub method: IterativeMethod,
    pub max_iterations: Option<usize>,
    /// tolerances used by `solve_with_logging`
    pub tolerances: Tolerances,
    pub loglevel: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl LinearSystemSolver {
    /// `b` may be given as a row (1×N) or a column (N×1); it is stored as a column
    pub fn new(
        A: LinearSystemMatrix,
        b: LinearSystemMatrix,
        method: IterativeMethod,
    ) -> Result<LinearSystemSolver> {
        let n = A.nrows();
        let b = if b.shape() == (1, n) { b.transpose() } else { b };
        check_system_shapes(&A, &b, &LinearSystemMatrix::zeros(n, 1))?;
        method.validate()?;
        Ok(LinearSystemSolver {
            A,
            b,
            x: None,
            method,
            max_iterations: None,
            tolerances: Tolerances::default(),
            loglevel: Some("info".to_string()),
            log_dir: None,
        })
    }

    pub fn from_vecs(
        A: &[Vec<f64>],
        b: &[f64],
        method: IterativeMethod,
    ) -> Result<LinearSystemSolver> {
        Self::new(
            LinearSystemMatrix::from_rows(A)?,
            LinearSystemMatrix::row(b)?,
            method,
        )
    }
    /// method, tolerances, iteration cap and logging taken from a config
    pub fn from_config(
        A: LinearSystemMatrix,
        b: LinearSystemMatrix,
        config: &SolverConfig,
    ) -> Result<LinearSystemSolver> {
        let mut solver = Self::new(A, b, config.method)?;
        solver.tolerances = config.tolerances;
        solver.max_iterations = config.max_iterations;
        solver.loglevel = config.loglevel.clone();
        solver.log_dir = config.log_dir.clone();
        Ok(solver)
    }
    ////////////////////////////SETTERS///////////////////////////////////////////////////////////////////
    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_loglevel(mut self, loglevel: &str) -> Self {
        self.loglevel = Some(loglevel.to_string());
        self
    }

    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    pub fn coefficients(&self) -> &LinearSystemMatrix {
        &self.A
    }
    /// right-hand side, column form
    pub fn rhs(&self) -> &LinearSystemMatrix {
        &self.b
    }
    /// Run the solver's method from `x0` until ||x_new - x|| < rel_toll*||x|| + abs_toll.
    /// Returns the number of iterations; the solution is read with `get_solution`.
    /// On failure the previous solution (if any) is kept.
    pub fn solve(&mut self, x0: &[f64], abs_toll: f64, rel_toll: f64) -> Result<usize> {
        let tolerances = Tolerances::new(abs_toll, rel_toll)?;
        let x0 = LinearSystemMatrix::column(x0)?;
        let outcome = iterate(
            &self.A,
            &self.b,
            &x0,
            &self.method,
            &tolerances,
            self.max_iterations,
        )?;
        self.x = Some(outcome.x);
        Ok(outcome.iterations)
    }
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    //                                       main functions to start the solver and caclulate statistics
    ////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
    /// `solve` with the stored tolerances, wrapped in logger setup and a statistics report
    pub fn solve_with_logging(&mut self, x0: &[f64]) -> Result<usize> {
        let installed = init_logger(self.loglevel.as_deref(), self.log_dir.as_deref())?;
        if installed {
            info!("logger started with level {:?}", self.loglevel);
        }
        info!(
            "solving {}x{} system with {}",
            self.A.nrows(),
            self.A.ncols(),
            self.method
        );
        let begin = Instant::now();
        let res = self.solve(x0, self.tolerances.absolute, self.tolerances.relative);
        let elapsed = begin.elapsed();
        match &res {
            Ok(iterations) => self.calc_statistics(*iterations, elapsed.as_secs_f64()),
            Err(e) => error!("{} failed: {}", self.method, e),
        }
        res
    }

    fn calc_statistics(&self, iterations: usize, elapsed: f64) {
        let residual = self
            .get_solution_error()
            .map(|r| format!("{:e}", r))
            .unwrap_or_else(|| "-".to_string());
        let stats: Vec<Vec<String>> = vec![
            vec!["method".to_string(), self.method.to_string()],
            vec!["size of system".to_string(), self.A.nrows().to_string()],
            vec!["number of iterations".to_string(), iterations.to_string()],
            vec!["residual norm".to_string(), residual],
            vec!["time elapsed, s".to_string(), format!("{:.6}", elapsed)],
        ];
        let mut table = Builder::from(stats).build();
        table.with(Style::modern_rounded());
        info!("\n \n CALC STATISTICS \n \n {}", table);
    }
    /////////////////////////////////////////////////////////////////////////////////////////////
    //                QUERIES
    /////////////////////////////////////////////////////////////////////////////////////////////
    /// latest solution, `None` before the first successful solve
    pub fn get_solution(&self) -> Option<&LinearSystemMatrix> {
        self.x.as_ref()
    }

    fn product(&self) -> Option<LinearSystemMatrix> {
        self.x.as_ref().and_then(|x| self.A.mul(x).ok())
    }
    /// A*x is within tolerance of b
    pub fn check_solution(&self, abs_toll: f64, rel_toll: f64) -> bool {
        check(self.product().as_ref(), Some(&self.b), abs_toll, rel_toll)
    }

    pub fn check_solution_default(&self) -> bool {
        let tol = Tolerances::default();
        self.check_solution(tol.absolute, tol.relative)
    }
    /// residual norm ||A*x - b||
    pub fn get_solution_error(&self) -> Option<f64> {
        self.product()
            .and_then(|ax| get_error(&ax, &self.b).ok())
    }
    /// validate x against a known exact solution
    pub fn check_against(&self, exact: &[f64], abs_toll: f64, rel_toll: f64) -> bool {
        let exact = LinearSystemMatrix::column(exact).ok();
        check(self.x.as_ref(), exact.as_ref(), abs_toll, rel_toll)
    }
    /// ||x - exact||
    pub fn get_error_against(&self, exact: &[f64]) -> Option<f64> {
        let exact = LinearSystemMatrix::column(exact).ok()?;
        self.x.as_ref().and_then(|x| get_error(x, &exact).ok())
    }
}
