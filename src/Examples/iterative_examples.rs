#![allow(non_snake_case)]
use crate::Utils::logger::save_solution_to_csv;
use crate::Utils::solver_config::SolverConfig;
use crate::somelinalg::convergence::Tolerances;
use crate::somelinalg::iterative_solvers_cpu::{IterativeMethod, LinearSystemSolver, iterate};
use crate::somelinalg::linear_sys_diagnostics::{
    is_diagonally_dominant, optimal_sor_factor, predicts_convergence,
};
use crate::somelinalg::linear_sys_errors::Result;
use crate::somelinalg::linear_sys_matrix::LinearSystemMatrix;
use nalgebra::DMatrix;
use std::path::Path;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// Test systems with known behaviour
/*
SmallDominant: [[4,1],[2,3]] x = [1,2], x = [0.1, 0.6]
Symmetric: [[4,1],[1,3]] x = [1,2], x = [1/11, 7/11]
Tridiagonal: 1D diffusion stencil (-1, 4, -1), b = A*[1,...,1]
Laplace1D: (-1, 2, -1), symmetric positive definite, slow for Jacobi
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum TestSystem {
    SmallDominant,
    Symmetric,
    Tridiagonal,
    Laplace1D,
}

fn tridiagonal(n: usize, sub: f64, diag: f64, sup: f64) -> LinearSystemMatrix {
    LinearSystemMatrix::from_dmatrix(DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            diag
        } else if j + 1 == i {
            sub
        } else if i + 1 == j {
            sup
        } else {
            0.0
        }
    }))
}

impl TestSystem {
    pub fn setup(&self) -> Result<(LinearSystemMatrix, LinearSystemMatrix)> {
        match self {
            TestSystem::SmallDominant => Ok((
                LinearSystemMatrix::from_rows(&[vec![4.0, 1.0], vec![2.0, 3.0]])?,
                LinearSystemMatrix::column(&[1.0, 2.0])?,
            )),
            TestSystem::Symmetric => Ok((
                LinearSystemMatrix::from_rows(&[vec![4.0, 1.0], vec![1.0, 3.0]])?,
                LinearSystemMatrix::column(&[1.0, 2.0])?,
            )),
            TestSystem::Tridiagonal | TestSystem::Laplace1D => {
                let A = match self {
                    TestSystem::Tridiagonal => tridiagonal(20, -1.0, 4.0, -1.0),
                    _ => tridiagonal(10, -1.0, 2.0, -1.0),
                };
                let b = A.mul(&LinearSystemMatrix::column(&vec![1.0; A.nrows()])?)?;
                Ok((A, b))
            }
        }
    }
    pub fn exact_solution(&self) -> Vec<f64> {
        match self {
            TestSystem::SmallDominant => vec![0.1, 0.6],
            TestSystem::Symmetric => vec![1.0 / 11.0, 7.0 / 11.0],
            TestSystem::Tridiagonal => vec![1.0; 20],
            TestSystem::Laplace1D => vec![1.0; 10],
        }
    }
}

fn all_methods() -> Vec<IterativeMethod> {
    vec![
        IterativeMethod::Jacobi,
        IterativeMethod::GaussSeidel,
        IterativeMethod::Sor { w: 1.2 },
        IterativeMethod::GradientDescent { step_size: 0.1 },
        IterativeMethod::ConjugateGradient,
    ]
}

fn report(system: &TestSystem, method: &IterativeMethod) -> Result<()> {
    let (A, b) = system.setup()?;
    let x0 = LinearSystemMatrix::zeros(A.nrows(), 1);
    let tol = Tolerances::new(1e-10, 0.0)?;
    match iterate(&A, &b, &x0, method, &tol, Some(20_000)) {
        Ok(outcome) => {
            let exact = LinearSystemMatrix::column(&system.exact_solution())?;
            let error = outcome.x.sub(&exact)?.linear_norm();
            println!(
                "{:?} / {}: {} iterations, ||x - x_exact|| = {:e}",
                system, method, outcome.iterations, error
            );
        }
        Err(e) => println!("{:?} / {}: {}", system, method, e),
    }
    Ok(())
}

/// relaxation factor scan on the tridiagonal system
fn sor_factor_scan() -> Result<()> {
    let (A, b) = TestSystem::Tridiagonal.setup()?;
    let x0 = LinearSystemMatrix::zeros(A.nrows(), 1);
    let tol = Tolerances::new(1e-12, 0.0)?;
    if let Some(w_opt) = optimal_sor_factor(&A)? {
        println!("suggested relaxation factor w = {}", w_opt);
    }
    for k in 0..10 {
        let w = 0.6 + 0.1 * k as f64;
        let outcome = iterate(&A, &b, &x0, &IterativeMethod::Sor { w }, &tol, Some(10_000))?;
        println!("w = {:.1}: {} iterations", w, outcome.iterations);
    }
    Ok(())
}

/// solver driven by a config, with logging and statistics
fn solve_from_config() -> Result<()> {
    let config = SolverConfig::from_toml_str(
        r#"
        [solver]
        method = "sor"
        w = 1.1
        absolute_tolerance = 1e-12
        max_iterations = 1000
        loglevel = "info"
        "#,
    )?;
    let (A, b) = TestSystem::Tridiagonal.setup()?;
    let n = A.nrows();
    let mut solver = LinearSystemSolver::from_config(A, b, &config)?;
    let iterations = solver.solve_with_logging(&vec![0.0; n])?;
    println!(
        "{} iterations, residual = {:?}",
        iterations,
        solver.get_solution_error()
    );
    Ok(())
}

/// diagnostics predict what the loop will do
fn predicted_divergence() -> Result<()> {
    let A = LinearSystemMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 1.0]])?;
    println!("diagonally dominant: {}", is_diagonally_dominant(&A));
    for method in [IterativeMethod::Jacobi, IterativeMethod::GaussSeidel] {
        println!("{} converges: {}", method, predicts_convergence(&A, &method)?);
    }
    let mut solver = LinearSystemSolver::new(
        A,
        LinearSystemMatrix::column(&[1.0, 1.0])?,
        IterativeMethod::Jacobi,
    )?
    .with_max_iterations(Some(50));
    if let Err(e) = solver.solve(&[0.0, 0.0], 1e-10, 0.0) {
        println!("as predicted: {}", e);
    }
    Ok(())
}

fn solve_and_save() -> Result<()> {
    let (A, b) = TestSystem::Laplace1D.setup()?;
    let n = A.nrows();
    let mut solver = LinearSystemSolver::new(A, b, IterativeMethod::ConjugateGradient)?;
    solver.solve(&vec![0.0; n], 1e-12, 0.0)?;
    if let Some(x) = solver.get_solution() {
        let headers: Vec<String> = (0..n).map(|i| format!("u{}", i)).collect();
        match save_solution_to_csv(x, Some(headers.as_slice()), Path::new("solution.csv")) {
            Ok(()) => println!("solution saved to solution.csv"),
            Err(e) => println!("cannot save solution: {}", e),
        }
    }
    Ok(())
}

pub fn iterative_examples(example: usize) {
    let res = match example {
        // every method on every test system
        // (gradient descent settles at A*x = -b, so its error is ~2*||x_exact||)
        0 => TestSystem::iter().try_for_each(|system| {
            all_methods()
                .iter()
                .try_for_each(|method| report(&system, method))
        }),
        1 => sor_factor_scan(),
        2 => solve_from_config(),
        3 => predicted_divergence(),
        4 => solve_and_save(),
        _ => {
            println!("no example with number {}", example);
            Ok(())
        }
    };
    if let Err(e) = res {
        println!("example {} failed: {}", example, e);
    }
}
