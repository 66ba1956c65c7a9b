/////////////////////////////TESTS////////////////////////////////////////////////////
/*
scenario tests for the relaxation solvers:
Jacobi vs Gauss-Seidel on a small dominant system
SOR(w=1) is Gauss-Seidel
gradient descent with a too large step diverges
conjugate gradient on SPD systems
repeated solves, queries, error propagation
larger random diagonally dominant systems against nalgebra LU
*/

#[cfg(test)]
mod tests {
    use crate::Utils::solver_config::SolverConfig;
    use crate::somelinalg::convergence::Tolerances;
    use crate::somelinalg::iterative_solvers_cpu::iteration_rules::IterationRule;
    use crate::somelinalg::iterative_solvers_cpu::{
        IterativeMethod, LinearSystemSolver, iterate,
    };
    use crate::somelinalg::linear_sys_errors::LinearSystemError;
    use crate::somelinalg::linear_sys_matrix::LinearSystemMatrix;
    use approx::relative_eq;
    use nalgebra::{DMatrix, DVector};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn small_system() -> (Vec<Vec<f64>>, Vec<f64>) {
        (vec![vec![4.0, 1.0], vec![2.0, 3.0]], vec![1.0, 2.0])
    }

    fn diagonally_dominant(rng: &mut StdRng, n: usize) -> (DMatrix<f64>, DVector<f64>) {
        let mut A: DMatrix<f64> = DMatrix::from_fn(n, n, |_, _| rng.random_range(-1.0..1.0));
        for i in 0..n {
            let off: f64 = (0..n).filter(|&j| j != i).map(|j| A[(i, j)].abs()).sum();
            A[(i, i)] = off + 1.0 + rng.random_range(0.0..1.0);
        }
        let b: DVector<f64> = DVector::from_fn(n, |_, _| rng.random_range(-5.0..5.0));
        (A, b)
    }

    #[test]
    fn jacobi_and_gauss_seidel_small_system() {
        let (A, b) = small_system();
        let mut jacobi = LinearSystemSolver::from_vecs(&A, &b, IterativeMethod::Jacobi).unwrap();
        let mut gs = LinearSystemSolver::from_vecs(&A, &b, IterativeMethod::GaussSeidel).unwrap();
        let it_jacobi = jacobi.solve(&[0.0, 0.0], 1e-6, 0.0).unwrap();
        let it_gs = gs.solve(&[0.0, 0.0], 1e-6, 0.0).unwrap();
        println!("Jacobi: {} iterations, Gauss-Seidel: {} iterations", it_jacobi, it_gs);
        assert!(it_jacobi < 100);
        assert!(it_gs < 100);
        assert!(it_gs < it_jacobi);
        // 4x + y = 1, 2x + 3y = 2
        let exact = [0.1, 0.6];
        assert!(jacobi.check_against(&exact, 1e-5, 0.0));
        assert!(gs.check_against(&exact, 1e-5, 0.0));
        assert!(jacobi.check_solution(1e-5, 0.0));
        assert!(gs.check_solution(1e-5, 0.0));
    }

    #[test]
    fn jacobi_and_gauss_seidel_symmetric_system() {
        // [[4,1],[1,3]] x = [1,2] has x = [1/11, 7/11] = [0.0909.., 0.6363..]
        let A = vec![vec![4.0, 1.0], vec![1.0, 3.0]];
        let b = vec![1.0, 2.0];
        let exact = [1.0 / 11.0, 7.0 / 11.0];
        let mut iterations = Vec::new();
        for method in [IterativeMethod::Jacobi, IterativeMethod::GaussSeidel] {
            let mut solver = LinearSystemSolver::from_vecs(&A, &b, method).unwrap();
            let it = solver.solve(&[0.0, 0.0], 1e-6, 0.0).unwrap();
            assert!(it < 100);
            let x = solver.get_solution().unwrap();
            assert!(relative_eq!(x[(0, 0)], 0.0909, epsilon = 1e-4));
            assert!(relative_eq!(x[(1, 0)], 0.6364, epsilon = 1e-4));
            assert!(solver.get_error_against(&exact).unwrap() < 1e-5);
            iterations.push(it);
        }
        assert!(iterations[1] < iterations[0]);
    }

    #[test]
    fn sor_with_unit_factor_is_gauss_seidel() {
        let mut rng = StdRng::seed_from_u64(21);
        let (A, b) = small_system();
        let mut systems = vec![(
            LinearSystemMatrix::from_rows(&A).unwrap(),
            LinearSystemMatrix::column(&b).unwrap(),
        )];
        for n in [3, 5, 8] {
            let (A, b) = diagonally_dominant(&mut rng, n);
            systems.push((
                LinearSystemMatrix::from_dmatrix(A),
                LinearSystemMatrix::from_dmatrix(DMatrix::from_column_slice(n, 1, b.as_slice())),
            ));
        }
        for (A, b) in systems {
            let x0 = LinearSystemMatrix::zeros(A.nrows(), 1);
            let tol = Tolerances::new(1e-12, 0.0).unwrap();
            let gs = iterate(&A, &b, &x0, &IterativeMethod::GaussSeidel, &tol, Some(1000)).unwrap();
            let sor = iterate(&A, &b, &x0, &IterativeMethod::Sor { w: 1.0 }, &tol, Some(1000)).unwrap();
            assert_eq!(gs.iterations, sor.iterations);
            assert_eq!(gs.x, sor.x);
        }
    }

    #[test]
    fn sor_over_relaxation_converges() {
        let (A, b) = small_system();
        for w in [0.8, 1.1, 1.3] {
            let mut solver =
                LinearSystemSolver::from_vecs(&A, &b, IterativeMethod::Sor { w }).unwrap();
            let it = solver.solve(&[0.0, 0.0], 1e-10, 0.0).unwrap();
            assert!(it < 200, "w = {} took {} iterations", w, it);
            assert!(solver.check_against(&[0.1, 0.6], 1e-8, 0.0));
        }
    }

    #[test]
    fn gradient_descent_too_large_step_diverges() {
        let A = LinearSystemMatrix::from_rows(&[vec![10.0, 0.0], vec![0.0, 20.0]]).unwrap();
        let b = LinearSystemMatrix::column(&[1.0, 1.0]).unwrap();
        let x0 = LinearSystemMatrix::zeros(2, 1);
        let method = IterativeMethod::GradientDescent { step_size: 1.0 };

        // residual ||A x - b|| grows at every step, nothing stops the step size
        let mut rule = IterationRule::prepare(&method, &A, &b, &x0).unwrap();
        let mut x = x0.clone();
        let mut residual = A.mul(&x).unwrap().sub(&b).unwrap().linear_norm();
        for _ in 0..10 {
            x = rule.step(&x).unwrap();
            let new_residual = A.mul(&x).unwrap().sub(&b).unwrap().linear_norm();
            assert!(new_residual > residual);
            residual = new_residual;
        }

        // through the loop the divergence surfaces only thanks to the cap
        let tol = Tolerances::new(1e-8, 0.0).unwrap();
        let res = iterate(&A, &b, &x0, &method, &tol, Some(25));
        match res {
            Err(LinearSystemError::MaxIterationsExceeded {
                iterations,
                last_increment,
            }) => {
                assert_eq!(iterations, 25);
                assert!(last_increment > 1e10);
            }
            other => panic!("expected MaxIterationsExceeded, got {:?}", other),
        }
    }

    #[test]
    fn gradient_descent_small_step_fixed_point() {
        // the update x - a*(A x + b) is stationary where A x = -b
        let A = vec![vec![4.0, 1.0], vec![1.0, 3.0]];
        let b = vec![1.0, 2.0];
        let mut solver = LinearSystemSolver::from_vecs(
            &A,
            &b,
            IterativeMethod::GradientDescent { step_size: 0.1 },
        )
        .unwrap()
        .with_max_iterations(Some(10_000));
        let it = solver.solve(&[0.0, 0.0], 1e-12, 0.0).unwrap();
        assert!(it > 1);
        assert!(solver.check_against(&[-1.0 / 11.0, -7.0 / 11.0], 1e-9, 0.0));
    }

    #[test]
    fn conjugate_gradient_spd() {
        let A = vec![
            vec![4.0, 1.0, 0.0],
            vec![1.0, 3.0, 1.0],
            vec![0.0, 1.0, 2.0],
        ];
        let b = vec![1.0, 2.0, 3.0];
        let mut solver =
            LinearSystemSolver::from_vecs(&A, &b, IterativeMethod::ConjugateGradient)
                .unwrap()
                .with_max_iterations(Some(50));
        let it = solver.solve(&[0.0, 0.0, 0.0], 1e-10, 0.0).unwrap();
        assert!(it <= 4, "CG took {} iterations on a 3x3 system", it);
        assert!(solver.check_solution(1e-10, 0.0));
    }

    #[test]
    fn conjugate_gradient_random_spd() {
        let mut rng = StdRng::seed_from_u64(22);
        let n = 20;
        let B: DMatrix<f64> = DMatrix::from_fn(n, n, |_, _| rng.random_range(-1.0..1.0));
        let A = B.transpose() * &B + DMatrix::identity(n, n) * (n as f64);
        let b: DVector<f64> = DVector::from_fn(n, |_, _| rng.random_range(-1.0..1.0));
        let exact = A.clone().lu().solve(&b).unwrap();

        let mut solver = LinearSystemSolver::new(
            LinearSystemMatrix::from_dmatrix(A),
            LinearSystemMatrix::from_dmatrix(DMatrix::from_column_slice(n, 1, b.as_slice())),
            IterativeMethod::ConjugateGradient,
        )
        .unwrap()
        .with_max_iterations(Some(500));
        solver.solve(&vec![0.0; n], 1e-12, 0.0).unwrap();
        assert!(solver.get_error_against(exact.as_slice()).unwrap() < 1e-9);
    }

    #[test]
    fn random_dominant_systems_against_lu() {
        let mut rng = StdRng::seed_from_u64(23);
        let n = 12;
        let (A, b) = diagonally_dominant(&mut rng, n);
        let exact = A.clone().lu().solve(&b).unwrap();
        for method in [
            IterativeMethod::Jacobi,
            IterativeMethod::GaussSeidel,
            IterativeMethod::Sor { w: 1.05 },
        ] {
            let mut solver = LinearSystemSolver::new(
                LinearSystemMatrix::from_dmatrix(A.clone()),
                LinearSystemMatrix::from_dmatrix(DMatrix::from_row_slice(1, n, b.as_slice())),
                method,
            )
            .unwrap()
            .with_max_iterations(Some(5000));
            let it = solver.solve(&vec![0.0; n], 1e-12, 0.0).unwrap();
            let err = solver.get_error_against(exact.as_slice()).unwrap();
            assert!(err < 1e-9, "{} error {} after {} iterations", method, err, it);
        }
    }

    #[test]
    fn repeated_solves_overwrite_solution() {
        let (A, b) = small_system();
        let mut solver = LinearSystemSolver::from_vecs(&A, &b, IterativeMethod::Jacobi).unwrap();
        assert!(solver.get_solution().is_none());
        assert!(solver.get_solution_error().is_none());
        assert!(!solver.check_solution(1.0, 0.0));

        let loose = solver.solve(&[0.0, 0.0], 1e-3, 0.0).unwrap();
        let loose_error = solver.get_solution_error().unwrap();
        let tight = solver.solve(&[5.0, -5.0], 1e-12, 0.0).unwrap();
        let tight_error = solver.get_solution_error().unwrap();
        assert!(tight > loose);
        assert!(tight_error < loose_error);

        // relative tolerance loosens the stop
        let relative = solver.solve(&[0.0, 0.0], 0.0, 1e-3).unwrap();
        assert!(relative < tight);
    }

    #[test]
    fn queries_do_not_mutate() {
        let (A, b) = small_system();
        let mut solver =
            LinearSystemSolver::from_vecs(&A, &b, IterativeMethod::GaussSeidel).unwrap();
        solver.solve(&[0.0, 0.0], 1e-8, 0.0).unwrap();
        let first = solver.get_solution_error().unwrap();
        let second = solver.get_solution_error().unwrap();
        assert_eq!(first, second);
        let x_before = solver.get_solution().cloned();
        let _ = solver.check_solution(1e-8, 0.0);
        let _ = solver.check_solution_default();
        assert_eq!(solver.get_solution().cloned(), x_before);
    }

    #[test]
    fn zero_diagonal_fails_as_singular() {
        let A = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let b = vec![1.0, 1.0];
        let mut solver = LinearSystemSolver::from_vecs(&A, &b, IterativeMethod::Jacobi).unwrap();
        let res = solver.solve(&[0.0, 0.0], 1e-8, 0.0);
        assert!(matches!(res, Err(LinearSystemError::SingularMatrix { .. })));
        assert!(solver.get_solution().is_none());
    }

    #[test]
    fn bad_inputs_are_rejected() {
        let (A, b) = small_system();
        // non-square coefficient matrix
        let rect = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        assert!(matches!(
            LinearSystemSolver::from_vecs(&rect, &b, IterativeMethod::Jacobi),
            Err(LinearSystemError::DimensionMismatch { .. })
        ));
        // right-hand side of wrong length
        assert!(matches!(
            LinearSystemSolver::from_vecs(&A, &[1.0, 2.0, 3.0], IterativeMethod::Jacobi),
            Err(LinearSystemError::DimensionMismatch { .. })
        ));
        // empty system
        assert!(LinearSystemSolver::from_vecs(&[], &[], IterativeMethod::Jacobi).is_err());
        // non-finite SOR factor
        assert!(matches!(
            LinearSystemSolver::from_vecs(&A, &b, IterativeMethod::Sor { w: f64::NAN }),
            Err(LinearSystemError::InvalidParameter(_))
        ));

        let mut solver = LinearSystemSolver::from_vecs(&A, &b, IterativeMethod::Jacobi).unwrap();
        assert!(matches!(
            solver.solve(&[0.0], 1e-8, 0.0),
            Err(LinearSystemError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            solver.solve(&[0.0, 0.0], -1e-8, 0.0),
            Err(LinearSystemError::InvalidParameter(_))
        ));
        let mut capped = solver.clone().with_max_iterations(Some(0));
        assert!(matches!(
            capped.solve(&[0.0, 0.0], 1e-8, 0.0),
            Err(LinearSystemError::InvalidParameter(_))
        ));
    }

    #[test]
    fn row_and_column_right_hand_sides_agree() {
        let (A, b) = small_system();
        let A = LinearSystemMatrix::from_rows(&A).unwrap();
        let row = LinearSystemSolver::new(
            A.clone(),
            LinearSystemMatrix::row(&b).unwrap(),
            IterativeMethod::Jacobi,
        )
        .unwrap();
        let col = LinearSystemSolver::new(
            A,
            LinearSystemMatrix::column(&b).unwrap(),
            IterativeMethod::Jacobi,
        )
        .unwrap();
        assert_eq!(row.rhs(), col.rhs());
        assert_eq!(row.rhs().shape(), (2, 1));
    }

    #[test]
    fn solver_from_config_with_logging() {
        let config = SolverConfig::from_toml_str(
            "[solver]\nmethod = \"sor\"\nw = 1.1\nabsolute_tolerance = 1e-12\nmax_iterations = 500\nloglevel = \"off\"\n",
        )
        .unwrap();
        let (A, b) = small_system();
        let mut solver = LinearSystemSolver::from_config(
            LinearSystemMatrix::from_rows(&A).unwrap(),
            LinearSystemMatrix::row(&b).unwrap(),
            &config,
        )
        .unwrap();
        assert_eq!(solver.method, IterativeMethod::Sor { w: 1.1 });
        assert_eq!(solver.max_iterations, Some(500));
        let it = solver.solve_with_logging(&[0.0, 0.0]).unwrap();
        assert!(it > 0 && it < 500);
        assert!(solver.check_against(&[0.1, 0.6], 1e-10, 0.0));

        // a cap too small for the tolerance is reported, the solution is kept
        let mut capped = solver.clone().with_max_iterations(Some(2));
        assert!(matches!(
            capped.solve_with_logging(&[0.0, 0.0]),
            Err(LinearSystemError::MaxIterationsExceeded { iterations: 2, .. })
        ));
        assert_eq!(capped.get_solution(), solver.get_solution());
    }

    #[test]
    fn builder_settings_drive_solve_with_logging() {
        let (A, b) = small_system();
        let tolerances = Tolerances::new(1e-11, 0.0).unwrap();
        let mut solver = LinearSystemSolver::from_vecs(&A, &b, IterativeMethod::GaussSeidel)
            .unwrap()
            .with_tolerances(tolerances)
            .with_loglevel("off")
            .with_max_iterations(Some(200));
        assert_eq!(solver.tolerances, tolerances);
        assert_eq!(solver.loglevel.as_deref(), Some("off"));
        assert_eq!(
            solver.coefficients(),
            &LinearSystemMatrix::from_rows(&A).unwrap()
        );
        solver.solve_with_logging(&[0.0, 0.0]).unwrap();
        assert!(solver.check_against(&[0.1, 0.6], 1e-10, 0.0));
        // A and b are never touched by a solve
        assert_eq!(solver.coefficients().to_vec(), vec![4.0, 1.0, 2.0, 3.0]);
        assert_eq!(solver.rhs().to_vec(), b);

        let mut bad = solver.clone().with_loglevel("shouting");
        assert!(matches!(
            bad.solve_with_logging(&[0.0, 0.0]),
            Err(LinearSystemError::InvalidParameter(_))
        ));
    }

    #[test]
    fn tiny_magnitude_solution_does_not_stop_early() {
        // well-conditioned system scaled by 1e200: x is of order 1e-201
        let A = LinearSystemMatrix::from_rows(&[vec![4e200, 1e200], vec![2e200, 3e200]]).unwrap();
        let b = LinearSystemMatrix::column(&[1.0, 2.0]).unwrap();
        let mut solver = LinearSystemSolver::new(A, b, IterativeMethod::GaussSeidel)
            .unwrap()
            .with_max_iterations(Some(1000));
        let it = solver.solve(&[0.0, 0.0], 1e-300, 1e-12).unwrap();
        assert!(it > 5, "stopped after {} iterations", it);
        let x = solver.get_solution().unwrap();
        assert!(relative_eq!(x[(0, 0)], 0.1e-200, max_relative = 1e-9));
        assert!(relative_eq!(x[(1, 0)], 0.6e-200, max_relative = 1e-9));
        let scaled_error = solver.get_error_against(&[0.1e-200, 0.6e-200]).unwrap();
        assert!(scaled_error < 1e-209);
    }
}
