//! Tests for the `DirectSolver` context and batch solving against faer's
//! dense solvers on random systems.

use approx::assert_abs_diff_eq;
use faer::linalg::solvers::SolveCore;
use linfact::parallel::{init_thread_pool, solve_batch};
use linfact::{DirectSolver, LinalgError, LinearSolver, Matrix, SolverKind, State};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Random nonsymmetric system with a well-conditioned matrix `A = M + n·I`.
fn random_system(n: usize, rng: &mut StdRng) -> (Matrix<f64>, Vec<f64>) {
    let a = Matrix::from_fn(n, n, |i, j| {
        let v: f64 = rng.r#gen();
        if i == j { v + n as f64 } else { v }
    });
    let b: Vec<f64> = (0..n).map(|_| rng.r#gen()).collect();
    (a, b)
}

fn faer_lu(a: &Matrix<f64>, b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let fa = a.to_faer();
    let lu = faer::linalg::solvers::FullPivLu::new(fa.as_ref());
    let mut x = b.to_vec();
    let x_mat = faer::MatMut::from_column_major_slice_mut(&mut x, n, 1);
    lu.solve_in_place_with_conj(faer::Conj::No, x_mat);
    x
}

fn faer_qr(a: &Matrix<f64>, b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let fa = a.to_faer();
    let qr = faer::linalg::solvers::Qr::new(fa.as_ref());
    let mut x = b.to_vec();
    let x_mat = faer::MatMut::from_column_major_slice_mut(&mut x, n, 1);
    qr.solve_in_place_with_conj(faer::Conj::No, x_mat);
    x
}

/// Every kind matches faer's LU and QR on the same random system.
#[test]
fn all_kinds_match_faer() {
    let mut rng = StdRng::seed_from_u64(31);
    let n = 10;
    let (a, b) = random_system(n, &mut rng);
    let x_lu = faer_lu(&a, &b);
    let x_qr = faer_qr(&a, &b);
    for kind in [SolverKind::NoPivotLu, SolverKind::RowPivotLu, SolverKind::HouseholderQr] {
        let mut solver = DirectSolver::new(kind);
        let mut x = vec![0.0; n];
        let stats = solver.solve(&a, &b, &mut x).unwrap();
        assert!(stats.converged, "{kind}: {stats:?}");
        assert!(stats.relative_residual < 1e-12);
        for i in 0..n {
            assert_abs_diff_eq!(x[i], x_lu[i], epsilon = 1e-10);
            assert_abs_diff_eq!(x[i], x_qr[i], epsilon = 1e-10);
        }
    }
}

#[test]
fn kinds_parse_from_strings() {
    let kind: SolverKind = "qr".parse().unwrap();
    assert_eq!(kind, SolverKind::HouseholderQr);
    assert_eq!("row-pivot-lu".parse::<SolverKind>(), Ok(SolverKind::RowPivotLu));
    assert!("cholesky".parse::<SolverKind>().is_err());
}

/// An inconsistent overdetermined system: QR returns the least-squares
/// solution and reports a nonzero residual.
#[test]
fn overdetermined_least_squares_through_context() {
    let a = Matrix::from_rows(&[[1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]).unwrap();
    let b = vec![1.0, 1.0, 0.0];
    let mut solver = DirectSolver::new(SolverKind::HouseholderQr);
    let mut x = vec![0.0; 2];
    let stats = solver.solve(&a, &b, &mut x).unwrap();
    // normal equations [[2,1],[1,2]] x = [1,1]
    assert_abs_diff_eq!(x[0], 1.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(x[1], 1.0 / 3.0, epsilon = 1e-12);
    assert!(!stats.converged);
    assert_abs_diff_eq!(stats.final_residual, (4.0f64 / 3.0).sqrt(), epsilon = 1e-12);
}

#[test]
fn singular_system_is_reported() {
    let a = Matrix::from_rows(&[[1.0, 2.0], [2.0, 4.0]]).unwrap();
    let mut solver = DirectSolver::new(SolverKind::RowPivotLu);
    let mut x = vec![0.0; 2];
    assert_eq!(solver.solve(&a, &vec![1.0, 1.0], &mut x), Err(LinalgError::SingularMatrix(1)));
    assert_eq!(solver.state(), State::Singular);
    assert_eq!(x, vec![0.0, 0.0]);
}

#[test]
fn wrong_output_length_is_rejected() {
    let a = Matrix::from_rows(&[[2.0, 0.0], [0.0, 2.0]]).unwrap();
    let mut solver = DirectSolver::new(SolverKind::RowPivotLu);
    let mut x = vec![0.0; 3];
    assert_eq!(
        solver.solve(&a, &vec![1.0, 1.0], &mut x),
        Err(LinalgError::DimensionMismatch { expected: 2, got: 3 })
    );
}

/// Parallel batch results equal one-by-one solves, in order.
#[test]
fn batch_matches_sequential_solves() {
    init_thread_pool();
    let mut rng = StdRng::seed_from_u64(32);
    let systems: Vec<_> = (0..16).map(|k| random_system(3 + k % 5, &mut rng)).collect();
    let results = solve_batch(SolverKind::HouseholderQr, &systems);
    assert_eq!(results.len(), systems.len());
    for ((a, b), result) in systems.iter().zip(&results) {
        let (x, stats) = result.as_ref().unwrap();
        assert!(stats.converged);
        let mut expected = vec![0.0; b.len()];
        DirectSolver::new(SolverKind::HouseholderQr).solve(a, b, &mut expected).unwrap();
        assert_eq!(x, &expected);
    }
}
