use linfact::{
    DirectSolver, Factorization, HouseholderQr, LinearSolver, Matrix, RowPivotLu, Solve, SolverKind,
    SquareMatrix, Vector,
};
use rand::Rng;

fn main() {
    let n = 10;
    // build a random SPD matrix: A = MᵀM + I
    let mut rng = rand::thread_rng();
    let m = Matrix::from_fn(n, n, |_, _| rng.r#gen::<f64>());
    let mut a = &m.transpose() * &m;
    for i in 0..n {
        a[(i, i)] = a[(i, i)] + 1.0;
    }

    // rhs
    let b: Vec<f64> = (0..n).map(|_| rng.r#gen()).collect();
    let mut x = vec![0.0; n];

    // one-call solves through the context
    for kind in [SolverKind::RowPivotLu, SolverKind::HouseholderQr] {
        let mut solver = DirectSolver::new(kind);
        let stats = solver.solve(&a, &b, &mut x).unwrap();
        println!("{kind}: x = {:?}, stats = {:?}", x, stats);
    }

    // the factorizations directly
    let sq = SquareMatrix::try_from(a.clone()).unwrap();
    let mut lu = RowPivotLu::from_matrix(&sq).unwrap();
    println!("det(A) = {}", lu.determinant().unwrap());
    println!("{lu:.4}");
    let p = lu.steal_p().unwrap();
    println!("stole P = {p}after steal:\n{lu:.4}");

    let mut qr = HouseholderQr::new();
    qr.compute_owned(a).unwrap();
    let x_qr = qr.solve_into(Vector::from(b)).unwrap();
    println!("QR x =\n{x_qr}");
}
