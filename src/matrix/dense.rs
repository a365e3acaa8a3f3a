//! Dense row-major containers.
//!
//! `Matrix` is the storage type every factorization works on. `SquareMatrix`,
//! `Vector` and `RowVector` are thin newtypes that enforce a shape invariant
//! and dereference to the underlying `Matrix` for read access.

use std::fmt;
use std::ops::{Add, Deref, Index, IndexMut, Mul, Sub};

use crate::core::traits::Scalar;
use crate::error::LinalgError;

/// Dense `rows × cols` matrix stored row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Default for Matrix<T> {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: Vec::new() }
    }
}

impl<T> Matrix<T> {
    pub(crate) fn from_raw_parts(rows: usize, cols: usize, data: Vec<T>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Matrix { rows, cols, data }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Total number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Row-major element storage.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Borrow row `r`.
    pub fn row(&self, r: usize) -> &[T] {
        &self.data[r * self.cols..(r + 1) * self.cols]
    }

    pub fn row_mut(&mut self, r: usize) -> &mut [T] {
        let cols = self.cols;
        &mut self.data[r * cols..(r + 1) * cols]
    }

    /// Swap two rows in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let cols = self.cols;
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.data.split_at_mut(hi * cols);
        head[lo * cols..(lo + 1) * cols].swap_with_slice(&mut tail[..cols]);
    }

    /// Swap two columns in place.
    pub fn swap_columns(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for r in 0..self.rows {
            self.data.swap(r * self.cols + a, r * self.cols + b);
        }
    }

    /// Drop every row past the first `n`. Row-major storage makes this free.
    ///
    /// # Panics
    /// Panics if `n > rows`.
    pub fn truncate_rows(&mut self, n: usize) {
        assert!(n <= self.rows, "cannot truncate {} rows to {}", self.rows, n);
        self.data.truncate(n * self.cols);
        self.rows = n;
    }
}

impl<T: Scalar> Matrix<T> {
    /// All-zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix { rows, cols, data: vec![T::zero(); rows * cols] }
    }

    /// `n × n` identity.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = T::one();
        }
        m
    }

    /// Wrap row-major `data`; its length must be `rows * cols`.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<T>) -> Result<Self, LinalgError> {
        if data.len() != rows * cols {
            return Err(LinalgError::DimensionMismatch { expected: rows * cols, got: data.len() });
        }
        Ok(Matrix { rows, cols, data })
    }

    /// Build from a slice of equally long rows.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self, LinalgError> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(LinalgError::DimensionMismatch { expected: cols, got: row.len() });
            }
            data.extend_from_slice(row);
        }
        Ok(Matrix { rows: rows.len(), cols, data })
    }

    /// Build element-wise from `f(row, col)`.
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Matrix { rows, cols, data }
    }

    /// Element at `(r, c)`, or `None` when out of range.
    pub fn get(&self, r: usize, c: usize) -> Option<T> {
        if r < self.rows && c < self.cols { Some(self.data[r * self.cols + c]) } else { None }
    }

    pub fn transpose(&self) -> Matrix<T> {
        Matrix::from_fn(self.cols, self.rows, |i, j| self[(j, i)])
    }

    /// Largest absolute element, zero for an empty matrix.
    pub fn max_abs(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, v| acc.max(v.abs()))
    }

    pub fn frobenius_norm(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &v| acc + v * v).sqrt()
    }

    /// True when every element below the diagonal has magnitude `<= tol`.
    pub fn is_upper_triangular(&self, tol: T) -> bool {
        (0..self.rows).all(|r| (0..r.min(self.cols)).all(|c| self[(r, c)].abs() <= tol))
    }

    /// True when every element above the diagonal has magnitude `<= tol`.
    pub fn is_lower_triangular(&self, tol: T) -> bool {
        (0..self.rows).all(|r| ((r + 1)..self.cols).all(|c| self[(r, c)].abs() <= tol))
    }

    /// Matrix product `self · rhs`.
    pub fn matmul(&self, rhs: &Matrix<T>) -> Result<Matrix<T>, LinalgError> {
        if self.cols != rhs.rows {
            return Err(LinalgError::DimensionMismatch { expected: self.cols, got: rhs.rows });
        }
        let mut out = Matrix::zeros(self.rows, rhs.cols);
        if rhs.cols == 0 {
            return Ok(out);
        }
        #[cfg(feature = "rayon")]
        {
            use rayon::prelude::*;
            out.data
                .par_chunks_mut(rhs.cols)
                .enumerate()
                .for_each(|(i, out_row)| self.accumulate_row(rhs, i, out_row));
        }
        #[cfg(not(feature = "rayon"))]
        {
            out.data
                .chunks_mut(rhs.cols)
                .enumerate()
                .for_each(|(i, out_row)| self.accumulate_row(rhs, i, out_row));
        }
        Ok(out)
    }

    // out_row += self[i, :] · rhs
    fn accumulate_row(&self, rhs: &Matrix<T>, i: usize, out_row: &mut [T]) {
        for (p, &a_ip) in self.row(i).iter().enumerate() {
            if a_ip == T::zero() {
                continue;
            }
            for (o, &b) in out_row.iter_mut().zip(rhs.row(p)) {
                *o = *o + a_ip * b;
            }
        }
    }

    fn zip_with(&self, rhs: &Matrix<T>, f: impl Fn(T, T) -> T) -> Matrix<T> {
        assert_eq!(self.shape(), rhs.shape(), "Matrix shapes must match");
        let data = self.data.iter().zip(&rhs.data).map(|(&a, &b)| f(a, b)).collect();
        Matrix { rows: self.rows, cols: self.cols, data }
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;
    fn index(&self, (r, c): (usize, usize)) -> &T {
        debug_assert!(r < self.rows && c < self.cols, "index ({r}, {c}) out of bounds");
        &self.data[r * self.cols + c]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut T {
        debug_assert!(r < self.rows && c < self.cols, "index ({r}, {c}) out of bounds");
        &mut self.data[r * self.cols + c]
    }
}

/// Flat (row-major) indexing.
impl<T> Index<usize> for Matrix<T> {
    type Output = T;
    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T> IndexMut<usize> for Matrix<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.data[i]
    }
}

impl<'a, T: Scalar> Mul<&'a Matrix<T>> for &'a Matrix<T> {
    type Output = Matrix<T>;
    fn mul(self, rhs: &'a Matrix<T>) -> Matrix<T> {
        assert_eq!(self.cols, rhs.rows, "Inner dimensions must match");
        match self.matmul(rhs) {
            Ok(m) => m,
            Err(e) => unreachable!("{e}"),
        }
    }
}

impl<'a, T: Scalar> Add<&'a Matrix<T>> for &'a Matrix<T> {
    type Output = Matrix<T>;
    fn add(self, rhs: &'a Matrix<T>) -> Matrix<T> {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl<'a, T: Scalar> Sub<&'a Matrix<T>> for &'a Matrix<T> {
    type Output = Matrix<T>;
    fn sub(self, rhs: &'a Matrix<T>) -> Matrix<T> {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl<T: Scalar> fmt::Display for Matrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = f.precision().unwrap_or(6);
        let width = f.width().unwrap_or(prec + 9);
        for r in 0..self.rows {
            for v in self.row(r) {
                write!(f, "{v:>width$.prec$}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Matrix with `rows == cols`; the only input accepted by the LU factorizations.
#[derive(Clone, Debug, PartialEq)]
pub struct SquareMatrix<T>(Matrix<T>);

impl<T> Default for SquareMatrix<T> {
    fn default() -> Self {
        SquareMatrix(Matrix::default())
    }
}

impl<T> SquareMatrix<T> {
    pub(crate) fn new_unchecked(m: Matrix<T>) -> Self {
        debug_assert!(m.is_square());
        SquareMatrix(m)
    }

    /// Dimension `n` of the `n × n` matrix.
    pub fn size(&self) -> usize {
        self.0.rows()
    }

    pub fn into_inner(self) -> Matrix<T> {
        self.0
    }

    pub fn as_matrix(&self) -> &Matrix<T> {
        &self.0
    }

    pub fn swap_rows(&mut self, a: usize, b: usize) {
        self.0.swap_rows(a, b);
    }

    pub fn swap_columns(&mut self, a: usize, b: usize) {
        self.0.swap_columns(a, b);
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.0.as_mut_slice()
    }
}

impl<T: Scalar> SquareMatrix<T> {
    pub fn zeros(n: usize) -> Self {
        SquareMatrix(Matrix::zeros(n, n))
    }

    pub fn identity(n: usize) -> Self {
        SquareMatrix(Matrix::identity(n))
    }

    pub fn from_fn(n: usize, f: impl FnMut(usize, usize) -> T) -> Self {
        SquareMatrix(Matrix::from_fn(n, n, f))
    }

    /// Build from rows; fails with `InvalidShape` unless the result is square.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self, LinalgError> {
        Self::try_from(Matrix::from_rows(rows)?)
    }

    pub fn transpose(&self) -> SquareMatrix<T> {
        SquareMatrix(self.0.transpose())
    }
}

impl<T> TryFrom<Matrix<T>> for SquareMatrix<T> {
    type Error = LinalgError;
    fn try_from(m: Matrix<T>) -> Result<Self, LinalgError> {
        if !m.is_square() {
            return Err(LinalgError::shape("a square matrix", m.rows(), m.cols()));
        }
        Ok(SquareMatrix(m))
    }
}

impl<T> From<SquareMatrix<T>> for Matrix<T> {
    fn from(m: SquareMatrix<T>) -> Self {
        m.0
    }
}

impl<T> Deref for SquareMatrix<T> {
    type Target = Matrix<T>;
    fn deref(&self) -> &Matrix<T> {
        &self.0
    }
}

impl<T> Index<(usize, usize)> for SquareMatrix<T> {
    type Output = T;
    fn index(&self, idx: (usize, usize)) -> &T {
        &self.0[idx]
    }
}

impl<T> IndexMut<(usize, usize)> for SquareMatrix<T> {
    fn index_mut(&mut self, idx: (usize, usize)) -> &mut T {
        &mut self.0[idx]
    }
}

impl<T: Scalar> fmt::Display for SquareMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Column vector (`n × 1`).
#[derive(Clone, Debug, PartialEq)]
pub struct Vector<T>(Matrix<T>);

/// Row vector (`1 × n`).
#[derive(Clone, Debug, PartialEq)]
pub struct RowVector<T>(Matrix<T>);

impl<T> Vector<T> {
    pub fn len(&self) -> usize {
        self.0.rows()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Matrix<T> {
        self.0
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0.into_vec()
    }

    pub(crate) fn inner(&self) -> &Matrix<T> {
        &self.0
    }

    pub(crate) fn inner_mut(&mut self) -> &mut Matrix<T> {
        &mut self.0
    }

    pub fn transpose(self) -> RowVector<T> {
        let n = self.len();
        RowVector(Matrix::from_raw_parts(1, n, self.0.into_vec()))
    }
}

impl<T: Scalar> Vector<T> {
    pub fn zeros(n: usize) -> Self {
        Vector(Matrix::zeros(n, 1))
    }

    pub fn from_slice(values: &[T]) -> Self {
        Vector::from(values.to_vec())
    }

    /// Euclidean norm.
    pub fn norm(&self) -> T {
        self.0.frobenius_norm()
    }
}

impl<T> From<Vec<T>> for Vector<T> {
    fn from(values: Vec<T>) -> Self {
        let n = values.len();
        Vector(Matrix::from_raw_parts(n, 1, values))
    }
}

impl<T> TryFrom<Matrix<T>> for Vector<T> {
    type Error = LinalgError;
    fn try_from(m: Matrix<T>) -> Result<Self, LinalgError> {
        if m.cols() != 1 {
            return Err(LinalgError::shape("a column vector", m.rows(), m.cols()));
        }
        Ok(Vector(m))
    }
}

impl<T> From<Vector<T>> for Matrix<T> {
    fn from(v: Vector<T>) -> Self {
        v.0
    }
}

impl<T> Deref for Vector<T> {
    type Target = Matrix<T>;
    fn deref(&self) -> &Matrix<T> {
        &self.0
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;
    fn index(&self, i: usize) -> &T {
        &self.0[i]
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.0[i]
    }
}

impl<T: Scalar> fmt::Display for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl<T> RowVector<T> {
    pub fn len(&self) -> usize {
        self.0.cols()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Matrix<T> {
        self.0
    }

    pub(crate) fn inner(&self) -> &Matrix<T> {
        &self.0
    }

    pub(crate) fn inner_mut(&mut self) -> &mut Matrix<T> {
        &mut self.0
    }

    pub fn transpose(self) -> Vector<T> {
        Vector::from(self.0.into_vec())
    }
}

impl<T> From<Vec<T>> for RowVector<T> {
    fn from(values: Vec<T>) -> Self {
        let n = values.len();
        RowVector(Matrix::from_raw_parts(1, n, values))
    }
}

impl<T> TryFrom<Matrix<T>> for RowVector<T> {
    type Error = LinalgError;
    fn try_from(m: Matrix<T>) -> Result<Self, LinalgError> {
        if m.rows() != 1 {
            return Err(LinalgError::shape("a row vector", m.rows(), m.cols()));
        }
        Ok(RowVector(m))
    }
}

impl<T> From<RowVector<T>> for Matrix<T> {
    fn from(v: RowVector<T>) -> Self {
        v.0
    }
}

impl<T> Deref for RowVector<T> {
    type Target = Matrix<T>;
    fn deref(&self) -> &Matrix<T> {
        &self.0
    }
}

impl<T> Index<usize> for RowVector<T> {
    type Output = T;
    fn index(&self, i: usize) -> &T {
        &self.0[i]
    }
}

impl<T> IndexMut<usize> for RowVector<T> {
    fn index_mut(&mut self, i: usize) -> &mut T {
        &mut self.0[i]
    }
}

impl<T: Scalar> fmt::Display for RowVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
