//! Compressed sparse row matrices, with just enough structure to assemble the finite
//! difference operators and the interpolation matrices and to apply them to fields.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1};
use std::ops::Add;

/// Sparse matrix in compressed sparse row format.
///
/// Entries are kept sorted by column within each row. Explicit zeros are stored if they
/// were assembled, so `nnz` counts stored entries, not nonzero values.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_indices: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Assembles a matrix from `(row, col, value)` triplets, summing duplicates.
    ///
    /// Panics if a triplet lies outside `shape`.
    pub fn from_triplets(shape: (usize, usize), triplets: &[(usize, usize, f64)]) -> Self {
        let (nrows, ncols) = shape;
        let mut rows: Vec<Vec<(usize, f64)>> = vec![Vec::new(); nrows];
        for &(i, j, v) in triplets {
            assert!(i < nrows && j < ncols,
                    "entry ({}, {}) outside a {}x{} matrix",
                    i,
                    j,
                    nrows,
                    ncols);
            rows[i].push((j, v));
        }
        Self::from_rows(shape, rows)
    }

    fn from_rows(shape: (usize, usize), mut rows: Vec<Vec<(usize, f64)>>) -> Self {
        let (nrows, ncols) = shape;
        debug_assert_eq!(rows.len(), nrows);
        let mut row_ptr = Vec::with_capacity(nrows + 1);
        let mut col_indices = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);

        for row in &mut rows {
            row.sort_by_key(|&(col, _)| col);
            let start = col_indices.len();
            for &(col, val) in row.iter() {
                match col_indices.last() {
                    Some(&last) if col_indices.len() > start && last == col => {
                        if let Some(acc) = values.last_mut() {
                            *acc += val;
                        }
                    }
                    _ => {
                        col_indices.push(col);
                        values.push(val);
                    }
                }
            }
            row_ptr.push(col_indices.len());
        }

        CsrMatrix {
            nrows,
            ncols,
            row_ptr,
            col_indices,
            values,
        }
    }

    /// Square diagonal matrix with `diag` on the main diagonal.
    pub fn from_diag(diag: ArrayView1<f64>) -> Self {
        let n = diag.len();
        CsrMatrix {
            nrows: n,
            ncols: n,
            row_ptr: (0..n + 1).collect(),
            col_indices: (0..n).collect(),
            values: diag.to_vec(),
        }
    }

    pub fn identity(n: usize) -> Self {
        Self::from_diag(Array1::ones(n).view())
    }

    /// Banded matrix built from diagonals at the given offsets.
    ///
    /// Offset `0` is the main diagonal, positive offsets lie above it. Each diagonal is read
    /// from its first element: entry `(i, i + k)` of a super-diagonal and entry `(i + k, i)`
    /// of a sub-diagonal both come from `diagonal[i]`. Elements past the length of the
    /// diagonal inside `shape` are ignored.
    pub fn from_diagonals(diagonals: &[ArrayView1<f64>],
                          offsets: &[isize],
                          shape: (usize, usize))
                          -> Self {
        assert_eq!(diagonals.len(), offsets.len());
        let (nrows, ncols) = shape;
        let mut triplets = Vec::new();
        for (diagonal, &offset) in diagonals.iter().zip(offsets) {
            let (r0, c0) = if offset >= 0 {
                (0, offset as usize)
            } else {
                (offset.unsigned_abs(), 0)
            };
            let len = nrows.saturating_sub(r0).min(ncols.saturating_sub(c0));
            assert!(diagonal.len() >= len,
                    "diagonal at offset {} needs {} elements, got {}",
                    offset,
                    len,
                    diagonal.len());
            triplets.extend((0..len).map(|t| (r0 + t, c0 + t, diagonal[t])));
        }
        Self::from_triplets(shape, &triplets)
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Stored entries of row `i` as `(col, value)` pairs, ordered by column.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let (start, end) = (self.row_ptr[i], self.row_ptr[i + 1]);
        self.col_indices[start..end]
            .iter()
            .cloned()
            .zip(self.values[start..end].iter().cloned())
    }

    /// All stored entries as `(row, col, value)`, in row-major order.
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.nrows).flat_map(move |i| self.row(i).map(move |(j, v)| (i, j, v)))
    }

    /// Value at `(i, j)`, zero when nothing is stored there.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let (start, end) = (self.row_ptr[i], self.row_ptr[i + 1]);
        match self.col_indices[start..end].binary_search(&j) {
            Ok(pos) => self.values[start + pos],
            Err(_) => 0.,
        }
    }

    pub fn diagonal(&self) -> Array1<f64> {
        let n = self.nrows.min(self.ncols);
        Array1::from_shape_fn(n, |i| self.get(i, i))
    }

    /// Kronecker product `self ⊗ other`.
    pub fn kron(&self, other: &CsrMatrix) -> CsrMatrix {
        let (m1, n1) = self.shape();
        let (m2, n2) = other.shape();
        let mut row_ptr = Vec::with_capacity(m1 * m2 + 1);
        let mut col_indices = Vec::with_capacity(self.nnz() * other.nnz());
        let mut values = Vec::with_capacity(self.nnz() * other.nnz());
        row_ptr.push(0);

        // columns come out sorted: outer column blocks ascend, inner columns ascend
        for i in 0..m1 {
            for k in 0..m2 {
                for (j, a) in self.row(i) {
                    for (l, b) in other.row(k) {
                        col_indices.push(j * n2 + l);
                        values.push(a * b);
                    }
                }
                row_ptr.push(col_indices.len());
            }
        }

        CsrMatrix {
            nrows: m1 * m2,
            ncols: n1 * n2,
            row_ptr,
            col_indices,
            values,
        }
    }

    /// Drops every stored entry in the rows selected by `cleared`.
    pub fn clear_rows<F>(&mut self, cleared: F)
        where F: Fn(usize) -> bool
    {
        let rows: Vec<Vec<(usize, f64)>> = (0..self.nrows)
            .map(|i| if cleared(i) {
                Vec::new()
            } else {
                self.row(i).collect()
            })
            .collect();
        *self = Self::from_rows(self.shape(), rows);
    }

    /// Computes `y += alpha * self * x`.
    pub fn mul_add(&self, alpha: f64, x: ArrayView1<f64>, y: &mut ArrayViewMut1<f64>) {
        assert_eq!(x.len(), self.ncols);
        assert_eq!(y.len(), self.nrows);
        for i in 0..self.nrows {
            let sum: f64 = self.row(i).map(|(j, v)| v * x[j]).sum();
            y[i] += alpha * sum;
        }
    }

    /// Matrix-vector product.
    pub fn dot(&self, x: ArrayView1<f64>) -> Array1<f64> {
        let mut y = Array1::zeros(self.nrows);
        self.mul_add(1., x, &mut y.view_mut());
        y
    }

    /// Product with a dense matrix, e.g. an interpolation matrix applied to every time
    /// step of a field at once.
    pub fn dot_dense(&self, x: ArrayView2<f64>) -> Array2<f64> {
        assert_eq!(x.nrows(), self.ncols);
        let mut y = Array2::zeros((self.nrows, x.ncols()));
        for i in 0..self.nrows {
            let mut out = y.row_mut(i);
            for (j, v) in self.row(i) {
                out.scaled_add(v, &x.row(j));
            }
        }
        y
    }

    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros(self.shape());
        for (i, j, v) in self.triplets() {
            dense[(i, j)] += v;
        }
        dense
    }
}

impl<'a> Add for &'a CsrMatrix {
    type Output = CsrMatrix;

    fn add(self, other: &'a CsrMatrix) -> CsrMatrix {
        assert_eq!(self.shape(), other.shape());
        let rows: Vec<Vec<(usize, f64)>> = (0..self.nrows)
            .map(|i| self.row(i).chain(other.row(i)).collect())
            .collect();
        CsrMatrix::from_rows(self.shape(), rows)
    }
}
