//! Discretized spatial operator of the Leap-Frog scheme.
//!
//! One step of the scheme reads
//!
//! ```text
//! u[k + 1] = A u[k] + L u[k] + B u[k - 1] + dx² C q[k]
//! ```
//!
//! where `A`, `B`, `C` are diagonal and `L` is the second difference scaled by the squared
//! Courant number γ². At interior points `A = 2`, `B = -1`, `C = γ²`, which is the standard
//! central difference in both space and time. Boundary points are treated according to a
//! `Boundary` policy.

use ndarray::{Array1, ArrayView1, ArrayViewMut1};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Dimension;
use crate::error::{Error, Result};
use crate::sparse::CsrMatrix;

/// Treatment of the points on the edge of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// First order one-way wave update `u0 += γ (u1 - u0)` at the edges, so that waves
    /// leave the domain.
    #[default]
    Absorbing,
    /// Boundary points are held at zero.
    Dirichlet,
}

impl Boundary {
    /// Coefficients `(a, b, c)` of the recurrence at a boundary point.
    fn coefficients(self) -> (f64, f64, f64) {
        match self {
            Boundary::Absorbing => (1., 0., 0.),
            Boundary::Dirichlet => (0., 0., 0.),
        }
    }
}

/// The four operators of the recurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Operators {
    pub a: CsrMatrix,
    pub b: CsrMatrix,
    pub c: CsrMatrix,
    pub l: CsrMatrix,
}

impl Operators {
    /// Number of grid points the operators act on.
    pub fn grid_size(&self) -> usize {
        self.l.nrows()
    }

    /// Performs one step of the scheme.
    ///
    /// - `prev`: value at step `k - 1`
    /// - `curr`: value at step `k`
    /// - `source`: source at step `k`
    /// - `dx2`: squared space step
    /// - `next`: computed value at step `k + 1`
    pub fn step(&self,
                prev: ArrayView1<f64>,
                curr: ArrayView1<f64>,
                source: ArrayView1<f64>,
                dx2: f64,
                mut next: ArrayViewMut1<f64>) {
        let n = self.grid_size();
        assert_eq!(prev.len(), n);
        assert_eq!(curr.len(), n);
        assert_eq!(source.len(), n);
        assert_eq!(next.len(), n);

        next.fill(0.);
        self.a.mul_add(1., curr, &mut next);
        self.l.mul_add(1., curr, &mut next);
        self.b.mul_add(1., prev, &mut next);
        self.c.mul_add(dx2, source, &mut next);
    }
}

/// 1-D second difference `γ² [1, -2, 1]` on `nx` points, with the first and last row
/// replaced according to `boundary`.
///
/// Panics if `nx < 2`, since the two boundary rows would overlap.
pub fn band(gamma: f64, nx: usize, boundary: Boundary) -> CsrMatrix {
    assert!(nx >= 2, "band needs at least 2 points, got {}", nx);
    let g2 = gamma * gamma;
    let mut sub = Array1::from_elem(nx, g2);
    let mut main = Array1::from_elem(nx, -2. * g2);
    let mut sup = Array1::from_elem(nx, g2);

    let (edge, neighbor) = match boundary {
        Boundary::Absorbing => (-gamma, gamma),
        Boundary::Dirichlet => (0., 0.),
    };
    main[0] = edge;
    sup[0] = neighbor;
    sub[nx - 2] = neighbor;
    main[nx - 1] = edge;

    CsrMatrix::from_diagonals(&[sub.view(), main.view(), sup.view()], &[-1, 0, 1], (nx, nx))
}

/// Tensor sum of a square 1-D operator over `rank` axes,
/// `Σ I ⊗ ... ⊗ op ⊗ ... ⊗ I` with `op` in each position once.
///
/// For `rank = 2` this is the Kronecker sum `op ⊗ I + I ⊗ op`.
pub fn tensor_sum(op: &CsrMatrix, rank: usize) -> CsrMatrix {
    assert!(rank >= 1);
    let n = op.nrows();
    assert_eq!(op.ncols(), n);

    let term = |axis: usize| {
        CsrMatrix::identity(n.pow(axis as u32))
            .kron(op)
            .kron(&CsrMatrix::identity(n.pow((rank - 1 - axis) as u32)))
    };
    (1..rank).fold(term(0), |acc, axis| &acc + &term(axis))
}

/// Whether flat index `p` of a row-major grid with `nx` points on each of `rank` axes lies
/// on the boundary.
pub fn is_boundary(p: usize, nx: usize, rank: usize) -> bool {
    let mut rest = p;
    for _ in 0..rank {
        let i = rest % nx;
        if i == 0 || i == nx - 1 {
            return true;
        }
        rest /= nx;
    }
    false
}

fn coefficients(gamma: f64,
                nx: usize,
                rank: usize,
                boundary: Boundary)
                -> (Array1<f64>, Array1<f64>, Array1<f64>) {
    let n = nx.pow(rank as u32);
    let (ab, bb, cb) = boundary.coefficients();
    let pick = |interior: f64, edge: f64| {
        Array1::from_shape_fn(n, |p| if is_boundary(p, nx, rank) {
            edge
        } else {
            interior
        })
    };
    (pick(2., ab), pick(-1., bb), pick(gamma * gamma, cb))
}

/// Assembles the operators of the scheme for Courant number `gamma` on a grid with `nx`
/// points per axis.
pub fn build(gamma: f64, nx: usize, dimension: Dimension, boundary: Boundary) -> Result<Operators> {
    if nx < 3 {
        return Err(Error::GridTooSmall { nx });
    }
    let rank = dimension.rank();

    let mut l = tensor_sum(&band(gamma, nx, boundary), rank);
    if boundary == Boundary::Dirichlet {
        l.clear_rows(|p| is_boundary(p, nx, rank));
    }
    let (a, b, c) = coefficients(gamma, nx, rank, boundary);

    debug!(gamma, nx, rank, nnz = l.nnz(), ?boundary, "assembled leap-frog operators");

    Ok(Operators {
        a: CsrMatrix::from_diag(a.view()),
        b: CsrMatrix::from_diag(b.view()),
        c: CsrMatrix::from_diag(c.view()),
        l,
    })
}

/// `build` with the absorbing boundary and the dimension given as a number.
pub fn get_matrices(gamma: f64, nx: usize, n: usize) -> Result<Operators> {
    build(gamma, nx, Dimension::try_from(n)?, Boundary::Absorbing)
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::{Array, Array2};
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;

    fn assert_close(a: &Array2<f64>, b: &Array2<f64>) {
        let d = a - b;
        let err = (&d * &d).sum();
        if err > 1e-20 {
            println!("{}\n", a);
            println!("{}\n", b);
            panic!("Error too big: {}", err);
        }
    }

    #[test]
    fn diagonal_coefficients_1d() {
        let gamma = 0.4;
        let nx = 6;
        let ops = get_matrices(gamma, nx, 1).unwrap();

        for (m, interior, edge) in [(&ops.a, 2., 1.), (&ops.b, -1., 0.), (&ops.c, gamma * gamma, 0.)] {
            assert_eq!(m.shape(), (nx, nx));
            assert_eq!(m.nnz(), nx);
            assert!(m.triplets().all(|(i, j, _)| i == j));

            let d = m.diagonal();
            assert_eq!(d[0], edge);
            assert_eq!(d[nx - 1], edge);
            assert!(d.slice(ndarray::s![1..nx - 1]).iter().all(|&x| x == interior));
            assert_eq!(d.iter().filter(|&&x| x != interior).count(), 2);
        }
    }

    #[test]
    fn laplacian_1d() {
        let gamma = 0.5;
        let g2 = gamma * gamma;
        let ops = get_matrices(gamma, 4, 1).unwrap();
        let expected = ndarray::arr2(&[[-gamma, gamma, 0., 0.],
                                       [g2, -2. * g2, g2, 0.],
                                       [0., g2, -2. * g2, g2],
                                       [0., 0., gamma, -gamma]]);
        assert_close(&ops.l.to_dense(), &expected);
    }

    #[test]
    fn laplacian_2d_is_kronecker_sum() {
        let gamma = 0.7;
        let g2 = gamma * gamma;
        let nx = 4;
        let ops = get_matrices(gamma, nx, 2).unwrap();
        assert_eq!(ops.l.shape(), (16, 16));

        let t = ndarray::arr2(&[[-gamma, gamma, 0., 0.],
                                [g2, -2. * g2, g2, 0.],
                                [0., g2, -2. * g2, g2],
                                [0., 0., gamma, -gamma]]);
        let mut expected = Array2::zeros((16, 16));
        for r in 0..nx {
            for c in 0..nx {
                for s in 0..nx {
                    // coupling along the slow axis, then along the fast axis
                    expected[(r * nx + c, s * nx + c)] += t[(r, s)];
                    expected[(r * nx + c, r * nx + s)] += t[(c, s)];
                }
            }
        }
        let l = ops.l.to_dense();
        assert_close(&l, &expected);

        // interior point (1, 1) carries the 5-point stencil
        assert!((l[(5, 5)] + 4. * g2).abs() < 1e-15);
        for &nb in &[1, 4, 6, 9] {
            assert!((l[(5, nb)] - g2).abs() < 1e-15);
        }
        // corner point (0, 0) carries the one-sided stencil along both axes
        assert!((l[(0, 0)] + 2. * gamma).abs() < 1e-15);
        assert!((l[(0, 1)] - gamma).abs() < 1e-15);
        assert!((l[(0, 4)] - gamma).abs() < 1e-15);
    }

    #[test]
    fn diagonal_coefficients_2d() {
        let ops = get_matrices(0.5, 4, 2).unwrap();
        let a = ops.a.diagonal();
        let b = ops.b.diagonal();
        for p in 0..16 {
            let interior = [5, 6, 9, 10].contains(&p);
            assert_eq!(a[p], if interior { 2. } else { 1. });
            assert_eq!(b[p], if interior { -1. } else { 0. });
        }
    }

    #[test]
    fn tensor_sum_in_three_dimensions() {
        let gamma = 0.3;
        let g2 = gamma * gamma;
        let l = tensor_sum(&band(gamma, 3, Boundary::Absorbing), 3);
        assert_eq!(l.shape(), (27, 27));
        // center of the 3x3x3 cube
        let row: Vec<_> = l.row(13).collect();
        assert_eq!(row.len(), 7);
        for (j, v) in row {
            let expected = if j == 13 { -6. * g2 } else { g2 };
            assert!((v - expected).abs() < 1e-15);
        }
    }

    #[test]
    fn dirichlet_holds_boundary_rows_at_zero() {
        let nx = 5;
        let ops = build(0.5, nx, Dimension::Two, Boundary::Dirichlet).unwrap();
        let l = ops.l.to_dense();
        let a = ops.a.diagonal();
        for p in 0..nx * nx {
            if is_boundary(p, nx, 2) {
                assert!(l.row(p).iter().all(|&x| x == 0.));
                assert_eq!(a[p], 0.);
            } else {
                assert_eq!(a[p], 2.);
            }
        }
    }

    #[test]
    #[should_panic]
    fn band_needs_two_points() {
        band(0.5, 1, Boundary::Absorbing);
    }

    #[test]
    fn invalid_input() {
        assert!(matches!(get_matrices(0.5, 4, 3), Err(Error::InvalidDimension(3))));
        assert!(matches!(get_matrices(0.5, 4, 0), Err(Error::InvalidDimension(0))));
        assert!(matches!(get_matrices(0.5, 2, 1), Err(Error::GridTooSmall { nx: 2 })));
    }

    #[test]
    fn step_matches_reference_1d() {
        let nx = 12;
        let gamma = 0.8;
        let dx2 = 0.01;
        let ops = get_matrices(gamma, nx, 1).unwrap();
        let u = Array::random(nx, Uniform::new(0., 1.));
        let v = Array::random(nx, Uniform::new(0., 1.));
        let q = Array::random(nx, Uniform::new(0., 1.));
        let mut w = Array1::zeros(nx);
        ops.step(u.view(), v.view(), q.view(), dx2, w.view_mut());

        let g2 = gamma * gamma;
        for i in 0..nx {
            let w_ref = if i == 0 {
                v[0] + gamma * (v[1] - v[0])
            } else if i == nx - 1 {
                v[i] + gamma * (v[i - 1] - v[i])
            } else {
                2. * v[i] - u[i] + g2 * (v[i - 1] + v[i + 1] - 2. * v[i]) + dx2 * g2 * q[i]
            };
            assert!((w[i] - w_ref).abs() < 1e-12, "{} vs {} at {}", w[i], w_ref, i);
        }
    }

    #[test]
    fn step_matches_reference_2d() {
        let nx = 9;
        let gamma = 0.6;
        let dx2 = 0.04;
        let ops = get_matrices(gamma, nx, 2).unwrap();
        let dim = (nx, nx);
        let u = Array::random(dim, Uniform::new(0., 1.));
        let v = Array::random(dim, Uniform::new(0., 1.));
        let q = Array::random(dim, Uniform::new(0., 1.));
        let mut w = Array2::zeros(dim);
        ops.step(u.view().into_shape(nx * nx).unwrap(),
                 v.view().into_shape(nx * nx).unwrap(),
                 q.view().into_shape(nx * nx).unwrap(),
                 dx2,
                 w.view_mut().into_shape(nx * nx).unwrap());

        let mu = gamma * gamma;
        for j in 1..nx - 1 {
            for i in 1..nx - 1 {
                let vc = v[(j, i)];
                let neighbors = v[(j, i - 1)] + v[(j, i + 1)] + v[(j - 1, i)] + v[(j + 1, i)];
                let w_ref = 2. * vc - u[(j, i)] + mu * (neighbors - 4. * vc) +
                            dx2 * mu * q[(j, i)];
                assert!((w[(j, i)] - w_ref).abs() < 1e-12);
            }
        }
    }
}
