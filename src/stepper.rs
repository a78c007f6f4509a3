//! Leap-Frog time stepping for the wave equation and its inverse.

use ndarray::{Array1, Array2, ArrayView2, Axis, Zip};
use tracing::{debug, warn};

use crate::config::{Policy, WaveParams};
use crate::error::{Error, Result};
use crate::operator::build;

/// Reads `field` in row-major order as an array of the given shape.
///
/// A field with the wrong number of elements is an error under `Policy::Strict`, and is
/// truncated or padded with zeros under `Policy::Lenient`.
fn fit(field: ArrayView2<f64>,
       shape: (usize, usize),
       policy: Policy,
       what: &'static str)
       -> Result<Array2<f64>> {
    let expected = shape.0 * shape.1;
    let found = field.len();
    if found != expected {
        match policy {
            Policy::Strict => return Err(Error::ShapeMismatch { expected, found }),
            Policy::Lenient => {
                warn!(found, expected, "resizing {} field", what);
            }
        }
    }
    let mut data: Vec<f64> = field.iter().cloned().collect();
    data.resize(expected, 0.);
    Array2::from_shape_vec(shape, data).map_err(|_| Error::ShapeMismatch { expected, found })
}

/// Solves the wave equation `u_tt = c² (Δu + q)` with the Leap-Frog scheme.
///
/// `q` is read as an array of shape `(grid size, nt)`, column `k` being the source at
/// time step `k`. Returns the displacement in the same layout. The first two time steps
/// are zero, there is no initial condition other than rest.
///
/// The scheme is stable only for Courant numbers `c dt / dx` up to 1 (up to `1/√2` in 2-D).
/// This is not enforced.
pub fn solve(q: ArrayView2<f64>, params: &WaveParams) -> Result<Array2<f64>> {
    params.validate()?;
    let (nx, nt) = (params.nx(), params.nt());
    let n = params.grid_size();
    let gamma = params.gamma();
    if gamma.abs() > 1. {
        warn!(gamma, "Courant number above 1, the solution will blow up");
    }

    let q = fit(q, (n, nt), params.policy, "source")?;
    let ops = build(gamma, nx, params.dimension, params.boundary)?;
    let dx2 = params.dx * params.dx;
    debug!(nx, nt, gamma, "running leap-frog");

    let mut u = Array2::zeros((n, nt));
    for k in 1..nt.saturating_sub(1) {
        let (past, mut future) = u.view_mut().split_at(Axis(1), k + 1);
        ops.step(past.column(k - 1),
                 past.column(k),
                 q.column(k),
                 dx2,
                 future.column_mut(0));
    }
    Ok(u)
}

/// Recovers the source from a displacement field, inverting `solve`.
///
/// For every time step `k` in `1..nt - 1` and every point where the source enters the
/// scheme,
///
/// ```text
/// q[k] = (u[k + 1] - A u[k] - L u[k] - B u[k - 1]) / (dx² C)
/// ```
///
/// which at interior points is `(u[k + 1] - 2 u[k] + u[k - 1] - L u[k]) / (c dt)²`.
/// Boundary points and the first and last time step are left at zero.
pub fn multiply(u: ArrayView2<f64>, params: &WaveParams) -> Result<Array2<f64>> {
    params.validate()?;
    let gamma = params.gamma();
    if gamma == 0. {
        return Err(Error::ZeroCourant);
    }
    let (nx, nt) = (params.nx(), params.nt());
    let n = params.grid_size();

    let u = fit(u, (n, nt), params.policy, "displacement")?;
    let ops = build(gamma, nx, params.dimension, params.boundary)?;
    let dx2 = params.dx * params.dx;
    let c = ops.c.diagonal();
    debug!(nx, nt, gamma, "recovering source");

    let mut q = Array2::zeros((n, nt));
    let mut residual = Array1::zeros(n);
    for k in 1..nt.saturating_sub(1) {
        residual.assign(&u.column(k + 1));
        let mut r = residual.view_mut();
        ops.a.mul_add(-1., u.column(k), &mut r);
        ops.l.mul_add(-1., u.column(k), &mut r);
        ops.b.mul_add(-1., u.column(k - 1), &mut r);

        Zip::from(q.column_mut(k))
            .and(&residual)
            .and(&c)
            .for_each(|qp, &rp, &cp| if cp != 0. {
                *qp = rp / (dx2 * cp);
            });
    }
    Ok(q)
}
