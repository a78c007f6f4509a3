//! Sampling of grid fields at scattered points by (bi)linear interpolation.

use tracing::trace;

use crate::config::Policy;
use crate::error::{Error, Result};
use crate::sparse::CsrMatrix;

/// Index of the grid cell containing `x`, the `i` with `xin[i] <= x < xin[i + 1]`.
///
/// Points before the grid map to cell 0, points at or past the last grid point to
/// `xin.len() - 1`.
#[inline]
fn bracket(xin: &[f64], x: f64) -> usize {
    xin.partition_point(|&g| g <= x).saturating_sub(1)
}

/// Linear interpolation weights of `xin[i]` and `xin[i + 1]` at `x`.
#[inline]
fn weights(xin: &[f64], i: usize, x: f64) -> (f64, f64) {
    let (x0, x1) = (xin[i], xin[i + 1]);
    ((x - x1) / (x0 - x1), (x - x0) / (x1 - x0))
}

/// Builds the interpolation matrix from a grid to scattered points.
///
/// - `xin`: ascending grid coordinates, shared by both axes in 2-D
/// - `xout1`: first coordinate of the query points
/// - `xout2`: second coordinate of the query points, `None` for 1-D sampling
///
/// The result has one row per query point and `xin.len()` columns in 1-D, `xin.len()²` in
/// 2-D, where grid point `(i, j)` is column `i + nx j`. Applied to a field it returns the
/// field at the query points, see `CsrMatrix::dot_dense` for all time steps at once.
///
/// Queries outside `[xin[0], xin[nx - 1])` are rejected under `Policy::Strict`. Under
/// `Policy::Lenient` points at or past the last grid point get an empty row and points
/// before the first one are extrapolated from the first cell.
pub fn sample(xin: &[f64],
              xout1: &[f64],
              xout2: Option<&[f64]>,
              policy: Policy)
              -> Result<CsrMatrix> {
    let nx = xin.len();
    if policy == Policy::Strict && (nx < 2 || xin.windows(2).any(|w| !(w[0] < w[1]))) {
        return Err(Error::UnsortedGrid);
    }

    let locate = |index: usize, x: f64| -> Result<Option<usize>> {
        let inside = nx >= 2 && x >= xin[0] && x < xin[nx - 1];
        if !inside && policy == Policy::Strict {
            return Err(Error::OutOfRangeQuery { index, value: x });
        }
        let i = bracket(xin, x);
        if i + 1 < nx {
            Ok(Some(i))
        } else {
            trace!(index, x, "query past the end of the grid, row left empty");
            Ok(None)
        }
    };

    let m = xout1.len();
    let mut triplets = Vec::new();
    match xout2 {
        None => {
            for (k, &x) in xout1.iter().enumerate() {
                if let Some(i) = locate(k, x)? {
                    let (a, b) = weights(xin, i, x);
                    triplets.push((k, i, a));
                    triplets.push((k, i + 1, b));
                }
            }
            Ok(CsrMatrix::from_triplets((m, nx), &triplets))
        }
        Some(xout2) => {
            if xout2.len() != m {
                return Err(Error::ShapeMismatch {
                    expected: m,
                    found: xout2.len(),
                });
            }
            for (k, (&x, &y)) in xout1.iter().zip(xout2).enumerate() {
                let (i, j) = match (locate(k, x)?, locate(k, y)?) {
                    (Some(i), Some(j)) => (i, j),
                    _ => continue,
                };
                let (ax, bx) = weights(xin, i, x);
                let (ay, by) = weights(xin, j, y);
                triplets.push((k, i + nx * j, ax * ay));
                triplets.push((k, i + 1 + nx * j, bx * ay));
                triplets.push((k, i + nx * (j + 1), ax * by));
                triplets.push((k, i + 1 + nx * (j + 1), bx * by));
            }
            Ok(CsrMatrix::from_triplets((m, nx * nx), &triplets))
        }
    }
}
