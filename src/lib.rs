//! Leap-Frog finite difference scheme for the scalar wave equation in one or two
//! dimensions, with absorbing or Dirichlet boundary data.
//!
//! The scheme advances `u_tt = c² (Δu + q)` by
//!
//! ```text
//! u[k + 1] = A u[k] + L u[k] + B u[k - 1] + dx² C q[k]
//! ```
//!
//! where the operators come from `operator::build`. Fields are stored as arrays of shape
//! `(grid size, nt)`, one column per time step, 2-D grids flattened row-major.
//!
//! `sample` builds the sparse interpolation matrix that reads a field at scattered points,
//! e.g. to record traces at receivers.

pub mod config;
pub mod error;
pub mod operator;
pub mod sample;
pub mod sparse;
pub mod stepper;

pub use config::{Dimension, Policy, WaveParams};
pub use error::{Error, Result};
pub use operator::{build, get_matrices, Boundary, Operators};
pub use sample::sample;
pub use sparse::CsrMatrix;
pub use stepper::{multiply, solve};
