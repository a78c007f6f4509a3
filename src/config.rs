//! Discretization parameters shared by `solve` and `multiply`.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::operator::Boundary;

/// Number of spatial axes of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum Dimension {
    #[default]
    One,
    Two,
}

impl Dimension {
    pub fn rank(self) -> usize {
        match self {
            Dimension::One => 1,
            Dimension::Two => 2,
        }
    }

    /// Number of grid points when every axis has `nx` points.
    pub fn grid_size(self, nx: usize) -> usize {
        nx.pow(self.rank() as u32)
    }
}

impl TryFrom<usize> for Dimension {
    type Error = Error;

    fn try_from(n: usize) -> Result<Self> {
        match n {
            1 => Ok(Dimension::One),
            2 => Ok(Dimension::Two),
            _ => Err(Error::InvalidDimension(n)),
        }
    }
}

impl From<Dimension> for usize {
    fn from(dim: Dimension) -> usize {
        dim.rank()
    }
}

/// What to do with input that does not fit the grid.
///
/// `Strict` rejects it with an error. `Lenient` keeps going the way the scheme always has:
/// fields are truncated or zero-padded to the expected size, and sample points off the
/// grid get an empty interpolation row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    #[default]
    Strict,
    Lenient,
}

fn one() -> f64 {
    1.
}

/// Parameters of the Leap-Frog discretization.
///
/// - `wave_speed`: `c`
/// - `dt`, `dx`: time and space steps
/// - `horizon`: final time `T`, the time axis has `T / dt + 1` samples
/// - `half_length`: the domain has size `2 L`, each axis has `2 L / dx + 2` points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveParams {
    pub wave_speed: f64,
    pub dt: f64,
    pub dx: f64,
    #[serde(default = "one")]
    pub horizon: f64,
    #[serde(default = "one")]
    pub half_length: f64,
    #[serde(default)]
    pub dimension: Dimension,
    #[serde(default)]
    pub boundary: Boundary,
    #[serde(default)]
    pub policy: Policy,
}

impl WaveParams {
    /// 1-D problem on `[-1, 1]` up to time `1`, absorbing boundary, strict input checks.
    pub fn new(wave_speed: f64, dt: f64, dx: f64) -> Self {
        WaveParams {
            wave_speed,
            dt,
            dx,
            horizon: 1.,
            half_length: 1.,
            dimension: Dimension::One,
            boundary: Boundary::Absorbing,
            policy: Policy::Strict,
        }
    }

    pub fn with_horizon(mut self, horizon: f64) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_half_length(mut self, half_length: f64) -> Self {
        self.half_length = half_length;
        self
    }

    pub fn with_dimension(mut self, dimension: Dimension) -> Self {
        self.dimension = dimension;
        self
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Reads parameters from JSON and validates them.
    ///
    /// Only `wave_speed`, `dt` and `dx` are required, everything else falls back to the
    /// defaults of `WaveParams::new`.
    pub fn from_json<R: Read>(reader: R) -> Result<Self> {
        let params: WaveParams = serde_json::from_reader(reader)?;
        params.validate()?;
        Ok(params)
    }

    /// Courant number `c dt / dx`.
    pub fn gamma(&self) -> f64 {
        self.wave_speed * self.dt / self.dx
    }

    /// Grid points per axis.
    pub fn nx(&self) -> usize {
        (2. * self.half_length / self.dx + 2.) as usize
    }

    /// Number of time samples.
    pub fn nt(&self) -> usize {
        (self.horizon / self.dt + 1.) as usize
    }

    /// Total number of grid points.
    pub fn grid_size(&self) -> usize {
        self.dimension.grid_size(self.nx())
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [("dt", self.dt), ("dx", self.dx), ("half_length", self.half_length)];
        for &(name, value) in &positive {
            if !(value.is_finite() && value > 0.) {
                return Err(Error::InvalidParameter { name, value });
            }
        }
        if !(self.horizon.is_finite() && self.horizon >= 0.) {
            return Err(Error::InvalidParameter {
                name: "horizon",
                value: self.horizon,
            });
        }
        if !self.wave_speed.is_finite() {
            return Err(Error::InvalidParameter {
                name: "wave_speed",
                value: self.wave_speed,
            });
        }
        let nx = self.nx();
        if nx < 3 {
            return Err(Error::GridTooSmall { nx });
        }
        Ok(())
    }
}
