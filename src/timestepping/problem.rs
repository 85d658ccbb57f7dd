//! Seams through which a discretization library hands over linear systems

use sprs::CsMat;

use crate::error::{Result, SolveError};
use crate::linalg::SolverUtils;

/// Assembled sparse system A x = b
#[derive(Debug, Clone)]
pub struct LinearSystem {
    pub matrix: CsMat<f64>,
    pub rhs: Vec<f64>,
}

impl LinearSystem {
    pub fn new(matrix: CsMat<f64>, rhs: Vec<f64>) -> Self {
        Self { matrix, rhs }
    }

    pub fn size(&self) -> usize {
        self.rhs.len()
    }

    /// Square matrix matching the right-hand side
    pub fn check(&self) -> std::result::Result<usize, SolveError> {
        SolverUtils::check_dimensions(&self.matrix, &self.rhs)
    }
}

/// Elliptic pressure problem, solved once
pub trait PressureProblem {
    fn assemble_pressure(&mut self) -> Result<LinearSystem>;
}

/// Parabolic transport problem advanced with backward Euler
pub trait TransportProblem {
    /// Receive the pressure field, e.g. to compute Darcy fluxes for advection
    fn couple(&mut self, pressure: &[f64]) -> Result<()>;

    /// State at t = 0
    fn initial_state(&self) -> Vec<f64>;

    /// System for the state at `time`, given the state at `time - dt`
    fn assemble_step(&mut self, previous: &[f64], time: f64, dt: f64) -> Result<LinearSystem>;
}
