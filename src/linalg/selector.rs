//! Size-based choice between a direct and an iterative solve
//!
//! Direct factorization is exact but its fill-in makes it memory-bound on
//! large 3D fractured-domain systems. Above the threshold the selector
//! switches to GMRES preconditioned with ILU(0) of the same matrix.

use std::fmt;

use sprs::CsMat;
use tracing::{debug, warn};

use super::direct::DirectSolver;
use super::iterative::Gmres;
use super::monitor::{IterationMonitor, TracingMonitor};
use super::preconditioner::IluPreconditioner;
use super::solver::{Solver, SolverStats, SolverUtils};
use crate::config::SolverConfig;
use crate::error::SolveError;

/// Which branch the selector took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverPath {
    /// Sparse LU
    Direct,
    /// GMRES + ILU(0)
    Iterative,
}

impl SolverPath {
    /// `n < threshold` is direct; `n == threshold` is iterative
    pub fn for_size(n: usize, threshold: usize) -> Self {
        if n < threshold {
            SolverPath::Direct
        } else {
            SolverPath::Iterative
        }
    }
}

impl fmt::Display for SolverPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverPath::Direct => write!(f, "direct"),
            SolverPath::Iterative => write!(f, "gmres+ilu"),
        }
    }
}

/// Result of one adaptive solve
#[derive(Debug, Clone)]
pub struct SelectedSolve {
    pub solution: Vec<f64>,
    pub stats: SolverStats,
    pub path: SolverPath,
}

/// Picks sparse LU or GMRES + ILU(0) per system from its size
///
/// Iterative non-convergence is returned as [`SolveError::NotConverged`];
/// there is no fallback to the direct path.
pub struct AdaptiveSolver {
    config: SolverConfig,
    direct: DirectSolver,
    gmres: Gmres,
    last_path: Option<SolverPath>,
}

impl AdaptiveSolver {
    pub fn new(config: SolverConfig) -> Self {
        let gmres = Gmres::new()
            .with_max_iterations(config.gmres_max_iterations)
            .with_restart(config.gmres_restart)
            .with_tolerance(config.gmres_tolerance);
        Self {
            config,
            direct: DirectSolver::new(),
            gmres,
            last_path: None,
        }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Branch that a system with `n` unknowns will take
    pub fn select(&self, n: usize) -> SolverPath {
        SolverPath::for_size(n, self.config.direct_threshold)
    }

    /// Branch taken by the most recent solve, if any
    pub fn last_path(&self) -> Option<SolverPath> {
        self.last_path
    }

    /// Solve A x = b, reporting GMRES progress to `monitor`
    pub fn solve_with_monitor<M>(
        &mut self,
        a: &CsMat<f64>,
        b: &[f64],
        monitor: &mut M,
    ) -> Result<SelectedSolve, SolveError>
    where
        M: IterationMonitor + ?Sized,
    {
        let n = SolverUtils::check_dimensions(a, b)?;
        let path = self.select(n);
        self.last_path = Some(path);
        debug!(n, nnz = a.nnz(), %path, "selected linear solver");

        let result = match path {
            SolverPath::Direct => self.direct.solve(a, b),
            SolverPath::Iterative => IluPreconditioner::new(a)
                .and_then(|precond| self.gmres.solve_preconditioned(a, b, &precond, monitor)),
        };

        match result {
            Ok((solution, stats)) => {
                debug!(
                    %path,
                    iterations = stats.iterations,
                    relative_residual = stats.relative_residual,
                    solve_time = stats.solve_time,
                    "linear solve finished"
                );
                Ok(SelectedSolve { solution, stats, path })
            }
            Err(err) => {
                warn!(%path, n, "linear solve failed: {}", err);
                Err(err)
            }
        }
    }

    /// Solve A x = b, logging GMRES progress through `tracing`
    pub fn solve_system(&mut self, a: &CsMat<f64>, b: &[f64]) -> Result<SelectedSolve, SolveError> {
        let mut monitor = TracingMonitor::new().with_report_every(self.config.gmres_report_every);
        self.solve_with_monitor(a, b, &mut monitor)
    }
}

impl Default for AdaptiveSolver {
    fn default() -> Self {
        Self::new(SolverConfig::default())
    }
}

impl Solver for AdaptiveSolver {
    fn solve(&mut self, a: &CsMat<f64>, b: &[f64]) -> Result<(Vec<f64>, SolverStats), SolveError> {
        self.solve_system(a, b).map(|s| (s.solution, s.stats))
    }

    fn name(&self) -> &str {
        match self.last_path {
            Some(SolverPath::Direct) => self.direct.name(),
            Some(SolverPath::Iterative) => self.gmres.name(),
            None => "Adaptive (direct | GMRES + ILU(0))",
        }
    }
}
