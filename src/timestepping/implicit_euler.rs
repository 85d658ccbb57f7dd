//! Backward Euler stepping of the transport problem
//!
//! At each step t_n → t_{n+1} the problem assembles
//! (M/Δt + K) T_{n+1} = M/Δt T_n + f and the adaptive selector solves it.
//! Backward Euler is unconditionally stable, so the step size is set by
//! accuracy alone.

use tracing::debug;

use super::problem::TransportProblem;
use crate::error::{Error, Result, SolveError};
use crate::linalg::{AdaptiveSolver, SolverPath, SolverStats};

/// Outcome of one transport step
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// 1-based step index
    pub step: usize,
    /// Time at the end of the step (s)
    pub time: f64,
    pub dt: f64,
    pub path: SolverPath,
    pub stats: SolverStats,
}

/// Backward Euler integrator holding the current transport state
pub struct ImplicitEuler {
    time: f64,
    /// Step size used by [`ImplicitEuler::step`]
    dt: f64,
    steps_taken: usize,
    state: Vec<f64>,
}

impl ImplicitEuler {
    /// Integrator at t = 0 with the given initial state
    pub fn new(initial_state: Vec<f64>, dt: f64) -> Result<Self> {
        Self::starting_at(0.0, initial_state, dt)
    }

    pub fn starting_at(start_time: f64, initial_state: Vec<f64>, dt: f64) -> Result<Self> {
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(Error::config(format!("time step must be positive, got {}", dt)));
        }
        if initial_state.is_empty() {
            return Err(Error::config("transport state must not be empty"));
        }
        Ok(Self { time: start_time, dt, steps_taken: 0, state: initial_state })
    }

    /// Current simulation time
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    pub fn state(&self) -> &[f64] {
        &self.state
    }

    pub fn into_state(self) -> Vec<f64> {
        self.state
    }

    /// Take one step of the nominal size: assemble at t + dt, solve, replace the state
    ///
    /// On failure the state and time are left at t_n.
    pub fn step<T>(&mut self, problem: &mut T, solver: &mut AdaptiveSolver) -> Result<StepRecord>
    where
        T: TransportProblem + ?Sized,
    {
        self.step_to(self.time + self.dt, problem, solver)
    }

    /// Take one step ending exactly at `time`
    ///
    /// The step size is `time - t_n`, which must be positive.
    pub fn step_to<T>(&mut self, time: f64, problem: &mut T, solver: &mut AdaptiveSolver) -> Result<StepRecord>
    where
        T: TransportProblem + ?Sized,
    {
        let step = self.steps_taken + 1;
        let dt = time - self.time;
        if !(dt > 0.0) || !dt.is_finite() {
            return Err(Error::config(format!(
                "step {} must end after t = {}, got {}",
                step, self.time, time
            )));
        }
        let stage = || format!("transport step {}", step);

        let system = problem.assemble_step(&self.state, time, dt)?;
        let n = system
            .check()
            .map_err(|source| Error::Solve { stage: stage(), source })?;
        if n != self.state.len() {
            return Err(Error::Solve {
                stage: stage(),
                source: SolveError::DimensionMismatch {
                    rows: system.matrix.rows(),
                    cols: system.matrix.cols(),
                    rhs: self.state.len(),
                },
            });
        }

        let solved = solver
            .solve_system(&system.matrix, &system.rhs)
            .map_err(|source| Error::Solve { stage: stage(), source })?;

        self.state = solved.solution;
        self.time = time;
        self.steps_taken = step;
        debug!(step, time, path = %solved.path, iterations = solved.stats.iterations, "transport step done");

        Ok(StepRecord { step, time, dt, path: solved.path, stats: solved.stats })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestepping::problem::LinearSystem;
    use approx::assert_relative_eq;
    use sprs::TriMat;

    /// du/dt = -k u on independent cells
    struct Decay {
        rate: f64,
        cells: usize,
    }

    impl TransportProblem for Decay {
        fn couple(&mut self, _pressure: &[f64]) -> Result<()> {
            Ok(())
        }

        fn initial_state(&self) -> Vec<f64> {
            vec![1.0; self.cells]
        }

        fn assemble_step(&mut self, previous: &[f64], _time: f64, dt: f64) -> Result<LinearSystem> {
            let mut triplets = TriMat::new((self.cells, self.cells));
            for i in 0..self.cells {
                triplets.add_triplet(i, i, 1.0 / dt + self.rate);
            }
            let rhs = previous.iter().map(|u| u / dt).collect();
            Ok(LinearSystem::new(triplets.to_csr(), rhs))
        }
    }

    #[test]
    fn test_backward_euler_decay() {
        let mut problem = Decay { rate: 0.5, cells: 3 };
        let mut solver = AdaptiveSolver::default();
        let mut integrator = ImplicitEuler::new(problem.initial_state(), 0.1).unwrap();

        for _ in 0..4 {
            integrator.step(&mut problem, &mut solver).unwrap();
        }

        let expected = (1.0_f64 / (1.0 + 0.5 * 0.1)).powi(4);
        assert_eq!(integrator.steps_taken(), 4);
        assert_relative_eq!(integrator.time(), 0.4, epsilon = 1e-12);
        for &u in integrator.state() {
            assert_relative_eq!(u, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_step_record() {
        let mut problem = Decay { rate: 1.0, cells: 2 };
        let mut solver = AdaptiveSolver::default();
        let mut integrator = ImplicitEuler::starting_at(10.0, problem.initial_state(), 2.0).unwrap();

        let record = integrator.step(&mut problem, &mut solver).unwrap();
        assert_eq!(record.step, 1);
        assert_relative_eq!(record.time, 12.0);
        assert_relative_eq!(record.dt, 2.0);
        assert_eq!(record.path, SolverPath::Direct);
        assert!(record.stats.converged);
    }

    #[test]
    fn test_step_to_lands_on_target() {
        let mut problem = Decay { rate: 0.5, cells: 1 };
        let mut solver = AdaptiveSolver::default();
        let mut integrator = ImplicitEuler::new(problem.initial_state(), 0.1).unwrap();

        // Ten steps of 0.1 accumulate to 0.9999999999999999
        let mut time = 0.0;
        for _ in 0..10 {
            time += 0.1;
        }
        assert_ne!(time, 1.0);

        for k in 1..=10 {
            let target = if k == 10 { 1.0 } else { k as f64 / 10.0 };
            let record = integrator.step_to(target, &mut problem, &mut solver).unwrap();
            assert_eq!(record.time, target);
        }
        assert_eq!(integrator.time(), 1.0);
        assert_eq!(integrator.steps_taken(), 10);

        let record = integrator.step(&mut problem, &mut solver).unwrap();
        assert_eq!(record.step, 11);
        assert_relative_eq!(record.time, 1.1, epsilon = 1e-12);
    }

    #[test]
    fn test_step_to_must_advance() {
        let mut problem = Decay { rate: 1.0, cells: 1 };
        let mut solver = AdaptiveSolver::default();
        let mut integrator = ImplicitEuler::starting_at(5.0, problem.initial_state(), 1.0).unwrap();

        assert!(matches!(
            integrator.step_to(5.0, &mut problem, &mut solver),
            Err(Error::Config { .. })
        ));
        assert!(integrator.step_to(4.0, &mut problem, &mut solver).is_err());
        assert_eq!(integrator.steps_taken(), 0);
        assert_eq!(integrator.time(), 5.0);
    }

    #[test]
    fn test_size_change_rejected() {
        let mut problem = Decay { rate: 1.0, cells: 3 };
        let mut solver = AdaptiveSolver::default();
        let mut integrator = ImplicitEuler::new(vec![1.0; 2], 1.0).unwrap();

        let err = integrator.step(&mut problem, &mut solver).unwrap_err();
        assert!(matches!(
            err,
            Error::Solve { source: SolveError::DimensionMismatch { .. }, .. }
        ));
        assert_eq!(integrator.steps_taken(), 0);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(ImplicitEuler::new(vec![1.0], 0.0).is_err());
        assert!(ImplicitEuler::new(Vec::new(), 1.0).is_err());
    }
}
