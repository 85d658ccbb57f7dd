//! Weakly coupled flow and transport
//!
//! The pressure field is solved once and handed to the transport problem,
//! which is then advanced over the whole schedule without feeding back.

use std::time::Instant;

use tracing::{debug, info};

use super::implicit_euler::{ImplicitEuler, StepRecord};
use super::problem::{PressureProblem, TransportProblem};
use super::schedule::TimeSchedule;
use crate::config::{SimulationConfig, SolverConfig};
use crate::error::{Error, Result};
use crate::linalg::{AdaptiveSolver, SolverPath, SolverStats};
use crate::utils::units::seconds_to_years;

/// Receives every computed field as the run progresses
///
/// This is where results are exported. Both methods default to doing nothing.
pub trait SimulationObserver {
    fn pressure_solved(&mut self, _pressure: &[f64], _path: SolverPath, _stats: &SolverStats) {}

    fn transport_step(&mut self, _record: &StepRecord, _state: &[f64]) {}
}

/// Ignores everything
impl SimulationObserver for () {}

/// Logs each solve at INFO
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SimulationObserver for TracingObserver {
    fn pressure_solved(&mut self, pressure: &[f64], path: SolverPath, stats: &SolverStats) {
        let (min, max) = min_max(pressure);
        info!(
            unknowns = pressure.len(),
            %path,
            iterations = stats.iterations,
            relative_residual = stats.relative_residual,
            min,
            max,
            "pressure solved"
        );
    }

    fn transport_step(&mut self, record: &StepRecord, state: &[f64]) {
        let (min, max) = min_max(state);
        info!(
            step = record.step,
            years = seconds_to_years(record.time),
            path = %record.path,
            iterations = record.stats.iterations,
            min,
            max,
            "transport step"
        );
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub pressure: Vec<f64>,
    pub pressure_path: SolverPath,
    pub pressure_stats: SolverStats,
    /// Transport state at the end time
    pub state: Vec<f64>,
    pub steps: Vec<StepRecord>,
    /// Wall-clock seconds
    pub elapsed: f64,
}

impl SimulationReport {
    pub fn final_time(&self) -> f64 {
        self.steps.last().map_or(0.0, |s| s.time)
    }

    /// GMRES iterations over all solves
    pub fn total_iterations(&self) -> usize {
        self.pressure_stats.iterations + self.steps.iter().map(|s| s.stats.iterations).sum::<usize>()
    }

    pub fn iterative_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.path == SolverPath::Iterative).count()
    }
}

/// One pressure solve followed by the transport time loop
pub struct WeaklyCoupledSimulation {
    schedule: TimeSchedule,
    solver: AdaptiveSolver,
}

impl WeaklyCoupledSimulation {
    pub fn new(schedule: TimeSchedule, solver: SolverConfig) -> Self {
        Self { schedule, solver: AdaptiveSolver::new(solver) }
    }

    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let schedule = TimeSchedule::from_config(&config.time_stepping)?;
        Ok(Self::new(schedule, config.solver.clone()))
    }

    pub fn schedule(&self) -> &TimeSchedule {
        &self.schedule
    }

    /// Run to the end of the schedule
    ///
    /// The first failing solve stops the run. Its [`Error::Solve`] names the
    /// stage: `pressure` or `transport step k`.
    pub fn run<P, T, O>(&mut self, pressure: &mut P, transport: &mut T, observer: &mut O) -> Result<SimulationReport>
    where
        P: PressureProblem + ?Sized,
        T: TransportProblem + ?Sized,
        O: SimulationObserver + ?Sized,
    {
        let start = Instant::now();
        info!(
            steps = self.schedule.num_steps(),
            end_time_years = self.schedule.end_time_years(),
            "starting weakly coupled run"
        );

        let system = pressure.assemble_pressure()?;
        let solved = self
            .solver
            .solve_system(&system.matrix, &system.rhs)
            .map_err(|source| Error::Solve { stage: "pressure".to_string(), source })?;
        observer.pressure_solved(&solved.solution, solved.path, &solved.stats);

        transport.couple(&solved.solution)?;
        debug!("transport coupled to pressure");

        let mut integrator = ImplicitEuler::new(transport.initial_state(), self.schedule.dt())?;
        let mut steps = Vec::with_capacity(self.schedule.num_steps());
        for time in self.schedule.step_times() {
            let record = integrator.step_to(time, transport, &mut self.solver)?;
            observer.transport_step(&record, integrator.state());
            steps.push(record);
        }

        let report = SimulationReport {
            pressure: solved.solution,
            pressure_path: solved.path,
            pressure_stats: solved.stats,
            state: integrator.into_state(),
            steps,
            elapsed: start.elapsed().as_secs_f64(),
        };
        info!(
            steps = report.steps.len(),
            total_iterations = report.total_iterations(),
            elapsed = report.elapsed,
            "run finished"
        );
        Ok(report)
    }
}
