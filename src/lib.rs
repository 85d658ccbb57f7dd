//! Weakly coupled flow and heat transport in 3D fractured rock
//!
//! Outcrop fracture traces are extruded into a mixed-dimensional network of
//! rock matrix, fracture planes and intersection lines. Each sub-domain gets a
//! parameter record, and a pressure solve followed by implicit transport
//! steps is driven through an adaptive linear solver that picks sparse LU or
//! GMRES + ILU(0) by system size.

pub mod config;
pub mod error;
pub mod linalg;
pub mod logging;
pub mod network;
pub mod parameters;
pub mod timestepping;
pub mod utils;

pub use config::{NetworkConfig, ParameterConfig, SimulationConfig, SolverConfig, TimeSteppingConfig};
pub use error::{Error, Result, SolveError};
pub use linalg::{AdaptiveSolver, DirectSolver, Gmres, IterationMonitor, SelectedSolve, Solver, SolverPath, SolverStats};
pub use network::{FractureNetwork, OutcropTraces, Subdomain, SubdomainKind};
pub use parameters::{assign_parameters, BoundaryCondition, BoundaryConditionType, SubdomainParameters};
pub use timestepping::{
    ImplicitEuler, LinearSystem, PressureProblem, SimulationObserver, SimulationReport, StepRecord, TimeSchedule,
    TracingObserver, TransportProblem, WeaklyCoupledSimulation,
};
pub use utils::units;
