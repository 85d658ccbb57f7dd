//! Time stepping of the weakly coupled flow-and-transport problem

pub mod implicit_euler;
pub mod problem;
pub mod schedule;
pub mod simulation;

pub use implicit_euler::{ImplicitEuler, StepRecord};
pub use problem::{LinearSystem, PressureProblem, TransportProblem};
pub use schedule::TimeSchedule;
pub use simulation::{SimulationObserver, SimulationReport, TracingObserver, WeaklyCoupledSimulation};
