pub mod solver;
pub mod direct;
pub mod iterative;
pub mod preconditioner;
pub mod monitor;
pub mod selector;

pub use solver::{Solver, SolverStats, SolverUtils, LinearOperator};
pub use direct::{DirectSolver, SparseLu};
pub use iterative::Gmres;
pub use preconditioner::{Preconditioner, IdentityPreconditioner, IluPreconditioner};
pub use monitor::{IterationMonitor, SilentMonitor, TracingMonitor};
pub use selector::{AdaptiveSolver, SelectedSolve, SolverPath};
