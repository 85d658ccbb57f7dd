//! Per-iteration progress reporting for iterative solvers

use tracing::{debug, trace};

/// Receives the residual after every iteration of an iterative solve
pub trait IterationMonitor {
    /// Called once per iteration with the (estimated) residual norms
    fn on_iteration(&mut self, iteration: usize, residual_norm: f64, relative_residual: f64);
}

impl<F> IterationMonitor for F
where
    F: FnMut(usize, f64, f64),
{
    fn on_iteration(&mut self, iteration: usize, residual_norm: f64, relative_residual: f64) {
        self(iteration, residual_norm, relative_residual)
    }
}

/// Ignores all progress
pub struct SilentMonitor;

impl IterationMonitor for SilentMonitor {
    fn on_iteration(&mut self, _iteration: usize, _residual_norm: f64, _relative_residual: f64) {}
}

/// Logs progress through `tracing`
///
/// Every iteration goes out at TRACE level; every `report_every`-th one
/// is repeated at DEBUG so long solves stay visible at coarser filters.
pub struct TracingMonitor {
    report_every: usize,
}

impl TracingMonitor {
    pub fn new() -> Self {
        Self { report_every: 50 }
    }

    pub fn with_report_every(mut self, every: usize) -> Self {
        self.report_every = every.max(1);
        self
    }
}

impl Default for TracingMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl IterationMonitor for TracingMonitor {
    fn on_iteration(&mut self, iteration: usize, residual_norm: f64, relative_residual: f64) {
        trace!(iteration, residual_norm, relative_residual, "GMRES iteration");
        if iteration % self.report_every == 0 {
            debug!(
                "GMRES iter {:5}: res = {:.3e}, rel = {:.3e}",
                iteration, residual_norm, relative_residual
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_monitor() {
        let mut seen = Vec::new();
        {
            let mut monitor = |it: usize, _res: f64, rel: f64| seen.push((it, rel));
            monitor.on_iteration(1, 0.5, 0.25);
            monitor.on_iteration(2, 0.1, 0.05);
        }
        assert_eq!(seen, vec![(1, 0.25), (2, 0.05)]);
    }

    #[test]
    fn test_report_every_is_at_least_one() {
        let mut monitor = TracingMonitor::new().with_report_every(0);
        monitor.on_iteration(3, 1.0, 1.0);
        assert_eq!(monitor.report_every, 1);
    }
}
