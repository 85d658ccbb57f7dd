use sprs::CsMat;

use crate::error::SolveError;

/// Statistics from solver execution
#[derive(Debug, Clone, PartialEq)]
pub struct SolverStats {
    /// Number of iterations (0 for direct solvers)
    pub iterations: usize,

    /// Final residual norm ||r|| = ||b - Ax||
    pub residual_norm: f64,

    /// Relative residual ||r|| / ||b||
    pub relative_residual: f64,

    /// Whether solver converged
    pub converged: bool,

    /// Solve time in seconds
    pub solve_time: f64,
}

impl SolverStats {
    pub fn new() -> Self {
        Self {
            iterations: 0,
            residual_norm: 0.0,
            relative_residual: 0.0,
            converged: false,
            solve_time: 0.0,
        }
    }
}

impl Default for SolverStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for a linear operator A that can be applied to a vector x to get Ax
pub trait LinearOperator {
    /// Apply the operator to vector v: out = A * v
    fn apply(&self, v: &[f64]) -> Vec<f64>;

    /// Number of rows (output dimension)
    fn rows(&self) -> usize;

    /// Number of columns (input dimension)
    fn cols(&self) -> usize;
}

impl LinearOperator for CsMat<f64> {
    fn apply(&self, v: &[f64]) -> Vec<f64> {
        let mut result = vec![0.0; self.rows()];
        if self.is_csr() {
            for (row_idx, row) in self.outer_iterator().enumerate() {
                result[row_idx] = row.iter().map(|(col_idx, &val)| val * v[col_idx]).sum();
            }
        } else {
            // CSC: scatter each column
            for (col_idx, col) in self.outer_iterator().enumerate() {
                let vc = v[col_idx];
                for (row_idx, &val) in col.iter() {
                    result[row_idx] += val * vc;
                }
            }
        }
        result
    }

    fn rows(&self) -> usize {
        self.rows()
    }

    fn cols(&self) -> usize {
        self.cols()
    }
}

/// Linear system solver trait
///
/// Solves Ax = b for x
pub trait Solver {
    /// Solve the linear system Ax = b
    ///
    /// # Returns
    /// * Solution vector x (n) and solver statistics, or the reason no
    ///   acceptable solution was produced
    fn solve(&mut self, a: &CsMat<f64>, b: &[f64]) -> Result<(Vec<f64>, SolverStats), SolveError>;

    /// Get solver name
    fn name(&self) -> &str;
}

/// Helper functions for solver validation
pub struct SolverUtils;

impl SolverUtils {
    /// Check that A is square and matches the length of b
    pub fn check_dimensions(a: &CsMat<f64>, b: &[f64]) -> Result<usize, SolveError> {
        let (rows, cols) = (a.rows(), a.cols());
        if rows != cols || rows != b.len() {
            return Err(SolveError::DimensionMismatch { rows, cols, rhs: b.len() });
        }
        Ok(rows)
    }

    /// Compute residual r = b - Ax
    pub fn compute_residual<O: LinearOperator + ?Sized>(a: &O, x: &[f64], b: &[f64]) -> Vec<f64> {
        let ax = a.apply(x);
        b.iter()
            .zip(ax.iter())
            .map(|(&bi, &axi)| bi - axi)
            .collect()
    }

    /// Compute L2 norm of a vector
    pub fn norm(v: &[f64]) -> f64 {
        v.iter().map(|&x| x * x).sum::<f64>().sqrt()
    }

    /// Dot product
    pub fn dot(u: &[f64], v: &[f64]) -> f64 {
        u.iter().zip(v.iter()).map(|(&ui, &vi)| ui * vi).sum()
    }

    /// Compute residual norm ||b - Ax||
    pub fn residual_norm<O: LinearOperator + ?Sized>(a: &O, x: &[f64], b: &[f64]) -> f64 {
        let r = Self::compute_residual(a, x, b);
        Self::norm(&r)
    }

    /// Compute relative residual ||b - Ax|| / ||b||
    pub fn relative_residual<O: LinearOperator + ?Sized>(a: &O, x: &[f64], b: &[f64]) -> f64 {
        let r_norm = Self::residual_norm(a, x, b);
        let b_norm = Self::norm(b);

        if b_norm == 0.0 {
            r_norm
        } else {
            r_norm / b_norm
        }
    }

    pub fn all_finite(v: &[f64]) -> bool {
        v.iter().all(|x| x.is_finite())
    }
}
