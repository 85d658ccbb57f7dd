use std::time::Instant;

use sprs::CsMat;

use super::monitor::{IterationMonitor, TracingMonitor};
use super::preconditioner::{IluPreconditioner, Preconditioner};
use super::solver::{LinearOperator, Solver, SolverStats, SolverUtils};
use crate::error::SolveError;

/// Restarted GMRES (Generalized Minimal Residual) solver
///
/// Right preconditioning: the Krylov space is built for A M^{-1}, so the
/// residual estimate tracked by the Givens rotations is the true residual
/// of the original system and the tolerance applies to ||b - Ax|| / ||b||.
///
/// The Krylov basis grows one vector per iteration and is dropped at every
/// restart; a cycle that converges early never allocates `restart` vectors.
#[derive(Debug, Clone)]
pub struct Gmres {
    max_iterations: usize,
    restart: usize,
    tolerance: f64,
    name: String,
}

impl Gmres {
    pub fn new() -> Self {
        Self {
            max_iterations: 10_000,
            restart: 1500,
            tolerance: 1e-8,
            name: "GMRES + ILU(0)".to_string(),
        }
    }

    pub fn with_restart(mut self, m: usize) -> Self { self.restart = m.max(1); self }
    pub fn with_max_iterations(mut self, max_iter: usize) -> Self { self.max_iterations = max_iter; self }
    pub fn with_tolerance(mut self, tol: f64) -> Self { self.tolerance = tol; self }

    pub fn restart(&self) -> usize { self.restart }
    pub fn max_iterations(&self) -> usize { self.max_iterations }
    pub fn tolerance(&self) -> f64 { self.tolerance }

    /// Solve A x = b from x0 = 0 with the given preconditioner
    ///
    /// `monitor` is called once per iteration with the residual estimate.
    /// Running out of iterations is reported as [`SolveError::NotConverged`].
    pub fn solve_preconditioned<O, P, M>(
        &self,
        a: &O,
        b: &[f64],
        precond: &P,
        monitor: &mut M,
    ) -> Result<(Vec<f64>, SolverStats), SolveError>
    where
        O: LinearOperator + ?Sized,
        P: Preconditioner + ?Sized,
        M: IterationMonitor + ?Sized,
    {
        let n = b.len();
        let start = Instant::now();
        let b_norm = SolverUtils::norm(b);

        if b_norm == 0.0 {
            return Ok((vec![0.0; n], SolverStats {
                iterations: 0,
                residual_norm: 0.0,
                relative_residual: 0.0,
                converged: true,
                solve_time: start.elapsed().as_secs_f64(),
            }));
        }

        let target = self.tolerance * b_norm;
        let mut x = vec![0.0; n];
        let mut r = b.to_vec();
        let mut r_norm = b_norm;
        let mut total_iter = 0;
        let mut converged = false;

        loop {
            if r_norm <= target {
                converged = true;
                break;
            }
            if total_iter >= self.max_iterations || !r_norm.is_finite() {
                break;
            }

            let m = self.restart.min(self.max_iterations - total_iter);
            let mut basis: Vec<Vec<f64>> = Vec::with_capacity(m.min(64) + 1);
            basis.push(r.iter().map(|&ri| ri / r_norm).collect());

            // h[j] holds column j of the (rotated) Hessenberg matrix
            let mut h: Vec<Vec<f64>> = Vec::with_capacity(m);
            let mut g = vec![r_norm];
            let mut cs: Vec<f64> = Vec::with_capacity(m);
            let mut sn: Vec<f64> = Vec::with_capacity(m);

            let mut k = 0;
            while k < m {
                let mut w = a.apply(&precond.apply(&basis[k]));
                let w_norm = SolverUtils::norm(&w);

                // Modified Gram-Schmidt
                let mut col = vec![0.0; k + 2];
                for (i, v) in basis.iter().enumerate() {
                    let hij = SolverUtils::dot(v, &w);
                    col[i] = hij;
                    for (wl, &vl) in w.iter_mut().zip(v.iter()) {
                        *wl -= hij * vl;
                    }
                }
                let h_next = SolverUtils::norm(&w);
                col[k + 1] = h_next;

                for i in 0..k {
                    let temp = cs[i] * col[i] + sn[i] * col[i + 1];
                    col[i + 1] = -sn[i] * col[i] + cs[i] * col[i + 1];
                    col[i] = temp;
                }

                let (c, s, rho) = givens_rotation(col[k], col[k + 1]);
                cs.push(c);
                sn.push(s);
                col[k] = rho;
                col[k + 1] = 0.0;

                g.push(-s * g[k]);
                g[k] *= c;
                h.push(col);

                k += 1;
                total_iter += 1;

                let res_estimate = g[k].abs();
                monitor.on_iteration(total_iter, res_estimate, res_estimate / b_norm);

                // Breakdown: the Krylov space is invariant, nothing more to gain in this cycle
                let breakdown = h_next <= 1e-14 * w_norm || h_next == 0.0;
                if res_estimate <= target || breakdown {
                    break;
                }
                basis.push(w.iter().map(|&wl| wl / h_next).collect());
            }

            // Back substitution for the k x k triangular system. A negligible
            // diagonal means that direction cannot reduce the residual
            // (singular, inconsistent systems), so its coefficient stays zero.
            let r_scale = h.iter().flat_map(|col| col.iter()).fold(0.0_f64, |m, v| m.max(v.abs()));
            let negligible = f64::EPSILON * r_scale * k as f64;
            let mut y = vec![0.0; k];
            for i in (0..k).rev() {
                let mut sum = g[i];
                for j in (i + 1)..k {
                    sum -= h[j][i] * y[j];
                }
                y[i] = if h[i][i].abs() > negligible { sum / h[i][i] } else { 0.0 };
            }

            let mut dy = vec![0.0; n];
            for (v, &yj) in basis.iter().zip(y.iter()) {
                for (di, &vi) in dy.iter_mut().zip(v.iter()) {
                    *di += yj * vi;
                }
            }
            let dx = precond.apply(&dy);
            for (xi, dxi) in x.iter_mut().zip(dx.iter()) {
                *xi += dxi;
            }

            r = SolverUtils::compute_residual(a, &x, b);
            r_norm = SolverUtils::norm(&r);
        }

        if !SolverUtils::all_finite(&x) {
            return Err(SolveError::NonFinite);
        }

        let stats = SolverStats {
            iterations: total_iter,
            residual_norm: r_norm,
            relative_residual: r_norm / b_norm,
            converged,
            solve_time: start.elapsed().as_secs_f64(),
        };

        if converged {
            Ok((x, stats))
        } else {
            Err(SolveError::NotConverged { stats })
        }
    }
}

impl Default for Gmres {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver for Gmres {
    fn solve(&mut self, a: &CsMat<f64>, b: &[f64]) -> Result<(Vec<f64>, SolverStats), SolveError> {
        SolverUtils::check_dimensions(a, b)?;
        let precond = IluPreconditioner::new(a)?;
        self.solve_preconditioned(a, b, &precond, &mut TracingMonitor::new())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Returns (c, s, rho) with [c s; -s c] [a; b] = [rho; 0]
fn givens_rotation(a: f64, b: f64) -> (f64, f64, f64) {
    if b == 0.0 {
        (1.0, 0.0, a)
    } else if b.abs() > a.abs() {
        let tau = a / b;
        let s = 1.0 / (1.0 + tau * tau).sqrt();
        let c = s * tau;
        (c, s, b * (1.0 + tau * tau).sqrt())
    } else {
        let tau = b / a;
        let c = 1.0 / (1.0 + tau * tau).sqrt();
        let s = c * tau;
        (c, s, a * (1.0 + tau * tau).sqrt())
    }
}
