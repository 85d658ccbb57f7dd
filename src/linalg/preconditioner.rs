use sprs::{CsMat, TriMat};

use crate::error::SolveError;

/// Preconditioner trait for iterative solvers
///
/// Solves M z = r approximately (where M ≈ A)
pub trait Preconditioner {
    /// Apply preconditioner: solve M z = r
    fn apply(&self, r: &[f64]) -> Vec<f64>;
}

/// Identity preconditioner (no preconditioning)
pub struct IdentityPreconditioner;

impl Preconditioner for IdentityPreconditioner {
    fn apply(&self, r: &[f64]) -> Vec<f64> {
        r.to_vec()
    }
}

/// Incomplete LU preconditioner with zero fill-in (ILU(0))
///
/// M = L * U ≈ A
/// L and U have the same sparsity pattern as A.
pub struct IluPreconditioner {
    /// Row pointers of the CSR pattern
    indptr: Vec<usize>,
    /// Column indices, sorted within each row
    indices: Vec<usize>,
    /// Combined L (strictly lower, unit diagonal implied) and U factors
    factors: Vec<f64>,
    /// Position of the diagonal entry of each row in `indices`
    diag_indices: Vec<usize>,
}

impl IluPreconditioner {
    /// Create a new ILU(0) preconditioner from matrix A
    ///
    /// Every row must store its diagonal entry.
    pub fn new(a: &CsMat<f64>) -> Result<Self, SolveError> {
        let (indptr, indices, data) = csr_parts(a);
        let n = indptr.len() - 1;

        // Pre-calculate diagonal indices once
        let mut diag_indices = vec![0; n];
        for (i, diag) in diag_indices.iter_mut().enumerate() {
            *diag = (indptr[i]..indptr[i + 1])
                .find(|&idx| indices[idx] == i)
                .ok_or(SolveError::MissingDiagonal { row: i })?;
        }

        let mut precond = Self { indptr, indices, factors: data, diag_indices };
        precond.factorize_in_place()?;
        Ok(precond)
    }

    /// Refactorize in place from a matrix with the SAME sparsity pattern
    pub fn update(&mut self, a: &CsMat<f64>) -> Result<(), SolveError> {
        let (indptr, indices, data) = csr_parts(a);
        if indptr != self.indptr || indices != self.indices {
            return Err(SolveError::DimensionMismatch {
                rows: a.rows(),
                cols: a.cols(),
                rhs: self.dim(),
            });
        }
        self.factors = data;
        self.factorize_in_place()
    }

    pub fn dim(&self) -> usize {
        self.diag_indices.len()
    }

    fn factorize_in_place(&mut self) -> Result<(), SolveError> {
        let n = self.dim();
        let indptr = &self.indptr;
        let indices = &self.indices;
        let diag_indices = &self.diag_indices;
        let factors = &mut self.factors;

        // Pivots are judged against the largest entry so the check does not
        // depend on the units the system was assembled in
        let scale = factors.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let tiny = f64::EPSILON * scale;

        for i in 0..n {
            let row_start = indptr[i];
            let row_end = indptr[i + 1];
            let diag_i = diag_indices[i];

            // Elimination using previous rows k < i
            for k_idx in row_start..diag_i {
                let k = indices[k_idx];
                let k_diag = diag_indices[k];
                let k_end = indptr[k + 1];

                let diag_val_k = factors[k_diag];
                if diag_val_k.abs() <= tiny {
                    return Err(SolveError::ZeroPivot { row: k });
                }

                let val_ik = factors[k_idx] / diag_val_k;
                factors[k_idx] = val_ik;

                // A(i, j) -= A(i, k) * A(k, j) for j > k, only where (i, j) is in the pattern.
                // Both rows are sorted, so a merge walk finds the matches.
                let mut cur = k_idx + 1;
                for kj in k_diag + 1..k_end {
                    let col_j = indices[kj];
                    while cur < row_end && indices[cur] < col_j {
                        cur += 1;
                    }
                    if cur == row_end {
                        break;
                    }
                    if indices[cur] == col_j {
                        factors[cur] -= val_ik * factors[kj];
                    }
                }
            }
            if factors[diag_i].abs() <= tiny {
                return Err(SolveError::ZeroPivot { row: i });
            }
        }
        Ok(())
    }
}

impl Preconditioner for IluPreconditioner {
    fn apply(&self, r: &[f64]) -> Vec<f64> {
        let n = self.dim();
        let mut z = r.to_vec();
        let indptr = &self.indptr;
        let indices = &self.indices;
        let data = &self.factors;

        // Forward solve: L y = r (L is lower part, unit diagonal)
        for i in 0..n {
            let diag = self.diag_indices[i];
            let sum: f64 = (indptr[i]..diag).map(|idx| data[idx] * z[indices[idx]]).sum();
            z[i] -= sum;
        }

        // Backward solve: U x = y (U is upper part, includes diagonal)
        for i in (0..n).rev() {
            let diag = self.diag_indices[i];
            let sum: f64 = (diag + 1..indptr[i + 1]).map(|idx| data[idx] * z[indices[idx]]).sum();
            z[i] = (z[i] - sum) / data[diag];
        }

        z
    }
}

/// Row-major (indptr, indices, data) of A with sorted columns,
/// whatever the storage of the input
fn csr_parts(a: &CsMat<f64>) -> (Vec<usize>, Vec<usize>, Vec<f64>) {
    let converted;
    let csr = if a.is_csr() {
        a
    } else {
        let mut triplets = TriMat::new((a.rows(), a.cols()));
        for (col, lane) in a.outer_iterator().enumerate() {
            for (row, &val) in lane.iter() {
                triplets.add_triplet(row, col, val);
            }
        }
        converted = triplets.to_csr::<usize>();
        &converted
    };

    let mut indptr = Vec::with_capacity(csr.rows() + 1);
    let mut indices = Vec::with_capacity(csr.nnz());
    let mut data = Vec::with_capacity(csr.nnz());
    indptr.push(0);
    for row in csr.outer_iterator() {
        let mut entries: Vec<(usize, f64)> = row.iter().map(|(j, &v)| (j, v)).collect();
        entries.sort_by_key(|&(j, _)| j);
        for (j, v) in entries {
            indices.push(j);
            data.push(v);
        }
        indptr.push(indices.len());
    }
    (indptr, indices, data)
}
