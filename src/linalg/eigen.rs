use crate::error::{ReductionError, Result};
use crate::linalg::{from_dmatrix, to_dmatrix};
use crate::{Matrix, Vector};
use nalgebra::{DMatrix, Schur, SymmetricEigen, SVD};

/// Eigenvalues paired with the eigenvectors stored as the columns of
/// `vectors` (value `i` belongs to column `i`).
#[derive(Clone, Debug, PartialEq)]
pub struct EigenPairs {
    pub values: Vector,
    pub vectors: Matrix,
}

impl EigenPairs {
    pub fn new(values: Vector, vectors: Matrix) -> Result<Self> {
        if vectors.ncols() != values.len() {
            return Err(ReductionError::Decomposition(format!(
                "{} eigenvalues paired with {} eigenvectors",
                values.len(),
                vectors.ncols()
            )));
        }
        Ok(Self { values, vectors })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Keeps the `k` pairs with the largest eigenvalues, largest first.
    ///
    /// Eigenvalues are compared by signed value, not absolute value. The
    /// covariance and `Sw⁻¹Sb` matrices are positive semi-definite, so the two
    /// orders only differ on rounding noise around zero, where a slightly
    /// negative value is ranked last. The sort is stable, so equal eigenvalues
    /// stay in the order the solver produced them. Each kept vector is flipped
    /// so that its largest-magnitude component (the first one, on near-ties)
    /// is positive.
    pub fn top(self, k: usize) -> Result<Self> {
        if k == 0 || k > self.len() {
            return Err(ReductionError::invalid(format!(
                "cannot select {} of {} eigenpairs",
                k,
                self.len()
            )));
        }

        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| self.values[b].total_cmp(&self.values[a]));
        order.truncate(k);

        let values: Vector = order.iter().map(|&i| self.values[i]).collect();
        let mut vectors = Matrix::zeros((self.vectors.nrows(), k));
        for (dst, &src) in order.iter().enumerate() {
            let mut column = self.vectors.column(src).to_owned();
            // First component within rounding of the largest magnitude.
            let max_abs = column.iter().fold(0.0f64, |acc, x| acc.max(x.abs()));
            let pivot = column
                .iter()
                .copied()
                .find(|x| x.abs() >= max_abs * (1.0 - 1e-9))
                .unwrap_or(0.0);
            if pivot < 0.0 {
                column.mapv_inplace(|x| -x);
            }
            vectors.column_mut(dst).assign(&column);
        }

        Ok(Self { values, vectors })
    }
}

/// Eigendecomposition of a square matrix.
///
/// The transforms only rely on the pairing of values with vectors; ordering,
/// tie-breaking and sign are applied afterwards by [`EigenPairs::top`].
pub trait EigenSolver {
    fn decompose(&self, matrix: &Matrix) -> Result<EigenPairs>;
}

fn ensure_square(matrix: &Matrix) -> Result<()> {
    if matrix.is_square() && matrix.nrows() > 0 {
        Ok(())
    } else {
        Err(ReductionError::invalid(format!(
            "eigendecomposition needs a non-empty square matrix, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        )))
    }
}

/// Solver for real symmetric matrices; eigenvalues are real by construction
/// and eigenvectors orthonormal.
#[derive(Clone, Copy, Debug, Default)]
pub struct SymmetricEigenSolver;

impl EigenSolver for SymmetricEigenSolver {
    fn decompose(&self, matrix: &Matrix) -> Result<EigenPairs> {
        ensure_square(matrix)?;

        // Only the rounding noise between the two triangles is dropped here.
        let symmetric = (matrix + &matrix.t()) * 0.5;
        let eigen = SymmetricEigen::try_new(to_dmatrix(&symmetric), f64::EPSILON, 0)
            .ok_or_else(|| ReductionError::Decomposition("symmetric eigensolver did not converge".into()))?;

        EigenPairs::new(
            eigen.eigenvalues.iter().copied().collect(),
            from_dmatrix(&eigen.eigenvectors),
        )
    }
}

/// Solver for arbitrary real square matrices.
///
/// Eigenvalues come from the real Schur form and only their real parts are
/// kept; an imaginary part larger than `tolerance` times the largest
/// eigenvalue magnitude is logged as a warning. Eigenvalues closer than that
/// same relative bound form a group; the eigenvectors of a group are the
/// right singular vectors of `A - λI` with the smallest singular values, one
/// per member. Groups are relative to the spectrum, so a matrix whose
/// eigenvalues are all tiny still gets one vector per distinct eigenvalue.
#[derive(Clone, Copy, Debug)]
pub struct GeneralEigenSolver {
    tolerance: f64,
}

impl GeneralEigenSolver {
    pub fn new() -> Self {
        Self { tolerance: 1e-8 }
    }

    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn null_vectors(&self, a: &DMatrix<f64>, lambda: f64, count: usize) -> Result<Vec<Vector>> {
        let n = a.nrows();
        let shifted = a - DMatrix::<f64>::identity(n, n) * lambda;
        let svd = SVD::try_new(shifted, false, true, f64::EPSILON, 0)
            .ok_or_else(|| ReductionError::Decomposition("SVD did not converge".into()))?;
        let v_t = svd
            .v_t
            .ok_or_else(|| ReductionError::Decomposition("SVD returned no right singular vectors".into()))?;

        let mut order: Vec<usize> = (0..svd.singular_values.len()).collect();
        order.sort_by(|&i, &j| svd.singular_values[i].total_cmp(&svd.singular_values[j]));

        Ok(order
            .into_iter()
            .take(count)
            .map(|row| v_t.row(row).iter().copied().collect())
            .collect())
    }
}

impl Default for GeneralEigenSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl EigenSolver for GeneralEigenSolver {
    fn decompose(&self, matrix: &Matrix) -> Result<EigenPairs> {
        ensure_square(matrix)?;
        let n = matrix.nrows();
        let a = to_dmatrix(matrix);

        let schur = Schur::try_new(a.clone(), f64::EPSILON, 0)
            .ok_or_else(|| ReductionError::Decomposition("Schur decomposition did not converge".into()))?;
        let eigenvalues = schur.complex_eigenvalues();

        let scale = eigenvalues.iter().map(|z| z.re.abs()).fold(0.0, f64::max);
        if scale == 0.0 {
            // every eigenvalue is zero, so any basis is an eigenbasis
            return EigenPairs::new(Vector::zeros(n), Matrix::eye(n));
        }

        let mut values: Vec<f64> = Vec::with_capacity(n);
        for z in eigenvalues.iter() {
            if z.im.abs() > self.tolerance * scale {
                log::warn!(
                    "eigenvalue {} + {}i is not real; keeping the real part",
                    z.re,
                    z.im
                );
            }
            values.push(z.re);
        }
        values.sort_by(|a, b| b.total_cmp(a));

        let mut vectors = Matrix::zeros((n, n));
        let mut start = 0;
        while start < n {
            let mut end = start + 1;
            while end < n && (values[start] - values[end]).abs() <= self.tolerance * scale {
                end += 1;
            }

            let lambda = values[start..end].iter().sum::<f64>() / (end - start) as f64;
            let basis = self.null_vectors(&a, lambda, end - start)?;
            for (offset, v) in basis.iter().enumerate() {
                vectors.column_mut(start + offset).assign(v);
            }
            start = end;
        }

        EigenPairs::new(values.into(), vectors)
    }
}
