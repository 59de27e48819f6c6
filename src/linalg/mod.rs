//! Small linear-algebra layer shared by the transforms.
//!
//! Storage stays in `ndarray`; anything needing a factorization is handed to
//! `nalgebra` through [`to_dmatrix`] / [`from_dmatrix`].

mod eigen;

pub use eigen::{EigenPairs, EigenSolver, GeneralEigenSolver, SymmetricEigenSolver};

use crate::error::{ReductionError, Result};
use crate::Matrix;
use nalgebra::{DMatrix, SVD};
use ndarray::Axis;

pub(crate) fn to_dmatrix(a: &Matrix) -> DMatrix<f64> {
    DMatrix::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

pub(crate) fn from_dmatrix(m: &DMatrix<f64>) -> Matrix {
    Matrix::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

/// Rejects NaN and infinities, reporting the first offending cell.
pub fn ensure_finite(data: &Matrix) -> Result<()> {
    match data.indexed_iter().find(|(_, v)| !v.is_finite()) {
        Some(((row, col), v)) => Err(ReductionError::invalid(format!(
            "non-finite value {} at ({}, {})",
            v, row, col
        ))),
        None => Ok(()),
    }
}

/// Sample covariance of the columns of `data` (divides by `m - 1`).
pub fn covariance(data: &Matrix) -> Result<Matrix> {
    let n_samples = data.nrows();
    if n_samples < 2 {
        return Err(ReductionError::invalid(format!(
            "covariance needs at least 2 samples, got {}",
            n_samples
        )));
    }

    let mean = data
        .mean_axis(Axis(0))
        .ok_or_else(|| ReductionError::invalid("cannot compute covariance of an empty matrix"))?;
    let centered = data - &mean.view().insert_axis(Axis(0));
    Ok(centered.t().dot(&centered) / (n_samples as f64 - 1.0))
}

/// Inverse of a square matrix, refusing numerically singular input.
///
/// A matrix counts as singular when its reciprocal condition number
/// (smallest over largest singular value) falls below `tolerance`. `step`
/// names the caller's pipeline step in the returned error.
pub fn checked_inverse(matrix: &Matrix, tolerance: f64, step: &'static str) -> Result<Matrix> {
    if !matrix.is_square() {
        return Err(ReductionError::invalid(format!(
            "cannot invert a {}x{} matrix",
            matrix.nrows(),
            matrix.ncols()
        )));
    }

    let m = to_dmatrix(matrix);
    let svd = SVD::try_new(m.clone(), false, false, f64::EPSILON, 0)
        .ok_or_else(|| ReductionError::Decomposition(format!("SVD did not converge in `{}`", step)))?;

    let largest = svd.singular_values.max();
    let smallest = svd.singular_values.min();
    if largest <= 0.0 || smallest / largest < tolerance {
        log::debug!(
            "{}: singular values span [{:e}, {:e}], treating as singular",
            step,
            smallest,
            largest
        );
        return Err(ReductionError::SingularMatrix { step });
    }

    m.try_inverse()
        .map(|inv| from_dmatrix(&inv))
        .ok_or(ReductionError::SingularMatrix { step })
}
