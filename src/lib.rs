//! PCA and LDA dimensionality reduction for dense numeric tables.
//!
//! Rows are samples, columns are features. Inputs must be finite and every
//! feature must vary; see [`ReductionError`] for what is rejected.

pub use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

pub mod decomposition;
pub mod error;
pub mod linalg;
pub mod preprocessing;

pub use decomposition::{Lda, LdaFit, Pca, PcaFit};
pub use error::{ReductionError, Result};
pub use linalg::{EigenPairs, EigenSolver, GeneralEigenSolver, SymmetricEigenSolver};
pub use preprocessing::{standardize, StandardScaler};

pub type Vector = Array1<f64>;
pub type Matrix = Array2<f64>;

/// Projects `data` (`m x n`) onto its `k` leading principal components.
///
/// Returns an `m x k` matrix whose columns are ordered by descending
/// explained variance.
pub fn pca(data: &Matrix, k: usize) -> Result<Matrix> {
    Pca::new(k).transform(data)
}

/// Projects `data` (`m x n`) onto its `k` leading linear discriminants for
/// the given per-sample `labels`.
pub fn lda<L: Ord + Clone>(data: &Matrix, labels: &[L], k: usize) -> Result<Matrix> {
    Lda::new(k).transform(data, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn basic_types_work() {
        let vec = Vector::zeros(5);
        let mat = Matrix::zeros((3, 4));
        assert_eq!(vec.len(), 5);
        assert_eq!(mat.shape(), &[3, 4]);
    }

    #[test]
    fn free_functions_match_builders() {
        let x = array![[1.0, 1.0], [1.5, -1.0], [5.0, -1.0], [5.5, 1.0]];
        let y = [0, 0, 1, 1];

        assert_eq!(pca(&x, 1).unwrap(), Pca::new(1).transform(&x).unwrap());
        assert_eq!(lda(&x, &y, 1).unwrap(), Lda::new(1).transform(&x, &y).unwrap());
    }
}
