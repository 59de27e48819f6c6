use crate::error::{ReductionError, Result};
use crate::linalg::{covariance, EigenSolver, SymmetricEigenSolver};
use crate::preprocessing::StandardScaler;
use crate::{Matrix, Vector};

/// Principal Component Analysis on standardized features.
///
/// The covariance of the standardized data is symmetric, so the default
/// solver is [`SymmetricEigenSolver`]; any other [`EigenSolver`] can be
/// plugged in with [`Pca::with_solver`].
///
/// Few samples relative to features, or nearly collinear features, leave
/// some eigenvalues close to zero. That is not an error, but the directions
/// belonging to them are unstable; selecting one logs a warning.
#[derive(Clone, Debug)]
pub struct Pca<S = SymmetricEigenSolver> {
    n_components: usize,
    tolerance: f64,
    solver: S,
}

impl Pca {
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            tolerance: 1e-10,
            solver: SymmetricEigenSolver,
        }
    }
}

impl<S: EigenSolver> Pca<S> {
    /// Relative eigenvalue size below which a selected direction is reported
    /// as unstable.
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_solver<T: EigenSolver>(self, solver: T) -> Pca<T> {
        Pca {
            n_components: self.n_components,
            tolerance: self.tolerance,
            solver,
        }
    }

    pub fn fit(&self, data: &Matrix) -> Result<PcaFit> {
        let (n_samples, n_features) = data.dim();
        if n_features == 0 {
            return Err(ReductionError::invalid("input matrix must have at least one feature"));
        }
        if n_samples < 2 {
            return Err(ReductionError::invalid(format!(
                "PCA needs at least 2 samples, got {}",
                n_samples
            )));
        }
        if self.n_components == 0 || self.n_components > n_features {
            return Err(ReductionError::invalid(format!(
                "n_components={} must be between 1 and n_features={}",
                self.n_components, n_features
            )));
        }

        // Standardize the data
        let mut scaler = StandardScaler::new();
        let z = scaler.fit_transform(data)?;

        // Compute the covariance matrix for features
        let cov = covariance(&z)?;

        let pairs = self.solver.decompose(&cov)?;
        let total_variance = pairs.values.sum();
        // Select top n_components
        let top = pairs.top(self.n_components)?;

        let largest = top.values[0].max(0.0);
        for (i, &value) in top.values.iter().enumerate() {
            if value <= self.tolerance * largest {
                log::warn!(
                    "principal component {} has near-zero variance ({:e}); its direction is unstable",
                    i,
                    value
                );
            }
        }

        let explained_variance_ratio = if total_variance > 0.0 {
            &top.values / total_variance
        } else {
            Vector::zeros(self.n_components)
        };

        log::debug!(
            "PCA on {}x{} kept {} components, explained variance {:?}",
            n_samples,
            n_features,
            self.n_components,
            top.values
        );

        // Project the data
        Ok(PcaFit {
            transformed: z.dot(&top.vectors),
            components: top.vectors,
            explained_variance: top.values,
            explained_variance_ratio,
            scaler,
        })
    }

    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        Ok(self.fit(data)?.transformed)
    }
}

/// Result of [`Pca::fit`].
#[derive(Clone, Debug)]
pub struct PcaFit {
    /// Standardized data projected onto the components, `m x k`.
    pub transformed: Matrix,
    /// Principal axes as columns, `n x k`, ordered by descending variance.
    pub components: Matrix,
    pub explained_variance: Vector,
    pub explained_variance_ratio: Vector,
    scaler: StandardScaler,
}

impl PcaFit {
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Standardizes `data` with the fitted statistics and projects it.
    pub fn project(&self, data: &Matrix) -> Result<Matrix> {
        let z = self.scaler.transform(data)?;
        Ok(z.dot(&self.components))
    }

    /// Maps reduced rows back into standardized feature space.
    pub fn reconstruct(&self, reduced: &Matrix) -> Result<Matrix> {
        if reduced.ncols() != self.components.ncols() {
            return Err(ReductionError::invalid(format!(
                "reduced data has {} columns, expected {}",
                reduced.ncols(),
                self.components.ncols()
            )));
        }
        Ok(reduced.dot(&self.components.t()))
    }
}
