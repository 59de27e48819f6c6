use crate::error::{ReductionError, Result};
use crate::linalg::{checked_inverse, EigenSolver, GeneralEigenSolver};
use crate::preprocessing::StandardScaler;
use crate::{Matrix, Vector};
use ndarray::Axis;
use std::collections::BTreeMap;

const WITHIN_SCATTER_STEP: &str = "within-class scatter inverse";

/// Linear Discriminant Analysis on standardized features.
///
/// Directions are the eigenvectors of `Sw⁻¹ · Sb`, which is not symmetric,
/// so the default solver is [`GeneralEigenSolver`]. With `c` classes at most
/// `c - 1` eigenvalues are non-zero; asking for more components is allowed
/// but the extra axes carry no discriminative information.
#[derive(Clone, Debug)]
pub struct Lda<S = GeneralEigenSolver> {
    n_components: usize,
    singular_tolerance: f64,
    solver: S,
}

impl Lda {
    pub fn new(n_components: usize) -> Self {
        Self {
            n_components,
            singular_tolerance: 1e-12,
            solver: GeneralEigenSolver::new(),
        }
    }
}

impl<S: EigenSolver> Lda<S> {
    /// Reciprocal condition number below which the within-class scatter is
    /// treated as singular.
    pub fn singular_tolerance(mut self, tolerance: f64) -> Self {
        self.singular_tolerance = tolerance;
        self
    }

    pub fn with_solver<T: EigenSolver>(self, solver: T) -> Lda<T> {
        Lda {
            n_components: self.n_components,
            singular_tolerance: self.singular_tolerance,
            solver,
        }
    }

    pub fn fit<L: Ord + Clone>(&self, data: &Matrix, labels: &[L]) -> Result<LdaFit<L>> {
        let (n_samples, n_features) = data.dim();
        if n_features == 0 {
            return Err(ReductionError::invalid("input matrix must have at least one feature"));
        }
        if n_samples < 2 {
            return Err(ReductionError::invalid(format!(
                "LDA needs at least 2 samples, got {}",
                n_samples
            )));
        }
        if labels.len() != n_samples {
            return Err(ReductionError::invalid(format!(
                "number of labels ({}) doesn't match number of samples ({})",
                labels.len(),
                n_samples
            )));
        }
        if self.n_components == 0 || self.n_components > n_features {
            return Err(ReductionError::invalid(format!(
                "n_components={} must be between 1 and n_features={}",
                self.n_components, n_features
            )));
        }

        // Group sample indices by class
        let mut groups: BTreeMap<&L, Vec<usize>> = BTreeMap::new();
        for (i, label) in labels.iter().enumerate() {
            groups.entry(label).or_default().push(i);
        }
        let n_classes = groups.len();
        if n_classes < 2 {
            return Err(ReductionError::invalid(
                "LDA requires at least 2 distinct labels",
            ));
        }
        if self.n_components >= n_classes {
            log::warn!(
                "n_components={} with {} classes: only {} discriminant axes carry information",
                self.n_components,
                n_classes,
                n_classes - 1
            );
        }

        // Standardize the data
        let mut scaler = StandardScaler::new();
        let z = scaler.fit_transform(data)?;
        let z_mean = z
            .mean_axis(Axis(0))
            .ok_or_else(|| ReductionError::invalid("cannot compute the mean of an empty matrix"))?;

        let mut ssw = Matrix::zeros((n_features, n_features));
        let mut ssb = Matrix::zeros((n_features, n_features));
        let mut means = Matrix::zeros((n_classes, n_features));
        let mut classes = Vec::with_capacity(n_classes);

        for (class_idx, (&label, rows)) in groups.iter().enumerate() {
            let zc = z.select(Axis(0), rows);
            let mean_c = zc
                .mean_axis(Axis(0))
                .ok_or_else(|| ReductionError::invalid("empty class"))?;

            // Within-class scatter (Sw)
            let deviations = &zc - &mean_c.view().insert_axis(Axis(0));
            ssw += &deviations.t().dot(&deviations);

            // Between-class scatter (Sb), weighted by class size
            let diff = &mean_c - &z_mean;
            let outer = diff
                .view()
                .insert_axis(Axis(1))
                .dot(&diff.view().insert_axis(Axis(0)));
            ssb.scaled_add(rows.len() as f64, &outer);

            means.row_mut(class_idx).assign(&mean_c);
            classes.push(label.clone());
        }

        log::debug!(
            "LDA on {}x{} with {} classes of sizes {:?}",
            n_samples,
            n_features,
            n_classes,
            groups.values().map(Vec::len).collect::<Vec<_>>()
        );

        // Solve the Sw^-1 * Sb eigenproblem
        let ssw_inv = checked_inverse(&ssw, self.singular_tolerance, WITHIN_SCATTER_STEP)?;
        let cov = ssw_inv.dot(&ssb);

        let pairs = self.solver.decompose(&cov)?;
        let total = pairs.values.iter().map(|v| v.max(0.0)).sum::<f64>();
        // Select top n_components
        let top = pairs.top(self.n_components)?;

        let explained_variance_ratio = if total > 0.0 {
            &top.values / total
        } else {
            Vector::zeros(self.n_components)
        };

        log::debug!("LDA kept eigenvalues {:?}", top.values);

        // Project the data and the class means
        Ok(LdaFit {
            transformed: z.dot(&top.vectors),
            centroids: means.dot(&top.vectors),
            scalings: top.vectors,
            eigenvalues: top.values,
            explained_variance_ratio,
            classes,
            scaler,
        })
    }

    pub fn transform<L: Ord + Clone>(&self, data: &Matrix, labels: &[L]) -> Result<Matrix> {
        Ok(self.fit(data, labels)?.transformed)
    }
}

/// Result of [`Lda::fit`].
#[derive(Clone, Debug)]
pub struct LdaFit<L> {
    /// Standardized data projected onto the discriminant axes, `m x k`.
    pub transformed: Matrix,
    /// Discriminant axes as columns, `n x k`, by descending separative power.
    pub scalings: Matrix,
    pub eigenvalues: Vector,
    pub explained_variance_ratio: Vector,
    /// Distinct labels in sorted order; row `i` of `centroids` belongs to
    /// `classes[i]`.
    pub classes: Vec<L>,
    /// Class means in the projected space, `c x k`.
    pub centroids: Matrix,
    scaler: StandardScaler,
}

impl<L: Clone + PartialEq> LdaFit<L> {
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn project(&self, data: &Matrix) -> Result<Matrix> {
        let z = self.scaler.transform(data)?;
        Ok(z.dot(&self.scalings))
    }

    /// Assigns every row to the class with the nearest projected centroid.
    pub fn predict(&self, data: &Matrix) -> Result<Vec<L>> {
        let projected = self.project(data)?;

        let predictions = projected
            .axis_iter(Axis(0))
            .map(|row| {
                let mut best = 0;
                let mut min_distance = f64::INFINITY;
                for (j, centroid) in self.centroids.axis_iter(Axis(0)).enumerate() {
                    let distance = (&row - &centroid).mapv(|x| x * x).sum();
                    if distance < min_distance {
                        min_distance = distance;
                        best = j;
                    }
                }
                self.classes[best].clone()
            })
            .collect();

        Ok(predictions)
    }

    /// Fraction of rows whose predicted class equals the given label.
    pub fn score(&self, data: &Matrix, labels: &[L]) -> Result<f64> {
        if labels.len() != data.nrows() {
            return Err(ReductionError::invalid(format!(
                "number of labels ({}) doesn't match number of samples ({})",
                labels.len(),
                data.nrows()
            )));
        }
        if labels.is_empty() {
            return Err(ReductionError::invalid("cannot score an empty sample"));
        }

        let predictions = self.predict(data)?;
        let correct = predictions
            .iter()
            .zip(labels)
            .filter(|(pred, actual)| pred == actual)
            .count();
        Ok(correct as f64 / labels.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::standardize;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, s};

    #[test]
    fn test_lda_basic() {
        let x = array![
            [1.0, 2.0],
            [2.0, 2.5],
            [3.0, 4.5],
            [8.0, 9.0],
            [9.0, 10.5],
            [10.0, 10.0]
        ];
        let y = [0, 0, 0, 1, 1, 1];

        let fit = Lda::new(1).fit(&x, &y).unwrap();

        assert_eq!(fit.transformed.shape(), &[6, 1]);
        assert_eq!(fit.scalings.shape(), &[2, 1]);
        assert_eq!(fit.classes, vec![0, 1]);
        assert!(fit.eigenvalues[0] > 0.0);
    }

    #[test]
    fn test_lda_selects_separating_axis() {
        // feature 0 separates the classes, feature 1 is noise shared by both
        let x = array![[1.0, 1.0], [1.5, -1.0], [5.0, -1.0], [5.5, 1.0]];
        let y = ["a", "a", "b", "b"];

        let fit = Lda::new(1).fit(&x, &y).unwrap();
        let projected = fit.transformed.column(0);

        assert_abs_diff_eq!(fit.scalings.column(0), array![1.0, 0.0], epsilon = 1e-8);
        let z = standardize(&x).unwrap();
        assert_abs_diff_eq!(projected, z.column(0), epsilon = 1e-8);

        let a = projected.slice(s![..2]);
        let b = projected.slice(s![2..]);
        let gap = (a.mean().unwrap() - b.mean().unwrap()).abs();
        let spread = (a[0] - a[1]).abs().max((b[0] - b[1]).abs());
        assert!(gap > spread);
    }

    #[test]
    fn test_lda_weak_separation_follows_fisher_direction() {
        // classes differ by 1e-5 along feature 0 and are correlated with
        // feature 1 differently, so every eigenvalue of Sw^-1 * Sb is tiny
        let n = 50;
        let mut x = Matrix::zeros((2 * n, 2));
        for i in 0..n {
            let base = ((i * 37) % n) as f64 / n as f64;
            x[[i, 0]] = base;
            x[[i, 1]] = ((i * 13) % n) as f64 / n as f64;
            x[[n + i, 0]] = base + 1e-5;
            x[[n + i, 1]] = ((i * 17) % n) as f64 / n as f64;
        }
        let y: Vec<u8> = (0..2 * n).map(|i| (i / n) as u8).collect();

        let fit = Lda::new(1).fit(&x, &y).unwrap();
        assert!(fit.eigenvalues[0] < 1e-6);

        let z = standardize(&x).unwrap();
        let mean_0 = z.slice(s![..n, ..]).mean_axis(Axis(0)).unwrap();
        let mean_1 = z.slice(s![n.., ..]).mean_axis(Axis(0)).unwrap();
        let dev_0 = &z.slice(s![..n, ..]) - &mean_0.view().insert_axis(Axis(0));
        let dev_1 = &z.slice(s![n.., ..]) - &mean_1.view().insert_axis(Axis(0));
        let ssw = dev_0.t().dot(&dev_0) + dev_1.t().dot(&dev_1);
        let fisher = checked_inverse(&ssw, 1e-12, WITHIN_SCATTER_STEP)
            .unwrap()
            .dot(&(&mean_1 - &mean_0));

        let axis = fit.scalings.column(0);
        let cosine = axis.dot(&fisher).abs() / (axis.dot(&axis).sqrt() * fisher.dot(&fisher).sqrt());
        assert!(cosine > 0.999, "cosine {}", cosine);
    }

    #[test]
    fn test_lda_three_classes() {
        let x = array![
            [1.0, 1.0],
            [2.0, 1.5],
            [5.0, 1.0],
            [5.5, 2.0],
            [1.0, 5.0],
            [1.5, 6.5]
        ];
        let y = [0, 0, 1, 1, 2, 2];

        let fit = Lda::new(2).fit(&x, &y).unwrap();

        assert_eq!(fit.transformed.shape(), &[6, 2]);
        assert_eq!(fit.centroids.shape(), &[3, 2]);
        assert!(fit.eigenvalues[0] >= fit.eigenvalues[1]);
    }

    #[test]
    fn test_lda_prediction() {
        let x = array![
            [1.0, 1.2],
            [2.0, 1.8],
            [1.5, 2.5],
            [8.0, 8.4],
            [9.0, 8.7],
            [8.5, 9.9]
        ];
        let y = ["low", "low", "low", "high", "high", "high"];

        let fit = Lda::new(1).fit(&x, &y).unwrap();

        let predictions = fit.predict(&array![[1.2, 1.6], [8.8, 9.1]]).unwrap();
        assert_eq!(predictions, vec!["low", "high"]);
        assert_abs_diff_eq!(fit.score(&x, &y).unwrap(), 1.0);
    }

    #[test]
    fn test_lda_more_components_than_classes_support() {
        let x = array![[1.0, 1.0], [1.5, -1.0], [5.0, -1.0], [5.5, 1.0]];
        let y = [0, 0, 1, 1];

        let fit = Lda::new(2).fit(&x, &y).unwrap();

        assert_eq!(fit.transformed.shape(), &[4, 2]);
        assert_abs_diff_eq!(fit.eigenvalues[1], 0.0, epsilon = 1e-8);
    }

    #[test]
    fn test_lda_insufficient_classes() {
        let x = array![[1.0, 2.0], [3.0, 4.5]];
        let y = [0, 0];

        assert!(matches!(
            Lda::new(1).fit(&x, &y),
            Err(ReductionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_lda_dimension_mismatch() {
        let x = array![[1.0, 2.0], [3.0, 4.5]];
        let y = [0];

        assert!(matches!(
            Lda::new(1).fit(&x, &y),
            Err(ReductionError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_lda_invalid_components() {
        let x = array![[1.0, 1.0], [1.5, -1.0], [5.0, -1.0], [5.5, 1.0]];
        let y = [0, 0, 1, 1];

        assert!(Lda::new(0).fit(&x, &y).is_err());
        assert!(Lda::new(3).fit(&x, &y).is_err());
    }

    #[test]
    fn test_lda_singular_within_scatter() {
        // two samples per class cannot span three features
        let x = array![
            [1.0, 2.0, 3.0],
            [2.0, 1.0, 5.0],
            [6.0, 7.0, 2.0],
            [7.0, 9.0, 1.0]
        ];
        let y = [0, 0, 1, 1];

        assert_eq!(
            Lda::new(1).fit(&x, &y).unwrap_err(),
            ReductionError::SingularMatrix { step: WITHIN_SCATTER_STEP }
        );
    }

    #[test]
    fn test_lda_singleton_class_is_singular() {
        let x = array![[1.0, 2.0], [2.0, 3.5], [8.0, 1.0]];
        let y = [0, 0, 1];

        assert!(matches!(
            Lda::new(1).fit(&x, &y),
            Err(ReductionError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn test_project_feature_mismatch() {
        let x = array![[1.0, 1.0], [1.5, -1.0], [5.0, -1.0], [5.5, 1.0]];
        let y = [0, 0, 1, 1];

        let fit = Lda::new(1).fit(&x, &y).unwrap();
        assert!(fit.project(&array![[1.0, 2.0, 3.0]]).is_err());
        assert!(fit.score(&x, &y[..2]).is_err());
    }
}
