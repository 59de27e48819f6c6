use crate::error::{ReductionError, Result};
use crate::linalg::ensure_finite;
use crate::{Matrix, Vector};
use ndarray::Axis;

/// Per-feature zero-mean / unit-variance scaling.
///
/// The standard deviation is the population one (`ddof = 0`). A column that
/// is constant, or whose deviation is below rounding relative to its largest
/// magnitude, is rejected with [`ReductionError::DegenerateInput`] rather than
/// divided through into NaN. Columns measured in tiny units are kept.
#[derive(Clone, Debug, Default)]
pub struct StandardScaler {
    mean: Option<Vector>,
    std: Option<Vector>,
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            mean: None,
            std: None,
        }
    }

    pub fn fit(&mut self, data: &Matrix) -> Result<()> {
        ensure_finite(data)?;
        let mean = data
            .mean_axis(Axis(0))
            .ok_or_else(|| ReductionError::invalid("cannot standardize a matrix with no samples"))?;
        let std = data.std_axis(Axis(0), 0.0);

        for (feature, (column, &s)) in data.axis_iter(Axis(1)).zip(std.iter()).enumerate() {
            let first = column[0];
            let constant = column.iter().all(|&v| v == first);
            // rounding noise is judged against the column's own magnitude
            let max_abs = column.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
            if constant || s <= f64::EPSILON * max_abs {
                return Err(ReductionError::DegenerateInput { feature });
            }
        }

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    pub fn transform(&self, data: &Matrix) -> Result<Matrix> {
        let (mean, std) = match (self.mean.as_ref(), self.std.as_ref()) {
            (Some(mean), Some(std)) => (mean, std),
            _ => return Err(ReductionError::invalid("scaler not fitted; call fit() first")),
        };

        if data.ncols() != mean.len() {
            return Err(ReductionError::invalid(format!(
                "number of features ({}) doesn't match the fitted scaler ({})",
                data.ncols(),
                mean.len()
            )));
        }

        let mut result = data.clone();
        for mut row in result.axis_iter_mut(Axis(0)) {
            row -= mean;
            row /= std;
        }

        Ok(result)
    }

    pub fn fit_transform(&mut self, data: &Matrix) -> Result<Matrix> {
        self.fit(data)?;
        self.transform(data)
    }

    pub fn mean(&self) -> Option<&Vector> {
        self.mean.as_ref()
    }

    pub fn std(&self) -> Option<&Vector> {
        self.std.as_ref()
    }
}

/// One-shot `(data - mean) / std`, broadcast across rows.
pub fn standardize(data: &Matrix) -> Result<Matrix> {
    StandardScaler::new().fit_transform(data)
}
