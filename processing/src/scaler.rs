use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Per-column standardizer (zero mean, unit variance) fitted on training data.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Fits column means and population standard deviations.
    ///
    /// Constant columns get a scale of 1 so they transform to 0.
    pub fn fit(matrix: ArrayView2<f64>) -> Self {
        let columns = matrix.ncols();
        let mean = matrix
            .mean_axis(Axis(0))
            .unwrap_or_else(|| Array1::zeros(columns));
        let scale = if matrix.nrows() == 0 {
            Array1::ones(columns)
        } else {
            matrix
                .std_axis(Axis(0), 0.0)
                .mapv(|s| if s > f64::EPSILON { s } else { 1.0 })
        };
        Self { mean, scale }
    }

    pub fn transform(&self, matrix: ArrayView2<f64>) -> Array2<f64> {
        (&matrix - &self.mean) / &self.scale
    }

    pub fn transform_row(&self, row: ArrayView1<f64>) -> Array1<f64> {
        (&row - &self.mean) / &self.scale
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }
}
