use ndarray::{Array1, ArrayView1, ArrayView2};

/// Training knobs for [`LogisticRegression::fit`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticParams {
    /// Inverse L2 strength; the intercept is never penalized
    pub regularization: f64,
    pub max_iterations: usize,
    /// Stop once the gradient's max-abs component falls below this
    pub tolerance: f64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        Self {
            regularization: 1.0,
            max_iterations: 1000,
            tolerance: 1e-6,
        }
    }
}

/// Binary L2-regularized logistic regression.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticRegression {
    weights: Array1<f64>,
    intercept: f64,
    iterations: usize,
}

impl LogisticRegression {
    /// Full-batch gradient descent on the mean log-loss plus
    /// `||w||^2 / (2 C n)`, with a fixed step of `1 / L`.
    ///
    /// `L` bounds the Lipschitz constant of the gradient through the squared
    /// Frobenius norm of the design matrix, so every step decreases the loss.
    /// Deterministic for a given input.
    pub fn fit(x: ArrayView2<f64>, y: ArrayView1<f64>, params: LogisticParams) -> Self {
        let (rows, columns) = x.dim();
        let mut weights = Array1::<f64>::zeros(columns);
        let mut intercept = 0.0;
        if rows == 0 {
            return Self {
                weights,
                intercept,
                iterations: 0,
            };
        }

        let n = rows as f64;
        let penalty = 1.0 / (params.regularization.max(f64::EPSILON) * n);
        // intercept column of ones contributes 1 to ||X||_F^2 / n
        let lipschitz = 0.25 * (x.mapv(|v| v * v).sum() / n + 1.0) + penalty;
        let step = 1.0 / lipschitz;

        let mut iterations = 0;
        while iterations < params.max_iterations {
            iterations += 1;

            let logits = x.dot(&weights) + intercept;
            let residual = logits.mapv(sigmoid) - y;

            let grad_w = x.t().dot(&residual) / n + &weights * penalty;
            let grad_b = residual.sum() / n;

            weights.scaled_add(-step, &grad_w);
            intercept -= step * grad_b;

            let largest = grad_w
                .iter()
                .fold(grad_b.abs(), |acc, g| acc.max(g.abs()));
            if largest < params.tolerance {
                break;
            }
        }

        Self {
            weights,
            intercept,
            iterations,
        }
    }

    /// Probability of the positive class for one standardized row.
    pub fn predict_proba(&self, row: ArrayView1<f64>) -> f64 {
        sigmoid(row.dot(&self.weights) + self.intercept)
    }

    pub fn predict_proba_batch(&self, x: ArrayView2<f64>) -> Array1<f64> {
        (x.dot(&self.weights) + self.intercept).mapv(sigmoid)
    }

    pub fn weights(&self) -> &Array1<f64> {
        &self.weights
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
