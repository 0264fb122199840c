use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogRegParams {
    /// Inverse of the regularisation strength C; the penalty is 0.5 * l2 * |W|^2
    /// on the summed loss, so it fades as the sample grows.
    pub l2: f64,
    pub max_iters: usize,
    pub learning_rate: f64,
    /// Stop once every gradient component is below this.
    pub tol: f64,
}

impl Default for LogRegParams {
    fn default() -> Self {
        Self {
            l2: 1.0,
            max_iters: 2000,
            learning_rate: 0.5,
            tol: 1e-5,
        }
    }
}

/// Multinomial logistic regression over standardised inputs.
///
/// Classes are the distinct training labels in sorted order; `predict_proba`
/// returns one probability per class in that order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    classes: Vec<String>,
    feature_means: Vec<f64>,
    feature_stds: Vec<f64>,
    coeffs: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    #[serde(default)]
    iterations: usize,
    #[serde(default)]
    train_log_loss: f64,
}

impl LogisticRegression {
    pub fn fit<S: AsRef<str>>(
        x: &[Vec<f64>],
        y: &[S],
        params: &LogRegParams,
    ) -> Result<Self, ModelError> {
        if x.is_empty() {
            return Err(ModelError::EmptyTrainingSet);
        }
        if x.len() != y.len() {
            return Err(ModelError::LabelCountMismatch {
                samples: x.len(),
                labels: y.len(),
            });
        }
        let width = x[0].len();
        if let Some(bad) = x.iter().find(|row| row.len() != width) {
            return Err(ModelError::DimensionMismatch {
                expected: width,
                got: bad.len(),
            });
        }

        let classes: Vec<String> = y
            .iter()
            .map(|s| s.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if classes.len() < 2 {
            return Err(ModelError::SingleClass(classes[0].clone()));
        }
        let targets: Vec<usize> = y
            .iter()
            .map(|s| {
                classes
                    .binary_search_by(|c| c.as_str().cmp(s.as_ref()))
                    .unwrap_or_default()
            })
            .collect();

        let (feature_means, feature_stds) = norm_stats(x, width);
        let xs: Vec<Vec<f64>> = x
            .iter()
            .map(|row| standardize(row, &feature_means, &feature_stds))
            .collect();

        let n = xs.len() as f64;
        let k = classes.len();
        let penalty = params.l2 / n;
        let mut coeffs = vec![vec![0.0; width]; k];
        let mut intercepts = vec![0.0; k];
        let mut iterations = 0usize;

        for iter in 0..params.max_iters {
            iterations = iter + 1;
            let mut grad_w = vec![vec![0.0; width]; k];
            let mut grad_b = vec![0.0; k];

            for (row, &target) in xs.iter().zip(&targets) {
                let probs = softmax(&logits(&coeffs, &intercepts, row));
                for class in 0..k {
                    let dz = probs[class] - if class == target { 1.0 } else { 0.0 };
                    grad_b[class] += dz;
                    for (g, xj) in grad_w[class].iter_mut().zip(row) {
                        *g += dz * xj;
                    }
                }
            }

            let lr = params.learning_rate / (1.0 + iter as f64 * 0.001);
            let mut max_grad = 0.0_f64;
            for class in 0..k {
                let gb = grad_b[class] / n;
                max_grad = max_grad.max(gb.abs());
                intercepts[class] -= lr * gb;
                for j in 0..width {
                    let g = grad_w[class][j] / n + penalty * coeffs[class][j];
                    max_grad = max_grad.max(g.abs());
                    coeffs[class][j] -= lr * g;
                }
            }
            if max_grad < params.tol {
                break;
            }
        }

        let mut model = Self {
            classes,
            feature_means,
            feature_stds,
            coeffs,
            intercepts,
            iterations,
            train_log_loss: 0.0,
        };
        model.train_log_loss = model.log_loss_standardized(&xs, &targets);
        Ok(model)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.feature_means.len()
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn train_log_loss(&self) -> f64 {
        self.train_log_loss
    }

    pub fn class_index(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    pub fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, ModelError> {
        if x.len() != self.n_features() {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features(),
                got: x.len(),
            });
        }
        let row = standardize(x, &self.feature_means, &self.feature_stds);
        let probs = softmax(&logits(&self.coeffs, &self.intercepts, &row));
        if probs.iter().any(|p| !p.is_finite()) {
            return Err(ModelError::NonFinite);
        }
        Ok(probs)
    }

    /// Most likely class; ties resolve to the earliest class in sorted order.
    pub fn predict(&self, x: &[f64]) -> Result<&str, ModelError> {
        let probs = self.predict_proba(x)?;
        let mut best = 0usize;
        for (idx, p) in probs.iter().enumerate() {
            if *p > probs[best] {
                best = idx;
            }
        }
        Ok(&self.classes[best])
    }

    fn log_loss_standardized(&self, xs: &[Vec<f64>], targets: &[usize]) -> f64 {
        if xs.is_empty() {
            return f64::INFINITY;
        }
        let sum: f64 = xs
            .iter()
            .zip(targets)
            .map(|(row, &t)| {
                let probs = softmax(&logits(&self.coeffs, &self.intercepts, row));
                -probs[t].max(1e-12).ln()
            })
            .sum();
        sum / xs.len() as f64
    }
}

fn norm_stats(x: &[Vec<f64>], width: usize) -> (Vec<f64>, Vec<f64>) {
    let n = x.len() as f64;
    let mut mean = vec![0.0; width];
    for row in x {
        for (m, v) in mean.iter_mut().zip(row) {
            *m += v;
        }
    }
    for m in &mut mean {
        *m /= n;
    }

    let mut std = vec![0.0; width];
    for row in x {
        for j in 0..width {
            let d = row[j] - mean[j];
            std[j] += d * d;
        }
    }
    for s in &mut std {
        *s = (*s / n).sqrt();
        // Constant columns carry no signal; leave them unscaled.
        if *s < 1e-9 {
            *s = 1.0;
        }
    }
    (mean, std)
}

fn standardize(row: &[f64], mean: &[f64], std: &[f64]) -> Vec<f64> {
    row.iter()
        .zip(mean.iter().zip(std))
        .map(|(v, (m, s))| (v - m) / s)
        .collect()
}

fn logits(coeffs: &[Vec<f64>], intercepts: &[f64], row: &[f64]) -> Vec<f64> {
    coeffs
        .iter()
        .zip(intercepts)
        .map(|(w, b)| b + w.iter().zip(row).map(|(wj, xj)| wj * xj).sum::<f64>())
        .collect()
}

fn softmax(z: &[f64]) -> Vec<f64> {
    let mx = z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = z.iter().map(|v| (v - mx).exp()).collect();
    let den = exps.iter().sum::<f64>().max(1e-300);
    exps.into_iter().map(|e| e / den).collect()
}
