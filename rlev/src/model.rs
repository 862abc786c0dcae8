//! Multinomial logistic regression model.
//!
//! A model holds one weight vector and one bias per class seen in training. Scores
//! `z_k = w_k·x + b_k` are turned into probabilities with the softmax function, and classes
//! without parameters always get probability 0.

use std::io::{Read, Write};

use bincode::{Decode, Encode};

use crate::errors::{Result, RlevError};
use crate::matrix::SparseMatrix;

/// Computes `exp(z_k) / Σ_j exp(z_j)` in place.
fn softmax(scores: &mut [f64]) {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut total = 0.0;
    for s in scores.iter_mut() {
        *s = (*s - max).exp();
        total += *s;
    }
    for s in scores.iter_mut() {
        *s /= total;
    }
}

/// Multinomial (softmax) logistic regression model.
///
/// `P(k | x) = exp(w_k·x + b_k) / Σ_j exp(w_j·x + b_j)` over the classes seen in training.
#[derive(Clone, Debug, PartialEq, Decode, Encode)]
pub struct LogisticModel {
    pub(crate) n_classes: usize,
    pub(crate) n_features: usize,

    // Class ids in the order of `weights` and `bias`.
    pub(crate) classes: Vec<u32>,

    pub(crate) weights: Vec<Vec<f64>>,
    pub(crate) bias: Vec<f64>,
}

impl LogisticModel {
    /// Creates a model from per-class parameters.
    ///
    /// # Arguments
    ///
    /// * `n_classes` - The number of classes, including the ones without parameters.
    /// * `classes` - Class ids having parameters.
    /// * `weights` - A weight vector of length `n_features` for each entry of `classes`.
    /// * `bias` - A bias term for each entry of `classes`.
    ///
    /// # Errors
    ///
    /// [`RlevError::InvalidModel`] is returned if the dimensions are inconsistent.
    pub fn new(
        n_classes: usize,
        n_features: usize,
        classes: Vec<u32>,
        weights: Vec<Vec<f64>>,
        bias: Vec<f64>,
    ) -> Result<Self> {
        let model = Self {
            n_classes,
            n_features,
            classes,
            weights,
            bias,
        };
        model.validate()?;
        Ok(model)
    }

    fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(RlevError::invalid_model("no class is given"));
        }
        if self.weights.len() != self.classes.len() || self.bias.len() != self.classes.len() {
            return Err(RlevError::invalid_model(
                "the number of weight vectors must match the number of classes",
            ));
        }
        if self.weights.iter().any(|w| w.len() != self.n_features) {
            return Err(RlevError::invalid_model(format!(
                "weight vectors must have {} elements",
                self.n_features
            )));
        }
        for &cls in &self.classes {
            if usize::try_from(cls)? >= self.n_classes {
                return Err(RlevError::invalid_model(format!(
                    "class {cls} is out of range (n_classes = {})",
                    self.n_classes
                )));
            }
        }
        Ok(())
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Gets the class ids seen in training.
    pub fn classes(&self) -> &[u32] {
        &self.classes
    }

    /// Computes the decision value of each class seen in training.
    ///
    /// Features beyond `n_features` are ignored.
    pub fn decision_values(&self, features: &[(u32, f64)]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(w, &b)| {
                features
                    .iter()
                    .filter_map(|&(i, v)| w.get(i as usize).map(|w| w * v))
                    .sum::<f64>()
                    + b
            })
            .collect()
    }

    /// Predicts the probability of every class.
    ///
    /// # Returns
    ///
    /// A vector of length `n_classes` summing to 1.
    pub fn predict_proba(&self, features: &[(u32, f64)]) -> Vec<f64> {
        let mut scores = self.decision_values(features);
        softmax(&mut scores);
        let mut probs = vec![0.0; self.n_classes];
        for (&cls, p) in self.classes.iter().zip(scores) {
            probs[cls as usize] = p;
        }
        probs
    }

    /// Predicts the probabilities of each row of `features`.
    pub fn predict_proba_matrix(&self, features: &SparseMatrix) -> Vec<Vec<f64>> {
        features.rows().map(|row| self.predict_proba(&row)).collect()
    }

    /// Exports the model data.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        bincode::encode_into_std_write(self, wtr, bincode::config::standard())?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error, it will be returned as is.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let model: Self = bincode::decode_from_std_read(rdr, bincode::config::standard())?;
        model.validate()?;
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LogisticModel {
        // class 1 is never seen
        LogisticModel::new(
            3,
            2,
            vec![0, 2],
            vec![vec![2.0, -1.0], vec![-2.0, 1.0]],
            vec![0.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn test_predict_proba() {
        let model = sample();
        let probs = model.predict_proba(&[(0, 1.0)]);
        assert_eq!(3, probs.len());
        assert_eq!(0.0, probs[1]);
        assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(probs[0] > probs[2]);

        let probs = model.predict_proba(&[]);
        assert!((probs[0] - 0.5).abs() < 1e-12);
        assert!((probs[2] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_predict_proba_is_softmax() {
        let model = sample();
        // z_0 = 2, z_2 = -2
        let probs = model.predict_proba(&[(0, 1.0)]);
        let expected = 1.0 / (1.0 + (-4.0f64).exp());
        assert!((probs[0] - expected).abs() < 1e-12);
        assert!((probs[2] - (1.0 - expected)).abs() < 1e-12);
    }

    #[test]
    fn test_softmax_large_scores() {
        let model = LogisticModel::new(
            2,
            1,
            vec![0, 1],
            vec![vec![1000.0], vec![-1000.0]],
            vec![0.0, 0.0],
        )
        .unwrap();
        let probs = model.predict_proba(&[(0, 1.0)]);
        assert_eq!(vec![1.0, 0.0], probs);
    }

    #[test]
    fn test_out_of_range_features_ignored() {
        let model = sample();
        assert_eq!(
            model.predict_proba(&[(1, 1.0)]),
            model.predict_proba(&[(1, 1.0), (7, 5.0)])
        );
    }

    #[test]
    fn test_invalid_dimensions() {
        assert!(LogisticModel::new(2, 2, vec![0], vec![vec![1.0]], vec![0.0]).is_err());
        assert!(LogisticModel::new(1, 1, vec![1], vec![vec![1.0]], vec![0.0]).is_err());
        assert!(LogisticModel::new(2, 1, vec![0, 1], vec![vec![1.0]], vec![0.0]).is_err());
    }

    #[test]
    fn test_write_read() {
        let model = sample();
        let mut buf = vec![];
        model.write(&mut buf).unwrap();
        assert_eq!(model, LogisticModel::read(&mut buf.as_slice()).unwrap());
    }
}
