//! Training of multinomial logistic regression models.
//!
//! The loss is the L2-regularized softmax cross-entropy
//! `Σ_i -log P(y_i | x_i) + ‖W‖² / (2C)`, with the intercepts left unpenalized. It is minimized
//! by L-BFGS through `linfa-logistic`.

use linfa::traits::Fit;
use linfa_logistic::MultiLogisticRegression;
use ndarray::{Array1, Array2};

use crate::dataset::Dataset;
use crate::errors::{Result, RlevError};
use crate::model::LogisticModel;

/// Default cost hyperparameter.
pub const DEFAULT_COST: f64 = 1e5;

/// Default tolerance of the gradient norm at termination.
pub const DEFAULT_EPSILON: f64 = 1e-4;

/// Default upper bound on optimizer iterations.
pub const DEFAULT_MAX_ITERATIONS: u64 = 100;

/// Trainer of [`LogisticModel`].
///
/// The solver works on a dense copy of the feature matrix, so memory grows with
/// `n_examples × n_features`.
///
/// # Examples
///
/// ```no_run
/// use std::fs::File;
///
/// use rlev::{Dataset, Trainer};
///
/// let mut f = File::open("word-feature-inputs.bin").unwrap();
/// let dataset = Dataset::read(&mut f).unwrap();
///
/// let trainer = Trainer::new(&dataset).unwrap();
/// let model = trainer.train(1e-4, 1e5, 100).unwrap();
///
/// let mut f = File::create("word-feature-model.bin").unwrap();
/// model.write(&mut f).unwrap();
/// ```
#[cfg_attr(docsrs, doc(cfg(feature = "train")))]
pub struct Trainer {
    n_classes: usize,
    xs: Array2<f64>,
    ys: Array1<usize>,
}

impl Trainer {
    /// Converts a dataset into the solver's input.
    ///
    /// # Errors
    ///
    /// [`RlevError::InvalidArgument`] is returned if the dataset is empty.
    pub fn new(dataset: &Dataset) -> Result<Self> {
        if dataset.is_empty() {
            return Err(RlevError::invalid_argument("dataset", "dataset is empty"));
        }
        let mut xs = Array2::zeros(dataset.shape());
        for (i, row) in dataset.features().rows().enumerate() {
            for (j, v) in row {
                xs[[i, usize::try_from(j)?]] = v;
            }
        }
        let ys = dataset
            .labels()
            .iter()
            .map(|&y| usize::try_from(y))
            .collect::<Result<Array1<usize>, _>>()?;
        Ok(Self {
            n_classes: dataset.label_counts().len(),
            xs,
            ys,
        })
    }

    /// Gets the number of classes, i.e., the largest label plus one.
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.xs.ncols()
    }

    // Labels present in the data, in ascending order.
    fn seen_classes(&self) -> Vec<usize> {
        let mut classes = self.ys.to_vec();
        classes.sort_unstable();
        classes.dedup();
        classes
    }

    /// Trains a model.
    ///
    /// # Arguments
    ///
    /// * `epsilon` - The tolerance of the gradient norm at termination.
    /// * `cost` - The parameter C. The weight penalty is `1 / C`.
    /// * `max_iterations` - The upper bound on optimizer iterations.
    ///
    /// # Errors
    ///
    /// [`RlevError::InvalidArgument`] is returned if `epsilon` or `cost` is not positive.
    /// [`RlevError::InvalidModel`] is returned if the optimizer fails.
    pub fn train(self, epsilon: f64, cost: f64, max_iterations: u64) -> Result<LogisticModel> {
        if epsilon.is_nan() || epsilon <= 0.0 {
            return Err(RlevError::invalid_argument("epsilon", "must be positive"));
        }
        if !cost.is_finite() || cost <= 0.0 {
            return Err(RlevError::invalid_argument(
                "cost",
                "must be a positive finite number",
            ));
        }
        let n_features = self.n_features();
        let classes = self.seen_classes();
        tracing::info!(
            n_examples = self.ys.len(),
            n_features,
            n_classes = self.n_classes,
            n_seen_classes = classes.len(),
            "start training"
        );

        let class_ids = classes
            .iter()
            .map(|&c| u32::try_from(c))
            .collect::<Result<Vec<u32>, _>>()?;
        if classes.len() == 1 {
            // A single class takes all the probability mass.
            tracing::warn!("only one class is present");
            return LogisticModel::new(
                self.n_classes,
                n_features,
                class_ids,
                vec![vec![0.0; n_features]],
                vec![0.0],
            );
        }

        let dataset = linfa::Dataset::new(self.xs, self.ys);
        let fitted = MultiLogisticRegression::default()
            .alpha(1.0 / cost)
            .gradient_tolerance(epsilon)
            .max_iterations(max_iterations)
            .fit(&dataset)
            .map_err(|e| RlevError::invalid_model(e.to_string()))?;

        // `params` is n_features × n_seen_classes, columns in ascending class order.
        let params = fitted.params();
        let intercept = fitted.intercept();
        if params.dim() != (n_features, classes.len()) || intercept.len() != classes.len() {
            return Err(RlevError::invalid_model(format!(
                "unexpected parameter shape {:?}",
                params.dim()
            )));
        }
        let weights = params.columns().into_iter().map(|w| w.to_vec()).collect();
        let bias = intercept.to_vec();
        tracing::info!(n_classes = classes.len(), "finish training");
        LogisticModel::new(self.n_classes, n_features, class_ids, weights, bias)
    }
}
