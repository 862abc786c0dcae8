//! Features of the combined model.
//!
//! A combined row holds the reference probabilities of a record followed by the class
//! probabilities of the word-feature model. Records with too few known words take the priors
//! instead of the word-feature prediction.

use crate::dataset::Dataset;
use crate::errors::{Result, RlevError};
use crate::matrix::SparseMatrix;
use crate::model::LogisticModel;
use crate::priors::Priors;
use crate::record::{Record, N_REFERENCE_PROBS};
use crate::vectorizer::CountVectorizer;

/// Word-feature stage of the classifier.
pub struct WordFeaturePredictor<'a> {
    title_vectorizer: &'a CountVectorizer,
    abstract_vectorizer: &'a CountVectorizer,
    model: &'a LogisticModel,
    priors: &'a Priors,
    min_word_features: usize,
}

impl<'a> WordFeaturePredictor<'a> {
    /// Creates a predictor.
    ///
    /// # Errors
    ///
    /// [`RlevError::DimensionMismatch`] is returned if the priors and the model disagree on the
    /// number of classes, or the model does not accept the vectorizers' features.
    pub fn new(
        title_vectorizer: &'a CountVectorizer,
        abstract_vectorizer: &'a CountVectorizer,
        model: &'a LogisticModel,
        priors: &'a Priors,
        min_word_features: usize,
    ) -> Result<Self> {
        if priors.len() != model.n_classes() {
            return Err(RlevError::dimension_mismatch(
                "classes",
                model.n_classes(),
                priors.len(),
            ));
        }
        let n_features = title_vectorizer.n_features() + abstract_vectorizer.n_features();
        if n_features != model.n_features() {
            return Err(RlevError::dimension_mismatch(
                "word features",
                model.n_features(),
                n_features,
            ));
        }
        Ok(Self {
            title_vectorizer,
            abstract_vectorizer,
            model,
            priors,
            min_word_features,
        })
    }

    /// Gets the number of classes.
    pub fn n_classes(&self) -> usize {
        self.model.n_classes()
    }

    /// Vectorizes a title and an abstract into word-feature columns.
    pub fn word_features(&self, title: &str, abstract_text: &str) -> Vec<(u32, f64)> {
        let offset = self.title_vectorizer.n_features() as u32;
        self.title_vectorizer
            .transform(title)
            .into_iter()
            .chain(
                self.abstract_vectorizer
                    .transform(abstract_text)
                    .into_iter()
                    .map(|i| i + offset),
            )
            .map(|i| (i, 1.0))
            .collect()
    }

    /// Predicts the class probabilities, falling back to the priors when fewer than
    /// `min_word_features` words are known.
    pub fn predict_proba(&self, title: &str, abstract_text: &str) -> Vec<f64> {
        let features = self.word_features(title, abstract_text);
        if features.len() < self.min_word_features {
            self.priors.as_slice().to_vec()
        } else {
            self.model.predict_proba(&features)
        }
    }

    /// Builds the combined feature row of a record.
    pub fn combined_row(&self, record: &Record) -> Vec<(u32, f64)> {
        let probs = self.predict_proba(&record.title, &record.abstract_text);
        record
            .reference_probs
            .iter()
            .chain(&probs)
            .enumerate()
            .map(|(i, &v)| (i as u32, v))
            .collect()
    }

    /// Gets the number of columns of a combined row.
    pub fn n_combined_features(&self) -> usize {
        N_REFERENCE_PROBS + self.n_classes()
    }

    /// Checks that `model` accepts the combined rows of this predictor.
    ///
    /// # Errors
    ///
    /// [`RlevError::DimensionMismatch`] is returned if the model expects a different number of
    /// features.
    pub fn check_combined_model(&self, model: &LogisticModel) -> Result<()> {
        if model.n_features() != self.n_combined_features() {
            return Err(RlevError::dimension_mismatch(
                "combined features",
                model.n_features(),
                self.n_combined_features(),
            ));
        }
        Ok(())
    }

    /// Builds the combined feature matrix of a batch.
    pub fn combined_features(&self, records: &[Record]) -> Result<SparseMatrix> {
        let mut matrix = SparseMatrix::new(self.n_combined_features());
        for record in records {
            matrix.push_row(self.combined_row(record))?;
        }
        Ok(matrix)
    }

    /// Builds combined training data from labeled records.
    ///
    /// Unlabeled records are skipped.
    pub fn combined_dataset(&self, records: &[Record]) -> Result<Dataset> {
        let labeled: Vec<Record> = records
            .iter()
            .filter(|r| r.rlev.is_some())
            .cloned()
            .collect();
        let labels = labeled.iter().filter_map(Record::class_id).collect();
        Dataset::from_parts(self.combined_features(&labeled)?, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::vectorizer::CountVectorizerBuilder;

    fn vectorizer(doc: &str) -> CountVectorizer {
        let mut builder = CountVectorizerBuilder::new(1);
        builder.add_document(doc);
        builder.build().unwrap()
    }

    fn record(rlev: Option<u32>, title: &str, abstract_text: &str) -> Record {
        Record {
            id: "W1".to_string(),
            rlev,
            year: 2020,
            reference_probs: [0.1, 0.2, 0.3, 0.4],
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
        }
    }

    struct Fixture {
        tv: CountVectorizer,
        av: CountVectorizer,
        model: LogisticModel,
        priors: Priors,
    }

    fn fixture() -> Fixture {
        let tv = vectorizer("enzyme kinetics");
        let av = vectorizer("binding assay");
        // features: enzyme kinetics | assay binding
        let model = LogisticModel::new(
            2,
            4,
            vec![0, 1],
            vec![vec![1.0, 1.0, -1.0, -1.0], vec![-1.0, -1.0, 1.0, 1.0]],
            vec![0.0, 0.0],
        )
        .unwrap();
        let priors = Priors::from_labels([1, 1, 1, 2], 0.0).unwrap();
        Fixture { tv, av, model, priors }
    }

    #[test]
    fn test_fallback_to_priors() {
        let f = fixture();
        let p = WordFeaturePredictor::new(&f.tv, &f.av, &f.model, &f.priors, 2).unwrap();

        assert_eq!(vec![0.75, 0.25], p.predict_proba("enzyme", "unknown words"));
        let row = p.combined_row(&record(Some(1), "enzyme", ""));
        let values: Vec<f64> = row.iter().map(|&(_, v)| v).collect();
        assert_eq!(vec![0.1, 0.2, 0.3, 0.4, 0.75, 0.25], values);
    }

    #[test]
    fn test_word_model_above_threshold() {
        let f = fixture();
        let p = WordFeaturePredictor::new(&f.tv, &f.av, &f.model, &f.priors, 2).unwrap();

        let features = p.word_features("Enzyme kinetics", "assay");
        assert_eq!(vec![(0, 1.0), (1, 1.0), (2, 1.0)], features);
        let probs = p.predict_proba("Enzyme kinetics", "assay");
        assert_eq!(f.model.predict_proba(&features), probs);
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn test_class_count_mismatch() {
        let f = fixture();
        let priors = Priors::from_labels([1, 2, 3], 0.0).unwrap();
        match WordFeaturePredictor::new(&f.tv, &f.av, &f.model, &priors, 2) {
            Err(RlevError::DimensionMismatch(e)) => {
                assert_eq!(2, e.expected());
                assert_eq!(3, e.actual());
            }
            _ => panic!("class count mismatch not detected"),
        }
        assert!(WordFeaturePredictor::new(&f.tv, &f.tv, &f.model, &f.priors, 2).is_ok());
        let wide = vectorizer("alpha beta gamma");
        assert!(WordFeaturePredictor::new(&wide, &f.av, &f.model, &f.priors, 2).is_err());
    }

    #[test]
    fn test_check_combined_model() {
        let f = fixture();
        let p = WordFeaturePredictor::new(&f.tv, &f.av, &f.model, &f.priors, 2).unwrap();
        let fits = LogisticModel::new(2, 6, vec![0, 1], vec![vec![0.0; 6]; 2], vec![0.0; 2]);
        p.check_combined_model(&fits.unwrap()).unwrap();
        let narrow = LogisticModel::new(2, 5, vec![0, 1], vec![vec![0.0; 5]; 2], vec![0.0; 2]);
        assert!(matches!(
            p.check_combined_model(&narrow.unwrap()),
            Err(RlevError::DimensionMismatch(_))
        ));
    }

    #[test]
    fn test_combined_dataset() {
        let f = fixture();
        let p = WordFeaturePredictor::new(&f.tv, &f.av, &f.model, &f.priors, 0).unwrap();
        let d = p
            .combined_dataset(&[
                record(Some(2), "enzyme", "binding"),
                record(None, "enzyme", "binding"),
                record(Some(1), "", ""),
            ])
            .unwrap();
        assert_eq!((2, 6), d.shape());
        assert_eq!(&[1, 0], d.labels());
    }
}
