//! Feature matrices paired with class labels.

use std::io::{Read, Write};

use bincode::{Decode, Encode};

use crate::errors::{Result, RlevError};
use crate::matrix::{MatrixData, SparseMatrix};
use crate::record::{LabeledText, MAX_RLEV};
use crate::vectorizer::CountVectorizer;

/// Default number of input lines processed at once.
pub const DEFAULT_BATCH_SIZE: usize = 100_000;

/// Default minimum number of known words a document needs to be classified by its words.
pub const DEFAULT_MIN_WORD_FEATURES: usize = 2;

/// Training data: one matrix row per example and a 0-indexed class id per row.
#[derive(Clone, Debug, PartialEq)]
pub struct Dataset {
    features: SparseMatrix,
    labels: Vec<u32>,
}

#[derive(Decode, Encode)]
struct DatasetData {
    features: MatrixData,
    labels: Vec<u32>,
}

fn check_labels(labels: &[u32]) -> Result<()> {
    match labels.iter().find(|&&label| label >= MAX_RLEV) {
        Some(label) => Err(RlevError::invalid_argument(
            "labels",
            format!("class id {label} is not below {MAX_RLEV}"),
        )),
        None => Ok(()),
    }
}

impl Dataset {
    /// Creates an empty dataset with `n_features` columns.
    pub fn new(n_features: usize) -> Self {
        Self {
            features: SparseMatrix::new(n_features),
            labels: vec![],
        }
    }

    /// Pairs a matrix with its labels.
    ///
    /// # Errors
    ///
    /// [`RlevError::DimensionMismatch`] is returned if the lengths differ.
    /// [`RlevError::InvalidArgument`] is returned if a class id is not below `MAX_RLEV`.
    pub fn from_parts(features: SparseMatrix, labels: Vec<u32>) -> Result<Self> {
        if features.n_rows() != labels.len() {
            return Err(RlevError::dimension_mismatch(
                "labels",
                features.n_rows(),
                labels.len(),
            ));
        }
        check_labels(&labels)?;
        Ok(Self { features, labels })
    }

    pub fn features(&self) -> &SparseMatrix {
        &self.features
    }

    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns `(n_rows, n_cols)` of the feature matrix.
    pub fn shape(&self) -> (usize, usize) {
        self.features.shape()
    }

    /// Gets the number of rows per class id, up to the largest label.
    pub fn label_counts(&self) -> Vec<usize> {
        // Class ids are below MAX_RLEV, so the vector stays small.
        let n_classes = self.labels.iter().max().map_or(0, |&max| max as usize + 1);
        let mut counts = vec![0; n_classes];
        for &label in &self.labels {
            counts[label as usize] += 1;
        }
        counts
    }

    /// Appends the rows of `other`.
    ///
    /// # Errors
    ///
    /// [`RlevError::DimensionMismatch`] is returned if the column counts differ.
    pub fn append(&mut self, other: &Self) -> Result<()> {
        self.features.append(&other.features)?;
        self.labels.extend_from_slice(&other.labels);
        Ok(())
    }

    /// Exports the dataset.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        let data = DatasetData {
            features: self.features.to_data(),
            labels: self.labels.clone(),
        };
        bincode::encode_into_std_write(data, wtr, bincode::config::standard())?;
        Ok(())
    }

    /// Creates a dataset from a reader.
    ///
    /// # Errors
    ///
    /// [`RlevError::InvalidModel`] is returned if the stored matrix is broken, and
    /// [`RlevError::DimensionMismatch`] or [`RlevError::InvalidArgument`] if the labels do not
    /// fit it. When `rdr` generates an error, it will be returned as is.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let data: DatasetData = bincode::decode_from_std_read(rdr, bincode::config::standard())?;
        Self::from_parts(SparseMatrix::from_data(data.features)?, data.labels)
    }
}

/// Statistics of one processed batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub n_rows: usize,
    pub n_dropped: usize,
}

/// Accumulates word-feature training data batch by batch.
///
/// Each row holds the title vocabulary columns followed by the abstract vocabulary columns.
/// Rows with fewer nonzero columns than `min_word_features` are discarded.
pub struct WordFeatureDatasetBuilder<'a> {
    title_vectorizer: &'a CountVectorizer,
    abstract_vectorizer: &'a CountVectorizer,
    min_word_features: usize,
    dataset: Dataset,
}

impl<'a> WordFeatureDatasetBuilder<'a> {
    pub fn new(
        title_vectorizer: &'a CountVectorizer,
        abstract_vectorizer: &'a CountVectorizer,
        min_word_features: usize,
    ) -> Self {
        Self {
            title_vectorizer,
            abstract_vectorizer,
            min_word_features,
            dataset: Dataset::new(
                title_vectorizer.n_features() + abstract_vectorizer.n_features(),
            ),
        }
    }

    /// Vectorizes a batch and appends the rows that have enough word features.
    pub fn push_batch(&mut self, batch: &[LabeledText]) -> Result<BatchSummary> {
        let titles: Vec<&str> = batch.iter().map(|t| t.title.as_str()).collect();
        let abstracts: Vec<&str> = batch.iter().map(|t| t.abstract_text.as_str()).collect();
        let features = self
            .title_vectorizer
            .transform_batch(&titles)?
            .hstack(&self.abstract_vectorizer.transform_batch(&abstracts)?)?;
        let mask: Vec<bool> = features
            .row_nnz()
            .into_iter()
            .map(|n| n >= self.min_word_features)
            .collect();
        let labels = batch
            .iter()
            .zip(&mask)
            .filter(|(_, keep)| **keep)
            .map(|(t, _)| t.class_id())
            .collect();
        let kept = Dataset::from_parts(features.filter_rows(&mask), labels)?;
        self.dataset.append(&kept)?;
        let summary = BatchSummary {
            n_rows: kept.len(),
            n_dropped: batch.len() - kept.len(),
        };
        tracing::debug!(?summary, "batch processed");
        Ok(summary)
    }

    /// Gets the number of rows kept so far.
    pub fn n_rows(&self) -> usize {
        self.dataset.len()
    }

    pub fn finish(self) -> Dataset {
        self.dataset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::vectorizer::CountVectorizerBuilder;

    fn vectorizer(docs: &[&str]) -> CountVectorizer {
        let mut builder = CountVectorizerBuilder::new(1);
        for doc in docs {
            builder.add_document(doc);
        }
        builder.build().unwrap()
    }

    fn text(rlev: u32, title: &str, abstract_text: &str) -> LabeledText {
        LabeledText {
            rlev,
            title: title.to_string(),
            abstract_text: abstract_text.to_string(),
        }
    }

    #[test]
    fn test_label_counts() {
        let mut m = SparseMatrix::new(1);
        for _ in 0..4 {
            m.push_row([(0, 1.0)]).unwrap();
        }
        let d = Dataset::from_parts(m, vec![2, 0, 2, 2]).unwrap();
        assert_eq!(vec![1, 0, 3], d.label_counts());
        assert!(Dataset::from_parts(SparseMatrix::new(1), vec![0]).is_err());
    }

    #[test]
    fn test_huge_label_rejected() {
        let mut m = SparseMatrix::new(1);
        m.push_row([(0, 1.0)]).unwrap();
        m.push_row([(0, 1.0)]).unwrap();
        assert!(matches!(
            Dataset::from_parts(m.clone(), vec![0, 4_000_000_000]),
            Err(RlevError::InvalidArgument(_))
        ));
        assert!(Dataset::from_parts(m.clone(), vec![0, MAX_RLEV]).is_err());

        // a stored dataset with an oversized label is rejected on read
        let data = DatasetData {
            features: m.to_data(),
            labels: vec![0, 4_000_000_000],
        };
        let mut buf = vec![];
        bincode::encode_into_std_write(data, &mut buf, bincode::config::standard()).unwrap();
        assert!(Dataset::read(&mut buf.as_slice()).is_err());
    }

    #[test]
    fn test_builder_drops_sparse_rows() {
        let tv = vectorizer(&["cancer therapy"]);
        let av = vectorizer(&["tumor growth model"]);
        let mut builder = WordFeatureDatasetBuilder::new(&tv, &av, 2);

        let summary = builder
            .push_batch(&[
                text(1, "cancer therapy", "tumor"),
                text(2, "nothing known", "growth"),
                text(3, "", ""),
            ])
            .unwrap();
        assert_eq!(BatchSummary { n_rows: 1, n_dropped: 2 }, summary);

        let summary = builder
            .push_batch(&[text(2, "therapy", "model growth")])
            .unwrap();
        assert_eq!(BatchSummary { n_rows: 1, n_dropped: 0 }, summary);

        let d = builder.finish();
        assert_eq!((2, 5), d.shape());
        assert_eq!(&[0, 1], d.labels());
        // title: cancer=0 therapy=1; abstract: growth=2 model=3 tumor=4
        assert_eq!(Some(vec![(0, 1.0), (1, 1.0), (4, 1.0)]), d.features().row(0));
        assert_eq!(Some(vec![(1, 1.0), (2, 1.0), (3, 1.0)]), d.features().row(1));
    }

    #[test]
    fn test_builder_keeps_all_rows_without_threshold() {
        let tv = vectorizer(&["alpha"]);
        let av = vectorizer(&["beta"]);
        let mut builder = WordFeatureDatasetBuilder::new(&tv, &av, 0);
        builder
            .push_batch(&[text(1, "", ""), text(3, "gamma", "delta"), text(3, "alpha", "")])
            .unwrap();
        let d = builder.finish();
        assert_eq!(3, d.len());
        assert_eq!(vec![1, 0, 2], d.label_counts());
    }

    #[test]
    fn test_write_read() {
        let tv = vectorizer(&["alpha"]);
        let av = vectorizer(&["beta"]);
        let mut builder = WordFeatureDatasetBuilder::new(&tv, &av, 1);
        builder.push_batch(&[text(2, "alpha", "beta")]).unwrap();
        let d = builder.finish();

        let mut buf = vec![];
        d.write(&mut buf).unwrap();
        assert_eq!(d, Dataset::read(&mut buf.as_slice()).unwrap());
    }
}
