//! Binary bag-of-words vectorizer.

use std::io::{Read, Write};
use std::sync::OnceLock;

use bincode::{Decode, Encode};
use hashbrown::{HashMap, HashSet};
use regex::Regex;

use crate::errors::{Result, RlevError};
use crate::matrix::SparseMatrix;
use crate::stop_words::is_stop_word;

/// Default minimum document frequency of a vocabulary term.
pub const DEFAULT_MIN_DF: usize = 250;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").unwrap())
}

/// Splits `text` into lowercased terms, dropping stop words.
///
/// Terms are returned in order of appearance and may repeat.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|term| !is_stop_word(term))
        .map(str::to_string)
        .collect()
}

/// Builder of [`CountVectorizer`].
///
/// # Examples
///
/// ```
/// use rlev::CountVectorizerBuilder;
///
/// let mut builder = CountVectorizerBuilder::new(2);
/// builder.add_document("Protein folding dynamics");
/// builder.add_document("Folding of a protein chain");
/// builder.add_document("Unrelated text");
/// let vectorizer = builder.build().unwrap();
///
/// assert_eq!(&["folding", "protein"], vectorizer.vocabulary());
/// assert_eq!(vec![1], vectorizer.transform("PROTEIN structure"));
/// ```
pub struct CountVectorizerBuilder {
    min_df: usize,
    n_documents: usize,
    document_frequencies: HashMap<String, usize>,
}

impl CountVectorizerBuilder {
    /// Creates a new builder.
    ///
    /// # Arguments
    ///
    /// * `min_df` - Terms occurring in fewer documents than this value are discarded.
    pub fn new(min_df: usize) -> Self {
        Self {
            min_df,
            n_documents: 0,
            document_frequencies: HashMap::new(),
        }
    }

    /// Counts the terms of a document.
    pub fn add_document(&mut self, text: &str) {
        let terms: HashSet<String> = tokenize(text).into_iter().collect();
        for term in terms {
            *self.document_frequencies.entry(term).or_insert(0) += 1;
        }
        self.n_documents += 1;
    }

    /// Gets the number of documents added so far.
    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Fixes the vocabulary.
    ///
    /// # Errors
    ///
    /// [`RlevError::InvalidArgument`] is returned if no term reaches the minimum document
    /// frequency.
    pub fn build(self) -> Result<CountVectorizer> {
        let mut vocabulary: Vec<String> = self
            .document_frequencies
            .into_iter()
            .filter(|&(_, df)| df >= self.min_df)
            .map(|(term, _)| term)
            .collect();
        if vocabulary.is_empty() {
            return Err(RlevError::invalid_argument(
                "min_df",
                format!(
                    "no term occurs in at least {} of {} documents",
                    self.min_df, self.n_documents
                ),
            ));
        }
        vocabulary.sort_unstable();
        tracing::debug!(
            n_documents = self.n_documents,
            n_terms = vocabulary.len(),
            "vocabulary fixed"
        );
        CountVectorizer::from_data(VectorizerData {
            min_df: self.min_df,
            vocabulary,
        })
    }
}

#[derive(Decode, Encode)]
struct VectorizerData {
    min_df: usize,
    vocabulary: Vec<String>,
}

/// Mapping from terms to feature indices producing binary presence vectors.
pub struct CountVectorizer {
    data: VectorizerData,
    index: HashMap<String, u32>,
}

impl CountVectorizer {
    fn from_data(data: VectorizerData) -> Result<Self> {
        if data.vocabulary.windows(2).any(|w| w[0] >= w[1]) {
            return Err(RlevError::invalid_model(
                "vocabulary must be sorted and unique",
            ));
        }
        let mut index = HashMap::with_capacity(data.vocabulary.len());
        for (i, term) in data.vocabulary.iter().enumerate() {
            index.insert(term.clone(), u32::try_from(i)?);
        }
        Ok(Self { data, index })
    }

    /// Gets the number of features.
    pub fn n_features(&self) -> usize {
        self.data.vocabulary.len()
    }

    /// Gets the minimum document frequency used at build time.
    pub fn min_df(&self) -> usize {
        self.data.min_df
    }

    /// Gets the vocabulary in feature index order.
    pub fn vocabulary(&self) -> &[String] {
        &self.data.vocabulary
    }

    /// Gets the feature index of a term.
    pub fn term_id(&self, term: &str) -> Option<u32> {
        self.index.get(term).copied()
    }

    /// Returns the sorted feature indices of the known terms in `text`.
    pub fn transform(&self, text: &str) -> Vec<u32> {
        let mut ids: Vec<u32> = tokenize(text)
            .iter()
            .filter_map(|term| self.term_id(term))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Vectorizes a batch of texts into a binary matrix with one row per text.
    pub fn transform_batch<S>(&self, texts: &[S]) -> Result<SparseMatrix>
    where
        S: AsRef<str>,
    {
        let mut matrix = SparseMatrix::new(self.n_features());
        for text in texts {
            matrix.push_row(self.transform(text.as_ref()).into_iter().map(|i| (i, 1.0)))?;
        }
        Ok(matrix)
    }

    /// Exports the vectorizer.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        bincode::encode_into_std_write(&self.data, wtr, bincode::config::standard())?;
        Ok(())
    }

    /// Creates a vectorizer from a reader.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error, it will be returned as is.
    /// [`RlevError::InvalidModel`] is returned if the vocabulary is not sorted.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let data = bincode::decode_from_std_read(rdr, bincode::config::standard())?;
        Self::from_data(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(docs: &[&str], min_df: usize) -> Result<CountVectorizer> {
        let mut builder = CountVectorizerBuilder::new(min_df);
        for doc in docs {
            builder.add_document(doc);
        }
        builder.build()
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            vec!["quick", "brown", "fox", "x2", "café"],
            tokenize("The quick, brown FOX! a x2 Café"),
        );
    }

    #[test]
    fn test_min_df() {
        let v = build(
            &[
                "gene expression gene",
                "gene regulation",
                "expression profile",
                "gene network",
            ],
            2,
        )
        .unwrap();
        assert_eq!(&["expression", "gene"], v.vocabulary());
        assert_eq!(2, v.min_df());
    }

    #[test]
    fn test_stop_words_excluded() {
        let v = build(&["the cell and the membrane", "the cell"], 1).unwrap();
        assert!(v.vocabulary().iter().all(|t| !is_stop_word(t)));
        assert_eq!(None, v.term_id("the"));
        assert_eq!(Some(0), v.term_id("cell"));
    }

    #[test]
    fn test_empty_vocabulary() {
        assert!(matches!(
            build(&["alpha", "beta"], 2),
            Err(RlevError::InvalidArgument(_))
        ));
        assert!(build(&[], 1).is_err());
    }

    #[test]
    fn test_transform_binary() {
        let v = build(&["alpha beta gamma", "alpha beta gamma"], 2).unwrap();
        assert_eq!(vec![0, 2], v.transform("gamma alpha alpha unknown"));

        let m = v
            .transform_batch(&["beta beta", "", "alpha gamma beta"])
            .unwrap();
        assert_eq!((3, 3), m.shape());
        assert_eq!(vec![1, 0, 3], m.row_nnz());
        assert_eq!(Some(vec![(1, 1.0)]), m.row(0));
    }

    #[test]
    fn test_write_read() {
        let v = build(&["alpha beta", "beta gamma"], 1).unwrap();
        let mut buf = vec![];
        v.write(&mut buf).unwrap();
        let w = CountVectorizer::read(&mut buf.as_slice()).unwrap();
        assert_eq!(v.vocabulary(), w.vocabulary());
        assert_eq!(v.transform("gamma alpha"), w.transform("gamma alpha"));
    }
}
