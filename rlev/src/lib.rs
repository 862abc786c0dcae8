#![cfg_attr(docsrs, feature(doc_cfg))]

//! # rlev
//!
//! A two-stage classifier of document relevance levels.
//!
//! The first stage is a multinomial logistic regression over binary bag-of-words features of
//! titles and abstracts. The second stage combines its class probabilities with four reference
//! probabilities supplied with each document.
//!
//! ## Examples
//!
//! ```no_run
//! use std::fs::File;
//! use std::io::{prelude::*, stdin};
//!
//! use rlev::{CountVectorizer, LogisticModel, Priors, Record, WordFeaturePredictor};
//!
//! let title_vectorizer = CountVectorizer::read(&mut File::open("title.bin").unwrap()).unwrap();
//! let abstract_vectorizer =
//!     CountVectorizer::read(&mut File::open("abstract.bin").unwrap()).unwrap();
//! let word_model = LogisticModel::read(&mut File::open("word.bin").unwrap()).unwrap();
//! let priors = Priors::read(&mut File::open("priors.bin").unwrap()).unwrap();
//! let combined_model = LogisticModel::read(&mut File::open("combined.bin").unwrap()).unwrap();
//!
//! let predictor = WordFeaturePredictor::new(
//!     &title_vectorizer,
//!     &abstract_vectorizer,
//!     &word_model,
//!     &priors,
//!     rlev::DEFAULT_MIN_WORD_FEATURES,
//! )
//! .unwrap();
//!
//! for line in stdin().lock().lines() {
//!     if let Some(record) = Record::from_canonical_line(&line.unwrap()) {
//!         let probs = combined_model.predict_proba(&predictor.combined_row(&record));
//!         println!("{}\t{:?}", record.id, probs);
//!     }
//! }
//! ```
//!
//! Training requires **crate feature** `train`. For more details, see [`Trainer`].

mod combined;
mod dataset;
mod matrix;
mod model;
mod priors;
mod record;
mod stop_words;
mod vectorizer;

#[cfg(feature = "train")]
mod trainer;

pub mod errors;

pub use combined::WordFeaturePredictor;
pub use dataset::{
    BatchSummary, Dataset, WordFeatureDatasetBuilder, DEFAULT_BATCH_SIZE,
    DEFAULT_MIN_WORD_FEATURES,
};
pub use matrix::SparseMatrix;
pub use model::LogisticModel;
pub use priors::{read_labels, Priors};
pub use record::{parse_rlev, LabeledText, Record, MAX_RLEV, N_REFERENCE_PROBS};
pub use stop_words::{is_stop_word, ENGLISH_STOP_WORDS};
pub use vectorizer::{tokenize, CountVectorizer, CountVectorizerBuilder, DEFAULT_MIN_DF};

#[cfg(feature = "train")]
pub use trainer::{Trainer, DEFAULT_COST, DEFAULT_EPSILON, DEFAULT_MAX_ITERATIONS};
