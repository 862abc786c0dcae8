use std::path::PathBuf;

use clap::Args;
use rlev::{
    CountVectorizer, LabeledText, WordFeatureDatasetBuilder, DEFAULT_BATCH_SIZE,
    DEFAULT_MIN_WORD_FEATURES,
};

use crate::io::{open_artifact, open_input, write_artifact, BoxError, LineBatches};

/// Builds the training data of the word-feature model.
#[derive(Args, Debug)]
pub struct CreateWordFeatureModelInputsArgs {
    /// Labeled documents: `rlev<TAB>title<TAB>abstract` or labeled canonical records
    /// (`-` for the standard input)
    input: PathBuf,

    /// The file to write the dataset to
    output: PathBuf,

    /// The title vectorizer
    #[arg(long)]
    title_vectorizer: PathBuf,

    /// The abstract vectorizer
    #[arg(long)]
    abstract_vectorizer: PathBuf,

    /// The number of lines processed at once
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Documents with fewer known words than this value are discarded
    #[arg(long, default_value_t = DEFAULT_MIN_WORD_FEATURES)]
    min_word_features: usize,
}

pub fn run(args: CreateWordFeatureModelInputsArgs, zstd_workers: u32) -> Result<(), BoxError> {
    let title_vectorizer = CountVectorizer::read(&mut open_artifact(&args.title_vectorizer)?)?;
    let abstract_vectorizer =
        CountVectorizer::read(&mut open_artifact(&args.abstract_vectorizer)?)?;
    let mut builder = WordFeatureDatasetBuilder::new(
        &title_vectorizer,
        &abstract_vectorizer,
        args.min_word_features,
    );

    let mut n_malformed = 0;
    let mut n_dropped = 0;
    let mut batches = LineBatches::new(open_input(&args.input)?, args.batch_size);
    for batch in batches.by_ref() {
        let batch = batch?;
        let texts: Vec<LabeledText> = batch
            .iter()
            .filter_map(|line| LabeledText::from_line(line))
            .collect();
        n_malformed += batch.len() - texts.len();
        n_dropped += builder.push_batch(&texts)?.n_dropped;
    }
    eprintln!("# of lines: {}", batches.n_lines());
    tracing::info!(
        n_lines = batches.n_lines(),
        n_malformed,
        n_dropped,
        n_rows = builder.n_rows(),
        "word features extracted"
    );

    let dataset = builder.finish();
    let (n_rows, n_cols) = dataset.shape();
    println!("({n_rows}, {n_cols})");
    write_artifact(&args.output, zstd_workers, |f| dataset.write(f))
}
