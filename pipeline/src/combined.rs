use std::path::PathBuf;

use clap::Args;
use rlev::{Dataset, Record, WordFeaturePredictor, DEFAULT_BATCH_SIZE};

use crate::io::{open_input, write_artifact, BoxError, LineBatches, WordStage, WordStageArgs};

/// Builds the training data of the combined model.
#[derive(Args, Debug)]
pub struct CreateCombinedModelInputsArgs {
    /// Labeled canonical records (`-` for the standard input)
    input: PathBuf,

    /// The file to write the dataset to
    output: PathBuf,

    #[command(flatten)]
    stage: WordStageArgs,

    /// The number of lines processed at once
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
}

pub fn run(args: CreateCombinedModelInputsArgs, zstd_workers: u32) -> Result<(), BoxError> {
    let stage = WordStage::load(&args.stage)?;
    let predictor = WordFeaturePredictor::new(
        &stage.title_vectorizer,
        &stage.abstract_vectorizer,
        &stage.word_model,
        &stage.priors,
        args.stage.min_word_features,
    )?;

    let mut dataset = Dataset::new(predictor.n_combined_features());
    let mut n_skipped = 0;
    let mut batches = LineBatches::new(open_input(&args.input)?, args.batch_size);
    for batch in batches.by_ref() {
        let batch = batch?;
        let records: Vec<Record> = batch
            .iter()
            .filter_map(|line| Record::from_canonical_line(line))
            .filter(|record| record.rlev.is_some())
            .collect();
        n_skipped += batch.len() - records.len();
        dataset.append(&predictor.combined_dataset(&records)?)?;
    }
    eprintln!("# of lines: {}", batches.n_lines());
    tracing::info!(
        n_lines = batches.n_lines(),
        n_skipped,
        n_rows = dataset.len(),
        "combined features extracted"
    );

    let (n_rows, n_cols) = dataset.shape();
    println!("({n_rows}, {n_cols})");
    write_artifact(&args.output, zstd_workers, |f| dataset.write(f))
}
