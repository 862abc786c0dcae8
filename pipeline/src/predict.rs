use std::io::{prelude::*, stdout, BufWriter};
use std::path::{Path, PathBuf};

use clap::Args;
use rlev::{LogisticModel, Record, WordFeaturePredictor, DEFAULT_BATCH_SIZE};

use crate::io::{
    open_artifact, open_input, prediction_line, BoxError, LineBatches, WordStage, WordStageArgs,
};

/// Prints the class probabilities of the combined model for each record.
#[derive(Args, Debug)]
pub struct GetCombinedModelPredictionsArgs {
    /// Canonical records, labeled or not (`-` for the standard input)
    #[arg(default_value = "-")]
    input: PathBuf,

    #[command(flatten)]
    stage: WordStageArgs,

    /// The combined model
    #[arg(long)]
    combined_model: PathBuf,

    /// The number of lines processed at once
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
}

/// Prints the class probabilities of the word-feature stage for each record.
#[derive(Args, Debug)]
pub struct GetWordFeatureModelPredictionsArgs {
    /// Canonical records, labeled or not (`-` for the standard input)
    #[arg(default_value = "-")]
    input: PathBuf,

    #[command(flatten)]
    stage: WordStageArgs,

    /// The number of lines processed at once
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
}

fn predict_records<F>(input: &Path, batch_size: usize, predict: F) -> Result<(), BoxError>
where
    F: Fn(&Record) -> Vec<f64>,
{
    let mut out = BufWriter::new(stdout().lock());
    let mut n_predicted = 0;
    let mut batches = LineBatches::new(open_input(input)?, batch_size);
    for batch in batches.by_ref() {
        for line in batch? {
            let Some(record) = Record::from_canonical_line(&line) else {
                tracing::debug!("dropped malformed line");
                continue;
            };
            let probs = predict(&record);
            writeln!(out, "{}", prediction_line(&record.id, record.rlev, &probs))?;
            n_predicted += 1;
        }
    }
    out.flush()?;
    eprintln!("# of lines: {}", batches.n_lines());
    tracing::info!(n_lines = batches.n_lines(), n_predicted, "predicted");
    Ok(())
}

pub fn run_combined(args: GetCombinedModelPredictionsArgs) -> Result<(), BoxError> {
    let stage = WordStage::load(&args.stage)?;
    let combined_model = LogisticModel::read(&mut open_artifact(&args.combined_model)?)?;
    let predictor = WordFeaturePredictor::new(
        &stage.title_vectorizer,
        &stage.abstract_vectorizer,
        &stage.word_model,
        &stage.priors,
        args.stage.min_word_features,
    )?;
    predictor.check_combined_model(&combined_model)?;
    predict_records(&args.input, args.batch_size, |record| {
        combined_model.predict_proba(&predictor.combined_row(record))
    })
}

pub fn run_word_feature(args: GetWordFeatureModelPredictionsArgs) -> Result<(), BoxError> {
    let stage = WordStage::load(&args.stage)?;
    let predictor = WordFeaturePredictor::new(
        &stage.title_vectorizer,
        &stage.abstract_vectorizer,
        &stage.word_model,
        &stage.priors,
        args.stage.min_word_features,
    )?;
    predict_records(&args.input, args.batch_size, |record| {
        predictor.predict_proba(&record.title, &record.abstract_text)
    })
}
