use std::path::PathBuf;

use clap::Args;
use rlev::{Dataset, Trainer, DEFAULT_COST, DEFAULT_EPSILON, DEFAULT_MAX_ITERATIONS};

use crate::io::{open_artifact, write_artifact, BoxError};

/// Fits a multinomial logistic regression model on a dataset.
#[derive(Args, Debug)]
pub struct TrainLrModelArgs {
    /// The dataset created by `create-word-feature-model-inputs` or
    /// `create-combined-model-inputs`
    input: PathBuf,

    /// The file to write the trained model to
    output: PathBuf,

    /// The cost hyperparameter for classifier training
    #[arg(long, default_value_t = DEFAULT_COST)]
    cost: f64,

    /// The gradient-norm stopping criterion for classifier training
    #[arg(long, default_value_t = DEFAULT_EPSILON)]
    eps: f64,

    /// The maximum number of optimizer iterations
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: u64,
}

pub fn run(args: TrainLrModelArgs, zstd_workers: u32) -> Result<(), BoxError> {
    eprintln!("Loading dataset...");
    let dataset = Dataset::read(&mut open_artifact(&args.input)?)?;
    let (n_rows, n_cols) = dataset.shape();
    eprintln!("# of examples: {n_rows}, # of features: {n_cols}");

    eprintln!("Start training...");
    let model = Trainer::new(&dataset)?.train(args.eps, args.cost, args.max_iterations)?;
    eprintln!("Finish training.");

    write_artifact(&args.output, zstd_workers, |f| model.write(f))
}
