use std::path::PathBuf;

use clap::Args;
use rlev::{read_labels, Priors};

use crate::io::{open_input, write_artifact, BoxError};

/// Estimates class priors from labels.
#[derive(Args, Debug)]
pub struct GetRlevPriorsArgs {
    /// 1-indexed labels, one per line in the first column (`-` for the standard input)
    input: PathBuf,

    /// The file to write the priors to
    output: PathBuf,

    /// Added to every class count before normalizing
    #[arg(long, default_value_t = 0.0)]
    smoothing: f64,
}

pub fn run(args: GetRlevPriorsArgs, zstd_workers: u32) -> Result<(), BoxError> {
    let labels = read_labels(open_input(&args.input)?)?;
    tracing::info!(n_labels = labels.len(), "labels loaded");
    let priors = Priors::from_labels(labels, args.smoothing)?;
    let probs: Vec<String> = priors.as_slice().iter().map(|p| p.to_string()).collect();
    println!("{}", probs.join("\t"));
    write_artifact(&args.output, zstd_workers, |f| priors.write(f))
}
