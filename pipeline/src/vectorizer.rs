use std::io::{prelude::*, stderr};
use std::path::PathBuf;

use clap::Args;
use rlev::{CountVectorizerBuilder, DEFAULT_MIN_DF};

use crate::io::{open_input, write_artifact, BoxError};

/// Fits a binary bag-of-words vectorizer on one document per line.
#[derive(Args, Debug)]
pub struct CreateCountVectorizerArgs {
    /// The input text, one document per line (`-` for the standard input)
    input: PathBuf,

    /// The file to write the vectorizer to
    output: PathBuf,

    /// Terms occurring in fewer documents than this value are discarded
    #[arg(long, default_value_t = DEFAULT_MIN_DF)]
    min_df: usize,
}

pub fn run(args: CreateCountVectorizerArgs, zstd_workers: u32) -> Result<(), BoxError> {
    tracing::info!(input = ?args.input, min_df = args.min_df, "building vectorizer");
    let mut builder = CountVectorizerBuilder::new(args.min_df);
    for (i, line) in open_input(&args.input)?.lines().enumerate() {
        if i % 10000 == 0 {
            eprint!("# of documents: {i}\r");
            stderr().flush()?;
        }
        builder.add_document(&line?);
    }
    eprintln!("# of documents: {}", builder.n_documents());

    let vectorizer = builder.build()?;
    tracing::info!(n_features = vectorizer.n_features(), "vocabulary fixed");
    write_artifact(&args.output, zstd_workers, |f| vectorizer.write(f))
}
