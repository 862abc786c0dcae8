use std::io::{prelude::*, stdout, BufWriter};
use std::path::PathBuf;

use clap::Args;
use rlev::Record;

use crate::io::{open_input, BoxError};

/// Validates tab-separated records and prints them in the canonical field order.
#[derive(Args, Debug)]
pub struct FormatInputArgs {
    /// The input records (`-` for the standard input)
    #[arg(default_value = "-")]
    input: PathBuf,
}

pub fn run(args: FormatInputArgs) -> Result<(), BoxError> {
    let mut out = BufWriter::new(stdout().lock());
    let mut n_read = 0usize;
    let mut n_written = 0usize;
    for line in open_input(&args.input)?.lines() {
        let line = line?;
        n_read += 1;
        match Record::from_line(&line) {
            Some(record) => {
                writeln!(out, "{}", record.to_canonical_line())?;
                n_written += 1;
            }
            None => tracing::debug!(line = n_read, "dropped malformed line"),
        }
    }
    out.flush()?;
    tracing::info!(
        n_read,
        n_written,
        n_dropped = n_read - n_written,
        "formatted records"
    );
    Ok(())
}
