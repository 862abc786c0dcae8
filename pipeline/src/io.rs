use std::fs::File;
use std::io::{self, prelude::*, stdin, BufReader, Lines};
use std::path::{Path, PathBuf};

use clap::Args;
use rlev::{CountVectorizer, LogisticModel, Priors, DEFAULT_MIN_WORD_FEATURES};

pub type BoxError = Box<dyn std::error::Error>;

const ZSTD_LEVEL: i32 = 19;

/// Opens a text input. `-` means the standard input.
pub fn open_input(path: &Path) -> io::Result<Box<dyn BufRead>> {
    if path.as_os_str() == "-" {
        Ok(Box::new(stdin().lock()))
    } else {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

pub fn open_artifact(path: &Path) -> io::Result<zstd::Decoder<'static, BufReader<File>>> {
    tracing::debug!(?path, "loading");
    zstd::Decoder::new(File::open(path)?)
}

/// Writes a compressed artifact with `write`.
pub fn write_artifact<F>(path: &Path, zstd_workers: u32, write: F) -> Result<(), BoxError>
where
    F: FnOnce(&mut zstd::Encoder<'static, File>) -> rlev::errors::Result<()>,
{
    let mut f = zstd::Encoder::new(File::create(path)?, ZSTD_LEVEL)?;
    f.multithread(zstd_workers)?;
    write(&mut f)?;
    f.finish()?;
    tracing::info!(?path, "written");
    Ok(())
}

/// Iterator over fixed-size batches of input lines.
pub struct LineBatches<R> {
    lines: Lines<R>,
    batch_size: usize,
    n_lines: usize,
}

impl<R> LineBatches<R>
where
    R: BufRead,
{
    pub fn new(rdr: R, batch_size: usize) -> Self {
        Self {
            lines: rdr.lines(),
            batch_size: batch_size.max(1),
            n_lines: 0,
        }
    }

    /// Gets the number of lines read so far.
    pub fn n_lines(&self) -> usize {
        self.n_lines
    }
}

impl<R> Iterator for LineBatches<R>
where
    R: BufRead,
{
    type Item = io::Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut batch = Vec::with_capacity(self.batch_size.min(1 << 16));
        for line in self.lines.by_ref() {
            match line {
                Ok(line) => batch.push(line),
                Err(e) => return Some(Err(e)),
            }
            if batch.len() == self.batch_size {
                break;
            }
        }
        if batch.is_empty() {
            return None;
        }
        self.n_lines += batch.len();
        eprint!("# of lines: {}\r", self.n_lines);
        Some(Ok(batch))
    }
}

/// Artifacts of the word-feature stage.
#[derive(Args, Debug)]
pub struct WordStageArgs {
    /// The title vectorizer
    #[arg(long)]
    pub title_vectorizer: PathBuf,

    /// The abstract vectorizer
    #[arg(long)]
    pub abstract_vectorizer: PathBuf,

    /// The word-feature model
    #[arg(long)]
    pub word_model: PathBuf,

    /// The class priors
    #[arg(long)]
    pub priors: PathBuf,

    /// Documents with fewer known words than this value are given the priors
    #[arg(long, default_value_t = DEFAULT_MIN_WORD_FEATURES)]
    pub min_word_features: usize,
}

/// Loaded artifacts of the word-feature stage.
pub struct WordStage {
    pub title_vectorizer: CountVectorizer,
    pub abstract_vectorizer: CountVectorizer,
    pub word_model: LogisticModel,
    pub priors: Priors,
}

impl WordStage {
    pub fn load(args: &WordStageArgs) -> Result<Self, BoxError> {
        Ok(Self {
            title_vectorizer: CountVectorizer::read(&mut open_artifact(&args.title_vectorizer)?)?,
            abstract_vectorizer: CountVectorizer::read(&mut open_artifact(
                &args.abstract_vectorizer,
            )?)?,
            word_model: LogisticModel::read(&mut open_artifact(&args.word_model)?)?,
            priors: Priors::read(&mut open_artifact(&args.priors)?)?,
        })
    }
}

/// Formats a prediction row as `id[<TAB>rlev]<TAB>p_0<TAB>...`.
pub fn prediction_line(id: &str, rlev: Option<u32>, probs: &[f64]) -> String {
    let mut fields = vec![id.to_string()];
    fields.extend(rlev.map(|rlev| rlev.to_string()));
    fields.extend(probs.iter().map(|p| p.to_string()));
    fields.join("\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_batches() {
        let input = "a\nb\nc\nd\ne\n".as_bytes();
        let mut batches = LineBatches::new(input, 2);
        assert_eq!(vec!["a", "b"], batches.next().unwrap().unwrap());
        assert_eq!(vec!["c", "d"], batches.next().unwrap().unwrap());
        assert_eq!(vec!["e"], batches.next().unwrap().unwrap());
        assert!(batches.next().is_none());
        assert_eq!(5, batches.n_lines());
    }

    #[test]
    fn test_prediction_line() {
        assert_eq!("W1\t2\t0.25\t0.75", prediction_line("W1", Some(2), &[0.25, 0.75]));
        assert_eq!("W1\t1\t0", prediction_line("W1", None, &[1.0, 0.0]));
    }
}
