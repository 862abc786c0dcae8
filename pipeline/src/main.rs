mod combined;
mod format;
mod io;
mod predict;
mod priors;
mod train;
mod vectorizer;
mod word_features;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::io::BoxError;

#[derive(Parser, Debug)]
#[command(about = "A program to train and apply relevance-level classifiers.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// The number of workers for zstd (0 means multithreaded will be disabled)
    #[arg(long, global = true, default_value = "0")]
    zstd_workers: u32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fits a binary bag-of-words vectorizer
    CreateCountVectorizer(vectorizer::CreateCountVectorizerArgs),

    /// Normalizes tab-separated records into the canonical field order
    FormatInput(format::FormatInputArgs),

    /// Builds the training data of the word-feature model
    CreateWordFeatureModelInputs(word_features::CreateWordFeatureModelInputsArgs),

    /// Trains a logistic regression model
    #[command(alias = "train-word-feature-model")]
    TrainLrModel(train::TrainLrModelArgs),

    /// Estimates class priors
    GetRlevPriors(priors::GetRlevPriorsArgs),

    /// Builds the training data of the combined model
    CreateCombinedModelInputs(combined::CreateCombinedModelInputsArgs),

    /// Prints class probabilities of the combined model
    GetCombinedModelPredictions(predict::GetCombinedModelPredictionsArgs),

    /// Prints class probabilities of the word-feature stage
    GetWordFeatureModelPredictions(predict::GetWordFeatureModelPredictionsArgs),
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let zstd_workers = cli.zstd_workers;

    match cli.command {
        Command::CreateCountVectorizer(args) => vectorizer::run(args, zstd_workers),
        Command::FormatInput(args) => format::run(args),
        Command::CreateWordFeatureModelInputs(args) => word_features::run(args, zstd_workers),
        Command::TrainLrModel(args) => train::run(args, zstd_workers),
        Command::GetRlevPriors(args) => priors::run(args, zstd_workers),
        Command::CreateCombinedModelInputs(args) => combined::run(args, zstd_workers),
        Command::GetCombinedModelPredictions(args) => predict::run_combined(args),
        Command::GetWordFeatureModelPredictions(args) => predict::run_word_feature(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_train_alias() {
        let cli = Cli::try_parse_from(["pipeline", "train-word-feature-model", "in", "out"]).unwrap();
        assert!(matches!(cli.command, Command::TrainLrModel(_)));
        let args = ["pipeline", "train-lr-model", "in", "out", "--max-iterations", "5"];
        assert!(Cli::try_parse_from(args).is_ok());
        assert!(Cli::try_parse_from(["pipeline", "train-lr-model", "in", "out", "--solver", "0"])
            .is_err());
    }
}
