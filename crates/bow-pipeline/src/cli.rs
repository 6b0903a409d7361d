use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{
    config::Params,
    pipeline::{Pipeline, PipelinePaths},
};

#[derive(Parser, Debug)]
#[command(name = "bow-pipeline")]
#[command(about = "Bag-of-words text classification pipeline")]
#[command(long_about = None)]
pub struct Cli {
    /// Parameter file, relative to the project root
    #[arg(short, long, value_name = "PATH", default_value = "params.yaml")]
    pub params: PathBuf,

    /// Project root holding data/, models/ and reports/
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Normalize the raw train/test tables
    Preprocess,
    /// Fit the vocabulary and write bag-of-words tables
    Featurize,
    /// Train the classifier on the training features
    Train,
    /// Score the classifier on the test features and print the metrics
    Evaluate,
    /// Run every stage in order
    Run,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (_, true) => "debug",
            _ => "info",
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run(cli: &Cli) -> Result<()> {
    init_tracing(cli.log_level());

    let params_path = cli.root.join(&cli.params);
    let params = Params::load(&params_path)
        .with_context(|| format!("Failed to load parameters from {}", params_path.display()))?;
    let pipeline = Pipeline::new(params, PipelinePaths::new(&cli.root));

    match cli.command {
        Command::Preprocess => pipeline.preprocess(),
        Command::Featurize => pipeline.featurize(),
        Command::Train => pipeline.train(),
        Command::Evaluate => {
            let metrics = pipeline.evaluate()?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
            Ok(())
        }
        Command::Run => {
            let metrics = pipeline.run()?;
            println!("{}", serde_json::to_string_pretty(&metrics)?);
            Ok(())
        }
    }
}
