// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction. Parses arguments with
// `clap` and delegates to Layer 2 (application).
//
// Three commands are supported:
//   1. `init`    — build a fresh checkpoint from a corpus
//   2. `latest`  — show which checkpoint would be loaded
//   3. `predict` — load a checkpoint and print top-k output
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, InitArgs, LatestArgs, PredictArgs};

use crate::domain::prediction::Prediction;

#[derive(Parser, Debug)]
#[command(
    name = "seq-checkpoint",
    version = "0.1.0",
    about = "Save, discover and load sequence-model checkpoints, and run top-k prediction."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Dispatch to the matching use case.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init(args)    => Self::run_init(args),
            Commands::Latest(args)  => Self::run_latest(args),
            Commands::Predict(args) => Self::run_predict(args),
        }
    }

    fn run_init(args: InitArgs) -> Result<()> {
        use crate::application::init_use_case::InitUseCase;

        tracing::info!("Initialising checkpoint from corpus: {}", args.corpus);

        match InitUseCase::new(args.into()).execute()? {
            Some(path) => println!("Checkpoint saved to {}", path.display()),
            None => println!("Checkpoint not saved: a file with the same name already exists."),
        }
        Ok(())
    }

    fn run_latest(args: LatestArgs) -> Result<()> {
        use crate::application::predict_use_case::find_latest;

        match find_latest(&args.checkpoint_dir)? {
            Some(path) => println!("{}", path.display()),
            None => println!("No checkpoint found in {}", args.checkpoint_dir),
        }
        Ok(())
    }

    fn run_predict(args: PredictArgs) -> Result<()> {
        use crate::application::predict_use_case::PredictUseCase;

        let outcome = PredictUseCase::new(args.into()).execute()?;

        println!("Checkpoint: {}", outcome.checkpoint_path.display());
        for (rank, prediction) in outcome.predictions.into_vec().iter().enumerate() {
            println!("\n#{} {}", rank + 1, prediction.sequence);
            println!("   {}", format_confidences(prediction));
        }
        Ok(())
    }
}

fn format_confidences(prediction: &Prediction) -> String {
    prediction
        .confidences
        .iter()
        .map(|c| format!("{c:.3}"))
        .collect::<Vec<_>>()
        .join(" ")
}
