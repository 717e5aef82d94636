// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `init`, `latest` and
// `predict`, and their configurable flags.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::init_use_case::InitConfig;
use crate::application::predict_use_case::PredictConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build encoders and a fresh model from a corpus and save a checkpoint
    Init(InitArgs),

    /// Print the checkpoint that would be loaded from a directory
    Latest(LatestArgs),

    /// Load a checkpoint and predict the top-k output sequences
    Predict(PredictArgs),
}

/// All arguments for the `init` command.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Tab-separated corpus, one `source<TAB>target` pair per line
    #[arg(long)]
    pub corpus: String,

    /// Directory the checkpoint is written to
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Accelerator ordinal; omit or pass a negative value for the host
    #[arg(long, allow_negative_numbers = true)]
    pub device: Option<i32>,

    /// Upper bound on each vocabulary, special tokens included
    #[arg(long, default_value_t = 8000)]
    pub vocab_size: usize,

    /// Longest input the position table covers
    #[arg(long, default_value_t = 128)]
    pub max_seq_len: usize,

    /// Hidden dimension; must be divisible by num_heads
    #[arg(long, default_value_t = 128)]
    pub d_model: usize,

    #[arg(long, default_value_t = 4)]
    pub num_heads: usize,

    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    /// Inner dimension of the feed-forward network
    #[arg(long, default_value_t = 512)]
    pub d_ff: usize,

    #[arg(long, default_value_t = 0.1)]
    pub dropout: f64,

    /// Model takes [batch, seq_len] input instead of [seq_len, batch]
    #[arg(long)]
    pub batch_first: bool,
}

impl From<InitArgs> for InitConfig {
    fn from(a: InitArgs) -> Self {
        InitConfig {
            corpus:         a.corpus,
            checkpoint_dir: a.checkpoint_dir,
            device:         a.device,
            vocab_size:     a.vocab_size,
            max_seq_len:    a.max_seq_len,
            d_model:        a.d_model,
            num_heads:      a.num_heads,
            num_layers:     a.num_layers,
            d_ff:           a.d_ff,
            dropout:        a.dropout,
            batch_first:    a.batch_first,
        }
    }
}

#[derive(Args, Debug)]
pub struct LatestArgs {
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}

/// All arguments for the `predict` command
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Text to run through the model
    #[arg(long)]
    pub input: String,

    /// Checkpoint file to load instead of the most recent one
    #[arg(long)]
    pub checkpoint: Option<String>,

    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// Number of candidate sequences to return
    #[arg(long, default_value_t = 1)]
    pub top_k: usize,

    /// Assert the checkpoint's model takes [batch, seq_len] input
    #[arg(long)]
    pub batch_first: bool,

    /// Accelerator ordinal; a negative value forces the host
    #[arg(long, allow_negative_numbers = true)]
    pub device: Option<i32>,
}

impl From<PredictArgs> for PredictConfig {
    fn from(a: PredictArgs) -> Self {
        PredictConfig {
            input:          a.input,
            checkpoint:     a.checkpoint,
            checkpoint_dir: a.checkpoint_dir,
            top_k:          a.top_k,
            batch_first:    a.batch_first.then_some(true),
            device:         a.device,
        }
    }
}
