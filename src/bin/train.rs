#![recursion_limit = "256"]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use burn::backend::{Autodiff, NdArray, Wgpu};
use burn::tensor::backend::AutodiffBackend;
use clap::Parser;

use ml_gobang::ai::PolicyAgent;
use ml_gobang::config::{AppConfig, ComputeBackend};
use ml_gobang::training::{SamplingMode, TrainingLoop};

type CpuBackend = Autodiff<NdArray<f32>>;
type GpuBackend = Autodiff<Wgpu<f32, i32>>;

/// Train a gobang policy via self-play.
#[derive(Parser)]
#[command(name = "train", about = "Train a gobang policy by self-imitation")]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, default_value = "gobang.toml")]
    config: PathBuf,

    /// Override board size
    #[arg(long)]
    board_size: Option<usize>,

    /// Train every size from the board size up to this one, in order
    #[arg(long)]
    max_board_size: Option<usize>,

    /// Override number of training episodes
    #[arg(long)]
    episodes: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    lr: Option<f64>,

    /// Override the directory holding per-size artifacts and transcripts
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Override compute backend
    #[arg(long, value_enum)]
    backend: Option<ComputeBackend>,

    /// Override how moves are drawn from the policy
    #[arg(long, value_enum)]
    sampling: Option<SamplingMode>,

    /// Fix the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Merge an existing artifact before training
    #[arg(long)]
    warm_start: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;

    // Apply CLI overrides
    if let Some(n) = cli.board_size {
        config.board_size = n;
    }
    if let Some(episodes) = cli.episodes {
        config.episodes = episodes;
    }
    if let Some(lr) = cli.lr {
        config.learning_rate = lr;
    }
    if let Some(dir) = cli.save_dir {
        config.save_dir = dir;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(sampling) = cli.sampling {
        config.sampling = sampling;
    }
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.warm_start |= cli.warm_start;
    config.validate().context("invalid configuration")?;

    let max_size = cli.max_board_size.unwrap_or(config.board_size);
    if max_size < config.board_size {
        bail!(
            "--max-board-size {} is below the board size {}",
            max_size,
            config.board_size
        );
    }

    match config.backend {
        ComputeBackend::Ndarray => train_sizes::<CpuBackend>(&config, max_size, &Default::default()),
        ComputeBackend::Wgpu => train_sizes::<GpuBackend>(&config, max_size, &Default::default()),
    }
}

/// Train one fresh policy per board size, each with its own artifact and
/// transcript.
fn train_sizes<B: AutodiffBackend>(
    base: &AppConfig,
    max_size: usize,
    device: &B::Device,
) -> Result<()> {
    for n in base.board_size..=max_size {
        let config = AppConfig {
            board_size: n,
            ..base.clone()
        };
        config
            .validate()
            .with_context(|| format!("invalid configuration for {n}x{n}"))?;

        let mut agent = PolicyAgent::<B>::new(n, config.learning_rate, device);
        let summary = TrainingLoop::new(config)
            .run(&mut agent)
            .with_context(|| format!("training {n}x{n}"))?;

        log::info!(
            "{}x{}: black {} | white {} | draw {} | {} moves | mean loss {:.4}",
            n,
            n,
            summary.black_wins,
            summary.white_wins,
            summary.draws,
            summary.total_moves,
            summary.mean_loss
        );
        log::info!("Transcript: {}", summary.transcript_path.display());
    }
    Ok(())
}
