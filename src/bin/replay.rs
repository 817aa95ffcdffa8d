use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ml_gobang::checkpoint::ModelStore;
use ml_gobang::game::{GameState, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use ml_gobang::transcript::{ReplayPlayer, ReplayStep, SkipPolicy};

/// Replay a training transcript against a fresh board.
#[derive(Parser)]
#[command(name = "replay", about = "Replay a gobang training transcript")]
struct Cli {
    /// Board size the transcript was recorded on
    #[arg(long, default_value_t = 15)]
    board_size: usize,

    /// Directory holding per-size artifacts and transcripts
    #[arg(long, default_value = "models")]
    save_dir: PathBuf,

    /// Transcript to replay instead of `<save_dir>/<N>x<N>/training_log.txt`
    #[arg(long)]
    transcript: Option<PathBuf>,

    /// Keep the cursor on an illegal move instead of skipping past it
    #[arg(long)]
    hold: bool,

    /// Stop after this many applied moves
    #[arg(long)]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&cli.board_size) {
        bail!(
            "board size must be between {} and {}, got {}",
            MIN_BOARD_SIZE,
            MAX_BOARD_SIZE,
            cli.board_size
        );
    }

    let path = cli
        .transcript
        .unwrap_or_else(|| ModelStore::new(&cli.save_dir).transcript_path(cli.board_size));
    let policy = if cli.hold {
        SkipPolicy::Hold
    } else {
        SkipPolicy::Advance
    };
    let mut player = ReplayPlayer::load(&path, policy)
        .with_context(|| format!("loading transcript {}", path.display()))?;
    log::info!(
        "Replaying {} moves from {} ({} malformed lines skipped)",
        player.len(),
        path.display(),
        player.skipped_lines().len()
    );

    let mut state = GameState::new(cli.board_size);
    let mut applied = 0;
    let mut games = 0;
    let mut fresh_board = true;

    loop {
        if cli.limit.is_some_and(|limit| applied >= limit) {
            break;
        }
        match player.next(&state) {
            ReplayStep::Move { index, player: p, mv } => {
                let result = state
                    .step(mv)
                    .with_context(|| format!("applying move {}", index + 1))?;
                applied += 1;
                fresh_board = false;
                println!("{:>6}  {:<5} {}", index + 1, p, mv);

                if result.won {
                    games += 1;
                    println!("Game {games}: {p} wins");
                    state.reset();
                    fresh_board = true;
                } else if state.is_full() {
                    games += 1;
                    println!("Game {games}: draw");
                    state.reset();
                    fresh_board = true;
                }
            }
            ReplayStep::Skipped { index, player: p, mv } => {
                log::warn!("move {} ({} {}) is illegal here", index + 1, p, mv);
                if player.skip_policy() == SkipPolicy::Hold {
                    if fresh_board {
                        bail!(
                            "move {} ({}) is illegal on an empty {}x{} board",
                            index + 1,
                            mv,
                            cli.board_size,
                            cli.board_size
                        );
                    }
                    // a new recorded game started before this one ended
                    state.reset();
                    fresh_board = true;
                }
            }
            ReplayStep::Exhausted => break,
        }
    }

    println!(
        "Applied {} of {} moves across {} finished games",
        applied,
        player.len(),
        games
    );
    Ok(())
}
