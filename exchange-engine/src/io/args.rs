use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// TOML settings file. `GOURD_*` environment variables override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON state file. Overrides `storage.state_path`; without either, state
    /// is kept in memory only.
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Number of feed ticks to run before printing the leaderboard and
    /// exiting. 0 runs until Ctrl-C.
    #[arg(long, default_value_t = 10)]
    pub ticks: u64,

    /// Simulated traders placing one random order per tick.
    #[arg(long, default_value_t = 0)]
    pub traders: usize,
}
