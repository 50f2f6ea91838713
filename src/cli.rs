use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Apollo wavelet packet analysis toolkit.
#[derive(Parser)]
#[command(
    name = "apollo",
    version,
    about = "Wavelet packet decomposition and best-basis selection"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Decompose a signal into a wavelet packet tree and summarize it.
    Decompose(DecomposeArgs),
    /// Select a best basis for one signal or an ensemble.
    Select(SelectArgs),
}

/// Arguments for the `decompose` subcommand.
#[derive(clap::Args)]
pub struct DecomposeArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "apollo.toml")]
    pub config: PathBuf,

    /// Path to the input signal (one value per line).
    #[arg(short, long)]
    pub input: PathBuf,
}

/// Arguments for the `select` subcommand.
#[derive(clap::Args)]
pub struct SelectArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "apollo.toml")]
    pub config: PathBuf,

    /// Input signal path(s); joint methods take one path per ensemble member.
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Path for the selected-basis JSON document.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
