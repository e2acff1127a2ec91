use clap::{Args, Parser, Subcommand};
use ferret_config::ConfigArgs;

use crate::log_args::LogArgs;

/// The address `--code` is installed at unless `--target` says otherwise.
pub const DEFAULT_TARGET: &str = "0x00a329c0648769a73afac7f9381e08fb43dbea72";

#[derive(Debug, Parser)]
#[clap(name = "ferret", version)]
pub struct Arguments {
    #[clap(subcommand)]
    pub sub: Subcommands,

    #[clap(flatten)]
    pub logs: LogArgs,
}

#[derive(Debug, Subcommand)]
#[clap(
    about = "ferret executes EVM transactions the way a fuzzing harness does, optionally recording coverage."
)]
pub enum Subcommands {
    #[clap(name = "exec", about = "Execute EVM bytecode in a single call transaction")]
    Exec(ExecArgs),

    #[clap(name = "config", about = "Display and edit the current configuration")]
    Config(ConfigArgs),
}

/// Arguments for `ferret exec`.
#[derive(Debug, Clone, Args)]
pub struct ExecArgs {
    /// The bytecode to execute, as hex.
    #[clap(long, short)]
    pub code: String,

    /// The calldata to call the contract with, as hex.
    #[clap(long, short = 'd', default_value = "")]
    pub calldata: String,

    /// Deploy `--code` as init code first, then call the deployed runtime code.
    #[clap(long)]
    pub create: bool,

    /// Record coverage and report the number of points visited.
    #[clap(long)]
    pub coverage: bool,

    /// The gas limit of each transaction. Defaults to the configured gas limit.
    #[clap(long)]
    pub gas: Option<u64>,

    /// The address sending the transactions. Defaults to the configured sender.
    #[clap(long)]
    pub sender: Option<String>,

    /// The address the contract lives at.
    #[clap(long, short, default_value = DEFAULT_TARGET)]
    pub target: String,
}
