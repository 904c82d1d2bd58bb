use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "vmdscript contributors",
    version,
    about = "vmdscript CLI - Streams molecular dynamics trajectories through a molecule in bounded windows and collects per-frame datasets.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze trajectory files frame by frame and write the collected datasets.
    Analyze(AnalyzeArgs),
    /// Load a single file and print a summary of its contents.
    Inspect(InspectArgs),
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Trajectory files to analyze, in order. Replaces `trajectory.files` from the config file.
    #[arg(value_name = "TRAJECTORY")]
    pub trajectories: Vec<PathBuf>,

    /// Path to the analysis configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Structure file providing the topology of the molecule.
    #[arg(short, long, value_name = "PATH")]
    pub structure: Option<PathBuf>,

    /// Name of the molecule created for the analysis.
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    // --- Trajectory Overrides ---
    /// Analyze every STEP-th frame of the trajectories.
    #[arg(long, value_name = "INT")]
    pub step: Option<usize>,

    /// Maximum number of frames loaded at once.
    #[arg(long, value_name = "INT")]
    pub chunk: Option<usize>,

    /// Format of the trajectory files (e.g. 'dcd', 'xyz'). Guessed from the extension when omitted.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S trajectory.step=5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// File to inspect.
    #[arg(required = true, value_name = "PATH")]
    pub file: PathBuf,

    /// Format of the file. Guessed from the extension when omitted.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Print the atoms matched by this selection text.
    #[arg(short = 'e', long, value_name = "TEXT")]
    pub selection: Option<String>,
}
