//! Reposcape CLI - scape command

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

mod cmd;
mod config;
mod util;

/// Reposcape - replay repository history as a continuous 3D layout
#[derive(Parser)]
#[command(name = "scape")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/reposcape/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct and lay out every step, writing snapshots as JSON
    Build {
        /// Timeline JSON file
        input: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Fail a step when a node is unreachable from the root
        #[arg(long)]
        strict: bool,
        /// Skip steps with malformed change records
        #[arg(long, conflicts_with = "abort_invalid")]
        skip_invalid: bool,
        /// Stop at the first step with malformed change records
        #[arg(long)]
        abort_invalid: bool,
        /// Frame budget for every pass
        #[arg(long)]
        frames: Option<u32>,
        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,
    },
    /// Print per-step reconstruction counts without layout
    Stats {
        /// Timeline JSON file
        input: PathBuf,
        #[arg(long)]
        strict: bool,
        #[arg(long, conflicts_with = "abort_invalid")]
        skip_invalid: bool,
        #[arg(long)]
        abort_invalid: bool,
    },
    /// View or edit the config file
    Config {
        /// List all values
        #[arg(long)]
        list: bool,
        /// Create the config file with defaults
        #[arg(long)]
        init: bool,
        /// Print one value (dotted key, e.g. timeline.simulation.damping)
        #[arg(long, value_name = "KEY")]
        get: Option<String>,
        /// Set one value
        #[arg(long, num_args = 2, value_names = ["KEY", "VALUE"])]
        set: Option<Vec<String>>,
        /// Print the config file path
        #[arg(long)]
        path: bool,
        /// Print the default config
        #[arg(long)]
        example: bool,
    },
}

fn init_tracing(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = config::resolve_path(cli.config.as_deref())?;
    let loaded = config::load(&config_path);

    let level = match cli.verbose {
        0 => loaded
            .as_ref()
            .ok()
            .and_then(|c| c.level().ok())
            .unwrap_or(Level::WARN),
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    init_tracing(level);

    match cli.command {
        Commands::Build {
            input,
            output,
            strict,
            skip_invalid,
            abort_invalid,
            frames,
            quiet,
        } => {
            let args = cmd::build::BuildArgs {
                input,
                output,
                strict,
                policy: util::step_policy(skip_invalid, abort_invalid),
                frames,
                quiet,
            };
            cmd::build::run(&loaded?, args).await
        }
        Commands::Stats {
            input,
            strict,
            skip_invalid,
            abort_invalid,
        } => {
            let policy = util::step_policy(skip_invalid, abort_invalid);
            cmd::stats::run(&loaded?, &input, strict, policy).await
        }
        Commands::Config {
            list,
            init,
            get,
            set,
            path,
            example,
        } => {
            if list {
                cmd::config::run_list(&config_path).await
            } else if init {
                cmd::config::run_init(&config_path).await
            } else if let Some(key) = get {
                cmd::config::run_get(&config_path, &key).await
            } else if let Some(pair) = set {
                match pair.as_slice() {
                    [key, value] => cmd::config::run_set(&config_path, key, value).await,
                    _ => anyhow::bail!("--set takes a key and a value"),
                }
            } else if path {
                cmd::config::run_path(&config_path).await
            } else if example {
                cmd::config::run_example().await
            } else {
                cmd::config::run_list(&config_path).await
            }
        }
    }
}
