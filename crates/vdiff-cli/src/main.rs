mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "vdiff", about = "Align two images and visualize their differences")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align image 2 onto image 1 and write every visualization
    Compare(commands::compare::CompareArgs),
    /// Resolve correspondences only and print them as JSON
    Align(commands::align::AlignArgs),
    /// Show image size, working size and marker color
    Info(commands::info::InfoArgs),
    /// Evaluate a region-of-interest fragment against an extent
    Roi(commands::roi::RoiArgs),
    /// Print or save the default pipeline config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Compare(args) => commands::compare::run(args),
        Commands::Align(args) => commands::align::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Roi(args) => commands::roi::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
