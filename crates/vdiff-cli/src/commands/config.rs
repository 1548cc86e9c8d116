use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use vdiff_core::pipeline::config::PipelineConfig;

#[derive(Clone, ValueEnum)]
pub enum PresetArg {
    Viewer,
    Editor,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Which defaults to print
    #[arg(long, value_enum, default_value = "viewer")]
    pub preset: PresetArg,

    /// Write config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Print or save a full default PipelineConfig as TOML.
pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = match args.preset {
        PresetArg::Viewer => PipelineConfig::viewer(),
        PresetArg::Editor => PipelineConfig::editor(),
    };
    let toml_str = toml::to_string_pretty(&config)?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &toml_str)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", toml_str);
    }

    Ok(())
}
