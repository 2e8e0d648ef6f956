use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "buildmeta",
    version,
    about = "Collect build metadata into a properties file and an XML report"
)]
pub struct Args {
    /// Configuration file, relative to the base directory unless absolute
    #[arg(long, global = true, default_value = "buildmeta.toml")]
    pub config: PathBuf,

    /// Checkout root (defaults to the current directory)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Log filter, e.g. `info` or `buildmeta_core=debug`
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub collect: CollectArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect facts and write the outputs (default)
    Collect(CollectArgs),

    /// Record the elapsed build time in an existing properties file
    Point {
        /// Name of the build point
        #[arg(long)]
        name: Option<String>,

        /// Properties file to update
        #[arg(long)]
        properties_out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Default, ClapArgs)]
pub struct CollectArgs {
    /// Do not query the version-control system
    #[arg(long)]
    pub offline: bool,

    /// Recollect even when a properties file already exists
    #[arg(long)]
    pub force: bool,

    /// Leave out revision and working-copy facts
    #[arg(long)]
    pub skip_scm: bool,

    /// Define a property, `key=value` (repeatable)
    #[arg(long = "define", short = 'D', value_parser = parse_define)]
    pub defines: Vec<(String, String)>,

    /// Where to write the properties file
    #[arg(long)]
    pub properties_out: Option<PathBuf>,

    /// Where to write the XML report
    #[arg(long)]
    pub xml_out: Option<PathBuf>,

    /// Print a summary of the collected facts
    #[arg(long)]
    pub summary: Option<SummaryFormat>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SummaryFormat {
    Json,
    Text,
}

fn parse_define(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        Some(_) => Err(format!("empty key in '{raw}'")),
        None => Ok((raw.trim().to_string(), "true".to_string())),
    }
}
