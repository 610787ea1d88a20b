use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ddr",
    version,
    about = "Merge inspection and thermal extractions and check report narratives against them"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Repair(RepairArgs),
    Merge(MergeArgs),
    Validate(ValidateArgs),
    Report(ReportArgs),
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RepairArgs {
    #[arg(long)]
    pub input: PathBuf,

    /// Defaults to writing the repaired payload to stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct MergeArgs {
    #[arg(long)]
    pub inspection: PathBuf,

    #[arg(long)]
    pub thermal: PathBuf,

    #[arg(long, default_value = "output/merged_data.json")]
    pub output: PathBuf,

    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(long)]
    pub merged: PathBuf,

    #[arg(long)]
    pub narrative: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[arg(long)]
    pub merged: PathBuf,

    #[arg(long)]
    pub narrative: PathBuf,

    #[arg(long)]
    pub validation: Option<PathBuf>,

    #[arg(long, default_value = "N/A")]
    pub inspection_label: String,

    #[arg(long, default_value = "N/A")]
    pub thermal_label: String,

    #[arg(long, default_value = "output/ddr_report.txt")]
    pub output: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[arg(long)]
    pub inspection: PathBuf,

    #[arg(long)]
    pub thermal: PathBuf,

    #[arg(long)]
    pub narrative: Option<PathBuf>,

    #[arg(long, default_value = "output")]
    pub out_dir: PathBuf,

    #[arg(long)]
    pub config: Option<PathBuf>,
}
