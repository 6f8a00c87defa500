use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "quickshare", version)]
#[command(about = "Upload files to a temporary host and share the link as a QR code", long_about = None)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: $QUICKSHARE_CONFIG or config/quickshare.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload one or more files and print the link with a QR code
    Share(ShareArgs),
    /// List the available providers
    Providers,
    /// Print the effective configuration as TOML
    Config,
}

#[derive(clap::Args, Debug)]
pub struct ShareArgs {
    /// Files to share; several files are zipped into one archive
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Provider to upload to (overrides `default_provider`)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Also write the QR code as a PNG image
    #[arg(long, value_name = "PATH")]
    pub save_qr: Option<PathBuf>,
}
