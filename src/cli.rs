use clap::Parser;

#[derive(Parser)]
#[command(name = "vmssh")]
#[command(about = "A TUI for picking a GCP compute instance and opening an SSH session to it")]
pub struct Cli {
    /// GCP project ID to use (skips project selection)
    #[arg(short, long)]
    pub project: Option<String>,
}
