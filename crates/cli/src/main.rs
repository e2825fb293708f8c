use clap::{Parser, Subcommand};

mod commands;

use commands::{CorrelateArgs, LeadLagArgs, MergeArgs};

#[derive(Parser)]
#[command(name = "mention-lag")]
#[command(about = "Forum mentions and sentiment against stock volume and price", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = "config/Config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge raw forum and market files into per-ticker daily tables
    Merge(MergeArgs),
    /// Correlate mentions and sentiment with volume and price change
    Correlate(CorrelateArgs),
    /// Profile sentiment/price correlation across lead and lag shifts
    LeadLag(LeadLagArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Merge(args) => commands::run_merge(&cli.config, args).await?,
        Commands::Correlate(args) => commands::run_correlate(&cli.config, args)?,
        Commands::LeadLag(args) => commands::run_lead_lag(&cli.config, args)?,
    }

    Ok(())
}
