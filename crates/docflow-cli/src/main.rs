//! CLI application for document extraction.

mod commands;
mod llm;
mod store;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{assemble, batch, config, marks, merge, run, schema};

/// docflow - Assemble document chunks and merge extracted fields
#[derive(Parser)]
#[command(name = "docflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a chunk file into page-labelled text
    Assemble(assemble::AssembleArgs),

    /// Assemble many chunk files
    Batch(batch::BatchArgs),

    /// Normalize a requested-fields schema
    Schema(schema::SchemaArgs),

    /// Merge saved model responses into one record
    Merge(merge::MergeArgs),

    /// Extract marks from answer-sheet tables
    Marks(marks::MarksArgs),

    /// Run a full extraction job
    Run(run::RunArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Assemble(args) => assemble::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Schema(args) => schema::run(args).await,
        Commands::Merge(args) => merge::run(args).await,
        Commands::Marks(args) => marks::run(args).await,
        Commands::Run(args) => run::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
