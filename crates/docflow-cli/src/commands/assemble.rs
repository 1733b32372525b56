//! Assemble command - turn one chunk file into page-labelled text.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, info};

use docflow_core::assembly::PageAssembler;

use super::{load_config, read_chunks, write_output};

/// Arguments for the assemble command.
#[derive(Args)]
pub struct AssembleArgs {
    /// Chunk file (JSON)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Label every chunk by its position instead of grouping by page
    #[arg(long)]
    no_group: bool,

    /// Emit the raw page -> text mapping as JSON
    #[arg(long)]
    strict: bool,

    /// Print the page count to stderr
    #[arg(long)]
    show_pages: bool,
}

pub async fn run(args: AssembleArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    info!("Assembling {}", args.input.display());
    let chunks = read_chunks(&args.input)?;

    let assembler = PageAssembler::from_config(&config.assembly)
        .with_page_grouping(config.assembly.group_by_page && !args.no_group);

    let (content, page_count) = if args.strict || config.assembly.strict {
        let pages = assembler.assemble_strict(&chunks);
        (serde_json::to_string_pretty(&pages)?, pages.len())
    } else {
        let doc = assembler.assemble(&chunks);
        (doc.text, doc.page_count)
    };

    if page_count == 0 {
        anyhow::bail!("No text could be assembled from {}", args.input.display());
    }

    write_output(args.output.as_deref(), &content)?;

    if args.show_pages {
        eprintln!("{} {} pages", style("ℹ").blue(), page_count);
    }

    debug!("Total assembly time: {:?}", start.elapsed());

    Ok(())
}
