//! Run command - full extraction job over a chunk file.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::{debug, error, info};

use docflow_core::error::DocflowError;
use docflow_core::models::chunk::Chunk;
use docflow_core::pipeline::{JobOutcome, JobRequest, Pipeline, Segmenter, abandon};

use super::{load_config, read_chunks};
use crate::llm::ChatClient;
use crate::store::DirectoryStore;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Segmentation output for the file (JSON chunk file)
    #[arg(long)]
    chunks: PathBuf,

    /// Owner of the cluster
    #[arg(long)]
    user: String,

    /// Cluster holding the requested fields
    #[arg(long)]
    cluster: String,

    /// File being processed
    #[arg(long)]
    file: String,

    /// Credit issued for this job
    #[arg(long)]
    credit: Option<String>,

    /// Job id to report status under
    #[arg(long)]
    job: Option<String>,

    /// Store root (overrides store.root from config)
    #[arg(long)]
    store: Option<PathBuf>,
}

/// Segmenter that serves chunks already read from disk.
struct ChunkFile {
    path: PathBuf,
    chunks: Vec<Chunk>,
}

impl Segmenter for ChunkFile {
    fn segment(&self, job: &JobRequest) -> docflow_core::Result<Vec<Chunk>> {
        if self.chunks.is_empty() {
            return Err(DocflowError::Segmentation(format!(
                "{} has no chunks for file {}",
                self.path.display(),
                job.file_id
            )));
        }
        Ok(self.chunks.clone())
    }
}

pub async fn run(args: RunArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let segmenter = ChunkFile {
        chunks: read_chunks(&args.chunks)?,
        path: args.chunks,
    };
    let store = DirectoryStore::new(args.store.unwrap_or_else(|| config.store.root.clone()));

    let job = JobRequest {
        user_id: args.user,
        cluster_id: args.cluster,
        file_id: args.file,
        credit_id: args.credit,
        job_id: args.job,
    };
    info!("Running job for file {}", job.file_id);

    // the blocking HTTP client must be built and dropped off the runtime
    let outcome = tokio::task::spawn_blocking(move || match ChatClient::from_config(&config.llm) {
        Ok(llm) => Pipeline::new(&config, &segmenter, &llm, &store).run(&job),
        Err(e) => {
            let reason = e.to_string();
            error!("file {} not started: {}", job.file_id, reason);
            abandon(&store, &job, &reason);
            JobOutcome::Failed { reason }
        }
    })
    .await?;

    debug!("Job finished in {:?}", start.elapsed());

    match outcome {
        JobOutcome::Completed { page_count, record } => {
            println!("{}", serde_json::to_string_pretty(&record)?);
            eprintln!(
                "{} Extracted {} values from {} pages",
                style("✓").green(),
                record.len(),
                page_count
            );
            Ok(())
        }
        JobOutcome::Failed { reason } => anyhow::bail!("Job failed: {}", reason),
    }
}
