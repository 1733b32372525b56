//! Subcommands and the file helpers they share.

pub mod assemble;
pub mod batch;
pub mod config;
pub mod marks;
pub mod merge;
pub mod run;
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use console::style;
use serde_json::Value;
use tracing::debug;

use docflow_core::models::chunk::{Chunk, chunks_from_value};
use docflow_core::models::config::DocflowConfig;

/// Default configuration file under the user config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docflow")
        .join("config.json")
}

/// Configuration from `--config`, else the default file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<DocflowConfig> {
    if let Some(path) = config_path {
        return DocflowConfig::from_file(Path::new(path))
            .with_context(|| format!("failed to load config from {}", path));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config at {}", default_path.display());
        Ok(DocflowConfig::from_file(&default_path)?)
    } else {
        Ok(DocflowConfig::default())
    }
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> anyhow::Result<Value> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Read a chunk file: a bare array, `{"chunks": [...]}` or
/// `{"output": {"chunks": [...]}}`.
pub fn read_chunks(path: &Path) -> anyhow::Result<Vec<Chunk>> {
    let payload = read_json(path)?;
    let chunks = chunks_from_value(&payload);
    debug!("{} chunks read from {}", chunks.len(), path.display());
    Ok(chunks)
}

/// Read a JSON array file, e.g. a requested-fields schema.
pub fn read_json_array(path: &Path) -> anyhow::Result<Vec<Value>> {
    match read_json(path)? {
        Value::Array(items) => Ok(items),
        _ => anyhow::bail!("Expected a JSON array in {}", path.display()),
    }
}

/// Write to `output` when given, otherwise print to stdout.
pub fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)?;
            println!("{} Output written to {}", style("✓").green(), path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}
