//! Config command - inspect, create and validate the docflow configuration.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};
use console::style;

use docflow_core::models::config::{DocflowConfig, ExtractionMode};

use super::{default_config_path, load_config};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration (`--config`, else the default file, else defaults)
    Show,

    /// Write a configuration file, optionally pre-filled with the endpoint and store
    Init(InitArgs),

    /// Check that `run` has what it needs: endpoint, deployment, API key and store
    Check,

    /// Show which configuration file is in effect
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,

    /// Completion endpoint base URL
    #[arg(long)]
    endpoint: Option<String>,

    /// Deployment (model) name
    #[arg(long)]
    deployment: Option<String>,

    /// Store root directory
    #[arg(long)]
    store: Option<PathBuf>,

    /// Extraction calling convention
    #[arg(long, value_enum)]
    mode: Option<Mode>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Unified,
    FieldGroups,
}

impl From<Mode> for ExtractionMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Unified => ExtractionMode::Unified,
            Mode::FieldGroups => ExtractionMode::FieldGroups,
        }
    }
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = load_config(config_path)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Check => check_config(&load_config(config_path)?),
        ConfigCommand::Path => show_path(config_path),
    }
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(default_config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!("{} exists; pass --force to replace it", output_path.display());
    }

    let mut config = DocflowConfig::default();
    if let Some(endpoint) = args.endpoint {
        config.llm.endpoint = endpoint;
    }
    if let Some(deployment) = args.deployment {
        config.llm.deployment = deployment;
    }
    if let Some(root) = args.store {
        config.store.root = root;
    }
    if let Some(mode) = args.mode {
        config.extraction.mode = mode.into();
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(&output_path)?;

    println!("{} Wrote {}", style("✓").green(), output_path.display());
    Ok(())
}

/// Problems that would stop `docflow run` before the first prompt.
fn problems(config: &DocflowConfig) -> Vec<String> {
    let mut found = Vec::new();

    if config.llm.endpoint.trim().is_empty() {
        found.push("llm.endpoint is not set".to_string());
    } else if !config.llm.endpoint.starts_with("http://")
        && !config.llm.endpoint.starts_with("https://")
    {
        found.push(format!("llm.endpoint is not an http(s) URL: {}", config.llm.endpoint));
    }
    if config.llm.deployment.trim().is_empty() {
        found.push("llm.deployment is not set".to_string());
    }
    if std::env::var_os(&config.llm.api_key_env).is_none() {
        found.push(format!("{} is not set", config.llm.api_key_env));
    }
    if config.llm.timeout_secs == 0 {
        found.push("llm.timeout_secs must be positive".to_string());
    }
    if config.extraction.mode == ExtractionMode::FieldGroups
        && config.extraction.field_group_size == 0
    {
        found.push("extraction.field_group_size must be positive".to_string());
    }
    if !config.store.root.join("clusters").is_dir() {
        found.push(format!(
            "store root {} has no clusters/ directory",
            config.store.root.display()
        ));
    }

    found
}

fn check_config(config: &DocflowConfig) -> anyhow::Result<()> {
    let found = problems(config);
    if found.is_empty() {
        println!("{} Configuration is ready", style("✓").green());
        return Ok(());
    }

    for problem in &found {
        eprintln!("{} {}", style("✗").red(), problem);
    }
    anyhow::bail!("{} configuration problem(s)", found.len())
}

/// Report which file `run` reads and whether it is there.
fn show_path(config_path: Option<&str>) -> anyhow::Result<()> {
    let (path, source) = match config_path {
        Some(path) => (PathBuf::from(path), "--config"),
        None => (default_config_path(), "default"),
    };

    let state = match (path.is_file(), config_path.is_some()) {
        (true, _) => style("present").green(),
        (false, true) => style("missing, run will fail").red(),
        (false, false) => style("missing, built-in defaults apply").yellow(),
    };
    println!("{} ({}): {}", path.display(), source, state);

    Ok(())
}
