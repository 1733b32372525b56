//! Merge command - combine saved model responses into one record.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use tracing::{debug, info};

use docflow_core::extraction::{
    ensure_complete, merge_field_groups, merge_tables, merge_unified, parse_field_group_response,
    parse_table_response, parse_unified_response, schema,
};

use super::{read_json_array, write_output};

/// Arguments for the merge command.
#[derive(Args)]
pub struct MergeArgs {
    /// Raw response files, in call order
    #[arg(required = true)]
    responses: Vec<PathBuf>,

    /// Requested-fields file the responses answer
    #[arg(short, long)]
    schema: PathBuf,

    /// Calling convention the responses came from
    #[arg(short, long, value_enum, default_value = "unified")]
    mode: MergeMode,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MergeMode {
    /// One response covering fields and tables
    Unified,
    /// One response per field group; later files win
    Fields,
    /// One response per table, named after the table (`<table>.txt`)
    Tables,
}

pub async fn run(args: MergeArgs) -> anyhow::Result<()> {
    let targets = schema::normalize(&read_json_array(&args.schema)?);
    info!("{} targets in schema", targets.len());

    let mut responses = Vec::with_capacity(args.responses.len());
    for path in &args.responses {
        responses.push((path, fs::read_to_string(path)?));
    }

    let record = match args.mode {
        MergeMode::Unified => {
            if responses.len() > 1 {
                anyhow::bail!("Unified mode takes exactly one response file");
            }
            let (_, raw) = &responses[0];
            merge_unified(&parse_unified_response(raw.trim()), &targets)
        }
        MergeMode::Fields => {
            let groups: Vec<_> = responses
                .iter()
                .map(|(_, raw)| parse_field_group_response(raw.trim(), &[]))
                .collect();
            let mut record = merge_field_groups(&groups, &targets);
            ensure_complete(&mut record, &targets);
            record
        }
        MergeMode::Tables => {
            let mut tables = BTreeMap::new();
            for (path, raw) in &responses {
                let Some(table) = path.file_stem().and_then(|s| s.to_str()) else {
                    anyhow::bail!("Cannot derive a table name from {}", path.display());
                };
                debug!("{} answers table '{}'", path.display(), table);
                tables.insert(table.to_string(), parse_table_response(table, raw.trim()));
            }
            let mut record = merge_tables(&tables, &targets);
            ensure_complete(&mut record, &targets);
            record
        }
    };

    write_output(args.output.as_deref(), &serde_json::to_string_pretty(&record)?)
}
