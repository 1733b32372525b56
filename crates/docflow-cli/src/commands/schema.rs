//! Schema command - print the normalized extraction targets.

use std::path::PathBuf;

use clap::Args;
use console::style;

use docflow_core::extraction::schema::{self, fields, tables};

use super::read_json_array;

/// Arguments for the schema command.
#[derive(Args)]
pub struct SchemaArgs {
    /// Requested-fields file (JSON array)
    #[arg(required = true)]
    input: PathBuf,

    /// Print a short field/table listing instead of JSON
    #[arg(long)]
    summary: bool,
}

pub async fn run(args: SchemaArgs) -> anyhow::Result<()> {
    let raw = read_json_array(&args.input)?;
    let targets = schema::normalize(&raw);

    if !args.summary {
        println!("{}", serde_json::to_string_pretty(&targets)?);
        return Ok(());
    }

    println!("{}", style("Fields:").bold());
    for field in fields(&targets) {
        println!("  {} ({})", field.field_name, field.field_datatype);
    }
    for (table, columns) in tables(&targets) {
        println!("{} {}", style("Table:").bold(), table);
        for column in columns {
            println!("  {} ({})", column.field_name, column.field_datatype);
        }
    }

    Ok(())
}
