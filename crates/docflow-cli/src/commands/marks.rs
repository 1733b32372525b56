//! Marks command - extract question marks from answer-sheet tables.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use serde_json::Value;

use docflow_core::marks::{Grid, extract_marks};
use docflow_core::models::marks::{MarksTable, QuestionMark};

use super::{read_json, write_output};

/// Arguments for the marks command.
#[derive(Args)]
pub struct MarksArgs {
    /// Tables file: an array of row grids, or `{"tables": [...]}`
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: MarksFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum MarksFormat {
    /// JSON output
    Json,
    /// One CSV row per question
    Csv,
}

pub async fn run(args: MarksArgs) -> anyhow::Result<()> {
    let payload = read_json(&args.input)?;
    let tables = grids_from_value(&payload)?;
    let marks = extract_marks(&tables);

    let content = match args.format {
        MarksFormat::Json => serde_json::to_string_pretty(&marks)?,
        MarksFormat::Csv => format_csv(&marks)?,
    };

    write_output(args.output.as_deref(), &content)
}

/// Convert table JSON to grids; cells may be strings, numbers or null.
fn grids_from_value(payload: &Value) -> anyhow::Result<Vec<Grid>> {
    let Some(tables) = payload
        .as_array()
        .or_else(|| payload.get("tables").and_then(Value::as_array))
    else {
        anyhow::bail!("Expected an array of tables");
    };

    let grids = tables
        .iter()
        .map(|table| {
            table
                .as_array()
                .map(|rows| {
                    rows.iter()
                        .map(|row| {
                            row.as_array()
                                .map(|cells| cells.iter().map(cell_text).collect())
                                .unwrap_or_default()
                        })
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect();

    Ok(grids)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn format_csv(marks: &MarksTable) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["part", "question", "marks", "answered"])?;

    let rows = marks
        .part_a
        .iter()
        .map(|m| ("A", m))
        .chain(marks.part_bc.iter().map(|m| ("BC", m)));
    for (part, mark) in rows {
        write_mark(&mut wtr, part, mark)?;
    }

    wtr.write_record(["total", "", &marks.totals.grand_total.to_string(), ""])?;

    Ok(String::from_utf8(wtr.into_inner()?)?)
}

fn write_mark(wtr: &mut csv::Writer<Vec<u8>>, part: &str, mark: &QuestionMark) -> anyhow::Result<()> {
    wtr.write_record([
        part,
        &mark.q_no,
        &mark.marks.map(|m| m.to_string()).unwrap_or_default(),
        if mark.answered { "true" } else { "false" },
    ])?;
    Ok(())
}
