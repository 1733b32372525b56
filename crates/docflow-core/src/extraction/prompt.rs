//! Prompt construction for the three extraction calling conventions.

use std::fmt::Write as _;

use super::schema::{fields, tables};
use crate::models::target::ExtractionTarget;

const TABLE_CONTINUATION_RULES: &str = "\
Tables may continue across pages. Rows on a later page that follow the same column \
pattern belong to the same table, even when the header is repeated or the rows sit \
outside table formatting. Start a new table only when the column structure changes. \
Ignore page furniture such as \"Page 2 of 5\", signatures, headers and footers.";

const JSON_ONLY: &str = "Return ONLY valid JSON. No markdown, no explanation, no text before or after the JSON.";

fn describe(target: &ExtractionTarget) -> String {
    let mut line = format!(
        "- **{}** ({}): {}",
        target.field_name, target.field_datatype, target.field_description
    );
    if !target.field_example.is_empty() {
        let _ = write!(line, " (example: {})", target.field_example);
    }
    line
}

/// One prompt for every field and table of the schema.
pub fn unified_prompt(targets: &[ExtractionTarget], content: &str) -> String {
    let mut out = String::from(
        "You are an extremely accurate information extraction model.\n\
         Extract ALL requested fields and ALL table rows across ALL pages.\n\n",
    );

    out.push_str("## Fields (output as \"fieldName\": value)\n");
    for field in fields(targets) {
        let _ = writeln!(out, "{}", describe(field));
    }

    out.push_str("\n## Tables (output as an items array)\n");
    for (table, columns) in tables(targets) {
        let _ = writeln!(out, "### Table: {}", table);
        for column in columns {
            let _ = writeln!(out, "{}", describe(column));
        }
    }

    let _ = write!(
        out,
        "\n## Rules\n\
         {TABLE_CONTINUATION_RULES}\n\
         Interpret every field and column through its description and return values in \
         the datatype given in parentheses. Use null when no value is found.\n\n\
         ## Output\n\
         {JSON_ONLY}\n\
         Format:\n\
         {{\"fieldName\": value or null, \"TableName\": {{\"fieldType\": \"table\", \
         \"items\": [{{\"col1\": \"...\", \"col2\": \"...\"}}]}}}}\n\n\
         ## Content\n{content}\n\n\
         Now return the final JSON only:"
    );
    out
}

/// Prompt for a group of flat fields.
pub fn field_group_prompt(group: &[&ExtractionTarget], content: &str) -> String {
    let mut out = String::from(
        "You are an information extraction model.\n\
         Extract the requested field values from the content below.\n\n## Fields\n",
    );
    for field in group {
        let _ = writeln!(out, "{}", describe(field));
    }

    let example = group
        .iter()
        .map(|f| format!("\"{}\": \"value or null\"", f.field_name))
        .collect::<Vec<_>>()
        .join(", ");

    let _ = write!(
        out,
        "\n## Content\n{content}\n\n\
         ## Output\n\
         {JSON_ONLY}\n\
         Each key must match the field name exactly; use null for values not present.\n\
         Example: {{{example}}}\n\n\
         Now return the extracted JSON:"
    );
    out
}

/// Prompt for the rows of one table.
pub fn table_prompt(table: &str, columns: &[&ExtractionTarget], content: &str) -> String {
    let mut out = format!(
        "You are a data extraction expert.\n\
         Extract every row of the table named \"{table}\" from the content below.\n\n\
         ## Columns\n"
    );
    for column in columns {
        let _ = writeln!(out, "{}", describe(column));
    }

    let example = columns
        .iter()
        .map(|c| format!("\"{}\": \"value or null\"", c.field_name))
        .collect::<Vec<_>>()
        .join(", ");

    let _ = write!(
        out,
        "\n## Rules\n{TABLE_CONTINUATION_RULES}\n\n\
         ## Content\n{content}\n\n\
         ## Output\n\
         {JSON_ONLY}\n\
         Return one object per row; use null for a missing column.\n\
         Example: {{\"{table}\": [{{{example}}}]}}\n\n\
         Now return the JSON for table \"{table}\" only:"
    );
    out
}
