//! Field and table extraction: schema normalization, prompts, JSON recovery
//! and result merging.

pub mod json;
pub mod merge;
pub mod prompt;
pub mod schema;

pub use json::{recover_json, recover_or_raw};
pub use merge::{
    ensure_complete, merge_field_groups, merge_tables, merge_unified, parse_field_group_response,
    parse_table_response, parse_unified_response,
};
pub use schema::normalize;
