//! WASM bindings for document assembly and extraction merging.
//!
//! This crate provides WebAssembly bindings for use in browsers and Node.js.
//! Values cross the boundary as plain JS objects and arrays.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use docflow_core::assembly::PageAssembler;
use docflow_core::extraction::{merge_unified, parse_unified_response, schema};
use docflow_core::marks::Grid;
use docflow_core::models::chunk::chunks_from_value;
use docflow_core::models::target::ExtractionTarget;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Assemble chunks into page-labelled text.
///
/// Accepts a chunk array or a segmentation payload with `chunks` or
/// `output.chunks`. Returns `{ text, pageCount }`.
#[wasm_bindgen]
pub fn assemble_chunks(chunks: JsValue) -> Result<JsValue, JsValue> {
    let payload: Value = from_js(chunks)?;
    let doc = PageAssembler::new().assemble(&chunks_from_value(&payload));

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Assembled {
        text: String,
        page_count: usize,
    }

    to_js(&Assembled {
        text: doc.text,
        page_count: doc.page_count,
    })
}

/// Normalize a requested-fields array into extraction targets.
#[wasm_bindgen]
pub fn normalize_schema(fields: JsValue) -> Result<JsValue, JsValue> {
    let raw: Vec<Value> = from_js(fields)?;
    to_js(&schema::normalize(&raw))
}

/// Extract marks from an array of row grids.
#[wasm_bindgen]
pub fn extract_marks(tables: JsValue) -> Result<JsValue, JsValue> {
    let grids: Vec<Grid> = from_js(tables)?;
    to_js(&docflow_core::marks::extract_marks(&grids))
}

/// Merges raw model answers against a fixed schema.
#[wasm_bindgen]
pub struct ResultMerger {
    targets: Vec<ExtractionTarget>,
}

#[wasm_bindgen]
impl ResultMerger {
    /// Create a merger for a requested-fields array.
    #[wasm_bindgen(constructor)]
    pub fn new(fields: JsValue) -> Result<ResultMerger, JsValue> {
        let raw: Vec<Value> = from_js(fields)?;
        Ok(Self {
            targets: schema::normalize(&raw),
        })
    }

    /// Number of normalized targets.
    #[wasm_bindgen(getter)]
    pub fn target_count(&self) -> usize {
        self.targets.len()
    }

    /// Merge one unified completion into a schema-complete record.
    #[wasm_bindgen]
    pub fn merge(&self, completion: &str) -> Result<JsValue, JsValue> {
        let record = merge_unified(&parse_unified_response(completion.trim()), &self.targets);
        to_js(&record)
    }
}
