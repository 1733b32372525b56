//! Plain text and page number resolution for a single chunk.
//!
//! Both lookups walk an ordered list of sources and stop at the first one
//! that yields a value, so a chunk from any integration that exposes at
//! least one of the known representations resolves.

use scraper::Html;

use crate::models::chunk::{Chunk, Segment};

type TextSource = fn(&Chunk) -> Option<String>;
type PageSource = fn(&Chunk) -> Option<u32>;

/// Text representations, richest first.
const TEXT_SOURCES: &[TextSource] = &[refined_text, raw_content, segment_content, markup];

/// Page number locations, most specific first.
const PAGE_SOURCES: &[PageSource] = &[chunk_page, chunk_metadata_page, segment_page];

/// Extract clean text from a chunk.
///
/// Returns an empty string when the chunk has no usable representation;
/// callers treat that as "no content" and skip the chunk.
pub fn extract_text(chunk: &Chunk) -> String {
    let selected = TEXT_SOURCES
        .iter()
        .find_map(|source| source(chunk))
        .unwrap_or_default();

    if selected.contains('<') && selected.contains('>') {
        strip_markup(&selected)
    } else {
        selected.trim().to_string()
    }
}

/// Resolve the page a chunk belongs to, falling back to `default_page`.
pub fn page_of(chunk: &Chunk, default_page: u32) -> u32 {
    PAGE_SOURCES
        .iter()
        .find_map(|source| source(chunk))
        .unwrap_or(default_page)
}

/// Reduce markup to its text nodes, one per line.
pub fn strip_markup(markup: &str) -> String {
    let fragment = Html::parse_fragment(markup);
    fragment
        .root_element()
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn present(text: &Option<String>) -> Option<String> {
    text.as_ref().filter(|t| !t.is_empty()).cloned()
}

fn refined_text(chunk: &Chunk) -> Option<String> {
    present(&chunk.llm)
}

fn raw_content(chunk: &Chunk) -> Option<String> {
    present(&chunk.content)
}

fn segment_content(chunk: &Chunk) -> Option<String> {
    let joined = chunk
        .segments
        .iter()
        .filter_map(|seg| seg.content.as_deref())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    (!joined.is_empty()).then_some(joined)
}

fn markup(chunk: &Chunk) -> Option<String> {
    present(&chunk.html)
}

fn chunk_page(chunk: &Chunk) -> Option<u32> {
    chunk.page_number
}

fn chunk_metadata_page(chunk: &Chunk) -> Option<u32> {
    chunk.metadata.as_ref().and_then(|m| m.page_number)
}

fn segment_page(chunk: &Chunk) -> Option<u32> {
    chunk.segments.iter().find_map(page_of_segment)
}

fn page_of_segment(segment: &Segment) -> Option<u32> {
    segment
        .page_number
        .or_else(|| segment.metadata.as_ref().and_then(|m| m.page_number))
}
