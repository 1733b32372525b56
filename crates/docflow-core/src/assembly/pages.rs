//! Page assembly: chunks in arrival order to page-labelled document text.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::chunk_text::{extract_text, page_of};
use crate::models::chunk::Chunk;
use crate::models::config::AssemblyConfig;

/// Assembled document text and the number of labelled page blocks in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledDocument {
    pub text: String,
    pub page_count: usize,
}

impl AssembledDocument {
    pub fn is_empty(&self) -> bool {
        self.page_count == 0
    }
}

/// One page and its deduplicated fragments, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub fragments: Vec<String>,
}

impl Page {
    fn new(number: u32) -> Self {
        Self {
            number,
            fragments: Vec::new(),
        }
    }

    /// Fragments joined by a blank line.
    pub fn text(&self) -> String {
        self.fragments.join("\n\n").trim().to_string()
    }
}

/// Marker line opening each page block.
pub fn page_marker(page: u32) -> String {
    format!("===== CHUNKR PAGE NUMBER {} =====", page)
}

/// Groups chunks into pages and renders labelled document text.
#[derive(Debug, Clone)]
pub struct PageAssembler {
    group_by_page: bool,
    default_page: u32,
}

impl PageAssembler {
    /// Assembler grouping by page, with page 1 as the fallback page.
    pub fn new() -> Self {
        Self {
            group_by_page: true,
            default_page: 1,
        }
    }

    pub fn from_config(config: &AssemblyConfig) -> Self {
        Self::new()
            .with_page_grouping(config.group_by_page)
            .with_default_page(config.default_page)
    }

    /// Set whether chunks are grouped by their resolved page.
    ///
    /// Grouped assembly drops a fragment only when the same text already
    /// appeared on the same page. With grouping off every chunk gets its own
    /// block labelled by position, and a chunk whose text matches any earlier
    /// block is dropped regardless of page.
    pub fn with_page_grouping(mut self, group: bool) -> Self {
        self.group_by_page = group;
        self
    }

    /// Set the page used for chunks without a page number.
    pub fn with_default_page(mut self, page: u32) -> Self {
        self.default_page = page;
        self
    }

    /// Build the page list: ascending page numbers, deduplicated fragments.
    pub fn pages(&self, chunks: &[Chunk]) -> Vec<Page> {
        let mut pages: BTreeMap<u32, Page> = BTreeMap::new();
        let mut seen: HashSet<(u32, String)> = HashSet::new();

        for chunk in chunks {
            let text = extract_text(chunk);
            if text.is_empty() {
                continue;
            }

            let number = page_of(chunk, self.default_page);
            let page = pages.entry(number).or_insert_with(|| Page::new(number));
            if seen.insert((number, text.clone())) {
                page.fragments.push(text);
            }
        }

        pages.into_values().collect()
    }

    /// Raw page number to page text mapping, without labels.
    pub fn assemble_strict(&self, chunks: &[Chunk]) -> BTreeMap<u32, String> {
        self.pages(chunks)
            .into_iter()
            .map(|page| (page.number, page.text()))
            .filter(|(_, text)| !text.is_empty())
            .collect()
    }

    /// Labelled document text and page count.
    ///
    /// No chunks, or no chunk with text, gives an empty document with a
    /// page count of zero.
    pub fn assemble(&self, chunks: &[Chunk]) -> AssembledDocument {
        let blocks = if self.group_by_page {
            self.assemble_strict(chunks)
                .into_iter()
                .map(|(number, text)| format!("{}\n{}", page_marker(number), text))
                .collect::<Vec<_>>()
        } else {
            self.positional_blocks(chunks)
        };

        debug!("assembled {} page blocks from {} chunks", blocks.len(), chunks.len());

        AssembledDocument {
            page_count: blocks.len(),
            text: blocks.join("\n\n"),
        }
    }

    /// One block per chunk, labelled with the chunk's 1-based position.
    /// Repeated texts are kept once, at their first position.
    fn positional_blocks(&self, chunks: &[Chunk]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut blocks = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let text = extract_text(chunk);
            if text.is_empty() || !seen.insert(text.clone()) {
                continue;
            }
            let position = u32::try_from(idx + 1).unwrap_or(u32::MAX);
            blocks.push(format!("{}\n{}", page_marker(position), text));
        }

        blocks
    }
}

impl Default for PageAssembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Assemble with the default settings.
pub fn assemble(chunks: &[Chunk]) -> AssembledDocument {
    PageAssembler::new().assemble(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk(page: u32, text: &str) -> Chunk {
        Chunk::with_content(text).on_page(page)
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(assemble(&[]), AssembledDocument::default());

        let blank = vec![Chunk::default(), Chunk::with_content("   ").on_page(2)];
        let doc = assemble(&blank);
        assert_eq!(doc.text, "");
        assert_eq!(doc.page_count, 0);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_pages_sorted_ascending() {
        let chunks = vec![chunk(3, "three"), chunk(1, "one"), chunk(2, "two")];
        let doc = assemble(&chunks);

        assert_eq!(
            doc.text,
            "===== CHUNKR PAGE NUMBER 1 =====\none\n\n\
             ===== CHUNKR PAGE NUMBER 2 =====\ntwo\n\n\
             ===== CHUNKR PAGE NUMBER 3 =====\nthree"
        );
        assert_eq!(doc.page_count, 3);
    }

    #[test]
    fn test_duplicate_fragments_collapse() {
        let chunks = vec![chunk(1, "A"), chunk(1, "B"), chunk(1, "A")];
        let doc = assemble(&chunks);

        assert_eq!(doc.text, "===== CHUNKR PAGE NUMBER 1 =====\nA\n\nB");
        assert_eq!(doc.page_count, 1);
    }

    #[test]
    fn test_same_text_on_different_pages_is_kept() {
        let chunks = vec![chunk(1, "header"), chunk(2, "header")];
        assert_eq!(assemble(&chunks).page_count, 2);
    }

    #[test]
    fn test_gaps_and_default_page() {
        let chunks = vec![chunk(5, "five"), Chunk::with_content("orphan")];
        let doc = PageAssembler::new().with_default_page(1).assemble(&chunks);

        assert!(doc.text.starts_with("===== CHUNKR PAGE NUMBER 1 =====\norphan"));
        assert!(doc.text.ends_with("===== CHUNKR PAGE NUMBER 5 =====\nfive"));
        assert_eq!(doc.page_count, 2);
    }

    #[test]
    fn test_deterministic() {
        let chunks = vec![chunk(2, "b"), chunk(1, "a"), chunk(2, "c"), chunk(2, "b")];
        let first = assemble(&chunks);
        for _ in 0..5 {
            assert_eq!(assemble(&chunks), first);
        }
    }

    #[test]
    fn test_strict_mapping() {
        let chunks = vec![chunk(2, "b"), chunk(1, "a"), chunk(2, "c")];
        let pages = PageAssembler::new().assemble_strict(&chunks);

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[&1], "a");
        assert_eq!(pages[&2], "b\n\nc");
    }

    #[test]
    fn test_positional_blocks() {
        let chunks = vec![
            chunk(9, "first"),
            Chunk::default(),
            chunk(9, "third"),
            chunk(1, "first"), // same text, other page: dropped
        ];
        let doc = PageAssembler::new().with_page_grouping(false).assemble(&chunks);

        assert_eq!(
            doc.text,
            "===== CHUNKR PAGE NUMBER 1 =====\nfirst\n\n===== CHUNKR PAGE NUMBER 3 =====\nthird"
        );
        assert_eq!(doc.page_count, 2);
    }
}
