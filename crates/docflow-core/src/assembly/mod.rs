//! Chunk text extraction and page assembly.

mod chunk_text;
mod pages;

pub use chunk_text::{extract_text, page_of, strip_markup};
pub use pages::{assemble, page_marker, AssembledDocument, Page, PageAssembler};
