//! CFB navigation and record-stream parsing for HWP 5.x binary documents.
//!
//! [`extract_document`] is the top-level entry point: open a `.hwp` file,
//! read its `FileHeader` metadata, and parse every `BodyText/Section`
//! stream into paragraphs and tables. [`CfbStore`] and the `parser`
//! submodule's pieces are exposed individually for callers that need
//! finer control (e.g. reading an arbitrary stream by path).

mod cfb;
mod compression;
mod extract;
mod parser;

pub use cfb::{CfbHeader, CfbStore, DirectoryEntry, EntryType};
pub use compression::decompress_section;
pub use extract::extract_document;
pub use parser::{clean, parse_file_header, parse_section, parse_table, CleanMode, RecordCursor};

pub use hwp_core::{
    ExtractedDocument, ExtractedSection, FileHeaderMeta, HwpError, HwpVersion, Record, Result,
    Table, TableCell,
};
