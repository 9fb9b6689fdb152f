use std::path::Path;

use hwp_core::{ExtractedDocument, Result};
use log::debug;

use crate::cfb::CfbStore;
use crate::compression::decompress_section;
use crate::parser::{parse_file_header, parse_section};

const FILE_HEADER_STREAM: &str = "FileHeader";

/// Open a CFB file, read its metadata, and parse every `BodyText/Section`
/// stream it contains.
///
/// Sections are discovered by probing `BodyText/Section0`,
/// `BodyText/Section1`, … and stopping at the first index that does not
/// exist; a document with no sections yields an empty list, not an
/// error. Each section is zlib-decompressed when the `FileHeader`
/// compression flag is set.
pub fn extract_document<P: AsRef<Path>>(path: P) -> Result<ExtractedDocument> {
    let mut store = CfbStore::open(path)?;

    let metadata = if store.exists(FILE_HEADER_STREAM) {
        parse_file_header(&store.read_stream(FILE_HEADER_STREAM)?)
    } else {
        Default::default()
    };
    let compressed = metadata.compressed.unwrap_or(true);

    let mut sections = Vec::new();
    for index in 0.. {
        let path = format!("BodyText/Section{index}");
        if !store.exists(&path) {
            break;
        }
        let raw = store.read_stream(&path)?;
        let data = if compressed { decompress_section(&raw) } else { raw };
        debug!("parsing {path} ({} bytes)", data.len());
        sections.push(parse_section(&data));
    }

    Ok(ExtractedDocument { metadata, sections })
}
