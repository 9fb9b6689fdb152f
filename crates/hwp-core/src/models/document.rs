use crate::models::Table;

/// The two fields the `FileHeader` stream actually yields to this crate.
///
/// Either field is `None` when the stream is too short to carry it; per
/// the error-handling policy this is not a parse error, only an
/// incomplete-metadata result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileHeaderMeta {
    pub version: Option<String>,
    pub compressed: Option<bool>,
}

/// The paragraphs and tables recovered from one `BodyText/SectionN` stream,
/// in record order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractedSection {
    pub paragraphs: Vec<String>,
    pub tables: Vec<Table>,
}

impl ExtractedSection {
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty() && self.tables.is_empty()
    }
}

/// The full in-process result of extracting one HWP 5.x document: header
/// metadata plus one [`ExtractedSection`] per `BodyText/SectionN` stream,
/// in section order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractedDocument {
    pub metadata: FileHeaderMeta,
    pub sections: Vec<ExtractedSection>,
}

impl ExtractedDocument {
    /// All paragraphs across all sections, concatenated in section order.
    pub fn all_paragraphs(&self) -> Vec<&str> {
        self.sections
            .iter()
            .flat_map(|s| s.paragraphs.iter().map(String::as_str))
            .collect()
    }

    /// All tables across all sections, concatenated in section order.
    pub fn all_tables(&self) -> Vec<&Table> {
        self.sections.iter().flat_map(|s| s.tables.iter()).collect()
    }
}
