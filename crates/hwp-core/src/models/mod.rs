pub mod document;
pub mod record;
pub mod table;

pub use document::{ExtractedDocument, ExtractedSection, FileHeaderMeta};
pub use record::{ParaHeaderInfo, Record, RecordHeader};
pub use table::{Table, TableCell};
