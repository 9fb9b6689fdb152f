pub mod constants;
pub mod errors;
pub mod models;

pub use constants::{HwpVersion, CFB_SIGNATURE};
pub use errors::{HwpError, Result};
pub use models::{
    ExtractedDocument, ExtractedSection, FileHeaderMeta, ParaHeaderInfo, Record, Table, TableCell,
};
