//! Record tag IDs for the BodyText/Section record stream.
//!
//! All defined tags are `0x10 + N`; everything not named here is skipped
//! by the parser rather than rejected.

pub const PARA_HEADER: u16 = 0x42;
pub const PARA_TEXT: u16 = 0x43;
pub const LIST_HEADER: u16 = 0x48;
pub const TABLE: u16 = 0x4D;

/// Lowest tag ID the format defines; values below this are never emitted
/// by a well-formed writer but are not treated as an error, only skipped.
pub const TAG_BASE: u16 = 0x10;
