use thiserror::Error;

/// Error taxonomy for the CFB backbone and the HWP record parser.
///
/// CFB-backbone errors (`Io`, `BadSignature`, `Truncated`, `NotFound`) are
/// fatal: they surface from `CfbStore` construction or `read_stream`.
/// Inside a section's record stream, malformed data is handled by
/// best-effort continuation rather than by returning one of these —
/// see the parser module docs for that policy.
#[derive(Error, Debug)]
pub enum HwpError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad CFB signature: expected D0CF11E0A1B11AE1")]
    BadSignature,

    #[error("truncated CFB container: {reason}")]
    Truncated { reason: String },

    #[error("stream not found: {path}")]
    NotFound { path: String },
}

pub type Result<T> = std::result::Result<T, HwpError>;
