use hwp_core::constants::HwpVersion;
use hwp_core::FileHeaderMeta;

/// Interpret the `FileHeader` stream's version and compression-flag
/// fields. Either field is `None` when the stream is too short to carry
/// it — not a parse error, per the error-handling policy that only CFB
/// backbone failures are fatal.
pub fn parse_file_header(data: &[u8]) -> FileHeaderMeta {
    let version = if data.len() >= 36 {
        let raw = u32::from_le_bytes([data[32], data[33], data[34], data[35]]);
        Some(HwpVersion::from_u32(raw).to_string())
    } else {
        None
    };

    let compressed = if data.len() >= 40 {
        let flags = u32::from_le_bytes([data[36], data[37], data[38], data[39]]);
        Some(flags & 0x1 != 0)
    } else {
        None
    };

    FileHeaderMeta {
        version,
        compressed,
    }
}
