//! The control-character size table referenced by the paragraph-text scanner.
//!
//! Control codes are 16-bit code units whose low byte is `0x00..=0x1F`; each
//! one occupies a fixed number of WCHARs (16-bit code units) that the text
//! scanner must skip over before resuming plain-text decoding.

/// Number of WCHARs a control sequence starting with `code` occupies.
/// Unknown codes (never observed, but the table is total) default to 1.
pub fn control_size_wchars(code: u8) -> usize {
    match code {
        0x00 | 0x0A | 0x0D | 0x18 | 0x1E | 0x1F => 1,
        0x01..=0x17 => 8,
        _ => 1,
    }
}
