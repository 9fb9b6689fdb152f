//! Best-effort zlib/deflate decompression for a section's record stream.
//!
//! HWP section streams are written as raw deflate, but the corpus this
//! parser sees in practice is not uniform about it, so the format calls
//! for accepting either window-bit convention: `-15` (raw deflate) or
//! `15` (zlib-wrapped). `flate2`'s API only exposes these two modes —
//! there's no distinct "autodetect" decoder to try as a third attempt,
//! and re-running either decoder over the same bytes it just failed on
//! can't succeed the second time, so the probe is genuinely two-attempt.

use flate2::read::{DeflateDecoder, ZlibDecoder};
use log::{debug, trace};
use std::io::Read;

/// Attempt raw deflate (`-15`), then zlib-wrapped (`15`). Returns the
/// original bytes unchanged if both attempts fail — callers proceed with
/// the bytes as-is rather than treating this as fatal.
pub fn decompress_section(data: &[u8]) -> Vec<u8> {
    if let Some(out) = try_raw_deflate(data) {
        trace!("section decompressed via raw deflate ({} bytes)", out.len());
        return out;
    }
    if let Some(out) = try_zlib(data) {
        trace!("section decompressed via zlib header ({} bytes)", out.len());
        return out;
    }
    debug!("section compression probe exhausted, proceeding with raw bytes");
    data.to_vec()
}

fn try_raw_deflate(data: &[u8]) -> Option<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).ok().map(|_| out)
}

fn try_zlib(data: &[u8]) -> Option<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).ok().map(|_| out)
}
