//! A hand-rolled minimal CFB container builder, used only by this crate's
//! own tests (there is no `zip`/`cfb`-writer dependency in this crate —
//! writing documents is out of scope — so tests build just enough of the
//! format to exercise [`super::store::CfbStore`] against something real).

use hwp_core::constants::CFB_SIGNATURE;

const SECTOR_SIZE: usize = 512;
const MINI_SECTOR_SIZE: usize = 64;
const MINI_STREAM_CUTOFF: u32 = 4096;

fn pad_to(data: &mut Vec<u8>, multiple: usize) {
    let rem = data.len() % multiple;
    if rem != 0 {
        data.resize(data.len() + (multiple - rem), 0);
    }
}

fn write_entry(
    name: &str,
    type_byte: u8,
    left: i32,
    right: i32,
    child: i32,
    start_sector: u32,
    stream_size: u64,
) -> [u8; 128] {
    let mut buf = [0u8; 128];
    let utf16: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
    for (i, unit) in utf16.iter().enumerate().take(32) {
        let bytes = unit.to_le_bytes();
        buf[i * 2] = bytes[0];
        buf[i * 2 + 1] = bytes[1];
    }
    let name_byte_len = ((utf16.len().min(32)) * 2) as u16;
    buf[64..66].copy_from_slice(&name_byte_len.to_le_bytes());
    buf[66] = type_byte;
    buf[68..72].copy_from_slice(&left.to_le_bytes());
    buf[72..76].copy_from_slice(&right.to_le_bytes());
    buf[76..80].copy_from_slice(&child.to_le_bytes());
    buf[116..120].copy_from_slice(&start_sector.to_le_bytes());
    let lo = (stream_size & 0xFFFF_FFFF) as u32;
    let hi = (stream_size >> 32) as u32;
    buf[120..124].copy_from_slice(&lo.to_le_bytes());
    buf[124..128].copy_from_slice(&hi.to_le_bytes());
    buf
}

/// Build a minimal, valid CFB file containing the given top-level streams
/// (all siblings directly under the root storage). Streams shorter than
/// [`MINI_STREAM_CUTOFF`] are routed through a MiniFAT/MiniStream; larger
/// ones go through the regular FAT — exercising both of
/// [`super::store::CfbStore`]'s routing paths.
pub fn build_minimal_cfb(streams: &[(&str, Vec<u8>)]) -> Vec<u8> {
    const END_OF_CHAIN: u32 = 0xFFFF_FFFE;
    const FREE_SECTOR: u32 = 0xFFFF_FFFF;

    let mut sectors: Vec<[u8; SECTOR_SIZE]> = Vec::new();
    let mut fat: Vec<u32> = Vec::new();

    // --- Lay out a regular-FAT chain for each "big" stream. ---
    let mut regular_start: Vec<Option<u32>> = Vec::with_capacity(streams.len());
    for (_, data) in streams {
        if (data.len() as u32) < MINI_STREAM_CUTOFF {
            regular_start.push(None);
            continue;
        }
        let mut padded = data.clone();
        pad_to(&mut padded, SECTOR_SIZE);
        let chunks: Vec<&[u8]> = padded.chunks(SECTOR_SIZE).collect();
        let mut first = None;
        let mut prev: Option<u32> = None;
        for chunk in &chunks {
            let idx = push_sector(&mut sectors, chunk);
            if first.is_none() {
                first = Some(idx);
            }
            if let Some(p) = prev {
                ensure_len(&mut fat, p as usize + 1);
                fat[p as usize] = idx;
            }
            prev = Some(idx);
        }
        if let Some(p) = prev {
            ensure_len(&mut fat, p as usize + 1);
            fat[p as usize] = END_OF_CHAIN;
        }
        regular_start.push(first);
    }

    // --- Build the concatenated MiniStream for "small" streams. ---
    let mut mini_stream: Vec<u8> = Vec::new();
    let mut mini_start: Vec<Option<u32>> = Vec::with_capacity(streams.len());
    let mut mini_fat: Vec<u32> = Vec::new();
    for (_, data) in streams {
        if (data.len() as u32) >= MINI_STREAM_CUTOFF {
            mini_start.push(None);
            continue;
        }
        let first_mini_sector = (mini_stream.len() / MINI_SECTOR_SIZE) as u32;
        let mut padded = data.clone();
        pad_to(&mut padded, MINI_SECTOR_SIZE);
        let n_mini_sectors = padded.len() / MINI_SECTOR_SIZE;
        mini_stream.extend_from_slice(&padded);
        for i in 0..n_mini_sectors {
            let this = first_mini_sector + i as u32;
            ensure_len(&mut mini_fat, this as usize + 1);
            mini_fat[this as usize] = if i + 1 == n_mini_sectors {
                END_OF_CHAIN
            } else {
                this + 1
            };
        }
        mini_start.push(Some(first_mini_sector));
    }

    // --- Allocate the MiniStream itself as a regular-FAT chain. ---
    let root_start = if mini_stream.is_empty() {
        END_OF_CHAIN
    } else {
        let mut padded = mini_stream.clone();
        pad_to(&mut padded, SECTOR_SIZE);
        let chunks: Vec<&[u8]> = padded.chunks(SECTOR_SIZE).collect();
        let mut first = None;
        let mut prev: Option<u32> = None;
        for chunk in &chunks {
            let idx = push_sector(&mut sectors, chunk);
            if first.is_none() {
                first = Some(idx);
            }
            if let Some(p) = prev {
                ensure_len(&mut fat, p as usize + 1);
                fat[p as usize] = idx;
            }
            prev = Some(idx);
        }
        if let Some(p) = prev {
            ensure_len(&mut fat, p as usize + 1);
            fat[p as usize] = END_OF_CHAIN;
        }
        first.unwrap()
    };

    // --- MiniFAT sectors (regular-FAT chain of raw u32 entries). ---
    let mini_fat_first_sector = if mini_fat.is_empty() {
        END_OF_CHAIN
    } else {
        let mut bytes = Vec::new();
        for v in &mini_fat {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        pad_to(&mut bytes, SECTOR_SIZE);
        let chunks: Vec<&[u8]> = bytes.chunks(SECTOR_SIZE).collect();
        let mut first = None;
        let mut prev: Option<u32> = None;
        for chunk in &chunks {
            let idx = push_sector(&mut sectors, chunk);
            if first.is_none() {
                first = Some(idx);
            }
            if let Some(p) = prev {
                ensure_len(&mut fat, p as usize + 1);
                fat[p as usize] = idx;
            }
            prev = Some(idx);
        }
        if let Some(p) = prev {
            ensure_len(&mut fat, p as usize + 1);
            fat[p as usize] = END_OF_CHAIN;
        }
        first.unwrap()
    };

    // --- Directory entries: root, then one flat sibling chain of streams. ---
    let mut dir_bytes = Vec::new();
    let n = streams.len() as i32;
    let root_child = if n == 0 { -1 } else { 1 };
    dir_bytes.extend_from_slice(&write_entry(
        "Root Entry",
        5,
        -1,
        -1,
        root_child,
        root_start,
        mini_stream.len() as u64,
    ));
    for (i, (name, data)) in streams.iter().enumerate() {
        let idx = i as i32 + 1;
        let right = if idx < n { idx + 1 } else { -1 };
        let start = regular_start[i].or(mini_start[i]).unwrap_or(END_OF_CHAIN);
        dir_bytes.extend_from_slice(&write_entry(
            name,
            2,
            -1,
            right,
            -1,
            start,
            data.len() as u64,
        ));
    }
    pad_to(&mut dir_bytes, SECTOR_SIZE);
    let dir_chunks: Vec<&[u8]> = dir_bytes.chunks(SECTOR_SIZE).collect();
    let mut dir_first = None;
    let mut prev: Option<u32> = None;
    for chunk in &dir_chunks {
        let idx = push_sector(&mut sectors, chunk);
        if dir_first.is_none() {
            dir_first = Some(idx);
        }
        if let Some(p) = prev {
            ensure_len(&mut fat, p as usize + 1);
            fat[p as usize] = idx;
        }
        prev = Some(idx);
    }
    if let Some(p) = prev {
        ensure_len(&mut fat, p as usize + 1);
        fat[p as usize] = END_OF_CHAIN;
    }
    let dir_first = dir_first.unwrap_or(END_OF_CHAIN);

    // --- Regular FAT sector(s) holding `fat` itself. ---
    ensure_len(&mut fat, sectors.len());
    let fat_sector_index = sectors.len() as u32;
    ensure_len(&mut fat, fat_sector_index as usize + 1);
    fat[fat_sector_index as usize] = 0xFFFF_FFFD; // FAT_SECTOR marker
    let mut fat_bytes = Vec::new();
    for v in &fat {
        fat_bytes.extend_from_slice(&v.to_le_bytes());
    }
    pad_to(&mut fat_bytes, SECTOR_SIZE);
    assert!(
        fat_bytes.len() / SECTOR_SIZE <= 1,
        "test builder only supports a single FAT sector"
    );
    push_sector(&mut sectors, &fat_bytes);

    // --- Header. ---
    let mut header = [0u8; 512];
    header[0..8].copy_from_slice(&CFB_SIGNATURE);
    header[0x1E..0x20].copy_from_slice(&9u16.to_le_bytes()); // sector_shift
    header[0x20..0x22].copy_from_slice(&6u16.to_le_bytes()); // mini_sector_shift
    header[0x2C..0x30].copy_from_slice(&1u32.to_le_bytes()); // num_fat_sectors
    header[0x30..0x34].copy_from_slice(&dir_first.to_le_bytes());
    header[0x38..0x3C].copy_from_slice(&MINI_STREAM_CUTOFF.to_le_bytes());
    header[0x3C..0x40].copy_from_slice(&mini_fat_first_sector.to_le_bytes());
    header[0x40..0x44]
        .copy_from_slice(&(if mini_fat.is_empty() { 0u32 } else { 1u32 }).to_le_bytes());
    header[0x44..0x48].copy_from_slice(&END_OF_CHAIN.to_le_bytes()); // no DIFAT extension
    header[0x48..0x4C].copy_from_slice(&0u32.to_le_bytes());
    for i in 0..109 {
        let off = 0x4C + i * 4;
        let value = if i == 0 { fat_sector_index } else { FREE_SECTOR };
        header[off..off + 4].copy_from_slice(&value.to_le_bytes());
    }

    let mut out = Vec::with_capacity(512 + sectors.len() * SECTOR_SIZE);
    out.extend_from_slice(&header);
    for sector in &sectors {
        out.extend_from_slice(sector);
    }
    out
}

fn ensure_len(v: &mut Vec<u32>, len: usize) {
    if v.len() < len {
        v.resize(len, 0xFFFF_FFFF);
    }
}

fn push_sector(sectors: &mut Vec<[u8; SECTOR_SIZE]>, data: &[u8]) -> u32 {
    let mut sector = [0u8; SECTOR_SIZE];
    sector[..data.len()].copy_from_slice(data);
    sectors.push(sector);
    (sectors.len() - 1) as u32
}
