//! Minimal from-scratch CFB file builder shared by the integration tests.
//!
//! Builds a container with a flat sibling chain of streams directly under
//! root, all routed through the MiniFAT/MiniStream (every fixture stream
//! here is well under the 4096-byte cutoff) and a single regular-FAT
//! sector. This mirrors the crate's own internal test helper but is
//! reimplemented against only the public API surface, since integration
//! tests run as a separate crate.

const SECTOR_SIZE: usize = 512;
const MINI_SECTOR_SIZE: usize = 64;
const MINI_STREAM_CUTOFF: u32 = 4096;
const CFB_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
const END_OF_CHAIN: u32 = 0xFFFF_FFFE;
const FREE_SECTOR: u32 = 0xFFFF_FFFF;

fn pad_to(data: &mut Vec<u8>, multiple: usize) {
    let rem = data.len() % multiple;
    if rem != 0 {
        data.resize(data.len() + (multiple - rem), 0);
    }
}

fn write_entry(name: &str, type_byte: u8, right: i32, start_sector: u32, stream_size: u64) -> [u8; 128] {
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
    buf[68..72].copy_from_slice(&(-1i32).to_le_bytes()); // left
    buf[72..76].copy_from_slice(&right.to_le_bytes());
    buf[76..80].copy_from_slice(&(-1i32).to_le_bytes()); // child
    buf[116..120].copy_from_slice(&start_sector.to_le_bytes());
    buf[120..124].copy_from_slice(&(stream_size as u32).to_le_bytes());
    buf[124..128].copy_from_slice(&0u32.to_le_bytes());
    buf
}

fn push_sector(sectors: &mut Vec<[u8; SECTOR_SIZE]>, data: &[u8]) -> u32 {
    let mut sector = [0u8; SECTOR_SIZE];
    sector[..data.len()].copy_from_slice(data);
    sectors.push(sector);
    (sectors.len() - 1) as u32
}

fn ensure_len(v: &mut Vec<u32>, len: usize) {
    if v.len() < len {
        v.resize(len, FREE_SECTOR);
    }
}

pub fn build_minimal_cfb(streams: &[(&str, Vec<u8>)]) -> Vec<u8> {
    for (_, data) in streams {
        assert!(
            (data.len() as u32) < MINI_STREAM_CUTOFF,
            "this fixture builder only supports mini-stream-routed streams"
        );
    }

    let mut sectors: Vec<[u8; SECTOR_SIZE]> = Vec::new();
    let mut fat: Vec<u32> = Vec::new();

    let mut mini_stream: Vec<u8> = Vec::new();
    let mut mini_start: Vec<u32> = Vec::with_capacity(streams.len());
    let mut mini_fat: Vec<u32> = Vec::new();
    for (_, data) in streams {
        let first_mini_sector = (mini_stream.len() / MINI_SECTOR_SIZE) as u32;
        let mut padded = data.clone();
        pad_to(&mut padded, MINI_SECTOR_SIZE);
        let n_mini_sectors = (padded.len() / MINI_SECTOR_SIZE).max(1);
        mini_stream.extend_from_slice(&padded);
        for i in 0..n_mini_sectors {
            let this = first_mini_sector + i as u32;
            ensure_len(&mut mini_fat, this as usize + 1);
            mini_fat[this as usize] = if i + 1 == n_mini_sectors { END_OF_CHAIN } else { this + 1 };
        }
        mini_start.push(first_mini_sector);
    }

    let root_start = if mini_stream.is_empty() {
        END_OF_CHAIN
    } else {
        let mut padded = mini_stream.clone();
        pad_to(&mut padded, SECTOR_SIZE);
        let mut first = None;
        let mut prev: Option<u32> = None;
        for chunk in padded.chunks(SECTOR_SIZE) {
            let idx = push_sector(&mut sectors, chunk);
            first.get_or_insert(idx);
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

    let mini_fat_first_sector = if mini_fat.is_empty() {
        END_OF_CHAIN
    } else {
        let mut bytes = Vec::new();
        for v in &mini_fat {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        pad_to(&mut bytes, SECTOR_SIZE);
        let mut first = None;
        let mut prev: Option<u32> = None;
        for chunk in bytes.chunks(SECTOR_SIZE) {
            let idx = push_sector(&mut sectors, chunk);
            first.get_or_insert(idx);
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

    let mut dir_bytes = Vec::new();
    let n = streams.len() as i32;
    let root_child = if n == 0 { -1 } else { 1 };
    dir_bytes.extend_from_slice(&write_entry("Root Entry", 5, -1, root_start, mini_stream.len() as u64));
    dir_bytes[76..80].copy_from_slice(&root_child.to_le_bytes());

    for (i, (name, data)) in streams.iter().enumerate() {
        let idx = i as i32 + 1;
        let right = if idx < n { idx + 1 } else { -1 };
        dir_bytes.extend_from_slice(&write_entry(name, 2, right, mini_start[i], data.len() as u64));
    }
    pad_to(&mut dir_bytes, SECTOR_SIZE);
    let mut dir_first = None;
    let mut prev: Option<u32> = None;
    for chunk in dir_bytes.chunks(SECTOR_SIZE) {
        let idx = push_sector(&mut sectors, chunk);
        dir_first.get_or_insert(idx);
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

    ensure_len(&mut fat, sectors.len());
    let fat_sector_index = sectors.len() as u32;
    ensure_len(&mut fat, fat_sector_index as usize + 1);
    fat[fat_sector_index as usize] = 0xFFFF_FFFD;
    let mut fat_bytes = Vec::new();
    for v in &fat {
        fat_bytes.extend_from_slice(&v.to_le_bytes());
    }
    pad_to(&mut fat_bytes, SECTOR_SIZE);
    assert!(fat_bytes.len() / SECTOR_SIZE <= 1, "fixture builder only supports a single FAT sector");
    push_sector(&mut sectors, &fat_bytes);

    let mut header = [0u8; 512];
    header[0..8].copy_from_slice(&CFB_SIGNATURE);
    header[0x1E..0x20].copy_from_slice(&9u16.to_le_bytes());
    header[0x20..0x22].copy_from_slice(&6u16.to_le_bytes());
    header[0x2C..0x30].copy_from_slice(&1u32.to_le_bytes());
    header[0x30..0x34].copy_from_slice(&dir_first.to_le_bytes());
    header[0x38..0x3C].copy_from_slice(&MINI_STREAM_CUTOFF.to_le_bytes());
    header[0x3C..0x40].copy_from_slice(&mini_fat_first_sector.to_le_bytes());
    header[0x40..0x44].copy_from_slice(&(if mini_fat.is_empty() { 0u32 } else { 1u32 }).to_le_bytes());
    header[0x44..0x48].copy_from_slice(&END_OF_CHAIN.to_le_bytes());
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

pub fn utf16le(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

pub fn header_bytes(tag: u16, level: u16, size: u32) -> [u8; 4] {
    let header = (size << 20) | ((level as u32) << 10) | tag as u32;
    header.to_le_bytes()
}

pub fn push_record(buf: &mut Vec<u8>, tag: u16, level: u16, payload: &[u8]) {
    buf.extend_from_slice(&header_bytes(tag, level, payload.len() as u32));
    buf.extend_from_slice(payload);
}

pub fn file_header_bytes(version: u32, compressed: bool) -> Vec<u8> {
    let mut data = vec![0u8; 40];
    data[32..36].copy_from_slice(&version.to_le_bytes());
    data[36..40].copy_from_slice(&(compressed as u32).to_le_bytes());
    data
}

pub fn write_temp_file(bytes: &[u8]) -> tempfile::NamedTempFile {
    let tmp = tempfile::NamedTempFile::new().expect("create temp file");
    std::fs::write(tmp.path(), bytes).expect("write temp file");
    tmp
}
