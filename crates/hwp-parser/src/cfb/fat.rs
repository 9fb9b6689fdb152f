use super::header::CfbHeader;
use byteorder::{LittleEndian, ReadBytesExt};
use hwp_core::constants::cfb::{is_reserved_sid, MAX_CHAIN_HOPS};
use hwp_core::{HwpError, Result};
use log::{debug, warn};
use std::io::{Read, Seek, SeekFrom};

/// The fully-linearized regular FAT: index `i` holds the successor of
/// sector `i`, or a reserved marker.
pub struct FatTable {
    entries: Vec<u32>,
}

impl FatTable {
    /// Complete the header-resident DIFAT with any extension sectors, then
    /// concatenate every named FAT sector into one entry array.
    pub fn load<R: Read + Seek>(reader: &mut R, header: &CfbHeader) -> Result<Self> {
        let mut fat_sectors = header.header_difat.clone();

        let mut current = header.difat_first_sector;
        let mut remaining = header.num_difat_sectors;
        let entries_per_sector = (header.sector_size() / 4) as usize;
        let mut hops = 0usize;
        while remaining > 0 && !is_reserved_sid(current) && hops < MAX_CHAIN_HOPS {
            reader.seek(SeekFrom::Start(header.sector_offset(current)))?;
            let mut u32s = Vec::with_capacity(entries_per_sector);
            for _ in 0..entries_per_sector {
                u32s.push(read_u32_or_truncated(reader)?);
            }
            let next = u32s.pop().unwrap_or(hwp_core::constants::cfb::END_OF_CHAIN);
            for sid in u32s {
                if !is_reserved_sid(sid) {
                    fat_sectors.push(sid);
                }
            }
            current = next;
            remaining -= 1;
            hops += 1;
        }

        let mut entries = Vec::with_capacity(fat_sectors.len() * entries_per_sector);
        for sid in fat_sectors {
            reader.seek(SeekFrom::Start(header.sector_offset(sid)))?;
            for _ in 0..entries_per_sector {
                entries.push(read_u32_or_truncated(reader)?);
            }
        }

        debug!("loaded FAT with {} entries", entries.len());
        Ok(Self { entries })
    }

    pub fn next(&self, sid: u32) -> Option<u32> {
        self.entries.get(sid as usize).copied()
    }

    /// Read the full chain starting at `start`, stopping at a reserved
    /// marker, an out-of-range index, or [`MAX_CHAIN_HOPS`] sectors.
    pub fn read_chain<R: Read + Seek>(
        &self,
        reader: &mut R,
        header: &CfbHeader,
        start: u32,
        expected_size: Option<u64>,
    ) -> Result<Vec<u8>> {
        let sector_size = header.sector_size() as usize;
        let mut data = Vec::new();
        let mut current = start;
        let mut hops = 0usize;

        while !is_reserved_sid(current) && hops < MAX_CHAIN_HOPS {
            let Some(next) = self.next(current) else {
                break;
            };
            reader.seek(SeekFrom::Start(header.sector_offset(current)))?;
            let mut buf = vec![0u8; sector_size];
            match reader.read_exact(&mut buf) {
                Ok(()) => data.extend_from_slice(&buf),
                Err(_) => {
                    warn!("short read while following FAT chain at sector {current}");
                    break;
                }
            }
            current = next;
            hops += 1;
        }
        if hops >= MAX_CHAIN_HOPS {
            warn!("FAT chain exceeded {MAX_CHAIN_HOPS} hops, truncating (likely a cycle)");
        }

        if let Some(size) = expected_size {
            data.truncate(size as usize);
        }
        Ok(data)
    }
}

/// The MiniFAT, linearized the same way as the regular FAT, plus the
/// MiniStream bytes it indexes into.
pub struct MiniFatTable {
    entries: Vec<u32>,
}

impl MiniFatTable {
    pub fn load<R: Read + Seek>(
        reader: &mut R,
        header: &CfbHeader,
        fat: &FatTable,
    ) -> Result<Self> {
        if header.num_mini_fat_sectors == 0 || is_reserved_sid(header.mini_fat_first_sector) {
            return Ok(Self { entries: Vec::new() });
        }
        let data = fat.read_chain(reader, header, header.mini_fat_first_sector, None)?;
        let entries = data
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self { entries })
    }

    pub fn next(&self, mini_sid: u32) -> Option<u32> {
        self.entries.get(mini_sid as usize).copied()
    }

    /// Read the full mini-sector chain out of `mini_stream`, stopping at a
    /// reserved marker or [`MAX_CHAIN_HOPS`] mini-sectors.
    pub fn read_chain(
        &self,
        mini_stream: &[u8],
        mini_sector_size: u32,
        start: u32,
        expected_size: Option<u64>,
    ) -> Vec<u8> {
        let mini_sector_size = mini_sector_size as usize;
        let mut data = Vec::new();
        let mut current = start;
        let mut hops = 0usize;

        while !is_reserved_sid(current) && hops < MAX_CHAIN_HOPS {
            let Some(next) = self.next(current) else {
                break;
            };
            let offset = current as usize * mini_sector_size;
            let end = offset + mini_sector_size;
            if end > mini_stream.len() {
                warn!("mini-sector {current} falls outside the mini-stream, truncating read");
                break;
            }
            data.extend_from_slice(&mini_stream[offset..end]);
            current = next;
            hops += 1;
        }

        if let Some(size) = expected_size {
            data.truncate(size as usize);
        }
        data
    }
}

fn read_u32_or_truncated<R: Read>(reader: &mut R) -> Result<u32> {
    match reader.read_u32::<LittleEndian>() {
        Ok(v) => Ok(v),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Err(HwpError::Truncated {
                reason: "FAT/DIFAT sector truncated mid-entry".into(),
            })
        }
        Err(e) => Err(HwpError::Io(e)),
    }
}
