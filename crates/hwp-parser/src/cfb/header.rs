use byteorder::{LittleEndian, ReadBytesExt};
use hwp_core::constants::cfb::{is_reserved_sid, HEADER_DIFAT_ENTRIES, HEADER_SIZE};
use hwp_core::constants::CFB_SIGNATURE;
use hwp_core::{HwpError, Result};
use std::io::{Read, Seek, SeekFrom};

/// The fixed 512-byte CFB header, plus the header-resident portion of the
/// DIFAT (109 entries, `FREE_SECTOR` filtered out).
#[derive(Debug, Clone)]
pub struct CfbHeader {
    pub sector_shift: u16,
    pub mini_sector_shift: u16,
    pub num_fat_sectors: u32,
    pub dir_first_sector: u32,
    pub mini_stream_cutoff: u32,
    pub mini_fat_first_sector: u32,
    pub num_mini_fat_sectors: u32,
    pub difat_first_sector: u32,
    pub num_difat_sectors: u32,
    pub header_difat: Vec<u32>,
}

impl CfbHeader {
    pub fn sector_size(&self) -> u32 {
        1 << self.sector_shift
    }

    pub fn mini_sector_size(&self) -> u32 {
        1 << self.mini_sector_shift
    }

    /// File offset of sector `sid`. The header occupies the first 512
    /// bytes regardless of the sector size in effect.
    pub fn sector_offset(&self, sid: u32) -> u64 {
        HEADER_SIZE as u64 + sid as u64 * self.sector_size() as u64
    }

    pub fn from_reader<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let mut whole = vec![0u8; HEADER_SIZE];
        reader.read_exact(&mut whole).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                HwpError::Truncated {
                    reason: "file shorter than the 512-byte CFB header".into(),
                }
            } else {
                HwpError::Io(e)
            }
        })?;
        Self::from_bytes(&whole)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(HwpError::Truncated {
                reason: "file shorter than the 512-byte CFB header".into(),
            });
        }
        if data[0..8] != CFB_SIGNATURE {
            return Err(HwpError::BadSignature);
        }

        let mut cur = std::io::Cursor::new(data);
        cur.seek(SeekFrom::Start(0x1E))?;
        let sector_shift = cur.read_u16::<LittleEndian>()?;
        let mini_sector_shift = cur.read_u16::<LittleEndian>()?;

        cur.seek(SeekFrom::Start(0x2C))?;
        let num_fat_sectors = cur.read_u32::<LittleEndian>()?;
        let dir_first_sector = cur.read_u32::<LittleEndian>()?;

        cur.seek(SeekFrom::Start(0x38))?;
        let mini_stream_cutoff = cur.read_u32::<LittleEndian>()?;
        let mini_fat_first_sector = cur.read_u32::<LittleEndian>()?;
        let num_mini_fat_sectors = cur.read_u32::<LittleEndian>()?;
        let difat_first_sector = cur.read_u32::<LittleEndian>()?;
        let num_difat_sectors = cur.read_u32::<LittleEndian>()?;

        cur.seek(SeekFrom::Start(0x4C))?;
        let mut header_difat = Vec::with_capacity(HEADER_DIFAT_ENTRIES);
        for _ in 0..HEADER_DIFAT_ENTRIES {
            let sid = cur.read_u32::<LittleEndian>()?;
            if !is_reserved_sid(sid) {
                header_difat.push(sid);
            }
        }

        Ok(Self {
            sector_shift,
            mini_sector_shift,
            num_fat_sectors,
            dir_first_sector,
            mini_stream_cutoff,
            mini_fat_first_sector,
            num_mini_fat_sectors,
            difat_first_sector,
            num_difat_sectors,
            header_difat,
        })
    }
}
