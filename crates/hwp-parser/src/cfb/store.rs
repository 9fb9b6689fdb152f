use super::directory::{self, DirectoryEntry};
use super::fat::{FatTable, MiniFatTable};
use super::header::CfbHeader;
use hwp_core::constants::cfb::is_reserved_sid;
use hwp_core::{HwpError, Result};
use log::{debug, trace};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Random-access, read-only view over the named streams of a CFB
/// container. All allocation tables and the directory are eagerly
/// populated by the constructor; streams themselves are read lazily, on
/// demand, by [`CfbStore::read_stream`].
pub struct CfbStore<R> {
    reader: R,
    header: CfbHeader,
    fat: FatTable,
    mini_fat: MiniFatTable,
    mini_stream: Vec<u8>,
    entries: Vec<DirectoryEntry>,
    by_path: HashMap<String, usize>,
}

impl CfbStore<File> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl CfbStore<Cursor<Vec<u8>>> {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::from_reader(Cursor::new(data))
    }
}

impl<R: Read + Seek> CfbStore<R> {
    pub fn from_reader(mut reader: R) -> Result<Self> {
        let header = CfbHeader::from_reader(&mut reader)?;
        debug!(
            "CFB header: sector_size={}, mini_sector_size={}, mini_stream_cutoff={}",
            header.sector_size(),
            header.mini_sector_size(),
            header.mini_stream_cutoff
        );

        let fat = FatTable::load(&mut reader, &header)?;

        let dir_data = if is_reserved_sid(header.dir_first_sector) {
            Vec::new()
        } else {
            fat.read_chain(&mut reader, &header, header.dir_first_sector, None)?
        };
        let mut entries = directory::parse_entries(&dir_data);
        let by_path = directory::materialize_paths(&mut entries);
        trace!("directory has {} entries, {} addressable streams", entries.len(), by_path.len());

        let mini_fat = MiniFatTable::load(&mut reader, &header, &fat)?;
        let mini_stream = match entries.iter().find(|e| e.is_root()) {
            Some(root) if !is_reserved_sid(root.start_sector) => fat.read_chain(
                &mut reader,
                &header,
                root.start_sector,
                Some(root.stream_size),
            )?,
            _ => Vec::new(),
        };

        Ok(Self {
            reader,
            header,
            fat,
            mini_fat,
            mini_stream,
            entries,
            by_path,
        })
    }

    pub fn header(&self) -> &CfbHeader {
        &self.header
    }

    /// Every directory entry as parsed, in on-disk order, with full paths
    /// already materialized. Intended for diagnostics and tests that need
    /// to inspect storages too, which [`list_streams`](Self::list_streams)
    /// deliberately omits.
    pub fn root_path_entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// Sorted list of every addressable stream path (storages are not
    /// addressable and never appear).
    pub fn list_streams(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.by_path.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn exists(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Read exactly `stream_size` bytes for `path`, routed through the
    /// MiniFAT/MiniStream when the entry's size is below the header's
    /// mini-stream cutoff, otherwise through the regular FAT.
    pub fn read_stream(&mut self, path: &str) -> Result<Vec<u8>> {
        let idx = *self
            .by_path
            .get(path)
            .ok_or_else(|| HwpError::NotFound {
                path: path.to_string(),
            })?;
        let entry = &self.entries[idx];
        let size = entry.stream_size;
        let start = entry.start_sector;

        if size == 0 || is_reserved_sid(start) {
            return Ok(Vec::new());
        }

        let data = if size < self.header.mini_stream_cutoff as u64 {
            self.mini_fat.read_chain(
                &self.mini_stream,
                self.header.mini_sector_size(),
                start,
                Some(size),
            )
        } else {
            self.fat
                .read_chain(&mut self.reader, &self.header, start, Some(size))?
        };
        Ok(data)
    }
}
