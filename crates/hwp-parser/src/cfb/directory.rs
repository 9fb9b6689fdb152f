use byteorder::{LittleEndian, ReadBytesExt};
use hwp_core::constants::cfb::{DIR_ENTRY_SIZE, MAX_DIRECTORY_NODES, NO_STREAM};
use hwp_core::Result;
use log::warn;
use std::collections::HashMap;

/// The `type` byte of a 128-byte directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Empty,
    Storage,
    Stream,
    Root,
}

impl From<u8> for EntryType {
    fn from(value: u8) -> Self {
        match value {
            1 => EntryType::Storage,
            2 => EntryType::Stream,
            5 => EntryType::Root,
            _ => EntryType::Empty,
        }
    }
}

/// One 128-byte directory record, plus its materialized full path once the
/// tree has been walked.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub name: String,
    pub entry_type: EntryType,
    pub left: i32,
    pub right: i32,
    pub child: i32,
    pub start_sector: u32,
    pub stream_size: u64,
    pub full_path: Option<String>,
}

impl DirectoryEntry {
    fn from_bytes(data: &[u8]) -> Self {
        let name_byte_len = u16::from_le_bytes([data[64], data[65]]) as i32;
        let name_len_bytes = (name_byte_len - 2).clamp(0, 64) as usize;
        let utf16: Vec<u16> = data[0..name_len_bytes]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        let name = String::from_utf16_lossy(&utf16);

        let entry_type = EntryType::from(data[66]);
        let left = i32::from_le_bytes([data[68], data[69], data[70], data[71]]);
        let right = i32::from_le_bytes([data[72], data[73], data[74], data[75]]);
        let child = i32::from_le_bytes([data[76], data[77], data[78], data[79]]);
        let start_sector = u32::from_le_bytes([data[116], data[117], data[118], data[119]]);
        let size_lo = u32::from_le_bytes([data[120], data[121], data[122], data[123]]);
        let size_hi = u32::from_le_bytes([data[124], data[125], data[126], data[127]]);
        let stream_size = if size_hi == 0 {
            size_lo as u64
        } else {
            ((size_hi as u64) << 32) | size_lo as u64
        };

        Self {
            name,
            entry_type,
            left,
            right,
            child,
            start_sector,
            stream_size,
            full_path: None,
        }
    }

    pub fn is_stream(&self) -> bool {
        self.entry_type == EntryType::Stream
    }

    pub fn is_root(&self) -> bool {
        self.entry_type == EntryType::Root
    }
}

/// Parse the directory stream into fixed 128-byte records, truncating a
/// corrupt trailing partial record defensively rather than failing.
pub fn parse_entries(data: &[u8]) -> Vec<DirectoryEntry> {
    let usable = data.len() - (data.len() % DIR_ENTRY_SIZE);
    data[..usable]
        .chunks_exact(DIR_ENTRY_SIZE)
        .map(DirectoryEntry::from_bytes)
        .collect()
}

/// `left, self, child, right` walk from the root's `child` subtree,
/// materializing each stream's `/`-joined full path. Storages are not
/// addressable directly; only stream paths are returned.
///
/// Uses an explicit stack rather than recursion so pathological trees
/// can't blow the call stack, and a visited-node budget guards against a
/// cyclic sibling/child graph in a corrupted directory.
pub fn materialize_paths(entries: &mut [DirectoryEntry]) -> HashMap<String, usize> {
    let mut by_path = HashMap::new();

    let Some(root_idx) = entries.iter().position(|e| e.is_root()) else {
        return by_path;
    };
    entries[root_idx].full_path = Some(String::new());

    // Each stack frame walks one subtree in `left, self, child, right`
    // order; `Enter` visits left-then-self-then-queues-child-and-right,
    // `Visit` assigns the path once we know the parent path.
    enum Frame {
        Enter { idx: i32, parent_path: String },
    }

    let mut stack = vec![Frame::Enter {
        idx: entries[root_idx].child,
        parent_path: String::new(),
    }];
    let mut visited = 0usize;

    while let Some(Frame::Enter { idx, parent_path }) = stack.pop() {
        if idx < 0 || idx == NO_STREAM as i32 {
            continue;
        }
        visited += 1;
        if visited > MAX_DIRECTORY_NODES {
            warn!("directory tree exceeded {MAX_DIRECTORY_NODES} nodes, stopping (likely a cycle)");
            break;
        }
        let Some(entry) = entries.get(idx as usize) else {
            continue;
        };
        let name = entry.name.clone();
        let left = entry.left;
        let right = entry.right;
        let child = entry.child;
        let is_storage = matches!(entry.entry_type, EntryType::Storage);
        let is_stream = entry.is_stream();

        let full_path = if parent_path.is_empty() {
            name.clone()
        } else {
            format!("{parent_path}/{name}")
        };

        // Push in reverse of desired visit order since this is a stack:
        // we want left, self-effects, child, right — self has no
        // children of its own to order against except child/right/left,
        // so push right, then child, then record self, then push left
        // last so it pops first.
        stack.push(Frame::Enter {
            idx: right,
            parent_path: parent_path.clone(),
        });
        stack.push(Frame::Enter {
            idx: child,
            parent_path: full_path.clone(),
        });
        if is_stream {
            by_path.insert(full_path.clone(), idx as usize);
        }
        if let Some(e) = entries.get_mut(idx as usize) {
            e.full_path = Some(full_path);
        }
        let _ = is_storage;
        stack.push(Frame::Enter {
            idx: left,
            parent_path,
        });
    }

    by_path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        name: &str,
        entry_type: EntryType,
        left: i32,
        right: i32,
        child: i32,
    ) -> DirectoryEntry {
        DirectoryEntry {
            name: name.to_string(),
            entry_type,
            left,
            right,
            child,
            start_sector: 0,
            stream_size: 0,
            full_path: None,
        }
    }

    #[test]
    fn materializes_nested_paths() {
        // root -> child: "BodyText" (storage) -> child: "Section0" (stream)
        // root also has sibling "FileHeader" reachable via root.child.right
        let mut entries = vec![
            entry("Root Entry", EntryType::Root, -1, -1, 1),
            entry("BodyText", EntryType::Storage, -1, 2, 3),
            entry("FileHeader", EntryType::Stream, -1, -1, -1),
            entry("Section0", EntryType::Stream, -1, -1, -1),
        ];
        let by_path = materialize_paths(&mut entries);
        assert_eq!(entries[2].full_path.as_deref(), Some("FileHeader"));
        assert_eq!(entries[3].full_path.as_deref(), Some("BodyText/Section0"));
        assert_eq!(by_path.get("BodyText/Section0"), Some(&3));
        assert_eq!(by_path.get("FileHeader"), Some(&2));
        assert!(!by_path.contains_key("BodyText"));
    }

    #[test]
    fn root_has_empty_path() {
        let mut entries = vec![entry("Root Entry", EntryType::Root, -1, -1, -1)];
        materialize_paths(&mut entries);
        assert_eq!(entries[0].full_path.as_deref(), Some(""));
    }
}
