use hwp_core::models::record::{RecordHeader, EXTENDED_SIZE_MARKER};
use hwp_core::Record;
use log::trace;

/// Frames records out of a section's (already decompressed) byte stream.
///
/// Truncation mid-header or mid-payload simply ends iteration rather than
/// raising an error — documents in the wild often carry benign tail
/// garbage, and aborting would lose everything already recovered.
pub struct RecordCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RecordCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }
}

impl<'a> Iterator for RecordCursor<'a> {
    type Item = Record;

    fn next(&mut self) -> Option<Record> {
        if self.pos + 4 > self.data.len() {
            return None;
        }
        let header_bytes = &self.data[self.pos..self.pos + 4];
        let header = RecordHeader::from_u32(u32::from_le_bytes([
            header_bytes[0],
            header_bytes[1],
            header_bytes[2],
            header_bytes[3],
        ]));
        let mut cursor = self.pos + 4;

        let size = if header.has_extended_size() {
            if cursor + 4 > self.data.len() {
                trace!("truncated extended-size word at offset {cursor}, stopping");
                return None;
            }
            let size_bytes = &self.data[cursor..cursor + 4];
            cursor += 4;
            u32::from_le_bytes([size_bytes[0], size_bytes[1], size_bytes[2], size_bytes[3]])
        } else {
            header.inline_size as u32
        };
        let _ = EXTENDED_SIZE_MARKER;

        let end = cursor + size as usize;
        if end > self.data.len() {
            trace!(
                "record tag=0x{:02X} at offset {} claims {} payload bytes but only {} remain, stopping",
                header.tag_id,
                self.pos,
                size,
                self.data.len() - cursor
            );
            return None;
        }

        let payload = self.data[cursor..end].to_vec();
        self.pos = end;
        Some(Record::new(header.tag_id, header.level, payload))
    }
}
