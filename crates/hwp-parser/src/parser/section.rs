use log::trace;

use hwp_core::constants::tag_id;
use hwp_core::models::record::Record;
use hwp_core::{ExtractedSection, ParaHeaderInfo};

use super::record::RecordCursor;
use super::table::parse_table;
use super::text::{clean, split_control_runs, CleanMode};

/// Parse one (already decompressed) section stream into its paragraphs
/// and tables.
///
/// Top-level iteration: `PARA_HEADER` is read and kept only for a
/// cross-check trace against the `PARA_TEXT` that follows it (not
/// required for text emission), `PARA_TEXT` emits each cleaned chunk as
/// its own paragraph, `TABLE` reconstructs nested cells from the records
/// that follow it at a deeper level, and every other tag is skipped.
pub fn parse_section(data: &[u8]) -> ExtractedSection {
    let records: Vec<Record> = RecordCursor::new(data).collect();
    let mut section = ExtractedSection::default();

    let mut idx = 0usize;
    let mut pending_para_header: Option<ParaHeaderInfo> = None;
    while idx < records.len() {
        let record = &records[idx];
        match record.tag_id {
            tag_id::PARA_HEADER => {
                pending_para_header = parse_para_header(&record.payload);
                idx += 1;
            }
            tag_id::PARA_TEXT => {
                let mut decoded_chars = 0usize;
                for run in split_control_runs(&record.payload) {
                    decoded_chars += run.chars().count();
                    let cleaned = clean(&run, CleanMode::Body);
                    if !cleaned.is_empty() {
                        section.paragraphs.push(cleaned);
                    }
                }
                if let Some(info) = pending_para_header.take() {
                    trace!(
                        "para_header declared {} chars, para_text decoded {decoded_chars}",
                        info.nchars
                    );
                }
                idx += 1;
            }
            tag_id::TABLE => {
                let span_end = find_span_end(&records, idx + 1, record.level);
                if let Some(table) = parse_table(record.level, &record.payload, &records[idx + 1..span_end]) {
                    section.tables.push(table);
                }
                idx = span_end;
            }
            _ => {
                idx += 1;
            }
        }
    }

    section
}

/// Read a `PARA_HEADER` payload's declared character count (`payload[0..4]`
/// as a little-endian u32, MSB cleared). `None` on a truncated payload —
/// this is advisory metadata, so a malformed record here is skipped
/// rather than aborting the section.
fn parse_para_header(payload: &[u8]) -> Option<ParaHeaderInfo> {
    if payload.len() < 4 {
        return None;
    }
    let raw = u32::from_le_bytes([payload[0], payload[1], payload[2], payload[3]]);
    Some(ParaHeaderInfo {
        nchars: raw & 0x7FFF_FFFF,
    })
}

fn find_span_end(records: &[Record], start: usize, boundary_level: u16) -> usize {
    records[start..]
        .iter()
        .position(|r| r.level <= boundary_level)
        .map(|offset| start + offset)
        .unwrap_or(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16le(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    fn header_bytes(tag: u16, level: u16, size: u32) -> [u8; 4] {
        let header = (size << 20) | ((level as u32) << 10) | tag as u32;
        header.to_le_bytes()
    }

    fn push_record(buf: &mut Vec<u8>, tag: u16, level: u16, payload: &[u8]) {
        buf.extend_from_slice(&header_bytes(tag, level, payload.len() as u32));
        buf.extend_from_slice(payload);
    }

    #[test]
    fn s1_empty_body_yields_no_paragraphs() {
        let section = parse_section(&[]);
        assert!(section.paragraphs.is_empty());
        assert!(section.tables.is_empty());
    }

    #[test]
    fn s2_single_paragraph_hi() {
        let mut data = Vec::new();
        push_record(&mut data, tag_id::PARA_HEADER, 0, &[0; 4]);
        let mut text = utf16le("Hi!");
        text.extend_from_slice(&[0x0D, 0x00, 0x0A, 0x00]);
        push_record(&mut data, tag_id::PARA_TEXT, 0, &text);

        let section = parse_section(&data);
        assert_eq!(section.paragraphs, vec!["Hi!".to_string()]);
    }

    #[test]
    fn table_record_consumes_its_nested_span() {
        let mut data = Vec::new();
        let mut table_header = vec![0u8; 10];
        table_header[4..6].copy_from_slice(&1u16.to_le_bytes());
        table_header[8..10].copy_from_slice(&1u16.to_le_bytes());
        push_record(&mut data, tag_id::TABLE, 0, &table_header);

        let mut list_header = vec![0u8; 8];
        list_header[4..6].copy_from_slice(&1u16.to_le_bytes());
        list_header[6..8].copy_from_slice(&1u16.to_le_bytes());
        push_record(&mut data, tag_id::LIST_HEADER, 1, &list_header);
        push_record(&mut data, tag_id::PARA_TEXT, 2, &utf16le("cell"));

        // a sibling paragraph after the table must still be parsed
        push_record(&mut data, tag_id::PARA_TEXT, 0, &utf16le("after"));

        let section = parse_section(&data);
        assert_eq!(section.tables.len(), 1);
        assert_eq!(section.tables[0].cells[0].text, "cell");
        assert_eq!(section.paragraphs, vec!["after".to_string()]);
    }

    #[test]
    fn unknown_tags_are_skipped() {
        let mut data = Vec::new();
        push_record(&mut data, 0x99, 0, &[1, 2, 3]);
        push_record(&mut data, tag_id::PARA_TEXT, 0, &utf16le("ok"));
        let section = parse_section(&data);
        assert_eq!(section.paragraphs, vec!["ok".to_string()]);
    }
}
