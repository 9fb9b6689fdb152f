use hwp_core::constants::tag_id;
use hwp_core::models::record::Record;
use hwp_core::{Table, TableCell};

use super::text::{clean, split_control_runs, CleanMode};

/// Parse a `TABLE` record's header fields: `row_count` at payload offset
/// 4, `col_count` at offset 8 (the bytes in between are reserved flags
/// this parser does not need).
pub fn parse_table_header(payload: &[u8]) -> Option<(u16, u16)> {
    if payload.len() < 10 {
        return None;
    }
    let row_count = u16::from_le_bytes([payload[4], payload[5]]);
    let col_count = u16::from_le_bytes([payload[8], payload[9]]);
    Some((row_count, col_count))
}

/// Reconstruct a table from the records nested directly after a `TABLE`
/// record (`nested` is every record whose level is greater than the
/// table's own level, up to the next sibling or end of stream).
///
/// Each child `LIST_HEADER` at `table_level + 1` is a cell descriptor;
/// every `PARA_TEXT` nested beneath it contributes table-mode-cleaned
/// text, joined with spaces. A table with zero rows, zero columns, or
/// no recovered cells is discarded.
pub fn parse_table(table_level: u16, header_payload: &[u8], nested: &[Record]) -> Option<Table> {
    let (row_count, col_count) = parse_table_header(header_payload)?;
    if row_count == 0 || col_count == 0 {
        return None;
    }

    let cell_level = table_level + 1;
    let mut cells = Vec::new();
    let mut idx = 0usize;

    while idx < nested.len() {
        let record = &nested[idx];
        if record.level == cell_level && record.tag_id == tag_id::LIST_HEADER {
            let cell_end = find_span_end(nested, idx + 1, cell_level);
            if let Some(cell) = parse_cell(&record.payload, &nested[idx + 1..cell_end]) {
                cells.push(cell);
            }
            idx = cell_end;
        } else {
            idx += 1;
        }
    }

    if cells.is_empty() {
        return None;
    }

    Some(Table { row_count, col_count, cells })
}

fn parse_cell(list_header_payload: &[u8], body: &[Record]) -> Option<TableCell> {
    if list_header_payload.len() < 8 {
        return None;
    }
    let col = u16::from_le_bytes([list_header_payload[0], list_header_payload[1]]);
    let row = u16::from_le_bytes([list_header_payload[2], list_header_payload[3]]);
    let col_span = u16::from_le_bytes([list_header_payload[4], list_header_payload[5]]).max(1);
    let row_span = u16::from_le_bytes([list_header_payload[6], list_header_payload[7]]).max(1);

    let mut chunks = Vec::new();
    for record in body {
        if record.tag_id != tag_id::PARA_TEXT {
            continue;
        }
        for run in split_control_runs(&record.payload) {
            let cleaned = clean(&run, CleanMode::Table);
            if !cleaned.is_empty() {
                chunks.push(cleaned);
            }
        }
    }
    let text = chunks.join(" ");

    Some(TableCell { col, row, col_span, row_span, text })
}

/// First index at or after `start` whose level is `<= boundary_level`,
/// i.e. the first record no longer nested beneath it. Returns the slice
/// length if every remaining record stays nested.
fn find_span_end(records: &[Record], start: usize, boundary_level: u16) -> usize {
    records[start..]
        .iter()
        .position(|r| r.level <= boundary_level)
        .map(|offset| start + offset)
        .unwrap_or(records.len())
}
