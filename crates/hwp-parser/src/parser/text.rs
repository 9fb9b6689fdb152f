use hwp_core::constants::control::control_size_wchars;

/// Which cleaning rules apply to a decoded chunk: paragraph body text, or
/// a table cell's text (joined with spaces rather than kept as separate
/// paragraphs, and normalized more aggressively).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanMode {
    Body,
    Table,
}

/// Split a `PARA_TEXT` payload into the raw (uncleaned) UTF-16LE text runs
/// between control sequences.
///
/// Scans two bytes at a time for the next control code unit — high byte
/// `0x00`, low byte `0x00..=0x1F` — at an even byte offset; a match at an
/// odd offset is not a control and scanning resumes one byte later. Each
/// match's control sequence occupies `control_size_wchars(code)` 16-bit
/// units, which are skipped entirely; the bytes between the cursor and
/// the match are decoded and kept as one run if non-empty. The cursor
/// always strictly advances, even for a size that would otherwise stall.
pub fn split_control_runs(payload: &[u8]) -> Vec<String> {
    let mut runs = Vec::new();
    let mut cursor = 0usize;

    loop {
        match find_next_control(payload, cursor) {
            Some(i) => {
                if i > cursor {
                    push_decoded(&mut runs, &payload[cursor..i]);
                }
                let code = payload[i];
                let span = control_size_wchars(code) * 2;
                let next = i + span;
                cursor = if next > cursor { next } else { cursor + 2 };
            }
            None => {
                if cursor < payload.len() {
                    push_decoded(&mut runs, &payload[cursor..]);
                }
                break;
            }
        }
    }

    runs
}

fn push_decoded(runs: &mut Vec<String>, bytes: &[u8]) {
    if bytes.is_empty() {
        return;
    }
    let units: Vec<u16> = bytes
        .chunks(2)
        .map(|c| if c.len() == 2 { u16::from_le_bytes([c[0], c[1]]) } else { c[0] as u16 })
        .collect();
    let text = String::from_utf16_lossy(&units);
    if !text.is_empty() {
        runs.push(text);
    }
}

fn find_next_control(payload: &[u8], start: usize) -> Option<usize> {
    let mut i = start;
    while i + 1 < payload.len() {
        if i % 2 == 0 && payload[i + 1] == 0x00 && payload[i] <= 0x1F {
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Clean one decoded run per [`CleanMode`]: remap or drop any stray
/// sub-32 code points, strip zero-width marks, normalize whitespace, and
/// trim. Idempotent: `clean(clean(s, m), m) == clean(s, m)`.
pub fn clean(raw: &str, mode: CleanMode) -> String {
    let remapped = remap_control_chars(raw, mode);
    let stripped = strip_zero_width(&remapped);
    let normalized = match mode {
        CleanMode::Body => collapse_newlines(&collapse_run(&stripped, is_space_or_tab, ' '), 3),
        CleanMode::Table => {
            let no_newlines = replace_newlines_with_space(&stripped);
            collapse_run(&no_newlines, |c| c.is_whitespace(), ' ')
        }
    };
    normalized.trim().to_string()
}

fn is_space_or_tab(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn remap_control_chars(s: &str, mode: CleanMode) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        let code = c as u32;
        if code >= 32 {
            out.push(c);
            continue;
        }
        match code {
            9 => out.push('\t'),
            10 => out.push(if mode == CleanMode::Table { ' ' } else { '\n' }),
            13 => out.push(if mode == CleanMode::Table { ' ' } else { '\r' }),
            0x15 => out.push('\n'),
            0x18 => out.push('-'),
            0x1E | 0x1F => out.push(' '),
            0x0B | 0x10 | 0x11 => {}
            _ => {}
        }
    }
    out
}

fn strip_zero_width(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '\u{FEFF}' | '\u{200B}' | '\u{200C}' | '\u{200D}'))
        .collect()
}

fn replace_newlines_with_space(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// Collapse any run of chars matching `is_target` into a single `replacement`.
fn collapse_run(s: &str, is_target: impl Fn(char) -> bool, replacement: char) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_run = false;
    for c in s.chars() {
        if is_target(c) {
            if !in_run {
                out.push(replacement);
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Collapse runs of `threshold` or more `\n` into exactly two.
fn collapse_newlines(s: &str, threshold: usize) -> String {
    let mut out = String::with_capacity(s.len());
    let mut run = 0usize;
    for c in s.chars() {
        if c == '\n' {
            run += 1;
        } else {
            flush_newline_run(&mut out, run, threshold);
            run = 0;
            out.push(c);
        }
    }
    flush_newline_run(&mut out, run, threshold);
    out
}

fn flush_newline_run(out: &mut String, run: usize, threshold: usize) {
    if run == 0 {
        return;
    }
    if run >= threshold {
        out.push_str("\n\n");
    } else {
        for _ in 0..run {
            out.push('\n');
        }
    }
}
