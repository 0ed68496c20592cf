//! Parsing of uploaded transcription index files.

use std::collections::HashMap;
use std::path::Path;

/// Result of parsing an index file: the id → text mapping plus the number of
/// non-blank lines that were dropped for having the wrong field count.
#[derive(Debug, Default)]
pub struct ParsedIndex {
    pub entries: HashMap<String, String>,
    pub skipped: usize,
}

/// Parse an index file from disk.
///
/// Fails only on open/decode errors; malformed lines never abort the parse.
/// The returned map carries no meaningful order — callers that need one
/// apply natural sort themselves.
pub fn parse_index_file(path: &Path) -> std::io::Result<ParsedIndex> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_index_str(&text))
}

/// Parse index text: one `audio_id|text` record per line.
///
/// A line is accepted only if splitting on `|` yields exactly two fields;
/// empty text is representable. On duplicate ids the later line wins. Blank
/// lines are ignored without counting; other malformed lines increment
/// `skipped`.
pub fn parse_index_str(text: &str) -> ParsedIndex {
    let mut parsed = ParsedIndex::default();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split('|').collect();
        if parts.len() == 2 {
            parsed
                .entries
                .insert(base_name(parts[0]).to_string(), parts[1].to_string());
        } else {
            parsed.skipped += 1;
        }
    }

    parsed
}

/// Strip directory components from an id field, so `wavs/clip1` and `clip1`
/// key the same entry.
pub fn base_name(raw: &str) -> &str {
    raw.rsplit(['/', '\\']).next().unwrap_or(raw)
}
