use crate::CleanError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];
const DELIMITER_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf8Bom,
    Utf16Le,
    Utf16Be,
    Latin1,
}

impl TextEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Bom => "utf-8-sig",
            TextEncoding::Utf16Le => "utf-16le",
            TextEncoding::Utf16Be => "utf-16be",
            TextEncoding::Latin1 => "latin-1",
        }
    }
}

/// Decodes spreadsheet exports: BOM-marked UTF-8/UTF-16 first, then plain
/// UTF-8, then Latin-1, which accepts any byte sequence.
pub fn decode_text(bytes: &[u8]) -> Result<(String, TextEncoding), CleanError> {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return Ok(match std::str::from_utf8(rest) {
            Ok(text) => (text.to_string(), TextEncoding::Utf8Bom),
            Err(_) => (latin1(rest), TextEncoding::Latin1),
        });
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        return decode_utf16(rest, u16::from_le_bytes).map(|text| (text, TextEncoding::Utf16Le));
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        return decode_utf16(rest, u16::from_be_bytes).map(|text| (text, TextEncoding::Utf16Be));
    }

    Ok(match std::str::from_utf8(bytes) {
        Ok(text) => (text.to_string(), TextEncoding::Utf8),
        Err(_) => (latin1(bytes), TextEncoding::Latin1),
    })
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String, CleanError> {
    if bytes.len() % 2 != 0 {
        return Err(CleanError::Decode(
            "utf-16 input has an odd number of bytes".to_string(),
        ));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| unit([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|err| CleanError::Decode(err.to_string()))
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| char::from(byte)).collect()
}

/// Picks the candidate delimiter that occurs most often, outside quotes, on
/// the first non-blank line. Ties go to the earlier candidate.
pub fn sniff_delimiter(text: &str) -> u8 {
    let Some(header) = text.lines().find(|line| !line.trim().is_empty()) else {
        return b',';
    };

    let mut counts = [0usize; DELIMITER_CANDIDATES.len()];
    let mut in_quotes = false;
    for byte in header.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(slot) = DELIMITER_CANDIDATES.iter().position(|&c| c == byte) {
            counts[slot] += 1;
        }
    }

    let mut best = 0;
    for slot in 1..counts.len() {
        if counts[slot] > counts[best] {
            best = slot;
        }
    }
    DELIMITER_CANDIDATES[best]
}
