//! Text utilities for single-byte thermal printers
//!
//! The printer has no font fallback and no error channel, so text is
//! cleaned instead of rejected:
//! - Item names are reduced to printable ASCII
//! - Header text is encoded to Windows-1252, dropping what does not map
//!
//! All widths are counted in characters, before encoding.

/// Appended to names cut at the field width
pub const ELLIPSIS: &str = "...";

/// Reduce a string to printable ASCII (0x20..=0x7E) and trim it
///
/// Control bytes (NUL and SOH included), DEL and every non-ASCII character
/// are dropped.
pub fn sanitize_text(s: &str) -> String {
    let kept: String = s.chars().filter(|c| matches!(c, ' '..='~')).collect();
    kept.trim().to_string()
}

/// Display width in columns (one column per character)
pub fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Truncate to `max_width` characters, ending in `...` when cut
///
/// The result never exceeds `max_width`.
pub fn truncate_with_ellipsis(s: &str, max_width: usize) -> String {
    if text_width(s) <= max_width {
        return s.to_string();
    }
    if max_width < ELLIPSIS.len() {
        return ELLIPSIS[..max_width].to_string();
    }

    let mut result: String = s.chars().take(max_width - ELLIPSIS.len()).collect();
    result.push_str(ELLIPSIS);
    result
}

/// Pad a string to a specific width
///
/// If the string is longer than the width, it will be truncated.
pub fn pad_text(s: &str, width: usize, align_right: bool) -> String {
    let current_width = text_width(s);
    if current_width >= width {
        return s.chars().take(width).collect();
    }
    let spaces = width - current_width;
    if align_right {
        format!("{}{}", " ".repeat(spaces), s)
    } else {
        format!("{}{}", s, " ".repeat(spaces))
    }
}

/// Encode text to Windows-1252 bytes
///
/// Control characters and characters with no Windows-1252 byte are dropped,
/// so the output never contains anything the printer would read as a
/// command.
pub fn encode_cp1252(s: &str) -> Vec<u8> {
    let mut result = Vec::with_capacity(s.len());
    let mut tmp = [0u8; 4];

    for c in s.chars() {
        if c.is_control() {
            continue;
        }
        if c.is_ascii() {
            result.push(c as u8);
            continue;
        }

        let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode(c.encode_utf8(&mut tmp));
        if !had_errors && bytes.len() == 1 {
            result.push(bytes[0]);
        }
    }

    result
}
