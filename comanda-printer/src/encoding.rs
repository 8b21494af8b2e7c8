//! 7-bit text utilities for Western thermal printers
//!
//! The kitchen printers run with the default code page, so only plain
//! ASCII prints reliably. This module provides utilities for:
//! - Transliterating Spanish accented characters and common symbols
//! - Truncating/padding strings to printed column widths
//! - Converting UTF-8 content to ASCII while preserving ESC/POS commands

use tracing::instrument;

/// Replacement for characters with no printable mapping
pub const PLACEHOLDER: char = '?';

/// Ellipsis appended to truncated fields
const ELLIPSIS: &str = "...";

/// Map a single non-ASCII character to its printable form
fn map_char(c: char) -> Option<&'static str> {
    let mapped = match c {
        'á' | 'à' | 'â' | 'ä' => "a",
        'é' | 'è' | 'ê' | 'ë' => "e",
        'í' | 'ì' | 'î' | 'ï' => "i",
        'ó' | 'ò' | 'ô' | 'ö' => "o",
        'ú' | 'ù' | 'û' | 'ü' => "u",
        'Á' | 'À' | 'Â' | 'Ä' => "A",
        'É' | 'È' | 'Ê' | 'Ë' => "E",
        'Í' | 'Ì' | 'Î' | 'Ï' => "I",
        'Ó' | 'Ò' | 'Ô' | 'Ö' => "O",
        'Ú' | 'Ù' | 'Û' | 'Ü' => "U",
        'ñ' => "n",
        'Ñ' => "N",
        'ç' => "c",
        'Ç' => "C",
        '¿' => "?",
        '¡' => "!",
        '€' => "EUR",
        '£' => "GBP",
        '©' => "(c)",
        '®' => "(r)",
        '°' | 'º' => "o",
        'ª' => "a",
        '\u{00A0}' => " ",
        _ => return None,
    };
    Some(mapped)
}

/// Replace ASCII control characters (ESC, GS, line breaks, ...) with spaces
pub fn blank_controls(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_control() { ' ' } else { c })
        .collect()
}

/// Transliterate a string to printable ASCII
///
/// Printable ASCII passes through unchanged, control characters become
/// spaces, known characters are mapped and anything else becomes
/// [`PLACEHOLDER`].
pub fn transliterate(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii_control() {
            out.push(' ');
        } else if c.is_ascii() {
            out.push(c);
        } else if let Some(m) = map_char(c) {
            out.push_str(m);
        } else {
            out.push(PLACEHOLDER);
        }
    }
    out
}

/// Truncate a string to a column width, marking the cut with `...`
///
/// Widths of 3 or less are cut without an ellipsis.
pub fn truncate_ellipsis(s: &str, width: usize) -> String {
    let t = transliterate(s);
    if t.len() <= width {
        return t;
    }
    if width <= ELLIPSIS.len() {
        return t[..width].to_string();
    }
    format!("{}{}", &t[..width - ELLIPSIS.len()], ELLIPSIS)
}

/// Pad a string to a column width
///
/// If the string is longer than the width, it is truncated with an ellipsis.
pub fn pad(s: &str, width: usize, align_right: bool) -> String {
    let t = truncate_ellipsis(s, width);
    let spaces = width - t.len();
    if align_right {
        format!("{}{}", " ".repeat(spaces), t)
    } else {
        format!("{}{}", t, " ".repeat(spaces))
    }
}

/// Convert mixed UTF-8 content (with ESC/POS commands) to printable ASCII
///
/// ASCII bytes (0x00-0x7F) are kept exactly as is, which protects ESC/POS
/// commands from being corrupted. Runs of bytes >= 0x80 are decoded as
/// UTF-8 and transliterated.
#[instrument(skip(bytes))]
pub fn convert_to_ascii(bytes: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(bytes.len());
    let mut buffer = Vec::new();

    for &b in bytes {
        if b < 0x80 {
            flush_buffer(&mut buffer, &mut result);
            result.push(b);
        } else {
            buffer.push(b);
        }
    }
    flush_buffer(&mut buffer, &mut result);

    result
}

/// Flush the non-ASCII buffer, transliterating its UTF-8 text
fn flush_buffer(buffer: &mut Vec<u8>, result: &mut Vec<u8>) {
    if buffer.is_empty() {
        return;
    }
    let text = String::from_utf8_lossy(buffer);
    result.extend_from_slice(transliterate(&text).as_bytes());
    buffer.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transliterate_spanish() {
        assert_eq!(transliterate("DESCRIPCIÓN"), "DESCRIPCION");
        assert_eq!(transliterate("¿Jamón ibérico?"), "?Jamon iberico?");
        assert_eq!(transliterate("Año"), "Ano");
        assert_eq!(transliterate("¡Atención!"), "!Atencion!");
    }

    #[test]
    fn test_transliterate_symbols() {
        assert_eq!(transliterate("16.00€"), "16.00EUR");
        assert_eq!(transliterate("£5"), "GBP5");
        assert_eq!(transliterate("© 2024"), "(c) 2024");
        assert_eq!(transliterate("180°"), "180o");
    }

    #[test]
    fn test_transliterate_unknown() {
        assert_eq!(transliterate("寿司"), "??");
        assert_eq!(transliterate("pizza 🍕"), "pizza ?");
    }

    #[test]
    fn test_control_characters_blanked() {
        assert_eq!(transliterate("a\x1dVA\x10b"), "a VA b");
        assert_eq!(transliterate("línea\nsiguiente\t!"), "linea siguiente !");
        assert_eq!(blank_controls("Peña\x1b@"), "Peña @");
    }

    #[test]
    fn test_truncate_ellipsis() {
        assert_eq!(truncate_ellipsis("Hamburguesa", 8), "Hambu...");
        assert_eq!(truncate_ellipsis("Hamburguesa", 11), "Hamburguesa");
        assert_eq!(truncate_ellipsis("Hamburguesa", 3), "Ham");
        assert_eq!(truncate_ellipsis("Hamburguesa", 0), "");
    }

    #[test]
    fn test_pad() {
        assert_eq!(pad("2", 5, false), "2    ");
        assert_eq!(pad("8.00", 6, true), "  8.00");
        assert_eq!(pad("Pizza Cuatro Quesos", 10, false), "Pizza C...");
        assert_eq!(pad("", 3, false), "   ");
    }

    #[test]
    fn test_convert_preserves_commands() {
        let mut data = vec![0x1B, 0x40, 0x1B, 0x21, 0x10];
        data.extend_from_slice("Señor".as_bytes());
        data.extend_from_slice(&[0x1D, 0x56, 0x41, 0x10]);

        let out = convert_to_ascii(&data);
        assert_eq!(&out[..5], &[0x1B, 0x40, 0x1B, 0x21, 0x10]);
        assert_eq!(&out[5..10], b"Senor");
        assert_eq!(&out[10..], &[0x1D, 0x56, 0x41, 0x10]);
        assert!(out.iter().all(|b| *b < 0x80));
    }
}
