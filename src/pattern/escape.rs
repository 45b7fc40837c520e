// Tue Jan 13 2026 - Alex

//! Byte-literal escape handling for raw patterns.
//!
//! Raw pattern text is written the way a byte string literal would be, so
//! `\x41` is the byte `A` before the engine ever sees it. Decoding only knows
//! a fixed table of escapes; anything else is kept verbatim and reaches the
//! engine as an engine escape (`\d`, `\.` and so on). Note that `\b` decodes
//! to a backspace byte; write `\\b` for a word boundary.

use std::fmt::Write;

pub fn decode(text: &str) -> Result<Vec<u8>, String> {
    let mut out = Vec::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if !c.is_ascii() {
            return Err(format!("non-ASCII character {:?} in raw pattern", c));
        }
        if c != '\\' {
            out.push(c as u8);
            continue;
        }

        let Some(esc) = chars.next() else {
            // a lone trailing backslash is left for the engine to reject
            out.push(b'\\');
            break;
        };

        match esc {
            '\\' => out.push(b'\\'),
            '\'' => out.push(b'\''),
            '"' => out.push(b'"'),
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '\n' => {}
            'x' => {
                let hi = chars.next();
                let lo = chars.next();
                match (hi, lo) {
                    (Some(h), Some(l)) if h.is_ascii_hexdigit() && l.is_ascii_hexdigit() => {
                        out.push((hex_value(h as u8) << 4) | hex_value(l as u8));
                    }
                    _ => return Err("truncated \\xXX escape".to_string()),
                }
            }
            '0'..='7' => {
                let mut value = esc.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if value > 0xff {
                    return Err(format!("octal escape value {:o} out of range", value));
                }
                out.push(value as u8);
            }
            other if other.is_ascii() => {
                out.push(b'\\');
                out.push(other as u8);
            }
            other => return Err(format!("non-ASCII character {:?} in raw pattern", other)),
        }
    }

    Ok(out)
}

/// Renders decoded bytes as engine expression text. Printable ASCII passes
/// through untouched so it keeps its engine meaning; every other byte becomes
/// a `\xHH` literal.
pub fn render(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\\' {
            match bytes.get(i + 1) {
                Some(&next) if is_printable(next) => {
                    out.push('\\');
                    out.push(next as char);
                }
                Some(&next) => push_literal(&mut out, next),
                None => out.push('\\'),
            }
            i += 2;
            continue;
        }

        if is_printable(b) {
            out.push(b as char);
        } else {
            push_literal(&mut out, b);
        }
        i += 1;
    }

    out
}

pub fn literal_bytes(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 4);
    for &b in bytes {
        push_literal(&mut out, b);
    }
    out
}

pub fn push_literal(out: &mut String, byte: u8) {
    let _ = write!(out, "\\x{:02x}", byte);
}

pub fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

fn is_printable(b: u8) -> bool {
    (0x20..0x7f).contains(&b)
}
