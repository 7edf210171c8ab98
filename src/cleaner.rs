//! Text normalization applied to raw documents before sentence segmentation.
//!
//! Two steps run in order: integer placeholder tokens such as `<123>` are
//! replaced with a single space, and a known double-encoding artifact from the
//! upstream text source is reversed. The repair step is deliberately narrow:
//! it decodes escaped-unicode literals, reinterprets the result as Latin-1
//! bytes, and decodes those bytes as UTF-8. Text that was never corrupted this
//! way can fail the repair, and that failure is surfaced rather than guessed
//! around.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Matches one angle-bracket-delimited non-negative integer placeholder.
fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<\d+>").expect("placeholder pattern"))
}

/// Errors surfaced while repairing double-encoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    /// An escape sequence was truncated or carried non-hex/non-octal digits.
    BadEscape {
        /// Byte offset of the backslash that opened the escape.
        index: usize,
    },
    /// A decoded code point fell outside the single-byte Latin-1 range.
    NonLatin1 {
        /// The offending code point value.
        code_point: u32,
        /// Byte offset of the escape that produced it.
        index: usize,
    },
    /// The reinterpreted byte sequence was not valid UTF-8.
    InvalidUtf8,
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadEscape { index } => {
                write!(f, "malformed escape sequence at byte {index}")
            }
            Self::NonLatin1 { code_point, index } => write!(
                f,
                "code point U+{code_point:04X} at byte {index} exceeds the Latin-1 range"
            ),
            Self::InvalidUtf8 => {
                write!(f, "repaired byte sequence is not valid UTF-8")
            }
        }
    }
}

impl std::error::Error for EncodingError {}

/// Stateless document cleaning service.
#[derive(Debug, Clone, Default)]
pub struct TextCleaner;

impl TextCleaner {
    /// Builds a new cleaner instance.
    pub fn new() -> Self {
        Self
    }

    /// Normalizes a raw document: strips placeholders, then reverses the
    /// upstream double-encoding.
    pub fn clean(&self, text: &str) -> Result<String, EncodingError> {
        let stripped = strip_placeholders(text);
        repair_double_encoding(&stripped)
    }
}

/// Replaces every `<integer>` placeholder with a single space.
///
/// Placeholders do not nest and are matched non-overlappingly left to right;
/// all other characters pass through untouched.
fn strip_placeholders(text: &str) -> String {
    placeholder_pattern().replace_all(text, " ").into_owned()
}

/// Reverses the known double-encoding artifact.
///
/// The input is scanned byte-by-byte, which is the Latin-1 reading of the
/// text: escape sequences decode to their literal code point, every other
/// byte stands for itself. Each resulting code point must fit in one byte;
/// the collected byte sequence is then decoded as UTF-8.
fn repair_double_encoding(text: &str) -> Result<String, EncodingError> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let start = i;
        let Some(&kind) = bytes.get(i + 1) else {
            return Err(EncodingError::BadEscape { index: start });
        };
        i += 2;

        match kind {
            b'n' => out.push(b'\n'),
            b't' => out.push(b'\t'),
            b'r' => out.push(b'\r'),
            b'\\' => out.push(b'\\'),
            b'\'' => out.push(b'\''),
            b'"' => out.push(b'"'),
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'v' => out.push(0x0b),
            b'x' => {
                let value = read_hex(bytes, i, 2).ok_or(EncodingError::BadEscape { index: start })?;
                out.push(value as u8);
                i += 2;
            }
            b'u' => {
                let value = read_hex(bytes, i, 4).ok_or(EncodingError::BadEscape { index: start })?;
                push_latin1(&mut out, value, start)?;
                i += 4;
            }
            b'U' => {
                let value = read_hex(bytes, i, 8).ok_or(EncodingError::BadEscape { index: start })?;
                push_latin1(&mut out, value, start)?;
                i += 8;
            }
            b'0'..=b'7' => {
                // Up to three octal digits, first one already consumed.
                let mut value = u32::from(kind - b'0');
                let mut taken = 1;
                while taken < 3 {
                    match bytes.get(i) {
                        Some(&d @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(d - b'0');
                            i += 1;
                            taken += 1;
                        }
                        _ => break,
                    }
                }
                push_latin1(&mut out, value, start)?;
            }
            // Unrecognized escapes pass through verbatim, backslash included.
            other => {
                out.push(b'\\');
                out.push(other);
            }
        }
    }

    String::from_utf8(out).map_err(|_| EncodingError::InvalidUtf8)
}

fn push_latin1(out: &mut Vec<u8>, code_point: u32, index: usize) -> Result<(), EncodingError> {
    if code_point > 0xFF {
        return Err(EncodingError::NonLatin1 { code_point, index });
    }
    out.push(code_point as u8);
    Ok(())
}

fn read_hex(bytes: &[u8], at: usize, digits: usize) -> Option<u32> {
    let end = at.checked_add(digits)?;
    let slice = bytes.get(at..end)?;
    let text = std::str::from_utf8(slice).ok()?;
    u32::from_str_radix(text, 16).ok()
}
