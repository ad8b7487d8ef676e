//! Plain (ASCII) PBM decoding: `P1`, width, height, then `0`/`1` digits.
//!
//! Digits may be separated by any whitespace or run together, and `#` starts a
//! comment running to the end of the line. `1` is foreground.

use super::GridDecoder;
use crate::error::{Error, Result};
use crate::models::CharGrid;
use crate::models::grid::symbol;
use std::io::Read;

/// Magic token of plain PBM
pub const PBM_MAGIC: &str = "P1";

/// Decoder for plain PBM text
#[derive(Debug, Clone, Copy, Default)]
pub struct PbmDecoder;

impl GridDecoder for PbmDecoder {
    fn decode(&self, reader: &mut dyn Read) -> Result<CharGrid> {
        decode_pbm(reader)
    }
}

/// Decode plain PBM from `reader`
pub fn decode_pbm<R: Read>(mut reader: R) -> Result<CharGrid> {
    let mut text = Vec::new();
    reader.read_to_end(&mut text)?;
    parse_pbm(&text)
}

/// Decode plain PBM already held in memory
pub fn parse_pbm(text: &[u8]) -> Result<CharGrid> {
    let mut cursor = 0usize;

    let magic = next_token(text, &mut cursor).unwrap_or_default();
    if magic != PBM_MAGIC.as_bytes() {
        return Err(Error::invalid_format(format!(
            "bad ASCII bitmap magic {:?}, expected {PBM_MAGIC:?}",
            String::from_utf8_lossy(magic)
        )));
    }
    let width = parse_dimension(next_token(text, &mut cursor), "width")?;
    let height = parse_dimension(next_token(text, &mut cursor), "height")?;
    log::debug!("pbm header: {width}x{height}");

    let mut rows = Vec::with_capacity(height.min(4096));
    let mut row = String::with_capacity(width.min(4096));
    while rows.len() < height {
        let Some(digit) = next_digit(text, &mut cursor)? else {
            let got = rows.len().saturating_mul(width).saturating_add(row.len());
            return Err(Error::invalid_format(format!(
                "truncated ASCII bitmap: expected {width}x{height} digits, got {got}"
            )));
        };
        row.push(symbol(digit));
        if row.len() == width {
            rows.push(std::mem::take(&mut row));
        }
    }

    Ok(CharGrid::new(rows))
}

fn parse_dimension(token: Option<&[u8]>, name: &str) -> Result<usize> {
    let token = token.unwrap_or_default();
    std::str::from_utf8(token)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .ok_or_else(|| {
            Error::invalid_format(format!(
                "bad ASCII bitmap {name} {:?}",
                String::from_utf8_lossy(token)
            ))
        })
}

fn skip_blank(buf: &[u8], cursor: &mut usize) {
    while *cursor < buf.len() {
        match buf[*cursor] {
            b if b.is_ascii_whitespace() => *cursor += 1,
            b'#' => {
                while *cursor < buf.len() && buf[*cursor] != b'\n' {
                    *cursor += 1;
                }
            }
            _ => break,
        }
    }
}

fn next_token<'a>(buf: &'a [u8], cursor: &mut usize) -> Option<&'a [u8]> {
    skip_blank(buf, cursor);
    if *cursor >= buf.len() {
        return None;
    }
    let start = *cursor;
    while *cursor < buf.len() && !buf[*cursor].is_ascii_whitespace() && buf[*cursor] != b'#' {
        *cursor += 1;
    }
    Some(&buf[start..*cursor])
}

fn next_digit(buf: &[u8], cursor: &mut usize) -> Result<Option<bool>> {
    skip_blank(buf, cursor);
    let Some(&b) = buf.get(*cursor) else {
        return Ok(None);
    };
    *cursor += 1;
    match b {
        b'0' => Ok(Some(false)),
        b'1' => Ok(Some(true)),
        other => Err(Error::invalid_format(format!(
            "unexpected byte {:?} in ASCII bitmap data",
            other as char
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pbm() {
        let text = b"P1\n# made by hand\n3 3\n1 0 0\n0 1 0\n1 1 0\n";
        let grid = parse_pbm(text).unwrap();
        assert_eq!(grid.rows(), ["#  ", " # ", "## "]);
    }

    #[test]
    fn test_digits_span_lines_without_separators() {
        let text = b"P1 4 2 1001\n01\n10";
        let grid = parse_pbm(text).unwrap();
        assert_eq!(grid.rows(), ["#  #", " ## "]);
    }

    #[test]
    fn test_bad_magic() {
        let err = parse_pbm(b"P4\n1 1\n1").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(ref m) if m.contains("magic")));
        assert!(matches!(parse_pbm(b""), Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_dimensions_must_be_positive() {
        let cases: [&[u8]; 4] = [b"P1 0 3 1", b"P1 3 -1 1", b"P1 3", b"P1 x 2"];
        for text in cases {
            let err = parse_pbm(text).unwrap_err();
            assert!(matches!(err, Error::InvalidFormat(_)), "{err:?}");
        }
    }

    #[test]
    fn test_short_data() {
        let err = parse_pbm(b"P1 2 2 1 0 1").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(ref m) if m.contains("got 3")));
    }

    #[test]
    fn test_short_data_huge_dimensions() {
        let err = parse_pbm(b"P1 4294967296 4294967296 1").unwrap_err();
        let message = match err {
            Error::InvalidFormat(message) => message,
            other => panic!("expected InvalidFormat, got {other:?}"),
        };
        assert!(message.contains("4294967296x4294967296"), "{message}");
        assert!(message.contains("got 1"), "{message}");

        let max = usize::MAX.to_string();
        let text = format!("P1 {max} {max} 1 0");
        let err = parse_pbm(text.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(ref m) if m.contains("got 2")));
    }

    #[test]
    fn test_stray_byte() {
        let err = parse_pbm(b"P1 2 1 1 2").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(ref m) if m.contains("'2'")));
    }

    #[test]
    fn test_trailing_data_ignored() {
        let grid = parse_pbm(b"P1 1 1 1 0 0\n").unwrap();
        assert_eq!(grid.rows(), ["#"]);
    }
}
