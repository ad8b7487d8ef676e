//! Byte-range extraction: skip, read an exact window, reinterpret as fields.
//!
//! Fields are read in host byte order. Callers that parse a little-endian
//! format must check [`host_is_little_endian`] first.

use crate::error::{Error, Result};
use std::io::{self, Read};

/// One group of equally sized integer fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Width of each field in bytes (1, 2, 4 or 8)
    pub width: usize,
    /// Whether fields are two's complement
    pub signed: bool,
    /// Number of consecutive fields
    pub count: usize,
}

impl FieldSpec {
    /// `count` unsigned fields of `width` bytes
    pub const fn unsigned(width: usize, count: usize) -> Self {
        Self {
            width,
            signed: false,
            count,
        }
    }

    /// `count` signed fields of `width` bytes
    pub const fn signed(width: usize, count: usize) -> Self {
        Self {
            width,
            signed: true,
            count,
        }
    }

    fn byte_len(&self) -> usize {
        self.width * self.count
    }
}

/// Whether the host reads multi-byte integers least-significant byte first
pub fn host_is_little_endian() -> bool {
    u16::from_ne_bytes([1, 0]) == 1
}

/// Discard exactly `n` bytes from `reader`.
pub fn skip_exact<R: Read>(reader: &mut R, n: u64) -> Result<()> {
    let skipped = io::copy(&mut reader.by_ref().take(n), &mut io::sink())?;
    if skipped != n {
        return Err(Error::invalid_format(format!(
            "truncated stream: wanted to skip {n} bytes, only {skipped} available"
        )));
    }
    Ok(())
}

/// Initial buffer size for [`read_exact_vec`]; `n` comes from untrusted headers.
const READ_CHUNK: usize = 64 * 1024;

/// Read exactly `n` bytes from `reader`, however the stream chunks them.
pub fn read_exact_vec<R: Read>(reader: &mut R, n: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(n.min(READ_CHUNK));
    let got = reader.by_ref().take(n as u64).read_to_end(&mut buf)?;
    if got != n {
        return Err(Error::invalid_format(format!(
            "truncated stream: expected {n} bytes, got {got}"
        )));
    }
    Ok(buf)
}

/// Skip `skip` bytes, read `count` bytes and decode them as `fields`.
///
/// Values come back in declaration order, widened to `i64`. Bytes of the window
/// not covered by `fields` are read and ignored.
pub fn extract<R: Read>(
    reader: &mut R,
    skip: u64,
    count: usize,
    fields: &[FieldSpec],
) -> Result<Vec<i64>> {
    let needed: usize = fields.iter().map(FieldSpec::byte_len).sum();
    if needed > count {
        return Err(Error::invalid_format(format!(
            "field layout needs {needed} bytes but the window is {count}"
        )));
    }

    skip_exact(reader, skip)?;
    let bytes = read_exact_vec(reader, count)?;

    let mut values = Vec::with_capacity(fields.iter().map(|f| f.count).sum());
    let mut offset = 0;
    for spec in fields {
        for _ in 0..spec.count {
            let raw = &bytes[offset..offset + spec.width];
            values.push(decode_field(raw, spec.signed)?);
            offset += spec.width;
        }
    }
    Ok(values)
}

fn decode_field(raw: &[u8], signed: bool) -> Result<i64> {
    let value = match (raw.len(), signed) {
        (1, false) => u8::from_ne_bytes([raw[0]]) as i64,
        (1, true) => i8::from_ne_bytes([raw[0]]) as i64,
        (2, false) => u16::from_ne_bytes([raw[0], raw[1]]) as i64,
        (2, true) => i16::from_ne_bytes([raw[0], raw[1]]) as i64,
        (4, false) => u32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]) as i64,
        (4, true) => i32::from_ne_bytes([raw[0], raw[1], raw[2], raw[3]]) as i64,
        (8, _) => {
            let mut b = [0u8; 8];
            b.copy_from_slice(raw);
            let v = i64::from_ne_bytes(b);
            if !signed && v < 0 {
                return Err(Error::invalid_format(format!(
                    "unsigned 64-bit field {:#x} does not fit",
                    u64::from_ne_bytes(b)
                )));
            }
            v
        }
        (width, _) => {
            return Err(Error::invalid_format(format!(
                "unsupported field width {width}"
            )));
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hands out one byte per read call
    struct Trickle<'a>(&'a [u8]);

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.0.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.0[0];
            self.0 = &self.0[1..];
            Ok(1)
        }
    }

    fn le(values: &[(i64, usize)]) -> Vec<u8> {
        values
            .iter()
            .flat_map(|&(v, w)| v.to_le_bytes()[..w].to_vec())
            .collect()
    }

    #[test]
    fn test_extract_mixed_fields() {
        if !host_is_little_endian() {
            return;
        }
        let mut data = vec![0xAA, 0xBB];
        data.extend(le(&[(0x4D42, 2), (7, 4), (-3, 4), (-3, 4)]));
        let fields = [
            FieldSpec::unsigned(2, 1),
            FieldSpec::unsigned(4, 1),
            FieldSpec::signed(4, 1),
            FieldSpec::unsigned(4, 1),
        ];
        let values = extract(&mut data.as_slice(), 2, 14, &fields).unwrap();
        assert_eq!(values, vec![0x4D42, 7, -3, 0xFFFF_FFFD]);
    }

    #[test]
    fn test_extract_ignores_buffering_granularity() {
        if !host_is_little_endian() {
            return;
        }
        let data = le(&[(1, 4), (2, 2), (3, 2), (-1, 1)]);
        let fields = [FieldSpec::unsigned(2, 2), FieldSpec::signed(1, 1)];
        let values = extract(&mut Trickle(&data), 4, 5, &fields).unwrap();
        assert_eq!(values, vec![2, 3, -1]);
    }

    #[test]
    fn test_extract_advances_stream() {
        let data: Vec<u8> = (0u8..10).collect();
        let mut reader = data.as_slice();
        extract(&mut reader, 2, 3, &[FieldSpec::unsigned(1, 3)]).unwrap();
        let rest = extract(&mut reader, 1, 2, &[FieldSpec::unsigned(1, 2)]).unwrap();
        assert_eq!(rest, vec![6, 7]);
    }

    #[test]
    fn test_short_stream_is_an_error() {
        let data = [1u8, 2, 3];
        let err = extract(&mut data.as_slice(), 0, 4, &[FieldSpec::unsigned(4, 1)]).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(ref m) if m.contains("truncated")));

        let err = extract(&mut data.as_slice(), 5, 0, &[]).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_read_exact_vec_huge_request() {
        let data = [7u8; 5];
        for n in [usize::MAX, isize::MAX as usize, 1 << 40] {
            let err = read_exact_vec(&mut data.as_slice(), n).unwrap_err();
            assert!(matches!(err, Error::InvalidFormat(ref m) if m.contains("got 5")), "{err:?}");
        }
        assert_eq!(read_exact_vec(&mut data.as_slice(), 5).unwrap(), data);
    }

    #[test]
    fn test_layout_larger_than_window() {
        let data = [0u8; 8];
        let err = extract(&mut data.as_slice(), 0, 2, &[FieldSpec::unsigned(4, 1)]).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_bad_field_width() {
        let data = [0u8; 3];
        let err = extract(&mut data.as_slice(), 0, 3, &[FieldSpec::unsigned(3, 1)]).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(ref m) if m.contains("width 3")));
    }
}
