//! Windows BMP decoding into a character grid.
//!
//! Only uncompressed 24 bpp and 32 bpp pixel data is handled. A pixel is
//! foreground when the high nibble of its first sample byte is non-zero, i.e.
//! any pixel whose leading channel is not (near) black. For 32 bpp data the
//! bitfield masks are not consulted; samples are taken as R,G,B,A.

use super::GridDecoder;
use super::extract::{FieldSpec, extract, host_is_little_endian, read_exact_vec, skip_exact};
use crate::error::{Error, Result};
use crate::models::CharGrid;
use crate::models::grid::symbol;
use crate::utils::{RowOrder, normalize_rows, resample_row};
use std::io::Read;

/// `BM` read as a little-endian u16
pub const BMP_MAGIC: u16 = 0x4D42;
/// File header (14 bytes) plus BITMAPINFOHEADER (40 bytes)
pub const HEADER_LEN: usize = 54;

const BI_RGB: u32 = 0;
const BI_BITFIELDS: u32 = 3;

const HEADER_FIELDS: [FieldSpec; 7] = [
    FieldSpec::unsigned(2, 1), // magic
    FieldSpec::unsigned(4, 1), // file size
    FieldSpec::unsigned(2, 2), // reserved
    FieldSpec::unsigned(4, 2), // pixel offset, DIB header size
    FieldSpec::signed(4, 2),   // width, height
    FieldSpec::unsigned(2, 2), // planes, bits per pixel
    FieldSpec::unsigned(4, 1), // compression
];

/// Header fields of a BMP file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeader {
    /// File signature, `BM` read little-endian
    pub magic: u16,
    /// Declared file size; not trusted
    pub file_size: u32,
    /// Offset of the pixel data from the start of the file
    pub pixel_offset: u32,
    /// Size of the DIB header
    pub dib_size: u32,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels; negative for top-down rows
    pub height: i32,
    /// Color planes, always 1 in practice
    pub planes: u16,
    /// 24 or 32 for supported files
    pub bits_per_pixel: u16,
    /// `BI_RGB` (0) or `BI_BITFIELDS` (3) for supported files
    pub compression: u32,
}

impl BmpHeader {
    /// Read and validate the first [`HEADER_LEN`] bytes of `reader`.
    ///
    /// Checks the host byte order, the magic number, the dimensions and the
    /// pixel layout.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self> {
        if !host_is_little_endian() {
            return Err(Error::UnsupportedPlatform(
                "BMP decoding requires a little-endian host",
            ));
        }

        let v = extract(reader, 0, HEADER_LEN, &HEADER_FIELDS)?;
        let header = BmpHeader {
            magic: v[0] as u16,
            file_size: v[1] as u32,
            pixel_offset: v[4] as u32,
            dib_size: v[5] as u32,
            width: v[6] as i32,
            height: v[7] as i32,
            planes: v[8] as u16,
            bits_per_pixel: v[9] as u16,
            compression: v[10] as u32,
        };
        log::debug!("bmp header: {header:?}");

        if header.magic != BMP_MAGIC {
            return Err(Error::invalid_format(format!(
                "bad BMP magic {:#06x}, expected {BMP_MAGIC:#06x}",
                header.magic
            )));
        }
        if header.width <= 0 || header.height == 0 {
            return Err(Error::invalid_format(format!(
                "bad BMP dimensions {}x{}",
                header.width, header.height
            )));
        }
        if (header.pixel_offset as usize) < HEADER_LEN {
            return Err(Error::invalid_format(format!(
                "pixel data offset {} overlaps the header",
                header.pixel_offset
            )));
        }
        header.bytes_per_pixel()?;
        Ok(header)
    }

    /// Bytes per pixel for the two accepted layouts
    pub fn bytes_per_pixel(&self) -> Result<usize> {
        match (self.bits_per_pixel, self.compression) {
            (24, BI_RGB) => Ok(3),
            (32, BI_RGB | BI_BITFIELDS) => Ok(4),
            (bpp, compression) => Err(Error::UnsupportedFormat {
                bits_per_pixel: bpp as i64,
                compression: compression as i64,
            }),
        }
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width.unsigned_abs() as usize
    }

    /// Image height in pixels, orientation stripped
    pub fn height(&self) -> usize {
        self.height.unsigned_abs() as usize
    }

    /// Negative height marks top-down storage
    pub fn row_order(&self) -> RowOrder {
        if self.height < 0 {
            RowOrder::TopDown
        } else {
            RowOrder::BottomUp
        }
    }

    /// Bytes per stored row, padding to 4 bytes included
    pub fn row_len(&self) -> Result<usize> {
        let bpp = self.bytes_per_pixel()?;
        self.width()
            .checked_mul(bpp)
            .and_then(|n| n.checked_next_multiple_of(4))
            .ok_or_else(|| Error::invalid_format(format!("BMP width {} overflows", self.width)))
    }

    /// Bytes of pixel data
    pub fn payload_len(&self) -> Result<usize> {
        self.row_len()?
            .checked_mul(self.height())
            .ok_or_else(|| {
                Error::invalid_format(format!("BMP size {}x{} overflows", self.width, self.height))
            })
    }
}

/// Decoder for BMP byte streams
#[derive(Debug, Clone, Copy, Default)]
pub struct BmpDecoder;

impl GridDecoder for BmpDecoder {
    fn decode(&self, reader: &mut dyn Read) -> Result<CharGrid> {
        decode_bmp(reader)
    }
}

/// Decode a BMP stream into a top-down character grid, one symbol per pixel.
pub fn decode_bmp<R: Read>(mut reader: R) -> Result<CharGrid> {
    let header = BmpHeader::read(&mut reader)?;
    let stride = header.bytes_per_pixel()?;
    let row_len = header.row_len()?;
    let payload_len = header.payload_len()?;

    skip_exact(&mut reader, header.pixel_offset as u64 - HEADER_LEN as u64)?;
    let payload = read_exact_vec(&mut reader, payload_len)?;

    let sample_len = header.width() * stride;
    let rows = payload
        .chunks_exact(row_len)
        .map(|row| resample_row(&hex_symbols(&row[..sample_len]), 2 * stride, 1))
        .collect();

    let grid = normalize_rows(CharGrid::new(rows), header.row_order());
    log::trace!("bmp decoded to {}x{} grid", grid.width(), grid.height());
    Ok(grid)
}

/// One symbol per hex digit of `bytes`: digit 0 is background, anything else
/// foreground.
fn hex_symbols(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(symbol(b >> 4 != 0));
        out.push(symbol(b & 0x0F != 0));
    }
    out
}
