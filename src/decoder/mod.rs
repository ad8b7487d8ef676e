//! Producers of the character grid, one per input format
//!
//! - BMP (parsed here, 24/32 bpp uncompressed)
//! - Plain PBM (the ASCII bitmap emitted by the PNG converter)
//! - PNG (handed to an external converter, then one of the above)

pub mod bmp;
pub mod extract;
pub mod pbm;
pub mod png;

pub use bmp::{BmpDecoder, BmpHeader, decode_bmp};
pub use pbm::{PbmDecoder, decode_pbm};
pub use png::{Converter, ConverterKind, PngDecoder, decode_png};

use crate::error::{Error, Result};
use crate::models::CharGrid;
use std::io::Read;

/// Anything that turns an image byte stream into a character grid
pub trait GridDecoder {
    /// Decode the whole of `reader`
    fn decode(&self, reader: &mut dyn Read) -> Result<CharGrid>;
}

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// Windows bitmap
    Bmp,
    /// Plain PBM
    Pbm,
    /// PNG, needs a converter
    Png,
}

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

impl ImageFormat {
    /// Guess the format from leading magic bytes
    pub fn sniff(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(&PNG_SIGNATURE) {
            Ok(ImageFormat::Png)
        } else if bytes.starts_with(b"BM") {
            Ok(ImageFormat::Bmp)
        } else if bytes.starts_with(pbm::PBM_MAGIC.as_bytes()) {
            Ok(ImageFormat::Pbm)
        } else {
            let head: Vec<String> = bytes.iter().take(8).map(|b| format!("{b:02x}")).collect();
            Err(Error::invalid_format(format!(
                "unrecognised image data (starts with {})",
                if head.is_empty() {
                    "nothing".to_owned()
                } else {
                    head.join(" ")
                }
            )))
        }
    }
}

impl std::str::FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bmp" => Ok(ImageFormat::Bmp),
            "pbm" | "p1" => Ok(ImageFormat::Pbm),
            "png" => Ok(ImageFormat::Png),
            other => Err(format!("unknown image format `{other}`")),
        }
    }
}

/// Pick the decoder for `format`; PNG uses `converter`.
pub fn decoder_for(format: ImageFormat, converter: Option<&Converter>) -> Box<dyn GridDecoder> {
    match format {
        ImageFormat::Bmp => Box::new(BmpDecoder),
        ImageFormat::Pbm => Box::new(PbmDecoder),
        ImageFormat::Png => Box::new(PngDecoder::new(converter.cloned())),
    }
}
