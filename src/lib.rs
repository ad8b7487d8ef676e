//! qr_term - QR codes from raster images, redrawn in the terminal
//!
//! Takes a BMP, plain PBM or PNG image holding one QR code on a blank
//! background, reduces it to a two-symbol character grid, crops the grid to one
//! symbol per QR module with a 4-module quiet zone, and renders that as ANSI
//! color blocks a phone can scan off the screen.
//!
//! ```
//! use qr_term::{CharGrid, detector, render};
//!
//! // a lone finder pattern, 1 px per module, already with its quiet zone
//! let mut rows = vec![" ".repeat(15); 4];
//! for r in ["#######", "#     #", "# ### #", "# ### #", "# ### #", "#     #", "#######"] {
//!     rows.push(format!("    {r}    "));
//! }
//! rows.extend(vec![" ".repeat(15); 4]);
//! let grid = CharGrid::new(rows);
//!
//! let trimmed = detector::trim(&grid).unwrap();
//! assert_eq!(trimmed, grid);
//! let text = render::render(&trimmed);
//! assert_eq!(render::strip_escapes(&text).lines().count(), 15);
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Pipeline settings (converter, verbosity, module width)
pub mod config;
/// Stderr logger for binaries
pub mod debug;
/// Image decoders producing character grids (BMP, plain PBM, PNG)
pub mod decoder;
/// QR location and cropping
pub mod detector;
/// Error type shared by all stages
pub mod error;
/// Core data structures (CharGrid, QrGeometry)
pub mod models;
/// ANSI block rendering
pub mod render;
/// Grid transforms (resampling, row order)
pub mod utils;

pub use config::Config;
pub use decoder::{Converter, ConverterKind, GridDecoder, ImageFormat};
pub use error::{Error, Result};
pub use models::{BACKGROUND, CharGrid, FOREGROUND, QrGeometry};

use std::io::Read;

/// Decode → trim → render, configured once.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Create a pipeline from an explicit configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// The configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decode `reader` as `format` into the raw pixel grid
    pub fn decode<R: Read>(&self, format: ImageFormat, mut reader: R) -> Result<CharGrid> {
        let decoder = decoder::decoder_for(format, self.config.converter.as_ref());
        let grid = decoder.decode(&mut reader)?;
        log::debug!(
            "decoded {format:?} to {}x{} grid",
            grid.width(),
            grid.height()
        );
        Ok(grid)
    }

    /// Decode bytes of any supported format, sniffed from the magic number
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<CharGrid> {
        self.decode(ImageFormat::sniff(bytes)?, bytes)
    }

    /// Decode and crop to one symbol per QR module
    pub fn qr_grid(&self, bytes: &[u8]) -> Result<CharGrid> {
        detector::trim(&self.decode_bytes(bytes)?)
    }

    /// Widen a module grid by `module_width` and render it
    pub fn render_grid(&self, grid: &CharGrid) -> String {
        let wide = utils::resample(grid, 1, self.config.module_width);
        render::render(&wide)
    }

    /// The full pipeline: bytes in, terminal text out
    pub fn render(&self, bytes: &[u8]) -> Result<String> {
        Ok(self.render_grid(&self.qr_grid(bytes)?))
    }
}

/// Render the QR code in `bytes` with `config`
pub fn render_qr(bytes: &[u8], config: &Config) -> Result<String> {
    Pipeline::new(config.clone()).render(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finder_pbm(scale: usize, margin: usize) -> Vec<u8> {
        let modules = [
            "#######", "#     #", "# ### #", "# ### #", "# ### #", "#     #", "#######",
        ];
        let width = 7 * scale + 2 * margin;
        let mut text = format!("P1\n{width} {}\n", 7 * scale + 2 * margin);
        let blank = "0".repeat(width);
        for _ in 0..margin {
            text.push_str(&blank);
            text.push('\n');
        }
        for m in modules {
            let mut line = "0".repeat(margin);
            for c in m.chars() {
                line.push_str(&(if c == '#' { "1" } else { "0" }).repeat(scale));
            }
            line.push_str(&"0".repeat(margin));
            for _ in 0..scale {
                text.push_str(&line);
                text.push('\n');
            }
        }
        for _ in 0..margin {
            text.push_str(&blank);
            text.push('\n');
        }
        text.into_bytes()
    }

    #[test]
    fn test_pipeline_qr_grid() {
        let pipeline = Pipeline::default();
        let grid = pipeline.qr_grid(&finder_pbm(2, 9)).unwrap();
        assert_eq!((grid.width(), grid.height()), (15, 15));
        assert_eq!(grid.rows()[4], "    #######    ");
    }

    #[test]
    fn test_pipeline_render_widens_modules() {
        let pipeline = Pipeline::new(Config::default().with_module_width(2));
        let text = pipeline.render(&finder_pbm(1, 4)).unwrap();
        let plain = render::strip_escapes(&text);
        let rows: Vec<&str> = plain.lines().collect();
        assert_eq!(rows.len(), 15);
        assert!(rows.iter().all(|r| r.len() == 30));
        assert_eq!(rows[5], "        ##          ##        ");
    }

    #[test]
    fn test_png_without_converter() {
        let err = Pipeline::default()
            .render(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR")
            .unwrap_err();
        assert!(matches!(err, Error::NoDecoderAvailable));
    }

    #[test]
    fn test_unknown_bytes() {
        let err = render_qr(b"hello", &Config::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }
}
