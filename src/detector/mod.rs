//! QR code location in a character grid
//!
//! - Finder-pattern scan of the first foreground row (module scale, crop columns)
//! - Cropping to one symbol per module with a 4-module quiet zone

/// Locate and crop a QR code from its first foreground row
pub mod trim;

pub use trim::{locate, trim};
