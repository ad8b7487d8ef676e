use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced anywhere in the decode → trim → render pipeline.
///
/// Every stage fails fast: no variant is ever returned alongside partial output.
#[derive(Debug, Error)]
pub enum Error {
    /// The host cannot read little-endian integers natively (BMP path only)
    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(&'static str),

    /// Bad magic, header field or dimensions, or a truncated stream
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A BMP pixel layout that is recognised but not handled
    #[error("unsupported BMP format: bits_per_pixel={bits_per_pixel} compression={compression}")]
    UnsupportedFormat {
        /// Bits per pixel from the header
        bits_per_pixel: i64,
        /// Compression method from the header
        compression: i64,
    },

    /// PNG input but no converter is configured
    #[error("no PNG converter available (install ImageMagick `convert` or `sips`)")]
    NoDecoderAvailable,

    /// The external converter ran and exited unsuccessfully
    #[error("converter `{program}` failed: {status}")]
    DecodeFailed {
        /// Program that was invoked
        program: String,
        /// Its exit status
        status: ExitStatus,
    },

    /// Finder-pattern search or geometry validation failed
    #[error("invalid QR code: {reason}{}", row_suffix(.row))]
    InvalidQRCode {
        /// What did not hold
        reason: String,
        /// The scanned row, when there was one
        row: Option<String>,
    },

    /// Filesystem or process I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_format(msg: impl Into<String>) -> Self {
        Error::InvalidFormat(msg.into())
    }

    pub(crate) fn invalid_qr(reason: impl Into<String>, row: Option<&str>) -> Self {
        Error::InvalidQRCode {
            reason: reason.into(),
            row: row.map(str::to_owned),
        }
    }
}

fn row_suffix(row: &Option<String>) -> String {
    match row {
        Some(r) => format!(" (row: {r:?})"),
        None => String::new(),
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
