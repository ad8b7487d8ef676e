//! Pipeline configuration.
//!
//! A `Config` is built once and passed into [`crate::Pipeline`]; nothing in the
//! pipeline reads the environment on its own. [`Config::from_env`] is the
//! convenience constructor for callers that want the `QR_*` variables:
//!
//! - `QR_CONVERTER`: `imagemagick`, `sips` or `none`; unset means search `PATH`
//! - `QR_DEBUG`: any value enables debug logging
//! - `QR_MODULE_WIDTH`: terminal columns per QR module (default 2)

use crate::decoder::Converter;

/// Default terminal columns per QR module
pub const DEFAULT_MODULE_WIDTH: usize = 2;

/// Settings for a [`crate::Pipeline`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// PNG converter, if one is installed
    pub converter: Option<Converter>,
    /// Verbose diagnostics
    pub debug: bool,
    /// Horizontal upsample factor applied before rendering
    pub module_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            converter: None,
            debug: false,
            module_width: DEFAULT_MODULE_WIDTH,
        }
    }
}

fn parse_usize(value: Option<String>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default)
}

fn parse_converter(
    value: Option<String>,
    detect: impl FnOnce() -> Option<Converter>,
) -> Option<Converter> {
    match value.as_deref().map(str::trim) {
        Some("imagemagick" | "convert") => Some(Converter::imagemagick()),
        Some("sips") => Some(Converter::sips()),
        Some("none") => None,
        Some(other) => {
            log::warn!("ignoring unknown QR_CONVERTER value `{other}`");
            detect()
        }
        None => detect(),
    }
}

impl Config {
    /// Build from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok(), Converter::detect)
    }

    /// Build from a variable lookup; `detect` runs only when `QR_CONVERTER`
    /// does not name a converter.
    pub fn from_lookup<F>(lookup: F, detect: impl FnOnce() -> Option<Converter>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            converter: parse_converter(lookup("QR_CONVERTER"), detect),
            debug: lookup("QR_DEBUG").is_some(),
            module_width: parse_usize(lookup("QR_MODULE_WIDTH"), DEFAULT_MODULE_WIDTH),
        }
    }

    /// Replace the converter
    pub fn with_converter(mut self, converter: Option<Converter>) -> Self {
        self.converter = converter;
        self
    }

    /// Replace the module width (0 is treated as 1)
    pub fn with_module_width(mut self, module_width: usize) -> Self {
        self.module_width = module_width.max(1);
        self
    }
}
