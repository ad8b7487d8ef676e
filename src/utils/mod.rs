//! Grid transforms shared by the decoders and the trimmer
//!
//! - Horizontal resampling (collapse or widen runs of symbols)
//! - Row-order normalization (bottom-up rasters to top-down)

pub mod orientation;
pub mod resample;

pub use orientation::{RowOrder, normalize_rows};
pub use resample::{resample, resample_row};
