//! Horizontal resampling of grid rows by integer factors.
//!
//! Downsampling keeps the first symbol of every run of `down` symbols and drops
//! the rest. This is lossy: resampling back up only restores the row when every
//! run was uniform, which holds for pixel runs inside one QR module and for the
//! hex digits of one BMP pixel, the two places the pipeline uses it.

use crate::models::CharGrid;

/// Resample one row: each run of `down` symbols becomes its first symbol
/// repeated `up` times.
///
/// Factors of 0 are treated as 1. A short trailing run (row length not divisible
/// by `down`) still contributes its first symbol.
pub fn resample_row(row: &str, down: usize, up: usize) -> String {
    let down = down.max(1);
    let up = up.max(1);
    if down == 1 && up == 1 {
        return row.to_owned();
    }

    let mut out = String::with_capacity(row.len().div_ceil(down) * up);
    for chunk in row.as_bytes().chunks(down) {
        for _ in 0..up {
            out.push(chunk[0] as char);
        }
    }
    out
}

/// Resample every row of `grid` independently.
pub fn resample(grid: &CharGrid, down: usize, up: usize) -> CharGrid {
    CharGrid::new(
        grid.rows()
            .iter()
            .map(|row| resample_row(row, down, up))
            .collect(),
    )
}
