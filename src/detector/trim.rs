//! QR location and cropping from the first foreground row.
//!
//! The first row holding foreground crosses the top edge of the top-left and
//! top-right finder patterns. Its layout `blank | finder | mixed..last | blank`
//! yields the module scale (finder width / 7) and the horizontal extent of the
//! symbol. The raster must hold exactly one QR code with nothing above it.

use crate::error::{Error, Result};
use crate::models::grid::has_foreground;
use crate::models::{BACKGROUND, CharGrid, FOREGROUND, QrGeometry};
use crate::utils::resample;

const FG: u8 = FOREGROUND as u8;
const BG: u8 = BACKGROUND as u8;

/// Infer module scale and crop columns from `grid`.
pub fn locate(grid: &CharGrid) -> Result<QrGeometry> {
    let first_row = grid
        .rows()
        .iter()
        .position(|row| has_foreground(row))
        .ok_or_else(|| Error::invalid_qr("no foreground in image", None))?;
    let row = &grid.rows()[first_row];
    let bytes = row.as_bytes();

    if bytes.iter().any(|&b| b != FG && b != BG) {
        return Err(Error::invalid_qr(
            "row holds symbols other than foreground/background",
            Some(row),
        ));
    }

    // l1: leading blank, l2: finder run, l3: rest up to the last foreground
    let l1 = bytes.iter().position(|&b| b == FG).unwrap_or(0);
    let l2 = bytes[l1..].iter().take_while(|&&b| b == FG).count();
    let last = bytes.iter().rposition(|&b| b == FG).unwrap_or(l1);
    let l3 = last + 1 - (l1 + l2);

    let module_scale = l2 / QrGeometry::FINDER_MODULES;
    if module_scale == 0 {
        return Err(Error::invalid_qr(
            format!("finder run of {l2} px is narrower than 7 modules"),
            Some(row),
        ));
    }

    let quiet = QrGeometry::QUIET_ZONE * module_scale;
    let Some(trim_offset) = l1.checked_sub(quiet) else {
        return Err(Error::invalid_qr(
            format!("left margin of {l1} px is narrower than the {quiet} px quiet zone"),
            Some(row),
        ));
    };
    let region_length = l2 + l3 + 2 * quiet;
    if trim_offset + region_length > row.len() {
        return Err(Error::invalid_qr(
            format!(
                "region of {region_length} px at offset {trim_offset} overruns the {} px row",
                row.len()
            ),
            Some(row),
        ));
    }
    if region_length % module_scale != 0 {
        return Err(Error::invalid_qr(
            format!("region of {region_length} px is not a multiple of the {module_scale} px module"),
            Some(row),
        ));
    }

    let geometry = QrGeometry {
        module_scale,
        trim_offset,
        region_length,
        first_row,
    };
    log::debug!("qr geometry: {geometry:?}");
    Ok(geometry)
}

/// Crop `grid` to its QR code, one symbol per module, with a 4-module quiet
/// zone on every side.
///
/// Keeps the first pixel row and column of every module. Running this on its
/// own output returns the same grid.
pub fn trim(grid: &CharGrid) -> Result<CharGrid> {
    let geometry = locate(grid)?;
    let scale = geometry.module_scale;
    let module_rows = geometry.symbol_modules();

    let last_row = geometry.first_row + (module_rows - 1) * scale;
    if last_row >= grid.height() {
        return Err(Error::invalid_qr(
            format!(
                "image ends at row {} but the {module_rows}-module symbol needs row {last_row}",
                grid.height()
            ),
            None,
        ));
    }

    let blank = CharGrid::blank_row(geometry.region_length);
    let mut rows = Vec::with_capacity(module_rows + 2 * QrGeometry::QUIET_ZONE);
    rows.extend(std::iter::repeat_n(blank.clone(), QrGeometry::QUIET_ZONE));
    for y in (geometry.first_row..=last_row).step_by(scale) {
        let row = &grid.rows()[y];
        let cropped = row.get(geometry.columns()).ok_or_else(|| {
            Error::invalid_qr(format!("row {y} is shorter than the QR region"), Some(row))
        })?;
        rows.push(cropped.to_owned());
    }
    rows.extend(std::iter::repeat_n(blank, QrGeometry::QUIET_ZONE));

    let trimmed = resample(&CharGrid::new(rows), scale, 1);
    log::trace!("trimmed to {}x{} modules", trimmed.width(), trimmed.height());
    Ok(trimmed)
}
