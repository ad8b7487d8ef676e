/// QR placement inferred from the first foreground row of a raster.
///
/// All lengths are in raster pixels (grid columns) unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrGeometry {
    /// Pixels per QR module
    pub module_scale: usize,
    /// Columns to drop on the left
    pub trim_offset: usize,
    /// Width of the kept region, including a 4-module quiet zone on both sides
    pub region_length: usize,
    /// Index of the first row containing foreground
    pub first_row: usize,
}

impl QrGeometry {
    /// Modules of quiet zone kept on each side
    pub const QUIET_ZONE: usize = 4;
    /// Width of a finder pattern in modules
    pub const FINDER_MODULES: usize = 7;

    /// Width of the output grid in modules, quiet zone included
    pub fn modules(&self) -> usize {
        self.region_length / self.module_scale
    }

    /// Modules spanned by the symbol itself
    pub fn symbol_modules(&self) -> usize {
        self.modules().saturating_sub(2 * Self::QUIET_ZONE)
    }

    /// Column range of the kept region
    pub fn columns(&self) -> std::ops::Range<usize> {
        self.trim_offset..self.trim_offset + self.region_length
    }
}
