use crate::models::CharGrid;

/// Storage order of raster rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrder {
    /// First stored row is the visual top
    TopDown,
    /// First stored row is the visual bottom
    BottomUp,
}

/// Reorder rows so the first row is the visual top of the image
pub fn normalize_rows(grid: CharGrid, order: RowOrder) -> CharGrid {
    match order {
        RowOrder::TopDown => grid,
        RowOrder::BottomUp => {
            let mut rows = grid.into_rows();
            rows.reverse();
            CharGrid::new(rows)
        }
    }
}
