pub mod geometry;
pub mod grid;

pub use geometry::QrGeometry;
pub use grid::{BACKGROUND, CharGrid, FOREGROUND};
