use std::fmt;

/// Symbol for a lit / dark-module cell
pub const FOREGROUND: char = '#';
/// Symbol for an unlit / blank cell
pub const BACKGROUND: char = ' ';

/// Two-symbol character grid shared by every decode path.
///
/// Rows hold only [`FOREGROUND`] and [`BACKGROUND`], so they are plain ASCII and
/// byte offsets equal column offsets. Stages consume a grid and return a new one
/// rather than editing in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CharGrid {
    rows: Vec<String>,
}

impl CharGrid {
    /// Create a grid from already-symbolised rows
    pub fn new(rows: Vec<String>) -> Self {
        Self { rows }
    }

    /// Build a grid from rows of booleans (`true` = foreground)
    pub fn from_bits<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = bool>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(symbol).collect())
            .collect();
        Self { rows }
    }

    /// A row of `len` background symbols
    pub fn blank_row(len: usize) -> String {
        BACKGROUND.to_string().repeat(len)
    }

    /// Borrow the rows
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Take the rows
    pub fn into_rows(self) -> Vec<String> {
        self.rows
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Length of the first row (0 for an empty grid)
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, String::len)
    }

    /// Whether the grid has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether all rows share one length
    pub fn is_rectangular(&self) -> bool {
        let width = self.width();
        self.rows.iter().all(|r| r.len() == width)
    }

    /// Cell at (x, y), `None` when out of bounds
    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        self.rows
            .get(y)
            .and_then(|row| row.as_bytes().get(x))
            .map(|&b| b as char == FOREGROUND)
    }
}

/// Map a boolean cell onto the grid alphabet
pub fn symbol(lit: bool) -> char {
    if lit { FOREGROUND } else { BACKGROUND }
}

/// Whether a row holds any foreground symbol
pub fn has_foreground(row: &str) -> bool {
    row.contains(FOREGROUND)
}

impl fmt::Display for CharGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(row)?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for CharGrid {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}
