//! Terminal rendering of a character grid as solid color blocks.
//!
//! Each row starts in the light palette entry; every foreground run switches to
//! the dark entry and back. Foreground and text colors match within an entry,
//! so the symbols themselves are invisible and stripping the escapes gives the
//! grid back.

use crate::models::{CharGrid, FOREGROUND};

/// SGR reset
pub const RESET: &str = "\x1b[0m";

/// Escape sequences for the two block colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Background symbols (and the row base)
    pub light: &'static str,
    /// Foreground symbols
    pub dark: &'static str,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            light: "\x1b[37;47m",
            dark: "\x1b[30;40m",
        }
    }
}

/// Render with the default black-on-white palette
pub fn render(grid: &CharGrid) -> String {
    render_with(grid, &Palette::default())
}

/// Render one line per row, each ending in [`RESET`] and a newline
pub fn render_with(grid: &CharGrid, palette: &Palette) -> String {
    let mut out = String::new();
    for row in grid.rows() {
        out.push_str(palette.light);
        let mut dark = false;
        for c in row.chars() {
            let lit = c == FOREGROUND;
            if lit != dark {
                out.push_str(if lit { palette.dark } else { palette.light });
                dark = lit;
            }
            out.push(c);
        }
        if dark {
            out.push_str(palette.light);
        }
        out.push_str(RESET);
        out.push('\n');
    }
    out
}

/// Remove CSI escape sequences (`ESC [ ... final`) from `text`
pub fn strip_escapes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' && chars.peek() == Some(&'[') {
            chars.next();
            // parameters and intermediates, up to the final byte
            for c in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&c) {
                    break;
                }
            }
            continue;
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_row() {
        let grid: CharGrid = ["# #"].into_iter().collect();
        assert_eq!(
            render(&grid),
            "\x1b[37;47m\x1b[30;40m#\x1b[37;47m \x1b[30;40m#\x1b[37;47m\x1b[0m\n"
        );
    }

    #[test]
    fn test_blank_row_needs_no_switch() {
        let grid: CharGrid = ["  "].into_iter().collect();
        assert_eq!(render(&grid), "\x1b[37;47m  \x1b[0m\n");
    }

    #[test]
    fn test_strip_recovers_grid() {
        let grid: CharGrid = ["##  ##", "  ##  ", "#    #", "      "].into_iter().collect();
        let plain = strip_escapes(&render(&grid));
        let rows: Vec<&str> = plain.lines().collect();
        assert_eq!(rows, grid.rows());
    }

    #[test]
    fn test_custom_palette() {
        let palette = Palette {
            light: "\x1b[107m",
            dark: "\x1b[40m",
        };
        let grid: CharGrid = [" #"].into_iter().collect();
        assert_eq!(
            render_with(&grid, &palette),
            "\x1b[107m \x1b[40m#\x1b[107m\x1b[0m\n"
        );
    }

    #[test]
    fn test_strip_leaves_plain_text() {
        assert_eq!(strip_escapes("a\x1b[1;31mb\x1b[0mc"), "abc");
        assert_eq!(strip_escapes("no escapes"), "no escapes");
    }
}
