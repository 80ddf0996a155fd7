//! Built-in symbol library: named pixel-art stencils for the matrix.
//!
//! Each stencil is a small rectangular block of rows where `#` marks a lit
//! cell. Rendering centers the stencil on the grid and clips whatever
//! doesn't fit.

use crate::{Cell, MatrixOptions, Rgba};

/// A named stencil from the built-in table.
pub struct Symbol {
    /// Lookup name served over the API
    pub name: &'static str,
    rows: &'static [&'static str],
}

impl Symbol {
    /// Stencil width in cells.
    pub fn width(&self) -> u32 {
        self.rows.first().map_or(0, |row| row.len() as u32)
    }

    /// Stencil height in cells.
    pub fn height(&self) -> u32 {
        self.rows.len() as u32
    }

    /// Render the stencil into a full-grid cell sequence, centered.
    pub fn render(&self, color: Rgba, opts: &MatrixOptions) -> Vec<Cell> {
        let mut cells = vec![Cell::off(); opts.cell_count()];
        let width = opts.width as i32;
        let height = opts.height as i32;
        let left = (width - self.width() as i32) / 2;
        let top = (height - self.height() as i32) / 2;

        for (row, line) in self.rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch != '#' {
                    continue;
                }
                let x = left + col as i32;
                let y = top + row as i32;
                if x < 0 || y < 0 || x >= width || y >= height {
                    continue;
                }
                cells[(y * width + x) as usize] = Cell::lit(color);
            }
        }

        cells
    }
}

/// Look up a symbol by name (case-insensitive).
pub fn get(name: &str) -> Option<&'static Symbol> {
    SYMBOLS
        .iter()
        .find(|symbol| symbol.name.eq_ignore_ascii_case(name))
}

/// All symbol names, in table order.
pub fn names() -> Vec<&'static str> {
    SYMBOLS.iter().map(|symbol| symbol.name).collect()
}

const SYMBOLS: &[Symbol] = &[
    Symbol {
        name: "heart",
        rows: &[
            ".##...##.",
            "####.####",
            "#########",
            "#########",
            ".#######.",
            "..#####..",
            "...###...",
            "....#....",
        ],
    },
    Symbol {
        name: "smiley",
        rows: &[
            "..####..",
            ".#....#.",
            "#.#..#.#",
            "#......#",
            "#.#..#.#",
            "#..##..#",
            ".#....#.",
            "..####..",
        ],
    },
    Symbol {
        name: "arrow-left",
        rows: &[
            "...#...",
            "..#....",
            ".#.....",
            "#######",
            ".#.....",
            "..#....",
            "...#...",
        ],
    },
    Symbol {
        name: "arrow-right",
        rows: &[
            "...#...",
            "....#..",
            ".....#.",
            "#######",
            ".....#.",
            "....#..",
            "...#...",
        ],
    },
    Symbol {
        name: "arrow-up",
        rows: &[
            "...#...",
            "..###..",
            ".#.#.#.",
            "#..#..#",
            "...#...",
            "...#...",
            "...#...",
        ],
    },
    Symbol {
        name: "arrow-down",
        rows: &[
            "...#...",
            "...#...",
            "...#...",
            "#..#..#",
            ".#.#.#.",
            "..###..",
            "...#...",
        ],
    },
    Symbol {
        name: "invader",
        rows: &[
            "..#.....#..",
            "...#...#...",
            "..#######..",
            ".##.###.##.",
            "###########",
            "#.#######.#",
            "#.#.....#.#",
            "...##.##...",
        ],
    },
    Symbol {
        name: "note",
        rows: &[
            "..#####.",
            "..#####.",
            "..#...#.",
            "..#...#.",
            "..#...#.",
            ".##..##.",
            "###.###.",
            ".#...#..",
        ],
    },
];

// ── Tests ──────────────────────────────────────────────────────────
