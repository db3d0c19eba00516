//! Precomputed cell-to-cell visibility.
//!
//! # Text format
//!
//! One line per source cell, ordered column-major: line `x * height + y` holds the
//! flags for cell `(x, y)`. Each line is `width * height` whitespace-separated
//! `0`/`1` flags, where flag `x + y * width` marks that cell as visible. Trailing
//! blank lines are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::{Grid, LodError};

/// Read-only map from a cell index to the sorted indices of cells visible from it.
///
/// Every cell sees itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibilityTable {
    grid: Grid,
    visible: Vec<Vec<u32>>,
}

impl VisibilityTable {
    /// Build from explicit per-cell sets, indexed by cell index.
    pub fn from_sets(grid: Grid, sets: Vec<Vec<u32>>) -> Result<Self, LodError> {
        if sets.len() != grid.cell_count() {
            return Err(LodError::GridMismatch {
                expected: grid.dimensions(),
                actual: (sets.len() as u32, 1),
            });
        }
        let mut visible = sets;
        for (cell, set) in visible.iter_mut().enumerate() {
            if let Some(&bad) = set.iter().find(|&&c| c as usize >= grid.cell_count()) {
                let at = grid.cell_at(bad as usize);
                return Err(LodError::CellOutOfRange { x: at.x, y: at.y });
            }
            set.push(cell as u32);
            set.sort_unstable();
            set.dedup();
        }
        Ok(Self { grid, visible })
    }

    /// Every cell sees every other cell.
    pub fn all_visible(grid: Grid) -> Self {
        let all: Vec<u32> = (0..grid.cell_count() as u32).collect();
        Self {
            grid,
            visible: vec![all; grid.cell_count()],
        }
    }

    /// Parse the text format for `grid`.
    pub fn from_reader<R: BufRead>(reader: R, grid: Grid) -> Result<Self, LodError> {
        let cells = grid.cell_count();
        let mut visible = vec![Vec::new(); cells];
        let mut rows = 0usize;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = i + 1;
            if line.trim().is_empty() {
                continue;
            }
            if rows == cells {
                return Err(LodError::Visibility {
                    line: line_no,
                    reason: format!("more than {cells} rows"),
                });
            }
            // Column-major source order.
            let source = grid.cell_index(glam::UVec2::new(
                (rows / grid.height() as usize) as u32,
                (rows % grid.height() as usize) as u32,
            ));

            let mut flags = 0usize;
            for token in line.split_whitespace() {
                let seen = match token {
                    "0" => false,
                    "1" => true,
                    other => {
                        return Err(LodError::Visibility {
                            line: line_no,
                            reason: format!("invalid flag '{other}'"),
                        });
                    }
                };
                if flags == cells {
                    return Err(LodError::Visibility {
                        line: line_no,
                        reason: format!("expected {cells} flags, found more"),
                    });
                }
                if seen || flags == source {
                    visible[source].push(flags as u32);
                }
                flags += 1;
            }
            if flags != cells {
                return Err(LodError::Visibility {
                    line: line_no,
                    reason: format!("expected {cells} flags, found {flags}"),
                });
            }
            rows += 1;
        }

        if rows != cells {
            return Err(LodError::Visibility {
                line: rows + 1,
                reason: format!("expected {cells} rows, found {rows}"),
            });
        }
        Ok(Self { grid, visible })
    }

    /// Open and parse a visibility file.
    pub fn load(path: &Path, grid: Grid) -> Result<Self, LodError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), grid)
    }

    /// Write the table in the text format.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), LodError> {
        let cells = self.grid.cell_count();
        let mut flags = vec![false; cells];
        for x in 0..self.grid.width() {
            for y in 0..self.grid.height() {
                flags.iter_mut().for_each(|f| *f = false);
                let source = self.grid.cell_index(glam::UVec2::new(x, y));
                for &c in &self.visible[source] {
                    flags[c as usize] = true;
                }
                let line: Vec<&str> = flags.iter().map(|&f| if f { "1" } else { "0" }).collect();
                writeln!(writer, "{}", line.join(" "))?;
            }
        }
        writer.flush()?;
        Ok(())
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Sorted indices of cells visible from `cell`; empty if out of range.
    pub fn visible_from(&self, cell: usize) -> &[u32] {
        self.visible.get(cell).map_or(&[][..], Vec::as_slice)
    }

    pub fn is_visible(&self, from: usize, to: usize) -> bool {
        self.visible_from(from).binary_search(&(to as u32)).is_ok()
    }
}
