//! Occupation grid: a canvas described by cut lines plus one occupied flag per cell.
//!
//! The canvas starts as a single free cell. Every placement that does not end exactly on an
//! existing cut line splits the last covered column and/or row in two, so the grid only ever
//! gets finer. Lookups and occupancy tests are plain indexing into `widths`, `heights` and
//! `cells`; there is no free-rectangle list to merge or prune.

use std::fmt;

/// Cell coordinates and canvas position of a feasible spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSlot {
    pub col: usize,
    pub row: usize,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone)]
pub struct OccupationGrid {
    total_width: u32,
    total_height: u32,
    widths: Vec<u32>,
    heights: Vec<u32>,
    /// Indexed `[row][col]`; `true` means occupied.
    cells: Vec<Vec<bool>>,
    occupied_area: u64,
}

impl OccupationGrid {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            total_width: width,
            total_height: height,
            widths: vec![width],
            heights: vec![height],
            cells: vec![vec![false]],
            occupied_area: 0,
        }
    }

    pub fn total_width(&self) -> u32 {
        self.total_width
    }

    pub fn total_height(&self) -> u32 {
        self.total_height
    }

    /// Column widths, left to right.
    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    /// Row heights, top to bottom.
    pub fn heights(&self) -> &[u32] {
        &self.heights
    }

    pub fn cells(&self) -> &[Vec<bool>] {
        &self.cells
    }

    /// Canvas area not yet covered by an occupation.
    pub fn free_area(&self) -> u64 {
        self.total_width as u64 * self.total_height as u64 - self.occupied_area
    }

    /// Finds a spot for a `width x height` region and occupies it.
    ///
    /// Candidates are scanned column by column (left to right), and within a column row by row
    /// (top to bottom); the first free one wins. Zero-sized requests always succeed at `(0, 0)`
    /// and leave the grid untouched. On failure the grid is untouched as well.
    pub fn try_fit(&mut self, width: u32, height: u32) -> Option<(u32, u32)> {
        let slot = self.find(width, height)?;
        self.add_occupation(slot.col, slot.row, width, height);
        tracing::trace!(
            width,
            height,
            x = slot.x,
            y = slot.y,
            "occupied cell ({}, {})\n{}",
            slot.col,
            slot.row,
            self
        );
        Some((slot.x, slot.y))
    }

    /// Same scan as [`try_fit`](Self::try_fit), without occupying anything.
    pub fn find(&self, width: u32, height: u32) -> Option<GridSlot> {
        if width == 0 || height == 0 {
            return Some(GridSlot {
                col: 0,
                row: 0,
                x: 0,
                y: 0,
            });
        }
        if width as u64 * height as u64 > self.free_area() {
            return None;
        }
        let mut x = 0u32;
        for (col, &col_width) in self.widths.iter().enumerate() {
            // Columns further right only start later.
            if x as u64 + width as u64 > self.total_width as u64 {
                break;
            }
            let mut y = 0u32;
            for (row, &row_height) in self.heights.iter().enumerate() {
                if y as u64 + height as u64 > self.total_height as u64 {
                    break;
                }
                if self.can_place_at(col, row, width, height) {
                    debug_assert!(x + width <= self.total_width && y + height <= self.total_height);
                    return Some(GridSlot { col, row, x, y });
                }
                y += row_height;
            }
            x += col_width;
        }
        None
    }

    /// True when a `width x height` region starting at cell `(col, row)` stays inside the grid
    /// and covers no occupied cell.
    pub fn can_place_at(&self, col: usize, row: usize, width: u32, height: u32) -> bool {
        if self.cells.get(row).and_then(|cells| cells.get(col)) != Some(&false) {
            return false;
        }
        let Some(end_row) = span_end(&self.heights, row, height) else {
            return false;
        };
        let Some(end_col) = span_end(&self.widths, col, width) else {
            return false;
        };
        self.cells[row..end_row]
            .iter()
            .all(|cells| cells[col..end_col].iter().all(|&occupied| !occupied))
    }

    /// Occupies a `width x height` region whose top-left corner is cell `(col, row)`.
    ///
    /// The last column and row of the span are split when they reach past the region, so the
    /// occupied cells cover exactly `width x height`.
    ///
    /// # Panics
    /// If the region runs past the grid or covers an occupied cell.
    pub fn add_occupation(&mut self, col: usize, row: usize, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        let mut end_row = row;
        let mut accum = 0u32;
        while accum < height {
            assert!(
                end_row < self.heights.len(),
                "occupation of height {height} at row {row} runs past the grid"
            );
            accum += self.heights[end_row];
            if accum > height {
                self.split_row(end_row, accum - height);
            }
            end_row += 1;
        }

        let mut end_col = col;
        let mut accum = 0u32;
        while accum < width {
            assert!(
                end_col < self.widths.len(),
                "occupation of width {width} at column {col} runs past the grid"
            );
            accum += self.widths[end_col];
            if accum > width {
                self.split_col(end_col, accum - width);
            }
            end_col += 1;
        }

        for cells in &mut self.cells[row..end_row] {
            for cell in &mut cells[col..end_col] {
                assert!(!*cell, "cell ({col}, {row}) span overlaps an occupied cell");
                *cell = true;
            }
        }
        self.occupied_area += width as u64 * height as u64;

        debug_assert_eq!(self.widths.iter().map(|&w| w as u64).sum::<u64>(), self.total_width as u64);
        debug_assert_eq!(self.heights.iter().map(|&h| h as u64).sum::<u64>(), self.total_height as u64);
    }

    /// Column `col` keeps `width - rest`; a new column of width `rest` follows it with the same
    /// occupation.
    fn split_col(&mut self, col: usize, rest: u32) {
        self.widths[col] -= rest;
        self.widths.insert(col + 1, rest);
        for cells in &mut self.cells {
            let occupied = cells[col];
            cells.insert(col + 1, occupied);
        }
    }

    fn split_row(&mut self, row: usize, rest: u32) {
        self.heights[row] -= rest;
        self.heights.insert(row + 1, rest);
        let copy = self.cells[row].clone();
        self.cells.insert(row + 1, copy);
    }
}

/// Exclusive end index of the shortest run of `sizes` starting at `start` whose sum reaches
/// `need`, or `None` if the run would pass the end.
fn span_end(sizes: &[u32], start: usize, need: u32) -> Option<usize> {
    let mut end = start;
    let mut accum = 0u32;
    while accum < need {
        accum += *sizes.get(end)?;
        end += 1;
    }
    Some(end)
}

/// Renders the cut grid: column widths on the first line, then one line per row with its
/// height and `####` for occupied cells.
impl fmt::Display for OccupationGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}", "")?;
        for w in &self.widths {
            write!(f, "{w:>5}")?;
        }
        for (h, cells) in self.heights.iter().zip(&self.cells) {
            writeln!(f)?;
            write!(f, "{h:>5}")?;
            for &occupied in cells {
                write!(f, "{:>5}", if occupied { "####" } else { "" })?;
            }
        }
        Ok(())
    }
}
