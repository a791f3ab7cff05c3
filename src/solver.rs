//! Column widths and row heights.
//!
//! Every cell that carries its own content contributes one width constraint
//! over the columns it spans and one height constraint over its rows. A
//! border line inside a span counts as one unit of space, so each interior
//! border with a nonzero counter lowers the requirement by one.
//!
//! Constraints are solved greedily: single-column (single-row) constraints
//! first, then every remaining shortfall is spread evenly across its range
//! with the remainder going to the leading indices.

use std::collections::HashMap;

use crate::cells;
use crate::grid::{Cell, CellPos, Table};
use crate::layout::HAlign;

/// `sizes[start..end]` must sum to at least `min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    pub start: usize,
    pub end: usize,
    pub min: usize,
}

impl Constraint {
    #[must_use]
    pub const fn new(start: usize, end: usize, min: usize) -> Self {
        Self { start, end, min }
    }

    /// Number of indices covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Amount missing from `sizes` to satisfy this constraint.
    #[must_use]
    pub fn shortfall(&self, sizes: &[usize]) -> usize {
        let sum: usize = sizes[self.start..self.end].iter().sum();
        self.min.saturating_sub(sum)
    }
}

/// Grow `sizes` until every constraint holds.
///
/// Sizes are only ever increased, so callers normally start from zeros.
pub fn satisfy_constraints(constraints: &[Constraint], sizes: &mut [usize]) {
    for constraint in constraints.iter().filter(|c| c.len() == 1) {
        let size = &mut sizes[constraint.start];
        *size = (*size).max(constraint.min);
    }

    for constraint in constraints.iter().filter(|c| !c.is_empty()) {
        let shortfall = constraint.shortfall(sizes);
        if shortfall == 0 {
            continue;
        }
        let len = constraint.len();
        let (share, extra) = (shortfall / len, shortfall % len);
        for (offset, size) in sizes[constraint.start..constraint.end].iter_mut().enumerate() {
            *size += share + usize::from(offset < extra);
        }
    }
}

/// Decimal padding decided for one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalFit {
    /// Insert `separator` (if any) then `zeros` zero digits at byte offset
    /// `split` of the first line.
    Aligned {
        split: usize,
        zeros: usize,
        separator: Option<char>,
    },
    /// The first line has no digit; the cell is right aligned instead.
    RightFallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DecimalScan {
    split: usize,
    fraction_digits: usize,
    has_separator: bool,
}

/// Find where a number in `line` ends and how many fraction digits it has.
///
/// Leading non-digits are skipped. `None` if the line has no digit.
fn scan_decimal(line: &str, separator: char) -> Option<DecimalScan> {
    let mut seen_digit = false;
    let mut has_separator = false;
    let mut fraction_digits = 0;
    let mut split = line.len();

    for (idx, c) in cells::visible_chars(line) {
        if has_separator {
            if !c.is_ascii_digit() {
                split = idx;
                break;
            }
            seen_digit = true;
            fraction_digits += 1;
        } else if c == separator {
            has_separator = true;
        } else if c.is_ascii_digit() {
            seen_digit = true;
        } else if seen_digit {
            split = idx;
            break;
        }
    }

    seen_digit.then_some(DecimalScan {
        split,
        fraction_digits,
        has_separator,
    })
}

/// Solved size of every column and row.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub col_widths: Vec<usize>,
    pub row_heights: Vec<usize>,
}

impl Dimensions {
    /// Width of `count` columns from `start`, without borders.
    #[must_use]
    pub fn width_of(&self, start: usize, count: usize) -> usize {
        self.col_widths[start..start + count].iter().sum()
    }

    /// Height of `count` rows from `start`, without borders.
    #[must_use]
    pub fn height_of(&self, start: usize, count: usize) -> usize {
        self.row_heights[start..start + count].iter().sum()
    }
}

/// Dimensions plus the decimal padding they were computed with.
#[derive(Debug, Clone, Default)]
pub(crate) struct Solution {
    pub dimensions: Dimensions,
    pub decimals: HashMap<CellPos, DecimalFit>,
}

fn decimal_fits(table: &Table<'_>) -> HashMap<CellPos, DecimalFit> {
    let separator = table.decimal_separator();
    let mut fits = HashMap::new();

    for x in 0..table.num_cols() {
        let scans: Vec<(CellPos, Option<DecimalScan>)> = table
            .rows()
            .iter()
            .map(|row| &row.cells()[x])
            .filter(|cell| cell.is_origin() && table.h_align_at(cell.pos()) == HAlign::Decimal)
            .filter_map(|cell| {
                let first = cells::lines(cell.text()?).next()?;
                Some((cell.pos(), scan_decimal(first, separator)))
            })
            .collect();

        let max_fraction = scans
            .iter()
            .filter_map(|(_, scan)| scan.map(|s| s.fraction_digits))
            .max()
            .unwrap_or(0);

        for (pos, scan) in scans {
            let fit = match scan {
                Some(scan) => DecimalFit::Aligned {
                    split: scan.split,
                    zeros: max_fraction - scan.fraction_digits,
                    separator: (max_fraction > 0 && !scan.has_separator).then_some(separator),
                },
                None => {
                    log::debug!("decimal cell at {pos} has no digits, aligning right");
                    DecimalFit::RightFallback
                }
            };
            fits.insert(pos, fit);
        }
    }
    fits
}

fn width_requirement(cell: &Cell<'_>, fit: Option<&DecimalFit>) -> usize {
    match (cell.text(), fit) {
        (
            Some(text),
            Some(&DecimalFit::Aligned {
                zeros, separator, ..
            }),
        ) => {
            let mut lines = cells::lines(text);
            let first = lines.next().map_or(0, cells::visible_width)
                + zeros
                + usize::from(separator.is_some());
            lines.map(cells::visible_width).fold(first, usize::max)
        }
        _ => cell.text_width(),
    }
}

/// Solve column widths and row heights of `table`.
pub(crate) fn solve(table: &Table<'_>) -> Solution {
    let num_cols = table.num_cols();
    let num_rows = table.num_rows();
    let decimals = decimal_fits(table);

    let mut width_constraints = Vec::new();
    let mut height_constraints = Vec::new();
    for row in table.rows() {
        for cell in row.cells()[..num_cols].iter().filter(|c| c.is_origin()) {
            let CellPos { x, y } = cell.pos();
            let (span_x, span_y) = cell.span();

            let interior_vlines = (x + 1..x + span_x)
                .filter(|&col| table.border_left_counter(col) > 0)
                .count();
            let width = width_requirement(cell, decimals.get(&cell.pos()));
            width_constraints.push(Constraint::new(
                x,
                x + span_x,
                width.saturating_sub(interior_vlines),
            ));

            let interior_hlines = table.rows()[y + 1..y + span_y]
                .iter()
                .filter(|r| r.border_above_counter() > 0)
                .count();
            height_constraints.push(Constraint::new(
                y,
                y + span_y,
                cell.text_height().saturating_sub(interior_hlines),
            ));
        }
    }

    let mut dimensions = Dimensions {
        col_widths: vec![0; num_cols],
        row_heights: vec![0; num_rows],
    };
    satisfy_constraints(&width_constraints, &mut dimensions.col_widths);
    satisfy_constraints(&height_constraints, &mut dimensions.row_heights);
    log::debug!(
        "solved {num_cols}x{num_rows} grid: widths {:?}, heights {:?}",
        dimensions.col_widths,
        dimensions.row_heights
    );

    Solution {
        dimensions,
        decimals,
    }
}
