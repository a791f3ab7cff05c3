//! Effective border styles and junction glyphs at render time.
//!
//! A [`BorderView`] answers "which style is this border segment" for one
//! render pass. It applies the cell-over-default cascade and clears the
//! borders of an empty trailing column or row, so the frame added by
//! [`Table::make_boxed`] does not leave dangling stubs. The table itself is
//! never modified.

use smallvec::SmallVec;

use crate::r#box::{BorderStyle, BoxGlyphs, DOUBLE, Junction, SINGLE};
use crate::grid::{CellPos, Row, Table};
use crate::solver::Dimensions;

/// Render-time view of a table's borders.
#[derive(Debug)]
pub struct BorderView<'t, 'a> {
    table: &'t Table<'a>,
    last_col: Option<usize>,
    last_row: usize,
    clear_last_col_tops: bool,
    clear_last_row_lefts: bool,
    left_counters: SmallVec<[usize; 16]>,
    above_counters: Vec<usize>,
}

impl<'t, 'a> BorderView<'t, 'a> {
    /// Build the view for solved `dimensions`.
    ///
    /// A zero-width last column loses its top borders and a zero-height last
    /// row loses its left borders. Counters drop by one for each explicit
    /// drawn override cleared this way.
    #[must_use]
    pub fn new(table: &'t Table<'a>, dimensions: &Dimensions) -> Self {
        let last_col = table.num_cols().checked_sub(1);
        let last_row = table.num_rows() - 1;
        let clear_last_col_tops = last_col.is_some_and(|x| dimensions.col_widths[x] == 0);
        let clear_last_row_lefts = dimensions.row_heights.last() == Some(&0);

        let mut left_counters: SmallVec<[usize; 16]> = (0..table.num_cols())
            .map(|x| table.border_left_counter(x))
            .collect();
        let mut above_counters: Vec<usize> =
            table.rows().iter().map(Row::border_above_counter).collect();

        if let Some(x) = last_col.filter(|_| clear_last_col_tops) {
            for (counter, row) in above_counters.iter_mut().zip(table.rows()) {
                if row.cells()[x].border_above_override().is_some_and(BorderStyle::is_drawn) {
                    *counter -= 1;
                }
            }
        }
        if clear_last_row_lefts {
            let cells = table.rows()[last_row].cells();
            for (counter, cell) in left_counters.iter_mut().zip(cells) {
                if cell.border_left_override().is_some_and(BorderStyle::is_drawn) {
                    *counter -= 1;
                }
            }
        }

        Self {
            table,
            last_col,
            last_row,
            clear_last_col_tops,
            clear_last_row_lefts,
            left_counters,
            above_counters,
        }
    }

    /// Effective left border of the slot at `pos`.
    #[must_use]
    pub fn left(&self, pos: CellPos) -> BorderStyle {
        if self.clear_last_row_lefts && pos.y == self.last_row {
            return BorderStyle::None;
        }
        self.table
            .slot(pos)
            .border_left_override()
            .unwrap_or_else(|| self.table.border_left_default(pos.x))
    }

    /// Effective top border of the slot at `pos`.
    #[must_use]
    pub fn above(&self, pos: CellPos) -> BorderStyle {
        if self.clear_last_col_tops && Some(pos.x) == self.last_col {
            return BorderStyle::None;
        }
        self.table
            .slot(pos)
            .border_above_override()
            .unwrap_or_else(|| self.table.rows()[pos.y].border_above())
    }

    /// Whether column `x` reserves a character for its left border.
    #[must_use]
    pub fn has_vline(&self, x: usize) -> bool {
        self.left_counters[x] > 0
    }

    /// Whether row `y` is preceded by a border line.
    #[must_use]
    pub fn has_hline(&self, y: usize) -> bool {
        self.above_counters[y] > 0
    }

    /// Glyph at the top-left corner of the slot at `pos`.
    ///
    /// Double glyphs are used only when strictly more segments are double
    /// than single.
    #[must_use]
    pub fn junction(&self, pos: CellPos) -> char {
        let segments = [
            (
                Junction::UP,
                pos.y.checked_sub(1).map(|y| self.left(CellPos::new(pos.x, y))),
            ),
            (Junction::RIGHT, Some(self.above(pos))),
            (Junction::DOWN, Some(self.left(pos))),
            (
                Junction::LEFT,
                pos.x.checked_sub(1).map(|x| self.above(CellPos::new(x, pos.y))),
            ),
        ];

        let mut mask = Junction::empty();
        let (mut single, mut double) = (0, 0);
        for (segment, style) in segments {
            match style {
                Some(BorderStyle::Single) => single += 1,
                Some(BorderStyle::Double) => double += 1,
                Some(BorderStyle::None) | None => continue,
            }
            mask |= segment;
        }

        let glyphs: &BoxGlyphs = if double > single { &DOUBLE } else { &SINGLE };
        glyphs.junction(mask)
    }
}
