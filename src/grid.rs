//! The table grid: rows of cell slots, the insertion cursor, spans and
//! border/alignment defaults.
//!
//! A [`Table`] is filled through a cursor. Every insertion lands on the
//! cursor's slot and then moves the cursor to the next unset slot of the
//! same row, so a row is usually written as a plain sequence of
//! [`Table::add_cell`] calls followed by [`Table::next_row`].
//!
//! # Examples
//!
//! ```
//! use gridbox::prelude::*;
//!
//! let mut table = Table::new();
//! table.set_span(2, 1);
//! table.add_cell("Header");
//! table.next_row();
//! table.add_cells(["a", "b"]);
//! table.next_row();
//! table.make_boxed(BorderStyle::Single);
//!
//! assert_eq!(table.num_cols(), 3);
//! assert_eq!(table.cell(1, 0).and_then(|c| c.origin()), Some(CellPos::new(0, 0)));
//! ```

use std::borrow::Cow;
use std::fmt;

use crate::r#box::BorderStyle;
use crate::cells;
use crate::layout::{HAlign, VAlign};

/// Column capacity of a table built with [`Table::new`].
pub const DEFAULT_MAX_COLS: usize = 16;

/// Separator used by [`HAlign::Decimal`] unless configured otherwise.
pub const DEFAULT_DECIMAL_SEPARATOR: char = '.';

/// Position of a slot in the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CellPos {
    /// Column index.
    pub x: usize,
    /// Row index.
    pub y: usize,
}

impl CellPos {
    /// Create a position from column and row.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Misuse of the grid construction API.
///
/// The plain methods on [`Table`] panic with this error's message; the
/// `try_*` methods return it instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Column index at or beyond the table's column capacity.
    ColumnOutOfRange { column: usize, max_cols: usize },
    /// The slot already holds a cell or is covered by a span.
    CellAlreadySet { pos: CellPos },
    /// A span with zero width or height.
    ZeroSpan,
    /// A span reaching past the table's column capacity.
    SpanOutOfRange {
        column: usize,
        span_x: usize,
        max_cols: usize,
    },
    /// The slot is already the origin of a span.
    AlreadySpanned { pos: CellPos },
    /// The slot is covered by another cell's span.
    CellCovered { pos: CellPos, origin: CellPos },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnOutOfRange { column, max_cols } => {
                write!(f, "column {column} is out of range (max {max_cols} columns)")
            }
            Self::CellAlreadySet { pos } => write!(f, "cell at {pos} is already set"),
            Self::ZeroSpan => write!(f, "span must be at least 1x1"),
            Self::SpanOutOfRange {
                column,
                span_x,
                max_cols,
            } => write!(
                f,
                "span of {span_x} columns from column {column} exceeds {max_cols} columns"
            ),
            Self::AlreadySpanned { pos } => write!(f, "cell at {pos} already has a span"),
            Self::CellCovered { pos, origin } => {
                write!(f, "cell at {pos} is covered by the span at {origin}")
            }
        }
    }
}

impl std::error::Error for GridError {}

#[track_caller]
fn contract<T>(result: Result<T, GridError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => panic!("table contract violation: {err}"),
    }
}

/// One slot of the grid.
#[derive(Debug, Clone)]
pub struct Cell<'a> {
    text: Option<Cow<'a, str>>,
    text_height: usize,
    text_width: usize,
    h_align: Option<HAlign>,
    v_align: Option<VAlign>,
    border_left: Option<BorderStyle>,
    border_above: Option<BorderStyle>,
    span_x: usize,
    span_y: usize,
    is_set: bool,
    pos: CellPos,
    origin: Option<CellPos>,
}

impl<'a> Cell<'a> {
    fn unset(pos: CellPos) -> Self {
        Self {
            text: None,
            text_height: 0,
            text_width: 0,
            h_align: None,
            v_align: None,
            border_left: None,
            border_above: None,
            span_x: 1,
            span_y: 1,
            is_set: false,
            pos,
            origin: None,
        }
    }

    /// Cell text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Whether the table owns the text (as opposed to borrowing it).
    #[must_use]
    pub fn is_text_owned(&self) -> bool {
        matches!(self.text, Some(Cow::Owned(_)))
    }

    /// Number of text lines (0 without text).
    #[must_use]
    pub fn text_height(&self) -> usize {
        self.text_height
    }

    /// Visible width of the widest text line.
    #[must_use]
    pub fn text_width(&self) -> usize {
        self.text_width
    }

    /// Horizontal alignment set on this cell, overriding the column default.
    #[must_use]
    pub fn h_align_override(&self) -> Option<HAlign> {
        self.h_align
    }

    /// Vertical alignment set on this cell, overriding the column default.
    #[must_use]
    pub fn v_align_override(&self) -> Option<VAlign> {
        self.v_align
    }

    /// Left border set on this cell, overriding the column default.
    #[must_use]
    pub fn border_left_override(&self) -> Option<BorderStyle> {
        self.border_left
    }

    /// Top border set on this cell, overriding the row default.
    #[must_use]
    pub fn border_above_override(&self) -> Option<BorderStyle> {
        self.border_above
    }

    /// Span as `(columns, rows)`.
    #[must_use]
    pub fn span(&self) -> (usize, usize) {
        (self.span_x, self.span_y)
    }

    /// Whether the slot holds a cell or is covered by a span.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.is_set
    }

    /// Position of this slot.
    #[must_use]
    pub fn pos(&self) -> CellPos {
        self.pos
    }

    /// Origin of the span covering this slot.
    #[must_use]
    pub fn origin(&self) -> Option<CellPos> {
        self.origin
    }

    /// Set and not covered: the cell carries its own content.
    #[must_use]
    pub fn is_origin(&self) -> bool {
        self.is_set && self.origin.is_none()
    }

    /// Covered by a span that started in an earlier row.
    #[must_use]
    pub fn continues_from_above(&self) -> bool {
        self.origin.is_some_and(|origin| origin.y != self.pos.y)
    }

    /// A span may not claim this slot.
    fn is_occupied(&self) -> bool {
        self.is_set || self.origin.is_some() || self.span_x != 1 || self.span_y != 1
    }
}

/// One row of cell slots.
#[derive(Debug, Clone)]
pub struct Row<'a> {
    cells: Vec<Cell<'a>>,
    border_above: BorderStyle,
    border_above_counter: usize,
}

impl<'a> Row<'a> {
    fn new(y: usize, max_cols: usize) -> Self {
        Self {
            cells: (0..max_cols).map(|x| Cell::unset(CellPos::new(x, y))).collect(),
            border_above: BorderStyle::None,
            border_above_counter: 0,
        }
    }

    /// All slots of this row, left to right.
    #[must_use]
    pub fn cells(&self) -> &[Cell<'a>] {
        &self.cells
    }

    /// Default top border of the row.
    #[must_use]
    pub fn border_above(&self) -> BorderStyle {
        self.border_above
    }

    /// Number of drawn top borders in this row (default included).
    #[must_use]
    pub fn border_above_counter(&self) -> usize {
        self.border_above_counter
    }
}

/// Builder for tables with non-default configuration.
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    max_cols: Option<usize>,
    decimal_separator: Option<char>,
}

impl TableBuilder {
    /// Set the column capacity (at least 1).
    #[must_use]
    pub fn max_cols(mut self, max_cols: usize) -> Self {
        self.max_cols = Some(max_cols);
        self
    }

    /// Set the separator lined up by [`HAlign::Decimal`].
    #[must_use]
    pub fn decimal_separator(mut self, separator: char) -> Self {
        self.decimal_separator = Some(separator);
        self
    }

    /// Build an empty table.
    #[must_use]
    pub fn build<'a>(self) -> Table<'a> {
        let max_cols = self.max_cols.unwrap_or(DEFAULT_MAX_COLS).max(1);
        Table {
            max_cols,
            decimal_separator: self.decimal_separator.unwrap_or(DEFAULT_DECIMAL_SEPARATOR),
            num_cols: 0,
            rows: vec![Row::new(0, max_cols)],
            cursor: CellPos::default(),
            h_aligns: vec![HAlign::default(); max_cols],
            v_aligns: vec![VAlign::default(); max_cols],
            borders_left: vec![BorderStyle::None; max_cols],
            border_left_counters: vec![0; max_cols],
        }
    }
}

/// A grid of text cells rendered as a box-drawn table.
///
/// Borrowed cell text must outlive the table; owned text is dropped with it.
#[derive(Debug, Clone)]
pub struct Table<'a> {
    max_cols: usize,
    decimal_separator: char,
    num_cols: usize,
    rows: Vec<Row<'a>>,
    cursor: CellPos,
    h_aligns: Vec<HAlign>,
    v_aligns: Vec<VAlign>,
    borders_left: Vec<BorderStyle>,
    border_left_counters: Vec<usize>,
}

impl Default for Table<'_> {
    fn default() -> Self {
        TableBuilder::default().build()
    }
}

impl<'a> Table<'a> {
    /// Create an empty table with one empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start configuring a table.
    #[must_use]
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Column capacity.
    #[must_use]
    pub fn max_cols(&self) -> usize {
        self.max_cols
    }

    /// Separator lined up by decimal alignment.
    #[must_use]
    pub fn decimal_separator(&self) -> char {
        self.decimal_separator
    }

    /// Number of columns in use.
    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    /// Number of rows, including trailing empty ones.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Position of the next insertion.
    #[must_use]
    pub fn cursor(&self) -> CellPos {
        self.cursor
    }

    /// All rows, top to bottom.
    #[must_use]
    pub fn rows(&self) -> &[Row<'a>] {
        &self.rows
    }

    /// The slot at `(x, y)`.
    #[must_use]
    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell<'a>> {
        self.rows.get(y).and_then(|row| row.cells.get(x))
    }

    pub(crate) fn slot(&self, pos: CellPos) -> &Cell<'a> {
        &self.rows[pos.y].cells[pos.x]
    }

    /// The cell holding the content for `pos`: its span origin if covered.
    pub(crate) fn resolve(&self, pos: CellPos) -> &Cell<'a> {
        let cell = self.slot(pos);
        match cell.origin {
            Some(origin) => self.slot(origin),
            None => cell,
        }
    }

    /// Default left border of column `x`.
    #[must_use]
    pub fn border_left_default(&self, x: usize) -> BorderStyle {
        self.borders_left[x]
    }

    /// Number of drawn left borders in column `x` (default included).
    #[must_use]
    pub fn border_left_counter(&self, x: usize) -> usize {
        self.border_left_counters[x]
    }

    /// Effective horizontal alignment of the content shown at `pos`.
    #[must_use]
    pub fn h_align_at(&self, pos: CellPos) -> HAlign {
        let cell = self.resolve(pos);
        cell.h_align.unwrap_or(self.h_aligns[cell.pos.x])
    }

    /// Effective vertical alignment of the content shown at `pos`.
    #[must_use]
    pub fn v_align_at(&self, pos: CellPos) -> VAlign {
        let cell = self.resolve(pos);
        cell.v_align.unwrap_or(self.v_aligns[cell.pos.x])
    }

    // ------------------------------------------------------------------
    // Cursor
    // ------------------------------------------------------------------

    fn ensure_rows(&mut self, count: usize) {
        while self.rows.len() < count {
            let y = self.rows.len();
            self.rows.push(Row::new(y, self.max_cols));
        }
    }

    fn advance_cursor(&mut self) {
        let row = &self.rows[self.cursor.y];
        while self.cursor.x < self.max_cols && row.cells[self.cursor.x].is_set {
            self.cursor.x += 1;
        }
    }

    /// Move the cursor, appending rows if `y` is past the end.
    ///
    /// # Errors
    ///
    /// [`GridError::ColumnOutOfRange`] if `x` is not below the column capacity.
    pub fn try_set_position(&mut self, x: usize, y: usize) -> Result<(), GridError> {
        if x >= self.max_cols {
            return Err(GridError::ColumnOutOfRange {
                column: x,
                max_cols: self.max_cols,
            });
        }
        self.ensure_rows(y + 1);
        self.cursor = CellPos::new(x, y);
        Ok(())
    }

    /// Move the cursor, appending rows if `y` is past the end.
    ///
    /// # Panics
    ///
    /// Panics if `x` is not below the column capacity.
    #[track_caller]
    pub fn set_position(&mut self, x: usize, y: usize) {
        contract(self.try_set_position(x, y));
    }

    /// Move the cursor to the first unset slot of the next row.
    pub fn next_row(&mut self) {
        self.cursor = CellPos::new(0, self.cursor.y + 1);
        self.ensure_rows(self.cursor.y + 1);
        self.advance_cursor();
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    fn try_insert(&mut self, text: Option<Cow<'a, str>>) -> Result<(), GridError> {
        let pos = self.cursor;
        if pos.x >= self.max_cols {
            return Err(GridError::ColumnOutOfRange {
                column: pos.x,
                max_cols: self.max_cols,
            });
        }
        let cell = &mut self.rows[pos.y].cells[pos.x];
        if cell.is_set {
            return Err(GridError::CellAlreadySet { pos });
        }
        cell.is_set = true;
        cell.text_height = text.as_deref().map_or(0, cells::line_count);
        cell.text_width = text.as_deref().map_or(0, cells::text_width);
        cell.text = text;

        self.num_cols = self.num_cols.max(pos.x + 1);
        self.advance_cursor();
        Ok(())
    }

    /// Insert borrowed text at the cursor.
    ///
    /// # Errors
    ///
    /// [`GridError::CellAlreadySet`] if the slot is taken,
    /// [`GridError::ColumnOutOfRange`] if the cursor ran past the last column.
    pub fn try_add_cell(&mut self, text: &'a str) -> Result<(), GridError> {
        self.try_insert(Some(Cow::Borrowed(text)))
    }

    /// Insert owned text at the cursor.
    ///
    /// # Errors
    ///
    /// Same as [`Table::try_add_cell`].
    pub fn try_add_cell_owned(&mut self, text: impl Into<String>) -> Result<(), GridError> {
        self.try_insert(Some(Cow::Owned(text.into())))
    }

    /// Insert borrowed text at the cursor.
    ///
    /// # Panics
    ///
    /// Panics if the slot is already set or the cursor ran past the last column.
    #[track_caller]
    pub fn add_cell(&mut self, text: &'a str) {
        contract(self.try_add_cell(text));
    }

    /// Insert owned text at the cursor.
    ///
    /// # Panics
    ///
    /// Same as [`Table::add_cell`].
    #[track_caller]
    pub fn add_cell_owned(&mut self, text: impl Into<String>) {
        contract(self.try_add_cell_owned(text));
    }

    /// Insert formatted text at the cursor.
    ///
    /// ```
    /// use gridbox::Table;
    ///
    /// let mut table = Table::new();
    /// table.add_cell_fmt(format_args!(" {} ", 42));
    /// assert_eq!(table.cell(0, 0).and_then(|c| c.text()), Some(" 42 "));
    /// ```
    ///
    /// # Panics
    ///
    /// Same as [`Table::add_cell`].
    #[track_caller]
    pub fn add_cell_fmt(&mut self, args: fmt::Arguments<'_>) {
        contract(self.try_insert(Some(Cow::Owned(args.to_string()))));
    }

    /// Mark the cursor's slot as set without giving it text.
    ///
    /// # Panics
    ///
    /// Same as [`Table::add_cell`].
    #[track_caller]
    pub fn add_empty_cell(&mut self) {
        contract(self.try_insert(None));
    }

    /// Insert several borrowed cells in cursor order.
    ///
    /// # Panics
    ///
    /// Same as [`Table::add_cell`].
    #[track_caller]
    pub fn add_cells<I>(&mut self, texts: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for text in texts {
            self.add_cell(text);
        }
    }

    /// Insert rows of borrowed cells, moving to the next row after each.
    ///
    /// # Panics
    ///
    /// Same as [`Table::add_cell`].
    #[track_caller]
    pub fn add_rows<R, I>(&mut self, rows: R)
    where
        R: IntoIterator<Item = I>,
        I: IntoIterator<Item = &'a str>,
    {
        for row in rows {
            self.add_cells(row);
            self.next_row();
        }
    }

    // ------------------------------------------------------------------
    // Alignment
    // ------------------------------------------------------------------

    #[track_caller]
    fn cursor_cell_mut(&mut self) -> &mut Cell<'a> {
        let pos = self.cursor;
        if pos.x >= self.max_cols {
            contract::<()>(Err(GridError::ColumnOutOfRange {
                column: pos.x,
                max_cols: self.max_cols,
            }));
        }
        &mut self.rows[pos.y].cells[pos.x]
    }

    #[track_caller]
    fn check_column(&self, column: usize) {
        if column >= self.max_cols {
            contract::<()>(Err(GridError::ColumnOutOfRange {
                column,
                max_cols: self.max_cols,
            }));
        }
    }

    /// Set the default horizontal alignment of column `x`.
    ///
    /// # Panics
    ///
    /// Panics if `x` is not below the column capacity.
    #[track_caller]
    pub fn set_column_h_align(&mut self, x: usize, align: HAlign) {
        self.check_column(x);
        self.h_aligns[x] = align;
    }

    /// Set the default vertical alignment of column `x`.
    ///
    /// # Panics
    ///
    /// Panics if `x` is not below the column capacity.
    #[track_caller]
    pub fn set_column_v_align(&mut self, x: usize, align: VAlign) {
        self.check_column(x);
        self.v_aligns[x] = align;
    }

    /// Set default horizontal alignments for the leading columns.
    ///
    /// # Panics
    ///
    /// Panics if more alignments than columns are given.
    #[track_caller]
    pub fn set_default_h_aligns(&mut self, aligns: &[HAlign]) {
        for (x, &align) in aligns.iter().enumerate() {
            self.set_column_h_align(x, align);
        }
    }

    /// Set default vertical alignments for the leading columns.
    ///
    /// # Panics
    ///
    /// Panics if more alignments than columns are given.
    #[track_caller]
    pub fn set_default_v_aligns(&mut self, aligns: &[VAlign]) {
        for (x, &align) in aligns.iter().enumerate() {
            self.set_column_v_align(x, align);
        }
    }

    /// Override the horizontal alignment of the cursor's cell.
    ///
    /// # Panics
    ///
    /// Panics if the cursor ran past the last column.
    #[track_caller]
    pub fn override_h_align(&mut self, align: HAlign) {
        self.cursor_cell_mut().h_align = Some(align);
    }

    /// Override the vertical alignment of the cursor's cell.
    ///
    /// # Panics
    ///
    /// Panics if the cursor ran past the last column.
    #[track_caller]
    pub fn override_v_align(&mut self, align: VAlign) {
        self.cursor_cell_mut().v_align = Some(align);
    }

    /// Override the horizontal alignment of every slot in the cursor's row.
    pub fn override_h_align_of_row(&mut self, align: HAlign) {
        for cell in &mut self.rows[self.cursor.y].cells {
            cell.h_align = Some(align);
        }
    }

    /// Override the vertical alignment of every slot in the cursor's row.
    pub fn override_v_align_of_row(&mut self, align: VAlign) {
        for cell in &mut self.rows[self.cursor.y].cells {
            cell.v_align = Some(align);
        }
    }

    // ------------------------------------------------------------------
    // Borders
    // ------------------------------------------------------------------

    fn set_left_override(&mut self, pos: CellPos, style: BorderStyle) {
        let cell = &mut self.rows[pos.y].cells[pos.x];
        if cell.border_left.is_some_and(BorderStyle::is_drawn) {
            self.border_left_counters[pos.x] -= 1;
        }
        if style.is_drawn() {
            self.border_left_counters[pos.x] += 1;
        }
        cell.border_left = Some(style);
    }

    fn set_above_override(&mut self, pos: CellPos, style: BorderStyle) {
        let row = &mut self.rows[pos.y];
        let cell = &mut row.cells[pos.x];
        if cell.border_above.is_some_and(BorderStyle::is_drawn) {
            row.border_above_counter -= 1;
        }
        if style.is_drawn() {
            row.border_above_counter += 1;
        }
        cell.border_above = Some(style);
    }

    /// Set the default top border of the cursor's row.
    pub fn set_hline(&mut self, style: BorderStyle) {
        let row = &mut self.rows[self.cursor.y];
        if row.border_above.is_drawn() {
            row.border_above_counter -= 1;
        }
        if style.is_drawn() {
            row.border_above_counter += 1;
        }
        row.border_above = style;
    }

    /// Set the default left border of column `index`.
    ///
    /// # Errors
    ///
    /// [`GridError::ColumnOutOfRange`] if `index` is not below the column capacity.
    pub fn try_set_vline(&mut self, index: usize, style: BorderStyle) -> Result<(), GridError> {
        if index >= self.max_cols {
            return Err(GridError::ColumnOutOfRange {
                column: index,
                max_cols: self.max_cols,
            });
        }
        self.num_cols = self.num_cols.max(index + 1);
        if self.borders_left[index].is_drawn() {
            self.border_left_counters[index] -= 1;
        }
        if style.is_drawn() {
            self.border_left_counters[index] += 1;
        }
        self.borders_left[index] = style;
        Ok(())
    }

    /// Set the default left border of column `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below the column capacity.
    #[track_caller]
    pub fn set_vline(&mut self, index: usize, style: BorderStyle) {
        contract(self.try_set_vline(index, style));
    }

    /// Set the left border of every column except the first.
    pub fn set_all_vlines(&mut self, style: BorderStyle) {
        for index in 1..self.num_cols {
            contract(self.try_set_vline(index, style));
        }
    }

    /// Draw a frame around the table.
    ///
    /// Adds a left border to column 0 and a top border to row 0, then a
    /// border-only column after the last one and a top border on the last
    /// row. Call [`Table::next_row`] first so the bottom edge lands below
    /// the content. Leaves the cursor on the new trailing column.
    ///
    /// # Errors
    ///
    /// [`GridError::ColumnOutOfRange`] if every column is in use, leaving no
    /// room for the right edge. The table is unchanged in that case.
    pub fn try_make_boxed(&mut self, style: BorderStyle) -> Result<(), GridError> {
        let right = self.num_cols;
        if right >= self.max_cols {
            return Err(GridError::ColumnOutOfRange {
                column: right,
                max_cols: self.max_cols,
            });
        }
        self.try_set_position(0, 0)?;
        self.try_set_vline(0, style)?;
        self.set_hline(style);
        let last = self.rows.len() - 1;
        self.try_set_position(right, last)?;
        self.try_set_vline(right, style)?;
        self.set_hline(style);
        Ok(())
    }

    /// Draw a frame around the table.
    ///
    /// # Panics
    ///
    /// Panics if every column is in use.
    #[track_caller]
    pub fn make_boxed(&mut self, style: BorderStyle) {
        contract(self.try_make_boxed(style));
    }

    /// Override the left border of the cursor's cell.
    ///
    /// # Panics
    ///
    /// Panics if the cursor ran past the last column.
    #[track_caller]
    pub fn override_left_border(&mut self, style: BorderStyle) {
        self.cursor_cell_mut();
        self.set_left_override(self.cursor, style);
    }

    /// Override the top border of the cursor's cell.
    ///
    /// # Panics
    ///
    /// Panics if the cursor ran past the last column.
    #[track_caller]
    pub fn override_above_border(&mut self, style: BorderStyle) {
        self.cursor_cell_mut();
        self.set_above_override(self.cursor, style);
    }

    // ------------------------------------------------------------------
    // Spans
    // ------------------------------------------------------------------

    /// Largest-area rectangle anchored at `origin` whose other slots are
    /// all free. Ties keep the wider, shorter rectangle.
    fn clip_span(&self, origin: CellPos, span_x: usize, span_y: usize) -> (usize, usize) {
        let mut best = (1, 1);
        let mut width = span_x;
        for dy in 0..span_y {
            width = match self.rows.get(origin.y + dy) {
                Some(row) => {
                    let skip = usize::from(dy == 0);
                    skip + (skip..width)
                        .take_while(|&dx| !row.cells[origin.x + dx].is_occupied())
                        .count()
                }
                None => width,
            };
            if width == 0 {
                break;
            }
            if width * (dy + 1) > best.0 * best.1 {
                best = (width, dy + 1);
            }
        }
        best
    }

    /// Merge the cursor's slot with its neighbours into one cell.
    ///
    /// Slots already occupied are never overwritten: the span shrinks to the
    /// largest rectangle that avoids them. Returns the span actually applied.
    ///
    /// # Errors
    ///
    /// [`GridError::ZeroSpan`], [`GridError::SpanOutOfRange`],
    /// [`GridError::AlreadySpanned`] or [`GridError::CellCovered`].
    pub fn try_set_span(
        &mut self,
        span_x: usize,
        span_y: usize,
    ) -> Result<(usize, usize), GridError> {
        if span_x == 0 || span_y == 0 {
            return Err(GridError::ZeroSpan);
        }
        let origin = self.cursor;
        if origin.x + span_x > self.max_cols {
            return Err(GridError::SpanOutOfRange {
                column: origin.x,
                span_x,
                max_cols: self.max_cols,
            });
        }
        let cell = self.slot(origin);
        if let Some(covering) = cell.origin {
            return Err(GridError::CellCovered {
                pos: origin,
                origin: covering,
            });
        }
        if cell.span() != (1, 1) {
            return Err(GridError::AlreadySpanned { pos: origin });
        }

        let (width, height) = self.clip_span(origin, span_x, span_y);
        if (width, height) != (span_x, span_y) {
            log::debug!(
                "span {span_x}x{span_y} at {origin} clipped to {width}x{height} by occupied cells"
            );
        }

        self.ensure_rows(origin.y + height);
        let cell = &mut self.rows[origin.y].cells[origin.x];
        cell.span_x = width;
        cell.span_y = height;
        self.num_cols = self.num_cols.max(origin.x + width);

        for dy in 0..height {
            for dx in 0..width {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let pos = CellPos::new(origin.x + dx, origin.y + dy);
                let child = &mut self.rows[pos.y].cells[pos.x];
                child.is_set = true;
                child.origin = Some(origin);
                if dx != 0 {
                    self.set_left_override(pos, BorderStyle::None);
                }
                if dy != 0 {
                    self.set_above_override(pos, BorderStyle::None);
                }
            }
        }
        Ok((width, height))
    }

    /// Merge the cursor's slot with its neighbours into one cell.
    ///
    /// # Panics
    ///
    /// Panics on a zero span, a span past the column capacity, or when the
    /// cursor's slot is already part of a span.
    #[track_caller]
    pub fn set_span(&mut self, span_x: usize, span_y: usize) -> (usize, usize) {
        contract(self.try_set_span(span_x, span_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_table_has_one_empty_row() {
        let table = Table::new();
        assert_eq!(table.num_rows(), 1);
        assert_eq!(table.num_cols(), 0);
        assert_eq!(table.max_cols(), DEFAULT_MAX_COLS);
        assert_eq!(table.cursor(), CellPos::new(0, 0));
        assert_eq!(table.rows()[0].cells().len(), DEFAULT_MAX_COLS);
    }

    #[test]
    fn test_builder_configuration() {
        let table = Table::builder().max_cols(4).decimal_separator(',').build();
        assert_eq!(table.max_cols(), 4);
        assert_eq!(table.decimal_separator(), ',');

        let clamped = Table::builder().max_cols(0).build();
        assert_eq!(clamped.max_cols(), 1);
    }

    #[test]
    fn test_add_cell_advances_cursor() {
        let mut table = Table::new();
        table.add_cells(["a", "bb", "ccc"]);
        assert_eq!(table.cursor(), CellPos::new(3, 0));
        assert_eq!(table.num_cols(), 3);
        assert_eq!(table.cell(1, 0).and_then(Cell::text), Some("bb"));
        assert_eq!(table.cell(2, 0).map(Cell::text_width), Some(3));
    }

    #[test]
    fn test_cursor_skips_set_cells() {
        let mut table = Table::new();
        table.set_position(1, 0);
        table.add_cell("b");
        table.set_position(0, 0);
        table.add_cell("a");
        assert_eq!(table.cursor(), CellPos::new(2, 0));
    }

    #[test]
    fn test_multiline_text_metrics() {
        let mut table = Table::new();
        table.add_cell(" ^ no border \n and span x \n and also y ");
        let cell = table.cell(0, 0).unwrap();
        assert_eq!(cell.text_height(), 3);
        assert_eq!(cell.text_width(), 13);
    }

    #[test]
    fn test_empty_cell_has_no_text() {
        let mut table = Table::new();
        table.add_empty_cell();
        let cell = table.cell(0, 0).unwrap();
        assert!(cell.is_set());
        assert_eq!(cell.text(), None);
        assert_eq!(cell.text_height(), 0);
        assert_eq!(table.num_cols(), 1);
    }

    #[test]
    fn test_owned_and_borrowed_text() {
        let mut table = Table::new();
        table.add_cell("borrowed");
        table.add_cell_owned(String::from("owned"));
        table.add_cell_fmt(format_args!("{}-{}", 1, 2));
        assert!(!table.cell(0, 0).unwrap().is_text_owned());
        assert!(table.cell(1, 0).unwrap().is_text_owned());
        assert_eq!(table.cell(2, 0).and_then(Cell::text), Some("1-2"));
    }

    #[test]
    fn test_setting_a_cell_twice_fails() {
        let mut table = Table::new();
        table.add_cell("x");
        table.set_position(0, 0);
        assert_eq!(
            table.try_add_cell("y"),
            Err(GridError::CellAlreadySet {
                pos: CellPos::new(0, 0)
            })
        );
        assert_eq!(table.cell(0, 0).and_then(Cell::text), Some("x"));
    }

    #[test]
    #[should_panic(expected = "already set")]
    fn test_add_cell_panics_on_set_slot() {
        let mut table = Table::new();
        table.add_cell("x");
        table.set_position(0, 0);
        table.add_cell("y");
    }

    #[test]
    fn test_column_capacity() {
        let mut table = Table::builder().max_cols(2).build();
        table.add_cells(["a", "b"]);
        assert_eq!(table.cursor(), CellPos::new(2, 0));
        assert_eq!(
            table.try_add_cell("c"),
            Err(GridError::ColumnOutOfRange {
                column: 2,
                max_cols: 2
            })
        );
        assert!(table.try_set_position(2, 0).is_err());
        assert!(table.try_set_vline(2, BorderStyle::Single).is_err());
    }

    #[test]
    fn test_set_position_appends_rows() {
        let mut table = Table::new();
        table.set_position(2, 4);
        assert_eq!(table.num_rows(), 5);
        assert_eq!(table.cell(3, 4).map(Cell::pos), Some(CellPos::new(3, 4)));
    }

    #[test]
    fn test_next_row_appends_and_skips() {
        let mut table = Table::new();
        table.set_span(1, 2);
        table.add_cell("tall");
        table.add_cell("b");
        table.next_row();
        // (0, 1) is covered by the tall cell
        assert_eq!(table.cursor(), CellPos::new(1, 1));
        table.next_row();
        assert_eq!(table.cursor(), CellPos::new(0, 2));
        assert_eq!(table.num_rows(), 3);
    }

    #[test]
    fn test_add_rows() {
        let mut table = Table::new();
        table.add_rows([["a", "b"], ["c", "d"]]);
        assert_eq!(table.num_rows(), 3);
        assert_eq!(table.cursor(), CellPos::new(0, 2));
        assert_eq!(table.cell(1, 1).and_then(Cell::text), Some("d"));
    }

    #[test]
    fn test_span_marks_children() {
        let mut table = Table::new();
        assert_eq!(table.set_span(2, 2), (2, 2));
        table.add_cell("origin");
        assert_eq!(table.num_cols(), 2);
        assert_eq!(table.num_rows(), 2);
        for (x, y) in [(1, 0), (0, 1), (1, 1)] {
            let cell = table.cell(x, y).unwrap();
            assert!(cell.is_set());
            assert_eq!(cell.origin(), Some(CellPos::new(0, 0)));
        }
        assert_eq!(
            table.cell(1, 0).unwrap().border_left_override(),
            Some(BorderStyle::None)
        );
        assert_eq!(table.cell(1, 0).unwrap().border_above_override(), None);
        assert_eq!(
            table.cell(0, 1).unwrap().border_above_override(),
            Some(BorderStyle::None)
        );
        assert!(table.cell(0, 1).unwrap().continues_from_above());
        assert!(!table.cell(1, 0).unwrap().continues_from_above());
        assert_eq!(table.cursor(), CellPos::new(2, 0));
    }

    #[test]
    fn test_span_clipped_by_row_neighbour() {
        let mut table = Table::new();
        table.set_position(2, 0);
        table.add_cell("blocker");
        table.set_position(0, 0);
        assert_eq!(table.set_span(3, 1), (2, 1));
        assert!(table.cell(2, 0).unwrap().origin().is_none());
    }

    #[test]
    fn test_span_clipped_to_largest_rectangle() {
        let mut table = Table::new();
        // Blocker at (2, 1): a 3x3 request can keep 3x1 (area 3) or 2x3 (area 6)
        table.set_position(2, 1);
        table.add_cell("x");
        table.set_position(0, 0);
        assert_eq!(table.set_span(3, 3), (2, 3));
        assert!(table.cell(2, 0).unwrap().origin().is_none());
        assert!(!table.cell(2, 0).unwrap().is_set());
        assert_eq!(table.cell(1, 2).unwrap().origin(), Some(CellPos::new(0, 0)));
    }

    #[test]
    fn test_span_tie_prefers_wider() {
        let mut table = Table::new();
        // Blocker at (1, 1): 2x1 and 1x2 both have area 2
        table.set_position(1, 1);
        table.add_cell("x");
        table.set_position(0, 0);
        assert_eq!(table.set_span(2, 2), (2, 1));
    }

    #[test]
    fn test_span_does_not_claim_pending_origin() {
        let mut table = Table::new();
        table.set_position(1, 0);
        table.set_span(1, 2);
        table.set_position(0, 0);
        assert_eq!(table.set_span(2, 1), (1, 1));
    }

    #[test]
    fn test_span_errors() {
        let mut table = Table::builder().max_cols(3).build();
        assert_eq!(table.try_set_span(0, 1), Err(GridError::ZeroSpan));
        table.set_position(2, 0);
        assert!(matches!(
            table.try_set_span(2, 1),
            Err(GridError::SpanOutOfRange { .. })
        ));
        table.set_position(0, 0);
        table.set_span(2, 1);
        assert_eq!(
            table.try_set_span(1, 2),
            Err(GridError::AlreadySpanned {
                pos: CellPos::new(0, 0)
            })
        );
        table.set_position(1, 0);
        assert_eq!(
            table.try_set_span(1, 2),
            Err(GridError::CellCovered {
                pos: CellPos::new(1, 0),
                origin: CellPos::new(0, 0)
            })
        );
    }

    #[test]
    fn test_row_counter_lockstep() {
        let mut table = Table::new();
        table.set_hline(BorderStyle::Single);
        assert_eq!(table.rows()[0].border_above_counter(), 1);
        table.set_hline(BorderStyle::Double);
        assert_eq!(table.rows()[0].border_above_counter(), 1);
        table.override_above_border(BorderStyle::Single);
        assert_eq!(table.rows()[0].border_above_counter(), 2);
        table.override_above_border(BorderStyle::None);
        assert_eq!(table.rows()[0].border_above_counter(), 1);
        table.set_hline(BorderStyle::None);
        assert_eq!(table.rows()[0].border_above_counter(), 0);
    }

    #[test]
    fn test_column_counter_lockstep() {
        let mut table = Table::new();
        table.set_vline(1, BorderStyle::Single);
        assert_eq!(table.border_left_counter(1), 1);
        assert_eq!(table.num_cols(), 2);
        table.set_position(1, 0);
        table.override_left_border(BorderStyle::Double);
        assert_eq!(table.border_left_counter(1), 2);
        table.override_left_border(BorderStyle::Single);
        assert_eq!(table.border_left_counter(1), 2);
        table.set_vline(1, BorderStyle::None);
        assert_eq!(table.border_left_counter(1), 1);
    }

    #[test]
    fn test_span_children_release_counted_overrides() {
        let mut table = Table::new();
        table.set_position(1, 0);
        table.override_left_border(BorderStyle::Double);
        assert_eq!(table.border_left_counter(1), 1);
        table.set_position(0, 0);
        table.set_span(2, 1);
        assert_eq!(table.border_left_counter(1), 0);
    }

    #[test]
    fn test_make_boxed_adds_edge_column() {
        let mut table = Table::new();
        table.add_cells(["a", "b"]);
        table.next_row();
        table.make_boxed(BorderStyle::Single);
        assert_eq!(table.num_cols(), 3);
        assert_eq!(table.border_left_default(0), BorderStyle::Single);
        assert_eq!(table.border_left_default(2), BorderStyle::Single);
        assert_eq!(table.rows()[0].border_above(), BorderStyle::Single);
        assert_eq!(table.rows()[1].border_above(), BorderStyle::Single);
    }

    #[test]
    fn test_make_boxed_needs_a_free_column() {
        let mut table = Table::builder().max_cols(2).build();
        table.add_cells(["a", "b"]);
        assert!(table.try_make_boxed(BorderStyle::Single).is_err());
        assert_eq!(table.border_left_counter(0), 0);
    }

    #[test]
    fn test_set_all_vlines_skips_first_column() {
        let mut table = Table::new();
        table.add_cells(["a", "b", "c"]);
        table.set_all_vlines(BorderStyle::Single);
        assert_eq!(table.border_left_counter(0), 0);
        assert_eq!(table.border_left_counter(1), 1);
        assert_eq!(table.border_left_counter(2), 1);
    }

    #[test]
    fn test_alignment_cascade() {
        let mut table = Table::new();
        table.set_default_h_aligns(&[HAlign::Right, HAlign::Center]);
        table.set_default_v_aligns(&[VAlign::Bottom]);
        table.add_cell("a");
        table.override_h_align(HAlign::Left);
        table.set_span(1, 2);
        table.add_cell("b");
        assert_eq!(table.h_align_at(CellPos::new(0, 0)), HAlign::Right);
        assert_eq!(table.v_align_at(CellPos::new(0, 0)), VAlign::Bottom);
        assert_eq!(table.h_align_at(CellPos::new(1, 0)), HAlign::Left);
        // Covered slots follow their origin
        assert_eq!(table.h_align_at(CellPos::new(1, 1)), HAlign::Left);
        assert_eq!(table.v_align_at(CellPos::new(1, 1)), VAlign::Top);
    }

    #[test]
    fn test_override_alignment_of_row() {
        let mut table = Table::new();
        table.set_default_h_aligns(&[HAlign::Right, HAlign::Right]);
        table.override_h_align_of_row(HAlign::Center);
        table.override_v_align_of_row(VAlign::Center);
        table.add_cells(["a", "b"]);
        assert_eq!(table.h_align_at(CellPos::new(1, 0)), HAlign::Center);
        assert_eq!(table.v_align_at(CellPos::new(0, 0)), VAlign::Center);
    }

    #[test]
    fn test_error_display() {
        let err = GridError::ColumnOutOfRange {
            column: 16,
            max_cols: 16,
        };
        assert_eq!(err.to_string(), "column 16 is out of range (max 16 columns)");
        assert_eq!(GridError::ZeroSpan.to_string(), "span must be at least 1x1");
    }
}
