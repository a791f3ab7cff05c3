//! Streaming a solved table to a writer.
//!
//! Each row produces an optional border line followed by one content line
//! per unit of row height. Cells spanning several rows keep a running line
//! index per column so their text continues across rows and through the
//! border lines in between.

use std::fmt;
use std::io::{self, Write};

use smallvec::{SmallVec, smallvec};

use crate::border::BorderView;
use crate::r#box::BoxGlyphs;
use crate::grid::{CellPos, Table};
use crate::layout::{self, LineLayout};
use crate::solver::{self, Dimensions, Solution};

fn write_repeated<W: Write + ?Sized>(out: &mut W, ch: char, count: usize) -> io::Result<()> {
    let mut buf = [0u8; 4];
    let encoded = ch.encode_utf8(&mut buf).as_bytes();
    for _ in 0..count {
        out.write_all(encoded)?;
    }
    Ok(())
}

/// One render pass over a table.
struct Renderer<'t, 'a> {
    table: &'t Table<'a>,
    solution: Solution,
    view: BorderView<'t, 'a>,
    line_indices: SmallVec<[usize; 16]>,
}

impl<'t, 'a> Renderer<'t, 'a> {
    fn new(table: &'t Table<'a>) -> Self {
        let solution = solver::solve(table);
        let view = BorderView::new(table, &solution.dimensions);
        Self {
            table,
            solution,
            view,
            line_indices: smallvec![0; table.num_cols()],
        }
    }

    /// Width of a box spanning `span_x` columns from `x`.
    fn box_width(&self, x: usize, span_x: usize) -> usize {
        let borders = (x + 1..x + span_x).filter(|&col| self.view.has_vline(col)).count();
        self.solution.dimensions.width_of(x, span_x) + borders
    }

    /// Height of a box spanning `span_y` rows from `y`.
    fn box_height(&self, y: usize, span_y: usize) -> usize {
        let borders = (y + 1..y + span_y).filter(|&row| self.view.has_hline(row)).count();
        self.solution.dimensions.height_of(y, span_y) + borders
    }

    /// Next line of the content shown at `pos`, advancing its column's index.
    fn next_line(&mut self, pos: CellPos) -> (LineLayout<'t>, usize) {
        let table = self.table;
        let origin = table.resolve(pos);
        let (span_x, span_y) = origin.span();
        let CellPos { x, y } = origin.pos();

        let layout = layout::layout_line(
            origin.text(),
            table.h_align_at(pos),
            table.v_align_at(pos),
            self.solution.decimals.get(&origin.pos()).copied(),
            self.box_width(x, span_x),
            self.box_height(y, span_y),
            self.line_indices[pos.x],
        );
        self.line_indices[pos.x] += 1;
        (layout, span_x)
    }

    fn border_line<W: Write + ?Sized>(&mut self, out: &mut W, y: usize) -> io::Result<()> {
        let table = self.table;
        let mut x = 0;
        while x < table.num_cols() {
            let pos = CellPos::new(x, y);
            if self.view.has_vline(x) {
                write!(out, "{}", self.view.junction(pos))?;
            }
            if table.slot(pos).continues_from_above() {
                let (layout, span_x) = self.next_line(pos);
                write!(out, "{layout}")?;
                x += span_x;
            } else {
                let run = BoxGlyphs::for_style(self.view.above(pos)).map_or(' ', |g| g.horizontal);
                write_repeated(out, run, self.solution.dimensions.col_widths[x])?;
                x += 1;
            }
        }
        writeln!(out)
    }

    fn content_line<W: Write + ?Sized>(&mut self, out: &mut W, y: usize) -> io::Result<()> {
        let mut x = 0;
        while x < self.table.num_cols() {
            let pos = CellPos::new(x, y);
            if self.view.has_vline(x) {
                let edge = BoxGlyphs::for_style(self.view.left(pos)).map_or(' ', |g| g.vertical);
                write!(out, "{edge}")?;
            }
            let (layout, span_x) = self.next_line(pos);
            write!(out, "{layout}")?;
            x += span_x;
        }
        writeln!(out)
    }

    fn render<W: Write + ?Sized>(mut self, out: &mut W) -> io::Result<()> {
        let table = self.table;
        if table.num_cols() == 0 {
            return Ok(());
        }

        for (y, row) in table.rows().iter().enumerate() {
            if self.view.has_hline(y) {
                self.border_line(out, y)?;
            }
            for (index, cell) in self.line_indices.iter_mut().zip(row.cells()) {
                if !cell.continues_from_above() {
                    *index = 0;
                }
            }
            for _ in 0..self.solution.dimensions.row_heights[y] {
                self.content_line(out, y)?;
            }
            log::trace!("rendered row {y}");
        }
        Ok(())
    }
}

impl Table<'_> {
    /// Solved column widths and row heights.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        solver::solve(self).dimensions
    }

    /// Write the table to `out`, one `\n`-terminated line at a time.
    ///
    /// An empty table writes nothing. Rendering does not change the table,
    /// so repeated calls produce identical output.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by `out`.
    pub fn render<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        Renderer::new(self).render(out)
    }

    /// Render into a `String`.
    #[must_use]
    pub fn render_to_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.render(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Render to standard output.
    ///
    /// # Errors
    ///
    /// Returns any error writing to stdout.
    pub fn print(&self) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.render(&mut stdout)?;
        stdout.flush()
    }
}

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_to_string())
    }
}
