//! # gridbox
//!
//! Box-drawn text tables for terminals and logs.
//!
//! Cells are placed on a grid through a cursor, may span several columns
//! and rows, and carry their own border and alignment overrides. Column
//! widths and row heights are solved from the content, and borders are
//! joined with the right box drawing junctions.
//!
//! ## Quick Start
//!
//! ```rust
//! use gridbox::prelude::*;
//!
//! let mut table = Table::new();
//! table.set_default_h_aligns(&[HAlign::Left, HAlign::Decimal]);
//! table.add_rows([["apples", "1.5"], ["pears", "12"]]);
//! table.set_position(0, 1);
//! table.set_hline(BorderStyle::Single);
//! table.set_all_vlines(BorderStyle::Single);
//! table.make_boxed(BorderStyle::Double);
//!
//! let expected = "\
//! ╔══════╦════╗
//! ║apples│ 1.5║
//! ╠──────┼────╣
//! ║pears │12.0║
//! ╚══════╩════╝
//! ";
//! assert_eq!(table.to_string(), expected);
//! ```
//!
//! ## Core Concepts
//!
//! - **Table**: the grid, its cursor, spans, and border/alignment defaults
//! - **Solver**: column widths and row heights from cell content
//! - **BorderView**: effective border styles and junction glyphs
//! - **LineLayout**: one padded text line inside a cell box

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod border;
pub mod r#box;
pub mod cells;
pub mod grid;
pub mod layout;
pub mod logging;
pub mod render;
pub mod solver;
pub mod sync;

/// Re-exports for convenient usage
pub mod prelude {
    pub use crate::r#box::{BorderStyle, BoxGlyphs, DOUBLE, SINGLE};
    pub use crate::grid::{Cell, CellPos, GridError, Row, Table, TableBuilder};
    pub use crate::layout::{HAlign, VAlign};
    pub use crate::logging::TableLogger;
    pub use crate::solver::Dimensions;
}

// Re-export key types at crate root
pub use r#box::BorderStyle;
pub use grid::{CellPos, DEFAULT_MAX_COLS, GridError, Table, TableBuilder};
pub use layout::{HAlign, VAlign};
pub use solver::Dimensions;
