//! Placement of one text line inside a cell box.
//!
//! A cell box is the rectangle a cell occupies once column widths and row
//! heights are known: the sum of the spanned sizes plus the interior border
//! lines it swallows. Rendering walks the box top to bottom and asks for one
//! [`LineLayout`] per physical line.

use std::fmt;

use crate::cells;
use crate::solver::DecimalFit;

/// Horizontal alignment of text inside its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HAlign {
    #[default]
    Left,
    Right,
    Center,
    /// Right aligned with the decimal separators of the column lined up.
    Decimal,
}

/// Vertical alignment of text inside its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VAlign {
    #[default]
    Top,
    Center,
    Bottom,
}

/// One laid-out line: padding, text, and virtual decimal padding.
///
/// `Display` writes `lead` spaces, `head`, the optional separator, `zeros`
/// zero digits, `tail` and `trail` spaces. Text is written verbatim, escape
/// sequences included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineLayout<'t> {
    pub lead: usize,
    pub head: &'t str,
    pub separator: Option<char>,
    pub zeros: usize,
    pub tail: &'t str,
    pub trail: usize,
}

impl<'t> LineLayout<'t> {
    /// An all-blank line.
    #[must_use]
    pub fn blank(width: usize) -> Self {
        Self {
            lead: width,
            ..Self::default()
        }
    }

    fn padded(lead: usize, text: &'t str, trail: usize) -> Self {
        Self {
            lead,
            head: text,
            trail,
            ..Self::default()
        }
    }

    /// Visible width of the line.
    #[must_use]
    pub fn width(&self) -> usize {
        self.lead
            + cells::visible_width(self.head)
            + usize::from(self.separator.is_some())
            + self.zeros
            + cells::visible_width(self.tail)
            + self.trail
    }
}

impl fmt::Display for LineLayout<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:1$}", "", self.lead)?;
        f.write_str(self.head)?;
        if let Some(separator) = self.separator {
            write!(f, "{separator}")?;
        }
        write!(f, "{:0>1$}", "", self.zeros)?;
        f.write_str(self.tail)?;
        write!(f, "{:1$}", "", self.trail)
    }
}

/// Text line shown on line `line` of a box `box_height` tall, or `None`
/// when that box line is blank.
#[must_use]
pub fn text_line_index(
    align: VAlign,
    line: usize,
    box_height: usize,
    text_height: usize,
) -> Option<usize> {
    let free = box_height.saturating_sub(text_height);
    let offset = match align {
        VAlign::Top => 0,
        VAlign::Center => free / 2,
        VAlign::Bottom => free,
    };
    line.checked_sub(offset).filter(|&index| index < text_height)
}

/// Lay out box line `line` of a cell with `text` in a `width` x `height` box.
///
/// `decimal` carries the column's decimal padding for the cell; it is only
/// consulted for [`HAlign::Decimal`] and only affects the first text line.
/// Later lines of a decimal cell are right aligned.
#[must_use]
pub fn layout_line<'t>(
    text: Option<&'t str>,
    h_align: HAlign,
    v_align: VAlign,
    decimal: Option<DecimalFit>,
    width: usize,
    height: usize,
    line: usize,
) -> LineLayout<'t> {
    let Some(text) = text else {
        return LineLayout::blank(width);
    };
    let Some(index) = text_line_index(v_align, line, height, cells::line_count(text)) else {
        return LineLayout::blank(width);
    };
    let Some(content) = cells::nth_line(text, index) else {
        return LineLayout::blank(width);
    };

    let content_width = cells::visible_width(content);
    let free = width.saturating_sub(content_width);
    match h_align {
        HAlign::Left => LineLayout::padded(0, content, free),
        HAlign::Right => LineLayout::padded(free, content, 0),
        HAlign::Center => {
            let lead = free / 2;
            LineLayout::padded(lead, content, free - lead)
        }
        HAlign::Decimal => match decimal {
            Some(DecimalFit::Aligned {
                split,
                zeros,
                separator,
            }) if index == 0 => {
                let (head, tail) = content.split_at_checked(split).unwrap_or((content, ""));
                let inserted = zeros + usize::from(separator.is_some());
                LineLayout {
                    lead: free.saturating_sub(inserted),
                    head,
                    separator,
                    zeros,
                    tail,
                    trail: 0,
                }
            }
            _ => LineLayout::padded(free, content, 0),
        },
    }
}
