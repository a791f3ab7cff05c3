//! Visible width and line handling for cell text.
//!
//! Cell text may carry terminal styling escapes (`ESC … m`). Those bytes are
//! written through untouched but occupy no columns, so every measurement in
//! this module walks the *visible* characters only. Line breaks inside an
//! escape sequence are never treated as line breaks.
//!
//! Character widths come from `unicode-width`: CJK and most emoji take two
//! columns, control characters take none.

use std::num::NonZeroUsize;
use std::sync::{LazyLock, Mutex};

use lru::LruCache;
use regex::Regex;
use unicode_width::UnicodeWidthChar;

use crate::sync::lock_recover;

/// First byte of a styling escape sequence.
pub const ESCAPE_START: char = '\x1b';
/// Final byte of a styling escape sequence.
pub const ESCAPE_END: char = 'm';

/// Minimum string length to cache (shorter strings have minimal overhead).
const CACHE_MIN_LEN: usize = 8;

/// An escape runs from `ESC` through the first `m`; an unterminated escape
/// swallows the rest of the string.
static ESCAPE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b[^m]*m?").expect("invalid regex"));

static WIDTH_CACHE: LazyLock<Mutex<LruCache<String, usize>>> =
    LazyLock::new(|| Mutex::new(LruCache::new(NonZeroUsize::new(1024).expect("non-zero"))));

/// Get the column width of a single character.
#[must_use]
pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Iterate over the visible characters of `text` with their byte offsets.
///
/// Characters that belong to an escape sequence are skipped.
pub fn visible_chars(text: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut escapes = ESCAPE_PATTERN.find_iter(text).peekable();
    text.char_indices().filter(move |&(idx, _)| {
        while let Some(escape) = escapes.peek() {
            if escape.end() <= idx {
                escapes.next();
            } else {
                break;
            }
        }
        !matches!(escapes.peek(), Some(escape) if escape.start() <= idx)
    })
}

fn compute_visible_width(text: &str) -> usize {
    visible_chars(text).map(|(_, c)| char_width(c)).sum()
}

/// Visible width of a single line (escape sequences count as zero).
///
/// Results for strings of 8 or more bytes are kept in a shared LRU cache.
#[must_use]
pub fn visible_width(text: &str) -> usize {
    if text.len() < CACHE_MIN_LEN {
        return compute_visible_width(text);
    }

    if let Some(&cached) = lock_recover(&WIDTH_CACHE).get(text) {
        return cached;
    }

    let width = compute_visible_width(text);
    lock_recover(&WIDTH_CACHE).put(text.to_string(), width);
    width
}

/// Split `text` into lines at visible `\n` characters.
///
/// Always yields at least one (possibly empty) line.
pub fn lines(text: &str) -> impl Iterator<Item = &str> + '_ {
    let mut breaks = visible_chars(text)
        .filter(|&(_, c)| c == '\n')
        .map(|(idx, _)| idx);
    let mut start = Some(0);
    std::iter::from_fn(move || {
        let from = start?;
        if let Some(idx) = breaks.next() {
            start = Some(idx + 1);
            Some(&text[from..idx])
        } else {
            start = None;
            Some(&text[from..])
        }
    })
}

/// Number of lines in `text`: one plus the number of visible line breaks.
#[must_use]
pub fn line_count(text: &str) -> usize {
    1 + visible_chars(text).filter(|&(_, c)| c == '\n').count()
}

/// The `n`th line of `text` (0-based), or `None` past the last line.
#[must_use]
pub fn nth_line(text: &str, n: usize) -> Option<&str> {
    lines(text).nth(n)
}

/// Widest visible line of `text`.
#[must_use]
pub fn text_width(text: &str) -> usize {
    lines(text).map(visible_width).max().unwrap_or(0)
}

/// Remove all escape sequences from `text`.
#[must_use]
pub fn strip_escapes(text: &str) -> String {
    ESCAPE_PATTERN.replace_all(text, "").into_owned()
}
