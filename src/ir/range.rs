//! Source ranges for flow-tree nodes.
//!
//! Every node in the flow tree remembers two spans of the document it was built from:
//! the whole element (start tag through end tag) and the opening tag alone. A
//! breakpoint is only "on" a mediator when it lands on the opening tag; anywhere
//! else in the body it either belongs to a nested branch or is rejected.
//!
//! Lines are 0-based, matching the generic document's numbering.

use lsp_types::{Position, Range};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a builder hands over positions that cannot describe one element.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("opening tag {open:?} is not inside element range {whole:?}")]
    OpenTagOutsideElement { whole: Range, open: Range },

    #[error("range ends before it starts: {0:?}")]
    Inverted(Range),
}

/// Whole-element and opening-tag ranges of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRange {
    whole: Range,
    open: Range,
    self_closing: bool,
}

impl SourceRange {
    /// Creates the range of an element with a body.
    ///
    /// Requires `whole.start <= open.start <= open.end <= whole.end`.
    pub fn new(whole: Range, open: Range) -> Result<Self, RangeError> {
        check_ordered(whole)?;
        check_ordered(open)?;
        if open.start < whole.start || open.end > whole.end {
            return Err(RangeError::OpenTagOutsideElement { whole, open });
        }
        Ok(SourceRange { whole, open, self_closing: false })
    }

    /// Creates the range of a self-closed element (`<log/>`): the whole range is the open tag.
    pub fn self_closing(open: Range) -> Result<Self, RangeError> {
        check_ordered(open)?;
        Ok(SourceRange { whole: open, open, self_closing: true })
    }

    /// Shorthand for line-only ranges, used by builders that have no column data.
    pub fn from_lines(start: u32, open_end: u32, end: u32) -> Result<Self, RangeError> {
        SourceRange::new(line_range(start, end), line_range(start, open_end))
    }

    pub fn whole(&self) -> Range {
        self.whole
    }

    pub fn open(&self) -> Range {
        self.open
    }

    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }

    pub fn start_line(&self) -> u32 {
        self.whole.start.line
    }

    /// Last line of the node. A self-closed node ends where its open tag ends.
    pub fn end_line(&self) -> u32 {
        if self.self_closing {
            self.open.end.line
        } else {
            self.whole.end.line
        }
    }

    /// First line of the opening tag; the line a breakpoint has to be set on.
    pub fn open_line(&self) -> u32 {
        self.open.start.line
    }

    /// True iff `line` lies within `[start_line, end_line]`.
    pub fn contains_line(&self, line: u32) -> bool {
        self.start_line() <= line && line <= self.end_line()
    }

    /// True iff `line` lies on the opening tag.
    pub fn is_on_opening_tag(&self, line: u32) -> bool {
        self.open.start.line <= line && line <= self.open.end.line
    }
}

fn check_ordered(range: Range) -> Result<(), RangeError> {
    if range.end < range.start {
        return Err(RangeError::Inverted(range));
    }
    Ok(())
}

/// Range covering full lines `start..=end` (character 0 to 0 on the end line is enough
/// for line-based containment).
pub fn line_range(start: u32, end: u32) -> Range {
    Range {
        start: Position { line: start, character: 0 },
        end: Position { line: end, character: 0 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(line: u32, character: u32) -> Position {
        Position { line, character }
    }

    #[test]
    fn test_contains_line_uses_whole_range() {
        let range = SourceRange::from_lines(5, 5, 20).unwrap();
        assert!(!range.contains_line(4));
        assert!(range.contains_line(5));
        assert!(range.contains_line(13));
        assert!(range.contains_line(20));
        assert!(!range.contains_line(21));
    }

    #[test]
    fn test_opening_tag_spans_multiple_lines() {
        let whole = Range { start: pos(3, 4), end: pos(9, 13) };
        let open = Range { start: pos(3, 4), end: pos(5, 30) };
        let range = SourceRange::new(whole, open).unwrap();
        assert!(range.is_on_opening_tag(3));
        assert!(range.is_on_opening_tag(5));
        assert!(!range.is_on_opening_tag(6));
        assert!(range.contains_line(9));
    }

    #[test]
    fn test_self_closing_collapses_to_open_tag() {
        let open = Range { start: pos(12, 8), end: pos(12, 40) };
        let range = SourceRange::self_closing(open).unwrap();
        assert!(range.is_self_closing());
        assert_eq!(range.end_line(), 12);
        assert!(range.contains_line(12));
        assert!(!range.contains_line(13));
        assert_eq!(range.whole(), range.open());
    }

    #[test]
    fn test_rejects_open_tag_outside_element() {
        let whole = Range { start: pos(5, 0), end: pos(9, 0) };
        let open = Range { start: pos(4, 0), end: pos(5, 10) };
        assert!(matches!(
            SourceRange::new(whole, open),
            Err(RangeError::OpenTagOutsideElement { .. })
        ));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let inverted = Range { start: pos(8, 0), end: pos(2, 0) };
        assert_eq!(SourceRange::self_closing(inverted), Err(RangeError::Inverted(inverted)));
    }
}
