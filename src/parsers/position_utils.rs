//! Conversion from document element positions to flow-tree source ranges.
//!
//! Every builder goes through [`source_range_of`] so that all nodes agree on what
//! "whole element" and "opening tag" mean:
//!
//! ```text
//! <filter xpath="...">      <- open: start .. open_end
//!     <then>...</then>
//! </filter>                 <- whole: start .. end
//! ```
//!
//! For a self-closed element the whole range is the opening tag.

use lsp_types::Range;

use crate::ir::range::{RangeError, SourceRange};

use super::dom::DomNode;

/// Builds the [`SourceRange`] of a document element.
pub fn source_range_of<N: DomNode>(node: &N) -> Result<SourceRange, RangeError> {
    let open = Range { start: node.start(), end: node.open_end() };
    if node.is_self_closing() {
        SourceRange::self_closing(open)
    } else {
        SourceRange::new(Range { start: node.start(), end: node.end() }, open)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::dom::Element;

    #[test]
    fn test_body_element_keeps_both_ranges() {
        let filter = Element::new("filter", 5, 6, 20);
        let range = source_range_of(&filter).unwrap();
        assert_eq!(range.start_line(), 5);
        assert_eq!(range.end_line(), 20);
        assert!(range.is_on_opening_tag(6));
        assert!(!range.is_on_opening_tag(7));
    }

    #[test]
    fn test_self_closed_element_collapses() {
        let log = Element::empty("log", 12);
        let range = source_range_of(&log).unwrap();
        assert!(range.is_self_closing());
        assert_eq!(range.end_line(), 12);
    }

    #[test]
    fn test_open_tag_past_element_end_is_rejected() {
        let broken = Element::new("filter", 5, 9, 7);
        assert!(source_range_of(&broken).is_err());
    }
}
