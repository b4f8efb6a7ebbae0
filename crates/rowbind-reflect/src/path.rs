//! Property-path tokenization.
//!
//! A path expression like `orders[0].items[1].name` is consumed one segment
//! at a time: the head is everything up to the first `.`, a trailing `[...]`
//! on the head is extracted as the index expression, and the remainder is
//! re-parsed on demand. Parsing borrows from the original expression and is
//! pure: re-parsing the same expression always yields the same segments.

use crate::error::ReflectError;

/// One parsed segment of a property path, plus the unparsed remainder.
///
/// Forward-only and single-pass: [`PropertyPath::next_segment`] consumes the
/// remainder; walking again requires re-parsing the original expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyPath<'a> {
    name: &'a str,
    index: Option<&'a str>,
    indexed_name: &'a str,
    children: Option<&'a str>,
}

impl<'a> PropertyPath<'a> {
    /// Split at the first `.`, then extract a trailing `[...]` from the head.
    pub fn parse(expression: &'a str) -> Self {
        let (head, children) = match expression.find('.') {
            Some(delim) => (&expression[..delim], Some(&expression[delim + 1..])),
            None => (expression, None),
        };
        let indexed_name = head;
        let (name, index) = match head.find('[') {
            Some(delim) => {
                let end = if head.ends_with(']') {
                    head.len() - 1
                } else {
                    head.len()
                };
                (&head[..delim], Some(&head[delim + 1..end]))
            }
            None => (head, None),
        };
        PropertyPath {
            name,
            index,
            indexed_name,
            children,
        }
    }

    /// The segment name with any index expression stripped.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The raw index expression, if the segment is an indexed access.
    pub fn index(&self) -> Option<&'a str> {
        self.index
    }

    /// The segment name including its index expression.
    pub fn indexed_name(&self) -> &'a str {
        self.indexed_name
    }

    /// The unparsed remainder, `None` iff this is the last segment.
    pub fn children(&self) -> Option<&'a str> {
        self.children
    }

    /// Whether a remainder exists.
    pub fn has_next(&self) -> bool {
        self.children.is_some()
    }

    /// Parse the remainder into the next segment, consuming it.
    pub fn next_segment(&self) -> Option<PropertyPath<'a>> {
        self.children.map(PropertyPath::parse)
    }

    /// Removal has no meaning in the context of properties.
    pub fn remove(&self) -> ReflectError {
        ReflectError::UnsupportedOperation(
            "remove is not supported, as it has no meaning in the context of properties"
                .to_string(),
        )
    }

    /// Iterate this segment and every following one.
    pub fn segments(self) -> Segments<'a> {
        Segments {
            next: Some(self),
        }
    }
}

/// Single-pass iterator over the segments of a path.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    next: Option<PropertyPath<'a>>,
}

impl<'a> Iterator for Segments<'a> {
    type Item = PropertyPath<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = current.next_segment();
        Some(current)
    }
}

/// Parse a sequence index expression into a position.
pub fn parse_index(index: &str, container: &str) -> Result<usize, ReflectError> {
    index.parse::<usize>().map_err(|_| ReflectError::InvalidIndex {
        index: index.to_string(),
        container: container.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_at_first_dot_only() {
        let path = PropertyPath::parse("a.b.c");
        assert_eq!(path.name(), "a");
        assert_eq!(path.index(), None);
        assert_eq!(path.children(), Some("b.c"));
        let next = path.next_segment().unwrap();
        assert_eq!(next.name(), "b");
        assert_eq!(next.children(), Some("c"));
    }

    #[test]
    fn extracts_trailing_index_from_head() {
        let path = PropertyPath::parse("orders[0].name");
        assert_eq!(path.name(), "orders");
        assert_eq!(path.index(), Some("0"));
        assert_eq!(path.indexed_name(), "orders[0]");
        assert_eq!(path.children(), Some("name"));
    }

    #[test]
    fn map_key_indexes_are_kept_verbatim() {
        let path = PropertyPath::parse("scores[first_quarter]");
        assert_eq!(path.name(), "scores");
        assert_eq!(path.index(), Some("first_quarter"));
        assert!(!path.has_next());
    }

    #[test]
    fn reparsing_is_deterministic() {
        let expr = "a.b[0].c";
        let collect = || -> Vec<(String, Option<String>)> {
            PropertyPath::parse(expr)
                .segments()
                .map(|seg| (seg.name().to_string(), seg.index().map(str::to_string)))
                .collect()
        };
        let first = collect();
        let second = collect();
        assert_eq!(first, second);
        assert_eq!(
            first,
            vec![
                ("a".to_string(), None),
                ("b".to_string(), Some("0".to_string())),
                ("c".to_string(), None),
            ]
        );
    }

    #[test]
    fn remove_is_unsupported() {
        let path = PropertyPath::parse("a.b");
        assert!(matches!(
            path.remove(),
            ReflectError::UnsupportedOperation(_)
        ));
    }

    #[test]
    fn parse_index_rejects_non_numeric_sequence_positions() {
        assert_eq!(parse_index("3", "sequence").unwrap(), 3);
        assert!(parse_index("three", "sequence").is_err());
    }
}
