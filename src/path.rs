//! Dotted parameter paths such as `a.b[2].c`
//!
//! A path is split on unescaped `.` separators; each segment may carry a
//! trailing `[index]` suffix denoting array indexing of the value found at
//! that segment. A backslash escapes the following character and is consumed,
//! so `a\.b` addresses the single key `a.b`.

use crate::error::TemplateError;

/// One step of a dotted parameter path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Object key to descend into
    pub key: String,
    /// Optional array index applied after the key lookup
    pub index: Option<usize>,
}

/// Parse a dotted parameter path into segments.
///
/// A negative index such as `a[-1]` is a hard error; a bracket suffix that is
/// not `[digits]` stays part of the key text.
pub fn parse(path: &str) -> Result<Vec<Segment>, TemplateError> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '.' => {
                segments.push(parse_segment(path, &current)?);
                current.clear();
            }
            _ => current.push(c),
        }
    }
    segments.push(parse_segment(path, &current)?);
    Ok(segments)
}

fn parse_segment(path: &str, text: &str) -> Result<Segment, TemplateError> {
    if let Some(open) = text.find('[') {
        if let Some(inner) = text[open + 1..].strip_suffix(']') {
            if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
                let index = inner.parse::<usize>().map_err(|_| TemplateError::InvalidPath {
                    path: path.to_string(),
                    reason: format!("index \"{}\" is too large", inner),
                })?;
                return Ok(Segment {
                    key: text[..open].to_string(),
                    index: Some(index),
                });
            }
            if inner.len() > 1
                && inner.starts_with('-')
                && inner[1..].chars().all(|c| c.is_ascii_digit())
            {
                return Err(TemplateError::InvalidPath {
                    path: path.to_string(),
                    reason: format!("negative index \"{}\"", inner),
                });
            }
        }
    }
    Ok(Segment {
        key: text.to_string(),
        index: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(key: &str, index: Option<usize>) -> Segment {
        Segment {
            key: key.to_string(),
            index,
        }
    }

    #[test]
    fn test_parse_single_key() {
        let segments = parse("name").expect("Should parse");
        assert_eq!(segments, vec![segment("name", None)]);
    }

    #[test]
    fn test_parse_nested_path() {
        let segments = parse("a.b.c").expect("Should parse");
        assert_eq!(
            segments,
            vec![segment("a", None), segment("b", None), segment("c", None)]
        );
    }

    #[test]
    fn test_parse_indexed_segment() {
        let segments = parse("a.b[2].c").expect("Should parse");
        assert_eq!(
            segments,
            vec![segment("a", None), segment("b", Some(2)), segment("c", None)]
        );
    }

    #[test]
    fn test_parse_escaped_dot_stays_in_key() {
        let segments = parse("a\\.b.c").expect("Should parse");
        assert_eq!(segments, vec![segment("a.b", None), segment("c", None)]);
    }

    #[test]
    fn test_parse_negative_index_is_error() {
        let result = parse("a[-1]");
        assert!(matches!(result, Err(TemplateError::InvalidPath { .. })));
    }

    #[test]
    fn test_parse_malformed_bracket_is_part_of_key() {
        let segments = parse("a[x]").expect("Should parse");
        assert_eq!(segments, vec![segment("a[x]", None)]);
    }

    #[test]
    fn test_parse_empty_path_is_single_empty_key() {
        let segments = parse("").expect("Should parse");
        assert_eq!(segments, vec![segment("", None)]);
    }
}
