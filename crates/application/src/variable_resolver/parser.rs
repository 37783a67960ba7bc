//! Template parser for `{{name}}` placeholders
//!
//! Finds placeholder references and their byte spans.

use std::ops::Range;

/// A placeholder found in a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableReference {
    /// The variable name (without braces, trimmed).
    pub name: String,

    /// Byte range of the whole `{{...}}` in the template.
    pub span: Range<usize>,
}

impl VariableReference {
    /// Creates a new variable reference.
    #[must_use]
    pub fn new(name: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// Parses a template and returns every placeholder in order.
///
/// Empty placeholders (`{{}}`, `{{  }}`) are ignored, and parsing stops at
/// an unclosed `{{`.
///
/// # Examples
///
/// ```
/// use vouch_application::variable_resolver::parser::parse_variables;
///
/// let refs = parse_variables("/books/{{book_id}}");
/// assert_eq!(refs.len(), 1);
/// assert_eq!(refs[0].name, "book_id");
/// assert_eq!(refs[0].span, 7..18);
/// ```
#[must_use]
pub fn parse_variables(input: &str) -> Vec<VariableReference> {
    let mut references = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch != '{' || !matches!(chars.peek(), Some((_, '{'))) {
            continue;
        }
        chars.next();

        let mut name = String::new();
        let mut closed = false;
        while let Some((_, ch)) = chars.next() {
            if ch == '}'
                && let Some(&(end_idx, '}')) = chars.peek()
            {
                chars.next();
                let trimmed = name.trim();
                if !trimmed.is_empty() {
                    references.push(VariableReference::new(trimmed, start..end_idx + 1));
                }
                closed = true;
                break;
            }
            name.push(ch);
        }

        if !closed {
            break;
        }
    }

    references
}

/// Returns true if the input contains any placeholder.
#[must_use]
pub fn has_variables(input: &str) -> bool {
    !parse_variables(input).is_empty()
}

/// Extracts placeholder names in order of appearance.
#[must_use]
pub fn extract_variable_names(input: &str) -> Vec<String> {
    parse_variables(input)
        .into_iter()
        .map(|r| r.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_variable() {
        let refs = parse_variables("{{name}}");
        assert_eq!(refs, vec![VariableReference::new("name", 0..8)]);
    }

    #[test]
    fn test_parse_multiple_variables() {
        let refs = parse_variables("/books/{{book_id}}/reviews/{{review_id}}");
        assert_eq!(extract_variable_names("/books/{{book_id}}/reviews/{{review_id}}"), vec![
            "book_id".to_string(),
            "review_id".to_string()
        ]);
        assert_eq!(refs[1].span, 27..40);
    }

    #[test]
    fn test_parse_with_whitespace() {
        let refs = parse_variables("{{ book_id }}");
        assert_eq!(refs[0].name, "book_id");
    }

    #[test]
    fn test_no_variables() {
        assert!(parse_variables("/books").is_empty());
        assert!(!has_variables("{\"name\":\"Clean Code\"}"));
    }

    #[test]
    fn test_single_braces_in_json_are_not_variables() {
        assert!(parse_variables(r#"{"id":{"inner":1}}"#).is_empty());
    }

    #[test]
    fn test_unclosed_variable() {
        assert!(parse_variables("{{name").is_empty());
    }

    #[test]
    fn test_empty_variable() {
        assert!(parse_variables("{{}}").is_empty());
        assert!(parse_variables("{{   }}").is_empty());
    }

    #[test]
    fn test_variable_inside_json_body() {
        let refs = parse_variables(r#"{"id":{{book_id}},"name":"x"}"#);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].name, "book_id");
    }
}
