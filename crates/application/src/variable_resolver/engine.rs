//! Template resolution engine
//!
//! Substitutes `{{name}}` placeholders with values captured by earlier steps.

use std::collections::BTreeMap;

use super::parser::parse_variables;

/// Result of resolving one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
    /// The template with every known placeholder substituted.
    pub resolved: String,

    /// Names that had no value; their placeholders are left in place.
    pub unresolved: Vec<String>,
}

impl ResolutionResult {
    /// Creates a result for input with no placeholders.
    #[must_use]
    pub fn no_variables(input: &str) -> Self {
        Self {
            resolved: input.to_string(),
            unresolved: Vec::new(),
        }
    }

    /// Whether every placeholder was substituted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Resolves placeholders against a scenario's captured variables.
#[derive(Debug, Clone, Default)]
pub struct VariableResolver {
    variables: BTreeMap<String, String>,
}

impl VariableResolver {
    /// Creates a resolver with no variables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a variable, replacing any earlier value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    /// Adds every entry of `values`.
    pub fn extend<I, K, V>(&mut self, values: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in values {
            self.set(name, value);
        }
    }

    /// Looks up a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// All variables currently known.
    #[must_use]
    pub const fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    /// Resolves every placeholder in `input`, inserting values verbatim.
    #[must_use]
    pub fn resolve(&self, input: &str) -> ResolutionResult {
        self.substitute(input, false)
    }

    /// Resolves every placeholder in a JSON document.
    ///
    /// Values landing inside a string literal are JSON-escaped, so a
    /// captured `Clean "Code"` keeps `{"name":"{{name}}"}` valid. Values
    /// outside string literals are inserted verbatim.
    #[must_use]
    pub fn resolve_json(&self, input: &str) -> ResolutionResult {
        self.substitute(input, true)
    }

    fn substitute(&self, input: &str, json: bool) -> ResolutionResult {
        let references = parse_variables(input);
        if references.is_empty() {
            return ResolutionResult::no_variables(input);
        }

        let mut unresolved = Vec::new();
        let mut result = String::with_capacity(input.len());
        let mut literal = JsonLiteralState::default();
        let mut last_end = 0;

        for var_ref in &references {
            let text = &input[last_end..var_ref.span.start];
            result.push_str(text);
            literal.advance(text);

            match self.variables.get(&var_ref.name) {
                Some(value) if json && literal.in_string => {
                    result.push_str(&escape_json(value));
                }
                Some(value) => result.push_str(value),
                None => {
                    result.push_str(&input[var_ref.span.clone()]);
                    if !unresolved.contains(&var_ref.name) {
                        unresolved.push(var_ref.name.clone());
                    }
                }
            }

            last_end = var_ref.span.end;
        }

        result.push_str(&input[last_end..]);

        ResolutionResult {
            resolved: result,
            unresolved,
        }
    }
}

/// Tracks whether the template text seen so far ends inside a JSON string.
#[derive(Debug, Default)]
struct JsonLiteralState {
    in_string: bool,
    escaped: bool,
}

impl JsonLiteralState {
    fn advance(&mut self, text: &str) {
        for ch in text.chars() {
            if self.escaped {
                self.escaped = false;
            } else if self.in_string && ch == '\\' {
                self.escaped = true;
            } else if ch == '"' {
                self.in_string = !self.in_string;
            }
        }
    }
}

/// Escapes `value` for use between the quotes of a JSON string.
fn escape_json(value: &str) -> String {
    serde_json::to_string(value)
        .ok()
        .and_then(|quoted| {
            quoted
                .strip_prefix('"')
                .and_then(|inner| inner.strip_suffix('"'))
                .map(str::to_string)
        })
        .unwrap_or_else(|| value.to_string())
}
