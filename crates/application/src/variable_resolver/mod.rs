//! Variable resolution module
//!
//! Values captured from one step's response are substituted into later
//! steps through `{{name}}` placeholders in paths and bodies.
//!
//! # Usage
//!
//! ```
//! use vouch_application::variable_resolver::VariableResolver;
//!
//! let mut resolver = VariableResolver::new();
//! resolver.set("book_id", "3");
//!
//! let result = resolver.resolve("/books/{{book_id}}");
//! assert_eq!(result.resolved, "/books/3");
//! ```

pub mod engine;
pub mod parser;

pub use engine::{ResolutionResult, VariableResolver};
pub use parser::{VariableReference, extract_variable_names, has_variables, parse_variables};
