//! Formplate - Multi-format template compiler
//!
//! A field in a Formplate template has no placeholder syntax of its own.
//! Instead, it is written in the template the way it will look once
//! rendered, in any of the surface formats an [`Expander`] knows for it.
//! With the default [`CaseExpander`], a field named `userName` may appear as
//! `userName`, `UserName`, `user_name`, `user-name`, `USER_NAME` or
//! `User Name`:
//!
//! ```
//! use serde_json::json;
//!
//! let template = formplate::parse_template(
//!     "struct UserName { user_name: String }",
//!     "userName",
//! )
//! .unwrap();
//!
//! let output = template.render(&json!({ "userName": "account" })).unwrap();
//! assert_eq!(output, "struct Account { account: String }");
//! ```
//!
//! Compilation assigns every field a random token, and rewrites each
//! occurrence into a reference to that token surrounded by long delimiters
//! (see [`Syntax`]) that do not collide with ordinary text. Rendering maps the
//! data onto the tokens, expands each value into all of its formats and hands
//! the result to the rendering engine. Control tags written with the block
//! delimiters are interpreted by the engine.
pub mod expand;

mod compile;
mod error;
mod region;
mod render;
mod syntax;
mod token;

pub use compile::{Compiler, Options};
pub use error::Error;
pub use expand::{Case, CaseExpander, Expander, Expansion, FormatRule, QuerySpec};
pub use region::Region;
pub use render::Template;
pub use syntax::{Syntax, SyntaxBuilder};
pub use token::{IdGenerator, Queries, Token, TokenIndex, UuidGenerator};

use error::{INVALID_DATA, NO_QUERIES};
use serde_json::Value;

/// Compile a [`Template`] from the given text and queries.
///
/// Provides a shortcut to compile a `Template` with the default [`Compiler`].
/// `queries` may be a single field name or a list of them.
///
/// # Errors
///
/// Returns an [`Error`] when no queries are given, or a query cannot be
/// expanded.
///
/// # Examples
///
/// ```
/// use formplate::parse_template;
///
/// assert!(parse_template("userName", "userName").is_ok());
/// assert!(parse_template("userName", ["userName", "userId"]).is_ok());
/// assert!(parse_template("userName", Vec::<String>::new()).is_err());
/// ```
pub fn parse_template<Q>(source: &str, queries: Q) -> Result<Template, Error>
where
    Q: Into<Queries>,
{
    Compiler::default().compile(source, queries)
}

/// Compile and render a [`Template`] in one step.
///
/// The queries are the keys of `data`.
///
/// # Errors
///
/// Returns an [`Error`] when `data` is not an object or is empty, or for any of
/// the reasons [`parse_template`] and [`Template::render`] fail.
///
/// # Examples
///
/// ```
/// use formplate::render_template;
/// use serde_json::json;
///
/// let output = render_template("Event Date: eventDate", &json!({ "eventDate": "new year" }));
///
/// assert_eq!(output.unwrap(), "New Year: newYear");
/// ```
pub fn render_template(source: &str, data: &Value) -> Result<String, Error> {
    let Value::Object(map) = data else {
        return Err(Error::invalid(INVALID_DATA)
            .with_help(format!("expected an object of field values, found `{data}`")));
    };
    if map.is_empty() {
        return Err(Error::invalid(NO_QUERIES).with_help("data has no fields to use as queries"));
    }

    let queries = map.keys().cloned().collect::<Queries>();
    parse_template(source, queries)?.render(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    #[test]
    fn test_parse_template_single_query() {
        let template = parse_template("userName", "userName").unwrap();

        assert_eq!(template.tokens().len(), 1);
        assert_eq!(template.tokens()[0].name, "userName");
    }

    #[test]
    fn test_parse_template_no_queries() {
        let result = parse_template("userName", Vec::<&str>::new());

        assert!(result.is_err_and(|e| e.is_invalid_argument()));
    }

    #[test]
    fn test_parse_template_fresh_tokens() {
        let first = parse_template("userName", ["userName", "userId"]).unwrap();
        let second = parse_template("userName", ["userName", "userId"]).unwrap();
        let ids = first
            .tokens()
            .iter()
            .chain(second.tokens())
            .map(|t| t.id.as_str())
            .collect::<HashSet<_>>();
        let data = json!({ "userName": "owner" });

        assert_eq!(ids.len(), 4);
        assert_ne!(first.source(), second.source());
        assert_eq!(first.render(&data).unwrap(), second.render(&data).unwrap());
    }

    #[test]
    fn test_render_template() {
        let data = json!({ "firstName": "ada", "lastName": "lovelace" });
        let result = render_template("FirstName LAST_NAME", &data);

        assert_eq!(result.unwrap(), "Ada LOVELACE");
    }

    #[test]
    fn test_render_template_empty_data() {
        let result = render_template("text", &json!({}));

        assert!(result.is_err_and(|e| e.reason() == Some(NO_QUERIES)));
    }

    #[test]
    fn test_render_template_not_object() {
        let result = render_template("text", &json!("userName"));

        assert!(result.is_err_and(|e| e.reason() == Some(INVALID_DATA)));
    }
}
