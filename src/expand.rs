//! Contains the [`Expander`] trait and the types it produces.
//!
//! An expander knows, for a logical field name, every surface format the
//! field may take inside a template. Each [`FormatRule`] carries a regular
//! expression that finds literal occurrences of its format in template text,
//! and a name under which the formatted value is exposed at render time.
//!
//! The default expander is [`CaseExpander`], which treats a field name as an
//! identifier that may be written in different letter cases:
//!
//! ```
//! use formplate::{CaseExpander, Expander};
//!
//! let query = CaseExpander.expand_query("eventDate").unwrap();
//! let formats = query
//!     .formats()
//!     .iter()
//!     .map(|rule| rule.name())
//!     .collect::<Vec<_>>();
//!
//! assert_eq!(formats, ["camel", "pascal", "snake", "kebab", "constant", "title"]);
//! ```
//!
//! Anything else can be plugged in with [`FnExpander`], or by implementing
//! `Expander` on your own type.
mod case;

pub use case::{Case, CaseExpander};

use crate::error::{Error, INVALID_IDENTIFIER};
use serde_json::Value;
use std::collections::BTreeMap;

/// One recognized surface representation of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatRule {
    name: String,
    matcher: String,
}

impl FormatRule {
    /// Create a new [`FormatRule`].
    ///
    /// The `matcher` is a regular expression. Use [`FormatRule::literal`] when
    /// the occurrence is plain text.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when `name` cannot be used as a property name
    /// inside a template expression.
    pub fn new<N, M>(name: N, matcher: M) -> Result<Self, Error>
    where
        N: Into<String>,
        M: Into<String>,
    {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(Error::invalid(INVALID_IDENTIFIER).with_help(format!(
                "format name `{name}` must start with a letter or `_` \
                and contain only letters, digits or `_`"
            )));
        }

        Ok(Self {
            name,
            matcher: matcher.into(),
        })
    }

    /// Create a new [`FormatRule`] that matches the given text literally.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when `name` is not a valid identifier.
    pub fn literal<N>(name: N, text: &str) -> Result<Self, Error>
    where
        N: Into<String>,
    {
        Self::new(name, regex::escape(text))
    }

    /// Return the name the formatted value is exposed under.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the regular expression identifying this format in template text.
    #[inline]
    pub fn matcher(&self) -> &str {
        &self.matcher
    }
}

/// A logical field and the formats it may appear in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    source: String,
    formats: Vec<FormatRule>,
}

impl QuerySpec {
    /// Create a new [`QuerySpec`] for the field named `source`.
    ///
    /// Formats are applied to the template in the order given here.
    pub fn new<S>(source: S, formats: Vec<FormatRule>) -> Self
    where
        S: Into<String>,
    {
        Self {
            source: source.into(),
            formats,
        }
    }

    /// Return the field name, as it appears as a key in render data.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Return the recognized formats, in rewrite order.
    #[inline]
    pub fn formats(&self) -> &[FormatRule] {
        &self.formats
    }
}

/// A raw value expanded into every format of its [`QuerySpec`].
///
/// Keys are format names. A `None` value is undefined, which the rendering
/// engine prints as nothing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expansion {
    values: BTreeMap<String, Option<Value>>,
}

impl Expansion {
    /// Return the formatted value for the named format.
    ///
    /// The outer `Option` is `None` when no such format exists, the inner one
    /// when the value is undefined.
    #[inline]
    pub fn get(&self, format: &str) -> Option<Option<&Value>> {
        self.values.get(format).map(Option::as_ref)
    }

    /// Iterate over the format names and formatted values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Convert into a value the rendering engine can look properties up on.
    ///
    /// Undefined and `null` values both become the engine's undefined value,
    /// which renders as nothing.
    pub fn to_engine_value(&self) -> minijinja::Value {
        let properties = self
            .values
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    None | Some(Value::Null) => minijinja::Value::UNDEFINED,
                    Some(value) => minijinja::Value::from_serialize(value),
                };
                (name.clone(), value)
            })
            .collect::<BTreeMap<_, _>>();

        minijinja::Value::from(properties)
    }
}

/// Describes a type which knows the surface formats of a field.
pub trait Expander: Sync + Send {
    /// Return the [`QuerySpec`] for the given field identifier.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when the identifier cannot be expanded.
    fn expand_query(&self, identifier: &str) -> Result<QuerySpec, Error>;

    /// Format a raw value according to one rule of the query.
    ///
    /// Must be deterministic: equal inputs produce equal outputs.
    fn format_value(&self, query: &QuerySpec, rule: &FormatRule, value: &Value) -> Value;
}

/// Allows assignment of a pair of functions as an [`Expander`], instead of
/// requiring a struct be created.
///
/// # Examples
///
/// ```
/// use formplate::{expand::FnExpander, Error, FormatRule, QuerySpec};
/// use serde_json::{json, Value};
///
/// let expander = FnExpander::new(
///     |identifier: &str| -> Result<QuerySpec, Error> {
///         Ok(QuerySpec::new(identifier, vec![FormatRule::literal("upper", "NAME")?]))
///     },
///     |_: &QuerySpec, _: &formplate::FormatRule, value: &Value| match value {
///         Value::String(s) => json!(s.to_uppercase()),
///         other => other.clone(),
///     },
/// );
///
/// let template = formplate::Compiler::default()
///     .with_expander(expander)
///     .compile("hello, NAME!", "name")
///     .unwrap();
///
/// assert_eq!(template.render(&json!({ "name": "taylor" })).unwrap(), "hello, TAYLOR!");
/// ```
pub struct FnExpander<Q, F> {
    query: Q,
    format: F,
}

impl<Q, F> FnExpander<Q, F>
where
    Q: Fn(&str) -> Result<QuerySpec, Error> + Sync + Send,
    F: Fn(&QuerySpec, &FormatRule, &Value) -> Value + Sync + Send,
{
    /// Create a new [`FnExpander`] from a query function and a format function.
    pub fn new(query: Q, format: F) -> Self {
        Self { query, format }
    }
}

impl<Q, F> Expander for FnExpander<Q, F>
where
    Q: Fn(&str) -> Result<QuerySpec, Error> + Sync + Send,
    F: Fn(&QuerySpec, &FormatRule, &Value) -> Value + Sync + Send,
{
    fn expand_query(&self, identifier: &str) -> Result<QuerySpec, Error> {
        (self.query)(identifier)
    }

    fn format_value(&self, query: &QuerySpec, rule: &FormatRule, value: &Value) -> Value {
        (self.format)(query, rule, value)
    }
}

/// Expand one raw value into every format of the given query.
///
/// An absent value yields an [`Expansion`] whose formats are all undefined.
/// A `null` value stays `null` without being handed to the expander, and
/// renders as nothing once converted with [`Expansion::to_engine_value`].
pub fn expand_value(expander: &dyn Expander, query: &QuerySpec, value: Option<&Value>) -> Expansion {
    let values = query
        .formats()
        .iter()
        .map(|rule| {
            let formatted = match value {
                None => None,
                Some(Value::Null) => Some(Value::Null),
                Some(value) => Some(expander.format_value(query, rule, value)),
            };
            (rule.name.clone(), formatted)
        })
        .collect();

    Expansion { values }
}

/// Return true if the given text is a valid template identifier.
pub(crate) fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();

    match chars.next() {
        Some(first) if first == '_' || unicode_ident::is_xid_start(first) => {
            chars.all(unicode_ident::is_xid_continue)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_rule_name() {
        assert!(FormatRule::literal("full", "{{full}}").is_ok());
        assert!(FormatRule::literal("_year2", "YYYY").is_ok());
        assert!(FormatRule::literal("2year", "YY").is_err());
        assert!(FormatRule::literal("full-date", "x").is_err());
        assert!(FormatRule::literal("", "x").is_err());
    }

    #[test]
    fn test_literal_is_escaped() {
        let rule = FormatRule::literal("full", "{{a.b}}").unwrap();

        assert_eq!(rule.matcher(), r"\{\{a\.b\}\}");
    }

    #[test]
    fn test_expand_value() {
        let query = CaseExpander.expand_query("event_date").unwrap();
        let expansion = expand_value(&CaseExpander, &query, Some(&json!("new year")));

        assert_eq!(expansion.get("camel"), Some(Some(&json!("newYear"))));
        assert_eq!(expansion.get("constant"), Some(Some(&json!("NEW_YEAR"))));
        assert_eq!(expansion.get("missing"), None);
    }

    #[test]
    fn test_expand_value_is_deterministic() {
        let query = CaseExpander.expand_query("eventDate").unwrap();
        let value = json!("Hello World");

        assert_eq!(
            expand_value(&CaseExpander, &query, Some(&value)),
            expand_value(&CaseExpander, &query, Some(&value))
        );
    }

    #[test]
    fn test_expand_absent_value() {
        let query = CaseExpander.expand_query("eventDate").unwrap();
        let expansion = expand_value(&CaseExpander, &query, None);

        assert_eq!(expansion.iter().count(), query.formats().len());
        assert!(expansion.iter().all(|(_, value)| value.is_none()));
    }

    #[test]
    fn test_expand_null_value() {
        let query = CaseExpander.expand_query("eventDate").unwrap();
        let expansion = expand_value(&CaseExpander, &query, Some(&Value::Null));

        assert!(expansion.iter().all(|(_, value)| value == Some(&Value::Null)));
    }

    #[test]
    fn test_fn_expander() {
        let expander = FnExpander::new(
            |identifier: &str| Ok(QuerySpec::new(identifier, vec![FormatRule::literal("raw", "X")?])),
            |_: &QuerySpec, _: &FormatRule, value: &Value| json!(format!("<{value}>")),
        );
        let query = expander.expand_query("x").unwrap();
        let expansion = expand_value(&expander, &query, Some(&json!(1)));

        assert_eq!(query.source(), "x");
        assert_eq!(expansion.get("raw"), Some(Some(&json!("<1>"))));
    }
}
