use crate::{
    error::{Error, EMPTY_QUERY, INVALID_IDENTIFIER, NO_QUERIES},
    expand::{is_identifier, Expander, QuerySpec},
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Describes a type which produces identifiers for [`Token`] instances.
///
/// Identifiers are pasted into the rewritten template as variable names, so
/// they must be valid identifiers and must come from a space large enough
/// that two of them, or one of them and user text, never coincide.
pub trait IdGenerator: Sync + Send {
    /// Return a fresh identifier.
    fn generate(&self) -> String;
}

/// Allows assignment of any function matching the signature of `generate`
/// as an [`IdGenerator`], instead of requiring a struct be created.
impl<F> IdGenerator for F
where
    F: Fn() -> String + Sync + Send,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Generates identifiers from random (version 4) UUIDs.
///
/// The identifier is the letter `q` followed by the 32 hex digits of the
/// UUID, so it is always a valid variable name.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        format!("q{}", Uuid::new_v4().simple())
    }
}

/// Internal stand-in for one query during a single compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Identifier used as the variable name inside the rewritten template.
    pub id: String,
    /// The field name, as it appears as a key in render data.
    pub name: String,
    /// Formats of the field.
    pub query: QuerySpec,
}

/// Maps [`Token`] identifiers to field names, in allocation order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenIndex {
    data: Vec<(String, String)>,
}

impl TokenIndex {
    /// Build a [`TokenIndex`] from the given tokens.
    pub fn new(tokens: &[Token]) -> Self {
        Self {
            data: tokens
                .iter()
                .map(|token| (token.id.clone(), token.name.clone()))
                .collect(),
        }
    }

    /// Return the number of identifiers in the [`TokenIndex`].
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Return true if the [`TokenIndex`] holds no identifiers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remap data keyed by field name onto data keyed by identifier.
    ///
    /// Keys that are not declared queries are dropped. Declared queries that
    /// are missing from `data` map to `None`.
    pub fn transpose(&self, data: &Map<String, Value>) -> BTreeMap<String, Option<Value>> {
        self.data
            .iter()
            .map(|(id, name)| (id.clone(), data.get(name).cloned()))
            .collect()
    }
}

/// An ordered list of query identifiers.
///
/// Accepts a single identifier as well as any list of them.
///
/// # Examples
///
/// ```
/// use formplate::Queries;
///
/// assert_eq!(Queries::from("name").len(), 1);
/// assert_eq!(Queries::from(vec!["name", "date"]).len(), 2);
/// assert_eq!(Queries::from(["name", "date", "place"]).len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Queries(Vec<String>);

impl Queries {
    /// Return the number of queries.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if there are no queries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the query identifiers.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<&str> for Queries {
    fn from(value: &str) -> Self {
        Self(vec![value.to_owned()])
    }
}

impl From<String> for Queries {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<String>> for Queries {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl From<Vec<&str>> for Queries {
    fn from(value: Vec<&str>) -> Self {
        Self::from(value.as_slice())
    }
}

impl From<&[&str]> for Queries {
    fn from(value: &[&str]) -> Self {
        Self(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Queries {
    fn from(value: [&str; N]) -> Self {
        Self::from(value.as_slice())
    }
}

impl FromIterator<String> for Queries {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Expand each query and assign it a fresh [`Token`].
///
/// # Errors
///
/// Returns an [`Error`] when no queries are given, a query is empty, the
/// expander refuses a query, or the generator produces an identifier that
/// cannot be used as a variable name.
pub fn allocate(
    queries: &Queries,
    expander: &dyn Expander,
    ids: &dyn IdGenerator,
) -> Result<(Vec<Token>, TokenIndex), Error> {
    if queries.is_empty() {
        return Err(Error::invalid(NO_QUERIES).with_help("pass at least one field name"));
    }

    let tokens = queries
        .iter()
        .map(|identifier| {
            if identifier.is_empty() {
                return Err(Error::invalid(EMPTY_QUERY));
            }

            let query = expander.expand_query(identifier)?;
            let id = ids.generate();
            if !is_identifier(&id) {
                return Err(Error::invalid(INVALID_IDENTIFIER)
                    .with_help(format!("generated id `{id}` is not a valid variable name")));
            }

            Ok(Token {
                id,
                name: query.source().to_owned(),
                query,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    let index = TokenIndex::new(&tokens);

    Ok((tokens, index))
}
