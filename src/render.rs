use crate::{
    error::{Error, INVALID_DATA},
    expand::{expand_value, Expander, Expansion},
    token::{Token, TokenIndex},
};
use minijinja::Environment;
use serde::Serialize;
use serde_json::{Map, Value};
use std::{borrow::Cow, collections::BTreeMap, sync::Arc};
use tracing::debug;

/// A compiled template that can be rendered with field data.
///
/// Rendering does not mutate the [`Template`], so one instance may be
/// rendered any number of times, from any number of threads.
#[derive(Clone)]
pub struct Template {
    /// The rewritten template text.
    source: String,
    /// One token per query, in allocation order.
    tokens: Vec<Token>,
    /// Maps token identifiers to field names.
    index: TokenIndex,
    /// Formats raw values.
    expander: Arc<dyn Expander>,
    /// Rendering engine configured with the compile time syntax.
    env: Arc<Environment<'static>>,
}

impl Template {
    pub(crate) fn new(
        source: String,
        tokens: Vec<Token>,
        index: TokenIndex,
        expander: Arc<dyn Expander>,
        env: Environment<'static>,
    ) -> Self {
        Self {
            source,
            tokens,
            index,
            expander,
            env: Arc::new(env),
        }
    }

    /// Return the rewritten template text.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Return the tokens, one per query.
    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Return the [`TokenIndex`].
    #[inline]
    pub fn index(&self) -> &TokenIndex {
        &self.index
    }

    /// Render the [`Template`] with data keyed by field name.
    ///
    /// Keys that are not queries of this `Template` are ignored. Queries missing
    /// from `data` render as nothing, unless the template was compiled with
    /// [`Options::strict_undefined`][`crate::Options::strict_undefined`].
    /// `null` is accepted and treated as an empty object.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when `data` is neither an object nor `null`, or the
    /// rendering engine fails, which most likely means the text around the
    /// fields contains invalid control tags.
    ///
    /// # Examples
    ///
    /// ```
    /// use formplate::parse_template;
    /// use serde_json::json;
    ///
    /// let template = parse_template("fn get_user_name()", "userName").unwrap();
    /// let result = template.render(&json!({ "userName": "account id" }));
    ///
    /// assert_eq!(result.unwrap(), "fn get_account_id()");
    /// ```
    pub fn render(&self, data: &Value) -> Result<String, Error> {
        let data = match data {
            Value::Object(map) => Cow::Borrowed(map),
            Value::Null => Cow::Owned(Map::new()),
            other => {
                return Err(Error::invalid(INVALID_DATA)
                    .with_help(format!("expected an object of field values, found `{other}`")))
            }
        };

        let transposed = self.index.transpose(&data);
        let expanded = self.expand(&transposed);
        debug!(fields = data.len(), tokens = self.tokens.len(), "rendering template");

        let context = expanded
            .iter()
            .map(|(id, expansion)| (id.clone(), expansion.to_engine_value()))
            .collect::<BTreeMap<_, _>>();

        Ok(self
            .env
            .render_str(&self.source, minijinja::Value::from(context))?)
    }

    /// Render the [`Template`] with any serializable data.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if `data` cannot be serialized, or for any of the
    /// reasons [`Template::render`] fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use formplate::parse_template;
    /// use std::collections::HashMap;
    ///
    /// let template = parse_template("NAME", "name").unwrap();
    /// let data = HashMap::from([("name", "ada lovelace")]);
    ///
    /// assert_eq!(template.render_from(&data).unwrap(), "ADA_LOVELACE");
    /// ```
    pub fn render_from<T>(&self, data: &T) -> Result<String, Error>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(data)
            .map_err(|e| Error::invalid(INVALID_DATA).with_help(e.to_string()))?;

        self.render(&value)
    }

    /// Expand transposed values into every format of their query.
    ///
    /// Keys of the result are token identifiers.
    pub fn expand(&self, transposed: &BTreeMap<String, Option<Value>>) -> BTreeMap<String, Expansion> {
        self.tokens
            .iter()
            .map(|token| {
                let value = transposed.get(&token.id).and_then(Option::as_ref);
                let expansion = expand_value(self.expander.as_ref(), &token.query, value);
                (token.id.clone(), expansion)
            })
            .collect()
    }

    /// Turn the [`Template`] into a plain render function.
    ///
    /// # Examples
    ///
    /// ```
    /// use formplate::parse_template;
    /// use serde_json::json;
    ///
    /// let render = parse_template("NAME", "name").unwrap().into_fn();
    ///
    /// assert_eq!(render(&json!({ "name": "taylor" })).unwrap(), "TAYLOR");
    /// ```
    pub fn into_fn(self) -> impl Fn(&Value) -> Result<String, Error> + Send + Sync {
        move |data| self.render(data)
    }
}
