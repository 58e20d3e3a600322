mod rewrite;

use rewrite::Rewriter;

use crate::{
    error::{Error, INVALID_MATCHER},
    expand::{CaseExpander, Expander},
    render::Template,
    syntax::Syntax,
    token::{allocate, IdGenerator, Queries, UuidGenerator},
};
use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, trace};

/// Options handed to the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Keep the final newline of the template in the output.
    pub keep_trailing_newline: bool,
    /// Fail when a template refers to a value that is undefined, such as a
    /// declared field missing from the render data or set to `null`.
    pub strict_undefined: bool,
    /// Escape HTML special characters in rendered values.
    pub auto_escape: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            keep_trailing_newline: true,
            strict_undefined: false,
            auto_escape: false,
        }
    }
}

/// Compiles templates into [`Template`] instances, and holds the
/// configuration used to do so.
///
/// The defaults are the ones used by [`parse_template`][`crate::parse_template`].
///
/// # Examples
///
/// ```
/// use formplate::Compiler;
/// use serde_json::json;
///
/// let compiler = Compiler::default();
/// let template = compiler.compile("const eventDate = EVENT_DATE;", "eventDate").unwrap();
///
/// assert_eq!(
///     template.render(&json!({ "eventDate": "start time" })).unwrap(),
///     "const startTime = START_TIME;"
/// );
/// ```
#[derive(Clone)]
pub struct Compiler {
    /// Markers surrounding token references and control tags.
    syntax: Syntax,
    /// Knows the formats of each field.
    expander: Arc<dyn Expander>,
    /// Source of token identifiers.
    ids: Arc<dyn IdGenerator>,
    /// Rendering engine options.
    options: Options,
}

impl Compiler {
    /// Set the [`Syntax`].
    ///
    /// Returns the [`Compiler`], so additional methods may be chained.
    #[inline]
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    /// Set the [`Expander`].
    ///
    /// Returns the [`Compiler`], so additional methods may be chained.
    #[inline]
    pub fn with_expander<T>(mut self, expander: T) -> Self
    where
        T: Expander + 'static,
    {
        self.expander = Arc::new(expander);
        self
    }

    /// Set the [`IdGenerator`].
    ///
    /// Returns the [`Compiler`], so additional methods may be chained.
    #[inline]
    pub fn with_id_generator<T>(mut self, ids: T) -> Self
    where
        T: IdGenerator + 'static,
    {
        self.ids = Arc::new(ids);
        self
    }

    /// Set the [`Options`].
    ///
    /// Returns the [`Compiler`], so additional methods may be chained.
    #[inline]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Return the [`Syntax`].
    #[inline]
    pub fn syntax(&self) -> &Syntax {
        &self.syntax
    }

    /// Compile a new [`Template`].
    ///
    /// Each query is assigned a token, then every format of every query is
    /// rewritten in order: queries in the order given, formats in the order
    /// the [`Expander`] returns them. Where the formats of two queries overlap
    /// in the text, the query processed first keeps the overlapping span.
    ///
    /// A query without any occurrence in `source` compiles to an unused token.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when no queries are given, a query cannot be
    /// expanded, a format matcher is not a valid regular expression, or the
    /// rendering engine refuses the [`Syntax`].
    pub fn compile<Q>(&self, source: &str, queries: Q) -> Result<Template, Error>
    where
        Q: Into<Queries>,
    {
        let queries = queries.into();
        let (tokens, index) = allocate(&queries, self.expander.as_ref(), self.ids.as_ref())?;

        let mut rewriter = Rewriter::new(source);
        let mut total = 0;
        for (t, token) in tokens.iter().enumerate() {
            for (f, rule) in token.query.formats().iter().enumerate() {
                let matcher = Regex::new(rule.matcher()).map_err(|e| {
                    Error::invalid(INVALID_MATCHER).with_help(format!(
                        "format `{}` of query `{}`: {e}",
                        rule.name(),
                        token.name
                    ))
                })?;

                let count = rewriter.apply(&matcher, t, f);
                trace!(query = %token.name, format = rule.name(), count, "rewrote format");
                total += count;
            }
        }
        debug!(
            queries = tokens.len(),
            markers = total,
            segments = rewriter.segments().len(),
            "compiled template"
        );
        let text = rewriter.finish(&tokens, &self.syntax);

        let env = self.environment()?;

        Ok(Template::new(text, tokens, index, self.expander.clone(), env))
    }

    /// Build the rendering engine environment.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the engine refuses the [`Syntax`].
    fn environment(&self) -> Result<Environment<'static>, Error> {
        let Options {
            keep_trailing_newline,
            strict_undefined,
            auto_escape,
        } = self.options;

        let mut env = Environment::new();
        env.set_syntax(self.syntax.to_config()?);
        env.set_keep_trailing_newline(keep_trailing_newline);
        env.set_undefined_behavior(if strict_undefined {
            UndefinedBehavior::Strict
        } else {
            UndefinedBehavior::Lenient
        });
        env.set_auto_escape_callback(move |_| {
            if auto_escape {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });

        Ok(env)
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self {
            syntax: Syntax::default(),
            expander: Arc::new(CaseExpander),
            ids: Arc::new(UuidGenerator),
            options: Options::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::NO_QUERIES,
        expand::{FnExpander, FormatRule, QuerySpec},
        syntax::{VARIABLE_END, VARIABLE_START},
    };
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Return a Compiler that knows date formats, with predictable ids.
    fn get_date_compiler() -> Compiler {
        let expander = FnExpander::new(
            |identifier: &str| {
                Ok(QuerySpec::new(
                    identifier,
                    vec![
                        FormatRule::literal("full", "{{full-date-marker}}")?,
                        FormatRule::literal("year", "{{year-marker}}")?,
                        FormatRule::new("weekday", r"\{\{weekday(-marker)?\}\}")?,
                    ],
                ))
            },
            |_: &QuerySpec, rule: &FormatRule, value: &Value| match (rule.name(), value.as_str()) {
                ("full", Some("2024-01-01")) => json!("January 1, 2024"),
                ("year", Some(date)) => json!(&date[..4]),
                ("weekday", Some("2024-01-01")) => json!("Monday"),
                _ => value.clone(),
            },
        );

        Compiler::default()
            .with_expander(expander)
            .with_id_generator(|| "q0".to_string())
    }

    #[test]
    fn test_compile_scenario() {
        let template = get_date_compiler()
            .compile("Hello {{full-date-marker}}", "eventDate")
            .unwrap();

        assert_eq!(
            template.source(),
            format!("Hello {VARIABLE_START}q0.full{VARIABLE_END}")
        );
        assert_eq!(
            template.render(&json!({ "eventDate": "2024-01-01" })).unwrap(),
            "Hello January 1, 2024"
        );
    }

    #[test]
    fn test_compile_multiple_formats_share_token() {
        let template = get_date_compiler()
            .compile("{{full-date-marker}} ({{year-marker}}, {{weekday}})", "eventDate")
            .unwrap();

        assert_eq!(
            template.source(),
            format!(
                "{VARIABLE_START}q0.full{VARIABLE_END} \
                ({VARIABLE_START}q0.year{VARIABLE_END}, \
                {VARIABLE_START}q0.weekday{VARIABLE_END})"
            )
        );
        assert_eq!(
            template.render(&json!({ "eventDate": "2024-01-01" })).unwrap(),
            "January 1, 2024 (2024, Monday)"
        );
    }

    #[test]
    fn test_compile_unmatched_query() {
        let template = Compiler::default().compile("nothing here", "eventDate").unwrap();

        assert_eq!(template.source(), "nothing here");
        assert_eq!(template.tokens().len(), 1);
    }

    #[test]
    fn test_compile_no_queries() {
        let result = Compiler::default().compile("text", Vec::<String>::new());

        assert!(result.is_err_and(|e| e.reason() == Some(NO_QUERIES)));
    }

    #[test]
    fn test_compile_invalid_matcher() {
        let expander = FnExpander::new(
            |identifier: &str| Ok(QuerySpec::new(identifier, vec![FormatRule::new("bad", "(")?])),
            |_: &QuerySpec, _: &FormatRule, value: &Value| value.clone(),
        );
        let result = Compiler::default().with_expander(expander).compile("(", "x");

        assert!(result.is_err_and(|e| e.reason() == Some(INVALID_MATCHER)));
    }

    #[test]
    fn test_compile_non_ascii_format_name() {
        let expander = FnExpander::new(
            |identifier: &str| Ok(QuerySpec::new(identifier, vec![FormatRule::literal("año", "YEAR")?])),
            |_: &QuerySpec, _: &FormatRule, value: &Value| value.clone(),
        );
        let template = Compiler::default()
            .with_expander(expander)
            .with_id_generator(|| "qé".to_string())
            .compile("x YEAR", "d")
            .unwrap();

        assert_eq!(template.source(), format!("x {VARIABLE_START}qé.año{VARIABLE_END}"));
        assert_eq!(template.render(&json!({ "d": "2024" })).unwrap(), "x 2024");
    }

    #[test]
    fn test_compile_custom_syntax() {
        let syntax = Syntax::builder()
            .variable("[[", "]]")
            .block("[%", "%]")
            .comment("[#", "#]")
            .build()
            .unwrap();
        let template = Compiler::default()
            .with_syntax(syntax)
            .with_id_generator(|| "q0".to_string())
            .compile("let userName = 1;", "userName")
            .unwrap();

        assert_eq!(template.source(), "let [[q0.camel]] = 1;");
        assert_eq!(
            template.render(&json!({ "userName": "total count" })).unwrap(),
            "let totalCount = 1;"
        );
    }

    #[test]
    fn test_compile_queries_do_not_rewrite_markers() {
        // "q" would match inside the identifier of the first marker if
        // rewriting were applied to the whole text each time.
        let counter = AtomicUsize::new(0);
        let template = Compiler::default()
            .with_id_generator(move || format!("q{}", counter.fetch_add(1, Ordering::Relaxed)))
            .compile("name q", ["name", "q"])
            .unwrap();

        assert_eq!(
            template.source(),
            format!("{VARIABLE_START}q0.camel{VARIABLE_END} {VARIABLE_START}q1.camel{VARIABLE_END}")
        );
        assert_eq!(
            template.render(&json!({ "name": "first", "q": "second" })).unwrap(),
            "first second"
        );
    }

    #[test]
    fn test_options_default() {
        let options = Options::default();

        assert!(options.keep_trailing_newline);
        assert!(!options.strict_undefined);
        assert!(!options.auto_escape);
    }
}
