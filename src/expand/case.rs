use super::{Expander, FormatRule, QuerySpec};
use crate::error::{Error, INVALID_IDENTIFIER};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Letter cases recognized by [`CaseExpander`], in rewrite order.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Case {
    /// eventDate
    Camel,
    /// EventDate
    Pascal,
    /// event_date
    Snake,
    /// event-date
    Kebab,
    /// EVENT_DATE
    Constant,
    /// Event Date
    Title,
}

impl Case {
    /// Every case, in the order [`CaseExpander`] offers them.
    pub const ALL: [Case; 6] = [
        Case::Camel,
        Case::Pascal,
        Case::Snake,
        Case::Kebab,
        Case::Constant,
        Case::Title,
    ];

    /// Return the format name used for this case.
    pub fn name(&self) -> &'static str {
        match self {
            Case::Camel => "camel",
            Case::Pascal => "pascal",
            Case::Snake => "snake",
            Case::Kebab => "kebab",
            Case::Constant => "constant",
            Case::Title => "title",
        }
    }

    /// Return the case with the given format name.
    pub fn from_name(name: &str) -> Option<Self> {
        Case::ALL.into_iter().find(|case| case.name() == name)
    }

    /// Rewrite the given text in this case.
    ///
    /// # Examples
    ///
    /// ```
    /// use formplate::Case;
    ///
    /// assert_eq!(Case::Snake.apply("eventDate"), "event_date");
    /// assert_eq!(Case::Camel.apply("HTTP server"), "httpServer");
    /// assert_eq!(Case::Title.apply("release-2024"), "Release 2024");
    /// ```
    pub fn apply(&self, text: &str) -> String {
        let words = split_words(text);

        match self {
            Case::Camel => words
                .iter()
                .enumerate()
                .map(|(i, w)| if i == 0 { w.to_lowercase() } else { capitalize(w) })
                .collect(),
            Case::Pascal => words.iter().map(|w| capitalize(w)).collect(),
            Case::Snake => join_lower(&words, "_"),
            Case::Kebab => join_lower(&words, "-"),
            Case::Constant => words
                .iter()
                .map(|w| w.to_uppercase())
                .collect::<Vec<_>>()
                .join("_"),
            Case::Title => words
                .iter()
                .map(|w| capitalize(w))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

impl Display for Case {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// An [`Expander`] which recognizes a field written in any [`Case`].
///
/// Each format matches the field name rewritten in that case, so a template
/// mentioning `eventDate`, `event_date` and `EVENT_DATE` refers to the same
/// field three times. String values are rewritten in the matching case when
/// rendered, while any other value is rendered unchanged.
///
/// Formats that render the field name identically (as happens with single
/// word names, where `camel`, `snake` and `kebab` coincide) are all kept. The
/// first one claims every occurrence.
#[derive(Debug, Default, Clone, Copy)]
pub struct CaseExpander;

impl Expander for CaseExpander {
    fn expand_query(&self, identifier: &str) -> Result<QuerySpec, Error> {
        if split_words(identifier).is_empty() {
            return Err(Error::invalid(INVALID_IDENTIFIER).with_help(format!(
                "query `{identifier}` contains no letters or digits"
            )));
        }

        let formats = Case::ALL
            .iter()
            .map(|case| FormatRule::literal(case.name(), &case.apply(identifier)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QuerySpec::new(identifier, formats))
    }

    fn format_value(&self, _: &QuerySpec, rule: &FormatRule, value: &Value) -> Value {
        match (value, Case::from_name(rule.name())) {
            (Value::String(text), Some(case)) => Value::String(case.apply(text)),
            _ => value.clone(),
        }
    }
}

/// Split text into words on separators, lower to upper transitions,
/// the end of an acronym and letter/digit boundaries.
fn split_words(text: &str) -> Vec<String> {
    let chars = text.chars().collect::<Vec<_>>();
    let mut words = Vec::new();
    let mut word = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !word.is_empty() {
                words.push(std::mem::take(&mut word));
            }
            continue;
        }

        if let Some(prev) = word.chars().last() {
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_alphabetic() != c.is_alphabetic())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.is_some_and(|n| n.is_lowercase()));

            if boundary {
                words.push(std::mem::take(&mut word));
            }
        }
        word.push(c);
    }
    if !word.is_empty() {
        words.push(word);
    }

    words
}

/// Uppercase the first character of a word and lowercase the rest.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();

    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn join_lower(words: &[String], separator: &str) -> String {
    words
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("eventDate"), ["event", "Date"]);
        assert_eq!(split_words("event_date"), ["event", "date"]);
        assert_eq!(split_words("  event--date "), ["event", "date"]);
        assert_eq!(split_words("HTTPServer"), ["HTTP", "Server"]);
        assert_eq!(split_words("version2Beta"), ["version", "2", "Beta"]);
        assert!(split_words("_-.").is_empty());
    }

    #[test]
    fn test_apply_every_case() {
        let expect = [
            (Case::Camel, "eventDate"),
            (Case::Pascal, "EventDate"),
            (Case::Snake, "event_date"),
            (Case::Kebab, "event-date"),
            (Case::Constant, "EVENT_DATE"),
            (Case::Title, "Event Date"),
        ];

        for (case, text) in expect {
            assert_eq!(case.apply("event date"), text, "{case}");
        }
    }

    #[test]
    fn test_from_name() {
        for case in Case::ALL {
            assert_eq!(Case::from_name(case.name()), Some(case));
        }
        assert_eq!(Case::from_name("full"), None);
    }

    #[test]
    fn test_expand_query() {
        let query = CaseExpander.expand_query("eventDate").unwrap();
        let matchers = query
            .formats()
            .iter()
            .map(|rule| rule.matcher())
            .collect::<Vec<_>>();

        assert_eq!(query.source(), "eventDate");
        assert_eq!(
            matchers,
            ["eventDate", "EventDate", "event_date", "event\\-date", "EVENT_DATE", "Event Date"]
        );
    }

    #[test]
    fn test_expand_query_without_words() {
        let result = CaseExpander.expand_query("__");

        assert!(result.is_err_and(|e| e.reason() == Some(INVALID_IDENTIFIER)));
    }

    #[test]
    fn test_format_value() {
        let query = CaseExpander.expand_query("name").unwrap();
        let rule = &query.formats()[4];

        assert_eq!(
            CaseExpander.format_value(&query, rule, &json!("john smith")),
            json!("JOHN_SMITH")
        );
        assert_eq!(CaseExpander.format_value(&query, rule, &json!(42)), json!(42));
        assert_eq!(
            CaseExpander.format_value(&query, rule, &json!(["a"])),
            json!(["a"])
        );
    }
}
