use super::{
    Syntax, BLOCK_END, BLOCK_START, COMMENT_END, COMMENT_START, VARIABLE_END, VARIABLE_START,
};
use crate::error::{Error, INVALID_SYNTAX};

/// A handy way to build a new instance of [`Syntax`].
///
/// Every marker starts out with its default value, so only the markers you
/// want to change need to be set.
///
/// # Example
///
/// ```
/// use formplate::SyntaxBuilder;
///
/// let syntax = SyntaxBuilder::new()
///     .variable("((", "))")
///     .block("(*", "*)")
///     .comment("(#", "#)")
///     .build();
///
/// assert!(syntax.is_ok());
/// assert_eq!(syntax.unwrap().variable(), ("((", "))"));
/// ```
#[derive(Debug, Clone)]
pub struct SyntaxBuilder {
    variable: (String, String),
    block: (String, String),
    comment: (String, String),
}

impl SyntaxBuilder {
    /// Create a new SyntaxBuilder.
    #[inline]
    pub fn new() -> Self {
        Self {
            variable: (VARIABLE_START.into(), VARIABLE_END.into()),
            block: (BLOCK_START.into(), BLOCK_END.into()),
            comment: (COMMENT_START.into(), COMMENT_END.into()),
        }
    }

    /// Set the variable delimiters.
    #[inline]
    pub fn variable(&mut self, begin: &str, end: &str) -> &mut Self {
        self.variable = (begin.into(), end.into());

        self
    }

    /// Set the block delimiters.
    #[inline]
    pub fn block(&mut self, begin: &str, end: &str) -> &mut Self {
        self.block = (begin.into(), end.into());

        self
    }

    /// Set the comment delimiters.
    #[inline]
    pub fn comment(&mut self, begin: &str, end: &str) -> &mut Self {
        self.comment = (begin.into(), end.into());

        self
    }

    /// Build a Syntax instance from the given delimiters.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] when a marker is empty, or two kinds of tag share
    /// the same start marker.
    pub fn build(&self) -> Result<Syntax, Error> {
        let pairs = [
            ("variable", &self.variable),
            ("block", &self.block),
            ("comment", &self.comment),
        ];

        for (kind, (begin, end)) in pairs {
            if begin.is_empty() || end.is_empty() {
                return Err(Error::invalid(INVALID_SYNTAX)
                    .with_help(format!("{kind} markers must not be empty")));
            }
        }
        for (i, (kind, (begin, _))) in pairs.iter().enumerate() {
            for (other, (other_begin, _)) in pairs.iter().skip(i + 1) {
                if begin == other_begin {
                    return Err(Error::invalid(INVALID_SYNTAX).with_help(format!(
                        "{kind} and {other} markers both start with `{begin}`"
                    )));
                }
            }
        }

        Ok(Syntax {
            variable: self.variable.clone(),
            block: self.block.clone(),
            comment: self.comment.clone(),
        })
    }
}

impl Default for SyntaxBuilder {
    fn default() -> Self {
        Self::new()
    }
}
