//! Formplate uses a type known as a Syntax to understand which delimiters
//! surround variables, blocks and comments once a template has been
//! rewritten. This module defines the Builder type, which provides methods
//! to easily generate a `Syntax`.
//!
//! The defaults are deliberately long runs of `=` so that they never occur in
//! ordinary template text, and never resemble anything a format matcher could
//! be looking for.
mod builder;

pub use builder::SyntaxBuilder;

use crate::error::{Error, INVALID_SYNTAX};
use minijinja::syntax::SyntaxConfig;

pub const VARIABLE_START: &str = "<=============================";
pub const VARIABLE_END: &str = "=============================>";
pub const BLOCK_START: &str = "<%============================";
pub const BLOCK_END: &str = "============================%>";
pub const COMMENT_START: &str = "<#============================";
pub const COMMENT_END: &str = "============================#>";

/// Start and end markers for variables, blocks and comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax {
    pub(crate) variable: (String, String),
    pub(crate) block: (String, String),
    pub(crate) comment: (String, String),
}

impl Syntax {
    /// Return the variable start and end markers.
    #[inline]
    pub fn variable(&self) -> (&str, &str) {
        (&self.variable.0, &self.variable.1)
    }

    /// Return the block start and end markers.
    #[inline]
    pub fn block(&self) -> (&str, &str) {
        (&self.block.0, &self.block.1)
    }

    /// Return the comment start and end markers.
    #[inline]
    pub fn comment(&self) -> (&str, &str) {
        (&self.comment.0, &self.comment.1)
    }

    /// Wrap the given path in variable markers.
    ///
    /// # Examples
    ///
    /// ```
    /// use formplate::Syntax;
    ///
    /// let syntax = Syntax::builder().variable("[[", "]]").build().unwrap();
    ///
    /// assert_eq!(syntax.reference("abc", "camel"), "[[abc.camel]]");
    /// ```
    pub fn reference(&self, id: &str, format: &str) -> String {
        let (begin, end) = self.variable();

        format!("{begin}{id}.{format}{end}")
    }

    /// Create a new [`SyntaxBuilder`] seeded with the default markers.
    #[inline]
    pub fn builder() -> SyntaxBuilder {
        SyntaxBuilder::new()
    }

    /// Convert into the rendering engine's syntax configuration.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the engine refuses the markers.
    pub fn to_config(&self) -> Result<SyntaxConfig, Error> {
        SyntaxConfig::builder()
            .variable_delimiters(self.variable.0.clone(), self.variable.1.clone())
            .block_delimiters(self.block.0.clone(), self.block.1.clone())
            .comment_delimiters(self.comment.0.clone(), self.comment.1.clone())
            .build()
            .map_err(|e| Error::invalid(INVALID_SYNTAX).with_help(e.to_string()))
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Self {
            variable: (VARIABLE_START.into(), VARIABLE_END.into()),
            block: (BLOCK_START.into(), BLOCK_END.into()),
            comment: (COMMENT_START.into(), COMMENT_END.into()),
        }
    }
}
