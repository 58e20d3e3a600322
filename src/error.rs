use std::fmt::{Debug, Display, Formatter, Result};

pub const NO_QUERIES: &str = "no queries supplied";
pub const EMPTY_QUERY: &str = "empty query identifier";
pub const INVALID_DATA: &str = "data must be an object";
pub const INVALID_MATCHER: &str = "invalid format matcher";
pub const INVALID_IDENTIFIER: &str = "invalid identifier";
pub const INVALID_SYNTAX: &str = "invalid syntax";

const RED: &str = "\x1B[31m";
const RESET: &str = "\x1B[0m";

/// Describes a failure to compile or render a template.
///
/// Argument problems are detected while compiling and reported as
/// [`Error::InvalidArgument`]. Anything the rendering engine raises is carried
/// as-is inside [`Error::Render`].
///
/// # Examples
///
/// ```
/// use formplate::Error;
///
/// let error = Error::invalid("no queries supplied")
///     .with_help("pass at least one field name");
///
/// assert!(error.is_invalid_argument());
/// assert_eq!(error.to_string(), "no queries supplied");
/// ```
///
/// When printed with `println!("{:#}", error)` the [`Error`] also shows the help text:
///
/// ```text
/// error: no queries supplied
///   = help: pass at least one field name
/// ```
pub enum Error {
    /// An argument given to the compiler was unusable.
    InvalidArgument {
        /// Describes the cause of the [`Error`].
        reason: String,
        /// Additional information to display with the [`Error`].
        help: Option<String>,
    },
    /// The rendering engine failed.
    Render(minijinja::Error),
}

impl Error {
    /// Create a new [`Error::InvalidArgument`] with the given reason text.
    pub fn invalid<T>(reason: T) -> Self
    where
        T: Into<String>,
    {
        Error::InvalidArgument {
            reason: reason.into(),
            help: None,
        }
    }

    /// Set the help text, which is contextual information to accompany the
    /// reason text.
    ///
    /// Has no effect on [`Error::Render`], which keeps the engine's own message.
    pub fn with_help<T>(mut self, text: T) -> Self
    where
        T: Into<String>,
    {
        if let Error::InvalidArgument { help, .. } = &mut self {
            *help = Some(text.into());
        }

        self
    }

    /// Return true if this is an [`Error::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument { .. })
    }

    /// Return the reason text of an [`Error::InvalidArgument`].
    pub fn reason(&self) -> Option<&str> {
        match self {
            Error::InvalidArgument { reason, .. } => Some(reason),
            Error::Render(_) => None,
        }
    }

    /// Return the help text of an [`Error::InvalidArgument`], if any.
    pub fn help(&self) -> Option<&str> {
        match self {
            Error::InvalidArgument { help, .. } => help.as_deref(),
            Error::Render(_) => None,
        }
    }

    /// Return the engine error carried by an [`Error::Render`].
    pub fn render_error(&self) -> Option<&minijinja::Error> {
        match self {
            Error::Render(error) => Some(error),
            Error::InvalidArgument { .. } => None,
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Error::InvalidArgument { reason, help } => f
                .debug_struct("InvalidArgument")
                .field("reason", reason)
                .field("help", help)
                .finish(),
            Error::Render(error) => f.debug_tuple("Render").field(error).finish(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Error::Render(error) => Display::fmt(error, f),
            Error::InvalidArgument { reason, help } => {
                if !f.alternate() {
                    return write!(f, "{reason}");
                }

                write!(f, "{RED}error{RESET}: {reason}")?;
                if let Some(help) = help {
                    write!(f, "\n  = help: {help}")?;
                }

                Ok(())
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Render(error) => Some(error),
            Error::InvalidArgument { .. } => None,
        }
    }
}

impl From<minijinja::Error> for Error {
    fn from(error: minijinja::Error) -> Self {
        Error::Render(error)
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Error::InvalidArgument { reason, help },
                Error::InvalidArgument {
                    reason: other_reason,
                    help: other_help,
                },
            ) => reason == other_reason && help == other_help,
            (Error::Render(a), Error::Render(b)) => {
                a.kind() == b.kind() && a.to_string() == b.to_string()
            }
            _ => false,
        }
    }
}
