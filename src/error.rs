use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum SyntaxErrorKind {
    #[error("Unterminated tag (expected '{expected}')")]
    UnterminatedTag { expected: String },
    #[error("Empty tag")]
    EmptyTag,
    #[error("Invalid name '{name}'")]
    InvalidName { name: String },
    #[error("Section '{expected}' closed by '{found}'")]
    MismatchedClose { expected: String, found: String },
    #[error("Closing tag '{name}' without an open section")]
    UnexpectedClose { name: String },
    #[error("Unclosed section '{name}'")]
    UnclosedSection { name: String },
    #[error("Unknown partial '{name}'")]
    UnknownPartial { name: String },
    #[error("Invalid delimiters '{tag}'")]
    InvalidDelimiters { tag: String },
}

/// A fatal error raised while compiling a template or one of its partials.
///
/// `line` and `column` are 1-indexed and point at the start of the offending
/// tag inside the source named by `partial` (`None` for the top-level template).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("Syntax error{} at line {line}, column {column} near '{fragment}': {kind}", partial_suffix(.partial))]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub fragment: String,
    pub partial: Option<String>,
    #[source]
    pub kind: SyntaxErrorKind,
}

fn partial_suffix(partial: &Option<String>) -> String {
    partial
        .as_ref()
        .map_or_else(String::new, |name| format!(" in partial '{}'", name))
}

impl SyntaxError {
    /// Attaches the name of the partial whose source raised this error, unless
    /// a more deeply nested partial already claimed it.
    pub(crate) fn in_partial(mut self, name: &str) -> Self {
        if self.partial.is_none() {
            self.partial = Some(name.to_string());
        }
        self
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
pub enum Error {
    #[error("Partial already exists: {name}")]
    PartialExists { name: String },
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
}
