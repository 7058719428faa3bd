use std::{
    borrow::Borrow,
    collections::{BTreeMap, HashMap},
    hash::{BuildHasher, Hash},
    str::FromStr,
};

use thiserror::Error;

/// How literal text is normalized before code emission. Decided once per
/// compile and applied to every literal of the template and its partials.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum WhitespaceMode {
    /// Literal text is kept exactly as written.
    #[default]
    Preserve,
    /// Every maximal run of whitespace is replaced by a single space.
    Collapse,
    /// Lines holding nothing but whitespace and a single non-output tag
    /// (section open/close, comment, partial, set delimiter) are dropped.
    Strict,
}

/// The execution environment code is generated for.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Target {
    /// Rust source running against [`crate::Runtime`] over `serde_json::Value`.
    Native,
    /// A JavaScript function expression running against `MustacheRuntime`.
    Script,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Error)]
#[error("Unknown {what} '{value}'")]
pub struct UnknownVariant {
    what: &'static str,
    value: String,
}

impl FromStr for WhitespaceMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "preserve" => Ok(Self::Preserve),
            "collapse" => Ok(Self::Collapse),
            "strict" => Ok(Self::Strict),
            _ => Err(UnknownVariant {
                what: "whitespace mode",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Target {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "native" | "rust" => Ok(Self::Native),
            "script" | "js" | "javascript" => Ok(Self::Script),
            _ => Err(UnknownVariant {
                what: "target",
                value: s.to_string(),
            }),
        }
    }
}

/// Compile options, fixed for the whole compile of a template and all of the
/// partials it reaches.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Options {
    pub whitespace: WhitespaceMode,
    /// Quote literals for minimal size rather than for safe inlining into
    /// markup.
    pub compact_literals: bool,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn with_whitespace(mut self, whitespace: WhitespaceMode) -> Self {
        self.whitespace = whitespace;
        self
    }

    pub const fn with_compact_literals(mut self, compact: bool) -> Self {
        self.compact_literals = compact;
        self
    }
}

/// A lookup of partial template sources by registration key.
pub trait Partials {
    fn source(&self, name: &str) -> Option<&str>;
}

impl<K, V, S> Partials for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<str>,
    S: BuildHasher,
{
    fn source(&self, name: &str) -> Option<&str> {
        self.get(name).map(AsRef::as_ref)
    }
}

impl<K, V> Partials for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: AsRef<str>,
{
    fn source(&self, name: &str) -> Option<&str> {
        self.get(name).map(AsRef::as_ref)
    }
}

impl<V: AsRef<str>> Partials for [(&str, V)] {
    fn source(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, source)| source.as_ref())
    }
}
