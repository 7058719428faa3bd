use std::fmt;

/// The name of a variable or section, split into its dotted path segments at
/// parse time.
///
/// Always holds at least one segment. The self-reference `.` is a single
/// segment name.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    segments: Vec<String>,
}

impl Name {
    pub const SELF: &'static str = ".";

    /// Splits `raw` on `.`; returns `None` for an empty name or an empty
    /// segment such as `a..b`.
    pub(crate) fn parse(raw: &str) -> Option<Self> {
        if raw == Self::SELF {
            return Some(Self {
                segments: vec![raw.to_string()],
            });
        }
        let segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(Self { segments })
    }

    pub fn is_dotted(&self) -> bool {
        self.segments.len() > 1
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The first segment, which is the whole name when not dotted.
    pub fn first(&self) -> &str {
        self.segments.first().map_or(Self::SELF, String::as_str)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    /// Literal text after whitespace normalization.
    Literal(String),
    /// A value lookup. `escape` is false for `{{{name}}}` and `{{&name}}`.
    Variable { name: Name, escape: bool },
    /// Rendered once per element of a non-empty array, or once for any other
    /// truthy value.
    Section { name: Name, body: Vec<Node> },
    /// Rendered once when the value is falsey.
    InvertedSection { name: Name, body: Vec<Node> },
    /// Reference to a partial by registration key.
    Partial { name: String },
    /// The implicit outermost section of a template or partial.
    Root(Vec<Node>),
}

impl Node {
    /// The child nodes of a section-like node.
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Root(body) | Self::Section { body, .. } | Self::InvertedSection { body, .. } => {
                body
            }
            Self::Literal(_) | Self::Variable { .. } | Self::Partial { .. } => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_name() {
        let name = Name::parse("user").unwrap();
        assert!(!name.is_dotted());
        assert_eq!(name.first(), "user");
        assert_eq!(name.to_string(), "user");
    }

    #[test]
    fn test_dotted_name() {
        let name = Name::parse("a.b.c").unwrap();
        assert!(name.is_dotted());
        assert_eq!(name.segments(), ["a", "b", "c"]);
        assert_eq!(name.to_string(), "a.b.c");
    }

    #[test]
    fn test_self_reference_is_not_dotted() {
        let name = Name::parse(".").unwrap();
        assert!(!name.is_dotted());
        assert_eq!(name.first(), Name::SELF);
    }

    #[test]
    fn test_empty_segments_rejected() {
        assert!(Name::parse("").is_none());
        assert!(Name::parse("a..b").is_none());
        assert!(Name::parse(".a").is_none());
        assert!(Name::parse("a.").is_none());
    }
}
