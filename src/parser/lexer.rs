use crate::error::{SyntaxError, SyntaxErrorKind};

type LexResult<T> = Result<T, SyntaxError>;

const DEFAULT_OPEN: &str = "{{";
const DEFAULT_CLOSE: &str = "}}";
/// Longest tag excerpt carried by an error.
const FRAGMENT_LEN: usize = 32;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum TagKind {
    /// `{{name}}`
    Escaped,
    /// `{{{name}}}` or `{{&name}}`
    Unescaped,
    /// `{{#name}}`
    Section,
    /// `{{^name}}`
    Inverted,
    /// `{{/name}}`
    Close,
    /// `{{>name}}`
    Partial,
    /// `{{!text}}`
    Comment,
    /// `{{=open close=}}`
    Delimiters,
}

impl TagKind {
    /// Tags that produce no output of their own and may therefore stand alone
    /// on a line.
    pub(crate) const fn may_stand_alone(self) -> bool {
        match self {
            Self::Section
            | Self::Inverted
            | Self::Close
            | Self::Partial
            | Self::Comment
            | Self::Delimiters => true,
            Self::Escaped | Self::Unescaped => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tag<'a> {
    pub(crate) kind: TagKind,
    /// Tag body with sigils and surrounding whitespace removed.
    pub(crate) content: &'a str,
    /// The whole tag as written, delimiters included.
    pub(crate) raw: &'a str,
    pub(crate) line: usize,
    pub(crate) column: usize,
}

impl Tag<'_> {
    pub(crate) fn error(&self, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError {
            line: self.line,
            column: self.column,
            fragment: fragment(self.raw),
            partial: None,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    Text(&'a str),
    Tag(Tag<'a>),
}

fn fragment(raw: &str) -> String {
    raw.chars().take(FRAGMENT_LEN).collect()
}

/// Splits template source into literal text and tags, following set-delimiter
/// tags as they appear.
pub(crate) struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// The starting location of the current line
    line_start_pos: usize,
    open: String,
    close: String,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            line: 1,
            line_start_pos: 0,
            open: DEFAULT_OPEN.to_string(),
            close: DEFAULT_CLOSE.to_string(),
        }
    }

    #[inline]
    fn current_column(&self) -> usize {
        self.input
            .get(self.line_start_pos..self.pos)
            .map_or(1, |prefix| prefix.chars().count() + 1)
    }

    #[inline]
    fn rest(&self) -> &'a str {
        self.input.get(self.pos..).unwrap_or_default()
    }

    /// Moves forward `len` bytes, keeping line tracking correct across any
    /// newlines in the skipped text.
    fn advance(&mut self, len: usize) {
        let end = (self.pos + len).min(self.input.len());
        let skipped = self.input.get(self.pos..end).unwrap_or_default();
        for (offset, c) in skipped.char_indices() {
            if c == '\n' {
                self.line += 1;
                self.line_start_pos = self.pos + offset + 1;
            }
        }
        self.pos = end;
    }

    pub(crate) fn tokenize(mut self) -> LexResult<Vec<Token<'a>>> {
        let mut tokens = Vec::new();
        loop {
            let rest = self.rest();
            if rest.is_empty() {
                break;
            }
            match rest.find(self.open.as_str()) {
                None => {
                    tokens.push(Token::Text(rest));
                    self.advance(rest.len());
                }
                Some(offset) => {
                    if let Some(text) = rest.get(..offset).filter(|t| !t.is_empty()) {
                        tokens.push(Token::Text(text));
                    }
                    self.advance(offset);
                    tokens.push(Token::Tag(self.tag()?));
                }
            }
        }
        Ok(tokens)
    }

    /// Parses the tag starting at the current position, which must be the
    /// open delimiter.
    fn tag(&mut self) -> LexResult<Tag<'a>> {
        let start = self.pos;
        let line = self.line;
        let column = self.current_column();
        let after_open = self
            .rest()
            .get(self.open.len()..)
            .unwrap_or_default();

        let (kind, sigil_len, closer) = match after_open.chars().next() {
            Some('{') => (TagKind::Unescaped, 1, format!("}}{}", self.close)),
            Some('=') => (TagKind::Delimiters, 1, format!("={}", self.close)),
            Some('&') => (TagKind::Unescaped, 1, self.close.clone()),
            Some('#') => (TagKind::Section, 1, self.close.clone()),
            Some('^') => (TagKind::Inverted, 1, self.close.clone()),
            Some('/') => (TagKind::Close, 1, self.close.clone()),
            Some('>') => (TagKind::Partial, 1, self.close.clone()),
            Some('!') => (TagKind::Comment, 1, self.close.clone()),
            Some(_) | None => (TagKind::Escaped, 0, self.close.clone()),
        };

        let body = after_open.get(sigil_len..).unwrap_or_default();
        let Some(body_len) = body.find(closer.as_str()) else {
            return Err(SyntaxError {
                line,
                column,
                fragment: fragment(self.rest()),
                partial: None,
                kind: SyntaxErrorKind::UnterminatedTag { expected: closer },
            });
        };

        let total = self.open.len() + sigil_len + body_len + closer.len();
        let raw = self.rest().get(..total).unwrap_or_default();
        let content = body.get(..body_len).unwrap_or_default().trim();
        self.advance(total);

        let tag = Tag {
            kind,
            content,
            raw,
            line,
            column,
        };

        if kind == TagKind::Delimiters {
            self.set_delimiters(&tag)?;
        } else if kind != TagKind::Comment && content.is_empty() {
            return Err(tag.error(SyntaxErrorKind::EmptyTag));
        }

        debug_assert!(self.pos > start, "lexer must make progress");
        Ok(tag)
    }

    fn set_delimiters(&mut self, tag: &Tag<'_>) -> LexResult<()> {
        let invalid = || {
            tag.error(SyntaxErrorKind::InvalidDelimiters {
                tag: tag.raw.to_string(),
            })
        };
        let mut parts = tag.content.split_whitespace();
        let (Some(open), Some(close), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(invalid());
        };
        if open.contains('=') || close.contains('=') {
            return Err(invalid());
        }
        self.open = open.to_string();
        self.close = close.to_string();
        Ok(())
    }
}
