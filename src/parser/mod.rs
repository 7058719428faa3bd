mod lexer;

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::{
    ast::{Name, Node},
    error::{SyntaxError, SyntaxErrorKind},
    interface::{Options, Partials, WhitespaceMode},
    template::{PartialTemplate, Template},
};
use lexer::{Lexer, Tag, TagKind, Token};

type ParseResult<T> = Result<T, SyntaxError>;

/// A section whose closing tag has not been seen yet.
struct OpenSection<'a> {
    tag: Tag<'a>,
    name: Name,
    inverted: bool,
    body: Vec<Node>,
}

/// State shared by one top-level compile and every partial it pulls in.
///
/// Each partial is parsed once, on first reference. `stack` holds the
/// partials currently being parsed; meeting one of them again closes a cycle.
struct Compilation<'s, P: ?Sized> {
    sources: &'s P,
    options: Options,
    parsed: BTreeMap<String, Node>,
    recursive: BTreeSet<String>,
    stack: Vec<String>,
}

impl<'s, P: Partials + ?Sized> Compilation<'s, P> {
    fn new(sources: &'s P, options: Options) -> Self {
        Self {
            sources,
            options,
            parsed: BTreeMap::new(),
            recursive: BTreeSet::new(),
            stack: Vec::new(),
        }
    }

    fn parse_source(&mut self, source: &str) -> ParseResult<Node> {
        let mut tokens = Lexer::new(source).tokenize()?;
        if self.options.whitespace == WhitespaceMode::Strict {
            strip_standalone_lines(&mut tokens);
        }
        let mut nodes = self.build(tokens)?;
        if self.options.whitespace == WhitespaceMode::Collapse {
            collapse_literals(&mut nodes);
        }
        Ok(Node::Root(nodes))
    }

    fn build(&mut self, tokens: Vec<Token<'_>>) -> ParseResult<Vec<Node>> {
        let mut root = Vec::new();
        let mut open: Vec<OpenSection<'_>> = Vec::new();

        for token in tokens {
            let tag = match token {
                Token::Text(text) => {
                    push_literal(current_body(&mut root, &mut open), text);
                    continue;
                }
                Token::Tag(tag) => tag,
            };

            match tag.kind {
                TagKind::Escaped | TagKind::Unescaped => {
                    let name = parse_name(&tag)?;
                    current_body(&mut root, &mut open).push(Node::Variable {
                        name,
                        escape: tag.kind == TagKind::Escaped,
                    });
                }
                TagKind::Section | TagKind::Inverted => {
                    let name = parse_name(&tag)?;
                    open.push(OpenSection {
                        inverted: tag.kind == TagKind::Inverted,
                        tag,
                        name,
                        body: Vec::new(),
                    });
                }
                TagKind::Close => {
                    let name = parse_name(&tag)?;
                    let Some(section) = open.pop() else {
                        return Err(tag.error(SyntaxErrorKind::UnexpectedClose {
                            name: name.to_string(),
                        }));
                    };
                    if section.name != name {
                        return Err(tag.error(SyntaxErrorKind::MismatchedClose {
                            expected: section.name.to_string(),
                            found: name.to_string(),
                        }));
                    }
                    let node = if section.inverted {
                        Node::InvertedSection {
                            name: section.name,
                            body: section.body,
                        }
                    } else {
                        Node::Section {
                            name: section.name,
                            body: section.body,
                        }
                    };
                    current_body(&mut root, &mut open).push(node);
                }
                TagKind::Partial => {
                    self.reference(&tag)?;
                    current_body(&mut root, &mut open).push(Node::Partial {
                        name: tag.content.to_string(),
                    });
                }
                TagKind::Comment | TagKind::Delimiters => {}
            }
        }

        if let Some(section) = open.pop() {
            return Err(section.tag.error(SyntaxErrorKind::UnclosedSection {
                name: section.name.to_string(),
            }));
        }
        Ok(root)
    }

    /// Makes sure the partial named by `tag` is parsed, or marks the cycle it
    /// closes as recursive.
    fn reference(&mut self, tag: &Tag<'_>) -> ParseResult<()> {
        let name = tag.content;

        if let Some(index) = self.stack.iter().position(|open| open == name) {
            for member in self.stack.iter().skip(index) {
                if self.recursive.insert(member.clone()) {
                    debug!(partial = %member, "partial is recursive");
                }
            }
            return Ok(());
        }
        if self.parsed.contains_key(name) {
            return Ok(());
        }

        let sources = self.sources;
        let source = sources.source(name).ok_or_else(|| {
            tag.error(SyntaxErrorKind::UnknownPartial {
                name: name.to_string(),
            })
        })?;

        self.stack.push(name.to_string());
        let parsed = self.parse_source(source);
        self.stack.pop();

        let root = parsed.map_err(|e| e.in_partial(name))?;
        debug!(partial = name, "parsed partial");
        self.parsed.insert(name.to_string(), root);
        Ok(())
    }

    fn finish(self, root: Node) -> Template {
        let recursive = self.recursive;
        let partials = self
            .parsed
            .into_iter()
            .map(|(name, root)| {
                let is_recursive = recursive.contains(&name);
                (name, PartialTemplate::new(root, is_recursive))
            })
            .collect();
        Template::new(root, partials, self.options)
    }
}

fn current_body<'f>(root: &'f mut Vec<Node>, open: &'f mut [OpenSection<'_>]) -> &'f mut Vec<Node> {
    match open.last_mut() {
        Some(section) => &mut section.body,
        None => root,
    }
}

/// Appends text, merging it into a directly preceding literal so that
/// whitespace runs split by comments collapse as one.
fn push_literal(body: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Literal(previous)) = body.last_mut() {
        previous.push_str(text);
    } else {
        body.push(Node::Literal(text.to_string()));
    }
}

fn parse_name(tag: &Tag<'_>) -> ParseResult<Name> {
    let invalid = || {
        tag.error(SyntaxErrorKind::InvalidName {
            name: tag.content.to_string(),
        })
    };
    if tag.content.contains(char::is_whitespace) {
        return Err(invalid());
    }
    Name::parse(tag.content).ok_or_else(invalid)
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

fn collapse_literals(nodes: &mut [Node]) {
    for node in nodes {
        match node {
            Node::Literal(text) => *text = collapse_whitespace(text),
            Node::Root(body) | Node::Section { body, .. } | Node::InvertedSection { body, .. } => {
                collapse_literals(body);
            }
            Node::Variable { .. } | Node::Partial { .. } => {}
        }
    }
}

fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c == ' ' || c == '\t' || c == '\r')
}

/// True when the tag at `index` is the only thing on its line apart from
/// indentation and the line break.
fn is_standalone(tokens: &[Token<'_>], index: usize) -> bool {
    let Some(Token::Tag(tag)) = tokens.get(index) else {
        return false;
    };
    if !tag.kind.may_stand_alone() {
        return false;
    }

    let starts_line = match index.checked_sub(1).map(|i| (i, tokens.get(i))) {
        None => true,
        Some((i, Some(Token::Text(text)))) => match text.rfind('\n') {
            Some(nl) => is_blank(text.get(nl + 1..).unwrap_or_default()),
            None => i == 0 && is_blank(text),
        },
        Some(_) => false,
    };

    let next = index + 1;
    let ends_line = match tokens.get(next) {
        None => true,
        Some(Token::Text(text)) => match text.find('\n') {
            Some(nl) => is_blank(text.get(..nl).unwrap_or_default()),
            None => next + 1 == tokens.len() && is_blank(text),
        },
        Some(Token::Tag(_)) => false,
    };

    starts_line && ends_line
}

/// Removes the indentation and line break around every standalone tag.
fn strip_standalone_lines(tokens: &mut [Token<'_>]) {
    let standalone: Vec<bool> = (0..tokens.len())
        .map(|i| is_standalone(tokens, i))
        .collect();

    for (index, _) in standalone.iter().enumerate().filter(|(_, s)| **s) {
        if let Some(Token::Text(text)) = index.checked_sub(1).and_then(|i| tokens.get_mut(i)) {
            *text = text
                .rfind('\n')
                .and_then(|nl| text.get(..=nl))
                .unwrap_or_default();
        }
        if let Some(Token::Text(text)) = tokens.get_mut(index + 1) {
            *text = text
                .find('\n')
                .and_then(|nl| text.get(nl + 1..))
                .unwrap_or_default();
        }
    }
}

/// Parses `source` and every partial it references into a [`Template`].
///
/// Partial sources are looked up in `partials` by the name written in the
/// `{{>name}}` tag. A partial that reaches itself again is marked recursive
/// rather than expanded forever.
///
/// # Errors
/// Returns a [`SyntaxError`] for malformed tags, mismatched or unclosed
/// sections and references to partials missing from `partials`. No tree is
/// returned on error.
pub fn compile<P>(source: &str, partials: &P, options: Options) -> Result<Template, SyntaxError>
where
    P: Partials + ?Sized,
{
    let mut compilation = Compilation::new(partials, options);
    let root = compilation.parse_source(source)?;
    debug!(
        partials = compilation.parsed.len(),
        recursive = compilation.recursive.len(),
        "compiled template"
    );
    Ok(compilation.finish(root))
}
