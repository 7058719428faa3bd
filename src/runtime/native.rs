// Runtime for Rust code generated by mustachec.
//
// This file is compiled into mustachec itself and is also handed out verbatim
// by `runtime_source(Target::Native)`, so it only depends on `std` and
// `serde_json`.

use std::{borrow::Cow, collections::HashMap, rc::Rc};

/// Read access to a data model that templates can render from.
pub trait Context {
    /// Returns the member `key` if `self` is a structure that defines it.
    fn get(&self, key: &str) -> Option<&Self>;

    /// Returns the elements if `self` is an ordered collection.
    fn as_sequence(&self) -> Option<&[Self]>
    where
        Self: Sized;

    fn is_array(&self) -> bool
    where
        Self: Sized,
    {
        self.as_sequence().is_some()
    }

    /// True for a value that is present but holds nothing, such as JSON
    /// `null`. Stack lookups skip such members.
    fn is_missing(&self) -> bool;

    /// Null, false, zero, the empty string and the empty collection.
    fn is_falsey(&self) -> bool;

    /// The text a variable tag renders for this value.
    fn text(&self) -> Cow<'_, str>;
}

impl Context for serde_json::Value {
    fn get(&self, key: &str) -> Option<&Self> {
        self.as_object()?.get(key)
    }

    fn as_sequence(&self) -> Option<&[Self]> {
        self.as_array().map(Vec::as_slice)
    }

    fn is_missing(&self) -> bool {
        matches!(self, Self::Null)
    }

    fn is_falsey(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
            Self::String(s) => s.is_empty(),
            Self::Array(items) => items.is_empty(),
            Self::Object(_) => false,
        }
    }

    fn text(&self) -> Cow<'_, str> {
        match self {
            Self::String(s) => Cow::Borrowed(s.as_str()),
            Self::Number(n) => Cow::Owned(number_text(n)),
            Self::Bool(true) => Cow::Borrowed("true"),
            Self::Bool(false) => Cow::Borrowed("false"),
            Self::Array(items) => Cow::Owned(
                items
                    .iter()
                    .map(|item| item.text())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            Self::Null | Self::Object(_) => Cow::Borrowed(""),
        }
    }
}

/// Formats numbers the way JavaScript's `String(n)` does for the common
/// cases, so both runtimes print `1.0` as `1`.
fn number_text(n: &serde_json::Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f == 0.0 {
                return "0".to_string();
            }
            if f.fract() == 0.0 && f.abs() < 1e21 {
                return format!("{:.0}", f);
            }
        }
    }
    n.to_string()
}

/// The name a lookup resolves: a single key or a dotted path.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key<'n> {
    Name(&'n str),
    Path(&'n [&'n str]),
}

impl<'n> From<&'n str> for Key<'n> {
    fn from(name: &'n str) -> Self {
        Self::Name(name)
    }
}

impl<'n> From<&'n [&'n str]> for Key<'n> {
    fn from(path: &'n [&'n str]) -> Self {
        Self::Path(path)
    }
}

impl<'n, const N: usize> From<&'n [&'n str; N]> for Key<'n> {
    fn from(path: &'n [&'n str; N]) -> Self {
        Self::Path(path)
    }
}

/// Replaces `&`, `<`, `>` and `"` with their entities.
pub fn escape_xml(text: Cow<'_, str>) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"']) {
        return text;
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

type PartialBody<'a, V> = Rc<dyn Fn(&mut Runtime<'a, V>) + 'a>;

/// Execution state of one render: the context stack, the named partials and
/// the output fragments.
///
/// Build a fresh runtime for every render.
pub struct Runtime<'a, V> {
    /// Innermost context last. `None` is a missing value pushed by an
    /// inverted section.
    stack: Vec<Option<&'a V>>,
    partials: HashMap<String, PartialBody<'a, V>>,
    fragments: Vec<Cow<'a, str>>,
}

impl<'a, V: Context> Runtime<'a, V> {
    pub fn new(data: &'a V) -> Self {
        Self {
            stack: vec![Some(data)],
            partials: HashMap::new(),
            fragments: Vec::new(),
        }
    }

    /// Finds `key` in the innermost context that holds a value for it. A
    /// `null` member does not hide the same key further down the stack.
    fn lookup_flat(&self, key: &str) -> Option<&'a V> {
        self.stack.iter().rev().find_map(|scope| {
            scope
                .and_then(|ctx| ctx.get(key))
                .filter(|value| !value.is_missing())
        })
    }

    /// Resolves a name against the context stack. `None` means missing.
    pub fn lookup<'n, K: Into<Key<'n>>>(&self, key: K) -> Option<&'a V> {
        match key.into() {
            Key::Name(".") => self.stack.last().copied().flatten(),
            Key::Name(name) => self.lookup_flat(name),
            Key::Path(path) => {
                let (first, rest) = path.split_first()?;
                let start = self.lookup_flat(first)?;
                rest.iter().try_fold(start, |value, segment| value.get(segment))
            }
        }
    }

    /// Appends literal template text.
    pub fn literal(&mut self, text: &'a str) {
        if !text.is_empty() {
            self.fragments.push(Cow::Borrowed(text));
        }
    }

    /// Appends the text of a value, escaped for markup when `escape` is set.
    /// Missing values append nothing.
    pub fn variable<'n, K: Into<Key<'n>>>(&mut self, key: K, escape: bool) {
        let Some(value) = self.lookup(key) else {
            return;
        };
        let text = value.text();
        let text = if escape { escape_xml(text) } else { text };
        if !text.is_empty() {
            self.fragments.push(text);
        }
    }

    /// Runs `body` zero or more times depending on the value of `key`.
    ///
    /// Inverted sections run once, with the value pushed, when it is falsey.
    /// Other sections run once per element of an array, or once with the value
    /// pushed for any other truthy value.
    pub fn section<'n, K: Into<Key<'n>>>(
        &mut self,
        inverted: bool,
        key: K,
        body: &dyn Fn(&mut Self),
    ) {
        let value = self.lookup(key);
        let falsey = value.is_none_or(Context::is_falsey);

        if inverted || falsey {
            if inverted && falsey {
                self.with_scope(value, body);
            }
            return;
        }

        match value.and_then(Context::as_sequence) {
            Some(items) => {
                for item in items {
                    self.with_scope(Some(item), body);
                }
            }
            None => self.with_scope(value, body),
        }
    }

    fn with_scope(&mut self, scope: Option<&'a V>, body: &dyn Fn(&mut Self)) {
        self.stack.push(scope);
        body(self);
        self.stack.pop();
    }

    /// Binds `name` to a partial body for later [`Runtime::partial`] calls.
    pub fn register_partial<F>(&mut self, name: &str, body: F)
    where
        F: Fn(&mut Self) + 'a,
    {
        self.partials.insert(name.to_string(), Rc::new(body));
    }

    /// Runs the partial registered under `name` against the current stack.
    /// Unregistered names render nothing.
    pub fn partial(&mut self, name: &str) {
        if let Some(body) = self.partials.get(name).cloned() {
            body(self);
        }
    }

    /// The rendered output so far. Does not consume or change the runtime.
    pub fn finish(&self) -> String {
        self.fragments.concat()
    }
}
