/// `write!` into a `String`. Formatting into a `String` only fails when a
/// `Display` impl does, and none of ours do.
macro_rules! emit {
    ($out:expr, $($arg:tt)*) => {{
        use std::fmt::Write as _;
        $out.write_fmt(format_args!($($arg)*)).unwrap_or_default()
    }};
}

/// [`emit!`] followed by a line break.
macro_rules! emitln {
    ($out:expr, $($arg:tt)*) => {{
        emit!($out, $($arg)*);
        $out.push('\n');
    }};
}

mod native;
mod script;

use std::collections::BTreeSet;

use tracing::{debug, trace};

pub use native::NativeBackend;
pub use script::ScriptBackend;

use crate::{
    ast::{Name, Node},
    interface::Target,
    template::{PartialTemplate, Template},
};

/// Surface syntax of one target language.
///
/// The tree walk in [`generate_with`] is shared by every backend; a backend
/// only decides how each instruction is spelled. Every `open_*` call is
/// matched by the corresponding `close_*` call.
pub trait Backend {
    /// Start of the callable, up to and including runtime construction.
    fn begin(&self, out: &mut String, extended: bool);

    /// Returns the output and closes the callable.
    fn end(&self, out: &mut String);

    /// Appends literal text. `compact` selects size-optimized quoting.
    fn literal(&self, out: &mut String, text: &str, compact: bool);

    fn variable(&self, out: &mut String, name: &Name, escape: bool);

    /// Opens a section whose body follows as a nested callable.
    fn open_section(&self, out: &mut String, name: &Name, inverted: bool);

    fn close_section(&self, out: &mut String);

    /// Opens the body of a named partial. `index` is unique per generate call.
    fn open_partial(&self, out: &mut String, name: &str, index: usize);

    /// Closes the body and registers it under `name`.
    fn close_partial(&self, out: &mut String, name: &str, index: usize);

    fn invoke_partial(&self, out: &mut String, name: &str);

    /// Extended form: opens the branch taken when no section is requested.
    fn open_whole(&self, out: &mut String);

    fn close_whole(&self, out: &mut String);

    /// Extended form: opens the branch taken when `section` is requested.
    fn open_case(&self, out: &mut String, section: &str);

    fn close_case(&self, out: &mut String);

    /// Extended form: closes the dispatch; unknown names render nothing.
    fn close_dispatch(&self, out: &mut String);
}

/// Generation-scoped state.
///
/// `registered` is shared by the template and every partial expanded while
/// generating it, so a recursive partial is registered exactly once.
struct Generator<'t, B: ?Sized> {
    template: &'t Template,
    backend: &'t B,
    compact: bool,
    registered: BTreeSet<&'t str>,
    preamble: String,
}

impl<'t, B: Backend + ?Sized> Generator<'t, B> {
    fn nodes(&mut self, nodes: &'t [Node], out: &mut String) {
        for node in nodes {
            self.node(node, out);
        }
    }

    fn node(&mut self, node: &'t Node, out: &mut String) {
        match node {
            Node::Root(children) => self.nodes(children, out),
            Node::Literal(text) => {
                if !text.is_empty() {
                    self.backend.literal(out, text, self.compact);
                }
            }
            Node::Variable { name, escape } => self.backend.variable(out, name, *escape),
            Node::Section { name, body } => {
                self.backend.open_section(out, name, false);
                self.nodes(body, out);
                self.backend.close_section(out);
            }
            Node::InvertedSection { name, body } => {
                self.backend.open_section(out, name, true);
                self.nodes(body, out);
                self.backend.close_section(out);
            }
            Node::Partial { name } => match self.template.partial(name) {
                Some(partial) if partial.is_recursive() => {
                    self.register(name, partial);
                    self.backend.invoke_partial(out, name);
                }
                Some(partial) => self.nodes(partial.root().children(), out),
                // compile() rejects unknown partials
                None => {}
            },
        }
    }

    /// Emits the registration of a recursive partial into the preamble the
    /// first time it is referenced.
    fn register(&mut self, name: &'t str, partial: &'t PartialTemplate) {
        if !self.registered.insert(name) {
            return;
        }
        let index = self.registered.len() - 1;
        trace!(partial = name, index, "registering recursive partial");

        let mut body = String::new();
        self.backend.open_partial(&mut body, name, index);
        self.nodes(partial.root().children(), &mut body);
        self.backend.close_partial(&mut body, name, index);
        self.preamble.push_str(&body);
    }
}

/// Sections reachable from `node` without crossing a partial, first
/// occurrence of each name in document order.
fn named_sections<'t>(node: &'t Node, found: &mut Vec<(String, &'t Node)>) {
    for child in node.children() {
        if let Node::Section { name, .. } | Node::InvertedSection { name, .. } = child {
            let key = name.to_string();
            if !found.iter().any(|(existing, _)| *existing == key) {
                found.push((key, child));
            }
        }
        named_sections(child, found);
    }
}

/// The first section named `wanted` in the template's own tree.
pub(crate) fn find_section<'t>(root: &'t Node, wanted: &str) -> Option<&'t Node> {
    let mut found = Vec::new();
    named_sections(root, &mut found);
    found
        .into_iter()
        .find_map(|(name, node)| (name == wanted).then_some(node))
}

/// Generates code for `template` with a custom backend.
pub fn generate_with<B: Backend + ?Sized>(template: &Template, backend: &B, extended: bool) -> String {
    let mut generator = Generator {
        template,
        backend,
        compact: template.options().compact_literals,
        registered: BTreeSet::new(),
        preamble: String::new(),
    };

    let mut body = String::new();
    if extended {
        backend.open_whole(&mut body);
        generator.node(template.root(), &mut body);
        backend.close_whole(&mut body);

        let mut sections = Vec::new();
        named_sections(template.root(), &mut sections);
        for (name, section) in sections {
            backend.open_case(&mut body, &name);
            generator.node(section, &mut body);
            backend.close_case(&mut body);
        }
        backend.close_dispatch(&mut body);
    } else {
        generator.node(template.root(), &mut body);
    }

    let mut out = String::with_capacity(generator.preamble.len() + body.len() + 128);
    backend.begin(&mut out, extended);
    out.push_str(&generator.preamble);
    out.push_str(&body);
    backend.end(&mut out);

    debug!(
        extended,
        registered = generator.registered.len(),
        bytes = out.len(),
        "generated template code"
    );
    out
}

/// Generates the code of `template` for `target`.
///
/// The simple form is a callable taking the data context and returning the
/// rendered text. The extended form takes an extra optional section name and,
/// when given one, renders only the first section with that name.
///
/// Recursive partials are registered once, ahead of the template body, and
/// invoked by name; every other partial is expanded inline.
pub fn generate(template: &Template, target: Target, extended: bool) -> String {
    match target {
        Target::Native => generate_with(template, &NativeBackend, extended),
        Target::Script => generate_with(template, &ScriptBackend, extended),
    }
}
