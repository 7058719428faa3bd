use std::collections::BTreeMap;

use crate::{
    ast::{Name, Node},
    codegen,
    interface::{Options, Target},
    runtime::{Context, Key, Runtime},
};

/// A partial reached from a template, parsed once per compile.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialTemplate {
    root: Node,
    recursive: bool,
}

impl PartialTemplate {
    pub(crate) const fn new(root: Node, recursive: bool) -> Self {
        Self { root, recursive }
    }

    pub const fn root(&self) -> &Node {
        &self.root
    }

    /// True when the partial can reach itself through partial references, in
    /// which case it is registered once and invoked by name instead of being
    /// expanded inline.
    pub const fn is_recursive(&self) -> bool {
        self.recursive
    }
}

/// A compiled template: the syntax tree of the template itself plus every
/// partial it reaches.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// use mustachec::{Options, compile};
/// use serde_json::json;
///
/// let partials = HashMap::from([("user", "<b>{{name}}</b>")]);
/// let template = compile("{{#users}}{{>user}}{{/users}}", &partials, Options::default()).unwrap();
///
/// let data = json!({"users": [{"name": "Ann"}, {"name": "Bo"}]});
/// assert_eq!(template.render(&data), "<b>Ann</b><b>Bo</b>");
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    root: Node,
    partials: BTreeMap<String, PartialTemplate>,
    options: Options,
}

impl Template {
    pub(crate) const fn new(
        root: Node,
        partials: BTreeMap<String, PartialTemplate>,
        options: Options,
    ) -> Self {
        Self {
            root,
            partials,
            options,
        }
    }

    /// The `Root` node of the top-level template.
    pub const fn root(&self) -> &Node {
        &self.root
    }

    pub const fn options(&self) -> &Options {
        &self.options
    }

    pub fn partial(&self, name: &str) -> Option<&PartialTemplate> {
        self.partials.get(name)
    }

    pub fn partial_names(&self) -> impl Iterator<Item = &str> {
        self.partials.keys().map(String::as_str)
    }

    /// Emits code for `target`. See [`codegen::generate`].
    pub fn generate(&self, target: Target, extended: bool) -> String {
        codegen::generate(self, target, extended)
    }

    /// Renders the whole template against `data` in process.
    pub fn render<V: Context>(&self, data: &V) -> String {
        self.render_section(data, None)
    }

    /// Renders against `data`, descending into the first section named
    /// `section` when one is given. This is what the extended form of the
    /// generated code does.
    pub fn render_section<V: Context>(&self, data: &V, section: Option<&str>) -> String {
        let mut runtime = Runtime::new(data);
        self.register_recursive_partials(&mut runtime);

        match section {
            None => render_nodes(self, self.root.children(), &mut runtime),
            Some(wanted) => {
                if let Some(node) = codegen::find_section(&self.root, wanted) {
                    render_node(self, node, &mut runtime);
                }
            }
        }
        runtime.finish()
    }

    /// Registers every recursive partial up front so that invocations never
    /// run ahead of their registration.
    fn register_recursive_partials<'a, V: Context>(&'a self, runtime: &mut Runtime<'a, V>) {
        for (name, partial) in self.partials.iter().filter(|(_, p)| p.recursive) {
            let body = partial.root.children();
            runtime.register_partial(name, move |r| render_nodes(self, body, r));
        }
    }
}

fn with_key<R>(name: &Name, f: impl FnOnce(Key<'_>) -> R) -> R {
    if name.is_dotted() {
        let segments: Vec<&str> = name.segments().iter().map(String::as_str).collect();
        f(Key::Path(&segments))
    } else {
        f(Key::Name(name.first()))
    }
}

fn render_nodes<'a, V: Context>(template: &'a Template, nodes: &'a [Node], runtime: &mut Runtime<'a, V>) {
    for node in nodes {
        render_node(template, node, runtime);
    }
}

/// Drives the runtime with the same instructions the code generator emits for
/// `node`.
fn render_node<'a, V: Context>(template: &'a Template, node: &'a Node, runtime: &mut Runtime<'a, V>) {
    match node {
        Node::Root(children) => render_nodes(template, children, runtime),
        Node::Literal(text) => runtime.literal(text),
        Node::Variable { name, escape } => {
            with_key(name, |key| runtime.variable(key, *escape));
        }
        Node::Section { name, body } | Node::InvertedSection { name, body } => {
            let inverted = matches!(node, Node::InvertedSection { .. });
            with_key(name, |key| {
                runtime.section(inverted, key, &|r| render_nodes(template, body, r));
            });
        }
        Node::Partial { name } => match template.partial(name) {
            Some(partial) if partial.recursive => runtime.partial(name),
            Some(partial) => render_nodes(template, partial.root.children(), runtime),
            None => {}
        },
    }
}
