use std::collections::HashMap;

use tracing::debug;

use crate::{
    error::{Error, Result},
    interface::{Options, Target},
    parser,
    runtime::Context,
    template::Template,
};

/// `Engine` keeps a registry of named partial sources together with the
/// options every compile uses.
///
/// Templates compiled through the engine may reference any partial added to
/// it with `{{>name}}`.
///
/// # Examples
///
/// ```
/// use mustachec::{Engine, Options};
/// use serde_json::json;
///
/// let mut engine = Engine::new(Options::default());
/// engine.add_partial("greeting", "Hello, {{name}}!").unwrap();
///
/// let output = engine.render("{{>greeting}}", &json!({"name": "World"})).unwrap();
/// assert_eq!(output, "Hello, World!");
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct Engine {
    partials: HashMap<String, String>,
    options: Options,
}

impl Engine {
    /// Creates an engine with no partials.
    pub fn new(options: Options) -> Self {
        Self {
            partials: HashMap::new(),
            options,
        }
    }

    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Registers `source` under `name`.
    ///
    /// # Errors
    ///
    /// * `Err(Error::PartialExists)` if a partial with the given name already exists
    ///
    /// # Examples
    ///
    /// ```
    /// use mustachec::{Engine, Error, Options};
    ///
    /// let mut engine = Engine::new(Options::default());
    /// engine.add_partial("row", "<tr>{{.}}</tr>").unwrap();
    /// assert!(matches!(engine.add_partial("row", ""), Err(Error::PartialExists { .. })));
    /// ```
    pub fn add_partial<N: AsRef<str>, S: Into<String>>(&mut self, name: N, source: S) -> Result<()> {
        let name = name.as_ref();
        if self.partials.contains_key(name) {
            return Err(Error::PartialExists {
                name: name.to_string(),
            });
        }
        debug!(partial = name, "added partial");
        self.partials.insert(name.to_string(), source.into());
        Ok(())
    }

    pub fn has_partial(&self, name: &str) -> bool {
        self.partials.contains_key(name)
    }

    /// Compiles `source` against the registered partials.
    ///
    /// # Errors
    ///
    /// * `Err(Error::Syntax)` if the template or a partial it reaches is malformed
    pub fn compile(&self, source: &str) -> Result<Template> {
        Ok(parser::compile(source, &self.partials, self.options)?)
    }

    /// Compiles `source` and generates code for `target` in one step.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::compile`].
    pub fn generate(&self, source: &str, target: Target, extended: bool) -> Result<String> {
        Ok(self.compile(source)?.generate(target, extended))
    }

    /// Compiles `source` and renders it against `data` in process.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::compile`].
    pub fn render<V: Context>(&self, source: &str, data: &V) -> Result<String> {
        Ok(self.compile(source)?.render(data))
    }
}
