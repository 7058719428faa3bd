//! A Mustache template compiler.
//!
//! Templates are parsed once into a [`Template`], which can then be turned
//! into Rust or JavaScript source with [`Template::generate`], or rendered in
//! process with [`Template::render`].

mod ast;
mod codegen;
mod engine;
mod error;
mod interface;
mod parser;
mod runtime;
mod template;

// Public exports.
pub use ast::{Name, Node};
pub use codegen::{Backend, NativeBackend, ScriptBackend, generate, generate_with};
pub use engine::Engine;
pub use error::{Error, Result, SyntaxError, SyntaxErrorKind};
pub use interface::{Options, Partials, Target, UnknownVariant, WhitespaceMode};
pub use parser::compile;
pub use runtime::{Context, Key, Runtime, escape_xml, runtime_source};
pub use template::{PartialTemplate, Template};
