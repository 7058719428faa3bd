use super::Backend;
use crate::ast::Name;

/// Emits a Rust function against the native [`Runtime`](crate::Runtime).
///
/// The simple form is
/// `pub fn render(c: &serde_json::Value) -> String`; the extended form adds a
/// `section: Option<&str>` parameter.
#[derive(Debug, Default, Copy, Clone)]
pub struct NativeBackend;

/// A string literal that escapes every character a reader could misread.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c if c.is_ascii_control() => {
                emit!(out, "\\x{:02X}", c as u32);
            }
            c if c.is_control() => {
                emit!(out, "\\u{{{:X}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// The shortest literal for `text`: a plain string when nothing needs
/// escaping, otherwise a raw string with just enough hashes.
fn quote_compact(text: &str) -> String {
    if text.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
        return quote(text);
    }
    if !text.contains(['"', '\\']) {
        return format!("\"{}\"", text);
    }

    // A raw string ends at the first quote followed by as many hashes as it
    // was opened with.
    let mut hashes = 0;
    for (i, _) in text.match_indices('"') {
        let after = text.get(i + 1..).unwrap_or_default();
        let run = after.bytes().take_while(|&b| b == b'#').count();
        hashes = hashes.max(run + 1);
    }
    let fence = "#".repeat(hashes);
    format!("r{fence}\"{text}\"{fence}")
}

fn key(name: &Name) -> String {
    if !name.is_dotted() {
        return quote(name.first());
    }
    let segments: Vec<String> = name.segments().iter().map(|s| quote(s)).collect();
    format!("&[{}]", segments.join(", "))
}

impl Backend for NativeBackend {
    fn begin(&self, out: &mut String, extended: bool) {
        if extended {
            out.push_str("pub fn render(c: &serde_json::Value, section: Option<&str>) -> String {\n");
        } else {
            out.push_str("pub fn render(c: &serde_json::Value) -> String {\n");
        }
        out.push_str("let mut r = Runtime::new(c);\n");
    }

    fn end(&self, out: &mut String) {
        out.push_str("r.finish()\n}\n");
    }

    fn literal(&self, out: &mut String, text: &str, compact: bool) {
        let literal = if compact { quote_compact(text) } else { quote(text) };
        emitln!(out, "r.literal({});", literal);
    }

    fn variable(&self, out: &mut String, name: &Name, escape: bool) {
        emitln!(out, "r.variable({}, {});", key(name), escape);
    }

    fn open_section(&self, out: &mut String, name: &Name, inverted: bool) {
        emitln!(out, "r.section({}, {}, &|r| {{", inverted, key(name));
    }

    fn close_section(&self, out: &mut String) {
        out.push_str("});\n");
    }

    fn open_partial(&self, out: &mut String, _name: &str, index: usize) {
        emitln!(
            out,
            "fn partial_{}(r: &mut Runtime<'_, serde_json::Value>) {{",
            index
        );
    }

    fn close_partial(&self, out: &mut String, name: &str, index: usize) {
        emitln!(out, "}}\nr.register_partial({}, partial_{});", quote(name), index);
    }

    fn invoke_partial(&self, out: &mut String, name: &str) {
        emitln!(out, "r.partial({});", quote(name));
    }

    fn open_whole(&self, out: &mut String) {
        out.push_str("match section {\nNone => {\n");
    }

    fn close_whole(&self, out: &mut String) {
        out.push_str("}\n");
    }

    fn open_case(&self, out: &mut String, section: &str) {
        emitln!(out, "Some({}) => {{", quote(section));
    }

    fn close_case(&self, out: &mut String) {
        out.push_str("}\n");
    }

    fn close_dispatch(&self, out: &mut String) {
        out.push_str("Some(_) => {}\n}\n");
    }
}
