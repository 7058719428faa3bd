use super::Backend;
use crate::ast::Name;

/// Emits a JavaScript function expression against the `MustacheRuntime` global.
///
/// The simple form is `function(_c){...}`; the extended form is
/// `function(_c,_s){...}` where `_s` names the section to render.
#[derive(Debug, Default, Copy, Clone)]
pub struct ScriptBackend;

/// Escapes `c` if a string literal cannot hold it verbatim. `delimiter` is
/// the quote character of the literal.
fn escape_char(out: &mut String, c: char, delimiter: char) -> bool {
    match c {
        '\r' => out.push_str("\\r"),
        '\n' => out.push_str("\\n"),
        '\t' => out.push_str("\\t"),
        '\u{8}' => out.push_str("\\b"),
        '\u{c}' => out.push_str("\\f"),
        '\\' => out.push_str("\\\\"),
        // Line terminators inside JS string literals before ES2019.
        '\u{2028}' => out.push_str("\\u2028"),
        '\u{2029}' => out.push_str("\\u2029"),
        c if c == delimiter => {
            out.push('\\');
            out.push(c);
        }
        c if c.is_control() => {
            emit!(out, "\\x{:02X}", c as u32);
        }
        _ => return false,
    }
    true
}

/// A double-quoted literal that is also safe to embed in HTML.
fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if escape_char(&mut out, c, '"') {
            continue;
        }
        match c {
            '<' => out.push_str("\\x3C"),
            '>' => out.push_str("\\x3E"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// The shortest literal for `text`, quoted with whichever quote character it
/// contains less of.
fn quote_compact(text: &str) -> String {
    let doubles = text.matches('"').count();
    let singles = text.matches('\'').count();
    let delimiter = if doubles > singles { '\'' } else { '"' };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(delimiter);
    for c in text.chars() {
        if !escape_char(&mut out, c, delimiter) {
            out.push(c);
        }
    }
    out.push(delimiter);
    out
}

fn key(name: &Name) -> String {
    if !name.is_dotted() {
        return quote(name.first());
    }
    let segments: Vec<String> = name.segments().iter().map(|s| quote(s)).collect();
    format!("[{}]", segments.join(","))
}

impl Backend for ScriptBackend {
    fn begin(&self, out: &mut String, extended: bool) {
        out.push_str(if extended { "function(_c,_s){" } else { "function(_c){" });
        out.push_str("var r=new MustacheRuntime(_c);");
    }

    fn end(&self, out: &mut String) {
        out.push_str("return r.get()}");
    }

    fn literal(&self, out: &mut String, text: &str, compact: bool) {
        let literal = if compact { quote_compact(text) } else { quote(text) };
        emit!(out, "r.l({});", literal);
    }

    fn variable(&self, out: &mut String, name: &Name, escape: bool) {
        if escape {
            emit!(out, "r.v({});", key(name));
        } else {
            emit!(out, "r.v({},1);", key(name));
        }
    }

    fn open_section(&self, out: &mut String, name: &Name, inverted: bool) {
        emit!(out, "r.s({},{},function(){{", u8::from(inverted), key(name));
    }

    fn close_section(&self, out: &mut String) {
        out.push_str("});");
    }

    fn open_partial(&self, out: &mut String, name: &str, _index: usize) {
        emit!(out, "r.d({},function(){{", quote(name));
    }

    fn close_partial(&self, out: &mut String, _name: &str, _index: usize) {
        out.push_str("});");
    }

    fn invoke_partial(&self, out: &mut String, name: &str) {
        emit!(out, "r.p({});", quote(name));
    }

    fn open_whole(&self, out: &mut String) {
        out.push_str("if(_s==null){");
    }

    fn close_whole(&self, out: &mut String) {
        out.push_str("}else switch(_s){");
    }

    fn open_case(&self, out: &mut String, section: &str) {
        emit!(out, "case {}:", quote(section));
    }

    fn close_case(&self, out: &mut String) {
        out.push_str("break;");
    }

    fn close_dispatch(&self, out: &mut String) {
        out.push('}');
    }
}
