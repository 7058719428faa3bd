mod native;

pub use native::{Context, Key, Runtime, escape_xml};

use crate::interface::Target;

const NATIVE_SOURCE: &str = include_str!("native.rs");
const SCRIPT_SOURCE: &str = include_str!("script.js");

/// Source of the runtime that code generated for `target` calls into.
///
/// Native code expects `Runtime` (and `serde_json`) in scope, so the simplest
/// build places this source and the generated function in the same module.
/// Script code expects the global `MustacheRuntime` defined by the script
/// source to be loaded first.
pub const fn runtime_source(target: Target) -> &'static str {
    match target {
        Target::Native => NATIVE_SOURCE,
        Target::Script => SCRIPT_SOURCE,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    fn render(data: &Value, build: impl Fn(&mut Runtime<'_, Value>)) -> String {
        let mut runtime = Runtime::new(data);
        build(&mut runtime);
        runtime.finish()
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_runtime_sources_identify_backend() {
        assert!(runtime_source(Target::Native).contains("pub struct Runtime"));
        assert!(runtime_source(Target::Script).contains("MustacheRuntime"));
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_lookup_searches_stack_top_down() {
        let data = json!({"name": "outer", "inner": {"name": "inner"}, "only": "root"});
        let out = render(&data, |r| {
            r.variable("name", true);
            r.section(false, "inner", &|r| {
                r.literal("|");
                r.variable("name", true);
                r.literal("|");
                r.variable("only", true);
            });
        });
        assert_eq!(out, "outer|inner|root");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_null_member_falls_through_to_outer_value() {
        let data = json!({"name": "outer", "inner": {"name": null, "flag": null}, "flag": [1]});
        let out = render(&data, |r| {
            r.section(false, "inner", &|r| {
                r.variable("name", true);
                r.section(false, "flag", &|r| r.literal("+"));
            });
        });
        assert_eq!(out, "outer+");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_null_member_without_outer_value_is_missing() {
        let data = json!({"inner": {"name": null}});
        let out = render(&data, |r| {
            r.section(false, "inner", &|r| {
                r.literal("[");
                r.variable("name", true);
                r.literal("]");
                r.section(true, "name", &|r| r.literal("none"));
            });
        });
        assert_eq!(out, "[]none");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_whole_floats_render_as_integers() {
        let data = json!({"a": 1.0, "b": -3.0, "c": 1.5, "d": 0.0, "e": 42, "f": 1e20});
        let out = render(&data, |r| {
            for key in ["a", "b", "c", "d", "e", "f"] {
                r.variable(key, true);
                r.literal(" ");
            }
        });
        assert_eq!(out, "1 -3 1.5 0 42 100000000000000000000 ");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_dotted_lookup() {
        let data = json!({"a": {"b": {"c": 5}}, "x": {"y": 1}});
        let runtime = Runtime::new(&data);
        assert_eq!(runtime.lookup(&["a", "b", "c"]), Some(&json!(5)));
        assert_eq!(runtime.lookup(&["a", "missing", "c"]), None);
        assert_eq!(runtime.lookup(&["nope", "b"]), None);
        assert_eq!(runtime.lookup(&["x", "y", "z"]), None);
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_dotted_lookup_does_not_fall_back_to_stack() {
        let data = json!({"b": "root", "a": {"c": 1}});
        let out = render(&data, |r| {
            r.section(false, "a", &|r| r.variable(&["a", "b"], true));
        });
        assert_eq!(out, "");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_self_reference() {
        let data = json!({"list": [1, "two", true]});
        let out = render(&data, |r| {
            r.section(false, "list", &|r| {
                r.variable(".", true);
                r.literal(";");
            });
        });
        assert_eq!(out, "1;two;true;");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_escaping() {
        let data = json!({"v": "<b>&\"x\"</b>"});
        assert_eq!(
            render(&data, |r| r.variable("v", true)),
            "&lt;b&gt;&amp;&quot;x&quot;&lt;/b&gt;"
        );
        assert_eq!(render(&data, |r| r.variable("v", false)), "<b>&\"x\"</b>");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_zero_renders_as_text() {
        let data = json!({"n": 0, "f": 1.5, "b": false, "nil": null});
        let out = render(&data, |r| {
            r.variable("n", true);
            r.literal(",");
            r.variable("f", true);
            r.literal(",");
            r.variable("b", true);
            r.literal(",");
            r.variable("nil", true);
            r.literal(",");
            r.variable("missing", true);
        });
        assert_eq!(out, "0,1.5,false,,");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_falsey_values() {
        for value in [json!(null), json!(false), json!(0), json!(0.0), json!(""), json!([])] {
            assert!(value.is_falsey(), "{} should be falsey", value);
        }
        for value in [json!(true), json!(1), json!("0"), json!([0]), json!({})] {
            assert!(!value.is_falsey(), "{} should be truthy", value);
        }
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_inverted_section_pushes_falsey_value() {
        let data = json!({"flag": false});
        let out = render(&data, |r| {
            r.section(true, "flag", &|r| {
                r.literal("[");
                r.variable(".", true);
                r.literal("]");
            });
            r.section(true, "missing", &|r| r.literal("!"));
        });
        assert_eq!(out, "[false]!");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_section_over_object_runs_once() {
        let data = json!({"user": {"name": "Ann"}});
        let out = render(&data, |r| {
            r.section(false, "user", &|r| r.variable("name", true));
            r.section(true, "user", &|r| r.literal("never"));
        });
        assert_eq!(out, "Ann");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_named_partials() {
        let data = json!({"depth": [{"depth": [{"depth": []}]}]});
        let mut runtime = Runtime::new(&data);
        runtime.register_partial("level", |r| {
            r.literal("(");
            r.section(false, "depth", &|r| r.partial("level"));
            r.literal(")");
        });
        runtime.partial("level");
        runtime.partial("unregistered");
        assert_eq!(runtime.finish(), "((()))");
        assert_eq!(runtime.finish(), "((()))", "finish must be repeatable");
    }

    #[test]
    #[ntest::timeout(100)]
    fn test_array_text() {
        let data = json!({"list": ["a", 1, null]});
        assert_eq!(render(&data, |r| r.variable("list", true)), "a,1,");
    }
}
