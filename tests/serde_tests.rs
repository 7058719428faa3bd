#[cfg(feature = "serde")]
mod serde_tests {
    use std::collections::HashMap;

    use mustachec::{
        Engine, Error, Options, SyntaxError, Target, Template, WhitespaceMode, compile,
    };
    use serde_json::json;

    #[test]
    fn test_whitespace_mode_serialization() {
        let mode = WhitespaceMode::Collapse;
        let serialized = serde_json::to_string(&mode).unwrap();
        assert_eq!(serialized, r#""Collapse""#);

        let deserialized: WhitespaceMode = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, mode);
    }

    #[test]
    fn test_options_serialization() {
        let options = Options::default()
            .with_whitespace(WhitespaceMode::Strict)
            .with_compact_literals(true);
        let serialized = serde_json::to_string(&options).unwrap();
        assert_eq!(serialized, r#"{"whitespace":"Strict","compact_literals":true}"#);
        assert_eq!(serde_json::from_str::<Options>(&serialized).unwrap(), options);

        // Missing fields fall back to their defaults.
        let partial: Options = serde_json::from_str(r#"{"compact_literals":true}"#).unwrap();
        assert_eq!(partial.whitespace, WhitespaceMode::Preserve);
        assert!(partial.compact_literals);
    }

    #[test]
    fn test_template_serialization() {
        let partials = HashMap::from([("node", "{{name}}({{#kids}}{{>node}}{{/kids}})")]);
        let template = compile("<{{>node}}>", &partials, Options::default()).unwrap();

        // Serialize the template
        let serialized = serde_json::to_string(&template).unwrap();

        // Deserialize back to a template
        let deserialized: Template = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, template);

        // Both templates should render and generate the same output
        let data = json!({"name": "a", "kids": [{"name": "b", "kids": []}]});
        assert_eq!(deserialized.render(&data), template.render(&data));
        assert_eq!(template.render(&data), "<a(b())>");
        for target in [Target::Native, Target::Script] {
            assert_eq!(
                deserialized.generate(target, true),
                template.generate(target, true)
            );
        }
    }

    #[test]
    fn test_error_serialization() {
        let err = compile("{{#a}}", &HashMap::<String, String>::new(), Options::default()).unwrap_err();
        let serialized = serde_json::to_string(&err).unwrap();
        let deserialized: SyntaxError = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, err);
        assert_eq!(deserialized.to_string(), err.to_string());

        let err = Error::PartialExists {
            name: "p".to_string(),
        };
        let deserialized: Error = serde_json::from_str(&serde_json::to_string(&err).unwrap()).unwrap();
        assert_eq!(deserialized, err);
    }

    #[test]
    fn test_engine_serialization() {
        let mut engine = Engine::new(Options::default().with_whitespace(WhitespaceMode::Collapse));
        engine.add_partial("greeting", "Hello,   {{name}}!").unwrap();

        // Serialize the engine
        let serialized = serde_json::to_string(&engine).unwrap();

        // Deserialize back to an engine
        let deserialized: Engine = serde_json::from_str(&serialized).unwrap();

        let data = json!({"name": "World"});
        assert_eq!(
            engine.render("{{>greeting}}", &data).unwrap(),
            deserialized.render("{{>greeting}}", &data).unwrap()
        );
        assert_eq!(
            deserialized.render("{{>greeting}}", &data).unwrap(),
            "Hello, World!"
        );
    }
}
