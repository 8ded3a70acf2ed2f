// Integration tests for knot-core using test fixtures
use knot_core::{parse_document, KnotError, NodeType, ValidateError};
use std::fs;
use std::path::PathBuf;

fn get_test_file_path(subdir: &str, filename: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join(subdir)
        .join(filename)
}

fn read_test_file(subdir: &str, filename: &str) -> String {
    let path = get_test_file_path(subdir, filename);
    fs::read_to_string(&path).unwrap_or_else(|_| panic!("Failed to read test file: {:?}", path))
}

// Fixtures that must parse and validate
mod ok_tests {
    use super::*;

    #[test]
    fn test_primitives() {
        let source = read_test_file("ok", "primitives.knot");
        let doc = parse_document(&source, "primitives.knot").unwrap();
        let root = doc.root();

        assert_eq!(root.field("count").unwrap().as_int().unwrap(), 42);
        assert_eq!(root.field("negative").unwrap().as_int().unwrap(), -7);
        assert_eq!(root.field("explicit_plus").unwrap().as_int().unwrap(), 3);
        assert_eq!(root.field("ratio").unwrap().as_float().unwrap(), 0.25);
        assert_eq!(root.field("leading_dot").unwrap().as_float().unwrap(), 0.5);
        assert_eq!(root.field("scientific").unwrap().node_type(), NodeType::Float);
        assert_eq!(root.field("tiny").unwrap().as_float().unwrap(), 1e-9);
        assert!(root.field("enabled").unwrap().as_bool().unwrap());
        assert!(!root.field("disabled").unwrap().as_bool().unwrap());
        assert_eq!(root.field("name").unwrap().as_str().unwrap(), "knot");
        assert_eq!(
            root.field("escaped").unwrap().as_str().unwrap(),
            r#"a "quoted" word\"#
        );
        assert!(doc.to_json().is_ok(), "Should serialize to JSON");
    }

    #[test]
    fn test_collections() {
        let source = read_test_file("ok", "collections.knot");
        let doc = parse_document(&source, "collections.knot").unwrap();
        let root = doc.root();

        assert_eq!(root.field("empty_map").unwrap().size().unwrap(), 0);
        assert_eq!(root.field("empty_seq").unwrap().size().unwrap(), 0);
        let matrix = root.field("matrix").unwrap();
        assert_eq!(matrix.get(1).unwrap().get(0).unwrap().as_int().unwrap(), 3);
        assert_eq!(
            root.field("nested")
                .unwrap()
                .field("inner")
                .unwrap()
                .field("deepest")
                .unwrap()
                .as_str()
                .unwrap(),
            "here"
        );
        let mixed: Vec<NodeType> = root
            .field("mixed")
            .unwrap()
            .values()
            .unwrap()
            .map(|n| n.node_type())
            .collect();
        assert_eq!(
            mixed,
            vec![
                NodeType::Int,
                NodeType::String,
                NodeType::Float,
                NodeType::Boolean,
                NodeType::Map
            ]
        );
    }

    #[test]
    fn test_objects() {
        let source = read_test_file("ok", "objects.knot");
        let doc = parse_document(&source, "objects.knot").unwrap();
        let root = doc.root();

        let point = root.get(0).unwrap();
        assert_eq!(point.node_type(), NodeType::ObjMap);
        assert_eq!(point.class_name().unwrap(), "Point");
        assert_eq!(point.field("y").unwrap().as_int().unwrap(), 2);

        let pair = root.get(1).unwrap();
        assert_eq!(pair.node_type(), NodeType::ObjSequence);
        assert_eq!(pair.get(1).unwrap().as_str().unwrap(), "right");

        let unit = root.get(2).unwrap();
        assert_eq!(unit.node_type(), NodeType::ObjMap);
        assert_eq!(unit.size().unwrap(), 0);

        let line = root.get(3).unwrap();
        assert_eq!(
            line.field("to").unwrap().field("x").unwrap().as_int().unwrap(),
            3
        );
    }

    #[test]
    fn test_anchors_resolve_to_json() {
        let source = read_test_file("ok", "anchors.knot");
        let doc = parse_document(&source, "anchors.knot").unwrap();
        assert_eq!(doc.anchors().len(), 3);

        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        let defaults = serde_json::json!({ "retries": 3, "timeout": 30 });
        let origin = serde_json::json!({ "Point": { "x": 0, "y": 0 } });
        assert_eq!(
            json,
            serde_json::json!({
                "defaults": defaults,
                "primary": { "settings": defaults, "host": "a.example" },
                "backup": { "settings": defaults, "host": "b.example" },
                "port": 8080,
                "ports": [8080, 8080],
                "shapes": [origin, origin]
            })
        );
    }

    #[test]
    fn test_reference_nodes_stay_references() {
        let source = read_test_file("ok", "anchors.knot");
        let doc = parse_document(&source, "anchors.knot").unwrap();
        let settings = doc
            .root()
            .field("backup")
            .unwrap()
            .field("settings")
            .unwrap();
        assert_eq!(settings.node_type(), NodeType::Link);
        assert_eq!(settings.target(), Some("defaults"));
        assert_eq!(settings.resolve().unwrap().node_type(), NodeType::Map);
        assert_eq!(settings.field("retries").unwrap().as_int().unwrap(), 3);
    }

    #[test]
    fn test_reference_before_its_anchor() {
        let doc = parse_document("[ *a, &a 5 ]", "forward.knot").unwrap();
        let reference = doc.root().get(0).unwrap();
        assert_eq!(reference.node_type(), NodeType::Reference);
        assert_eq!(reference.as_int().unwrap(), 5);

        let doc = parse_document("{ early: @late, late: !Box(1) &late }", "forward.knot").unwrap();
        let link = doc.root().field("early").unwrap();
        assert_eq!(link.class_name().unwrap(), "Box");
        assert_eq!(link.get(0).unwrap().as_int().unwrap(), 1);
    }
}

// Fixtures that must be rejected
mod bad_tests {
    use super::*;

    #[test]
    fn test_cycle() {
        let source = read_test_file("bad", "cycle.knot");
        match parse_document(&source, "cycle.knot") {
            Err(KnotError::Validate(ValidateError::Cycle { anchor, path })) => {
                assert_eq!(anchor, "a");
                assert_eq!(path, "a -> b -> a");
            }
            other => panic!("Expected a cycle error, got {other:?}"),
        }
    }

    #[test]
    fn test_unterminated_string() {
        let source = read_test_file("bad", "unterminated.knot");
        let err = parse_document(&source, "unterminated.knot").unwrap_err();
        assert!(matches!(err, KnotError::Lex(_)));
        assert_eq!(err.line(), Some(2));
        assert_eq!(err.to_string(), "line 2: unterminated string");
    }

    #[test]
    fn test_aliased_reference() {
        let source = read_test_file("bad", "aliased.knot");
        let err = parse_document(&source, "aliased.knot").unwrap_err();
        assert_eq!(err.to_string(), "line 1: reference or link is aliased");
    }

    #[test]
    fn test_missing_colon() {
        let source = read_test_file("bad", "missing_colon.knot");
        let err = parse_document(&source, "missing_colon.knot").unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 2: unexpected token integer, expected `:`"
        );
    }
}
