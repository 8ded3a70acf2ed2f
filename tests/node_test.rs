use knot_core::{NodeError, NodeType, ParseOptions, Parser};
use std::io::{Seek, SeekFrom, Write};

#[test]
fn test_from_reader_file() {
    let mut file = tempfile::tempfile().unwrap();
    writeln!(file, "# servers").unwrap();
    writeln!(file, "{{ hosts: [\"a\", \"b\"], port: 80 }}").unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let options = ParseOptions::new().with_source_name("servers.knot");
    let parser = Parser::from_reader(file, options).unwrap();
    assert_eq!(parser.options().source_name, "servers.knot");
    let doc = parser.get_document().unwrap();
    assert_eq!(doc.root().line(), 2);
    assert_eq!(doc.root().field("hosts").unwrap().size().unwrap(), 2);
    assert_eq!(doc.root().field("port").unwrap().as_int().unwrap(), 80);
}

#[test]
fn test_dump_format() {
    let doc = Parser::new(r#"{ b: [&x "s", *x], a: !P(k: 1.5) }"#)
        .into_document()
        .unwrap();
    let expected = "\
Map :
 ObjMap \"P\" :
  Float 1.5
 Sequence :
  String \"s\"
  Reference ->x
";
    assert_eq!(doc.to_string(), expected);
    assert_eq!(doc.root().dump(0), expected);
    assert_eq!(
        doc.root().field("b").unwrap().dump(2),
        "  Sequence :\n   String \"s\"\n   Reference ->x\n"
    );
}

#[test]
fn test_accessor_errors() {
    let doc = Parser::new("{ list: [1], text: \"t\" }").into_document().unwrap();
    let root = doc.root();

    assert_eq!(
        root.field("list").unwrap().get(3).unwrap_err(),
        NodeError::OutOfBounds { index: 3, size: 1 }
    );
    assert_eq!(
        root.field("text").unwrap().as_int().unwrap_err(),
        NodeError::TypeMismatch {
            operation: "as_int",
            found: NodeType::String
        }
    );
    assert!(matches!(root.get(0), Err(NodeError::TypeMismatch { .. })));
    assert!(matches!(
        root.field("missing"),
        Err(NodeError::InvalidAccess { .. })
    ));
}

#[test]
fn test_entries_and_values_agree() {
    let doc = Parser::new("{ z: 26, a: 1, m: 13 }").into_document().unwrap();
    let root = doc.root();
    let keys: Vec<&str> = root.entries().unwrap().map(|(key, _)| key).collect();
    assert_eq!(keys, vec!["a", "m", "z"]);
    let values: Vec<i64> = root.values().unwrap().map(|n| n.as_int().unwrap()).collect();
    assert_eq!(values, vec![1, 13, 26]);
}

#[test]
fn test_tokens_after_parse() {
    let parser = Parser::new("[1, *a]");
    parser.get_document().unwrap();
    let texts: Vec<&str> = parser.tokens().iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["[", "1", ",", "*", "a", "]", ""]);
}
