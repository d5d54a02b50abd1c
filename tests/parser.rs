use limberjson::{
    get_location, parse, parse_tree, strip_comments, strip_comments_with, visit, JsonVisitor,
    NodeType, ParseError, ParseErrorCode, ParseOptions, PathSegment, TokenSpan, Value,
};
use serde_json::json;

fn parse_ok(text: &str) -> Value {
    let mut errors = Vec::new();
    let value = parse(text, &mut errors, &ParseOptions::default());
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
    value.expect("a value")
}

fn parse_with_errors(text: &str, options: &ParseOptions) -> (Option<Value>, Vec<ParseError>) {
    let mut errors = Vec::new();
    let value = parse(text, &mut errors, options);
    (value, errors)
}

#[test]
fn parses_plain_values() {
    assert_eq!(parse_ok("null"), Value::Null);
    assert_eq!(parse_ok("true"), json!(true));
    assert_eq!(parse_ok("false"), json!(false));
    assert_eq!(parse_ok("42"), json!(42));
    assert_eq!(parse_ok("-1.5"), json!(-1.5));
    assert_eq!(parse_ok("1e3"), json!(1000.0));
    assert_eq!(parse_ok("\"hi\""), json!("hi"));
}

#[test]
fn parses_nested_structures() {
    let value = parse_ok("{\"a\": [1, {\"b\": null}], \"c\": \"d\"}");
    assert_eq!(value, json!({"a": [1, {"b": null}], "c": "d"}));
}

#[test]
fn comments_are_transparent() {
    let value = parse_ok("{ \"foo\": /*hello*/true }");
    assert_eq!(value, json!({"foo": true}));

    let value = parse_ok("// header\n[1, // one\n 2 /* two */]");
    assert_eq!(value, json!([1, 2]));
}

#[test]
fn duplicate_keys_keep_the_last_value() {
    let value = parse_ok("{\"a\": 1, \"a\": 2}");
    assert_eq!(value, json!({"a": 2}));
}

#[test]
fn object_keys_keep_document_order() {
    let value = parse_ok("{\"z\": 1, \"a\": 2, \"m\": 3}");
    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn trailing_comma_is_an_error_by_default() {
    let (value, errors) = parse_with_errors("[1,2,]", &ParseOptions::default());
    assert_eq!(value, Some(json!([1, 2])));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ParseErrorCode::ValueExpected);
    assert_eq!(errors[0].offset, 5);
}

#[test]
fn trailing_comma_can_be_allowed() {
    let options = ParseOptions {
        allow_trailing_comma: true,
        ..ParseOptions::default()
    };
    let (value, errors) = parse_with_errors("[1,2,]", &options);
    assert_eq!(value, Some(json!([1, 2])));
    assert!(errors.is_empty());

    let (value, errors) = parse_with_errors("{\"a\": 1,}", &options);
    assert_eq!(value, Some(json!({"a": 1})));
    assert!(errors.is_empty());
}

#[test]
fn comments_can_be_disallowed() {
    let options = ParseOptions {
        disallow_comments: true,
        ..ParseOptions::default()
    };
    let (value, errors) = parse_with_errors("[1] // tail", &options);
    assert_eq!(value, Some(json!([1])));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ParseErrorCode::InvalidCommentToken);
    assert_eq!(errors[0].offset, 4);
    assert_eq!(errors[0].length, 7);
}

#[test]
fn empty_content_is_an_error_by_default() {
    let (value, errors) = parse_with_errors("  \n ", &ParseOptions::default());
    assert_eq!(value, None);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ParseErrorCode::ValueExpected);

    let options = ParseOptions {
        allow_empty_content: true,
        ..ParseOptions::default()
    };
    let (value, errors) = parse_with_errors("  \n ", &options);
    assert_eq!(value, None);
    assert!(errors.is_empty());
}

#[test]
fn missing_value_after_colon() {
    let (value, errors) = parse_with_errors("{\"a\": }", &ParseOptions::default());
    assert_eq!(value, Some(json!({})));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ParseErrorCode::ValueExpected);
    assert_eq!(errors[0].offset, 6);
    assert_eq!(errors[0].line, 0);
    assert_eq!(errors[0].column, 6);
}

#[test]
fn missing_colon_is_recovered() {
    let (value, errors) = parse_with_errors("{\"a\" 1, \"b\": 2}", &ParseOptions::default());
    assert_eq!(value, Some(json!({"b": 2})));
    assert!(errors
        .iter()
        .any(|e| e.code == ParseErrorCode::ColonExpected));
}

#[test]
fn missing_comma_between_properties() {
    let (value, errors) = parse_with_errors("{\"a\": 1 \"b\": 2}", &ParseOptions::default());
    assert_eq!(value, Some(json!({"a": 1, "b": 2})));
    assert!(errors
        .iter()
        .any(|e| e.code == ParseErrorCode::CommaExpected));
}

#[test]
fn unclosed_containers_are_reported() {
    let (value, errors) = parse_with_errors("{\"a\": [1, 2", &ParseOptions::default());
    assert_eq!(value, Some(json!({"a": [1, 2]})));
    let codes: Vec<ParseErrorCode> = errors.iter().map(|e| e.code).collect();
    assert!(codes.contains(&ParseErrorCode::CloseBracketExpected));
    assert!(codes.contains(&ParseErrorCode::CloseBraceExpected));
}

#[test]
fn content_after_the_value_is_reported() {
    let (value, errors) = parse_with_errors("{} {}", &ParseOptions::default());
    assert_eq!(value, Some(json!({})));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ParseErrorCode::EndOfFileExpected);
}

#[test]
fn scan_errors_become_parse_errors() {
    let (value, errors) = parse_with_errors("[\"a\u{1}b\", 1.]", &ParseOptions::default());
    assert!(value.is_some());
    let codes: Vec<ParseErrorCode> = errors.iter().map(|e| e.code).collect();
    assert!(codes.contains(&ParseErrorCode::InvalidCharacter));
    assert!(codes.contains(&ParseErrorCode::UnexpectedEndOfNumber));
}

#[derive(Default)]
struct EventLog {
    events: Vec<String>,
    literal_paths: Vec<Vec<PathSegment>>,
    skip_objects: bool,
}

impl JsonVisitor for EventLog {
    fn on_object_begin(&mut self, span: TokenSpan, path: &[PathSegment]) -> bool {
        self.events.push(format!("obj-begin@{}", span.offset));
        if self.skip_objects && !path.is_empty() {
            return false;
        }
        true
    }

    fn on_object_property(&mut self, name: &str, _span: TokenSpan, _path: &[PathSegment]) {
        self.events.push(format!("prop:{}", name));
    }

    fn on_object_end(&mut self, span: TokenSpan) {
        self.events.push(format!("obj-end@{}", span.offset));
    }

    fn on_array_begin(&mut self, span: TokenSpan, _path: &[PathSegment]) -> bool {
        self.events.push(format!("arr-begin@{}", span.offset));
        true
    }

    fn on_array_end(&mut self, span: TokenSpan) {
        self.events.push(format!("arr-end@{}", span.offset));
    }

    fn on_literal_value(&mut self, value: Value, _span: TokenSpan, path: &[PathSegment]) {
        self.events.push(format!("lit:{}", value));
        self.literal_paths.push(path.to_vec());
    }

    fn on_separator(&mut self, separator: char, _span: TokenSpan) {
        self.events.push(format!("sep:{}", separator));
    }

    fn on_comment(&mut self, span: TokenSpan) {
        self.events.push(format!("comment@{}", span.offset));
    }

    fn on_error(&mut self, code: ParseErrorCode, _span: TokenSpan) {
        self.events.push(format!("err:{}", code.name()));
    }
}

#[test]
fn visit_reports_events_in_document_order() {
    let mut log = EventLog::default();
    visit(
        "{\"a\": [1, true], // tail\n\"b\": 2}",
        &mut log,
        &ParseOptions::default(),
    );
    assert_eq!(
        log.events,
        vec![
            "obj-begin@0",
            "prop:a",
            "sep::",
            "arr-begin@6",
            "lit:1",
            "sep:,",
            "lit:true",
            "arr-end@14",
            "sep:,",
            "comment@17",
            "prop:b",
            "sep::",
            "lit:2",
            "obj-end@31",
        ]
    );
}

#[test]
fn visit_paths_track_properties_and_indices() {
    let mut log = EventLog::default();
    visit(
        "{\"a\": [1, {\"b\": 2}]}",
        &mut log,
        &ParseOptions::default(),
    );
    assert_eq!(
        log.literal_paths,
        vec![
            vec![PathSegment::Name("a".into()), PathSegment::Index(0)],
            vec![
                PathSegment::Name("a".into()),
                PathSegment::Index(1),
                PathSegment::Name("b".into()),
            ],
        ]
    );
}

#[test]
fn returning_false_skips_the_subtree_but_ends_still_fire() {
    let mut log = EventLog {
        skip_objects: true,
        ..EventLog::default()
    };
    visit(
        "[{\"a\": 1}, 2]",
        &mut log,
        &ParseOptions::default(),
    );
    assert_eq!(
        log.events,
        vec![
            "arr-begin@0",
            "obj-begin@1",
            "obj-end@8",
            "sep:,",
            "lit:2",
            "arr-end@12",
        ]
    );
}

#[test]
fn location_inside_a_property_key() {
    let text = "{ \"foo\": {\"bar\": 1, \"car\": 5 } }";
    let offset = text.find("car").unwrap() + 1;
    let location = get_location(text, offset);
    assert_eq!(
        location.path,
        vec![PathSegment::Name("foo".into()), PathSegment::Name("car".into())]
    );
    assert!(location.is_at_property_key);
    let previous = location.previous_node.unwrap();
    assert_eq!(previous.node_type, NodeType::Property);
    assert_eq!(previous.value, Some(json!("car")));
}

#[test]
fn location_after_a_literal_value() {
    let text = "{\"a\": 1}";
    let location = get_location(text, 7);
    assert_eq!(location.path, vec![PathSegment::Name("a".into())]);
    assert!(!location.is_at_property_key);
    let previous = location.previous_node.unwrap();
    assert_eq!(previous.node_type, NodeType::Number);
    assert_eq!(previous.offset, 6);
    assert_eq!(previous.length, 1);
}

#[test]
fn location_in_array_elements() {
    let text = "[\"x\", \"y\", \"z\"]";
    let location = get_location(text, text.find("\"z\"").unwrap() + 1);
    assert_eq!(location.path, vec![PathSegment::Index(2)]);
    assert!(!location.is_at_property_key);
}

#[test]
fn location_matches_wildcards() {
    let text = "{\"servers\": [{\"port\": 8080}]}";
    let location = get_location(text, text.find("8080").unwrap());
    assert_eq!(
        location.path,
        vec![
            PathSegment::Name("servers".into()),
            PathSegment::Index(0),
            PathSegment::Name("port".into()),
        ]
    );
    assert!(location.matches(&["servers".into(), "*".into(), "port".into()]));
    assert!(location.matches(&["**".into(), "port".into()]));
    assert!(location.matches(&["servers".into(), "**".into()]));
    assert!(!location.matches(&["servers".into(), "port".into()]));
}

#[test]
fn tree_nodes_preserve_spans() {
    let text = "{\"a\": [1, \"x\"]}";
    let mut errors = Vec::new();
    let tree = parse_tree(text, &mut errors, &ParseOptions::default());
    assert!(errors.is_empty());

    let root = tree.root().unwrap();
    let root_node = tree.node(root);
    assert_eq!(root_node.node_type, NodeType::Object);
    assert_eq!(root_node.offset, 0);
    assert_eq!(root_node.length, text.len());

    let property = tree.children(root)[0];
    let property_node = tree.node(property);
    assert_eq!(property_node.node_type, NodeType::Property);
    assert_eq!(property_node.offset, 1);
    // spans from the key start through the end of the array value
    assert_eq!(property_node.length, 13);
    assert_eq!(property_node.colon_offset, Some(4));
    assert_eq!(tree.property_name(property), Some("a"));

    let array = tree.children(property)[1];
    let array_node = tree.node(array);
    assert_eq!(array_node.node_type, NodeType::Array);
    assert_eq!(array_node.offset, 6);
    assert_eq!(array_node.length, 8);

    // children are contained in their parents and strictly ordered
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let node = tree.node(id);
        let mut previous_end = node.offset;
        for &child in tree.children(id) {
            let child_node = tree.node(child);
            assert!(child_node.offset >= previous_end);
            assert!(child_node.offset + child_node.length <= node.offset + node.length);
            previous_end = child_node.offset + child_node.length;
            stack.push(child);
        }
    }
}

#[test]
fn tree_lookup_by_path_and_offset() {
    let text = "{\"a\": {\"b\": [true, false]}}";
    let mut errors = Vec::new();
    let tree = parse_tree(text, &mut errors, &ParseOptions::default());
    let root = tree.root().unwrap();

    let path = [
        PathSegment::Name("a".into()),
        PathSegment::Name("b".into()),
        PathSegment::Index(1),
    ];
    let node = tree.find_at_path(root, &path).unwrap();
    assert_eq!(tree.node(node).node_type, NodeType::Boolean);
    assert_eq!(tree.value_of(node), json!(false));
    assert_eq!(tree.path_of(node).as_slice(), &path);

    let offset_of_true = text.find("true").unwrap();
    let found = tree.find_at_offset(root, offset_of_true, false).unwrap();
    assert_eq!(tree.node(found).node_type, NodeType::Boolean);
    assert_eq!(tree.value_of(found), json!(true));

    assert!(tree.find_at_path(root, &[PathSegment::Name("zzz".into())]).is_none());
    assert!(tree
        .find_at_path(root, &[PathSegment::Name("a".into()), PathSegment::Index(0)])
        .is_none());
}

#[test]
fn tree_reconstructs_values() {
    let text = "{\"a\": [1, {\"b\": null}], \"c\": \"d\"}";
    let mut errors = Vec::new();
    let tree = parse_tree(text, &mut errors, &ParseOptions::default());
    let root = tree.root().unwrap();
    assert_eq!(
        tree.value_of(root),
        json!({"a": [1, {"b": null}], "c": "d"})
    );
}

#[test]
fn truncated_property_has_no_value_child() {
    let text = "{\"a\":";
    let mut errors = Vec::new();
    let tree = parse_tree(text, &mut errors, &ParseOptions::default());
    assert!(!errors.is_empty());
    let root = tree.root().unwrap();
    let property = tree.children(root)[0];
    assert_eq!(tree.children(property).len(), 1);
    assert_eq!(tree.property_name(property), Some("a"));
}

#[test]
fn value_round_trips_through_serialization() {
    let text = "{ /* cfg */ \"a\": [1, 2.5, \"x\"], \"b\": {\"c\": true} }";
    let first = parse_ok(text);
    let reserialized = serde_json::to_string(&first).unwrap();
    let second = parse_ok(&reserialized);
    assert_eq!(first, second);
}

#[test]
fn strip_comments_pads_with_spaces() {
    let text = "{\"a\": 1 // note\n}";
    let stripped = strip_comments(text);
    assert_eq!(stripped.len(), text.len());
    assert_eq!(stripped, "{\"a\": 1        \n}");

    let block = "/*a\nb*/[1]";
    assert_eq!(strip_comments(block), "   \n   [1]");
}

#[test]
fn strip_comments_with_custom_filler() {
    assert_eq!(strip_comments_with("[1] // x", '#'), "[1] ####");
}

#[test]
fn parse_error_display_names_are_stable() {
    assert_eq!(ParseErrorCode::ValueExpected.name(), "ValueExpected");
    assert_eq!(
        ParseErrorCode::InvalidCommentToken.to_string(),
        "InvalidCommentToken"
    );
}
