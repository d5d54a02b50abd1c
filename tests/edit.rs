use limberjson::{
    apply_edits, modify, parse, remove_value, set_value, Edit, FormattingOptions,
    ModificationOptions, ParseOptions, PathSegment, Value,
};
use serde::Serialize;
use serde_json::json;

fn options() -> ModificationOptions<'static> {
    ModificationOptions {
        formatting_options: FormattingOptions {
            tab_size: 2,
            insert_spaces: true,
            eol: Some("\n".to_string()),
            ..FormattingOptions::default()
        },
        ..ModificationOptions::default()
    }
}

fn apply_modify(text: &str, path: &[PathSegment], value: Option<Value>) -> String {
    apply_modify_with(text, path, value, &options())
}

fn apply_modify_with(
    text: &str,
    path: &[PathSegment],
    value: Option<Value>,
    opts: &ModificationOptions,
) -> String {
    let edits = modify(text, path, value, opts).unwrap();
    for pair in edits.windows(2) {
        assert!(pair[0].offset + pair[0].length <= pair[1].offset);
    }
    apply_edits(text, &edits).unwrap()
}

fn reparse(text: &str) -> Value {
    let mut errors = Vec::new();
    parse(text, &mut errors, &ParseOptions::default()).expect("document parses")
}

#[test]
fn inserts_a_new_property() {
    let updated = apply_modify(
        "{\n  \"x\": \"y\"\n}",
        &[PathSegment::Name("foo".into())],
        Some(json!("bar")),
    );
    assert_eq!(updated, "{\n  \"x\": \"y\",\n  \"foo\": \"bar\"\n}");
}

#[test]
fn replaces_an_existing_value() {
    let updated = apply_modify(
        "{\n  \"x\": \"y\"\n}",
        &[PathSegment::Name("x".into())],
        Some(json!(42)),
    );
    assert_eq!(updated, "{\n  \"x\": 42\n}");
}

#[test]
fn replacement_keeps_compact_layout_compact() {
    let updated = apply_modify("[1,2]", &[PathSegment::Index(0)], Some(json!(99)));
    assert_eq!(updated, "[99,2]");
}

#[test]
fn inserts_into_an_empty_object() {
    let updated = apply_modify("{}", &[PathSegment::Name("a".into())], Some(json!(1)));
    assert_eq!(updated, "{\n  \"a\": 1\n}");
}

#[test]
fn creates_missing_containers_along_the_path() {
    let updated = apply_modify(
        "{}",
        &[PathSegment::Name("a".into()), PathSegment::Name("b".into())],
        Some(json!(1)),
    );
    assert_eq!(updated, "{\n  \"a\": {\n    \"b\": 1\n  }\n}");
    assert_eq!(reparse(&updated), json!({"a": {"b": 1}}));
}

#[test]
fn inserts_into_an_empty_document() {
    let updated = apply_modify("", &[PathSegment::Name("a".into())], Some(json!(1)));
    assert_eq!(updated, "{\n  \"a\": 1\n}");
}

#[test]
fn insertion_index_callback_controls_placement() {
    let chooser = |_keys: &[String]| 0usize;
    let opts = ModificationOptions {
        get_insertion_index: Some(&chooser),
        ..options()
    };
    let updated = apply_modify_with(
        "{\n  \"b\": 2\n}",
        &[PathSegment::Name("a".into())],
        Some(json!(1)),
        &opts,
    );
    assert_eq!(updated, "{\n  \"a\": 1,\n  \"b\": 2\n}");
}

#[test]
fn removes_the_only_property() {
    let updated = apply_modify("{\n  \"a\": 1\n}", &[PathSegment::Name("a".into())], None);
    assert_eq!(reparse(&updated), json!({}));
}

#[test]
fn removes_the_first_property() {
    let updated = apply_modify(
        "{\n  \"a\": 1,\n  \"b\": 2\n}",
        &[PathSegment::Name("a".into())],
        None,
    );
    assert_eq!(updated, "{\n  \"b\": 2\n}");
}

#[test]
fn removes_the_last_property() {
    let updated = apply_modify(
        "{\n  \"a\": 1,\n  \"b\": 2\n}",
        &[PathSegment::Name("b".into())],
        None,
    );
    assert_eq!(updated, "{\n  \"a\": 1\n}");
}

#[test]
fn removing_a_missing_property_is_a_no_op() {
    let edits = modify(
        "{\"a\": 1}",
        &[PathSegment::Name("zzz".into())],
        None,
        &options(),
    )
    .unwrap();
    assert!(edits.is_empty());
}

#[test]
fn comments_on_other_properties_survive_removal() {
    let text = "{\n  // keep me\n  \"a\": 1,\n  \"b\": 2\n}";
    let updated = apply_modify(text, &[PathSegment::Name("b".into())], None);
    assert!(updated.contains("// keep me"));
    assert_eq!(reparse(&updated), json!({"a": 1}));
}

#[test]
fn array_insertion_shifts_elements_right() {
    let updated = apply_modify_with(
        "[\n  2,\n  3\n]",
        &[PathSegment::Index(0)],
        Some(json!(1)),
        &ModificationOptions {
            is_array_insertion: true,
            ..options()
        },
    );
    assert_eq!(updated, "[\n  1,\n  2,\n  3\n]");
}

#[test]
fn array_insertion_in_the_middle() {
    let updated = apply_modify_with(
        "[\n  1,\n  3\n]",
        &[PathSegment::Index(1)],
        Some(json!(2)),
        &ModificationOptions {
            is_array_insertion: true,
            ..options()
        },
    );
    assert_eq!(reparse(&updated), json!([1, 2, 3]));
}

#[test]
fn index_at_array_length_appends() {
    let updated = apply_modify("[\n  1\n]", &[PathSegment::Index(1)], Some(json!(2)));
    assert_eq!(reparse(&updated), json!([1, 2]));
}

#[test]
fn end_segment_appends() {
    let updated = apply_modify("[\n  1,\n  2\n]", &[PathSegment::End], Some(json!(3)));
    assert_eq!(reparse(&updated), json!([1, 2, 3]));
}

#[test]
fn end_segment_appends_to_empty_array() {
    let updated = apply_modify("[]", &[PathSegment::End], Some(json!(1)));
    assert_eq!(reparse(&updated), json!([1]));
}

#[test]
fn removes_array_elements_everywhere() {
    let text = "[\n  1,\n  2,\n  3\n]";
    assert_eq!(
        reparse(&apply_modify(text, &[PathSegment::Index(0)], None)),
        json!([2, 3])
    );
    assert_eq!(
        reparse(&apply_modify(text, &[PathSegment::Index(1)], None)),
        json!([1, 3])
    );
    assert_eq!(
        reparse(&apply_modify(text, &[PathSegment::Index(2)], None)),
        json!([1, 2])
    );
}

#[test]
fn removes_the_only_array_element() {
    let updated = apply_modify("[\n  1\n]", &[PathSegment::Index(0)], None);
    assert_eq!(reparse(&updated), json!([]));
}

#[test]
fn modified_documents_keep_their_comments() {
    let text = "{\n  // the answer\n  \"answer\": 41\n}";
    let updated = apply_modify(text, &[PathSegment::Name("answer".into())], Some(json!(42)));
    assert!(updated.contains("// the answer"));
    assert_eq!(reparse(&updated), json!({"answer": 42}));
}

#[test]
fn modify_matches_plain_value_semantics() {
    // parse(apply(modify(text, p, v))) == set(parse(text), p, v)
    let text = "{\n  \"a\": {\"b\": [1, 2]},\n  \"c\": true\n}";
    let updated = apply_modify(
        text,
        &[
            PathSegment::Name("a".into()),
            PathSegment::Name("b".into()),
            PathSegment::Index(1),
        ],
        Some(json!({"deep": null})),
    );
    let mut expected = reparse(text);
    expected["a"]["b"][1] = json!({"deep": null});
    assert_eq!(reparse(&updated), expected);
}

#[test]
fn out_of_bounds_removal_fails() {
    let result = modify("[1]", &[PathSegment::Index(5)], None, &options());
    assert!(result.is_err());
}

#[test]
fn indexing_an_object_fails() {
    let result = modify("{\"a\": 1}", &[PathSegment::Index(0)], Some(json!(2)), &options());
    assert!(result.is_err());
}

#[test]
fn removing_from_an_empty_document_fails() {
    let result = modify("", &[PathSegment::Name("a".into())], None, &options());
    assert!(result.is_err());
}

#[test]
fn set_value_serializes_rust_types() {
    #[derive(Serialize)]
    struct Endpoint {
        host: String,
        port: u16,
    }

    let endpoint = Endpoint {
        host: "localhost".into(),
        port: 8080,
    };
    let edits = set_value(
        "{\n  \"name\": \"svc\"\n}",
        &[PathSegment::Name("endpoint".into())],
        &endpoint,
        &options(),
    )
    .unwrap();
    let updated = apply_edits("{\n  \"name\": \"svc\"\n}", &edits).unwrap();
    assert_eq!(
        reparse(&updated),
        json!({"name": "svc", "endpoint": {"host": "localhost", "port": 8080}})
    );
}

#[test]
fn remove_value_is_modify_with_none() {
    let text = "{\n  \"a\": 1,\n  \"b\": 2\n}";
    let edits = remove_value(text, &[PathSegment::Name("a".into())], &options()).unwrap();
    let updated = apply_edits(text, &edits).unwrap();
    assert_eq!(reparse(&updated), json!({"b": 2}));
}

#[test]
fn apply_edits_sorts_by_offset() {
    let text = "abcdef";
    let edits = vec![
        Edit {
            offset: 4,
            length: 1,
            content: "E".to_string(),
        },
        Edit {
            offset: 0,
            length: 1,
            content: "A".to_string(),
        },
    ];
    assert_eq!(apply_edits(text, &edits).unwrap(), "AbcdEf");
}

#[test]
fn apply_edits_supports_multiple_inserts_at_one_offset() {
    let text = "ab";
    let edits = vec![
        Edit {
            offset: 1,
            length: 0,
            content: "x".to_string(),
        },
        Edit {
            offset: 1,
            length: 0,
            content: "y".to_string(),
        },
    ];
    // list order is application order
    assert_eq!(apply_edits(text, &edits).unwrap(), "axyb");
}

#[test]
fn apply_edits_rejects_overlaps() {
    let text = "abcdef";
    let edits = vec![
        Edit {
            offset: 0,
            length: 3,
            content: "x".to_string(),
        },
        Edit {
            offset: 2,
            length: 2,
            content: "y".to_string(),
        },
    ];
    assert!(apply_edits(text, &edits).is_err());
}
