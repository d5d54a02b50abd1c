use serde::Serialize;
use serde_json::Value;

use crate::error::LimberJsonError;
use crate::formatter::{format, is_eol_byte};
use crate::model::{Edit, NodeType, PathSegment, TextRange};
use crate::options::{ModificationOptions, ParseOptions};
use crate::tree::{parse_tree, JsonTree, NodeId};

/// Applies a list of edits to `text` and returns the rewritten document.
///
/// Edits are applied back to front after sorting by offset (ties by length),
/// so a list produced by [`format`](crate::format) or [`modify`] can be
/// applied directly. Overlapping edits are rejected.
pub fn apply_edits(text: &str, edits: &[Edit]) -> Result<String, LimberJsonError> {
    let mut sorted: Vec<&Edit> = edits.iter().collect();
    sorted.sort_by(|a, b| a.offset.cmp(&b.offset).then(a.length.cmp(&b.length)));

    let mut result = text.to_string();
    let mut last_modified = result.len();
    for edit in sorted.iter().rev() {
        if edit.offset + edit.length > last_modified || edit.offset + edit.length > result.len() {
            return Err(LimberJsonError::new("Overlapping edit", Some(edit.offset)));
        }
        result = apply_edit(&result, edit);
        last_modified = edit.offset;
    }
    Ok(result)
}

fn apply_edit(text: &str, edit: &Edit) -> String {
    let mut out = String::with_capacity(text.len() + edit.content.len());
    out.push_str(&text[..edit.offset]);
    out.push_str(&edit.content);
    out.push_str(&text[edit.offset + edit.length..]);
    out
}

/// Computes edits that make the document represent `value` at `path`.
///
/// * With `Some(value)`, the value at the path is replaced, or inserted when
///   the path does not exist yet (missing containers along the way are
///   created). Inside arrays, [`PathSegment::End`] appends, and a numeric
///   index either replaces the element or, with
///   [`is_array_insertion`](crate::ModificationOptions::is_array_insertion),
///   inserts before it.
/// * With `None`, the value at the path is removed along with the appropriate
///   adjacent comma.
///
/// The inserted fragment is serialized compactly and then re-indented with the
/// formatter, so the result blends into the surrounding layout. Comments and
/// layout elsewhere in the document are untouched.
///
/// # Example
///
/// ```rust
/// use limberjson::{apply_edits, modify, FormattingOptions, ModificationOptions, PathSegment};
///
/// let options = ModificationOptions {
///     formatting_options: FormattingOptions {
///         tab_size: 2,
///         eol: Some("\n".to_string()),
///         ..FormattingOptions::default()
///     },
///     ..ModificationOptions::default()
/// };
/// let text = "{\n  \"x\": \"y\"\n}";
/// let edits = modify(text, &[PathSegment::Name("foo".into())], Some("bar".into()), &options).unwrap();
/// assert_eq!(
///     apply_edits(text, &edits).unwrap(),
///     "{\n  \"x\": \"y\",\n  \"foo\": \"bar\"\n}"
/// );
/// ```
pub fn modify(
    text: &str,
    path: &[PathSegment],
    value: Option<Value>,
    options: &ModificationOptions,
) -> Result<Vec<Edit>, LimberJsonError> {
    let mut errors = Vec::new();
    let tree = parse_tree(text, &mut errors, &ParseOptions::default());

    let mut path: Vec<PathSegment> = path.to_vec();
    let mut value = value;
    let mut parent_id: Option<NodeId> = None;
    let mut last_segment: Option<PathSegment> = None;

    // walk the path bottom-up, wrapping the value until an existing parent is
    // found; what remains is inserted in one piece
    while let Some(segment) = path.pop() {
        parent_id = tree.root().and_then(|root| tree.find_at_path(root, &path));
        match (parent_id, value) {
            (None, Some(wrapped)) => {
                value = Some(match &segment {
                    PathSegment::Name(name) => {
                        let mut map = serde_json::Map::new();
                        map.insert(name.clone(), wrapped);
                        Value::Object(map)
                    }
                    _ => Value::Array(vec![wrapped]),
                });
                last_segment = Some(segment);
            }
            (_, restored) => {
                value = restored;
                last_segment = Some(segment);
                break;
            }
        }
    }

    let Some(parent_id) = parent_id else {
        // empty or value-less document: replace whatever the root span is
        let Some(value) = value else {
            return Err(LimberJsonError::simple(
                "cannot remove a value from an empty document",
            ));
        };
        let (offset, length) = match tree.root() {
            Some(root) => {
                let node = tree.node(root);
                (node.offset, node.length)
            }
            None => (0, 0),
        };
        return with_formatting(
            text,
            Edit {
                offset,
                length,
                content: serialize(&value)?,
            },
            options,
        );
    };

    let parent = tree.node(parent_id);
    match (parent.node_type, last_segment) {
        (NodeType::Object, Some(PathSegment::Name(name))) => {
            modify_object(text, &tree, parent_id, &name, value, options)
        }
        (NodeType::Array, Some(segment @ (PathSegment::Index(_) | PathSegment::End))) => {
            modify_array(text, &tree, parent_id, &segment, value, options)
        }
        (node_type, Some(segment)) => Err(LimberJsonError::new(
            format!(
                "cannot address segment '{}' in a parent of type {:?}",
                segment, node_type
            ),
            Some(parent.offset),
        )),
        (_, None) => {
            // empty path: rewrite the whole document value
            let Some(value) = value else {
                return Err(LimberJsonError::simple(
                    "cannot remove the root of the document",
                ));
            };
            with_formatting(
                text,
                Edit {
                    offset: parent.offset,
                    length: parent.length,
                    content: serialize(&value)?,
                },
                options,
            )
        }
    }
}

/// Serializes any `Serialize` value and sets it at `path`.
pub fn set_value<T: Serialize>(
    text: &str,
    path: &[PathSegment],
    value: &T,
    options: &ModificationOptions,
) -> Result<Vec<Edit>, LimberJsonError> {
    let value = serde_json::to_value(value)
        .map_err(|err| LimberJsonError::simple(format!("value is not valid JSON: {}", err)))?;
    modify(text, path, Some(value), options)
}

/// Removes the value at `path`, if present.
pub fn remove_value(
    text: &str,
    path: &[PathSegment],
    options: &ModificationOptions,
) -> Result<Vec<Edit>, LimberJsonError> {
    modify(text, path, None, options)
}

fn modify_object(
    text: &str,
    tree: &JsonTree,
    parent_id: NodeId,
    name: &str,
    value: Option<Value>,
    options: &ModificationOptions,
) -> Result<Vec<Edit>, LimberJsonError> {
    let parent = tree.node(parent_id);
    let existing = tree.find_at_path(parent_id, &[PathSegment::Name(name.to_string())]);

    if let Some(existing) = existing {
        match value {
            None => {
                // drop the property together with one adjacent comma
                let property = tree
                    .parent(existing)
                    .ok_or_else(|| LimberJsonError::simple("malformed syntax tree"))?;
                let siblings = tree.children(parent_id);
                let property_index = siblings
                    .iter()
                    .position(|&p| p == property)
                    .ok_or_else(|| LimberJsonError::simple("malformed syntax tree"))?;
                let mut remove_end = tree.node(property).end();
                let remove_begin = if property_index > 0 {
                    tree.node(siblings[property_index - 1]).end()
                } else {
                    if siblings.len() > 1 {
                        remove_end = tree.node(siblings[1]).offset;
                    }
                    parent.offset + 1
                };
                with_formatting(
                    text,
                    Edit {
                        offset: remove_begin,
                        length: remove_end - remove_begin,
                        content: String::new(),
                    },
                    options,
                )
            }
            Some(value) => {
                let node = tree.node(existing);
                with_formatting(
                    text,
                    Edit {
                        offset: node.offset,
                        length: node.length,
                        content: serialize(&value)?,
                    },
                    options,
                )
            }
        }
    } else {
        let Some(value) = value else {
            // nothing to remove
            return Ok(Vec::new());
        };
        let new_property = format!(
            "{}: {}",
            serialize(&Value::String(name.to_string()))?,
            serialize(&value)?
        );
        let children = tree.children(parent_id);
        let index = match options.get_insertion_index {
            Some(chooser) => {
                let keys: Vec<String> = children
                    .iter()
                    .filter_map(|&p| tree.property_name(p).map(str::to_string))
                    .collect();
                chooser(&keys).min(children.len())
            }
            None => children.len(),
        };
        let edit = if index > 0 && !children.is_empty() {
            let previous = tree.node(children[index - 1]);
            Edit {
                offset: previous.end(),
                length: 0,
                content: format!(",{}", new_property),
            }
        } else if children.is_empty() {
            Edit {
                offset: parent.offset + 1,
                length: 0,
                content: new_property,
            }
        } else {
            Edit {
                offset: parent.offset + 1,
                length: 0,
                content: format!("{},", new_property),
            }
        };
        with_formatting(text, edit, options)
    }
}

fn modify_array(
    text: &str,
    tree: &JsonTree,
    parent_id: NodeId,
    segment: &PathSegment,
    value: Option<Value>,
    options: &ModificationOptions,
) -> Result<Vec<Edit>, LimberJsonError> {
    let parent = tree.node(parent_id);
    let children = tree.children(parent_id);

    match (segment, value) {
        (PathSegment::End, Some(value)) => {
            // append past the last element
            let content = serialize(&value)?;
            let edit = match children.last() {
                None => Edit {
                    offset: parent.offset + 1,
                    length: 0,
                    content,
                },
                Some(&last) => Edit {
                    offset: tree.node(last).end(),
                    length: 0,
                    content: format!(",{}", content),
                },
            };
            with_formatting(text, edit, options)
        }
        (PathSegment::End, None) => Err(LimberJsonError::new(
            "cannot remove at the append position of an array",
            Some(parent.offset),
        )),
        (&PathSegment::Index(index), None) => {
            if index >= children.len() {
                return Err(LimberJsonError::new(
                    format!(
                        "cannot remove array index {}, the array has {} elements",
                        index,
                        children.len()
                    ),
                    Some(parent.offset),
                ));
            }
            let edit = if children.len() == 1 {
                // only element: empty the brackets
                Edit {
                    offset: parent.offset + 1,
                    length: parent.length - 2,
                    content: String::new(),
                }
            } else if index == children.len() - 1 {
                // last element: also remove the comma before it
                let offset = tree.node(children[index - 1]).end();
                Edit {
                    offset,
                    length: (parent.end() - 1) - offset,
                    content: String::new(),
                }
            } else {
                let to_remove = tree.node(children[index]);
                Edit {
                    offset: to_remove.offset,
                    length: tree.node(children[index + 1]).offset - to_remove.offset,
                    content: String::new(),
                }
            };
            with_formatting(text, edit, options)
        }
        (&PathSegment::Index(index), Some(value)) => {
            let content = serialize(&value)?;
            let edit = if !options.is_array_insertion && index < children.len() {
                let node = tree.node(children[index]);
                Edit {
                    offset: node.offset,
                    length: node.length,
                    content,
                }
            } else if children.is_empty() || index == 0 {
                Edit {
                    offset: parent.offset + 1,
                    length: 0,
                    content: if children.is_empty() {
                        content
                    } else {
                        format!("{},", content)
                    },
                }
            } else {
                let index = index.min(children.len());
                let previous = tree.node(children[index - 1]);
                Edit {
                    offset: previous.end(),
                    length: 0,
                    content: format!(",{}", content),
                }
            };
            with_formatting(text, edit, options)
        }
        (PathSegment::Name(name), _) => Err(LimberJsonError::new(
            format!("cannot address property '{}' in an array", name),
            Some(parent.offset),
        )),
    }
}

fn serialize(value: &Value) -> Result<String, LimberJsonError> {
    serde_json::to_string(value)
        .map_err(|err| LimberJsonError::simple(format!("value is not serializable: {}", err)))
}

// Applies the raw edit to a scratch copy, reformats the affected lines, and
// collapses everything into a single replacement edit against the original.
fn with_formatting(
    text: &str,
    edit: Edit,
    options: &ModificationOptions,
) -> Result<Vec<Edit>, LimberJsonError> {
    let mut new_text = apply_edit(text, &edit);

    let mut begin = edit.offset;
    let mut end = edit.offset + edit.content.len();
    if edit.length == 0 || edit.content.is_empty() {
        // insertion or removal: widen to whole lines
        while begin > 0 && !is_eol_byte(new_text.as_bytes()[begin - 1]) {
            begin -= 1;
        }
        while end < new_text.len() && !is_eol_byte(new_text.as_bytes()[end]) {
            end += 1;
        }
    }

    let mut formatting = options.formatting_options.clone();
    formatting.keep_lines = false;
    let edits = format(
        &new_text,
        Some(TextRange {
            offset: begin,
            length: end - begin,
        }),
        &formatting,
    );

    for edit in edits.iter().rev() {
        new_text = apply_edit(&new_text, edit);
        begin = begin.min(edit.offset);
        end = end.max(edit.offset + edit.length);
        end = end - edit.length + edit.content.len();
    }

    let length = text.len() - (new_text.len() - end) - begin;
    Ok(vec![Edit {
        offset: begin,
        length,
        content: new_text[begin..end].to_string(),
    }])
}
