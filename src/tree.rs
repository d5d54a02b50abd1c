use serde_json::Value;

use crate::model::{node_type_of, JsonPath, NodeType, ParseError, ParseErrorCode, PathSegment, TokenSpan};
use crate::options::ParseOptions;
use crate::parser::{visit, JsonVisitor};

/// Handle to a node stored in a [`JsonTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A node of the concrete syntax tree.
///
/// `offset` and `length` delimit the node's span in the original document.
/// An object or array spans from its opening bracket through its closing
/// bracket; a property spans from its key through the end of its value (or the
/// end of the key when the value is missing from a truncated document).
#[derive(Debug, Clone)]
pub struct Node {
    pub node_type: NodeType,
    pub offset: usize,
    pub length: usize,
    /// Decoded value for leaf nodes; `None` for objects, arrays and properties.
    pub value: Option<Value>,
    /// Byte offset of the `:` token; set on property nodes when present.
    pub colon_offset: Option<usize>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Byte offset just past the node's span.
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Concrete syntax tree of a document, preserving every node's span.
///
/// Nodes live in an arena owned by the tree and are addressed through
/// [`NodeId`] handles, which keeps parent back references cycle-free.
///
/// Built by [`parse_tree`]; an object node's children are its properties in
/// document order, an array node's children are its elements, and a property
/// node's children are its key and (when present) its value.
#[derive(Debug, Clone)]
pub struct JsonTree {
    nodes: Vec<Node>,
}

impl JsonTree {
    /// The root value of the document, absent when the document held no value.
    pub fn root(&self) -> Option<NodeId> {
        self.nodes[0].children.first().copied()
    }

    /// The node behind a handle.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// The node's parent, absent for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent.filter(|parent| parent.0 != 0)
    }

    /// The node's children in document order.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// The key name of a property node.
    pub fn property_name(&self, property: NodeId) -> Option<&str> {
        let key = *self.nodes[property.0].children.first()?;
        match self.nodes[key.0].value {
            Some(Value::String(ref name)) => Some(name),
            _ => None,
        }
    }

    /// Descends from `from` along `path` and returns the addressed value
    /// node, or `None` when the document has no such position.
    pub fn find_at_path(&self, from: NodeId, path: &[PathSegment]) -> Option<NodeId> {
        let mut node = from;
        for segment in path {
            match segment {
                PathSegment::Name(name) => {
                    if self.node(node).node_type != NodeType::Object {
                        return None;
                    }
                    let mut found = None;
                    for &property in self.children(node) {
                        if self.children(property).len() == 2
                            && self.property_name(property) == Some(name.as_str())
                        {
                            found = Some(self.children(property)[1]);
                            break;
                        }
                    }
                    node = found?;
                }
                PathSegment::Index(index) => {
                    if self.node(node).node_type != NodeType::Array {
                        return None;
                    }
                    node = *self.children(node).get(*index)?;
                }
                PathSegment::End => return None,
            }
        }
        Some(node)
    }

    /// Finds the smallest node whose span contains `offset`. With
    /// `include_right_bound`, a node also matches when the offset sits
    /// directly at its end.
    pub fn find_at_offset(
        &self,
        from: NodeId,
        offset: usize,
        include_right_bound: bool,
    ) -> Option<NodeId> {
        let node = self.node(from);
        let contains = (offset >= node.offset && offset < node.end())
            || (include_right_bound && offset == node.end());
        if !contains {
            return None;
        }
        for &child in self.children(from) {
            if self.node(child).offset > offset {
                break;
            }
            if let Some(found) = self.find_at_offset(child, offset, include_right_bound) {
                return Some(found);
            }
        }
        Some(from)
    }

    /// The path from the document root down to `id`.
    pub fn path_of(&self, id: NodeId) -> JsonPath {
        let mut path = Vec::new();
        self.build_path(id, &mut path);
        path
    }

    fn build_path(&self, id: NodeId, path: &mut JsonPath) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.build_path(parent, path);
        match self.node(parent).node_type {
            NodeType::Property => {
                if let Some(name) = self.property_name(parent) {
                    path.push(PathSegment::Name(name.to_string()));
                }
            }
            NodeType::Array => {
                if let Some(index) = self.children(parent).iter().position(|&c| c == id) {
                    path.push(PathSegment::Index(index));
                }
            }
            _ => {}
        }
    }

    /// Reconstructs the plain value the subtree at `id` represents.
    pub fn value_of(&self, id: NodeId) -> Value {
        let node = self.node(id);
        match node.node_type {
            NodeType::Array => Value::Array(
                self.children(id)
                    .iter()
                    .map(|&child| self.value_of(child))
                    .collect(),
            ),
            NodeType::Object => {
                let mut map = serde_json::Map::new();
                for &property in self.children(id) {
                    if self.children(property).len() == 2 {
                        if let Some(name) = self.property_name(property) {
                            let value = self.value_of(self.children(property)[1]);
                            map.insert(name.to_string(), value);
                        }
                    }
                }
                Value::Object(map)
            }
            _ => node.value.clone().unwrap_or(Value::Null),
        }
    }
}

/// Parses the given text into a [`JsonTree`], recording recoverable problems
/// in `errors`. Missing pieces (e.g. a property whose value was cut off) are
/// simply absent from the tree.
///
/// # Example
///
/// ```rust
/// use limberjson::{parse_tree, NodeType, ParseOptions, PathSegment};
///
/// let mut errors = Vec::new();
/// let tree = parse_tree("{\"on\": true}", &mut errors, &ParseOptions::default());
/// let root = tree.root().unwrap();
/// let node = tree
///     .find_at_path(root, &[PathSegment::Name("on".into())])
///     .unwrap();
/// assert_eq!(tree.node(node).node_type, NodeType::Boolean);
/// ```
pub fn parse_tree(text: &str, errors: &mut Vec<ParseError>, options: &ParseOptions) -> JsonTree {
    let mut builder = TreeBuilder {
        // artificial root container; hidden behind JsonTree::root
        nodes: vec![Node {
            node_type: NodeType::Array,
            offset: 0,
            length: 0,
            value: None,
            colon_offset: None,
            parent: None,
            children: Vec::new(),
        }],
        current: NodeId(0),
        errors,
    };
    visit(text, &mut builder, options);
    JsonTree {
        nodes: builder.nodes,
    }
}

struct TreeBuilder<'e> {
    nodes: Vec<Node>,
    current: NodeId,
    errors: &'e mut Vec<ParseError>,
}

impl TreeBuilder<'_> {
    fn add_child(
        &mut self,
        node_type: NodeType,
        offset: usize,
        length: usize,
        value: Option<Value>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            offset,
            length,
            value,
            colon_offset: None,
            parent: Some(self.current),
            children: Vec::new(),
        });
        self.nodes[self.current.0].children.push(id);
        id
    }

    // A property node stays current until its value ends; this closes it once
    // the end is known (value end, separator, or closing brace).
    fn ensure_property_complete(&mut self, end_offset: usize) {
        if self.nodes[self.current.0].node_type == NodeType::Property {
            let node = &mut self.nodes[self.current.0];
            node.length = end_offset - node.offset;
            self.current = node.parent.unwrap_or(NodeId(0));
        }
    }
}

impl JsonVisitor for TreeBuilder<'_> {
    fn on_object_begin(&mut self, span: TokenSpan, _path: &[PathSegment]) -> bool {
        self.current = self.add_child(NodeType::Object, span.offset, 0, None);
        true
    }

    fn on_object_property(&mut self, name: &str, span: TokenSpan, _path: &[PathSegment]) {
        self.current = self.add_child(NodeType::Property, span.offset, 0, None);
        self.add_child(
            NodeType::String,
            span.offset,
            span.length,
            Some(Value::String(name.to_string())),
        );
    }

    fn on_object_end(&mut self, span: TokenSpan) {
        // a property without a value ends right before the brace
        self.ensure_property_complete(span.offset);
        let node = &mut self.nodes[self.current.0];
        node.length = span.offset + span.length - node.offset;
        self.current = node.parent.unwrap_or(NodeId(0));
        self.ensure_property_complete(span.offset + span.length);
    }

    fn on_array_begin(&mut self, span: TokenSpan, _path: &[PathSegment]) -> bool {
        self.current = self.add_child(NodeType::Array, span.offset, 0, None);
        true
    }

    fn on_array_end(&mut self, span: TokenSpan) {
        let node = &mut self.nodes[self.current.0];
        node.length = span.offset + span.length - node.offset;
        self.current = node.parent.unwrap_or(NodeId(0));
        self.ensure_property_complete(span.offset + span.length);
    }

    fn on_literal_value(&mut self, value: Value, span: TokenSpan, _path: &[PathSegment]) {
        self.add_child(node_type_of(&value), span.offset, span.length, Some(value));
        self.ensure_property_complete(span.offset + span.length);
    }

    fn on_separator(&mut self, separator: char, span: TokenSpan) {
        if self.nodes[self.current.0].node_type == NodeType::Property {
            match separator {
                ':' => self.nodes[self.current.0].colon_offset = Some(span.offset),
                ',' => self.ensure_property_complete(span.offset),
                _ => {}
            }
        }
    }

    fn on_error(&mut self, code: ParseErrorCode, span: TokenSpan) {
        self.errors.push(ParseError {
            code,
            offset: span.offset,
            length: span.length,
            line: span.line,
            column: span.column,
        });
    }
}
