use std::fmt::{self, Display};

use serde_json::Value;

/// The kind of a token produced by the [`Scanner`](crate::Scanner).
///
/// Trivia kinds (whitespace, line breaks, comments) carry no semantic content
/// but are still reported so that callers can reproduce the document exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxKind {
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
    /// `,`
    Comma,
    /// `:`
    Colon,
    /// `null`
    NullKeyword,
    /// `true`
    TrueKeyword,
    /// `false`
    FalseKeyword,
    /// A double-quoted string.
    StringLiteral,
    /// A JSON number.
    NumericLiteral,
    /// `// ...` up to (excluding) the next line break.
    LineCommentTrivia,
    /// `/* ... */`, possibly spanning lines.
    BlockCommentTrivia,
    /// `\n`, `\r` or `\r\n`.
    LineBreakTrivia,
    /// A run of spaces and tabs.
    Trivia,
    /// Anything the grammar has no token for, e.g. `True` or a stray `-`.
    Unknown,
    /// End of input; scanned indefinitely once reached, with zero length.
    Eof,
}

impl SyntaxKind {
    /// Whether this kind is whitespace, a line break or a comment.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            SyntaxKind::LineCommentTrivia
                | SyntaxKind::BlockCommentTrivia
                | SyntaxKind::LineBreakTrivia
                | SyntaxKind::Trivia
        )
    }
}

/// A recoverable problem attached to a scanned token.
///
/// The token is always produced, possibly with a truncated lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    None,
    UnexpectedEndOfComment,
    UnexpectedEndOfString,
    UnexpectedEndOfNumber,
    InvalidUnicode,
    InvalidEscapeCharacter,
    InvalidCharacter,
}

/// Classification of a recoverable parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorCode {
    InvalidSymbol,
    InvalidNumberFormat,
    PropertyNameExpected,
    ValueExpected,
    ColonExpected,
    CommaExpected,
    CloseBraceExpected,
    CloseBracketExpected,
    EndOfFileExpected,
    InvalidCommentToken,
    UnexpectedEndOfComment,
    UnexpectedEndOfString,
    UnexpectedEndOfNumber,
    InvalidUnicode,
    InvalidEscapeCharacter,
    InvalidCharacter,
}

impl ParseErrorCode {
    /// Stable human-readable name for the code, suitable for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ParseErrorCode::InvalidSymbol => "InvalidSymbol",
            ParseErrorCode::InvalidNumberFormat => "InvalidNumberFormat",
            ParseErrorCode::PropertyNameExpected => "PropertyNameExpected",
            ParseErrorCode::ValueExpected => "ValueExpected",
            ParseErrorCode::ColonExpected => "ColonExpected",
            ParseErrorCode::CommaExpected => "CommaExpected",
            ParseErrorCode::CloseBraceExpected => "CloseBraceExpected",
            ParseErrorCode::CloseBracketExpected => "CloseBracketExpected",
            ParseErrorCode::EndOfFileExpected => "EndOfFileExpected",
            ParseErrorCode::InvalidCommentToken => "InvalidCommentToken",
            ParseErrorCode::UnexpectedEndOfComment => "UnexpectedEndOfComment",
            ParseErrorCode::UnexpectedEndOfString => "UnexpectedEndOfString",
            ParseErrorCode::UnexpectedEndOfNumber => "UnexpectedEndOfNumber",
            ParseErrorCode::InvalidUnicode => "InvalidUnicode",
            ParseErrorCode::InvalidEscapeCharacter => "InvalidEscapeCharacter",
            ParseErrorCode::InvalidCharacter => "InvalidCharacter",
        }
    }
}

impl Display for ParseErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A recoverable error recorded while parsing.
///
/// Parsing never aborts on these; the parser records the error and resumes at
/// the next meaningful token. All positions are zero-based and refer to the
/// original document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub code: ParseErrorCode,
    /// Byte offset of the offending span.
    pub offset: usize,
    /// Byte length of the offending span.
    pub length: usize,
    /// Line of the span start.
    pub line: usize,
    /// Column (in bytes) of the span start within its line.
    pub column: usize,
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at idx={}, row={}, col={}",
            self.code.name(),
            self.offset,
            self.line,
            self.column
        )
    }
}

/// Position and extent of a token, as reported to [`JsonVisitor`](crate::JsonVisitor)
/// callbacks. All values are zero-based; `offset`, `length` and `column` are in
/// bytes of the original document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSpan {
    pub offset: usize,
    pub length: usize,
    pub line: usize,
    pub column: usize,
}

/// The syntactic kind of a tree [`Node`](crate::Node).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Object,
    Array,
    Property,
    String,
    Number,
    Boolean,
    Null,
}

pub(crate) fn node_type_of(value: &Value) -> NodeType {
    match value {
        Value::Null => NodeType::Null,
        Value::Bool(_) => NodeType::Boolean,
        Value::Number(_) => NodeType::Number,
        Value::String(_) => NodeType::String,
        Value::Array(_) => NodeType::Array,
        Value::Object(_) => NodeType::Object,
    }
}

/// One step in a path addressing a position inside a JSON value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A property name in an object.
    Name(String),
    /// An element index in an array.
    Index(usize),
    /// The append position past the last element of an array. Only meaningful
    /// when passed to [`modify`](crate::modify); never produced by the parser.
    End,
}

impl PathSegment {
    pub fn as_name(&self) -> Option<&str> {
        match self {
            PathSegment::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(index) => Some(*index),
            _ => None,
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Name(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        PathSegment::Name(name)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Name(name) => write!(f, "{}", name),
            PathSegment::Index(index) => write!(f, "[{}]", index),
            PathSegment::End => write!(f, "[-]"),
        }
    }
}

/// A sequence of segments addressing a position in the logical JSON value.
pub type JsonPath = Vec<PathSegment>;

/// A single text replacement against the original document.
///
/// Edit lists returned by this crate are sorted by `offset` and never overlap;
/// several zero-length inserts may share an offset, in which case list order is
/// application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// Byte offset in the original document.
    pub offset: usize,
    /// Number of bytes replaced; 0 for a pure insertion.
    pub length: usize,
    /// Replacement text; empty for a pure removal.
    pub content: String,
}

/// A contiguous byte region of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextRange {
    pub offset: usize,
    pub length: usize,
}

/// Summary of the most recently completed literal or property key, reported by
/// [`get_location`](crate::get_location).
#[derive(Debug, Clone, PartialEq)]
pub struct NodeInfo {
    pub node_type: NodeType,
    /// The literal value, or the key name for a property.
    pub value: Option<Value>,
    pub offset: usize,
    pub length: usize,
}

/// The structural context of a text offset: the enclosing path, whether the
/// offset sits where a property key is (being) written, and the previous
/// completed node.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub path: JsonPath,
    pub previous_node: Option<NodeInfo>,
    pub is_at_property_key: bool,
}

impl Location {
    /// Matches the location's path against a pattern. A segment named `*`
    /// matches exactly one path segment; a segment named `**` matches zero or
    /// more.
    pub fn matches(&self, pattern: &[PathSegment]) -> bool {
        path_matches(pattern, &self.path)
    }
}

fn path_matches(pattern: &[PathSegment], path: &[PathSegment]) -> bool {
    let Some((head, rest)) = pattern.split_first() else {
        return path.is_empty();
    };
    if head.as_name() == Some("**") {
        return (0..=path.len()).any(|skip| path_matches(rest, &path[skip..]));
    }
    let Some((first, remaining)) = path.split_first() else {
        return false;
    };
    let matched = head.as_name() == Some("*") || head == first;
    matched && path_matches(rest, remaining)
}
