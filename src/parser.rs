use serde_json::Value;

use crate::model::{
    node_type_of, Location, NodeInfo, NodeType, ParseError, ParseErrorCode, PathSegment, ScanError,
    SyntaxKind, TokenSpan,
};
use crate::options::ParseOptions;
use crate::scanner::Scanner;

/// Callbacks driven by [`visit`] in document order.
///
/// Every method has a default no-op implementation, so an implementor only
/// overrides what it cares about. Callbacks that introduce a value (object and
/// array begin, property names, literals) also receive the current path from
/// the document root to that value.
pub trait JsonVisitor {
    /// Called on `{`. Return `false` to skip the object's children; the
    /// matching [`on_object_end`](Self::on_object_end) still fires at the
    /// close of the skipped range.
    fn on_object_begin(&mut self, _span: TokenSpan, _path: &[PathSegment]) -> bool {
        true
    }

    /// Called for each property key, before its value is visited. The path
    /// does not yet include the property itself.
    fn on_object_property(&mut self, _name: &str, _span: TokenSpan, _path: &[PathSegment]) {}

    /// Called on `}`, or wherever an unterminated object ends.
    fn on_object_end(&mut self, _span: TokenSpan) {}

    /// Called on `[`. Return `false` to skip the array's children; the
    /// matching [`on_array_end`](Self::on_array_end) still fires.
    fn on_array_begin(&mut self, _span: TokenSpan, _path: &[PathSegment]) -> bool {
        true
    }

    /// Called on `]`, or wherever an unterminated array ends.
    fn on_array_end(&mut self, _span: TokenSpan) {}

    /// Called for every string, number, boolean or null value.
    fn on_literal_value(&mut self, _value: Value, _span: TokenSpan, _path: &[PathSegment]) {}

    /// Called for every `:` and `,`.
    fn on_separator(&mut self, _separator: char, _span: TokenSpan) {}

    /// Called for every comment, unless comments are disallowed.
    fn on_comment(&mut self, _span: TokenSpan) {}

    /// Called for every recoverable error.
    fn on_error(&mut self, _code: ParseErrorCode, _span: TokenSpan) {}
}

/// Parses `text` and reports everything encountered to `visitor`, in document
/// order. Recoverable errors are reported through
/// [`JsonVisitor::on_error`] and parsing resumes at the next meaningful token.
///
/// Returns false when the document contains no value at all.
pub fn visit<V: JsonVisitor>(text: &str, visitor: &mut V, options: &ParseOptions) -> bool {
    VisitContext {
        scanner: Scanner::new(text, false),
        visitor,
        options: *options,
        path: Vec::new(),
        suppressed: 0,
    }
    .run()
}

struct VisitContext<'v, V: JsonVisitor> {
    scanner: Scanner,
    visitor: &'v mut V,
    options: ParseOptions,
    path: Vec<PathSegment>,
    suppressed: usize,
}

impl<V: JsonVisitor> VisitContext<'_, V> {
    fn run(&mut self) -> bool {
        self.scan_next();
        if self.scanner.token() == SyntaxKind::Eof {
            if self.options.allow_empty_content {
                return true;
            }
            self.error(ParseErrorCode::ValueExpected, &[], &[]);
            return false;
        }
        if !self.parse_value() {
            self.error(ParseErrorCode::ValueExpected, &[], &[]);
            return false;
        }
        if self.scanner.token() != SyntaxKind::Eof {
            self.error(ParseErrorCode::EndOfFileExpected, &[], &[]);
        }
        true
    }

    fn token_span(&self) -> TokenSpan {
        TokenSpan {
            offset: self.scanner.token_offset(),
            length: self.scanner.token_length(),
            line: self.scanner.token_start_line(),
            column: self.scanner.token_start_character(),
        }
    }

    // Advances to the next content token, translating scan errors into parse
    // errors and routing comments and unknown tokens on the way.
    fn scan_next(&mut self) -> SyntaxKind {
        loop {
            let token = self.scanner.scan();
            match self.scanner.token_error() {
                ScanError::InvalidUnicode => self.report(ParseErrorCode::InvalidUnicode),
                ScanError::InvalidEscapeCharacter => {
                    self.report(ParseErrorCode::InvalidEscapeCharacter)
                }
                ScanError::UnexpectedEndOfNumber => {
                    self.report(ParseErrorCode::UnexpectedEndOfNumber)
                }
                ScanError::UnexpectedEndOfComment => {
                    if !self.options.disallow_comments {
                        self.report(ParseErrorCode::UnexpectedEndOfComment);
                    }
                }
                ScanError::UnexpectedEndOfString => {
                    self.report(ParseErrorCode::UnexpectedEndOfString)
                }
                ScanError::InvalidCharacter => self.report(ParseErrorCode::InvalidCharacter),
                ScanError::None => {}
            }
            match token {
                SyntaxKind::LineCommentTrivia | SyntaxKind::BlockCommentTrivia => {
                    if self.options.disallow_comments {
                        self.report(ParseErrorCode::InvalidCommentToken);
                    } else if self.suppressed == 0 {
                        let span = self.token_span();
                        self.visitor.on_comment(span);
                    }
                }
                SyntaxKind::Unknown => self.report(ParseErrorCode::InvalidSymbol),
                SyntaxKind::Trivia | SyntaxKind::LineBreakTrivia => {}
                _ => return token,
            }
        }
    }

    fn report(&mut self, code: ParseErrorCode) {
        if self.suppressed == 0 {
            let span = self.token_span();
            self.visitor.on_error(code, span);
        }
    }

    // Reports the error and optionally resynchronizes: tokens are consumed
    // until one listed in `skip_until_after` (consumed too) or in `skip_until`
    // (left as the current token).
    fn error(
        &mut self,
        code: ParseErrorCode,
        skip_until_after: &[SyntaxKind],
        skip_until: &[SyntaxKind],
    ) {
        self.report(code);
        if !skip_until_after.is_empty() || !skip_until.is_empty() {
            let mut token = self.scanner.token();
            while token != SyntaxKind::Eof {
                if skip_until_after.contains(&token) {
                    self.scan_next();
                    break;
                }
                if skip_until.contains(&token) {
                    break;
                }
                token = self.scan_next();
            }
        }
    }

    fn parse_value(&mut self) -> bool {
        match self.scanner.token() {
            SyntaxKind::OpenBracket => self.parse_array(),
            SyntaxKind::OpenBrace => self.parse_object(),
            SyntaxKind::StringLiteral => self.parse_string(true),
            _ => self.parse_literal(),
        }
    }

    fn parse_string(&mut self, is_value: bool) -> bool {
        let span = self.token_span();
        let value = self.scanner.token_value().to_string();
        if is_value {
            if self.suppressed == 0 {
                self.visitor
                    .on_literal_value(Value::String(value), span, &self.path);
            }
        } else {
            if self.suppressed == 0 {
                self.visitor.on_object_property(&value, span, &self.path);
            }
            self.path.push(PathSegment::Name(value));
        }
        self.scan_next();
        true
    }

    fn parse_literal(&mut self) -> bool {
        let span = self.token_span();
        let value = match self.scanner.token() {
            SyntaxKind::NumericLiteral => match decode_number(self.scanner.token_value()) {
                Some(value) => value,
                None => {
                    self.report(ParseErrorCode::InvalidNumberFormat);
                    Value::from(0)
                }
            },
            SyntaxKind::NullKeyword => Value::Null,
            SyntaxKind::TrueKeyword => Value::Bool(true),
            SyntaxKind::FalseKeyword => Value::Bool(false),
            _ => return false,
        };
        if self.suppressed == 0 {
            self.visitor.on_literal_value(value, span, &self.path);
        }
        self.scan_next();
        true
    }

    fn parse_property(&mut self) -> bool {
        if self.scanner.token() != SyntaxKind::StringLiteral {
            self.error(
                ParseErrorCode::PropertyNameExpected,
                &[],
                &[SyntaxKind::CloseBrace, SyntaxKind::Comma],
            );
            return false;
        }
        self.parse_string(false);
        if self.scanner.token() == SyntaxKind::Colon {
            self.separator(':');
            self.scan_next();
            if !self.parse_value() {
                self.error(
                    ParseErrorCode::ValueExpected,
                    &[],
                    &[SyntaxKind::CloseBrace, SyntaxKind::Comma],
                );
            }
        } else {
            self.error(
                ParseErrorCode::ColonExpected,
                &[],
                &[SyntaxKind::CloseBrace, SyntaxKind::Comma],
            );
        }
        self.path.pop();
        true
    }

    fn parse_object(&mut self) -> bool {
        self.begin_object();
        self.scan_next();
        let mut needs_comma = false;
        while !matches!(
            self.scanner.token(),
            SyntaxKind::CloseBrace | SyntaxKind::Eof
        ) {
            if self.scanner.token() == SyntaxKind::Comma {
                if !needs_comma {
                    self.error(ParseErrorCode::ValueExpected, &[], &[]);
                }
                self.separator(',');
                self.scan_next();
                if self.scanner.token() == SyntaxKind::CloseBrace
                    && self.options.allow_trailing_comma
                {
                    break;
                }
            } else if needs_comma {
                self.error(ParseErrorCode::CommaExpected, &[], &[]);
            }
            if !self.parse_property() {
                self.error(
                    ParseErrorCode::ValueExpected,
                    &[],
                    &[SyntaxKind::CloseBrace, SyntaxKind::Comma],
                );
            }
            needs_comma = true;
        }
        self.end_object();
        if self.scanner.token() != SyntaxKind::CloseBrace {
            self.error(
                ParseErrorCode::CloseBraceExpected,
                &[SyntaxKind::CloseBrace],
                &[],
            );
        } else {
            self.scan_next();
        }
        true
    }

    fn parse_array(&mut self) -> bool {
        self.begin_array();
        self.scan_next();
        let mut first = true;
        let mut needs_comma = false;
        while !matches!(
            self.scanner.token(),
            SyntaxKind::CloseBracket | SyntaxKind::Eof
        ) {
            if self.scanner.token() == SyntaxKind::Comma {
                if !needs_comma {
                    self.error(ParseErrorCode::ValueExpected, &[], &[]);
                }
                self.separator(',');
                self.scan_next();
                if self.scanner.token() == SyntaxKind::CloseBracket
                    && self.options.allow_trailing_comma
                {
                    break;
                }
            } else if needs_comma {
                self.error(ParseErrorCode::CommaExpected, &[], &[]);
            }
            if first {
                self.path.push(PathSegment::Index(0));
                first = false;
            } else if let Some(PathSegment::Index(index)) = self.path.last_mut() {
                *index += 1;
            }
            if !self.parse_value() {
                self.error(
                    ParseErrorCode::ValueExpected,
                    &[],
                    &[SyntaxKind::CloseBracket, SyntaxKind::Comma],
                );
            }
            needs_comma = true;
        }
        self.end_array();
        if !first {
            self.path.pop();
        }
        if self.scanner.token() != SyntaxKind::CloseBracket {
            self.error(
                ParseErrorCode::CloseBracketExpected,
                &[SyntaxKind::CloseBracket],
                &[],
            );
        } else {
            self.scan_next();
        }
        true
    }

    fn separator(&mut self, ch: char) {
        if self.suppressed == 0 {
            let span = self.token_span();
            self.visitor.on_separator(ch, span);
        }
    }

    fn begin_object(&mut self) {
        if self.suppressed > 0 {
            self.suppressed += 1;
            return;
        }
        let span = self.token_span();
        if !self.visitor.on_object_begin(span, &self.path) {
            self.suppressed = 1;
        }
    }

    fn end_object(&mut self) {
        if self.suppressed > 0 {
            self.suppressed -= 1;
        }
        if self.suppressed == 0 {
            let span = self.token_span();
            self.visitor.on_object_end(span);
        }
    }

    fn begin_array(&mut self) {
        if self.suppressed > 0 {
            self.suppressed += 1;
            return;
        }
        let span = self.token_span();
        if !self.visitor.on_array_begin(span, &self.path) {
            self.suppressed = 1;
        }
    }

    fn end_array(&mut self) {
        if self.suppressed > 0 {
            self.suppressed -= 1;
        }
        if self.suppressed == 0 {
            let span = self.token_span();
            self.visitor.on_array_end(span);
        }
    }
}

// Integral lexemes become i64 when they fit, everything else goes through f64.
fn decode_number(raw: &str) -> Option<Value> {
    if !raw.contains(&['.', 'e', 'E'][..]) {
        if let Ok(int) = raw.parse::<i64>() {
            return Some(Value::from(int));
        }
    }
    raw.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

/// Parses the given text into a value. Recoverable problems are appended to
/// `errors` and the best-effort value is still produced; `None` is returned
/// only when no value could be recovered at all.
///
/// # Example
///
/// ```rust
/// use limberjson::{parse, ParseOptions};
///
/// let mut errors = Vec::new();
/// let value = parse(
///     "{ \"width\": /* cells */ 120 }",
///     &mut errors,
///     &ParseOptions::default(),
/// )
/// .unwrap();
/// assert!(errors.is_empty());
/// assert_eq!(value["width"], 120);
/// ```
pub fn parse(text: &str, errors: &mut Vec<ParseError>, options: &ParseOptions) -> Option<Value> {
    let mut builder = ValueBuilder {
        errors,
        stack: Vec::new(),
        current: Value::Array(Vec::new()),
        property: None,
    };
    visit(text, &mut builder, options);
    match builder.current {
        Value::Array(items) => items.into_iter().next(),
        _ => None,
    }
}

struct ValueBuilder<'e> {
    errors: &'e mut Vec<ParseError>,
    // each entry is the parent container plus the property name (if any) the
    // finished container will be attached under
    stack: Vec<(Value, Option<String>)>,
    current: Value,
    property: Option<String>,
}

impl ValueBuilder<'_> {
    fn attach(&mut self, value: Value) {
        match &mut self.current {
            Value::Array(items) => items.push(value),
            Value::Object(map) => {
                if let Some(name) = self.property.take() {
                    map.insert(name, value);
                }
            }
            _ => {}
        }
    }

    fn open(&mut self, container: Value) {
        let parent = std::mem::replace(&mut self.current, container);
        self.stack.push((parent, self.property.take()));
    }

    fn close(&mut self) {
        if let Some((parent, property)) = self.stack.pop() {
            let finished = std::mem::replace(&mut self.current, parent);
            self.property = property;
            self.attach(finished);
        }
    }
}

impl JsonVisitor for ValueBuilder<'_> {
    fn on_object_begin(&mut self, _span: TokenSpan, _path: &[PathSegment]) -> bool {
        self.open(Value::Object(serde_json::Map::new()));
        true
    }

    fn on_object_property(&mut self, name: &str, _span: TokenSpan, _path: &[PathSegment]) {
        self.property = Some(name.to_string());
    }

    fn on_object_end(&mut self, _span: TokenSpan) {
        self.close();
    }

    fn on_array_begin(&mut self, _span: TokenSpan, _path: &[PathSegment]) -> bool {
        self.open(Value::Array(Vec::new()));
        true
    }

    fn on_array_end(&mut self, _span: TokenSpan) {
        self.close();
    }

    fn on_literal_value(&mut self, value: Value, _span: TokenSpan, _path: &[PathSegment]) {
        self.attach(value);
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

/// Reports the structural context at the given byte offset: the enclosing
/// path, whether the offset sits in a property-key slot, and the most recently
/// completed node before the offset.
///
/// # Example
///
/// ```rust
/// use limberjson::{get_location, PathSegment};
///
/// let location = get_location("{ \"colors\": [\"red\"] }", 14);
/// assert_eq!(
///     location.path,
///     vec![PathSegment::Name("colors".into()), PathSegment::Index(0)]
/// );
/// assert!(!location.is_at_property_key);
/// ```
pub fn get_location(text: &str, offset: usize) -> Location {
    let mut builder = LocationBuilder {
        target: offset,
        segments: Vec::new(),
        previous: None,
        is_at_property_key: false,
        done: false,
    };
    visit(text, &mut builder, &ParseOptions::default());
    Location {
        path: builder.segments,
        previous_node: builder.previous,
        is_at_property_key: builder.is_at_property_key,
    }
}

// Walks the document until the target offset is passed, then freezes its
// state; everything after the target is ignored.
struct LocationBuilder {
    target: usize,
    segments: Vec<PathSegment>,
    previous: Option<NodeInfo>,
    is_at_property_key: bool,
    done: bool,
}

impl JsonVisitor for LocationBuilder {
    fn on_object_begin(&mut self, span: TokenSpan, _path: &[PathSegment]) -> bool {
        if self.done {
            return false;
        }
        if self.target <= span.offset {
            self.done = true;
            return false;
        }
        self.previous = None;
        self.is_at_property_key = true;
        // placeholder until the first property name is seen
        self.segments.push(PathSegment::Name(String::new()));
        true
    }

    fn on_object_property(&mut self, name: &str, span: TokenSpan, _path: &[PathSegment]) {
        if self.done {
            return;
        }
        if self.target < span.offset {
            self.done = true;
            return;
        }
        self.previous = Some(NodeInfo {
            node_type: NodeType::Property,
            value: Some(Value::String(name.to_string())),
            offset: span.offset,
            length: span.length,
        });
        if let Some(last) = self.segments.last_mut() {
            *last = PathSegment::Name(name.to_string());
        }
        if self.target <= span.offset + span.length {
            self.done = true;
        }
    }

    fn on_object_end(&mut self, span: TokenSpan) {
        if self.done {
            return;
        }
        if self.target <= span.offset {
            self.done = true;
            return;
        }
        self.previous = None;
        self.is_at_property_key = false;
        self.segments.pop();
    }

    fn on_array_begin(&mut self, span: TokenSpan, _path: &[PathSegment]) -> bool {
        if self.done {
            return false;
        }
        if self.target <= span.offset {
            self.done = true;
            return false;
        }
        self.previous = None;
        self.is_at_property_key = false;
        self.segments.push(PathSegment::Index(0));
        true
    }

    fn on_array_end(&mut self, span: TokenSpan) {
        if self.done {
            return;
        }
        if self.target <= span.offset {
            self.done = true;
            return;
        }
        self.previous = None;
        self.is_at_property_key = false;
        self.segments.pop();
    }

    fn on_literal_value(&mut self, value: Value, span: TokenSpan, _path: &[PathSegment]) {
        if self.done {
            return;
        }
        if self.target < span.offset {
            self.done = true;
            return;
        }
        self.previous = Some(NodeInfo {
            node_type: node_type_of(&value),
            value: Some(value),
            offset: span.offset,
            length: span.length,
        });
        if self.target <= span.offset + span.length {
            self.done = true;
        }
    }

    fn on_separator(&mut self, separator: char, span: TokenSpan) {
        if self.done {
            return;
        }
        if self.target <= span.offset {
            self.done = true;
            return;
        }
        if separator == ':'
            && matches!(&self.previous, Some(node) if node.node_type == NodeType::Property)
        {
            self.is_at_property_key = false;
            self.previous = None;
        } else if separator == ',' {
            match self.segments.last_mut() {
                Some(PathSegment::Index(index)) => *index += 1,
                _ => self.is_at_property_key = true,
            }
            self.previous = None;
        }
    }
}
