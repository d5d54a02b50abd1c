use crate::model::{ScanError, SyntaxKind};

/// A streaming tokenizer for JSON with JavaScript-style extensions.
///
/// The scanner walks the text one token at a time, tracking the byte offset,
/// line and column of every token start. It never fails: problems such as an
/// unterminated string or a malformed escape are attached to the produced
/// token as a [`ScanError`] and scanning continues.
///
/// All reported offsets, lengths and columns are UTF-8 byte based and refer to
/// the text the scanner was created with. Lines and columns are 0-based.
///
/// # Example
///
/// ```rust
/// use limberjson::{Scanner, SyntaxKind};
///
/// let mut scanner = Scanner::new("{ \"a\": 1 }", true);
/// assert_eq!(scanner.scan(), SyntaxKind::OpenBrace);
/// assert_eq!(scanner.scan(), SyntaxKind::StringLiteral);
/// assert_eq!(scanner.token_value(), "a");
/// ```
pub struct Scanner {
    text: String,
    chars: Vec<char>,
    // byte_offsets[i] is the byte offset of chars[i]; one extra trailing entry
    // holds text.len() so every char position maps to a byte position
    byte_offsets: Vec<usize>,
    ignore_trivia: bool,

    pos: usize,
    token: SyntaxKind,
    token_offset: usize,
    value: String,
    scan_error: ScanError,

    line: usize,
    line_start: usize,
    token_line: usize,
    token_line_start: usize,
}

impl Scanner {
    /// Creates a scanner over `text`. When `ignore_trivia` is true, [`scan`]
    /// skips whitespace, line breaks and comments and only returns
    /// content-bearing tokens.
    ///
    /// [`scan`]: Scanner::scan
    pub fn new(text: &str, ignore_trivia: bool) -> Self {
        let mut chars = Vec::new();
        let mut byte_offsets = Vec::new();
        for (idx, ch) in text.char_indices() {
            byte_offsets.push(idx);
            chars.push(ch);
        }
        byte_offsets.push(text.len());

        Self {
            text: text.to_string(),
            chars,
            byte_offsets,
            ignore_trivia,
            pos: 0,
            token: SyntaxKind::Unknown,
            token_offset: 0,
            value: String::new(),
            scan_error: ScanError::None,
            line: 0,
            line_start: 0,
            token_line: 0,
            token_line_start: 0,
        }
    }

    /// Moves the read head to the given byte offset and resets the token
    /// state. The next token is only available after a [`scan`] call.
    ///
    /// [`scan`]: Scanner::scan
    pub fn set_position(&mut self, offset: usize) {
        let target = self.char_index_of(offset);
        self.pos = target;
        self.token = SyntaxKind::Unknown;
        self.token_offset = target;
        self.value.clear();
        self.scan_error = ScanError::None;

        // re-derive line bookkeeping for the new position
        self.line = 0;
        self.line_start = 0;
        let mut i = 0;
        while i < target {
            match self.chars[i] {
                '\r' => {
                    i += 1;
                    if self.chars.get(i) == Some(&'\n') {
                        i += 1;
                    }
                    self.line += 1;
                    self.line_start = i;
                }
                '\n' => {
                    i += 1;
                    self.line += 1;
                    self.line_start = i;
                }
                _ => i += 1,
            }
        }
        self.token_line = self.line;
        self.token_line_start = self.line_start;
    }

    /// Scans the next token and returns its kind. Once the end of input is
    /// reached, every further call returns [`SyntaxKind::Eof`].
    pub fn scan(&mut self) -> SyntaxKind {
        if self.ignore_trivia {
            loop {
                let kind = self.scan_next();
                if !kind.is_trivia() {
                    return kind;
                }
            }
        } else {
            self.scan_next()
        }
    }

    /// The kind of the current token.
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// Byte offset of the current token's start.
    pub fn token_offset(&self) -> usize {
        self.byte_offsets[self.token_offset]
    }

    /// Byte length of the current token's lexeme.
    pub fn token_length(&self) -> usize {
        self.byte_offsets[self.pos] - self.byte_offsets[self.token_offset]
    }

    /// The current token's value: the decoded content for a string literal
    /// (escape sequences resolved, quotes removed), the raw lexeme for other
    /// content-bearing tokens, and the empty string for trivia and EOF.
    ///
    /// For a numeric literal with a dangling exponent (`1e`), the value is the
    /// valid prefix while the lexeme covers the full span.
    pub fn token_value(&self) -> &str {
        match self.token {
            SyntaxKind::StringLiteral | SyntaxKind::NumericLiteral => &self.value,
            SyntaxKind::Trivia
            | SyntaxKind::LineBreakTrivia
            | SyntaxKind::LineCommentTrivia
            | SyntaxKind::BlockCommentTrivia
            | SyntaxKind::Eof => "",
            _ => {
                let start = self.byte_offsets[self.token_offset];
                let end = self.byte_offsets[self.pos];
                &self.text[start..end]
            }
        }
    }

    /// 0-based line of the current token's start.
    pub fn token_start_line(&self) -> usize {
        self.token_line
    }

    /// 0-based column (in bytes) of the current token's start within its line.
    pub fn token_start_character(&self) -> usize {
        self.byte_offsets[self.token_offset] - self.byte_offsets[self.token_line_start]
    }

    /// The scan error attached to the current token, if any.
    pub fn token_error(&self) -> ScanError {
        self.scan_error
    }

    fn char_index_of(&self, byte_offset: usize) -> usize {
        self.byte_offsets
            .partition_point(|&b| b < byte_offset)
            .min(self.chars.len())
    }

    fn current(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn scan_next(&mut self) -> SyntaxKind {
        self.value.clear();
        self.scan_error = ScanError::None;
        self.token_offset = self.pos;
        self.token_line = self.line;
        self.token_line_start = self.line_start;

        let Some(ch) = self.current() else {
            self.token_offset = self.chars.len();
            self.token = SyntaxKind::Eof;
            return self.token;
        };

        if ch == ' ' || ch == '\t' {
            while matches!(self.current(), Some(' ') | Some('\t')) {
                self.pos += 1;
            }
            self.token = SyntaxKind::Trivia;
            return self.token;
        }

        if ch == '\r' || ch == '\n' {
            self.pos += 1;
            if ch == '\r' && self.current() == Some('\n') {
                self.pos += 1;
            }
            self.line += 1;
            self.line_start = self.pos;
            self.token = SyntaxKind::LineBreakTrivia;
            return self.token;
        }

        match ch {
            '{' => self.single(SyntaxKind::OpenBrace),
            '}' => self.single(SyntaxKind::CloseBrace),
            '[' => self.single(SyntaxKind::OpenBracket),
            ']' => self.single(SyntaxKind::CloseBracket),
            ':' => self.single(SyntaxKind::Colon),
            ',' => self.single(SyntaxKind::Comma),
            '"' => {
                self.pos += 1;
                self.scan_string();
                self.token = SyntaxKind::StringLiteral;
                self.token
            }
            '/' => self.scan_comment_or_unknown(),
            '-' => {
                self.pos += 1;
                if !matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                    self.token = SyntaxKind::Unknown;
                    return self.token;
                }
                self.scan_number();
                self.token = SyntaxKind::NumericLiteral;
                self.token
            }
            '0'..='9' => {
                self.scan_number();
                self.token = SyntaxKind::NumericLiteral;
                self.token
            }
            _ => {
                // keywords and other unknown content; runs stop at digits so
                // that e.g. `.0` yields an unknown token followed by a number
                while matches!(self.current(), Some(c) if is_unknown_content_char(c)) {
                    self.pos += 1;
                }
                if self.pos != self.token_offset {
                    let start = self.byte_offsets[self.token_offset];
                    let end = self.byte_offsets[self.pos];
                    self.token = match &self.text[start..end] {
                        "true" => SyntaxKind::TrueKeyword,
                        "false" => SyntaxKind::FalseKeyword,
                        "null" => SyntaxKind::NullKeyword,
                        _ => SyntaxKind::Unknown,
                    };
                } else {
                    self.pos += 1;
                    self.token = SyntaxKind::Unknown;
                }
                self.token
            }
        }
    }

    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        self.token = kind;
        self.token
    }

    fn scan_comment_or_unknown(&mut self) -> SyntaxKind {
        match self.peek(1) {
            Some('/') => {
                self.pos += 2;
                while let Some(ch) = self.current() {
                    if ch == '\r' || ch == '\n' {
                        break;
                    }
                    self.pos += 1;
                }
                self.token = SyntaxKind::LineCommentTrivia;
            }
            Some('*') => {
                self.pos += 2;
                let mut closed = false;
                while self.pos + 1 < self.chars.len() {
                    let ch = self.chars[self.pos];
                    if ch == '*' && self.chars[self.pos + 1] == '/' {
                        self.pos += 2;
                        closed = true;
                        break;
                    }
                    self.pos += 1;
                    if ch == '\r' || ch == '\n' {
                        if ch == '\r' && self.current() == Some('\n') {
                            self.pos += 1;
                        }
                        self.line += 1;
                        self.line_start = self.pos;
                    }
                }
                if !closed {
                    self.pos = (self.pos + 1).min(self.chars.len());
                    self.scan_error = ScanError::UnexpectedEndOfComment;
                }
                self.token = SyntaxKind::BlockCommentTrivia;
            }
            _ => {
                self.pos += 1;
                self.token = SyntaxKind::Unknown;
            }
        }
        self.token
    }

    // The opening quote is already consumed. Decodes the content into
    // self.value and leaves the read head after the closing quote.
    fn scan_string(&mut self) {
        let mut run_start = self.pos;
        loop {
            let Some(ch) = self.current() else {
                self.append_chars(run_start, self.pos);
                self.scan_error = ScanError::UnexpectedEndOfString;
                return;
            };
            if ch == '"' {
                self.append_chars(run_start, self.pos);
                self.pos += 1;
                return;
            }
            if ch == '\\' {
                self.append_chars(run_start, self.pos);
                self.pos += 1;
                let Some(escaped) = self.current() else {
                    self.scan_error = ScanError::UnexpectedEndOfString;
                    return;
                };
                self.pos += 1;
                match escaped {
                    '"' => self.value.push('"'),
                    '\\' => self.value.push('\\'),
                    '/' => self.value.push('/'),
                    'b' => self.value.push('\u{8}'),
                    'f' => self.value.push('\u{c}'),
                    'n' => self.value.push('\n'),
                    'r' => self.value.push('\r'),
                    't' => self.value.push('\t'),
                    'u' => match self.scan_unicode_escape() {
                        Some(decoded) => self.value.push(decoded),
                        None => self.scan_error = ScanError::InvalidUnicode,
                    },
                    _ => self.scan_error = ScanError::InvalidEscapeCharacter,
                }
                run_start = self.pos;
                continue;
            }
            if (ch as u32) <= 0x1f {
                if ch == '\r' || ch == '\n' {
                    // the line break is not part of the string and stays unconsumed
                    self.append_chars(run_start, self.pos);
                    self.scan_error = ScanError::UnexpectedEndOfString;
                    return;
                }
                self.scan_error = ScanError::InvalidCharacter;
                // the raw character stays part of the string value
            }
            self.pos += 1;
        }
    }

    fn append_chars(&mut self, start: usize, end: usize) {
        self.value.extend(self.chars[start..end].iter());
    }

    // Reads exactly `count` hex digits; consumed digits stay consumed even on
    // failure.
    fn scan_hex_digits(&mut self, count: usize) -> Option<u32> {
        let mut result = 0u32;
        for _ in 0..count {
            let digit = self.current().and_then(|c| c.to_digit(16))?;
            result = result * 16 + digit;
            self.pos += 1;
        }
        Some(result)
    }

    // The `u` of the escape is already consumed. Combines surrogate pairs that
    // are written as two consecutive escapes; a lone surrogate becomes U+FFFD.
    fn scan_unicode_escape(&mut self) -> Option<char> {
        let first = self.scan_hex_digits(4)?;
        if (0xD800..=0xDBFF).contains(&first) {
            if self.current() == Some('\\') && self.peek(1) == Some('u') {
                let saved = self.pos;
                self.pos += 2;
                if let Some(second) = self.scan_hex_digits(4) {
                    if (0xDC00..=0xDFFF).contains(&second) {
                        let combined = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
                        return char::from_u32(combined);
                    }
                }
                self.pos = saved;
            }
            Some(char::REPLACEMENT_CHARACTER)
        } else if (0xDC00..=0xDFFF).contains(&first) {
            Some(char::REPLACEMENT_CHARACTER)
        } else {
            char::from_u32(first)
        }
    }

    // The caller guarantees the read head is on a digit, or that a leading
    // minus was consumed and a digit follows.
    fn scan_number(&mut self) {
        if self.current() == Some('0') {
            self.pos += 1;
        } else {
            self.pos += 1;
            while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        if self.current() == Some('.') {
            self.pos += 1;
            if matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
                while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
            } else {
                self.scan_error = ScanError::UnexpectedEndOfNumber;
                self.set_number_value(self.pos);
                return;
            }
        }
        let mut end = self.pos;
        if matches!(self.current(), Some('e') | Some('E')) {
            self.pos += 1;
            if matches!(self.current(), Some('+') | Some('-')) {
                self.pos += 1;
            }
            if matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
                while matches!(self.current(), Some(c) if c.is_ascii_digit()) {
                    self.pos += 1;
                }
                end = self.pos;
            } else {
                self.scan_error = ScanError::UnexpectedEndOfNumber;
            }
        }
        self.set_number_value(end);
    }

    fn set_number_value(&mut self, end: usize) {
        self.value = self.chars[self.token_offset..end].iter().collect();
    }
}

fn is_unknown_content_char(ch: char) -> bool {
    !matches!(
        ch,
        ' ' | '\t' | '\r' | '\n' | '{' | '}' | '[' | ']' | '"' | ':' | ',' | '/'
    ) && !ch.is_ascii_digit()
}

/// Replaces every non-newline character inside comments with a space,
/// preserving all offsets of the remaining content.
pub fn strip_comments(text: &str) -> String {
    strip_comments_with(text, ' ')
}

/// Like [`strip_comments`], with a caller-chosen filler character. Offsets are
/// preserved when `replace_ch` encodes to a single byte.
pub fn strip_comments_with(text: &str, replace_ch: char) -> String {
    let mut scanner = Scanner::new(text, false);
    let mut out = String::with_capacity(text.len());
    loop {
        let kind = scanner.scan();
        let start = scanner.token_offset();
        let end = start + scanner.token_length();
        match kind {
            SyntaxKind::LineCommentTrivia | SyntaxKind::BlockCommentTrivia => {
                for ch in text[start..end].chars() {
                    if ch == '\r' || ch == '\n' {
                        out.push(ch);
                    } else {
                        out.push(replace_ch);
                    }
                }
            }
            SyntaxKind::Eof => break,
            _ => out.push_str(&text[start..end]),
        }
    }
    out
}
