use std::fmt::{self, Debug};

/// Options controlling how tolerant the parser is.
///
/// The defaults are the strictest setting: comments are allowed (they are the
/// point of this crate) but trailing commas and empty documents are reported
/// as errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseOptions {
    /// Report every comment as an `InvalidCommentToken` error. The comment is
    /// still skipped and parsing continues.
    /// Default: false.
    pub disallow_comments: bool,

    /// Accept a trailing comma before `}` or `]` without recording an error.
    /// Default: false.
    pub allow_trailing_comma: bool,

    /// Accept a document that contains no value (only trivia) without
    /// recording an error.
    /// Default: false.
    pub allow_empty_content: bool,
}

/// Options controlling whitespace normalization in [`format`](crate::format).
///
/// # Example
///
/// ```rust
/// use limberjson::FormattingOptions;
///
/// let options = FormattingOptions {
///     tab_size: 2,
///     eol: Some("\n".to_string()),
///     ..FormattingOptions::default()
/// };
/// assert!(options.insert_spaces);
/// ```
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    /// Number of spaces per indentation level (a value of 0 behaves as 4).
    /// Ignored when `insert_spaces` is false.
    /// Default: 4.
    pub tab_size: usize,

    /// Indent with spaces instead of tabs.
    /// Default: true.
    pub insert_spaces: bool,

    /// Line ending to emit. When `None`, the first line break found in the
    /// document is reused, falling back to `"\n"`.
    /// Default: `None`.
    pub eol: Option<String>,

    /// Emit a single line ending at the end of a non-empty document.
    /// Default: false.
    pub insert_final_newline: bool,

    /// Preserve the author's line breaks: the number of line breaks between
    /// two tokens is kept, and positions where the default policy would break
    /// the line get a single space instead when the author kept them on one
    /// line.
    /// Default: false.
    pub keep_lines: bool,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            tab_size: 4,
            insert_spaces: true,
            eol: None,
            insert_final_newline: false,
            keep_lines: false,
        }
    }
}

/// Options for [`modify`](crate::modify).
pub struct ModificationOptions<'a> {
    /// How inserted fragments are indented and spaced.
    pub formatting_options: FormattingOptions,

    /// Chooses the position of a newly inserted object property, given the
    /// existing keys in document order. When absent, new properties are
    /// appended.
    pub get_insertion_index: Option<&'a dyn Fn(&[String]) -> usize>,

    /// When true, an array index in the path inserts before the existing
    /// element at that index (elements shift right) instead of replacing it.
    /// Default: false.
    pub is_array_insertion: bool,
}

impl Default for ModificationOptions<'_> {
    fn default() -> Self {
        Self {
            formatting_options: FormattingOptions::default(),
            get_insertion_index: None,
            is_array_insertion: false,
        }
    }
}

impl Debug for ModificationOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModificationOptions")
            .field("formatting_options", &self.formatting_options)
            .field("get_insertion_index", &self.get_insertion_index.is_some())
            .field("is_array_insertion", &self.is_array_insertion)
            .finish()
    }
}
