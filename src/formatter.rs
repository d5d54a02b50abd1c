use crate::model::{Edit, ScanError, SyntaxKind, TextRange};
use crate::options::FormattingOptions;
use crate::scanner::Scanner;

/// Computes the minimal ordered edits that normalize whitespace and
/// indentation of a JSONC document.
///
/// When `range` is given, it is expanded outward to whole lines, the initial
/// indentation level is derived from the leading whitespace of the first of
/// those lines, and only edits overlapping the original range are returned.
/// Comments are never removed or rewritten, only the whitespace around them is
/// adjusted. On malformed input, edits around the offending tokens are
/// suppressed so that the text is never made worse.
///
/// The returned edits are sorted by offset and do not overlap.
///
/// # Example
///
/// ```rust
/// use limberjson::{apply_edits, format, FormattingOptions};
///
/// let options = FormattingOptions {
///     tab_size: 2,
///     eol: Some("\n".to_string()),
///     ..FormattingOptions::default()
/// };
/// let edits = format("{\"x\" : 1}", None, &options);
/// assert_eq!(apply_edits("{\"x\" : 1}", &edits).unwrap(), "{\n  \"x\": 1\n}");
/// ```
pub fn format(text: &str, range: Option<TextRange>, options: &FormattingOptions) -> Vec<Edit> {
    let (range_start, range_end, format_start, format_text, initial_indent_level) = match range {
        Some(range) => {
            let range_start = range.offset.min(text.len());
            let range_end = (range.offset + range.length).min(text.len());
            let mut start = range_start;
            while start > 0 && !is_eol_byte(text.as_bytes()[start - 1]) {
                start -= 1;
            }
            let mut end = range_end;
            while end < text.len() && !is_eol_byte(text.as_bytes()[end]) {
                end += 1;
            }
            let slice = &text[start..end];
            (
                range_start,
                range_end,
                start,
                slice,
                compute_indent_level(slice, options),
            )
        }
        None => (0, text.len(), 0, text, 0),
    };
    let range_filter = range.map(|_| (range_start, range_end));

    let eol = detect_eol(options, text);
    let keep = options.keep_lines;
    let mut indents = IndentPool::new(indent_unit(options));
    let mut scanner = Scanner::new(format_text, false);
    let mut edits: Vec<Edit> = Vec::new();
    let mut has_error = false;
    let mut line_breaks = 0usize;
    let mut indent_level = 0isize;

    let mut first_token = scan_next(&mut scanner, &mut line_breaks, &mut has_error, keep);
    // scan_next reports only the token it just scanned; the left-hand side of
    // each gap is remembered here so a malformed token suppresses both of its
    // neighboring gaps
    let mut first_token_error = has_error;

    if first_token != SyntaxKind::Eof {
        let first_token_start = scanner.token_offset() + format_start;
        let content = if keep && line_breaks > 0 {
            eol.repeat(line_breaks)
        } else {
            indents.get(initial_indent_level).to_string()
        };
        push_edit(
            &mut edits,
            text,
            has_error,
            range_filter,
            &content,
            format_start,
            first_token_start,
        );
    }

    while first_token != SyntaxKind::Eof {
        let mut first_token_end = scanner.token_offset() + scanner.token_length() + format_start;
        let mut second_token = scan_next(&mut scanner, &mut line_breaks, &mut has_error, keep);

        let mut replace_content = String::new();
        let mut needs_line_break = false;

        // comments directly following a token stay glued to it with one space
        while line_breaks == 0
            && matches!(
                second_token,
                SyntaxKind::LineCommentTrivia | SyntaxKind::BlockCommentTrivia
            )
        {
            let comment_start = scanner.token_offset() + format_start;
            push_edit(
                &mut edits,
                text,
                first_token_error || has_error,
                range_filter,
                " ",
                first_token_end,
                comment_start,
            );
            first_token_end = scanner.token_offset() + scanner.token_length() + format_start;
            // the comment is now the left-hand side of the next gap
            first_token_error = has_error;
            needs_line_break = second_token == SyntaxKind::LineCommentTrivia;
            second_token = scan_next(&mut scanner, &mut line_breaks, &mut has_error, keep);
        }
        let second_token_error = has_error;

        let level = initial_indent_level as isize + indent_level;
        if second_token == SyntaxKind::CloseBrace {
            if first_token != SyntaxKind::OpenBrace {
                indent_level -= 1;
            }
            let level = initial_indent_level as isize + indent_level;
            if (keep && line_breaks > 0) || (!keep && first_token != SyntaxKind::OpenBrace) {
                replace_content = break_and_indent(&eol, line_breaks, &mut indents, level);
            } else if keep {
                replace_content = " ".to_string();
            }
        } else if second_token == SyntaxKind::CloseBracket {
            if first_token != SyntaxKind::OpenBracket {
                indent_level -= 1;
            }
            let level = initial_indent_level as isize + indent_level;
            if (keep && line_breaks > 0) || (!keep && first_token != SyntaxKind::OpenBracket) {
                replace_content = break_and_indent(&eol, line_breaks, &mut indents, level);
            } else if keep {
                replace_content = " ".to_string();
            }
        } else {
            match first_token {
                SyntaxKind::OpenBrace | SyntaxKind::OpenBracket => {
                    indent_level += 1;
                    let level = initial_indent_level as isize + indent_level;
                    replace_content = if keep && line_breaks == 0 {
                        " ".to_string()
                    } else {
                        break_and_indent(&eol, line_breaks, &mut indents, level)
                    };
                }
                SyntaxKind::Comma => {
                    replace_content = if keep && line_breaks == 0 {
                        " ".to_string()
                    } else {
                        break_and_indent(&eol, line_breaks, &mut indents, level)
                    };
                }
                SyntaxKind::LineCommentTrivia => {
                    replace_content = break_and_indent(&eol, line_breaks, &mut indents, level);
                }
                SyntaxKind::BlockCommentTrivia => {
                    if line_breaks > 0 {
                        replace_content = break_and_indent(&eol, line_breaks, &mut indents, level);
                    } else if !needs_line_break {
                        replace_content = " ".to_string();
                    }
                }
                SyntaxKind::Colon => {
                    if keep && line_breaks > 0 {
                        replace_content = break_and_indent(&eol, line_breaks, &mut indents, level);
                    } else if !needs_line_break {
                        replace_content = " ".to_string();
                    }
                }
                SyntaxKind::StringLiteral
                | SyntaxKind::NullKeyword
                | SyntaxKind::TrueKeyword
                | SyntaxKind::FalseKeyword
                | SyntaxKind::NumericLiteral
                | SyntaxKind::CloseBrace
                | SyntaxKind::CloseBracket => {
                    if first_token == SyntaxKind::StringLiteral && second_token == SyntaxKind::Colon
                    {
                        // nothing between a key and its colon
                        if keep && line_breaks > 0 {
                            replace_content =
                                break_and_indent(&eol, line_breaks, &mut indents, level);
                        }
                    } else if keep && line_breaks > 0 {
                        replace_content = break_and_indent(&eol, line_breaks, &mut indents, level);
                    } else if matches!(
                        second_token,
                        SyntaxKind::LineCommentTrivia | SyntaxKind::BlockCommentTrivia
                    ) {
                        if !needs_line_break {
                            replace_content = " ".to_string();
                        }
                    } else if second_token != SyntaxKind::Comma && second_token != SyntaxKind::Eof {
                        has_error = true;
                    }
                }
                SyntaxKind::Unknown => {
                    has_error = true;
                }
                _ => {}
            }
            if line_breaks > 0
                && matches!(
                    second_token,
                    SyntaxKind::LineCommentTrivia | SyntaxKind::BlockCommentTrivia
                )
            {
                let level = initial_indent_level as isize + indent_level;
                replace_content = break_and_indent(&eol, line_breaks, &mut indents, level);
            }
        }

        // a merged trailing line comment forces a line break before whatever follows
        if needs_line_break && !replace_content.starts_with(eol.as_str()) {
            let level = initial_indent_level as isize + indent_level;
            replace_content = break_and_indent(&eol, line_breaks, &mut indents, level);
        }

        if second_token == SyntaxKind::Eof {
            replace_content = if keep && line_breaks > 0 {
                eol.repeat(line_breaks)
            } else if options.insert_final_newline {
                eol.clone()
            } else {
                String::new()
            };
        }

        let second_token_start = scanner.token_offset() + format_start;
        push_edit(
            &mut edits,
            text,
            first_token_error || has_error,
            range_filter,
            &replace_content,
            first_token_end,
            second_token_start,
        );
        first_token = second_token;
        first_token_error = second_token_error;
    }

    edits
}

fn scan_next(
    scanner: &mut Scanner,
    line_breaks: &mut usize,
    has_error: &mut bool,
    keep_lines: bool,
) -> SyntaxKind {
    let mut token = scanner.scan();
    *line_breaks = 0;
    while matches!(token, SyntaxKind::Trivia | SyntaxKind::LineBreakTrivia) {
        if token == SyntaxKind::LineBreakTrivia {
            if keep_lines {
                *line_breaks += 1;
            } else {
                *line_breaks = 1;
            }
        }
        token = scanner.scan();
    }
    *has_error = token == SyntaxKind::Unknown || scanner.token_error() != ScanError::None;
    token
}

fn push_edit(
    edits: &mut Vec<Edit>,
    text: &str,
    has_error: bool,
    range: Option<(usize, usize)>,
    content: &str,
    start: usize,
    end: usize,
) {
    if has_error {
        return;
    }
    if let Some((range_start, range_end)) = range {
        if !(start < range_end && end > range_start) {
            return;
        }
    }
    if &text[start..end] != content {
        edits.push(Edit {
            offset: start,
            length: end - start,
            content: content.to_string(),
        });
    }
}

fn break_and_indent(eol: &str, line_breaks: usize, indents: &mut IndentPool, level: isize) -> String {
    let mut result = eol.repeat(line_breaks.max(1));
    result.push_str(indents.get(level.max(0) as usize));
    result
}

// Indent strings are built once per depth and reused.
struct IndentPool {
    unit: String,
    levels: Vec<String>,
}

impl IndentPool {
    fn new(unit: String) -> Self {
        Self {
            unit,
            levels: vec![String::new()],
        }
    }

    fn get(&mut self, level: usize) -> &str {
        while self.levels.len() <= level {
            let next = format!("{}{}", self.levels.last().expect("pool seeded"), self.unit);
            self.levels.push(next);
        }
        &self.levels[level]
    }
}

fn indent_unit(options: &FormattingOptions) -> String {
    if options.insert_spaces {
        " ".repeat(effective_tab_size(options))
    } else {
        "\t".to_string()
    }
}

fn effective_tab_size(options: &FormattingOptions) -> usize {
    if options.tab_size > 0 {
        options.tab_size
    } else {
        4
    }
}

// The document's own line ending wins; the option is the fallback.
fn detect_eol(options: &FormattingOptions, text: &str) -> String {
    let bytes = text.as_bytes();
    for (i, &byte) in bytes.iter().enumerate() {
        match byte {
            b'\r' => {
                if bytes.get(i + 1) == Some(&b'\n') {
                    return "\r\n".to_string();
                }
                return "\r".to_string();
            }
            b'\n' => return "\n".to_string(),
            _ => {}
        }
    }
    options.eol.clone().unwrap_or_else(|| "\n".to_string())
}

fn compute_indent_level(content: &str, options: &FormattingOptions) -> usize {
    let tab_size = effective_tab_size(options);
    let mut width = 0;
    for ch in content.chars() {
        match ch {
            ' ' => width += 1,
            '\t' => width += tab_size,
            _ => break,
        }
    }
    width / tab_size
}

pub(crate) fn is_eol_byte(byte: u8) -> bool {
    byte == b'\r' || byte == b'\n'
}
