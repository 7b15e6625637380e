//! Batch and statement splitting for schema scripts
//!
//! Scripts are first masked (comments and string literal contents blanked
//! out), then split into `GO` batches, then into table statements. A table
//! statement never extends past the end of its batch.

use std::sync::LazyLock;

use regex::Regex;

/// Start of a statement the extractor cares about
static TABLE_STATEMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:CREATE|ALTER)\s+TABLE\b").unwrap());

/// A SQL batch with its content and source location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a> {
    pub content: &'a str,
    /// 1-based line number of the first line of the batch
    pub start_line: usize,
}

#[derive(Clone, Copy)]
enum ScanState {
    Code,
    LineComment,
    /// T-SQL block comments nest
    BlockComment(usize),
    StringLiteral,
    BracketIdentifier,
    QuotedIdentifier,
}

/// Blank out comments and the contents of string literals.
///
/// Comments are replaced by spaces and string literal contents by spaces,
/// keeping the quotes. Newlines are always kept so line numbers and `GO`
/// lines survive. Bracketed and double-quoted identifiers are copied
/// unchanged, and comment markers inside them are not comments.
pub fn mask_comments_and_literals(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut state = ScanState::Code;

    while let Some(c) = chars.next() {
        match state {
            ScanState::Code => match c {
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    out.push_str("  ");
                    state = ScanState::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = ScanState::BlockComment(1);
                }
                '\'' => {
                    out.push(c);
                    state = ScanState::StringLiteral;
                }
                '[' => {
                    out.push(c);
                    state = ScanState::BracketIdentifier;
                }
                '"' => {
                    out.push(c);
                    state = ScanState::QuotedIdentifier;
                }
                _ => out.push(c),
            },
            ScanState::LineComment => {
                if c == '\n' {
                    out.push(c);
                    state = ScanState::Code;
                } else {
                    out.push(blank(c));
                }
            }
            ScanState::BlockComment(depth) => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = if depth == 1 {
                        ScanState::Code
                    } else {
                        ScanState::BlockComment(depth - 1)
                    };
                } else if c == '/' && chars.peek() == Some(&'*') {
                    chars.next();
                    out.push_str("  ");
                    state = ScanState::BlockComment(depth + 1);
                } else {
                    out.push(blank(c));
                }
            }
            ScanState::StringLiteral => {
                if c == '\'' {
                    // '' is an escaped quote inside the literal
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                        out.push_str("  ");
                    } else {
                        out.push(c);
                        state = ScanState::Code;
                    }
                } else {
                    out.push(blank(c));
                }
            }
            ScanState::BracketIdentifier => {
                out.push(c);
                if c == ']' {
                    if chars.peek() == Some(&']') {
                        chars.next();
                        out.push(']');
                    } else {
                        state = ScanState::Code;
                    }
                }
            }
            ScanState::QuotedIdentifier => {
                out.push(c);
                if c == '"' {
                    state = ScanState::Code;
                }
            }
        }
    }

    out
}

fn blank(c: char) -> char {
    if c == '\n' || c == '\r' {
        c
    } else {
        ' '
    }
}

/// Returns true if the line is a `GO` batch separator
pub fn is_batch_separator(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.eq_ignore_ascii_case("go") || trimmed.eq_ignore_ascii_case("go;")
}

/// Split a script into the batches between `GO` lines.
///
/// Separator lines belong to no batch and batches with no text between two
/// separators are dropped.
pub fn split_batches(script: &str) -> Vec<Batch<'_>> {
    let mut batches = Vec::new();
    let mut start = 0;
    let mut start_line = 1;
    let mut offset = 0;

    for (index, line) in script.split_inclusive('\n').enumerate() {
        let next = offset + line.len();
        if is_batch_separator(line) {
            if offset > start {
                batches.push(Batch {
                    content: &script[start..offset],
                    start_line,
                });
            }
            start = next;
            start_line = index + 2;
        }
        offset = next;
    }

    if start < script.len() {
        batches.push(Batch {
            content: &script[start..],
            start_line,
        });
    }

    batches
}

/// Copy of `sql` with the inside of bracketed and quoted identifiers blanked.
///
/// Byte offsets are unchanged, so a keyword found in the copy can be used to
/// slice `sql`. Expects text already passed through
/// [`mask_comments_and_literals`].
pub fn blank_identifiers(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut chars = sql.chars().peekable();
    let mut closing: Option<char> = None;

    while let Some(c) = chars.next() {
        match closing {
            None => {
                out.push(c);
                closing = match c {
                    '[' => Some(']'),
                    '"' => Some('"'),
                    _ => None,
                };
            }
            Some(end) if c == end => {
                // doubled closer is an escape
                if chars.peek() == Some(&end) {
                    chars.next();
                    out.push_str("  ");
                } else {
                    out.push(c);
                    closing = None;
                }
            }
            Some(_) if c == '\n' => out.push(c),
            Some(_) => out.extend(std::iter::repeat_n(' ', c.len_utf8())),
        }
    }

    out
}

/// Split a batch into `CREATE TABLE` / `ALTER TABLE` statements.
///
/// Each statement runs from its keyword to the next table statement or the
/// end of the batch. Text before the first table statement is dropped, and
/// the keywords are not recognized inside `[...]` or `"..."` identifiers.
pub fn split_table_statements(batch: &str) -> Vec<&str> {
    let keywords = blank_identifiers(batch);
    let starts: Vec<usize> = TABLE_STATEMENT_RE
        .find_iter(&keywords)
        .map(|m| m.start())
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(batch.len());
            batch[start..end].trim_end()
        })
        .collect()
}
