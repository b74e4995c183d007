// Wed Oct 14 2026 - Alex

use super::error::{StoreError, StoreResult};
use crate::query::ParseError;
use crate::utils::fs::{ensure_parent_dir, read_optional, write_atomic};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::mem::take;
use std::path::Path;

/// Field separator of every log file.
pub const FIELD_SEPARATOR: char = ';';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedRow {
    /// 1-based line in the source file, header included.
    pub line: usize,
    pub fields: Vec<String>,
}

impl DelimitedRow {
    pub fn as_strs(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.as_str()).collect()
    }
}

/// Splits text into lines of fields. Quotes protect separators and line
/// breaks; `""` inside quotes is a literal quote. Blank lines are skipped.
pub fn parse_lines(text: &str, sep: char) -> Vec<DelimitedRow> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_line = 1;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes && matches!(chars.peek(), Some('"')) {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = !in_quotes;
                }
            }
            c if c == sep && !in_quotes => fields.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) {
                    chars.next();
                }
                fields.push(take(&mut field));
                if !(fields.len() == 1 && fields[0].is_empty()) {
                    rows.push(DelimitedRow { line: row_line, fields: take(&mut fields) });
                } else {
                    fields.clear();
                }
                line += 1;
                row_line = line;
            }
            '\n' => {
                line += 1;
                field.push(ch);
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        rows.push(DelimitedRow { line: row_line, fields });
    }

    rows
}

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep)
        || field.contains('"')
        || field.contains('\n')
        || field.contains('\r')
        || field.trim() != field
}

pub fn format_row<S: AsRef<str>>(fields: &[S], sep: char) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(sep);
        }
        let field = field.as_ref();
        if needs_quotes(field, sep) {
            out.push('"');
            out.push_str(&field.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(field);
        }
    }
    out.push('\n');
    out
}

/// Reads a log with the given header. A missing file is an empty log; a
/// header or field-count mismatch is corruption.
pub fn read_table(path: &Path, header: &[&str]) -> StoreResult<Vec<DelimitedRow>> {
    let text = match read_optional(path).map_err(|e| StoreError::io(path, e))? {
        Some(text) => text,
        None => return Ok(Vec::new()),
    };

    let mut rows = parse_lines(&text, FIELD_SEPARATOR).into_iter();

    let first = match rows.next() {
        Some(first) => first,
        None => return Ok(Vec::new()),
    };
    let found: Vec<&str> = first.fields.iter().map(|f| f.trim()).collect();
    if found != header {
        return Err(StoreError::corrupt_log(
            path,
            first.line,
            ParseError::Header {
                expected: header.join(";"),
                found: found.join(";"),
            },
        ));
    }

    let mut out = Vec::new();
    for row in rows {
        if row.fields.len() != header.len() {
            return Err(StoreError::corrupt_log(
                path,
                row.line,
                ParseError::FieldCount {
                    expected: header.len(),
                    found: row.fields.len(),
                },
            ));
        }
        out.push(row);
    }

    Ok(out)
}

/// Rewrites the whole log.
pub fn write_table(path: &Path, header: &[&str], rows: &[Vec<String>]) -> StoreResult<()> {
    let mut contents = format_row(header, FIELD_SEPARATOR);
    for row in rows {
        contents.push_str(&format_row(row, FIELD_SEPARATOR));
    }
    write_atomic(path, contents.as_bytes()).map_err(|e| StoreError::io(path, e))
}

/// Appends one row, writing the header first when the file is new or empty.
pub fn append_row(path: &Path, header: &[&str], row: &[String]) -> StoreResult<()> {
    ensure_parent_dir(path).map_err(|e| StoreError::io(path, e))?;

    let is_new = match fs::metadata(path) {
        Ok(meta) => meta.len() == 0,
        Err(e) if e.kind() == ErrorKind::NotFound => true,
        Err(e) => return Err(StoreError::io(path, e)),
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;

    let mut contents = String::new();
    if is_new {
        contents.push_str(&format_row(header, FIELD_SEPARATOR));
    }
    contents.push_str(&format_row(row, FIELD_SEPARATOR));

    file.write_all(contents.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| StoreError::io(path, e))
}
