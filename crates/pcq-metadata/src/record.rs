//! Raw record extraction.
//!
//! A raw record is the field/variable split of one metadata file before any
//! variable expansion. A logical line is a field when its first delimiter
//! outside `${}` is a colon, a variable when it is an equals sign, and
//! ignored otherwise.

use std::path::{Path, PathBuf};

use tracing::trace;

use pcq_core::diag::{Diagnostic, DiagnosticSink};
use pcq_core::error::{PcqError, PcqResult};
use pcq_core::VariableStore;

use crate::lines::logical_lines;

/// Fields whose repeated declarations accumulate instead of replacing.
const LIST_FIELDS: &[&str] = &[
    "Requires",
    "Requires.private",
    "Conflicts",
    "Provides",
    "Cflags",
    "Cflags.private",
    "Libs",
    "Libs.private",
];

fn is_list_field(name: &str) -> bool {
    LIST_FIELDS.contains(&name)
}

/// An unexpanded record: ordered variables plus ordered fields.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub path: PathBuf,
    pub variables: VariableStore,
    fields: Vec<(String, String)>,
}

impl RawRecord {
    /// Parse record text into variables and fields.
    ///
    /// Duplicate variables are reported and the later value wins. A repeated
    /// list field (`Requires`, `Cflags`, ...) accumulates onto the first
    /// declaration; a repeated scalar field is reported and the later value
    /// wins.
    pub fn parse(path: &Path, content: &str, sink: &dyn DiagnosticSink) -> PcqResult<Self> {
        let mut record = Self {
            path: path.to_path_buf(),
            variables: VariableStore::new(),
            fields: Vec::new(),
        };

        for (line_no, line) in logical_lines(content) {
            match find_delimiter(&line) {
                Some((index, ':')) => {
                    let name = line[..index].trim().to_string();
                    let value = line[index + 1..].trim().to_string();
                    if name.is_empty() {
                        return Err(PcqError::Parse {
                            path: path.display().to_string(),
                            line: line_no,
                            message: "field with empty name".to_string(),
                        });
                    }
                    match record.fields.iter_mut().find(|(n, _)| *n == name) {
                        Some(existing) if is_list_field(&name) => {
                            if !value.is_empty() {
                                if !existing.1.is_empty() {
                                    existing.1.push(' ');
                                }
                                existing.1.push_str(&value);
                            }
                        },
                        Some(existing) => {
                            sink.report(Diagnostic::DuplicateField {
                                path: path.display().to_string(),
                                field: name,
                            });
                            existing.1 = value;
                        },
                        None => record.fields.push((name, value)),
                    }
                },
                Some((index, _)) => {
                    let name = line[..index].trim().to_string();
                    let value = line[index + 1..].trim().to_string();
                    if name.is_empty() {
                        return Err(PcqError::Parse {
                            path: path.display().to_string(),
                            line: line_no,
                            message: "variable with empty name".to_string(),
                        });
                    }
                    if record.variables.contains(&name) {
                        sink.report(Diagnostic::DuplicateVariable {
                            path: path.display().to_string(),
                            variable: name.clone(),
                        });
                    }
                    record.variables.push(name, value);
                },
                None => {
                    trace!(line = line_no, "skipping line without delimiter");
                },
            }
        }

        Ok(record)
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

/// Find the first `:` or `=` outside any `${...}` reference. The earlier
/// of the two decides whether the line is a field or a variable.
fn find_delimiter(line: &str) -> Option<(usize, char)> {
    let bytes = line.as_bytes();
    let mut brace_depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'$' if i + 1 < bytes.len() && bytes[i + 1] == b'{' => {
                brace_depth += 1;
                i += 2;
                continue;
            },
            b'}' if brace_depth > 0 => brace_depth -= 1,
            b':' | b'=' if brace_depth == 0 => {
                return Some((i, bytes[i] as char));
            },
            _ => {},
        }
        i += 1;
    }
    None
}
