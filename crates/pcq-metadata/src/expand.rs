//! Guarded `${variable}` expansion.
//!
//! Variable values may reference other variables. Expansion is recursive
//! with two ceilings: a nesting depth limit and a total output length
//! limit. Hitting either truncates the result and reports an
//! `ExpansionOverflow` diagnostic instead of failing the query.

use pcq_core::diag::{Diagnostic, DiagnosticSink};
use pcq_core::VariableStore;

/// Maximum nesting depth before expansion truncates.
pub const MAX_EXPANSION_DEPTH: usize = 64;

/// Maximum expanded length in bytes before expansion truncates.
pub const MAX_EXPANSION_LEN: usize = 64 * 1024;

/// Expands `${variable}` references against one record's variable store.
pub struct Expander<'a> {
    vars: &'a VariableStore,
    path: &'a str,
    sink: &'a dyn DiagnosticSink,
}

struct ExpandState {
    active: Vec<String>,
    overflowed: bool,
}

impl<'a> Expander<'a> {
    pub fn new(vars: &'a VariableStore, path: &'a str, sink: &'a dyn DiagnosticSink) -> Self {
        Self { vars, path, sink }
    }

    /// Expand all variable references in `input`.
    ///
    /// `$$` produces a literal dollar sign. A reference to an undefined
    /// variable, or a variable currently being expanded, is kept as its
    /// literal `${name}` text.
    pub fn expand(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut state = ExpandState {
            active: Vec::new(),
            overflowed: false,
        };
        self.expand_into(input, &mut out, &mut state, 0);
        out
    }

    fn expand_into(
        &self,
        input: &str,
        out: &mut String,
        state: &mut ExpandState,
        depth: usize,
    ) {
        if state.overflowed {
            return;
        }
        if depth > MAX_EXPANSION_DEPTH {
            self.overflow(out, state, input);
            return;
        }

        let bytes = input.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if state.overflowed {
                return;
            }
            if bytes[i] == b'$' && i + 1 < bytes.len() {
                match bytes[i + 1] {
                    b'$' => {
                        self.push(out, state, "$");
                        i += 2;
                        continue;
                    },
                    b'{' => {
                        if let Some(end) = input[i + 2..].find('}') {
                            let name = &input[i + 2..i + 2 + end];
                            self.expand_reference(name, out, state, depth);
                            i += 2 + end + 1;
                            continue;
                        }
                    },
                    _ => {},
                }
            }
            let c = input[i..].chars().next().unwrap_or('\u{fffd}');
            let mut buffer = [0u8; 4];
            self.push(out, state, c.encode_utf8(&mut buffer));
            i += c.len_utf8();
        }
    }

    fn expand_reference(
        &self,
        name: &str,
        out: &mut String,
        state: &mut ExpandState,
        depth: usize,
    ) {
        let cycles = state.active.iter().any(|active| active == name);
        let value = if cycles { None } else { self.vars.get(name) };

        match value {
            Some(value) => {
                let value = value.to_string();
                state.active.push(name.to_string());
                self.expand_into(&value, out, state, depth + 1);
                state.active.pop();
            },
            None => {
                self.push(out, state, &format!("${{{name}}}"));
            },
        }
    }

    fn push(&self, out: &mut String, state: &mut ExpandState, text: &str) {
        if state.overflowed {
            return;
        }
        if out.len() + text.len() > MAX_EXPANSION_LEN {
            let remaining = MAX_EXPANSION_LEN - out.len();
            let mut cut = remaining;
            while cut > 0 && !text.is_char_boundary(cut) {
                cut -= 1;
            }
            out.push_str(&text[..cut]);
            self.overflow(out, state, text);
            return;
        }
        out.push_str(text);
    }

    fn overflow(&self, _out: &mut String, state: &mut ExpandState, context: &str) {
        if !state.overflowed {
            state.overflowed = true;
            let variable = state
                .active
                .last()
                .cloned()
                .unwrap_or_else(|| context.chars().take(32).collect());
            self.sink.report(Diagnostic::ExpansionOverflow {
                path: self.path.to_string(),
                variable,
            });
        }
    }
}
