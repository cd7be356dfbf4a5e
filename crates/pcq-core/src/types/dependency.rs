//! Dependency specification types.
//!
//! A dependency names another package and optionally constrains its
//! version, e.g. `foo >= 1.2`. Lists of dependencies appear in the
//! `Requires`, `Requires.private`, `Conflicts` and `Provides` fields of a
//! metadata record and in query strings.

use std::fmt;

use crate::error::{PcqError, PcqResult};
use crate::types::version::{self, VersionOp};

/// Which field a dependency list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyOrigin {
    /// Public requirement, always traversed.
    Requires,
    /// Private requirement, traversed only for static linking.
    RequiresPrivate,
    /// Negative assertion against other resolved packages.
    Conflicts,
    /// Alternative identity this package can stand in for.
    Provides,
}

/// A single dependency entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub constraint: Option<(VersionOp, String)>,
    pub origin: DependencyOrigin,
}

impl Dependency {
    /// Create an unconstrained dependency.
    pub fn new(name: impl Into<String>, origin: DependencyOrigin) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            origin,
        }
    }

    /// Attach a version constraint.
    pub fn with_constraint(mut self, op: VersionOp, version: impl Into<String>) -> Self {
        self.constraint = Some((op, version.into()));
        self
    }

    /// Check whether a concrete version satisfies this dependency.
    pub fn matches_version(&self, found: &str) -> bool {
        match &self.constraint {
            None => true,
            Some((op, required)) => op.eval(version::compare(found, required)),
        }
    }

    /// Check whether a `Provides` entry can stand in for this dependency.
    ///
    /// An unversioned provide only satisfies an unconstrained dependency;
    /// a versioned provide is evaluated against the constraint.
    pub fn matches_provide(&self, provide: &Dependency) -> bool {
        if provide.name != self.name {
            return false;
        }
        match (&self.constraint, &provide.constraint) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(_), Some((_, provided))) => self.matches_version(provided),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            None => f.write_str(&self.name),
            Some((op, version)) => write!(f, "{} {} {}", self.name, op, version),
        }
    }
}

/// An ordered dependency list, preserving record order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyList {
    entries: Vec<Dependency>,
}

impl DependencyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a dependency list string such as `foo >= 1.2, bar != 2.0 baz`.
    ///
    /// Entries separate on commas or whitespace. An operator token must be
    /// followed by a version token; a dangling operator is an
    /// `InvalidConstraint` error.
    pub fn parse(input: &str, origin: DependencyOrigin) -> PcqResult<Self> {
        let mut entries = Vec::new();
        let mut tokens = tokenize(input).into_iter().peekable();

        while let Some(token) = tokens.next() {
            let name = match token {
                Token::Word(name) => name,
                Token::Operator(op) => {
                    let last: Option<&Dependency> = entries.last();
                    return Err(PcqError::InvalidConstraint {
                        name: last.map(|d| d.name.clone()).unwrap_or_default(),
                        constraint: op,
                    });
                },
            };

            let mut dep = Dependency::new(name, origin);
            if matches!(tokens.peek(), Some(Token::Operator(_))) {
                let op_text = match tokens.next() {
                    Some(Token::Operator(op)) => op,
                    _ => unreachable!(),
                };
                let op: VersionOp =
                    op_text
                        .parse()
                        .map_err(|_| PcqError::InvalidConstraint {
                            name: dep.name.clone(),
                            constraint: op_text.clone(),
                        })?;
                match tokens.next() {
                    Some(Token::Word(version)) => {
                        dep = dep.with_constraint(op, version);
                    },
                    _ => {
                        return Err(PcqError::InvalidConstraint {
                            name: dep.name,
                            constraint: op_text,
                        });
                    },
                }
            }
            entries.push(dep);
        }

        Ok(Self { entries })
    }

    pub fn push(&mut self, dependency: Dependency) {
        self.entries.push(dependency);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Dependency> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[Dependency] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a DependencyList {
    type Item = &'a Dependency;
    type IntoIter = std::slice::Iter<'a, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for DependencyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.entries.iter().map(|d| d.to_string()).collect();
        f.write_str(&rendered.join(", "))
    }
}

enum Token {
    Word(String),
    Operator(String),
}

/// Split a dependency string into words and comparison operators. An
/// operator glued to a word (`foo>=1.2`) separates into three tokens.
fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut op = String::new();

    let flush_word = |buf: &mut String, tokens: &mut Vec<Token>| {
        if !buf.is_empty() {
            tokens.push(Token::Word(std::mem::take(buf)));
        }
    };

    for c in input.chars() {
        match c {
            '<' | '>' | '=' | '!' => {
                flush_word(&mut current, &mut tokens);
                op.push(c);
            },
            c if c.is_whitespace() || c == ',' => {
                if !op.is_empty() {
                    tokens.push(Token::Operator(std::mem::take(&mut op)));
                }
                flush_word(&mut current, &mut tokens);
            },
            _ => {
                if !op.is_empty() {
                    tokens.push(Token::Operator(std::mem::take(&mut op)));
                }
                current.push(c);
            },
        }
    }
    if !op.is_empty() {
        tokens.push(Token::Operator(op));
    }
    flush_word(&mut current, &mut tokens);

    tokens
}
