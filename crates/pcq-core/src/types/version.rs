//! Opaque version comparison.
//!
//! Versions are arbitrary strings compared segment-wise in the rpm style:
//! alternating runs of digits and letters, with everything else acting as a
//! separator. A tilde marks a pre-release segment that sorts before the same
//! version without it.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::PcqError;

/// Comparison operator attached to a dependency constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
}

impl VersionOp {
    /// Apply this operator to the outcome of comparing a found version
    /// against the required one.
    pub fn eval(self, ordering: Ordering) -> bool {
        match self {
            VersionOp::Equal => ordering == Ordering::Equal,
            VersionOp::NotEqual => ordering != Ordering::Equal,
            VersionOp::LessThan => ordering == Ordering::Less,
            VersionOp::LessThanEqual => ordering != Ordering::Greater,
            VersionOp::GreaterThan => ordering == Ordering::Greater,
            VersionOp::GreaterThanEqual => ordering != Ordering::Less,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            VersionOp::Equal => "=",
            VersionOp::NotEqual => "!=",
            VersionOp::LessThan => "<",
            VersionOp::LessThanEqual => "<=",
            VersionOp::GreaterThan => ">",
            VersionOp::GreaterThanEqual => ">=",
        }
    }
}

impl fmt::Display for VersionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionOp {
    type Err = PcqError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(VersionOp::Equal),
            "!=" => Ok(VersionOp::NotEqual),
            "<" => Ok(VersionOp::LessThan),
            "<=" => Ok(VersionOp::LessThanEqual),
            ">" => Ok(VersionOp::GreaterThan),
            ">=" => Ok(VersionOp::GreaterThanEqual),
            other => Err(PcqError::InvalidConstraint {
                name: String::new(),
                constraint: other.to_string(),
            }),
        }
    }
}

fn is_separator(b: u8) -> bool {
    !b.is_ascii_alphanumeric() && b != b'~'
}

/// Compare two version strings.
///
/// Returns the ordering of `a` relative to `b`. Segments of digits compare
/// numerically (leading zeros ignored), segments of letters compare
/// byte-wise, a digit segment outranks a letter segment at the same
/// position, and a tilde sorts before anything including the end of the
/// string.
pub fn compare(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0usize, 0usize);

    while i < a.len() || j < b.len() {
        while i < a.len() && is_separator(a[i]) {
            i += 1;
        }
        while j < b.len() && is_separator(b[j]) {
            j += 1;
        }

        let a_tilde = i < a.len() && a[i] == b'~';
        let b_tilde = j < b.len() && b[j] == b'~';
        match (a_tilde, b_tilde) {
            (true, true) => {
                i += 1;
                j += 1;
                continue;
            },
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {},
        }

        if i >= a.len() || j >= b.len() {
            break;
        }

        // Take a same-class run from each side, classed by the first byte
        // of the left operand.
        let numeric = a[i].is_ascii_digit();
        let run = |s: &[u8], mut k: usize| {
            let start = k;
            while k < s.len()
                && (if numeric {
                    s[k].is_ascii_digit()
                } else {
                    s[k].is_ascii_alphabetic()
                })
            {
                k += 1;
            }
            (start, k)
        };
        let (a_start, a_end) = run(a, i);
        let (b_start, b_end) = run(b, j);

        if b_start == b_end {
            // Class mismatch: the numeric segment is the newer one.
            return if numeric {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        let seg_a = &a[a_start..a_end];
        let seg_b = &b[b_start..b_end];
        let ordering = if numeric {
            let trim = |s: &[u8]| {
                let mut k = 0;
                while k + 1 < s.len() && s[k] == b'0' {
                    k += 1;
                }
                s[k..].to_vec()
            };
            let na = trim(seg_a);
            let nb = trim(seg_b);
            na.len().cmp(&nb.len()).then_with(|| na.cmp(&nb))
        } else {
            seg_a.cmp(seg_b)
        };
        if ordering != Ordering::Equal {
            return ordering;
        }

        i = a_end;
        j = b_end;
    }

    // Whichever side still has content is the newer version.
    match (i < a.len(), j < b.len()) {
        (false, false) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
    }
}
