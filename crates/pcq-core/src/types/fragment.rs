//! Typed compiler and linker flag fragments.
//!
//! A fragment is one flag: a type character for recognized flag families
//! (`-I`, `-L`, `-l`, `-D`, `-U`, `-F`, `-W`) plus its data, or an untyped
//! token carried verbatim. Multi-token flags such as `-framework Name` are
//! merged into a single fragment and re-split into tokens when rendered.

use std::collections::HashSet;
use std::fmt;

/// Flag heads whose argument lives in the following token. The pair is kept
/// as one merged fragment so it survives filtering and dedupe as a unit.
const UNMERGEABLE_HEADS: &[&str] = &["-framework", "-isystem", "-idirafter"];

/// Characters that never need shell escaping when rendering.
const SAFE_CHARS: &str = "@%+=:,./-_~^$()";

/// A single compiler or linker flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fragment {
    kind: Option<char>,
    data: String,
    merged: bool,
}

impl Fragment {
    /// Create a typed fragment, e.g. `('I', "/usr/include")` for
    /// `-I/usr/include`.
    pub fn new(kind: char, data: impl Into<String>) -> Self {
        Self {
            kind: Some(kind),
            data: data.into(),
            merged: false,
        }
    }

    /// Create an untyped fragment carrying the token verbatim.
    pub fn untyped(data: impl Into<String>) -> Self {
        Self {
            kind: None,
            data: data.into(),
            merged: false,
        }
    }

    /// Create a merged fragment holding a flag head and its argument,
    /// e.g. `-framework CoreFoundation`.
    pub fn merged(data: impl Into<String>) -> Self {
        Self {
            kind: None,
            data: data.into(),
            merged: true,
        }
    }

    pub fn kind(&self) -> Option<char> {
        self.kind
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn is_merged(&self) -> bool {
        self.merged
    }

    pub fn is_include(&self) -> bool {
        self.kind == Some('I')
    }

    pub fn is_lib_path(&self) -> bool {
        self.kind == Some('L')
    }

    pub fn is_lib_name(&self) -> bool {
        self.kind == Some('l')
    }

    /// Key used for deduplication. Two fragments are duplicates when both
    /// the type and the text match.
    pub fn dedup_key(&self) -> (Option<char>, &str) {
        (self.kind, &self.data)
    }

    /// Whether this fragment points into one of the given system
    /// directories. Only `-I` and `-L` fragments can match; paths are
    /// compared with trailing slashes normalized away.
    pub fn in_system_dirs(&self, libdirs: &[String], includedirs: &[String]) -> bool {
        match self.kind {
            Some('L') => path_in_list(&self.data, libdirs),
            Some('I') => path_in_list(&self.data, includedirs),
            _ => false,
        }
    }

    /// Prepend a sysroot to an absolute `-I`/`-L` path. With `always` unset
    /// a path already under the sysroot is left alone.
    pub fn relocate(&mut self, sysroot: &str, always: bool) {
        if sysroot.is_empty() || sysroot == "/" {
            return;
        }
        if !matches!(self.kind, Some('I') | Some('L')) {
            return;
        }
        if self.data.starts_with('/') && (always || !self.data.starts_with(sysroot)) {
            self.data = format!("{sysroot}{}", self.data);
        }
    }

    /// Render as shell tokens. Merged fragments split back into their
    /// component tokens; everything else renders as exactly one token.
    pub fn render_tokens(&self) -> Vec<String> {
        if self.merged {
            return self.data.split_whitespace().map(escape_token).collect();
        }
        let raw = match self.kind {
            Some(kind) => format!("-{kind}{}", self.data),
            None => self.data.clone(),
        };
        vec![escape_token(&raw)]
    }

    /// Render using MSVC toolchain syntax. Unknown typed fragments fall
    /// back to the GCC spelling.
    pub fn render_msvc(&self) -> Vec<String> {
        let token = match self.kind {
            Some('I') => format!("/I{}", self.data),
            Some('L') => format!("/LIBPATH:{}", self.data),
            Some('l') => format!("{}.lib", self.data),
            Some('D') => format!("/D{}", self.data),
            Some('U') => format!("/U{}", self.data),
            Some(kind) => format!("-{kind}{}", self.data),
            None => {
                if self.merged {
                    return self.data.split_whitespace().map(str::to_string).collect();
                }
                self.data.clone()
            },
        };
        vec![token]
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render_tokens().join(" "))
    }
}

/// An ordered list of fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FragmentList {
    fragments: Vec<Fragment>,
}

impl FragmentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flags string into fragments.
    ///
    /// The input splits on whitespace with shell quoting and backslash
    /// escapes honored. Tokens of the form `-X...` where `X` is a known
    /// type character become typed fragments; unmergeable heads absorb the
    /// following token; everything else is untyped.
    pub fn parse(input: &str) -> Self {
        let mut list = Self::new();
        let tokens = split_tokens(input);
        let mut iter = tokens.into_iter().peekable();

        while let Some(token) = iter.next() {
            if UNMERGEABLE_HEADS.contains(&token.as_str()) {
                match iter.next() {
                    Some(arg) => list.push(Fragment::merged(format!("{token} {arg}"))),
                    None => list.push(Fragment::untyped(token)),
                }
                continue;
            }
            list.add_token(&token);
        }

        list
    }

    fn add_token(&mut self, token: &str) {
        if token.is_empty() {
            return;
        }
        if token.len() > 2 && token.starts_with('-') {
            let kind = token.as_bytes()[1] as char;
            if matches!(kind, 'I' | 'L' | 'l' | 'D' | 'U' | 'F' | 'W') {
                self.push(Fragment::new(kind, &token[2..]));
                return;
            }
        }
        self.push(Fragment::untyped(token));
    }

    pub fn push(&mut self, fragment: Fragment) {
        self.fragments.push(fragment);
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn extend_from(&mut self, other: &FragmentList) {
        self.fragments.extend(other.fragments.iter().cloned());
    }

    /// Keep only fragments matching the predicate.
    pub fn filter<F>(&self, predicate: F) -> FragmentList
    where
        F: Fn(&Fragment) -> bool,
    {
        FragmentList {
            fragments: self
                .fragments
                .iter()
                .filter(|f| predicate(f))
                .cloned()
                .collect(),
        }
    }

    /// Keep only fragments whose type character appears in `types`.
    /// Untyped fragments never match a type filter.
    pub fn filter_types(&self, types: &str) -> FragmentList {
        self.filter(|f| f.kind().is_some_and(|k| types.contains(k)))
    }

    /// Drop `-I`/`-L` fragments pointing into system directories.
    pub fn without_system_dirs(
        &self,
        libdirs: &[String],
        includedirs: &[String],
    ) -> FragmentList {
        self.filter(|f| !f.in_system_dirs(libdirs, includedirs))
    }

    /// Remove duplicates. The first occurrence of each `(type, text)` pair
    /// wins; later occurrences are dropped.
    pub fn deduplicate(&self) -> FragmentList {
        let mut seen: HashSet<(Option<char>, String)> = HashSet::new();
        let mut result = Vec::new();
        for frag in &self.fragments {
            let key = (frag.kind, frag.data.clone());
            if seen.insert(key) {
                result.push(frag.clone());
            }
        }
        FragmentList { fragments: result }
    }

    /// Relocate absolute `-I`/`-L` paths under a sysroot. See
    /// [`Fragment::relocate`] for the `always` rule.
    pub fn relocate(&mut self, sysroot: &str, always: bool) {
        for frag in &mut self.fragments {
            frag.relocate(sysroot, always);
        }
    }

    /// Render as an ordered token sequence.
    pub fn render_tokens(&self) -> Vec<String> {
        self.fragments
            .iter()
            .flat_map(|f| f.render_tokens())
            .collect()
    }

    /// Render as token sequence in MSVC syntax.
    pub fn render_msvc(&self) -> Vec<String> {
        self.fragments.iter().flat_map(|f| f.render_msvc()).collect()
    }

    /// Render as a single space-joined string.
    pub fn render(&self) -> String {
        self.render_tokens().join(" ")
    }
}

impl IntoIterator for FragmentList {
    type Item = Fragment;
    type IntoIter = std::vec::IntoIter<Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.into_iter()
    }
}

impl<'a> IntoIterator for &'a FragmentList {
    type Item = &'a Fragment;
    type IntoIter = std::slice::Iter<'a, Fragment>;

    fn into_iter(self) -> Self::IntoIter {
        self.fragments.iter()
    }
}

impl FromIterator<Fragment> for FragmentList {
    fn from_iter<I: IntoIterator<Item = Fragment>>(iter: I) -> Self {
        Self {
            fragments: iter.into_iter().collect(),
        }
    }
}

fn path_in_list(path: &str, dirs: &[String]) -> bool {
    let wanted = normalize_path(path);
    dirs.iter().any(|dir| normalize_path(dir) == wanted)
}

fn normalize_path(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

/// Backslash-escape any byte outside the alphanumeric-plus-safe set.
fn escape_token(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for c in token.chars() {
        if !c.is_ascii_alphanumeric() && !SAFE_CHARS.contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Split a flags string into tokens, honoring single quotes, double quotes
/// and backslash escapes.
fn split_tokens(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();
    let mut in_single = false;
    let mut in_double = false;

    while let Some(c) = chars.next() {
        if in_single {
            if c == '\'' {
                in_single = false;
            } else {
                current.push(c);
            }
        } else if in_double {
            match c {
                '"' => in_double = false,
                '\\' => match chars.peek() {
                    Some('"' | '\\' | '$' | '`') => {
                        if let Some(escaped) = chars.next() {
                            current.push(escaped);
                        }
                    },
                    _ => current.push('\\'),
                },
                _ => current.push(c),
            }
        } else {
            match c {
                '\'' => in_single = true,
                '"' => in_double = true,
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                },
                c if c.is_ascii_whitespace() => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                },
                _ => current.push(c),
            }
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classifies_types() {
        let list = FragmentList::parse("-I/usr/include -L/usr/lib -lfoo -DBAR=1 -pthread");
        assert_eq!(list.len(), 5);
        assert_eq!(list.fragments()[0].kind(), Some('I'));
        assert_eq!(list.fragments()[0].data(), "/usr/include");
        assert_eq!(list.fragments()[1].kind(), Some('L'));
        assert_eq!(list.fragments()[2].kind(), Some('l'));
        assert_eq!(list.fragments()[2].data(), "foo");
        assert_eq!(list.fragments()[3].kind(), Some('D'));
        assert_eq!(list.fragments()[3].data(), "BAR=1");
        assert_eq!(list.fragments()[4].kind(), None);
        assert_eq!(list.fragments()[4].data(), "-pthread");
    }

    #[test]
    fn test_parse_empty_and_whitespace() {
        assert!(FragmentList::parse("").is_empty());
        assert!(FragmentList::parse("  \t \n ").is_empty());
    }

    #[test]
    fn test_bare_type_flag_stays_untyped() {
        let list = FragmentList::parse("-I -lfoo");
        assert_eq!(list.fragments()[0].kind(), None);
        assert_eq!(list.fragments()[0].data(), "-I");
        assert_eq!(list.fragments()[1].kind(), Some('l'));
    }

    #[test]
    fn test_quoted_paths_keep_spaces() {
        let list = FragmentList::parse(r#"-I"/opt/weird path/include" -lfoo"#);
        assert_eq!(list.len(), 2);
        assert_eq!(list.fragments()[0].data(), "/opt/weird path/include");
    }

    #[test]
    fn test_backslash_escaped_spaces() {
        let list = FragmentList::parse(r"-I/opt/weird\ path -lfoo");
        assert_eq!(list.fragments()[0].data(), "/opt/weird path");
    }

    #[test]
    fn test_unmergeable_head_absorbs_argument() {
        let list = FragmentList::parse("-framework CoreFoundation -lobjc");
        assert_eq!(list.len(), 2);
        assert!(list.fragments()[0].is_merged());
        assert_eq!(list.fragments()[0].data(), "-framework CoreFoundation");
        assert_eq!(list.fragments()[1].kind(), Some('l'));
    }

    #[test]
    fn test_merged_fragment_resplits_on_render() {
        let list = FragmentList::parse("-framework CoreFoundation");
        assert_eq!(
            list.render_tokens(),
            vec!["-framework".to_string(), "CoreFoundation".to_string()]
        );
    }

    #[test]
    fn test_trailing_unmergeable_head_kept_verbatim() {
        let list = FragmentList::parse("-isystem");
        assert_eq!(list.len(), 1);
        assert!(!list.fragments()[0].is_merged());
        assert_eq!(list.fragments()[0].data(), "-isystem");
    }

    #[test]
    fn test_deduplicate_first_wins() {
        let list = FragmentList::parse("-lfoo -lbar -lfoo -lbaz");
        let deduped = list.deduplicate();
        let names: Vec<&str> = deduped.iter().map(|f| f.data()).collect();
        assert_eq!(names, vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn test_deduplicate_distinguishes_types() {
        // -Lfoo and -lfoo share data but not type
        let mut list = FragmentList::new();
        list.push(Fragment::new('L', "foo"));
        list.push(Fragment::new('l', "foo"));
        assert_eq!(list.deduplicate().len(), 2);
    }

    #[test]
    fn test_deduplicate_idempotent() {
        let list = FragmentList::parse("-I/a -I/a -lx -lx -pthread -pthread");
        let once = list.deduplicate();
        let twice = once.deduplicate();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_types() {
        let list = FragmentList::parse("-I/inc -L/lib -lfoo -DBAR -pthread");
        let filtered = list.filter_types("Il");
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.fragments()[0].kind(), Some('I'));
        assert_eq!(filtered.fragments()[1].kind(), Some('l'));
    }

    #[test]
    fn test_filter_preserves_order() {
        let list = FragmentList::parse("-la -I/x -lb -I/y");
        let libs = list.filter(|f| f.is_lib_name());
        let names: Vec<&str> = libs.iter().map(|f| f.data()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_system_dir_filtering() {
        let libdirs = vec!["/usr/lib".to_string()];
        let incdirs = vec!["/usr/include".to_string()];
        let list = FragmentList::parse("-I/usr/include -I/opt/include -L/usr/lib -lfoo");
        let kept = list.without_system_dirs(&libdirs, &incdirs);
        assert_eq!(kept.render(), "-I/opt/include -lfoo");
    }

    #[test]
    fn test_system_dir_trailing_slash_normalization() {
        let incdirs = vec!["/usr/include/".to_string()];
        assert!(Fragment::new('I', "/usr/include").in_system_dirs(&[], &incdirs));
        assert!(Fragment::new('I', "/usr/include/").in_system_dirs(&[], &incdirs));
        assert!(!Fragment::new('l', "/usr/include").in_system_dirs(&[], &incdirs));
    }

    #[test]
    fn test_relocate_skips_prefixed_by_default() {
        let mut list = FragmentList::parse("-I/usr/include -I/cross/usr/include -L/usr/lib -lz");
        list.relocate("/cross", false);
        assert_eq!(
            list.render(),
            "-I/cross/usr/include -I/cross/usr/include -L/cross/usr/lib -lz"
        );
    }

    #[test]
    fn test_relocate_always_prepends() {
        let mut list = FragmentList::parse("-I/cross/usr/include");
        list.relocate("/cross", true);
        assert_eq!(list.render(), "-I/cross/cross/usr/include");
    }

    #[test]
    fn test_relocate_ignores_relative_and_root() {
        let mut list = FragmentList::parse("-Iinclude -L/opt/lib");
        list.relocate("/", false);
        assert_eq!(list.render(), "-Iinclude -L/opt/lib");
    }

    #[test]
    fn test_render_round_trip() {
        let list = FragmentList::parse("-I/test/include/foo -fPIC -L/test/lib -lfoo");
        assert_eq!(list.render(), "-I/test/include/foo -fPIC -L/test/lib -lfoo");
    }

    #[test]
    fn test_render_escapes_unsafe_bytes() {
        let mut list = FragmentList::new();
        list.push(Fragment::new('I', "/opt/weird path/include"));
        assert_eq!(list.render(), r"-I/opt/weird\ path/include");
    }

    #[test]
    fn test_render_keeps_safe_punctuation() {
        let mut list = FragmentList::new();
        list.push(Fragment::untyped("-Wl,--as-needed"));
        assert_eq!(list.render(), "-Wl,--as-needed");
    }

    #[test]
    fn test_render_keeps_underscores_and_tildes() {
        let list = FragmentList::parse("-DFOO_BAR=1 -I/opt/foo~1/include");
        assert_eq!(list.render(), "-DFOO_BAR=1 -I/opt/foo~1/include");
    }

    #[test]
    fn test_render_keeps_make_style_references() {
        let mut list = FragmentList::new();
        list.push(Fragment::new('I', "$(top_builddir)/include"));
        assert_eq!(list.render(), "-I$(top_builddir)/include");
    }

    #[test]
    fn test_render_msvc() {
        let list = FragmentList::parse("-I/usr/include -L/usr/lib -lz -DFOO -pthread");
        assert_eq!(
            list.render_msvc(),
            vec!["/I/usr/include", "/LIBPATH:/usr/lib", "z.lib", "/DFOO", "-pthread"]
        );
    }

    #[test]
    fn test_warning_flags_are_typed() {
        let list = FragmentList::parse("-Wall -Werror");
        assert_eq!(list.fragments()[0].kind(), Some('W'));
        assert_eq!(list.fragments()[0].data(), "all");
    }
}
