//! Ordered variable storage for metadata records.
//!
//! Variables keep their definition order so introspection can replay a
//! record faithfully. Lookup resolves to the most recent definition.

/// Ordered `(name, value)` variable tuples.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableStore {
    entries: Vec<(String, String)>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a definition. An existing variable of the same name stays in
    /// the list; lookups see the newer value.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Redefine a variable in place, or append it if absent. Used for
    /// caller-supplied overrides and prefix redefinition.
    pub fn define(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    /// Look up the current value of a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Iterate definitions in record order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
