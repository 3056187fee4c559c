//! Host context abstraction.
//!
//! The import host resolves entity attributes and configuration lists for the
//! data source. `ImportContext` is the seam; `EntityContext` is the plain
//! in-process implementation used by the binary and by tests.

use std::collections::HashMap;

/// Separator between entries of a list-valued attribute.
const LIST_SEPARATOR: char = ',';

/// Read-only view of the per-entity configuration supplied by the host.
pub trait ImportContext: Send + Sync {
    /// Get a named entity attribute.
    fn entity_attribute(&self, name: &str) -> Option<String>;

    /// Resolve a named configuration key to a sequence of strings.
    ///
    /// The default reads the attribute of the same name and splits it on `,`,
    /// dropping blank entries. Returns `None` when the key is absent.
    fn resolve_list(&self, config_key: &str) -> Option<Vec<String>> {
        self.entity_attribute(config_key).map(|raw| {
            raw.split(LIST_SEPARATOR)
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(str::to_string)
                .collect()
        })
    }
}

/// In-memory entity context built from attribute pairs.
#[derive(Debug, Clone, Default)]
pub struct EntityContext {
    attributes: HashMap<String, String>,
}

impl EntityContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Set an attribute from a list of entries, joined with `,`.
    pub fn with_list<I, S>(self, name: impl Into<String>, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = entries
            .into_iter()
            .map(|e| e.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.with_attribute(name, joined)
    }
}

impl ImportContext for EntityContext {
    fn entity_attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_list_splits_and_trims() {
        let ctx = EntityContext::new().with_attribute("columns", " cf.a, cf.b ,,cf.c");
        assert_eq!(
            ctx.resolve_list("columns"),
            Some(vec!["cf.a".to_string(), "cf.b".to_string(), "cf.c".to_string()])
        );
    }

    #[test]
    fn test_resolve_list_absent_key() {
        let ctx = EntityContext::new();
        assert_eq!(ctx.resolve_list("required"), None);
    }
}
