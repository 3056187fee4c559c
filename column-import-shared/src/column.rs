//! Column addressing.
//!
//! A cell in the store is addressed by a column family and a qualifier inside
//! that family. Configuration names columns as `<family>.<qualifier>`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::context::ImportContext;
use crate::error::ConfigurationError;

/// Delimiter between family and qualifier in configuration entries.
pub const COLUMN_DELIMITER: char = '.';

const EXPECTED_FORMAT: &str = "<family>.<qualifier>";

/// One addressable field in the store.
///
/// Equality is structural: two descriptors with the same family and
/// qualifier are interchangeable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    family: String,
    qualifier: String,
}

impl ColumnDescriptor {
    /// Create a descriptor from its parts.
    pub fn new(family: impl Into<String>, qualifier: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            qualifier: qualifier.into(),
        }
    }

    /// Parse a single `<family>.<qualifier>` entry.
    ///
    /// Surrounding whitespace is ignored. The entry must contain exactly one
    /// delimiter separating two non-empty segments.
    pub fn parse(entry: &str) -> Result<Self, ConfigurationError> {
        let trimmed = entry.trim();
        let mut parts = trimmed.split(COLUMN_DELIMITER);

        match (parts.next(), parts.next(), parts.next()) {
            (Some(family), Some(qualifier), None) if !family.is_empty() && !qualifier.is_empty() => {
                Ok(Self::new(family, qualifier))
            }
            _ => Err(ConfigurationError::MalformedColumn {
                entry: entry.to_string(),
                expected: EXPECTED_FORMAT.to_string(),
            }),
        }
    }

    /// Read the ordered list of descriptors configured under `config_key`.
    ///
    /// An absent key yields an empty list. The first malformed entry fails the
    /// whole list.
    pub fn parse_list<C>(config_key: &str, context: &C) -> Result<Vec<Self>, ConfigurationError>
    where
        C: ImportContext + ?Sized,
    {
        context
            .resolve_list(config_key)
            .unwrap_or_default()
            .iter()
            .map(|entry| Self::parse(entry))
            .collect()
    }

    /// The column family.
    pub fn family(&self) -> &str {
        &self.family
    }

    /// The qualifier within the family.
    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    /// Record key for this column, `family:qualifier`.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.family, self.qualifier)
    }
}
