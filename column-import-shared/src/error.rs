//! Configuration error types.

use thiserror::Error;

/// Errors caused by missing or malformed setup. These are the caller's fault
/// and are never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// One or more required keys were absent.
    #[error("required value is missing: {}", .0.join(", "))]
    MissingKeys(Vec<String>),

    /// A column list entry did not match `<family>.<qualifier>`.
    #[error("malformed column entry '{entry}', expected format {expected}")]
    MalformedColumn { entry: String, expected: String },

    /// A key was present but its value could not be used.
    #[error("invalid value '{value}' for '{key}': {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigurationError {
    /// Create a missing keys error.
    pub fn missing_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingKeys(keys.into_iter().map(Into::into).collect())
    }

    /// Create an invalid value error.
    pub fn invalid_value(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_message_lists_every_key() {
        let err = ConfigurationError::missing_keys(["zookeeper", "table"]);
        assert_eq!(err.to_string(), "required value is missing: zookeeper, table");
    }
}
