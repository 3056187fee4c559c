//! Connection configuration for the store client.
//!
//! The host supplies data source properties (coordination quorum, port and
//! parent node) and the entity supplies the table name. `SourceSettings`
//! validates both and produces the settings handed to a `StoreConnector`.

use std::collections::{BTreeMap, HashMap};

use column_import_shared::{ConfigurationError, ImportContext};

/// Property holding the coordination quorum address.
pub const ZOOKEEPER: &str = "zookeeper";
/// Property holding the coordination client port.
pub const PORT: &str = "port";
/// Property holding the store's parent node in the coordination service.
pub const PARENT_NODE: &str = "parent_node";
/// Entity attribute naming the table to scan.
pub const TABLE: &str = "table";

/// Client setting for the coordination quorum.
pub const QUORUM_SETTING: &str = "hbase.zookeeper.quorum";
/// Client setting for the coordination client port.
pub const CLIENT_PORT_SETTING: &str = "hbase.zookeeper.property.clientPort";
/// Client setting for the parent node.
pub const ZNODE_PARENT_SETTING: &str = "zookeeper.znode.parent";

/// Key/value properties supplied by the host for a data source.
#[derive(Debug, Clone, Default)]
pub struct DataSourceProperties {
    values: HashMap<String, String>,
}

impl DataSourceProperties {
    /// Create an empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Look up a property. Blank values count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

impl<K, V> FromIterator<(K, V)> for DataSourceProperties
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Settings used to open a connection to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Coordination quorum address.
    pub quorum: String,
    /// Coordination client port.
    pub client_port: u16,
    /// Parent node of the store in the coordination service.
    pub znode_parent: String,
}

impl ConnectionConfig {
    /// Render as store client settings.
    pub fn client_settings(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (QUORUM_SETTING.to_string(), self.quorum.clone()),
            (CLIENT_PORT_SETTING.to_string(), self.client_port.to_string()),
            (ZNODE_PARENT_SETTING.to_string(), self.znode_parent.clone()),
        ])
    }
}

/// Validated settings for one data source: where to connect and what to scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSettings {
    /// Connection settings.
    pub connection: ConnectionConfig,
    /// Table to scan.
    pub table: String,
}

impl SourceSettings {
    /// Validate properties and entity attributes.
    ///
    /// Every missing key is reported in a single `MissingKeys` error. The
    /// port must parse as a TCP port number.
    pub fn resolve<C>(
        context: &C,
        properties: &DataSourceProperties,
    ) -> Result<Self, ConfigurationError>
    where
        C: ImportContext + ?Sized,
    {
        let quorum = properties.get(ZOOKEEPER);
        let port = properties.get(PORT);
        let parent_node = properties.get(PARENT_NODE);
        let table = context
            .entity_attribute(TABLE)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        let missing: Vec<&str> = [
            (ZOOKEEPER, quorum.is_none()),
            (PORT, port.is_none()),
            (PARENT_NODE, parent_node.is_none()),
            (TABLE, table.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        match (quorum, port, parent_node, table) {
            (Some(quorum), Some(port), Some(parent_node), Some(table)) => {
                let client_port = port.parse::<u16>().map_err(|e| {
                    ConfigurationError::invalid_value(PORT, port, e.to_string())
                })?;

                Ok(Self {
                    connection: ConnectionConfig {
                        quorum: quorum.to_string(),
                        client_port,
                        znode_parent: parent_node.to_string(),
                    },
                    table,
                })
            }
            _ => Err(ConfigurationError::missing_keys(missing)),
        }
    }
}
