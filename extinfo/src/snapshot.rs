//! An in-memory data provider.
//!
//! A [`Snapshot`] holds a fixed set of variable values, either built in code or loaded from a
//! TOML file such as:
//!
//! ```toml
//! own_client_id = 1
//!
//! [server]
//! id = 1
//! machine_id = "1"
//! created = 1736164800
//!
//! [[clients]]
//! id = 5
//! values = { type = 0, country = "DK" }
//!
//! [[connections]]
//! id = 5
//! values = { ping = 23, ping_deviation = 1.5 }
//! ```
//!
//! Values are keyed by the snake_case variable name. Anything not present makes the
//! corresponding retrieval fail, which is how reports without a particular value are previewed.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use extinfo_plugin::{
    Attribute, AttributeValue, ChannelVariable, ClientId, ClientVariable, ConnectionId,
    ConnectionVariable, DataProvider, ProviderError, ServerVariable, ValueKind,
};
use figment::Figment;
use figment::providers::{Format, Toml};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{trace, warn};

use crate::Error;

/// A raw value as written in a snapshot.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SnapshotValue {
    /// An integer, also used for unsigned values and unix timestamps.
    Integer(i64),
    /// A floating point number.
    Double(f64),
    /// A string.
    Text(String),
}

impl From<i64> for SnapshotValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for SnapshotValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for SnapshotValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// The values of one channel, client or connection.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct EntityValues<I> {
    /// Id of the entity.
    pub id: I,
    /// Values keyed by variable name.
    #[serde(default)]
    pub values: BTreeMap<String, SnapshotValue>,
}

/// A fixed set of variable values for a single connection.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Snapshot {
    /// Our own client id on the connection.
    #[serde(default)]
    pub own_client_id: Option<u16>,
    /// Virtual server values keyed by variable name.
    #[serde(default)]
    pub server: BTreeMap<String, SnapshotValue>,
    /// Channel values.
    #[serde(default)]
    pub channels: Vec<EntityValues<u64>>,
    /// Client values.
    #[serde(default)]
    pub clients: Vec<EntityValues<u16>>,
    /// Connection statistics of clients.
    #[serde(default)]
    pub connections: Vec<EntityValues<u16>>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a snapshot from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadSnapshot`] if the file cannot be read and [`Error::Snapshot`] if it
    /// is not a valid snapshot.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();

        trace!(?path, "loading snapshot");

        let contents = fs::read_to_string(path).map_err(|source| Error::ReadSnapshot {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml(&contents)
    }

    /// Parses a snapshot from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Snapshot`] if the string is not a valid snapshot.
    pub fn from_toml(contents: &str) -> Result<Self, Error> {
        let snapshot: Self = Figment::from(Toml::string(contents))
            .extract()
            .map_err(|err| Error::Snapshot(Box::new(err)))?;

        snapshot.warn_unknown_names();

        Ok(snapshot)
    }

    /// Sets our own client id.
    #[must_use]
    pub const fn with_own_client_id(mut self, id: u16) -> Self {
        self.own_client_id = Some(id);
        self
    }

    /// Sets a value, replacing any previous one.
    #[must_use]
    pub fn with(mut self, attribute: impl Into<Attribute>, value: impl Into<SnapshotValue>) -> Self {
        self.insert(attribute.into(), value.into());
        self
    }

    /// Sets a value, replacing any previous one.
    pub fn insert(&mut self, attribute: Attribute, value: SnapshotValue) {
        match attribute {
            Attribute::Server(variable) => {
                self.server.insert(variable.name().to_owned(), value);
            }
            Attribute::Channel(channel, variable) => {
                entity_mut(&mut self.channels, channel.0).insert(variable.name().to_owned(), value);
            }
            Attribute::Client(client, variable) => {
                entity_mut(&mut self.clients, client.0).insert(variable.name().to_owned(), value);
            }
            Attribute::Connection(client, variable) => {
                entity_mut(&mut self.connections, client.0)
                    .insert(variable.name().to_owned(), value);
            }
        }
    }

    /// Removes a value, returning it if it was present.
    pub fn remove(&mut self, attribute: Attribute) -> Option<SnapshotValue> {
        match attribute {
            Attribute::Server(variable) => self.server.remove(variable.name()),
            Attribute::Channel(channel, variable) => {
                entity_mut(&mut self.channels, channel.0).remove(variable.name())
            }
            Attribute::Client(client, variable) => {
                entity_mut(&mut self.clients, client.0).remove(variable.name())
            }
            Attribute::Connection(client, variable) => {
                entity_mut(&mut self.connections, client.0).remove(variable.name())
            }
        }
    }

    /// Returns the raw value of an attribute.
    #[must_use]
    pub fn get(&self, attribute: Attribute) -> Option<&SnapshotValue> {
        match attribute {
            Attribute::Server(variable) => self.server.get(variable.name()),
            Attribute::Channel(channel, variable) => {
                entity(&self.channels, channel.0)?.get(variable.name())
            }
            Attribute::Client(client, variable) => {
                entity(&self.clients, client.0)?.get(variable.name())
            }
            Attribute::Connection(client, variable) => {
                entity(&self.connections, client.0)?.get(variable.name())
            }
        }
    }

    fn warn_unknown_names(&self) {
        let unknown_server = self
            .server
            .keys()
            .filter(|name| ServerVariable::from_name(name).is_none());
        let unknown_channel = self
            .channels
            .iter()
            .flat_map(|channel| channel.values.keys())
            .filter(|name| ChannelVariable::from_name(name).is_none());
        let unknown_client = self
            .clients
            .iter()
            .flat_map(|client| client.values.keys())
            .filter(|name| ClientVariable::from_name(name).is_none());
        let unknown_connection = self
            .connections
            .iter()
            .flat_map(|connection| connection.values.keys())
            .filter(|name| ConnectionVariable::from_name(name).is_none());

        for name in unknown_server
            .chain(unknown_channel)
            .chain(unknown_client)
            .chain(unknown_connection)
        {
            warn!(%name, "ignoring unknown variable in snapshot");
        }
    }
}

fn entity<I: PartialEq>(
    entities: &[EntityValues<I>],
    id: I,
) -> Option<&BTreeMap<String, SnapshotValue>> {
    entities
        .iter()
        .find(|entity| entity.id == id)
        .map(|entity| &entity.values)
}

fn entity_mut<I: PartialEq + Copy>(
    entities: &mut Vec<EntityValues<I>>,
    id: I,
) -> &mut BTreeMap<String, SnapshotValue> {
    let index = match entities.iter().position(|entity| entity.id == id) {
        Some(index) => index,
        None => {
            entities.push(EntityValues {
                id,
                values: BTreeMap::new(),
            });
            entities.len() - 1
        }
    };

    &mut entities[index].values
}

/// Converts a raw value into the kind the attribute declares.
///
/// Values that cannot be converted are returned as they are, leaving it to the caller to reject
/// the kind.
#[allow(clippy::cast_precision_loss)]
fn convert(kind: ValueKind, value: &SnapshotValue) -> Result<AttributeValue<String>, ProviderError> {
    let converted = match (kind, value) {
        (ValueKind::UnsignedInteger, SnapshotValue::Integer(value)) if *value >= 0 => {
            AttributeValue::UnsignedInteger(value.unsigned_abs())
        }
        (ValueKind::Double, SnapshotValue::Integer(value)) => AttributeValue::Double(*value as f64),
        (ValueKind::Text, SnapshotValue::Integer(value)) => AttributeValue::Text(value.to_string()),
        (ValueKind::Text, SnapshotValue::Double(value)) => AttributeValue::Text(value.to_string()),
        (ValueKind::Timestamp, SnapshotValue::Integer(value)) => AttributeValue::Timestamp(
            OffsetDateTime::from_unix_timestamp(*value)
                .map_err(|_| ProviderError::InvalidTimestamp(*value))?,
        ),
        (_, SnapshotValue::Integer(value)) => AttributeValue::Integer(*value),
        (_, SnapshotValue::Double(value)) => AttributeValue::Double(*value),
        (_, SnapshotValue::Text(value)) => AttributeValue::Text(value.clone()),
    };

    Ok(converted)
}

impl DataProvider for Snapshot {
    type Text = String;

    fn own_client_id(&self, _connection: ConnectionId) -> Result<ClientId, ProviderError> {
        self.own_client_id.map(ClientId).ok_or(ProviderError::Missing)
    }

    fn fetch(
        &self,
        _connection: ConnectionId,
        attribute: Attribute,
    ) -> Result<AttributeValue<String>, ProviderError> {
        let value = self.get(attribute).ok_or(ProviderError::Missing)?;

        convert(attribute.kind(), value)
    }
}
