use extinfo_plugin::{Attribute, AttributeValue, ClientId, ConnectionId, DataProvider};
use time::OffsetDateTime;
use tracing::trace;

use crate::FormatError;

/// Typed access to the attributes of one connection.
pub struct Fetcher<'a, P> {
    provider: &'a P,
    connection: ConnectionId,
}

impl<'a, P: DataProvider> Fetcher<'a, P> {
    pub const fn new(provider: &'a P, connection: ConnectionId) -> Self {
        Fetcher {
            provider,
            connection,
        }
    }

    pub const fn provider(&self) -> &'a P {
        self.provider
    }

    pub const fn connection(&self) -> ConnectionId {
        self.connection
    }

    pub fn own_client_id(&self) -> Result<ClientId, FormatError> {
        self.provider
            .own_client_id(self.connection)
            .map_err(FormatError::OwnClientId)
    }

    fn fetch(&self, attribute: Attribute) -> Result<AttributeValue<P::Text>, FormatError> {
        trace!(%attribute, "fetching attribute");

        self.provider
            .fetch(self.connection, attribute)
            .map_err(|source| FormatError::Retrieve { attribute, source })
    }

    pub fn int(&self, attribute: impl Into<Attribute>) -> Result<i64, FormatError> {
        let attribute = attribute.into();

        match self.fetch(attribute)? {
            AttributeValue::Integer(value) => Ok(value),
            other => Err(unexpected(attribute, &other)),
        }
    }

    pub fn uint(&self, attribute: impl Into<Attribute>) -> Result<u64, FormatError> {
        let attribute = attribute.into();

        match self.fetch(attribute)? {
            AttributeValue::UnsignedInteger(value) => Ok(value),
            other => Err(unexpected(attribute, &other)),
        }
    }

    pub fn double(&self, attribute: impl Into<Attribute>) -> Result<f64, FormatError> {
        let attribute = attribute.into();

        match self.fetch(attribute)? {
            AttributeValue::Double(value) => Ok(value),
            other => Err(unexpected(attribute, &other)),
        }
    }

    pub fn text(&self, attribute: impl Into<Attribute>) -> Result<P::Text, FormatError> {
        let attribute = attribute.into();

        match self.fetch(attribute)? {
            AttributeValue::Text(value) => Ok(value),
            other => Err(unexpected(attribute, &other)),
        }
    }

    pub fn timestamp(&self, attribute: impl Into<Attribute>) -> Result<OffsetDateTime, FormatError> {
        let attribute = attribute.into();

        match self.fetch(attribute)? {
            AttributeValue::Timestamp(value) => Ok(value),
            other => Err(unexpected(attribute, &other)),
        }
    }
}

fn unexpected<S>(attribute: Attribute, found: &AttributeValue<S>) -> FormatError {
    FormatError::UnexpectedKind {
        attribute,
        expected: attribute.kind(),
        found: found.kind(),
    }
}
