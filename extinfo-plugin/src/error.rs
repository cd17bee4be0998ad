use thiserror::Error;

use crate::ValueKind;

/// An error returned by a [`DataProvider`](crate::DataProvider).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The host returned a non-zero error code.
    #[error("host returned error code {0:#06x}")]
    Code(u32),
    /// The provider has no value for the requested attribute.
    #[error("no value available")]
    Missing,
    /// The provider returned a value that is not a valid unix timestamp.
    #[error("invalid unix timestamp {0}")]
    InvalidTimestamp(i64),
    /// The host has no accessor for values of this kind.
    #[error("host cannot provide {0:?} values for this entity")]
    Unsupported(ValueKind),
}
