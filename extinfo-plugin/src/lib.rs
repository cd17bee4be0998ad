//! Host contract for info panel plugins.
//!
//! This crate describes everything a plugin and its host agree on: plugin metadata, menu
//! definitions, and the data provider interface the host exposes for reading server, channel,
//! client and connection variables.

mod error;
mod menu;
mod plugin;
pub mod provider;
mod types;

pub use error::ProviderError;
pub use menu::{MenuItem, MenuType, Notice};
pub use plugin::{API_VERSION, EntityKind, InitStatus, Plugin};
pub use provider::{
    Attribute, AttributeValue, ChannelId, ChannelVariable, ClientId, ClientVariable,
    ConnectionId, ConnectionVariable, DataProvider, ServerVariable, ValueKind,
};
pub use types::{Author, Description, Name, Version};
