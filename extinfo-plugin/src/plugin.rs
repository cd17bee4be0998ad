use crate::provider::{ConnectionId, DataProvider};
use crate::{Author, Description, MenuItem, MenuType, Name, Notice, Version};

/// The plugin API version this contract implements.
pub const API_VERSION: i32 = 20;

/// The kind of entity the host asks information about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// The virtual server of a connection.
    Server,
    /// A channel.
    Channel,
    /// A client.
    Client,
}

impl EntityKind {
    /// Converts a host value into an item type.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Server),
            1 => Some(Self::Channel),
            2 => Some(Self::Client),
            _ => None,
        }
    }
}

/// Result of plugin initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    /// The plugin is ready.
    Success,
    /// The plugin failed and the host should unload it.
    Failure,
    /// The plugin failed but already told the user, so the host stays quiet.
    FailureSilent,
}

impl InitStatus {
    /// Returns the value the host expects for this status.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::FailureSilent => -2,
        }
    }
}

/// The base trait that all plugins must implement.
pub trait Plugin: Send + Sync {
    /// Returns the name of the plugin.
    fn name() -> Name
    where
        Self: Sized;

    /// Returns the author of the plugin.
    fn author() -> Author
    where
        Self: Sized;

    /// Returns the version of the plugin.
    fn version() -> Version
    where
        Self: Sized;

    /// Returns a short description of the plugin.
    fn description() -> Description
    where
        Self: Sized;

    /// Returns the plugin API version the plugin was built against.
    fn api_version() -> i32
    where
        Self: Sized,
    {
        API_VERSION
    }

    /// Whether the host should load the plugin automatically.
    fn requests_autoload() -> bool
    where
        Self: Sized,
    {
        false
    }

    /// Static title shown next to the plugin's info panel content.
    fn info_title(&self) -> &str;

    /// Renders the info panel content for an entity, or `None` to show nothing.
    fn info_data<P: DataProvider>(
        &self,
        provider: &P,
        connection: ConnectionId,
        id: u64,
        kind: EntityKind,
    ) -> Option<String>;

    /// Menu items to register with the host.
    fn menus(&self) -> Vec<MenuItem> {
        Vec::new()
    }

    /// Icon of the plugin's submenu.
    fn menu_icon(&self) -> Option<&str> {
        None
    }

    /// Handles a triggered menu item, optionally returning a message for the user.
    fn on_menu_item(
        &self,
        _connection: ConnectionId,
        _menu: MenuType,
        _id: i32,
        _selected: u64,
    ) -> Option<Notice> {
        None
    }
}
