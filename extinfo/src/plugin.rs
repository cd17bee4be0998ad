use extinfo_plugin::{
    Author, ConnectionId, DataProvider, Description, EntityKind, MenuItem, MenuType, Name, Notice,
    Plugin, Version,
};
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::consts::{PLUGIN_AUTHOR, PLUGIN_CONTACT, PLUGIN_DESCRIPTION, PLUGIN_NAME};
use crate::{Config, DisplayMode, DisplayModeState, InfoFormatter};

/// Menu id of the "About" entry.
pub const MENU_ABOUT: i32 = 0;
/// Menu id of the "Toggle Meta Data" entry.
pub const MENU_TOGGLE_META_DATA: i32 = 1;

/// The extended info plugin.
#[derive(Debug)]
pub struct ExtendedInfo<C = SystemClock> {
    formatter: InfoFormatter<C>,
    display_mode: DisplayModeState,
}

impl ExtendedInfo<SystemClock> {
    /// Creates the plugin from its configuration.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_formatter(InfoFormatter::new(&config.info))
    }
}

impl<C: Clock> ExtendedInfo<C> {
    /// Creates the plugin around an existing formatter.
    #[must_use]
    pub const fn with_formatter(formatter: InfoFormatter<C>) -> Self {
        Self {
            formatter,
            display_mode: DisplayModeState::new(),
        }
    }

    /// Returns the current display mode.
    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode.current()
    }

    /// Returns the formatter used for reports.
    pub const fn formatter(&self) -> &InfoFormatter<C> {
        &self.formatter
    }

    fn about() -> Notice {
        Notice::new(
            format!("About {PLUGIN_NAME}"),
            format!(
                "{PLUGIN_NAME} v{} developed by {PLUGIN_AUTHOR} ({PLUGIN_CONTACT})",
                Self::version()
            ),
        )
    }

    fn toggle_meta_data(&self) -> Notice {
        let mode = self.display_mode.toggle();

        info!(%mode, "toggled display mode");

        let text = if mode.shows_metadata() {
            "Client meta data is now shown."
        } else {
            "Client meta data is now hidden."
        };

        Notice::new(PLUGIN_NAME, text)
    }
}

impl<C: Clock> Plugin for ExtendedInfo<C> {
    fn name() -> Name {
        Name::new(PLUGIN_NAME)
    }

    fn author() -> Author {
        Author::new(PLUGIN_AUTHOR)
    }

    fn version() -> Version {
        Version::new(env!("CARGO_PKG_VERSION"))
    }

    fn description() -> Description {
        Description::new(PLUGIN_DESCRIPTION)
    }

    fn requests_autoload() -> bool {
        true
    }

    fn info_title(&self) -> &str {
        PLUGIN_NAME
    }

    fn info_data<P: DataProvider>(
        &self,
        provider: &P,
        connection: ConnectionId,
        id: u64,
        kind: EntityKind,
    ) -> Option<String> {
        let mode = self.display_mode.current();

        match self.formatter.format(provider, kind, id, connection, mode) {
            Ok(report) => Some(report.into_string()),
            Err(err) => {
                debug!(%connection, %id, ?kind, %err, "no report");

                None
            }
        }
    }

    fn menus(&self) -> Vec<MenuItem> {
        vec![
            MenuItem::new(MenuType::Global, MENU_ABOUT, "About", "about.png"),
            MenuItem::new(
                MenuType::Global,
                MENU_TOGGLE_META_DATA,
                "Toggle Meta Data",
                "meta.png",
            ),
        ]
    }

    fn menu_icon(&self) -> Option<&str> {
        Some("info.png")
    }

    fn on_menu_item(
        &self,
        _connection: ConnectionId,
        menu: MenuType,
        id: i32,
        _selected: u64,
    ) -> Option<Notice> {
        match (menu, id) {
            (MenuType::Global, MENU_ABOUT) => Some(Self::about()),
            (MenuType::Global, MENU_TOGGLE_META_DATA) => Some(self.toggle_meta_data()),
            _ => {
                debug!(?menu, %id, "unknown menu item");

                None
            }
        }
    }
}
