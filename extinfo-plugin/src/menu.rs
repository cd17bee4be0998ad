/// Where a menu item is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuType {
    /// The "Plugins" menu in the main menu bar.
    Global,
    /// The channel context menu.
    Channel,
    /// The client context menu.
    Client,
}

impl MenuType {
    /// Returns the value the host uses for this menu type.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::Global => 0,
            Self::Channel => 1,
            Self::Client => 2,
        }
    }

    /// Converts a host value into a menu type.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Global),
            1 => Some(Self::Channel),
            2 => Some(Self::Client),
            _ => None,
        }
    }
}

/// A menu entry registered with the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// The menu the item belongs to.
    pub kind: MenuType,
    /// Id passed back when the item is triggered.
    pub id: i32,
    /// Label of the item.
    pub text: String,
    /// Icon file name relative to the plugin's resource directory, or empty.
    pub icon: String,
}

impl MenuItem {
    /// Creates a new menu item.
    pub fn new(kind: MenuType, id: i32, text: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            text: text.into(),
            icon: icon.into(),
        }
    }
}

/// A message the host should present to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Title of the message.
    pub title: String,
    /// Body of the message.
    pub text: String,
}

impl Notice {
    /// Creates a new notice.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}
