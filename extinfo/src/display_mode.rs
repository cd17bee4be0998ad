use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether client reports include the client's meta data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayMode {
    /// The regular set of fields.
    #[default]
    Compact,
    /// The regular set of fields followed by the client's meta data.
    WithMetadata,
}

impl DisplayMode {
    /// Returns the other mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Compact => Self::WithMetadata,
            Self::WithMetadata => Self::Compact,
        }
    }

    /// Whether the meta data field is rendered.
    #[must_use]
    pub const fn shows_metadata(self) -> bool {
        matches!(self, Self::WithMetadata)
    }

    const fn from_flag(show_metadata: bool) -> Self {
        if show_metadata {
            Self::WithMetadata
        } else {
            Self::Compact
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compact => f.write_str("compact"),
            Self::WithMetadata => f.write_str("with meta data"),
        }
    }
}

/// The shared display mode, flipped from the plugin menu.
///
/// Reads and writes are atomic, so info panel refreshes and menu events may race freely.
#[derive(Debug, Default)]
pub struct DisplayModeState(AtomicBool);

impl DisplayModeState {
    /// Creates a new state in [`DisplayMode::Compact`].
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Returns the current mode.
    pub fn current(&self) -> DisplayMode {
        DisplayMode::from_flag(self.0.load(Ordering::Acquire))
    }

    /// Flips the mode and returns the new one.
    pub fn toggle(&self) -> DisplayMode {
        let previous = self.0.fetch_xor(true, Ordering::AcqRel);

        DisplayMode::from_flag(!previous)
    }
}
