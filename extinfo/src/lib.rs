//! Extended info panel content for voice chat servers, channels and clients.
//!
//! The [`InfoFormatter`] reads a fixed, ordered set of variables through a
//! [`DataProvider`](extinfo_plugin::DataProvider) and renders them as a block of bracket-tag
//! markup. [`ExtendedInfo`] wraps the formatter as a host [`Plugin`](extinfo_plugin::Plugin).

pub mod clock;
pub mod config;
pub mod consts;
mod display_mode;
mod error;
pub mod formatter;
mod plugin;
pub mod snapshot;
pub mod tracing;
pub mod utils;

pub use config::Config;
pub use display_mode::{DisplayMode, DisplayModeState};
pub use error::{Error, FormatError};
pub use formatter::{InfoFormatter, Report};
pub use plugin::{ExtendedInfo, MENU_ABOUT, MENU_TOGGLE_META_DATA};
pub use snapshot::Snapshot;
