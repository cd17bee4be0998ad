/// Name of the plugin as shown by the host.
pub const PLUGIN_NAME: &str = "Extended Info";

/// Plugin author.
pub const PLUGIN_AUTHOR: &str = "Bluscream";

/// Where to reach the plugin author.
pub const PLUGIN_CONTACT: &str = "admin@timo.de.vc";

/// Short description of the plugin.
pub const PLUGIN_DESCRIPTION: &str = "Shows you more informations.";

/// The default ceiling for a rendered report, in bytes, including the C string terminator.
pub const DEFAULT_MAX_REPORT_LEN: usize = 2512;

/// File name of the configuration file inside the host's configuration directory.
pub const CONFIG_FILE_NAME: &str = "extinfo.toml";

/// Prefix of environment variables that override configuration values.
pub const ENV_PREFIX: &str = "EXTINFO_";

/// The default tracing filter when `RUST_LOG` is not set.
pub const DEFAULT_TRACING_FILTER: &str = "extinfo=info,extinfo_ffi=info";

/// Rendered in place of a connection statistic the host could not provide.
pub const UNKNOWN_PLACEHOLDER: &str = "[color=lightgray]Unknown[/color]";
