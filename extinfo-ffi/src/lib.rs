//! C ABI of the Extended Info plugin.
//!
//! The host loads the shared library, hands over its [`HostFunctions`] table through
//! [`plugin_set_function_pointers`] and calls [`plugin_init`]. Everything after that is driven by
//! the host: info panel refreshes call [`plugin_info_data`] and menu clicks call
//! [`plugin_on_menu_item_event`]. Buffers returned to the host are released with
//! [`plugin_free_memory`]. See `include/extinfo_plugin.h` for the C declarations.

use std::ffi::{CStr, c_char, c_int, c_void};
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::{PoisonError, RwLock};

use extinfo::consts::CONFIG_FILE_NAME;
use extinfo::utils::Truncatable;
use extinfo::{Config, ExtendedInfo};
use extinfo_plugin::{ConnectionId, EntityKind, InitStatus, MenuType, Plugin};
use tracing::{debug, error, info, warn};

mod alloc;
mod host;
#[cfg(test)]
mod testing;

pub use alloc::{MENU_BUFSZ, PluginMenuItem};
pub use host::{ERROR_OK, HostFunctions, HostProvider, HostString, LogLevel};

const NAME: &CStr = c"Extended Info";
const AUTHOR: &CStr = c"Bluscream";
const DESCRIPTION: &CStr = c"Shows you more informations.";
const VERSION: &CStr = match CStr::from_bytes_with_nul(
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_bytes(),
) {
    Ok(version) => version,
    Err(_) => c"unknown",
};

static HOST: RwLock<Option<HostFunctions>> = RwLock::new(None);
static PLUGIN: RwLock<Option<ExtendedInfo>> = RwLock::new(None);
static PLUGIN_ID: RwLock<Option<String>> = RwLock::new(None);

fn host_functions() -> Option<HostFunctions> {
    *HOST.read().unwrap_or_else(PoisonError::into_inner)
}

/// Runs `f`, returning `fallback` if it panics.
fn guard<T>(fallback: T, f: impl FnOnce() -> T) -> T {
    panic::catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        error!("panic in plugin entry point");

        fallback
    })
}

/// Runs `f` with the loaded plugin, if any.
fn with_plugin<T>(f: impl FnOnce(&ExtendedInfo) -> T) -> Option<T> {
    let plugin = PLUGIN.read().unwrap_or_else(PoisonError::into_inner);

    plugin.as_ref().map(f)
}

/// Returns the plugin name.
#[unsafe(no_mangle)]
pub extern "C" fn plugin_name() -> *const c_char {
    NAME.as_ptr()
}

/// Returns the plugin version.
#[unsafe(no_mangle)]
pub extern "C" fn plugin_version() -> *const c_char {
    VERSION.as_ptr()
}

/// Returns the plugin API version the plugin was built against.
#[unsafe(no_mangle)]
pub extern "C" fn plugin_api_version() -> c_int {
    <ExtendedInfo>::api_version()
}

/// Returns the plugin author.
#[unsafe(no_mangle)]
pub extern "C" fn plugin_author() -> *const c_char {
    AUTHOR.as_ptr()
}

/// Returns the plugin description.
#[unsafe(no_mangle)]
pub extern "C" fn plugin_description() -> *const c_char {
    DESCRIPTION.as_ptr()
}

/// Stores the host function table.
///
/// # Safety
///
/// `functions` must be null or point to a table whose entries stay valid while the plugin is
/// loaded. The table itself is copied.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn plugin_set_function_pointers(functions: *const HostFunctions) {
    // SAFETY: the host passes a valid table or null
    let Some(functions) = (unsafe { functions.as_ref() }).copied() else {
        return;
    };

    *HOST.write().unwrap_or_else(PoisonError::into_inner) = Some(functions);
}

/// Loads the configuration and creates the plugin.
///
/// Returns `0` on success and `1` if the configuration is invalid.
#[unsafe(no_mangle)]
pub extern "C" fn plugin_init() -> c_int {
    guard(InitStatus::Failure.as_raw(), || init().as_raw())
}

fn init() -> InitStatus {
    let host = host_functions();
    let path = host
        .and_then(|host| host.config_dir())
        .map(|dir| dir.join(CONFIG_FILE_NAME));

    let config = match Config::load(path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            let message = format!("could not load configuration: {err}");

            if let Some(host) = host {
                host.log(&message, LogLevel::Error);
            }

            error!("{message}");

            return InitStatus::Failure;
        }
    };

    if let Err(err) = extinfo::tracing::try_init(&config.tracing) {
        // the host or an earlier load already installed a subscriber
        debug!(%err, "keeping existing tracing subscriber");
    }

    info!(
        path = ?path,
        developer_fields = config.info.developer_fields,
        "plugin initialized"
    );

    if let Some(host) = host {
        host.log("plugin initialized", LogLevel::Info);
    }

    *PLUGIN.write().unwrap_or_else(PoisonError::into_inner) = Some(ExtendedInfo::new(&config));

    InitStatus::Success
}

/// Drops the plugin and the registered plugin id.
#[unsafe(no_mangle)]
pub extern "C" fn plugin_shutdown() {
    guard((), || {
        PLUGIN.write().unwrap_or_else(PoisonError::into_inner).take();
        let id = PLUGIN_ID.write().unwrap_or_else(PoisonError::into_inner).take();

        info!(?id, "plugin shut down");
    });
}

/// Remembers the id the host assigned to this plugin.
///
/// # Safety
///
/// `id` must be null or a NUL terminated string valid for the duration of the call.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn plugin_register_plugin_id(id: *const c_char) {
    if id.is_null() {
        return;
    }

    // SAFETY: checked for null, the host passes a NUL terminated string
    let id = unsafe { CStr::from_ptr(id) }.to_string_lossy().into_owned();

    debug!(%id, "registered plugin id");

    *PLUGIN_ID.write().unwrap_or_else(PoisonError::into_inner) = Some(id);
}

/// Returns the static title of the info panel section.
#[unsafe(no_mangle)]
pub extern "C" fn plugin_info_title() -> *const c_char {
    NAME.as_ptr()
}

/// Renders the info panel content for an entity.
///
/// On success `*data` points to a new NUL terminated buffer the host must release with
/// [`plugin_free_memory`]. Otherwise `*data` is set to null and the host shows nothing.
///
/// # Safety
///
/// `data` must be null or valid for a pointer write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn plugin_info_data(
    connection: u64,
    id: u64,
    kind: c_int,
    data: *mut *mut c_char,
) {
    if data.is_null() {
        return;
    }

    let report = guard(None, || info_data(ConnectionId(connection), id, kind));
    let buffer = report.map_or(ptr::null_mut(), |report| alloc::c_string(&report));

    // SAFETY: checked for null, the host passes a writable pointer
    unsafe { data.write(buffer) };
}

fn info_data(connection: ConnectionId, id: u64, kind: c_int) -> Option<String> {
    let Some(kind) = EntityKind::from_raw(kind) else {
        debug!(%kind, "unknown item type");
        return None;
    };

    let provider = HostProvider::new(host_functions()?);

    with_plugin(|plugin| plugin.info_data(&provider, connection, id, kind)).flatten()
}

/// Releases a buffer previously handed to the host.
///
/// # Safety
///
/// `data` must be null or a buffer returned by this library that was not released yet.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn plugin_free_memory(data: *mut c_void) {
    // SAFETY: every buffer we hand out comes from malloc
    unsafe { libc::free(data) };
}

/// Whether the host should load the plugin automatically.
#[unsafe(no_mangle)]
pub extern "C" fn plugin_request_autoload() -> c_int {
    c_int::from(<ExtendedInfo>::requests_autoload())
}

/// Hands the plugin menus to the host.
///
/// `*menu_items` receives a NULL terminated array of items and `*menu_icon` the icon of the
/// plugin submenu. Both, and every item, are released by the host with [`plugin_free_memory`].
///
/// # Safety
///
/// Both pointers must be null or valid for a pointer write.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn plugin_init_menus(
    menu_items: *mut *mut *mut PluginMenuItem,
    menu_icon: *mut *mut c_char,
) {
    let (items, icon) = guard((ptr::null_mut(), ptr::null_mut()), || {
        with_plugin(|plugin| {
            let items = alloc::menu_items(&plugin.menus());
            let icon = plugin.menu_icon().map_or(ptr::null_mut(), |icon| {
                alloc::c_string(icon.truncate_to_bytes(MENU_BUFSZ - 1))
            });

            (items, icon)
        })
        .unwrap_or((ptr::null_mut(), ptr::null_mut()))
    });

    if items.is_null() {
        warn!("no menus registered");
    }

    // SAFETY: the host passes writable pointers or null
    unsafe {
        if let Some(menu_items) = menu_items.as_mut() {
            *menu_items = items;
        } else if !items.is_null() {
            alloc::free_menu_items(items);
        }

        if let Some(menu_icon) = menu_icon.as_mut() {
            *menu_icon = icon;
        } else {
            libc::free(icon.cast());
        }
    }
}

/// Handles a click on one of the plugin menus.
#[unsafe(no_mangle)]
pub extern "C" fn plugin_on_menu_item_event(connection: u64, kind: c_int, id: c_int, selected: u64) {
    guard((), || {
        let Some(menu) = MenuType::from_raw(kind) else {
            debug!(%kind, "unknown menu type");
            return;
        };

        let connection = ConnectionId(connection);
        let Some(notice) =
            with_plugin(|plugin| plugin.on_menu_item(connection, menu, id, selected)).flatten()
        else {
            return;
        };

        if let Some(host) = host_functions() {
            host.print(connection, &notice.title, &notice.text);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c_str(pointer: *const c_char) -> String {
        // SAFETY: the exports return static NUL terminated strings
        unsafe { CStr::from_ptr(pointer) }
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn metadata_matches_plugin() {
        assert_eq!(c_str(plugin_name()), <ExtendedInfo>::name().as_str());
        assert_eq!(c_str(plugin_author()), <ExtendedInfo>::author().as_str());
        assert_eq!(c_str(plugin_version()), <ExtendedInfo>::version().as_str());
        assert_eq!(c_str(plugin_description()), <ExtendedInfo>::description().as_str());
        assert_eq!(c_str(plugin_info_title()), "Extended Info");
        assert_eq!(plugin_api_version(), 20);
        assert_eq!(plugin_request_autoload(), 1);
    }

    #[test]
    fn plugin_lifecycle() {
        testing::reset();

        // SAFETY: the fake table lives for the whole test binary
        unsafe { plugin_set_function_pointers(&testing::FUNCTIONS) };
        assert_eq!(plugin_init(), 0);
        // SAFETY: static NUL terminated string
        unsafe { plugin_register_plugin_id(c"extinfo_test".as_ptr()) };

        let render = |kind: c_int, id: u64| {
            let mut data = ptr::null_mut();
            // SAFETY: `data` is writable
            unsafe { plugin_info_data(1, id, kind, &raw mut data) };

            if data.is_null() {
                return None;
            }

            let report = c_str(data);
            // SAFETY: handed out by plugin_info_data
            unsafe { plugin_free_memory(data.cast()) };

            Some(report)
        };

        let server = render(0, 0).expect("no server report");
        assert!(server.contains("Resolved IP: [color=green]192.0.2.1[/color]"));
        assert!(server.contains("Virtualserver ID: [color=blue]1[/color]"));

        let channel = render(1, 2).expect("no channel report");
        assert!(channel.contains("Phonetic Name: channel-30"));

        let client = render(2, 5).expect("no client report");
        assert!(client.contains("Type: [COLOR=#1a2643]Client[/COLOR] from [color=darkgreen]client-59[/color]"));
        assert!(client.contains("IP: [color=lightgreen]198.51.100.7[/color]"));
        assert!(client.contains("Deviation: [color=darkorange]1.50[/color] ms"));
        assert!(!client.contains("Meta Data"));

        assert_eq!(render(3, 0), None);
        assert_eq!(testing::allocated(), testing::released());

        let mut items = ptr::null_mut();
        let mut icon = ptr::null_mut();
        // SAFETY: both pointers are writable
        unsafe { plugin_init_menus(&raw mut items, &raw mut icon) };
        assert!(!items.is_null());
        assert_eq!(c_str(icon), "info.png");
        // SAFETY: handed out by plugin_init_menus
        unsafe {
            alloc::free_menu_items(items);
            plugin_free_memory(icon.cast());
        }

        plugin_on_menu_item_event(1, 0, 1, 0);
        let printed = testing::printed();
        assert_eq!(printed.len(), 1);
        assert_eq!(printed[0].0, "Extended Info");

        let client = render(2, 5).expect("no client report");
        assert!(client.ends_with("Meta Data: [color=gray]client-15[/color]"));

        plugin_on_menu_item_event(1, 0, 0, 0);
        assert!(testing::printed()[1].0.starts_with("About"));

        testing::fail_flag(extinfo_plugin::ClientVariable::Country.id());
        assert_eq!(render(2, 5), None);
        assert_eq!(testing::allocated(), testing::released());

        plugin_shutdown();
        assert_eq!(render(0, 0), None);
    }
}
