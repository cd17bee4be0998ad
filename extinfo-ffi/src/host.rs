//! The function table the host hands to the plugin, and the data provider built on top of it.

use std::borrow::Cow;
use std::ffi::{CStr, CString, c_char, c_int, c_uint, c_void};
use std::fmt;
use std::path::PathBuf;
use std::ptr::{self, NonNull};

use extinfo_plugin::{
    Attribute, AttributeValue, ClientId, ConnectionId, DataProvider, ProviderError, ValueKind,
};
use time::OffsetDateTime;
use tracing::warn;

/// Return code of a successful host call.
pub const ERROR_OK: c_uint = 0;

/// Size of the buffer handed to `get_config_path`.
const PATH_BUFSIZE: usize = 512;

/// Channel name used for messages written to the host log.
const LOG_CHANNEL: &CStr = c"Extended Info";

/// Releases memory the host allocated.
pub type FreeMemoryFn = unsafe extern "C" fn(pointer: *mut c_void) -> c_uint;

/// Severity of a message written to the host log.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Something failed.
    Error = 1,
    /// Something unexpected happened.
    Warning = 2,
    /// Informational message.
    Info = 4,
}

/// Functions the host exposes to the plugin.
///
/// Every entry must point to a valid function for as long as the plugin is loaded. Calls that
/// return a `c_uint` return [`ERROR_OK`] on success and a host error code otherwise. Strings handed
/// out by the host through an out pointer are owned by the plugin until passed to
/// `free_memory`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HostFunctions {
    /// Releases a string allocated by the host.
    pub free_memory: FreeMemoryFn,
    /// Writes a message to the host log.
    pub log_message: unsafe extern "C" fn(
        message: *const c_char,
        severity: c_int,
        channel: *const c_char,
        connection: u64,
    ) -> c_uint,
    /// Shows a message to the user.
    pub print_message:
        unsafe extern "C" fn(connection: u64, title: *const c_char, text: *const c_char),
    /// Writes the host's configuration directory into `path`, NUL terminated.
    pub get_config_path: unsafe extern "C" fn(path: *mut c_char, max_len: usize),
    /// Resolves our own client id on a connection.
    pub get_client_id: unsafe extern "C" fn(connection: u64, result: *mut u16) -> c_uint,
    /// Asks the server for the current variables of a client.
    pub request_client_variables:
        unsafe extern "C" fn(connection: u64, client: u16, return_code: *const c_char) -> c_uint,
    /// Reads a server variable as an integer.
    pub get_server_variable_as_int:
        unsafe extern "C" fn(connection: u64, flag: usize, result: *mut c_int) -> c_uint,
    /// Reads a server variable as an unsigned 64-bit integer.
    pub get_server_variable_as_uint64:
        unsafe extern "C" fn(connection: u64, flag: usize, result: *mut u64) -> c_uint,
    /// Reads a server variable as a string.
    pub get_server_variable_as_string:
        unsafe extern "C" fn(connection: u64, flag: usize, result: *mut *mut c_char) -> c_uint,
    /// Reads a channel variable as an integer.
    pub get_channel_variable_as_int: unsafe extern "C" fn(
        connection: u64,
        channel: u64,
        flag: usize,
        result: *mut c_int,
    ) -> c_uint,
    /// Reads a channel variable as an unsigned 64-bit integer.
    pub get_channel_variable_as_uint64: unsafe extern "C" fn(
        connection: u64,
        channel: u64,
        flag: usize,
        result: *mut u64,
    ) -> c_uint,
    /// Reads a channel variable as a string.
    pub get_channel_variable_as_string: unsafe extern "C" fn(
        connection: u64,
        channel: u64,
        flag: usize,
        result: *mut *mut c_char,
    ) -> c_uint,
    /// Reads a client variable as an integer.
    pub get_client_variable_as_int: unsafe extern "C" fn(
        connection: u64,
        client: u16,
        flag: usize,
        result: *mut c_int,
    ) -> c_uint,
    /// Reads a client variable as an unsigned 64-bit integer.
    pub get_client_variable_as_uint64: unsafe extern "C" fn(
        connection: u64,
        client: u16,
        flag: usize,
        result: *mut u64,
    ) -> c_uint,
    /// Reads a client variable as a string.
    pub get_client_variable_as_string: unsafe extern "C" fn(
        connection: u64,
        client: u16,
        flag: usize,
        result: *mut *mut c_char,
    ) -> c_uint,
    /// Reads a connection statistic of a client as an unsigned 64-bit integer.
    pub get_connection_variable_as_uint64: unsafe extern "C" fn(
        connection: u64,
        client: u16,
        flag: usize,
        result: *mut u64,
    ) -> c_uint,
    /// Reads a connection statistic of a client as a double.
    pub get_connection_variable_as_double: unsafe extern "C" fn(
        connection: u64,
        client: u16,
        flag: usize,
        result: *mut f64,
    ) -> c_uint,
    /// Reads a connection statistic of a client as a string.
    pub get_connection_variable_as_string: unsafe extern "C" fn(
        connection: u64,
        client: u16,
        flag: usize,
        result: *mut *mut c_char,
    ) -> c_uint,
}

impl HostFunctions {
    /// Returns the host's configuration directory, if it reports one.
    pub fn config_dir(&self) -> Option<PathBuf> {
        let mut buffer = vec![0_u8; PATH_BUFSIZE];

        // SAFETY: the buffer is writable for the length we pass
        unsafe { (self.get_config_path)(buffer.as_mut_ptr().cast(), buffer.len()) };

        let path = CStr::from_bytes_until_nul(&buffer).ok()?.to_str().ok()?;

        if path.is_empty() {
            None
        } else {
            Some(PathBuf::from(path))
        }
    }

    /// Writes a message to the host log.
    pub fn log(&self, message: &str, level: LogLevel) {
        let Ok(message) = CString::new(message) else {
            return;
        };

        // SAFETY: both strings are NUL terminated and outlive the call
        let code = unsafe {
            (self.log_message)(message.as_ptr(), level as c_int, LOG_CHANNEL.as_ptr(), 0)
        };

        if code != ERROR_OK {
            warn!(%code, "host rejected log message");
        }
    }

    /// Shows a message to the user.
    pub fn print(&self, connection: ConnectionId, title: &str, text: &str) {
        let (Ok(title), Ok(text)) = (CString::new(title), CString::new(text)) else {
            warn!("message contains a NUL byte");
            return;
        };

        // SAFETY: both strings are NUL terminated and outlive the call
        unsafe { (self.print_message)(connection.0, title.as_ptr(), text.as_ptr()) };
    }
}

/// A string owned by the host, released through `free_memory` when dropped.
pub struct HostString {
    ptr: NonNull<c_char>,
    free_memory: FreeMemoryFn,
}

impl HostString {
    /// Takes ownership of a host allocated string.
    ///
    /// Returns `None` for a null pointer.
    ///
    /// # Safety
    ///
    /// `ptr` must be null or point to a NUL terminated string that stays valid until it is
    /// passed to `free_memory`, and nothing else may release it.
    pub unsafe fn from_raw(ptr: *mut c_char, free_memory: FreeMemoryFn) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr, free_memory })
    }

    /// Returns the string, replacing invalid UTF-8.
    pub fn to_string_lossy(&self) -> Cow<'_, str> {
        // SAFETY: the pointer is a valid NUL terminated string until we release it in `drop`
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }.to_string_lossy()
    }
}

impl Drop for HostString {
    fn drop(&mut self) {
        // SAFETY: we own the string and release it exactly once
        let code = unsafe { (self.free_memory)(self.ptr.as_ptr().cast()) };

        if code != ERROR_OK {
            warn!(%code, "host could not release string");
        }
    }
}

impl fmt::Display for HostString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl fmt::Debug for HostString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostString")
            .field(&self.to_string_lossy())
            .finish()
    }
}

const fn check(code: c_uint) -> Result<(), ProviderError> {
    if code == ERROR_OK {
        Ok(())
    } else {
        Err(ProviderError::Code(code))
    }
}

/// Reads variables through the host function table.
#[derive(Debug, Clone, Copy)]
pub struct HostProvider {
    functions: HostFunctions,
}

type Value = AttributeValue<HostString>;

impl HostProvider {
    /// Creates a provider calling into `functions`.
    pub const fn new(functions: HostFunctions) -> Self {
        Self { functions }
    }

    fn int(call: impl FnOnce(*mut c_int) -> c_uint) -> Result<Value, ProviderError> {
        let mut value: c_int = 0;

        check(call(&raw mut value))?;

        Ok(AttributeValue::Integer(i64::from(value)))
    }

    fn uint(call: impl FnOnce(*mut u64) -> c_uint) -> Result<Value, ProviderError> {
        let mut value = 0_u64;

        check(call(&raw mut value))?;

        Ok(AttributeValue::UnsignedInteger(value))
    }

    fn double(call: impl FnOnce(*mut f64) -> c_uint) -> Result<Value, ProviderError> {
        let mut value = 0_f64;

        check(call(&raw mut value))?;

        Ok(AttributeValue::Double(value))
    }

    fn timestamp(call: impl FnOnce(*mut u64) -> c_uint) -> Result<Value, ProviderError> {
        let mut value = 0_u64;

        check(call(&raw mut value))?;

        let seconds = i64::try_from(value).unwrap_or(i64::MAX);

        OffsetDateTime::from_unix_timestamp(seconds)
            .map(AttributeValue::Timestamp)
            .map_err(|_| ProviderError::InvalidTimestamp(seconds))
    }

    fn text(&self, call: impl FnOnce(*mut *mut c_char) -> c_uint) -> Result<Value, ProviderError> {
        let mut value: *mut c_char = ptr::null_mut();

        check(call(&raw mut value))?;

        // SAFETY: on success the host hands over a string it allocated for us
        unsafe { HostString::from_raw(value, self.functions.free_memory) }
            .map(AttributeValue::Text)
            .ok_or(ProviderError::Missing)
    }
}

impl DataProvider for HostProvider {
    type Text = HostString;

    fn own_client_id(&self, connection: ConnectionId) -> Result<ClientId, ProviderError> {
        let mut id = 0_u16;

        // SAFETY: the out pointer is valid for the call
        check(unsafe { (self.functions.get_client_id)(connection.0, &raw mut id) })?;

        Ok(ClientId(id))
    }

    fn fetch(
        &self,
        connection: ConnectionId,
        attribute: Attribute,
    ) -> Result<Value, ProviderError> {
        let f = &self.functions;
        let connection = connection.0;

        // SAFETY: the host guarantees a valid table and every out pointer is valid for the call
        unsafe {
            match attribute {
                Attribute::Server(variable) => {
                    let flag = variable.id();

                    match variable.kind() {
                        ValueKind::Integer => Self::int(|out| {
                            (f.get_server_variable_as_int)(connection, flag, out)
                        }),
                        ValueKind::UnsignedInteger => Self::uint(|out| {
                            (f.get_server_variable_as_uint64)(connection, flag, out)
                        }),
                        ValueKind::Timestamp => Self::timestamp(|out| {
                            (f.get_server_variable_as_uint64)(connection, flag, out)
                        }),
                        ValueKind::Text => self.text(|out| {
                            (f.get_server_variable_as_string)(connection, flag, out)
                        }),
                        kind @ ValueKind::Double => Err(ProviderError::Unsupported(kind)),
                    }
                }
                Attribute::Channel(channel, variable) => {
                    let (channel, flag) = (channel.0, variable.id());

                    match variable.kind() {
                        ValueKind::Integer => Self::int(|out| {
                            (f.get_channel_variable_as_int)(connection, channel, flag, out)
                        }),
                        ValueKind::UnsignedInteger => Self::uint(|out| {
                            (f.get_channel_variable_as_uint64)(connection, channel, flag, out)
                        }),
                        ValueKind::Text => self.text(|out| {
                            (f.get_channel_variable_as_string)(connection, channel, flag, out)
                        }),
                        kind => Err(ProviderError::Unsupported(kind)),
                    }
                }
                Attribute::Client(client, variable) => {
                    let (client, flag) = (client.0, variable.id());

                    match variable.kind() {
                        ValueKind::Integer => Self::int(|out| {
                            (f.get_client_variable_as_int)(connection, client, flag, out)
                        }),
                        ValueKind::UnsignedInteger => Self::uint(|out| {
                            (f.get_client_variable_as_uint64)(connection, client, flag, out)
                        }),
                        ValueKind::Text => self.text(|out| {
                            (f.get_client_variable_as_string)(connection, client, flag, out)
                        }),
                        kind => Err(ProviderError::Unsupported(kind)),
                    }
                }
                Attribute::Connection(client, variable) => {
                    let (client, flag) = (client.0, variable.id());

                    match variable.kind() {
                        ValueKind::UnsignedInteger => Self::uint(|out| {
                            (f.get_connection_variable_as_uint64)(connection, client, flag, out)
                        }),
                        ValueKind::Double => Self::double(|out| {
                            (f.get_connection_variable_as_double)(connection, client, flag, out)
                        }),
                        ValueKind::Text => self.text(|out| {
                            (f.get_connection_variable_as_string)(connection, client, flag, out)
                        }),
                        kind => Err(ProviderError::Unsupported(kind)),
                    }
                }
            }
        }
    }

    fn request_client_variables(
        &self,
        connection: ConnectionId,
        client: ClientId,
    ) -> Result<(), ProviderError> {
        // SAFETY: a null return code asks the host not to report back
        check(unsafe {
            (self.functions.request_client_variables)(connection.0, client.0, ptr::null())
        })
    }
}
