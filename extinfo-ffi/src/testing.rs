//! A fake host for unit tests.

use std::cell::{Cell, RefCell};
use std::ffi::{CStr, c_char, c_int, c_uint, c_void};

use extinfo_plugin::{ClientVariable, ConnectionVariable, ServerVariable};

use crate::alloc;
use crate::host::{ERROR_OK, HostFunctions};

/// Error code returned for a flag configured with [`fail_flag`].
pub const ERROR_NOT_CONNECTED: c_uint = 0x0200;

/// Our own client id on every connection.
pub const OWN_CLIENT_ID: u16 = 1;

/// Creation time of the fake server.
pub const CREATED: i64 = 1_577_836_800;

thread_local! {
    static ALLOCATED: Cell<usize> = const { Cell::new(0) };
    static RELEASED: Cell<usize> = const { Cell::new(0) };
    static FAIL_FLAG: Cell<Option<usize>> = const { Cell::new(None) };
    static PRINTED: RefCell<Vec<(String, String)>> = const { RefCell::new(Vec::new()) };
}

pub const FUNCTIONS: HostFunctions = HostFunctions {
    free_memory,
    log_message,
    print_message,
    get_config_path,
    get_client_id,
    request_client_variables,
    get_server_variable_as_int,
    get_server_variable_as_uint64,
    get_server_variable_as_string,
    get_channel_variable_as_int,
    get_channel_variable_as_uint64,
    get_channel_variable_as_string,
    get_client_variable_as_int,
    get_client_variable_as_uint64,
    get_client_variable_as_string,
    get_connection_variable_as_uint64,
    get_connection_variable_as_double,
    get_connection_variable_as_string,
};

/// Clears the counters of the current thread.
pub fn reset() {
    ALLOCATED.set(0);
    RELEASED.set(0);
    FAIL_FLAG.set(None);
    PRINTED.with_borrow_mut(Vec::clear);
}

/// Makes every accessor fail for `flag` on the current thread.
pub fn fail_flag(flag: usize) {
    FAIL_FLAG.set(Some(flag));
}

pub fn allocated() -> usize {
    ALLOCATED.get()
}

pub fn released() -> usize {
    RELEASED.get()
}

/// Messages shown to the user on the current thread.
pub fn printed() -> Vec<(String, String)> {
    PRINTED.with_borrow(Clone::clone)
}

fn fails(flag: usize) -> bool {
    FAIL_FLAG.get() == Some(flag)
}

fn host_string(text: &str) -> *mut c_char {
    ALLOCATED.set(ALLOCATED.get() + 1);

    alloc::c_string(text)
}

/// Writes `value` through `result` unless `flag` is configured to fail.
unsafe fn answer<T>(flag: usize, result: *mut T, value: impl FnOnce() -> T) -> c_uint {
    if fails(flag) {
        return ERROR_NOT_CONNECTED;
    }

    // SAFETY: the caller passes a valid out pointer
    unsafe { result.write(value()) };

    ERROR_OK
}

unsafe extern "C" fn free_memory(pointer: *mut c_void) -> c_uint {
    RELEASED.set(RELEASED.get() + 1);

    // SAFETY: every string handed out by the fake host was allocated with malloc
    unsafe { libc::free(pointer) };

    ERROR_OK
}

unsafe extern "C" fn log_message(
    _message: *const c_char,
    _severity: c_int,
    _channel: *const c_char,
    _connection: u64,
) -> c_uint {
    ERROR_OK
}

unsafe extern "C" fn print_message(_connection: u64, title: *const c_char, text: *const c_char) {
    // SAFETY: the plugin passes NUL terminated strings
    let (title, text) = unsafe { (CStr::from_ptr(title), CStr::from_ptr(text)) };

    PRINTED.with_borrow_mut(|printed| {
        printed.push((
            title.to_string_lossy().into_owned(),
            text.to_string_lossy().into_owned(),
        ));
    });
}

unsafe extern "C" fn get_config_path(path: *mut c_char, max_len: usize) {
    if max_len > 0 {
        // SAFETY: the buffer holds at least one byte
        unsafe { path.write(0) };
    }
}

unsafe extern "C" fn get_client_id(_connection: u64, result: *mut u16) -> c_uint {
    // SAFETY: the caller passes a valid out pointer
    unsafe { result.write(OWN_CLIENT_ID) };

    ERROR_OK
}

unsafe extern "C" fn request_client_variables(
    _connection: u64,
    _client: u16,
    _return_code: *const c_char,
) -> c_uint {
    ERROR_OK
}

unsafe extern "C" fn get_server_variable_as_int(
    _connection: u64,
    flag: usize,
    result: *mut c_int,
) -> c_uint {
    // SAFETY: forwarded from the caller
    unsafe { answer(flag, result, || 1) }
}

unsafe extern "C" fn get_server_variable_as_uint64(
    _connection: u64,
    flag: usize,
    result: *mut u64,
) -> c_uint {
    let value = if flag == ServerVariable::Created.id() {
        CREATED.unsigned_abs()
    } else {
        7
    };

    // SAFETY: forwarded from the caller
    unsafe { answer(flag, result, || value) }
}

unsafe extern "C" fn get_server_variable_as_string(
    _connection: u64,
    flag: usize,
    result: *mut *mut c_char,
) -> c_uint {
    // SAFETY: forwarded from the caller
    unsafe { answer(flag, result, || host_string(&format!("server-{flag}"))) }
}

unsafe extern "C" fn get_channel_variable_as_int(
    _connection: u64,
    _channel: u64,
    flag: usize,
    result: *mut c_int,
) -> c_uint {
    // SAFETY: forwarded from the caller
    unsafe { answer(flag, result, || 1) }
}

unsafe extern "C" fn get_channel_variable_as_uint64(
    _connection: u64,
    _channel: u64,
    flag: usize,
    result: *mut u64,
) -> c_uint {
    // SAFETY: forwarded from the caller
    unsafe { answer(flag, result, || 0) }
}

unsafe extern "C" fn get_channel_variable_as_string(
    _connection: u64,
    _channel: u64,
    flag: usize,
    result: *mut *mut c_char,
) -> c_uint {
    // SAFETY: forwarded from the caller
    unsafe { answer(flag, result, || host_string(&format!("channel-{flag}"))) }
}

unsafe extern "C" fn get_client_variable_as_int(
    _connection: u64,
    _client: u16,
    flag: usize,
    result: *mut c_int,
) -> c_uint {
    let value = if flag == ClientVariable::Type.id() { 0 } else { 3 };

    // SAFETY: forwarded from the caller
    unsafe { answer(flag, result, || value) }
}

unsafe extern "C" fn get_client_variable_as_uint64(
    _connection: u64,
    _client: u16,
    flag: usize,
    result: *mut u64,
) -> c_uint {
    // SAFETY: forwarded from the caller
    unsafe { answer(flag, result, || 2) }
}

unsafe extern "C" fn get_client_variable_as_string(
    _connection: u64,
    _client: u16,
    flag: usize,
    result: *mut *mut c_char,
) -> c_uint {
    // SAFETY: forwarded from the caller
    unsafe { answer(flag, result, || host_string(&format!("client-{flag}"))) }
}

unsafe extern "C" fn get_connection_variable_as_uint64(
    _connection: u64,
    _client: u16,
    flag: usize,
    result: *mut u64,
) -> c_uint {
    // SAFETY: forwarded from the caller
    unsafe { answer(flag, result, || 23) }
}

unsafe extern "C" fn get_connection_variable_as_double(
    _connection: u64,
    _client: u16,
    flag: usize,
    result: *mut f64,
) -> c_uint {
    // SAFETY: forwarded from the caller
    unsafe { answer(flag, result, || 1.5) }
}

unsafe extern "C" fn get_connection_variable_as_string(
    _connection: u64,
    _client: u16,
    flag: usize,
    result: *mut *mut c_char,
) -> c_uint {
    let address = if flag == ConnectionVariable::ClientIp.id() {
        "198.51.100.7"
    } else {
        "192.0.2.1"
    };

    // SAFETY: forwarded from the caller
    unsafe { answer(flag, result, || host_string(address)) }
}
