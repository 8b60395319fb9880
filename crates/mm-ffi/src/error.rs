use std::cell::RefCell;
use std::ffi::CString;

use log::debug;

use crate::types::MMStatus;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Store an error message for later retrieval via `mm_last_error`.
pub fn set_last_error(msg: String) {
    debug!("ffi error: {}", msg);
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Take the last error message, leaving `None` in its place.
pub fn take_last_error() -> Option<CString> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

/// Record `err` and return `ErrorInvalidArgument`.
///
/// Every `KernelError` stems from arguments the caller passed in.
pub(crate) fn invalid(err: impl std::fmt::Display) -> MMStatus {
    set_last_error(err.to_string());
    MMStatus::ErrorInvalidArgument
}
