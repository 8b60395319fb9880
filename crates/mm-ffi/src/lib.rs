mod error;
mod handle;
mod types;

pub use error::*;
pub use handle::*;
pub use types::*;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::AssertUnwindSafe;

use mm_kernel::{matmul_checked, MatmulDims};

type FfiResult<T> = std::result::Result<T, MMStatus>;

/// Execute a closure that returns an `MMStatus`, catching any panics
/// and converting them into `MMStatus::ErrorInternal`.
///
/// Nothing that a panicking closure touched is reused afterwards, so the
/// closure is asserted unwind-safe.
fn catch_panic<F: FnOnce() -> MMStatus>(f: F) -> MMStatus {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            MMStatus::ErrorInternal
        }
    }
}

fn into_status(r: FfiResult<()>) -> MMStatus {
    match r {
        Ok(()) => MMStatus::Ok,
        Err(status) => status,
    }
}

/// Borrow `len` input elements. Null is accepted only when `len == 0`.
unsafe fn input_slice<'a>(name: &str, ptr: *const f32, len: usize) -> FfiResult<&'a [f32]> {
    if len == 0 {
        return Ok(Default::default());
    }
    if ptr.is_null() {
        return Err(invalid(format!("{} is null", name)));
    }
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

/// Borrow `len` output elements. Null is accepted only when `len == 0`.
unsafe fn output_slice<'a>(name: &str, ptr: *mut f32, len: usize) -> FfiResult<&'a mut [f32]> {
    if len == 0 {
        return Ok(Default::default());
    }
    if ptr.is_null() {
        return Err(invalid(format!("{} is null", name)));
    }
    Ok(unsafe { std::slice::from_raw_parts_mut(ptr, len) })
}

fn required_lens(dims: MatmulDims) -> FfiResult<(usize, usize, usize)> {
    Ok((
        dims.a_len().map_err(invalid)?,
        dims.b_len().map_err(invalid)?,
        dims.c_len().map_err(invalid)?,
    ))
}

/// Reference matmul `c = a @ b` over row-major float buffers.
///
/// `a` holds `m*k`, `b` holds `k*n` and `c` holds `m*n` floats. Every element
/// of `c` is overwritten (with `0.0` when `k == 0`); nothing is written when
/// `m == 0` or `n == 0`. Returns `ErrorInvalidArgument` for negative
/// dimensions, or for a null pointer whose required length is non-zero.
///
/// # Safety
///
/// Each non-null pointer must be valid for its required length, and `c` must
/// not overlap `a` or `b`.
#[no_mangle]
pub unsafe extern "C" fn mm_matmul(
    a: *const f32,
    b: *const f32,
    c: *mut f32,
    m: i32,
    n: i32,
    k: i32,
) -> MMStatus {
    catch_panic(|| {
        into_status((|| -> FfiResult<()> {
            let dims = MatmulDims::from_i32(m, n, k).map_err(invalid)?;
            let (a_len, b_len, c_len) = required_lens(dims)?;
            let a = unsafe { input_slice("a", a, a_len)? };
            let b = unsafe { input_slice("b", b, b_len)? };
            let c = unsafe { output_slice("c", c, c_len)? };
            matmul_checked(a, b, c, dims).map_err(invalid)
        })())
    })
}

/// Like `mm_matmul`, but also checks the caller-declared buffer lengths
/// (in elements) against the dimensions before touching any memory.
///
/// # Safety
///
/// Each non-null pointer must be valid for its declared length, and `c` must
/// not overlap `a` or `b`.
#[no_mangle]
pub unsafe extern "C" fn mm_matmul_checked(
    a: *const f32,
    a_len: usize,
    b: *const f32,
    b_len: usize,
    c: *mut f32,
    c_len: usize,
    m: i32,
    n: i32,
    k: i32,
) -> MMStatus {
    catch_panic(|| {
        into_status((|| -> FfiResult<()> {
            let dims = MatmulDims::from_i32(m, n, k).map_err(invalid)?;
            dims.validate(a_len, b_len, c_len).map_err(invalid)?;
            let a = unsafe { input_slice("a", a, a_len)? };
            let b = unsafe { input_slice("b", b, b_len)? };
            let c = unsafe { output_slice("c", c, c_len)? };
            matmul_checked(a, b, c, dims).map_err(invalid)
        })())
    })
}

/// Create a kernel bound to fixed dimensions.
///
/// On success, writes a heap-allocated `MMKernel` pointer into `*kernel_out`
/// and returns `MMStatus::Ok`. The caller must later call `mm_kernel_destroy`
/// to free the kernel.
#[no_mangle]
pub unsafe extern "C" fn mm_kernel_create(
    m: i32,
    n: i32,
    k: i32,
    variant: MMKernelVariant,
    kernel_out: *mut *mut MMKernel,
) -> MMStatus {
    catch_panic(|| {
        if kernel_out.is_null() {
            set_last_error("kernel_out is null".to_string());
            return MMStatus::ErrorInvalidArgument;
        }
        let dims = match MatmulDims::from_i32(m, n, k) {
            Ok(d) => d,
            Err(e) => return invalid(e),
        };
        let kernel = match MMKernel::new(dims, variant) {
            Ok(h) => Box::new(h),
            Err(e) => return invalid(e),
        };
        unsafe {
            *kernel_out = Box::into_raw(kernel);
        }
        MMStatus::Ok
    })
}

/// Run a bound kernel: `c = a @ b` for the dimensions given at creation.
///
/// # Safety
///
/// `kernel` must come from `mm_kernel_create`. Buffer requirements are as in
/// `mm_matmul`.
#[no_mangle]
pub unsafe extern "C" fn mm_kernel_invoke(
    kernel: *const MMKernel,
    a: *const f32,
    b: *const f32,
    c: *mut f32,
) -> MMStatus {
    catch_panic(|| {
        if kernel.is_null() {
            set_last_error("kernel is null".to_string());
            return MMStatus::ErrorInvalidArgument;
        }
        let bound = unsafe { &(*kernel).bound };
        into_status((|| -> FfiResult<()> {
            let (a_len, b_len, c_len) = bound.buffer_lens();
            let a = unsafe { input_slice("a", a, a_len)? };
            let b = unsafe { input_slice("b", b, b_len)? };
            let c = unsafe { output_slice("c", c, c_len)? };
            bound.invoke(a, b, c).map_err(invalid)
        })())
    })
}

/// Write the bound dimensions of `kernel`, as passed to `mm_kernel_create`.
/// Null output pointers are skipped.
///
/// # Safety
///
/// `kernel` must come from `mm_kernel_create`; non-null outputs must be
/// writable.
#[no_mangle]
pub unsafe extern "C" fn mm_kernel_dims(
    kernel: *const MMKernel,
    m_out: *mut i32,
    n_out: *mut i32,
    k_out: *mut i32,
) -> MMStatus {
    catch_panic(|| {
        if kernel.is_null() {
            set_last_error("kernel is null".to_string());
            return MMStatus::ErrorInvalidArgument;
        }
        let dims = unsafe { (*kernel).bound.dims() };
        into_status((|| -> FfiResult<()> {
            let mut values = [0i32; 3];
            for (slot, v) in values.iter_mut().zip([dims.m, dims.n, dims.k]) {
                *slot = i32::try_from(v).map_err(|_| {
                    set_last_error(format!("dimension {} does not fit in i32", v));
                    MMStatus::ErrorInternal
                })?;
            }
            for (out, v) in [m_out, n_out, k_out].into_iter().zip(values) {
                if !out.is_null() {
                    unsafe { *out = v };
                }
            }
            Ok(())
        })())
    })
}

/// Destroy a kernel previously created by `mm_kernel_create`.
///
/// Passing a null pointer is a no-op and returns `MMStatus::Ok`.
#[no_mangle]
pub unsafe extern "C" fn mm_kernel_destroy(kernel: *mut MMKernel) -> MMStatus {
    catch_panic(|| {
        if !kernel.is_null() {
            drop(unsafe { Box::from_raw(kernel) });
        }
        MMStatus::Ok
    })
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error on this
/// thread, or null if no error has occurred. The caller must free the returned
/// string with `mm_free_string`.
#[no_mangle]
pub extern "C" fn mm_last_error() -> *mut c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null_mut(),
    }
}

/// Free a string previously returned by `mm_last_error`.
///
/// # Safety
///
/// `s` must be null or a pointer returned by `mm_last_error`, freed once.
#[no_mangle]
pub unsafe extern "C" fn mm_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}
