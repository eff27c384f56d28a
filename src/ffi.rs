//! C ABI.
//!
//! Every entry point returns an `i32` status instead of unwinding: 0 on
//! success, the [`ErrorKind::code`](crate::error::ErrorKind::code) of the
//! failure otherwise, or [`SECRAND_ERR_INTERNAL`] for a null handle or a
//! caught panic. Results are written through out-pointers only on success.
//!
//! A handle may be shared between threads; it must be destroyed exactly once.

use core::panic::AssertUnwindSafe;
use std::panic;

use crate::error::RandomResult;
use crate::facade::{FallbackPolicy, PermissiveRandom, SecureRandom};
use crate::validate;

pub const SECRAND_OK: i32 = 0;
pub const SECRAND_ERR_INITIALIZATION: i32 = 1;
pub const SECRAND_ERR_GENERATION: i32 = 2;
pub const SECRAND_ERR_INVALID_PARAMETER: i32 = 3;
pub const SECRAND_ERR_UNSUPPORTED_PLATFORM: i32 = 4;
pub const SECRAND_ERR_INSUFFICIENT_RESOURCES: i32 = 5;
pub const SECRAND_ERR_INTERNAL: i32 = -1;

enum Facade {
    Strict(SecureRandom),
    Permissive(PermissiveRandom),
}

/// Opaque facade handle.
pub struct SecrandHandle {
    facade: Facade,
}

macro_rules! with_facade {
    ($facade:expr, $random:ident => $body:expr) => {
        match $facade {
            Facade::Strict($random) => $body,
            Facade::Permissive($random) => $body,
        }
    };
}

fn guarded(call: impl FnOnce() -> i32) -> i32 {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(status) => status,
        Err(_) => {
            log::error!("Panic caught at the C boundary");
            SECRAND_ERR_INTERNAL
        }
    }
}

fn status_of<T>(result: &RandomResult<T>) -> i32 {
    match result {
        Ok(_) => SECRAND_OK,
        Err(e) => e.kind().code(),
    }
}

/// Writes a successful value through `out`.
///
/// # Safety
/// `out` must be valid for writes; callers check it for null first.
unsafe fn write_out<T>(out: *mut T, result: RandomResult<T>) -> i32 {
    let status = status_of(&result);
    if let Ok(value) = result {
        out.write(value);
    }
    status
}

fn check_out<T>(out: *mut T) -> i32 {
    status_of(&validate::check_buffer(out.is_null(), core::mem::size_of::<T>().max(1)))
}

unsafe fn create_into(
    out: *mut *mut SecrandHandle,
    build: impl FnOnce() -> RandomResult<Facade>,
) -> i32 {
    let status = check_out(out);
    if status != SECRAND_OK {
        return status;
    }
    match build() {
        Ok(facade) => {
            out.write(Box::into_raw(Box::new(SecrandHandle { facade })));
            SECRAND_OK
        }
        Err(e) => {
            log::debug!("secrand_create failed: {}", e);
            out.write(core::ptr::null_mut());
            e.kind().code()
        }
    }
}

/// Library version as `0xMMmmpp`.
#[no_mangle]
pub extern "C" fn secrand_version() -> u32 {
    0x000100
}

/// Creates a strict handle that only uses cryptographic sources.
///
/// # Safety
/// `out` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn secrand_create(out: *mut *mut SecrandHandle) -> i32 {
    guarded(|| create_into(out, || SecureRandom::create().map(Facade::Strict)))
}

/// Creates a handle that may fall back to the non-cryptographic CPU jitter
/// source when `allow_jitter` is true.
///
/// # Safety
/// `out` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn secrand_create_permissive(
    allow_jitter: bool,
    out: *mut *mut SecrandHandle,
) -> i32 {
    let policy = if allow_jitter {
        FallbackPolicy::CpuJitter
    } else {
        FallbackPolicy::SecureOnly
    };
    guarded(|| create_into(out, || PermissiveRandom::create(policy).map(Facade::Permissive)))
}

/// Releases a handle. Null is ignored.
///
/// # Safety
/// `handle` must come from `secrand_create*` and not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn secrand_destroy(handle: *mut SecrandHandle) {
    if handle.is_null() {
        return;
    }
    let _ = guarded(|| {
        drop(Box::from_raw(handle));
        SECRAND_OK
    });
}

/// Whether the handle's committed source is cryptographic (1), not (0), or
/// the handle is null (-1).
///
/// # Safety
/// `handle` must be null or a live handle.
#[no_mangle]
pub unsafe extern "C" fn secrand_is_secure(handle: *const SecrandHandle) -> i32 {
    match handle.as_ref() {
        Some(handle) => with_facade!(&handle.facade, r => r.is_secure() as i32),
        None => SECRAND_ERR_INTERNAL,
    }
}

/// Fills `len` bytes at `buf`.
///
/// # Safety
/// `handle` must be null or live; `buf` must be null or valid for `len` bytes.
#[no_mangle]
pub unsafe extern "C" fn secrand_fill(
    handle: *const SecrandHandle,
    buf: *mut u8,
    len: usize,
) -> i32 {
    let Some(handle) = handle.as_ref() else {
        return SECRAND_ERR_INTERNAL;
    };
    guarded(|| {
        if let Err(e) = validate::check_buffer(buf.is_null(), len) {
            return e.kind().code();
        }
        if len == 0 {
            return SECRAND_OK;
        }
        let dest = core::slice::from_raw_parts_mut(buf, len);
        with_facade!(&handle.facade, r => status_of(&r.fill(dest)))
    })
}

/// Fills `size` bytes at `buf`, where `size` is a signed count as used by
/// managed runtimes. Negative sizes are rejected.
///
/// # Safety
/// `handle` must be null or live; `buf` must be null or valid for `size` bytes.
#[no_mangle]
pub unsafe extern "C" fn secrand_next_bytes(
    handle: *const SecrandHandle,
    buf: *mut u8,
    size: i64,
) -> i32 {
    let Some(handle) = handle.as_ref() else {
        return SECRAND_ERR_INTERNAL;
    };
    guarded(|| {
        let max = with_facade!(&handle.facade, r => r.max_request_bytes());
        let len = match validate::check_signed_size(size, max) {
            Ok(len) => len,
            Err(e) => return e.kind().code(),
        };
        if let Err(e) = validate::check_buffer(buf.is_null(), len) {
            return e.kind().code();
        }
        if len == 0 {
            return SECRAND_OK;
        }
        let dest = core::slice::from_raw_parts_mut(buf, len);
        with_facade!(&handle.facade, r => status_of(&r.fill(dest)))
    })
}

/// Runs one value-producing call and writes its result through `out`.
unsafe fn produce<T>(
    handle: *const SecrandHandle,
    out: *mut T,
    op: impl FnOnce(&Facade) -> RandomResult<T>,
) -> i32 {
    let Some(handle) = handle.as_ref() else {
        return SECRAND_ERR_INTERNAL;
    };
    guarded(|| {
        let status = check_out(out);
        if status != SECRAND_OK {
            return status;
        }
        write_out(out, op(&handle.facade))
    })
}

/// Uniform `int32_t` over the full range.
///
/// # Safety
/// `handle` must be null or live; `out` must be null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn secrand_next_int(handle: *const SecrandHandle, out: *mut i32) -> i32 {
    produce(handle, out, |facade| with_facade!(facade, r => r.next_int()))
}

/// Uniform `int32_t` in `[0, bound)`.
///
/// # Safety
/// See [`secrand_next_int`].
#[no_mangle]
pub unsafe extern "C" fn secrand_next_int_bounded(
    handle: *const SecrandHandle,
    bound: i32,
    out: *mut i32,
) -> i32 {
    produce(handle, out, |facade| with_facade!(facade, r => r.next_int_bounded(bound)))
}

/// Uniform `int32_t` in `[min, max)`.
///
/// # Safety
/// See [`secrand_next_int`].
#[no_mangle]
pub unsafe extern "C" fn secrand_next_int_range(
    handle: *const SecrandHandle,
    min: i32,
    max: i32,
    out: *mut i32,
) -> i32 {
    produce(handle, out, |facade| with_facade!(facade, r => r.next_int_range(min, max)))
}

/// Uniform `int64_t` over the full range.
///
/// # Safety
/// See [`secrand_next_int`].
#[no_mangle]
pub unsafe extern "C" fn secrand_next_long(handle: *const SecrandHandle, out: *mut i64) -> i32 {
    produce(handle, out, |facade| with_facade!(facade, r => r.next_long()))
}

/// Uniform `int64_t` in `[0, bound)`.
///
/// # Safety
/// See [`secrand_next_int`].
#[no_mangle]
pub unsafe extern "C" fn secrand_next_long_bounded(
    handle: *const SecrandHandle,
    bound: i64,
    out: *mut i64,
) -> i32 {
    produce(handle, out, |facade| with_facade!(facade, r => r.next_long_bounded(bound)))
}

/// Uniform `int64_t` in `[min, max)`.
///
/// # Safety
/// See [`secrand_next_int`].
#[no_mangle]
pub unsafe extern "C" fn secrand_next_long_range(
    handle: *const SecrandHandle,
    min: i64,
    max: i64,
    out: *mut i64,
) -> i32 {
    produce(handle, out, |facade| with_facade!(facade, r => r.next_long_range(min, max)))
}

/// Uniform boolean.
///
/// # Safety
/// See [`secrand_next_int`].
#[no_mangle]
pub unsafe extern "C" fn secrand_next_boolean(handle: *const SecrandHandle, out: *mut bool) -> i32 {
    produce(handle, out, |facade| with_facade!(facade, r => r.next_boolean()))
}

/// Uniform `double` in `[0, 1)`.
///
/// # Safety
/// See [`secrand_next_int`].
#[no_mangle]
pub unsafe extern "C" fn secrand_next_double(handle: *const SecrandHandle, out: *mut f64) -> i32 {
    produce(handle, out, |facade| with_facade!(facade, r => r.next_double()))
}

/// Uniform `float` in `[0, 1)`.
///
/// # Safety
/// See [`secrand_next_int`].
#[no_mangle]
pub unsafe extern "C" fn secrand_next_float(handle: *const SecrandHandle, out: *mut f32) -> i32 {
    produce(handle, out, |facade| with_facade!(facade, r => r.next_float()))
}
