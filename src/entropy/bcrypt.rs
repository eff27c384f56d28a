//! Windows CNG `BCryptGenRandom` entropy source.
//!
//! Uses the system-preferred RNG, so no algorithm handle is opened or held.

use windows_sys::Win32::Security::Cryptography::{BCryptGenRandom, BCRYPT_USE_SYSTEM_PREFERRED_RNG};

use super::{EntropySource, SourceError, SourceErrorKind};

const STATUS_INVALID_HANDLE: i32 = 0xC000_0008_u32 as i32;
const STATUS_INVALID_PARAMETER: i32 = 0xC000_000D_u32 as i32;
const STATUS_NOT_SUPPORTED: i32 = 0xC000_00BB_u32 as i32;
const STATUS_NOT_IMPLEMENTED: i32 = 0xC000_0002_u32 as i32;

/// CNG system-preferred CSPRNG.
pub struct BCryptSource;

impl BCryptSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BCryptSource {
    fn default() -> Self {
        Self::new()
    }
}

fn status_to_error(status: i32) -> SourceError {
    let kind = match status {
        STATUS_NOT_SUPPORTED | STATUS_NOT_IMPLEMENTED => SourceErrorKind::NotSupported,
        STATUS_INVALID_PARAMETER | STATUS_INVALID_HANDLE => SourceErrorKind::InvalidArgument,
        _ => SourceErrorKind::Unknown,
    };
    SourceError::with_code(kind, status)
}

impl EntropySource for BCryptSource {
    fn name(&self) -> &'static str {
        "BCryptGenRandom"
    }

    fn fill(&self, dest: &mut [u8]) -> Result<(), SourceError> {
        // Length is a u32 in the API
        for chunk in dest.chunks_mut(u32::MAX as usize) {
            let status = unsafe {
                BCryptGenRandom(
                    core::ptr::null_mut(),
                    chunk.as_mut_ptr(),
                    chunk.len() as u32,
                    BCRYPT_USE_SYSTEM_PREFERRED_RNG,
                )
            };
            if status != 0 {
                return Err(status_to_error(status));
            }
        }
        Ok(())
    }
}
