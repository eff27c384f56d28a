//! BSD/Apple `arc4random_buf(3)` entropy source.
//!
//! `arc4random_buf` cannot fail: the C library reseeds from the kernel and
//! aborts the process if it cannot. It is a legacy interface on Apple
//! platforms and the primary one on the BSDs.

use super::{EntropySource, SourceError};

/// libc CSPRNG via `arc4random_buf`.
pub struct Arc4RandomSource;

impl Arc4RandomSource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Arc4RandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for Arc4RandomSource {
    fn name(&self) -> &'static str {
        "Arc4Random"
    }

    fn fill(&self, dest: &mut [u8]) -> Result<(), SourceError> {
        unsafe {
            libc::arc4random_buf(dest.as_mut_ptr() as *mut libc::c_void, dest.len());
        }
        Ok(())
    }
}
