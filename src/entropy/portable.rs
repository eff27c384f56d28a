//! Portable entropy source over the `getrandom` crate.
//!
//! Covers targets without a dedicated adapter in this crate: WebAssembly in
//! the browser or Node.js (`crypto.getRandomValues`), WASI (`random_get`),
//! and the long tail of unix-like systems.

use super::{EntropySource, SourceError, SourceErrorKind};

/// CSPRNG chosen by the `getrandom` crate for the compilation target.
pub struct PortableSource;

impl PortableSource {
    pub fn new() -> Self {
        Self
    }

    fn map_error(err: getrandom::Error) -> SourceError {
        if err == getrandom::Error::UNSUPPORTED {
            return SourceError::not_supported();
        }

        match err.raw_os_error() {
            #[cfg(unix)]
            Some(errno) => SourceError::from_errno(errno),
            #[cfg(not(unix))]
            Some(code) => SourceError::with_code(SourceErrorKind::Unknown, code),
            None => SourceError::with_code(SourceErrorKind::Unknown, err.code().get() as i32),
        }
    }
}

impl Default for PortableSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for PortableSource {
    fn name(&self) -> &'static str {
        "GetRandomCrate"
    }

    fn fill(&self, dest: &mut [u8]) -> Result<(), SourceError> {
        getrandom::getrandom(dest).map_err(Self::map_error)
    }
}
