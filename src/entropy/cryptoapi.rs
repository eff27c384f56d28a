//! Legacy Windows CryptoAPI `CryptGenRandom` entropy source.
//!
//! Holds an ephemeral (`CRYPT_VERIFYCONTEXT`) provider context for its whole
//! lifetime. Generation takes the shared lock on the context; acquiring and
//! releasing it take the exclusive lock.

use std::sync::RwLock;

use windows_sys::Win32::Security::Cryptography::{
    CryptAcquireContextW, CryptGenRandom, CryptReleaseContext, CRYPT_SILENT, CRYPT_VERIFYCONTEXT,
    PROV_RSA_FULL,
};

use super::{EntropySource, SourceError, SourceErrorKind};

const ERROR_INVALID_PARAMETER: i32 = 87;
const ERROR_CALL_NOT_IMPLEMENTED: i32 = 120;
/// Provider-level errors (`NTE_*`) share this facility prefix.
const NTE_FACILITY_MASK: u32 = 0xFFFF_0000;
const NTE_FACILITY: u32 = 0x8009_0000;

/// CryptoAPI provider context (`HCRYPTPROV`).
type ProviderHandle = usize;

pub struct CryptoApiSource {
    provider: RwLock<Option<ProviderHandle>>,
}

impl CryptoApiSource {
    pub fn new() -> Self {
        Self {
            provider: RwLock::new(None),
        }
    }

    /// Whether a provider context is currently held.
    pub fn is_acquired(&self) -> bool {
        self.provider.read().map(|p| p.is_some()).unwrap_or(false)
    }

    fn acquire(&self) -> Result<(), SourceError> {
        let mut guard = self.provider.write().map_err(|_| SourceError::unknown())?;
        if guard.is_some() {
            return Ok(());
        }

        let mut handle: ProviderHandle = 0;
        let ok = unsafe {
            CryptAcquireContextW(
                &mut handle,
                core::ptr::null(),
                core::ptr::null(),
                PROV_RSA_FULL,
                CRYPT_VERIFYCONTEXT | CRYPT_SILENT,
            )
        };
        if ok == 0 {
            let err = last_error(true);
            log::debug!("CryptAcquireContextW failed: {}", err);
            return Err(err);
        }

        *guard = Some(handle);
        Ok(())
    }

    /// Releases the provider context. A later fill acquires a new one.
    pub fn close(&self) {
        let mut guard = match self.provider.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = guard.take() {
            unsafe {
                CryptReleaseContext(handle, 0);
            }
        }
    }
}

impl Default for CryptoApiSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CryptoApiSource {
    fn drop(&mut self) {
        self.close();
    }
}

fn last_error(acquiring: bool) -> SourceError {
    let code = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
    let kind = match code {
        ERROR_INVALID_PARAMETER => SourceErrorKind::InvalidArgument,
        ERROR_CALL_NOT_IMPLEMENTED => SourceErrorKind::NotSupported,
        // Missing or misconfigured provider
        c if acquiring && (c as u32) & NTE_FACILITY_MASK == NTE_FACILITY => {
            SourceErrorKind::NotSupported
        }
        _ => SourceErrorKind::Unknown,
    };
    SourceError::with_code(kind, code)
}

impl EntropySource for CryptoApiSource {
    fn name(&self) -> &'static str {
        "CryptGenRandom"
    }

    fn fill(&self, dest: &mut [u8]) -> Result<(), SourceError> {
        if !self.is_acquired() {
            self.acquire()?;
        }

        let guard = self.provider.read().map_err(|_| SourceError::unknown())?;
        let handle = guard.ok_or_else(SourceError::unknown)?;

        for chunk in dest.chunks_mut(u32::MAX as usize) {
            let ok = unsafe { CryptGenRandom(handle, chunk.len() as u32, chunk.as_mut_ptr()) };
            if ok == 0 {
                return Err(last_error(false));
            }
        }
        Ok(())
    }
}
