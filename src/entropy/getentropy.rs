//! Apple `getentropy(2)` entropy source.

use super::{EntropySource, SourceError};

/// Largest request `getentropy` accepts in one call.
const MAX_CHUNK: usize = 256;

/// Kernel CSPRNG via `getentropy`.
pub struct GetEntropySource;

impl GetEntropySource {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GetEntropySource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for GetEntropySource {
    fn name(&self) -> &'static str {
        "GetEntropy"
    }

    fn fill(&self, dest: &mut [u8]) -> Result<(), SourceError> {
        for chunk in dest.chunks_mut(MAX_CHUNK) {
            let ret =
                unsafe { libc::getentropy(chunk.as_mut_ptr() as *mut libc::c_void, chunk.len()) };
            if ret != 0 {
                let errno = std::io::Error::last_os_error()
                    .raw_os_error()
                    .unwrap_or(libc::EIO);
                return Err(SourceError::from_errno(errno));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunks_beyond_limit() {
        let source = GetEntropySource::new();
        let mut buf = [0u8; MAX_CHUNK * 2 + 17];
        source.fill(&mut buf).unwrap();
        assert!(buf[MAX_CHUNK * 2..].iter().any(|&b| b != 0));
    }
}
