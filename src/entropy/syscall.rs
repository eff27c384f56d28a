//! Linux/Android `getrandom(2)` entropy source.
//!
//! Invoked through `syscall(SYS_getrandom, ..)` rather than the libc wrapper
//! so that old C libraries without the symbol still link, and old kernels
//! report `ENOSYS` (which advances the fallback chain to the device file).
//!
//! By default the call passes `GRND_NONBLOCK`: before the kernel pool is
//! initialised it fails with `EAGAIN`, surfaced as `WouldBlock`, instead of
//! blocking for an unbounded time.

use super::{EntropySource, SourceError};

const GRND_NONBLOCK: libc::c_uint = 0x0001;

/// Kernel CSPRNG via the `getrandom` system call.
pub struct GetRandomSource {
    flags: libc::c_uint,
}

impl GetRandomSource {
    /// Non-blocking source.
    pub fn new() -> Self {
        Self { flags: GRND_NONBLOCK }
    }

    /// Source that waits for the kernel pool to be initialised.
    pub fn blocking() -> Self {
        Self { flags: 0 }
    }
}

impl Default for GetRandomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for GetRandomSource {
    fn name(&self) -> &'static str {
        "GetRandomSyscall"
    }

    fn fill(&self, dest: &mut [u8]) -> Result<(), SourceError> {
        let mut filled = 0;

        // Partial results are possible for large requests or on signal delivery
        while filled < dest.len() {
            let remaining = &mut dest[filled..];
            let ret = unsafe {
                libc::syscall(
                    libc::SYS_getrandom,
                    remaining.as_mut_ptr() as *mut libc::c_void,
                    remaining.len(),
                    self.flags,
                )
            };

            if ret < 0 {
                let errno = std::io::Error::last_os_error()
                    .raw_os_error()
                    .unwrap_or(libc::EIO);
                return Err(SourceError::from_errno(errno));
            }

            filled += ret as usize;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_getrandom_fill() {
        let source = GetRandomSource::new();
        let mut a = [0u8; 64];
        let mut b = [0u8; 64];
        source.fill(&mut a).unwrap();
        source.fill(&mut b).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_large_request_is_completed() {
        let source = GetRandomSource::blocking();
        assert_eq!(source.flags, 0);

        let mut buf = alloc::vec![0u8; 1 << 20];
        source.fill(&mut buf).unwrap();
        assert!(buf.iter().any(|&b| b != 0));
    }
}
