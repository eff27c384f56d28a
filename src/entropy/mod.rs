//! Raw entropy sources and fallback selection.
//!
//! This module defines the single capability every platform adapter exposes:
//! fill a byte buffer from the platform's CSPRNG, or report a well-defined
//! failure. Adapters are ordered into a [`chain::FallbackChain`] and probed
//! once; the winner serves every request for the lifetime of its facade.
//!
//! # Design
//! - **One contract**: every adapter implements [`EntropySource::fill`] and nothing else
//!   is required from it. Value derivation lives in [`crate::generator`].
//! - **Fail-Closed**: an adapter that cannot produce bytes reports a [`SourceError`];
//!   it never substitutes weaker output.
//! - **Distinguished Failures**: "not supported here" is the only failure the
//!   selector treats as recoverable.

pub mod chain;
pub mod device;
pub mod health;
pub mod jitter;
pub mod portable;
pub mod replay;

#[cfg(any(target_os = "linux", target_os = "android"))]
pub mod syscall;

#[cfg(any(target_os = "macos", target_os = "ios"))]
pub mod getentropy;

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
pub mod arc4random;

#[cfg(windows)]
pub mod bcrypt;
#[cfg(windows)]
pub mod cryptoapi;

use core::fmt;

/// How much an adapter's output can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    /// Backed by an OS CSPRNG or an equivalent audited primitive.
    Cryptographic,
    /// Statistically reasonable but not suitable for keys or nonces.
    NonCryptographic,
}

/// Failure modes an adapter distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// The primitive does not exist on this system. Advances the fallback chain.
    NotSupported,
    /// The primitive would block because the kernel pool is not ready yet.
    WouldBlock,
    /// The call was interrupted by a signal.
    Interrupted,
    /// The primitive rejected its arguments.
    InvalidArgument,
    /// A file-backed source returned fewer bytes than requested.
    ShortRead {
        /// Bytes asked for.
        requested: usize,
        /// Bytes actually delivered before end of file.
        read: usize,
    },
    /// A finite source ran out of bytes.
    Exhausted,
    /// A continuous health test (SP 800-90B) rejected the output.
    HealthTestFailed,
    /// Anything else, including poisoned locks.
    Unknown,
}

/// Error reported by an [`EntropySource`], optionally with the raw OS code
/// (errno, NTSTATUS or Win32 error) that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    code: Option<i32>,
}

impl SourceError {
    pub const fn new(kind: SourceErrorKind) -> Self {
        Self { kind, code: None }
    }

    pub const fn with_code(kind: SourceErrorKind, code: i32) -> Self {
        Self { kind, code: Some(code) }
    }

    pub const fn not_supported() -> Self {
        Self::new(SourceErrorKind::NotSupported)
    }

    pub const fn unknown() -> Self {
        Self::new(SourceErrorKind::Unknown)
    }

    /// Maps a unix `errno` value onto the shared taxonomy.
    #[cfg(unix)]
    pub fn from_errno(errno: i32) -> Self {
        let kind = match errno {
            libc::ENOSYS
            | libc::EPERM
            | libc::ENOENT
            | libc::EACCES
            | libc::ENODEV
            | libc::ENXIO => {
                SourceErrorKind::NotSupported
            }
            libc::EAGAIN => SourceErrorKind::WouldBlock,
            libc::EINTR => SourceErrorKind::Interrupted,
            libc::EINVAL | libc::EFAULT => SourceErrorKind::InvalidArgument,
            _ => SourceErrorKind::Unknown,
        };
        Self::with_code(kind, errno)
    }

    pub fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Whether the fallback chain may move on to the next candidate without
    /// reporting anything unusual.
    pub fn is_not_supported(&self) -> bool {
        self.kind == SourceErrorKind::NotSupported
    }
}

impl fmt::Display for SourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceErrorKind::NotSupported => write!(f, "primitive not supported on this system"),
            SourceErrorKind::WouldBlock => write!(f, "entropy not ready; call would block"),
            SourceErrorKind::Interrupted => write!(f, "interrupted"),
            SourceErrorKind::InvalidArgument => write!(f, "invalid arguments"),
            SourceErrorKind::ShortRead { requested, read } => {
                write!(f, "short read: {} of {} bytes", read, requested)
            }
            SourceErrorKind::Exhausted => write!(f, "source exhausted"),
            SourceErrorKind::HealthTestFailed => write!(f, "health test failed"),
            SourceErrorKind::Unknown => write!(f, "unknown error"),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (os error {})", self.kind, code),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for SourceError {}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound
            | std::io::ErrorKind::PermissionDenied
            | std::io::ErrorKind::Unsupported => SourceErrorKind::NotSupported,
            std::io::ErrorKind::WouldBlock => SourceErrorKind::WouldBlock,
            std::io::ErrorKind::Interrupted => SourceErrorKind::Interrupted,
            std::io::ErrorKind::InvalidInput => SourceErrorKind::InvalidArgument,
            _ => SourceErrorKind::Unknown,
        };

        #[cfg(unix)]
        let mapped = err.raw_os_error().map(SourceError::from_errno);
        #[cfg(not(unix))]
        let mapped = err.raw_os_error().map(|code| SourceError::with_code(kind, code));

        mapped.unwrap_or(SourceError::new(kind))
    }
}

/// A platform capability that fills buffers with unpredictable bytes.
///
/// Implementations are owned by exactly one facade and may be called from
/// several threads at once, hence `&self` and the `Send + Sync` bound.
pub trait EntropySource: Send + Sync {
    /// Returns a unique identifier for the source.
    fn name(&self) -> &'static str;

    /// Overwrites every byte of `dest` with unpredictable data.
    ///
    /// # Returns
    /// * `Ok(())` on success.
    /// * `Err(SourceError)` if the source fails; `dest` must then be discarded.
    fn fill(&self, dest: &mut [u8]) -> Result<(), SourceError>;

    /// Whether output from this source is fit for cryptographic use.
    fn strength(&self) -> Strength {
        Strength::Cryptographic
    }
}

impl<S: EntropySource + ?Sized> EntropySource for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn fill(&self, dest: &mut [u8]) -> Result<(), SourceError> {
        (**self).fill(dest)
    }

    fn strength(&self) -> Strength {
        (**self).strength()
    }
}
