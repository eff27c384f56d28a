//! Platform identity and default candidate chains.
//!
//! The platform family is fixed at compile time. Each family lists its entropy
//! primitives from most to least preferred; [`default_chain`] turns that list
//! into a [`FallbackChain`] for the selector.

use core::fmt;

use crate::config::RandomConfig;
use crate::entropy::chain::FallbackChain;

/// Platform families with distinct entropy primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Linux,
    Android,
    Apple,
    Bsd,
    Windows,
    Wasm,
    Other,
}

impl Platform {
    /// Family of the compilation target.
    pub const fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(any(target_os = "macos", target_os = "ios")) {
            Platform::Apple
        } else if cfg!(any(
            target_os = "freebsd",
            target_os = "openbsd",
            target_os = "netbsd",
            target_os = "dragonfly"
        )) {
            Platform::Bsd
        } else if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_arch = "wasm32") {
            Platform::Wasm
        } else {
            Platform::Other
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Platform::Linux => "linux",
            Platform::Android => "android",
            Platform::Apple => "apple",
            Platform::Bsd => "bsd",
            Platform::Windows => "windows",
            Platform::Wasm => "wasm",
            Platform::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Secure candidates for the current platform, most preferred first.
#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn default_chain(config: &RandomConfig) -> FallbackChain {
    use crate::entropy::device::DeviceSource;
    use crate::entropy::syscall::GetRandomSource;

    let syscall = if config.block_until_ready {
        GetRandomSource::blocking()
    } else {
        GetRandomSource::new()
    };
    FallbackChain::new()
        .then(syscall)
        .then(DeviceSource::new(config.device_path.clone()))
}

/// Secure candidates for the current platform, most preferred first.
#[cfg(any(target_os = "macos", target_os = "ios"))]
pub fn default_chain(config: &RandomConfig) -> FallbackChain {
    use crate::entropy::arc4random::Arc4RandomSource;
    use crate::entropy::device::DeviceSource;
    use crate::entropy::getentropy::GetEntropySource;

    FallbackChain::new()
        .then(GetEntropySource::new())
        .then(Arc4RandomSource::new())
        .then(DeviceSource::new(config.device_path.clone()))
}

/// Secure candidates for the current platform, most preferred first.
#[cfg(any(
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly"
))]
pub fn default_chain(config: &RandomConfig) -> FallbackChain {
    use crate::entropy::arc4random::Arc4RandomSource;
    use crate::entropy::device::DeviceSource;

    FallbackChain::new()
        .then(Arc4RandomSource::new())
        .then(DeviceSource::new(config.device_path.clone()))
}

/// Secure candidates for the current platform, most preferred first.
#[cfg(windows)]
pub fn default_chain(_config: &RandomConfig) -> FallbackChain {
    use crate::entropy::bcrypt::BCryptSource;
    use crate::entropy::cryptoapi::CryptoApiSource;

    FallbackChain::new()
        .then(BCryptSource::new())
        .then(CryptoApiSource::new())
}

/// Secure candidates for the current platform, most preferred first.
#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly",
    windows
)))]
pub fn default_chain(config: &RandomConfig) -> FallbackChain {
    use crate::entropy::portable::PortableSource;

    let chain = FallbackChain::new().then(PortableSource::new());
    if cfg!(unix) {
        chain.then(crate::entropy::device::DeviceSource::new(config.device_path.clone()))
    } else {
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chain_is_not_empty() {
        let chain = default_chain(&RandomConfig::default());
        assert!(!chain.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_preference_order() {
        assert_eq!(Platform::current(), Platform::Linux);
        let chain = default_chain(&RandomConfig::default());
        assert_eq!(chain.names(), alloc::vec!["GetRandomSyscall", "DeviceFile"]);
    }

    #[test]
    fn test_platform_display() {
        assert_eq!(Platform::Windows.to_string(), "windows");
    }
}
