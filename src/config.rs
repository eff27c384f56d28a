//! Configuration for secrand facades.
//!
//! Defines the structure for host-configurable settings.

use alloc::string::String;

use crate::entropy::device::DEFAULT_DEVICE_PATH;

/// Largest single request accepted by default (64 MiB).
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 64 * 1024 * 1024;

/// Settings applied when a facade is built.
///
/// This struct should be populated by the host application and passed to
/// [`crate::Random::builder`]; `Default` gives the recommended values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomConfig {
    /// Upper bound on `next_bytes` sizes. Guards against pathological allocations.
    pub max_request_bytes: usize,

    /// Device file used as the last unix candidate.
    pub device_path: String,

    /// Let the Linux `getrandom` call wait for the kernel pool instead of
    /// failing with `WouldBlock` early in boot.
    pub block_until_ready: bool,

    /// Size of the read used to probe each fallback candidate.
    pub probe_len: usize,
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            device_path: String::from(DEFAULT_DEVICE_PATH),
            block_until_ready: false,
            probe_len: 1,
        }
    }
}
