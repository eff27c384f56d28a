//! Cryptographically secure random values over the operating system's
//! entropy sources.
//!
//! On construction a facade probes the platform's candidate sources in
//! preference order and commits to the first one that works. Every value is
//! then derived from that single source:
//!
//! ```no_run
//! use secrand::SecureRandom;
//!
//! let random = SecureRandom::create()?;
//! let key = random.next_bytes(32)?;
//! let die = random.next_int_range(1, 7)?;
//! # Ok::<(), secrand::RandomError>(())
//! ```
//!
//! Failures are values ([`RandomResult`]); nothing silently degrades to a
//! weaker generator. A non-cryptographic fallback exists only behind
//! [`PermissiveRandom`], which has to be requested explicitly.

extern crate alloc;

pub mod config;
pub mod entropy;
pub mod error;
pub mod events;
pub mod facade;
pub mod generator;
pub mod platform;
pub mod validate;

#[cfg(feature = "ffi")]
pub mod ffi;

pub use config::RandomConfig;
pub use entropy::chain::FallbackChain;
pub use entropy::{EntropySource, SourceError, SourceErrorKind, Strength};
pub use error::{ErrorKind, RandomError, RandomResult};
pub use events::{EventObserver, RandomEvent};
pub use facade::{
    FallbackPolicy, Permissive, PermissiveRandom, Policy, Random, RandomBuilder, SecureRandom,
    Strict,
};
pub use platform::Platform;
