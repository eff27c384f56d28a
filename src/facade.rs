//! The public random facade.
//!
//! A [`Random`] owns exactly one committed entropy source, chosen once by the
//! fallback chain selector when the facade is built, and derives every typed
//! value from it. All operations take `&self` and may run concurrently.
//!
//! # Policies
//! - [`SecureRandom`] (`Random<Strict>`) only ever commits a cryptographic
//!   source and fails closed otherwise. It is the type returned by every
//!   default construction path and the only one implementing
//!   [`rand_core::CryptoRng`].
//! - [`PermissiveRandom`] (`Random<Permissive>`) is reachable only through
//!   [`PermissiveRandom::create`] or the [`RandomBuilder::fallback`] step.
//!   With [`FallbackPolicy::CpuJitter`] it may commit the non-cryptographic
//!   jitter source once the secure chain is exhausted.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::marker::PhantomData;

use crate::config::RandomConfig;
use crate::entropy::chain::{FallbackChain, SelectionPolicy};
use crate::entropy::jitter::JitterSource;
use crate::entropy::{EntropySource, Strength};
use crate::error::{RandomError, RandomResult};
use crate::events::{EventObserver, RandomEvent};
use crate::generator;
use crate::platform::{self, Platform};
use crate::validate;

/// Marker: cryptographic sources only.
#[derive(Debug, Clone, Copy)]
pub struct Strict;

/// Marker: an insecure fallback was explicitly opted into.
#[derive(Debug, Clone, Copy)]
pub struct Permissive;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Strict {}
    impl Sealed for super::Permissive {}
}

/// Construction policy carried in the facade's type.
pub trait Policy: sealed::Sealed + Send + Sync + 'static {}
impl Policy for Strict {}
impl Policy for Permissive {}

/// What a permissive facade may fall back to when no secure source works.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Same as strict: fail closed.
    SecureOnly,
    /// Commit the CPU jitter source (non-cryptographic) as a last resort.
    CpuJitter,
}

/// Facade committed to cryptographic sources only.
pub type SecureRandom = Random<Strict>;

/// Facade that may hold a non-cryptographic source.
pub type PermissiveRandom = Random<Permissive>;

/// Cryptographically secure random values over the platform's entropy source.
pub struct Random<P: Policy = Strict> {
    source: Box<dyn EntropySource>,
    platform: Platform,
    max_request_bytes: usize,
    observer: Option<Arc<dyn EventObserver>>,
    _policy: PhantomData<P>,
}

/// Builder for [`Random`].
pub struct RandomBuilder<P: Policy = Strict> {
    config: RandomConfig,
    observer: Option<Arc<dyn EventObserver>>,
    chain: Option<FallbackChain>,
    fallback: FallbackPolicy,
    _policy: PhantomData<P>,
}

impl Random<Strict> {
    /// Builds a strict facade over the platform's default chain.
    ///
    /// # Errors
    /// `InitializationFailure` if no secure source works, `UnsupportedPlatform`
    /// if the platform has none at all. Never degrades to weaker randomness.
    pub fn create() -> RandomResult<Self> {
        Self::builder().build()
    }

    pub fn builder() -> RandomBuilder<Strict> {
        RandomBuilder {
            config: RandomConfig::default(),
            observer: None,
            chain: None,
            fallback: FallbackPolicy::SecureOnly,
            _policy: PhantomData,
        }
    }
}

impl Random<Permissive> {
    /// Builds a facade that may fall back according to `policy`.
    pub fn create(policy: FallbackPolicy) -> RandomResult<Self> {
        SecureRandom::builder().fallback(policy).build()
    }
}

impl RandomBuilder<Strict> {
    /// Opts into a fallback policy. This is the only way to obtain a
    /// facade that might not be cryptographically secure.
    pub fn fallback(self, policy: FallbackPolicy) -> RandomBuilder<Permissive> {
        RandomBuilder {
            config: self.config,
            observer: self.observer,
            chain: self.chain,
            fallback: policy,
            _policy: PhantomData,
        }
    }
}

impl<P: Policy> RandomBuilder<P> {
    pub fn config(mut self, config: RandomConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers an observer for structured events.
    pub fn observer(mut self, observer: Arc<dyn EventObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Replaces the platform's default candidate chain.
    pub fn chain(mut self, chain: FallbackChain) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Probes the chain and commits to a source.
    pub fn build(self) -> RandomResult<Random<P>> {
        let platform = Platform::current();
        let mut chain = match self.chain {
            Some(chain) => chain,
            None => platform::default_chain(&self.config),
        };

        let selection = match self.fallback {
            FallbackPolicy::SecureOnly => SelectionPolicy::SecureOnly,
            FallbackPolicy::CpuJitter => {
                chain = chain.then(JitterSource::new());
                SelectionPolicy::AllowNonCryptographic
            }
        };

        log::debug!(
            "Selecting entropy source on {} from {:?}",
            platform,
            chain.names()
        );

        let source = chain.select(
            platform.name(),
            selection,
            self.config.probe_len,
            self.observer.as_deref(),
        )?;

        if source.strength() != Strength::Cryptographic {
            log::warn!(
                "Committed NON-CRYPTOGRAPHIC entropy source {}; not for secrets",
                source.name()
            );
        }

        Ok(Random {
            source,
            platform,
            max_request_bytes: self.config.max_request_bytes,
            observer: self.observer,
            _policy: PhantomData,
        })
    }
}

impl<P: Policy> Random<P> {
    /// Name of the committed source.
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Largest `next_bytes` request this facade accepts.
    pub fn max_request_bytes(&self) -> usize {
        self.max_request_bytes
    }

    /// Whether the committed source is cryptographic. Always true for
    /// [`SecureRandom`].
    pub fn is_secure(&self) -> bool {
        self.source.strength() == Strength::Cryptographic
    }

    fn emit(&self, event: RandomEvent) {
        if let Some(observer) = &self.observer {
            observer.on_event(&event);
        }
    }

    /// Runs one generation step and reports its outcome.
    fn run<T>(
        &self,
        operation: &'static str,
        bytes: usize,
        step: impl FnOnce(&dyn EntropySource) -> RandomResult<T>,
    ) -> RandomResult<T> {
        match step(self.source.as_ref()) {
            Ok(value) => {
                self.emit(RandomEvent::Generated { operation, bytes });
                Ok(value)
            }
            Err(e) => {
                log::debug!("{} failed: {}", operation, e);
                self.emit(RandomEvent::Failed {
                    operation,
                    kind: e.kind().clone(),
                });
                Err(e)
            }
        }
    }

    /// Reports a validation failure; no entropy was drawn.
    fn rejected<T>(&self, operation: &'static str, err: RandomError) -> RandomResult<T> {
        self.emit(RandomEvent::Failed {
            operation,
            kind: err.kind().clone(),
        });
        Err(err)
    }

    /// Overwrites all of `dest`. An empty buffer succeeds without drawing.
    pub fn fill(&self, dest: &mut [u8]) -> RandomResult<()> {
        let len = dest.len();
        self.run("fill", len, |source| generator::fill(source, dest))
    }

    /// `size` random bytes.
    pub fn next_bytes(&self, size: usize) -> RandomResult<Vec<u8>> {
        if let Err(e) = validate::check_size(size, self.max_request_bytes) {
            return self.rejected("next_bytes", e);
        }
        self.run("next_bytes", size, |source| generator::next_bytes(source, size))
    }

    /// Uniform `i32` over the full range.
    pub fn next_int(&self) -> RandomResult<i32> {
        self.run("next_int", 4, |source| generator::next_i32(source))
    }

    /// Uniform `i32` in `[0, bound)`.
    pub fn next_int_bounded(&self, bound: i32) -> RandomResult<i32> {
        if let Err(e) = validate::check_bound_i32(bound) {
            return self.rejected("next_int_bounded", e);
        }
        self.run("next_int_bounded", 4, |source| generator::bounded_i32(source, bound))
    }

    /// Uniform `i32` in `[min, max)`.
    pub fn next_int_range(&self, min: i32, max: i32) -> RandomResult<i32> {
        let span = match validate::check_range_i32(min, max) {
            Ok(span) => span,
            Err(e) => return self.rejected("next_int_range", e),
        };
        self.run("next_int_range", 4, |source| generator::range_i32(source, min, span))
    }

    /// Uniform `i64` over the full range.
    pub fn next_long(&self) -> RandomResult<i64> {
        self.run("next_long", 8, |source| generator::next_i64(source))
    }

    /// Uniform `i64` in `[0, bound)`.
    pub fn next_long_bounded(&self, bound: i64) -> RandomResult<i64> {
        if let Err(e) = validate::check_bound_i64(bound) {
            return self.rejected("next_long_bounded", e);
        }
        self.run("next_long_bounded", 8, |source| generator::bounded_i64(source, bound))
    }

    /// Uniform `i64` in `[min, max)`.
    pub fn next_long_range(&self, min: i64, max: i64) -> RandomResult<i64> {
        let span = match validate::check_range_i64(min, max) {
            Ok(span) => span,
            Err(e) => return self.rejected("next_long_range", e),
        };
        self.run("next_long_range", 8, |source| generator::range_i64(source, min, span))
    }

    pub fn next_boolean(&self) -> RandomResult<bool> {
        self.run("next_boolean", 1, |source| generator::next_bool(source))
    }

    /// Uniform `f64` in `[0, 1)`.
    pub fn next_double(&self) -> RandomResult<f64> {
        self.run("next_double", 8, |source| generator::next_f64(source))
    }

    /// Uniform `f32` in `[0, 1)`.
    pub fn next_float(&self) -> RandomResult<f32> {
        self.run("next_float", 4, |source| generator::next_f32(source))
    }
}

impl<P: Policy> fmt::Debug for Random<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Random")
            .field("source", &self.source.name())
            .field("platform", &self.platform)
            .field("secure", &self.is_secure())
            .finish()
    }
}

/// Interop with the `rand` ecosystem.
///
/// # Panics
/// The infallible methods panic if the committed source fails, matching
/// `rand_core::OsRng`. Use [`rand_core::RngCore::try_fill_bytes`] or the
/// facade's own methods to handle failures as values.
impl<P: Policy> rand_core::RngCore for Random<P> {
    fn next_u32(&mut self) -> u32 {
        match generator::next_u32(self.source.as_ref()) {
            Ok(v) => v,
            Err(e) => panic!("secrand: {}", e),
        }
    }

    fn next_u64(&mut self) -> u64 {
        match generator::next_u64(self.source.as_ref()) {
            Ok(v) => v,
            Err(e) => panic!("secrand: {}", e),
        }
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        if let Err(e) = self.try_fill_bytes(dest) {
            panic!("secrand: {}", e);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill(dest).map_err(rand_core::Error::new)
    }
}

impl rand_core::CryptoRng for Random<Strict> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::replay::ReplaySource;
    use crate::entropy::{SourceError, SourceErrorKind};
    use crate::error::ErrorKind;
    use crate::events::EventLog;

    fn replay_random(bytes: &[u8]) -> SecureRandom {
        // Leading byte feeds the selector's probe.
        let mut all = alloc::vec![0u8];
        all.extend_from_slice(bytes);
        SecureRandom::builder()
            .chain(FallbackChain::new().then(ReplaySource::from_bytes(&all)))
            .build()
            .unwrap()
    }

    struct Broken;

    impl EntropySource for Broken {
        fn name(&self) -> &'static str {
            "Broken"
        }

        fn fill(&self, _dest: &mut [u8]) -> Result<(), SourceError> {
            Err(SourceError::not_supported())
        }
    }

    #[test]
    fn test_create_commits_platform_source() {
        let random = SecureRandom::create().unwrap();
        assert!(random.is_secure());
        assert_eq!(random.platform(), Platform::current());
        assert_eq!(random.next_bytes(16).unwrap().len(), 16);
    }

    #[test]
    fn test_values_follow_replayed_bytes() {
        let random = replay_random(&[0, 0, 0, 42, 0x01, 0xFF]);
        assert_eq!(random.next_int(), Ok(42));
        assert_eq!(random.next_boolean(), Ok(true));
        assert_eq!(random.next_boolean(), Ok(true));
    }

    #[test]
    fn test_invalid_parameters_consume_nothing() {
        let source = ReplaySource::from_bytes(&[0, 0, 0, 0, 7]);
        let random = SecureRandom::builder()
            .chain(FallbackChain::new().then(source))
            .build()
            .unwrap();

        assert!(random.next_int_bounded(0).unwrap_err().is_invalid_parameter());
        assert!(random.next_int_bounded(-4).unwrap_err().is_invalid_parameter());
        assert!(random.next_int_range(5, 5).unwrap_err().is_invalid_parameter());
        assert!(random.next_long_bounded(0).unwrap_err().is_invalid_parameter());
        assert!(random.next_long_range(1, -1).unwrap_err().is_invalid_parameter());

        // Every replayed byte after the probe is still there.
        assert_eq!(random.next_int_bounded(10), Ok(7));
    }

    #[test]
    fn test_oversized_request_rejected() {
        let config = RandomConfig {
            max_request_bytes: 8,
            ..RandomConfig::default()
        };
        let random = SecureRandom::builder().config(config).build().unwrap();
        assert!(random.next_bytes(9).unwrap_err().is_invalid_parameter());
        assert_eq!(random.next_bytes(8).unwrap().len(), 8);
    }

    #[test]
    fn test_generation_failure_is_surfaced() {
        let random = replay_random(&[1, 2]);
        let err = random.next_long().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::GenerationFailure);
        assert_eq!(err.cause().map(|c| c.kind()), Some(SourceErrorKind::Exhausted));
    }

    /// Answers the selector's probe, then reports an unready kernel pool.
    struct BlocksAfterProbe {
        probed: core::sync::atomic::AtomicBool,
    }

    impl EntropySource for BlocksAfterProbe {
        fn name(&self) -> &'static str {
            "BlocksAfterProbe"
        }

        fn fill(&self, dest: &mut [u8]) -> Result<(), SourceError> {
            use core::sync::atomic::Ordering;

            if self.probed.swap(true, Ordering::SeqCst) {
                return Err(SourceError::new(SourceErrorKind::WouldBlock));
            }
            dest.fill(0x5A);
            Ok(())
        }
    }

    #[test]
    fn test_would_block_during_generation_is_surfaced() {
        let random = SecureRandom::builder()
            .chain(FallbackChain::new().then(BlocksAfterProbe {
                probed: core::sync::atomic::AtomicBool::new(false),
            }))
            .build()
            .unwrap();

        let err = random.next_long_bounded(1_000).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::GenerationFailure);
        assert_eq!(err.cause().map(|c| c.kind()), Some(SourceErrorKind::WouldBlock));

        // Still failing, never silently retried or replaced.
        assert!(random.next_int().is_err());
    }

    #[test]
    fn test_strict_fails_closed() {
        let err = SecureRandom::builder()
            .chain(FallbackChain::new().then(Broken))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InitializationFailure);
    }

    #[test]
    fn test_permissive_jitter_fallback() {
        let random = SecureRandom::builder()
            .chain(FallbackChain::new().then(Broken))
            .fallback(FallbackPolicy::CpuJitter)
            .build();

        // The jitter source may be unusable on coarse timers; if it committed it is flagged.
        if let Ok(random) = random {
            assert!(!random.is_secure());
            assert_eq!(random.source_name(), "CpuJitter");
        }
    }

    #[test]
    fn test_permissive_secure_only_still_fails_closed() {
        let err = SecureRandom::builder()
            .chain(FallbackChain::new().then(Broken))
            .fallback(FallbackPolicy::SecureOnly)
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InitializationFailure);
    }

    #[test]
    fn test_observer_sees_generation_and_failures() {
        let log = Arc::new(EventLog::new());
        let random = SecureRandom::builder()
            .observer(log.clone())
            .build()
            .unwrap();

        random.next_float().unwrap();
        let _ = random.next_int_bounded(0);

        let entries = log.entries();
        assert!(entries.iter().any(|e| matches!(e, RandomEvent::Committed { .. })));
        assert!(entries.contains(&RandomEvent::Generated { operation: "next_float", bytes: 4 }));
        assert!(entries.iter().any(|e| matches!(
            e,
            RandomEvent::Failed {
                operation: "next_int_bounded",
                kind: ErrorKind::InvalidParameter { .. }
            }
        )));
    }

    #[test]
    fn test_rng_core_interop() {
        use rand_core::RngCore;

        let mut random = SecureRandom::create().unwrap();
        let mut buf = [0u8; 32];
        random.fill_bytes(&mut buf);
        assert!(buf.iter().any(|&b| b != 0));
        assert_ne!(random.next_u64(), random.next_u64());
    }

    #[test]
    fn test_facade_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SecureRandom>();
        assert_send_sync::<PermissiveRandom>();
    }
}
