//! Fallback Chain Selector.
//!
//! Holds the platform's candidate sources in preference order and commits to
//! the first one that survives a probe read. Selection happens once; a
//! candidate that failed is dropped and never retried.

use alloc::boxed::Box;
use alloc::vec::Vec;
use zeroize::Zeroizing;

use super::{EntropySource, SourceError, Strength};
use crate::error::{RandomError, RandomResult};
use crate::events::{EventObserver, ProbeOutcome, RandomEvent};

/// Whether selection may commit a non-cryptographic candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    /// Only [`Strength::Cryptographic`] candidates are eligible.
    SecureOnly,
    /// Any candidate is eligible, in chain order.
    AllowNonCryptographic,
}

/// Ordered candidate list for one platform.
pub struct FallbackChain {
    candidates: Vec<Box<dyn EntropySource>>,
}

impl FallbackChain {
    /// Creates a new empty chain.
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    /// Appends a candidate with lower preference than every existing one.
    pub fn then<S>(mut self, source: S) -> Self
    where
        S: EntropySource + 'static,
    {
        self.candidates.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Candidate names in preference order.
    pub fn names(&self) -> Vec<&'static str> {
        self.candidates.iter().map(|c| c.name()).collect()
    }

    /// Probes candidates in order and returns the first that fills a
    /// `probe_len`-byte buffer.
    ///
    /// Only a [`NotSupported`](super::SourceErrorKind::NotSupported) probe
    /// failure moves on to the next candidate. Any other failure ends
    /// selection with that failure as the cause.
    ///
    /// # Errors
    /// * `UnsupportedPlatform` if the chain is empty.
    /// * `InitializationFailure` if a candidate fails for a reason other than
    ///   being unsupported, or if no eligible candidate is left.
    pub fn select(
        self,
        platform: &'static str,
        policy: SelectionPolicy,
        probe_len: usize,
        observer: Option<&dyn EventObserver>,
    ) -> RandomResult<Box<dyn EntropySource>> {
        if self.candidates.is_empty() {
            return Err(RandomError::unsupported_platform(platform));
        }

        let total = self.candidates.len();
        let mut probe = Zeroizing::new(alloc::vec![0u8; probe_len.max(1)]);
        let mut last_error: Option<SourceError> = None;

        for candidate in self.candidates {
            let name = candidate.name();

            if policy == SelectionPolicy::SecureOnly
                && candidate.strength() != Strength::Cryptographic
            {
                log::warn!("Skipping non-cryptographic entropy source {} in strict mode", name);
                notify(
                    observer,
                    RandomEvent::Probed { source: name, outcome: ProbeOutcome::Skipped },
                );
                continue;
            }

            match candidate.fill(&mut probe) {
                Ok(()) => {
                    log::info!("Committed entropy source {} on {}", name, platform);
                    notify(
                        observer,
                        RandomEvent::Probed { source: name, outcome: ProbeOutcome::Accepted },
                    );
                    notify(
                        observer,
                        RandomEvent::Committed {
                            source: name,
                            platform,
                            strength: candidate.strength(),
                        },
                    );
                    return Ok(candidate);
                }
                Err(e) => {
                    notify(
                        observer,
                        RandomEvent::Probed { source: name, outcome: ProbeOutcome::Rejected(e) },
                    );
                    if !e.is_not_supported() {
                        log::warn!("Entropy source {} failed its probe: {}", name, e);
                        return Err(RandomError::initialization(alloc::format!(
                            "entropy source {} failed on {}: {}",
                            name, platform, e
                        ))
                        .with_cause(e));
                    }
                    log::debug!("Entropy source {} not supported: {}", name, e);
                    last_error = Some(e);
                }
            }
        }

        let err = RandomError::initialization(alloc::format!(
            "none of {} entropy source candidates is usable on {}",
            total, platform
        ));
        Err(match last_error {
            Some(cause) => err.with_cause(cause),
            None => err,
        })
    }
}

impl Default for FallbackChain {
    fn default() -> Self {
        Self::new()
    }
}

fn notify(observer: Option<&dyn EventObserver>, event: RandomEvent) {
    if let Some(observer) = observer {
        observer.on_event(&event);
    }
}
