//! NIST SP 800-90B continuous health tests.
//!
//! Guards sources whose output quality is not vouched for by the OS (the CPU
//! jitter fallback). Every byte produced passes through both tests before it
//! reaches a caller.
//!
//! # Tests
//! - Repetition Count Test: detects a source stuck on one value.
//! - Adaptive Proportion Test: detects a value becoming too common in a window.

use super::{SourceError, SourceErrorKind};

/// Assumed min-entropy per byte is 4 bits, false-positive rate 2^-20.
/// RCT cutoff C = 1 + ceil(20 / H) = 6, raised for margin.
const RCT_CUTOFF: usize = 10;

/// APT window size for non-binary sources.
const APT_WINDOW: usize = 512;

/// APT cutoff for H = 4, alpha = 2^-20 is about 39; rounded up.
const APT_CUTOFF: usize = 50;

/// Health tester for a single byte stream.
pub struct HealthTester {
    last_sample: u8,
    repetition_count: usize,

    window_count: usize,
    sample_value: u8,
    sample_count: usize,
}

impl HealthTester {
    pub fn new() -> Self {
        Self {
            last_sample: 0,
            repetition_count: 0,
            window_count: 0,
            sample_value: 0,
            sample_count: 0,
        }
    }

    /// Feeds a byte sample into both tests.
    pub fn feed(&mut self, sample: u8) -> Result<(), SourceError> {
        self.check_repetition_count(sample)?;
        self.check_adaptive_proportion(sample)?;
        Ok(())
    }

    /// Feeds every byte of `samples`, stopping at the first failure.
    pub fn feed_all(&mut self, samples: &[u8]) -> Result<(), SourceError> {
        samples.iter().try_for_each(|&s| self.feed(s))
    }

    fn check_repetition_count(&mut self, sample: u8) -> Result<(), SourceError> {
        if self.repetition_count > 0 && sample == self.last_sample {
            self.repetition_count += 1;
            if self.repetition_count >= RCT_CUTOFF {
                return Err(SourceError::new(SourceErrorKind::HealthTestFailed));
            }
        } else {
            self.last_sample = sample;
            self.repetition_count = 1;
        }
        Ok(())
    }

    fn check_adaptive_proportion(&mut self, sample: u8) -> Result<(), SourceError> {
        if self.window_count == 0 {
            self.sample_value = sample;
            self.sample_count = 1;
            self.window_count = 1;
            return Ok(());
        }

        if sample == self.sample_value {
            self.sample_count += 1;
        }
        self.window_count += 1;

        if self.window_count >= APT_WINDOW {
            let failed = self.sample_count >= APT_CUTOFF;
            // A failed window is discarded so the next one starts clean.
            self.window_count = 0;
            if failed {
                return Err(SourceError::new(SourceErrorKind::HealthTestFailed));
            }
        }
        Ok(())
    }
}

impl Default for HealthTester {
    fn default() -> Self {
        Self::new()
    }
}
