//! CPU Jitter Entropy Source.
//!
//! Harvests entropy from CPU execution timing variations (jitter): cache
//! misses, pipeline stalls, branch mispredictions, interrupts and scheduler
//! noise.
//!
//! This source is **not** cryptographic. It exists only as the last resort of
//! the opt-in permissive fallback, for hosts where every OS primitive is
//! missing and weak randomness is still preferred over none. All output is
//! screened by SP 800-90B health tests.
//!
//! # Design
//! - **Timestamp Source**: `rdtsc` (x86), `cntvct_el0` (AArch64), otherwise a
//!   monotonic clock.
//! - **Oscillator**: a short CPU-bound loop whose execution time is measured.
//! - **Whitening**: 64 timing deltas are folded into each output byte by parity.

use std::sync::Mutex;
use std::time::Instant;

use super::health::HealthTester;
use super::{EntropySource, SourceError, Strength};

/// CPU Jitter Entropy Source.
pub struct JitterSource {
    #[cfg_attr(
        any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64"),
        allow(dead_code)
    )]
    origin: Instant,
    health: Mutex<HealthTester>,
}

impl JitterSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            health: Mutex::new(HealthTester::new()),
        }
    }

    /// Reads a high-resolution timestamp.
    #[inline(always)]
    fn timestamp(&self) -> u64 {
        #[cfg(target_arch = "x86_64")]
        {
            // Safety: rdtsc is available on every x86_64 CPU.
            unsafe { core::arch::x86_64::_rdtsc() }
        }

        #[cfg(target_arch = "x86")]
        {
            // Safety: rdtsc is available on Pentium and later.
            unsafe { core::arch::x86::_rdtsc() }
        }

        #[cfg(target_arch = "aarch64")]
        {
            let cnt: u64;
            // Safety: CNTVCT_EL0 is readable from EL0 on all supported OSes.
            unsafe {
                core::arch::asm!("mrs {}, cntvct_el0", out(reg) cnt);
            }
            cnt
        }

        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")))]
        {
            self.origin.elapsed().as_nanos() as u64
        }
    }

    /// Performs a tiny amount of CPU-intensive work to induce jitter.
    #[inline(always)]
    fn jitter_loop() {
        let mut x = 0u64;
        for i in 0..10 {
            x = x.wrapping_add(i);
            core::hint::black_box(x);
        }
    }

    fn sample_byte(&self) -> u8 {
        let mut acc = 0u8;

        // 8 bits per byte, 8 timing samples per bit
        for _ in 0..8 {
            let mut folded = 0u64;
            for _ in 0..8 {
                let start = self.timestamp();
                Self::jitter_loop();
                let end = self.timestamp();
                folded ^= end.wrapping_sub(start);
            }
            let bit = (folded.count_ones() % 2) as u8;
            acc = (acc << 1) | bit;
        }
        acc
    }
}

impl Default for JitterSource {
    fn default() -> Self {
        Self::new()
    }
}

impl EntropySource for JitterSource {
    fn name(&self) -> &'static str {
        "CpuJitter"
    }

    fn fill(&self, dest: &mut [u8]) -> Result<(), SourceError> {
        // Verify we have a working timer
        let t1 = self.timestamp();
        Self::jitter_loop();
        let t2 = self.timestamp();
        if t1 == 0 && t2 == 0 {
            return Err(SourceError::not_supported());
        }

        let mut health = self.health.lock().map_err(|_| SourceError::unknown())?;
        for byte in dest.iter_mut() {
            *byte = self.sample_byte();
        }
        health.feed_all(dest)
    }

    fn strength(&self) -> Strength {
        Strength::NonCryptographic
    }
}
