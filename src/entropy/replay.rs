//! Replay Entropy Source.
//!
//! Serves caller-supplied bytes in order. Useful for injecting entropy that
//! was gathered elsewhere (hardware tokens, a remote beacon) and for
//! deterministic tests of value derivation.

use alloc::collections::VecDeque;
use std::sync::Mutex;
use zeroize::Zeroize;

use super::{EntropySource, SourceError, SourceErrorKind, Strength};

/// Source that drains a buffer of injected bytes.
pub struct ReplaySource {
    name: &'static str,
    strength: Strength,
    buffer: Mutex<VecDeque<u8>>,
}

impl ReplaySource {
    /// Creates a new empty ReplaySource.
    pub fn new() -> Self {
        Self {
            name: "Replay",
            strength: Strength::Cryptographic,
            buffer: Mutex::new(VecDeque::new()),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        let source = Self::new();
        source.add_bytes(bytes);
        source
    }

    /// Overrides the name reported to the selector.
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Declares how far the injected bytes can be trusted.
    pub fn with_strength(mut self, strength: Strength) -> Self {
        self.strength = strength;
        self
    }

    /// Add entropy bytes to the pool.
    pub fn add_bytes(&self, bytes: &[u8]) {
        match self.buffer.lock() {
            Ok(mut buffer) => buffer.extend(bytes.iter().copied()),
            Err(poisoned) => poisoned.into_inner().extend(bytes.iter().copied()),
        }
    }

    /// Bytes still available.
    pub fn remaining(&self) -> usize {
        match self.buffer.lock() {
            Ok(buffer) => buffer.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl Default for ReplaySource {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        if let Ok(buffer) = self.buffer.get_mut() {
            let (front, back) = buffer.as_mut_slices();
            front.zeroize();
            back.zeroize();
        }
    }
}

impl EntropySource for ReplaySource {
    fn name(&self) -> &'static str {
        self.name
    }

    fn fill(&self, dest: &mut [u8]) -> Result<(), SourceError> {
        let mut buffer = self.buffer.lock().map_err(|_| SourceError::unknown())?;
        let wanted = dest.len();
        if buffer.len() < wanted {
            return Err(SourceError::new(SourceErrorKind::Exhausted));
        }

        for (d, s) in dest.iter_mut().zip(buffer.drain(..wanted)) {
            *d = s;
        }
        Ok(())
    }

    fn strength(&self) -> Strength {
        self.strength
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_source() {
        let source = ReplaySource::new();
        source.add_bytes(&[0x01, 0x02, 0x03, 0x04]);

        let mut buf = [0u8; 2];
        assert!(source.fill(&mut buf).is_ok());
        assert_eq!(buf, [0x01, 0x02]);

        assert!(source.fill(&mut buf).is_ok());
        assert_eq!(buf, [0x03, 0x04]);

        assert_eq!(
            source.fill(&mut buf),
            Err(SourceError::new(SourceErrorKind::Exhausted))
        );
    }

    #[test]
    fn test_exhausted_fill_consumes_nothing() {
        let source = ReplaySource::from_bytes(&[0xAA]);
        let mut buf = [0u8; 2];
        assert!(source.fill(&mut buf).is_err());
        assert_eq!(source.remaining(), 1);
    }
}
