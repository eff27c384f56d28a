//! File-backed device entropy source (`/dev/urandom` and friends).
//!
//! The last resort on unix-like systems. The device is opened on first use
//! and the descriptor is held until the source is closed or dropped.
//!
//! # Concurrency
//! Reads take the shared lock and go through `&File`; opening and closing the
//! descriptor take the exclusive lock.

use std::fs::File;
use std::io::Read;
use std::sync::RwLock;

use alloc::string::String;

use super::{EntropySource, SourceError, SourceErrorKind};

pub const DEFAULT_DEVICE_PATH: &str = "/dev/urandom";

/// Entropy read from a character device.
pub struct DeviceSource {
    path: String,
    file: RwLock<Option<File>>,
}

impl DeviceSource {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            file: RwLock::new(None),
        }
    }

    pub fn urandom() -> Self {
        Self::new(DEFAULT_DEVICE_PATH)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether the descriptor is currently held.
    pub fn is_open(&self) -> bool {
        self.file.read().map(|f| f.is_some()).unwrap_or(false)
    }

    /// Releases the descriptor. A later fill reopens it.
    pub fn close(&self) {
        let mut guard = match self.file.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.take().is_some() {
            log::debug!("Closed entropy device {}", self.path);
        }
    }

    fn ensure_open(&self) -> Result<(), SourceError> {
        let mut guard = self.file.write().map_err(|_| SourceError::unknown())?;
        if guard.is_none() {
            let file = File::open(&self.path)?;
            log::debug!("Opened entropy device {}", self.path);
            *guard = Some(file);
        }
        Ok(())
    }
}

/// Reads until `dest` is full. End of file before that is a short read.
fn read_full(mut reader: impl Read, dest: &mut [u8]) -> Result<(), SourceError> {
    let mut filled = 0;
    while filled < dest.len() {
        match reader.read(&mut dest[filled..]) {
            Ok(0) => {
                return Err(SourceError::new(SourceErrorKind::ShortRead {
                    requested: dest.len(),
                    read: filled,
                }))
            }
            Ok(n) => filled += n,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

impl EntropySource for DeviceSource {
    fn name(&self) -> &'static str {
        "DeviceFile"
    }

    fn fill(&self, dest: &mut [u8]) -> Result<(), SourceError> {
        if dest.is_empty() {
            return Ok(());
        }

        if !self.is_open() {
            self.ensure_open()?;
        }

        let guard = self.file.read().map_err(|_| SourceError::unknown())?;
        match guard.as_ref() {
            Some(file) => read_full(file, dest),
            // Closed concurrently between open and read.
            None => Err(SourceError::unknown()),
        }
    }
}
