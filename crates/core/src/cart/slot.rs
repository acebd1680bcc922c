//! Durable storage slot for a serialized cart.
//!
//! A slot is a single named value that survives across page loads or process
//! restarts for one client. It is never shared between clients, and nothing
//! coordinates two writers on the same slot: the last write wins.

use core::convert::Infallible;

/// A single durable key holding the serialized cart.
pub trait CartSlot {
    /// Error raised by the underlying storage.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the stored payload. `Ok(None)` means nothing has been stored yet.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the slot cannot be read.
    fn read(&self) -> Result<Option<String>, Self::Error>;

    /// Replace the stored payload.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the slot cannot be written.
    fn write(&mut self, payload: String) -> Result<(), Self::Error>;
}

/// In-memory slot.
///
/// Used on its own in tests, and by the storefront as a buffer between the
/// async session store and the synchronous cart store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySlot {
    payload: Option<String>,
    writes: usize,
}

impl MemorySlot {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            payload: None,
            writes: 0,
        }
    }

    /// A slot that already holds `payload`.
    #[must_use]
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
            writes: 0,
        }
    }

    /// The current payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// Consume the slot and return its payload.
    #[must_use]
    pub fn into_payload(self) -> Option<String> {
        self.payload
    }

    /// How many times the slot has been written since it was created.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }
}

impl CartSlot for MemorySlot {
    type Error = Infallible;

    fn read(&self) -> Result<Option<String>, Self::Error> {
        Ok(self.payload.clone())
    }

    fn write(&mut self, payload: String) -> Result<(), Self::Error> {
        self.payload = Some(payload);
        self.writes += 1;
        Ok(())
    }
}
