//! Session-backed cart.
//!
//! Each client's cart slot is the `cart_items` session key, holding the
//! encoded cart as a JSON string. A request loads the slot into a
//! [`MemorySlot`], rehydrates a [`CartStore`] in deferred mode, mutates it,
//! and [`SessionCart::save`] flushes the store and writes the payload back
//! to the session.
//!
//! Concurrent requests on one session are not coordinated: whichever saves
//! last wins.

use tower_sessions::Session;
use tracing::warn;

use orchard_core::{CartStore, MemorySlot, PersistMode};

use crate::models::session::keys;

/// A cart store bound to the request's session.
pub struct SessionCart {
    session: Session,
    store: CartStore<MemorySlot>,
}

impl SessionCart {
    /// Rehydrate the cart from the session.
    ///
    /// A slot value that is not a string is discarded with a warning, the
    /// same way the store discards a payload it cannot decode.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be read.
    pub async fn load(session: Session) -> Result<Self, tower_sessions::session::Error> {
        let payload = match session.get::<String>(keys::CART_ITEMS).await {
            Ok(payload) => payload,
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                warn!(error = %e, "Cart slot holds a non-string value, starting empty");
                None
            }
            Err(e) => return Err(e),
        };

        let slot = payload.map_or_else(MemorySlot::new, MemorySlot::with_payload);
        let store = CartStore::open(slot).with_persist_mode(PersistMode::Deferred);

        Ok(Self { session, store })
    }

    #[must_use]
    pub const fn store(&self) -> &CartStore<MemorySlot> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CartStore<MemorySlot> {
        &mut self.store
    }

    /// Flush pending writes and copy the slot back into the session.
    ///
    /// Does nothing when no mutation ran.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save(&mut self) -> Result<(), tower_sessions::session::Error> {
        if !self.store.is_dirty() || !self.store.flush() {
            return Ok(());
        }

        if let Some(payload) = self.store.slot().payload() {
            self.session.insert(keys::CART_ITEMS, payload).await?;
        }
        Ok(())
    }
}
