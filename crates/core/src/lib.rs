//! Orchard Core - cart domain model and shared types.
//!
//! This crate is used by every Orchard component:
//! - `storefront` - Public catalog, cart and checkout API plus the admin catalog editor
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types, pure logic and traits - no network, no
//! database access, no HTTP. Durable storage of the cart is abstracted behind
//! [`cart::CartSlot`] so the same store works against a browser-style local
//! slot, a server session, or an in-memory buffer in tests.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails and the product snapshot
//! - [`cart`] - The cart, its lines, the persisting store and the slot codec
//! - [`checkout`] - The login-gated checkout stub
//! - [`stock`] - Caller-side stock validation helpers
//! - [`access`] - Authentication/role signal consumed by checkout and admin pages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod cart;
pub mod checkout;
pub mod stock;
pub mod types;

pub use access::AccessSignal;
pub use cart::{Cart, CartLine, CartSlot, CartState, CartStore, MemorySlot, PersistMode, StockPolicy};
pub use checkout::{CheckoutRejection, Committed, attempt_checkout};
pub use stock::StockError;
pub use types::*;
