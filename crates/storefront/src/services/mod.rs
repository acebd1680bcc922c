//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Password accounts (argon2)
//! - `cart` - Session-backed cart store
//! - `uploads` - Product image storage and URL resolution

pub mod auth;
pub mod cart;
pub mod uploads;
