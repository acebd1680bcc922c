//! Domain models for the storefront.
//!
//! Row types stay private to `db`; these are what handlers and services see.

pub mod product;
pub mod session;
pub mod user;

pub use product::Product;
pub use session::CurrentUser;
pub use user::User;
