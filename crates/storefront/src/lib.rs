//! Orchard Storefront library.
//!
//! The storefront as a library: catalog and account repositories, the
//! session-backed cart, and the JSON API routes. The `orchard-storefront`
//! binary wires these into a server; the CLI reuses the repositories and
//! the auth service.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
