//! Bazaar storefront client library.
//!
//! Client-side state for a multi-vendor marketplace backed by a hosted
//! data/auth service: the auth, cart and wishlist stores, the catalog and
//! the role-gated dashboards. [`Storefront`] wires them to one backend.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod state;
pub mod stores;

pub use backend::{Backend, BackendError, MemoryBackend, RestBackend};
pub use catalog::Catalog;
pub use config::{BackendConfig, ConfigError};
pub use dashboard::{AdminStats, SellerStats};
pub use error::{Result, StoreError};
pub use state::Storefront;
pub use stores::{AuthError, AuthStore, CartStore, WishlistStore};
