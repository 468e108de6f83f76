//! Client-side state containers.
//!
//! Each store mirrors remote rows locally in a `watch` channel: readers take
//! snapshots synchronously, subscribers are notified on every change. Stores
//! receive their backend seam at construction and never talk to each other;
//! cart and wishlist take the identity ID as an argument.

pub mod auth;
pub mod cart;
pub mod wishlist;

pub use auth::{AuthError, AuthState, AuthStore};
pub use cart::{CartState, CartStore};
pub use wishlist::{WishlistState, WishlistStore};
