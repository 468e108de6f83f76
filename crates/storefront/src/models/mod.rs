//! Row and domain types mirrored from the hosted marketplace tables.
//!
//! `*Row` types deserialize the backend's native row JSON. Domain types wrap
//! joined product data in a [`Snapshot`](product::Snapshot) stamped with the
//! instant the row was received.

pub mod cart;
pub mod identity;
pub mod order;
pub mod product;
pub mod wishlist;

pub use cart::{CartLine, CartLineRow, NewCartLine};
pub use identity::{Identity, NewIdentity};
pub use order::{Order, OrderTotals};
pub use product::{Product, ProductFilter, ProductSort, ProductVariant, Snapshot};
pub use wishlist::{NewWishlistEntry, WishlistEntry, WishlistRow};
