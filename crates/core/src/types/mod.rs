//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common marketplace concepts.

pub mod catalog;
pub mod email;
pub mod id;
pub mod role;
pub mod status;

pub use catalog::CATEGORIES;
pub use email::{Email, EmailError};
pub use id::*;
pub use role::{Area, Role, RoleParseError};
pub use status::*;
