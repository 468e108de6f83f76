//! Fixed catalog vocabulary.

/// Top-level product categories offered in the storefront filters.
pub const CATEGORIES: [&str; 10] = [
    "Electronics",
    "Fashion",
    "Home & Living",
    "Books",
    "Sports & Outdoors",
    "Beauty & Personal Care",
    "Toys & Games",
    "Automotive",
    "Grocery",
    "Health & Wellness",
];
