//! Table query builder for the hosted REST interface.
//!
//! Produces PostgREST-style query strings: `select=`, `col=eq.value`,
//! `col=gte.value`, `col=lte.value`, `order=col.desc`, `limit=n`.

use std::fmt::Display;

use url::Url;

use crate::models::{ProductFilter, ProductSort};

/// Ordering direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A filtered, ordered read against one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableQuery {
    table: &'static str,
    params: Vec<(String, String)>,
}

impl TableQuery {
    /// Start a query against `table`.
    #[must_use]
    pub const fn new(table: &'static str) -> Self {
        Self {
            table,
            params: Vec::new(),
        }
    }

    #[must_use]
    pub fn select(self, columns: &str) -> Self {
        self.param("select", columns.to_string())
    }

    #[must_use]
    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.param(column, format!("eq.{value}"))
    }

    #[must_use]
    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.param(column, format!("gte.{value}"))
    }

    #[must_use]
    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.param(column, format!("lte.{value}"))
    }

    #[must_use]
    pub fn order(self, column: &str, direction: Direction) -> Self {
        self.param("order", format!("{column}.{}", direction.as_str()))
    }

    #[must_use]
    pub fn limit(self, limit: usize) -> Self {
        self.param("limit", limit.to_string())
    }

    /// Apply a catalog filter and its sort order.
    #[must_use]
    pub fn filtered(mut self, filter: &ProductFilter) -> Self {
        if let Some(category) = &filter.category {
            self = self.eq("category", category);
        }
        if let Some(min) = filter.min_price {
            self = self.gte("price", min);
        }
        if let Some(max) = filter.max_price {
            self = self.lte("price", max);
        }
        match filter.sort {
            ProductSort::PriceLow => self.order("price", Direction::Asc),
            ProductSort::PriceHigh => self.order("price", Direction::Desc),
            ProductSort::Rating => self.order("rating", Direction::Desc),
            ProductSort::Newest => self.order("created_at", Direction::Desc),
        }
    }

    /// Target table.
    #[must_use]
    pub const fn table(&self) -> &'static str {
        self.table
    }

    /// Query parameters in insertion order.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Resolve against the service root, e.g. `https://x.example.co/`.
    ///
    /// # Errors
    ///
    /// Returns an error if the table path cannot be joined onto `base`.
    pub fn url(&self, base: &Url) -> Result<Url, url::ParseError> {
        let mut url = base.join(&format!("rest/v1/{}", self.table))?;
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.params);
        }
        Ok(url)
    }

    fn param(mut self, key: &str, value: String) -> Self {
        self.params.push((key.to_string(), value));
        self
    }
}
