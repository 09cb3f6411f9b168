//! Catalog view-models and listing queries.
//!
//! Shapes mirror the backend's JSON (`camelCase`, `_id`). Everything here is
//! read-only from the storefront's point of view.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Image shown when a product has none.
pub const PLACEHOLDER_IMAGE: &str = "/static/images/placeholder-product.svg";

/// Number of numbered page links shown under a listing.
pub const MAX_PAGE_LINKS: u32 = 5;

/// A product image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

/// Aggregate review rating.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    #[serde(default)]
    pub average: f64,
    #[serde(default)]
    pub count: u32,
}

/// Star breakdown for a 0-5 rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarRating {
    pub full: u8,
    pub half: bool,
    pub empty: u8,
}

impl StarRating {
    /// Break an average rating into full, half and empty stars.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to 0..=5
    pub fn from_average(average: f64) -> Self {
        let avg = if average.is_finite() {
            average.clamp(0.0, 5.0)
        } else {
            0.0
        };
        let full = avg.floor() as u8;
        let half = avg.fract() > 0.0;
        let empty = 5 - avg.ceil() as u8;
        Self { full, half, empty }
    }
}

/// A product as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub original_price: Option<Price>,
    /// Discount in percent, as computed by the backend.
    #[serde(default)]
    pub discount: Option<u32>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub rating: Rating,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Product {
    /// URL of the first image, or the placeholder.
    #[must_use]
    pub fn primary_image_url(&self) -> &str {
        self.images
            .first()
            .map_or(PLACEHOLDER_IMAGE, |image| image.url.as_str())
    }

    /// Image at `index`, falling back to the primary image.
    #[must_use]
    pub fn image_url_at(&self, index: usize) -> &str {
        self.images
            .get(index)
            .map_or_else(|| self.primary_image_url(), |image| image.url.as_str())
    }

    /// Whether the product is sold below its original price.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.original_price
            .is_some_and(|original| original > self.price)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Clamp a requested quantity to what can be ordered.
    ///
    /// Returns 0 when the product is out of stock.
    #[must_use]
    pub fn clamp_quantity(&self, requested: u32) -> u32 {
        if self.stock == 0 {
            0
        } else {
            requested.clamp(1, self.stock)
        }
    }

    #[must_use]
    pub fn stars(&self) -> StarRating {
        StarRating::from_average(self.rating.average)
    }

    /// Category with its first letter capitalized.
    #[must_use]
    pub fn category_label(&self) -> String {
        Category::parse(&self.category).map_or_else(
            || capitalize(&self.category),
            |category| category.label().to_string(),
        )
    }
}

/// Product categories offered as listing filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Clothing,
    Home,
    Books,
    Sports,
    Beauty,
    Food,
    Automotive,
    Toys,
    Other,
}

impl Category {
    pub const ALL: [Self; 10] = [
        Self::Electronics,
        Self::Clothing,
        Self::Home,
        Self::Books,
        Self::Sports,
        Self::Beauty,
        Self::Food,
        Self::Automotive,
        Self::Toys,
        Self::Other,
    ];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Electronics => "electronics",
            Self::Clothing => "clothing",
            Self::Home => "home",
            Self::Books => "books",
            Self::Sports => "sports",
            Self::Beauty => "beauty",
            Self::Food => "food",
            Self::Automotive => "automotive",
            Self::Toys => "toys",
            Self::Other => "other",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Electronics => "Electronics",
            Self::Clothing => "Clothing",
            Self::Home => "Home",
            Self::Books => "Books",
            Self::Sports => "Sports",
            Self::Beauty => "Beauty",
            Self::Food => "Food",
            Self::Automotive => "Automotive",
            Self::Toys => "Toys",
            Self::Other => "Other",
        }
    }

    #[must_use]
    pub fn parse(slug: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.slug().eq_ignore_ascii_case(slug.trim()))
    }
}

/// Listing sort orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    #[default]
    Newest,
    PriceLowHigh,
    PriceHighLow,
    RatingHighLow,
    NameAZ,
}

impl SortOption {
    pub const ALL: [Self; 5] = [
        Self::Newest,
        Self::PriceLowHigh,
        Self::PriceHighLow,
        Self::RatingHighLow,
        Self::NameAZ,
    ];

    /// Value used in the `sort` query parameter.
    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Newest => "createdAt-desc",
            Self::PriceLowHigh => "price-asc",
            Self::PriceHighLow => "price-desc",
            Self::RatingHighLow => "rating-desc",
            Self::NameAZ => "name-asc",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Newest => "Newest First",
            Self::PriceLowHigh => "Price: Low to High",
            Self::PriceHighLow => "Price: High to Low",
            Self::RatingHighLow => "Rating: High to Low",
            Self::NameAZ => "Name: A to Z",
        }
    }

    /// Backend `sortBy` / `sortOrder` pair.
    #[must_use]
    pub const fn api_fields(self) -> (&'static str, &'static str) {
        match self {
            Self::Newest => ("createdAt", "desc"),
            Self::PriceLowHigh => ("price", "asc"),
            Self::PriceHighLow => ("price", "desc"),
            Self::RatingHighLow => ("rating", "desc"),
            Self::NameAZ => ("name", "asc"),
        }
    }

    /// Parse a `sort` query value; unknown values give the default.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|option| option.value() == value.trim())
            .unwrap_or_default()
    }
}

/// Grid or list presentation of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("list") {
            Self::List
        } else {
            Self::Grid
        }
    }

    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
        }
    }
}

/// Filters, sort and page of a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductQuery {
    pub search: String,
    pub category: Option<Category>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: SortOption,
    pub page: u32,
    pub view: ViewMode,
}

impl ProductQuery {
    /// Build a query from raw query-string values.
    ///
    /// Unparseable values are dropped rather than rejected: a bad price
    /// bound simply means no bound.
    #[must_use]
    pub fn from_raw(
        search: Option<&str>,
        category: Option<&str>,
        min_price: Option<&str>,
        max_price: Option<&str>,
        sort: Option<&str>,
        page: Option<&str>,
        view: Option<&str>,
    ) -> Self {
        Self {
            search: search.map(str::trim).unwrap_or_default().to_string(),
            category: category.and_then(Category::parse),
            min_price: min_price.and_then(parse_bound),
            max_price: max_price.and_then(parse_bound),
            sort: sort.map(SortOption::parse).unwrap_or_default(),
            page: page
                .and_then(|p| p.trim().parse::<u32>().ok())
                .filter(|p| *p > 0)
                .unwrap_or(1),
            view: view.map(ViewMode::parse).unwrap_or_default(),
        }
    }

    /// Pairs forwarded to `GET /products`.
    ///
    /// Empty filters are omitted. The view mode is presentation-only.
    #[must_use]
    pub fn to_api_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.slug().to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice", min.normalize().to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice", max.normalize().to_string()));
        }
        let (sort_by, sort_order) = self.sort.api_fields();
        pairs.push(("sortBy", sort_by.to_string()));
        pairs.push(("sortOrder", sort_order.to_string()));
        pairs.push(("page", self.page.max(1).to_string()));
        pairs
    }

    /// Query string for a storefront link to another page of this listing.
    #[must_use]
    pub fn page_href(&self, page: u32) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.slug().to_string()));
        }
        if let Some(min) = self.min_price {
            pairs.push(("minPrice", min.normalize().to_string()));
        }
        if let Some(max) = self.max_price {
            pairs.push(("maxPrice", max.normalize().to_string()));
        }
        if self.sort != SortOption::default() {
            pairs.push(("sort", self.sort.value().to_string()));
        }
        if self.view != ViewMode::default() {
            pairs.push(("view", self.view.value().to_string()));
        }
        pairs.push(("page", page.max(1).to_string()));

        let query = pairs
            .iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("/products?{query}")
    }

    /// Link to the current page of this listing shown in another view mode.
    #[must_use]
    pub fn view_href(&self, view: ViewMode) -> String {
        let query = Self {
            view,
            ..self.clone()
        };
        query.page_href(self.page)
    }

    /// Listing heading.
    #[must_use]
    pub fn heading(&self) -> String {
        if self.search.is_empty() {
            "All Products".to_string()
        } else {
            format!("Search Results for \"{}\"", self.search)
        }
    }

    /// Whether any filter differs from the defaults.
    #[must_use]
    pub fn has_filters(&self) -> bool {
        !self.search.is_empty()
            || self.category.is_some()
            || self.min_price.is_some()
            || self.max_price.is_some()
            || self.sort != SortOption::default()
    }
}

/// Pagination block of a listing response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_products: u32,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub has_prev: bool,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_products: 0,
            has_next: false,
            has_prev: false,
        }
    }
}

impl Pagination {
    /// Pagination controls are shown only for multi-page results.
    #[must_use]
    pub const fn is_paginated(&self) -> bool {
        self.total_pages > 1
    }

    /// Numbered page links: `1..=min(5, total_pages)`.
    #[must_use]
    pub fn page_links(&self) -> Vec<u32> {
        (1..=self.total_pages.min(MAX_PAGE_LINKS)).collect()
    }
}

/// One page of a product listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub pagination: Pagination,
}

impl ProductPage {
    /// "Showing X of Y products".
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Showing {} of {} products",
            self.products.len(),
            self.pagination.total_products
        )
    }
}

fn parse_bound(raw: &str) -> Option<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .ok()
        .filter(|value| !value.is_sign_negative())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
