//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use oba_core::product::ViewMode;
use oba_core::{Category, Product, ProductId, ProductPage, ProductQuery, SortOption};
use serde::Deserialize;
use tracing::instrument;

use crate::api::ApiError;
use crate::error::AppError;
use crate::filters;
use crate::middleware::PageContext;
use crate::state::AppState;

/// Listing query parameters, as they appear in the URL.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
    pub page: Option<String>,
    pub view: Option<String>,
}

impl ListingParams {
    fn to_query(&self) -> ProductQuery {
        ProductQuery::from_raw(
            self.search.as_deref(),
            self.category.as_deref(),
            self.min_price.as_deref(),
            self.max_price.as_deref(),
            self.sort.as_deref(),
            self.page.as_deref(),
            self.view.as_deref(),
        )
    }
}

/// Detail page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DetailParams {
    pub image: Option<String>,
    pub tab: Option<String>,
}

impl DetailParams {
    /// Requested gallery index. Unparseable input means the first image.
    fn image_index(&self) -> Option<usize> {
        self.image
            .as_deref()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
    }
}

/// Tabs under the product gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailTab {
    #[default]
    Description,
    Specifications,
    Reviews,
}

impl DetailTab {
    pub const ALL: [Self; 3] = [Self::Description, Self::Specifications, Self::Reviews];

    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("specifications") => Self::Specifications,
            Some("reviews") => Self::Reviews,
            _ => Self::Description,
        }
    }

    #[must_use]
    pub const fn value(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Specifications => "specifications",
            Self::Reviews => "reviews",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Description => "Description",
            Self::Specifications => "Specifications",
            Self::Reviews => "Reviews",
        }
    }
}

/// A numbered pagination link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub current: bool,
}

/// Pagination links for a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationView {
    pub links: Vec<PageLink>,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl PaginationView {
    fn new(query: &ProductQuery, listing: &ProductPage) -> Self {
        let pagination = &listing.pagination;
        if !pagination.is_paginated() {
            return Self::default();
        }

        let current = pagination.current_page;
        Self {
            links: pagination
                .page_links()
                .into_iter()
                .map(|number| PageLink {
                    number,
                    href: query.page_href(number),
                    current: number == current,
                })
                .collect(),
            prev: pagination
                .has_prev
                .then(|| query.page_href(current.saturating_sub(1))),
            next: pagination
                .has_next
                .then(|| query.page_href(current.saturating_add(1))),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub ctx: PageContext,
    pub query: ProductQuery,
    pub listing: ProductPage,
    pub pages: PaginationView,
    pub load_failed: bool,
    pub categories: [Category; 10],
    pub sort_options: [SortOption; 5],
    pub selected_category: &'static str,
    pub selected_sort: &'static str,
    pub min_price: String,
    pub max_price: String,
    pub list_view: bool,
    pub grid_href: String,
    pub list_href: String,
    pub current_href: String,
}

/// A selectable gallery image or tab on the detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLink {
    pub label: String,
    pub href: String,
    pub active: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub ctx: PageContext,
    pub product: Product,
    pub main_image: String,
    pub thumbnails: Vec<DetailLink>,
    pub tab: DetailTab,
    pub tab_links: Vec<DetailLink>,
    pub max_quantity: u32,
}

impl ProductShowTemplate {
    fn new(ctx: PageContext, product: Product, params: &DetailParams) -> Self {
        let image_index = params
            .image_index()
            .filter(|index| *index < product.images.len())
            .unwrap_or(0);
        let tab = DetailTab::parse(params.tab.as_deref());
        let href = |image: usize, tab: DetailTab| {
            format!(
                "/products/{}?image={image}&tab={}",
                urlencoding::encode(product.id.as_str()),
                tab.value()
            )
        };

        let thumbnails = product
            .images
            .iter()
            .enumerate()
            .map(|(index, image)| DetailLink {
                label: image.url.clone(),
                href: href(index, tab),
                active: index == image_index,
            })
            .collect();
        let tab_links = DetailTab::ALL
            .into_iter()
            .map(|candidate| DetailLink {
                label: candidate.label().to_string(),
                href: href(image_index, candidate),
                active: candidate == tab,
            })
            .collect();

        Self {
            main_image: product.image_url_at(image_index).to_string(),
            max_quantity: product.stock.max(1),
            thumbnails,
            tab,
            tab_links,
            ctx,
            product,
        }
    }

    #[must_use]
    pub fn shows_specifications(&self) -> bool {
        self.tab == DetailTab::Specifications
    }

    #[must_use]
    pub fn shows_reviews(&self) -> bool {
        self.tab == DetailTab::Reviews
    }
}

/// Product not found page.
#[derive(Template, WebTemplate)]
#[template(path = "products/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub ctx: PageContext,
}

/// Display product listing page.
#[instrument(skip(state, ctx))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
    ctx: PageContext,
) -> impl IntoResponse {
    let query = params.to_query();

    let (listing, load_failed) = match state.api().list_products(&query).await {
        Ok(listing) => (listing, false),
        Err(e) => {
            tracing::warn!("Failed to load products: {e}");
            (ProductPage::default(), true)
        }
    };

    ProductsIndexTemplate {
        ctx,
        pages: PaginationView::new(&query, &listing),
        selected_category: query.category.map_or("", Category::slug),
        selected_sort: query.sort.value(),
        min_price: query
            .min_price
            .map(|p| p.normalize().to_string())
            .unwrap_or_default(),
        max_price: query
            .max_price
            .map(|p| p.normalize().to_string())
            .unwrap_or_default(),
        list_view: query.view == ViewMode::List,
        grid_href: query.view_href(ViewMode::Grid),
        list_href: query.view_href(ViewMode::List),
        current_href: query.page_href(query.page),
        query,
        listing,
        load_failed,
        categories: Category::ALL,
        sort_options: SortOption::ALL,
    }
}

/// Display product detail page.
#[instrument(skip(state, ctx))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<DetailParams>,
    ctx: PageContext,
) -> Result<Response, AppError> {
    let id = ProductId::new(id);

    let product = match state.api().get_product(&id).await {
        Ok(product) => product,
        Err(ApiError::NotFound(_)) => {
            return Ok((StatusCode::NOT_FOUND, ProductNotFoundTemplate { ctx }).into_response());
        }
        Err(e) => return Err(e.into()),
    };

    Ok(ProductShowTemplate::new(ctx, product, &params).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_params_build_query() {
        let params = ListingParams {
            search: Some(" lamp ".to_string()),
            category: Some("home".to_string()),
            min_price: Some("abc".to_string()),
            page: Some("3".to_string()),
            view: Some("list".to_string()),
            ..ListingParams::default()
        };
        let query = params.to_query();
        assert_eq!(query.search, "lamp");
        assert_eq!(query.category, Some(Category::Home));
        assert_eq!(query.min_price, None);
        assert_eq!(query.page, 3);
        assert_eq!(query.view, ViewMode::List);
    }

    #[test]
    fn test_pagination_links() {
        let query = ProductQuery::from_raw(None, None, None, None, None, Some("2"), None);
        let listing: ProductPage = serde_json::from_value(serde_json::json!({
            "products": [],
            "pagination": {
                "currentPage": 2,
                "totalPages": 7,
                "totalProducts": 130,
                "hasNext": true,
                "hasPrev": true
            }
        }))
        .unwrap_or_default();

        let pages = PaginationView::new(&query, &listing);
        assert_eq!(pages.links.len(), 5);
        assert!(pages.links.iter().any(|link| link.number == 2 && link.current));
        assert_eq!(pages.prev.as_deref(), Some("/products?page=1"));
        assert_eq!(pages.next.as_deref(), Some("/products?page=3"));

        let single = PaginationView::new(&query, &ProductPage::default());
        assert!(single.is_empty());
    }

    #[test]
    fn test_detail_links_clamp_image_index() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "_id": "p1",
            "name": "Lamp",
            "price": 25.0,
            "stock": 3,
            "images": [{"url": "/a.jpg"}, {"url": "/b.jpg"}]
        }))
        .unwrap_or_else(|e| panic!("{e}"));
        let params = DetailParams {
            image: Some("9".to_string()),
            tab: Some("reviews".to_string()),
        };

        let page = ProductShowTemplate::new(PageContext::default(), product, &params);
        assert_eq!(page.main_image, "/a.jpg");
        assert!(page.shows_reviews());
        assert_eq!(page.thumbnails.len(), 2);
        assert_eq!(page.thumbnails[1].href, "/products/p1?image=1&tab=reviews");
        assert!(page.tab_links[2].active);
        assert_eq!(page.max_quantity, 3);
    }

    #[test]
    fn test_detail_image_param_is_lenient() {
        let product: Product = serde_json::from_value(serde_json::json!({
            "_id": "p1",
            "name": "Lamp",
            "price": 25.0,
            "images": [{"url": "/a.jpg"}, {"url": "/b.jpg"}]
        }))
        .unwrap_or_else(|e| panic!("{e}"));

        for raw in ["abc", "", "-1", " 1 "] {
            let params = DetailParams {
                image: Some(raw.to_string()),
                tab: None,
            };
            let page = ProductShowTemplate::new(PageContext::default(), product.clone(), &params);
            let expected = if raw == " 1 " { "/b.jpg" } else { "/a.jpg" };
            assert_eq!(page.main_image, expected, "image={raw:?}");
        }
    }

    #[test]
    fn test_detail_tab_parse() {
        assert_eq!(DetailTab::parse(Some("reviews")), DetailTab::Reviews);
        assert_eq!(DetailTab::parse(Some("bogus")), DetailTab::Description);
        assert_eq!(DetailTab::parse(None), DetailTab::Description);
    }
}
