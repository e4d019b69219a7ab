//! Home page: the product catalog with filtering, sorting, and pagination.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use fortynine_core::api::{Brand, Category, Product};
use fortynine_core::types::display_price;

use crate::backend::{ProductQuery, ProductSort, SortOrder};
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::CurrentUser;
use crate::state::AppState;

// =============================================================================
// Query Parameters
// =============================================================================

/// Catalog filters accepted on the home page URL.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub brand: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
}

/// Map a catalog sort name to the API's sort field and direction.
fn parse_sort(sort: &str) -> Option<(ProductSort, SortOrder)> {
    match sort {
        "price_asc" => Some((ProductSort::Price, SortOrder::Asc)),
        "price_desc" => Some((ProductSort::Price, SortOrder::Desc)),
        "newest" => Some((ProductSort::CreatedAt, SortOrder::Desc)),
        _ => None,
    }
}

// =============================================================================
// Product Views
// =============================================================================

/// Product display data for the catalog grid.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub title: String,
    pub brand: String,
    pub price: String,
    /// Discounted price, shown next to the struck-through list price.
    pub sale_price: Option<String>,
    pub discount_label: Option<String>,
    pub thumbnail: String,
    pub in_stock: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        let sale_price = product
            .discount_percentage
            .map(|_| display_price(product.sale_price()));
        let discount_label = product
            .discount_percentage
            .map(|discount| format!("{}% off", discount.normalize()));

        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            brand: product.brand.name.clone(),
            price: display_price(product.price),
            sale_price,
            discount_label,
            thumbnail: product.thumbnail.clone(),
            in_stock: product.in_stock(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub user: Option<CurrentUser>,
    pub products: Vec<ProductCardView>,
    pub brands: Vec<Brand>,
    pub categories: Vec<Category>,
    pub selected_brand: Option<String>,
    pub selected_category: Option<String>,
    pub selected_sort: Option<String>,
    pub current_page: u32,
    pub total_pages: u64,
    pub total_results: u64,
}

/// Products per catalog page.
const PRODUCTS_PER_PAGE: u32 = 12;

/// Display the home page catalog.
#[instrument(skip(state, user))]
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<CatalogQuery>,
) -> Result<HomeTemplate> {
    let current_page = query.page.unwrap_or(1).max(1);
    let sort = query.sort.as_deref().and_then(parse_sort);

    let page = state
        .api()
        .get_products(&ProductQuery {
            brand: query.brand.clone(),
            category: query.category.clone(),
            sort: sort.map(|(field, _)| field),
            order: sort.map(|(_, order)| order),
            page: Some(current_page),
            limit: Some(PRODUCTS_PER_PAGE),
        })
        .await?;

    // Filter dropdowns are decoration; an empty list is better than a 502.
    let brands = state.api().get_brands().await.map_or_else(
        |e| {
            tracing::error!("Failed to fetch brands: {e}");
            Vec::new()
        },
        |brands| brands,
    );
    let categories = state.api().get_categories().await.map_or_else(
        |e| {
            tracing::error!("Failed to fetch categories: {e}");
            Vec::new()
        },
        |categories| categories,
    );

    Ok(HomeTemplate {
        user,
        products: page.items.iter().map(ProductCardView::from).collect(),
        brands,
        categories,
        selected_brand: query.brand,
        selected_category: query.category,
        selected_sort: query.sort,
        current_page,
        total_pages: page.page_count(u64::from(PRODUCTS_PER_PAGE)),
        total_results: page.total,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn product(price: &str, discount: Option<&str>) -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": "664f1a2b3c4d5e6f7a8b9c0d",
            "title": "Graphite Pencil Set",
            "description": "Set of 12 graphite pencils.",
            "price": f64::from_str(price).unwrap(),
            "discountPercentage": discount.map(|d| f64::from_str(d).unwrap()),
            "stockQuantity": 42,
            "thumbnail": "https://cdn.example.com/pencils.jpg",
            "images": [],
            "brand": {"_id": "b1", "name": "Apsara"},
            "category": {"_id": "c1", "name": "Stationery"}
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_sort_values() {
        assert_eq!(
            parse_sort("price_asc"),
            Some((ProductSort::Price, SortOrder::Asc))
        );
        assert_eq!(
            parse_sort("price_desc"),
            Some((ProductSort::Price, SortOrder::Desc))
        );
        assert_eq!(
            parse_sort("newest"),
            Some((ProductSort::CreatedAt, SortOrder::Desc))
        );
        assert_eq!(parse_sort("alphabetical"), None);
    }

    #[test]
    fn test_product_card_without_discount() {
        let view = ProductCardView::from(&product("499", None));
        assert_eq!(view.price, "₹499");
        assert_eq!(view.sale_price, None);
        assert_eq!(view.discount_label, None);
        assert!(view.in_stock);
    }

    #[test]
    fn test_product_card_with_discount() {
        let view = ProductCardView::from(&product("200", Some("15")));
        assert_eq!(view.price, "₹200");
        assert_eq!(view.sale_price.as_deref(), Some("₹170"));
        assert_eq!(view.discount_label.as_deref(), Some("15% off"));
    }

    #[test]
    fn test_discount_label_trims_trailing_zeros() {
        let mut p = product("100", None);
        p.discount_percentage = Some(Decimal::from_str("12.50").unwrap());
        let view = ProductCardView::from(&p);
        assert_eq!(view.discount_label.as_deref(), Some("12.5% off"));
    }
}
