//! Catalog helpers
//!
//! Client-side views over catalog payloads: name search, rating summaries and
//! cart totals.

use crate::models::{CartItem, Product, Rating, RatingSummary, SearchHit};

/// Products whose name contains `query`, ignoring case.
///
/// An empty query matches every product.
pub fn search_products(products: &[Product], query: &str) -> Vec<SearchHit> {
    let needle = query.to_lowercase();
    products
        .iter()
        .filter(|product| product.product_name.to_lowercase().contains(&needle))
        .map(|product| SearchHit {
            id: product.id,
            product_name: product.product_name.clone(),
            price: product.price,
            seller_name: product.user_name.clone(),
            images: product.images.clone(),
        })
        .collect()
}

/// Count and mean of `ratings`, the mean rounded to one decimal.
///
/// Returns `None` when there are no ratings.
pub fn rating_summary(ratings: &[Rating]) -> Option<RatingSummary> {
    if ratings.is_empty() {
        return None;
    }

    let sum: f64 = ratings.iter().map(|r| r.rating).sum();
    let mean = sum / ratings.len() as f64;
    Some(RatingSummary {
        raters: ratings.len(),
        average: (mean * 10.0).round() / 10.0,
    })
}

/// Sum of item prices
pub fn cart_total(items: &[CartItem]) -> f64 {
    items.iter().map(|item| item.price).sum()
}
