//! Products resource
//!
//! Catalog listing, detail, create / update / delete, tag browsing and ratings.
//! All routes require a bearer token.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{bearer, ApiClient, ApiError};
use crate::models::{CreatedProduct, NewProduct, Product, ProductUpdate, Tag};

const PRODUCTS_PATH: &str = "/products";

#[derive(Deserialize)]
struct ProductList {
    #[serde(default)]
    results: Vec<Product>,
}

#[derive(Deserialize)]
struct ProductDetail {
    product: Product,
}

#[derive(Deserialize)]
struct TaggedProducts {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Deserialize)]
struct TagList {
    #[serde(default)]
    tags: Vec<Tag>,
}

#[derive(Deserialize)]
struct Created {
    created: CreatedProduct,
}

#[derive(Serialize)]
struct RateRequest<'a> {
    rating: u8,
    review_text: Option<&'a str>,
}

impl ApiClient {
    /// List every product
    pub async fn all_products(&self, token: &str) -> Result<Vec<Product>, ApiError> {
        let request = bearer(
            self.http().get(self.url(&format!("{}/", PRODUCTS_PATH))),
            token,
        );
        let list: ProductList = self.send_json(request, "Retrieval failed").await?;
        Ok(list.results)
    }

    /// Fetch one product with its tags, images and ratings
    pub async fn product(&self, token: &str, product_id: i64) -> Result<Product, ApiError> {
        let request = bearer(
            self.http()
                .get(self.url(&format!("{}/{}", PRODUCTS_PATH, product_id))),
            token,
        );
        let detail: ProductDetail = self.send_json(request, "Not found").await?;
        Ok(detail.product)
    }

    /// Create a product, returning the new product's id
    pub async fn create_product(&self, token: &str, input: &NewProduct) -> Result<i64, ApiError> {
        let request = bearer(
            self.http()
                .post(self.url(&format!("{}/create", PRODUCTS_PATH)))
                .json(input),
            token,
        );
        let created: Created = self.send_json(request, "Creation failed").await?;
        Ok(created.created.id)
    }

    /// Update a product's name, description, price and tags
    pub async fn update_product(
        &self,
        token: &str,
        product_id: i64,
        update: &ProductUpdate,
    ) -> Result<Value, ApiError> {
        let request = bearer(
            self.http()
                .patch(self.url(&format!("{}/{}", PRODUCTS_PATH, product_id)))
                .json(update),
            token,
        );
        self.send_value(request, "Failed").await
    }

    /// Delete a product
    pub async fn delete_product(&self, token: &str, product_id: i64) -> Result<Value, ApiError> {
        let request = bearer(
            self.http()
                .delete(self.url(&format!("{}/{}", PRODUCTS_PATH, product_id))),
            token,
        );
        self.send_value(request, "Failed").await
    }

    /// Products carrying the tag with `tag_id`
    pub async fn products_by_tag(&self, token: &str, tag_id: i64) -> Result<Vec<Product>, ApiError> {
        let request = bearer(
            self.http()
                .get(self.url(&format!("{}/tag/{}", PRODUCTS_PATH, tag_id))),
            token,
        );
        let tagged: TaggedProducts = self.send_json(request, "Not found").await?;
        Ok(tagged.products)
    }

    /// Every tag known to the catalog
    pub async fn all_tags(&self, token: &str) -> Result<Vec<Tag>, ApiError> {
        let request = bearer(
            self.http()
                .get(self.url(&format!("{}/tags/all", PRODUCTS_PATH))),
            token,
        );
        let list: TagList = self.send_json(request, "Failed").await?;
        Ok(list.tags)
    }

    /// Products carrying the tag named `tag_name`.
    ///
    /// Returns `None` when no tag has that name.
    pub async fn products_by_tag_name(
        &self,
        token: &str,
        tag_name: &str,
    ) -> Result<Option<Vec<Product>>, ApiError> {
        let tags = self.all_tags(token).await?;
        match tags.iter().find(|tag| tag.tag_name == tag_name) {
            Some(tag) => Ok(Some(self.products_by_tag(token, tag.id).await?)),
            None => Ok(None),
        }
    }

    /// Rate a product (1 to 5), optionally with a review
    pub async fn rate_product(
        &self,
        token: &str,
        product_id: i64,
        rating: u8,
        review_text: Option<&str>,
    ) -> Result<Value, ApiError> {
        if !(1..=5).contains(&rating) {
            return Err(ApiError::Validation(format!(
                "Rating must be between 1 and 5, got {}",
                rating
            )));
        }

        let request = bearer(
            self.http()
                .post(self.url(&format!("{}/{}/rate", PRODUCTS_PATH, product_id)))
                .json(&RateRequest {
                    rating,
                    review_text,
                }),
            token,
        );
        self.send_value(request, "Not found").await
    }
}
