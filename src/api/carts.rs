//! Cart resource
//!
//! - GET /users/cart - current cart
//! - POST /users/cart - add a product
//! - DELETE /users/cart - remove a product

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{bearer, ApiClient, ApiError};
use crate::models::CartItem;

const CART_PATH: &str = "/users/cart";

#[derive(Deserialize)]
struct CartResponse {
    #[serde(default)]
    result: Vec<CartItem>,
}

#[derive(Serialize)]
struct CartChange {
    product_id: i64,
}

impl ApiClient {
    /// Items in the current user's cart
    pub async fn cart(&self, token: &str) -> Result<Vec<CartItem>, ApiError> {
        let request = bearer(self.http().get(self.url(CART_PATH)), token);
        let cart: CartResponse = self.send_json(request, "Retrieval failed").await?;
        Ok(cart.result)
    }

    /// Add a product to the cart
    pub async fn add_to_cart(&self, token: &str, product_id: i64) -> Result<Value, ApiError> {
        let request = bearer(
            self.http()
                .post(self.url(CART_PATH))
                .json(&CartChange { product_id }),
            token,
        );
        self.send_value(request, "Failed").await
    }

    /// Remove a product from the cart
    pub async fn remove_from_cart(&self, token: &str, product_id: i64) -> Result<Value, ApiError> {
        let request = bearer(
            self.http()
                .delete(self.url(CART_PATH))
                .json(&CartChange { product_id }),
            token,
        );
        self.send_value(request, "Failed to remove").await
    }
}
