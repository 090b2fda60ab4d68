//! Catalog models
//!
//! Payloads exchanged with the products and cart resources. The client
//! enforces no invariants on them; missing optional fields default to empty.

use serde::{Deserialize, Serialize};

/// Product as returned by the products resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub product_name: String,
    #[serde(default)]
    pub product_description: String,
    pub price: f64,
    /// Seller username
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
}

impl Product {
    /// Whether `username` is the seller (only the seller may edit or delete)
    pub fn is_owned_by(&self, username: &str) -> bool {
        !self.user_name.is_empty() && self.user_name == username
    }

    /// First image URL, used as the listing thumbnail
    pub fn thumbnail(&self) -> Option<&str> {
        self.images.first().map(|image| image.image_url.as_str())
    }
}

/// Product image reference
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductImage {
    pub image_url: String,
}

/// A single rating left on a product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub rating: f64,
    #[serde(default)]
    pub review_text: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// Product tag
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "RawTag")]
pub struct Tag {
    pub id: i64,
    pub tag_name: String,
}

// The product detail payload names the id `tag_id`, the tag list names it `id`,
// and some payloads carry both.
#[derive(Deserialize)]
struct RawTag {
    id: Option<i64>,
    tag_id: Option<i64>,
    tag_name: String,
}

impl TryFrom<RawTag> for Tag {
    type Error = String;

    fn try_from(raw: RawTag) -> Result<Self, Self::Error> {
        let id = raw
            .tag_id
            .or(raw.id)
            .ok_or_else(|| format!("tag '{}' has no id", raw.tag_name))?;
        Ok(Self {
            id,
            tag_name: raw.tag_name,
        })
    }
}

impl From<&str> for ProductImage {
    fn from(image_url: &str) -> Self {
        Self {
            image_url: image_url.to_string(),
        }
    }
}

impl From<String> for ProductImage {
    fn from(image_url: String) -> Self {
        Self { image_url }
    }
}

/// Tag reference in a create or update body
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagRef {
    pub tag_id: i64,
}

impl From<i64> for TagRef {
    fn from(tag_id: i64) -> Self {
        Self { tag_id }
    }
}

/// Body of a product creation request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub product_name: String,
    pub product_description: String,
    pub price: f64,
    pub tags: Vec<TagRef>,
    pub images: Vec<ProductImage>,
}

/// Body of a product update request (images are not editable)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductUpdate {
    pub product_name: String,
    pub product_description: String,
    pub price: f64,
    pub tags: Vec<TagRef>,
}

impl ProductUpdate {
    /// Prefill an update from the current product, as the edit form does
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_name: product.product_name.clone(),
            product_description: product.product_description.clone(),
            price: product.price,
            tags: product.tags.iter().map(|tag| TagRef::from(tag.id)).collect(),
        }
    }
}

/// Reference to a freshly created product
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreatedProduct {
    pub id: i64,
}

/// Cart line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub id: i64,
    pub product_name: String,
    pub price: f64,
}

/// Product matched by a name search
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    pub id: i64,
    pub product_name: String,
    pub price: f64,
    pub seller_name: String,
    pub images: Vec<ProductImage>,
}

/// Aggregate of a product's ratings
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct RatingSummary {
    /// Number of ratings
    pub raters: usize,
    /// Mean rating rounded to one decimal
    pub average: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_product_detail_payload() {
        let product: Product = serde_json::from_value(json!({
            "id": 7,
            "product_name": "Kettle",
            "product_description": "Boils water",
            "price": 24.5,
            "user_name": "alice",
            "created_at": "2024-03-01T10:00:00Z",
            "tags": [{ "tag_id": 2, "tag_name": "kitchen" }],
            "images": [{ "image_url": "https://img/1.png" }, { "image_url": "https://img/2.png" }],
            "ratings": [{ "rating": 4, "review_text": null }]
        }))
        .unwrap();

        assert_eq!(product.tags[0].id, 2);
        assert_eq!(product.thumbnail(), Some("https://img/1.png"));
        assert_eq!(product.ratings[0].rating, 4.0);
        assert!(product.is_owned_by("alice"));
        assert!(!product.is_owned_by("bob"));
    }

    #[test]
    fn test_listing_payload_defaults_missing_fields() {
        let product: Product = serde_json::from_value(json!({
            "id": 1,
            "product_name": "Mug",
            "price": 3
        }))
        .unwrap();

        assert!(product.tags.is_empty());
        assert!(product.images.is_empty());
        assert_eq!(product.thumbnail(), None);
        assert!(!product.is_owned_by(""));
    }

    #[test]
    fn test_tag_id_naming_variants() {
        let listed: Tag = serde_json::from_value(json!({ "id": 5, "tag_name": "garden" })).unwrap();
        let both: Tag =
            serde_json::from_value(json!({ "id": 9, "tag_id": 5, "tag_name": "garden" })).unwrap();
        assert_eq!(listed, both);

        let missing = serde_json::from_value::<Tag>(json!({ "tag_name": "garden" }));
        assert!(missing.is_err());
    }

    #[test]
    fn test_update_prefilled_from_product() {
        let product = Product {
            id: 3,
            product_name: "Lamp".into(),
            product_description: "Bright".into(),
            price: 12.0,
            user_name: "carol".into(),
            created_at: None,
            tags: vec![
                Tag { id: 1, tag_name: "home".into() },
                Tag { id: 4, tag_name: "light".into() },
            ],
            images: vec![],
            ratings: vec![],
        };

        let update = ProductUpdate::from_product(&product);
        assert_eq!(update.tags, vec![TagRef::from(1), TagRef::from(4)]);
        assert_eq!(update.price, 12.0);

        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body["tags"], json!([{ "tag_id": 1 }, { "tag_id": 4 }]));
    }

    #[test]
    fn test_new_product_body_shape() {
        let input = NewProduct {
            product_name: "Rake".into(),
            product_description: "Leaves".into(),
            price: 9.5,
            tags: vec![3.into()],
            images: vec!["https://img/rake.png".into()],
        };

        let body = serde_json::to_value(&input).unwrap();
        assert_eq!(body["tags"], json!([{ "tag_id": 3 }]));
        assert_eq!(body["images"], json!([{ "image_url": "https://img/rake.png" }]));
    }
}
