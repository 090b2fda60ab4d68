//! Data models
//!
//! This module contains the data structures used throughout the storefront client:
//! - Session state and lifecycle events
//! - Catalog and cart payloads
//! - Auth request bodies

mod product;
mod session;
mod user;

pub use product::{
    CartItem, CreatedProduct, NewProduct, Product, ProductImage, ProductUpdate, Rating,
    RatingSummary, SearchHit, Tag, TagRef,
};
pub use session::{SessionEvent, SessionState, TOKEN_KEY, USERNAME_KEY};
pub use user::{LoginInput, RegisterInput};
