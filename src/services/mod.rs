//! Services layer
//!
//! - `session` - the authentication lifecycle
//! - `token` - local decoding of token claims
//! - `catalog` - search, rating and cart helpers over API payloads

pub mod catalog;
pub mod session;
pub mod token;

pub use catalog::{cart_total, rating_summary, search_products};
pub use session::SessionManager;
pub use token::{decode_claims, TokenClaims, TokenError};
