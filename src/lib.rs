//! Storefront - a client for the storefront REST API
//!
//! This library provides the session lifecycle, the API client and the
//! catalog helpers used by the `storefront` front end.

pub mod api;
pub mod config;
pub mod models;
pub mod services;
pub mod storage;
