//! # CoinLens Common Library
//!
//! Shared code for the CoinLens backend:
//! - Coin data model and the public JSON representation
//! - Image naming convention and derived URLs
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{CoinAnalysis, CoinRecord, CoinView};
