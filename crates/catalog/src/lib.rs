//! Catalog snapshot cache and upstream catalog provider.
//!
//! This crate provides:
//! - `CatalogCache` holding the latest venue snapshot, replaced wholesale
//! - exact-name lookup (notification matching) and fuzzy search (browsing)
//! - `CatalogProvider` trait for the upstream collaborator
//! - Wolt consumer-API provider implementation

pub mod cache;
pub mod provider;
pub mod wolt;

pub use cache::CatalogCache;
pub use provider::{CatalogError, CatalogProvider};
pub use wolt::WoltProvider;
