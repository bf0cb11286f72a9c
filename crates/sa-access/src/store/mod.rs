//! Store Aggregate
//!
//! Stores and their administration API.

pub mod api;
pub mod entity;
pub mod repository;

pub use api::{stores_router, StoresState};
pub use entity::{Store, StoreStatus};
pub use repository::StoreRepository;
