//! User Aggregate

pub mod entity;
pub mod repository;

pub use entity::User;
pub use repository::UserRepository;
