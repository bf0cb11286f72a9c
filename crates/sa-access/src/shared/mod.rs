pub mod api_common;
pub mod authorization_service;
pub mod error;
pub mod health_api;
pub mod indexes;
pub mod middleware;
pub mod tsid;
