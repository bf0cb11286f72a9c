//! Store Admin shared infrastructure.

pub mod logging;

pub use logging::{init_logging, LogFormat};
