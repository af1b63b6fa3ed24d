//! HTTP API handlers for congregacao-import

pub mod health;
pub mod import;

pub use health::health_routes;
pub use import::import_routes;
