//! HTTP API handlers for pkm2-web

pub mod buildinfo;
pub mod health;
pub mod predict;
pub mod submission;
pub mod theme;

pub use buildinfo::get_build_info;
pub use health::health_routes;
pub use predict::predict_routes;
pub use submission::submission_routes;
pub use theme::theme_routes;
