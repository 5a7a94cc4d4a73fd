pub mod config;
pub mod error;
pub mod handlers;
pub mod landing;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod storage;
pub mod utils;

pub use config::Config;
pub use error::{ApiError, ApiResponse, ApiResult, Meta};
pub use landing::LandingConfig;
pub use routes::{app, ApiDoc, AppState};
