pub mod app_state;
pub mod config;
pub mod domain;
pub mod repositories;
pub mod router;
pub mod routes;
pub mod storage;

pub use app_state::AppState;
