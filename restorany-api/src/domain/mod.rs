pub mod discovery;
pub mod error;
pub mod models;
pub mod reviews;

pub use error::{EngineError, Result};
