pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use error::{AirsightError, Result};
pub use store::{Selection, SelectionStore};
