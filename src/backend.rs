pub mod config;
mod http;
mod store;
pub mod types;

pub use http::HttpPostStore;
pub use store::{Error, PostStore, Result, UpdatePost};
