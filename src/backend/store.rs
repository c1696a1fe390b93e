use super::types::{PostId, Session};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("update rejected with status {0}")]
    Status(StatusCode),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Body of an update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePost {
    pub id: PostId,
    pub description: String,
}

/// Remote storage of posts.
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn update_post(&self, session: &Session, update: &UpdatePost) -> Result<()>;
}
