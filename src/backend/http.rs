use super::config::Config;
use super::store::{Error, PostStore, Result, UpdatePost};
use super::types::Session;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// [`PostStore`] backed by the feed service's HTTP API.
pub struct HttpPostStore {
    client: Client,
    endpoint: String,
}

impl HttpPostStore {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
    fn update_url(&self) -> String {
        format!("{}/posts/update", self.endpoint.trim_end_matches('/'))
    }
}

#[async_trait]
impl PostStore for HttpPostStore {
    async fn update_post(&self, session: &Session, update: &UpdatePost) -> Result<()> {
        log::debug!("PUT {} for post {}", self.update_url(), update.id);
        let response = self
            .client
            .put(self.update_url())
            .bearer_auth(&session.token)
            .json(update)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Error::Status(status))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::PostId;

    #[test]
    fn update_url() {
        for endpoint in ["https://feed.example.com/api", "https://feed.example.com/api/"] {
            let store = HttpPostStore::new(&Config {
                endpoint: String::from(endpoint),
                timeout: 1,
            })
            .expect("failed to build store");
            assert_eq!(store.update_url(), "https://feed.example.com/api/posts/update");
        }
    }

    #[test]
    fn update_body() {
        let update = UpdatePost {
            id: PostId::Number(7),
            description: String::from("Hi"),
        };
        assert_eq!(
            serde_json::to_value(&update).expect("failed to serialize"),
            serde_json::json!({"id": 7, "description": "Hi"})
        );
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let store = HttpPostStore::new(&Config {
            endpoint: String::from("http://127.0.0.1:9"),
            timeout: 1,
        })
        .expect("failed to build store");
        let update = UpdatePost {
            id: PostId::Number(1),
            description: String::from("Hi"),
        };
        let result = store.update_post(&Session::default(), &update).await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
