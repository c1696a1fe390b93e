use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Base URL of the feed service.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: String::from("http://localhost:5000"),
            timeout: 10,
        }
    }
}
