use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};

/// Identifier of a post. The feed service hands out either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostId {
    Number(u64),
    String(String),
}

impl Display for PostId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    #[serde(alias = "postId")]
    pub id: PostId,
    #[serde(rename = "userName")]
    pub author_name: String,
    #[serde(rename = "userImage", default)]
    pub author_image: String,
    #[serde(rename = "userPostDescription", default)]
    pub description: String,
    #[serde(flatten)]
    pub preview: LinkPreview,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinkPreview {
    #[serde(rename = "metadataTitle", default)]
    pub title: String,
    #[serde(rename = "metadataDescription", default)]
    pub description: String,
    #[serde(rename = "userPostLink", default)]
    pub link: String,
    #[serde(rename = "metadataImage", default)]
    pub image: String,
}

/// Identity of the signed-in user, used to authorize requests.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Session {
    pub user: String,
    pub token: String,
}

impl Debug for Session {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_post() {
        let input = r#"{
            "id": 42,
            "userName": "Alice",
            "userImage": "https://img.example.com/alice.png",
            "userPostDescription": "Hello",
            "userPostLink": "https://example.com/article",
            "metadataTitle": "An article",
            "metadataDescription": "Something worth reading",
            "metadataImage": "https://img.example.com/article.png"
        }"#;
        let post = serde_json::from_str::<Post>(input).expect("failed to deserialize post");
        assert_eq!(
            post,
            Post {
                id: PostId::Number(42),
                author_name: String::from("Alice"),
                author_image: String::from("https://img.example.com/alice.png"),
                description: String::from("Hello"),
                preview: LinkPreview {
                    title: String::from("An article"),
                    description: String::from("Something worth reading"),
                    link: String::from("https://example.com/article"),
                    image: String::from("https://img.example.com/article.png"),
                },
            }
        );
    }

    #[test]
    fn deserialize_post_with_string_id() {
        let input = r#"{"postId": "abc", "userName": "Bob"}"#;
        let post = serde_json::from_str::<Post>(input).expect("failed to deserialize post");
        assert_eq!(post.id, PostId::String(String::from("abc")));
        assert_eq!(post.description, "");
        assert_eq!(post.preview, LinkPreview::default());
    }

    #[test]
    fn session_debug_hides_token() {
        let session = Session {
            user: String::from("alice"),
            token: String::from("secret"),
        };
        assert!(!format!("{session:?}").contains("secret"));
    }
}
