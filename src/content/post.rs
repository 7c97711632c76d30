//! Post models as served by the content API

use serde::{Deserialize, Serialize};

/// A post summary, as returned by the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    /// Opaque unique identifier
    pub id: String,

    /// Post title
    pub title: String,

    /// URL-safe unique lookup key
    pub slug: String,

    /// Publication date as the backend formats it (e.g. "2024-01-15")
    pub date: String,

    /// Short teaser text
    #[serde(default)]
    pub excerpt: String,

    /// Cover image URL
    #[serde(default)]
    pub cover: Option<String>,

    /// Whether the post is published
    pub published: bool,
}

/// A full post, as returned by the detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    /// Opaque unique identifier
    pub id: String,

    /// Post title
    pub title: String,

    /// URL-safe unique lookup key
    pub slug: String,

    /// Publication date as the backend formats it
    pub date: String,

    /// Short teaser text
    #[serde(default)]
    pub excerpt: String,

    /// Cover image URL
    #[serde(default)]
    pub cover: Option<String>,

    /// Whether the post is published
    pub published: bool,

    /// Raw markdown body
    pub content: String,
}

/// Envelope of the list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostsResponse {
    pub posts: Vec<PostSummary>,
    pub total: usize,
}

/// Fields of the contact form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_posts_response() {
        let body = r#"{
            "posts": [
                {
                    "id": "abc-123",
                    "title": "First Post",
                    "slug": "first-post",
                    "date": "2024-01-15",
                    "excerpt": "A short teaser",
                    "cover": "https://img.example.com/cover.png",
                    "published": true
                }
            ],
            "total": 1
        }"#;

        let parsed: PostsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.total, 1);
        assert_eq!(parsed.posts[0].slug, "first-post");
        assert!(parsed.posts[0].published);
    }

    #[test]
    fn test_parse_detail_without_cover() {
        let body = r##"{
            "id": "abc-123",
            "title": "First Post",
            "slug": "first-post",
            "date": "2024-01-15",
            "excerpt": "",
            "published": true,
            "content": "# Hello"
        }"##;

        let parsed: PostDetail = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.cover, None);
        assert_eq!(parsed.content, "# Hello");
    }
}
