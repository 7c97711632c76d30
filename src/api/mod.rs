//! Client for the content API
//!
//! List and detail reads degrade gracefully (empty list / absent post)
//! because they feed read-only display; the contact submission raises a
//! typed error because the user needs feedback when their action did not
//! go through.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::StatusCode;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::config::ApiConfig;
use crate::content::{ContactForm, PostDetail, PostSummary, PostsResponse};

/// Characters escaped when a slug is placed into a path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'#')
    .add(b'?')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// Errors from the content API
#[derive(Debug, Error)]
pub enum ApiError {
    /// The contact submission was rejected; this one must reach the user
    #[error("contact submission failed with status {status}")]
    SubmissionFailed { status: StatusCode },

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A cached response body and when it was fetched
struct CacheSlot {
    fetched_at: Instant,
    body: String,
}

/// Client for the content API with a freshness-window response cache
///
/// A cached body younger than the revalidation window is served without
/// touching the network; a stale entry is re-fetched and replaced. There
/// is no explicit invalidation, only time-based expiry.
pub struct ContentClient {
    http: reqwest::Client,
    base_url: String,
    revalidate: Duration,
    cache: Mutex<HashMap<String, CacheSlot>>,
}

impl ContentClient {
    /// Create a client from the API configuration
    pub fn new(config: &ApiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            revalidate: Duration::from_secs(config.revalidate_secs),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch all published posts
    ///
    /// Every failure mode (non-success status, network error, malformed
    /// body) degrades to an empty list so the caller can render a "no
    /// posts" state instead of crashing the page.
    pub async fn fetch_posts(&self) -> Vec<PostSummary> {
        let body = match self.get_cached("/posts").await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!("Failed to fetch posts: {}", err);
                return Vec::new();
            }
        };

        match serde_json::from_str::<PostsResponse>(&body) {
            Ok(response) => response
                .posts
                .into_iter()
                .filter(|post| post.published)
                .collect(),
            Err(err) => {
                tracing::warn!("Malformed posts response: {}", err);
                Vec::new()
            }
        }
    }

    /// Fetch a single post by slug
    ///
    /// 404 and every other failure yield `None`; callers render the
    /// not-found page.
    pub async fn fetch_post(&self, slug: &str) -> Option<PostDetail> {
        let path = format!("/posts/{}", utf8_percent_encode(slug, PATH_SEGMENT));

        let body = match self.get_cached(&path).await {
            Ok(body) => body,
            Err(ApiError::Status(StatusCode::NOT_FOUND)) => {
                tracing::debug!("Post not found: {}", slug);
                return None;
            }
            Err(err) => {
                tracing::warn!("Failed to fetch post {}: {}", slug, err);
                return None;
            }
        };

        match serde_json::from_str::<PostDetail>(&body) {
            Ok(post) => Some(post),
            Err(err) => {
                tracing::warn!("Malformed post body for {}: {}", slug, err);
                None
            }
        }
    }

    /// Submit the contact form
    ///
    /// The one operation that surfaces errors: a user-initiated side
    /// effect must not fail silently.
    pub async fn submit_contact(&self, form: &ContactForm) -> Result<(), ApiError> {
        let url = format!("{}/contact", self.base_url);

        let response = self.http.post(&url).json(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::SubmissionFailed { status });
        }

        Ok(())
    }

    /// GET a path, serving from cache while the entry is fresh
    async fn get_cached(&self, path: &str) -> Result<String, ApiError> {
        if let Some(body) = self.cache_lookup(path) {
            tracing::debug!("Cache hit: {}", path);
            return Ok(body);
        }

        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let body = response.text().await?;
        self.cache_store(path, &body);
        Ok(body)
    }

    fn cache_lookup(&self, path: &str) -> Option<String> {
        let cache = self.cache.lock().ok()?;
        let slot = cache.get(path)?;
        if slot.fetched_at.elapsed() < self.revalidate {
            Some(slot.body.clone())
        } else {
            None
        }
    }

    fn cache_store(&self, path: &str, body: &str) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(
                path.to_string(),
                CacheSlot {
                    fetched_at: Instant::now(),
                    body: body.to_string(),
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::State;
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Bind a stub content API on an ephemeral port
    async fn stub_server(router: Router) -> (String, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{}", addr), handle)
    }

    fn client_for(base_url: &str, revalidate_secs: u64) -> ContentClient {
        ContentClient::new(&ApiConfig {
            base_url: base_url.to_string(),
            revalidate_secs,
            timeout_secs: 5,
        })
    }

    fn sample_posts_json() -> serde_json::Value {
        serde_json::json!({
            "posts": [
                {
                    "id": "1",
                    "title": "Published",
                    "slug": "published",
                    "date": "2024-01-15",
                    "excerpt": "",
                    "cover": null,
                    "published": true
                },
                {
                    "id": "2",
                    "title": "Draft",
                    "slug": "draft",
                    "date": "2024-01-16",
                    "excerpt": "",
                    "cover": null,
                    "published": false
                }
            ],
            "total": 2
        })
    }

    #[tokio::test]
    async fn test_fetch_posts_filters_unpublished() {
        let router = Router::new().route("/posts", get(|| async { Json(sample_posts_json()) }));
        let (base, server) = stub_server(router).await;

        let client = client_for(&base, 300);
        let posts = client.fetch_posts().await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].slug, "published");

        server.abort();
    }

    #[tokio::test]
    async fn test_fetch_posts_on_server_error_returns_empty() {
        let router = Router::new().route(
            "/posts",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR.into_response() }),
        );
        let (base, server) = stub_server(router).await;

        let client = client_for(&base, 300);
        let posts = client.fetch_posts().await;
        assert!(posts.is_empty());

        server.abort();
    }

    #[tokio::test]
    async fn test_fetch_posts_on_network_failure_returns_empty() {
        // Nothing is listening on this port
        let client = client_for("http://127.0.0.1:1", 300);
        let posts = client.fetch_posts().await;
        assert!(posts.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_post_missing_slug_is_absent() {
        let router = Router::new().route(
            "/posts/:slug",
            get(|| async { StatusCode::NOT_FOUND.into_response() }),
        );
        let (base, server) = stub_server(router).await;

        let client = client_for(&base, 300);
        assert!(client.fetch_post("missing-slug").await.is_none());

        server.abort();
    }

    #[tokio::test]
    async fn test_fetch_post_found() {
        let router = Router::new().route(
            "/posts/:slug",
            get(|| async {
                Json(serde_json::json!({
                    "id": "1",
                    "title": "Hello",
                    "slug": "hello",
                    "date": "2024-01-15",
                    "excerpt": "",
                    "cover": null,
                    "published": true,
                    "content": "# Hi"
                }))
            }),
        );
        let (base, server) = stub_server(router).await;

        let client = client_for(&base, 300);
        let post = client.fetch_post("hello").await.unwrap();
        assert_eq!(post.title, "Hello");
        assert_eq!(post.content, "# Hi");

        server.abort();
    }

    #[tokio::test]
    async fn test_submit_contact_failure_raises() {
        let router = Router::new().route(
            "/contact",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR.into_response() }),
        );
        let (base, server) = stub_server(router).await;

        let client = client_for(&base, 300);
        let form = ContactForm {
            name: "A".to_string(),
            email: "a@b.com".to_string(),
            message: "hi".to_string(),
        };
        let err = client.submit_contact(&form).await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::SubmissionFailed { status } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));

        server.abort();
    }

    #[tokio::test]
    async fn test_submit_contact_success() {
        let router = Router::new().route(
            "/contact",
            post(|Json(form): Json<ContactForm>| async move {
                assert_eq!(form.name, "A");
                StatusCode::OK.into_response()
            }),
        );
        let (base, server) = stub_server(router).await;

        let client = client_for(&base, 300);
        let form = ContactForm {
            name: "A".to_string(),
            email: "a@b.com".to_string(),
            message: "hi".to_string(),
        };
        assert!(client.submit_contact(&form).await.is_ok());

        server.abort();
    }

    #[tokio::test]
    async fn test_fresh_cache_skips_upstream() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/posts",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(sample_posts_json())
                }),
            )
            .with_state(hits.clone());
        let (base, server) = stub_server(router).await;

        let client = client_for(&base, 300);
        let first = client.fetch_posts().await;
        let second = client.fetch_posts().await;
        assert_eq!(first.len(), second.len());
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        server.abort();
    }

    #[tokio::test]
    async fn test_stale_cache_refetches() {
        let hits = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/posts",
                get(|State(hits): State<Arc<AtomicUsize>>| async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Json(sample_posts_json())
                }),
            )
            .with_state(hits.clone());
        let (base, server) = stub_server(router).await;

        // Zero-second window: every fetch is stale
        let client = client_for(&base, 0);
        client.fetch_posts().await;
        client.fetch_posts().await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        server.abort();
    }
}
