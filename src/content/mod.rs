//! Content module - post models and markdown rendering

mod markdown;
mod post;

pub use markdown::MarkdownRenderer;
pub use post::{ContactForm, PostDetail, PostSummary, PostsResponse};
