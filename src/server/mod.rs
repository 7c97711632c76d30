//! HTTP server serving the rendered pages

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::content::ContactForm;
use crate::pages::{self, ContactOutcome};
use crate::Folio;

/// Start the server
pub async fn start(folio: Folio, ip: &str, port: u16) -> Result<()> {
    let state = Arc::new(folio);

    let app = Router::new()
        .route("/", get(home))
        .route("/blog/:slug", get(post_detail))
        .route("/about", get(about))
        .route("/contact", get(contact).post(contact_submit))
        .route("/assets/style.css", get(stylesheet))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Home listing; a failed fetch degrades to the empty state
async fn home(State(folio): State<Arc<Folio>>) -> Html<String> {
    let posts = folio.client.fetch_posts().await;
    Html(pages::home_page(&folio.config, &posts))
}

/// Post detail; the detail and the sibling list are independent reads
/// and are awaited concurrently
async fn post_detail(State(folio): State<Arc<Folio>>, Path(slug): Path<String>) -> Response {
    let (post, siblings) = tokio::join!(folio.client.fetch_post(&slug), folio.client.fetch_posts());

    match post {
        Some(post) => {
            let body = folio.renderer.render(&post.content);
            Html(pages::post_page(&folio.config, &post, &body, &siblings)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Html(pages::not_found_page(&folio.config)),
        )
            .into_response(),
    }
}

async fn about(State(folio): State<Arc<Folio>>) -> Html<String> {
    Html(pages::about_page(&folio.config))
}

async fn contact(State(folio): State<Arc<Folio>>) -> Html<String> {
    Html(pages::contact_page(&folio.config, None))
}

/// Forward the contact form to the API; failure renders a retry prompt
/// instead of an opaque error page
async fn contact_submit(
    State(folio): State<Arc<Folio>>,
    Form(form): Form<ContactForm>,
) -> Response {
    match folio.client.submit_contact(&form).await {
        Ok(()) => Html(pages::contact_page(
            &folio.config,
            Some(ContactOutcome::Submitted),
        ))
        .into_response(),
        Err(err) => {
            tracing::warn!("Contact submission failed: {}", err);
            (
                StatusCode::BAD_GATEWAY,
                Html(pages::contact_page(
                    &folio.config,
                    Some(ContactOutcome::Failed),
                )),
            )
                .into_response()
        }
    }
}

async fn stylesheet() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        pages::STYLESHEET,
    )
}
