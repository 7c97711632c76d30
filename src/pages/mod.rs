//! Page composition
//!
//! Pure functions from fetched data to full HTML documents. Every page
//! shares one layout; all interpolated text goes through `html_escape`.

use crate::config::SiteConfig;
use crate::content::{PostDetail, PostSummary};
use crate::helpers::{display_date, html_escape, link_to, strip_html, truncate};

/// Default stylesheet served at /assets/style.css
pub const STYLESHEET: &str = include_str!("assets/style.css");

/// Outcome of a contact form submission, for the contact page
pub enum ContactOutcome {
    Submitted,
    Failed,
}

/// Wrap a page body in the shared chrome (nav, footer, head)
pub fn layout(config: &SiteConfig, page_title: &str, body: &str) -> String {
    let site_title = html_escape(&config.title);
    let full_title = if page_title.is_empty() {
        site_title.clone()
    } else {
        format!("{} | {}", html_escape(page_title), site_title)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<meta name="description" content="{description}">
<title>{full_title}</title>
<link rel="stylesheet" href="/assets/style.css">
</head>
<body>
<header class="site-header">
<nav class="site-nav">
<a class="site-title" href="/">{site_title}</a>
<a href="/">Home</a>
<a href="/about">About</a>
<a href="/contact">Contact</a>
</nav>
</header>
<main>
{body}
</main>
<footer class="site-footer">
<p>&copy; {author}</p>
</footer>
</body>
</html>
"#,
        description = html_escape(&config.description),
        full_title = full_title,
        site_title = site_title,
        body = body,
        author = html_escape(&config.author),
    )
}

/// Home page: the post listing
pub fn home_page(config: &SiteConfig, posts: &[PostSummary]) -> String {
    let mut body = String::new();

    body.push_str(&format!(
        "<header>\n<h1>{}</h1>\n<p>{}</p>\n</header>\n",
        html_escape(&config.title),
        html_escape(&config.description),
    ));

    if posts.is_empty() {
        body.push_str(
            "<div class=\"empty-state\"><p>No posts found. Check back later!</p></div>\n",
        );
        return layout(config, "", &body);
    }

    body.push_str("<section class=\"post-list\">\n");
    for post in posts {
        body.push_str(&post_card(post));
    }
    body.push_str("</section>\n");

    layout(config, "", &body)
}

/// One article card in the home listing
fn post_card(post: &PostSummary) -> String {
    let href = format!("/blog/{}", html_escape(&post.slug));
    let mut card = String::from("<article>\n");

    if let Some(cover) = post.cover.as_deref().filter(|c| !c.trim().is_empty()) {
        card.push_str(&format!(
            "<a href=\"{}\" class=\"post-cover\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></a>\n",
            href,
            html_escape(cover),
            html_escape(&post.title),
        ));
    }

    card.push_str(&format!(
        "<time datetime=\"{}\">{}</time>\n<h2><a href=\"{}\">{}</a></h2>\n",
        html_escape(&post.date),
        html_escape(&display_date(&post.date)),
        href,
        html_escape(&post.title),
    ));

    if !post.excerpt.is_empty() {
        // Excerpts come from the authoring source and may carry markup
        let teaser = truncate(&strip_html(&post.excerpt), 200, None);
        card.push_str(&format!("<p>{}</p>\n", html_escape(&teaser)));
    }

    card.push_str(&format!(
        "<p><a class=\"read-more\" href=\"{}\">Read more &rarr;</a></p>\n</article>\n",
        href
    ));
    card
}

/// Post detail page: chrome plus the already-rendered body
///
/// `body_html` is the sanitized renderer output and is embedded as-is;
/// everything else is escaped here.
pub fn post_page(
    config: &SiteConfig,
    post: &PostDetail,
    body_html: &str,
    siblings: &[PostSummary],
) -> String {
    let mut body = String::from("<article class=\"post\">\n");

    if let Some(cover) = post.cover.as_deref().filter(|c| !c.trim().is_empty()) {
        body.push_str(&format!(
            "<div class=\"post-cover\"><img src=\"{}\" alt=\"{}\"></div>\n",
            html_escape(cover),
            html_escape(&post.title),
        ));
    }

    body.push_str(&format!(
        "<div class=\"post-meta\">\n<time datetime=\"{}\">{}</time>\n<h1>{}</h1>\n</div>\n",
        html_escape(&post.date),
        html_escape(&display_date(&post.date)),
        html_escape(&post.title),
    ));

    body.push_str(&format!(
        "<div class=\"post-body\">\n{}</div>\n</article>\n",
        body_html
    ));

    body.push_str(&article_list(siblings, &post.slug));

    layout(config, &post.title, &body)
}

/// Sibling navigation shown under a post
fn article_list(posts: &[PostSummary], current_slug: &str) -> String {
    let mut items = String::new();
    for post in posts.iter().filter(|p| p.slug != current_slug) {
        items.push_str(&format!(
            "<li>{}</li>\n",
            link_to(&format!("/blog/{}", post.slug), &post.title)
        ));
    }
    if items.is_empty() {
        return String::new();
    }
    format!(
        "<aside class=\"article-list\">\n<h2>More articles</h2>\n<ul>\n{}</ul>\n</aside>\n",
        items
    )
}

/// Static about page
pub fn about_page(config: &SiteConfig) -> String {
    let body = format!(
        "<h1>About Me</h1>\n<p>{}</p>\n",
        html_escape(&config.description)
    );
    layout(config, "About", &body)
}

/// Contact page, with optional submission outcome banner
pub fn contact_page(config: &SiteConfig, outcome: Option<ContactOutcome>) -> String {
    let mut body = String::from("<h1>Contact Me</h1>\n");

    match outcome {
        Some(ContactOutcome::Submitted) => {
            body.push_str(
                "<div class=\"flash-success\"><p>Thanks! Your message has been sent.</p></div>\n",
            );
        }
        Some(ContactOutcome::Failed) => {
            body.push_str(
                "<div class=\"flash-error\"><p>Sorry, your message could not be sent. Please try again.</p></div>\n",
            );
        }
        None => {
            body.push_str(
                "<p>I&#39;m always open to discussing new projects, creative ideas, or opportunities. Drop me a line below.</p>\n",
            );
        }
    }

    body.push_str(
        r#"<form class="contact-form" method="post" action="/contact">
<label for="name">Name</label>
<input id="name" name="name" type="text" required>
<label for="email">Email</label>
<input id="email" name="email" type="email" required>
<label for="message">Message</label>
<textarea id="message" name="message" rows="6" required></textarea>
<button type="submit">Send</button>
</form>
"#,
    );

    layout(config, "Contact", &body)
}

/// Not-found page for unknown slugs
pub fn not_found_page(config: &SiteConfig) -> String {
    let body = "<h1>Post not found</h1>\n<p>The post you are looking for does not exist \
                or has been unpublished.</p>\n<p><a href=\"/\">&larr; Back to all posts</a></p>\n";
    layout(config, "Not Found", body)
}
