use std::collections::HashMap;
use std::sync::Arc;

use scout_core::AppError;
use scout_core::Fetcher;

pub const SITE: &str = "https://daily.test";

/// Serves a small fixed news site from memory.
#[derive(Clone)]
pub struct SiteFetcher {
    pages: Arc<HashMap<String, String>>,
}

impl SiteFetcher {
    pub fn new() -> Self {
        let mut pages = HashMap::new();
        pages.insert(format!("{SITE}/"), listing_page());
        for (slug, title, author) in ARTICLES {
            pages.insert(
                format!("{SITE}/news/{slug}"),
                article_page(title, author),
            );
        }
        Self {
            pages: Arc::new(pages),
        }
    }
}

impl Fetcher for SiteFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::HttpError(format!("HTTP 404 for {url}")))
    }
}

pub const ARTICLES: [(&str, &str, &str); 3] = [
    ("budget", "Council approves budget", "Sam Reporter"),
    ("bridge", "Bridge reopens after repairs", "Ana Writer"),
    ("festival", "Summer festival draws record crowd", "Lee Editor"),
];

pub fn listing_page() -> String {
    let cards: String = ARTICLES
        .iter()
        .map(|(slug, title, _)| {
            format!(
                r#"<div class="teaser"><a class="story-card" href="/news/{slug}">{title}</a></div>"#
            )
        })
        .collect();
    format!(
        r#"<html><head>
            <title>Daily Test</title>
            <meta property="og:image" content="https://cdn.daily.test/logo.png">
            <script>window.ads = [];</script>
        </head><body>
            <header><h1 class="site-name">Daily Test</h1></header>
            <nav><a href="/">Home</a><a href="/about">About</a></nav>
            <main>{cards}</main>
            <div class="cookie-banner">We use cookies</div>
            <footer>&copy; Daily Test</footer>
        </body></html>"#
    )
}

pub fn article_page(title: &str, author: &str) -> String {
    let paragraph = "The story continues with plenty of detail about the event. ".repeat(12);
    format!(
        r#"<html><head>
            <title>{title} | Daily Test</title>
            <meta property="og:title" content="{title}">
            <meta property="og:image" content="https://cdn.daily.test/{title}.jpg">
            <meta property="article:section" content="Local">
        </head><body>
            <nav><a href="/">Home</a></nav>
            <article>
                <h1>{title}</h1>
                <span class="byline">By {author}</span>
                <time datetime="2024-06-01T09:00:00Z">June 1</time>
                <div class="article-body"><p>{paragraph}</p></div>
            </article>
            <aside class="related-articles"><a class="related" href="/news/budget">More</a></aside>
            <footer>&copy; Daily Test</footer>
        </body></html>"#
    )
}
