use scout_core::links::article_urls;
use scout_core::{DiscoveryEngine, Document, Field, merge};
use url::Url;

use crate::common::{ARTICLES, SITE, article_page, listing_page};

#[test]
fn listing_page_yields_article_links_and_chrome() {
    let result = DiscoveryEngine::new()
        .discover_html(&listing_page(), &format!("{SITE}/"))
        .unwrap();

    assert_eq!(result.link.selectors, vec!["a.story-card"]);
    assert_eq!(result.link.sample_text, "/news/budget");
    assert!(result.link.needs_review());

    // The only h1 is the masthead, found by the bare fallback.
    assert_eq!(result.title.selectors, vec!["h1"]);
    assert_eq!(result.title.confidence, 0.70);

    assert!(result.body.is_empty());
    assert_eq!(
        result.exclusions,
        vec!["script", "nav", "header", "footer", ".cookie-banner"]
    );
}

#[test]
fn merged_result_combines_both_pages() {
    let engine = DiscoveryEngine::new();
    let main = engine
        .discover_html(&listing_page(), &format!("{SITE}/"))
        .unwrap();
    let article = engine
        .discover_html(
            &article_page("Council approves budget", "Sam Reporter"),
            &format!("{SITE}/news/budget"),
        )
        .unwrap();

    let merged = merge(&main, &article);

    assert_eq!(merged.title.selectors[0], "article h1");
    assert_eq!(merged.title.confidence, 0.95);
    assert_eq!(merged.body.confidence, 0.95);
    assert_eq!(merged.author.sample_text, "By Sam Reporter");
    assert_eq!(merged.published_time.sample_text, "2024-06-01T09:00:00Z");
    assert_eq!(merged.category.sample_text, "Local");
    assert_eq!(merged.link.selectors, vec!["a.story-card"]);
    assert_eq!(merged.exclusions, main.exclusions);
    assert_eq!(merged.fields_needing_review(), vec![Field::Link]);
}

#[test]
fn article_urls_are_harvested_from_listing() {
    let doc = Document::parse(&listing_page());
    let base = Url::parse(&format!("{SITE}/")).unwrap();
    let urls = article_urls(&doc, &base, 10);

    let expected: Vec<String> = ARTICLES
        .iter()
        .map(|(slug, _, _)| format!("{SITE}/news/{slug}"))
        .collect();
    assert_eq!(urls, expected);
}

#[test]
fn discovery_output_serializes_to_json() {
    let result = DiscoveryEngine::new()
        .discover_html(&listing_page(), &format!("{SITE}/"))
        .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["link"]["field"], "link");
    assert_eq!(json["published_time"]["field"], "published_time");
    assert_eq!(json["link"]["confidence"], 0.70);
}
