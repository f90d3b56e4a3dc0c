use scout_core::validation::NullReporter;
use scout_core::{ArticleSelectors, DiscoveryEngine, Field, SelectorValidator, merge};
use tokio_util::sync::CancellationToken;

use crate::common::{ARTICLES, SITE, SiteFetcher, article_page, listing_page};

fn discovered_selectors() -> ArticleSelectors {
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
    ArticleSelectors::from(&merge(&main, &article))
}

fn article_urls() -> Vec<String> {
    ARTICLES
        .iter()
        .map(|(slug, _, _)| format!("{SITE}/news/{slug}"))
        .collect()
}

#[tokio::test]
async fn discovered_selectors_validate_on_sibling_articles() {
    let validator = SelectorValidator::new(SiteFetcher::new());
    let result = validator
        .validate(
            &discovered_selectors(),
            &article_urls(),
            10,
            &CancellationToken::new(),
            &NullReporter,
        )
        .await
        .unwrap();

    assert_eq!(result.total_articles, 3);
    assert_eq!(result.successful_articles, 3);
    assert_eq!(result.overall_success_rate(), 100.0);

    let title = result.field(Field::Title).unwrap();
    assert_eq!(title.success_rate, 100.0);
    let mut samples = title.sample_values.clone();
    samples.sort();
    let mut expected: Vec<String> = ARTICLES.iter().map(|(_, t, _)| t.to_string()).collect();
    expected.sort();
    assert_eq!(samples, expected);

    let body = result.field(Field::Body).unwrap();
    assert!(body.sample_values.iter().all(|s| s.chars().count() <= 100));

    for r in result.field_results.values() {
        assert_eq!(r.failed_urls.len(), r.total_count - r.success_count);
    }
}

#[tokio::test]
async fn missing_pages_fail_without_aborting() {
    let mut urls = article_urls();
    urls.insert(1, format!("{SITE}/news/deleted"));

    let validator = SelectorValidator::new(SiteFetcher::new());
    let result = validator
        .validate(
            &discovered_selectors(),
            &urls,
            10,
            &CancellationToken::new(),
            &NullReporter,
        )
        .await
        .unwrap();

    assert_eq!(result.total_articles, 4);
    assert_eq!(result.successful_articles, 3);
    for r in result.field_results.values() {
        assert!(r.failed_urls.contains(&format!("{SITE}/news/deleted")));
    }
    assert_eq!(result.field(Field::Title).unwrap().success_rate, 75.0);
}

#[tokio::test]
async fn report_round_trips_through_json() {
    let validator = SelectorValidator::new(SiteFetcher::new());
    let result = validator
        .validate(
            &ArticleSelectors::default().with(Field::Title, "article h1"),
            &article_urls(),
            2,
            &CancellationToken::new(),
            &NullReporter,
        )
        .await
        .unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let back: scout_core::ValidationResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back, result);
    assert_eq!(back.total_articles, 2);
}
