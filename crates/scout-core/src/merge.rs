//! Fusing a listing-page result with an article-page result.
//!
//! Listing pages carry the site chrome, featured images and article links;
//! article pages carry the body and bylines. Each field has a fixed rule for
//! which side wins.

use crate::models::{DiscoveryResult, SelectorCandidate};

/// Merge `main` (listing page) with `article` (article page).
pub fn merge(main: &DiscoveryResult, article: &DiscoveryResult) -> DiscoveryResult {
    DiscoveryResult {
        title: pick(&main.title, &article.title, prefer_article_title),
        body: pick(&main.body, &article.body, article_if_found),
        author: pick(&main.author, &article.author, article_if_found),
        published_time: pick(&main.published_time, &article.published_time, article_if_found),
        image: pick(&main.image, &article.image, prefer_article_image),
        link: pick(&main.link, &article.link, prefer_article_link),
        category: pick(&main.category, &article.category, prefer_article_category),
        exclusions: main.exclusions.clone(),
    }
}

fn pick(
    main: &SelectorCandidate,
    article: &SelectorCandidate,
    prefer_article: fn(&SelectorCandidate, &SelectorCandidate) -> bool,
) -> SelectorCandidate {
    if prefer_article(main, article) {
        article.clone()
    } else {
        main.clone()
    }
}

fn prefer_article_title(main: &SelectorCandidate, article: &SelectorCandidate) -> bool {
    article.confidence > main.confidence || main.is_empty()
}

fn article_if_found(_main: &SelectorCandidate, article: &SelectorCandidate) -> bool {
    !article.is_empty()
}

fn prefer_article_category(main: &SelectorCandidate, article: &SelectorCandidate) -> bool {
    !article.is_empty() && article.confidence > main.confidence
}

fn prefer_article_image(main: &SelectorCandidate, article: &SelectorCandidate) -> bool {
    main.is_empty() || main.confidence <= article.confidence
}

fn prefer_article_link(main: &SelectorCandidate, _article: &SelectorCandidate) -> bool {
    main.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Field;

    fn candidate(field: Field, selector: &str, confidence: f64) -> SelectorCandidate {
        let mut c = SelectorCandidate::empty(field);
        c.record(selector, confidence, selector);
        c
    }

    fn listing() -> DiscoveryResult {
        DiscoveryResult {
            title: candidate(Field::Title, "h1.title", 0.75),
            body: candidate(Field::Body, ".post-content", 0.85),
            author: candidate(Field::Author, ".author", 0.80),
            published_time: candidate(Field::PublishedTime, ".date", 0.75),
            image: candidate(Field::Image, r#"meta[property="og:image"]"#, 0.95),
            link: candidate(Field::Link, "a.card", 0.70),
            category: candidate(Field::Category, ".category", 0.75),
            exclusions: vec!["nav".into(), "footer".into()],
        }
    }

    fn article_page() -> DiscoveryResult {
        DiscoveryResult {
            title: candidate(Field::Title, "article h1", 0.95),
            body: candidate(Field::Body, "article", 0.95),
            author: candidate(Field::Author, r#"meta[name="author"]"#, 0.95),
            published_time: candidate(Field::PublishedTime, "time[datetime]", 0.90),
            image: candidate(Field::Image, "article img[src]", 0.85),
            link: candidate(Field::Link, "a.related", 0.70),
            category: candidate(Field::Category, r#"meta[property="article:section"]"#, 0.90),
            exclusions: vec!["aside".into()],
        }
    }

    #[test]
    fn test_merge_prefers_each_side_per_field() {
        let merged = merge(&listing(), &article_page());

        assert_eq!(merged.title.selectors, vec!["article h1"]);
        assert_eq!(merged.body.selectors, vec!["article"]);
        assert_eq!(merged.author.confidence, 0.95);
        assert_eq!(merged.published_time.selectors, vec!["time[datetime]"]);
        assert_eq!(merged.image.selectors, vec![r#"meta[property="og:image"]"#]);
        assert_eq!(merged.link.selectors, vec!["a.card"]);
        assert_eq!(merged.category.confidence, 0.90);
        assert_eq!(merged.exclusions, vec!["nav", "footer"]);
    }

    #[test]
    fn test_merge_with_empty_article_returns_main() {
        let main = listing();
        let merged = merge(&main, &DiscoveryResult::empty());
        assert_eq!(merged, main);
    }

    #[test]
    fn test_merge_with_empty_main_takes_article() {
        let article = article_page();
        let merged = merge(&DiscoveryResult::empty(), &article);

        assert_eq!(merged.title, article.title);
        assert_eq!(merged.body, article.body);
        assert_eq!(merged.image, article.image);
        assert_eq!(merged.link, article.link);
        assert_eq!(merged.category, article.category);
        assert!(merged.exclusions.is_empty());
    }

    #[test]
    fn test_title_tie_keeps_main() {
        let mut main = listing();
        main.title = candidate(Field::Title, "h1.headline", 0.95);
        let merged = merge(&main, &article_page());
        assert_eq!(merged.title.selectors, vec!["h1.headline"]);
    }

    #[test]
    fn test_category_requires_strictly_higher_confidence() {
        let mut article = article_page();
        article.category = candidate(Field::Category, ".section-name", 0.75);
        let merged = merge(&listing(), &article);
        assert_eq!(merged.category.selectors, vec![".category"]);
    }

    #[test]
    fn test_image_main_kept_only_when_strictly_better() {
        let mut main = listing();
        main.image = candidate(Field::Image, "figure img[src]", 0.85);
        let merged = merge(&main, &DiscoveryResult::empty());
        assert_eq!(merged.image.selectors, vec!["figure img[src]"]);

        let mut article = article_page();
        article.image = candidate(Field::Image, r#"meta[name="twitter:image"]"#, 0.85);
        let merged = merge(&main, &article);
        assert_eq!(
            merged.image.selectors,
            vec![r#"meta[name="twitter:image"]"#]
        );
    }

    #[test]
    fn test_article_fields_ignore_confidence() {
        let mut article = article_page();
        article.body = candidate(Field::Body, ".story-body", 0.85);
        let mut main = listing();
        main.body = candidate(Field::Body, "article", 0.95);

        let merged = merge(&main, &article);
        assert_eq!(merged.body.selectors, vec![".story-body"]);
    }
}
