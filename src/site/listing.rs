//! Listing page addressing and link extraction
//!
//! Archive listing pages contain one `<article class="story">` per story,
//! each wrapping a `<div class="story-content">` whose first anchor points
//! at the article. Hrefs are usually site-relative.

use crate::site::Category;
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Errors raised while reading a listing page
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListingError {
    #[error("story #{index} has no article link")]
    MissingLink { index: usize },

    #[error("story #{index} links to unusable href '{href}'")]
    BadLink { index: usize, href: String },

    #[error("invalid selector '{0}'")]
    Selector(String),
}

/// Builds the URL of one listing page
///
/// Format: `{base}/news/archive/{category}?view=page&page={n}&pageSize={size}`.
/// Any path prefix and query on the base are kept.
pub fn listing_url(base: &Url, category: Category, page: u32, page_size: u32) -> Url {
    let mut url = base.clone();
    // http(s) bases always have path segments
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(["news", "archive", category.as_str()]);
    }
    url.query_pairs_mut()
        .append_pair("view", "page")
        .append_pair("page", &page.to_string())
        .append_pair("pageSize", &page_size.to_string());
    url
}

/// Extracts absolute article URLs from a listing page, in page order
///
/// A page without any story elements yields an empty list. A story whose
/// link cannot be located fails the whole page.
pub fn extract_article_links(html: &str, base: &Url) -> Result<Vec<String>, ListingError> {
    let document = Html::parse_document(html);

    let story_selector = selector("article.story")?;
    let link_selector = selector("div.story-content a")?;

    let mut links = Vec::new();
    for (index, story) in document.select(&story_selector).enumerate() {
        let href = story
            .select(&link_selector)
            .next()
            .and_then(|anchor| anchor.value().attr("href"))
            .ok_or(ListingError::MissingLink { index })?;

        let absolute = resolve_link(href, base).ok_or_else(|| ListingError::BadLink {
            index,
            href: href.to_string(),
        })?;
        links.push(absolute);
    }

    Ok(links)
}

/// Resolves an href against the site base, keeping only http(s) targets
pub fn resolve_link(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}

fn selector(css: &str) -> Result<Selector, ListingError> {
    Selector::parse(css).map_err(|_| ListingError::Selector(css.to_string()))
}
