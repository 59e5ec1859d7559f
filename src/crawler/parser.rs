//! Article page parsing
//!
//! Turns one fetched article into an `ArticleRecord`. The site has shipped
//! two article templates, so the caller chooses the layout explicitly:
//!
//! | Layout        | Title  | Date                          | Category                                   |
//! |---------------|--------|-------------------------------|--------------------------------------------|
//! | `plain`       | `h1`   | `meta[name=REVISION_DATE]`    | never                                      |
//! | `categorized` | `h1`   | `meta[name=REVISION_DATE]`    | `div.ArticleHeader-info-container-3-6YG a` |
//!
//! In both layouts the article text is every `<p>` concatenated in document
//! order with no separator. A page missing any required element is rejected
//! as a whole.

use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const TITLE_SELECTOR: &str = "h1";
const DATE_SELECTOR: &str = r#"meta[name="REVISION_DATE"]"#;
const PARAGRAPH_SELECTOR: &str = "p";
const CATEGORY_SELECTOR: &str = "div.ArticleHeader-info-container-3-6YG a";

/// One parsed article, in output column order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    /// Revision date as published in the page metadata
    #[serde(rename = "Date")]
    pub date: String,

    #[serde(rename = "Title")]
    pub title: String,

    /// Paragraph text, concatenated
    #[serde(rename = "Article")]
    pub content: String,

    /// Final URL of the fetched page
    #[serde(rename = "URL")]
    pub url: String,

    #[serde(rename = "Category")]
    pub category: Option<String>,
}

/// Why a document could not be turned into a record
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing title heading")]
    MissingTitle,

    #[error("missing revision date")]
    MissingDate,

    #[error("missing category label")]
    MissingCategory,

    #[error("invalid selector '{0}'")]
    Selector(&'static str),
}

/// Article template variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleLayout {
    /// Title, date and text; no category
    #[default]
    Plain,
    /// Title, date, text and a required breadcrumb category
    Categorized,
}

impl ArticleLayout {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleLayout::Plain => "plain",
            ArticleLayout::Categorized => "categorized",
        }
    }

    /// Parses an article body fetched from `source_url`
    pub fn parse(&self, body: &str, source_url: &str) -> Result<ArticleRecord, ParseError> {
        let document = Html::parse_document(body);

        let title = first_text(&document, TITLE_SELECTOR)?.ok_or(ParseError::MissingTitle)?;

        let date = document
            .select(&selector(DATE_SELECTOR)?)
            .find_map(|meta| meta.value().attr("content"))
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ParseError::MissingDate)?;

        let category = match self {
            ArticleLayout::Plain => None,
            ArticleLayout::Categorized => Some(
                first_text(&document, CATEGORY_SELECTOR)?.ok_or(ParseError::MissingCategory)?,
            ),
        };

        let content = document
            .select(&selector(PARAGRAPH_SELECTOR)?)
            .flat_map(|p| p.text())
            .collect::<String>();

        Ok(ArticleRecord {
            date,
            title,
            content,
            url: source_url.to_string(),
            category,
        })
    }
}

impl fmt::Display for ArticleLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArticleLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(ArticleLayout::Plain),
            "categorized" => Ok(ArticleLayout::Categorized),
            other => Err(format!(
                "unknown layout '{}' (expected 'plain' or 'categorized')",
                other
            )),
        }
    }
}

/// Trimmed text of the first element matching `css`, if non-empty
fn first_text(document: &Html, css: &'static str) -> Result<Option<String>, ParseError> {
    Ok(document
        .select(&selector(css)?)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty()))
}

fn selector(css: &'static str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|_| ParseError::Selector(css))
}
