//! Knowledge about the target news archive
//!
//! This module provides:
//! - The enumerated archive sections (`Category`)
//! - Listing page URLs and article link extraction
//! - The `User-Agent` rotation pool used for every request

mod agents;
mod category;
mod listing;

pub use agents::UserAgentPool;
pub use category::{Category, UnknownCategory};
pub use listing::{extract_article_links, listing_url, resolve_link, ListingError};
