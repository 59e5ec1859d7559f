//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `ProgressState`: completed/total snapshot handed to reporters
//! - `ProgressTracker`: the counter owned by the fetch aggregator
//! - `ProgressReporter`: sink for snapshots (log lines, terminal bar, closures)
//! - `DiscoveredUrls`: the growing set of article URLs found by pagination

mod discovered;
mod progress;

pub use discovered::DiscoveredUrls;

pub use progress::{
    render_bar, BarProgress, LogProgress, NoProgress, ProgressReporter, ProgressState,
    ProgressTracker,
};
