//! Human-readable run summary

use crate::crawler::{CrawlReport, Termination};
use std::fmt::Write;

/// Formats the summary printed after a crawl
pub fn format_summary(report: &CrawlReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Crawl Summary: {} ===\n", report.category);

    if let Some(discovery) = &report.discovery {
        let _ = writeln!(out, "Discovery:");
        let _ = writeln!(out, "  Listing pages read: {}", discovery.pages_visited);
        let _ = writeln!(out, "  Article URLs found: {}", discovery.urls_found);
        let _ = writeln!(out, "  Stopped: {}", describe(&discovery.termination));
        let _ = writeln!(out);
    }

    let fetch = &report.fetch;
    let _ = writeln!(out, "Fetching:");
    let _ = writeln!(out, "  Requested: {}", fetch.submitted);
    let _ = writeln!(out, "  Succeeded: {}", fetch.succeeded);
    let _ = writeln!(out, "  Failed: {}", fetch.failed);
    if fetch.cancelled > 0 {
        let _ = writeln!(out, "  Cancelled: {}", fetch.cancelled);
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Parsing ({} layout):", report.layout);
    let _ = writeln!(out, "  Records: {}", report.records.len());
    let _ = writeln!(out, "  Rejected: {}", report.parse_failures);
    let _ = writeln!(out);

    let yield_rate = if fetch.submitted > 0 {
        (report.records.len() as f64 / fetch.submitted as f64) * 100.0
    } else {
        0.0
    };
    let _ = write!(
        out,
        "Yield: {:.1}% ({} / {} URLs) in {}s",
        yield_rate,
        report.records.len(),
        fetch.submitted,
        report.duration().num_seconds()
    );
    if report.cancelled {
        let _ = write!(out, " (cancelled)");
    }
    let _ = writeln!(out);

    out
}

/// Prints the run summary to stdout
pub fn print_summary(report: &CrawlReport) {
    print!("{}", format_summary(report));
}

fn describe(termination: &Termination) -> String {
    match termination {
        Termination::Exhausted { page } => format!("page {} added no new URLs", page),
        Termination::PageLimit { page } => format!("page limit reached at page {}", page),
        Termination::Cancelled { page } => format!("cancelled at page {}", page),
        Termination::Failed(error) => format!("failed at page {}: {}", error.page(), error),
    }
}
