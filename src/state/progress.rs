//! Fetch progress tracking and reporting

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Snapshot of fetch progress: how many requests finished out of how many
///
/// `fraction` is carried separately from the counts: while the total is
/// still growing it is held at the highest value already reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressState {
    pub completed: usize,
    pub total: usize,
    fraction: f64,
}

impl ProgressState {
    pub fn new(completed: usize, total: usize) -> Self {
        let fraction = if total == 0 {
            1.0
        } else {
            completed as f64 / total as f64
        };
        Self {
            completed,
            total,
            fraction,
        }
    }

    /// Completed share in `[0.0, 1.0]`; an empty run counts as done
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn is_done(&self) -> bool {
        self.completed == self.total
    }
}

/// Completion counter owned by the single task that consumes fetch results
///
/// A tracker is either created with a fixed total, or opened with an
/// unknown one that is raised as work is submitted. An open tracker never
/// reports done; `close` marks the point where no more work can arrive.
#[derive(Debug)]
pub struct ProgressTracker {
    completed: usize,
    total: usize,
    open: bool,
    floor: f64,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            completed: 0,
            total,
            open: false,
            floor: 0.0,
        }
    }

    /// Tracker whose total is not known yet
    pub fn open() -> Self {
        Self {
            open: true,
            ..Self::new(0)
        }
    }

    /// Raises the total to cover newly submitted work
    pub fn submitted(&mut self, total: usize) {
        self.total = self.total.max(total);
    }

    /// No more work will be submitted
    pub fn close(&mut self) {
        self.open = false;
    }

    /// Records one finished request and returns the new snapshot
    pub fn complete_one(&mut self) -> ProgressState {
        self.completed += 1;
        let state = self.state();
        self.floor = state.fraction;
        state
    }

    pub fn state(&self) -> ProgressState {
        let total = if self.open {
            self.total.max(self.completed + 1)
        } else {
            self.total.max(self.completed)
        };
        let mut state = ProgressState::new(self.completed, total);
        state.fraction = state.fraction.max(self.floor);
        state
    }
}

/// Receives a snapshot every time one request completes
pub trait ProgressReporter: Send + Sync {
    fn report(&self, state: ProgressState);
}

impl<F> ProgressReporter for F
where
    F: Fn(ProgressState) + Send + Sync,
{
    fn report(&self, state: ProgressState) {
        self(state)
    }
}

/// Discards every report
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _state: ProgressState) {}
}

/// Logs progress through `tracing` once per crossed tenth
#[derive(Debug, Default)]
pub struct LogProgress {
    last_decile: AtomicUsize,
}

impl ProgressReporter for LogProgress {
    fn report(&self, state: ProgressState) {
        let decile = ((state.fraction() * 10.0).floor() as usize).min(10);
        let previous = self.last_decile.fetch_max(decile, Ordering::Relaxed);
        if decile > previous {
            tracing::info!(
                "Fetched {}/{} articles ({}%)",
                state.completed,
                state.total,
                decile * 10
            );
        }
    }
}

/// Redraws a single-line progress bar on a terminal stream
pub struct BarProgress<W: Write + Send> {
    out: Mutex<W>,
    width: usize,
}

impl BarProgress<std::io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(std::io::stderr(), 50)
    }
}

impl<W: Write + Send> BarProgress<W> {
    pub fn new(out: W, width: usize) -> Self {
        Self {
            out: Mutex::new(out),
            width,
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<W: Write + Send> ProgressReporter for BarProgress<W> {
    fn report(&self, state: ProgressState) {
        let line = render_bar(state, self.width);
        if let Ok(mut out) = self.out.lock() {
            let _ = write!(out, "\r{}", line);
            if state.is_done() {
                let _ = writeln!(out);
            }
            let _ = out.flush();
        }
    }
}

/// Renders `Percent: [████    ] 50%` for the given snapshot
pub fn render_bar(state: ProgressState, width: usize) -> String {
    let fraction = state.fraction();
    let filled = ((fraction * width as f64).round() as usize).min(width);
    format!(
        "Percent: [{}{}] {}%",
        "█".repeat(filled),
        " ".repeat(width - filled),
        (fraction * 100.0).round() as u32
    )
}
