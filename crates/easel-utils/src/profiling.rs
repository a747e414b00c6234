//! Timing spans for load and scan diagnostics.

use std::time::{Duration, Instant};

/// Measures a labelled stretch of work and reports it through [`tracing`].
#[derive(Debug)]
pub struct SpanTimer {
    label: &'static str,
    start: Instant,
    reported: bool,
}

impl SpanTimer {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
            reported: false,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Ends the span and reports its duration at debug level.
    pub fn finish(mut self) -> Duration {
        let duration = self.start.elapsed();
        tracing::debug!(target: "easel::profiling", label = self.label, elapsed = ?duration, "span finished");
        self.reported = true;
        duration
    }
}

impl Drop for SpanTimer {
    fn drop(&mut self) {
        if !self.reported {
            let duration = self.start.elapsed();
            tracing::trace!(target: "easel::profiling", label = self.label, elapsed = ?duration, "span dropped");
        }
    }
}

/// Runs `f` inside a span and returns its result with the elapsed time.
pub fn timed<R>(label: &'static str, f: impl FnOnce() -> R) -> (R, Duration) {
    let span = SpanTimer::new(label);
    let result = f();
    (result, span.finish())
}
