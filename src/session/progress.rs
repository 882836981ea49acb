//! Progress reporting back to an interactive caller.
//!
//! Fire-and-forget: the sink carries no control flow. Fractions are made
//! monotonically non-decreasing by the wrapper regardless of what the
//! pipeline reports.

use std::sync::Mutex;

pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str, fraction: f64);
}

/// Discards everything; the default for non-interactive runs.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _message: &str, _fraction: f64) {}
}

/// Clamps fractions to [0, 1] and never lets them decrease.
pub struct MonotonicProgress<'a> {
    inner: &'a dyn ProgressSink,
    last: Mutex<f64>,
}

impl<'a> MonotonicProgress<'a> {
    pub fn new(inner: &'a dyn ProgressSink) -> Self {
        Self {
            inner,
            last: Mutex::new(0.0),
        }
    }
}

impl ProgressSink for MonotonicProgress<'_> {
    fn report(&self, message: &str, fraction: f64) {
        let mut last = self.last.lock().unwrap();
        let clamped = fraction.clamp(*last, 1.0);
        *last = clamped;
        self.inner.report(message, clamped);
    }
}

#[cfg(test)]
pub(crate) struct RecordingProgress {
    pub reports: Mutex<Vec<(String, f64)>>,
}

#[cfg(test)]
impl RecordingProgress {
    pub fn new() -> Self {
        Self {
            reports: Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
impl ProgressSink for RecordingProgress {
    fn report(&self, message: &str, fraction: f64) {
        self.reports
            .lock()
            .unwrap()
            .push((message.to_string(), fraction));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_wrapper_never_regresses() {
        let recorder = RecordingProgress::new();
        let progress = MonotonicProgress::new(&recorder);
        progress.report("a", 0.2);
        progress.report("b", 0.1); // would regress
        progress.report("c", 0.9);
        progress.report("d", 2.0); // above range

        let reports = recorder.reports.lock().unwrap();
        let fractions: Vec<f64> = reports.iter().map(|(_, f)| *f).collect();
        assert_eq!(fractions, vec![0.2, 0.2, 0.9, 1.0]);
        assert!(fractions.windows(2).all(|w| w[0] <= w[1]));
    }
}
