use std::{
    fmt::Debug,
    sync::Mutex,
    sync::atomic::{AtomicBool, Ordering},
};

/// Failure-reporting capability supplied by the host test infrastructure.
///
/// `error` marks the surrounding test as failed but lets the call continue,
/// so one replay can surface several mismatches. `fatal` aborts the test.
/// The replay transport never decides test outcomes itself; policy lives
/// entirely in the reporter implementation.
pub trait Reporter: Debug {
    fn error(&self, message: &str);
    fn fatal(&self, message: &str);
}

/// Default reporter: mismatches go to stderr (and the log) and are
/// remembered in [`PanicReporter::failed`], fatal reports panic, which is
/// how a Rust test aborts. Mismatches alone don't fail the surrounding
/// test; hosts that want hard failure on any mismatch inject their own
/// [`Reporter`] or assert on `failed()` at the end of the test.
#[derive(Debug, Default)]
pub struct PanicReporter {
    failed: AtomicBool,
}

impl PanicReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any non-fatal mismatch was reported.
    pub fn failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}

impl Reporter for PanicReporter {
    fn error(&self, message: &str) {
        self.failed.store(true, Ordering::SeqCst);
        // stderr as well as the log: plain test runs have no subscriber
        eprintln!("replay mismatch: {}", message);
        tracing::error!("{}", message);
    }

    fn fatal(&self, message: &str) {
        panic!("{}", message);
    }
}

/// Accumulates reports instead of acting on them. Meant for asserting on
/// validation outcomes.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    errors: Mutex<Vec<String>>,
    fatals: Mutex<Vec<String>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().map(|errors| errors.clone()).unwrap_or_default()
    }

    pub fn fatals(&self) -> Vec<String> {
        self.fatals.lock().map(|fatals| fatals.clone()).unwrap_or_default()
    }

    pub fn is_clean(&self) -> bool {
        self.errors().is_empty() && self.fatals().is_empty()
    }
}

impl Reporter for CollectingReporter {
    fn error(&self, message: &str) {
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(message.to_string());
        }
    }

    fn fatal(&self, message: &str) {
        if let Ok(mut fatals) = self.fatals.lock() {
            fatals.push(message.to_string());
        }
    }
}
