//! Monotonic counters used to generate default names.
//!
//! Each [Model](crate::Model) owns a counter by default, so two models number their
//! variables independently. Share one [NameCounter] between models (or use
//! [NameCounter::global]) when default names must be unique across all of them.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Atomically incremented counters for variables, constraints and objectives
#[derive(Debug, Default)]
pub struct NameCounter {
    variables: AtomicU64,
    constraints: AtomicU64,
    objectives: AtomicU64,
}

impl NameCounter {
    /// Counters starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// A counter shared by the whole process
    pub fn global() -> Arc<NameCounter> {
        static GLOBAL: OnceLock<Arc<NameCounter>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(NameCounter::new())))
    }

    /// Returns the next variable number and increments the counter
    pub fn next_variable(&self) -> u64 {
        self.variables.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the next constraint number and increments the counter
    pub fn next_constraint(&self) -> u64 {
        self.constraints.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the next objective number and increments the counter
    pub fn next_objective(&self) -> u64 {
        self.objectives.fetch_add(1, Ordering::Relaxed)
    }
}
