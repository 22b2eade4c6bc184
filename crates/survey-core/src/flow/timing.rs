//! Time source and per-step elapsed-time bookkeeping.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::IntoEnumIterator;

use super::step::Step;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Whole seconds from `from` to `to`, never negative.
pub fn whole_seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    u64::try_from((to - from).num_seconds()).unwrap_or(0)
}

/// Accumulated seconds per step. Every step has an entry from the start and
/// entries only ever grow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepTimings(BTreeMap<Step, u64>);

impl Default for StepTimings {
    fn default() -> Self {
        Self(Step::iter().map(|step| (step, 0)).collect())
    }
}

impl StepTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, step: Step) -> u64 {
        self.0.get(&step).copied().unwrap_or(0)
    }

    pub fn add(&mut self, step: Step, seconds: u64) {
        *self.0.entry(step).or_insert(0) += seconds;
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Step, u64)> + '_ {
        self.0.iter().map(|(step, secs)| (*step, *secs))
    }
}
