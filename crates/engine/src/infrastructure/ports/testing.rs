//! Testability ports for injecting time and randomness.

use chrono::{DateTime, Local};
use uuid::Uuid;

// =============================================================================
// Testability Ports
// =============================================================================

#[cfg_attr(test, mockall::automock)]
pub trait ClockPort: Send + Sync {
    /// Server-local wall-clock time; timestamps are reported without converting to UTC.
    fn now(&self) -> DateTime<Local>;
}

#[cfg_attr(test, mockall::automock)]
pub trait RandomPort: Send + Sync {
    /// Uniform integer in `min..=max`.
    fn gen_range(&self, min: i32, max: i32) -> i32;
    /// Uniform float in `[0, 1)`.
    fn gen_unit(&self) -> f64;
    fn gen_uuid(&self) -> Uuid;
}

/// Pick one element uniformly, `None` for an empty slice.
pub fn choose<'a, T>(random: &dyn RandomPort, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let last = i32::try_from(items.len() - 1).unwrap_or(i32::MAX);
    let index = random.gen_range(0, last).clamp(0, last) as usize;
    items.get(index)
}

/// Uniform float in `[min, max)`.
pub fn uniform(random: &dyn RandomPort, min: f64, max: f64) -> f64 {
    min + random.gen_unit().clamp(0.0, 1.0) * (max - min)
}

/// `true` with the given probability.
pub fn chance(random: &dyn RandomPort, probability: f64) -> bool {
    random.gen_unit() < probability
}
