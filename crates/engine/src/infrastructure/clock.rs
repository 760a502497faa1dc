//! Clock and random implementations.

use crate::infrastructure::ports::{ClockPort, RandomPort};
use chrono::{DateTime, Local};
use rand::Rng;
use uuid::Uuid;

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// System random - uses real randomness.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }

    fn gen_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::new_v4()
    }
}

/// ISO-8601 local time with microseconds and no offset, e.g. `2025-03-14T09:30:00.000000`.
pub fn local_timestamp(now: DateTime<Local>) -> String {
    now.naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Local>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Fixed random for testing: `gen_range` yields `.0` clamped into range,
/// `gen_unit` always yields `.1`.
#[cfg(test)]
pub struct FixedRandom(pub i32, pub f64);

#[cfg(test)]
impl RandomPort for FixedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        self.0.clamp(min, max.max(min))
    }

    fn gen_unit(&self) -> f64 {
        self.1
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::nil()
    }
}

/// Reproducible random source for statistical tests.
#[cfg(test)]
pub struct SeededRandom(std::sync::Mutex<rand::rngs::StdRng>);

#[cfg(test)]
impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(std::sync::Mutex::new(rand::rngs::StdRng::seed_from_u64(seed)))
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut rand::rngs::StdRng) -> T) -> T {
        let mut rng = self.0.lock().unwrap_or_else(|p| p.into_inner());
        f(&mut rng)
    }
}

#[cfg(test)]
impl RandomPort for SeededRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        if min >= max {
            return min;
        }
        self.with_rng(|rng| rng.gen_range(min..=max))
    }

    fn gen_unit(&self) -> f64 {
        self.with_rng(|rng| rng.gen::<f64>())
    }

    fn gen_uuid(&self) -> Uuid {
        Uuid::from_u128(self.with_rng(|rng| rng.gen::<u128>()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{choose, uniform};

    #[test]
    fn system_random_respects_inclusive_bounds() {
        let random = SystemRandom::new();
        for _ in 0..200 {
            let v = random.gen_range(-1, 2);
            assert!((-1..=2).contains(&v));
        }
        assert_eq!(random.gen_range(5, 5), 5);
        assert_eq!(random.gen_range(7, 3), 7);
    }

    #[test]
    fn choose_and_uniform_helpers() {
        let random = FixedRandom(1, 0.5);
        assert_eq!(choose(&random, &["a", "b", "c"]), Some(&"b"));
        assert_eq!(choose::<&str>(&random, &[]), None);
        assert_eq!(uniform(&random, 80.0, 120.0), 100.0);
    }

    #[test]
    fn seeded_random_is_reproducible() {
        let a = SeededRandom::new(7);
        let b = SeededRandom::new(7);
        let xs: Vec<i32> = (0..10).map(|_| a.gen_range(0, 100)).collect();
        let ys: Vec<i32> = (0..10).map(|_| b.gen_range(0, 100)).collect();
        assert_eq!(xs, ys);
    }
}
