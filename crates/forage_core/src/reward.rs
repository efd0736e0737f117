//! Wheel-spin experience counter.
//!
//! # Responsibility
//! - Hold the session's accumulated experience total.
//! - Gate spins behind a cooldown window.
//!
//! # Invariants
//! - Each spin adds a uniform integer in `SPIN_GAIN_MIN..=SPIN_GAIN_MAX`.
//! - The total starts at zero and is never persisted.
//! - The counter is owned state; share it through `SharedRewardCounter` when
//!   more than one flow mutates it.

use crate::service::navigation::NavigationSignal;
use log::debug;
use rand::Rng;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

pub const SPIN_GAIN_MIN: u32 = 1;
pub const SPIN_GAIN_MAX: u32 = 5;
/// Minimum time between two spins.
pub const SPIN_COOLDOWN: Duration = Duration::from_secs(10);
/// Progress bar capacity used by the detail screen.
pub const DEFAULT_PROGRESS_MAX: u32 = 100;

/// Display data for the experience progress bar.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardProgress {
    pub current: u32,
    pub max: u32,
    /// Fill ratio clamped to `[0.0, 1.0]`.
    pub fraction: f32,
    /// `"<current>/<max>"`.
    pub label: String,
}

/// Accumulated experience for one app session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewardCounter {
    total: u32,
}

impl RewardCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a random gain using the thread-local RNG and returns the new total.
    pub fn spin(&mut self) -> u32 {
        self.spin_with(&mut rand::thread_rng())
    }

    /// Adds a random gain drawn from `rng` and returns the new total.
    pub fn spin_with<R: Rng>(&mut self, rng: &mut R) -> u32 {
        self.spin_gain(rng);
        self.total
    }

    /// Adds a random gain drawn from `rng` and returns the drawn gain.
    ///
    /// The gain stays in range even once the total saturates at `u32::MAX`.
    pub fn spin_gain<R: Rng>(&mut self, rng: &mut R) -> u32 {
        let gained = rng.gen_range(SPIN_GAIN_MIN..=SPIN_GAIN_MAX);
        self.total = self.total.saturating_add(gained);
        debug!(
            "event=reward_spin module=reward status=ok gained={gained} total={}",
            self.total
        );
        gained
    }

    pub fn current(&self) -> u32 {
        self.total
    }

    /// Progress bar data against `max`; a zero `max` reads as empty.
    pub fn progress(&self, max: u32) -> RewardProgress {
        let fraction = if max == 0 {
            0.0
        } else {
            (self.total as f32 / max as f32).min(1.0)
        };
        RewardProgress {
            current: self.total,
            max,
            fraction,
            label: format!("{}/{}", self.total, max),
        }
    }
}

/// Counter shared by several flows; mutations are serialized by a mutex.
#[derive(Debug, Clone, Default)]
pub struct SharedRewardCounter {
    inner: Arc<Mutex<RewardCounter>>,
}

impl SharedRewardCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spin(&self) -> u32 {
        self.with(RewardCounter::spin)
    }

    pub fn current(&self) -> u32 {
        self.with(|counter| counter.current())
    }

    pub fn progress(&self, max: u32) -> RewardProgress {
        self.with(|counter| counter.progress(max))
    }

    /// Runs `f` with exclusive access to the counter.
    pub fn with<T>(&self, f: impl FnOnce(&mut RewardCounter) -> T) -> T {
        // A plain integer cannot be left half-updated, so poisoning is ignored.
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }
}

/// Enables the spin action only after the cooldown elapsed.
#[derive(Debug, Clone)]
pub struct SpinCooldown {
    window: Duration,
    last_spin: Option<Instant>,
}

impl Default for SpinCooldown {
    fn default() -> Self {
        Self::new(SPIN_COOLDOWN)
    }
}

impl SpinCooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_spin: None,
        }
    }

    /// Whether a spin is allowed at `now`.
    pub fn is_ready(&self, now: Instant) -> bool {
        match self.last_spin {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.window,
        }
    }

    /// Time left before the next spin is allowed.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last_spin {
            None => Duration::ZERO,
            Some(last) => self
                .window
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }

    pub fn record(&mut self, now: Instant) {
        self.last_spin = Some(now);
    }
}

/// Spin action: cooldown gate plus counter update.
#[derive(Debug, Clone, Default)]
pub struct WheelSpin {
    counter: SharedRewardCounter,
    cooldown: SpinCooldown,
}

impl WheelSpin {
    pub fn new(counter: SharedRewardCounter, cooldown: SpinCooldown) -> Self {
        Self { counter, cooldown }
    }

    pub fn counter(&self) -> &SharedRewardCounter {
        &self.counter
    }

    pub fn is_ready(&self, now: Instant) -> bool {
        self.cooldown.is_ready(now)
    }

    /// Spins at `now` using `rng`.
    ///
    /// Returns `None` while the cooldown is active; the counter is untouched.
    pub fn spin_at<R: Rng>(&mut self, now: Instant, rng: &mut R) -> Option<NavigationSignal> {
        if !self.cooldown.is_ready(now) {
            debug!(
                "event=reward_spin module=reward status=cooldown remaining_ms={}",
                self.cooldown.remaining(now).as_millis()
            );
            return None;
        }
        let (gained, total) = self.counter.with(|counter| {
            let gained = counter.spin_gain(rng);
            (gained, counter.current())
        });
        self.cooldown.record(now);
        Some(NavigationSignal::SpinCompleted { gained, total })
    }

    /// Spins now with the thread-local RNG.
    pub fn spin(&mut self) -> Option<NavigationSignal> {
        self.spin_at(Instant::now(), &mut rand::thread_rng())
    }
}

#[cfg(test)]
mod tests {
    use super::{
        RewardCounter, SharedRewardCounter, SpinCooldown, WheelSpin, SPIN_GAIN_MAX, SPIN_GAIN_MIN,
    };
    use crate::service::navigation::NavigationSignal;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    #[test]
    fn saturated_total_still_reports_drawn_gain() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut counter = RewardCounter { total: u32::MAX - 1 };
        for _ in 0..20 {
            let gained = counter.spin_gain(&mut rng);
            assert!((SPIN_GAIN_MIN..=SPIN_GAIN_MAX).contains(&gained));
        }
        assert_eq!(counter.current(), u32::MAX);

        let shared = SharedRewardCounter {
            inner: Arc::new(Mutex::new(counter)),
        };
        let mut wheel = WheelSpin::new(shared, SpinCooldown::new(Duration::from_secs(10)));
        let signal = wheel.spin_at(Instant::now(), &mut rng);
        let Some(NavigationSignal::SpinCompleted { gained, total }) = signal else {
            panic!("expected SpinCompleted, got {signal:?}");
        };
        assert!((SPIN_GAIN_MIN..=SPIN_GAIN_MAX).contains(&gained));
        assert_eq!(total, u32::MAX);
    }

    #[test]
    fn spin_adds_gain_within_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut counter = RewardCounter::new();
        for _ in 0..200 {
            let before = counter.current();
            let after = counter.spin_with(&mut rng);
            let gained = after - before;
            assert!((SPIN_GAIN_MIN..=SPIN_GAIN_MAX).contains(&gained));
            assert_eq!(counter.current(), after);
        }
    }

    #[test]
    fn progress_label_and_fraction_are_clamped() {
        let mut counter = RewardCounter::new();
        assert_eq!(counter.progress(100).label, "0/100");
        assert_eq!(counter.progress(0).fraction, 0.0);

        let mut rng = StdRng::seed_from_u64(1);
        while counter.current() <= 10 {
            counter.spin_with(&mut rng);
        }
        let progress = counter.progress(10);
        assert_eq!(progress.fraction, 1.0);
        assert_eq!(progress.label, format!("{}/10", counter.current()));
    }

    #[test]
    fn cooldown_blocks_until_window_passes() {
        let start = Instant::now();
        let mut cooldown = SpinCooldown::new(Duration::from_secs(10));
        assert!(cooldown.is_ready(start));

        cooldown.record(start);
        assert!(!cooldown.is_ready(start + Duration::from_secs(5)));
        assert_eq!(
            cooldown.remaining(start + Duration::from_secs(4)),
            Duration::from_secs(6)
        );
        assert!(cooldown.is_ready(start + Duration::from_millis(10_001)));
    }

    #[test]
    fn wheel_spin_reports_gain_and_respects_cooldown() {
        let start = Instant::now();
        let mut rng = StdRng::seed_from_u64(42);
        let mut wheel = WheelSpin::default();

        let signal = wheel.spin_at(start, &mut rng).expect("first spin allowed");
        let NavigationSignal::SpinCompleted { gained, total } = signal else {
            panic!("unexpected signal: {signal:?}");
        };
        assert!((SPIN_GAIN_MIN..=SPIN_GAIN_MAX).contains(&gained));
        assert_eq!(total, gained);
        assert_eq!(wheel.counter().current(), total);

        assert!(wheel.spin_at(start + Duration::from_secs(1), &mut rng).is_none());
        assert_eq!(wheel.counter().current(), total);
        assert!(wheel
            .spin_at(start + Duration::from_secs(11), &mut rng)
            .is_some());
    }
}
