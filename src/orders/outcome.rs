//! Pure latency/outcome computation for one simulated order.
//!
//! # Responsibilities
//! - Derive prep time from (region, recipe version) plus jitter
//! - Decide whether the order ends in a refund, and why
//! - No I/O and no clock access; the caller applies the delay
//!
//! # Design Decisions
//! - "east" is the designated slow region; "v1.4" is the known-bad release
//! - Jitter spans -20..=+39 ms. The range is deliberately asymmetric and the
//!   statistical tests depend on it; do not recentre it.

use rand::Rng;

/// Region that gets the higher base prep time.
pub const SLOW_REGION: &str = "east";

/// Recipe version that regressed in the slow region.
pub const DEGRADED_VERSION: &str = "v1.4";

/// Region assumed when a request does not specify one.
pub const DEFAULT_REGION: &str = "west";

const BASE_PREP_MS: i64 = 90;
const SLOW_BASE_PREP_MS: i64 = 140;
const DEGRADED_PENALTY_MS: i64 = 260;
const MIN_PREP_MS: i64 = 20;

const DEGRADED_REFUND_RATE: f64 = 0.28;
const BASELINE_REFUND_RATE: f64 = 0.03;

/// Source of uniform draws in [0, 1).
///
/// Production uses the thread-local generator; tests inject scripted draws to
/// hit every penalty/refund branch deterministically.
pub trait RandomSource: Send + Sync {
    fn next_unit(&self) -> f64;
}

/// Thread-local RNG backed source used outside tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Why an order was refunded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefundReason {
    None,
    UndercookedChicken,
    LateDelivery,
}

impl RefundReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefundReason::None => "none",
            RefundReason::UndercookedChicken => "undercooked_chicken",
            RefundReason::LateDelivery => "late_delivery",
        }
    }
}

/// Outcome of one simulated order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationResult {
    /// Simulated prep latency, always >= 20ms.
    pub prep_time_ms: u64,
    pub refunded: bool,
    pub reason: RefundReason,
}

/// Compute latency and refund outcome for one order.
///
/// Consumes exactly two draws from `rng`: one for jitter, one for the refund
/// roll.
pub fn simulate(region: &str, recipe_version: &str, rng: &dyn RandomSource) -> SimulationResult {
    let degraded = recipe_version == DEGRADED_VERSION && region == SLOW_REGION;

    let mut base = if region == SLOW_REGION {
        SLOW_BASE_PREP_MS
    } else {
        BASE_PREP_MS
    };
    if degraded {
        base += DEGRADED_PENALTY_MS;
    }

    // floor(u * 60) - 20 keeps the historical -20..=+39 range.
    let jitter = (rng.next_unit() * 60.0).floor() as i64 - 20;
    let prep_time_ms = (base + jitter).max(MIN_PREP_MS) as u64;

    let roll = rng.next_unit();
    let (refunded, reason) = if degraded && roll < DEGRADED_REFUND_RATE {
        (true, RefundReason::UndercookedChicken)
    } else if !degraded && roll < BASELINE_REFUND_RATE {
        (true, RefundReason::LateDelivery)
    } else {
        (false, RefundReason::None)
    };

    SimulationResult {
        prep_time_ms,
        refunded,
        reason,
    }
}

/// Scripted random source for deterministic tests.
#[cfg(test)]
pub(crate) struct ScriptedRandom {
    draws: std::sync::Mutex<std::collections::VecDeque<f64>>,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(draws: &[f64]) -> Self {
        Self {
            draws: std::sync::Mutex::new(draws.iter().copied().collect()),
        }
    }
}

#[cfg(test)]
impl RandomSource for ScriptedRandom {
    fn next_unit(&self) -> f64 {
        self.draws
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted draws exhausted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    // unit draw of 20/60 maps to zero jitter
    const ZERO_JITTER: f64 = 20.0 / 60.0;
    const NO_REFUND: f64 = 0.99;

    struct SeededRandom(Mutex<StdRng>);

    impl RandomSource for SeededRandom {
        fn next_unit(&self) -> f64 {
            self.0.lock().unwrap().gen::<f64>()
        }
    }

    #[test]
    fn base_latency_is_90_outside_slow_region() {
        let rng = ScriptedRandom::new(&[ZERO_JITTER, NO_REFUND]);
        let result = simulate("west", "v1.0", &rng);
        assert_eq!(result.prep_time_ms, 90);
        assert!(!result.refunded);
        assert_eq!(result.reason, RefundReason::None);
    }

    #[test]
    fn slow_region_base_latency_is_140() {
        let rng = ScriptedRandom::new(&[ZERO_JITTER, NO_REFUND]);
        let result = simulate("east", "v1.0", &rng);
        assert_eq!(result.prep_time_ms, 140);
    }

    #[test]
    fn degraded_release_in_slow_region_adds_penalty() {
        let rng = ScriptedRandom::new(&[ZERO_JITTER, NO_REFUND]);
        let result = simulate("east", "v1.4", &rng);
        assert_eq!(result.prep_time_ms, 400);
    }

    #[test]
    fn degraded_release_outside_slow_region_is_unpenalized() {
        let rng = ScriptedRandom::new(&[ZERO_JITTER, NO_REFUND]);
        let result = simulate("west", "v1.4", &rng);
        assert_eq!(result.prep_time_ms, 90);
    }

    #[test]
    fn jitter_range_is_asymmetric() {
        let low = simulate("west", "v1.0", &ScriptedRandom::new(&[0.0, NO_REFUND]));
        assert_eq!(low.prep_time_ms, 70, "minimum jitter is -20");

        let high = simulate(
            "west",
            "v1.0",
            &ScriptedRandom::new(&[0.999_999, NO_REFUND]),
        );
        assert_eq!(high.prep_time_ms, 129, "maximum jitter is +39");
    }

    #[test]
    fn latency_never_drops_below_floor() {
        for region in ["west", "east", "north"] {
            for version in ["v1.0", "v1.4"] {
                let rng = ScriptedRandom::new(&[0.0, NO_REFUND]);
                let result = simulate(region, version, &rng);
                assert!(result.prep_time_ms >= 20);
            }
        }
    }

    #[test]
    fn degraded_refund_reason_is_undercooked_chicken() {
        let rng = ScriptedRandom::new(&[ZERO_JITTER, 0.27]);
        let result = simulate("east", "v1.4", &rng);
        assert!(result.refunded);
        assert_eq!(result.reason, RefundReason::UndercookedChicken);
    }

    #[test]
    fn degraded_roll_at_threshold_does_not_refund() {
        let rng = ScriptedRandom::new(&[ZERO_JITTER, 0.28]);
        let result = simulate("east", "v1.4", &rng);
        assert!(!result.refunded);
    }

    #[test]
    fn baseline_refund_reason_is_late_delivery() {
        let rng = ScriptedRandom::new(&[ZERO_JITTER, 0.029]);
        let result = simulate("west", "v1.0", &rng);
        assert!(result.refunded);
        assert_eq!(result.reason, RefundReason::LateDelivery);
    }

    #[test]
    fn baseline_roll_at_threshold_does_not_refund() {
        let rng = ScriptedRandom::new(&[ZERO_JITTER, 0.03]);
        let result = simulate("west", "v1.0", &rng);
        assert!(!result.refunded);
        assert_eq!(result.reason, RefundReason::None);
    }

    #[test]
    fn degraded_refund_rate_is_near_28_percent() {
        let rng = SeededRandom(Mutex::new(StdRng::seed_from_u64(7)));
        let trials = 100_000;
        let refunds = (0..trials)
            .filter(|_| simulate("east", "v1.4", &rng).refunded)
            .count();
        let rate = refunds as f64 / trials as f64;
        assert!((rate - 0.28).abs() < 0.01, "observed rate {rate}");
    }

    #[test]
    fn baseline_refund_rate_is_near_3_percent() {
        let rng = SeededRandom(Mutex::new(StdRng::seed_from_u64(11)));
        let trials = 100_000;
        let refunds = (0..trials)
            .filter(|_| simulate("west", "v1.0", &rng).refunded)
            .count();
        let rate = refunds as f64 / trials as f64;
        assert!((rate - 0.03).abs() < 0.01, "observed rate {rate}");
    }
}
