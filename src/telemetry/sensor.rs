//! Per-sensor simulation model and severity classification.

use crate::telemetry::data::{SensorReading, TireStatus};
use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

/// Domain bounds for simulated values.
pub const PRESSURE_MIN: f64 = 20.0;
pub const PRESSURE_MAX: f64 = 40.0;
pub const TEMPERATURE_MIN: f64 = 15.0;
pub const TEMPERATURE_MAX: f64 = 45.0;
pub const TREAD_DEPTH_MIN: f64 = 1.0;
pub const TREAD_DEPTH_MAX: f64 = 10.0;

/// Ordered severity rules, first match wins.
///
/// The order is load-bearing: pressure is checked for critical before
/// warning, and both pressure bands shadow the temperature and tread rules.
/// A tire that is simultaneously pressure-critical and tread-critical
/// reports critical via the pressure rule; a tire in the pressure warning
/// band reports warning even if its tread is below the critical threshold.
/// The `pressure > 40` arm is retained although the domain clamp makes it
/// unreachable.
const CLASSIFICATION_RULES: &[(fn(f64, f64, f64) -> bool, TireStatus)] = &[
    (|p, _, _| p < 25.0 || p > 40.0, TireStatus::Critical),
    (|p, _, _| p < 28.0 || p > 38.0, TireStatus::Warning),
    (|_, t, _| t > 40.0, TireStatus::Warning),
    (|_, _, d| d < 1.6, TireStatus::Critical),
    (|_, _, d| d < 3.0, TireStatus::Warning),
];

/// Classify a reading's numeric values into a severity band.
///
/// Pure function over post-clamp values; evaluates the ordered rule list and
/// returns the first match, or `Normal` when no rule fires.
pub fn classify(pressure: f64, temperature: f64, tread_depth: f64) -> TireStatus {
    for (rule, status) in CLASSIFICATION_RULES {
        if rule(pressure, temperature, tread_depth) {
            return *status;
        }
    }
    TireStatus::Normal
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One simulated tire sensor.
///
/// Owns exactly one evolving [`SensorReading`] and the logic to advance it.
/// All numeric paths are total over clamped domains; advancing a sensor
/// cannot fail.
#[derive(Debug, Clone)]
pub struct TireSensor {
    reading: SensorReading,
}

impl TireSensor {
    /// Create a sensor at the given mount position with randomized initial
    /// values inside the healthy sub-ranges.
    pub fn new(position: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self::with_rng(position, &mut rand::thread_rng(), now)
    }

    /// Like [`TireSensor::new`] but with a caller-supplied RNG, so tests can
    /// run the simulation deterministically.
    pub fn with_rng<R: Rng + ?Sized>(
        position: impl Into<String>,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Self {
        let pressure = round2(rng.gen_range(30.0..35.0));
        let temperature = round2(rng.gen_range(20.0..30.0));
        let tread_depth = round2(rng.gen_range(6.0..10.0));

        Self {
            reading: SensorReading {
                id: Uuid::new_v4().to_string(),
                position: position.into(),
                pressure,
                temperature,
                tread_depth,
                status: classify(pressure, temperature, tread_depth),
                last_update: now,
            },
        }
    }

    /// Advance the simulation by one tick and return the new reading.
    pub fn advance(&mut self, now: DateTime<Utc>) -> SensorReading {
        self.advance_with_rng(&mut rand::thread_rng(), now)
    }

    /// Advance with a caller-supplied RNG.
    ///
    /// Pressure and temperature each take a small symmetric random step;
    /// tread depth takes a one-sided decrement (wear never reverses within a
    /// session). Values are clamped to their domains and rounded to two
    /// decimals before classification, so the stored status always agrees
    /// with the stored values.
    pub fn advance_with_rng<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> SensorReading {
        let r = &mut self.reading;

        r.pressure = round2((r.pressure + rng.gen_range(-0.5..0.5)).clamp(PRESSURE_MIN, PRESSURE_MAX));
        r.temperature =
            round2((r.temperature + rng.gen_range(-1.0..1.0)).clamp(TEMPERATURE_MIN, TEMPERATURE_MAX));
        r.tread_depth =
            round2((r.tread_depth - rng.gen_range(0.0..0.01)).clamp(TREAD_DEPTH_MIN, TREAD_DEPTH_MAX));

        r.status = classify(r.pressure, r.temperature, r.tread_depth);
        r.last_update = now;

        r.clone()
    }

    /// The last-produced reading, without advancing state.
    ///
    /// Used when a new subscriber joins and has missed prior ticks.
    pub fn current(&self) -> &SensorReading {
        &self.reading
    }

    pub fn id(&self) -> &str {
        &self.reading.id
    }

    pub fn position(&self) -> &str {
        &self.reading.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn classification_follows_ordered_rules() {
        // Spec examples for the rule order.
        assert_eq!(classify(24.0, 20.0, 8.0), TireStatus::Critical);
        assert_eq!(classify(33.0, 42.0, 8.0), TireStatus::Warning);
        assert_eq!(classify(33.0, 20.0, 1.5), TireStatus::Critical);

        // Boundaries.
        assert_eq!(classify(25.0, 20.0, 8.0), TireStatus::Warning);
        assert_eq!(classify(28.0, 20.0, 8.0), TireStatus::Normal);
        assert_eq!(classify(38.5, 20.0, 8.0), TireStatus::Warning);
        assert_eq!(classify(33.0, 40.0, 8.0), TireStatus::Normal);
        assert_eq!(classify(33.0, 20.0, 1.6), TireStatus::Warning);
        assert_eq!(classify(33.0, 20.0, 3.0), TireStatus::Normal);
        assert_eq!(classify(33.0, 20.0, 8.0), TireStatus::Normal);
    }

    #[test]
    fn pressure_rules_shadow_tread_rules() {
        // Pressure-critical wins over tread-critical.
        assert_eq!(classify(24.0, 20.0, 1.2), TireStatus::Critical);
        // Pressure-warning fires first even though the tread is critical.
        assert_eq!(classify(26.0, 20.0, 1.2), TireStatus::Warning);
        // Temperature-warning fires before the tread-critical rule.
        assert_eq!(classify(33.0, 41.0, 1.2), TireStatus::Warning);
    }

    #[test]
    fn initial_values_are_healthy() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let sensor = TireSensor::with_rng("Front Left", &mut rng, Utc::now());
            let r = sensor.current();
            assert!(r.pressure >= 30.0 && r.pressure <= 35.0);
            assert!(r.temperature >= 20.0 && r.temperature <= 30.0);
            assert!(r.tread_depth >= 6.0 && r.tread_depth <= 10.0);
            assert_eq!(r.status, classify(r.pressure, r.temperature, r.tread_depth));
        }
    }

    #[test]
    fn values_stay_in_bounds_over_many_ticks() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut sensor = TireSensor::with_rng("Rear Right", &mut rng, Utc::now());

        for _ in 0..10_000 {
            let r = sensor.advance_with_rng(&mut rng, Utc::now());
            assert!(r.pressure >= PRESSURE_MIN && r.pressure <= PRESSURE_MAX);
            assert!(r.temperature >= TEMPERATURE_MIN && r.temperature <= TEMPERATURE_MAX);
            assert!(r.tread_depth >= TREAD_DEPTH_MIN && r.tread_depth <= TREAD_DEPTH_MAX);
        }
    }

    #[test]
    fn tread_depth_never_increases() {
        let mut rng = StdRng::seed_from_u64(1234);
        let mut sensor = TireSensor::with_rng("Front Right", &mut rng, Utc::now());
        let mut previous = sensor.current().tread_depth;

        for _ in 0..10_000 {
            let r = sensor.advance_with_rng(&mut rng, Utc::now());
            assert!(r.tread_depth <= previous, "tread wear reversed");
            previous = r.tread_depth;
        }
    }

    #[test]
    fn readings_are_rounded_to_two_decimals() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut sensor = TireSensor::with_rng("Front Left", &mut rng, Utc::now());

        for _ in 0..100 {
            let r = sensor.advance_with_rng(&mut rng, Utc::now());
            for value in [r.pressure, r.temperature, r.tread_depth] {
                assert_eq!(round2(value), value);
            }
        }
    }

    #[test]
    fn status_is_consistent_with_stored_values() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sensor = TireSensor::with_rng("Rear Left", &mut rng, Utc::now());

        for _ in 0..1_000 {
            let r = sensor.advance_with_rng(&mut rng, Utc::now());
            assert_eq!(r.status, classify(r.pressure, r.temperature, r.tread_depth));
        }
    }

    #[test]
    fn identity_is_stable_across_ticks() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut sensor = TireSensor::with_rng("Front Left", &mut rng, Utc::now());
        let id = sensor.id().to_string();

        sensor.advance_with_rng(&mut rng, Utc::now());
        sensor.advance_with_rng(&mut rng, Utc::now());

        assert_eq!(sensor.id(), id);
        assert_eq!(sensor.position(), "Front Left");
    }

    #[test]
    fn current_does_not_advance_state() {
        let mut rng = StdRng::seed_from_u64(3);
        let sensor = TireSensor::with_rng("Front Left", &mut rng, Utc::now());
        let before = sensor.current().clone();
        assert_eq!(sensor.current(), &before);
    }
}
