//! Fixed registry of simulated sensors.

use crate::telemetry::data::SensorReading;
use crate::telemetry::sensor::TireSensor;
use chrono::{DateTime, Utc};
use rand::Rng;

/// Owns the fixed fleet of [`TireSensor`]s for the lifetime of the process.
///
/// Membership is set once at construction; there is no hot-add or removal.
/// Enumeration order is stable (construction order).
#[derive(Debug)]
pub struct SensorRegistry {
    sensors: Vec<TireSensor>,
}

impl SensorRegistry {
    /// Create one sensor per configured position.
    pub fn new<I, S>(positions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_rng(positions, &mut rand::thread_rng())
    }

    /// Like [`SensorRegistry::new`] but with a caller-supplied RNG.
    pub fn with_rng<I, S, R>(positions: I, rng: &mut R) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        R: Rng + ?Sized,
    {
        let now = Utc::now();
        let sensors = positions
            .into_iter()
            .map(|position| TireSensor::with_rng(position, rng, now))
            .collect();

        Self { sensors }
    }

    /// Advance every sensor by one tick, in registry order, producing one
    /// snapshot batch stamped with a single tick timestamp.
    pub fn advance_all(&mut self, now: DateTime<Utc>) -> Vec<SensorReading> {
        self.sensors
            .iter_mut()
            .map(|sensor| sensor.advance(now))
            .collect()
    }

    /// Current readings for all sensors without advancing state.
    pub fn readings(&self) -> Vec<SensorReading> {
        self.sensors
            .iter()
            .map(|sensor| sensor.current().clone())
            .collect()
    }

    /// Look up one sensor's current reading by id.
    pub fn get(&self, id: &str) -> Option<&SensorReading> {
        self.sensors
            .iter()
            .find(|sensor| sensor.id() == id)
            .map(|sensor| sensor.current())
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_SENSOR_POSITIONS;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn registry() -> SensorRegistry {
        let mut rng = StdRng::seed_from_u64(21);
        SensorRegistry::with_rng(DEFAULT_SENSOR_POSITIONS, &mut rng)
    }

    #[test]
    fn default_fleet_has_four_wheel_positions() {
        let registry = registry();
        assert_eq!(registry.len(), 4);

        let positions: Vec<String> = registry
            .readings()
            .into_iter()
            .map(|r| r.position)
            .collect();
        assert_eq!(
            positions,
            vec!["Front Left", "Front Right", "Rear Left", "Rear Right"]
        );
    }

    #[test]
    fn enumeration_order_is_stable_across_ticks() {
        let mut registry = registry();
        let ids: Vec<String> = registry.readings().iter().map(|r| r.id.clone()).collect();

        for _ in 0..10 {
            let batch = registry.advance_all(Utc::now());
            let tick_ids: Vec<String> = batch.iter().map(|r| r.id.clone()).collect();
            assert_eq!(tick_ids, ids);
        }
    }

    #[test]
    fn batch_shares_one_tick_timestamp() {
        let mut registry = registry();
        let now = Utc::now();
        let batch = registry.advance_all(now);
        assert!(batch.iter().all(|r| r.last_update == now));
    }

    #[test]
    fn lookup_by_id() {
        let registry = registry();
        let first = &registry.readings()[0];

        let found = registry.get(&first.id).expect("sensor should exist");
        assert_eq!(found.position, first.position);

        assert!(registry.get("no-such-sensor").is_none());
    }

    #[test]
    fn sensor_ids_are_unique() {
        let registry = registry();
        let mut ids: Vec<String> = registry.readings().iter().map(|r| r.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), registry.len());
    }
}
