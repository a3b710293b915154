use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tirewatch::telemetry::sensor::classify;
use tirewatch::{FeedMessage, SensorRegistry, TireSensor, DEFAULT_SENSOR_POSITIONS};

fn bench_sensor_advance(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(1);
    let mut sensor = TireSensor::with_rng("Front Left", &mut rng, Utc::now());

    c.bench_function("sensor_advance", |b| {
        b.iter(|| black_box(sensor.advance_with_rng(&mut rng, Utc::now())))
    });
}

fn bench_classification(c: &mut Criterion) {
    c.bench_function("classify", |b| {
        b.iter(|| black_box(classify(black_box(26.0), black_box(41.0), black_box(1.5))))
    });
}

fn bench_tick_batch(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(2);
    let mut registry = SensorRegistry::with_rng(DEFAULT_SENSOR_POSITIONS, &mut rng);

    c.bench_function("registry_advance_all", |b| {
        b.iter(|| black_box(registry.advance_all(Utc::now())))
    });
}

fn bench_batch_serialization(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(3);
    let registry = SensorRegistry::with_rng(DEFAULT_SENSOR_POSITIONS, &mut rng);
    let message = FeedMessage::update(registry.readings(), Utc::now());

    c.bench_function("feed_message_to_json", |b| {
        b.iter(|| black_box(message.to_json().unwrap()))
    });
}

criterion_group!(
    benches,
    bench_sensor_advance,
    bench_classification,
    bench_tick_batch,
    bench_batch_serialization
);
criterion_main!(benches);
