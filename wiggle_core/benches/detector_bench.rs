use criterion::{black_box, criterion_group, criterion_main, Criterion};
use wiggle_core::classifier::classify;
use wiggle_core::config::WiggleConfig;
use wiggle_core::driver::POLL_INTERVAL;
use wiggle_core::motion::MotionTracker;
use wiggle_core::types::{ObjectId, SurfaceId, TrackKey, Vec2};

/// Fill a tracker with `n` objects, each shaking along x for one window.
fn warm_tracker(n: u64, config: &WiggleConfig) -> MotionTracker {
    let mut tracker = MotionTracker::new(config.time_window);
    let ticks = (config.time_window / POLL_INTERVAL) as usize;
    for obj in 0..n {
        let key = TrackKey::new(SurfaceId(0), ObjectId(obj));
        for i in 0..ticks {
            let x = if i % 2 == 0 { 25.0 } else { -25.0 };
            tracker.record(key, Vec2::new(x, obj as f64), i as f64 * POLL_INTERVAL);
        }
    }
    tracker
}

fn bench_detector(c: &mut Criterion) {
    let config = WiggleConfig::default();
    let mut group = c.benchmark_group("detector");

    for n in [1u64, 10, 100] {
        group.bench_function(format!("{n}_objects_record_classify"), |b| {
            let mut tracker = warm_tracker(n, &config);
            let mut t = config.time_window;
            b.iter(|| {
                t += POLL_INTERVAL;
                for obj in 0..n {
                    let key = TrackKey::new(SurfaceId(0), ObjectId(obj));
                    tracker.record(key, Vec2::new(t.sin() * 25.0, 0.0), t);
                    let signals = tracker.signals(&key, config.min_movement);
                    black_box(classify(signals.as_ref(), &config));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_detector);
criterion_main!(benches);
