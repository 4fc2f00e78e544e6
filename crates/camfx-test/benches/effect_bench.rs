//! Benchmarks for effect state writes, frame tagging and scenario runs

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use std::sync::Arc;

use camfx_core::{CaptureTime, DeviceId, EffectKind, EffectState, OriginId, TrackId};
use camfx_media::{FrameTagger, RawFrame};
use camfx_state::{EffectHandle, EffectStateStore};
use camfx_test::{ScenarioConfig, ScenarioRunner};

fn bench_set_idempotent(c: &mut Criterion) {
    let (_store, mut writer) =
        EffectStateStore::create(DeviceId::new(1), EffectKind::BackgroundBlur, EffectState::Enabled);

    c.bench_function("set_idempotent", |b| {
        b.iter(|| writer.set(black_box(EffectState::Enabled)))
    });
}

fn bench_toggle_with_subscribers(c: &mut Criterion) {
    let (store, mut writer) =
        EffectStateStore::create(DeviceId::new(1), EffectKind::BackgroundBlur, EffectState::Disabled);
    let handles: Vec<EffectHandle> = (0..8)
        .map(|i| EffectHandle::attach(&store, TrackId::new(i), OriginId::new(i)))
        .collect();
    for handle in &handles {
        handle.subscribe(|_, change| {
            black_box(change.state);
        });
    }

    let mut state = EffectState::Disabled;
    c.bench_function("toggle_8_handles", |b| {
        b.iter(|| {
            state = state.toggled();
            writer.set(state)
        })
    });
}

fn bench_tag_frame(c: &mut Criterion) {
    let (store, _writer) =
        EffectStateStore::create(DeviceId::new(1), EffectKind::BackgroundBlur, EffectState::Enabled);
    let mut tagger = FrameTagger::for_store(TrackId::new(1), Arc::clone(&store));
    let payload = bytes::Bytes::from(vec![0u8; 1280 * 720 * 3 / 2]);

    c.bench_function("tag_frame", |b| {
        b.iter(|| tagger.tag(RawFrame::new(payload.clone(), CaptureTime::ZERO)))
    });
}

fn bench_scenario(c: &mut Criterion) {
    c.bench_function("scenario_light", |b| {
        b.iter(|| ScenarioRunner::new(ScenarioConfig::light()).run())
    });
}

criterion_group!(
    benches,
    bench_set_idempotent,
    bench_toggle_with_subscribers,
    bench_tag_frame,
    bench_scenario
);
criterion_main!(benches);
