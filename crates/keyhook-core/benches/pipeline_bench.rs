//! Criterion benchmarks for the hook callback hot path.
//!
//! Everything measured here runs inside the OS hook callback, which the OS
//! abandons if it does not return promptly.
//!
//! Run with:
//! ```bash
//! cargo bench --package keyhook-core --bench pipeline_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use keyhook_core::keymap::vk::{VK_HOME, VK_LSHIFT};
use keyhook_core::{
    bounded, resolve_key_name, HookPipeline, KeyEventSink, KeyNameLookup, KeyStateSource,
    RawKeyInput,
};

// ── Fixtures ──────────────────────────────────────────────────────────────────

struct BenchKeyboard;

impl KeyStateSource for BenchKeyboard {
    fn is_key_down(&self, vk: u32) -> bool {
        vk == VK_LSHIFT
    }
}

impl KeyNameLookup for BenchKeyboard {
    fn key_name_text(&self, scan_code: u32) -> Option<String> {
        (scan_code == 0x1E).then(|| "A".to_string())
    }
}

// ── Benchmarks: key name resolution ──────────────────────────────────────────

fn bench_resolve_key_name(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_key_name");

    group.bench_function("table_hit", |b| {
        b.iter(|| resolve_key_name(black_box(VK_HOME), black_box(0x47), &BenchKeyboard))
    });

    group.bench_function("os_text_fallback", |b| {
        b.iter(|| resolve_key_name(black_box(0x41), black_box(0x1E), &BenchKeyboard))
    });

    group.bench_function("unresolvable", |b| {
        b.iter(|| resolve_key_name(black_box(0xE8), black_box(0x00), &BenchKeyboard))
    });

    group.finish();
}

// ── Benchmarks: full callback ────────────────────────────────────────────────

fn bench_pipeline_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    group.bench_function("key_down_up_pair", |b| {
        let mut pipeline = HookPipeline::default();
        let down = RawKeyInput::key_down(0x41, 0x1E);
        let up = RawKeyInput::key_up(0x41, 0x1E);
        b.iter(|| {
            let d = pipeline.process(black_box(&down), &BenchKeyboard, &BenchKeyboard);
            let u = pipeline.process(black_box(&up), &BenchKeyboard, &BenchKeyboard);
            (d, u)
        })
    });

    group.bench_function("sink_submit_into_full_channel", |b| {
        // Capacity 1, never drained: every iteration after the first takes the drop path
        let (tx, _rx) = bounded(1);
        let mut sink = KeyEventSink::new(HookPipeline::default(), tx);
        let up = RawKeyInput::key_up(VK_HOME, 0x47);
        b.iter(|| sink.handle(black_box(&up), &BenchKeyboard, &BenchKeyboard))
    });

    group.finish();
}

criterion_group!(benches, bench_resolve_key_name, bench_pipeline_process);
criterion_main!(benches);
