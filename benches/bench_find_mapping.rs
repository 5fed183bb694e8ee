mod utils;

use criterion::{criterion_group, criterion_main, Criterion};
use kasane::SourceMap;
use mimalloc::MiMalloc;
use utils::synthetic_payload;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn benchmark_find_mapping(c: &mut Criterion) {
    let sm = SourceMap::parse(
        synthetic_payload(2048, 64),
        "https://example.com/assets/app.js.map",
    )
    .unwrap();

    {
        let mut bg = c.benchmark_group("find_entry(random)");
        let probes: Vec<(u32, u32)> = (0..64u32).map(|i| (i * 31 % 2048, i * 5)).collect();
        bg.bench_function("kasane", |b| {
            b.iter(|| {
                for &pos in &probes {
                    assert!(sm.find_entry(pos).is_some());
                }
            })
        });
    }
    {
        let mut bg = c.benchmark_group("find_entry(sequential)");
        bg.bench_function("kasane", |b| {
            b.iter(|| {
                for pos in (0..256u32).map(|col| (1024, col)) {
                    assert!(sm.find_entry(pos).is_some());
                }
            })
        });
        bg.bench_function("kasane(finder)", |b| {
            b.iter(|| {
                let finder = sm.finder();
                for pos in (0..256u32).map(|col| (1024, col)) {
                    assert!(finder.find_entry(pos).is_some());
                }
            })
        });
    }
    {
        let mut bg = c.benchmark_group("find_reverse_ranges");
        bg.bench_function("kasane", |b| {
            b.iter(|| {
                for line in 0..64u32 {
                    let ranges =
                        sm.find_reverse_ranges("https://example.com/src/mod3.ts", (line, 0));
                    drop(ranges);
                }
            })
        });
    }
}

criterion_group!(find_mapping, benchmark_find_mapping);
criterion_main!(find_mapping);
