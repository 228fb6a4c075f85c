use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rand::{Rng, SeedableRng};
use sprite_packer_core::prelude::*;
use std::hint::black_box;

fn generate_requests(count: usize, min_size: u32, max_size: u32) -> Vec<Request<usize>> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5eed);
    (0..count)
        .map(|i| {
            let w = rng.gen_range(min_size..=max_size);
            let h = rng.gen_range(min_size..=max_size);
            Request::new(w, h, i).with_label(format!("sprite_{i}"))
        })
        .collect()
}

fn bench_single_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_page");

    for count in [100, 500, 2000] {
        let requests = generate_requests(count, 4, 32);
        group.throughput(Throughput::Elements(count as u64));

        group.bench_with_input(
            BenchmarkId::new("pack_as_many_as_possible", count),
            &requests,
            |b, requests| {
                b.iter(|| black_box(pack_as_many_as_possible(1, 2048, 2048, requests.clone())));
            },
        );

        group.bench_with_input(BenchmarkId::new("pack_all", count), &requests, |b, requests| {
            b.iter(|| black_box(pack_all(1, 2048, 2048, requests)));
        });
    }

    group.finish();
}

fn bench_paging(c: &mut Criterion) {
    let mut group = c.benchmark_group("paging");
    group.sample_size(20);

    let requests = generate_requests(3000, 8, 96);
    group.throughput(Throughput::Elements(requests.len() as u64));

    for (name, search) in [
        ("none", SizeSearch::None),
        ("pow2", SizeSearch::Pow2),
        ("exact", SizeSearch::Exact),
    ] {
        let cfg = PackerConfig::builder()
            .max_size(1024)
            .margin(1)
            .size_search(search)
            .build();
        group.bench_with_input(BenchmarkId::new("pack_pages", name), &requests, |b, requests| {
            b.iter(|| black_box(pack_pages(requests.clone(), &cfg)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_single_page, bench_paging);
criterion_main!(benches);
