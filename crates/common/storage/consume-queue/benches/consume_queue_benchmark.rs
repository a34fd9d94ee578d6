// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Benchmarks for the consume queue index over the in-memory store.
//!
//! Measures:
//! - Key encoding with and without a scratch buffer
//! - Staging and committing dispatched units
//! - Range reads of different lengths
//! - Physical offset search

use std::{hint::black_box, sync::Arc};

use consume_queue::{
    ConsumeQueueTable, ConsumeQueueTableBuilder, DispatchRequest, KvStore, MemStore, UnitScratch,
    key,
};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

const TOPIC: &str = "bench-topic";

/// Units preloaded for read benchmarks.
const PRELOAD: u64 = 100_000;

/// Range lengths to benchmark.
const RANGE_SIZES: &[usize] = &[1, 32, 256, 1024];

fn request(offset: u64) -> DispatchRequest {
    DispatchRequest {
        topic:                TOPIC.to_string(),
        queue_id:             0,
        consume_queue_offset: offset,
        commit_log_offset:    offset * 256,
        msg_size:             256,
        tags_code:            0,
        store_timestamp:      0,
    }
}

fn preloaded_table() -> ConsumeQueueTable<MemStore> {
    let table = ConsumeQueueTableBuilder::new(Arc::new(MemStore::new())).build();
    let mut scratch = UnitScratch::with_topic_capacity(TOPIC.len());
    let mut batch = table.store().new_batch();
    for offset in 0..PRELOAD {
        table
            .append_dispatch(&mut scratch, &request(offset), &mut batch)
            .expect("append");
    }
    table.store().commit(batch).expect("commit");
    table
}

fn bench_encode_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_key");

    group.bench_function("allocating", |b| {
        b.iter(|| key::encode_key(black_box(TOPIC.as_bytes()), 0, black_box(42)))
    });

    group.bench_function("scratch", |b| {
        let mut buf = Vec::new();
        b.iter(|| {
            key::encode_key_into(&mut buf, black_box(TOPIC.as_bytes()), 0, black_box(42))
                .map(<[u8]>::len)
        })
    });

    group.finish();
}

fn bench_append_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("append_commit");

    for &batch_size in &[1u64, 32, 1024] {
        group.throughput(Throughput::Elements(batch_size));
        group.bench_with_input(
            BenchmarkId::from_parameter(batch_size),
            &batch_size,
            |b, &batch_size| {
                b.iter_batched(
                    || ConsumeQueueTableBuilder::new(Arc::new(MemStore::new())).build(),
                    |table| {
                        let mut scratch = UnitScratch::new();
                        let mut batch = table.store().new_batch();
                        for offset in 0..batch_size {
                            table
                                .append_dispatch(&mut scratch, &request(offset), &mut batch)
                                .expect("append");
                        }
                        table.store().commit(batch).expect("commit");
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

fn bench_range_get(c: &mut Criterion) {
    let table = preloaded_table();
    let mut group = c.benchmark_group("range_get");

    for &size in RANGE_SIZES {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| table.range_get(TOPIC, 0, black_box(PRELOAD / 2), size).expect("range"))
        });
    }

    group.finish();
}

fn bench_find_boundary(c: &mut Criterion) {
    let table = preloaded_table();

    c.bench_function("find_boundary_by_physical_offset", |b| {
        b.iter(|| {
            table
                .find_boundary_by_physical_offset(
                    TOPIC,
                    0,
                    0,
                    PRELOAD - 1,
                    black_box(77_777 * 256),
                    true,
                )
                .expect("search")
        })
    });
}

criterion_group!(
    benches,
    bench_encode_key,
    bench_append_commit,
    bench_range_get,
    bench_find_boundary,
);
criterion_main!(benches);
