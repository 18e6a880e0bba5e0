use chrono::NaiveDateTime;
use criterion::{criterion_group, criterion_main, Criterion};
use pprof::{
    criterion::{Output, PProfProfiler},
    flamegraph::Options,
};

use hyperbench_core::{FieldValue, Record, Schema, StoreClient, TIMESTAMP_FORMAT};

// Requires a running TimescaleDB:
//   host=localhost user=postgres password=postgres dbname=postgres

const NUM_ITEMS: u64 = 1000;
const CONNINFO: &str = "host=localhost user=postgres password=postgres dbname=postgres";

fn wallet_record(i: u64) -> Record {
    let base = NaiveDateTime::parse_from_str("2020-10-02 00:00:00", TIMESTAMP_FORMAT).unwrap();
    Record::new(vec![
        FieldValue::Timestamp(base + chrono::Duration::seconds(i as i64)),
        FieldValue::Text(format!("wallet{}", i % 64)),
        FieldValue::Text(format!("wallet{}", (i + 1) % 64)),
        FieldValue::BigInt((i * 1000) as i64),
    ])
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut client = StoreClient::connect(CONNINFO).unwrap();
    let schema = Schema::bitcoin_transactions().with_table("bitcoin_transactions_bench");
    client.drop_schema(&schema).unwrap();
    client.ensure_schema(&schema).unwrap();

    let records: Vec<Record> = (0..NUM_ITEMS).map(wallet_record).collect();

    c.bench_function(
        &format!("timescale: insert one-by-one 0-{}", NUM_ITEMS),
        |b| {
            b.iter(|| {
                for record in &records {
                    client.insert_one(&schema, record).unwrap();
                }
            })
        },
    );

    client.drop_schema(&schema).unwrap();
}

fn get_config() -> Criterion {
    let mut options = Options::default();
    options.flame_chart = true;
    Criterion::default().with_profiler(PProfProfiler::new(1000, Output::Flamegraph(Some(options))))
}

criterion_group!(
    name = benches;
    config = get_config();
    targets = criterion_benchmark
);
criterion_main!(benches);
