use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use address_engine_config::MatcherConfig;
use address_engine_matching::FuzzyScanner;

fn alias_table(size: usize) -> HashMap<String, Vec<String>> {
    let mut keys: HashMap<String, Vec<String>> = HashMap::new();
    for i in 0..size {
        keys.insert(format!("TOWNNAME{i:04}"), vec!["XX".to_string()]);
    }
    keys.insert("FRANCE".to_string(), vec!["FR".to_string()]);
    keys.insert("PARIS".to_string(), vec!["FR".to_string(), "US".to_string()]);
    keys
}

fn bench_scan_batch(c: &mut Criterion) {
    let keys = alias_table(1000);
    let scanner = FuzzyScanner::new(MatcherConfig::default()).unwrap();
    let texts: Vec<String> = (0..64)
        .map(|i| format!("{i} RUE DE RIVOLI\nAPPT {i}\n75001 PARIS\nFRANCE"))
        .collect();

    c.bench_function("scan_batch_64_texts_1000_keys", |b| {
        b.iter(|| black_box(scanner.scan_batch(black_box(&texts), black_box(&keys))))
    });
}

fn bench_scan_exact(c: &mut Criterion) {
    let keys = alias_table(1000);
    let scanner = FuzzyScanner::new(MatcherConfig::default()).unwrap();
    let text = "42 AVENUE DES CHAMPS ELYSEES\n75008 PARIS\nFRANCE".to_string();

    c.bench_function("scan_text_exact_1000_keys", |b| {
        b.iter(|| black_box(scanner.scan_text_with(black_box(&text), black_box(&keys), 100.0, 0)))
    });
}

criterion_group!(benches, bench_scan_batch, bench_scan_exact);
criterion_main!(benches);
