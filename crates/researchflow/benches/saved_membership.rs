use criterion::{criterion_group, criterion_main, Criterion};
use researchflow_core::ResultItem;
use researchflow_saved::{SavedIndex, SavedItemsRegistry};
use researchflow_storage::MemoryStore;
use std::hint::black_box;
use std::sync::Arc;

fn bench_saved_index_lookup(c: &mut Criterion) {
    let registry = SavedItemsRegistry::new(Arc::new(MemoryStore::new()));
    for n in 0..200 {
        registry
            .save(ResultItem {
                url: format!("https://papers.test/{n}"),
                title: format!("Paper {n}"),
                authors: vec![],
                year: None,
                citation_count: 0,
                abstract_text: None,
                journal: None,
            })
            .unwrap();
    }
    let index = SavedIndex::build(&registry).unwrap();
    let urls: Vec<String> = (0..25).map(|n| format!("https://papers.test/{}", n * 13)).collect();

    c.bench_function("saved_index_page_of_25", |b| {
        b.iter(|| urls.iter().filter(|u| index.contains(black_box(u))).count());
    });

    c.bench_function("saved_index_rebuild_200", |b| {
        b.iter(|| SavedIndex::build(black_box(&registry)).unwrap().len());
    });
}

criterion_group!(benches, bench_saved_index_lookup);
criterion_main!(benches);
