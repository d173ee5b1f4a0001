//! Benchmarks for global ranking and embedding.
//!
//! Simulates realistic collection sizes:
//! - Small:  ~5 documents, 10 sections each (single travel guide set)
//! - Medium: ~15 documents, 40 sections each
//! - Large:  ~50 documents, 80 sections each
//!
//! Run with: cargo bench -p docrank-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use docrank_core::{
    Chunker, Document, HashEmbedder, RankingConfig, RankingEngine, Section, VectorEngine,
};
use std::sync::Arc;

/// Collection size configurations
struct CollectionSize {
    name: &'static str,
    documents: usize,
    sections_per_doc: usize,
}

const SIZES: &[CollectionSize] = &[
    CollectionSize {
        name: "small",
        documents: 5,
        sections_per_doc: 10,
    },
    CollectionSize {
        name: "medium",
        documents: 15,
        sections_per_doc: 40,
    },
    CollectionSize {
        name: "large",
        documents: 50,
        sections_per_doc: 80,
    },
];

const VOCABULARY: &[&str] = &[
    "beach", "museum", "restaurant", "nightlife", "hotel", "budget", "train", "castle",
    "wine", "hiking", "market", "festival", "cuisine", "harbor", "tour", "group",
];

fn paragraph(seed: usize, words: usize) -> String {
    (0..words)
        .map(|i| VOCABULARY[(seed * 7 + i * 3) % VOCABULARY.len()])
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_collection(size: &CollectionSize, vectors: &VectorEngine) -> Vec<Document> {
    let chunker = Chunker::default();
    (0..size.documents)
        .map(|d| {
            let name = format!("guide_{d}.pdf");
            let sections = (0..size.sections_per_doc)
                .map(|s| {
                    let text = (0..4)
                        .map(|p| format!("{}.", paragraph(d * 131 + s * 17 + p, 40)))
                        .collect::<Vec<_>>()
                        .join("\n\n");
                    let mut section = Section::new(format!("Section {s}"), s as u32 + 1, &name, text);
                    if let Err(e) = vectors.process_section(&mut section, &chunker) {
                        panic!("embedding failed: {e}");
                    }
                    section
                })
                .collect();
            Document::new(name).with_sections(sections)
        })
        .collect()
}

fn bench_rank_sections(c: &mut Criterion) {
    let vectors = VectorEngine::new(Arc::new(HashEmbedder::default())).unwrap();
    let engine = RankingEngine::new(RankingConfig::default()).unwrap();
    let query = vectors
        .embed_query("Persona: Travel Planner. Task: Plan a trip for a group of friends")
        .unwrap();

    let mut group = c.benchmark_group("rank_sections_globally");
    for size in SIZES {
        let documents = build_collection(size, &vectors);
        let sections = size.documents * size.sections_per_doc;
        group.throughput(Throughput::Elements(sections as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size.name), &documents, |b, docs| {
            b.iter(|| {
                let ranked = engine
                    .rank_sections_globally(black_box(docs.clone()), &query)
                    .unwrap();
                black_box(engine.perform_sub_section_analysis(&ranked))
            })
        });
    }
    group.finish();
}

fn bench_hash_embedding(c: &mut Criterion) {
    let embedder = HashEmbedder::default();
    let text = paragraph(42, 200);

    c.bench_function("hash_embed_200_words", |b| {
        b.iter(|| black_box(embedder.embed(black_box(&text))))
    });
}

criterion_group!(benches, bench_rank_sections, bench_hash_embedding);
criterion_main!(benches);
