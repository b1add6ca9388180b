//! Benchmarks for proof verification.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use existproof::digest::Digests;
use existproof::proof::{Proof, Reference, Verifier, SHA2_256, SHA3_512};

/// A single chain of alternating hashes, one reference at the end.
fn chain(len: usize) -> Proof {
    let mut proof = Proof::new();
    let mut prev = proof.push_literal(b"document".to_vec());
    for i in 0..len {
        let op = if i % 2 == 0 { SHA2_256 } else { SHA3_512 };
        prev = proof.push_operation(op, vec![prev]);
    }
    proof.push_reference(Reference::new(prev, "anchor"));
    proof
}

/// A binary Merkle tree over `leaves` literals, the root referenced.
fn merkle(leaves: usize) -> Proof {
    let mut proof = Proof::new();
    let mut level: Vec<i64> = (0..leaves)
        .map(|i| proof.push_literal(format!("leaf-{}", i).into_bytes()))
        .collect();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| proof.push_operation(SHA2_256, pair.to_vec()))
            .collect();
    }
    proof.push_reference(Reference::new(level[0], "anchor"));
    proof
}

/// Each step consumes the previous output twice.
fn ladder(steps: usize) -> Proof {
    let mut proof = Proof::new();
    let mut prev = proof.push_literal(b"document".to_vec());
    for _ in 0..steps {
        prev = proof.push_operation(SHA3_512, vec![prev, prev]);
    }
    proof.push_reference(Reference::new(prev, "anchor"));
    proof
}

fn bench_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify_chain");
    let verifier = Verifier::default();

    for len in [16, 256, 4096] {
        let proof = chain(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &proof, |b, proof| {
            b.iter(|| verifier.verify(black_box(proof), black_box(b"document"), None))
        });
    }

    group.finish();
}

fn bench_merkle(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify_merkle");
    let verifier = Verifier::default();

    for leaves in [64, 1024] {
        let proof = merkle(leaves);
        group.bench_with_input(BenchmarkId::from_parameter(leaves), &proof, |b, proof| {
            b.iter(|| verifier.verify(black_box(proof), black_box(b"leaf-0"), None))
        });
    }

    group.finish();
}

fn bench_ladder(c: &mut Criterion) {
    let proof = ladder(64);
    let verifier = Verifier::default();
    c.bench_function("verify_ladder_64", |b| {
        b.iter(|| verifier.verify(black_box(&proof), black_box(b"document"), None))
    });
}

fn bench_json(c: &mut Criterion) {
    let json = merkle(1024).to_json().unwrap_or_default();
    let mut group = c.benchmark_group("proof_json");
    group.throughput(Throughput::Bytes(json.len() as u64));
    group.bench_function("decode_merkle_1024", |b| {
        b.iter(|| Proof::from_json(black_box(json.as_bytes())))
    });
    group.finish();
}

fn bench_digests(c: &mut Criterion) {
    let mut group = c.benchmark_group("digests");
    let large = vec![0u8; 1024 * 1024];
    group.throughput(Throughput::Bytes(large.len() as u64));
    group.bench_function("both_1mb", |b| {
        b.iter(|| Digests::from_slice(black_box(&large)))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_chain,
    bench_merkle,
    bench_ladder,
    bench_json,
    bench_digests
);
criterion_main!(benches);
