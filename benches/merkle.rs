//! Tree build and proof verification throughput.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use merkle_airdrop::{proof::verify, HashAlgorithm, Identity, MerkleTree};

fn identities(n: u32) -> Vec<Identity> {
    (0..n)
        .map(|i| {
            let mut bytes = [0u8; 20];
            bytes[16..].copy_from_slice(&i.to_be_bytes());
            Identity::new(bytes)
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for n in [16u32, 1_024, 65_536] {
        let ids = identities(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &ids, |b, ids| {
            b.iter(|| MerkleTree::from_identities(HashAlgorithm::Keccak256, black_box(ids)))
        });
    }
    group.finish();
}

fn bench_verify(c: &mut Criterion) {
    let mut group = c.benchmark_group("verify");
    for algorithm in [HashAlgorithm::Keccak256, HashAlgorithm::Sha256] {
        let ids = identities(65_536);
        let tree = MerkleTree::from_identities(algorithm, &ids).unwrap();
        let member = ids[12_345];
        let proof = tree.prove_identity(&member).unwrap();
        let root = tree.root();

        group.bench_function(algorithm.name(), |b| {
            b.iter(|| verify(algorithm, black_box(&member), black_box(&proof), &root))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_verify);
criterion_main!(benches);
