use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, Rng, SeedableRng};

use avl_tree::AvlTree;

const N: usize = 100_000;

pub fn benchmarks(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let values: Vec<i32> = (1..=N).map(|_| rng.gen()).collect();

    c.bench_function("tree_insert", |b| {
        let mut tree = AvlTree::new();
        b.iter(|| {
            for value in &values {
                tree.insert(*value);
            }
        })
    });

    let tree: AvlTree<i32> = values.iter().copied().collect();

    c.bench_function("tree_search", |b| {
        b.iter(|| {
            for value in &values {
                black_box(tree.search(value));
            }
        })
    });

    c.bench_function("tree_in_order_traversal", |b| {
        b.iter(|| black_box(tree.in_order_traversal()))
    });

    c.bench_function("tree_delete", |b| {
        let mut tree = tree.clone();
        b.iter(|| {
            for value in &values {
                tree.delete(value);
            }
        })
    });
}

criterion_group!(benches, benchmarks);
criterion_main!(benches);
