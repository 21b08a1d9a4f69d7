#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use jamcue::{cue, jam, jam_to_bits, Noun};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::rc::Rc;

fn random_noun(rng: &mut StdRng, depth: usize) -> Noun {
    if depth == 0 || rng.gen_bool(0.35) {
        Noun::atom(rng.gen_range(0u64..10_000))
    } else {
        Noun::cell(random_noun(rng, depth - 1), random_noun(rng, depth - 1))
    }
}

/// Encoding/decoding a large random tree with modest repetition
fn jam_cue_random(c: &mut Criterion) {
    let noun = random_noun(&mut StdRng::seed_from_u64(7), 20);
    let packed = jam(&noun);

    c.bench_function(
        &format!("jam random tree ({} bits)", packed.bits()),
        |b| b.iter(|| jam(black_box(&noun))),
    );
    c.bench_function(
        &format!("cue random tree ({} bits)", packed.bits()),
        |b| b.iter(|| cue(black_box(&packed)).unwrap()),
    );
}

/// A complete tree built from one shared subtree: almost all nodes become
/// back-references, so this measures the dedup index, not raw emission
fn jam_shared(c: &mut Criterion) {
    let mut noun = Rc::new(Noun::cell(Noun::atom(11u8), Noun::atom(12u8)));
    for _ in 0..16 {
        noun = Rc::new(Noun::cell_shared(Rc::clone(&noun), Rc::clone(&noun)));
    }

    c.bench_function("jam 2^16-leaf shared tree", |b| {
        b.iter(|| jam_to_bits(black_box(&noun)))
    });
}

criterion_group!(benches, jam_cue_random, jam_shared);
criterion_main!(benches);
