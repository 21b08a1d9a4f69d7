//! Quick timing run: jam and cue a large random tree and a heavily shared one.
use std::rc::Rc;
use std::time::Instant;

use jamcue::{cue, jam, jam_to_bits, Noun};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() {
    let noun = random_noun(&mut StdRng::seed_from_u64(7), 20);

    let now = Instant::now();
    let packed = jam(&noun);
    println!("jam random tree\t\t {} bits in {:?}", packed.bits(), now.elapsed());

    let now = Instant::now();
    let back = cue(&packed).unwrap();
    println!("cue random tree\t\t in {:?}", now.elapsed());
    assert_eq!(*back, noun);

    // a 16-deep complete tree built out of one shared leaf pair: tiny wire
    // size, since all but the first occurrence become back-references
    let mut shared = Rc::new(Noun::cell(Noun::atom(11u8), Noun::atom(12u8)));
    for _ in 0..16 {
        shared = Rc::new(Noun::cell_shared(Rc::clone(&shared), Rc::clone(&shared)));
    }
    let now = Instant::now();
    let bits = jam_to_bits(&shared);
    println!("jam shared tree\t\t {} bits in {:?}", bits.len(), now.elapsed());
}

fn random_noun(rng: &mut StdRng, depth: usize) -> Noun {
    if depth == 0 || rng.gen_bool(0.35) {
        Noun::atom(rng.gen_range(0u64..10_000))
    } else {
        Noun::cell(random_noun(rng, depth - 1), random_noun(rng, depth - 1))
    }
}
