//! Jam: encode a noun into a bit stream with structural deduplication.
//!
//! Every node is emitted either directly (`0` atom / `10` cell) or as a
//! `11`-tagged back-reference to the bit offset of an earlier occurrence of
//! an equal noun, whichever costs fewer bits; at equal cost the
//! back-reference wins, since resolving from the decoder's cache is cheaper
//! than re-deriving the atom framing. The offset index keeps only first
//! occurrences, and only of directly emitted nodes; a back-reference is
//! never itself a target.
//!
//! Index lookups are value-keyed: keys carry a memoized content hash of the
//! subtree (computed bottom-up, once per node allocation) and fall back to
//! exact structural equality, so deduplicating a large noun with many
//! repeated subtrees stays well below quadratic.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use num_bigint::BigUint;
use num_traits::Zero;

use crate::bits;
use crate::noun::Noun;
use crate::uint;
use crate::NounBitVec;

/// Encode a noun into a packed integer: emitted bit `i` is bit `i` of the
/// result. Never fails on a finite noun.
///
/// Encoding recurses over tree depth (decoding does not); nouns nested
/// millions of cells deep are a caller-side resource concern, not something
/// an attacker can feed this function through the wire format.
///
/// # Example
/// ```rust
/// use jamcue::{jam, Noun};
/// // 0b1100: atom tag, unary "01", value bit 1
/// assert_eq!(jam(&Noun::atom(1u8)), 12u8.into());
/// ```
pub fn jam(noun: &Noun) -> BigUint {
    bits::pack(jam_to_bits(noun))
}

/// Encode a noun into its bit sequence, first emitted bit at index 0.
pub fn jam_to_bits(noun: &Noun) -> NounBitVec {
    let mut out = NounBitVec::new();
    let mut jammer = Jammer {
        index: HashMap::new(),
        mugs: HashMap::new(),
    };
    jammer.encode_node(noun, 0, &mut out, usize::MAX);
    out
}

/// Index key: memoized content hash, exact equality on collision.
#[derive(Clone, Copy)]
struct NodeKey<'a> {
    mug: u64,
    noun: &'a Noun,
}

impl Hash for NodeKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.mug);
    }
}

impl PartialEq for NodeKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.noun, other.noun) || self.noun == other.noun
    }
}

impl Eq for NodeKey<'_> {}

/// Per-invocation encoder state, discarded when `jam_to_bits` returns.
struct Jammer<'a> {
    /// Earliest bit offset of each directly emitted noun value.
    index: HashMap<NodeKey<'a>, usize>,
    /// Content hash per node allocation, so shared subtrees hash once.
    mugs: HashMap<*const Noun, u64>,
}

impl<'a> Jammer<'a> {
    /// Emit one node. Gives up and returns `false` as soon as `out` grows
    /// past `cap` bits; the caller then discards `out`. The cap is what keeps
    /// speculation affordable: re-encoding an already-indexed cell stops the
    /// moment it is too big to beat its back-reference, so a heavily shared
    /// tree costs O(offset width) per repeat, not a fresh full traversal.
    fn encode_node(
        &mut self,
        noun: &'a Noun,
        offset: usize,
        out: &mut NounBitVec,
        cap: usize,
    ) -> bool {
        let zero_atom = matches!(noun, Noun::Atom(value) if value.is_zero());
        // the root has nothing before it to point at, and atom 0's two direct
        // bits cannot be beaten by any back-reference
        let hit = if offset == 0 || zero_atom {
            None
        } else {
            let key = NodeKey { mug: self.mug_of(noun), noun };
            self.index.get(&key).copied()
        };

        match noun {
            Noun::Atom(value) => {
                if let Some(target) = hit {
                    let backref_cost = 2 + uint::cost(&BigUint::from(target));
                    let direct_cost = 1 + uint::cost(value);
                    if backref_cost <= direct_cost {
                        out.push(true);
                        out.push(true);
                        uint::encode(out, &BigUint::from(target));
                        return out.len() <= cap;
                    }
                }
                self.remember(noun, offset);
                out.push(false);
                uint::encode(out, value);
            }
            Noun::Cell(head, tail) => {
                if let Some(target) = hit {
                    let backref_cost = 2 + uint::cost(&BigUint::from(target));
                    // a cell's direct cost is only known after encoding its
                    // children, so encode them into a scratch buffer, but no
                    // further than the last length at which direct can still
                    // win. Discarding the scratch cannot strand index
                    // entries: every value beneath an already-indexed cell
                    // was itself indexed when that cell's first occurrence
                    // was emitted, so re-encoding it records nothing new.
                    let scratch_cap = (backref_cost - 3).min(cap.saturating_sub(out.len() + 2));
                    let mut scratch = NounBitVec::new();
                    let fits = self.encode_node(head, offset + 2, &mut scratch, scratch_cap)
                        && self.encode_node(
                            tail,
                            offset + 2 + scratch.len(),
                            &mut scratch,
                            scratch_cap,
                        );
                    if fits && backref_cost > 2 + scratch.len() {
                        out.push(true);
                        out.push(false);
                        out.extend_from_bitslice(&scratch);
                    } else {
                        out.push(true);
                        out.push(true);
                        uint::encode(out, &BigUint::from(target));
                    }
                } else {
                    self.remember(noun, offset);
                    let base = out.len();
                    out.push(true);
                    out.push(false);
                    if !self.encode_node(head, offset + 2, out, cap) {
                        return false;
                    }
                    if !self.encode_node(tail, offset + (out.len() - base), out, cap) {
                        return false;
                    }
                }
            }
        }
        out.len() <= cap
    }

    /// Record the first direct occurrence of a value; later occurrences keep
    /// the earliest offset.
    fn remember(&mut self, noun: &'a Noun, offset: usize) {
        let key = NodeKey { mug: self.mug_of(noun), noun };
        if let Entry::Vacant(slot) = self.index.entry(key) {
            slot.insert(offset);
        }
    }

    /// Content hash of a subtree, memoized by node address. Computed with an
    /// explicit postorder worklist: a cell's mug combines its children's
    /// mugs, so each allocation is visited once however often it is shared.
    fn mug_of(&mut self, root: &'a Noun) -> u64 {
        let mut todo: Vec<(&'a Noun, bool)> = vec![(root, false)];
        while let Some((node, children_done)) = todo.pop() {
            let addr = node as *const Noun;
            if self.mugs.contains_key(&addr) {
                continue;
            }
            match node {
                Noun::Atom(value) => {
                    let mug = fnv1a(fnv1a(FNV_OFFSET, &[0]), &value.to_bytes_le());
                    self.mugs.insert(addr, mug);
                }
                Noun::Cell(head, tail) => {
                    if children_done {
                        let head_mug = self.mugs[&(&**head as *const Noun)];
                        let tail_mug = self.mugs[&(&**tail as *const Noun)];
                        let mut mug = fnv1a(FNV_OFFSET, &[1]);
                        mug = fnv1a(mug, &head_mug.to_le_bytes());
                        mug = fnv1a(mug, &tail_mug.to_le_bytes());
                        self.mugs.insert(addr, mug);
                    } else {
                        todo.push((node, true));
                        todo.push((&**tail, false));
                        todo.push((&**head, false));
                    }
                }
            }
        }
        self.mugs[&(root as *const Noun)]
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(seed: u64, bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(seed, |hash, &b| (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME))
}

#[cfg(test)]
mod test {
    use super::{jam, jam_to_bits};
    use crate::cue::cue;
    use crate::noun::Noun;
    use num_bigint::BigUint;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    #[test]
    fn test_atom_zero_is_two_bits() {
        let bits = jam_to_bits(&Noun::atom(0u8));
        assert_eq!(bits.iter().by_vals().collect::<Vec<_>>(), vec![false, true]);
        assert_eq!(jam(&Noun::atom(0u8)), BigUint::from(2u8));
    }

    #[test]
    fn test_small_atoms() {
        // worked out by hand against the tag grammar
        assert_eq!(jam(&Noun::atom(1u8)), BigUint::from(0b1100u8));
        assert_eq!(jam(&Noun::atom(2u8)), BigUint::from(0b100_1000u8));
    }

    #[test]
    fn test_atom_bit_lengths() {
        // 1 tag bit + 2*bitlen(bitlen(n)) + bitlen(n) for n > 0, 2 bits for 0
        for (n, expect) in [
            (0u64, 2),
            (1, 4),
            (2, 7),
            (3, 7),
            (4, 8),
            (255, 17),
            (256, 18),
            (65535, 27),
        ] {
            let noun = Noun::atom(n);
            let bits = jam_to_bits(&noun);
            assert_eq!(bits.len(), expect, "n={}", n);
            assert_eq!(*cue(&jam(&noun)).unwrap(), noun, "n={}", n);
        }
    }

    #[test]
    fn test_minimality_vector() {
        // [[0 0] [1 [[0 0] 0]]]: the second [0 0] sits where a back-reference
        // would cost 8 bits but re-emitting costs 6, so the cost comparison
        // must pick direct; a laxer always-backref encoder emits 26 bits
        let zz = Noun::cell(Noun::atom(0u8), Noun::atom(0u8));
        let noun = Noun::cell(
            zz.clone(),
            Noun::cell(Noun::atom(1u8), Noun::cell(zz, Noun::atom(0u8))),
        );
        let bits = jam_to_bits(&noun);
        assert_eq!(bits.len(), 24);
        assert_eq!(jam(&noun), BigUint::from(0b1010_1001_0111_0001_1010_0101u32));
        assert_eq!(*cue(&jam(&noun)).unwrap(), noun);
    }

    #[test]
    fn test_equal_cost_prefers_backref() {
        // [5 5]: direct tail costs 8 bits, back-reference to offset 2 also 8
        let noun = Noun::cell(Noun::atom(5u8), Noun::atom(5u8));
        let bits = jam_to_bits(&noun);
        assert_eq!(bits.len(), 18);
        // tail begins at offset 10 with the "11" back-reference tag
        assert!(bits[10]);
        assert!(bits[11]);
        let back = cue(&jam(&noun)).unwrap();
        assert_eq!(*back, noun);
        // and the decoder resolves it to the shared head
        match &*back {
            Noun::Cell(head, tail) => assert!(Rc::ptr_eq(head, tail)),
            Noun::Atom(_) => unreachable!(),
        }
    }

    #[test]
    fn test_distant_atom_stays_direct() {
        // two occurrences of atom 3 with a fat atom between them: atom 3 is
        // 7 bits direct, a back-reference to offset 2 is 8, so both stay
        // direct and decode correctly
        let noun = Noun::cell(
            Noun::atom(3u8),
            Noun::cell(Noun::atom(BigUint::from(2u8).pow(100)), Noun::atom(3u8)),
        );
        assert_eq!(*cue(&jam(&noun)).unwrap(), noun);
        // count the atom tags: no "11" backref tag should follow the big atom
        let bits = jam_to_bits(&noun);
        let last_node_start = bits.len() - 7;
        assert!(!bits[last_node_start]);
    }

    #[test]
    fn test_dedup_shrinks_repeated_subtree() {
        let x = balanced(&(0..50u64).collect::<Vec<_>>());
        let alone = jam_to_bits(&x).len();
        let doubled = jam_to_bits(&Noun::cell(x.clone(), x)).len();
        // a few bits of tag and offset, never proportional to size(x)
        assert!(doubled - alone < 20, "doubled={} alone={}", doubled, alone);
    }

    #[test]
    fn test_shared_input_encodes_like_copied_input() {
        let x = Rc::new(balanced(&(0..20u64).collect::<Vec<_>>()));
        let shared = Noun::cell_shared(Rc::clone(&x), Rc::clone(&x));
        let copied = Noun::cell((*x).clone(), (*x).clone());
        assert_eq!(jam(&shared), jam(&copied));
        assert_eq!(*cue(&jam(&shared)).unwrap(), copied);
    }

    #[test]
    fn test_nested_repeats_stay_decodable() {
        // [6 7] and its enclosing cell both repeat; the inner repeats sit
        // inside a scratch encoding that loses to a back-reference, and the
        // stream must still resolve every reference it ends up containing
        let inner = Noun::cell(Noun::atom(6u16), Noun::atom(7u16));
        let outer = Noun::cell(inner.clone(), Noun::atom(1000u16));
        let noun = Noun::cell(
            outer.clone(),
            Noun::cell(outer, Noun::cell(inner, Noun::atom(1001u16))),
        );
        assert_eq!(*cue(&jam(&noun)).unwrap(), noun);
    }

    #[test]
    fn test_roundtrip_big_atoms() {
        let noun = Noun::cell(
            Noun::atom(BigUint::from(2u8).pow(777) + 1u8),
            Noun::atom(BigUint::from(3u8).pow(300)),
        );
        assert_eq!(*cue(&jam(&noun)).unwrap(), noun);
    }

    #[test]
    fn test_roundtrip_deep_chain() {
        let mut noun = Noun::atom(0u32);
        for i in 0..2_000u32 {
            noun = Noun::cell(Noun::atom(i), noun);
        }
        assert_eq!(*cue(&jam(&noun)).unwrap(), noun);
    }

    #[test]
    fn test_roundtrip_random_trees() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        fn random_noun(rng: &mut StdRng, depth: usize) -> Noun {
            if depth == 0 || rng.gen_bool(0.35) {
                // a skewed value range so small atoms repeat and dedup kicks in
                Noun::atom(rng.gen_range(0u64..64))
            } else {
                Noun::cell(random_noun(rng, depth - 1), random_noun(rng, depth - 1))
            }
        }

        let mut rng = StdRng::seed_from_u64(0xBEEF);
        for _ in 0..200 {
            let noun = random_noun(&mut rng, 10);
            assert_eq!(*cue(&jam(&noun)).unwrap(), noun);
        }
    }

    fn balanced(values: &[u64]) -> Noun {
        if values.len() == 1 {
            Noun::atom(values[0])
        } else {
            let mid = values.len() / 2;
            Noun::cell(balanced(&values[..mid]), balanced(&values[mid..]))
        }
    }
}
