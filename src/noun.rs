//! The noun value type: atoms (nonnegative integers) and cells (ordered pairs).
//!
//! Nouns are immutable values. Cells hold their children behind [`Rc`], so a
//! subtree can appear in several places without being copied; equality is
//! structural either way. The codec relies on exactly two things from this
//! module: deep equality and the shape of the two variants.
//!
//! # Example
//! ```rust
//! use jamcue::Noun;
//! let n = Noun::cell(Noun::atom(1u8), Noun::cell(Noun::atom(2u8), Noun::atom(3u8)));
//! assert_eq!(n.to_string(), "[1 2 3]");
//! ```

use std::fmt;
use std::mem;
use std::rc::Rc;

use num_bigint::BigUint;

/// A noun: an atom (nonnegative integer) or a cell (ordered pair of nouns).
#[derive(Debug, Clone)]
pub enum Noun {
    /// A nonnegative integer of arbitrary size. 0 is a valid atom.
    Atom(BigUint),
    /// An ordered pair. The children are reference-counted so identical
    /// subtrees can share one allocation; they are never mutated.
    Cell(Rc<Noun>, Rc<Noun>),
}

impl Noun {
    /// Build an atom from any unsigned integer.
    pub fn atom(value: impl Into<BigUint>) -> Self {
        Noun::Atom(value.into())
    }

    /// Build a cell from two owned nouns.
    pub fn cell(head: Noun, tail: Noun) -> Self {
        Noun::Cell(Rc::new(head), Rc::new(tail))
    }

    /// Build a cell from already-shared nouns, without copying them.
    pub fn cell_shared(head: Rc<Noun>, tail: Rc<Noun>) -> Self {
        Noun::Cell(head, tail)
    }

    /// Is this noun an atom?
    pub fn is_atom(&self) -> bool {
        matches!(self, Noun::Atom(_))
    }

    /// Is this noun a cell?
    pub fn is_cell(&self) -> bool {
        matches!(self, Noun::Cell(_, _))
    }

    /// The integer value, if this noun is an atom.
    pub fn as_atom(&self) -> Option<&BigUint> {
        match self {
            Noun::Atom(value) => Some(value),
            Noun::Cell(_, _) => None,
        }
    }
}

/// Deep structural equality, without recursing.
///
/// The worklist keeps comparison safe on degenerate, very deep nouns, and the
/// `Rc::ptr_eq` shortcut makes comparing a shared subtree against itself O(1).
impl PartialEq for Noun {
    fn eq(&self, other: &Self) -> bool {
        let mut todo: Vec<(&Noun, &Noun)> = vec![(self, other)];
        while let Some((a, b)) = todo.pop() {
            match (a, b) {
                (Noun::Atom(x), Noun::Atom(y)) => {
                    if x != y {
                        return false;
                    }
                }
                (Noun::Cell(ah, at), Noun::Cell(bh, bt)) => {
                    if !Rc::ptr_eq(ah, bh) {
                        todo.push((&**ah, &**bh));
                    }
                    if !Rc::ptr_eq(at, bt) {
                        todo.push((&**at, &**bt));
                    }
                }
                _ => return false,
            }
        }
        true
    }
}

impl Eq for Noun {}

/// Unlinks cells through a worklist instead of letting the compiler-generated
/// drop glue recurse, so dropping a million-deep chain cannot overflow the
/// stack. Children still shared elsewhere are left alive.
impl Drop for Noun {
    fn drop(&mut self) {
        let Noun::Cell(head, tail) = self else { return };
        let dummy: Rc<Noun> = Rc::new(Noun::Atom(BigUint::default()));
        let mut stack = vec![
            mem::replace(head, Rc::clone(&dummy)),
            mem::replace(tail, Rc::clone(&dummy)),
        ];
        while let Some(node) = stack.pop() {
            if let Ok(mut noun) = Rc::try_unwrap(node) {
                if let Noun::Cell(head, tail) = &mut noun {
                    stack.push(mem::replace(head, Rc::clone(&dummy)));
                    stack.push(mem::replace(tail, Rc::clone(&dummy)));
                }
                // `noun` now holds only the shared dummy and drops shallowly
            }
        }
    }
}

/// Prints atoms in decimal and cells in brackets, with right-nested cells
/// flattened: `[1 2 3]` rather than `[1 [2 3]]`.
impl fmt::Display for Noun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Noun::Atom(value) => write!(f, "{}", value),
            Noun::Cell(head, tail) => {
                write!(f, "[{}", head)?;
                let mut rest: &Noun = &**tail;
                while let Noun::Cell(head, tail) = rest {
                    write!(f, " {}", head)?;
                    rest = &**tail;
                }
                write!(f, " {}]", rest)
            }
        }
    }
}
