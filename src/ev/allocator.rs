//! Bit allocator for the per-edge record
//!
//! Hands out disjoint `(word, shift, bits)` placements inside a record of `u32` words.
//! A placement never straddles a word boundary; the reverse-direction bits of a
//! direction-dependent value sit directly above its forward bits in the same word.

use serde::{Deserialize, Serialize};

use super::Direction;
use crate::error::{EvError, Result};

/// Width of one record word in bits
pub const WORD_BITS: u32 = 32;

/// Where a value lives inside the edge record.
///
/// `bits == 0` marks a value that has not been registered yet; reads of such a value
/// yield 0 and writes are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub word: u32,
    pub shift: u32,
    pub bits: u32,
    pub two_directions: bool,
}

impl Placement {
    pub fn is_placed(&self) -> bool {
        self.bits > 0
    }

    /// Mask for one direction, not yet shifted
    #[inline]
    pub fn mask(&self) -> u32 {
        if self.bits >= WORD_BITS {
            u32::MAX
        } else {
            (1u32 << self.bits) - 1
        }
    }

    #[inline]
    pub fn shift_for(&self, direction: Direction) -> u32 {
        if self.two_directions && direction == Direction::Reverse {
            self.shift + self.bits
        } else {
            self.shift
        }
    }

    /// Bits occupied in the record, both directions included
    pub fn used_bits(&self) -> u32 {
        if self.two_directions {
            self.bits * 2
        } else {
            self.bits
        }
    }

    /// True if the two placements share at least one bit
    pub fn overlaps(&self, other: &Placement) -> bool {
        if self.word != other.word || !self.is_placed() || !other.is_placed() {
            return false;
        }
        let a_end = self.shift + self.used_bits();
        let b_end = other.shift + other.used_bits();
        self.shift < b_end && other.shift < a_end
    }
}

#[derive(Debug, Default, Clone)]
pub struct BitAllocator {
    word: u32,
    next_shift: u32,
    frozen: bool,
}

impl BitAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `bits` per direction for `name`.
    pub fn allocate(&mut self, name: &str, bits: u32, two_directions: bool) -> Result<Placement> {
        if self.frozen {
            return Err(EvError::AllocatorFrozen(name.to_string()));
        }

        let used = if two_directions { bits * 2 } else { bits };
        if bits == 0 || used > WORD_BITS {
            return Err(EvError::invalid(
                name,
                format!("{used} bits do not fit into a {WORD_BITS}-bit record word"),
            ));
        }

        if self.next_shift + used > WORD_BITS {
            self.word += 1;
            self.next_shift = 0;
        }

        let placement = Placement {
            word: self.word,
            shift: self.next_shift,
            bits,
            two_directions,
        };
        self.next_shift += used;
        Ok(placement)
    }

    /// Number of words each edge record needs for everything allocated so far
    pub fn words_per_edge(&self) -> usize {
        if self.word == 0 && self.next_shift == 0 {
            0
        } else {
            self.word as usize + 1
        }
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Rebuild a frozen allocator for a layout that was loaded from disk.
    pub(crate) fn frozen_with_words(words_per_edge: usize) -> Self {
        Self {
            word: words_per_edge.saturating_sub(1) as u32,
            next_shift: if words_per_edge == 0 { 0 } else { WORD_BITS },
            frozen: true,
        }
    }
}
