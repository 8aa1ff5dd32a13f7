//! Raw bit-field access shared by every encoded value type

use serde::{Deserialize, Serialize};

use super::allocator::{BitAllocator, Placement, WORD_BITS};
use super::Direction;
use crate::error::{EvError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct BitField {
    pub(crate) name: String,
    pub(crate) bits: u32,
    pub(crate) two_directions: bool,
    #[serde(default)]
    pub(crate) placement: Placement,
}

/// Encoded value names end up in configuration strings and custom models, so they
/// are restricted to lowercase identifiers.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let starts_ok = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let rest_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if starts_ok && rest_ok {
        Ok(())
    } else {
        Err(EvError::invalid(
            name,
            "name must start with a lowercase letter and contain only [a-z0-9_]",
        ))
    }
}

impl BitField {
    pub(crate) fn new(name: &str, bits: u32, two_directions: bool) -> Result<Self> {
        let field = Self {
            name: name.to_string(),
            bits,
            two_directions,
            placement: Placement::default(),
        };
        field.check()?;
        Ok(field)
    }

    /// Name and width rules, also applied to fields loaded from a manifest
    pub(crate) fn check(&self) -> Result<()> {
        validate_name(&self.name)?;
        let limit = if self.two_directions { WORD_BITS / 2 } else { WORD_BITS };
        if self.bits == 0 || self.bits > limit {
            return Err(EvError::invalid(
                &self.name,
                format!("bits must be within 1..={limit}, got {}", self.bits),
            ));
        }
        Ok(())
    }

    pub(crate) fn init(&mut self, allocator: &mut BitAllocator) -> Result<()> {
        self.placement = allocator.allocate(&self.name, self.bits, self.two_directions)?;
        Ok(())
    }

    /// Largest raw value one direction can hold
    #[inline]
    pub(crate) fn max_raw(&self) -> u32 {
        if self.bits >= WORD_BITS {
            u32::MAX
        } else {
            (1u32 << self.bits) - 1
        }
    }

    #[inline]
    pub(crate) fn read(&self, direction: Direction, record: &[u32]) -> u32 {
        let p = &self.placement;
        if !p.is_placed() {
            return 0;
        }
        (record[p.word as usize] >> p.shift_for(direction)) & p.mask()
    }

    #[inline]
    pub(crate) fn write(&self, direction: Direction, record: &mut [u32], raw: u32) {
        let p = &self.placement;
        if !p.is_placed() {
            return;
        }
        let shift = p.shift_for(direction);
        let mask = p.mask() << shift;
        let word = &mut record[p.word as usize];
        *word = (*word & !mask) | ((raw << shift) & mask);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("max_speed").is_ok());
        assert!(validate_name("road_scenery_hill").is_ok());
        assert!(validate_name("a1").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("1abc").is_err());
        assert!(validate_name("Max_Speed").is_err());
        assert!(validate_name("max-speed").is_err());
    }

    #[test]
    fn test_write_keeps_neighbouring_bits() {
        let mut alloc = BitAllocator::new();
        let mut a = BitField::new("a", 3, false).unwrap();
        let mut b = BitField::new("b", 4, true).unwrap();
        a.init(&mut alloc).unwrap();
        b.init(&mut alloc).unwrap();

        let mut record = vec![0u32; alloc.words_per_edge()];
        a.write(Direction::Forward, &mut record, 5);
        b.write(Direction::Forward, &mut record, 9);
        b.write(Direction::Reverse, &mut record, 15);
        assert_eq!(a.read(Direction::Forward, &record), 5);
        assert_eq!(b.read(Direction::Forward, &record), 9);
        assert_eq!(b.read(Direction::Reverse, &record), 15);

        a.write(Direction::Forward, &mut record, 2);
        assert_eq!(a.read(Direction::Reverse, &record), 2);
        assert_eq!(b.read(Direction::Forward, &record), 9);
        assert_eq!(b.read(Direction::Reverse, &record), 15);
    }

    #[test]
    fn test_unplaced_field_is_inert() {
        let field = BitField::new("inert", 4, false).unwrap();
        let mut record = vec![u32::MAX];
        field.write(Direction::Forward, &mut record, 0);
        assert_eq!(record[0], u32::MAX);
        assert_eq!(field.read(Direction::Forward, &record), 0);
    }

    #[test]
    fn test_full_word_field() {
        let mut alloc = BitAllocator::new();
        let mut f = BitField::new("full", 32, false).unwrap();
        f.init(&mut alloc).unwrap();
        let mut record = vec![0u32];
        f.write(Direction::Forward, &mut record, u32::MAX - 1);
        assert_eq!(f.read(Direction::Forward, &record), u32::MAX - 1);
        assert_eq!(f.max_raw(), u32::MAX);
    }

    #[test]
    fn test_bits_limits() {
        assert!(BitField::new("x", 0, false).is_err());
        assert!(BitField::new("x", 33, false).is_err());
        assert!(BitField::new("x", 17, true).is_err());
        assert!(BitField::new("x", 16, true).is_ok());
    }
}
