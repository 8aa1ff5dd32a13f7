use serde::{Deserialize, Serialize};

use super::field::BitField;
use super::Direction;
use crate::error::Result;

/// Unsigned integer in `[0, 2^bits - 1]`.
///
/// Out-of-range input is clamped to the nearest bound, never wrapped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntEncodedValue {
    pub(crate) field: BitField,
}

impl IntEncodedValue {
    pub fn new(name: &str, bits: u32, two_directions: bool) -> Result<Self> {
        Ok(Self {
            field: BitField::new(name, bits, two_directions)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn bits(&self) -> u32 {
        self.field.bits
    }

    pub fn max_int(&self) -> u32 {
        self.field.max_raw()
    }

    #[inline]
    pub fn get_int(&self, direction: Direction, record: &[u32]) -> u32 {
        self.field.read(direction, record)
    }

    #[inline]
    pub fn set_int(&self, direction: Direction, record: &mut [u32], value: i64) {
        let clamped = value.clamp(0, self.max_int() as i64) as u32;
        self.field.write(direction, record, clamped);
    }
}
