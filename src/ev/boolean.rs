use serde::{Deserialize, Serialize};

use super::field::BitField;
use super::Direction;
use crate::error::Result;

/// One bit per direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BooleanEncodedValue {
    pub(crate) field: BitField,
}

impl BooleanEncodedValue {
    pub fn new(name: &str, two_directions: bool) -> Result<Self> {
        Ok(Self {
            field: BitField::new(name, 1, two_directions)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }

    #[inline]
    pub fn get_bool(&self, direction: Direction, record: &[u32]) -> bool {
        self.field.read(direction, record) != 0
    }

    #[inline]
    pub fn set_bool(&self, direction: Direction, record: &mut [u32], value: bool) {
        self.field.write(direction, record, value as u32);
    }
}
