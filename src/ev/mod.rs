//! Encoded values: named bit fields inside the per-edge record
//!
//! An [`EncodedValue`] is an immutable descriptor. The only mutable state is the
//! `&mut [u32]` record handed to `set_*`; reads take `&[u32]`.

pub mod allocator;
pub mod boolean;
pub mod decimal;
pub mod enumerated;
pub(crate) mod field;
pub mod int;
pub mod lookup;
pub mod values;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use allocator::{BitAllocator, Placement, WORD_BITS};
pub use boolean::BooleanEncodedValue;
pub use decimal::DecimalEncodedValue;
pub use enumerated::{EncodedEnum, EnumEncodedValue};
pub use int::IntEncodedValue;
pub use lookup::EncodedValueLookup;

use crate::error::Result;
use field::BitField;

/// Traversal direction of a directed edge.
///
/// Ignored by values that are not direction-dependent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Forward, Direction::Reverse];

    pub fn from_reverse(reverse: bool) -> Self {
        if reverse {
            Direction::Reverse
        } else {
            Direction::Forward
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Boolean,
    Int,
    Decimal,
    Enum,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueKind::Boolean => "boolean",
            ValueKind::Int => "int",
            ValueKind::Decimal => "decimal",
            ValueKind::Enum => "enum",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EncodedValue {
    Boolean(BooleanEncodedValue),
    Int(IntEncodedValue),
    Decimal(DecimalEncodedValue),
    Enum(EnumEncodedValue),
}

impl EncodedValue {
    pub(crate) fn field(&self) -> &BitField {
        match self {
            EncodedValue::Boolean(v) => &v.field,
            EncodedValue::Int(v) => &v.field,
            EncodedValue::Decimal(v) => &v.field,
            EncodedValue::Enum(v) => &v.field,
        }
    }

    fn field_mut(&mut self) -> &mut BitField {
        match self {
            EncodedValue::Boolean(v) => &mut v.field,
            EncodedValue::Int(v) => &mut v.field,
            EncodedValue::Decimal(v) => &mut v.field,
            EncodedValue::Enum(v) => &mut v.field,
        }
    }

    pub fn name(&self) -> &str {
        &self.field().name
    }

    /// Bits per direction
    pub fn bits(&self) -> u32 {
        self.field().bits
    }

    pub fn is_two_directions(&self) -> bool {
        self.field().two_directions
    }

    pub fn placement(&self) -> Placement {
        self.field().placement
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            EncodedValue::Boolean(_) => ValueKind::Boolean,
            EncodedValue::Int(_) => ValueKind::Int,
            EncodedValue::Decimal(_) => ValueKind::Decimal,
            EncodedValue::Enum(_) => ValueKind::Enum,
        }
    }

    /// Re-run the construction rules on a value that did not come from a constructor.
    pub(crate) fn check_definition(&self) -> Result<()> {
        match self {
            EncodedValue::Boolean(v) => {
                v.field.check()?;
                if v.field.bits != 1 {
                    return Err(crate::error::EvError::invalid(
                        &v.field.name,
                        format!("boolean must use 1 bit, got {}", v.field.bits),
                    ));
                }
                Ok(())
            }
            EncodedValue::Int(v) => v.field.check(),
            EncodedValue::Decimal(v) => v.check(),
            EncodedValue::Enum(v) => v.check(),
        }
    }

    /// Reserve record bits for this value.
    pub fn init(&mut self, allocator: &mut BitAllocator) -> Result<()> {
        self.field_mut().init(allocator)
    }

    /// Human-readable value for one direction, used by `inspect`.
    pub fn display_value(&self, direction: Direction, record: &[u32]) -> String {
        match self {
            EncodedValue::Boolean(v) => v.get_bool(direction, record).to_string(),
            EncodedValue::Int(v) => v.get_int(direction, record).to_string(),
            EncodedValue::Decimal(v) => {
                let d = v.get_decimal(direction, record);
                if d.is_infinite() {
                    "inf".to_string()
                } else {
                    format!("{d}")
                }
            }
            EncodedValue::Enum(v) => v.get_name(direction, record).to_string(),
        }
    }
}

impl From<BooleanEncodedValue> for EncodedValue {
    fn from(v: BooleanEncodedValue) -> Self {
        EncodedValue::Boolean(v)
    }
}

impl From<IntEncodedValue> for EncodedValue {
    fn from(v: IntEncodedValue) -> Self {
        EncodedValue::Int(v)
    }
}

impl From<DecimalEncodedValue> for EncodedValue {
    fn from(v: DecimalEncodedValue) -> Self {
        EncodedValue::Decimal(v)
    }
}

impl From<EnumEncodedValue> for EncodedValue {
    fn from(v: EnumEncodedValue) -> Self {
        EncodedValue::Enum(v)
    }
}
