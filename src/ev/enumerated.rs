//! Enumerations stored as their ordinal
//!
//! Every enum-backed property designates ordinal 0 as its canonical default. Missing
//! tags and bits that name no constant read as the default. A tag literal that matches
//! no constant stores whatever fallback its parser nominates, e.g. `OTHER` for surface.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::field::BitField;
use super::Direction;
use crate::error::{EvError, Result};

/// A closed set of constants that can back an [`EnumEncodedValue`].
///
/// Implement through [`encoded_enum!`](crate::encoded_enum), which puts the default
/// constant first.
pub trait EncodedEnum: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Stable type name, checked when the value is fetched from a lookup
    const TYPE_NAME: &'static str;

    fn values() -> &'static [Self];

    fn ordinal(self) -> usize;

    fn as_str(self) -> &'static str;

    fn default_value() -> Self {
        Self::values()[0]
    }

    /// Case-insensitive match on the tag spelling, falling back to the default.
    fn find(name: &str) -> Self {
        let name = name.trim();
        Self::values()
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(name))
            .unwrap_or_else(Self::default_value)
    }

    fn from_ordinal(ordinal: usize) -> Self {
        Self::values()
            .get(ordinal)
            .copied()
            .unwrap_or_else(Self::default_value)
    }
}

/// Declare an enum together with its [`EncodedEnum`] implementation.
///
/// The first variant becomes ordinal 0 and therefore the default.
///
/// ```
/// butterfly_ev::encoded_enum! {
///     pub enum Curvy: "curvy" {
///         Straight => "straight",
///         Bendy => "bendy",
///     }
/// }
/// use butterfly_ev::ev::EncodedEnum;
/// assert_eq!(Curvy::find("BENDY"), Curvy::Bendy);
/// assert_eq!(Curvy::find("loopy"), Curvy::Straight);
/// ```
#[macro_export]
macro_rules! encoded_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $type_name:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::ev::EncodedEnum for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn values() -> &'static [Self] {
                &[$($name::$variant),+]
            }

            fn ordinal(self) -> usize {
                self as usize
            }

            fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::ev::EncodedEnum::as_str(*self))
            }
        }
    };
}

/// Smallest width able to hold `count` ordinals, at least one bit
pub fn bits_for(count: usize) -> u32 {
    let mut bits = 1;
    while (1usize << bits) < count {
        bits += 1;
    }
    bits
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumEncodedValue {
    #[serde(flatten)]
    pub(crate) field: BitField,
    enum_type: String,
    constants: Vec<String>,
}

impl EnumEncodedValue {
    pub fn new<E: EncodedEnum>(name: &str, two_directions: bool) -> Result<Self> {
        Self::build::<E>(name, None, two_directions)
    }

    /// Enum with an explicit width, e.g. to leave room for future constants.
    pub fn with_bits<E: EncodedEnum>(name: &str, bits: u32, two_directions: bool) -> Result<Self> {
        Self::build::<E>(name, Some(bits), two_directions)
    }

    fn build<E: EncodedEnum>(name: &str, bits: Option<u32>, two_directions: bool) -> Result<Self> {
        if E::values().is_empty() {
            return Err(EvError::invalid(name, "enum has no constants"));
        }
        if E::default_value().ordinal() != 0 {
            return Err(EvError::invalid(
                name,
                format!(
                    "default constant '{}' of {} must have ordinal 0",
                    E::default_value().as_str(),
                    E::TYPE_NAME
                ),
            ));
        }

        let constants: Vec<String> = E::values().iter().map(|v| v.as_str().to_string()).collect();
        let bits = bits.unwrap_or_else(|| bits_for(constants.len()));
        let value = Self {
            field: BitField::new(name, bits, two_directions)?,
            enum_type: E::TYPE_NAME.to_string(),
            constants,
        };
        value.check()?;
        Ok(value)
    }

    pub(crate) fn check(&self) -> Result<()> {
        self.field.check()?;
        let name = &self.field.name;
        if self.constants.is_empty() {
            return Err(EvError::invalid(name, "enum has no constants"));
        }
        let needed = bits_for(self.constants.len());
        if self.field.bits < needed {
            return Err(EvError::invalid(
                name,
                format!(
                    "{} bits cannot hold {} constants of {}",
                    self.field.bits,
                    self.constants.len(),
                    self.enum_type
                ),
            ));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn enum_type(&self) -> &str {
        &self.enum_type
    }

    pub fn constants(&self) -> &[String] {
        &self.constants
    }

    pub fn is_enum<E: EncodedEnum>(&self) -> bool {
        self.enum_type == E::TYPE_NAME
    }

    /// Ordinal of a constant by its tag spelling
    pub fn ordinal_of(&self, text: &str) -> Option<usize> {
        let text = text.trim();
        self.constants
            .iter()
            .position(|c| c.eq_ignore_ascii_case(text))
    }

    /// Stored ordinal, or 0 if the bits hold no known constant
    #[inline]
    pub fn get_ordinal(&self, direction: Direction, record: &[u32]) -> usize {
        let raw = self.field.read(direction, record) as usize;
        if raw < self.constants.len() {
            raw
        } else {
            0
        }
    }

    /// Store an ordinal; unknown ordinals store the default.
    #[inline]
    pub fn set_ordinal(&self, direction: Direction, record: &mut [u32], ordinal: usize) {
        let ordinal = if ordinal < self.constants.len() { ordinal } else { 0 };
        self.field.write(direction, record, ordinal as u32);
    }

    #[inline]
    pub fn get_enum<E: EncodedEnum>(&self, direction: Direction, record: &[u32]) -> E {
        E::from_ordinal(self.get_ordinal(direction, record))
    }

    /// Store `value`; a constant of another enum type stores the default.
    #[inline]
    pub fn set_enum<E: EncodedEnum>(&self, direction: Direction, record: &mut [u32], value: E) {
        let ordinal = if self.is_enum::<E>() { value.ordinal() } else { 0 };
        self.set_ordinal(direction, record, ordinal);
    }

    pub fn get_name(&self, direction: Direction, record: &[u32]) -> &str {
        &self.constants[self.get_ordinal(direction, record)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ev::allocator::BitAllocator;

    crate::encoded_enum! {
        enum Curve: "curve" {
            Straight => "straight",
            Medium => "medium",
            High => "high",
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Misordered {
        First,
        Second,
    }

    impl EncodedEnum for Misordered {
        const TYPE_NAME: &'static str = "misordered";

        fn values() -> &'static [Self] {
            &[Misordered::First, Misordered::Second]
        }

        fn ordinal(self) -> usize {
            self as usize
        }

        fn as_str(self) -> &'static str {
            match self {
                Misordered::First => "first",
                Misordered::Second => "second",
            }
        }

        fn default_value() -> Self {
            Misordered::Second
        }
    }

    fn placed(ev: &mut EnumEncodedValue) -> Vec<u32> {
        let mut alloc = BitAllocator::new();
        ev.field.init(&mut alloc).unwrap();
        vec![0u32; alloc.words_per_edge()]
    }

    #[test]
    fn test_bits_for() {
        assert_eq!(bits_for(1), 1);
        assert_eq!(bits_for(2), 1);
        assert_eq!(bits_for(3), 2);
        assert_eq!(bits_for(4), 2);
        assert_eq!(bits_for(5), 3);
        assert_eq!(bits_for(32), 5);
        assert_eq!(bits_for(33), 6);
    }

    #[test]
    fn test_fresh_record_reads_default() {
        let mut ev = EnumEncodedValue::new::<Curve>("road_curvature_classification", false).unwrap();
        let record = placed(&mut ev);
        assert_eq!(ev.field.bits, 2);
        assert_eq!(ev.get_enum::<Curve>(Direction::Forward, &record), Curve::Straight);
        assert_eq!(ev.get_name(Direction::Forward, &record), "straight");
    }

    #[test]
    fn test_round_trip_all_constants() {
        let mut ev = EnumEncodedValue::new::<Curve>("curve", true).unwrap();
        let mut record = placed(&mut ev);
        for &c in Curve::values() {
            ev.set_enum(Direction::Reverse, &mut record, c);
            assert_eq!(ev.get_enum::<Curve>(Direction::Reverse, &record), c);
            assert_eq!(ev.get_enum::<Curve>(Direction::Forward, &record), Curve::Straight);
        }
    }

    #[test]
    fn test_foreign_bits_read_as_default() {
        let mut ev = EnumEncodedValue::new::<Curve>("curve", false).unwrap();
        let mut record = placed(&mut ev);
        // ordinal 3 is representable in 2 bits but names no constant
        ev.field.write(Direction::Forward, &mut record, 3);
        assert_eq!(ev.get_ordinal(Direction::Forward, &record), 0);
        assert_eq!(ev.get_enum::<Curve>(Direction::Forward, &record), Curve::Straight);

        ev.set_ordinal(Direction::Forward, &mut record, 7);
        assert_eq!(ev.field.read(Direction::Forward, &record), 0);
    }

    #[test]
    fn test_find_is_case_insensitive_with_fallback() {
        assert_eq!(Curve::find("HIGH"), Curve::High);
        assert_eq!(Curve::find(" medium "), Curve::Medium);
        assert_eq!(Curve::find(""), Curve::Straight);
        assert_eq!(Curve::find("twisty"), Curve::Straight);
        assert_eq!(Curve::High.to_string(), "high");
    }

    #[test]
    fn test_explicit_width_validated() {
        assert!(EnumEncodedValue::with_bits::<Curve>("curve", 1, false).is_err());
        let ev = EnumEncodedValue::with_bits::<Curve>("curve", 5, false).unwrap();
        assert_eq!(ev.field.bits, 5);
    }

    #[test]
    fn test_default_must_be_ordinal_zero() {
        let err = EnumEncodedValue::new::<Misordered>("misordered", false).unwrap_err();
        assert!(matches!(err, EvError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_foreign_enum_type_stores_default() {
        let mut ev = EnumEncodedValue::new::<Curve>("curve", false).unwrap();
        let mut record = placed(&mut ev);
        ev.set_enum(Direction::Forward, &mut record, Curve::High);
        ev.set_enum(Direction::Forward, &mut record, Misordered::Second);
        assert_eq!(ev.get_enum::<Curve>(Direction::Forward, &record), Curve::Straight);
    }

    #[test]
    fn test_check_rejects_loaded_definitions() {
        let mut ev = EnumEncodedValue::new::<Curve>("curve", false).unwrap();
        ev.constants.clear();
        assert!(matches!(ev.check(), Err(EvError::InvalidDefinition { .. })));

        let mut ev = EnumEncodedValue::new::<Curve>("curve", false).unwrap();
        ev.constants.push("loopy".into());
        ev.constants.push("spiral".into());
        // five constants no longer fit the two bits sized for three
        assert!(ev.check().is_err());
    }

    #[test]
    fn test_ordinal_of() {
        let ev = EnumEncodedValue::new::<Curve>("curve", false).unwrap();
        assert_eq!(ev.ordinal_of("Medium"), Some(1));
        assert_eq!(ev.ordinal_of("nope"), None);
        assert!(ev.is_enum::<Curve>());
        assert!(!ev.is_enum::<Misordered>());
    }
}
