use serde::{Deserialize, Serialize};

use super::field::BitField;
use super::Direction;
use crate::error::{EvError, Result};

/// Scaled decimal: stores `round(value / factor)` clamped to `[0, 2^bits - 1]`.
///
/// With `use_max_as_infinity` the largest raw value is reserved for `+inf`, so finite
/// values clamp one step below it. `NaN` and negative input store 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecimalEncodedValue {
    #[serde(flatten)]
    pub(crate) field: BitField,
    factor: f64,
    use_max_as_infinity: bool,
}

impl DecimalEncodedValue {
    pub fn new(name: &str, bits: u32, factor: f64, two_directions: bool) -> Result<Self> {
        Self::build(name, bits, factor, two_directions, false)
    }

    /// Decimal whose maximum raw value means "unlimited", e.g. a missing max speed.
    pub fn with_infinity(name: &str, bits: u32, factor: f64, two_directions: bool) -> Result<Self> {
        Self::build(name, bits, factor, two_directions, true)
    }

    fn build(
        name: &str,
        bits: u32,
        factor: f64,
        two_directions: bool,
        use_max_as_infinity: bool,
    ) -> Result<Self> {
        let value = Self {
            field: BitField::new(name, bits, two_directions)?,
            factor,
            use_max_as_infinity,
        };
        value.check()?;
        Ok(value)
    }

    pub(crate) fn check(&self) -> Result<()> {
        self.field.check()?;
        let name = &self.field.name;
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err(EvError::invalid(
                name,
                format!("factor must be finite and positive, got {}", self.factor),
            ));
        }
        if self.use_max_as_infinity && self.field.bits < 2 {
            return Err(EvError::invalid(
                name,
                "reserving infinity needs at least 2 bits",
            ));
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn uses_infinity(&self) -> bool {
        self.use_max_as_infinity
    }

    /// Largest raw value a finite decimal may occupy
    fn max_finite_raw(&self) -> u32 {
        if self.use_max_as_infinity {
            self.field.max_raw() - 1
        } else {
            self.field.max_raw()
        }
    }

    /// Largest finite value that survives a round trip
    pub fn max_storable(&self) -> f64 {
        self.max_finite_raw() as f64 * self.factor
    }

    pub fn smallest_non_zero(&self) -> f64 {
        self.factor
    }

    #[inline]
    pub fn get_decimal(&self, direction: Direction, record: &[u32]) -> f64 {
        let raw = self.field.read(direction, record);
        if self.use_max_as_infinity && raw == self.field.max_raw() {
            f64::INFINITY
        } else {
            raw as f64 * self.factor
        }
    }

    #[inline]
    pub fn set_decimal(&self, direction: Direction, record: &mut [u32], value: f64) {
        let raw = if value.is_nan() || value <= 0.0 {
            0
        } else if value == f64::INFINITY && self.use_max_as_infinity {
            self.field.max_raw()
        } else {
            let scaled = (value / self.factor).round();
            let max = self.max_finite_raw();
            if scaled >= max as f64 {
                max
            } else {
                scaled as u32
            }
        };
        self.field.write(direction, record, raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ev::allocator::BitAllocator;

    fn place(mut ev: DecimalEncodedValue) -> (DecimalEncodedValue, Vec<u32>) {
        let mut alloc = BitAllocator::new();
        ev.field.init(&mut alloc).unwrap();
        let record = vec![0u32; alloc.words_per_edge()];
        (ev, record)
    }

    #[test]
    fn test_four_bits_factor_two_clamps_at_thirty() {
        let (ev, mut record) = place(DecimalEncodedValue::new("bike_average_speed", 4, 2.0, false).unwrap());
        assert_eq!(ev.max_storable(), 30.0);

        ev.set_decimal(Direction::Forward, &mut record, 30.0);
        assert_eq!(ev.get_decimal(Direction::Forward, &record), 30.0);

        ev.set_decimal(Direction::Forward, &mut record, 40.0);
        assert_eq!(ev.get_decimal(Direction::Forward, &record), 30.0);
    }

    #[test]
    fn test_rounds_to_nearest_step() {
        let (ev, mut record) = place(DecimalEncodedValue::new("speed", 5, 2.0, false).unwrap());
        ev.set_decimal(Direction::Forward, &mut record, 13.1);
        assert_eq!(ev.get_decimal(Direction::Forward, &record), 14.0);
        ev.set_decimal(Direction::Forward, &mut record, 12.9);
        assert_eq!(ev.get_decimal(Direction::Forward, &record), 12.0);
        ev.set_decimal(Direction::Forward, &mut record, 0.9);
        assert_eq!(ev.get_decimal(Direction::Forward, &record), 0.0);
    }

    #[test]
    fn test_negative_and_nan_store_zero() {
        let (ev, mut record) = place(DecimalEncodedValue::new("speed", 5, 1.0, false).unwrap());
        ev.set_decimal(Direction::Forward, &mut record, 10.0);
        ev.set_decimal(Direction::Forward, &mut record, -5.0);
        assert_eq!(ev.get_decimal(Direction::Forward, &record), 0.0);
        ev.set_decimal(Direction::Forward, &mut record, 10.0);
        ev.set_decimal(Direction::Forward, &mut record, f64::NAN);
        assert_eq!(ev.get_decimal(Direction::Forward, &record), 0.0);
    }

    #[test]
    fn test_infinity_without_reservation_clamps() {
        let (ev, mut record) = place(DecimalEncodedValue::new("speed", 4, 1.0, false).unwrap());
        ev.set_decimal(Direction::Forward, &mut record, f64::INFINITY);
        assert_eq!(ev.get_decimal(Direction::Forward, &record), 15.0);
    }

    #[test]
    fn test_use_max_as_infinity() {
        let (ev, mut record) = place(DecimalEncodedValue::with_infinity("max_speed", 7, 2.0, true).unwrap());
        assert_eq!(ev.max_storable(), 252.0);

        ev.set_decimal(Direction::Forward, &mut record, f64::INFINITY);
        ev.set_decimal(Direction::Reverse, &mut record, 50.0);
        assert_eq!(ev.get_decimal(Direction::Forward, &record), f64::INFINITY);
        assert_eq!(ev.get_decimal(Direction::Reverse, &record), 50.0);

        // finite values never turn into infinity
        ev.set_decimal(Direction::Reverse, &mut record, 1000.0);
        assert_eq!(ev.get_decimal(Direction::Reverse, &record), 252.0);
    }

    #[test]
    fn test_invalid_factor_rejected() {
        assert!(DecimalEncodedValue::new("x", 4, 0.0, false).is_err());
        assert!(DecimalEncodedValue::new("x", 4, -1.0, false).is_err());
        assert!(DecimalEncodedValue::new("x", 4, f64::NAN, false).is_err());
        assert!(DecimalEncodedValue::with_infinity("x", 1, 1.0, false).is_err());
    }
}
