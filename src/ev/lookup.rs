//! Name → encoded value registry
//!
//! Registration order is preserved and determines bit placement. Typed getters hand out
//! clones, so parsers own their descriptors and never borrow the lookup.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::allocator::BitAllocator;
use super::{
    BooleanEncodedValue, DecimalEncodedValue, EncodedEnum, EncodedValue, EnumEncodedValue,
    IntEncodedValue, ValueKind,
};
use crate::error::{EvError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "LookupManifest", into = "LookupManifest")]
pub struct EncodedValueLookup {
    values: Vec<EncodedValue>,
    index: FxHashMap<String, usize>,
    allocator: BitAllocator,
}

/// Serialized form of a frozen lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupManifest {
    pub words_per_edge: usize,
    pub encoded_values: Vec<EncodedValue>,
}

impl EncodedValueLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `value` in the record and make it retrievable by name.
    pub fn register(&mut self, mut value: EncodedValue) -> Result<()> {
        if self.index.contains_key(value.name()) {
            return Err(EvError::Duplicate(value.name().to_string()));
        }
        value.init(&mut self.allocator)?;

        let p = value.placement();
        debug!(
            name = value.name(),
            kind = %value.kind(),
            word = p.word,
            shift = p.shift,
            bits = p.bits,
            two_directions = p.two_directions,
            "Registered encoded value"
        );

        self.index.insert(value.name().to_string(), self.values.len());
        self.values.push(value);
        Ok(())
    }

    pub fn has(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&EncodedValue> {
        self.index
            .get(name)
            .map(|&i| &self.values[i])
            .ok_or_else(|| EvError::NotRegistered(name.to_string()))
    }

    /// Registered values in registration order
    pub fn values(&self) -> &[EncodedValue] {
        &self.values
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.name())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn boolean_value(&self, name: &str) -> Result<BooleanEncodedValue> {
        match self.get(name)? {
            EncodedValue::Boolean(v) => Ok(v.clone()),
            other => Err(mismatch(name, ValueKind::Boolean.to_string(), other)),
        }
    }

    pub fn int_value(&self, name: &str) -> Result<IntEncodedValue> {
        match self.get(name)? {
            EncodedValue::Int(v) => Ok(v.clone()),
            other => Err(mismatch(name, ValueKind::Int.to_string(), other)),
        }
    }

    pub fn decimal_value(&self, name: &str) -> Result<DecimalEncodedValue> {
        match self.get(name)? {
            EncodedValue::Decimal(v) => Ok(v.clone()),
            other => Err(mismatch(name, ValueKind::Decimal.to_string(), other)),
        }
    }

    /// Enum value of the given enum type; a different enum type is a mismatch too.
    pub fn enum_value<E: EncodedEnum>(&self, name: &str) -> Result<EnumEncodedValue> {
        let expected = format!("enum {}", E::TYPE_NAME);
        match self.get(name)? {
            EncodedValue::Enum(v) if v.is_enum::<E>() => Ok(v.clone()),
            other => Err(mismatch(name, expected, other)),
        }
    }

    /// Stop accepting registrations; the record width is final afterwards.
    pub fn freeze(&mut self) {
        self.allocator.freeze();
    }

    pub fn is_frozen(&self) -> bool {
        self.allocator.is_frozen()
    }

    pub fn words_per_edge(&self) -> usize {
        self.allocator.words_per_edge()
    }

    /// Zeroed record of the current width
    pub fn new_record(&self) -> Vec<u32> {
        vec![0; self.words_per_edge()]
    }

    /// Check that no two registered values share a bit.
    pub fn check_disjoint(&self) -> Result<()> {
        for (i, a) in self.values.iter().enumerate() {
            for b in &self.values[i + 1..] {
                if a.placement().overlaps(&b.placement()) {
                    return Err(EvError::invalid(
                        b.name(),
                        format!("bits overlap with '{}'", a.name()),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn to_manifest(&self) -> LookupManifest {
        LookupManifest {
            words_per_edge: self.words_per_edge(),
            encoded_values: self.values.clone(),
        }
    }

    /// Rebuild a frozen lookup from a manifest, validating every definition and placement.
    pub fn from_manifest(manifest: LookupManifest) -> Result<Self> {
        let mut index = FxHashMap::default();
        for (i, value) in manifest.encoded_values.iter().enumerate() {
            value.check_definition()?;
            let p = value.placement();
            if !p.is_placed() || p.bits != value.bits() || p.two_directions != value.is_two_directions() {
                return Err(EvError::invalid(value.name(), "placement does not match definition"));
            }
            let end = p.shift.checked_add(p.used_bits());
            if p.word as usize >= manifest.words_per_edge
                || end.map_or(true, |end| end > super::WORD_BITS)
            {
                return Err(EvError::invalid(value.name(), "placement outside the edge record"));
            }
            if index.insert(value.name().to_string(), i).is_some() {
                return Err(EvError::Duplicate(value.name().to_string()));
            }
        }

        let lookup = Self {
            values: manifest.encoded_values,
            index,
            allocator: BitAllocator::frozen_with_words(manifest.words_per_edge),
        };
        lookup.check_disjoint()?;
        Ok(lookup)
    }
}

fn mismatch(name: &str, expected: String, actual: &EncodedValue) -> EvError {
    let actual = match actual {
        EncodedValue::Enum(v) => format!("enum {}", v.enum_type()),
        other => other.kind().to_string(),
    };
    EvError::TypeMismatch {
        name: name.to_string(),
        expected,
        actual,
    }
}

impl TryFrom<LookupManifest> for EncodedValueLookup {
    type Error = EvError;

    fn try_from(manifest: LookupManifest) -> Result<Self> {
        Self::from_manifest(manifest)
    }
}

impl From<EncodedValueLookup> for LookupManifest {
    fn from(lookup: EncodedValueLookup) -> Self {
        LookupManifest {
            words_per_edge: lookup.words_per_edge(),
            encoded_values: lookup.values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ev::values::{RoadClass, Surface};
    use crate::ev::Direction;

    fn sample() -> EncodedValueLookup {
        let mut lookup = EncodedValueLookup::new();
        lookup
            .register(BooleanEncodedValue::new("roundabout", false).unwrap().into())
            .unwrap();
        lookup
            .register(EnumEncodedValue::new::<RoadClass>("road_class", false).unwrap().into())
            .unwrap();
        lookup
            .register(DecimalEncodedValue::new("car_average_speed", 7, 2.0, true).unwrap().into())
            .unwrap();
        lookup
            .register(IntEncodedValue::new("osm_way_id", 31, false).unwrap().into())
            .unwrap();
        lookup
    }

    #[test]
    fn test_register_and_typed_get() {
        let lookup = sample();
        assert_eq!(lookup.len(), 4);
        assert_eq!(
            lookup.names().collect::<Vec<_>>(),
            vec!["roundabout", "road_class", "car_average_speed", "osm_way_id"]
        );
        assert!(lookup.boolean_value("roundabout").is_ok());
        assert!(lookup.enum_value::<RoadClass>("road_class").is_ok());
        assert!(lookup.decimal_value("car_average_speed").is_ok());
        assert!(lookup.int_value("osm_way_id").is_ok());
        assert_eq!(lookup.words_per_edge(), 2);
        lookup.check_disjoint().unwrap();
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut lookup = sample();
        let err = lookup
            .register(BooleanEncodedValue::new("roundabout", true).unwrap().into())
            .unwrap_err();
        assert_eq!(err, EvError::Duplicate("roundabout".into()));
        assert_eq!(lookup.len(), 4);
    }

    #[test]
    fn test_type_mismatch() {
        let lookup = sample();
        assert!(matches!(
            lookup.int_value("roundabout"),
            Err(EvError::TypeMismatch { .. })
        ));
        assert!(matches!(
            lookup.boolean_value("car_average_speed"),
            Err(EvError::TypeMismatch { .. })
        ));
        let err = lookup.enum_value::<Surface>("road_class").unwrap_err();
        assert_eq!(
            err,
            EvError::TypeMismatch {
                name: "road_class".into(),
                expected: "enum surface".into(),
                actual: "enum road_class".into(),
            }
        );
        assert_eq!(
            lookup.get("surface").unwrap_err(),
            EvError::NotRegistered("surface".into())
        );
    }

    #[test]
    fn test_frozen_lookup_refuses_registration() {
        let mut lookup = sample();
        lookup.freeze();
        let err = lookup
            .register(BooleanEncodedValue::new("late", false).unwrap().into())
            .unwrap_err();
        assert_eq!(err, EvError::AllocatorFrozen("late".into()));
        assert!(!lookup.has("late"));
    }

    #[test]
    fn test_manifest_round_trip() {
        let mut lookup = sample();
        lookup.freeze();

        let speed = lookup.decimal_value("car_average_speed").unwrap();
        let mut record = lookup.new_record();
        speed.set_decimal(Direction::Reverse, &mut record, 88.0);

        let json = serde_json::to_string(&lookup).unwrap();
        let back: EncodedValueLookup = serde_json::from_str(&json).unwrap();
        assert!(back.is_frozen());
        assert_eq!(back.words_per_edge(), lookup.words_per_edge());
        assert_eq!(back.values(), lookup.values());

        let speed = back.decimal_value("car_average_speed").unwrap();
        assert_eq!(speed.get_decimal(Direction::Reverse, &record), 88.0);
    }

    fn manifest_json() -> serde_json::Value {
        let mut lookup = sample();
        lookup.freeze();
        serde_json::to_value(&lookup).unwrap()
    }

    fn load(json: serde_json::Value) -> EvError {
        let manifest: LookupManifest = serde_json::from_value(json).unwrap();
        EncodedValueLookup::from_manifest(manifest).unwrap_err()
    }

    #[test]
    fn test_manifest_shift_overflow_rejected() {
        let mut json = manifest_json();
        json["encoded_values"][0]["placement"]["shift"] = u32::MAX.into();
        assert!(matches!(load(json.clone()), EvError::InvalidDefinition { .. }));
        assert!(serde_json::from_value::<EncodedValueLookup>(json).is_err());
    }

    #[test]
    fn test_manifest_empty_enum_rejected() {
        let mut json = manifest_json();
        json["encoded_values"][1]["constants"] = serde_json::json!([]);
        let err = load(json);
        assert_eq!(err, EvError::invalid("road_class", "enum has no constants"));
    }

    #[test]
    fn test_manifest_enum_wider_than_bits_rejected() {
        let mut json = manifest_json();
        let constants: Vec<String> = (0..40).map(|i| format!("c{i}")).collect();
        json["encoded_values"][1]["constants"] = serde_json::json!(constants);
        assert!(matches!(load(json), EvError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_manifest_zero_factor_rejected() {
        let mut json = manifest_json();
        json["encoded_values"][2]["factor"] = serde_json::json!(0.0);
        let err = load(json);
        assert!(matches!(&err, EvError::InvalidDefinition { name, .. } if name == "car_average_speed"));
        assert!(err.to_string().contains("factor"));
    }

    #[test]
    fn test_manifest_oversized_bits_rejected() {
        let mut json = manifest_json();
        json["encoded_values"][3]["bits"] = serde_json::json!(40);
        json["encoded_values"][3]["placement"]["bits"] = serde_json::json!(40);
        assert!(matches!(load(json), EvError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_manifest_with_overlap_rejected() {
        let mut manifest = sample().to_manifest();
        let first = manifest.encoded_values[0].clone();
        if let EncodedValue::Boolean(mut b) = first {
            b.field.name = "other".into();
            manifest.encoded_values.push(b.into());
        }
        assert!(EncodedValueLookup::from_manifest(manifest).is_err());
    }
}
