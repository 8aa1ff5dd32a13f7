//! Legal limits: max speed, weight and vehicle dimensions
//!
//! Absent or unparsable limits store `+inf`, meaning "no restriction known".

use super::{parse_length_m, parse_speed_kmh, parse_weight_tonnes, TagParser};
use crate::config::PMap;
use crate::error::Result;
use crate::ev::{DecimalEncodedValue, Direction, EncodedValueLookup};
use crate::reader::{ReaderWay, RelationFlags};

pub struct MaxSpeedParser {
    max_speed: DecimalEncodedValue,
}

impl TagParser for MaxSpeedParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let fwd = way
            .first_value(&["maxspeed:forward", "maxspeed"])
            .and_then(parse_speed_kmh);
        let bwd = way
            .first_value(&["maxspeed:backward", "maxspeed"])
            .and_then(parse_speed_kmh);

        self.max_speed
            .set_decimal(Direction::Forward, record, fwd.unwrap_or(f64::INFINITY));
        self.max_speed
            .set_decimal(Direction::Reverse, record, bwd.unwrap_or(f64::INFINITY));
    }
}

pub fn max_speed(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(MaxSpeedParser {
        max_speed: lookup.decimal_value(name)?,
    }))
}

/// First parsable value among `keys`, converted to the stored unit
pub struct MaxValueParser {
    value: DecimalEncodedValue,
    keys: &'static [&'static str],
    convert: fn(&str) -> Option<f64>,
}

impl TagParser for MaxValueParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let v = self
            .keys
            .iter()
            .filter_map(|k| way.tag(k))
            .find_map(self.convert)
            .unwrap_or(f64::INFINITY);
        self.value.set_decimal(Direction::Forward, record, v);
    }
}

fn max_value(
    name: &str,
    lookup: &EncodedValueLookup,
    keys: &'static [&'static str],
    convert: fn(&str) -> Option<f64>,
) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(MaxValueParser {
        value: lookup.decimal_value(name)?,
        keys,
        convert,
    }))
}

pub fn max_weight(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    max_value(name, lookup, &["maxweight", "maxgcweight"], parse_weight_tonnes)
}

pub fn max_axle_load(
    name: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    max_value(name, lookup, &["maxaxleload"], parse_weight_tonnes)
}

pub fn max_height(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    max_value(name, lookup, &["maxheight", "maxheight:physical"], parse_length_m)
}

pub fn max_width(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    max_value(name, lookup, &["maxwidth", "maxwidth:physical"], parse_length_m)
}

pub fn max_length(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    max_value(name, lookup, &["maxlength"], parse_length_m)
}
