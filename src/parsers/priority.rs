//! Bike and foot priority
//!
//! Priorities are graded on a 0..15 scale and stored as a decimal factor of 0.1, so
//! `UNCHANGED` reads back as 1.0. Route networks lift a way, busy roads push it down.

use super::{parse_speed_kmh, TagParser};
use crate::config::PMap;
use crate::error::Result;
use crate::ev::values::{Mode, RouteNetwork};
use crate::ev::{DecimalEncodedValue, Direction, EncodedValueLookup, EnumEncodedValue};
use crate::reader::{ReaderWay, RelationFlags};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriorityCode(u8);

impl PriorityCode {
    pub const EXCLUDE: Self = Self(0);
    pub const REACH_DESTINATION: Self = Self(1);
    pub const VERY_BAD: Self = Self(3);
    pub const BAD: Self = Self(5);
    pub const AVOID_MORE: Self = Self(6);
    pub const AVOID: Self = Self(8);
    pub const SLIGHT_AVOID: Self = Self(9);
    pub const UNCHANGED: Self = Self(10);
    pub const SLIGHT_PREFER: Self = Self(11);
    pub const PREFER: Self = Self(12);
    pub const VERY_NICE: Self = Self(13);
    pub const BEST: Self = Self(15);

    pub fn code(self) -> u8 {
        self.0
    }

    /// Stored factor, 1.0 for `UNCHANGED`
    pub fn value(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    fn better(self) -> Self {
        Self((self.0 + 1).min(Self::BEST.0))
    }
}

fn network_priority(network: RouteNetwork) -> Option<PriorityCode> {
    match network {
        RouteNetwork::International | RouteNetwork::National => Some(PriorityCode::BEST),
        RouteNetwork::Regional => Some(PriorityCode::VERY_NICE),
        RouteNetwork::Local => Some(PriorityCode::PREFER),
        RouteNetwork::Other => Some(PriorityCode::SLIGHT_PREFER),
        RouteNetwork::Missing => None,
    }
}

const DESIGNATED: &[&str] = &["designated", "official"];

pub struct BikePriorityParser {
    priority: DecimalEncodedValue,
    speed: DecimalEncodedValue,
    network: EnumEncodedValue,
}

impl BikePriorityParser {
    fn highway_priority(way: &ReaderWay) -> PriorityCode {
        let designated = way.has_tag_in("bicycle", DESIGNATED);
        match way.tag("highway") {
            Some("cycleway") => PriorityCode::VERY_NICE,
            Some("path") if designated => PriorityCode::VERY_NICE,
            Some("path" | "track" | "living_street" | "service" | "residential") => {
                PriorityCode::SLIGHT_PREFER
            }
            Some("footway" | "pedestrian" | "platform") if designated => PriorityCode::PREFER,
            Some("footway" | "pedestrian" | "platform") => PriorityCode::SLIGHT_AVOID,
            Some("steps") => PriorityCode::BAD,
            Some("trunk" | "trunk_link" | "motorway" | "motorway_link") => PriorityCode::VERY_BAD,
            Some("primary" | "primary_link") => PriorityCode::AVOID_MORE,
            Some("secondary" | "secondary_link") => PriorityCode::AVOID,
            _ => PriorityCode::UNCHANGED,
        }
    }

    fn has_cycle_lane(way: &ReaderWay) -> bool {
        ["cycleway", "cycleway:left", "cycleway:right", "cycleway:both"]
            .iter()
            .any(|k| way.has_tag_in(k, &["lane", "track", "shared_lane"]))
    }

    pub fn priority_of(&self, way: &ReaderWay, record: &[u32]) -> PriorityCode {
        if way.is_ferry() {
            return PriorityCode::AVOID;
        }
        if !way.has_tag("highway") {
            return PriorityCode::UNCHANGED;
        }

        let mut priority = Self::highway_priority(way);
        let lane = Self::has_cycle_lane(way);
        if lane {
            priority = priority.better();
        }

        // fast traffic without separation
        if !lane {
            match way.tag("maxspeed").and_then(parse_speed_kmh) {
                Some(limit) if limit > 80.0 => priority = priority.min(PriorityCode::AVOID_MORE),
                Some(limit) if limit > 50.0 => priority = priority.min(PriorityCode::AVOID),
                _ => {}
            }
        }

        let network = self.network.get_enum::<RouteNetwork>(Direction::Forward, record);
        if let Some(p) = network_priority(network) {
            priority = priority.max(p);
        }

        // slow sections mean pushing or rough ground
        let speed = self.speed.get_decimal(Direction::Forward, record);
        if speed > 0.0 && speed < 10.0 {
            priority = priority.min(PriorityCode::SLIGHT_AVOID);
        }
        priority
    }
}

impl TagParser for BikePriorityParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let priority = self.priority_of(way, record);
        self.priority
            .set_decimal(Direction::Forward, record, priority.value());
    }
}

pub fn bike_priority(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(BikePriorityParser {
        priority: lookup.decimal_value(name)?,
        speed: lookup.decimal_value(&Mode::Bike.speed_key())?,
        network: lookup.enum_value::<RouteNetwork>(&Mode::Bike.network_key())?,
    }))
}

pub struct FootPriorityParser {
    priority: DecimalEncodedValue,
    network: EnumEncodedValue,
}

impl FootPriorityParser {
    pub fn priority_of(&self, way: &ReaderWay, record: &[u32]) -> PriorityCode {
        if way.is_ferry() {
            return PriorityCode::AVOID;
        }
        let Some(highway) = way.tag("highway") else {
            return PriorityCode::UNCHANGED;
        };

        let sidewalk = way.has_tag_in("sidewalk", &["yes", "both", "left", "right"]);
        let mut priority = match highway {
            "footway" | "pedestrian" | "living_street" | "platform" => PriorityCode::PREFER,
            "path" | "track" | "steps" => PriorityCode::SLIGHT_PREFER,
            "residential" | "service" => PriorityCode::UNCHANGED,
            "trunk" | "trunk_link" | "primary" | "primary_link" if !sidewalk => {
                PriorityCode::AVOID_MORE
            }
            "secondary" | "secondary_link" | "tertiary" | "tertiary_link" if !sidewalk => {
                PriorityCode::AVOID
            }
            _ => PriorityCode::UNCHANGED,
        };

        if way.has_tag_in("foot", DESIGNATED) {
            priority = priority.max(PriorityCode::PREFER);
        }

        if !sidewalk {
            if let Some(limit) = way.tag("maxspeed").and_then(parse_speed_kmh) {
                if limit > 50.0 {
                    priority = priority.min(PriorityCode::AVOID);
                }
            }
        }

        let network = self.network.get_enum::<RouteNetwork>(Direction::Forward, record);
        if let Some(p) = network_priority(network) {
            priority = priority.max(p);
        }
        priority
    }
}

impl TagParser for FootPriorityParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let priority = self.priority_of(way, record);
        self.priority
            .set_decimal(Direction::Forward, record, priority.value());
    }
}

pub fn foot_priority(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(FootPriorityParser {
        priority: lookup.decimal_value(name)?,
        network: lookup.enum_value::<RouteNetwork>(&Mode::Foot.network_key())?,
    }))
}
