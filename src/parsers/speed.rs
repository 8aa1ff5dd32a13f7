//! Average speeds per mode, plus the shared ferry speed
//!
//! Highway tables give a base speed in km/h. Ferries take `ferry_speed`, which the
//! ferry calculator has already written into the record. Ways the mode's table does not
//! know keep speed 0.

use super::classification::surface_of;
use super::{parse_speed_kmh, TagParser};
use crate::config::PMap;
use crate::error::Result;
use crate::ev::values::{Smoothness, Surface, FERRY_SPEED, SMOOTHNESS};
use crate::ev::{DecimalEncodedValue, Direction, EncodedValueLookup, EnumEncodedValue};
use crate::reader::{ReaderWay, RelationFlags};

/// Ferry speed in km/h.
///
/// The reader supplies `speed_from_duration` when the route has a `duration` tag.
/// Boarding and waiting time is folded in by dividing by 1.4. Without a duration, very
/// short crossings get 1 km/h and everything else 6 km/h.
pub struct FerrySpeedCalculator {
    ferry_speed: DecimalEncodedValue,
}

impl FerrySpeedCalculator {
    pub fn ferry_speed(&self, way: &ReaderWay) -> f64 {
        let speed = match way.tag_f64("speed_from_duration") {
            Some(s) if s > 0.0 => s / 1.4,
            _ => match way.tag_f64("edge_distance") {
                Some(d) if d < 500.0 => 1.0,
                _ => 6.0,
            },
        };
        speed.clamp(
            self.ferry_speed.smallest_non_zero(),
            self.ferry_speed.max_storable(),
        )
    }
}

impl TagParser for FerrySpeedCalculator {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        if !way.is_ferry() {
            return;
        }
        let speed = self.ferry_speed(way);
        self.ferry_speed.set_decimal(Direction::Forward, record, speed);
    }
}

pub fn ferry_speed(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(FerrySpeedCalculator {
        ferry_speed: lookup.decimal_value(name)?,
    }))
}

/// Base car speed in km/h by highway type
fn car_highway_speed(highway: &str) -> Option<f64> {
    let speed = match highway {
        "motorway" => 110.0,
        "motorway_link" => 60.0,
        "trunk" => 90.0,
        "trunk_link" => 50.0,
        "primary" => 70.0,
        "primary_link" => 40.0,
        "secondary" => 60.0,
        "secondary_link" => 40.0,
        "tertiary" => 50.0,
        "tertiary_link" => 30.0,
        "unclassified" => 50.0,
        "residential" => 30.0,
        "road" => 20.0,
        "service" => 20.0,
        "track" => 15.0,
        "living_street" => 10.0,
        _ => return None,
    };
    Some(speed)
}

fn is_unpaved(surface: Surface) -> bool {
    matches!(
        surface,
        Surface::Unpaved
            | Surface::Compacted
            | Surface::FineGravel
            | Surface::Gravel
            | Surface::Ground
            | Surface::Dirt
            | Surface::Grass
            | Surface::Sand
    )
}

pub struct CarAverageSpeedParser {
    speed: DecimalEncodedValue,
    ferry_speed: DecimalEncodedValue,
}

impl CarAverageSpeedParser {
    /// Travel speed for one direction; legal limits are rarely driven in full
    fn directed_speed(base: f64, max_speed: Option<f64>, surface: Surface) -> f64 {
        let mut speed = match max_speed {
            Some(limit) => limit * 0.9,
            None => base,
        };
        if is_unpaved(surface) {
            speed = speed.min(30.0);
        }
        speed
    }
}

impl TagParser for CarAverageSpeedParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        if way.is_ferry() {
            let speed = self.ferry_speed.get_decimal(Direction::Forward, record);
            self.speed.set_decimal(Direction::Forward, record, speed);
            self.speed.set_decimal(Direction::Reverse, record, speed);
            return;
        }

        let Some(base) = way.tag("highway").and_then(car_highway_speed) else {
            self.speed.set_decimal(Direction::Forward, record, 0.0);
            self.speed.set_decimal(Direction::Reverse, record, 0.0);
            return;
        };

        let surface = surface_of(way.tag("surface"));
        let fwd = way
            .first_value(&["maxspeed:forward", "maxspeed"])
            .and_then(parse_speed_kmh);
        let bwd = way
            .first_value(&["maxspeed:backward", "maxspeed"])
            .and_then(parse_speed_kmh);

        self.speed
            .set_decimal(Direction::Forward, record, Self::directed_speed(base, fwd, surface));
        self.speed
            .set_decimal(Direction::Reverse, record, Self::directed_speed(base, bwd, surface));
    }
}

pub fn car_average_speed(
    name: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(CarAverageSpeedParser {
        speed: lookup.decimal_value(name)?,
        ferry_speed: lookup.decimal_value(FERRY_SPEED)?,
    }))
}

/// Walking pace for pushed sections
const PUSHING_SPEED: f64 = 4.0;

fn bike_highway_speed(highway: &str) -> Option<f64> {
    let speed = match highway {
        "cycleway" => 18.0,
        "residential" | "unclassified" | "tertiary" | "tertiary_link" | "secondary"
        | "secondary_link" | "primary" | "primary_link" | "road" => 18.0,
        "service" | "bridleway" => 14.0,
        "path" | "track" => 12.0,
        "living_street" => 6.0,
        "footway" | "pedestrian" | "platform" => 6.0,
        "steps" => 2.0,
        _ => return None,
    };
    Some(speed)
}

/// Upper bound imposed by the riding surface
fn bike_surface_cap(surface: Surface) -> f64 {
    match surface {
        Surface::PavingStones | Surface::Compacted | Surface::FineGravel => 16.0,
        Surface::Unpaved => 14.0,
        Surface::Gravel | Surface::Ground | Surface::Wood => 12.0,
        Surface::Cobblestone | Surface::Dirt => 10.0,
        Surface::Grass => 8.0,
        Surface::Sand => 6.0,
        _ => f64::INFINITY,
    }
}

fn smoothness_factor(smoothness: Smoothness) -> f64 {
    match smoothness {
        Smoothness::Excellent => 1.1,
        Smoothness::Intermediate => 0.9,
        Smoothness::Bad => 0.7,
        Smoothness::VeryBad => 0.4,
        Smoothness::Horrible => 0.3,
        Smoothness::VeryHorrible => 0.1,
        Smoothness::Impassable => 0.0,
        Smoothness::Missing | Smoothness::Good | Smoothness::Other => 1.0,
    }
}

pub struct BikeAverageSpeedParser {
    speed: DecimalEncodedValue,
    ferry_speed: DecimalEncodedValue,
    smoothness: EnumEncodedValue,
}

impl BikeAverageSpeedParser {
    pub fn speed_of(&self, way: &ReaderWay, record: &[u32]) -> f64 {
        if way.is_ferry() {
            return self.ferry_speed.get_decimal(Direction::Forward, record);
        }
        let Some(mut speed) = way.tag("highway").and_then(bike_highway_speed) else {
            return 0.0;
        };
        if way.has_tag_value("bicycle", "dismount") {
            return PUSHING_SPEED;
        }

        speed = speed.min(bike_surface_cap(surface_of(way.tag("surface"))));

        let smoothness = self
            .smoothness
            .get_enum::<Smoothness>(Direction::Forward, record);
        let smoothed = speed * smoothness_factor(smoothness);
        if smoothed <= 0.0 {
            // impassable
            return 0.0;
        }
        // rough ways still allow walking pace
        smoothed.max(PUSHING_SPEED.min(speed))
    }
}

impl TagParser for BikeAverageSpeedParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let speed = self.speed_of(way, record);
        self.speed.set_decimal(Direction::Forward, record, speed);
    }
}

pub fn bike_average_speed(
    name: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(BikeAverageSpeedParser {
        speed: lookup.decimal_value(name)?,
        ferry_speed: lookup.decimal_value(FERRY_SPEED)?,
        smoothness: lookup.enum_value::<Smoothness>(SMOOTHNESS)?,
    }))
}

pub struct FootAverageSpeedParser {
    speed: DecimalEncodedValue,
    ferry_speed: DecimalEncodedValue,
}

impl TagParser for FootAverageSpeedParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let speed = if way.is_ferry() {
            self.ferry_speed.get_decimal(Direction::Forward, record)
        } else {
            match way.tag("highway") {
                Some("steps") => 3.0,
                Some(
                    "footway" | "pedestrian" | "path" | "cycleway" | "residential"
                    | "living_street" | "unclassified" | "tertiary" | "tertiary_link"
                    | "secondary" | "secondary_link" | "primary" | "primary_link" | "service"
                    | "track" | "road" | "bridleway" | "platform",
                ) => 5.0,
                _ => 0.0,
            }
        };
        self.speed.set_decimal(Direction::Forward, record, speed);
    }
}

pub fn foot_average_speed(
    name: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(FootAverageSpeedParser {
        speed: lookup.decimal_value(name)?,
        ferry_speed: lookup.decimal_value(FERRY_SPEED)?,
    }))
}
