//! Access parsers
//!
//! Each mode checks the highway type, then the most specific access tag present
//! (`motorcar` before `motor_vehicle` before `vehicle` before `access`), then oneway
//! rules. Roundabouts are read back from the record, which the roundabout parser has
//! already written since access units depend on it.

use rustc_hash::FxHashSet;
use tracing::warn;

use super::{oneway_from, Oneway, TagParser, YES_VALUES};
use crate::config::PMap;
use crate::error::Result;
use crate::ev::values::{Mode, ModeRoadAccess, RoadAccess, ROUNDABOUT};
use crate::ev::{BooleanEncodedValue, Direction, EncodedValueLookup, EnumEncodedValue};
use crate::reader::{ReaderWay, RelationFlags};

/// Access tag keys for a mode, most specific first
pub fn restriction_keys(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::Car => &["motorcar", "motor_vehicle", "vehicle", "access"],
        Mode::Bike | Mode::Mtb => &["bicycle", "vehicle", "access"],
        Mode::Foot => &["foot", "access"],
        Mode::Bus => &["bus", "psv", "motor_vehicle", "vehicle", "access"],
        Mode::Hov => &["hov", "motor_vehicle", "vehicle", "access"],
    }
}

/// Values of an access tag that close the way for the mode
const RESTRICTED_VALUES: &[&str] = &[
    "no",
    "restricted",
    "private",
    "agricultural",
    "forestry",
    "delivery",
    "military",
    "emergency",
    "customers",
    "permit",
];

const DEFAULT_BARRIERS: &[&str] = &[
    "kissing_gate",
    "fence",
    "bollard",
    "stile",
    "turnstile",
    "cycle_barrier",
    "motorcycle_barrier",
    "block",
    "bus_trap",
    "sump_buster",
    "jersey_barrier",
];

/// Forward and reverse access from a oneway state
fn directions(access: bool, oneway: Oneway) -> (bool, bool) {
    (
        access && oneway != Oneway::Backward,
        access && oneway != Oneway::Forward,
    )
}

fn set_access(ev: &BooleanEncodedValue, record: &mut [u32], access: (bool, bool)) {
    ev.set_bool(Direction::Forward, record, access.0);
    ev.set_bool(Direction::Reverse, record, access.1);
}

pub struct CarAccessParser {
    access: BooleanEncodedValue,
    roundabout: BooleanEncodedValue,
}

impl CarAccessParser {
    fn is_accessible(&self, way: &ReaderWay) -> bool {
        let first = way.first_value(restriction_keys(Mode::Car));
        if first.is_some_and(|v| RESTRICTED_VALUES.contains(&v)) {
            return false;
        }

        if way.is_ferry() {
            return first.is_some_and(|v| YES_VALUES.contains(&v) || v == "destination");
        }

        let Some(highway) = way.tag("highway") else {
            return false;
        };
        match highway {
            "motorway" | "motorway_link" | "trunk" | "trunk_link" | "primary" | "primary_link"
            | "secondary" | "secondary_link" | "tertiary" | "tertiary_link" | "unclassified"
            | "residential" | "service" | "living_street" | "road" => true,
            // tracks and paths only when tagged for cars
            _ => first.is_some_and(|v| YES_VALUES.contains(&v) || v == "destination"),
        }
    }
}

impl TagParser for CarAccessParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let access = self.is_accessible(way);

        let mut oneway = oneway_from(way.first_value(&["oneway:motor_vehicle", "oneway"]));
        let implied = self.roundabout.get_bool(Direction::Forward, record)
            || way.has_tag_in("highway", &["motorway", "motorway_link"]);
        if oneway == Oneway::No && implied && !way.has_tag_value("oneway", "no") {
            oneway = Oneway::Forward;
        }

        set_access(&self.access, record, directions(access, oneway));
    }
}

pub fn car_access(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(CarAccessParser {
        access: lookup.boolean_value(name)?,
        roundabout: lookup.boolean_value(ROUNDABOUT)?,
    }))
}

pub struct BikeAccessParser {
    access: BooleanEncodedValue,
    roundabout: BooleanEncodedValue,
}

impl BikeAccessParser {
    fn is_accessible(&self, way: &ReaderWay) -> bool {
        let first = way.first_value(restriction_keys(Mode::Bike));
        if first.is_some_and(|v| RESTRICTED_VALUES.contains(&v)) {
            return false;
        }
        // dismount keeps the way open, pushing is flagged by get_off_bike
        let intended = first.is_some_and(|v| YES_VALUES.contains(&v) || v == "dismount");

        if way.is_ferry() {
            return intended || first.is_none();
        }

        match way.tag("highway") {
            Some(
                "cycleway" | "path" | "footway" | "pedestrian" | "steps" | "residential"
                | "unclassified" | "tertiary" | "tertiary_link" | "secondary" | "secondary_link"
                | "primary" | "primary_link" | "service" | "living_street" | "track" | "road"
                | "bridleway",
            ) => true,
            Some(_) => intended,
            None => false,
        }
    }

    fn oneway(&self, way: &ReaderWay, record: &[u32]) -> Oneway {
        if let Some(v) = way.tag("oneway:bicycle") {
            return oneway_from(Some(v));
        }
        if way.has_tag_in("cycleway", &["opposite", "opposite_lane", "opposite_track"]) {
            return Oneway::No;
        }
        let oneway = oneway_from(way.tag("oneway"));
        if oneway == Oneway::No && self.roundabout.get_bool(Direction::Forward, record) {
            return Oneway::Forward;
        }
        oneway
    }
}

impl TagParser for BikeAccessParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let access = self.is_accessible(way);
        let oneway = self.oneway(way, record);
        set_access(&self.access, record, directions(access, oneway));
    }
}

pub fn bike_access(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(BikeAccessParser {
        access: lookup.boolean_value(name)?,
        roundabout: lookup.boolean_value(ROUNDABOUT)?,
    }))
}

/// Pedestrians ignore oneway restrictions unless `oneway:foot` says otherwise.
pub struct FootAccessParser {
    access: BooleanEncodedValue,
}

impl FootAccessParser {
    fn is_accessible(way: &ReaderWay) -> bool {
        let first = way.first_value(restriction_keys(Mode::Foot));
        if first.is_some_and(|v| RESTRICTED_VALUES.contains(&v) && v != "customers") {
            return false;
        }
        let intended = first.is_some_and(|v| YES_VALUES.contains(&v));

        if way.is_ferry() {
            return true;
        }
        if way.has_tag_value("sidewalk", "separate") && !intended {
            return false;
        }

        match way.tag("highway") {
            Some(
                "footway" | "pedestrian" | "steps" | "path" | "cycleway" | "residential"
                | "living_street" | "unclassified" | "tertiary" | "tertiary_link" | "secondary"
                | "secondary_link" | "primary" | "primary_link" | "service" | "track" | "road"
                | "bridleway" | "platform",
            ) => true,
            Some(_) => intended,
            None => false,
        }
    }
}

impl TagParser for FootAccessParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let access = Self::is_accessible(way);
        let oneway = oneway_from(way.tag("oneway:foot"));
        set_access(&self.access, record, directions(access, oneway));
    }
}

pub fn foot_access(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(FootAccessParser {
        access: lookup.boolean_value(name)?,
    }))
}

/// Configurable access for motorised modes such as bus or HOV.
///
/// `restrictions` lists the access values that close a way, `barriers` the node
/// barriers that block it. Both fall back to built-in sets when not configured.
pub struct ModeAccessParser {
    access: BooleanEncodedValue,
    roundabout: BooleanEncodedValue,
    keys: &'static [&'static str],
    oneway_key: String,
    restricted: FxHashSet<String>,
    barriers: FxHashSet<String>,
}

impl ModeAccessParser {
    fn is_accessible(&self, way: &ReaderWay) -> bool {
        let first = way.first_value(self.keys);
        if first.is_some_and(|v| self.restricted.contains(v)) {
            return false;
        }
        if !way.has_tag("highway") && !way.is_ferry() {
            return false;
        }
        !self.blocked_by_barrier(way)
    }

    fn blocked_by_barrier(&self, way: &ReaderWay) -> bool {
        way.node_tags.iter().any(|node| {
            let Some(barrier) = node.get("barrier") else {
                return false;
            };
            if !self.barriers.contains(barrier.as_str()) {
                return false;
            }
            // a node tagged for this mode lets it through
            let allowed = self
                .keys
                .iter()
                .find_map(|k| node.get(*k))
                .is_some_and(|v| YES_VALUES.contains(&v.as_str()));
            !allowed
        })
    }
}

impl TagParser for ModeAccessParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let access = self.is_accessible(way);
        let mut oneway = oneway_from(way.first_value(&[self.oneway_key.as_str(), "oneway"]));
        if way.tag(&self.oneway_key) != Some("no")
            && oneway == Oneway::No
            && self.roundabout.get_bool(Direction::Forward, record)
        {
            oneway = Oneway::Forward;
        }
        set_access(&self.access, record, directions(access, oneway));
    }
}

fn mode_access(
    mode: Mode,
    name: &str,
    lookup: &EncodedValueLookup,
    props: &PMap,
) -> Result<Box<dyn TagParser>> {
    let set = |key: &str, default: &[&str]| -> FxHashSet<String> {
        let configured = props.get_set(key);
        if configured.is_empty() {
            default.iter().map(|s| s.to_string()).collect()
        } else {
            configured.into_iter().collect()
        }
    };

    let restricted = set("restrictions", RESTRICTED_VALUES);
    for value in restricted.iter().filter(|v| YES_VALUES.contains(&v.as_str())) {
        warn!(unit = name, value = %value, "Restriction value normally grants access");
    }

    Ok(Box::new(ModeAccessParser {
        access: lookup.boolean_value(name)?,
        roundabout: lookup.boolean_value(ROUNDABOUT)?,
        keys: restriction_keys(mode),
        oneway_key: format!("oneway:{}", mode.as_str()),
        restricted,
        barriers: set("barriers", DEFAULT_BARRIERS),
    }))
}

pub fn bus_access(name: &str, lookup: &EncodedValueLookup, props: &PMap) -> Result<Box<dyn TagParser>> {
    mode_access(Mode::Bus, name, lookup, props)
}

pub fn hov_access(name: &str, lookup: &EncodedValueLookup, props: &PMap) -> Result<Box<dyn TagParser>> {
    mode_access(Mode::Hov, name, lookup, props)
}

/// Marks sections where cyclists have to push: footways without bicycle permission,
/// steps, `bicycle=dismount`, and the closed direction of a bike oneway.
pub struct GetOffBikeParser {
    get_off_bike: BooleanEncodedValue,
    bike_access: BooleanEncodedValue,
}

const PUSH_HIGHWAYS: &[&str] = &["path", "footway", "pedestrian", "platform"];
const BIKE_INTENDED: &[&str] = &["yes", "designated", "official", "permissive"];

impl TagParser for GetOffBikeParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let push_way = (way.has_tag_in("highway", PUSH_HIGHWAYS)
            || way.has_tag_value("railway", "platform"))
            && !way.has_tag_in("bicycle", BIKE_INTENDED);
        let push = push_way
            || way.has_tag_value("highway", "steps")
            || way.has_tag_value("bicycle", "dismount");

        let fwd = self.bike_access.get_bool(Direction::Forward, record);
        let bwd = self.bike_access.get_bool(Direction::Reverse, record);
        let one_directional = fwd != bwd;

        self.get_off_bike
            .set_bool(Direction::Forward, record, push || (one_directional && !fwd));
        self.get_off_bike
            .set_bool(Direction::Reverse, record, push || (one_directional && !bwd));
    }
}

pub fn get_off_bike(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(GetOffBikeParser {
        get_off_bike: lookup.boolean_value(name)?,
        bike_access: lookup.boolean_value(&Mode::Bike.access_key())?,
    }))
}

/// Restriction level from the most specific access tag, stored as an enum.
pub struct RoadAccessParser {
    access: EnumEncodedValue,
    keys: &'static [&'static str],
}

fn normalize_access(value: &str) -> &str {
    match value {
        "official" => "designated",
        "permit" => "private",
        "use_sidepath" => "destination",
        v => v,
    }
}

impl TagParser for RoadAccessParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let ordinal = way
            .first_value(self.keys)
            .and_then(|v| self.access.ordinal_of(normalize_access(v)))
            .unwrap_or(0);
        self.access.set_ordinal(Direction::Forward, record, ordinal);
    }
}

pub fn road_access(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(RoadAccessParser {
        access: lookup.enum_value::<RoadAccess>(name)?,
        keys: restriction_keys(Mode::Car),
    }))
}

pub fn bike_road_access(
    name: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(RoadAccessParser {
        access: lookup.enum_value::<ModeRoadAccess>(name)?,
        keys: restriction_keys(Mode::Bike),
    }))
}

pub fn foot_road_access(
    name: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(RoadAccessParser {
        access: lookup.enum_value::<ModeRoadAccess>(name)?,
        keys: restriction_keys(Mode::Foot),
    }))
}
