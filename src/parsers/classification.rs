//! Classification parsers: one tag (or relation flag) mapped onto one value
//!
//! Covers road class and environment, surface and smoothness, toll, country,
//! difficulty ratings, route networks, lanes, way ids, the road scenery scores and the
//! regional figures (build share, population density) delivered as plain tags.

use tracing::trace;

use super::TagParser;
use crate::config::PMap;
use crate::error::Result;
use crate::ev::values::{
    Country, Footway, Hazmat, HazmatTunnel, HazmatWater, Hgv, Mode, RoadClass,
    RoadClassification, RoadClassificationV2, RoadCurvature, RoadEnvironment, RouteNetwork,
    RsBikeAccess, Smoothness, Surface, Toll, TrackType, HAZMAT, ROAD_CURVATURE_CLASSIFICATION,
    SMOOTHNESS,
};
use crate::ev::{
    BooleanEncodedValue, DecimalEncodedValue, Direction, EncodedEnum, EncodedValueLookup,
    EnumEncodedValue, IntEncodedValue,
};
use crate::reader::{ReaderWay, RelationFlags};

pub struct RoundaboutParser {
    roundabout: BooleanEncodedValue,
}

impl TagParser for RoundaboutParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let is_roundabout = way.has_tag_in("junction", &["roundabout", "circular"]);
        self.roundabout.set_bool(Direction::Forward, record, is_roundabout);
    }
}

pub fn roundabout(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(RoundaboutParser {
        roundabout: lookup.boolean_value(name)?,
    }))
}

pub struct RoadClassParser {
    road_class: EnumEncodedValue,
}

/// `highway` value with `_link` folded onto its base class
pub fn road_class_of(way: &ReaderWay) -> RoadClass {
    match way.tag("highway") {
        Some(h) => RoadClass::find(h.strip_suffix("_link").unwrap_or(h)),
        None => RoadClass::Other,
    }
}

impl TagParser for RoadClassParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        self.road_class
            .set_enum(Direction::Forward, record, road_class_of(way));
    }
}

pub fn road_class(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(RoadClassParser {
        road_class: lookup.enum_value::<RoadClass>(name)?,
    }))
}

pub struct RoadClassLinkParser {
    link: BooleanEncodedValue,
}

impl TagParser for RoadClassLinkParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let is_link = way.tag("highway").is_some_and(|h| h.ends_with("_link"));
        self.link.set_bool(Direction::Forward, record, is_link);
    }
}

pub fn road_class_link(
    name: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(RoadClassLinkParser {
        link: lookup.boolean_value(name)?,
    }))
}

pub struct RoadEnvironmentParser {
    environment: EnumEncodedValue,
}

fn is_set(way: &ReaderWay, key: &str) -> bool {
    way.tag(key).is_some_and(|v| v != "no")
}

impl TagParser for RoadEnvironmentParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let env = if way.is_ferry() {
            RoadEnvironment::Ferry
        } else if is_set(way, "bridge") {
            RoadEnvironment::Bridge
        } else if is_set(way, "tunnel") {
            RoadEnvironment::Tunnel
        } else if is_set(way, "ford") || way.has_tag_value("highway", "ford") {
            RoadEnvironment::Ford
        } else if way.has_tag("highway") {
            RoadEnvironment::Road
        } else {
            RoadEnvironment::Other
        };
        self.environment.set_enum(Direction::Forward, record, env);
    }
}

pub fn road_environment(
    name: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(RoadEnvironmentParser {
        environment: lookup.enum_value::<RoadEnvironment>(name)?,
    }))
}

pub struct SurfaceParser {
    surface: EnumEncodedValue,
}

/// Surface with common synonyms folded in; unknown values become `OTHER`
pub fn surface_of(value: Option<&str>) -> Surface {
    let Some(value) = value else {
        return Surface::Missing;
    };
    let value = value.trim().to_ascii_lowercase();
    let base = value.split(':').next().unwrap_or(&value);
    match base {
        "sett" | "unhewn_cobblestone" => Surface::Cobblestone,
        "earth" | "mud" => Surface::Dirt,
        "pebblestone" => Surface::Gravel,
        "grass_paver" => Surface::Grass,
        "woodchips" => Surface::Wood,
        "metal" | "chipseal" => Surface::Paved,
        _ => match Surface::find(base) {
            Surface::Missing => Surface::Other,
            s => s,
        },
    }
}

impl TagParser for SurfaceParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        self.surface
            .set_enum(Direction::Forward, record, surface_of(way.tag("surface")));
    }
}

pub fn surface(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(SurfaceParser {
        surface: lookup.enum_value::<Surface>(name)?,
    }))
}

pub struct TollParser {
    toll: EnumEncodedValue,
}

impl TagParser for TollParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let toll = if way.has_tag_value("toll", "yes") {
            Toll::All
        } else if way.any_tag_in(&["toll:hgv", "toll:N2", "toll:N3"], &["yes"]) {
            Toll::Hgv
        } else if way.has_tag_value("toll", "no") {
            Toll::No
        } else {
            Toll::Missing
        };
        self.toll.set_enum(Direction::Forward, record, toll);
    }
}

pub fn toll(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(TollParser {
        toll: lookup.enum_value::<Toll>(name)?,
    }))
}

/// Reads one tag and stores the matching constant.
///
/// Missing tags store the default; present but unknown values store `unknown`.
pub struct EnumTagParser {
    value: EnumEncodedValue,
    key: &'static str,
    unknown: usize,
}

impl TagParser for EnumTagParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let ordinal = match way.tag(self.key) {
            None => 0,
            Some(v) => self.value.ordinal_of(v).unwrap_or_else(|| {
                trace!(way_id = way.id, key = self.key, value = v, "Unknown enum value");
                self.unknown
            }),
        };
        self.value.set_ordinal(Direction::Forward, record, ordinal);
    }
}

fn enum_tag<E: EncodedEnum>(
    name: &str,
    lookup: &EncodedValueLookup,
    key: &'static str,
    unknown: E,
) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(EnumTagParser {
        value: lookup.enum_value::<E>(name)?,
        key,
        unknown: unknown.ordinal(),
    }))
}

pub fn smoothness(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    enum_tag(name, lookup, SMOOTHNESS, Smoothness::Other)
}

pub fn track_type(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    enum_tag(name, lookup, "tracktype", TrackType::Missing)
}

pub fn hazmat(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    enum_tag(name, lookup, HAZMAT, Hazmat::Yes)
}

/// The reader resolves the country from geometry and hands it over as a `country` tag.
pub fn country(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    enum_tag(name, lookup, "country", Country::Missing)
}

pub fn road_curvature_classification(
    name: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    enum_tag(name, lookup, ROAD_CURVATURE_CLASSIFICATION, RoadCurvature::Straight)
}

/// Stored as `road_classification`, read from the upstream `road_classification_v2` tag
pub fn road_classification(
    name: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    enum_tag(name, lookup, "road_classification_v2", RoadClassification::Unknown)
}

pub fn road_classification_v2(
    name: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    enum_tag(name, lookup, "road_classification_v2", RoadClassificationV2::Unknown)
}

pub fn rs_bike_access(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    enum_tag(name, lookup, "rsbikeaccess", RsBikeAccess::Missing)
}

pub fn hgv(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    enum_tag(name, lookup, "hgv", Hgv::Missing)
}

pub fn hazmat_water(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    enum_tag(name, lookup, "hazmat:water", HazmatWater::Yes)
}

pub fn footway(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    enum_tag(name, lookup, "footway", Footway::Missing)
}

/// ADR tunnel category, falling back to the older `hazmat:tunnel_cat` key
pub struct HazmatTunnelParser {
    value: EnumEncodedValue,
}

impl TagParser for HazmatTunnelParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let ordinal = ["hazmat:adr_tunnel_cat", "hazmat:tunnel_cat"]
            .iter()
            .filter_map(|key| way.tag(key))
            .find_map(|v| self.value.ordinal_of(v))
            .unwrap_or(0);
        self.value.set_ordinal(Direction::Forward, record, ordinal);
    }
}

pub fn hazmat_tunnel(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(HazmatTunnelParser {
        value: lookup.enum_value::<HazmatTunnel>(name)?,
    }))
}

/// Plain number in a tag; missing, malformed or negative values store 0.
pub struct DecimalTagParser {
    value: DecimalEncodedValue,
    key: &'static str,
}

impl TagParser for DecimalTagParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let v = match way.tag(self.key) {
            None => 0.0,
            Some(v) => v.trim().parse::<f64>().unwrap_or_else(|_| {
                trace!(way_id = way.id, key = self.key, value = v, "Unparsable number");
                0.0
            }),
        };
        self.value.set_decimal(Direction::Forward, record, v);
    }
}

pub fn build_percentage(
    name: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(DecimalTagParser {
        value: lookup.decimal_value(name)?,
        key: "build_perc",
    }))
}

pub fn population_density(
    name: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(DecimalTagParser {
        value: lookup.decimal_value(name)?,
        key: "population_density",
    }))
}

/// Leading integer of a tag value (`"2;3"` → 2); anything else is `None`
pub(crate) fn leading_int(value: &str) -> Option<i64> {
    let value = value.trim();
    let end = value
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && *c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

/// Integer tag stored as is, clamped to the value's range; unparsable stores 0.
pub struct IntTagParser {
    value: IntEncodedValue,
    key: String,
}

impl TagParser for IntTagParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let v = way.tag(&self.key).and_then(leading_int).unwrap_or(0);
        self.value.set_int(Direction::Forward, record, v);
    }
}

pub fn lanes(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(IntTagParser {
        value: lookup.int_value(name)?,
        key: "lanes".to_string(),
    }))
}

/// Scenery scores are read from a tag named like the value itself.
pub fn scenery(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(IntTagParser {
        value: lookup.int_value(name)?,
        key: name.to_string(),
    }))
}

pub struct OsmWayIdParser {
    way_id: IntEncodedValue,
}

impl TagParser for OsmWayIdParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        self.way_id.set_int(Direction::Forward, record, way.id);
    }
}

pub fn osm_way_id(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(OsmWayIdParser {
        way_id: lookup.int_value(name)?,
    }))
}

/// Difficulty scale: tag value mapped to 1..=6, 0 when untagged or unknown
pub struct RatingParser {
    rating: IntEncodedValue,
    key: &'static str,
    scale: fn(&str) -> Option<i64>,
}

impl TagParser for RatingParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let v = way.tag(self.key).and_then(self.scale).unwrap_or(0);
        self.rating.set_int(Direction::Forward, record, v);
    }
}

fn mtb_scale(value: &str) -> Option<i64> {
    let scale = leading_int(value.trim_end_matches(|c| c == '+' || c == '-'))?;
    (0..=6).contains(&scale).then_some(scale + 1)
}

fn sac_scale(value: &str) -> Option<i64> {
    let v = match value {
        "hiking" => 1,
        "mountain_hiking" => 2,
        "demanding_mountain_hiking" => 3,
        "alpine_hiking" => 4,
        "demanding_alpine_hiking" => 5,
        "difficult_alpine_hiking" => 6,
        _ => return None,
    };
    Some(v)
}

fn horse_scale(value: &str) -> Option<i64> {
    let v = match value {
        "common" => 1,
        "demanding" => 2,
        "difficult" => 3,
        "critical" => 4,
        "dangerous" => 5,
        "impossible" => 6,
        _ => return None,
    };
    Some(v)
}

fn rating(
    name: &str,
    lookup: &EncodedValueLookup,
    key: &'static str,
    scale: fn(&str) -> Option<i64>,
) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(RatingParser {
        rating: lookup.int_value(name)?,
        key,
        scale,
    }))
}

pub fn mtb_rating(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    rating(name, lookup, "mtb:scale", mtb_scale)
}

pub fn hike_rating(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    rating(name, lookup, "sac_scale", sac_scale)
}

pub fn horse_rating(
    name: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    rating(name, lookup, "horse_scale", horse_scale)
}

/// Copies the relation-derived route network of one mode into the record
pub struct NetworkParser {
    network: EnumEncodedValue,
    mode: Mode,
}

impl TagParser for NetworkParser {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], _: &ReaderWay, flags: &RelationFlags) {
        self.network
            .set_enum(Direction::Forward, record, flags.network(self.mode));
    }
}

fn network(mode: Mode, name: &str, lookup: &EncodedValueLookup) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(NetworkParser {
        network: lookup.enum_value::<RouteNetwork>(name)?,
        mode,
    }))
}

pub fn bike_network(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    network(Mode::Bike, name, lookup)
}

pub fn foot_network(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    network(Mode::Foot, name, lookup)
}

pub fn mtb_network(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    network(Mode::Mtb, name, lookup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ev::values::{self, ROAD_CLASSIFICATION, SCENERY_KEYS};
    use crate::ev::EncodedValue;

    fn lookup_with(values: Vec<EncodedValue>) -> EncodedValueLookup {
        let mut lookup = EncodedValueLookup::new();
        for v in values {
            lookup.register(v).unwrap();
        }
        lookup.freeze();
        lookup
    }

    fn run(parser: &dyn TagParser, lookup: &EncodedValueLookup, way: &ReaderWay) -> Vec<u32> {
        let mut record = lookup.new_record();
        parser.handle_way_tags(0, &mut record, way, &RelationFlags::default());
        record
    }

    #[test]
    fn test_roundabout() {
        let lookup = lookup_with(vec![values::flag("roundabout", &PMap::new()).unwrap()]);
        let parser = roundabout("roundabout", &lookup, &PMap::new()).unwrap();
        let ev = lookup.boolean_value("roundabout").unwrap();

        let way = ReaderWay::new(1).with_tag("junction", "circular");
        assert!(ev.get_bool(Direction::Forward, &run(parser.as_ref(), &lookup, &way)));
        let way = ReaderWay::new(1).with_tag("junction", "yes");
        assert!(!ev.get_bool(Direction::Forward, &run(parser.as_ref(), &lookup, &way)));
    }

    #[test]
    fn test_road_class_folds_links() {
        let lookup = lookup_with(vec![
            values::enum_value::<RoadClass>("road_class", &PMap::new()).unwrap(),
            values::flag("road_class_link", &PMap::new()).unwrap(),
        ]);
        let class = road_class("road_class", &lookup, &PMap::new()).unwrap();
        let link = road_class_link("road_class_link", &lookup, &PMap::new()).unwrap();
        let rc = lookup.enum_value::<RoadClass>("road_class").unwrap();
        let rl = lookup.boolean_value("road_class_link").unwrap();

        let way = ReaderWay::new(1).with_tag("highway", "motorway_link");
        let mut record = lookup.new_record();
        class.handle_way_tags(0, &mut record, &way, &RelationFlags::default());
        link.handle_way_tags(0, &mut record, &way, &RelationFlags::default());
        assert_eq!(rc.get_enum::<RoadClass>(Direction::Forward, &record), RoadClass::Motorway);
        assert!(rl.get_bool(Direction::Forward, &record));

        let way = ReaderWay::new(1).with_tag("highway", "raceway");
        let record = run(class.as_ref(), &lookup, &way);
        assert_eq!(rc.get_enum::<RoadClass>(Direction::Forward, &record), RoadClass::Other);
    }

    #[test]
    fn test_road_environment_precedence() {
        let lookup = lookup_with(vec![values::enum_value::<RoadEnvironment>(
            "road_environment",
            &PMap::new(),
        )
        .unwrap()]);
        let parser = road_environment("road_environment", &lookup, &PMap::new()).unwrap();
        let ev = lookup.enum_value::<RoadEnvironment>("road_environment").unwrap();
        let env = |way: ReaderWay| {
            let record = run(parser.as_ref(), &lookup, &way);
            ev.get_enum::<RoadEnvironment>(Direction::Forward, &record)
        };

        assert_eq!(env(ReaderWay::new(1).with_tag("route", "ferry")), RoadEnvironment::Ferry);
        assert_eq!(
            env(ReaderWay::new(1).with_tag("highway", "primary").with_tag("bridge", "viaduct")),
            RoadEnvironment::Bridge
        );
        assert_eq!(
            env(ReaderWay::new(1).with_tag("highway", "primary").with_tag("tunnel", "no")),
            RoadEnvironment::Road
        );
        assert_eq!(env(ReaderWay::new(1).with_tag("highway", "ford")), RoadEnvironment::Ford);
        assert_eq!(env(ReaderWay::new(1)), RoadEnvironment::Other);
    }

    #[test]
    fn test_surface_synonyms() {
        assert_eq!(surface_of(None), Surface::Missing);
        assert_eq!(surface_of(Some("asphalt")), Surface::Asphalt);
        assert_eq!(surface_of(Some("concrete:plates")), Surface::Concrete);
        assert_eq!(surface_of(Some("sett")), Surface::Cobblestone);
        assert_eq!(surface_of(Some("earth")), Surface::Dirt);
        assert_eq!(surface_of(Some("moon_dust")), Surface::Other);
    }

    #[test]
    fn test_toll() {
        let lookup = lookup_with(vec![values::enum_value::<Toll>("toll", &PMap::new()).unwrap()]);
        let parser = toll("toll", &lookup, &PMap::new()).unwrap();
        let ev = lookup.enum_value::<Toll>("toll").unwrap();
        let get = |way: ReaderWay| {
            ev.get_enum::<Toll>(Direction::Forward, &run(parser.as_ref(), &lookup, &way))
        };
        assert_eq!(get(ReaderWay::new(1).with_tag("toll", "yes")), Toll::All);
        assert_eq!(get(ReaderWay::new(1).with_tag("toll:N3", "yes")), Toll::Hgv);
        assert_eq!(get(ReaderWay::new(1).with_tag("toll", "no")), Toll::No);
        assert_eq!(get(ReaderWay::new(1)), Toll::Missing);
    }

    #[test]
    fn test_enum_tag_unknown_and_missing() {
        let lookup = lookup_with(vec![
            values::enum_value::<Smoothness>("smoothness", &PMap::new()).unwrap(),
            values::enum_value::<RoadCurvature>(ROAD_CURVATURE_CLASSIFICATION, &PMap::new())
                .unwrap(),
            values::enum_value::<RoadClassification>(ROAD_CLASSIFICATION, &PMap::new()).unwrap(),
        ]);
        let smooth = smoothness("smoothness", &lookup, &PMap::new()).unwrap();
        let ev = lookup.enum_value::<Smoothness>("smoothness").unwrap();

        let record = run(smooth.as_ref(), &lookup, &ReaderWay::new(1));
        assert_eq!(ev.get_enum::<Smoothness>(Direction::Forward, &record), Smoothness::Missing);
        let way = ReaderWay::new(1).with_tag("smoothness", "very_bad");
        let record = run(smooth.as_ref(), &lookup, &way);
        assert_eq!(ev.get_enum::<Smoothness>(Direction::Forward, &record), Smoothness::VeryBad);
        let way = ReaderWay::new(1).with_tag("smoothness", "silky");
        let record = run(smooth.as_ref(), &lookup, &way);
        assert_eq!(ev.get_enum::<Smoothness>(Direction::Forward, &record), Smoothness::Other);

        let curve = road_curvature_classification(ROAD_CURVATURE_CLASSIFICATION, &lookup, &PMap::new())
            .unwrap();
        let ev = lookup.enum_value::<RoadCurvature>(ROAD_CURVATURE_CLASSIFICATION).unwrap();
        let record = run(curve.as_ref(), &lookup, &ReaderWay::new(1));
        assert_eq!(ev.get_enum::<RoadCurvature>(Direction::Forward, &record), RoadCurvature::Straight);
        let way = ReaderWay::new(1).with_tag(ROAD_CURVATURE_CLASSIFICATION, "HIGH");
        let record = run(curve.as_ref(), &lookup, &way);
        assert_eq!(ev.get_enum::<RoadCurvature>(Direction::Forward, &record), RoadCurvature::High);

        let class = road_classification(ROAD_CLASSIFICATION, &lookup, &PMap::new()).unwrap();
        let ev = lookup.enum_value::<RoadClassification>(ROAD_CLASSIFICATION).unwrap();
        let way = ReaderWay::new(1)
            .with_tag("road_classification", "urban")
            .with_tag("road_classification_v2", "state_highway");
        let record = run(class.as_ref(), &lookup, &way);
        assert_eq!(
            ev.get_enum::<RoadClassification>(Direction::Forward, &record),
            RoadClassification::StateHighway
        );
    }

    #[test]
    fn test_regional_tags() {
        let lookup = lookup_with(vec![
            values::build_percentage(values::BUILD_PERCENTAGE, &PMap::new()).unwrap(),
            values::population_density(values::POPULATION_DENSITY, &PMap::new()).unwrap(),
            values::enum_value::<RsBikeAccess>(values::RS_BIKE_ACCESS, &PMap::new()).unwrap(),
            values::enum_value::<RoadClassificationV2>(values::ROAD_CLASSIFICATION_V2, &PMap::new())
                .unwrap(),
        ]);
        let parsers = [
            build_percentage(values::BUILD_PERCENTAGE, &lookup, &PMap::new()).unwrap(),
            population_density(values::POPULATION_DENSITY, &lookup, &PMap::new()).unwrap(),
            rs_bike_access(values::RS_BIKE_ACCESS, &lookup, &PMap::new()).unwrap(),
            road_classification_v2(values::ROAD_CLASSIFICATION_V2, &lookup, &PMap::new()).unwrap(),
        ];
        let build = lookup.decimal_value(values::BUILD_PERCENTAGE).unwrap();
        let density = lookup.decimal_value(values::POPULATION_DENSITY).unwrap();
        let bike = lookup.enum_value::<RsBikeAccess>(values::RS_BIKE_ACCESS).unwrap();
        let class = lookup
            .enum_value::<RoadClassificationV2>(values::ROAD_CLASSIFICATION_V2)
            .unwrap();

        let way = ReaderWay::new(1)
            .with_tag("build_perc", "42.4")
            .with_tag("population_density", "1234")
            .with_tag("rsbikeaccess", "Designated")
            .with_tag("road_classification_v2", "semi_urban");
        let mut record = lookup.new_record();
        for p in &parsers {
            p.handle_way_tags(0, &mut record, &way, &RelationFlags::default());
        }
        assert_eq!(build.get_decimal(Direction::Forward, &record), 42.0);
        assert_eq!(density.get_decimal(Direction::Forward, &record), 1230.0);
        assert_eq!(
            bike.get_enum::<RsBikeAccess>(Direction::Forward, &record),
            RsBikeAccess::Designated
        );
        assert_eq!(
            class.get_enum::<RoadClassificationV2>(Direction::Forward, &record),
            RoadClassificationV2::SemiUrban
        );

        // untagged and malformed values fall back to the defaults
        let way = ReaderWay::new(2)
            .with_tag("build_perc", "most")
            .with_tag("rsbikeaccess", "sometimes");
        let mut record = lookup.new_record();
        for p in &parsers {
            p.handle_way_tags(0, &mut record, &way, &RelationFlags::default());
        }
        assert_eq!(build.get_decimal(Direction::Forward, &record), 0.0);
        assert_eq!(density.get_decimal(Direction::Forward, &record), 0.0);
        assert_eq!(
            bike.get_enum::<RsBikeAccess>(Direction::Forward, &record),
            RsBikeAccess::Missing
        );
        assert_eq!(
            class.get_enum::<RoadClassificationV2>(Direction::Forward, &record),
            RoadClassificationV2::Unknown
        );
    }

    #[test]
    fn test_truck_restrictions() {
        let lookup = lookup_with(vec![
            values::enum_value::<Hgv>(values::HGV, &PMap::new()).unwrap(),
            values::enum_value::<HazmatTunnel>(values::HAZMAT_TUNNEL, &PMap::new()).unwrap(),
            values::enum_value::<HazmatWater>(values::HAZMAT_WATER, &PMap::new()).unwrap(),
            values::enum_value::<Footway>(values::FOOTWAY, &PMap::new()).unwrap(),
        ]);
        let parsers = [
            hgv(values::HGV, &lookup, &PMap::new()).unwrap(),
            hazmat_tunnel(values::HAZMAT_TUNNEL, &lookup, &PMap::new()).unwrap(),
            hazmat_water(values::HAZMAT_WATER, &lookup, &PMap::new()).unwrap(),
            footway(values::FOOTWAY, &lookup, &PMap::new()).unwrap(),
        ];
        let hgv_ev = lookup.enum_value::<Hgv>(values::HGV).unwrap();
        let tunnel = lookup.enum_value::<HazmatTunnel>(values::HAZMAT_TUNNEL).unwrap();
        let water = lookup.enum_value::<HazmatWater>(values::HAZMAT_WATER).unwrap();
        let foot = lookup.enum_value::<Footway>(values::FOOTWAY).unwrap();

        let way = ReaderWay::new(1)
            .with_tag("hgv", "delivery")
            .with_tag("hazmat:adr_tunnel_cat", "Z")
            .with_tag("hazmat:tunnel_cat", "D")
            .with_tag("hazmat:water", "no")
            .with_tag("footway", "sidewalk");
        let mut record = lookup.new_record();
        for p in &parsers {
            p.handle_way_tags(0, &mut record, &way, &RelationFlags::default());
        }
        assert_eq!(hgv_ev.get_enum::<Hgv>(Direction::Forward, &record), Hgv::Delivery);
        assert_eq!(
            tunnel.get_enum::<HazmatTunnel>(Direction::Forward, &record),
            HazmatTunnel::D
        );
        assert_eq!(water.get_enum::<HazmatWater>(Direction::Forward, &record), HazmatWater::No);
        assert_eq!(foot.get_enum::<Footway>(Direction::Forward, &record), Footway::Sidewalk);

        let mut record = lookup.new_record();
        for p in &parsers {
            p.handle_way_tags(0, &mut record, &ReaderWay::new(2), &RelationFlags::default());
        }
        assert_eq!(hgv_ev.get_enum::<Hgv>(Direction::Forward, &record), Hgv::Missing);
        assert_eq!(
            tunnel.get_enum::<HazmatTunnel>(Direction::Forward, &record),
            HazmatTunnel::A
        );
        assert_eq!(water.get_enum::<HazmatWater>(Direction::Forward, &record), HazmatWater::Yes);
    }

    #[test]
    fn test_scenery_and_lanes() {
        let key = SCENERY_KEYS[3];
        let lookup = lookup_with(vec![
            values::scenery(key, &PMap::new()).unwrap(),
            values::lanes("lanes", &PMap::new()).unwrap(),
        ]);
        let scene = scenery(key, &lookup, &PMap::new()).unwrap();
        let lanes_parser = lanes("lanes", &lookup, &PMap::new()).unwrap();
        let scene_ev = lookup.int_value(key).unwrap();
        let lanes_ev = lookup.int_value("lanes").unwrap();

        let way = ReaderWay::new(1).with_tag(key, "2").with_tag("lanes", "3;2");
        let mut record = lookup.new_record();
        scene.handle_way_tags(0, &mut record, &way, &RelationFlags::default());
        lanes_parser.handle_way_tags(0, &mut record, &way, &RelationFlags::default());
        assert_eq!(scene_ev.get_int(Direction::Forward, &record), 2);
        assert_eq!(lanes_ev.get_int(Direction::Forward, &record), 3);

        // malformed and out-of-range values degrade instead of failing
        let way = ReaderWay::new(1).with_tag(key, "lots").with_tag("lanes", "12");
        let mut record = lookup.new_record();
        scene.handle_way_tags(0, &mut record, &way, &RelationFlags::default());
        lanes_parser.handle_way_tags(0, &mut record, &way, &RelationFlags::default());
        assert_eq!(scene_ev.get_int(Direction::Forward, &record), 0);
        assert_eq!(lanes_ev.get_int(Direction::Forward, &record), 7);
    }

    #[test]
    fn test_ratings() {
        assert_eq!(mtb_scale("0"), Some(1));
        assert_eq!(mtb_scale("3+"), Some(4));
        assert_eq!(mtb_scale("9"), None);
        assert_eq!(sac_scale("alpine_hiking"), Some(4));
        assert_eq!(horse_scale("impossible"), Some(6));
        assert_eq!(horse_scale("easy"), None);
    }

    #[test]
    fn test_network_from_relation_flags() {
        let lookup = lookup_with(vec![
            values::enum_value::<RouteNetwork>("bike_network", &PMap::new()).unwrap(),
        ]);
        let parser = bike_network("bike_network", &lookup, &PMap::new()).unwrap();
        let ev = lookup.enum_value::<RouteNetwork>("bike_network").unwrap();
        let flags = RelationFlags::default().with_network(Mode::Bike, RouteNetwork::Regional);
        let mut record = lookup.new_record();
        parser.handle_way_tags(0, &mut record, &ReaderWay::new(1), &flags);
        assert_eq!(ev.get_enum::<RouteNetwork>(Direction::Forward, &record), RouteNetwork::Regional);
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int("2"), Some(2));
        assert_eq!(leading_int(" 3;2"), Some(3));
        assert_eq!(leading_int("-1"), Some(-1));
        assert_eq!(leading_int("x"), None);
        assert_eq!(leading_int(""), None);
    }
}
