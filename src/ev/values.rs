//! Property catalogue: keys, enum types and encoded value factories
//!
//! Factories have the shape `fn(name, props) -> Result<EncodedValue>` so the import
//! registry can reference them directly from its static table.

use super::{
    BooleanEncodedValue, DecimalEncodedValue, EncodedEnum, EncodedValue, EnumEncodedValue,
    IntEncodedValue,
};
use crate::config::PMap;
use crate::encoded_enum;
use crate::error::{EvError, Result};

pub const ROUNDABOUT: &str = "roundabout";
pub const ROAD_CLASS: &str = "road_class";
pub const ROAD_CLASS_LINK: &str = "road_class_link";
pub const ROAD_ENVIRONMENT: &str = "road_environment";
pub const ROAD_ACCESS: &str = "road_access";
pub const BIKE_ROAD_ACCESS: &str = "bike_road_access";
pub const FOOT_ROAD_ACCESS: &str = "foot_road_access";
pub const MAX_SPEED: &str = "max_speed";
pub const MAX_SPEED_ESTIMATED: &str = "max_speed_estimated";
pub const MAX_WEIGHT: &str = "max_weight";
pub const MAX_HEIGHT: &str = "max_height";
pub const MAX_WIDTH: &str = "max_width";
pub const MAX_LENGTH: &str = "max_length";
pub const MAX_AXLE_LOAD: &str = "max_axle_load";
pub const SURFACE: &str = "surface";
pub const SMOOTHNESS: &str = "smoothness";
pub const TOLL: &str = "toll";
pub const TRACK_TYPE: &str = "track_type";
pub const HAZMAT: &str = "hazmat";
pub const LANES: &str = "lanes";
pub const OSM_WAY_ID: &str = "osm_way_id";
pub const MTB_RATING: &str = "mtb_rating";
pub const HIKE_RATING: &str = "hike_rating";
pub const HORSE_RATING: &str = "horse_rating";
pub const COUNTRY: &str = "country";
pub const URBAN_DENSITY: &str = "urban_density";
pub const FERRY_SPEED: &str = "ferry_speed";
pub const CURVATURE: &str = "curvature";
pub const AVERAGE_SLOPE: &str = "average_slope";
pub const MAX_SLOPE: &str = "max_slope";
pub const SLOPE_CALCULATOR: &str = "slope_calculator";
pub const BIKE_NETWORK: &str = "bike_network";
pub const FOOT_NETWORK: &str = "foot_network";
pub const MTB_NETWORK: &str = "mtb_network";
pub const GET_OFF_BIKE: &str = "get_off_bike";
pub const ROAD_CURVATURE_CLASSIFICATION: &str = "road_curvature_classification";
pub const ROAD_CLASSIFICATION: &str = "road_classification";
pub const ROAD_CLASSIFICATION_V2: &str = "road_classification_v2";
pub const BUILD_PERCENTAGE: &str = "build_percentage";
pub const POPULATION_DENSITY: &str = "population_density";
pub const RS_BIKE_ACCESS: &str = "rs_bike_access";
pub const HGV: &str = "hgv";
pub const HAZMAT_TUNNEL: &str = "hazmat_tunnel";
pub const HAZMAT_WATER: &str = "hazmat_water";
pub const FOOTWAY: &str = "footway";

/// `road_scenery_*` keys, each a 2-bit score supplied by an upstream classifier
pub const SCENERY_KEYS: [&str; 14] = [
    "road_scenery_urban",
    "road_scenery_forest",
    "road_scenery_hill",
    "road_scenery_lake",
    "road_scenery_beach",
    "road_scenery_river",
    "road_scenery_desert",
    "road_scenery_snow_capped_mountain",
    "road_scenery_field",
    "road_scenery_plantation",
    "road_scenery_salt_flat",
    "road_scenery_semi_urban",
    "road_scenery_backwater",
    "road_scenery_mountain_pass",
];

/// Transportation modes with per-mode access, speed or priority values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Car,
    Bike,
    Foot,
    Mtb,
    Bus,
    Hov,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Car => "car",
            Mode::Bike => "bike",
            Mode::Foot => "foot",
            Mode::Mtb => "mtb",
            Mode::Bus => "bus",
            Mode::Hov => "hov",
        }
    }

    pub fn access_key(self) -> String {
        format!("{}_access", self.as_str())
    }

    pub fn speed_key(self) -> String {
        format!("{}_average_speed", self.as_str())
    }

    pub fn priority_key(self) -> String {
        format!("{}_priority", self.as_str())
    }

    pub fn temporal_access_key(self) -> String {
        format!("{}_temporal_access", self.as_str())
    }

    pub fn network_key(self) -> String {
        format!("{}_network", self.as_str())
    }
}

encoded_enum! {
    /// `highway` classification, `OTHER` for anything unlisted
    pub enum RoadClass: "road_class" {
        Other => "other",
        Motorway => "motorway",
        Trunk => "trunk",
        Primary => "primary",
        Secondary => "secondary",
        Tertiary => "tertiary",
        Residential => "residential",
        Unclassified => "unclassified",
        Service => "service",
        Road => "road",
        Track => "track",
        Bridleway => "bridleway",
        Steps => "steps",
        Cycleway => "cycleway",
        Path => "path",
        LivingStreet => "living_street",
        Footway => "footway",
        Pedestrian => "pedestrian",
        Platform => "platform",
        Corridor => "corridor",
        Construction => "construction",
        Busway => "busway",
    }
}

encoded_enum! {
    pub enum RoadEnvironment: "road_environment" {
        Other => "other",
        Road => "road",
        Ferry => "ferry",
        Tunnel => "tunnel",
        Bridge => "bridge",
        Ford => "ford",
    }
}

encoded_enum! {
    /// Car access restriction level, unrestricted by default
    pub enum RoadAccess: "road_access" {
        Yes => "yes",
        Destination => "destination",
        Customers => "customers",
        Delivery => "delivery",
        Agricultural => "agricultural",
        Forestry => "forestry",
        Private => "private",
        No => "no",
    }
}

encoded_enum! {
    /// Bike and foot access restriction level, `MISSING` when nothing is tagged
    pub enum ModeRoadAccess: "mode_road_access" {
        Missing => "missing",
        Yes => "yes",
        Designated => "designated",
        Permissive => "permissive",
        Destination => "destination",
        Customers => "customers",
        Delivery => "delivery",
        Agricultural => "agricultural",
        Forestry => "forestry",
        Private => "private",
        No => "no",
    }
}

encoded_enum! {
    pub enum Surface: "surface" {
        Missing => "missing",
        Paved => "paved",
        Asphalt => "asphalt",
        Concrete => "concrete",
        PavingStones => "paving_stones",
        Cobblestone => "cobblestone",
        Unpaved => "unpaved",
        Compacted => "compacted",
        FineGravel => "fine_gravel",
        Gravel => "gravel",
        Ground => "ground",
        Dirt => "dirt",
        Grass => "grass",
        Sand => "sand",
        Wood => "wood",
        Other => "other",
    }
}

encoded_enum! {
    pub enum Smoothness: "smoothness" {
        Missing => "missing",
        Excellent => "excellent",
        Good => "good",
        Intermediate => "intermediate",
        Bad => "bad",
        VeryBad => "very_bad",
        Horrible => "horrible",
        VeryHorrible => "very_horrible",
        Impassable => "impassable",
        Other => "other",
    }
}

encoded_enum! {
    pub enum Toll: "toll" {
        Missing => "missing",
        No => "no",
        Hgv => "hgv",
        All => "all",
    }
}

encoded_enum! {
    pub enum TrackType: "track_type" {
        Missing => "missing",
        Grade1 => "grade1",
        Grade2 => "grade2",
        Grade3 => "grade3",
        Grade4 => "grade4",
        Grade5 => "grade5",
    }
}

encoded_enum! {
    /// Hazardous goods permitted unless tagged otherwise
    pub enum Hazmat: "hazmat" {
        Yes => "yes",
        No => "no",
    }
}

encoded_enum! {
    /// ISO 3166-1 alpha-3, resolved by the reader from the way geometry
    pub enum Country: "country" {
        Missing => "missing",
        Aut => "AUT",
        Bel => "BEL",
        Che => "CHE",
        Cze => "CZE",
        Deu => "DEU",
        Dnk => "DNK",
        Esp => "ESP",
        Fra => "FRA",
        Gbr => "GBR",
        Ind => "IND",
        Ita => "ITA",
        Lux => "LUX",
        Nld => "NLD",
        Pol => "POL",
        Usa => "USA",
    }
}

encoded_enum! {
    pub enum UrbanDensity: "urban_density" {
        Rural => "rural",
        Residential => "residential",
        City => "city",
    }
}

encoded_enum! {
    /// Highest-ranked route relation a way belongs to
    pub enum RouteNetwork: "route_network" {
        Missing => "missing",
        International => "international",
        National => "national",
        Regional => "regional",
        Local => "local",
        Other => "other",
    }
}

encoded_enum! {
    /// Result of evaluating `*:conditional` date restrictions
    pub enum TemporalAccess: "temporal_access" {
        Missing => "missing",
        Yes => "yes",
        No => "no",
    }
}

encoded_enum! {
    pub enum RoadCurvature: "road_curvature_classification" {
        Straight => "straight",
        Medium => "medium",
        High => "high",
    }
}

encoded_enum! {
    pub enum RoadClassification: "road_classification" {
        Unknown => "unknown",
        NationalHighway => "national_highway",
        StateHighway => "state_highway",
        Urban => "urban",
        SemiUrban => "semi_urban",
        Interior => "interior",
    }
}

encoded_enum! {
    /// Same classes as [`RoadClassification`], kept as an independent property
    pub enum RoadClassificationV2: "road_classification_v2" {
        Unknown => "unknown",
        NationalHighway => "national_highway",
        StateHighway => "state_highway",
        Urban => "urban",
        SemiUrban => "semi_urban",
        Interior => "interior",
    }
}

encoded_enum! {
    /// Curated bicycle access delivered in the `rsbikeaccess` tag
    pub enum RsBikeAccess: "rs_bike_access" {
        Missing => "missing",
        Yes => "yes",
        Designated => "designated",
        Dismount => "dismount",
        No => "no",
    }
}

encoded_enum! {
    pub enum Hgv: "hgv" {
        Missing => "missing",
        Yes => "yes",
        Designated => "designated",
        Destination => "destination",
        Delivery => "delivery",
        Discouraged => "discouraged",
        Agricultural => "agricultural",
        No => "no",
    }
}

encoded_enum! {
    /// ADR tunnel category, A being the least restrictive
    pub enum HazmatTunnel: "hazmat_tunnel" {
        A => "A",
        B => "B",
        C => "C",
        D => "D",
        E => "E",
    }
}

encoded_enum! {
    pub enum HazmatWater: "hazmat_water" {
        Yes => "yes",
        Permissive => "permissive",
        No => "no",
    }
}

encoded_enum! {
    pub enum Footway: "footway" {
        Missing => "missing",
        Sidewalk => "sidewalk",
        Crossing => "crossing",
        AccessAisle => "access_aisle",
        Link => "link",
        TrafficIsland => "traffic_island",
        Alley => "alley",
    }
}

/// Shape shared by every encoded value factory in the registry table
pub type EncodedValueFactory = fn(&str, &PMap) -> Result<EncodedValue>;

pub fn flag(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(BooleanEncodedValue::new(name, false)?.into())
}

/// Boolean that may differ per direction, e.g. access
pub fn directed_flag(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(BooleanEncodedValue::new(name, true)?.into())
}

pub fn enum_value<E: EncodedEnum>(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(EnumEncodedValue::new::<E>(name, false)?.into())
}

pub fn max_speed(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(DecimalEncodedValue::with_infinity(name, 7, 2.0, true)?.into())
}

pub fn max_weight(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(DecimalEncodedValue::with_infinity(name, 9, 0.1, false)?.into())
}

/// Shared by max_height, max_width and max_length
pub fn max_dimension(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(DecimalEncodedValue::with_infinity(name, 7, 0.1, false)?.into())
}

pub fn max_axle_load(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(DecimalEncodedValue::with_infinity(name, 7, 0.5, false)?.into())
}

pub fn lanes(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(IntEncodedValue::new(name, 3, false)?.into())
}

pub fn osm_way_id(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(IntEncodedValue::new(name, 31, false)?.into())
}

/// Difficulty scales, 0 meaning untagged
pub fn rating(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(IntEncodedValue::new(name, 3, false)?.into())
}

pub fn scenery(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(IntEncodedValue::new(name, 2, false)?.into())
}

/// Built-up share of the surroundings in percent
pub fn build_percentage(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(DecimalEncodedValue::new(name, 7, 1.0, false)?.into())
}

/// Inhabitants per square kilometre in steps of 10
pub fn population_density(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(DecimalEncodedValue::new(name, 10, 10.0, false)?.into())
}

pub fn ferry_speed(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(DecimalEncodedValue::new(name, 5, 2.0, false)?.into())
}

pub fn curvature(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(DecimalEncodedValue::new(name, 4, 0.1, false)?.into())
}

/// Uphill grade in percent, per direction
pub fn average_slope(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(DecimalEncodedValue::new(name, 5, 1.0, true)?.into())
}

pub fn max_slope(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(DecimalEncodedValue::new(name, 5, 1.0, false)?.into())
}

pub fn priority(name: &str, _props: &PMap) -> Result<EncodedValue> {
    Ok(DecimalEncodedValue::new(name, 4, 0.1, false)?.into())
}

pub fn car_speed(name: &str, props: &PMap) -> Result<EncodedValue> {
    vehicle_speed(name, props, 7, 2.0, true)
}

pub fn bike_speed(name: &str, props: &PMap) -> Result<EncodedValue> {
    vehicle_speed(name, props, 4, 2.0, false)
}

pub fn foot_speed(name: &str, props: &PMap) -> Result<EncodedValue> {
    vehicle_speed(name, props, 4, 1.0, false)
}

/// Average speed with width and scale overridable through `speed_bits` / `speed_factor`
fn vehicle_speed(
    name: &str,
    props: &PMap,
    default_bits: i64,
    default_factor: f64,
    two_directions: bool,
) -> Result<EncodedValue> {
    let bits = props.get_int("speed_bits", default_bits)?;
    let bits = u32::try_from(bits)
        .map_err(|_| EvError::invalid(name, format!("speed_bits must be positive, got {bits}")))?;
    let factor = props.get_f64("speed_factor", default_factor)?;
    Ok(DecimalEncodedValue::new(name, bits, factor, two_directions)?.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_defaults_are_ordinal_zero() {
        assert_eq!(RoadClass::default_value(), RoadClass::Other);
        assert_eq!(RoadAccess::default_value(), RoadAccess::Yes);
        assert_eq!(Surface::default_value(), Surface::Missing);
        assert_eq!(Hazmat::default_value(), Hazmat::Yes);
        assert_eq!(RoadCurvature::default_value(), RoadCurvature::Straight);
        assert_eq!(RoadClassification::default_value(), RoadClassification::Unknown);
        assert_eq!(RoadClassificationV2::default_value(), RoadClassificationV2::Unknown);
        assert_eq!(RsBikeAccess::default_value(), RsBikeAccess::Missing);
        assert_eq!(HazmatTunnel::default_value(), HazmatTunnel::A);
        assert_eq!(HazmatWater::default_value(), HazmatWater::Yes);
    }

    #[test]
    fn test_regional_decimals() {
        let EncodedValue::Decimal(build) = build_percentage(BUILD_PERCENTAGE, &PMap::new()).unwrap()
        else {
            panic!("build_percentage is not a decimal");
        };
        assert_eq!(build.max_storable(), 127.0);
        let EncodedValue::Decimal(density) =
            population_density(POPULATION_DENSITY, &PMap::new()).unwrap()
        else {
            panic!("population_density is not a decimal");
        };
        assert_eq!(density.max_storable(), 10_230.0);
    }

    #[test]
    fn test_enum_widths() {
        let ev = EnumEncodedValue::new::<RoadClass>(ROAD_CLASS, false).unwrap();
        assert_eq!(ev.constants().len(), 22);
        assert_eq!(ev.field.bits, 5);
        let ev = EnumEncodedValue::new::<Hazmat>(HAZMAT, false).unwrap();
        assert_eq!(ev.field.bits, 1);
        let ev = EnumEncodedValue::new::<Surface>(SURFACE, false).unwrap();
        assert_eq!(ev.field.bits, 4);
    }

    #[test]
    fn test_country_lookup() {
        assert_eq!(Country::find("deu"), Country::Deu);
        assert_eq!(Country::find("IND"), Country::Ind);
        assert_eq!(Country::find("XYZ"), Country::Missing);
    }

    #[test]
    fn test_speed_factory_honours_props() {
        let props = PMap::new().with("speed_bits", 10).with("speed_factor", 5);
        let ev = car_speed("car_average_speed", &props).unwrap();
        assert_eq!(ev.bits(), 10);
        assert!(ev.is_two_directions());
        match ev {
            EncodedValue::Decimal(d) => assert_eq!(d.factor(), 5.0),
            other => panic!("unexpected {other:?}"),
        }

        let ev = bike_speed("bike_average_speed", &PMap::new()).unwrap();
        assert_eq!(ev.bits(), 4);
        assert!(!ev.is_two_directions());

        assert!(car_speed("car_average_speed", &PMap::new().with("speed_bits", -1)).is_err());
        assert!(car_speed("car_average_speed", &PMap::new().with("speed_bits", 17)).is_err());
        assert!(car_speed("car_average_speed", &PMap::new().with("speed_factor", 0)).is_err());
    }

    #[test]
    fn test_mode_keys() {
        assert_eq!(Mode::Car.access_key(), "car_access");
        assert_eq!(Mode::Bike.speed_key(), "bike_average_speed");
        assert_eq!(Mode::Foot.priority_key(), "foot_priority");
        assert_eq!(Mode::Bike.temporal_access_key(), "bike_temporal_access");
        assert_eq!(Mode::Mtb.network_key(), "mtb_network");
    }

    #[test]
    fn test_scenery_keys_are_valid_names() {
        for key in SCENERY_KEYS {
            assert!(scenery(key, &PMap::new()).is_ok(), "{key}");
        }
    }
}
