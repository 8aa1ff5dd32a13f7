//! Built-in import unit table
//!
//! Every supported property is one row: name, encoded value factory, parser factory and
//! dependencies. Dependency anchors such as `roundabout` or `ferry_speed` are owned by
//! their own row, so depending on them pulls in both their value and their parser.

use super::{ImportRegistry, ImportUnit, RegistryEntry};
use crate::ev::values::{
    self, Country, EncodedValueFactory, Footway, Hazmat, HazmatTunnel, HazmatWater, Hgv,
    ModeRoadAccess, RoadAccess, RoadClass, RoadClassification, RoadClassificationV2,
    RoadCurvature, RoadEnvironment, RouteNetwork, RsBikeAccess, Smoothness, Surface,
    TemporalAccess, Toll, TrackType, UrbanDensity, SCENERY_KEYS,
};
use crate::parsers::{
    access, classification, geometry, max_values, priority, speed, temporal, ParserFactory,
};

/// One row of the static table
#[derive(Clone, Copy)]
pub struct UnitSpec {
    pub name: &'static str,
    pub encoded_value: Option<EncodedValueFactory>,
    pub parser: Option<ParserFactory>,
    pub dependencies: &'static [&'static str],
}

impl UnitSpec {
    pub fn to_unit(&self) -> ImportUnit {
        let mut unit = ImportUnit::new(self.name).with_dependencies(self.dependencies);
        if let Some(f) = self.encoded_value {
            unit = unit.with_encoded_value(f);
        }
        if let Some(f) = self.parser {
            unit = unit.with_parser(f);
        }
        unit
    }
}

const fn unit(
    name: &'static str,
    encoded_value: Option<EncodedValueFactory>,
    parser: Option<ParserFactory>,
    dependencies: &'static [&'static str],
) -> UnitSpec {
    UnitSpec {
        name,
        encoded_value,
        parser,
        dependencies,
    }
}

const MIGRATION_08_09: &str = "see docs/migration/config-migration-08-09.md";

/// Names retired on purpose, with the guidance returned instead of a unit
pub static OBSOLETE: &[(&str, &str)] = &[
    ("roads_access", "roads_access parser no longer necessary"),
    ("roads_average_speed", "roads_average_speed parser no longer necessary"),
];

pub static UNITS: &[UnitSpec] = &[
    // road network classification
    unit("roundabout", Some(values::flag), Some(classification::roundabout), &[]),
    unit("road_class", Some(values::enum_value::<RoadClass>), Some(classification::road_class), &[]),
    unit("road_class_link", Some(values::flag), Some(classification::road_class_link), &[]),
    unit(
        "road_environment",
        Some(values::enum_value::<RoadEnvironment>),
        Some(classification::road_environment),
        &[],
    ),
    unit("road_access", Some(values::enum_value::<RoadAccess>), Some(access::road_access), &[]),
    unit(
        "bike_road_access",
        Some(values::enum_value::<ModeRoadAccess>),
        Some(access::bike_road_access),
        &[],
    ),
    unit(
        "foot_road_access",
        Some(values::enum_value::<ModeRoadAccess>),
        Some(access::foot_road_access),
        &[],
    ),
    // legal limits
    unit("max_speed", Some(values::max_speed), Some(max_values::max_speed), &[]),
    // filled by a speed estimator outside the import pass
    unit("max_speed_estimated", Some(values::flag), None, &["country", "urban_density"]),
    unit("urban_density", Some(values::enum_value::<UrbanDensity>), None, &[]),
    unit("max_weight", Some(values::max_weight), Some(max_values::max_weight), &[]),
    unit("max_height", Some(values::max_dimension), Some(max_values::max_height), &[]),
    unit("max_width", Some(values::max_dimension), Some(max_values::max_width), &[]),
    unit("max_length", Some(values::max_dimension), Some(max_values::max_length), &[]),
    unit("max_axle_load", Some(values::max_axle_load), Some(max_values::max_axle_load), &[]),
    // way attributes
    unit("surface", Some(values::enum_value::<Surface>), Some(classification::surface), &[]),
    unit(
        "smoothness",
        Some(values::enum_value::<Smoothness>),
        Some(classification::smoothness),
        &[],
    ),
    unit("toll", Some(values::enum_value::<Toll>), Some(classification::toll), &[]),
    unit(
        "track_type",
        Some(values::enum_value::<TrackType>),
        Some(classification::track_type),
        &[],
    ),
    unit("hazmat", Some(values::enum_value::<Hazmat>), Some(classification::hazmat), &[]),
    unit(
        "hazmat_tunnel",
        Some(values::enum_value::<HazmatTunnel>),
        Some(classification::hazmat_tunnel),
        &[],
    ),
    unit(
        "hazmat_water",
        Some(values::enum_value::<HazmatWater>),
        Some(classification::hazmat_water),
        &[],
    ),
    unit("hgv", Some(values::enum_value::<Hgv>), Some(classification::hgv), &[]),
    unit("footway", Some(values::enum_value::<Footway>), Some(classification::footway), &[]),
    unit("lanes", Some(values::lanes), Some(classification::lanes), &[]),
    unit("osm_way_id", Some(values::osm_way_id), Some(classification::osm_way_id), &[]),
    unit("mtb_rating", Some(values::rating), Some(classification::mtb_rating), &[]),
    unit("hike_rating", Some(values::rating), Some(classification::hike_rating), &[]),
    unit("horse_rating", Some(values::rating), Some(classification::horse_rating), &[]),
    unit("country", Some(values::enum_value::<Country>), Some(classification::country), &[]),
    unit(
        "road_curvature_classification",
        Some(values::enum_value::<RoadCurvature>),
        Some(classification::road_curvature_classification),
        &[],
    ),
    unit(
        "road_classification",
        Some(values::enum_value::<RoadClassification>),
        Some(classification::road_classification),
        &[],
    ),
    unit(
        "road_classification_v2",
        Some(values::enum_value::<RoadClassificationV2>),
        Some(classification::road_classification_v2),
        &[],
    ),
    // regional figures delivered as tags
    unit(
        "build_percentage",
        Some(values::build_percentage),
        Some(classification::build_percentage),
        &[],
    ),
    unit(
        "population_density",
        Some(values::population_density),
        Some(classification::population_density),
        &[],
    ),
    unit(
        "rs_bike_access",
        Some(values::enum_value::<RsBikeAccess>),
        Some(classification::rs_bike_access),
        &[],
    ),
    // geometry
    unit("ferry_speed", Some(values::ferry_speed), Some(speed::ferry_speed), &[]),
    unit("curvature", Some(values::curvature), Some(geometry::curvature), &[]),
    unit("slope_calculator", None, Some(geometry::slope_calculator), &[]),
    unit("average_slope", Some(values::average_slope), None, &["slope_calculator"]),
    unit("max_slope", Some(values::max_slope), None, &["slope_calculator"]),
    // route networks
    unit(
        "bike_network",
        Some(values::enum_value::<RouteNetwork>),
        Some(classification::bike_network),
        &[],
    ),
    unit(
        "foot_network",
        Some(values::enum_value::<RouteNetwork>),
        Some(classification::foot_network),
        &[],
    ),
    unit(
        "mtb_network",
        Some(values::enum_value::<RouteNetwork>),
        Some(classification::mtb_network),
        &[],
    ),
    // per-mode access
    unit("car_access", Some(values::directed_flag), Some(access::car_access), &["roundabout"]),
    unit("bike_access", Some(values::directed_flag), Some(access::bike_access), &["roundabout"]),
    unit("foot_access", Some(values::directed_flag), Some(access::foot_access), &[]),
    unit("bus_access", Some(values::directed_flag), Some(access::bus_access), &["roundabout"]),
    unit("hov_access", Some(values::directed_flag), Some(access::hov_access), &["roundabout"]),
    unit("get_off_bike", Some(values::directed_flag), Some(access::get_off_bike), &["bike_access"]),
    // per-mode speed and priority
    unit(
        "car_average_speed",
        Some(values::car_speed),
        Some(speed::car_average_speed),
        &["ferry_speed"],
    ),
    unit(
        "bike_average_speed",
        Some(values::bike_speed),
        Some(speed::bike_average_speed),
        &["ferry_speed", "smoothness"],
    ),
    unit(
        "foot_average_speed",
        Some(values::foot_speed),
        Some(speed::foot_average_speed),
        &["ferry_speed"],
    ),
    unit(
        "bike_priority",
        Some(values::priority),
        Some(priority::bike_priority),
        &["bike_average_speed", "bike_network"],
    ),
    unit(
        "foot_priority",
        Some(values::priority),
        Some(priority::foot_priority),
        &["foot_network"],
    ),
    // conditional access
    unit(
        "car_temporal_access",
        Some(values::enum_value::<TemporalAccess>),
        Some(temporal::car_temporal_access),
        &[],
    ),
    unit(
        "bike_temporal_access",
        Some(values::enum_value::<TemporalAccess>),
        Some(temporal::bike_temporal_access),
        &[],
    ),
    unit(
        "foot_temporal_access",
        Some(values::enum_value::<TemporalAccess>),
        Some(temporal::foot_temporal_access),
        &[],
    ),
    // scenery scores
    unit(SCENERY_KEYS[0], Some(values::scenery), Some(classification::scenery), &[]),
    unit(SCENERY_KEYS[1], Some(values::scenery), Some(classification::scenery), &[]),
    unit(SCENERY_KEYS[2], Some(values::scenery), Some(classification::scenery), &[]),
    unit(SCENERY_KEYS[3], Some(values::scenery), Some(classification::scenery), &[]),
    unit(SCENERY_KEYS[4], Some(values::scenery), Some(classification::scenery), &[]),
    unit(SCENERY_KEYS[5], Some(values::scenery), Some(classification::scenery), &[]),
    unit(SCENERY_KEYS[6], Some(values::scenery), Some(classification::scenery), &[]),
    unit(SCENERY_KEYS[7], Some(values::scenery), Some(classification::scenery), &[]),
    unit(SCENERY_KEYS[8], Some(values::scenery), Some(classification::scenery), &[]),
    unit(SCENERY_KEYS[9], Some(values::scenery), Some(classification::scenery), &[]),
    unit(SCENERY_KEYS[10], Some(values::scenery), Some(classification::scenery), &[]),
    unit(SCENERY_KEYS[11], Some(values::scenery), Some(classification::scenery), &[]),
    unit(SCENERY_KEYS[12], Some(values::scenery), Some(classification::scenery), &[]),
    unit(SCENERY_KEYS[13], Some(values::scenery), Some(classification::scenery), &[]),
];

/// The static table as a registry
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultImportRegistry;

impl DefaultImportRegistry {
    pub fn spec(name: &str) -> Option<&'static UnitSpec> {
        UNITS.iter().find(|u| u.name == name)
    }
}

impl ImportRegistry for DefaultImportRegistry {
    fn request(&self, name: &str) -> RegistryEntry {
        if let Some(spec) = Self::spec(name) {
            return RegistryEntry::Found(spec.to_unit());
        }
        match OBSOLETE.iter().find(|(n, _)| *n == name) {
            Some((_, message)) => RegistryEntry::Obsolete(format!("{message}, {MIGRATION_08_09}")),
            None => RegistryEntry::NotFound,
        }
    }

    fn names(&self) -> Vec<String> {
        UNITS.iter().map(|u| u.name.to_string()).collect()
    }
}
