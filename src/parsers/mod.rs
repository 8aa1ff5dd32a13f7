//! Tag parsers: raw way tags to record bits
//!
//! A parser holds clones of the encoded values it touches, so after construction it is
//! independent of the lookup. Parsing never fails: missing or malformed tags resolve to
//! the property's documented default.

pub mod access;
pub mod classification;
pub mod geometry;
pub mod max_values;
pub mod priority;
pub mod speed;
pub mod temporal;

use crate::config::PMap;
use crate::error::Result;
use crate::ev::EncodedValueLookup;
use crate::reader::{ReaderWay, RelationFlags};

pub trait TagParser: Send + Sync {
    /// Write this parser's values for one directed edge derived from `way`.
    fn handle_way_tags(
        &self,
        edge_id: u32,
        record: &mut [u32],
        way: &ReaderWay,
        relation_flags: &RelationFlags,
    );
}

/// Shape shared by every parser factory in the registry table
pub type ParserFactory = fn(&str, &EncodedValueLookup, &PMap) -> Result<Box<dyn TagParser>>;

/// Values meaning "explicitly yes" across access-style tags
pub(crate) const YES_VALUES: &[&str] = &["yes", "true", "1", "designated", "permissive"];

/// Speed in km/h from a `maxspeed`-style value.
///
/// Understands plain numbers, `mph`, `knots`, `none` (150) and `walk` (6).
pub fn parse_speed_kmh(value: &str) -> Option<f64> {
    let value = value.trim().to_ascii_lowercase();
    match value.as_str() {
        "none" => return Some(150.0),
        "walk" => return Some(6.0),
        _ => {}
    }

    let (number, factor) = if let Some(n) = value.strip_suffix("mph") {
        (n, 1.609_344)
    } else if let Some(n) = value.strip_suffix("knots") {
        (n, 1.852)
    } else if let Some(n) = value.strip_suffix("km/h") {
        (n, 1.0)
    } else if let Some(n) = value.strip_suffix("kmh") {
        (n, 1.0)
    } else {
        (value.as_str(), 1.0)
    };

    let speed: f64 = number.trim().parse().ok()?;
    if speed.is_finite() && speed > 0.0 {
        Some(speed * factor)
    } else {
        None
    }
}

/// Weight in tonnes: `7.5`, `7.5 t`, `3500 kg`, `8000 lbs`
pub fn parse_weight_tonnes(value: &str) -> Option<f64> {
    let value = value.trim().to_ascii_lowercase();
    let (number, factor) = if let Some(n) = value.strip_suffix("kg") {
        (n, 0.001)
    } else if let Some(n) = value.strip_suffix("lbs") {
        (n, 0.000_453_592)
    } else if let Some(n) = value.strip_suffix("st") {
        (n, 0.907_185)
    } else if let Some(n) = value.strip_suffix('t') {
        (n, 1.0)
    } else {
        (value.as_str(), 1.0)
    };
    positive(number.trim().replace(',', ".").parse().ok()?, factor)
}

/// Length in metres: `3.5`, `3.5 m`, `350 cm`, `12'6"`, `12 ft`, `8 in`
pub fn parse_length_m(value: &str) -> Option<f64> {
    let value = value.trim().to_ascii_lowercase();

    if let Some((feet, rest)) = value.split_once('\'') {
        let feet: f64 = feet.trim().parse().ok()?;
        let inches = rest.trim().trim_end_matches('"').trim();
        let inches: f64 = if inches.is_empty() { 0.0 } else { inches.parse().ok()? };
        return positive(feet * 0.3048 + inches * 0.0254, 1.0);
    }

    let (number, factor) = if let Some(n) = value.strip_suffix("cm") {
        (n, 0.01)
    } else if let Some(n) = value.strip_suffix("ft") {
        (n, 0.3048)
    } else if let Some(n) = value.strip_suffix("in") {
        (n, 0.0254)
    } else if let Some(n) = value.strip_suffix('m') {
        (n, 1.0)
    } else {
        (value.as_str(), 1.0)
    };
    positive(number.trim().replace(',', ".").parse().ok()?, factor)
}

fn positive(number: f64, factor: f64) -> Option<f64> {
    let v = number * factor;
    (v.is_finite() && v > 0.0).then_some(v)
}

/// Oneway direction of a way for a given set of oneway keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Oneway {
    No,
    Forward,
    Backward,
}

pub(crate) fn oneway_from(value: Option<&str>) -> Oneway {
    match value {
        Some("yes") | Some("true") | Some("1") => Oneway::Forward,
        Some("-1") | Some("reverse") => Oneway::Backward,
        _ => Oneway::No,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_speed() {
        assert_eq!(parse_speed_kmh("50"), Some(50.0));
        assert_eq!(parse_speed_kmh(" 30 km/h"), Some(30.0));
        assert_eq!(parse_speed_kmh("none"), Some(150.0));
        assert_eq!(parse_speed_kmh("walk"), Some(6.0));
        assert!((parse_speed_kmh("30 mph").unwrap() - 48.28).abs() < 0.01);
        assert!((parse_speed_kmh("10 knots").unwrap() - 18.52).abs() < 0.01);
        assert_eq!(parse_speed_kmh("signals"), None);
        assert_eq!(parse_speed_kmh("0"), None);
        assert_eq!(parse_speed_kmh("-20"), None);
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight_tonnes("7.5"), Some(7.5));
        assert_eq!(parse_weight_tonnes("3.5 t"), Some(3.5));
        assert_eq!(parse_weight_tonnes("3500 kg"), Some(3.5));
        assert_eq!(parse_weight_tonnes("7,5"), Some(7.5));
        assert!((parse_weight_tonnes("8000 lbs").unwrap() - 3.628).abs() < 0.001);
        assert_eq!(parse_weight_tonnes("heavy"), None);
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length_m("3.5"), Some(3.5));
        assert_eq!(parse_length_m("3.5 m"), Some(3.5));
        assert_eq!(parse_length_m("350 cm"), Some(3.5));
        assert!((parse_length_m("12'6\"").unwrap() - 3.81).abs() < 0.001);
        assert!((parse_length_m("10 ft").unwrap() - 3.048).abs() < 0.001);
        assert_eq!(parse_length_m("default"), None);
        assert_eq!(parse_length_m("0"), None);
    }

    #[test]
    fn test_oneway() {
        assert_eq!(oneway_from(Some("yes")), Oneway::Forward);
        assert_eq!(oneway_from(Some("-1")), Oneway::Backward);
        assert_eq!(oneway_from(Some("no")), Oneway::No);
        assert_eq!(oneway_from(None), Oneway::No);
    }
}
