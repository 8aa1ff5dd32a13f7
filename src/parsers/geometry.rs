//! Geometry-derived values
//!
//! Elevation and geometry processing happen upstream; the reader attaches the results
//! to each edge as `edge_distance`, `edge_beeline`, `edge_average_slope` (signed percent
//! in forward direction) and `edge_max_slope`.

use super::TagParser;
use crate::config::PMap;
use crate::error::Result;
use crate::ev::values::{AVERAGE_SLOPE, MAX_SLOPE};
use crate::ev::{DecimalEncodedValue, Direction, EncodedValueLookup};
use crate::reader::{ReaderWay, RelationFlags};

/// Ratio of beeline to travelled distance, 1.0 for a straight edge
pub struct CurvatureCalculator {
    curvature: DecimalEncodedValue,
}

impl TagParser for CurvatureCalculator {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        let curvature = match (way.tag_f64("edge_beeline"), way.tag_f64("edge_distance")) {
            (Some(beeline), Some(distance)) if distance > 0.0 && beeline >= 0.0 => {
                (beeline / distance).min(1.0)
            }
            _ => 1.0,
        };
        self.curvature
            .set_decimal(Direction::Forward, record, curvature);
    }
}

pub fn curvature(name: &str, lookup: &EncodedValueLookup, _: &PMap) -> Result<Box<dyn TagParser>> {
    Ok(Box::new(CurvatureCalculator {
        curvature: lookup.decimal_value(name)?,
    }))
}

/// Writes `average_slope` and `max_slope`, whichever of them is registered.
///
/// `average_slope` keeps the uphill grade per direction: a forward climb of 4% stores
/// 4 forward and 0 reverse.
pub struct SlopeCalculator {
    average_slope: Option<DecimalEncodedValue>,
    max_slope: Option<DecimalEncodedValue>,
}

impl TagParser for SlopeCalculator {
    fn handle_way_tags(&self, _: u32, record: &mut [u32], way: &ReaderWay, _: &RelationFlags) {
        if let Some(ev) = &self.average_slope {
            let slope = way.tag_f64("edge_average_slope").unwrap_or(0.0);
            ev.set_decimal(Direction::Forward, record, slope.max(0.0));
            ev.set_decimal(Direction::Reverse, record, (-slope).max(0.0));
        }
        if let Some(ev) = &self.max_slope {
            let slope = way.tag_f64("edge_max_slope").unwrap_or(0.0).abs();
            ev.set_decimal(Direction::Forward, record, slope);
        }
    }
}

pub fn slope_calculator(
    _: &str,
    lookup: &EncodedValueLookup,
    _: &PMap,
) -> Result<Box<dyn TagParser>> {
    let average_slope = lookup
        .has(AVERAGE_SLOPE)
        .then(|| lookup.decimal_value(AVERAGE_SLOPE))
        .transpose()?;
    let max_slope = lookup
        .has(MAX_SLOPE)
        .then(|| lookup.decimal_value(MAX_SLOPE))
        .transpose()?;
    Ok(Box::new(SlopeCalculator {
        average_slope,
        max_slope,
    }))
}
