//! # Butterfly-ev
//!
//! Bit-packed per-edge road properties for the butterfly-osm routing engine.
//!
//! An import is described by a list of property names. Each name maps to an import
//! unit: an encoded value (how the property is stored in the edge record), a tag parser
//! (how it is derived from OSM tags) and the names it depends on. [`import::resolve`]
//! closes the list over its dependencies, registers every value before any parser is
//! built and hands back a frozen [`ev::EncodedValueLookup`] plus the parsers in
//! execution order.
//!
//! ```
//! use butterfly_ev::config::ImportRequest;
//! use butterfly_ev::ev::Direction;
//! use butterfly_ev::import::{resolve, DefaultImportRegistry, EdgeInput, ImportPass};
//! use butterfly_ev::reader::ReaderWay;
//!
//! let request = ImportRequest::parse("car_access, road_class").unwrap();
//! let plan = resolve(&DefaultImportRegistry, &request).unwrap();
//!
//! let edges = vec![EdgeInput::new(ReaderWay::new(1).with_tag("highway", "primary"))];
//! let store = ImportPass::new(&plan).run(&edges);
//!
//! let road_class = plan.lookup.get("road_class").unwrap();
//! assert_eq!(road_class.display_value(Direction::Forward, store.record(0).unwrap()), "primary");
//! ```

pub mod config;
pub mod edges;
pub mod error;
pub mod ev;
pub mod formats;
pub mod import;
pub mod parsers;
pub mod reader;

pub use config::{ImportConfig, ImportRequest, PMap};
pub use edges::EdgeStore;
pub use error::{EvError, Result};
pub use ev::{Direction, EncodedValue, EncodedValueLookup};
pub use import::{resolve, DefaultImportRegistry, ImportPlan, ImportRegistry, ImportUnit};
