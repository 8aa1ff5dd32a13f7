//! Common utilities for the butterfly-osm toolkit

pub mod suggest;

pub use suggest::suggest;
