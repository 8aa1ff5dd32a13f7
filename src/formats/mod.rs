//! On-disk formats

pub mod crc;
pub mod edge_values;

pub use edge_values::{FormatError, SnapshotInfo};
