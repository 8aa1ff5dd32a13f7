//! Line-delimited JSON edge input
//!
//! One edge per line:
//!
//! ```json
//! {"way_id": 42, "tags": {"highway": "primary", "maxspeed": 50},
//!  "node_tags": [{"barrier": "gate"}],
//!  "relations": [{"route": "bicycle", "network": "rcn"}]}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use butterfly_ev::import::EdgeInput;
use butterfly_ev::reader::{ReaderWay, RelationFlags};
use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Tag values as they appear in JSON; numbers and booleans are kept in their text form
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Text(s) => f.write_str(s),
            TagValue::Int(i) => write!(f, "{i}"),
            TagValue::Float(v) => write!(f, "{v}"),
            TagValue::Bool(b) => write!(f, "{b}"),
        }
    }
}

type Tags = BTreeMap<String, TagValue>;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeLine {
    #[serde(default)]
    pub way_id: i64,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub node_tags: Vec<Tags>,
    /// Tags of the route relations the way is a member of
    #[serde(default)]
    pub relations: Vec<Tags>,
}

fn to_map(tags: &Tags) -> FxHashMap<String, String> {
    tags.iter().map(|(k, v)| (k.clone(), v.to_string())).collect()
}

impl From<EdgeLine> for EdgeInput {
    fn from(line: EdgeLine) -> Self {
        let mut way = ReaderWay::new(line.way_id);
        for (key, value) in &line.tags {
            way.set_tag(key, value);
        }
        way.node_tags = line.node_tags.iter().map(to_map).collect();

        let mut flags = RelationFlags::default();
        for relation in &line.relations {
            flags.add_route_relation(&to_map(relation));
        }
        EdgeInput::new(way).with_relation_flags(flags)
    }
}

pub fn read_edges<R: BufRead>(reader: R) -> Result<Vec<EdgeInput>> {
    let mut edges = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", i + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parsed: EdgeLine =
            serde_json::from_str(line).with_context(|| format!("line {}: invalid edge", i + 1))?;
        edges.push(parsed.into());
    }
    Ok(edges)
}

/// Read edges from `path`, or from stdin when `path` is `-`
pub fn load_edges(path: &Path) -> Result<Vec<EdgeInput>> {
    if path.as_os_str() == "-" {
        return read_edges(io::stdin().lock());
    }
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_edges(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use butterfly_ev::ev::values::{Mode, RouteNetwork};

    #[test]
    fn test_reads_tags_nodes_and_relations() {
        let input = r#"
# two edges
{"way_id": 7, "tags": {"highway": "primary", "maxspeed": 50}, "node_tags": [{"barrier": "gate"}]}

{"tags": {"highway": "cycleway"}, "relations": [{"route": "bicycle", "network": "ncn"}]}
"#;
        let edges = read_edges(input.as_bytes()).unwrap();
        assert_eq!(edges.len(), 2);

        assert_eq!(edges[0].way.id, 7);
        assert_eq!(edges[0].way.tag("maxspeed"), Some("50"));
        assert_eq!(edges[0].way.node_tags.len(), 1);
        assert_eq!(
            edges[1].relation_flags.network(Mode::Bike),
            RouteNetwork::National
        );
    }

    #[test]
    fn test_reports_line_number() {
        let err = read_edges("{\"tags\": {}}\n{\"tgas\": {}}\n".as_bytes()).unwrap_err();
        assert!(format!("{err:#}").starts_with("line 2"));
    }
}
