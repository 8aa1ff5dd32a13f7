//! Way reader contract
//!
//! The map-source reader is an external collaborator. It hands over one [`ReaderWay`]
//! per way (tags, node tags and pre-computed per-edge values such as `edge_distance`)
//! plus the [`RelationFlags`] derived from the route relations the way belongs to.

use rustc_hash::FxHashMap;

use crate::ev::values::{Mode, RouteNetwork};
use crate::ev::EncodedEnum;

/// Tags of one way, looked up by key name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReaderWay {
    pub id: i64,
    tags: FxHashMap<String, String>,
    /// Tags of the way's nodes, in way order; untagged nodes may be omitted
    pub node_tags: Vec<FxHashMap<String, String>>,
}

impl ReaderWay {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn with_tag(mut self, key: &str, value: impl ToString) -> Self {
        self.set_tag(key, value);
        self
    }

    pub fn with_tags<'a, I>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (k, v) in tags {
            self.set_tag(k, v);
        }
        self
    }

    pub fn set_tag(&mut self, key: &str, value: impl ToString) {
        self.tags.insert(key.to_string(), value.to_string());
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.contains_key(key)
    }

    pub fn has_tag_value(&self, key: &str, value: &str) -> bool {
        self.tag(key) == Some(value)
    }

    /// True if `key` holds one of `values`
    pub fn has_tag_in(&self, key: &str, values: &[&str]) -> bool {
        self.tag(key).is_some_and(|v| values.contains(&v))
    }

    /// True if any of `keys` holds one of `values`
    pub fn any_tag_in(&self, keys: &[&str], values: &[&str]) -> bool {
        keys.iter().any(|k| self.has_tag_in(k, values))
    }

    /// Numeric tag; absent or unparsable yields `None`
    pub fn tag_f64(&self, key: &str) -> Option<f64> {
        self.tag(key)?.trim().parse().ok().filter(|v: &f64| v.is_finite())
    }

    /// First value present among `keys`, in the given priority order
    pub fn first_value(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.tag(k))
    }

    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value of `key` on any node of the way
    pub fn node_tag_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.node_tags
            .iter()
            .filter_map(move |n| n.get(key).map(String::as_str))
    }

    pub fn is_ferry(&self) -> bool {
        self.has_tag_in("route", &["ferry", "shuttle_train"])
    }
}

/// Route-network classification derived from relations, per mode.
///
/// Relations are resolved by the reader before ways are parsed, so parsers only read
/// these flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationFlags {
    pub bike: RouteNetwork,
    pub foot: RouteNetwork,
    pub mtb: RouteNetwork,
}

impl Default for RelationFlags {
    fn default() -> Self {
        Self {
            bike: RouteNetwork::Missing,
            foot: RouteNetwork::Missing,
            mtb: RouteNetwork::Missing,
        }
    }
}

impl RelationFlags {
    pub fn network(&self, mode: Mode) -> RouteNetwork {
        match mode {
            Mode::Bike => self.bike,
            Mode::Foot => self.foot,
            Mode::Mtb => self.mtb,
            _ => RouteNetwork::Missing,
        }
    }

    pub fn with_network(mut self, mode: Mode, network: RouteNetwork) -> Self {
        match mode {
            Mode::Bike => self.bike = network,
            Mode::Foot => self.foot = network,
            Mode::Mtb => self.mtb = network,
            _ => {}
        }
        self
    }

    /// Fold one route relation's tags into the flags, keeping the highest-ranked network.
    pub fn add_route_relation(&mut self, tags: &FxHashMap<String, String>) {
        let get = |k: &str| tags.get(k).map(String::as_str);
        let network = get("network").map(network_from_tag).unwrap_or(RouteNetwork::Other);

        let slot = match get("route") {
            Some("bicycle") => &mut self.bike,
            Some("mtb") => &mut self.mtb,
            Some("hiking") | Some("foot") => &mut self.foot,
            _ => return,
        };
        *slot = better(*slot, network);
    }
}

fn network_from_tag(value: &str) -> RouteNetwork {
    match value {
        "icn" | "iwn" => RouteNetwork::International,
        "ncn" | "nwn" => RouteNetwork::National,
        "rcn" | "rwn" => RouteNetwork::Regional,
        "lcn" | "lwn" => RouteNetwork::Local,
        _ => RouteNetwork::Other,
    }
}

/// International ranks above national and so on; `OTHER` only beats `MISSING`.
fn better(current: RouteNetwork, candidate: RouteNetwork) -> RouteNetwork {
    let rank = |n: RouteNetwork| match n {
        RouteNetwork::Missing => 0,
        RouteNetwork::Other => 1,
        other => 10 - other.ordinal(),
    };
    if rank(candidate) > rank(current) {
        candidate
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relation(pairs: &[(&str, &str)]) -> FxHashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_tag_helpers() {
        let way = ReaderWay::new(7)
            .with_tag("highway", "primary")
            .with_tag("maxspeed", "50")
            .with_tag("width", "wide");
        assert_eq!(way.tag("highway"), Some("primary"));
        assert!(way.has_tag("maxspeed"));
        assert!(way.has_tag_value("highway", "primary"));
        assert!(way.has_tag_in("highway", &["primary", "secondary"]));
        assert!(!way.has_tag_in("surface", &["asphalt"]));
        assert_eq!(way.tag_f64("maxspeed"), Some(50.0));
        assert_eq!(way.tag_f64("width"), None);
        assert_eq!(way.first_value(&["maxspeed:forward", "maxspeed"]), Some("50"));
        assert!(way.any_tag_in(&["access", "highway"], &["primary"]));
    }

    #[test]
    fn test_node_tags() {
        let mut way = ReaderWay::new(1);
        way.node_tags.push(relation(&[("barrier", "gate")]));
        way.node_tags.push(FxHashMap::default());
        way.node_tags.push(relation(&[("barrier", "bollard")]));
        let barriers: Vec<_> = way.node_tag_values("barrier").collect();
        assert_eq!(barriers, vec!["gate", "bollard"]);
    }

    #[test]
    fn test_route_relations_keep_best_network() {
        let mut flags = RelationFlags::default();
        flags.add_route_relation(&relation(&[("route", "bicycle"), ("network", "lcn")]));
        assert_eq!(flags.bike, RouteNetwork::Local);
        flags.add_route_relation(&relation(&[("route", "bicycle"), ("network", "ncn")]));
        assert_eq!(flags.bike, RouteNetwork::National);
        flags.add_route_relation(&relation(&[("route", "bicycle"), ("network", "rcn")]));
        assert_eq!(flags.bike, RouteNetwork::National);
        flags.add_route_relation(&relation(&[("route", "bicycle")]));
        assert_eq!(flags.bike, RouteNetwork::National);

        flags.add_route_relation(&relation(&[("route", "hiking"), ("network", "iwn")]));
        assert_eq!(flags.foot, RouteNetwork::International);
        flags.add_route_relation(&relation(&[("route", "mtb")]));
        assert_eq!(flags.mtb, RouteNetwork::Other);

        flags.add_route_relation(&relation(&[("route", "bus"), ("network", "ncn")]));
        assert_eq!(flags.network(Mode::Car), RouteNetwork::Missing);
    }
}
