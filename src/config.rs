//! Configuration: per-unit option bags, the encoded-values request string and the YAML
//! import configuration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{EvError, Result};

/// String-keyed option bag handed to import-unit factories.
///
/// Values stay strings until a factory asks for a type; a value that does not parse
/// as the requested type is a configuration error, a missing key yields the default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, ScalarValue>",
    into = "BTreeMap<String, String>"
)]
pub struct PMap(BTreeMap<String, String>);

/// YAML scalars accepted as option values
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl From<BTreeMap<String, ScalarValue>> for PMap {
    fn from(map: BTreeMap<String, ScalarValue>) -> Self {
        PMap(
            map.into_iter()
                .map(|(k, v)| {
                    let v = match v {
                        ScalarValue::Bool(b) => b.to_string(),
                        ScalarValue::Int(i) => i.to_string(),
                        ScalarValue::Float(f) => f.to_string(),
                        ScalarValue::Text(s) => s,
                    };
                    (k, v)
                })
                .collect(),
        )
    }
}

impl From<PMap> for BTreeMap<String, String> {
    fn from(map: PMap) -> Self {
        map.0
    }
}

impl PMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `key=value` pairs separated by `|`.
    pub fn parse(s: &str) -> Result<Self> {
        let mut map = PMap::new();
        for pair in s.split('|').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| EvError::InvalidConfig(format!("expected key=value, got '{pair}'")))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(EvError::InvalidConfig(format!("empty key in '{pair}'")));
            }
            map.put(key, value.trim());
        }
        Ok(map)
    }

    pub fn with(mut self, key: &str, value: impl ToString) -> Self {
        self.put(key, value);
        self
    }

    pub fn put(&mut self, key: &str, value: impl ToString) {
        self.0.insert(key.to_string(), value.to_string());
    }

    /// Copy every entry of `other` over this map.
    pub fn merge(&mut self, other: &PMap) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    pub fn get_int(&self, key: &str, default: i64) -> Result<i64> {
        match self.get(key) {
            None => Ok(default),
            Some(v) => v
                .parse()
                .map_err(|_| EvError::InvalidConfig(format!("'{key}' must be an integer, got '{v}'"))),
        }
    }

    pub fn get_f64(&self, key: &str, default: f64) -> Result<f64> {
        match self.get(key) {
            None => Ok(default),
            Some(v) => v
                .parse()
                .map_err(|_| EvError::InvalidConfig(format!("'{key}' must be a number, got '{v}'"))),
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool> {
        match self.get(key) {
            None => Ok(default),
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            Some(v) => Err(EvError::InvalidConfig(format!(
                "'{key}' must be true or false, got '{v}'"
            ))),
        }
    }

    /// Literal set separated by `,` or `;`. Blank entries are dropped.
    pub fn get_set(&self, key: &str) -> Vec<String> {
        self.get(key)
            .map(|v| {
                v.split(&[',', ';'][..])
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl std::fmt::Display for PMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (k, v) in &self.0 {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{k}={v}")?;
            first = false;
        }
        Ok(())
    }
}

/// Ordered list of requested encoded values with their options.
///
/// Parsed from strings like `"car_access, car_average_speed|speed_bits=10|speed_factor=5"`.
/// Inside the string, list-valued options separate their items with `;`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportRequest {
    entries: Vec<(String, PMap)>,
}

impl ImportRequest {
    pub fn parse(s: &str) -> Result<Self> {
        let mut request = ImportRequest::default();
        for item in s.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            let (name, props) = match item.split_once('|') {
                Some((name, rest)) => (name.trim(), PMap::parse(rest)?),
                None => (item, PMap::new()),
            };
            request.add(name, props)?;
        }
        Ok(request)
    }

    /// Append a name. Repeating a name is accepted only with identical options.
    pub fn add(&mut self, name: &str, props: PMap) -> Result<()> {
        if name.is_empty() {
            return Err(EvError::InvalidConfig("empty encoded value name".into()));
        }
        match self.entries.iter().find(|(n, _)| n == name) {
            Some((_, existing)) if *existing == props => Ok(()),
            Some((_, existing)) => Err(EvError::InvalidConfig(format!(
                "'{name}' requested twice with different options ('{existing}' vs '{props}')"
            ))),
            None => {
                self.entries.push((name.to_string(), props));
                Ok(())
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Options for `name`; unknown names get an empty bag.
    pub fn props(&self, name: &str) -> PMap {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, p)| p.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// YAML import configuration.
///
/// ```yaml
/// encoded_values: car_access, car_average_speed, bus_access
/// threads: 4
/// output: graph/edge_values.bin
/// options:
///   bus_access:
///     restrictions: private,permit
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImportConfig {
    pub encoded_values: String,
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Per-unit options, merged over those given inline in `encoded_values`
    #[serde(default)]
    pub options: BTreeMap<String, PMap>,
}

impl ImportConfig {
    pub fn from_yaml(s: &str) -> Result<Self> {
        serde_yaml::from_str(s).map_err(|e| EvError::InvalidConfig(e.to_string()))
    }

    pub fn request(&self) -> Result<ImportRequest> {
        let parsed = ImportRequest::parse(&self.encoded_values)?;
        for name in self.options.keys() {
            if !parsed.names().any(|n| n == name) {
                return Err(EvError::InvalidConfig(format!(
                    "options given for '{name}' which is not in encoded_values"
                )));
            }
        }

        let mut request = ImportRequest::default();
        for name in parsed.names() {
            let mut props = parsed.props(name);
            if let Some(extra) = self.options.get(name) {
                props.merge(extra);
            }
            request.add(name, props)?;
        }
        Ok(request)
    }
}
