//! Import units and registries
//!
//! An [`ImportUnit`] bundles what one property name contributes to an import: an
//! optional encoded value factory, an optional parser factory and the names it depends
//! on. Registries map names to units; [`DefaultImportRegistry`] is the built-in table.

pub mod pipeline;
pub mod registry;
pub mod resolver;

pub use pipeline::{EdgeInput, ImportPass};
pub use registry::DefaultImportRegistry;
pub use resolver::{resolve, resolve_order, ImportPlan};

use std::fmt;
use std::sync::Arc;

use crate::config::PMap;
use crate::error::Result;
use crate::ev::{EncodedValue, EncodedValueLookup};
use crate::parsers::TagParser;

type EncodedValueFn = dyn Fn(&str, &PMap) -> Result<EncodedValue> + Send + Sync;
type ParserFn = dyn Fn(&str, &EncodedValueLookup, &PMap) -> Result<Box<dyn TagParser>> + Send + Sync;

/// Registry descriptor for one property name
#[derive(Clone)]
pub struct ImportUnit {
    name: String,
    encoded_value: Option<Arc<EncodedValueFn>>,
    parser: Option<Arc<ParserFn>>,
    dependencies: Vec<String>,
}

impl ImportUnit {
    /// A unit with neither factory, contributing only ordering
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            encoded_value: None,
            parser: None,
            dependencies: Vec::new(),
        }
    }

    pub fn with_encoded_value<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str, &PMap) -> Result<EncodedValue> + Send + Sync + 'static,
    {
        self.encoded_value = Some(Arc::new(factory));
        self
    }

    pub fn with_parser<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str, &EncodedValueLookup, &PMap) -> Result<Box<dyn TagParser>> + Send + Sync + 'static,
    {
        self.parser = Some(Arc::new(factory));
        self
    }

    pub fn with_dependencies(mut self, dependencies: &[&str]) -> Self {
        self.dependencies = dependencies.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dependency names in declaration order
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn has_encoded_value(&self) -> bool {
        self.encoded_value.is_some()
    }

    pub fn has_parser(&self) -> bool {
        self.parser.is_some()
    }

    /// Run the encoded value factory, `None` for units without one
    pub fn create_encoded_value(&self, props: &PMap) -> Option<Result<EncodedValue>> {
        self.encoded_value.as_ref().map(|f| f(&self.name, props))
    }

    /// Run the parser factory against a complete lookup, `None` for units without one
    pub fn create_parser(
        &self,
        lookup: &EncodedValueLookup,
        props: &PMap,
    ) -> Option<Result<Box<dyn TagParser>>> {
        self.parser.as_ref().map(|f| f(&self.name, lookup, props))
    }
}

impl fmt::Debug for ImportUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImportUnit")
            .field("name", &self.name)
            .field("encoded_value", &self.has_encoded_value())
            .field("parser", &self.has_parser())
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Outcome of a registry query
#[derive(Debug, Clone)]
pub enum RegistryEntry {
    Found(ImportUnit),
    /// Retired on purpose; carries migration guidance
    Obsolete(String),
    NotFound,
}

pub trait ImportRegistry {
    fn request(&self, name: &str) -> RegistryEntry;

    /// Every resolvable name, used for suggestions and listings
    fn names(&self) -> Vec<String>;
}

/// Registry built at runtime, optionally layered over another registry.
///
/// Units added here shadow the base registry's units of the same name.
#[derive(Default)]
pub struct ImportUnitTable {
    units: Vec<ImportUnit>,
    obsolete: Vec<(String, String)>,
    base: Option<Box<dyn ImportRegistry + Send + Sync>>,
}

impl ImportUnitTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layered_on<R>(base: R) -> Self
    where
        R: ImportRegistry + Send + Sync + 'static,
    {
        Self {
            base: Some(Box::new(base)),
            ..Self::default()
        }
    }

    /// Add or replace a unit; an obsolete entry of the same name is dropped.
    pub fn with_unit(mut self, unit: ImportUnit) -> Self {
        self.units.retain(|u| u.name() != unit.name());
        self.obsolete.retain(|(n, _)| n != unit.name());
        self.units.push(unit);
        self
    }

    /// Retire `name`, dropping any unit of that name added earlier.
    pub fn with_obsolete(mut self, name: &str, guidance: &str) -> Self {
        self.units.retain(|u| u.name() != name);
        self.obsolete.retain(|(n, _)| n != name);
        self.obsolete.push((name.to_string(), guidance.to_string()));
        self
    }
}

impl ImportRegistry for ImportUnitTable {
    fn request(&self, name: &str) -> RegistryEntry {
        if let Some(unit) = self.units.iter().find(|u| u.name() == name) {
            return RegistryEntry::Found(unit.clone());
        }
        if let Some((_, guidance)) = self.obsolete.iter().find(|(n, _)| n == name) {
            return RegistryEntry::Obsolete(guidance.clone());
        }
        match &self.base {
            Some(base) => base.request(name),
            None => RegistryEntry::NotFound,
        }
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.units.iter().map(|u| u.name().to_string()).collect();
        if let Some(base) = &self.base {
            for name in base.names() {
                let retired = self.obsolete.iter().any(|(n, _)| *n == name);
                if !retired && !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }
}
