//! Dependency resolution and two-phase construction
//!
//! 1. Closure and order: depth-first post-order over the requested names, roots in
//!    request order and dependencies in declaration order.
//! 2. Phase 1: every encoded value factory runs in that order and its value is
//!    registered. The record layout is frozen afterwards.
//! 3. Phase 2: every parser factory runs in the same order against the complete lookup.
//!
//! Any failure aborts before a single way is parsed.

use rustc_hash::FxHashMap;
use tracing::{debug, info};

use super::{ImportRegistry, ImportUnit, RegistryEntry};
use crate::config::ImportRequest;
use crate::error::{EvError, Result};
use crate::ev::EncodedValueLookup;
use crate::parsers::TagParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

struct Walk<'a, R: ?Sized> {
    registry: &'a R,
    marks: FxHashMap<String, Mark>,
    stack: Vec<String>,
    order: Vec<ImportUnit>,
}

impl<R: ImportRegistry + ?Sized> Walk<'_, R> {
    fn visit(&mut self, name: &str, required_by: Option<&str>) -> Result<()> {
        match self.marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let start = self.stack.iter().position(|n| n == name).unwrap_or(0);
                let mut path = self.stack[start..].to_vec();
                path.push(name.to_string());
                return Err(EvError::Cycle { path });
            }
            None => {}
        }

        let unit = match self.registry.request(name) {
            RegistryEntry::Found(unit) => unit,
            RegistryEntry::Obsolete(guidance) => {
                return Err(EvError::Obsolete {
                    name: name.to_string(),
                    guidance,
                });
            }
            RegistryEntry::NotFound => {
                let names = self.registry.names();
                let suggestion = butterfly_common::suggest(name, names.iter().map(String::as_str));
                return Err(EvError::UnknownName {
                    name: name.to_string(),
                    required_by: required_by.map(str::to_string),
                    suggestion,
                });
            }
        };

        self.marks.insert(name.to_string(), Mark::Visiting);
        self.stack.push(name.to_string());
        for dep in unit.dependencies() {
            self.visit(dep, Some(name))?;
        }
        self.stack.pop();
        self.marks.insert(name.to_string(), Mark::Done);
        self.order.push(unit);
        Ok(())
    }
}

/// Dependency closure of `names`, every unit after all of its dependencies.
///
/// Repeated names are visited once. The same input always yields the same order.
pub fn resolve_order<'a, R, I>(registry: &R, names: I) -> Result<Vec<ImportUnit>>
where
    R: ImportRegistry + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let mut walk = Walk {
        registry,
        marks: FxHashMap::default(),
        stack: Vec::new(),
        order: Vec::new(),
    };
    for name in names {
        walk.visit(name, None)?;
    }
    Ok(walk.order)
}

/// Everything an import pass needs, built and frozen
pub struct ImportPlan {
    pub order: Vec<String>,
    pub lookup: EncodedValueLookup,
    pub parsers: Vec<(String, Box<dyn TagParser>)>,
}

impl std::fmt::Debug for ImportPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportPlan")
            .field("order", &self.order)
            .field("lookup", &self.lookup)
            .field(
                "parsers",
                &self.parsers.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ImportPlan {
    pub fn parser_names(&self) -> impl Iterator<Item = &str> {
        self.parsers.iter().map(|(n, _)| n.as_str())
    }
}

/// Resolve `request` against `registry` and construct values and parsers.
///
/// Options apply to the unit they were given for. Units pulled in only as dependencies
/// are built with an empty option bag.
pub fn resolve<R>(registry: &R, request: &ImportRequest) -> Result<ImportPlan>
where
    R: ImportRegistry + ?Sized,
{
    let units = resolve_order(registry, request.names())?;
    let order: Vec<String> = units.iter().map(|u| u.name().to_string()).collect();
    info!(
        requested = request.len(),
        resolved = order.len(),
        "Resolved import units"
    );
    debug!(order = %order.join(", "), "Import order");

    let mut lookup = EncodedValueLookup::new();
    for unit in &units {
        let props = request.props(unit.name());
        if let Some(value) = unit.create_encoded_value(&props) {
            lookup.register(value?)?;
        }
    }
    lookup.freeze();
    info!(
        values = lookup.len(),
        words_per_edge = lookup.words_per_edge(),
        "Encoded values registered"
    );

    let mut parsers = Vec::new();
    for unit in &units {
        let props = request.props(unit.name());
        if let Some(parser) = unit.create_parser(&lookup, &props) {
            parsers.push((unit.name().to_string(), parser?));
            debug!(name = unit.name(), "Created tag parser");
        }
    }
    info!(parsers = parsers.len(), "Tag parsers created");

    Ok(ImportPlan {
        order,
        lookup,
        parsers,
    })
}
