//! CLI commands for butterfly-ev
//!
//! Kept out of the library: input decoding, console reports and thread-pool setup.

pub mod input;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use butterfly_ev::config::{ImportConfig, ImportRequest, PMap};
use butterfly_ev::ev::{Direction, EncodedValueLookup};
use butterfly_ev::formats::edge_values;
use butterfly_ev::import::registry::UNITS;
use butterfly_ev::import::{resolve, DefaultImportRegistry, ImportPass};
use serde_json::{json, Map, Value};
use tracing::info;

/// `list`: every built-in import unit
pub fn list() -> Result<()> {
    println!("{:<34} {:<8} {:>4}  {:<6}  dependencies", "name", "kind", "bits", "parser");
    for spec in UNITS {
        let (kind, bits) = match spec.encoded_value {
            Some(factory) => {
                let value = factory(spec.name, &PMap::new())?;
                (value.kind().to_string(), value.bits().to_string())
            }
            None => ("-".to_string(), "-".to_string()),
        };
        println!(
            "{:<34} {:<8} {:>4}  {:<6}  {}",
            spec.name,
            kind,
            bits,
            if spec.parser.is_some() { "yes" } else { "no" },
            spec.dependencies.join(", ")
        );
    }
    Ok(())
}

/// `resolve`: order, record layout and parsers for a request string
pub fn resolve_request(encoded_values: &str) -> Result<()> {
    let request = ImportRequest::parse(encoded_values)?;
    let plan = resolve(&DefaultImportRegistry, &request)?;

    println!("Order: {}", plan.order.join(" -> "));
    println!();
    print_layout(&plan.lookup);
    println!();
    println!("Parsers: {}", plan.parser_names().collect::<Vec<_>>().join(", "));
    Ok(())
}

pub struct ImportArgs {
    pub config: Option<PathBuf>,
    pub encoded_values: Option<String>,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub threads: Option<usize>,
}

fn load_config(args: &ImportArgs) -> Result<ImportConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            ImportConfig::from_yaml(&text)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        None => ImportConfig::default(),
    };

    // command-line flags win over the file
    if let Some(encoded_values) = &args.encoded_values {
        config.encoded_values = encoded_values.clone();
    }
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    if args.output.is_some() {
        config.output = args.output.clone();
    }

    if config.encoded_values.trim().is_empty() {
        bail!("No encoded values requested, pass --encoded-values or a config file");
    }
    if config.threads == Some(0) {
        bail!("--threads must be at least 1");
    }
    Ok(config)
}

/// `import`: resolve, run every parser over the input edges, then write or print
pub fn import(args: ImportArgs) -> Result<()> {
    let start = Instant::now();
    let config = load_config(&args)?;
    let request = config.request()?;
    let plan = resolve(&DefaultImportRegistry, &request)?;

    let edges = input::load_edges(&args.input)?;
    info!(edges = edges.len(), input = %args.input.display(), "Loaded edges");

    let pass = ImportPass::new(&plan);
    let store = match config.threads {
        Some(1) => pass.run(&edges),
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .context("Failed to build thread pool")?
            .install(|| pass.run_parallel(&edges)),
        None => pass.run_parallel(&edges),
    };

    match &config.output {
        Some(path) => {
            edge_values::write(path, &plan.lookup, &store)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Wrote {} edges ({} words each) to {} in {:.2}s",
                store.len(),
                store.words_per_edge(),
                path.display(),
                start.elapsed().as_secs_f64()
            );
        }
        None => {
            for (i, edge) in edges.iter().enumerate() {
                if let Some(record) = store.record(i) {
                    let mut report = edge_report(&plan.lookup, record);
                    report.insert("way_id".into(), json!(edge.way.id));
                    println!("{}", Value::Object(report));
                }
            }
        }
    }
    Ok(())
}

/// `inspect`: verify a snapshot and print its layout, optionally one decoded edge
pub fn inspect(snapshot: &Path, edge: Option<usize>) -> Result<()> {
    let info = edge_values::verify(snapshot)
        .with_context(|| format!("Failed to verify {}", snapshot.display()))?;
    println!("File:           {}", snapshot.display());
    println!("Size:           {} bytes", info.bytes);
    println!("Edges:          {}", info.edge_count);
    println!("Words per edge: {}", info.words_per_edge);
    println!("Values:         {}", info.encoded_values);
    println!("Checksums:      ok");

    let (lookup, store) = edge_values::read(snapshot)?;
    println!();
    print_layout(&lookup);

    if let Some(edge) = edge {
        let Some(record) = store.record(edge) else {
            bail!("Edge {edge} out of range, snapshot holds {} edges", store.len());
        };
        println!();
        println!(
            "{}",
            serde_json::to_string_pretty(&Value::Object(edge_report(&lookup, record)))?
        );
    }
    Ok(())
}

fn print_layout(lookup: &EncodedValueLookup) {
    println!(
        "{:<34} {:<8} {:>4} {:>5} {:>5}  directions",
        "name", "kind", "word", "shift", "bits"
    );
    for value in lookup.values() {
        let placement = value.placement();
        println!(
            "{:<34} {:<8} {:>4} {:>5} {:>5}  {}",
            value.name(),
            value.kind().to_string(),
            placement.word,
            placement.shift,
            placement.bits,
            if placement.two_directions { 2 } else { 1 }
        );
    }
    println!("Words per edge: {}", lookup.words_per_edge());
}

/// Decoded values of one record; two-direction values report both directions
fn edge_report(lookup: &EncodedValueLookup, record: &[u32]) -> Map<String, Value> {
    let mut out = Map::new();
    for value in lookup.values() {
        let forward = value.display_value(Direction::Forward, record);
        let entry = if value.is_two_directions() {
            json!({
                "forward": forward,
                "reverse": value.display_value(Direction::Reverse, record),
            })
        } else {
            json!(forward)
        };
        out.insert(value.name().to_string(), entry);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_report_shapes() {
        let request = ImportRequest::parse("car_access, road_class").unwrap();
        let plan = resolve(&DefaultImportRegistry, &request).unwrap();
        let record = plan.lookup.new_record();

        let report = edge_report(&plan.lookup, &record);
        assert_eq!(report["road_class"], json!("other"));
        assert_eq!(report["roundabout"], json!("false"));
        assert_eq!(
            report["car_access"],
            json!({"forward": "false", "reverse": "false"})
        );
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.yaml");
        fs::write(&path, "encoded_values: road_class\nthreads: 2\n").unwrap();

        let config = load_config(&ImportArgs {
            config: Some(path),
            encoded_values: Some("surface".into()),
            input: PathBuf::from("-"),
            output: None,
            threads: None,
        })
        .unwrap();
        assert_eq!(config.encoded_values, "surface");
        assert_eq!(config.threads, Some(2));
    }

    #[test]
    fn test_empty_request_is_rejected() {
        let args = ImportArgs {
            config: None,
            encoded_values: None,
            input: PathBuf::from("-"),
            output: None,
            threads: None,
        };
        assert!(load_config(&args).is_err());
    }
}
