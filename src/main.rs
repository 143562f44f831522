//! Loads a field list and a model from JSON, builds a form against the
//! built-in digest and prints what the engine made of it.
//!
//! ```text
//! formwire <fields.json> <model.json> [KEY=JSON ...]
//! ```
//!
//! Each trailing `key=json` assignment is applied to the model followed by a
//! digest, so watchers and the model dispatcher can be observed with
//! `RUST_LOG=formwire=trace`.


use std::error::Error as StdError;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use formwire::Digest;
use formwire::EngineConfig;
use formwire::FormBuilder;
use formwire::SharedModel;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

type BoxResult<T> = std::result::Result<T, Box<dyn StdError>>;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON array of field declarations
    fields: PathBuf,

    /// JSON model the form is bound to
    model: PathBuf,

    /// Model updates applied one by one after the initial digest
    #[arg(value_name = "KEY=JSON", value_parser = parse_assignment)]
    assignments: Vec<Assignment>,
}

/// One top-level model update, `key=json`
#[derive(Debug, Clone, PartialEq)]
struct Assignment {
    key: String,
    value: Value,
}

/// Values that are not valid JSON are taken as plain strings, so
/// `email=a@b.c` works without quoting.
fn parse_assignment(raw: &str) -> Result<Assignment, String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("`{raw}` is not of the form KEY=JSON"));
    };
    if key.is_empty() {
        return Err(format!("`{raw}` has an empty key"));
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok(Assignment {
        key: key.to_string(),
        value,
    })
}

fn main() -> BoxResult<()> {
    let cli = Cli::parse();
    init_observability();

    let settings = EngineConfig::new()?.validate()?;

    let fields = read_json(&cli.fields)?;
    let model = SharedModel::new(read_json(&cli.model)?);
    let digest = Digest::with_config(model.clone(), &settings.digest);

    let mut form = FormBuilder::new(Arc::new(digest.clone()))
        .with_config(&settings)
        .fields_json(fields)?
        .model(model)
        .build()?;

    for field in form.fields() {
        let key = field.key.clone();
        field.attach_expression_runner(Arc::new(move |_model: &Value| {
            info!(key = ?key, "Field expressions evaluated");
        }));
    }

    let passes = digest.run()?;
    println!("form {} ({} passes)", form.id(), passes);
    for field in form.fields() {
        let key = field.key.as_ref().map(ToString::to_string).unwrap_or_default();
        let field_type = field.field_type.as_deref().unwrap_or("-");
        println!("  {key}: type={field_type} watchers={}", field.watcher.len());
    }
    println!("watchers: {}", form.watcher_count());

    for Assignment { key, value } in cli.assignments {
        println!("{key} = {value}");
        digest.apply(|root| {
            if let Value::Object(map) = root {
                map.insert(key, value);
            }
        })?;
    }

    println!("model: {}", form.model().snapshot());
    let stopped = form.teardown();
    println!("stopped {stopped} subscriptions, {} left", digest.watcher_count());

    Ok(())
}

fn read_json(path: &Path) -> BoxResult<Value> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn init_observability() {
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_default_env());
    tracing_subscriber::registry().with(base_subscriber).init();
}
