//! Prints the schema and decoded message of an HDM file.
//!
//! ```text
//! RUST_LOG=hdm=debug cargo run --example dump -- capture.hdm [--no-collapse]
//! ```

use anyhow::{Context, bail};
use hdm::prelude::*;

fn print_value(name: &str, value: &Value, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        Value::Object(obj) => {
            println!("{pad}{name}: {}", obj.type_name());
            for (field, v) in obj.iter() {
                print_value(field, v, indent + 1);
            }
        }
        Value::List(items) if items.iter().any(|v| v.as_object().is_some()) => {
            println!("{pad}{name}: [{} items]", items.len());
            for (i, item) in items.iter().enumerate() {
                print_value(&format!("[{i}]"), item, indent + 1);
            }
        }
        other => println!("{pad}{name} = {other}"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: dump <file.hdm> [--no-collapse]");
    };
    let collapse = !args.any(|a| a == "--no-collapse");

    let mut parser = ParserBuilder::new()
        .collapse_singletons(collapse)
        .open(&path)
        .with_context(|| format!("opening {path}"))?;

    let schema = parser.schema();
    println!("schema: {} types, root {}", schema.len(), schema.message_type);
    for ty in &schema.types {
        match ty.scalar_format() {
            Some(format) => println!("  {:<16} {} ({})", ty.name(), ty.tag(), format.name()),
            None => println!("  {:<16} {}", ty.name(), ty.tag()),
        }
    }

    let message = parser
        .parse_message()
        .with_context(|| format!("decoding {path}"))?;
    print_value("message", &Value::from(message), 0);
    println!(
        "consumed {} of {} payload bytes",
        parser.position(),
        parser.payload_len()
    );
    Ok(())
}
