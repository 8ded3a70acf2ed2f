//! Parses a Knot file and prints its debug dump, or JSON/YAML with `--json`/`--yaml`.
//!
//! ```text
//! RUST_LOG=debug cargo run --example dump -- tests/ok/anchors.knot --json
//! ```

use knot_core::{KnotError, ParseOptions, Parser};
use log::info;
use miette::Report;
use std::fs::File;
use std::process;

fn main() {
    miette::set_panic_hook();
    env_logger::Builder::from_env(env_logger::Env::default()).init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: dump <file.knot> [--json | --yaml]");
        process::exit(2);
    };
    let format = args.next();

    match render(&path, format.as_deref()) {
        Ok(output) => print!("{output}"),
        Err(err) => {
            eprintln!("{err:?}");
            process::exit(1);
        }
    }
}

fn render(path: &str, format: Option<&str>) -> Result<String, Report> {
    info!(path = path; "Loading document");
    let file = File::open(path).map_err(KnotError::from)?;
    let parser = Parser::from_reader(file, ParseOptions::new().with_source_name(path))?;
    let document = parser.get_document()?;

    let output = match format {
        Some("--json") => {
            let mut json = document.to_json().map_err(export_failed)?;
            json.push('\n');
            json
        }
        Some("--yaml") => document.to_yaml().map_err(export_failed)?,
        _ => document.to_string(),
    };
    Ok(output)
}

fn export_failed(err: impl std::fmt::Display) -> Report {
    miette::miette!("export failed: {err}")
}
