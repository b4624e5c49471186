//! Convert an incident spreadsheet into the `incidents` part of a dispatch request.
//!
//! Usage: `import_incidents <incidents.csv|xlsx> [output.json] [--types mapping.yaml] [--categories N]`
//! Columns: id, incident_type, latitude, longitude. Incident types are mapped to
//! a priority and required capabilities by the built-in table unless `--types`
//! names a replacement.

use std::env;
use std::process;

use tiered_dispatch::config::DEFAULT_CATEGORIES;
use tiered_dispatch::data::import::{
    default_incident_types, import_incidents, load_incident_types, write_json,
};
use tiered_dispatch::logging::init_logging;

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("import_incidents: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut categories = DEFAULT_CATEGORIES;
    let mut types_path = None;
    let mut positional = Vec::new();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--categories" => {
                let raw = args.next().ok_or("--categories needs a number")?;
                categories = raw
                    .parse()
                    .map_err(|_| format!("invalid category count '{raw}'"))?;
            }
            "--types" => types_path = Some(args.next().ok_or("--types needs a path")?),
            _ => positional.push(arg),
        }
    }
    let input = positional.first().ok_or(
        "usage: import_incidents <incidents.csv|xlsx> [output.json] [--types mapping.yaml] [--categories N]",
    )?;

    let types = match types_path {
        Some(path) => load_incident_types(path)?,
        None => default_incident_types(),
    };
    let import = import_incidents(input, &types, categories)?;
    for skipped in &import.skipped {
        tracing::warn!(row = skipped.row, reason = %skipped.reason, "skipped incident row");
    }

    match positional.get(1) {
        Some(output) => {
            write_json(output, &import)?;
            eprintln!(
                "Wrote {} incidents to {} ({} skipped)",
                import.incidents.len(),
                output,
                import.skipped.len()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&import)?),
    }
    Ok(())
}
