//! Convert a vehicle spreadsheet into the `units` part of a dispatch request.
//!
//! Usage: `import_units <vehicles.csv|xlsx> [output.json] [--categories N]`
//! Columns: id, latitude, longitude, capability (A..E or 1-based number).
//! Without an output path the JSON goes to stdout.

use std::env;
use std::process;

use tiered_dispatch::config::DEFAULT_CATEGORIES;
use tiered_dispatch::data::import::{import_units, write_json};
use tiered_dispatch::logging::init_logging;

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("import_units: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut categories = DEFAULT_CATEGORIES;
    let mut positional = Vec::new();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--categories" {
            let raw = args.next().ok_or("--categories needs a number")?;
            categories = raw
                .parse()
                .map_err(|_| format!("invalid category count '{raw}'"))?;
        } else {
            positional.push(arg);
        }
    }
    let input = positional
        .first()
        .ok_or("usage: import_units <vehicles.csv|xlsx> [output.json] [--categories N]")?;

    let import = import_units(input, categories)?;
    for skipped in &import.skipped {
        tracing::warn!(row = skipped.row, reason = %skipped.reason, "skipped vehicle row");
    }

    match positional.get(1) {
        Some(output) => {
            write_json(output, &import)?;
            eprintln!(
                "Wrote {} units to {} ({} skipped)",
                import.units.len(),
                output,
                import.skipped.len()
            );
        }
        None => println!("{}", serde_json::to_string_pretty(&import)?),
    }
    Ok(())
}
