use std::fs;
use std::path::Path;

use crate::config::DispatchConfig;
use crate::model::{DispatchRequest, IncidentRecord, UnitRecord};
use crate::optimizer::{run_optimisation, OverallResult};
use crate::parallel::{solve_batch, WorkerPool};
use crate::server;
use crate::validation::validate_request;

/// Categories 0, 1 and 2 appear in [demo_request].
pub const DEMO_MIN_CATEGORIES: usize = 3;

const USAGE: &str =
    "usage: tiered-dispatch [--config <path>] <serve|solve|validate|batch|demo> [args]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Solve,
    Validate,
    Batch,
    Demo,
}

/// Arguments left after pulling out `--config <path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedArgs {
    pub config_path: Option<String>,
    pub rest: Vec<String>,
}

pub fn split_global_args(args: &[String]) -> Result<ParsedArgs, String> {
    let mut config_path = None;
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            let Some(path) = iter.next() else {
                return Err("--config needs a path".to_string());
            };
            config_path = Some(path.clone());
        } else if let Some(path) = arg.strip_prefix("--config=") {
            config_path = Some(path.to_string());
        } else {
            rest.push(arg.clone());
        }
    }
    Ok(ParsedArgs { config_path, rest })
}

pub fn parse_command(rest: &[String]) -> Option<Command> {
    match rest.first().map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("solve") => Some(Command::Solve),
        Some("validate") => Some(Command::Validate),
        Some("batch") => Some(Command::Batch),
        Some("demo") => Some(Command::Demo),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let parsed = match split_global_args(args) {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("{err}\n{USAGE}");
            return 2;
        }
    };
    let Some(command) = parse_command(&parsed.rest) else {
        eprintln!("{USAGE}");
        return 2;
    };
    let config = match DispatchConfig::resolve(parsed.config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };
    let rest = &parsed.rest[1..];

    match command {
        Command::Serve => handle_serve(config),
        Command::Solve => handle_solve(rest, &config),
        Command::Validate => handle_validate(rest, &config),
        Command::Batch => handle_batch(rest, &config),
        Command::Demo => handle_demo(rest, &config),
    }
}

fn handle_serve(config: DispatchConfig) -> i32 {
    match server::run_server(config) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_solve(rest: &[String], config: &DispatchConfig) -> i32 {
    let Some(path) = rest.iter().find(|arg| !arg.starts_with("--")) else {
        eprintln!("usage: tiered-dispatch solve <request.json> [--table]");
        return 2;
    };
    let as_table = rest.iter().any(|arg| arg == "--table");
    let request = match read_request(path) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };
    solve_and_print(&request, config, as_table)
}

fn handle_demo(rest: &[String], config: &DispatchConfig) -> i32 {
    if config.categories < DEMO_MIN_CATEGORIES {
        eprintln!(
            "demo needs at least {DEMO_MIN_CATEGORIES} capability categories, config has {}",
            config.categories
        );
        return 2;
    }
    let as_table = rest.iter().any(|arg| arg == "--table");
    solve_and_print(&demo_request(config.categories), config, as_table)
}

fn solve_and_print(request: &DispatchRequest, config: &DispatchConfig, as_table: bool) -> i32 {
    let result = match run_optimisation(request, config) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("solve failed [{}]: {err}", err.code());
            return 1;
        }
    };

    if as_table {
        print!("{}", render_table(&result));
        return 0;
    }
    match serde_json::to_string_pretty(&result) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize dispatch result: {err}");
            1
        }
    }
}

fn handle_validate(rest: &[String], config: &DispatchConfig) -> i32 {
    let Some(path) = rest.first() else {
        eprintln!("usage: tiered-dispatch validate <request.json>");
        return 2;
    };
    let request = match read_request(path) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };

    match validate_request(&request, config) {
        Ok(problem) => {
            println!(
                "validation passed: {path} (units={}, incidents={})",
                problem.units.len(),
                problem.incidents.len()
            );
            0
        }
        Err(err) => {
            eprintln!("validation failed: {} issue(s)", err.issues.len());
            for issue in err.issues {
                eprintln!("- {}: {}", issue.field, issue.message);
            }
            1
        }
    }
}

fn handle_batch(rest: &[String], config: &DispatchConfig) -> i32 {
    let mut workers = 0;
    let mut paths = Vec::new();
    let mut iter = rest.iter();
    while let Some(arg) = iter.next() {
        if arg == "--workers" {
            workers = parse_usize_arg(iter.next(), "workers", 0);
        } else {
            paths.push(arg.clone());
        }
    }
    if paths.is_empty() {
        eprintln!("usage: tiered-dispatch batch <request.json>... [--workers N]");
        return 2;
    }

    let mut requests = Vec::with_capacity(paths.len());
    for path in paths {
        match read_request(&path) {
            Ok(request) => requests.push((path, request)),
            Err(err) => {
                eprintln!("{err}");
                return 1;
            }
        }
    }

    let items = solve_batch(&requests, config, &WorkerPool::with_workers(workers));
    let failed = items.iter().filter(|item| item.error.is_some()).count();
    match serde_json::to_string_pretty(&items) {
        Ok(payload) => println!("{payload}"),
        Err(err) => {
            eprintln!("failed to serialize batch result: {err}");
            return 1;
        }
    }
    if failed > 0 {
        eprintln!("batch finished with {failed} failed request(s)");
        1
    } else {
        0
    }
}

pub fn read_request(path: impl AsRef<Path>) -> Result<DispatchRequest, String> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    serde_json::from_str(&raw).map_err(|err| format!("failed to parse {}: {err}", path.display()))
}

/// Tab-separated assignments followed by the aggregate values.
pub fn render_table(result: &OverallResult) -> String {
    let mut out = String::from("unit_id\tincident_id\ttier\tcost\n");
    for assignment in &result.assignments {
        out.push_str(&format!(
            "{}\t{}\t{}\t{:.3}\n",
            assignment.unit_id, assignment.incident_id, assignment.tier, assignment.cost
        ));
    }
    out.push_str(&format!("value\t{:.3}\n", result.value));
    out.push_str(&format!("shortfall\t{}\n", result.shortfall));
    out
}

/// Three units and three incidents with a fixed cost matrix. Solving it
/// assigns units 0 and 2 to incident 0, leaves incident 1 unserved and sends
/// unit 1 to incident 2, for a realized cost of 185. Needs `categories >=`
/// [DEMO_MIN_CATEGORIES]; with fewer, the category 2 requirement is dropped and
/// unit 2 fails validation.
pub fn demo_request(categories: usize) -> DispatchRequest {
    let requirements = |wanted: &[usize]| {
        let mut counts = vec![0_i64; categories];
        for &category in wanted {
            if let Some(slot) = counts.get_mut(category) {
                *slot += 1;
            }
        }
        counts
    };
    let unit = |id: u64, capability: i64| UnitRecord {
        id,
        lat: 0.0,
        lon: id as f64,
        capability,
    };
    let incident = |id: u64, priority: &str, wanted: &[usize]| IncidentRecord {
        id,
        lat: 1.0,
        lon: id as f64,
        priority: priority.to_string(),
        requirements: requirements(wanted),
    };

    DispatchRequest {
        units: vec![unit(0, 0), unit(1, 1), unit(2, 2)],
        incidents: vec![
            incident(0, "Immediate", &[0, 2]),
            incident(1, "Urgent", &[2]),
            incident(2, "Routine", &[1]),
        ],
        costs: Some(vec![
            vec![100.0, 20.0, 30.0],
            vec![26.0, 25.0, 35.0],
            vec![50.0, 30.0, 40.0],
        ]),
    }
}

fn parse_usize_arg(raw: Option<&String>, name: &str, default: usize) -> usize {
    raw.and_then(|value| value.parse::<usize>().ok())
        .unwrap_or_else(|| {
            if let Some(value) = raw {
                eprintln!("invalid {name} '{value}', defaulting to {default}");
            }
            default
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn config_flag_is_pulled_out_anywhere() {
        let parsed =
            split_global_args(&args(&["bin", "solve", "--config", "c.yaml", "r.json"])).unwrap();
        assert_eq!(parsed.config_path.as_deref(), Some("c.yaml"));
        assert_eq!(parsed.rest, args(&["solve", "r.json"]));
        assert_eq!(parse_command(&parsed.rest), Some(Command::Solve));

        let parsed = split_global_args(&args(&["bin", "--config=x.yaml", "demo"])).unwrap();
        assert_eq!(parsed.config_path.as_deref(), Some("x.yaml"));
        assert_eq!(parse_command(&parsed.rest), Some(Command::Demo));
    }

    #[test]
    fn dangling_config_flag_is_a_usage_error() {
        assert!(split_global_args(&args(&["bin", "demo", "--config"])).is_err());
        assert_eq!(run_with_args(&args(&["bin", "demo", "--config"])), 2);
        assert_eq!(run_with_args(&args(&["bin", "launch"])), 2);
    }

    #[test]
    fn demo_request_pads_requirements_to_category_count() {
        let request = demo_request(5);
        assert_eq!(request.incidents[0].requirements, vec![1, 0, 1, 0, 0]);
        assert_eq!(request.incidents[2].requirements, vec![0, 1, 0, 0, 0]);
    }
}
