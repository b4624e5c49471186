use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tiered_dispatch::config::DispatchConfig;
use tiered_dispatch::data::import::{default_incident_types, import_incidents, import_units};
use tiered_dispatch::model::DispatchRequest;
use tiered_dispatch::optimizer::run_optimisation;

fn unique_temp_path(name: &str, ext: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("tiered-dispatch-{name}-{stamp}.{ext}"))
}

#[test]
fn imported_sheets_form_a_solvable_request() {
    let vehicles = unique_temp_path("vehicles", "csv");
    fs::write(
        &vehicles,
        "ID, Latitude, Longitude, Capability\n1,-31.95,115.86,A\n2,-31.96,115.85,B\n3,-31.90,115.80,C\n4,bad,115.80,C\n",
    )
    .expect("vehicle sheet should be written");
    let incidents = unique_temp_path("incidents", "csv");
    fs::write(
        &incidents,
        "acc_id,incident_type,latitude,longitude\n100,Incident E,-31.95,115.86\n101,Incident C,-31.94,115.87\n102,Incident Q,-31.94,115.87\n",
    )
    .expect("incident sheet should be written");

    let units = import_units(&vehicles, 5).expect("vehicles should import");
    assert_eq!(units.units.len(), 3);
    assert_eq!(units.skipped.len(), 1);
    assert_eq!(units.skipped[0].row, 4);

    let imported = import_incidents(&incidents, &default_incident_types(), 5)
        .expect("incidents should import");
    assert_eq!(imported.incidents.len(), 2);
    assert_eq!(imported.incidents[0].requirements, vec![0, 1, 1, 0, 0]);
    assert_eq!(imported.skipped.len(), 1);

    let request = DispatchRequest {
        units: units.units,
        incidents: imported.incidents,
        costs: None,
    };
    let result = run_optimisation(&request, &DispatchConfig::default())
        .expect("imported request should solve");
    // Incident E (Immediate) takes units 2 and 3; Incident C (Routine) gets unit 1
    // and is one category-1 unit short.
    assert_eq!(result.pairs(), vec![(2, 100), (3, 100), (1, 101)]);
    assert_eq!(result.shortfall, 1);

    let _ = fs::remove_file(vehicles);
    let _ = fs::remove_file(incidents);
}

#[test]
fn unsupported_extension_is_rejected() {
    let err = import_units("fleet.parquet", 5).unwrap_err();
    assert!(err.to_string().contains("unsupported input format"));
}
