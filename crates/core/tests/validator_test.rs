mod common;

use common::Builder;
use custos_core::Validator;

#[test]
fn report_names_every_default_profile() {
    let report = Validator::new().validate_slice(&common::minimal());
    let names: Vec<&str> = report.profiles.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Implementation limits",
            "Tagged document",
            "Archival",
            "Archival, level A",
        ]
    );
}

#[test]
fn tagged_fixture_passes_the_tagged_profile() {
    let report = Validator::new().validate_slice(&common::tagged());
    assert!(report.status.is_well_formed());
    assert!(report.status.is_valid());
    let tagged = report
        .profiles
        .iter()
        .find(|p| p.name == "Tagged document")
        .unwrap();
    assert!(tagged.satisfied);
}

#[test]
fn truncated_document_is_malformed() {
    let mut data = common::minimal();
    data.truncate(data.len() / 2);
    let report = Validator::new().validate_slice(&data);
    assert!(!report.status.is_well_formed());
    assert!(!report.status.is_valid());
    assert!(report.error.is_some());
}

#[test]
fn compressed_document_validates_end_to_end() {
    let data = Builder::new()
        .object(1, "<< /Type /Catalog /Pages 2 0 R >>")
        .object_stream(3, &[(2, "<< /Type /Pages /Kids [] /Count 0 >>")])
        .finish_xref_stream();
    let report = Validator::new().validate_slice(&data);
    assert!(report.status.is_well_formed());
    assert!(report.status.is_valid());
}

#[test]
fn json_report_round_trips_the_flags() {
    let report = Validator::new().validate_slice(&common::tagged());
    let json: serde_json::Value =
        serde_json::from_str(&serde_json::to_string(&report).unwrap()).unwrap();
    assert_eq!(json["status"]["well_formed"], true);
    assert_eq!(json["status"]["valid"], true);
    assert!(json["profiles"].as_array().unwrap().len() == 4);
    assert!(json["error"].is_null());
}
