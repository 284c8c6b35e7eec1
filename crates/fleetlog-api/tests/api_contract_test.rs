//! Contract tests for the HTTP API payloads.
//!
//! The dashboard frontend posts camelCase JSON; these tests pin the wire
//! shapes the handlers rely on so a schema drift shows up here before it
//! shows up in production.

use fleetlog_core::{validate, AircraftUtilization, SaveOperationsRequest};
use serde_json::json;

#[test]
fn test_save_operations_request_accepts_dashboard_payload() {
    let body = json!({
        "lessees": [
            {
                "lesseeName": "Northline Leasing",
                "assets": [
                    {
                        "name": "MSN 4521",
                        "serialNumber": "4521",
                        "registrationNumber": "C-GAWX",
                        "validation_status": "Validated",
                        "report_status": "Received",
                        "obligation_status": "Current",
                        "components": [
                            {
                                "type": "Airframe",
                                "serialNumber": "4521",
                                "lastUtilizationDate": "2026-07-31",
                                "flightHours": "310.5",
                                "flightCycles": "142",
                                "apuHours": "",
                                "apuCycles": "",
                                "tsnAtPeriod": "40939.5",
                                "csnAtPeriod": "19733",
                                "tsnAtPeriodEnd": "41250",
                                "csnAtPeriodEnd": "19875",
                                "lastTsnCsnUpdate": "2026-07-31",
                                "lastTsnUtilization": "310.5",
                                "lastCsnUtilization": "142",
                                "attachmentStatus": "Attached",
                                "engineThrust": "",
                                "status": "Active",
                                "utilReportStatus": "Received",
                                "asset_status": "On Lease",
                                "derate": ""
                            }
                        ]
                    }
                ]
            }
        ],
        "month": "2026-07",
        "fileName": "dashboard_export.xlsx"
    });

    let request: SaveOperationsRequest = serde_json::from_value(body).unwrap();
    assert_eq!(request.month, "2026-07");
    assert_eq!(request.file_name, "dashboard_export.xlsx");
    assert_eq!(request.lessees.len(), 1);
    assert_eq!(request.lessees[0].lessee_name, "Northline Leasing");

    let asset = &request.lessees[0].assets[0];
    assert_eq!(asset.registration_number, "C-GAWX");
    assert_eq!(asset.validation_status, "Validated");

    let component = &asset.components[0];
    assert_eq!(component.component_type, "Airframe");
    assert_eq!(component.serial_number, "4521");
    assert_eq!(component.tsn_at_period_end, "41250");
    assert_eq!(component.asset_status, "On Lease");
}

#[test]
fn test_save_operations_request_rejects_incomplete_component() {
    // Every component metric is required on the wire; a truncated payload
    // must be rejected rather than silently defaulted.
    let body = json!({
        "lessees": [
            {
                "lesseeName": "Northline Leasing",
                "assets": [
                    {
                        "name": "MSN 4521",
                        "serialNumber": "4521",
                        "registrationNumber": "C-GAWX",
                        "validation_status": "Validated",
                        "report_status": "Received",
                        "obligation_status": "Current",
                        "components": [
                            {
                                "type": "Airframe",
                                "serialNumber": "4521",
                                "flightHours": "310.5"
                            }
                        ]
                    }
                ]
            }
        ],
        "month": "2026-07",
        "fileName": "dashboard_export.xlsx"
    });

    assert!(serde_json::from_value::<SaveOperationsRequest>(body).is_err());
}

#[test]
fn test_save_operations_request_rejects_missing_month() {
    let body = json!({
        "lessees": [],
        "fileName": "dashboard_export.xlsx"
    });
    assert!(serde_json::from_value::<SaveOperationsRequest>(body).is_err());
}

#[test]
fn test_extract_response_embeds_validation_metadata() {
    // The /extract handler serializes the record and its advisory report
    // side by side; a record with warnings still serializes as success.
    let record = AircraftUtilization::default();
    let report = validate::validate_aircraft_utilization(&record);
    assert!(!report.is_valid);

    let response = json!({
        "success": true,
        "extracted_data": record,
        "validation": {
            "is_valid": report.is_valid,
            "warnings": report.warnings,
        },
    });

    assert_eq!(response["success"], true);
    assert_eq!(response["validation"]["is_valid"], false);
    assert!(!response["validation"]["warnings"]
        .as_array()
        .unwrap()
        .is_empty());
}

#[test]
fn test_month_conflict_message_names_the_month() {
    // Frontend matches on this message to offer the delete-first flow.
    let month = "2026-07";
    let message = format!(
        "Data for month {} already exists. Please delete existing data first or use a different month.",
        month
    );
    assert!(message.contains("2026-07"));
    assert!(message.contains("delete existing data first"));
}
