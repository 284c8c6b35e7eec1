//! Tests for the bounded-retry extraction loop against a scripted backend.

use fleetlog_core::{AircraftUtilization, Error, InvoiceResponse, UserPart};
use fleetlog_extract::{
    extract_invoice_from_image, extract_structured, ExtractOptions, AIRCRAFT_SYSTEM_PROMPT,
};
use fleetlog_inference::MockChatBackend;

fn aircraft_json() -> &'static str {
    r#"{
        "airline": "TOC AIRLINES",
        "month": "Aug 2025",
        "msn": "9999",
        "registration": "A-7575",
        "aircraft_type": "737-800",
        "days_flown": null,
        "components": {
            "Airframe": {
                "TSN": "16,300",
                "CSN": 8200,
                "MonthlyUtil_Hrs": 197.25,
                "MonthlyUtil_Cyc": 230,
                "SerialNumber": "9999",
                "location": "A-7575"
            }
        }
    }"#
}

#[tokio::test]
async fn test_first_attempt_success_makes_one_call() {
    let backend = MockChatBackend::new().with_scripted_response(aircraft_json());

    let record: AircraftUtilization = extract_structured(
        &backend,
        AIRCRAFT_SYSTEM_PROMPT,
        &[UserPart::Text("extract".to_string())],
        ExtractOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(record.registration.as_deref(), Some("A-7575"));
    // The separator string coerced through the lenient deserializer.
    assert_eq!(record.components.airframe.tsn, Some(16300.0));
    // Slots absent from the output default to empty shells.
    assert!(record.components.engine1.is_empty());
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn test_schema_violation_then_recovery() {
    let backend = MockChatBackend::new()
        .with_scripted_response("The report shows MSN 9999.")
        .with_scripted_response(aircraft_json());

    let record: AircraftUtilization = extract_structured(
        &backend,
        AIRCRAFT_SYSTEM_PROMPT,
        &[UserPart::Text("extract".to_string())],
        ExtractOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(record.msn.as_deref(), Some("9999"));
    assert_eq!(backend.call_count(), 2);
}

#[tokio::test]
async fn test_remote_error_draws_from_same_budget() {
    let backend = MockChatBackend::new()
        .with_scripted_failure("connection reset")
        .with_scripted_response("still not json")
        .with_scripted_response(aircraft_json());

    let record: AircraftUtilization = extract_structured(
        &backend,
        AIRCRAFT_SYSTEM_PROMPT,
        &[UserPart::Text("extract".to_string())],
        ExtractOptions {
            max_retries: 3,
            temperature: 0.0,
        },
    )
    .await
    .unwrap();

    assert_eq!(record.airline.as_deref(), Some("TOC AIRLINES"));
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn test_exactly_max_retries_attempts_then_failure() {
    // Default response is "{}", which parses but a plain "not json" never
    // does; script permanently invalid output.
    let backend = MockChatBackend::new().with_default_response("not json at all");

    let result: Result<AircraftUtilization, _> = extract_structured(
        &backend,
        AIRCRAFT_SYSTEM_PROMPT,
        &[UserPart::Text("extract".to_string())],
        ExtractOptions {
            max_retries: 3,
            temperature: 0.0,
        },
    )
    .await;

    match result.unwrap_err() {
        Error::ExtractionFailed {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 3);
            assert!(last_error.contains("invalid model output"), "got: {}", last_error);
        }
        other => panic!("Expected ExtractionFailed, got: {:?}", other),
    }
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn test_fenced_output_is_accepted() {
    let fenced = format!("```json\n{}\n```", aircraft_json());
    let backend = MockChatBackend::new().with_scripted_response(fenced);

    let record: AircraftUtilization = extract_structured(
        &backend,
        AIRCRAFT_SYSTEM_PROMPT,
        &[UserPart::Text("extract".to_string())],
        ExtractOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(record.aircraft_type.as_deref(), Some("737-800"));
}

#[tokio::test]
async fn test_invoice_pipeline_sends_image_part() {
    let backend = MockChatBackend::new().with_scripted_response(
        r#"{
            "vendor": {"name": "Acme Parts"},
            "client": {"name": "Arctic Wings"},
            "invoice_number": "INV-100",
            "invoice_date": "2026-07-31",
            "totals": {"net_worth": "1,000", "vat": 100, "grand_total": 1100},
            "line_items": []
        }"#,
    );

    let invoice: InvoiceResponse = extract_invoice_from_image(
        &backend,
        b"\xff\xd8\xff\xe0fakejpeg",
        "image/jpeg",
        ExtractOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(invoice.invoice_number.as_deref(), Some("INV-100"));
    assert_eq!(invoice.totals.net_worth, Some(1000.0));

    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].image_count, 1);
    assert!(calls[0].text_parts[0].contains("invoice"));
    assert_eq!(calls[0].temperature, 0.0);
}

#[tokio::test]
async fn test_empty_image_rejected_before_model_call() {
    let backend = MockChatBackend::new();
    let result =
        extract_invoice_from_image(&backend, b"", "image/png", ExtractOptions::default()).await;

    assert!(matches!(result.unwrap_err(), Error::InvalidInput(_)));
    assert_eq!(backend.call_count(), 0);
}
