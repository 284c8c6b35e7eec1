//! Post-hoc completeness checks on extracted records.
//!
//! Validation is advisory for aircraft reports: warnings are attached to the
//! extraction result as metadata and never block persistence. Invoice
//! validation is stricter and short-circuits on the first failing rule.

use tracing::warn;

use crate::models::{AircraftUtilization, InvoiceResponse};

/// Verdict plus ordered human-readable warnings. Pure function of the
/// record; never persisted, always recomputed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn from_warnings(warnings: Vec<String>) -> Self {
        Self {
            is_valid: warnings.is_empty(),
            warnings,
        }
    }
}

/// Check essential aircraft utilization data for completeness.
///
/// `is_valid` is true iff no warnings were produced. Missing natural-key
/// fields and missing serial numbers on the engine/APU positions each
/// produce one warning; a report with no airframe or engine utilization
/// metrics at all produces a single aggregate warning.
pub fn validate_aircraft_utilization(data: &AircraftUtilization) -> ValidationReport {
    let mut warnings = Vec::new();

    if data.msn.as_deref().unwrap_or("").is_empty() {
        warnings.push("Missing MSN (Manufacturer Serial Number)".to_string());
    }
    if data.registration.as_deref().unwrap_or("").is_empty() {
        warnings.push("Missing aircraft registration".to_string());
    }
    if data.month.as_deref().unwrap_or("").is_empty() {
        warnings.push("Missing month".to_string());
    }

    let components = &data.components;

    if components.engine1.serial_number.as_deref().unwrap_or("").is_empty() {
        warnings.push("Missing Engine 1 Serial Number".to_string());
    }
    if components.engine2.serial_number.as_deref().unwrap_or("").is_empty() {
        warnings.push("Missing Engine 2 Serial Number".to_string());
    }
    if components.apu.serial_number.as_deref().unwrap_or("").is_empty() {
        warnings.push("Missing APU Serial Number".to_string());
    }

    let has_airframe_data =
        components.airframe.tsn.is_some() || components.airframe.csn.is_some();
    let has_engine_data = components.engine1.tsn.is_some() || components.engine2.tsn.is_some();

    if !has_airframe_data && !has_engine_data {
        warnings.push("No utilization data found for aircraft or engines".to_string());
    }

    ValidationReport::from_warnings(warnings)
}

/// Strict invoice validation: vendor name, client name, invoice number,
/// strictly positive grand total, and at least one line item. Evaluation
/// stops at the first failing rule.
pub fn validate_invoice(data: &InvoiceResponse) -> bool {
    if data.vendor.name.as_deref().unwrap_or("").is_empty() {
        warn!(
            subsystem = "extract",
            component = "validator",
            "Invoice validation failed: missing vendor name"
        );
        return false;
    }
    if data.client.name.as_deref().unwrap_or("").is_empty() {
        warn!(
            subsystem = "extract",
            component = "validator",
            "Invoice validation failed: missing client name"
        );
        return false;
    }
    if data.invoice_number.as_deref().unwrap_or("").is_empty() {
        warn!(
            subsystem = "extract",
            component = "validator",
            "Invoice validation failed: missing invoice number"
        );
        return false;
    }
    match data.totals.grand_total {
        Some(total) if total > 0.0 => {}
        _ => {
            warn!(
                subsystem = "extract",
                component = "validator",
                "Invoice validation failed: missing or non-positive grand total"
            );
            return false;
        }
    }
    if data.line_items.is_empty() {
        warn!(
            subsystem = "extract",
            component = "validator",
            "Invoice validation failed: no line items"
        );
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoiceTotals, LineItem};

    fn complete_aircraft() -> AircraftUtilization {
        let mut record = AircraftUtilization {
            airline: Some("TOC AIRLINES".to_string()),
            month: Some("Aug 2025".to_string()),
            msn: Some("9999".to_string()),
            registration: Some("A-7575".to_string()),
            aircraft_type: Some("737-800".to_string()),
            days_flown: Some(28),
            ..Default::default()
        };
        record.components.airframe.tsn = Some(16300.0);
        record.components.airframe.csn = Some(9100);
        record.components.engine1.tsn = Some(16300.0);
        record.components.engine1.serial_number = Some("ESN-1".to_string());
        record.components.engine2.serial_number = Some("ESN-2".to_string());
        record.components.apu.serial_number = Some("APU-SN".to_string());
        record
    }

    fn complete_invoice() -> InvoiceResponse {
        InvoiceResponse {
            vendor: crate::models::Vendor {
                name: Some("ACME GmbH".to_string()),
                ..Default::default()
            },
            client: crate::models::InvoiceClient {
                name: Some("Globex Ltd".to_string()),
                ..Default::default()
            },
            invoice_number: Some("INV-42".to_string()),
            invoice_date: Some("2025-08-01".to_string()),
            totals: InvoiceTotals {
                net_worth: Some(100.0),
                vat: Some(10.0),
                grand_total: Some(110.0),
            },
            line_items: vec![LineItem {
                description: Some("Widget".to_string()),
                quantity: Some(1),
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_complete_record_is_valid() {
        let report = validate_aircraft_utilization(&complete_aircraft());
        assert!(report.is_valid);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_natural_key_fields_each_warn() {
        let mut record = complete_aircraft();
        record.msn = None;
        record.registration = None;
        record.month = None;

        let report = validate_aircraft_utilization(&record);
        assert!(!report.is_valid);
        assert!(report
            .warnings
            .contains(&"Missing MSN (Manufacturer Serial Number)".to_string()));
        assert!(report
            .warnings
            .contains(&"Missing aircraft registration".to_string()));
        assert!(report.warnings.contains(&"Missing month".to_string()));
    }

    #[test]
    fn test_missing_engine1_serial_number() {
        let mut record = complete_aircraft();
        record.components.engine1.serial_number = None;

        let report = validate_aircraft_utilization(&record);
        assert!(!report.is_valid);
        assert!(report
            .warnings
            .contains(&"Missing Engine 1 Serial Number".to_string()));
    }

    #[test]
    fn test_empty_string_serial_number_warns() {
        // An extracted "" is as missing as a null.
        let mut record = complete_aircraft();
        record.components.engine2.serial_number = Some(String::new());
        record.components.apu.serial_number = Some(String::new());

        let report = validate_aircraft_utilization(&record);
        assert!(!report.is_valid);
        assert!(report
            .warnings
            .contains(&"Missing Engine 2 Serial Number".to_string()));
        assert!(report
            .warnings
            .contains(&"Missing APU Serial Number".to_string()));
    }

    #[test]
    fn test_no_utilization_data_aggregate_warning() {
        let mut record = complete_aircraft();
        record.components.airframe.tsn = None;
        record.components.airframe.csn = None;
        record.components.engine1.tsn = None;
        record.components.engine2.tsn = None;

        let report = validate_aircraft_utilization(&record);
        let count = report
            .warnings
            .iter()
            .filter(|w| w.as_str() == "No utilization data found for aircraft or engines")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_validator_is_pure() {
        let record = complete_aircraft();
        let first = validate_aircraft_utilization(&record);
        let second = validate_aircraft_utilization(&record);
        assert_eq!(first, second);
    }

    #[test]
    fn test_valid_invoice_passes() {
        assert!(validate_invoice(&complete_invoice()));
    }

    #[test]
    fn test_invoice_zero_grand_total_fails() {
        let mut invoice = complete_invoice();
        invoice.totals.grand_total = Some(0.0);
        assert!(!validate_invoice(&invoice));
    }

    #[test]
    fn test_invoice_missing_vendor_name_fails() {
        let mut invoice = complete_invoice();
        invoice.vendor.name = None;
        assert!(!validate_invoice(&invoice));
    }

    #[test]
    fn test_invoice_no_line_items_fails() {
        let mut invoice = complete_invoice();
        invoice.line_items.clear();
        assert!(!validate_invoice(&invoice));
    }
}
