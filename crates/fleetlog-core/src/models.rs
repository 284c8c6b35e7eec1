//! Domain models for fleetlog.
//!
//! Every extracted leaf field is `Option<T>`: absence means "not found in
//! the source document" and is a first-class value, never an error by
//! itself. Wire names (serde renames) follow the schema the model is
//! prompted for, so a raw model response deserializes directly into these
//! types after local re-validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod lenient {
    //! Lenient numeric deserialization for model output.
    //!
    //! Vision models frequently echo numbers the way the source document
    //! prints them ("16,300" instead of 16300). Accept JSON numbers and
    //! separator-formatted strings; reject everything else so a wrong shape
    //! surfaces as a schema violation and triggers a retry upstream.

    use serde::de::{self, Deserializer};
    use serde::Deserialize;
    use serde_json::Value;

    pub fn opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| de::Error::custom("number out of f64 range")),
            Some(Value::String(s)) => {
                let cleaned: String = s.trim().replace(',', "");
                if cleaned.is_empty() {
                    return Ok(None);
                }
                cleaned.parse::<f64>().map(Some).map_err(|_| {
                    de::Error::custom(format!("expected a number, got \"{}\"", s))
                })
            }
            Some(other) => Err(de::Error::custom(format!(
                "expected a number or null, got {}",
                other
            ))),
        }
    }

    pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => {
                if let Some(i) = n.as_i64() {
                    return Ok(Some(i));
                }
                // Cycle counts sometimes arrive as "1234.0".
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 => Ok(Some(f as i64)),
                    _ => Err(de::Error::custom(format!(
                        "expected an integer, got {}",
                        n
                    ))),
                }
            }
            Some(Value::String(s)) => {
                let cleaned: String = s.trim().replace(',', "");
                if cleaned.is_empty() {
                    return Ok(None);
                }
                if let Ok(i) = cleaned.parse::<i64>() {
                    return Ok(Some(i));
                }
                match cleaned.parse::<f64>() {
                    Ok(f) if f.fract() == 0.0 => Ok(Some(f as i64)),
                    _ => Err(de::Error::custom(format!(
                        "expected an integer, got \"{}\"",
                        s
                    ))),
                }
            }
            Some(other) => Err(de::Error::custom(format!(
                "expected an integer or null, got {}",
                other
            ))),
        }
    }
}

// =============================================================================
// AIRCRAFT UTILIZATION (extraction family)
// =============================================================================

/// Utilization metrics for a single component slot.
///
/// All fields independently optional; a slot with every field `None` is an
/// empty shell, still present in the parent, never persisted as a child row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentData {
    /// Time Since New, in hours.
    #[serde(rename = "TSN", default, deserialize_with = "lenient::opt_f64")]
    pub tsn: Option<f64>,
    /// Cycles Since New.
    #[serde(rename = "CSN", default, deserialize_with = "lenient::opt_i64")]
    pub csn: Option<i64>,
    /// Hours flown during the report month.
    #[serde(
        rename = "MonthlyUtil_Hrs",
        default,
        deserialize_with = "lenient::opt_f64"
    )]
    pub monthly_util_hrs: Option<f64>,
    /// Cycles made during the report month.
    #[serde(
        rename = "MonthlyUtil_Cyc",
        default,
        deserialize_with = "lenient::opt_i64"
    )]
    pub monthly_util_cyc: Option<i64>,
    /// Serial number of the installed component.
    #[serde(rename = "SerialNumber", default)]
    pub serial_number: Option<String>,
    /// Location information (e.g. "#1", MSN, tail number).
    #[serde(default)]
    pub location: Option<String>,
}

impl ComponentData {
    /// True iff every field is absent. Empty slots are not written as
    /// child rows.
    pub fn is_empty(&self) -> bool {
        self.tsn.is_none()
            && self.csn.is_none()
            && self.monthly_util_hrs.is_none()
            && self.monthly_util_cyc.is_none()
            && self.serial_number.is_none()
            && self.location.is_none()
    }
}

/// The closed set of component slots attached to a utilization report.
///
/// The slot set is fixed and known at compile time; `as_str` values are the
/// child-row discriminators stored in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentSlot {
    Airframe,
    Engine1,
    Engine2,
    Apu,
    LandingGearLeft,
    LandingGearRight,
    LandingGearNose,
}

impl ComponentSlot {
    /// All slots in canonical order.
    pub const ALL: [ComponentSlot; 7] = [
        ComponentSlot::Airframe,
        ComponentSlot::Engine1,
        ComponentSlot::Engine2,
        ComponentSlot::Apu,
        ComponentSlot::LandingGearLeft,
        ComponentSlot::LandingGearRight,
        ComponentSlot::LandingGearNose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentSlot::Airframe => "Airframe",
            ComponentSlot::Engine1 => "Engine1",
            ComponentSlot::Engine2 => "Engine2",
            ComponentSlot::Apu => "APU",
            ComponentSlot::LandingGearLeft => "LandingGearLeft",
            ComponentSlot::LandingGearRight => "LandingGearRight",
            ComponentSlot::LandingGearNose => "LandingGearNose",
        }
    }

    pub fn parse(s: &str) -> Option<ComponentSlot> {
        Self::ALL.iter().copied().find(|slot| slot.as_str() == s)
    }
}

impl std::fmt::Display for ComponentSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-cardinality component map for one aircraft report.
///
/// Deliberately a struct with named fields rather than a keyed map: the
/// slot set never varies at runtime, and a missing slot in model output
/// defaults to an empty shell rather than being omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AircraftComponents {
    #[serde(rename = "Airframe", default)]
    pub airframe: ComponentData,
    #[serde(rename = "Engine1", default)]
    pub engine1: ComponentData,
    #[serde(rename = "Engine2", default)]
    pub engine2: ComponentData,
    #[serde(rename = "APU", default)]
    pub apu: ComponentData,
    #[serde(rename = "LandingGearLeft", default)]
    pub landing_gear_left: ComponentData,
    #[serde(rename = "LandingGearRight", default)]
    pub landing_gear_right: ComponentData,
    #[serde(rename = "LandingGearNose", default)]
    pub landing_gear_nose: ComponentData,
}

impl AircraftComponents {
    /// Iterate every slot with its data, in canonical order.
    pub fn slots(&self) -> [(ComponentSlot, &ComponentData); 7] {
        [
            (ComponentSlot::Airframe, &self.airframe),
            (ComponentSlot::Engine1, &self.engine1),
            (ComponentSlot::Engine2, &self.engine2),
            (ComponentSlot::Apu, &self.apu),
            (ComponentSlot::LandingGearLeft, &self.landing_gear_left),
            (ComponentSlot::LandingGearRight, &self.landing_gear_right),
            (ComponentSlot::LandingGearNose, &self.landing_gear_nose),
        ]
    }

    /// Slots that carry at least one non-null field.
    pub fn non_empty_slots(&self) -> Vec<(ComponentSlot, &ComponentData)> {
        self.slots()
            .into_iter()
            .filter(|(_, data)| !data.is_empty())
            .collect()
    }
}

/// Complete aircraft monthly utilization report extracted from a document.
///
/// Natural key for deduplication: (registration, msn, month), exact string
/// equality as extracted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AircraftUtilization {
    /// Airline name (e.g. "TOC AIRLINES").
    #[serde(default)]
    pub airline: Option<String>,
    /// Month of the report (e.g. "Aug 2025").
    #[serde(default)]
    pub month: Option<String>,
    /// Manufacturer Serial Number.
    #[serde(default)]
    pub msn: Option<String>,
    /// Aircraft registration number (e.g. "A-7575").
    #[serde(default)]
    pub registration: Option<String>,
    /// Aircraft type (e.g. "737-800").
    #[serde(default)]
    pub aircraft_type: Option<String>,
    /// Days flown during the month.
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub days_flown: Option<i64>,
    /// All component slots with their utilization data.
    #[serde(default)]
    pub components: AircraftComponents,
}

/// Persisted child row: one non-empty component slot of a stored report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredComponent {
    pub id: Uuid,
    pub slot: ComponentSlot,
    #[serde(flatten)]
    pub data: ComponentData,
}

/// Persisted aircraft utilization report with generated identity.
///
/// Created exactly once per unique natural key; never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftRecord {
    pub id: Uuid,
    pub airline: Option<String>,
    pub month: Option<String>,
    pub msn: Option<String>,
    pub registration: Option<String>,
    pub aircraft_type: Option<String>,
    pub days_flown: Option<i64>,
    pub created_at_utc: DateTime<Utc>,
    pub components: Vec<StoredComponent>,
}

/// Outcome of an idempotent store: the record identity plus whether a new
/// row was written. Duplication is a normal, reported outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOutcome {
    pub id: Uuid,
    pub is_new: bool,
}

// =============================================================================
// INVOICE (extraction family)
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceClient {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub net_worth: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub vat: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub grand_total: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub unit_of_measure: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub unit_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub net_worth: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub vat_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub line_total: Option<f64>,
}

/// Structured invoice extracted from a scanned document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceResponse {
    #[serde(default)]
    pub vendor: Vendor,
    #[serde(default)]
    pub client: InvoiceClient,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<String>,
    #[serde(default)]
    pub totals: InvoiceTotals,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

// =============================================================================
// OPERATIONS (multi-tenant batch family)
// =============================================================================

/// Component payload in a batch save request. The upstream dashboard sends
/// every metric pre-formatted as a string; stored verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationsComponent {
    #[serde(rename = "type")]
    pub component_type: String,
    pub serial_number: String,
    pub last_utilization_date: String,
    pub flight_hours: String,
    pub flight_cycles: String,
    pub apu_hours: String,
    pub apu_cycles: String,
    pub tsn_at_period: String,
    pub csn_at_period: String,
    pub tsn_at_period_end: String,
    pub csn_at_period_end: String,
    pub last_tsn_csn_update: String,
    pub last_tsn_utilization: String,
    pub last_csn_utilization: String,
    pub attachment_status: String,
    pub engine_thrust: String,
    pub status: String,
    pub util_report_status: String,
    #[serde(rename = "asset_status")]
    pub asset_status: String,
    pub derate: String,
}

/// Asset payload with nested components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationsAsset {
    pub name: String,
    pub serial_number: String,
    pub registration_number: String,
    #[serde(rename = "validation_status")]
    pub validation_status: String,
    #[serde(rename = "report_status")]
    pub report_status: String,
    #[serde(rename = "obligation_status")]
    pub obligation_status: String,
    pub components: Vec<OperationsComponent>,
}

/// One lessee (tenant) with its assets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LesseeData {
    #[serde(rename = "lesseeName")]
    pub lessee_name: String,
    pub assets: Vec<OperationsAsset>,
}

/// Batch save request: all lessees for one month partition, with the source
/// file name as provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveOperationsRequest {
    pub lessees: Vec<LesseeData>,
    pub month: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

/// Best-effort batch outcome: per-entity failures are collected, siblings
/// still count toward the saved totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SaveOperationsOutcome {
    pub saved_lessees: u32,
    pub saved_assets: u32,
    pub saved_components: u32,
    pub errors: Vec<String>,
}

/// Persisted component row (operations family).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: OperationsComponent,
    pub month: String,
    pub created_at_utc: DateTime<Utc>,
}

/// Persisted asset with nested components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: Uuid,
    pub name: String,
    pub serial_number: String,
    pub registration_number: String,
    pub validation_status: String,
    pub report_status: String,
    pub obligation_status: String,
    pub month: String,
    pub created_at_utc: DateTime<Utc>,
    pub components: Vec<ComponentRecord>,
}

/// Persisted lessee with nested assets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LesseeRecord {
    pub id: Uuid,
    pub name: String,
    pub month: String,
    pub file_name: String,
    pub created_at_utc: DateTime<Utc>,
    pub assets: Vec<AssetRecord>,
}
