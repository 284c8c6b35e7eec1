//! Prompt builders for structured extraction.
//!
//! The instruction blocks are part of the extraction contract: field names
//! here must match the serde wire names on the target models, and the
//! numeric coercion rules must match the lenient deserializers. Change
//! either side only in lockstep.

/// System instruction for aircraft utilization extraction.
pub const AIRCRAFT_SYSTEM_PROMPT: &str = "You are an AI that extracts structured aircraft utilization data from maintenance reports. Extract all information accurately according to the schema provided.";

/// System instruction for invoice extraction.
pub const INVOICE_SYSTEM_PROMPT: &str = "You are an AI that extracts structured invoice data. Extract all invoice information accurately.";

/// Build the prompt for aircraft utilization data extraction.
pub fn build_aircraft_prompt() -> String {
    r#"
Extract aircraft utilization data from this monthly aircraft utilization report and return structured data.

**AIRCRAFT HEADER INFORMATION:**
- airline: Airline name (e.g., "TOC AIRLINES")
- month: Month and year of report (e.g., "Aug 2025")
- msn: Manufacturer Serial Number
- registration: Aircraft registration number (e.g., "A-7575")
- aircraft_type: Aircraft type (e.g., "737-800")
- days_flown: Number of days flown during the month (if available)

**COMPONENT DATA - Extract for each component:**

1. **Airframe:**
   - TSN: Aircraft Total Time Since New (hours)
   - CSN: Aircraft Total Cycles Since New
   - MonthlyUtil_Hrs: Hours flown during the month
   - MonthlyUtil_Cyc: Cycles/Landings during the month
   - SerialNumber: MSN or Aircraft Serial Number
   - location: Aircraft Registration

2. **Engine1 (Position NO.1):**
   - TSN: Total Time Since New of engine
   - CSN: Total Cycles Since New of engine
   - MonthlyUtil_Hrs: Hours flown during month
   - MonthlyUtil_Cyc: Cycles during month
   - SerialNumber: S/N of Engine Installed
   - location: Present Location of Original Engine

3. **Engine2 (Position NO.2):**
   - TSN: Total Time Since New of engine
   - CSN: Total Cycles Since New of engine
   - MonthlyUtil_Hrs: Hours flown during month
   - MonthlyUtil_Cyc: Cycles during month
   - SerialNumber: S/N of Engine Installed
   - location: Present Location of Original Engine

4. **APU (Auxiliary Power Unit):**
   - TSN: Total Time Since New of APU
   - CSN: Total Cycles Since New of APU
   - MonthlyUtil_Hrs: Hours flown during month
   - MonthlyUtil_Cyc: Cycles during month
   - SerialNumber: S/N of APU Installed
   - location: Present Location of APU

5. **LandingGearLeft (Main Landing Gear 1):**
   - TSN: Total Time Since New
   - CSN: Total Cycles Since New
   - MonthlyUtil_Hrs: Total Hours Flown During Month
   - MonthlyUtil_Cyc: Total Cycles Made During Month
   - SerialNumber: S/N of Landing Gear Installed
   - location: null (or installation position if mentioned)

6. **LandingGearRight (Main Landing Gear 2):**
   - TSN: Total Time Since New
   - CSN: Total Cycles Since New
   - MonthlyUtil_Hrs: Total Hours Flown During Month
   - MonthlyUtil_Cyc: Total Cycles Made During Month
   - SerialNumber: S/N of Landing Gear Installed
   - location: null (or installation position if mentioned)

7. **LandingGearNose (Nose Landing Gear):**
   - TSN: Total Time Since New
   - CSN: Total Cycles Since New
   - MonthlyUtil_Hrs: Total Hours Flown During Month
   - MonthlyUtil_Cyc: Total Cycles Made During Month
   - SerialNumber: S/N of Landing Gear Installed
   - location: null (or installation position if mentioned)

**CRITICAL EXTRACTION RULES:**
1. All numeric values (TSN, CSN, hours, cycles) MUST be numbers, not strings
2. Use null for missing optional fields
3. TSN values are in HOURS (floating point numbers)
4. CSN values are CYCLES (integers)
5. Serial numbers are STRINGS (may contain letters and numbers)
6. If "Total Time Since New" is shown as "16,300" or "16300", extract as 16300.0
7. If a component's data is not found in the document, set all its fields to null

**DATA LOCATION HINTS:**
- Look for tables with columns for different positions (NO.1, NO.2, APU)
- Engine data typically has rows like "S/N of Engine Installed", "Total Time Since New", etc.
- Landing gear data typically has columns for "Main Landing Gear 1", "Main Landing Gear 2", "Nose Landing Gear"
- Aircraft totals are usually at the top of the document

**EXPECTED OUTPUT STRUCTURE:**
{
  "airline": "TOC AIRLINES",
  "month": "Aug 2025",
  "msn": "9999",
  "registration": "A-7575",
  "aircraft_type": "737-800",
  "days_flown": null,
  "components": {
    "Airframe": {
      "TSN": 16300.0,
      "CSN": 8200,
      "MonthlyUtil_Hrs": 197.25,
      "MonthlyUtil_Cyc": 230,
      "SerialNumber": "9999",
      "location": "A-7575"
    },
    "Engine1": { ... },
    "Engine2": { ... },
    "APU": { ... },
    "LandingGearLeft": { ... },
    "LandingGearRight": { ... },
    "LandingGearNose": { ... }
  }
}

Extract all available data from the document provided below.
"#
    .to_string()
}

/// Build the prompt for invoice extraction.
pub fn build_invoice_prompt() -> String {
    r#"
Extract the following fields from this invoice and return as VALID JSON ONLY (no markdown, no code blocks):

**Required Fields:**

1. **Vendor Details:**
   - name (company name)
   - address (full address)
   - tax_id (tax identification number)
   - iban (bank account number, use empty string if not available)

2. **Client Details:**
   - name (company name)
   - address (full address)
   - tax_id (tax identification number, use empty string if not available)

3. **Invoice Metadata:**
   - invoice_number (invoice ID/number)
   - invoice_date (format: YYYY-MM-DD)

4. **Totals:**
   - net_worth (subtotal before tax, as number)
   - vat (total VAT/tax amount, as number)
   - grand_total (final total including tax, as number)

5. **Line Items:** (array of products/services)
   - description (item description)
   - quantity (number of units)
   - unit_of_measure (e.g., "each", "box", "kg", "hour")
   - unit_price (price per unit, as number)
   - net_worth (subtotal for this line, as number)
   - vat_percent (VAT percentage as number, e.g., 10)
   - line_total (total including VAT for this line, as number)

**CRITICAL RULES:**
- Return ONLY the JSON object, no explanations
- Do NOT wrap in markdown code blocks
- All monetary values MUST be numbers, not strings
- Use null for missing optional fields
- Date format must be YYYY-MM-DD

**Expected JSON Structure:**
{
  "vendor": {
    "name": "",
    "address": "",
    "tax_id": "",
    "iban": ""
  },
  "client": {
    "name": "",
    "address": "",
    "tax_id": ""
  },
  "invoice_number": "",
  "invoice_date": "",
  "totals": {
    "net_worth": 0,
    "vat": 0,
    "grand_total": 0
  },
  "line_items": [
    {
      "description": "",
      "quantity": 0,
      "unit_of_measure": "",
      "unit_price": 0,
      "net_worth": 0,
      "vat_percent": 0,
      "line_total": 0
    }
  ]
}
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aircraft_prompt_names_every_slot() {
        let prompt = build_aircraft_prompt();
        for slot in [
            "Airframe",
            "Engine1",
            "Engine2",
            "APU",
            "LandingGearLeft",
            "LandingGearRight",
            "LandingGearNose",
        ] {
            assert!(prompt.contains(slot), "missing slot: {}", slot);
        }
    }

    #[test]
    fn test_aircraft_prompt_carries_coercion_rules() {
        let prompt = build_aircraft_prompt();
        // The separator coercion rule backs the lenient deserializers.
        assert!(prompt.contains(r#"shown as "16,300" or "16300", extract as 16300.0"#));
        assert!(prompt.contains("MUST be numbers, not strings"));
        assert!(prompt.contains("Use null for missing optional fields"));
    }

    #[test]
    fn test_aircraft_prompt_uses_wire_field_names() {
        let prompt = build_aircraft_prompt();
        for field in ["TSN", "CSN", "MonthlyUtil_Hrs", "MonthlyUtil_Cyc", "SerialNumber"] {
            assert!(prompt.contains(field), "missing wire field: {}", field);
        }
    }

    #[test]
    fn test_invoice_prompt_forbids_fences_and_names_totals() {
        let prompt = build_invoice_prompt();
        assert!(prompt.contains("Do NOT wrap in markdown code blocks"));
        for field in ["net_worth", "vat", "grand_total", "line_items", "invoice_number"] {
            assert!(prompt.contains(field), "missing field: {}", field);
        }
    }
}
