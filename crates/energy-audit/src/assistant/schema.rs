use serde_json::{json, Value};

pub const PDF_MIME_TYPE: &str = "application/pdf";

pub const BILL_EXTRACTION_INSTRUCTIONS: &str = "\
Analyze the provided electricity bill PDF, likely from KSEB (Kerala State Electricity Board).
Extract the following details and return them in a single JSON object.
The JSON should have two main keys: 'connectionDetails' and 'billDetails'.
If a value is not found, return an empty string for string fields, 0 for numeric fields, or 'No' for the solar field.

For 'connectionDetails', extract:
- consumerName: Name of the consumer.
- consumerNumber: The unique consumer number or ID.
- electricalSection: The name of the electrical section office.
- tariffCategory: The tariff code or category (e.g., LT-1A).
- connectedLoadWatts: The sanctioned or connected load. If in kW, convert to Watts.
- connectionNature: Should be either 'Single Phase' or 'Three Phase'.
- energyMeterType: Type of meter, like 'Digital', 'Electromechanical', or 'TOD'.
- solarInstalled: Check for net-metering data like 'Export' energy readings. If present, set this to \"Yes\", otherwise \"No\".

For 'billDetails', extract:
- billNumber: The Bill Number. Can be the same as consumer number if not distinct.
- period: The billing period (e.g., 'May-Jun 2023').
- consumption: Total consumption in kWh for the period. For net-metered bills, this is usually the 'Net' or 'Billed' consumption.
- fixedCharge: The fixed charge amount.
- meterRent: The meter rent amount.
- energyCharges: The total energy charges.
- duty: The electricity duty amount.
- total: The total bill amount.
- otherCharges: Any other charges not covered above. Sum them up if there are multiple.
";

/// Structured-output schema the model must follow when reading a bill.
pub fn bill_extraction_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "connectionDetails": {
                "type": "OBJECT",
                "properties": {
                    "consumerName": { "type": "STRING" },
                    "consumerNumber": { "type": "STRING" },
                    "electricalSection": { "type": "STRING" },
                    "tariffCategory": { "type": "STRING" },
                    "connectedLoadWatts": { "type": "NUMBER" },
                    "connectionNature": { "type": "STRING" },
                    "energyMeterType": { "type": "STRING" },
                    "solarInstalled": { "type": "STRING" }
                }
            },
            "billDetails": {
                "type": "OBJECT",
                "properties": {
                    "billNumber": { "type": "STRING" },
                    "period": { "type": "STRING" },
                    "consumption": { "type": "NUMBER" },
                    "fixedCharge": { "type": "NUMBER" },
                    "meterRent": { "type": "NUMBER" },
                    "energyCharges": { "type": "NUMBER" },
                    "duty": { "type": "NUMBER" },
                    "otherCharges": { "type": "NUMBER" },
                    "total": { "type": "NUMBER" }
                }
            }
        }
    })
}

pub fn saving_suggestions_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "suggestions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "suggestion": { "type": "STRING", "description": "The energy saving suggestion." },
                        "energySavingWh": { "type": "NUMBER", "description": "Targeted energy saving per day in Watt-hours (Wh)." },
                        "investment": { "type": "NUMBER", "description": "Estimated investment required in Indian Rupees (₹)." },
                        "paybackMonths": { "type": "NUMBER", "description": "Estimated payback period in months." },
                        "remarks": { "type": "STRING", "description": "Any additional remarks." }
                    }
                }
            }
        }
    })
}
