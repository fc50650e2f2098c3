use super::schema::{bill_extraction_schema, BILL_EXTRACTION_INSTRUCTIONS, PDF_MIME_TYPE};
use super::AssistantError;
use crate::survey::domain::{
    Answer, BillEntry, ConnectionNature, ElectricityConnection, EntryId, MeterType,
};
use crate::survey::rules::bill_total;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const EXTRACTED_BILL_REMARK: &str = "Extracted from PDF";

/// File handed over by the surveyor.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl DocumentUpload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    pub(crate) fn ensure_pdf(&self) -> Result<(), AssistantError> {
        let is_pdf = self
            .mime_type
            .parse::<mime::Mime>()
            .map(|parsed| parsed.essence_str() == mime::APPLICATION_PDF.essence_str())
            .unwrap_or(false);

        if is_pdf {
            Ok(())
        } else {
            Err(AssistantError::UnsupportedDocument {
                mime_type: self.mime_type.clone(),
            })
        }
    }
}

/// Request shape sent to the model for document extraction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    #[serde(skip)]
    pub document: Vec<u8>,
    pub mime_type: String,
    pub instruction_text: String,
    pub response_schema: Value,
}

impl ExtractionRequest {
    pub fn for_bill(upload: DocumentUpload) -> Self {
        Self {
            document: upload.bytes,
            mime_type: PDF_MIME_TYPE.to_string(),
            instruction_text: BILL_EXTRACTION_INSTRUCTIONS.to_string(),
            response_schema: bill_extraction_schema(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDetails {
    pub connection_details: ConnectionDetails,
    pub bill_details: BillDetails,
}

impl ExtractedDetails {
    /// Sanitizes the model's answer: strings default to empty, numbers to zero,
    /// and a missing total is rebuilt from the charge components.
    pub fn from_response(raw: &Value) -> Result<Self, AssistantError> {
        let root = raw.as_object().ok_or_else(|| {
            AssistantError::MalformedResponse("expected a JSON object".to_string())
        })?;

        let empty = Map::new();
        let connection = section(root, "connectionDetails").unwrap_or(&empty);
        let bill = section(root, "billDetails").unwrap_or(&empty);

        let connection_details = ConnectionDetails {
            consumer_name: text(connection, "consumerName"),
            consumer_number: text(connection, "consumerNumber"),
            electrical_section: text(connection, "electricalSection"),
            tariff_category: text(connection, "tariffCategory"),
            connection_nature: text(connection, "connectionNature"),
            energy_meter_type: text(connection, "energyMeterType"),
            solar_installed: text(connection, "solarInstalled"),
            connected_load_watts: number(connection, "connectedLoadWatts"),
        };

        let mut bill_details = BillDetails {
            bill_number: text(bill, "billNumber"),
            period: text(bill, "period"),
            remarks: text(bill, "remarks"),
            consumption: number(bill, "consumption"),
            fixed_charge: number(bill, "fixedCharge"),
            meter_rent: number(bill, "meterRent"),
            energy_charges: number(bill, "energyCharges"),
            duty: number(bill, "duty"),
            other_charges: number(bill, "otherCharges"),
            total: number(bill, "total"),
        };

        if bill_details.total == 0.0 {
            bill_details.total = bill_total(&bill_details.as_bill_entry(EntryId(String::new())));
        }

        Ok(Self {
            connection_details,
            bill_details,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionDetails {
    pub consumer_name: String,
    pub consumer_number: String,
    pub electrical_section: String,
    pub tariff_category: String,
    pub connection_nature: String,
    pub energy_meter_type: String,
    pub solar_installed: String,
    pub connected_load_watts: f64,
}

impl ConnectionDetails {
    /// Copies extracted values into the blank fields of `connection`; fields
    /// the surveyor already filled in are kept.
    pub fn fill_blanks(&self, connection: &ElectricityConnection) -> ElectricityConnection {
        let mut next = connection.clone();

        fill_text(&mut next.consumer_name, &self.consumer_name);
        fill_text(&mut next.consumer_number, &self.consumer_number);
        fill_text(&mut next.electrical_section, &self.electrical_section);
        fill_text(&mut next.tariff_category, &self.tariff_category);

        if next.connected_load_watts.is_none() && self.connected_load_watts > 0.0 {
            next.connected_load_watts = Some(self.connected_load_watts);
        }
        if next.connection_nature.is_none() {
            next.connection_nature = ConnectionNature::parse(&self.connection_nature);
        }
        if next.energy_meter_type.is_none() {
            next.energy_meter_type = MeterType::parse(&self.energy_meter_type);
        }
        if next.solar_installed.is_none() {
            next.solar_installed = Answer::parse(&self.solar_installed);
        }

        next
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillDetails {
    pub bill_number: String,
    pub period: String,
    pub remarks: String,
    pub consumption: f64,
    pub fixed_charge: f64,
    pub meter_rent: f64,
    pub energy_charges: f64,
    pub duty: f64,
    pub other_charges: f64,
    pub total: f64,
}

impl BillDetails {
    /// Consumption is the field that tells a readable bill from a failed read.
    pub fn has_consumption(&self) -> bool {
        self.consumption != 0.0
    }

    pub fn into_bill_entry(self, id: EntryId) -> BillEntry {
        let mut entry = self.as_bill_entry(id);
        if entry.remarks.trim().is_empty() {
            entry.remarks = EXTRACTED_BILL_REMARK.to_string();
        }
        entry
    }

    fn as_bill_entry(&self, id: EntryId) -> BillEntry {
        BillEntry {
            id,
            bill_number: self.bill_number.clone(),
            period: self.period.clone(),
            consumption: Some(self.consumption),
            fixed_charge: Some(self.fixed_charge),
            meter_rent: Some(self.meter_rent),
            energy_charges: Some(self.energy_charges),
            duty: Some(self.duty),
            other_charges: Some(self.other_charges),
            total: Some(self.total),
            remarks: self.remarks.clone(),
        }
    }
}

fn section<'a>(root: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    root.get(key).and_then(Value::as_object)
}

fn text(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Number(value)) => value.to_string(),
        _ => String::new(),
    }
}

fn number(object: &Map<String, Value>, key: &str) -> f64 {
    match object.get(key) {
        Some(Value::Number(value)) => value.as_f64().unwrap_or(0.0),
        Some(Value::String(value)) => value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|parsed| parsed.is_finite())
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

fn fill_text(target: &mut String, extracted: &str) {
    if target.trim().is_empty() && !extracted.trim().is_empty() {
        *target = extracted.to_string();
    }
}
