use super::domain::{Answer, BuildingType, SurveyRecord};
use super::metrics::{bill_totals, equipment_daily_kwh};
use serde::Serialize;
use std::io::Write;

/// One spreadsheet row per survey, aggregating the record's lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    #[serde(rename = "Survey ID")]
    pub survey_id: String,
    #[serde(rename = "Submission Date")]
    pub submission_date: String,
    #[serde(rename = "Appraiser Name")]
    pub appraiser_name: String,
    #[serde(rename = "Appraiser Enrollment ID")]
    pub appraiser_enrollment_id: String,
    #[serde(rename = "Consumer Name")]
    pub consumer_name: String,
    #[serde(rename = "Consumer Number")]
    pub consumer_number: String,
    #[serde(rename = "Family Members")]
    pub family_members: Option<f64>,
    #[serde(rename = "Building Type")]
    pub building_type: String,
    #[serde(rename = "Building Area (m2)")]
    pub building_area: Option<f64>,
    #[serde(rename = "Connected Load (W)")]
    pub connected_load_watts: Option<f64>,
    #[serde(rename = "Solar Installed")]
    pub solar_installed: String,
    #[serde(rename = "Avg Bill Consumption (kWh)")]
    pub avg_bill_consumption: String,
    #[serde(rename = "Total Bill Amount (Rs)")]
    pub total_bill_amount: String,
    #[serde(rename = "Total Equipment Consumption (Wh/day)")]
    pub total_equipment_wh: String,
    #[serde(rename = "Num Vehicles")]
    pub vehicles: usize,
    #[serde(rename = "Num Fuel Types")]
    pub fuel_types: usize,
    #[serde(rename = "Num Saving Opportunities")]
    pub saving_opportunities: usize,
}

impl ExportRow {
    pub fn from_record(record: &SurveyRecord) -> Self {
        let connection = &record.electricity_connection;
        let bills = bill_totals(&record.bill_estimations);
        let equipment_wh = equipment_daily_kwh(&record.equipment_estimations) * 1000.0;

        Self {
            survey_id: record
                .id
                .as_ref()
                .map(|id| id.0.clone())
                .unwrap_or_default(),
            submission_date: record
                .submission_date
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            appraiser_name: record.appraiser_info.name.clone(),
            appraiser_enrollment_id: record.appraiser_info.enrollment_id.clone(),
            consumer_name: connection.consumer_name.clone(),
            consumer_number: connection.consumer_number.clone(),
            family_members: connection.family_members,
            building_type: connection
                .building_type
                .map(BuildingType::label)
                .unwrap_or_default()
                .to_string(),
            building_area: connection.building_area,
            connected_load_watts: connection.connected_load_watts,
            solar_installed: connection
                .solar_installed
                .map(Answer::label)
                .unwrap_or_default()
                .to_string(),
            avg_bill_consumption: format!("{:.2}", bills.average_consumption_per_bill()),
            total_bill_amount: format!("{:.2}", bills.amount),
            total_equipment_wh: format!("{:.2}", equipment_wh),
            vehicles: record.vehicle_usage.len(),
            fuel_types: record.fuel_for_cooking.len(),
            saving_opportunities: record.saving_opportunities.len(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no survey data available to export")]
    Empty,
    #[error("failed to write export: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush export: {0}")]
    Io(#[from] std::io::Error),
}

pub fn flatten(records: &[SurveyRecord]) -> Vec<ExportRow> {
    records.iter().map(ExportRow::from_record).collect()
}

/// Writes one CSV row per record, headers first.
pub fn write_csv<W: Write>(records: &[SurveyRecord], writer: W) -> Result<usize, ExportError> {
    if records.is_empty() {
        return Err(ExportError::Empty);
    }

    let mut csv_writer = csv::Writer::from_writer(writer);
    let rows = flatten(records);
    for row in &rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(rows.len())
}
