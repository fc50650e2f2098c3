use super::schema::saving_suggestions_schema;
use super::AssistantError;
use crate::survey::domain::{Answer, BuildingType, EntryId, SavingOpportunity, SurveyRecord};
use crate::survey::metrics::{bill_totals, MetricsPolicy};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Household profile summarized for the suggestion prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub building_type: Option<BuildingType>,
    pub building_area: Option<f64>,
    pub family_members: Option<f64>,
    pub solar_installed: Option<Answer>,
    pub average_daily_consumption_kwh: f64,
    pub high_power_appliances: Vec<String>,
    pub prompt: String,
    pub response_schema: Value,
}

impl SuggestionRequest {
    pub fn from_record(record: &SurveyRecord, policy: &MetricsPolicy) -> Self {
        let connection = &record.electricity_connection;
        let average_daily_consumption_kwh =
            bill_totals(&record.bill_estimations).average_daily_consumption(policy);

        let high_power_appliances: Vec<String> = record
            .equipment_estimations
            .iter()
            .filter(|entry| entry.power_watts.unwrap_or(0.0) > policy.high_power_watts)
            .map(|entry| entry.equipment.clone())
            .collect();

        let mut request = Self {
            building_type: connection.building_type,
            building_area: connection.building_area,
            family_members: connection.family_members,
            solar_installed: connection.solar_installed,
            average_daily_consumption_kwh,
            high_power_appliances,
            prompt: String::new(),
            response_schema: saving_suggestions_schema(),
        };
        request.prompt = request.render_prompt();
        request
    }

    fn render_prompt(&self) -> String {
        let building_type = self.building_type.map(BuildingType::label).unwrap_or("");
        let area = match self.building_area {
            Some(area) if area != 0.0 => format!("{area}"),
            _ => "N/A".to_string(),
        };
        let family = self
            .family_members
            .map(|count| format!("{count}"))
            .unwrap_or_default();
        let solar = self.solar_installed.map(Answer::label).unwrap_or("");
        let appliances = if self.high_power_appliances.is_empty() {
            "None specified".to_string()
        } else {
            self.high_power_appliances.join(", ")
        };

        format!(
            "Analyze the following home energy data and provide 3-5 practical, targeted energy-saving suggestions.\n\n\
             Home Profile:\n\
             - Building Type: {building_type}\n\
             - Total Area: {area} sq meters\n\
             - Number of Family Members: {family}\n\
             - Solar Plant Installed: {solar}\n\
             - Approximate Average Daily Electricity Consumption: {:.2} kWh\n\
             - High-Power Appliances Noted: {appliances}\n\n\
             For each suggestion, provide a brief description, an estimated daily energy saving in Watt-hours (Wh), \
             a rough required investment in Indian Rupees (₹), and an estimated payback period in months. \
             Be realistic with the numbers.",
            self.average_daily_consumption_kwh
        )
    }
}

/// One sanitized suggestion, not yet given a list identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedSaving {
    pub suggestion: String,
    pub energy_saving_wh: f64,
    pub investment: f64,
    pub payback_months: f64,
    pub remarks: String,
}

impl SuggestedSaving {
    pub fn into_opportunity(self, id: EntryId) -> SavingOpportunity {
        SavingOpportunity {
            id,
            suggestion: self.suggestion,
            energy_saving_wh: Some(self.energy_saving_wh),
            investment: Some(self.investment),
            payback_months: Some(self.payback_months),
            remarks: self.remarks,
        }
    }
}

pub(crate) fn parse_suggestions(raw: &Value) -> Result<Vec<SuggestedSaving>, AssistantError> {
    let root = raw
        .as_object()
        .ok_or_else(|| AssistantError::MalformedResponse("expected a JSON object".to_string()))?;

    let Some(items) = root.get("suggestions").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    Ok(items
        .iter()
        .filter_map(Value::as_object)
        .map(sanitize_suggestion)
        .collect())
}

fn sanitize_suggestion(item: &Map<String, Value>) -> SuggestedSaving {
    let suggestion = item
        .get("suggestion")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .unwrap_or("N/A")
        .to_string();
    let remarks = item
        .get("remarks")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    SuggestedSaving {
        suggestion,
        energy_saving_wh: number(item, "energySavingWh"),
        investment: number(item, "investment"),
        payback_months: number(item, "paybackMonths"),
        remarks,
    }
}

fn number(item: &Map<String, Value>, key: &str) -> f64 {
    item.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}
