use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifier assigned by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurveyId(pub String);

/// Identifier of a row inside one of the record's lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

static ENTRY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

impl EntryId {
    pub fn generate(prefix: &str) -> Self {
        let id = ENTRY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("{prefix}-{id:06}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Rows that carry a stable identifier within their list.
pub trait Identified {
    const PREFIX: &'static str;

    fn id(&self) -> &EntryId;
}

/// Treats an unset reading as zero without altering the stored value.
pub fn or_zero(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

/// Root aggregate for one household survey.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SurveyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub appraiser_info: AppraiserInfo,
    #[serde(default)]
    pub electricity_connection: ElectricityConnection,
    #[serde(default)]
    pub solar_plant_details: Vec<SolarPlantDetail>,
    #[serde(default)]
    pub fuel_for_cooking: Vec<FuelForCooking>,
    #[serde(default)]
    pub water_usage: WaterUsage,
    #[serde(default)]
    pub vehicle_usage: Vec<VehicleUsage>,
    #[serde(default)]
    pub bill_estimations: Vec<BillEntry>,
    #[serde(default)]
    pub equipment_estimations: Vec<EquipmentEntry>,
    #[serde(default)]
    pub saving_opportunities: Vec<SavingOpportunity>,
}

impl SurveyRecord {
    /// Blank record used at survey start: every scalar unset, every list empty.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitted(&self) -> bool {
        self.submission_date.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppraiserInfo {
    pub name: String,
    pub enrollment_id: String,
    pub unit_no: String,
    pub college_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElectricityConnection {
    pub consumer_name: String,
    #[serde(deserialize_with = "optional_number")]
    pub family_members: Option<f64>,
    pub consumer_number: String,
    pub tariff_category: String,
    pub electrical_section: String,
    #[serde(deserialize_with = "optional_number")]
    pub connected_load_watts: Option<f64>,
    #[serde(deserialize_with = "blank_as_none")]
    pub connection_nature: Option<ConnectionNature>,
    #[serde(deserialize_with = "blank_as_none")]
    pub building_type: Option<BuildingType>,
    #[serde(deserialize_with = "blank_as_none")]
    pub ownership: Option<Ownership>,
    #[serde(deserialize_with = "optional_number")]
    pub floors: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub building_area: Option<f64>,
    #[serde(deserialize_with = "blank_as_none")]
    pub earthing_type: Option<EarthingType>,
    #[serde(deserialize_with = "blank_as_none")]
    pub control_systems: Option<ControlSystem>,
    #[serde(deserialize_with = "optional_number")]
    pub mcb_count: Option<f64>,
    #[serde(deserialize_with = "blank_as_none")]
    pub energy_meter_type: Option<MeterType>,
    #[serde(deserialize_with = "blank_as_none")]
    pub solar_installed: Option<Answer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolarPlantDetail {
    pub id: EntryId,
    #[serde(rename = "type", default, deserialize_with = "blank_as_none")]
    pub plant_type: Option<SolarPlantType>,
    #[serde(default, deserialize_with = "optional_number")]
    pub installed_capacity: Option<f64>,
    #[serde(default)]
    pub remarks: String,
}

impl SolarPlantDetail {
    pub fn blank(id: EntryId) -> Self {
        Self {
            id,
            plant_type: None,
            installed_capacity: None,
            remarks: String::new(),
        }
    }
}

impl Identified for SolarPlantDetail {
    const PREFIX: &'static str = "solar";

    fn id(&self) -> &EntryId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FuelForCooking {
    #[serde(rename = "type")]
    pub fuel_type: CookingFuel,
    #[serde(default, deserialize_with = "optional_number")]
    pub consumption: Option<f64>,
    pub units: FuelUnit,
    #[serde(default)]
    pub remarks: String,
}

impl Default for FuelForCooking {
    fn default() -> Self {
        Self {
            fuel_type: CookingFuel::Firewood,
            consumption: None,
            units: FuelUnit::Kg,
            remarks: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WaterUsage {
    #[serde(deserialize_with = "blank_as_none")]
    pub source: Option<WaterSource>,
    #[serde(deserialize_with = "optional_number")]
    pub municipal_consumption: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub municipal_bill: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub tank_capacity: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub pump_capacity: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub fill_time: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub pump_frequency: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub(crate) daily_power_consumption: Option<f64>,
    #[serde(deserialize_with = "optional_number")]
    pub(crate) annual_power_consumption: Option<f64>,
    pub remarks: String,
}

impl WaterUsage {
    /// Pump energy per day in kWh, derived from the pump inputs.
    pub fn daily_power_consumption(&self) -> Option<f64> {
        self.daily_power_consumption
    }

    /// Pump energy per year in kWh, derived from the pump inputs.
    pub fn annual_power_consumption(&self) -> Option<f64> {
        self.annual_power_consumption
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleUsage {
    #[serde(rename = "type")]
    pub vehicle_type: VehicleType,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub fuel_type: Option<VehicleFuel>,
    #[serde(default, deserialize_with = "optional_number")]
    pub monthly_usage_km: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub monthly_fuel_consumption: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub monthly_fuel_expense: Option<f64>,
    #[serde(default)]
    pub remarks: String,
}

impl Default for VehicleUsage {
    fn default() -> Self {
        Self {
            vehicle_type: VehicleType::TwoWheeler,
            fuel_type: None,
            monthly_usage_km: None,
            monthly_fuel_consumption: None,
            monthly_fuel_expense: None,
            remarks: String::new(),
        }
    }
}

/// One electricity bill with its charge breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillEntry {
    pub id: EntryId,
    #[serde(default)]
    pub bill_number: String,
    #[serde(default)]
    pub period: String,
    #[serde(default, deserialize_with = "optional_number")]
    pub consumption: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub fixed_charge: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub meter_rent: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub energy_charges: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub duty: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub other_charges: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub(crate) total: Option<f64>,
    #[serde(default)]
    pub remarks: String,
}

impl BillEntry {
    pub fn blank(id: EntryId) -> Self {
        Self {
            id,
            bill_number: String::new(),
            period: String::new(),
            consumption: None,
            fixed_charge: None,
            meter_rent: None,
            energy_charges: None,
            duty: None,
            other_charges: None,
            total: None,
            remarks: String::new(),
        }
    }

    pub fn total(&self) -> Option<f64> {
        self.total
    }
}

impl Identified for BillEntry {
    const PREFIX: &'static str = "bill";

    fn id(&self) -> &EntryId {
        &self.id
    }
}

/// One appliance with its daily usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentEntry {
    pub id: EntryId,
    #[serde(default)]
    pub equipment: String,
    #[serde(default, deserialize_with = "optional_number")]
    pub daily_usage_hours: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub power_watts: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub(crate) energy_consumption_wh: Option<f64>,
    #[serde(default)]
    pub remarks: String,
}

impl EquipmentEntry {
    pub fn blank(id: EntryId) -> Self {
        Self {
            id,
            equipment: String::new(),
            daily_usage_hours: None,
            power_watts: None,
            energy_consumption_wh: None,
            remarks: String::new(),
        }
    }

    /// Preset rows start with a known wattage and zero daily energy.
    pub fn from_preset(id: EntryId, preset: &AppliancePreset) -> Self {
        Self {
            id,
            equipment: preset.name.to_string(),
            daily_usage_hours: None,
            power_watts: Some(preset.watts),
            energy_consumption_wh: Some(0.0),
            remarks: String::new(),
        }
    }

    pub fn energy_consumption_wh(&self) -> Option<f64> {
        self.energy_consumption_wh
    }
}

impl Identified for EquipmentEntry {
    const PREFIX: &'static str = "equip";

    fn id(&self) -> &EntryId {
        &self.id
    }
}

/// Proposed intervention with its estimated daily saving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingOpportunity {
    pub id: EntryId,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default, deserialize_with = "optional_number")]
    pub energy_saving_wh: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub investment: Option<f64>,
    #[serde(default, deserialize_with = "optional_number")]
    pub payback_months: Option<f64>,
    #[serde(default)]
    pub remarks: String,
}

impl SavingOpportunity {
    pub fn blank(id: EntryId) -> Self {
        Self {
            id,
            suggestion: String::new(),
            energy_saving_wh: None,
            investment: None,
            payback_months: None,
            remarks: String::new(),
        }
    }
}

impl Identified for SavingOpportunity {
    const PREFIX: &'static str = "saving";

    fn id(&self) -> &EntryId {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliancePreset {
    pub name: &'static str,
    pub watts: f64,
}

pub const COMMON_APPLIANCES: [AppliancePreset; 10] = [
    AppliancePreset {
        name: "Ceiling Fan",
        watts: 75.0,
    },
    AppliancePreset {
        name: "Refrigerator",
        watts: 200.0,
    },
    AppliancePreset {
        name: "LED Bulb",
        watts: 9.0,
    },
    AppliancePreset {
        name: "Television (LED)",
        watts: 100.0,
    },
    AppliancePreset {
        name: "Washing Machine",
        watts: 500.0,
    },
    AppliancePreset {
        name: "Water Pump (0.5HP)",
        watts: 375.0,
    },
    AppliancePreset {
        name: "AC (1 Ton)",
        watts: 1200.0,
    },
    AppliancePreset {
        name: "Iron Box",
        watts: 1000.0,
    },
    AppliancePreset {
        name: "Mixer Grinder",
        watts: 550.0,
    },
    AppliancePreset {
        name: "Laptop Charger",
        watts: 65.0,
    },
];

pub fn find_appliance_preset(name: &str) -> Option<&'static AppliancePreset> {
    let needle = name.trim();
    COMMON_APPLIANCES
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(needle))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionNature {
    #[serde(rename = "Single Phase")]
    SinglePhase,
    #[serde(rename = "Three Phase")]
    ThreePhase,
}

impl ConnectionNature {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SinglePhase => "Single Phase",
            Self::ThreePhase => "Three Phase",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingType {
    Concrete,
    #[serde(rename = "Tiled Roof")]
    TiledRoof,
    #[serde(rename = "Sheet Roof")]
    SheetRoof,
}

impl BuildingType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Concrete => "Concrete",
            Self::TiledRoof => "Tiled Roof",
            Self::SheetRoof => "Sheet Roof",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ownership {
    Own,
    Rental,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EarthingType {
    Plate,
    Pipe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlSystem {
    #[serde(rename = "ELCB")]
    Elcb,
    #[serde(rename = "RCCB")]
    Rccb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeterType {
    Electromechanical,
    Digital,
    #[serde(rename = "TOD")]
    TimeOfDay,
}

impl MeterType {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "electromechanical" => Some(Self::Electromechanical),
            "digital" => Some(Self::Digital),
            "tod" => Some(Self::TimeOfDay),
            _ => None,
        }
    }
}

impl ConnectionNature {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single phase" => Some(Self::SinglePhase),
            "three phase" => Some(Self::ThreePhase),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(Self::Yes),
            "no" => Some(Self::No),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolarPlantType {
    #[serde(rename = "Off grid")]
    OffGrid,
    #[serde(rename = "On grid")]
    OnGrid,
    Hybrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CookingFuel {
    Firewood,
    #[serde(rename = "LPG Cylinder")]
    LpgCylinder,
    Biogas,
    #[serde(rename = "Induction Cooker")]
    InductionCooker,
    Others,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FuelUnit {
    Kg,
    Cylinders,
    Hours,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaterSource {
    #[serde(rename = "Open well")]
    OpenWell,
    #[serde(rename = "Bore well")]
    BoreWell,
    #[serde(rename = "Underground tank")]
    UndergroundTank,
    #[serde(rename = "Municipal water")]
    MunicipalWater,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleType {
    #[serde(rename = "2 wheeler")]
    TwoWheeler,
    #[serde(rename = "3 wheeler")]
    ThreeWheeler,
    Car,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleFuel {
    Petrol,
    Diesel,
    Electric,
}

/// Accepts `null`, `""`, numbers, and numeric strings; blanks and non-finite
/// strings become `None`.
pub(crate) fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => Ok(number.as_f64()),
        Some(Value::String(raw)) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            // "NaN" and "inf" parse but would poison every rollup; treat them as unset.
            trimmed
                .parse::<f64>()
                .map(|value| Some(value).filter(|value| value.is_finite()))
                .map_err(|_| serde::de::Error::custom(format!("'{raw}' is not a number")))
        }
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a number or blank, found {other}"
        ))),
    }
}

/// Blank strings from the form's empty choices deserialize as `None`.
pub(crate) fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
