//! Household energy-audit survey: the record, the rules that keep its derived
//! fields consistent, list edits, rollups and the service/router pair that
//! exposes them.

pub mod domain;
pub mod edits;
pub mod export;
pub(crate) mod lists;
pub mod metrics;
pub mod repository;
pub mod router;
pub mod rules;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    find_appliance_preset, AppliancePreset, AppraiserInfo, BillEntry, ElectricityConnection,
    EntryId, EquipmentEntry, FuelForCooking, SavingOpportunity, SolarPlantDetail, SurveyId,
    SurveyRecord, VehicleUsage, WaterUsage, COMMON_APPLIANCES,
};
pub use edits::{
    AppraiserField, BillField, ConnectionField, EditError, EquipmentField, FuelField, ListKind,
    SavingField, SolarPlantField, SurveyEdit, VehicleField, WaterField,
};
pub use export::{write_csv, ExportError, ExportRow};
pub use metrics::{MetricsPolicy, SurveySummary};
pub use repository::{RepositoryError, SurveyRepository};
pub use router::survey_router;
pub use rules::{bill_total, equipment_energy_wh, pump_energy, PumpEnergy};
pub use service::{SurveyService, SurveyServiceError};
