//! Edit commands. An edit is the user's intent as data; applying it never
//! touches the input record and returns the next record with every affected
//! derived field recomputed.

use super::domain::{
    find_appliance_preset, Answer, BuildingType, BillEntry, ConnectionNature, ControlSystem,
    CookingFuel, EarthingType, EntryId, EquipmentEntry, FuelForCooking, FuelUnit, MeterType,
    Ownership, SavingOpportunity, SolarPlantDetail, SolarPlantType, SurveyRecord, VehicleFuel,
    VehicleType, VehicleUsage, WaterSource,
};
use super::lists::{appended, fresh_id, removed_at, removed_by_id, updated_at};
use crate::assistant::extraction::BillDetails;
use crate::assistant::suggestions::SuggestedSaving;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurveyEdit {
    SetAppraiser { field: AppraiserField },
    SetConnection { field: ConnectionField },
    SetWater { field: WaterField },
    AddSolarPlant,
    UpdateSolarPlant { index: usize, field: SolarPlantField },
    RemoveSolarPlant { id: EntryId },
    AddFuel,
    UpdateFuel { index: usize, field: FuelField },
    RemoveFuel { index: usize },
    AddVehicle,
    UpdateVehicle { index: usize, field: VehicleField },
    RemoveVehicle { index: usize },
    AddBill,
    AddExtractedBill { bill: BillDetails },
    UpdateBill { index: usize, field: BillField },
    RemoveBill { id: EntryId },
    AddEquipment,
    AddPresetEquipment { name: String },
    UpdateEquipment { index: usize, field: EquipmentField },
    RemoveEquipment { id: EntryId },
    AddSavingOpportunity,
    UpdateSavingOpportunity { index: usize, field: SavingField },
    RemoveSavingOpportunity { id: EntryId },
    ReplaceSavingOpportunities { suggestions: Vec<SuggestedSaving> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "camelCase")]
pub enum AppraiserField {
    Name(String),
    EnrollmentId(String),
    UnitNo(String),
    CollegeName(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "camelCase")]
pub enum ConnectionField {
    ConsumerName(String),
    FamilyMembers(Option<f64>),
    ConsumerNumber(String),
    TariffCategory(String),
    ElectricalSection(String),
    ConnectedLoadWatts(Option<f64>),
    ConnectionNature(Option<ConnectionNature>),
    BuildingType(Option<BuildingType>),
    Ownership(Option<Ownership>),
    Floors(Option<f64>),
    BuildingArea(Option<f64>),
    EarthingType(Option<EarthingType>),
    ControlSystems(Option<ControlSystem>),
    McbCount(Option<f64>),
    EnergyMeterType(Option<MeterType>),
    SolarInstalled(Option<Answer>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "camelCase")]
pub enum WaterField {
    Source(Option<WaterSource>),
    MunicipalConsumption(Option<f64>),
    MunicipalBill(Option<f64>),
    TankCapacity(Option<f64>),
    PumpCapacity(Option<f64>),
    FillTime(Option<f64>),
    PumpFrequency(Option<f64>),
    Remarks(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "camelCase")]
pub enum SolarPlantField {
    #[serde(rename = "type")]
    PlantType(Option<SolarPlantType>),
    InstalledCapacity(Option<f64>),
    Remarks(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "camelCase")]
pub enum FuelField {
    #[serde(rename = "type")]
    FuelType(CookingFuel),
    Consumption(Option<f64>),
    Units(FuelUnit),
    Remarks(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "camelCase")]
pub enum VehicleField {
    #[serde(rename = "type")]
    VehicleType(VehicleType),
    FuelType(Option<VehicleFuel>),
    MonthlyUsageKm(Option<f64>),
    MonthlyFuelConsumption(Option<f64>),
    MonthlyFuelExpense(Option<f64>),
    Remarks(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "camelCase")]
pub enum BillField {
    BillNumber(String),
    Period(String),
    Consumption(Option<f64>),
    FixedCharge(Option<f64>),
    MeterRent(Option<f64>),
    EnergyCharges(Option<f64>),
    Duty(Option<f64>),
    OtherCharges(Option<f64>),
    Remarks(String),
}

impl BillField {
    pub fn affects_total(&self) -> bool {
        matches!(
            self,
            Self::FixedCharge(_)
                | Self::MeterRent(_)
                | Self::EnergyCharges(_)
                | Self::Duty(_)
                | Self::OtherCharges(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "camelCase")]
pub enum EquipmentField {
    Equipment(String),
    DailyUsageHours(Option<f64>),
    PowerWatts(Option<f64>),
    Remarks(String),
}

impl EquipmentField {
    pub fn affects_energy(&self) -> bool {
        matches!(self, Self::DailyUsageHours(_) | Self::PowerWatts(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "value", rename_all = "camelCase")]
pub enum SavingField {
    Suggestion(String),
    EnergySavingWh(Option<f64>),
    Investment(Option<f64>),
    PaybackMonths(Option<f64>),
    Remarks(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    SolarPlants,
    CookingFuels,
    Vehicles,
    Bills,
    Equipment,
    SavingOpportunities,
}

impl ListKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::SolarPlants => "solar plant",
            Self::CookingFuels => "cooking fuel",
            Self::Vehicles => "vehicle",
            Self::Bills => "bill",
            Self::Equipment => "equipment",
            Self::SavingOpportunities => "saving opportunity",
        }
    }
}

impl fmt::Display for ListKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("{list} row {index} does not exist ({len} rows)")]
    IndexOutOfRange {
        list: ListKind,
        index: usize,
        len: usize,
    },
    #[error("{list} entry {} does not exist", .id.0)]
    EntryNotFound { list: ListKind, id: EntryId },
    #[error("'{0}' is not a common appliance preset")]
    UnknownPreset(String),
}

impl SurveyRecord {
    /// Applies one edit and returns the next record; `self` is left untouched.
    pub fn apply(&self, edit: SurveyEdit) -> Result<SurveyRecord, EditError> {
        apply(self, edit)
    }
}

pub fn apply(record: &SurveyRecord, edit: SurveyEdit) -> Result<SurveyRecord, EditError> {
    let mut next = record.clone();

    match edit {
        SurveyEdit::SetAppraiser { field } => {
            let info = &mut next.appraiser_info;
            match field {
                AppraiserField::Name(value) => info.name = value,
                AppraiserField::EnrollmentId(value) => info.enrollment_id = value,
                AppraiserField::UnitNo(value) => info.unit_no = value,
                AppraiserField::CollegeName(value) => info.college_name = value,
            }
        }
        SurveyEdit::SetConnection { field } => set_connection(&mut next, field),
        SurveyEdit::SetWater { field } => {
            let mut water = record.water_usage.clone();
            match field {
                WaterField::Source(value) => water.source = value,
                WaterField::MunicipalConsumption(value) => water.municipal_consumption = value,
                WaterField::MunicipalBill(value) => water.municipal_bill = value,
                WaterField::TankCapacity(value) => water.tank_capacity = value,
                WaterField::PumpCapacity(value) => water.pump_capacity = value,
                WaterField::FillTime(value) => water.fill_time = value,
                WaterField::PumpFrequency(value) => water.pump_frequency = value,
                WaterField::Remarks(value) => water.remarks = value,
            }
            next.water_usage = water.recalculated();
        }
        SurveyEdit::AddSolarPlant => {
            let id = fresh_id(&record.solar_plant_details);
            next.solar_plant_details =
                appended(&record.solar_plant_details, SolarPlantDetail::blank(id));
        }
        SurveyEdit::UpdateSolarPlant { index, field } => {
            next.solar_plant_details = updated_at(
                &record.solar_plant_details,
                ListKind::SolarPlants,
                index,
                |mut plant| {
                    match field {
                        SolarPlantField::PlantType(value) => plant.plant_type = value,
                        SolarPlantField::InstalledCapacity(value) => {
                            plant.installed_capacity = value
                        }
                        SolarPlantField::Remarks(value) => plant.remarks = value,
                    }
                    plant
                },
            )?;
        }
        SurveyEdit::RemoveSolarPlant { id } => {
            next.solar_plant_details =
                removed_by_id(&record.solar_plant_details, ListKind::SolarPlants, &id)?;
        }
        SurveyEdit::AddFuel => {
            next.fuel_for_cooking = appended(&record.fuel_for_cooking, FuelForCooking::default());
        }
        SurveyEdit::UpdateFuel { index, field } => {
            next.fuel_for_cooking = updated_at(
                &record.fuel_for_cooking,
                ListKind::CookingFuels,
                index,
                |mut fuel| {
                    match field {
                        FuelField::FuelType(value) => fuel.fuel_type = value,
                        FuelField::Consumption(value) => fuel.consumption = value,
                        FuelField::Units(value) => fuel.units = value,
                        FuelField::Remarks(value) => fuel.remarks = value,
                    }
                    fuel
                },
            )?;
        }
        SurveyEdit::RemoveFuel { index } => {
            next.fuel_for_cooking =
                removed_at(&record.fuel_for_cooking, ListKind::CookingFuels, index)?;
        }
        SurveyEdit::AddVehicle => {
            next.vehicle_usage = appended(&record.vehicle_usage, VehicleUsage::default());
        }
        SurveyEdit::UpdateVehicle { index, field } => {
            next.vehicle_usage = updated_at(
                &record.vehicle_usage,
                ListKind::Vehicles,
                index,
                |mut vehicle| {
                    match field {
                        VehicleField::VehicleType(value) => vehicle.vehicle_type = value,
                        VehicleField::FuelType(value) => vehicle.fuel_type = value,
                        VehicleField::MonthlyUsageKm(value) => vehicle.monthly_usage_km = value,
                        VehicleField::MonthlyFuelConsumption(value) => {
                            vehicle.monthly_fuel_consumption = value
                        }
                        VehicleField::MonthlyFuelExpense(value) => {
                            vehicle.monthly_fuel_expense = value
                        }
                        VehicleField::Remarks(value) => vehicle.remarks = value,
                    }
                    vehicle
                },
            )?;
        }
        SurveyEdit::RemoveVehicle { index } => {
            next.vehicle_usage = removed_at(&record.vehicle_usage, ListKind::Vehicles, index)?;
        }
        SurveyEdit::AddBill => {
            let id = fresh_id(&record.bill_estimations);
            next.bill_estimations = appended(&record.bill_estimations, BillEntry::blank(id));
        }
        SurveyEdit::AddExtractedBill { bill } => {
            let id = fresh_id(&record.bill_estimations);
            next.bill_estimations = appended(&record.bill_estimations, bill.into_bill_entry(id));
        }
        SurveyEdit::UpdateBill { index, field } => {
            next.bill_estimations =
                updated_at(&record.bill_estimations, ListKind::Bills, index, |bill| {
                    update_bill(bill, field)
                })?;
        }
        SurveyEdit::RemoveBill { id } => {
            next.bill_estimations = removed_by_id(&record.bill_estimations, ListKind::Bills, &id)?;
        }
        SurveyEdit::AddEquipment => {
            let id = fresh_id(&record.equipment_estimations);
            next.equipment_estimations =
                appended(&record.equipment_estimations, EquipmentEntry::blank(id));
        }
        SurveyEdit::AddPresetEquipment { name } => {
            let preset = find_appliance_preset(&name).ok_or(EditError::UnknownPreset(name))?;
            let id = fresh_id(&record.equipment_estimations);
            next.equipment_estimations = appended(
                &record.equipment_estimations,
                EquipmentEntry::from_preset(id, preset),
            );
        }
        SurveyEdit::UpdateEquipment { index, field } => {
            next.equipment_estimations = updated_at(
                &record.equipment_estimations,
                ListKind::Equipment,
                index,
                |entry| update_equipment(entry, field),
            )?;
        }
        SurveyEdit::RemoveEquipment { id } => {
            next.equipment_estimations =
                removed_by_id(&record.equipment_estimations, ListKind::Equipment, &id)?;
        }
        SurveyEdit::AddSavingOpportunity => {
            let id = fresh_id(&record.saving_opportunities);
            next.saving_opportunities =
                appended(&record.saving_opportunities, SavingOpportunity::blank(id));
        }
        SurveyEdit::UpdateSavingOpportunity { index, field } => {
            next.saving_opportunities = updated_at(
                &record.saving_opportunities,
                ListKind::SavingOpportunities,
                index,
                |mut saving| {
                    match field {
                        SavingField::Suggestion(value) => saving.suggestion = value,
                        SavingField::EnergySavingWh(value) => saving.energy_saving_wh = value,
                        SavingField::Investment(value) => saving.investment = value,
                        SavingField::PaybackMonths(value) => saving.payback_months = value,
                        SavingField::Remarks(value) => saving.remarks = value,
                    }
                    saving
                },
            )?;
        }
        SurveyEdit::RemoveSavingOpportunity { id } => {
            next.saving_opportunities = removed_by_id(
                &record.saving_opportunities,
                ListKind::SavingOpportunities,
                &id,
            )?;
        }
        SurveyEdit::ReplaceSavingOpportunities { suggestions } => {
            let mut replaced: Vec<SavingOpportunity> = Vec::with_capacity(suggestions.len());
            for suggestion in suggestions {
                let id = fresh_id(&replaced);
                replaced.push(suggestion.into_opportunity(id));
            }
            next.saving_opportunities = replaced;
        }
    }

    Ok(next)
}

fn set_connection(record: &mut SurveyRecord, field: ConnectionField) {
    let connection = &mut record.electricity_connection;
    match field {
        ConnectionField::ConsumerName(value) => connection.consumer_name = value,
        ConnectionField::FamilyMembers(value) => connection.family_members = value,
        ConnectionField::ConsumerNumber(value) => connection.consumer_number = value,
        ConnectionField::TariffCategory(value) => connection.tariff_category = value,
        ConnectionField::ElectricalSection(value) => connection.electrical_section = value,
        ConnectionField::ConnectedLoadWatts(value) => connection.connected_load_watts = value,
        ConnectionField::ConnectionNature(value) => connection.connection_nature = value,
        ConnectionField::BuildingType(value) => connection.building_type = value,
        ConnectionField::Ownership(value) => connection.ownership = value,
        ConnectionField::Floors(value) => connection.floors = value,
        ConnectionField::BuildingArea(value) => connection.building_area = value,
        ConnectionField::EarthingType(value) => connection.earthing_type = value,
        ConnectionField::ControlSystems(value) => connection.control_systems = value,
        ConnectionField::McbCount(value) => connection.mcb_count = value,
        ConnectionField::EnergyMeterType(value) => connection.energy_meter_type = value,
        ConnectionField::SolarInstalled(value) => connection.solar_installed = value,
    }
}

fn update_bill(mut bill: BillEntry, field: BillField) -> BillEntry {
    let recompute = field.affects_total();
    match field {
        BillField::BillNumber(value) => bill.bill_number = value,
        BillField::Period(value) => bill.period = value,
        BillField::Consumption(value) => bill.consumption = value,
        BillField::FixedCharge(value) => bill.fixed_charge = value,
        BillField::MeterRent(value) => bill.meter_rent = value,
        BillField::EnergyCharges(value) => bill.energy_charges = value,
        BillField::Duty(value) => bill.duty = value,
        BillField::OtherCharges(value) => bill.other_charges = value,
        BillField::Remarks(value) => bill.remarks = value,
    }

    if recompute {
        bill.recalculated()
    } else {
        bill
    }
}

fn update_equipment(mut entry: EquipmentEntry, field: EquipmentField) -> EquipmentEntry {
    let recompute = field.affects_energy();
    match field {
        EquipmentField::Equipment(value) => entry.equipment = value,
        EquipmentField::DailyUsageHours(value) => entry.daily_usage_hours = value,
        EquipmentField::PowerWatts(value) => entry.power_watts = value,
        EquipmentField::Remarks(value) => entry.remarks = value,
    }

    if recompute {
        entry.recalculated()
    } else {
        entry
    }
}
