use super::rollups::equipment_daily_kwh;
use super::MetricsPolicy;
use crate::survey::domain::{or_zero, SurveyRecord};
use crate::survey::rules::DAYS_PER_YEAR;
use serde::Serialize;

/// Energy Performance Index before and after the proposed savings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyProjection {
    pub daily_consumption_kwh: f64,
    pub annual_consumption_kwh: f64,
    pub building_area: f64,
    pub present_epi: f64,
    pub daily_saving_wh: f64,
    pub annual_saving_kwh: f64,
    pub reduced_annual_consumption_kwh: f64,
    pub projected_epi: f64,
    pub annual_bill_reduction: f64,
    pub co2_reduction_kg: f64,
}

pub fn project(record: &SurveyRecord, policy: &MetricsPolicy) -> EnergyProjection {
    let daily_consumption_kwh = equipment_daily_kwh(&record.equipment_estimations);
    let annual_consumption_kwh = daily_consumption_kwh * DAYS_PER_YEAR;
    let building_area = or_zero(record.electricity_connection.building_area);

    let daily_saving_wh: f64 = record
        .saving_opportunities
        .iter()
        .map(|saving| or_zero(saving.energy_saving_wh))
        .sum();
    let annual_saving_kwh = daily_saving_wh * DAYS_PER_YEAR / 1000.0;
    let reduced_annual_consumption_kwh = annual_consumption_kwh - annual_saving_kwh;

    EnergyProjection {
        daily_consumption_kwh,
        annual_consumption_kwh,
        building_area,
        present_epi: per_area(annual_consumption_kwh, building_area),
        daily_saving_wh,
        annual_saving_kwh,
        reduced_annual_consumption_kwh,
        projected_epi: per_area(reduced_annual_consumption_kwh, building_area),
        annual_bill_reduction: annual_saving_kwh * policy.cost_per_kwh,
        co2_reduction_kg: annual_saving_kwh * policy.co2_kg_per_kwh,
    }
}

fn per_area(annual_kwh: f64, area: f64) -> f64 {
    if area > 0.0 {
        annual_kwh / area
    } else {
        0.0
    }
}
