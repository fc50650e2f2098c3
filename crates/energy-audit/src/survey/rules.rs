//! Field-level derivation rules. Each rule reads only its owning entity and
//! is safe to re-run any number of times.

use super::domain::{or_zero, BillEntry, EquipmentEntry, WaterUsage};

/// Electrical watts per mechanical horsepower.
pub const WATTS_PER_HORSEPOWER: f64 = 746.0;

pub const DAYS_PER_YEAR: f64 = 365.0;

/// Sum of the five charge components, unset components counting as zero.
pub fn bill_total(bill: &BillEntry) -> f64 {
    [
        bill.fixed_charge,
        bill.meter_rent,
        bill.energy_charges,
        bill.duty,
        bill.other_charges,
    ]
    .into_iter()
    .map(or_zero)
    .sum()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PumpEnergy {
    pub daily_kwh: f64,
    pub annual_kwh: f64,
}

/// Pump consumption, or `None` unless capacity, fill time and frequency are
/// all present and strictly positive.
pub fn pump_energy(usage: &WaterUsage) -> Option<PumpEnergy> {
    let capacity = positive(usage.pump_capacity)?;
    let fill_time = positive(usage.fill_time)?;
    let frequency = positive(usage.pump_frequency)?;

    let pump_watts = capacity * WATTS_PER_HORSEPOWER;
    let daily_wh = pump_watts * fill_time * frequency;
    let daily_kwh = daily_wh / 1000.0;
    let annual_kwh = daily_kwh * DAYS_PER_YEAR;

    Some(PumpEnergy {
        daily_kwh: round_to(daily_kwh, 3),
        annual_kwh: round_to(annual_kwh, 2),
    })
}

/// Daily energy in Wh; a row with only one input set still yields a number.
pub fn equipment_energy_wh(entry: &EquipmentEntry) -> f64 {
    or_zero(entry.daily_usage_hours) * or_zero(entry.power_watts)
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v > 0.0)
}

impl BillEntry {
    /// Copy of the row with `total` brought in line with its charges.
    pub fn recalculated(mut self) -> Self {
        self.total = Some(bill_total(&self));
        self
    }
}

impl WaterUsage {
    pub fn recalculated(mut self) -> Self {
        match pump_energy(&self) {
            Some(energy) => {
                self.daily_power_consumption = Some(energy.daily_kwh);
                self.annual_power_consumption = Some(energy.annual_kwh);
            }
            None => {
                self.daily_power_consumption = None;
                self.annual_power_consumption = None;
            }
        }
        self
    }
}

impl EquipmentEntry {
    pub fn recalculated(mut self) -> Self {
        self.energy_consumption_wh = Some(equipment_energy_wh(&self));
        self
    }
}
