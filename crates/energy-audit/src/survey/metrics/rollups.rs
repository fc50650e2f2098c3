use super::MetricsPolicy;
use crate::survey::domain::{or_zero, BillEntry, EquipmentEntry};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct BillTotals {
    pub entries: usize,
    pub consumption_kwh: f64,
    pub amount: f64,
}

impl BillTotals {
    /// Bill-derived daily consumption (A); zero when there are no bills.
    pub fn average_daily_consumption(&self, policy: &MetricsPolicy) -> f64 {
        let days = self.entries as f64 * policy.bill_period_days;
        if days > 0.0 {
            self.consumption_kwh / days
        } else {
            0.0
        }
    }

    /// Mean consumption per bill entry.
    pub fn average_consumption_per_bill(&self) -> f64 {
        if self.entries == 0 {
            0.0
        } else {
            self.consumption_kwh / self.entries as f64
        }
    }
}

pub fn bill_totals(bills: &[BillEntry]) -> BillTotals {
    bills
        .iter()
        .fold(BillTotals::default(), |mut totals, bill| {
            totals.entries += 1;
            totals.consumption_kwh += or_zero(bill.consumption);
            totals.amount += or_zero(bill.total());
            totals
        })
}

/// Appliance-derived daily consumption (B) in kWh.
pub fn equipment_daily_kwh(equipment: &[EquipmentEntry]) -> f64 {
    let total_wh: f64 = equipment
        .iter()
        .map(|entry| or_zero(entry.energy_consumption_wh()))
        .sum();
    total_wh / 1000.0
}

/// Comparison of the two independent daily estimates. A mismatch is a data
/// quality warning for the reviewer, never a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConsistencyCheck {
    pub bill_daily_kwh: f64,
    pub equipment_daily_kwh: f64,
    pub difference_kwh: f64,
    pub tolerance: f64,
    pub consistent: bool,
}

/// Flags the pair when the gap exceeds `tolerance` of either estimate.
pub fn cross_check(
    bill_daily_kwh: f64,
    equipment_daily_kwh: f64,
    tolerance: f64,
) -> ConsistencyCheck {
    let difference_kwh = (bill_daily_kwh - equipment_daily_kwh).abs();
    let smaller = bill_daily_kwh.abs().min(equipment_daily_kwh.abs());
    let consistent = difference_kwh <= tolerance * smaller || difference_kwh == 0.0;

    ConsistencyCheck {
        bill_daily_kwh,
        equipment_daily_kwh,
        difference_kwh,
        tolerance,
        consistent,
    }
}

/// Named appliances with non-zero energy, largest first.
pub fn top_consumers(equipment: &[EquipmentEntry], limit: usize) -> Vec<&EquipmentEntry> {
    let mut ranked: Vec<&EquipmentEntry> = equipment
        .iter()
        .filter(|entry| {
            !entry.equipment.trim().is_empty() && or_zero(entry.energy_consumption_wh()) != 0.0
        })
        .collect();

    ranked.sort_by(|a, b| {
        or_zero(b.energy_consumption_wh())
            .partial_cmp(&or_zero(a.energy_consumption_wh()))
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(limit);
    ranked
}
