mod projection;
mod rollups;
pub mod views;

pub use projection::{project, EnergyProjection};
pub use rollups::{
    bill_totals, cross_check, equipment_daily_kwh, top_consumers, BillTotals, ConsistencyCheck,
};
pub use views::{ConsumerShare, SurveySummary};

use serde::{Deserialize, Serialize};

/// Regional policy parameters feeding the rollups and the savings projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsPolicy {
    /// Tariff in currency units per kWh.
    pub cost_per_kwh: f64,
    /// Grid carbon intensity in kg CO2 per kWh.
    pub co2_kg_per_kwh: f64,
    /// Days covered by one bill entry.
    pub bill_period_days: f64,
    /// Relative difference tolerated between bill and appliance estimates.
    pub consistency_tolerance: f64,
    /// Appliances above this wattage are named in suggestion requests.
    pub high_power_watts: f64,
}

impl Default for MetricsPolicy {
    fn default() -> Self {
        Self {
            cost_per_kwh: 5.0,
            co2_kg_per_kwh: 0.79,
            bill_period_days: 60.0,
            consistency_tolerance: 0.10,
            high_power_watts: 500.0,
        }
    }
}
