use super::projection::{project, EnergyProjection};
use super::rollups::{bill_totals, cross_check, equipment_daily_kwh, top_consumers};
use super::{BillTotals, ConsistencyCheck, MetricsPolicy};
use crate::survey::domain::{or_zero, SurveyRecord};
use serde::Serialize;

const TOP_CONSUMER_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsumerShare {
    pub equipment: String,
    pub daily_wh: f64,
}

/// Read-only projection of a record, rebuilt on every request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveySummary {
    pub bills: BillTotals,
    pub average_daily_consumption_kwh: f64,
    pub equipment_daily_kwh: f64,
    pub consistency: ConsistencyCheck,
    pub projection: EnergyProjection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pump_daily_kwh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pump_annual_kwh: Option<f64>,
    pub top_consumers: Vec<ConsumerShare>,
    pub warnings: Vec<String>,
}

impl SurveySummary {
    pub fn from_record(record: &SurveyRecord, policy: &MetricsPolicy) -> Self {
        let bills = bill_totals(&record.bill_estimations);
        let average_daily_consumption_kwh = bills.average_daily_consumption(policy);
        let equipment_daily_kwh = equipment_daily_kwh(&record.equipment_estimations);
        let consistency = cross_check(
            average_daily_consumption_kwh,
            equipment_daily_kwh,
            policy.consistency_tolerance,
        );

        let top_consumers = top_consumers(&record.equipment_estimations, TOP_CONSUMER_LIMIT)
            .into_iter()
            .map(|entry| ConsumerShare {
                equipment: entry.equipment.clone(),
                daily_wh: or_zero(entry.energy_consumption_wh()),
            })
            .collect();

        let mut summary = Self {
            bills,
            average_daily_consumption_kwh,
            equipment_daily_kwh,
            consistency,
            projection: project(record, policy),
            pump_daily_kwh: record.water_usage.daily_power_consumption(),
            pump_annual_kwh: record.water_usage.annual_power_consumption(),
            top_consumers,
            warnings: Vec::new(),
        };
        summary.warnings = summary.collect_warnings(record);
        summary
    }

    fn collect_warnings(&self, record: &SurveyRecord) -> Vec<String> {
        let mut warnings = Vec::new();

        if !self.consistency.consistent {
            warnings.push(format!(
                "bill estimate ({:.2} kWh/day) and appliance estimate ({:.2} kWh/day) differ by more than {:.0}%",
                self.consistency.bill_daily_kwh,
                self.consistency.equipment_daily_kwh,
                self.consistency.tolerance * 100.0
            ));
        }

        if or_zero(record.electricity_connection.building_area) <= 0.0 {
            warnings.push("building area is not set; EPI is reported as 0".to_string());
        }

        warnings
    }
}
