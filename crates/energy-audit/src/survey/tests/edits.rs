use super::common::*;
use crate::assistant::{BillDetails, SuggestedSaving};
use crate::assistant::extraction::EXTRACTED_BILL_REMARK;
use crate::survey::domain::{EntryId, SurveyRecord, VehicleType};
use crate::survey::edits::{
    AppraiserField, BillField, ConnectionField, EditError, EquipmentField, ListKind, SurveyEdit,
    VehicleField, WaterField,
};
use crate::survey::metrics::SurveySummary;
use serde_json::json;

#[test]
fn apply_leaves_the_input_record_untouched() {
    let record = SurveyRecord::new();
    let next = record
        .apply(SurveyEdit::SetAppraiser {
            field: AppraiserField::Name("Meera".to_string()),
        })
        .expect("edit applies");

    assert_eq!(record, SurveyRecord::new());
    assert_eq!(next.appraiser_info.name, "Meera");
}

#[test]
fn new_record_starts_blank() {
    let record = SurveyRecord::new();
    assert!(record.id.is_none());
    assert!(!record.is_submitted());
    assert!(record.bill_estimations.is_empty());
    assert!(record.electricity_connection.building_area.is_none());
    assert!(record.water_usage.daily_power_consumption().is_none());
}

#[test]
fn water_edits_recompute_pump_consumption() {
    let record = apply_all(
        &SurveyRecord::new(),
        vec![
            SurveyEdit::SetWater {
                field: WaterField::PumpCapacity(Some(0.5)),
            },
            SurveyEdit::SetWater {
                field: WaterField::FillTime(Some(2.0)),
            },
        ],
    );
    assert!(record.water_usage.daily_power_consumption().is_none());

    let record = apply_all(
        &record,
        vec![SurveyEdit::SetWater {
            field: WaterField::PumpFrequency(Some(3.0)),
        }],
    );
    assert_eq!(record.water_usage.daily_power_consumption(), Some(2.238));
    assert_eq!(record.water_usage.annual_power_consumption(), Some(816.87));

    let cleared = apply_all(
        &record,
        vec![SurveyEdit::SetWater {
            field: WaterField::FillTime(None),
        }],
    );
    assert!(cleared.water_usage.daily_power_consumption().is_none());
    assert!(cleared.water_usage.annual_power_consumption().is_none());
}

#[test]
fn bill_charge_edits_recompute_total() {
    let record = apply_all(
        &SurveyRecord::new(),
        vec![
            SurveyEdit::AddBill,
            SurveyEdit::UpdateBill {
                index: 0,
                field: BillField::FixedCharge(Some(310.0)),
            },
            SurveyEdit::UpdateBill {
                index: 0,
                field: BillField::MeterRent(Some(35.0)),
            },
            SurveyEdit::UpdateBill {
                index: 0,
                field: BillField::EnergyCharges(Some(561.9)),
            },
            SurveyEdit::UpdateBill {
                index: 0,
                field: BillField::Duty(Some(56.19)),
            },
            SurveyEdit::UpdateBill {
                index: 0,
                field: BillField::OtherCharges(Some(10.72)),
            },
        ],
    );

    let total = record.bill_estimations[0].total().expect("total computed");
    assert_close(total, 973.81);
}

#[test]
fn non_charge_bill_edits_keep_total_as_is() {
    let record = apply_all(
        &SurveyRecord::new(),
        vec![
            SurveyEdit::AddBill,
            SurveyEdit::UpdateBill {
                index: 0,
                field: BillField::Period("Jan-Feb 2024".to_string()),
            },
            SurveyEdit::UpdateBill {
                index: 0,
                field: BillField::Consumption(Some(180.0)),
            },
        ],
    );

    let bill = &record.bill_estimations[0];
    assert_eq!(bill.period, "Jan-Feb 2024");
    assert_eq!(bill.consumption, Some(180.0));
    assert_eq!(bill.total(), None);
}

#[test]
fn equipment_edits_recompute_energy() {
    let record = with_equipment(&[("Ceiling Fan", 10.0, 75.0)]);
    assert_eq!(
        record.equipment_estimations[0].energy_consumption_wh(),
        Some(750.0)
    );

    let renamed = apply_all(
        &record,
        vec![SurveyEdit::UpdateEquipment {
            index: 0,
            field: EquipmentField::Remarks("bedroom".to_string()),
        }],
    );
    assert_eq!(
        renamed.equipment_estimations[0].energy_consumption_wh(),
        Some(750.0)
    );
}

#[test]
fn preset_equipment_seeds_watts_and_zero_energy() {
    let record = apply_all(
        &SurveyRecord::new(),
        vec![SurveyEdit::AddPresetEquipment {
            name: "refrigerator".to_string(),
        }],
    );

    let entry = &record.equipment_estimations[0];
    assert_eq!(entry.equipment, "Refrigerator");
    assert_eq!(entry.power_watts, Some(200.0));
    assert_eq!(entry.daily_usage_hours, None);
    assert_eq!(entry.energy_consumption_wh(), Some(0.0));
}

#[test]
fn unknown_preset_is_rejected() {
    let error = SurveyRecord::new()
        .apply(SurveyEdit::AddPresetEquipment {
            name: "Hot Tub".to_string(),
        })
        .expect_err("unknown preset");
    assert_eq!(error, EditError::UnknownPreset("Hot Tub".to_string()));
}

#[test]
fn appended_rows_get_distinct_ids() {
    let record = apply_all(
        &SurveyRecord::new(),
        vec![SurveyEdit::AddBill, SurveyEdit::AddBill, SurveyEdit::AddBill],
    );

    let ids: Vec<&EntryId> = record.bill_estimations.iter().map(|bill| &bill.id).collect();
    assert_eq!(ids.len(), 3);
    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
    assert_ne!(ids[0], ids[2]);
    assert!(ids.iter().all(|id| id.as_str().starts_with("bill-")));
}

#[test]
fn remove_by_id_keeps_order_of_remaining_rows() {
    let record = with_bill_consumptions(&[134.0, 158.0, 161.0]);
    let middle = record.bill_estimations[1].id.clone();

    let next = record
        .apply(SurveyEdit::RemoveBill { id: middle })
        .expect("bill removed");

    let consumptions: Vec<Option<f64>> = next
        .bill_estimations
        .iter()
        .map(|bill| bill.consumption)
        .collect();
    assert_eq!(consumptions, vec![Some(134.0), Some(161.0)]);
}

#[test]
fn remove_by_unknown_id_reports_missing_entry() {
    let record = with_bill_consumptions(&[134.0]);
    let error = record
        .apply(SurveyEdit::RemoveBill {
            id: EntryId("bill-missing".to_string()),
        })
        .expect_err("unknown id");

    assert_eq!(
        error,
        EditError::EntryNotFound {
            list: ListKind::Bills,
            id: EntryId("bill-missing".to_string()),
        }
    );
    assert!(error.to_string().contains("bill-missing"));
}

#[test]
fn index_edits_out_of_range_are_rejected() {
    let record = apply_all(&SurveyRecord::new(), vec![SurveyEdit::AddVehicle]);

    let error = record
        .apply(SurveyEdit::UpdateVehicle {
            index: 3,
            field: VehicleField::MonthlyUsageKm(Some(400.0)),
        })
        .expect_err("index out of range");
    assert_eq!(
        error,
        EditError::IndexOutOfRange {
            list: ListKind::Vehicles,
            index: 3,
            len: 1,
        }
    );

    let error = record
        .apply(SurveyEdit::RemoveFuel { index: 0 })
        .expect_err("no fuel rows");
    assert!(matches!(
        error,
        EditError::IndexOutOfRange {
            list: ListKind::CookingFuels,
            ..
        }
    ));
}

#[test]
fn vehicle_and_fuel_rows_use_defaults() {
    let record = apply_all(
        &SurveyRecord::new(),
        vec![SurveyEdit::AddVehicle, SurveyEdit::AddFuel],
    );
    assert_eq!(record.vehicle_usage[0].vehicle_type, VehicleType::TwoWheeler);
    assert!(record.fuel_for_cooking[0].consumption.is_none());

    let next = record
        .apply(SurveyEdit::RemoveVehicle { index: 0 })
        .expect("vehicle removed");
    assert!(next.vehicle_usage.is_empty());
    assert_eq!(next.fuel_for_cooking.len(), 1);
}

#[test]
fn extracted_bill_is_appended_with_default_remark() {
    let bill = BillDetails {
        bill_number: "B-1".to_string(),
        consumption: 240.0,
        energy_charges: 900.0,
        total: 900.0,
        ..BillDetails::default()
    };

    let record = SurveyRecord::new()
        .apply(SurveyEdit::AddExtractedBill { bill })
        .expect("bill appended");

    let entry = &record.bill_estimations[0];
    assert_eq!(entry.remarks, EXTRACTED_BILL_REMARK);
    assert_eq!(entry.consumption, Some(240.0));
    assert_eq!(entry.total(), Some(900.0));
}

#[test]
fn replacing_saving_opportunities_discards_previous_rows() {
    let record = apply_all(
        &SurveyRecord::new(),
        vec![SurveyEdit::AddSavingOpportunity, SurveyEdit::AddSavingOpportunity],
    );

    let suggestions = vec![SuggestedSaving {
        suggestion: "Use a pressure cooker".to_string(),
        energy_saving_wh: 120.0,
        investment: 1500.0,
        payback_months: 10.0,
        remarks: String::new(),
    }];

    let next = record
        .apply(SurveyEdit::ReplaceSavingOpportunities { suggestions })
        .expect("replaced");
    assert_eq!(next.saving_opportunities.len(), 1);
    assert_eq!(next.saving_opportunities[0].energy_saving_wh, Some(120.0));
    assert!(next.saving_opportunities[0]
        .id
        .as_str()
        .starts_with("saving-"));
}

#[test]
fn edits_deserialize_from_tagged_json() {
    let edit: SurveyEdit = serde_json::from_value(json!({
        "op": "update_bill",
        "index": 0,
        "field": { "name": "fixedCharge", "value": 310 }
    }))
    .expect("edit parses");
    assert_eq!(
        edit,
        SurveyEdit::UpdateBill {
            index: 0,
            field: BillField::FixedCharge(Some(310.0)),
        }
    );

    let edit: SurveyEdit = serde_json::from_value(json!({
        "op": "set_connection",
        "field": { "name": "buildingArea", "value": null }
    }))
    .expect("edit parses");
    assert_eq!(
        edit,
        SurveyEdit::SetConnection {
            field: ConnectionField::BuildingArea(None),
        }
    );
}

#[test]
fn records_accept_blank_strings_for_unset_values() {
    let record: SurveyRecord = serde_json::from_value(json!({
        "electricityConnection": {
            "consumerName": "Anitha R",
            "buildingArea": "",
            "familyMembers": "4",
            "buildingType": ""
        },
        "billEstimations": [
            { "id": "bill-1", "consumption": "134", "total": "" }
        ]
    }))
    .expect("record parses");

    assert_eq!(record.electricity_connection.building_area, None);
    assert_eq!(record.electricity_connection.family_members, Some(4.0));
    assert_eq!(record.electricity_connection.building_type, None);
    assert_eq!(record.bill_estimations[0].consumption, Some(134.0));
    assert_eq!(record.bill_estimations[0].total(), None);
}

#[test]
fn non_finite_number_strings_load_as_unset() {
    let record: SurveyRecord = serde_json::from_value(json!({
        "billEstimations": [
            { "id": "bill-1", "consumption": "inf" },
            { "id": "bill-2", "consumption": "134" }
        ],
        "equipmentEstimations": [
            { "id": "equipment-1", "equipment": "Heater", "powerWatts": "NaN" }
        ],
        "waterUsage": { "pumpCapacity": "-infinity" }
    }))
    .expect("record parses");

    assert_eq!(record.bill_estimations[0].consumption, None);
    assert_eq!(record.equipment_estimations[0].power_watts, None);
    assert_eq!(record.water_usage.pump_capacity, None);

    let record = apply_all(
        &record,
        vec![SurveyEdit::UpdateEquipment {
            index: 0,
            field: EquipmentField::DailyUsageHours(Some(2.0)),
        }],
    );
    assert_eq!(
        record.equipment_estimations[0].energy_consumption_wh(),
        Some(0.0)
    );

    let summary = SurveySummary::from_record(&record, &policy());
    assert_eq!(summary.bills.consumption_kwh, 134.0);
    assert!(summary.average_daily_consumption_kwh.is_finite());
    assert_eq!(summary.equipment_daily_kwh, 0.0);
}
