use crate::infra::{guess_mime_type, ConfiguredAssistant, InMemorySurveyRepository};
use clap::Args;
use energy_audit::assistant::DocumentUpload;
use energy_audit::config::AssistantMode;
use energy_audit::error::AppError;
use energy_audit::survey::domain::{
    Answer, BuildingType, ConnectionNature, ControlSystem, CookingFuel, EarthingType, FuelUnit,
    MeterType, Ownership, SolarPlantType, WaterSource,
};
use energy_audit::survey::{
    AppraiserField, BillField, ConnectionField, EquipmentField, FuelField, MetricsPolicy,
    SolarPlantField, SurveyEdit, SurveyRecord, SurveyService, SurveySummary, WaterField,
};
use std::path::PathBuf;
use std::sync::Arc;

type DemoService = SurveyService<InMemorySurveyRepository, ConfiguredAssistant>;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Electricity bill to try with the bill reader before the manual entries.
    #[arg(long)]
    pub(crate) bill: Option<PathBuf>,
}

struct DemoBill {
    number: &'static str,
    period: &'static str,
    consumption: f64,
    charges: [f64; 5],
    remarks: &'static str,
}

const DEMO_BILLS: [DemoBill; 3] = [
    DemoBill {
        number: "5604250502814",
        period: "May 2025",
        consumption: 134.0,
        charges: [310.0, 35.0, 561.9, 56.19, 10.72],
        remarks: "",
    },
    DemoBill {
        number: "5604250600505",
        period: "June 2025",
        consumption: 158.0,
        charges: [260.0, 35.0, 705.1, 70.51, 7.9],
        remarks: "",
    },
    DemoBill {
        number: "5604250700577",
        period: "July 2025",
        consumption: 161.0,
        charges: [235.0, 35.0, 0.0, 0.0, 0.0],
        remarks: "No energy charge listed; likely covered by solar export",
    },
];

const DEMO_EQUIPMENT: [(&str, f64); 6] = [
    ("Ceiling Fan", 10.0),
    ("Refrigerator", 12.0),
    ("LED Bulb", 6.0),
    ("Television (LED)", 4.0),
    ("Water Pump (0.5HP)", 1.0),
    ("AC (1 Ton)", 3.0),
];

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let service: DemoService = SurveyService::new(
        Arc::new(InMemorySurveyRepository::default()),
        Arc::new(ConfiguredAssistant::from_mode(AssistantMode::Offline)),
        MetricsPolicy::default(),
    );

    println!("Household energy audit demo");
    let mut record = apply_all(&service, &SurveyRecord::new(), household_edits())?;

    if let Some(path) = args.bill {
        let upload = DocumentUpload::new(std::fs::read(&path)?, guess_mime_type(&path));
        match service.extract_bill(&record, upload) {
            Ok((updated, details)) => {
                println!(
                    "- Bill reader added bill {} ({} kWh)",
                    details.bill_details.bill_number, details.bill_details.consumption
                );
                record = updated;
            }
            Err(error) => println!("- Bill reader unavailable for {}: {error}", path.display()),
        }
    }

    record = apply_all(&service, &record, bill_edits(record.bill_estimations.len()))?;
    record = apply_all(&service, &record, equipment_edits())?;

    println!("\nSurvey before suggestions");
    render_summary(&service.summarize(&record));

    record = service.suggest_savings(&record)?;
    println!("\nSaving opportunities");
    for saving in &record.saving_opportunities {
        println!(
            "- {} | {:.0} Wh/day | ₹{:.0} | {:.0} months payback",
            saving.suggestion,
            saving.energy_saving_wh.unwrap_or_default(),
            saving.investment.unwrap_or_default(),
            saving.payback_months.unwrap_or_default(),
        );
    }

    println!("\nSurvey after suggestions");
    render_summary(&service.summarize(&record));

    let submitted = service.submit(record)?;
    println!(
        "\nSubmitted as {} on {}",
        submitted.id.as_ref().map(|id| id.0.as_str()).unwrap_or("?"),
        submitted
            .submission_date
            .map(|date| date.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_default()
    );

    println!("\nCSV export");
    let mut stdout = std::io::stdout().lock();
    service.export_csv(&mut stdout)?;
    Ok(())
}

fn apply_all(
    service: &DemoService,
    record: &SurveyRecord,
    edits: Vec<SurveyEdit>,
) -> Result<SurveyRecord, AppError> {
    edits.into_iter().try_fold(record.clone(), |current, edit| {
        service.edit(&current, edit).map_err(AppError::from)
    })
}

fn household_edits() -> Vec<SurveyEdit> {
    use ConnectionField as C;

    let appraiser = [
        AppraiserField::Name("Ashwin Harikumar".to_string()),
        AppraiserField::EnrollmentId("SCM23CS077".to_string()),
        AppraiserField::UnitNo("Unit-328".to_string()),
        AppraiserField::CollegeName("SCMS School of Engineering and Technology".to_string()),
    ]
    .into_iter()
    .map(|field| SurveyEdit::SetAppraiser { field });

    let connection = [
        C::ConsumerName("Vijayalakshmi".to_string()),
        C::FamilyMembers(Some(6.0)),
        C::ConsumerNumber("1156047011364".to_string()),
        C::TariffCategory("LT-1".to_string()),
        C::ElectricalSection("Electrical Section North Paravur".to_string()),
        C::ConnectedLoadWatts(Some(6790.0)),
        C::ConnectionNature(Some(ConnectionNature::ThreePhase)),
        C::BuildingType(Some(BuildingType::Concrete)),
        C::Ownership(Some(Ownership::Own)),
        C::Floors(Some(2.0)),
        C::BuildingArea(Some(2000.0)),
        C::EarthingType(Some(EarthingType::Pipe)),
        C::ControlSystems(Some(ControlSystem::Elcb)),
        C::McbCount(Some(6.0)),
        C::EnergyMeterType(Some(MeterType::Digital)),
        C::SolarInstalled(Some(Answer::Yes)),
    ]
    .into_iter()
    .map(|field| SurveyEdit::SetConnection { field });

    let solar = [
        SurveyEdit::AddSolarPlant,
        SurveyEdit::UpdateSolarPlant {
            index: 0,
            field: SolarPlantField::PlantType(Some(SolarPlantType::OnGrid)),
        },
        SurveyEdit::UpdateSolarPlant {
            index: 0,
            field: SolarPlantField::InstalledCapacity(Some(3.0)),
        },
        SurveyEdit::UpdateSolarPlant {
            index: 0,
            field: SolarPlantField::Remarks("Operational since April 2021".to_string()),
        },
    ];

    let cooking = [
        SurveyEdit::AddFuel,
        SurveyEdit::UpdateFuel {
            index: 0,
            field: FuelField::FuelType(CookingFuel::LpgCylinder),
        },
        SurveyEdit::UpdateFuel {
            index: 0,
            field: FuelField::Consumption(Some(1.0)),
        },
        SurveyEdit::UpdateFuel {
            index: 0,
            field: FuelField::Units(FuelUnit::Cylinders),
        },
    ];

    let water = [
        WaterField::Source(Some(WaterSource::MunicipalWater)),
        WaterField::TankCapacity(Some(1000.0)),
        WaterField::PumpCapacity(Some(0.5)),
        WaterField::FillTime(Some(0.75)),
        WaterField::PumpFrequency(Some(1.0)),
    ]
    .into_iter()
    .map(|field| SurveyEdit::SetWater { field });

    appraiser
        .chain(connection)
        .chain(solar)
        .chain(cooking)
        .chain(water)
        .collect()
}

fn bill_edits(offset: usize) -> Vec<SurveyEdit> {
    DEMO_BILLS
        .iter()
        .enumerate()
        .flat_map(|(position, bill)| {
            let index = offset + position;
            let [fixed, rent, energy, duty, other] = bill.charges;
            let fields = [
                BillField::BillNumber(bill.number.to_string()),
                BillField::Period(bill.period.to_string()),
                BillField::Consumption(Some(bill.consumption)),
                BillField::FixedCharge(Some(fixed)),
                BillField::MeterRent(Some(rent)),
                BillField::EnergyCharges(Some(energy)),
                BillField::Duty(Some(duty)),
                BillField::OtherCharges(Some(other)),
                BillField::Remarks(bill.remarks.to_string()),
            ];
            std::iter::once(SurveyEdit::AddBill).chain(
                fields
                    .into_iter()
                    .map(move |field| SurveyEdit::UpdateBill { index, field }),
            )
        })
        .collect()
}

fn equipment_edits() -> Vec<SurveyEdit> {
    DEMO_EQUIPMENT
        .iter()
        .enumerate()
        .flat_map(|(index, (name, hours))| {
            [
                SurveyEdit::AddPresetEquipment {
                    name: name.to_string(),
                },
                SurveyEdit::UpdateEquipment {
                    index,
                    field: EquipmentField::DailyUsageHours(Some(*hours)),
                },
            ]
        })
        .collect()
}

fn render_summary(summary: &SurveySummary) {
    println!(
        "- {} bills | {:.0} kWh | ₹{:.2} billed",
        summary.bills.entries, summary.bills.consumption_kwh, summary.bills.amount
    );
    println!(
        "- Daily use: {:.2} kWh from bills | {:.2} kWh from appliances",
        summary.average_daily_consumption_kwh, summary.equipment_daily_kwh
    );
    if let Some(pump) = summary.pump_daily_kwh {
        println!("- Water pump: {pump:.2} kWh/day");
    }

    let projection = &summary.projection;
    println!(
        "- EPI {:.2} -> {:.2} kWh/m²/year | saves {:.1} kWh/year, ₹{:.0}, {:.1} kg CO2",
        projection.present_epi,
        projection.projected_epi,
        projection.annual_saving_kwh,
        projection.annual_bill_reduction,
        projection.co2_reduction_kg
    );

    if !summary.top_consumers.is_empty() {
        println!("Top consumers:");
        for consumer in summary.top_consumers.iter().take(3) {
            println!("  - {}: {:.0} Wh/day", consumer.equipment, consumer.daily_wh);
        }
    }
    for warning in &summary.warnings {
        println!("! {warning}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_service() -> DemoService {
        SurveyService::new(
            Arc::new(InMemorySurveyRepository::default()),
            Arc::new(ConfiguredAssistant::from_mode(AssistantMode::Offline)),
            MetricsPolicy::default(),
        )
    }

    #[test]
    fn demo_household_builds_a_complete_record() {
        let service = demo_service();
        let record = apply_all(&service, &SurveyRecord::new(), household_edits())
            .and_then(|record| apply_all(&service, &record, bill_edits(0)))
            .and_then(|record| apply_all(&service, &record, equipment_edits()))
            .expect("demo edits apply");

        assert_eq!(record.appraiser_info.name, "Ashwin Harikumar");
        assert_eq!(record.solar_plant_details.len(), 1);
        assert_eq!(record.bill_estimations.len(), 3);
        assert_eq!(record.equipment_estimations.len(), DEMO_EQUIPMENT.len());
        assert_eq!(record.bill_estimations[2].total(), Some(270.0));

        let summary = service.summarize(&record);
        assert_eq!(summary.bills.consumption_kwh, 453.0);
        assert!(summary.pump_daily_kwh.is_some());
    }

    #[test]
    fn bill_edits_follow_existing_rows() {
        let edits = bill_edits(2);
        assert!(edits.iter().any(|edit| matches!(
            edit,
            SurveyEdit::UpdateBill { index: 4, .. }
        )));
        assert!(!edits.iter().any(|edit| matches!(
            edit,
            SurveyEdit::UpdateBill { index: 0, .. }
        )));
    }
}
