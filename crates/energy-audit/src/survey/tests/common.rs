use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::{json, Value};

use crate::assistant::{AssistantBackend, AssistantError, ExtractionRequest, SuggestionRequest};
use crate::auth::{AuthError, AuthProvider, Session, SessionListener, Unsubscribe};
use crate::survey::domain::{SurveyId, SurveyRecord};
use crate::survey::edits::{BillField, EquipmentField, SurveyEdit};
use crate::survey::metrics::MetricsPolicy;
use crate::survey::repository::{RepositoryError, SurveyRepository};
use crate::survey::{survey_router, SurveyService};

pub(super) const ADMIN_EMAIL: &str = "admin@example.org";
pub(super) const ADMIN_PASSWORD: &str = "correct-horse";

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

pub(super) fn policy() -> MetricsPolicy {
    MetricsPolicy::default()
}

pub(super) fn apply_all(record: &SurveyRecord, edits: Vec<SurveyEdit>) -> SurveyRecord {
    edits.into_iter().fold(record.clone(), |current, edit| {
        current.apply(edit).expect("edit applies")
    })
}

pub(super) fn with_bill_consumptions(consumptions: &[f64]) -> SurveyRecord {
    consumptions
        .iter()
        .enumerate()
        .fold(SurveyRecord::new(), |record, (index, consumption)| {
            apply_all(
                &record,
                vec![
                    SurveyEdit::AddBill,
                    SurveyEdit::UpdateBill {
                        index,
                        field: BillField::Consumption(Some(*consumption)),
                    },
                ],
            )
        })
}

pub(super) fn with_equipment(rows: &[(&str, f64, f64)]) -> SurveyRecord {
    rows.iter()
        .enumerate()
        .fold(SurveyRecord::new(), |record, (index, (name, hours, watts))| {
            apply_all(
                &record,
                vec![
                    SurveyEdit::AddEquipment,
                    SurveyEdit::UpdateEquipment {
                        index,
                        field: EquipmentField::Equipment(name.to_string()),
                    },
                    SurveyEdit::UpdateEquipment {
                        index,
                        field: EquipmentField::DailyUsageHours(Some(*hours)),
                    },
                    SurveyEdit::UpdateEquipment {
                        index,
                        field: EquipmentField::PowerWatts(Some(*watts)),
                    },
                ],
            )
        })
}

pub(super) fn extraction_response() -> Value {
    json!({
        "connectionDetails": {
            "consumerName": "Anitha R",
            "consumerNumber": "1155432100987",
            "electricalSection": "Pattom",
            "tariffCategory": "LT-1A",
            "connectedLoadWatts": 4200,
            "connectionNature": "Single Phase",
            "energyMeterType": "Digital",
            "solarInstalled": "No"
        },
        "billDetails": {
            "billNumber": "B-2291",
            "period": "May-Jun 2023",
            "consumption": 312,
            "fixedCharge": 310,
            "meterRent": 35,
            "energyCharges": 561.9,
            "duty": 56.19,
            "otherCharges": 10.72
        }
    })
}

pub(super) fn suggestion_response() -> Value {
    json!({
        "suggestions": [
            {
                "suggestion": "Replace CFL lamps with LED",
                "energySavingWh": 250,
                "investment": 1200,
                "paybackMonths": 8,
                "remarks": "Living room and kitchen"
            },
            {
                "suggestion": "Service the refrigerator door gasket",
                "energySavingWh": 150,
                "investment": 400,
                "paybackMonths": 3
            }
        ]
    })
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<Vec<(SurveyId, SurveyRecord)>>,
    sequence: AtomicUsize,
}

impl MemoryRepository {
    pub(super) fn stored(&self) -> Vec<(SurveyId, SurveyRecord)> {
        self.records.lock().expect("repository mutex").clone()
    }
}

impl SurveyRepository for MemoryRepository {
    fn create(&self, record: SurveyRecord) -> Result<SurveyId, RepositoryError> {
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let id = SurveyId(format!("survey-{next:04}"));
        self.records
            .lock()
            .expect("repository mutex")
            .push((id.clone(), record));
        Ok(id)
    }

    fn list(&self) -> Result<Vec<SurveyRecord>, RepositoryError> {
        Ok(self
            .records
            .lock()
            .expect("repository mutex")
            .iter()
            .map(|(id, record)| {
                let mut record = record.clone();
                record.id = Some(id.clone());
                record
            })
            .collect())
    }

    fn update(&self, id: &SurveyId, record: SurveyRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex");
        match guard.iter_mut().find(|(stored, _)| stored == id) {
            Some(slot) => {
                slot.1 = record;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

pub(super) struct UnavailableRepository;

impl SurveyRepository for UnavailableRepository {
    fn create(&self, _record: SurveyRecord) -> Result<SurveyId, RepositoryError> {
        Err(RepositoryError::Unavailable("connection reset".to_string()))
    }

    fn list(&self) -> Result<Vec<SurveyRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("connection reset".to_string()))
    }

    fn update(&self, _id: &SurveyId, _record: SurveyRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("connection reset".to_string()))
    }
}

/// Assistant stand-in replaying canned answers.
pub(super) struct ScriptedAssistant {
    extraction: Mutex<Result<Value, AssistantError>>,
    suggestions: Mutex<Result<Value, AssistantError>>,
    pub(super) extraction_calls: AtomicUsize,
    pub(super) suggestion_calls: AtomicUsize,
}

impl Default for ScriptedAssistant {
    fn default() -> Self {
        Self {
            extraction: Mutex::new(Ok(extraction_response())),
            suggestions: Mutex::new(Ok(suggestion_response())),
            extraction_calls: AtomicUsize::new(0),
            suggestion_calls: AtomicUsize::new(0),
        }
    }
}

impl ScriptedAssistant {
    pub(super) fn answering_extraction(answer: Result<Value, AssistantError>) -> Self {
        let assistant = Self::default();
        *assistant.extraction.lock().expect("assistant mutex") = answer;
        assistant
    }

    pub(super) fn answering_suggestions(answer: Result<Value, AssistantError>) -> Self {
        let assistant = Self::default();
        *assistant.suggestions.lock().expect("assistant mutex") = answer;
        assistant
    }
}

impl AssistantBackend for ScriptedAssistant {
    fn extract_document(&self, _request: &ExtractionRequest) -> Result<Value, AssistantError> {
        self.extraction_calls.fetch_add(1, Ordering::SeqCst);
        self.extraction.lock().expect("assistant mutex").clone()
    }

    fn suggest_savings(&self, _request: &SuggestionRequest) -> Result<Value, AssistantError> {
        self.suggestion_calls.fetch_add(1, Ordering::SeqCst);
        self.suggestions.lock().expect("assistant mutex").clone()
    }
}

#[derive(Default)]
pub(super) struct MemoryAuth {
    sessions: Mutex<HashMap<String, Session>>,
    sequence: AtomicUsize,
}

impl AuthProvider for MemoryAuth {
    fn login(&self, identifier: &str, secret: &str) -> Result<Session, AuthError> {
        if identifier != ADMIN_EMAIL || secret != ADMIN_PASSWORD {
            return Err(AuthError::InvalidCredentials);
        }
        let next = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let session = Session {
            token: format!("token-{next}"),
            identifier: identifier.to_string(),
            started_at: Utc::now(),
        };
        self.sessions
            .lock()
            .expect("auth mutex")
            .insert(session.token.clone(), session.clone());
        Ok(session)
    }

    fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.sessions
            .lock()
            .expect("auth mutex")
            .remove(token)
            .map(|_| ())
            .ok_or(AuthError::NoSession)
    }

    fn session(&self, token: &str) -> Option<Session> {
        self.sessions.lock().expect("auth mutex").get(token).cloned()
    }

    fn subscribe(&self, _listener: SessionListener) -> Unsubscribe {
        Box::new(|| {})
    }
}

pub(super) type TestService = SurveyService<MemoryRepository, ScriptedAssistant>;

pub(super) fn build_service() -> (TestService, Arc<MemoryRepository>, Arc<ScriptedAssistant>) {
    build_service_with(ScriptedAssistant::default())
}

pub(super) fn build_service_with(
    assistant: ScriptedAssistant,
) -> (TestService, Arc<MemoryRepository>, Arc<ScriptedAssistant>) {
    let repository = Arc::new(MemoryRepository::default());
    let assistant = Arc::new(assistant);
    let service = SurveyService::new(repository.clone(), assistant.clone(), policy());
    (service, repository, assistant)
}

pub(super) fn router_with_service(service: TestService) -> axum::Router {
    survey_router(Arc::new(service), Arc::new(MemoryAuth::default()))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&bytes).expect("json body")
}
