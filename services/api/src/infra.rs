use chrono::Utc;
use energy_audit::assistant::{
    AssistantBackend, AssistantError, ExtractionRequest, SuggestionRequest,
};
use energy_audit::auth::{AuthError, AuthProvider, Session, SessionListener, Unsubscribe};
use energy_audit::config::{AdminCredentials, AssistantMode};
use energy_audit::error::AppError;
use energy_audit::survey::domain::Answer;
use energy_audit::survey::{
    find_appliance_preset, RepositoryError, SurveyId, SurveyRecord, SurveyRepository,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Document store kept in process memory, keyed by generated survey ids.
#[derive(Default, Clone)]
pub(crate) struct InMemorySurveyRepository {
    records: Arc<Mutex<Vec<(SurveyId, SurveyRecord)>>>,
    sequence: Arc<AtomicU64>,
}

fn poisoned<T>(_: T) -> RepositoryError {
    RepositoryError::Unavailable("repository lock poisoned".to_string())
}

impl SurveyRepository for InMemorySurveyRepository {
    fn create(&self, record: SurveyRecord) -> Result<SurveyId, RepositoryError> {
        let next = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let id = SurveyId(format!("survey-{next:06}"));
        let mut guard = self.records.lock().map_err(poisoned)?;
        guard.push((id.clone(), record));
        Ok(id)
    }

    fn list(&self) -> Result<Vec<SurveyRecord>, RepositoryError> {
        let guard = self.records.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .map(|(id, record)| SurveyRecord {
                id: Some(id.clone()),
                ..record.clone()
            })
            .collect())
    }

    fn update(&self, id: &SurveyId, record: SurveyRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().map_err(poisoned)?;
        let slot = guard
            .iter_mut()
            .find(|(stored, _)| stored == id)
            .ok_or(RepositoryError::NotFound)?;
        slot.1 = record;
        Ok(())
    }
}

type ListenerTable = Arc<Mutex<Vec<(u64, Arc<SessionListener>)>>>;

/// Single administrator account configured through the environment.
#[derive(Default)]
pub(crate) struct StaticCredentialAuth {
    credentials: Option<AdminCredentials>,
    sessions: Mutex<HashMap<String, Session>>,
    listeners: ListenerTable,
    sequence: AtomicU64,
}

impl StaticCredentialAuth {
    pub(crate) fn new(credentials: Option<AdminCredentials>) -> Self {
        Self {
            credentials,
            ..Self::default()
        }
    }

    /// Most recently started session, the state reported to listeners.
    fn current_session(&self) -> Option<Session> {
        self.sessions
            .lock()
            .ok()?
            .values()
            .max_by_key(|session| session.started_at)
            .cloned()
    }

    fn notify(&self, session: Option<&Session>) {
        // Listeners run without the table locked so they may subscribe or unsubscribe.
        let listeners: Vec<Arc<SessionListener>> = match self.listeners.lock() {
            Ok(listeners) => listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(session);
        }
    }
}

impl AuthProvider for StaticCredentialAuth {
    fn login(&self, identifier: &str, secret: &str) -> Result<Session, AuthError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| AuthError::Unavailable("no administrator configured".to_string()))?;
        if !credentials.email.eq_ignore_ascii_case(identifier.trim())
            || credentials.password != secret
        {
            return Err(AuthError::InvalidCredentials);
        }

        let next = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let session = Session {
            token: format!("session-{next:06}-{}", Utc::now().timestamp_millis()),
            identifier: credentials.email.clone(),
            started_at: Utc::now(),
        };
        self.sessions
            .lock()
            .map_err(|_| AuthError::Unavailable("session store poisoned".to_string()))?
            .insert(session.token.clone(), session.clone());

        self.notify(Some(&session));
        Ok(session)
    }

    fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.sessions
            .lock()
            .map_err(|_| AuthError::Unavailable("session store poisoned".to_string()))?
            .remove(token)
            .ok_or(AuthError::NoSession)?;

        self.notify(self.current_session().as_ref());
        Ok(())
    }

    fn session(&self, token: &str) -> Option<Session> {
        self.sessions.lock().ok()?.get(token).cloned()
    }

    fn subscribe(&self, listener: SessionListener) -> Unsubscribe {
        let listener: Arc<SessionListener> = Arc::new(listener);
        listener(self.current_session().as_ref());

        let id = self.sequence.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((id, listener));
        }

        let listeners = Arc::clone(&self.listeners);
        Box::new(move || {
            if let Ok(mut listeners) = listeners.lock() {
                listeners.retain(|(registered, _)| *registered != id);
            }
        })
    }
}

/// Assistant backend selected by `AUDIT_ASSISTANT_MODE`.
pub(crate) enum ConfiguredAssistant {
    Disabled,
    Offline(OfflineAssistant),
}

impl ConfiguredAssistant {
    pub(crate) fn from_mode(mode: AssistantMode) -> Self {
        match mode {
            AssistantMode::Disabled => Self::Disabled,
            AssistantMode::Offline => Self::Offline(OfflineAssistant),
        }
    }
}

impl AssistantBackend for ConfiguredAssistant {
    fn extract_document(&self, request: &ExtractionRequest) -> Result<Value, AssistantError> {
        match self {
            Self::Disabled => Err(AssistantError::NotConfigured),
            Self::Offline(offline) => offline.extract_document(request),
        }
    }

    fn suggest_savings(&self, request: &SuggestionRequest) -> Result<Value, AssistantError> {
        match self {
            Self::Disabled => Err(AssistantError::NotConfigured),
            Self::Offline(offline) => offline.suggest_savings(request),
        }
    }
}

/// Rule-of-thumb stand-in for the hosted model, used for demos and local runs.
pub(crate) struct OfflineAssistant;

const LIGHTING_SAVING_WH: f64 = 150.0;
const RUNTIME_CUT_HOURS: f64 = 0.5;
const SOLAR_SAVING_WH: f64 = 4000.0;
const FALLBACK_APPLIANCE_WATTS: f64 = 1000.0;

impl AssistantBackend for OfflineAssistant {
    fn extract_document(&self, _request: &ExtractionRequest) -> Result<Value, AssistantError> {
        Err(AssistantError::Backend(
            "reading bills requires the hosted assistant".to_string(),
        ))
    }

    fn suggest_savings(&self, request: &SuggestionRequest) -> Result<Value, AssistantError> {
        let mut suggestions = vec![json!({
            "suggestion": "Replace remaining CFL and incandescent lamps with LED bulbs",
            "energySavingWh": LIGHTING_SAVING_WH,
            "investment": 1000,
            "paybackMonths": 6,
            "remarks": "Prioritize lamps used more than 4 hours a day"
        })];

        for appliance in &request.high_power_appliances {
            let watts = find_appliance_preset(appliance)
                .map(|preset| preset.watts)
                .unwrap_or(FALLBACK_APPLIANCE_WATTS);
            suggestions.push(json!({
                "suggestion": format!("Cut daily use of {appliance} by 30 minutes"),
                "energySavingWh": watts * RUNTIME_CUT_HOURS,
                "investment": 0,
                "paybackMonths": 0,
                "remarks": "Behavioral change, no purchase needed"
            }));
        }

        if request.solar_installed != Some(Answer::Yes) {
            suggestions.push(json!({
                "suggestion": "Evaluate a 2 kW on-grid rooftop solar plant",
                "energySavingWh": SOLAR_SAVING_WH,
                "investment": 140000,
                "paybackMonths": 60,
                "remarks": "Check subsidy eligibility with the distribution utility"
            }));
        }

        Ok(json!({ "suggestions": suggestions }))
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, AppError> {
    let raw = std::fs::read(path)?;
    Ok(serde_json::from_slice(&raw)?)
}

/// Loads one survey or a list of surveys from a JSON document.
pub(crate) fn read_surveys(path: &Path) -> Result<Vec<SurveyRecord>, AppError> {
    match read_json::<Value>(path)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(AppError::from))
            .collect(),
        single => Ok(vec![serde_json::from_value(single)?]),
    }
}

/// MIME type of an uploaded file, guessed from its extension.
pub(crate) fn guess_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
