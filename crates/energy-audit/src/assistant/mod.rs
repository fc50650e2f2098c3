//! Contracts with the generative-AI collaborator: bill extraction from an
//! uploaded document and energy-saving suggestions for a survey.

pub mod extraction;
pub mod schema;
pub mod suggestions;


pub use extraction::{
    BillDetails, ConnectionDetails, DocumentUpload, ExtractedDetails, ExtractionRequest,
};
pub use suggestions::{SuggestedSaving, SuggestionRequest};

use crate::survey::metrics::MetricsPolicy;
use crate::survey::SurveyRecord;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Transport to the hosted model. Implementations return the model's JSON
/// answer; sanitizing it into typed values is done by the client.
pub trait AssistantBackend: Send + Sync {
    fn extract_document(&self, request: &ExtractionRequest) -> Result<Value, AssistantError>;
    fn suggest_savings(&self, request: &SuggestionRequest) -> Result<Value, AssistantError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssistantOperation {
    BillExtraction,
    SavingSuggestions,
}

impl fmt::Display for AssistantOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BillExtraction => f.write_str("bill extraction"),
            Self::SavingSuggestions => f.write_str("saving suggestions"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AssistantError {
    #[error("please upload a valid PDF file (received {mime_type})")]
    UnsupportedDocument { mime_type: String },
    #[error("could not find key details (like consumption) in the document; please add the bill manually")]
    ManualEntryRequired,
    #[error("a {0} request is already pending")]
    Busy(AssistantOperation),
    #[error("assistant is not configured")]
    NotConfigured,
    #[error("assistant request failed: {0}")]
    Backend(String),
    #[error("assistant returned an unexpected response: {0}")]
    MalformedResponse(String),
}

/// Front for an [`AssistantBackend`] that sanitizes answers and refuses a
/// second call of the same kind while one is still pending.
pub struct AssistantClient<B> {
    backend: Arc<B>,
    extracting: AtomicBool,
    suggesting: AtomicBool,
}

impl<B> AssistantClient<B>
where
    B: AssistantBackend,
{
    pub fn new(backend: Arc<B>) -> Self {
        Self {
            backend,
            extracting: AtomicBool::new(false),
            suggesting: AtomicBool::new(false),
        }
    }

    pub fn is_pending(&self, operation: AssistantOperation) -> bool {
        self.flag(operation).load(Ordering::Acquire)
    }

    /// Reads bill and connection details from an uploaded PDF.
    pub fn extract_bill(&self, upload: DocumentUpload) -> Result<ExtractedDetails, AssistantError> {
        upload.ensure_pdf()?;
        let _pending = self.begin(AssistantOperation::BillExtraction)?;

        let request = ExtractionRequest::for_bill(upload);
        debug!(
            bytes = request.document.len(),
            mime_type = %request.mime_type,
            "requesting bill extraction"
        );
        let raw = self.backend.extract_document(&request)?;
        let details = ExtractedDetails::from_response(&raw)?;

        if !details.bill_details.has_consumption() {
            warn!("extracted bill is missing consumption");
            return Err(AssistantError::ManualEntryRequired);
        }

        Ok(details)
    }

    /// Asks for saving opportunities tailored to the survey's profile.
    pub fn suggest_savings(
        &self,
        record: &SurveyRecord,
        policy: &MetricsPolicy,
    ) -> Result<Vec<SuggestedSaving>, AssistantError> {
        let _pending = self.begin(AssistantOperation::SavingSuggestions)?;

        let request = SuggestionRequest::from_record(record, policy);
        debug!(
            appliances = request.high_power_appliances.len(),
            "requesting saving suggestions"
        );
        let raw = self.backend.suggest_savings(&request)?;
        suggestions::parse_suggestions(&raw)
    }

    fn flag(&self, operation: AssistantOperation) -> &AtomicBool {
        match operation {
            AssistantOperation::BillExtraction => &self.extracting,
            AssistantOperation::SavingSuggestions => &self.suggesting,
        }
    }

    fn begin(&self, operation: AssistantOperation) -> Result<PendingCall<'_>, AssistantError> {
        let flag = self.flag(operation);
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AssistantError::Busy(operation))?;
        Ok(PendingCall { flag })
    }
}

/// Clears the busy flag when the call finishes, successfully or not.
struct PendingCall<'a> {
    flag: &'a AtomicBool,
}

impl Drop for PendingCall<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
