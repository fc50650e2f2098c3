use std::cmp::Reverse;
use std::io::Write;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{SurveyId, SurveyRecord};
use super::edits::{EditError, SurveyEdit};
use super::export::{write_csv, ExportError};
use super::metrics::{MetricsPolicy, SurveySummary};
use super::repository::{RepositoryError, SurveyRepository};
use crate::assistant::{
    AssistantBackend, AssistantClient, AssistantError, DocumentUpload, ExtractedDetails,
};

/// Composes the metrics engine with the persistence and assistant
/// collaborators. Failed collaborator calls never alter the caller's record.
pub struct SurveyService<R, B> {
    repository: Arc<R>,
    assistant: AssistantClient<B>,
    policy: MetricsPolicy,
}

impl<R, B> SurveyService<R, B>
where
    R: SurveyRepository + 'static,
    B: AssistantBackend + 'static,
{
    pub fn new(repository: Arc<R>, backend: Arc<B>, policy: MetricsPolicy) -> Self {
        Self {
            repository,
            assistant: AssistantClient::new(backend),
            policy,
        }
    }

    pub fn edit(
        &self,
        record: &SurveyRecord,
        edit: SurveyEdit,
    ) -> Result<SurveyRecord, SurveyServiceError> {
        Ok(record.apply(edit)?)
    }

    pub fn summarize(&self, record: &SurveyRecord) -> SurveySummary {
        SurveySummary::from_record(record, &self.policy)
    }

    /// Finalizes a new survey: stamps the submission date and stores it.
    pub fn submit(&self, record: SurveyRecord) -> Result<SurveyRecord, SurveyServiceError> {
        if record.id.is_some() || record.is_submitted() {
            return Err(SurveyServiceError::AlreadySubmitted);
        }

        let mut finalized = record;
        finalized.submission_date = Some(Utc::now());

        let id = self.repository.create(finalized.clone()).map_err(|err| {
            warn!(error = %err, "failed to save survey");
            err
        })?;
        info!(survey_id = %id.0, "survey submitted");

        finalized.id = Some(id);
        Ok(finalized)
    }

    /// All stored surveys, newest submission first.
    pub fn list(&self) -> Result<Vec<SurveyRecord>, SurveyServiceError> {
        let mut records = self.repository.list()?;
        records.sort_by_key(|record| Reverse(record.submission_date));
        Ok(records)
    }

    /// Replaces a stored survey with an edited copy.
    pub fn amend(
        &self,
        id: &SurveyId,
        record: SurveyRecord,
    ) -> Result<SurveyRecord, SurveyServiceError> {
        if !record.is_submitted() {
            return Err(SurveyServiceError::NotSubmitted);
        }

        let mut amended = record;
        amended.id = Some(id.clone());
        self.repository.update(id, amended.clone())?;
        info!(survey_id = %id.0, "survey amended");
        Ok(amended)
    }

    /// Replaces the record's saving opportunities with fresh suggestions.
    pub fn suggest_savings(
        &self,
        record: &SurveyRecord,
    ) -> Result<SurveyRecord, SurveyServiceError> {
        let suggestions = self
            .assistant
            .suggest_savings(record, &self.policy)
            .map_err(|err| {
                warn!(error = %err, "saving suggestions unavailable");
                err
            })?;
        info!(count = suggestions.len(), "received saving suggestions");

        Ok(record.apply(SurveyEdit::ReplaceSavingOpportunities { suggestions })?)
    }

    /// Reads a bill document without touching any record.
    pub fn read_bill(
        &self,
        upload: DocumentUpload,
    ) -> Result<ExtractedDetails, SurveyServiceError> {
        self.assistant.extract_bill(upload).map_err(|err| {
            warn!(error = %err, "bill extraction failed");
            SurveyServiceError::from(err)
        })
    }

    /// Reads a bill document, appends it to the record's bills and fills the
    /// connection fields the surveyor left blank.
    pub fn extract_bill(
        &self,
        record: &SurveyRecord,
        upload: DocumentUpload,
    ) -> Result<(SurveyRecord, ExtractedDetails), SurveyServiceError> {
        let details = self.read_bill(upload)?;
        let mut next = record.apply(SurveyEdit::AddExtractedBill {
            bill: details.bill_details.clone(),
        })?;
        next.electricity_connection = details
            .connection_details
            .fill_blanks(&next.electricity_connection);
        Ok((next, details))
    }

    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize, SurveyServiceError> {
        let records = self.list()?;
        Ok(write_csv(&records, writer)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SurveyServiceError {
    #[error("survey has already been submitted")]
    AlreadySubmitted,
    #[error("survey has not been submitted yet")]
    NotSubmitted,
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
