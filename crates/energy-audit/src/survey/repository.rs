use super::domain::{SurveyId, SurveyRecord};

/// Document store for submitted surveys. Records are opaque documents keyed
/// by a store-generated identifier; updates replace the whole document.
pub trait SurveyRepository: Send + Sync {
    fn create(&self, record: SurveyRecord) -> Result<SurveyId, RepositoryError>;
    fn list(&self) -> Result<Vec<SurveyRecord>, RepositoryError>;
    fn update(&self, id: &SurveyId, record: SurveyRecord) -> Result<(), RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("survey not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
