//! Energy-audit survey engine: derived metrics, list edits, rollups and the
//! contracts with the persistence, authentication and AI collaborators.

pub mod assistant;
pub mod auth;
pub mod config;
pub mod error;
pub mod survey;
pub mod telemetry;
