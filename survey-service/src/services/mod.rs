//! Services module for survey-service.

pub mod assessment_client;
pub mod database;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod store;
pub mod survey;

pub use assessment_client::{HttpSetResolver, ResolveError, SetResolver};
pub use database::PgStore;
pub use error::SurveyError;
pub use memory::InMemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use store::{EmailStore, SurveyStore};
pub use survey::SurveyService;
