//! Services module for assessment-service.

pub mod assessment;
pub mod database;
pub mod error;
pub mod memory;
pub mod metrics;
pub mod store;

pub use assessment::AssessmentService;
pub use database::PgStore;
pub use error::AssessmentError;
pub use memory::InMemoryStore;
pub use metrics::{get_metrics, init_metrics, record_operation};
pub use store::{AssessmentStore, QuestionStore};
