//! HTTP handlers for survey-service.

pub mod emails;
pub mod health;
pub mod surveys;
