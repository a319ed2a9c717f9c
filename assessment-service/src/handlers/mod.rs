//! HTTP handlers for assessment-service.

pub mod assessments;
pub mod health;
pub mod questions;
