//! Visit Report - Terminal Form Client Library
//!
//! Collects a visit-report form, a freehand signature and an optional uploaded
//! PDF, and drives submission against the PDF filling service.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
