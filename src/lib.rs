//! Rule-based IVF advisory engine.
//!
//! Three pure calculators score a [`patient::PatientFactors`] snapshot:
//! [`scoring::compute_success`], [`scoring::compute_embryo_quality`] and
//! [`scoring::recommend_protocol`]. None of them fail; missing inputs fall
//! back to documented defaults.

pub mod config;
pub mod model;
pub mod output;
pub mod patient;
pub mod scoring;
