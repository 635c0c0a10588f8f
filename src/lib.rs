//! Training Register - questionnaire progress for training events
//!
//! Events run documents (questionnaires) that are filled in once per event
//! or once per trainee. This crate keeps their responses in SQLite, debounces
//! edits into single writes, cascades absence across signature grid days, and
//! recomputes each document instance's completion percentage.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
