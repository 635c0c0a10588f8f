//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, scopes, percentages, errors)
//! - `questionnaire` - Question catalogs, typed responses, grid cascade, completion rules

pub mod foundation;
pub mod questionnaire;
