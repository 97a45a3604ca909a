//! Vacation listings, reports and admin writes.
//!
//! `query` builds the SQL, `repository` abstracts persistence (with an
//! in-memory double in `repository::mock`), and `service` coordinates writes
//! with the image store.

pub mod domain;
pub mod filter;
pub mod validation;
pub mod query;
pub mod repository;
pub mod repo;
pub mod service;

pub use domain::{ReportRow, Vacation, VacationDraft, VacationForm, VacationPage};
pub use filter::VacationFilter;
pub use service::VacationService;
