//! Service layer providing business operations on top of models.
//! - Separates business logic from data access through repository traits.
//! - Reuses entity definitions in the `models` crate.
//! - Returns `ServiceError` so the HTTP layer can map outcomes to responses.

pub mod errors;
pub mod pagination;
pub mod auth;
pub mod vacation;
pub mod images;
pub mod report;
#[cfg(test)]
pub mod test_support;

pub use errors::ServiceError;
