use chrono::{DateTime, NaiveDate};

use crate::errors::ServiceError;
use super::domain::{VacationDraft, VacationForm};

pub const MAX_PRICE: f64 = 10_000.0;
/// Keeps destinations within what the report index can hold.
pub const MAX_DESTINATION_CHARS: usize = 500;

/// Create forbids past dates; update only checks ordering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

fn required_text(value: &Option<String>, field: &str) -> Result<String, ServiceError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ServiceError::Validation(format!("{field} is required"))),
    }
}

pub fn parse_price(raw: &Option<String>) -> Result<f64, ServiceError> {
    let raw = required_text(raw, "Price")?;
    let price: f64 = raw
        .parse()
        .map_err(|_| ServiceError::Validation("Price must be a number".into()))?;
    if !(price > 0.0 && price <= MAX_PRICE) {
        return Err(ServiceError::Validation("Price must be greater than 0 and at most 10000".into()));
    }
    Ok(price)
}

/// `YYYY-MM-DD`, or an RFC 3339 timestamp truncated to its date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ServiceError> {
    let s = raw.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(s).map(|dt| dt.date_naive()))
        .map_err(|_| ServiceError::Validation(format!("Invalid date: {raw}")))
}

pub fn validate(form: &VacationForm, mode: WriteMode, today: NaiveDate) -> Result<VacationDraft, ServiceError> {
    let destination = required_text(&form.destination, "Destination")?;
    if destination.chars().count() > MAX_DESTINATION_CHARS {
        return Err(ServiceError::Validation(format!(
            "Destination must be at most {MAX_DESTINATION_CHARS} characters"
        )));
    }
    let description = required_text(&form.description, "Description")?;
    let price = parse_price(&form.price)?;
    let start_date = parse_date(&required_text(&form.start_date, "Start date")?)?;
    let end_date = parse_date(&required_text(&form.end_date, "End date")?)?;

    if end_date < start_date {
        return Err(ServiceError::Validation("End date cannot be earlier than start date".into()));
    }
    if mode == WriteMode::Create && (start_date < today || end_date < today) {
        return Err(ServiceError::Validation("Past dates are not allowed for new vacations".into()));
    }
    Ok(VacationDraft { destination, description, start_date, end_date, price })
}
