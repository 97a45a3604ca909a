use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Vacation as returned to callers, with follower aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vacation {
    pub id: Uuid,
    pub destination: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: f64,
    pub image: String,
    pub followers_count: i64,
    pub is_followed_by_current_user: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationPage {
    pub vacations: Vec<Vacation>,
    pub total_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub destination: String,
    pub followers_count: i64,
}

/// Untyped admin form fields as they arrive from a multipart body.
#[derive(Debug, Clone, Default)]
pub struct VacationForm {
    pub destination: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub price: Option<String>,
}

impl VacationForm {
    /// Assign a named field; unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "destination" => self.destination = Some(value),
            "description" => self.description = Some(value),
            "startDate" => self.start_date = Some(value),
            "endDate" => self.end_date = Some(value),
            "price" => self.price = Some(value),
            _ => {}
        }
    }
}

/// Validated values ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct VacationDraft {
    pub destination: String,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: f64,
}
