//! SQL for listings and reports. Every value, including LIMIT and OFFSET, is
//! bound as a parameter.

use chrono::NaiveDateTime;
use sea_orm::{DbBackend, Statement, Value};
use uuid::Uuid;

use crate::pagination::Pagination;
use super::filter::VacationFilter;

const VIEW_COLUMNS: &str = "v.id, v.destination, v.description, v.start_date, v.end_date, v.price, v.image, \
     COUNT(f.user_id) AS followers_count";

/// Collects bound values and hands out `$n` placeholders.
#[derive(Debug, Default)]
pub struct Binder {
    values: Vec<Value>,
}

impl Binder {
    pub fn push(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        format!("${}", self.values.len())
    }

    pub fn finish(self, sql: String) -> BuiltQuery {
        BuiltQuery { sql, values: self.values }
    }
}

#[derive(Debug)]
pub struct BuiltQuery {
    pub sql: String,
    pub values: Vec<Value>,
}

impl BuiltQuery {
    pub fn statement(self) -> Statement {
        Statement::from_sql_and_values(DbBackend::Postgres, self.sql, self.values)
    }
}

/// Predicate for the time-based filters; `None` for `all` and `following`.
fn time_predicate(filter: VacationFilter, now: NaiveDateTime, b: &mut Binder) -> Option<String> {
    match filter {
        VacationFilter::Upcoming => {
            let p = b.push(now);
            Some(format!("v.start_date > CAST({p} AS timestamp)"))
        }
        VacationFilter::Active => {
            let p = b.push(now);
            Some(format!("v.start_date <= CAST({p} AS timestamp) AND v.end_date >= CAST({p} AS timestamp)"))
        }
        VacationFilter::All | VacationFilter::Following => None,
    }
}

/// One page of vacations with follower aggregates from a single outer join.
pub fn list_query(user_id: Uuid, filter: VacationFilter, now: NaiveDateTime, page: Pagination) -> BuiltQuery {
    let mut b = Binder::default();
    let user = b.push(user_id);
    let predicate = match filter {
        VacationFilter::Following => Some(format!(
            "EXISTS (SELECT 1 FROM followers fx WHERE fx.vacation_id = v.id AND fx.user_id = {user})"
        )),
        other => time_predicate(other, now, &mut b),
    };
    let where_clause = predicate.map(|p| format!(" WHERE {p}")).unwrap_or_default();
    let limit = b.push(i64::try_from(page.limit()).unwrap_or(i64::MAX));
    let offset = b.push(i64::try_from(page.offset()).unwrap_or(i64::MAX));
    let sql = format!(
        "SELECT {VIEW_COLUMNS}, COUNT(*) FILTER (WHERE f.user_id = {user}) > 0 AS is_followed \
         FROM vacations v LEFT JOIN followers f ON f.vacation_id = v.id{where_clause} \
         GROUP BY v.id ORDER BY v.start_date, v.id LIMIT {limit} OFFSET {offset}"
    );
    b.finish(sql)
}

/// Total for `list_query`. `following` counts through an inner join instead of
/// the listing's outer join + EXISTS.
pub fn count_query(user_id: Uuid, filter: VacationFilter, now: NaiveDateTime) -> BuiltQuery {
    let mut b = Binder::default();
    let sql = match filter {
        VacationFilter::Following => {
            let user = b.push(user_id);
            format!(
                "SELECT COUNT(DISTINCT v.id) AS cnt FROM vacations v \
                 JOIN followers f ON v.id = f.vacation_id WHERE f.user_id = {user}"
            )
        }
        other => {
            let where_clause = time_predicate(other, now, &mut b)
                .map(|p| format!(" WHERE {p}"))
                .unwrap_or_default();
            format!("SELECT COUNT(*) AS cnt FROM vacations v{where_clause}")
        }
    };
    b.finish(sql)
}

pub fn by_id_query(id: Uuid, current_user: Option<Uuid>) -> BuiltQuery {
    let mut b = Binder::default();
    let id = b.push(id);
    let followed = match current_user {
        Some(user_id) => format!("COUNT(*) FILTER (WHERE f.user_id = {}) > 0", b.push(user_id)),
        None => "FALSE".to_string(),
    };
    let sql = format!(
        "SELECT {VIEW_COLUMNS}, {followed} AS is_followed \
         FROM vacations v LEFT JOIN followers f ON f.vacation_id = v.id \
         WHERE v.id = {id} GROUP BY v.id"
    );
    b.finish(sql)
}

pub fn report_query() -> BuiltQuery {
    Binder::default().finish(
        "SELECT v.destination, COUNT(f.user_id) AS followers_count \
         FROM vacations v LEFT JOIN followers f ON v.id = f.vacation_id \
         GROUP BY v.id, v.destination ORDER BY v.destination, v.id"
            .to_string(),
    )
}

pub fn follow_statement(user_id: Uuid, vacation_id: Uuid) -> BuiltQuery {
    let mut b = Binder::default();
    let user = b.push(user_id);
    let vacation = b.push(vacation_id);
    b.finish(format!(
        "INSERT INTO followers (user_id, vacation_id, created_at) VALUES ({user}, {vacation}, NOW()) \
         ON CONFLICT (user_id, vacation_id) DO NOTHING"
    ))
}

pub fn unfollow_statement(user_id: Uuid, vacation_id: Uuid) -> BuiltQuery {
    let mut b = Binder::default();
    let user = b.push(user_id);
    let vacation = b.push(vacation_id);
    b.finish(format!("DELETE FROM followers WHERE user_id = {user} AND vacation_id = {vacation}"))
}
