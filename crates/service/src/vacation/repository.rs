use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::Pagination;
use super::domain::{ReportRow, Vacation, VacationDraft, VacationPage};
use super::filter::VacationFilter;

/// Persistence for vacations and follower pairs.
#[async_trait]
pub trait VacationRepository: Send + Sync {
    async fn list_for_user(
        &self,
        user_id: Uuid,
        filter: VacationFilter,
        page: Pagination,
        now: NaiveDateTime,
    ) -> Result<VacationPage, ServiceError>;

    async fn get(&self, id: Uuid, current_user: Option<Uuid>) -> Result<Option<Vacation>, ServiceError>;

    async fn insert(&self, draft: &VacationDraft, image: &str) -> Result<Vacation, ServiceError>;

    /// `image: None` keeps the stored image. Returns `None` when the row is gone.
    async fn update(&self, id: Uuid, draft: &VacationDraft, image: Option<&str>) -> Result<Option<Vacation>, ServiceError>;

    /// Returns whether a row was removed; follower pairs go with it.
    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError>;

    /// Idempotent. `NotFound` when the vacation does not exist.
    async fn follow(&self, user_id: Uuid, vacation_id: Uuid) -> Result<(), ServiceError>;

    async fn unfollow(&self, user_id: Uuid, vacation_id: Uuid) -> Result<(), ServiceError>;

    async fn report(&self) -> Result<Vec<ReportRow>, ServiceError>;
}

/// In-memory repository for service and HTTP tests
pub mod mock {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Clone, Debug)]
    struct Row {
        id: Uuid,
        draft: VacationDraft,
        image: String,
    }

    #[derive(Default)]
    pub struct InMemoryVacationRepository {
        rows: Mutex<Vec<Row>>,
        followers: Mutex<HashSet<(Uuid, Uuid)>>, // (user_id, vacation_id)
        fail_writes: AtomicBool,
    }

    impl InMemoryVacationRepository {
        /// Make every insert/update/delete fail with a database error.
        pub fn set_fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }

        /// Seed a row directly, bypassing validation.
        pub fn seed(&self, draft: VacationDraft, image: &str) -> Uuid {
            let id = Uuid::new_v4();
            self.rows.lock().unwrap().push(Row { id, draft, image: image.to_string() });
            id
        }

        pub fn follower_rows(&self) -> usize {
            self.followers.lock().unwrap().len()
        }

        fn check_writable(&self) -> Result<(), ServiceError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(ServiceError::Db("simulated write failure".into()));
            }
            Ok(())
        }

        fn view(&self, row: &Row, current_user: Option<Uuid>) -> Vacation {
            let followers = self.followers.lock().unwrap();
            let followers_count = followers.iter().filter(|(_, v)| *v == row.id).count() as i64;
            let is_followed = current_user.map(|u| followers.contains(&(u, row.id))).unwrap_or(false);
            Vacation {
                id: row.id,
                destination: row.draft.destination.clone(),
                description: row.draft.description.clone(),
                start_date: row.draft.start_date,
                end_date: row.draft.end_date,
                price: row.draft.price,
                image: row.image.clone(),
                followers_count,
                is_followed_by_current_user: is_followed,
            }
        }
    }

    fn at_midnight(d: chrono::NaiveDate) -> NaiveDateTime {
        d.and_time(chrono::NaiveTime::MIN)
    }

    #[async_trait]
    impl VacationRepository for InMemoryVacationRepository {
        async fn list_for_user(
            &self,
            user_id: Uuid,
            filter: VacationFilter,
            page: Pagination,
            now: NaiveDateTime,
        ) -> Result<VacationPage, ServiceError> {
            let mut rows: Vec<Row> = {
                let followers = self.followers.lock().unwrap();
                self.rows
                    .lock()
                    .unwrap()
                    .iter()
                    .filter(|r| match filter {
                        VacationFilter::All => true,
                        VacationFilter::Following => followers.contains(&(user_id, r.id)),
                        VacationFilter::Upcoming => at_midnight(r.draft.start_date) > now,
                        VacationFilter::Active => {
                            at_midnight(r.draft.start_date) <= now && at_midnight(r.draft.end_date) >= now
                        }
                    })
                    .cloned()
                    .collect()
            };
            rows.sort_by(|a, b| a.draft.start_date.cmp(&b.draft.start_date).then(a.id.cmp(&b.id)));
            let total_count = rows.len() as i64;
            let vacations = rows
                .iter()
                .skip(page.offset() as usize)
                .take(page.limit() as usize)
                .map(|r| self.view(r, Some(user_id)))
                .collect();
            Ok(VacationPage { vacations, total_count })
        }

        async fn get(&self, id: Uuid, current_user: Option<Uuid>) -> Result<Option<Vacation>, ServiceError> {
            let row = self.rows.lock().unwrap().iter().find(|r| r.id == id).cloned();
            Ok(row.map(|r| self.view(&r, current_user)))
        }

        async fn insert(&self, draft: &VacationDraft, image: &str) -> Result<Vacation, ServiceError> {
            self.check_writable()?;
            let row = Row { id: Uuid::new_v4(), draft: draft.clone(), image: image.to_string() };
            self.rows.lock().unwrap().push(row.clone());
            Ok(self.view(&row, None))
        }

        async fn update(&self, id: Uuid, draft: &VacationDraft, image: Option<&str>) -> Result<Option<Vacation>, ServiceError> {
            self.check_writable()?;
            let updated = {
                let mut rows = self.rows.lock().unwrap();
                let Some(row) = rows.iter_mut().find(|r| r.id == id) else { return Ok(None) };
                row.draft = draft.clone();
                if let Some(image) = image {
                    row.image = image.to_string();
                }
                row.clone()
            };
            Ok(Some(self.view(&updated, None)))
        }

        async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
            self.check_writable()?;
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|r| r.id != id);
            let removed = rows.len() != before;
            drop(rows);
            if removed {
                self.followers.lock().unwrap().retain(|(_, v)| *v != id);
            }
            Ok(removed)
        }

        async fn follow(&self, user_id: Uuid, vacation_id: Uuid) -> Result<(), ServiceError> {
            if !self.rows.lock().unwrap().iter().any(|r| r.id == vacation_id) {
                return Err(ServiceError::NotFound("Vacation not found".into()));
            }
            self.followers.lock().unwrap().insert((user_id, vacation_id));
            Ok(())
        }

        async fn unfollow(&self, user_id: Uuid, vacation_id: Uuid) -> Result<(), ServiceError> {
            self.followers.lock().unwrap().remove(&(user_id, vacation_id));
            Ok(())
        }

        async fn report(&self) -> Result<Vec<ReportRow>, ServiceError> {
            let mut rows: Vec<Row> = self.rows.lock().unwrap().clone();
            rows.sort_by(|a, b| a.draft.destination.cmp(&b.draft.destination).then(a.id.cmp(&b.id)));
            Ok(rows
                .iter()
                .map(|r| {
                    let v = self.view(r, None);
                    ReportRow { destination: v.destination, followers_count: v.followers_count }
                })
                .collect())
        }
    }
}
