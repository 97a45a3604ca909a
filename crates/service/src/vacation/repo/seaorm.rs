use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, FromQueryResult};
use tracing::debug;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::pagination::Pagination;
use crate::vacation::domain::{ReportRow, Vacation, VacationDraft, VacationPage};
use crate::vacation::filter::VacationFilter;
use crate::vacation::query;
use crate::vacation::repository::VacationRepository;

pub struct SeaOrmVacationRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmVacationRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[derive(Debug, FromQueryResult)]
struct VacationRow {
    id: Uuid,
    destination: String,
    description: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    price: f64,
    image: String,
    followers_count: i64,
    is_followed: bool,
}

impl From<VacationRow> for Vacation {
    fn from(r: VacationRow) -> Self {
        Vacation {
            id: r.id,
            destination: r.destination,
            description: r.description,
            start_date: r.start_date,
            end_date: r.end_date,
            price: r.price,
            image: r.image,
            followers_count: r.followers_count,
            is_followed_by_current_user: r.is_followed,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    cnt: i64,
}

#[derive(Debug, FromQueryResult)]
struct ReportQueryRow {
    destination: String,
    followers_count: i64,
}

fn new_vacation(draft: &VacationDraft, image: String) -> models::vacation::NewVacation {
    models::vacation::NewVacation {
        destination: draft.destination.clone(),
        description: draft.description.clone(),
        start_date: draft.start_date,
        end_date: draft.end_date,
        price: draft.price,
        image,
    }
}

#[async_trait]
impl VacationRepository for SeaOrmVacationRepository {
    async fn list_for_user(
        &self,
        user_id: Uuid,
        filter: VacationFilter,
        page: Pagination,
        now: NaiveDateTime,
    ) -> Result<VacationPage, ServiceError> {
        let rows = VacationRow::find_by_statement(query::list_query(user_id, filter, now, page).statement())
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let total = CountRow::find_by_statement(query::count_query(user_id, filter, now).statement())
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let total_count = total.map(|c| c.cnt).unwrap_or(0);
        debug!(%filter, rows = rows.len(), total_count, "vacations listed");
        Ok(VacationPage { vacations: rows.into_iter().map(Vacation::from).collect(), total_count })
    }

    async fn get(&self, id: Uuid, current_user: Option<Uuid>) -> Result<Option<Vacation>, ServiceError> {
        let row = VacationRow::find_by_statement(query::by_id_query(id, current_user).statement())
            .one(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(row.map(Vacation::from))
    }

    async fn insert(&self, draft: &VacationDraft, image: &str) -> Result<Vacation, ServiceError> {
        let m = models::vacation::create(&self.db, new_vacation(draft, image.to_string())).await?;
        Ok(Vacation {
            id: m.id,
            destination: m.destination,
            description: m.description,
            start_date: m.start_date,
            end_date: m.end_date,
            price: m.price,
            image: m.image,
            followers_count: 0,
            is_followed_by_current_user: false,
        })
    }

    async fn update(&self, id: Uuid, draft: &VacationDraft, image: Option<&str>) -> Result<Option<Vacation>, ServiceError> {
        let image = match image {
            Some(name) => name.to_string(),
            None => match models::vacation::Entity::find_by_id(id).one(&self.db).await? {
                Some(existing) => existing.image,
                None => return Ok(None),
            },
        };
        if models::vacation::update(&self.db, id, new_vacation(draft, image)).await?.is_none() {
            return Ok(None);
        }
        self.get(id, None).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(models::vacation::hard_delete(&self.db, id).await?)
    }

    async fn follow(&self, user_id: Uuid, vacation_id: Uuid) -> Result<(), ServiceError> {
        if models::vacation::Entity::find_by_id(vacation_id).one(&self.db).await?.is_none() {
            return Err(ServiceError::NotFound("Vacation not found".into()));
        }
        let res = self.db.execute(query::follow_statement(user_id, vacation_id).statement()).await?;
        debug!(%user_id, %vacation_id, inserted = res.rows_affected(), "follow");
        Ok(())
    }

    async fn unfollow(&self, user_id: Uuid, vacation_id: Uuid) -> Result<(), ServiceError> {
        self.db.execute(query::unfollow_statement(user_id, vacation_id).statement()).await?;
        Ok(())
    }

    async fn report(&self) -> Result<Vec<ReportRow>, ServiceError> {
        let rows = ReportQueryRow::find_by_statement(query::report_query().statement())
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(rows
            .into_iter()
            .map(|r| ReportRow { destination: r.destination, followers_count: r.followers_count })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use chrono::Duration;

    fn draft(destination: &str, start: NaiveDate, days: i64) -> VacationDraft {
        VacationDraft {
            destination: destination.to_string(),
            description: "db test".to_string(),
            start_date: start,
            end_date: start + Duration::days(days),
            price: 500.0,
        }
    }

    async fn user(db: &DatabaseConnection) -> Uuid {
        let email = format!("repo_{}@example.com", Uuid::new_v4());
        models::user::create(db, "Repo", "Tester", &email, false).await.unwrap().id
    }

    #[tokio::test]
    async fn following_total_counts_distinct_followed_vacations() {
        let Some(db) = get_db().await else { return };
        let repo = SeaOrmVacationRepository::new(db.clone());
        let me = user(&db).await;
        let other_a = user(&db).await;
        let other_b = user(&db).await;
        let start = NaiveDate::from_ymd_opt(2040, 1, 1).unwrap();

        let zero = repo.insert(&draft("Zero", start, 3), "zero.jpg").await.unwrap();
        let one = repo.insert(&draft("One", start, 3), "one.jpg").await.unwrap();
        let many = repo.insert(&draft("Many", start, 3), "many.jpg").await.unwrap();
        let others_only = repo.insert(&draft("Others", start, 3), "others.jpg").await.unwrap();

        repo.follow(me, one.id).await.unwrap();
        for u in [me, other_a, other_b] {
            repo.follow(u, many.id).await.unwrap();
        }
        repo.follow(other_a, others_only.id).await.unwrap();

        let page = repo
            .list_for_user(me, VacationFilter::Following, Pagination::default(), chrono::Local::now().naive_local())
            .await
            .unwrap();
        assert_eq!(page.total_count, 2);
        let ids: Vec<Uuid> = page.vacations.iter().map(|v| v.id).collect();
        assert!(ids.contains(&one.id) && ids.contains(&many.id));
        let many_view = page.vacations.iter().find(|v| v.id == many.id).unwrap();
        assert_eq!(many_view.followers_count, 3);
        assert!(many_view.is_followed_by_current_user);

        for v in [zero.id, one.id, many.id, others_only.id] {
            repo.delete(v).await.unwrap();
        }
    }

    #[tokio::test]
    async fn start_exactly_now_is_active_not_upcoming() {
        let Some(db) = get_db().await else { return };
        let repo = SeaOrmVacationRepository::new(db.clone());
        let me = user(&db).await;
        let day = NaiveDate::from_ymd_opt(2041, 5, 5).unwrap();
        let now = day.and_hms_opt(0, 0, 0).unwrap();
        let v = repo.insert(&draft("Boundary", day, 2), "boundary.jpg").await.unwrap();

        let upcoming = repo.list_for_user(me, VacationFilter::Upcoming, Pagination::new(1, 100), now).await.unwrap();
        assert!(upcoming.vacations.iter().all(|x| x.id != v.id));
        let active = repo.list_for_user(me, VacationFilter::Active, Pagination::new(1, 100), now).await.unwrap();
        assert!(active.vacations.iter().any(|x| x.id == v.id));

        repo.delete(v.id).await.unwrap();
    }

    #[tokio::test]
    async fn page_far_past_the_end_is_empty() {
        let Some(db) = get_db().await else { return };
        let repo = SeaOrmVacationRepository::new(db.clone());
        let me = user(&db).await;
        let page = Pagination::from_raw(Some("100000000000000000"), Some("100"));
        let out = repo
            .list_for_user(me, VacationFilter::All, page, chrono::Local::now().naive_local())
            .await
            .unwrap();
        assert!(out.vacations.is_empty());
    }

    #[tokio::test]
    async fn follow_twice_keeps_one_row() {
        let Some(db) = get_db().await else { return };
        let repo = SeaOrmVacationRepository::new(db.clone());
        let me = user(&db).await;
        let v = repo
            .insert(&draft("Twice", NaiveDate::from_ymd_opt(2042, 2, 2).unwrap(), 1), "twice.jpg")
            .await
            .unwrap();
        repo.follow(me, v.id).await.unwrap();
        repo.follow(me, v.id).await.unwrap();
        let view = repo.get(v.id, Some(me)).await.unwrap().unwrap();
        assert_eq!(view.followers_count, 1);
        assert!(view.is_followed_by_current_user);

        repo.unfollow(me, v.id).await.unwrap();
        repo.unfollow(me, v.id).await.unwrap();
        assert_eq!(repo.get(v.id, Some(me)).await.unwrap().unwrap().followers_count, 0);

        let missing = repo.follow(me, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(missing, ServiceError::NotFound(_)));
        repo.delete(v.id).await.unwrap();
    }

    #[tokio::test]
    async fn update_without_image_keeps_previous_file_name() {
        let Some(db) = get_db().await else { return };
        let repo = SeaOrmVacationRepository::new(db.clone());
        let start = NaiveDate::from_ymd_opt(2043, 3, 3).unwrap();
        let v = repo.insert(&draft("Keep", start, 1), "keep.png").await.unwrap();
        let updated = repo.update(v.id, &draft("Kept", start, 2), None).await.unwrap().unwrap();
        assert_eq!(updated.image, "keep.png");
        assert_eq!(updated.destination, "Kept");
        assert!(repo.update(Uuid::new_v4(), &draft("None", start, 1), None).await.unwrap().is_none());
        repo.delete(v.id).await.unwrap();
    }
}
