use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::images::{ImageStore, UploadedImage};
use crate::pagination::Pagination;
use crate::report;
use super::domain::{ReportRow, Vacation, VacationForm, VacationPage};
use super::filter::VacationFilter;
use super::repository::VacationRepository;
use super::validation::{validate, WriteMode};

pub type Clock = fn() -> NaiveDateTime;

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn vacation_not_found() -> ServiceError {
    ServiceError::NotFound("Vacation not found".into())
}

/// Listing/report queries plus admin writes that keep image files in step with rows.
pub struct VacationService<R: VacationRepository + ?Sized> {
    repo: Arc<R>,
    images: ImageStore,
    clock: Clock,
}

impl<R: VacationRepository + ?Sized> VacationService<R> {
    pub fn new(repo: Arc<R>, images: ImageStore) -> Self {
        Self { repo, images, clock: local_now }
    }

    /// Replace the wall clock used for filters and date validation.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn images(&self) -> &ImageStore { &self.images }

    #[instrument(skip(self, filter), fields(filter = %filter))]
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: Pagination,
        filter: VacationFilter,
    ) -> Result<VacationPage, ServiceError> {
        self.repo.list_for_user(user_id, filter, page, (self.clock)()).await
    }

    /// `None` when absent; callers decide whether that is a 404.
    pub async fn get_by_id(&self, id: Uuid, current_user: Option<Uuid>) -> Result<Option<Vacation>, ServiceError> {
        self.repo.get(id, current_user).await
    }

    pub async fn report(&self) -> Result<Vec<ReportRow>, ServiceError> {
        self.repo.report().await
    }

    pub async fn report_csv(&self) -> Result<String, ServiceError> {
        report::to_csv(&self.repo.report().await?)
    }

    /// Validate, store the image, insert; the image is removed again if the insert fails.
    #[instrument(skip(self, form, image))]
    pub async fn create(&self, form: VacationForm, image: Option<UploadedImage>) -> Result<Vacation, ServiceError> {
        let image = image.ok_or_else(|| ServiceError::Validation("Image file is required".into()))?;
        let draft = validate(&form, WriteMode::Create, (self.clock)().date())?;
        let stored = self.images.store(&image).await?;
        match self.repo.insert(&draft, &stored).await {
            Ok(created) => {
                info!(id = %created.id, image = %stored, "vacation created");
                Ok(created)
            }
            Err(e) => {
                warn!(image = %stored, error = %e, "insert failed; removing stored image");
                self.images.remove(&stored).await;
                Err(e)
            }
        }
    }

    /// The previous image is deleted only after the row points at the new one.
    #[instrument(skip(self, form, image))]
    pub async fn update(&self, id: Uuid, form: VacationForm, image: Option<UploadedImage>) -> Result<Vacation, ServiceError> {
        let existing = self.repo.get(id, None).await?.ok_or_else(vacation_not_found)?;
        let draft = validate(&form, WriteMode::Update, (self.clock)().date())?;
        let stored = match &image {
            Some(upload) => Some(self.images.store(upload).await?),
            None => None,
        };

        let updated = match self.repo.update(id, &draft, stored.as_deref()).await {
            Ok(Some(v)) => v,
            failed => {
                if let Some(name) = &stored {
                    warn!(image = %name, "update failed; removing newly stored image");
                    self.images.remove(name).await;
                }
                return Err(match failed {
                    Err(e) => e,
                    _ => vacation_not_found(),
                });
            }
        };

        if let Some(name) = &stored {
            if *name != existing.image {
                self.images.remove(&existing.image).await;
            }
        }
        info!(%id, replaced_image = stored.is_some(), "vacation updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.repo.get(id, None).await?.ok_or_else(vacation_not_found)?;
        if !self.repo.delete(id).await? {
            return Err(vacation_not_found());
        }
        self.images.remove(&existing.image).await;
        info!(%id, "vacation deleted");
        Ok(())
    }

    pub async fn follow(&self, user_id: Uuid, vacation_id: Uuid) -> Result<(), ServiceError> {
        self.repo.follow(user_id, vacation_id).await
    }

    pub async fn unfollow(&self, user_id: Uuid, vacation_id: Uuid) -> Result<(), ServiceError> {
        self.repo.unfollow(user_id, vacation_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vacation::repository::mock::InMemoryVacationRepository;
    use crate::vacation::VacationDraft;
    use chrono::NaiveDate;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2030, 6, 15).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    /// Removes the per-test images directory when dropped.
    struct TempImages(std::path::PathBuf);

    impl Drop for TempImages {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn setup() -> (Arc<InMemoryVacationRepository>, VacationService<InMemoryVacationRepository>, TempImages) {
        let repo = Arc::new(InMemoryVacationRepository::default());
        let dir = std::env::temp_dir().join(format!("vacation-images-{}", Uuid::new_v4()));
        let svc = VacationService::new(repo.clone(), ImageStore::new(&dir, 1024 * 1024)).with_clock(fixed_now);
        (repo, svc, TempImages(dir))
    }

    fn form(destination: &str, start: &str, end: &str) -> VacationForm {
        VacationForm {
            destination: Some(destination.into()),
            description: Some("Nice place".into()),
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            price: Some("999".into()),
        }
    }

    fn jpeg() -> UploadedImage {
        UploadedImage { bytes: vec![0xFF, 0xD8, 0xFF, 0xE0], content_type: "image/jpeg".into(), original_name: Some("beach.jpg".into()) }
    }

    fn draft(destination: &str, start: NaiveDate, end: NaiveDate) -> VacationDraft {
        VacationDraft { destination: destination.into(), description: "d".into(), start_date: start, end_date: end, price: 100.0 }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

    #[tokio::test]
    async fn create_stores_image_and_row() {
        let (_repo, svc, _dir) = setup();
        let v = svc.create(form("Eilat", "2030-07-01", "2030-07-05"), Some(jpeg())).await.unwrap();
        assert!(v.image.ends_with(".jpg"));
        assert!(svc.images().exists(&v.image).await);
        assert_eq!(v.followers_count, 0);
    }

    #[tokio::test]
    async fn create_requires_image() {
        let (_repo, svc, _dir) = setup();
        let err = svc.create(form("Eilat", "2030-07-01", "2030-07-05"), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m) if m == "Image file is required"));
    }

    #[tokio::test]
    async fn failed_insert_leaves_no_files() {
        let (repo, svc, _dir) = setup();
        repo.set_fail_writes(true);
        let err = svc.create(form("Eilat", "2030-07-01", "2030-07-05"), Some(jpeg())).await.unwrap_err();
        assert!(matches!(err, ServiceError::Db(_)));
        assert_eq!(svc.images().count().await, 0);
    }

    #[tokio::test]
    async fn invalid_create_writes_nothing() {
        let (_repo, svc, _dir) = setup();
        let err = svc.create(form("Eilat", "2030-06-01", "2030-07-05"), Some(jpeg())).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(m) if m == "Past dates are not allowed for new vacations"));
        assert_eq!(svc.images().count().await, 0);
    }

    #[tokio::test]
    async fn failed_update_keeps_original_and_drops_new_file() {
        let (repo, svc, _dir) = setup();
        let v = svc.create(form("Eilat", "2030-07-01", "2030-07-05"), Some(jpeg())).await.unwrap();
        repo.set_fail_writes(true);
        let err = svc.update(v.id, form("Eilat", "2030-07-01", "2030-07-06"), Some(jpeg())).await.unwrap_err();
        assert!(matches!(err, ServiceError::Db(_)));
        assert!(svc.images().exists(&v.image).await);
        assert_eq!(svc.images().count().await, 1);
        assert_eq!(svc.get_by_id(v.id, None).await.unwrap().unwrap().image, v.image);
    }

    #[tokio::test]
    async fn successful_update_replaces_image_file() {
        let (_repo, svc, _dir) = setup();
        let v = svc.create(form("Eilat", "2030-07-01", "2030-07-05"), Some(jpeg())).await.unwrap();
        let updated = svc.update(v.id, form("Eilat", "2030-07-01", "2030-07-06"), Some(jpeg())).await.unwrap();
        assert_ne!(updated.image, v.image);
        assert!(!svc.images().exists(&v.image).await);
        assert!(svc.images().exists(&updated.image).await);
        assert_eq!(svc.images().count().await, 1);
    }

    #[tokio::test]
    async fn update_without_image_keeps_file_and_allows_past_dates() {
        let (_repo, svc, _dir) = setup();
        let v = svc.create(form("Eilat", "2030-07-01", "2030-07-05"), Some(jpeg())).await.unwrap();
        let updated = svc.update(v.id, form("Haifa", "2020-01-01", "2020-01-03"), None).await.unwrap();
        assert_eq!(updated.image, v.image);
        assert_eq!(updated.destination, "Haifa");
        assert!(svc.images().exists(&v.image).await);
    }

    #[tokio::test]
    async fn update_missing_vacation_is_not_found_and_stores_nothing() {
        let (_repo, svc, _dir) = setup();
        let err = svc.update(Uuid::new_v4(), form("X", "2030-07-01", "2030-07-02"), Some(jpeg())).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(svc.images().count().await, 0);
    }

    #[tokio::test]
    async fn invalid_update_drops_nothing() {
        let (_repo, svc, _dir) = setup();
        let v = svc.create(form("Eilat", "2030-07-01", "2030-07-05"), Some(jpeg())).await.unwrap();
        let err = svc.update(v.id, form("Eilat", "2030-07-05", "2030-07-01"), Some(jpeg())).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(svc.images().count().await, 1);
        assert!(svc.images().exists(&v.image).await);
    }

    #[tokio::test]
    async fn delete_removes_row_and_file() {
        let (_repo, svc, _dir) = setup();
        let v = svc.create(form("Eilat", "2030-07-01", "2030-07-05"), Some(jpeg())).await.unwrap();
        svc.delete(v.id).await.unwrap();
        assert!(svc.get_by_id(v.id, None).await.unwrap().is_none());
        assert_eq!(svc.images().count().await, 0);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found_without_touching_files() {
        let (_repo, svc, _dir) = setup();
        let v = svc.create(form("Eilat", "2030-07-01", "2030-07-05"), Some(jpeg())).await.unwrap();
        let err = svc.delete(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(m) if m == "Vacation not found"));
        assert_eq!(svc.images().count().await, 1);
        assert!(svc.images().exists(&v.image).await);
    }

    #[tokio::test]
    async fn delete_tolerates_missing_file() {
        let (_repo, svc, _dir) = setup();
        let v = svc.create(form("Eilat", "2030-07-01", "2030-07-05"), Some(jpeg())).await.unwrap();
        svc.images().remove(&v.image).await;
        svc.delete(v.id).await.unwrap();
    }

    #[tokio::test]
    async fn follow_is_idempotent() {
        let (repo, svc, _dir) = setup();
        let user = Uuid::new_v4();
        let id = repo.seed(draft("Rome", date(2030, 7, 1), date(2030, 7, 3)), "rome.jpg");
        svc.follow(user, id).await.unwrap();
        svc.follow(user, id).await.unwrap();
        assert_eq!(repo.follower_rows(), 1);
        let v = svc.get_by_id(id, Some(user)).await.unwrap().unwrap();
        assert_eq!(v.followers_count, 1);
        assert!(v.is_followed_by_current_user);
        svc.unfollow(user, id).await.unwrap();
        svc.unfollow(user, id).await.unwrap();
        assert_eq!(repo.follower_rows(), 0);
    }

    #[tokio::test]
    async fn follow_missing_vacation_is_not_found() {
        let (_repo, svc, _dir) = setup();
        let err = svc.follow(Uuid::new_v4(), Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn following_total_matches_followed_vacations() {
        let (repo, svc, _dir) = setup();
        let me = Uuid::new_v4();
        let others = [Uuid::new_v4(), Uuid::new_v4()];
        let _zero = repo.seed(draft("Zero", date(2030, 8, 1), date(2030, 8, 2)), "a.jpg");
        let one = repo.seed(draft("One", date(2030, 8, 1), date(2030, 8, 2)), "b.jpg");
        let many = repo.seed(draft("Many", date(2030, 8, 1), date(2030, 8, 2)), "c.jpg");
        let theirs = repo.seed(draft("Theirs", date(2030, 8, 1), date(2030, 8, 2)), "d.jpg");
        svc.follow(me, one).await.unwrap();
        svc.follow(me, many).await.unwrap();
        for u in others {
            svc.follow(u, many).await.unwrap();
            svc.follow(u, theirs).await.unwrap();
        }

        let page = svc.list_for_user(me, Pagination::default(), VacationFilter::Following).await.unwrap();
        assert_eq!(page.total_count, 2);
        assert!(page.vacations.iter().all(|v| v.is_followed_by_current_user));
        let all = svc.list_for_user(me, Pagination::default(), VacationFilter::All).await.unwrap();
        assert_eq!(all.total_count, 4);
    }

    #[tokio::test]
    async fn start_now_is_active_not_upcoming() {
        let (repo, svc, _dir) = setup();
        let user = Uuid::new_v4();
        let today = repo.seed(draft("Today", date(2030, 6, 15), date(2030, 6, 20)), "t.jpg");
        let later = repo.seed(draft("Later", date(2030, 6, 16), date(2030, 6, 20)), "l.jpg");
        let page = Pagination::default();

        let upcoming = svc.list_for_user(user, page, VacationFilter::Upcoming).await.unwrap();
        let ids: Vec<Uuid> = upcoming.vacations.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![later]);

        let active = svc.list_for_user(user, page, VacationFilter::Active).await.unwrap();
        let ids: Vec<Uuid> = active.vacations.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![today]);
    }

    #[tokio::test]
    async fn pages_are_offset_based() {
        let (repo, svc, _dir) = setup();
        for day in 1..=8 {
            repo.seed(draft(&format!("D{day}"), date(2030, 9, day), date(2030, 9, day)), "x.jpg");
        }
        let second = svc.list_for_user(Uuid::new_v4(), Pagination::new(2, 6), VacationFilter::All).await.unwrap();
        assert_eq!(second.total_count, 8);
        let names: Vec<&str> = second.vacations.iter().map(|v| v.destination.as_str()).collect();
        assert_eq!(names, vec!["D7", "D8"]);
    }

    #[tokio::test]
    async fn report_csv_lists_every_vacation_by_destination() {
        let (repo, svc, _dir) = setup();
        let b = repo.seed(draft("Berlin", date(2030, 7, 1), date(2030, 7, 2)), "b.jpg");
        repo.seed(draft("Athens", date(2030, 7, 1), date(2030, 7, 2)), "a.jpg");
        svc.follow(Uuid::new_v4(), b).await.unwrap();
        let csv = svc.report_csv().await.unwrap();
        assert_eq!(csv, "destination,followersCount\nAthens,0\nBerlin,1\n");
    }

    #[tokio::test]
    async fn images_directory_is_removed_after_test() {
        let (_repo, svc, dir) = setup();
        svc.create(form("Eilat", "2030-07-01", "2030-07-05"), Some(jpeg())).await.unwrap();
        let path = svc.images().dir().to_path_buf();
        assert!(path.exists());
        drop(dir);
        assert!(!path.exists());
    }
}
