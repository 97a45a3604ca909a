use std::sync::Arc;

use service::auth::{repository::AuthRepository, service::AuthConfig, AuthService};
use service::images::ImageStore;
use service::vacation::{repository::VacationRepository, VacationService};

/// Shared handler state; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService<dyn AuthRepository>>,
    pub vacations: Arc<VacationService<dyn VacationRepository>>,
}

impl AppState {
    pub fn new(
        auth_repo: Arc<dyn AuthRepository>,
        vacation_repo: Arc<dyn VacationRepository>,
        cfg: &configs::AppConfig,
    ) -> Self {
        let auth = AuthService::new(auth_repo, AuthConfig::from_settings(&cfg.auth));
        let vacations = VacationService::new(vacation_repo, ImageStore::from_config(&cfg.uploads));
        Self::from_parts(auth, vacations)
    }

    pub fn from_parts(
        auth: AuthService<dyn AuthRepository>,
        vacations: VacationService<dyn VacationRepository>,
    ) -> Self {
        Self { auth: Arc::new(auth), vacations: Arc::new(vacations) }
    }

    pub fn images(&self) -> &ImageStore {
        self.vacations.images()
    }
}
