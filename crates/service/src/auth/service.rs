use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use rand::rngs::OsRng;
use tracing::{info, debug, instrument};

use super::domain::{AuthSession, AuthUser, LoginInput, NewUser, RegisterInput};
use super::errors::AuthError;
use super::repository::AuthRepository;
use super::token::{Claims, TokenKeys};

pub const MIN_PASSWORD_LEN: usize = 4;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub keys: TokenKeys,
    pub password_algorithm: String,
}

impl AuthConfig {
    pub fn from_settings(cfg: &configs::AuthConfig) -> Self {
        Self { keys: TokenKeys::new(&cfg.jwt_secret, cfg.token_ttl_hours), password_algorithm: "argon2".into() }
    }
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository + ?Sized> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

/// `local@domain.tld` with no whitespace and a single `@`.
pub fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else { return false };
    let clean = |s: &str| !s.is_empty() && !s.contains('@') && !s.chars().any(char::is_whitespace);
    if !clean(local) || !clean(domain) {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::HashError(e.to_string()))
}

impl<R: AuthRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    pub fn keys(&self) -> &TokenKeys { &self.cfg.keys }

    /// Register a new (non-admin) user and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository, TokenKeys};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { keys: TokenKeys::new("secret", 1), password_algorithm: "argon2".into() });
    /// let input = RegisterInput { first_name: "Dana".into(), last_name: "Levi".into(), email: "dana@example.com".into(), password: "Secret123".into() };
    /// let session = tokio_test::block_on(svc.register(input)).unwrap();
    /// assert_eq!(session.user.email, "dana@example.com");
    /// assert!(!session.user.is_admin);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<AuthSession, AuthError> {
        let first_name = input.first_name.trim();
        let last_name = input.last_name.trim();
        let email = input.email.trim();
        if first_name.is_empty() || last_name.is_empty() || email.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("All fields are required".into()));
        }
        if input.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::Validation(format!("Password must be at least {MIN_PASSWORD_LEN} characters")));
        }
        if !looks_like_email(email) {
            return Err(AuthError::Validation("Invalid email format".into()));
        }
        if let Some(existing) = self.repo.find_user_by_email(email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let hash = hash_password(&input.password)?;
        let user = self
            .repo
            .create_user(
                NewUser { first_name: first_name.into(), last_name: last_name.into(), email: email.into(), is_admin: false },
                hash,
                self.cfg.password_algorithm.clone(),
            )
            .await?;
        info!(user_id = %user.id, email = %user.email, "user_registered");
        let token = self.cfg.keys.issue(&user)?;
        Ok(AuthSession { user, token })
    }

    /// Authenticate a user and issue a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository, TokenKeys};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { keys: TokenKeys::new("secret", 1), password_algorithm: "argon2".into() });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { first_name: "N".into(), last_name: "M".into(), email: "u@e.com".into(), password: "Passw0rd".into() }));
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        if input.email.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("Email and password are required".into()));
        }
        let user = self.repo
            .find_user_by_email(input.email.trim())
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let token = self.cfg.keys.issue(&user)?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { user, token })
    }

    pub async fn is_email_free(&self, email: &str) -> Result<bool, AuthError> {
        Ok(self.repo.find_user_by_email(email.trim()).await?.is_none())
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.cfg.keys.verify(token)
    }

    /// Create the configured admin account unless its email is already taken.
    #[instrument(skip(self, admin), fields(email = %admin.email))]
    pub async fn ensure_admin(&self, admin: &configs::BootstrapAdmin) -> Result<Option<AuthUser>, AuthError> {
        if self.repo.find_user_by_email(admin.email.trim()).await?.is_some() {
            debug!("bootstrap admin already present");
            return Ok(None);
        }
        let hash = hash_password(&admin.password)?;
        let user = self
            .repo
            .create_user(
                NewUser {
                    first_name: admin.first_name.clone(),
                    last_name: admin.last_name.clone(),
                    email: admin.email.trim().to_string(),
                    is_admin: true,
                },
                hash,
                self.cfg.password_algorithm.clone(),
            )
            .await?;
        info!(user_id = %user.id, "bootstrap_admin_created");
        Ok(Some(user))
    }
}
