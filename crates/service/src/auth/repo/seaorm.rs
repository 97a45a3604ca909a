use sea_orm::{DatabaseConnection, TransactionTrait};
use uuid::Uuid;

use crate::auth::domain::{AuthUser, Credentials, NewUser};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmAuthRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_domain(u: models::user::Model) -> AuthUser {
    AuthUser { id: u.id, first_name: u.first_name, last_name: u.last_name, email: u.email, is_admin: u.is_admin }
}

fn map_insert_err(e: models::errors::ModelError) -> AuthError {
    match e {
        models::errors::ModelError::Validation(m) => AuthError::Validation(m),
        // lost a race with a concurrent registration of the same email
        models::errors::ModelError::Conflict(_) => AuthError::Conflict,
        models::errors::ModelError::Db(m) => AuthError::Repository(m),
    }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_domain))
    }

    async fn create_user(
        &self,
        user: NewUser,
        password_hash: String,
        password_algorithm: String,
    ) -> Result<AuthUser, AuthError> {
        let txn = self.db.begin().await.map_err(|e| AuthError::Repository(e.to_string()))?;
        let created = match models::user::create(&txn, &user.first_name, &user.last_name, &user.email, user.is_admin).await {
            Ok(u) => u,
            Err(e) => {
                let _ = txn.rollback().await;
                return Err(map_insert_err(e));
            }
        };
        if let Err(e) = models::user_credentials::upsert_password(&txn, created.id, password_hash, &password_algorithm).await {
            let _ = txn.rollback().await;
            return Err(map_insert_err(e));
        }
        txn.commit().await.map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(to_domain(created))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = models::user_credentials::find_by_user(&self.db, user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }
}
