use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String, pub version: String }

#[derive(ToSchema)]
pub struct ErrorResponse { pub message: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct RegisterRequest { pub first_name: String, pub last_name: String, pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct TokenResponse { pub token: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct CheckEmailResponse { pub is_free: bool }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ClaimsDoc {
    pub sub: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub iat: i64,
    pub exp: i64,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct VacationDoc {
    pub id: Uuid,
    pub destination: String,
    pub description: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: chrono::NaiveDate,
    pub price: f64,
    /// Stored file name, served under `/images/`.
    pub image: String,
    pub followers_count: i64,
    pub is_followed_by_current_user: bool,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct VacationPageDoc { pub vacations: Vec<VacationDoc>, pub total_count: i64 }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ReportRowDoc { pub destination: String, pub followers_count: i64 }

/// Multipart form for create/update; `image` is required on create.
#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct VacationUpload {
    pub destination: String,
    pub description: String,
    /// `YYYY-MM-DD`
    pub start_date: String,
    pub end_date: String,
    pub price: String,
    #[schema(value_type = Option<String>, format = Binary)]
    pub image: Option<Vec<u8>>,
}

pub struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::check_email,
        crate::routes::auth::me,
        crate::routes::vacations::list,
        crate::routes::vacations::get_one,
        crate::routes::vacations::report,
        crate::routes::vacations::report_csv,
        crate::routes::vacations::create,
        crate::routes::vacations::update,
        crate::routes::vacations::delete,
        crate::routes::vacations::follow,
        crate::routes::vacations::unfollow,
    ),
    components(
        schemas(
            HealthResponse,
            ErrorResponse,
            RegisterRequest,
            LoginRequest,
            TokenResponse,
            CheckEmailResponse,
            ClaimsDoc,
            VacationDoc,
            VacationPageDoc,
            ReportRowDoc,
            VacationUpload,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "vacations"),
        (name = "followers"),
        (name = "reports")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_vacation_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/vacations"));
        assert!(doc.paths.paths.contains_key("/api/vacations/{id}/follow"));
        assert!(doc.paths.paths.contains_key("/api/user/register"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
