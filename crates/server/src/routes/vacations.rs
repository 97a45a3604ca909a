use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use service::images::{ImageStore, UploadedImage};
use service::pagination::Pagination;
use service::vacation::{ReportRow, Vacation, VacationFilter, VacationForm, VacationPage};

use crate::errors::ApiError;
use crate::routes::auth::CurrentUser;
use crate::state::AppState;

pub const REPORT_FILE_NAME: &str = "vacations-report.csv";

/// Raw listing parameters; bad values fall back to defaults instead of rejecting.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub filter: Option<String>,
}

/// Ids that are not UUIDs cannot name a vacation.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::not_found("Vacation not found"))
}

#[utoipa::path(get, path = "/api/vacations", tag = "vacations", params(
    ("page" = Option<u64>, Query, description = "1-based page, default 1"),
    ("pageSize" = Option<u64>, Query, description = "Page size, default 6"),
    ("filter" = Option<String>, Query, description = "all | following | upcoming | active"),
), responses((status = 200, description = "Page of vacations", body = crate::openapi::VacationPageDoc), (status = 401, description = "Unauthorized", body = crate::openapi::ErrorResponse)), security(("bearer" = [])))]
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(q): Query<ListQuery>,
) -> Result<Json<VacationPage>, ApiError> {
    let page = Pagination::from_raw(q.page.as_deref(), q.page_size.as_deref());
    let filter = VacationFilter::parse(q.filter.as_deref());
    let out = state.vacations.list_for_user(user.id, page, filter).await?;
    Ok(Json(out))
}

#[utoipa::path(get, path = "/api/vacations/{id}", tag = "vacations", params(("id" = String, Path, description = "Vacation id")), responses((status = 200, description = "Vacation", body = crate::openapi::VacationDoc), (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)), security(("bearer" = [])))]
pub async fn get_one(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<Vacation>, ApiError> {
    let id = parse_id(&id)?;
    state
        .vacations
        .get_by_id(id, Some(user.id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Vacation not found"))
}

#[utoipa::path(get, path = "/api/vacations/report", tag = "reports", responses((status = 200, description = "Followers per destination", body = [crate::openapi::ReportRowDoc]), (status = 403, description = "Forbidden", body = crate::openapi::ErrorResponse)), security(("bearer" = [])))]
pub async fn report(State(state): State<AppState>) -> Result<Json<Vec<ReportRow>>, ApiError> {
    Ok(Json(state.vacations.report().await?))
}

#[utoipa::path(get, path = "/api/vacations/report/csv", tag = "reports", responses((status = 200, description = "CSV attachment", body = String, content_type = "text/csv"), (status = 403, description = "Forbidden", body = crate::openapi::ErrorResponse)), security(("bearer" = [])))]
pub async fn report_csv(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.vacations.report_csv().await?;
    let disposition = format!("attachment; filename=\"{}\"", REPORT_FILE_NAME);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

#[utoipa::path(post, path = "/api/vacations", tag = "vacations", request_body(content = crate::openapi::VacationUpload, content_type = "multipart/form-data"), responses((status = 201, description = "Created", body = crate::openapi::VacationDoc), (status = 400, description = "Bad Request", body = crate::openapi::ErrorResponse), (status = 403, description = "Forbidden", body = crate::openapi::ErrorResponse)), security(("bearer" = [])))]
pub async fn create(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Vacation>), ApiError> {
    let (form, image) = read_form(multipart, state.images()).await?;
    let created = state.vacations.create(form, image).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/api/vacations/{id}", tag = "vacations", params(("id" = String, Path, description = "Vacation id")), request_body(content = crate::openapi::VacationUpload, content_type = "multipart/form-data"), responses((status = 200, description = "Updated", body = crate::openapi::VacationDoc), (status = 400, description = "Bad Request", body = crate::openapi::ErrorResponse), (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)), security(("bearer" = [])))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<Vacation>, ApiError> {
    let id = parse_id(&id)?;
    let (form, image) = read_form(multipart, state.images()).await?;
    Ok(Json(state.vacations.update(id, form, image).await?))
}

#[utoipa::path(delete, path = "/api/vacations/{id}", tag = "vacations", params(("id" = String, Path, description = "Vacation id")), responses((status = 204, description = "Deleted"), (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)), security(("bearer" = [])))]
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.vacations.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(post, path = "/api/vacations/{id}/follow", tag = "followers", params(("id" = String, Path, description = "Vacation id")), responses((status = 201, description = "Following"), (status = 403, description = "Admins cannot follow", body = crate::openapi::ErrorResponse), (status = 404, description = "Not Found", body = crate::openapi::ErrorResponse)), security(("bearer" = [])))]
pub async fn follow(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.vacations.follow(user.id, id).await?;
    Ok(StatusCode::CREATED)
}

#[utoipa::path(delete, path = "/api/vacations/{id}/follow", tag = "followers", params(("id" = String, Path, description = "Vacation id")), responses((status = 204, description = "Not following")), security(("bearer" = [])))]
pub async fn unfollow(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.vacations.unfollow(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn upload_error(e: MultipartError) -> ApiError {
    warn!(err = %e, "multipart read failed");
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::bad_request("Image is too large")
    } else {
        ApiError::bad_request("Invalid upload")
    }
}

/// Collect text fields into a [`VacationForm`] and the `image` part into an
/// [`UploadedImage`]. The image type is checked before its body is read and its
/// size is enforced while streaming.
async fn read_form(
    mut multipart: Multipart,
    images: &ImageStore,
) -> Result<(VacationForm, Option<UploadedImage>), ApiError> {
    let mut form = VacationForm::default();
    let mut image = None;

    while let Some(mut field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name != "image" {
            let value = field.text().await.map_err(upload_error)?;
            form.set(&name, value);
            continue;
        }

        // Browsers send an empty file part when no file was chosen.
        let original_name = field.file_name().map(str::to_string);
        if original_name.as_deref().map_or(true, str::is_empty) {
            debug!("skipping empty image part");
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        images.check_content_type(&content_type)?;

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(upload_error)? {
            images.check_size(bytes.len() + chunk.len())?;
            bytes.extend_from_slice(&chunk);
        }
        if bytes.is_empty() {
            return Err(ApiError::bad_request("Invalid image file"));
        }
        image = Some(UploadedImage { bytes, content_type, original_name });
    }

    Ok((form, image))
}
