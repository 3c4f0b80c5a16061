//! REST endpoints for the profile setup wizard.
//!
//! Handlers are thin: take the engine lock, delegate, map the error
//! taxonomy onto HTTP statuses.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use crate::error::{PhotoError, WizardError};
use crate::navigation::RedirectNavigator;
use crate::photo::crop::CropRect;
use crate::photo::file::{SelectedFile, MAX_FILE_SIZE_BYTES};
use crate::profile::model::SkillEntry;

use super::engine::{StepForm, WizardEngine};
use super::step::WizardStep;

/// Shared state for the wizard routes.
#[derive(Clone)]
pub struct WizardRouteState {
    pub engine: Arc<RwLock<WizardEngine>>,
    pub navigator: Arc<RedirectNavigator>,
}

#[derive(Debug, Deserialize)]
struct AddSkillRequest {
    step: WizardStep,
    #[serde(flatten)]
    entry: SkillEntry,
}

#[derive(Debug, Deserialize)]
struct RemoveSkillRequest {
    step: WizardStep,
    index: usize,
}

/// GET /api/wizard/status
async fn get_status(State(state): State<WizardRouteState>) -> impl IntoResponse {
    let engine = state.engine.read().await;
    Json(engine.status())
}

/// GET /api/wizard/profile — the accumulated committed profile data.
async fn get_profile(State(state): State<WizardRouteState>) -> impl IntoResponse {
    let engine = state.engine.read().await;
    Json(engine.state().profile().clone())
}

/// POST /api/wizard/next
async fn post_next(
    State(state): State<WizardRouteState>,
    Json(form): Json<StepForm>,
) -> Response {
    let mut engine = state.engine.write().await;
    match engine.next(form).await {
        Ok(step) => Json(json!({ "current_step": step })).into_response(),
        Err(err) => error_response(err),
    }
}

/// POST /api/wizard/previous
async fn post_previous(State(state): State<WizardRouteState>) -> Response {
    let mut engine = state.engine.write().await;
    match engine.previous() {
        Ok(step) => Json(json!({ "current_step": step })).into_response(),
        Err(err) => error_response(err),
    }
}

/// POST /api/wizard/save-exit
async fn post_save_exit(
    State(state): State<WizardRouteState>,
    Json(form): Json<StepForm>,
) -> Response {
    let mut engine = state.engine.write().await;
    match engine.save_and_exit(form).await {
        Ok(()) => {
            let redirect = state.navigator.redirect_path().await;
            Json(json!({ "redirect": redirect })).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// POST /api/wizard/finish — terminal navigation from the photo step.
async fn post_finish(State(state): State<WizardRouteState>) -> Response {
    let mut engine = state.engine.write().await;
    match engine.finish().await {
        Ok(step) => {
            let redirect = state.navigator.redirect_path().await;
            Json(json!({ "current_step": step, "redirect": redirect })).into_response()
        }
        Err(err) => error_response(err),
    }
}

/// POST /api/wizard/skills/add
async fn post_add_skill(
    State(state): State<WizardRouteState>,
    Json(request): Json<AddSkillRequest>,
) -> Response {
    let mut engine = state.engine.write().await;
    match engine.add_skill(request.step, request.entry) {
        Ok(count) => Json(json!({ "count": count })).into_response(),
        Err(err) => error_response(err),
    }
}

/// POST /api/wizard/skills/remove
async fn post_remove_skill(
    State(state): State<WizardRouteState>,
    Json(request): Json<RemoveSkillRequest>,
) -> Response {
    let mut engine = state.engine.write().await;
    match engine.remove_skill(request.step, request.index) {
        Ok(removed) => Json(json!({ "removed": removed })).into_response(),
        Err(err) => error_response(err),
    }
}

/// POST /api/wizard/photo/select — multipart with a single `file` field.
async fn post_photo_select(
    State(state): State<WizardRouteState>,
    mut multipart: Multipart,
) -> Response {
    let mut selected: Option<SelectedFile> = None;
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => {
                let name = field.file_name().unwrap_or("photo").to_string();
                let mime = field.content_type().unwrap_or("").to_string();
                match field.bytes().await {
                    Ok(bytes) => {
                        selected = Some(SelectedFile::new(name, mime, bytes.to_vec()));
                        break;
                    }
                    Err(e) => {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({ "error": format!("Invalid upload: {e}") })),
                        )
                            .into_response();
                    }
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("Invalid upload: {e}") })),
                )
                    .into_response();
            }
        }
    }

    let Some(file) = selected else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No file provided for upload." })),
        )
            .into_response();
    };

    let mut engine = state.engine.write().await;
    match engine.select_photo(file) {
        Ok(()) => Json(engine.status()).into_response(),
        Err(err) => error_response(err),
    }
}

/// POST /api/wizard/photo/crop — replace the pending crop region.
async fn post_photo_crop(
    State(state): State<WizardRouteState>,
    Json(rect): Json<CropRect>,
) -> Response {
    let mut engine = state.engine.write().await;
    match engine.set_photo_crop(rect) {
        Ok(()) => Json(engine.status()).into_response(),
        Err(err) => error_response(err),
    }
}

/// POST /api/wizard/photo/confirm — crop, upload, persist the URL.
async fn post_photo_confirm(State(state): State<WizardRouteState>) -> Response {
    let mut engine = state.engine.write().await;
    match engine.confirm_crop_and_upload().await {
        Ok(url) => Json(json!({ "url": url })).into_response(),
        Err(err) => error_response(err),
    }
}

/// POST /api/wizard/photo/cancel
async fn post_photo_cancel(State(state): State<WizardRouteState>) -> Response {
    let mut engine = state.engine.write().await;
    match engine.cancel_crop() {
        Ok(()) => Json(engine.status()).into_response(),
        Err(err) => error_response(err),
    }
}

/// DELETE /api/wizard/photo
async fn delete_photo(State(state): State<WizardRouteState>) -> Response {
    let mut engine = state.engine.write().await;
    match engine.delete_photo().await {
        Ok(()) => Json(engine.status()).into_response(),
        Err(err) => error_response(err),
    }
}

/// Map the wizard error taxonomy to HTTP. Validation errors carry their
/// field map; everything else is a single message.
fn error_response(err: WizardError) -> Response {
    let status = match &err {
        WizardError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WizardError::Persistence { .. } => StatusCode::BAD_GATEWAY,
        WizardError::MissingUser => StatusCode::UNAUTHORIZED,
        WizardError::StepMismatch { .. } | WizardError::NotSkillsStep => StatusCode::CONFLICT,
        WizardError::Photo(photo) => match photo {
            PhotoError::UnsupportedType | PhotoError::TooLarge | PhotoError::Decode(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PhotoError::UploadFailed(_) => StatusCode::BAD_GATEWAY,
            PhotoError::Busy | PhotoError::CropPending => StatusCode::CONFLICT,
            PhotoError::CropFailed | PhotoError::NothingToUpload | PhotoError::NoPhoto => {
                StatusCode::BAD_REQUEST
            }
        },
    };
    let body = match err {
        WizardError::Validation(result) => {
            json!({ "error": "Validation failed", "errors": result.errors })
        }
        other => json!({ "error": other.to_string() }),
    };
    (status, Json(body)).into_response()
}

/// Build the wizard REST routes.
pub fn wizard_routes(state: WizardRouteState) -> Router {
    Router::new()
        .route("/api/wizard/status", get(get_status))
        .route("/api/wizard/profile", get(get_profile))
        .route("/api/wizard/next", post(post_next))
        .route("/api/wizard/previous", post(post_previous))
        .route("/api/wizard/save-exit", post(post_save_exit))
        .route("/api/wizard/finish", post(post_finish))
        .route("/api/wizard/skills/add", post(post_add_skill))
        .route("/api/wizard/skills/remove", post(post_remove_skill))
        .route("/api/wizard/photo/select", post(post_photo_select))
        .route("/api/wizard/photo/crop", post(post_photo_crop))
        .route("/api/wizard/photo/confirm", post(post_photo_confirm))
        .route("/api/wizard/photo/cancel", post(post_photo_cancel))
        .route("/api/wizard/photo", delete(delete_photo))
        // Leave headroom above the photo size ceiling so our own check
        // produces the user-facing message instead of a 413.
        .layer(DefaultBodyLimit::max(MAX_FILE_SIZE_BYTES * 2))
        .with_state(state)
}
