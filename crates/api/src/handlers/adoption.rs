//! Handlers for adoption requests: filing, cancelling and deciding.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use catalist_core::adoption::{
    ensure_transition, validate_decision, validate_message, AdoptionStatus,
};
use catalist_core::cat::CatStatus;
use catalist_core::error::CoreError;
use catalist_core::types::DbId;
use catalist_core::validation::validate_phone;
use catalist_db::models::adoption::{
    AdoptionRequest, AdoptionRequestDetail, CreateAdoptionRequest,
};
use catalist_db::repositories::{AdoptionRepo, UserRepo};
use catalist_events::bus::{EVENT_ADOPTION_DECIDED, EVENT_ADOPTION_REQUESTED};
use catalist_events::DomainEvent;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::handlers::cats::find_cat;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::query::{ApiQuery, StatusFilter};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /api/cats/{id}/adopt`.
#[derive(Debug, Default, Deserialize)]
pub struct AdoptRequest {
    pub message: Option<String>,
    pub contact_phone: Option<String>,
}

/// Request body for `PUT /api/admin/adoptions/{id}`.
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    /// `approved` or `rejected`.
    pub status: String,
    pub admin_note: Option<String>,
}

/// POST /api/cats/{id}/adopt
pub async fn adopt(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(cat_id): Path<DbId>,
    Json(input): Json<AdoptRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AdoptionRequest>>)> {
    let message = non_blank(input.message);
    let contact_phone = non_blank(input.contact_phone);
    validate_message(message.as_deref())?;
    validate_phone(contact_phone.as_deref())?;

    let cat = find_cat(&state, cat_id).await?;
    if !CatStatus::parse(&cat.status)?.accepts_requests() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "{} is not available for adoption",
            cat.name
        ))));
    }

    if AdoptionRepo::has_pending(&state.pool, cat_id, auth_user.user_id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "You already have a pending request for this cat".into(),
        )));
    }

    let request = AdoptionRepo::create(
        &state.pool,
        &CreateAdoptionRequest {
            cat_id,
            user_id: auth_user.user_id,
            message,
            contact_phone,
        },
    )
    .await?;

    let email = UserRepo::find_by_id(&state.pool, auth_user.user_id)
        .await?
        .map(|u| u.email);
    state.event_bus.publish(
        DomainEvent::new(EVENT_ADOPTION_REQUESTED)
            .with_entity("adoption_request", request.id)
            .with_actor(auth_user.user_id)
            .with_payload(serde_json::json!({
                "cat_name": cat.name,
                "email": email,
            })),
    );

    tracing::info!(
        request_id = request.id,
        cat_id,
        user_id = auth_user.user_id,
        "Adoption requested"
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// GET /api/adoptions
pub async fn list_mine(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<AdoptionRequestDetail>>>> {
    let requests = AdoptionRepo::list_for_user(&state.pool, auth_user.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// DELETE /api/adoptions/{id}
///
/// Requests of other users are reported as missing.
pub async fn cancel(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AdoptionRequest>>> {
    let request = AdoptionRepo::find_by_id(&state.pool, id)
        .await?
        .filter(|r| r.user_id == auth_user.user_id)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AdoptionRequest",
            id,
        }))?;

    ensure_transition(AdoptionStatus::parse(&request.status)?, AdoptionStatus::Cancelled)?;

    let cancelled = AdoptionRepo::cancel(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Conflict("Request is no longer pending".into())))?;

    tracing::info!(request_id = id, user_id = auth_user.user_id, "Adoption request cancelled");
    Ok(Json(DataResponse { data: cancelled }))
}

/// GET /api/admin/adoptions
pub async fn list_all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<StatusFilter>,
) -> AppResult<Json<DataResponse<Vec<AdoptionRequestDetail>>>> {
    let status = filter
        .value()
        .map(|s| AdoptionStatus::parse(&s.to_lowercase()))
        .transpose()?;
    let requests = AdoptionRepo::list(&state.pool, status).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// PUT /api/admin/adoptions/{id}
///
/// Approving also adopts the cat and rejects the competing pending requests;
/// every affected applicant is notified.
pub async fn decide(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DecisionRequest>,
) -> AppResult<Json<DataResponse<AdoptionRequestDetail>>> {
    let decision = AdoptionStatus::parse(&input.status.trim().to_lowercase())?;
    validate_decision(decision)?;
    let note = non_blank(input.admin_note);
    validate_message(note.as_deref())?;

    let current = AdoptionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AdoptionRequest",
            id,
        }))?;
    ensure_transition(AdoptionStatus::parse(&current.status)?, decision)?;

    let not_pending = || AppError::Core(CoreError::Conflict("Request is no longer pending".into()));
    let superseded = match decision {
        AdoptionStatus::Approved => {
            let (_, superseded) =
                AdoptionRepo::approve(&state.pool, id, admin.user_id, note.as_deref())
                    .await?
                    .ok_or_else(not_pending)?;
            superseded
        }
        _ => {
            AdoptionRepo::reject(&state.pool, id, admin.user_id, note.as_deref())
                .await?
                .ok_or_else(not_pending)?;
            Vec::new()
        }
    };

    let detail = AdoptionRepo::find_detail(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "AdoptionRequest",
            id,
        }))?;
    publish_decision(&state, &detail, admin.user_id);

    for other_id in &superseded {
        if let Some(other) = AdoptionRepo::find_detail(&state.pool, *other_id).await? {
            publish_decision(&state, &other, admin.user_id);
        }
    }

    tracing::info!(
        request_id = id,
        admin_id = admin.user_id,
        status = decision.as_str(),
        superseded = superseded.len(),
        "Adoption request decided"
    );
    Ok(Json(DataResponse { data: detail }))
}

fn publish_decision(state: &AppState, detail: &AdoptionRequestDetail, admin_id: DbId) {
    state.event_bus.publish(
        DomainEvent::new(EVENT_ADOPTION_DECIDED)
            .with_entity("adoption_request", detail.id)
            .with_actor(admin_id)
            .with_payload(serde_json::json!({
                "email": detail.applicant_email,
                "name": detail.applicant_name,
                "cat_name": detail.cat_name,
                "status": detail.status,
                "admin_note": detail.admin_note,
            })),
    );
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
