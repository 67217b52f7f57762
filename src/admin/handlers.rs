use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    admin::{
        dto::{DirectoryQuery, SetBanBody, SetRoleBody, SetVerificationBody},
        repo,
    },
    auth::{
        repo::{User, UserRole},
        services::AuthUser,
    },
    error::AppError,
    profiles::dto::ProfileResponse,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:user_id/role", put(set_role))
        .route("/admin/users/:user_id", delete(delete_user))
        .route("/admin/profiles/:id/verification", put(set_verification))
        .route("/admin/profiles/:id/ban", put(set_ban))
}

async fn require_admin(state: &AppState, user_id: Uuid) -> Result<User, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    if user.role != UserRole::Admin {
        warn!(%user_id, "admin endpoint refused");
        return Err(AppError::forbidden("Admin access required"));
    }
    Ok(user)
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<DirectoryQuery>,
) -> Result<Json<Vec<repo::DirectoryRow>>, AppError> {
    require_admin(&state, user_id).await?;
    let search = q.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let rows = repo::list_directory(&state.db, search).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, payload))]
pub async fn set_role(
    State(state): State<AppState>,
    AuthUser(admin_id): AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<SetRoleBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&state, admin_id).await?;

    if !repo::set_role(&state.db, user_id, payload.role).await? {
        return Err(AppError::NotFound("user"));
    }
    info!(%admin_id, %user_id, role = ?payload.role, "role changed");
    Ok(Json(serde_json::json!({ "user_id": user_id, "role": payload.role })))
}

#[instrument(skip(state, payload))]
pub async fn set_verification(
    State(state): State<AppState>,
    AuthUser(admin_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetVerificationBody>,
) -> Result<Json<ProfileResponse>, AppError> {
    require_admin(&state, admin_id).await?;

    let profile = repo::set_verification(&state.db, id, payload.status)
        .await?
        .ok_or(AppError::NotFound("profile"))?;
    info!(%admin_id, profile_id = %id, status = ?payload.status, "verification updated");
    Ok(Json(ProfileResponse::from(profile)))
}

#[instrument(skip(state, payload))]
pub async fn set_ban(
    State(state): State<AppState>,
    AuthUser(admin_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetBanBody>,
) -> Result<Json<ProfileResponse>, AppError> {
    require_admin(&state, admin_id).await?;

    let profile = repo::set_ban(&state.db, id, payload.banned)
        .await?
        .ok_or(AppError::NotFound("profile"))?;
    info!(%admin_id, profile_id = %id, banned = payload.banned, "ban flag updated");
    Ok(Json(ProfileResponse::from(profile)))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(admin_id): AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    require_admin(&state, admin_id).await?;

    if admin_id == user_id {
        return Err(AppError::validation("Admins cannot delete themselves"));
    }
    if !repo::delete_user(&state.db, user_id).await? {
        return Err(AppError::NotFound("user"));
    }
    info!(%admin_id, %user_id, "user deleted");
    Ok(Json(serde_json::json!({ "deleted": user_id })))
}
