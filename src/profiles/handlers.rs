use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{repo::UserRole, services::AuthUser},
    error::AppError,
    profiles::{
        dto::{JourneyRequest, JourneyResponse, OnboardingRequest, ProfileResponse, UpdateProfileRequest},
        repo::Profile,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/onboarding", post(complete_onboarding))
        .route("/profiles/me", get(get_my_profile).put(update_my_profile))
        .route("/profiles/me/journey", put(update_journey))
        .route("/profiles/:id", get(get_profile))
}

#[instrument(skip(state, payload))]
pub async fn complete_onboarding(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<OnboardingRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    if payload.role == UserRole::Admin {
        warn!(%user_id, "onboarding attempted with admin role");
        return Err(AppError::validation("Choose aspirant or mentor"));
    }

    if Profile::find_by_user(&state.db, user_id).await?.is_some() {
        return Err(AppError::conflict("Profile already exists"));
    }

    let profile = Profile::create_with_role(&state.db, user_id, payload.role, payload.fields).await?;
    info!(%user_id, profile_id = %profile.id, role = ?payload.role, "onboarding complete");
    Ok(Json(ProfileResponse::from(profile)))
}

#[instrument(skip(state))]
pub async fn get_my_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound("profile"))?;
    Ok(Json(ProfileResponse::from(profile)))
}

#[instrument(skip(state, payload))]
pub async fn update_my_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let existing = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound("profile"))?;

    let role = if existing.is_studying_abroad {
        UserRole::Mentor
    } else {
        UserRole::Aspirant
    };
    let fields = payload.fields.merged_over(&existing).scoped_to(role);
    let profile = Profile::update_fields(&state.db, user_id, fields)
        .await?
        .ok_or(AppError::NotFound("profile"))?;

    info!(%user_id, completeness = crate::profiles::completeness::completeness(&profile), "profile updated");
    Ok(Json(ProfileResponse::from(profile)))
}

#[instrument(skip(state, payload))]
pub async fn update_journey(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<JourneyRequest>,
) -> Result<Json<JourneyResponse>, AppError> {
    let profile = Profile::update_journey(&state.db, user_id, payload.checklist)
        .await?
        .ok_or(AppError::NotFound("profile"))?;
    Ok(Json(JourneyResponse::from(profile.journey_checklist.0)))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(_viewer): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = Profile::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("profile"))?;
    Ok(Json(ProfileResponse::from(profile)))
}
