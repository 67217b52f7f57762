use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    error::AppError,
    guidance::repo::GuidanceRequest,
    mentors::{
        dto::{MentorCard, MentorDetail},
        ranking::{rank_mentors, score_mentor},
        repo::SavedMentor,
    },
    profiles::repo::Profile,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/mentors", get(list_mentors))
        .route("/mentors/saved", get(list_saved))
        .route("/mentors/:id", get(get_mentor))
        .route("/mentors/:id/save", put(save_mentor).delete(unsave_mentor))
}

/// Resolves a directory id to a mentor profile or 404s.
async fn load_mentor(state: &AppState, profile_id: Uuid) -> Result<Profile, AppError> {
    let profile = Profile::find_by_id(&state.db, profile_id)
        .await?
        .filter(|p| p.is_studying_abroad)
        .ok_or(AppError::NotFound("mentor"))?;
    Ok(profile)
}

#[instrument(skip(state))]
pub async fn list_mentors(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MentorCard>>, AppError> {
    let viewer = Profile::find_by_user(&state.db, user_id).await?;
    let mentors = Profile::list_mentors(&state.db).await?;

    let cards = rank_mentors(viewer.as_ref(), mentors)
        .into_iter()
        .map(|(score, p)| MentorCard::from_scored(score, p))
        .collect();
    Ok(Json(cards))
}

#[instrument(skip(state))]
pub async fn get_mentor(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MentorDetail>, AppError> {
    let mentor = load_mentor(&state, id).await?;
    let viewer = Profile::find_by_user(&state.db, user_id).await?;

    let request_status = GuidanceRequest::latest_for_pair(&state.db, user_id, mentor.user_id)
        .await?
        .map(|r| r.status);
    let is_saved = SavedMentor::exists(&state.db, user_id, mentor.user_id).await?;

    let score = score_mentor(viewer.as_ref(), &mentor);
    let bio = mentor.bio.clone();
    let linkedin = mentor.linkedin.clone();
    Ok(Json(MentorDetail {
        card: MentorCard::from_scored(score, mentor),
        bio,
        linkedin,
        request_status,
        is_saved,
    }))
}

#[instrument(skip(state))]
pub async fn save_mentor(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mentor = load_mentor(&state, id).await?;
    if mentor.user_id == user_id {
        return Err(AppError::validation("You cannot save yourself"));
    }

    SavedMentor::save(&state.db, user_id, mentor.user_id).await?;
    info!(%user_id, mentor_user = %mentor.user_id, "mentor saved");
    Ok(Json(serde_json::json!({ "saved": true })))
}

#[instrument(skip(state))]
pub async fn unsave_mentor(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let mentor = load_mentor(&state, id).await?;
    let removed = SavedMentor::unsave(&state.db, user_id, mentor.user_id).await?;
    Ok(Json(serde_json::json!({ "saved": false, "removed": removed })))
}

#[instrument(skip(state))]
pub async fn list_saved(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<MentorCard>>, AppError> {
    let viewer = Profile::find_by_user(&state.db, user_id).await?;
    let mentor_ids = SavedMentor::mentor_ids_for(&state.db, user_id).await?;
    if mentor_ids.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let profiles = Profile::list_by_user_ids(&state.db, &mentor_ids).await?;
    // keep the bookmark order, newest save first
    let mut cards = Vec::with_capacity(mentor_ids.len());
    for mentor_id in mentor_ids {
        if let Some(p) = profiles.iter().find(|p| p.user_id == mentor_id) {
            cards.push(MentorCard::from_scored(
                score_mentor(viewer.as_ref(), p),
                p.clone(),
            ));
        }
    }
    Ok(Json(cards))
}
