use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::services::AuthUser,
    error::AppError,
    guidance::{
        dto::{
            CounterpartSummary, CreateRequestBody, MessageResponse, RequestFilter, RequestView,
            SendMessageBody,
        },
        lifecycle::RequestStatus,
        repo::{GuidanceMessage, GuidanceRequest},
    },
    profiles::{
        completeness::{completeness, CONNECT_THRESHOLD},
        repo::Profile,
    },
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/requests", get(list_requests).post(create_request))
        .route("/requests/:id/accept", post(accept_request))
        .route("/requests/:id/reject", post(reject_request))
        .route("/requests/:id/messages", get(list_messages).post(send_message))
        .route("/requests/:id/events", get(stream_messages))
}

#[instrument(skip(state, payload))]
pub async fn create_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateRequestBody>,
) -> Result<Json<RequestView>, AppError> {
    if payload.mentor_id == user_id {
        return Err(AppError::validation("You cannot request guidance from yourself"));
    }

    let aspirant = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound("profile"))?;
    if aspirant.is_studying_abroad {
        return Err(AppError::forbidden("Only aspirants can send guidance requests"));
    }

    // Precondition gate: nothing touches the store below the threshold.
    let score = completeness(&aspirant);
    if score < CONNECT_THRESHOLD {
        warn!(%user_id, score, "connect blocked by incomplete profile");
        return Err(AppError::validation(format!(
            "Your profile is {score}% complete; reach at least {CONNECT_THRESHOLD}% before connecting"
        )));
    }

    let mentor = Profile::find_by_user(&state.db, payload.mentor_id)
        .await?
        .filter(|p| p.is_studying_abroad && !p.is_banned)
        .ok_or(AppError::NotFound("mentor"))?;

    let request = GuidanceRequest::create(&state.db, user_id, mentor.user_id)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::conflict("You already have a pending request to this mentor")
            }
            _ => AppError::from(e),
        })?;

    info!(request_id = %request.id, aspirant = %user_id, mentor = %mentor.user_id, "guidance request created");
    Ok(Json(RequestView::new(request, Some(CounterpartSummary::from(&mentor)))))
}

#[instrument(skip(state))]
pub async fn list_requests(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(filter): Query<RequestFilter>,
) -> Result<Json<Vec<RequestView>>, AppError> {
    let requests = GuidanceRequest::list_for_user(&state.db, user_id, filter.status).await?;

    let counterpart_ids: Vec<Uuid> = requests.iter().map(|r| r.counterpart_of(user_id)).collect();
    let profiles = if counterpart_ids.is_empty() {
        Vec::new()
    } else {
        Profile::list_by_user_ids(&state.db, &counterpart_ids).await?
    };

    let views = requests
        .into_iter()
        .map(|request| {
            let other = request.counterpart_of(user_id);
            let summary = profiles
                .iter()
                .find(|p| p.user_id == other)
                .map(CounterpartSummary::from);
            RequestView::new(request, summary)
        })
        .collect();
    Ok(Json(views))
}

async fn resolve(
    state: &AppState,
    user_id: Uuid,
    request_id: Uuid,
    next: RequestStatus,
) -> Result<GuidanceRequest, AppError> {
    let request = GuidanceRequest::find_by_id(&state.db, request_id)
        .await?
        .ok_or(AppError::NotFound("request"))?;

    if request.mentor_id != user_id {
        return Err(AppError::forbidden("Only the requested mentor can act on this request"));
    }
    if !request.status.can_transition(next) {
        return Err(AppError::conflict(format!(
            "Request is already {:?}",
            request.status
        )));
    }

    // The WHERE status = 'PENDING' guard makes concurrent accept/reject
    // pick exactly one winner.
    GuidanceRequest::resolve_pending(&state.db, request_id, next)
        .await?
        .ok_or_else(|| AppError::conflict("Request was already resolved"))
}

#[instrument(skip(state))]
pub async fn accept_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestView>, AppError> {
    let request = resolve(&state, user_id, id, RequestStatus::Accepted).await?;
    info!(request_id = %id, mentor = %user_id, "request accepted");
    Ok(Json(RequestView::new(request, None)))
}

#[instrument(skip(state))]
pub async fn reject_request(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestView>, AppError> {
    let request = resolve(&state, user_id, id, RequestStatus::Rejected).await?;
    info!(request_id = %id, mentor = %user_id, "request rejected");
    Ok(Json(RequestView::new(request, None)))
}

/// Chat guard: participants only, and only once the request is ACCEPTED.
async fn load_chat(
    state: &AppState,
    request_id: Uuid,
    user_id: Uuid,
) -> Result<GuidanceRequest, AppError> {
    let request = GuidanceRequest::find_by_id(&state.db, request_id)
        .await?
        .ok_or(AppError::NotFound("request"))?;

    if !request.is_participant(user_id) {
        warn!(%user_id, %request_id, "chat access refused for non-participant");
        return Err(AppError::forbidden("You are not a participant in this conversation"));
    }
    if request.status != RequestStatus::Accepted {
        return Err(AppError::conflict("Chat is only available for accepted requests"));
    }
    Ok(request)
}

#[instrument(skip(state))]
pub async fn list_messages(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    load_chat(&state, id, user_id).await?;
    let messages = GuidanceMessage::list_for_request(&state.db, id).await?;
    Ok(Json(messages.into_iter().map(MessageResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn send_message(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SendMessageBody>,
) -> Result<Json<MessageResponse>, AppError> {
    load_chat(&state, id, user_id).await?;

    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::validation("Message cannot be empty"));
    }

    let message = MessageResponse::from(GuidanceMessage::create(&state.db, id, user_id, content).await?);
    state.chat.publish(id, message.clone());
    Ok(Json(message))
}

#[instrument(skip(state))]
pub async fn stream_messages(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    load_chat(&state, id, user_id).await?;

    let rx = state.chat.subscribe(id);
    let stream = BroadcastStream::new(rx).filter_map(|item| match item {
        Ok(message) => Event::default()
            .event("message")
            .json_data(&message)
            .ok()
            .map(Ok),
        // a lagged reader just skips what it missed; history comes from
        // the messages endpoint, not the stream
        Err(_) => None,
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
