use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        repo::{User, UserRole},
        services::AuthUser,
    },
    error::AppError,
    profiles::repo::Profile,
    questions::{
        dto::{
            AnswerView, AuthorSummary, CreateAnswerBody, CreateQuestionBody, Pagination,
            QuestionDetail, QuestionResponse,
        },
        relevance::{relevant_questions, DEFAULT_RELEVANT_LIMIT},
        repo::{Answer, Question},
    },
    state::AppState,
};

// pool size scanned for keyword relevance before truncation
const RELEVANCE_POOL: i64 = 50;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/relevant", get(list_relevant))
        .route("/questions/:id", get(get_question))
        .route("/questions/:id/answers", post(create_answer))
        .route("/questions/:id/answers/:answer_id/pin", post(pin_answer))
}

async fn require_role(state: &AppState, user_id: Uuid, role: UserRole) -> Result<User, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".into()))?;
    if user.role != role {
        return Err(AppError::forbidden(match role {
            UserRole::Aspirant => "Only aspirants can ask questions",
            UserRole::Mentor => "Only mentors can answer questions",
            UserRole::Admin => "Admin access required",
        }));
    }
    Ok(user)
}

#[instrument(skip(state))]
pub async fn list_questions(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<QuestionResponse>>, AppError> {
    let questions = Question::list_recent(&state.db, p.limit, p.offset).await?;
    Ok(Json(questions.into_iter().map(QuestionResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_question(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateQuestionBody>,
) -> Result<Json<QuestionResponse>, AppError> {
    require_role(&state, user_id, UserRole::Aspirant).await?;

    let title = payload.title.trim();
    let content = payload.content.trim();
    if title.is_empty() || content.is_empty() {
        return Err(AppError::validation("Title and content are required"));
    }

    let question = Question::create(&state.db, user_id, title, content).await?;
    info!(question_id = %question.id, author = %user_id, "question posted");
    Ok(Json(QuestionResponse::from(question)))
}

/// Questions matching the caller's profile keywords, at most three.
#[instrument(skip(state))]
pub async fn list_relevant(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<QuestionResponse>>, AppError> {
    let profile = Profile::find_by_user(&state.db, user_id)
        .await?
        .ok_or(AppError::NotFound("profile"))?;

    let pool = Question::list_recent(&state.db, RELEVANCE_POOL, 0).await?;
    let relevant = relevant_questions(&profile, &pool, DEFAULT_RELEVANT_LIMIT);
    Ok(Json(relevant.into_iter().map(QuestionResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_question(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<QuestionDetail>, AppError> {
    let question = Question::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("question"))?;

    let answers = Answer::list_for_question(&state.db, id).await?;
    let author_ids: Vec<Uuid> = answers.iter().map(|a| a.author_id).collect();
    let authors = if author_ids.is_empty() {
        Vec::new()
    } else {
        Profile::list_by_user_ids(&state.db, &author_ids).await?
    };

    let answers = answers
        .into_iter()
        .map(|answer| {
            let author = authors
                .iter()
                .find(|p| p.user_id == answer.author_id)
                .map(AuthorSummary::from);
            AnswerView::new(answer, author)
        })
        .collect();

    Ok(Json(QuestionDetail {
        question: QuestionResponse::from(question),
        answers,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_answer(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateAnswerBody>,
) -> Result<Json<AnswerView>, AppError> {
    require_role(&state, user_id, UserRole::Mentor).await?;

    Question::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("question"))?;

    let content = payload.content.trim();
    if content.is_empty() {
        return Err(AppError::validation("Answer cannot be empty"));
    }

    let answer = Answer::create(&state.db, id, user_id, content).await?;
    let author = Profile::find_by_user(&state.db, user_id)
        .await?
        .as_ref()
        .map(AuthorSummary::from);
    info!(question_id = %id, author = %user_id, "answer posted");
    Ok(Json(AnswerView::new(answer, author)))
}

/// Marks an answer as best. Only the question author may pin, and at
/// most one answer per question ends up pinned.
#[instrument(skip(state))]
pub async fn pin_answer(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((id, answer_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Vec<AnswerView>>, AppError> {
    let question = Question::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound("question"))?;
    if question.author_id != user_id {
        warn!(%user_id, question_id = %id, "pin refused for non-author");
        return Err(AppError::forbidden("Only the question author can pick a best answer"));
    }

    if !Answer::pin(&state.db, id, answer_id).await? {
        return Err(AppError::NotFound("answer"));
    }

    let answers = Answer::list_for_question(&state.db, id).await?;
    Ok(Json(
        answers
            .into_iter()
            .map(|a| AnswerView::new(a, None))
            .collect(),
    ))
}
