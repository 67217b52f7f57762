use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::profiles::repo::Profile;
use crate::questions::repo::{Answer, Question};

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct CreateQuestionBody {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateAnswerBody {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: OffsetDateTime,
}

impl From<Question> for QuestionResponse {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            title: q.title,
            content: q.content,
            author_id: q.author_id,
            created_at: q.created_at,
        }
    }
}

/// Who wrote an answer, shown inline on the question page.
#[derive(Debug, Serialize)]
pub struct AuthorSummary {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub university: Option<String>,
    pub course: Option<String>,
    pub current_country: Option<String>,
}

impl From<&Profile> for AuthorSummary {
    fn from(p: &Profile) -> Self {
        Self {
            user_id: p.user_id,
            full_name: p.full_name.clone(),
            university: p.university.clone(),
            course: p.course.clone(),
            current_country: p.current_country.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnswerView {
    pub id: Uuid,
    pub content: String,
    pub is_pinned: bool,
    pub created_at: OffsetDateTime,
    pub author: Option<AuthorSummary>,
}

impl AnswerView {
    pub fn new(answer: Answer, author: Option<AuthorSummary>) -> Self {
        Self {
            id: answer.id,
            content: answer.content,
            is_pinned: answer.is_pinned,
            created_at: answer.created_at,
            author,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QuestionDetail {
    #[serde(flatten)]
    pub question: QuestionResponse,
    pub answers: Vec<AnswerView>,
}
