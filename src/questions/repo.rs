use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub id: Uuid,
    pub question_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub is_pinned: bool,
    pub created_at: OffsetDateTime,
}

impl Question {
    pub async fn create(
        db: &PgPool,
        author_id: Uuid,
        title: &str,
        content: &str,
    ) -> anyhow::Result<Question> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            INSERT INTO questions (title, content, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, author_id, created_at
            "#,
        )
        .bind(title)
        .bind(content)
        .bind(author_id)
        .fetch_one(db)
        .await?;
        Ok(question)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Question>> {
        let question = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, title, content, author_id, created_at
            FROM questions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(question)
    }

    pub async fn list_recent(db: &PgPool, limit: i64, offset: i64) -> anyhow::Result<Vec<Question>> {
        let rows = sqlx::query_as::<_, Question>(
            r#"
            SELECT id, title, content, author_id, created_at
            FROM questions
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

impl Answer {
    pub async fn create(
        db: &PgPool,
        question_id: Uuid,
        author_id: Uuid,
        content: &str,
    ) -> anyhow::Result<Answer> {
        let answer = sqlx::query_as::<_, Answer>(
            r#"
            INSERT INTO answers (question_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, question_id, author_id, content, is_pinned, created_at
            "#,
        )
        .bind(question_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(db)
        .await?;
        Ok(answer)
    }

    /// Pinned answer first, then chronological.
    pub async fn list_for_question(db: &PgPool, question_id: Uuid) -> anyhow::Result<Vec<Answer>> {
        let rows = sqlx::query_as::<_, Answer>(
            r#"
            SELECT id, question_id, author_id, content, is_pinned, created_at
            FROM answers
            WHERE question_id = $1
            ORDER BY is_pinned DESC, created_at ASC
            "#,
        )
        .bind(question_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Marks one answer as best. Clear-all and set-one run in a single
    /// transaction; if the target row is missing the whole operation
    /// rolls back and the previous pin survives.
    pub async fn pin(db: &PgPool, question_id: Uuid, answer_id: Uuid) -> anyhow::Result<bool> {
        let mut tx = db.begin().await?;

        sqlx::query("UPDATE answers SET is_pinned = false WHERE question_id = $1")
            .bind(question_id)
            .execute(&mut *tx)
            .await?;

        let updated = sqlx::query(
            "UPDATE answers SET is_pinned = true WHERE id = $1 AND question_id = $2",
        )
        .bind(answer_id)
        .bind(question_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() != 1 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}
