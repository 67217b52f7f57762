use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Bookmark join record; both sides are user ids.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavedMentor {
    pub id: Uuid,
    pub aspirant_id: Uuid,
    pub mentor_id: Uuid,
    pub created_at: OffsetDateTime,
}

impl SavedMentor {
    pub async fn save(db: &PgPool, aspirant_id: Uuid, mentor_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO saved_mentors (aspirant_id, mentor_id)
            VALUES ($1, $2)
            ON CONFLICT (aspirant_id, mentor_id) DO NOTHING
            "#,
        )
        .bind(aspirant_id)
        .bind(mentor_id)
        .execute(db)
        .await?;
        Ok(())
    }

    pub async fn unsave(db: &PgPool, aspirant_id: Uuid, mentor_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "DELETE FROM saved_mentors WHERE aspirant_id = $1 AND mentor_id = $2",
        )
        .bind(aspirant_id)
        .bind(mentor_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn exists(db: &PgPool, aspirant_id: Uuid, mentor_id: Uuid) -> anyhow::Result<bool> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM saved_mentors WHERE aspirant_id = $1 AND mentor_id = $2",
        )
        .bind(aspirant_id)
        .bind(mentor_id)
        .fetch_optional(db)
        .await?;
        Ok(row.is_some())
    }

    pub async fn mentor_ids_for(db: &PgPool, aspirant_id: Uuid) -> anyhow::Result<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT mentor_id FROM saved_mentors
            WHERE aspirant_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(aspirant_id)
        .fetch_all(db)
        .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
