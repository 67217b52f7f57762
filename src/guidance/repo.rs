use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::guidance::lifecycle::RequestStatus;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GuidanceRequest {
    pub id: Uuid,
    pub aspirant_id: Uuid,
    pub mentor_id: Uuid,
    pub status: RequestStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GuidanceMessage {
    pub id: Uuid,
    pub request_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: OffsetDateTime,
}

impl GuidanceRequest {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.aspirant_id == user_id || self.mentor_id == user_id
    }

    pub fn counterpart_of(&self, user_id: Uuid) -> Uuid {
        if self.aspirant_id == user_id {
            self.mentor_id
        } else {
            self.aspirant_id
        }
    }

    /// Returns `sqlx::Error` directly so callers can tell a unique-index
    /// violation (duplicate pending pair) apart from other failures.
    pub async fn create(
        db: &PgPool,
        aspirant_id: Uuid,
        mentor_id: Uuid,
    ) -> sqlx::Result<GuidanceRequest> {
        sqlx::query_as::<_, GuidanceRequest>(
            r#"
            INSERT INTO guidance_requests (aspirant_id, mentor_id)
            VALUES ($1, $2)
            RETURNING id, aspirant_id, mentor_id, status, created_at, updated_at
            "#,
        )
        .bind(aspirant_id)
        .bind(mentor_id)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<GuidanceRequest>> {
        let request = sqlx::query_as::<_, GuidanceRequest>(
            r#"
            SELECT id, aspirant_id, mentor_id, status, created_at, updated_at
            FROM guidance_requests
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(request)
    }

    pub async fn latest_for_pair(
        db: &PgPool,
        aspirant_id: Uuid,
        mentor_id: Uuid,
    ) -> anyhow::Result<Option<GuidanceRequest>> {
        let request = sqlx::query_as::<_, GuidanceRequest>(
            r#"
            SELECT id, aspirant_id, mentor_id, status, created_at, updated_at
            FROM guidance_requests
            WHERE aspirant_id = $1 AND mentor_id = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(aspirant_id)
        .bind(mentor_id)
        .fetch_optional(db)
        .await?;
        Ok(request)
    }

    pub async fn list_for_user(
        db: &PgPool,
        user_id: Uuid,
        status: Option<RequestStatus>,
    ) -> anyhow::Result<Vec<GuidanceRequest>> {
        let rows = sqlx::query_as::<_, GuidanceRequest>(
            r#"
            SELECT id, aspirant_id, mentor_id, status, created_at, updated_at
            FROM guidance_requests
            WHERE (aspirant_id = $1 OR mentor_id = $1)
              AND ($2::request_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Compare-and-set: only flips the row if it is still PENDING, so a
    /// racing accept/reject resolves to exactly one winner.
    pub async fn resolve_pending(
        db: &PgPool,
        id: Uuid,
        next: RequestStatus,
    ) -> anyhow::Result<Option<GuidanceRequest>> {
        let request = sqlx::query_as::<_, GuidanceRequest>(
            r#"
            UPDATE guidance_requests
            SET status = $2, updated_at = now()
            WHERE id = $1 AND status = 'PENDING'
            RETURNING id, aspirant_id, mentor_id, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(next)
        .fetch_optional(db)
        .await?;
        Ok(request)
    }
}

impl GuidanceMessage {
    pub async fn create(
        db: &PgPool,
        request_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> anyhow::Result<GuidanceMessage> {
        let message = sqlx::query_as::<_, GuidanceMessage>(
            r#"
            INSERT INTO guidance_messages (request_id, sender_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, request_id, sender_id, content, created_at
            "#,
        )
        .bind(request_id)
        .bind(sender_id)
        .bind(content)
        .fetch_one(db)
        .await?;
        Ok(message)
    }

    pub async fn list_for_request(
        db: &PgPool,
        request_id: Uuid,
    ) -> anyhow::Result<Vec<GuidanceMessage>> {
        let rows = sqlx::query_as::<_, GuidanceMessage>(
            r#"
            SELECT id, request_id, sender_id, content, created_at
            FROM guidance_messages
            WHERE request_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(request_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn participant_check_covers_both_sides() {
        let aspirant = Uuid::new_v4();
        let mentor = Uuid::new_v4();
        let outsider = Uuid::new_v4();
        let request = GuidanceRequest {
            id: Uuid::new_v4(),
            aspirant_id: aspirant,
            mentor_id: mentor,
            status: RequestStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };

        assert!(request.is_participant(aspirant));
        assert!(request.is_participant(mentor));
        assert!(!request.is_participant(outsider));
        assert_eq!(request.counterpart_of(aspirant), mentor);
        assert_eq!(request.counterpart_of(mentor), aspirant);
    }
}
