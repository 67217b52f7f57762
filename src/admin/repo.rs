use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::UserRole;
use crate::profiles::repo::{Profile, VerificationStatus};

/// Directory row for the back office: identity joined with profile.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DirectoryRow {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    pub profile_id: Option<Uuid>,
    pub full_name: Option<String>,
    pub is_studying_abroad: Option<bool>,
    pub target_country: Option<String>,
    pub current_country: Option<String>,
    pub verification_status: Option<VerificationStatus>,
    pub is_banned: Option<bool>,
    pub created_at: OffsetDateTime,
}

pub async fn list_directory(db: &PgPool, search: Option<&str>) -> anyhow::Result<Vec<DirectoryRow>> {
    let rows = sqlx::query_as::<_, DirectoryRow>(
        r#"
        SELECT u.id AS user_id, u.email, u.role, u.created_at,
               p.id AS profile_id, p.full_name, p.is_studying_abroad,
               p.target_country, p.current_country, p.verification_status, p.is_banned
        FROM users u
        LEFT JOIN profiles p ON p.user_id = u.id
        WHERE $1::text IS NULL
           OR p.full_name ILIKE '%' || $1 || '%'
           OR p.target_country ILIKE '%' || $1 || '%'
           OR p.current_country ILIKE '%' || $1 || '%'
        ORDER BY u.created_at DESC
        "#,
    )
    .bind(search)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Role change keeps `users.role` and `profiles.is_studying_abroad` in
/// step; a profile-less user just gets the role.
pub async fn set_role(db: &PgPool, user_id: Uuid, role: UserRole) -> anyhow::Result<bool> {
    let mut tx = db.begin().await?;

    let updated = sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
        .bind(role)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    if updated.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    if role != UserRole::Admin {
        sqlx::query("UPDATE profiles SET is_studying_abroad = $1 WHERE user_id = $2")
            .bind(role == UserRole::Mentor)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(true)
}

pub async fn set_verification(
    db: &PgPool,
    profile_id: Uuid,
    status: VerificationStatus,
) -> anyhow::Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        UPDATE profiles SET verification_status = $2
        WHERE id = $1
        RETURNING id, user_id, full_name, bio, is_studying_abroad,
                  target_country, intended_course, budget_range, intake_year, exams_taken, short_goal,
                  current_country, university, course, year_of_study,
                  linkedin, languages, expertise, availability,
                  verification_status, is_banned, journey_checklist, created_at
        "#,
    )
    .bind(profile_id)
    .bind(status)
    .fetch_optional(db)
    .await?;
    Ok(profile)
}

pub async fn set_ban(db: &PgPool, profile_id: Uuid, banned: bool) -> anyhow::Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        UPDATE profiles SET is_banned = $2
        WHERE id = $1
        RETURNING id, user_id, full_name, bio, is_studying_abroad,
                  target_country, intended_course, budget_range, intake_year, exams_taken, short_goal,
                  current_country, university, course, year_of_study,
                  linkedin, languages, expertise, availability,
                  verification_status, is_banned, journey_checklist, created_at
        "#,
    )
    .bind(profile_id)
    .bind(banned)
    .fetch_optional(db)
    .await?;
    Ok(profile)
}

/// Hard delete; profile, requests, messages, questions and answers all
/// go with the user via ON DELETE CASCADE.
pub async fn delete_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
