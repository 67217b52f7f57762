use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "verification_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
}

/// Application-journey milestones tracked per aspirant, stored as jsonb.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JourneyChecklist {
    pub exams: bool,
    pub sop: bool,
    pub lor: bool,
    pub applications: bool,
}

impl JourneyChecklist {
    fn flags(&self) -> [(&'static str, bool); 4] {
        [
            ("Entrance Exams", self.exams),
            ("SOP Drafting", self.sop),
            ("Letters of Rec.", self.lor),
            ("Applications", self.applications),
        ]
    }

    pub fn progress(&self) -> u8 {
        let flags = self.flags();
        let done = flags.iter().filter(|(_, v)| *v).count();
        ((done as f64 / flags.len() as f64) * 100.0).round() as u8
    }

    pub fn next_step(&self) -> Option<&'static str> {
        self.flags()
            .into_iter()
            .find(|(_, done)| !done)
            .map(|(label, _)| label)
    }
}

/// One row per user. Aspirant and mentor fields are both present and
/// nullable; `is_studying_abroad` discriminates which set is in play.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub is_studying_abroad: bool,
    pub target_country: Option<String>,
    pub intended_course: Option<String>,
    pub budget_range: Option<String>,
    pub intake_year: Option<String>,
    pub exams_taken: Option<String>,
    pub short_goal: Option<String>,
    pub current_country: Option<String>,
    pub university: Option<String>,
    pub course: Option<String>,
    pub year_of_study: Option<String>,
    pub linkedin: Option<String>,
    pub languages: Option<String>,
    pub expertise: Option<String>,
    pub availability: Option<String>,
    pub verification_status: VerificationStatus,
    pub is_banned: bool,
    pub journey_checklist: Json<JourneyChecklist>,
    pub created_at: OffsetDateTime,
}

const PROFILE_COLUMNS: &str = r#"
    id, user_id, full_name, bio, is_studying_abroad,
    target_country, intended_course, budget_range, intake_year, exams_taken, short_goal,
    current_country, university, course, year_of_study,
    linkedin, languages, expertise, availability,
    verification_status, is_banned, journey_checklist, created_at
"#;

/// Owner-editable fields; role flags and moderation state are excluded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileFields {
    pub full_name: Option<String>,
    pub bio: Option<String>,
    pub target_country: Option<String>,
    pub intended_course: Option<String>,
    pub budget_range: Option<String>,
    pub intake_year: Option<String>,
    pub exams_taken: Option<String>,
    pub short_goal: Option<String>,
    pub current_country: Option<String>,
    pub university: Option<String>,
    pub course: Option<String>,
    pub year_of_study: Option<String>,
    pub linkedin: Option<String>,
    pub languages: Option<String>,
    pub expertise: Option<String>,
    pub availability: Option<String>,
}

impl ProfileFields {
    /// Overlays the payload on the stored profile: a field omitted from
    /// the request keeps its current value, so a one-field edit cannot
    /// wipe the rest of the profile.
    pub fn merged_over(self, current: &Profile) -> Self {
        Self {
            full_name: self.full_name.or_else(|| current.full_name.clone()),
            bio: self.bio.or_else(|| current.bio.clone()),
            target_country: self.target_country.or_else(|| current.target_country.clone()),
            intended_course: self.intended_course.or_else(|| current.intended_course.clone()),
            budget_range: self.budget_range.or_else(|| current.budget_range.clone()),
            intake_year: self.intake_year.or_else(|| current.intake_year.clone()),
            exams_taken: self.exams_taken.or_else(|| current.exams_taken.clone()),
            short_goal: self.short_goal.or_else(|| current.short_goal.clone()),
            current_country: self.current_country.or_else(|| current.current_country.clone()),
            university: self.university.or_else(|| current.university.clone()),
            course: self.course.or_else(|| current.course.clone()),
            year_of_study: self.year_of_study.or_else(|| current.year_of_study.clone()),
            linkedin: self.linkedin.or_else(|| current.linkedin.clone()),
            languages: self.languages.or_else(|| current.languages.clone()),
            expertise: self.expertise.or_else(|| current.expertise.clone()),
            availability: self.availability.or_else(|| current.availability.clone()),
        }
    }

    /// Drops the fields that do not belong to the given role, so an
    /// aspirant cannot smuggle mentor columns in and vice versa.
    pub fn scoped_to(mut self, role: UserRole) -> Self {
        match role {
            UserRole::Mentor => {
                self.target_country = None;
                self.intended_course = None;
                self.budget_range = None;
                self.intake_year = None;
                self.exams_taken = None;
                self.short_goal = None;
            }
            UserRole::Aspirant | UserRole::Admin => {
                self.current_country = None;
                self.university = None;
                self.course = None;
                self.year_of_study = None;
                self.languages = None;
                self.expertise = None;
                self.availability = None;
            }
        }
        self
    }
}

impl Profile {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    /// Onboarding: set the user's role and create their profile in one
    /// transaction, so a half-onboarded account cannot exist.
    pub async fn create_with_role(
        db: &PgPool,
        user_id: Uuid,
        role: UserRole,
        fields: ProfileFields,
    ) -> anyhow::Result<Profile> {
        let fields = fields.scoped_to(role);
        let mut tx = db.begin().await?;

        sqlx::query("UPDATE users SET role = $1 WHERE id = $2")
            .bind(role)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            INSERT INTO profiles (
                user_id, is_studying_abroad, full_name, bio,
                target_country, intended_course, budget_range, intake_year, exams_taken, short_goal,
                current_country, university, course, year_of_study,
                linkedin, languages, expertise, availability
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(role == UserRole::Mentor)
        .bind(&fields.full_name)
        .bind(&fields.bio)
        .bind(&fields.target_country)
        .bind(&fields.intended_course)
        .bind(&fields.budget_range)
        .bind(&fields.intake_year)
        .bind(&fields.exams_taken)
        .bind(&fields.short_goal)
        .bind(&fields.current_country)
        .bind(&fields.university)
        .bind(&fields.course)
        .bind(&fields.year_of_study)
        .bind(&fields.linkedin)
        .bind(&fields.languages)
        .bind(&fields.expertise)
        .bind(&fields.availability)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(profile)
    }

    /// Writes the owner-editable fields wholesale; callers merge the
    /// payload over the stored row first (`ProfileFields::merged_over`)
    /// so omitted fields survive the update.
    pub async fn update_fields(
        db: &PgPool,
        user_id: Uuid,
        fields: ProfileFields,
    ) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles SET
                full_name = $2, bio = $3,
                target_country = $4, intended_course = $5, budget_range = $6,
                intake_year = $7, exams_taken = $8, short_goal = $9,
                current_country = $10, university = $11, course = $12, year_of_study = $13,
                linkedin = $14, languages = $15, expertise = $16, availability = $17
            WHERE user_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&fields.full_name)
        .bind(&fields.bio)
        .bind(&fields.target_country)
        .bind(&fields.intended_course)
        .bind(&fields.budget_range)
        .bind(&fields.intake_year)
        .bind(&fields.exams_taken)
        .bind(&fields.short_goal)
        .bind(&fields.current_country)
        .bind(&fields.university)
        .bind(&fields.course)
        .bind(&fields.year_of_study)
        .bind(&fields.linkedin)
        .bind(&fields.languages)
        .bind(&fields.expertise)
        .bind(&fields.availability)
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    pub async fn update_journey(
        db: &PgPool,
        user_id: Uuid,
        checklist: JourneyChecklist,
    ) -> anyhow::Result<Option<Profile>> {
        let profile = sqlx::query_as::<_, Profile>(&format!(
            r#"
            UPDATE profiles SET journey_checklist = $2
            WHERE user_id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(Json(checklist))
        .fetch_optional(db)
        .await?;
        Ok(profile)
    }

    pub async fn list_by_user_ids(db: &PgPool, user_ids: &[Uuid]) -> anyhow::Result<Vec<Profile>> {
        let rows = sqlx::query_as::<_, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ANY($1)"
        ))
        .bind(user_ids)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// All mentor profiles visible in the directory; banned mentors are
    /// hidden from aspirants but stay in the admin views.
    pub async fn list_mentors(db: &PgPool) -> anyhow::Result<Vec<Profile>> {
        let rows = sqlx::query_as::<_, Profile>(&format!(
            r#"
            SELECT {PROFILE_COLUMNS} FROM profiles
            WHERE is_studying_abroad = true AND is_banned = false
            ORDER BY created_at DESC
            "#
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod field_tests {
    use super::*;
    use sqlx::types::Json;
    use time::OffsetDateTime;

    fn stored_aspirant() -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            full_name: Some("Asha".into()),
            bio: None,
            is_studying_abroad: false,
            target_country: Some("Germany".into()),
            intended_course: Some("Data Science".into()),
            budget_range: Some("10-20k".into()),
            intake_year: Some("2027".into()),
            exams_taken: Some("IELTS".into()),
            short_goal: Some("MSc admit".into()),
            current_country: None,
            university: None,
            course: None,
            year_of_study: None,
            linkedin: None,
            languages: None,
            expertise: None,
            availability: None,
            verification_status: VerificationStatus::Unverified,
            is_banned: false,
            journey_checklist: Json(JourneyChecklist::default()),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn omitted_fields_survive_a_one_field_edit() {
        let stored = stored_aspirant();
        let payload: ProfileFields =
            serde_json::from_str(r#"{"full_name": "New Name"}"#).unwrap();

        let merged = payload.merged_over(&stored);
        assert_eq!(merged.full_name.as_deref(), Some("New Name"));
        assert_eq!(merged.target_country.as_deref(), Some("Germany"));
        assert_eq!(merged.intended_course.as_deref(), Some("Data Science"));
        assert_eq!(merged.budget_range.as_deref(), Some("10-20k"));
        assert_eq!(merged.short_goal.as_deref(), Some("MSc admit"));
    }

    #[test]
    fn renaming_keeps_the_connect_gate_open() {
        use crate::profiles::completeness::completeness;

        let mut stored = stored_aspirant();
        let payload: ProfileFields =
            serde_json::from_str(r#"{"full_name": "New Name"}"#).unwrap();
        let merged = payload.merged_over(&stored);

        stored.full_name = merged.full_name.clone();
        stored.target_country = merged.target_country.clone();
        stored.intended_course = merged.intended_course.clone();
        stored.budget_range = merged.budget_range.clone();
        stored.intake_year = merged.intake_year.clone();
        stored.exams_taken = merged.exams_taken.clone();
        stored.short_goal = merged.short_goal.clone();
        assert_eq!(completeness(&stored), 100);
    }

    #[test]
    fn provided_fields_overwrite() {
        let stored = stored_aspirant();
        let payload = ProfileFields {
            target_country: Some("Canada".into()),
            ..ProfileFields::default()
        };

        let merged = payload.merged_over(&stored);
        assert_eq!(merged.target_country.as_deref(), Some("Canada"));
        assert_eq!(merged.full_name.as_deref(), Some("Asha"));
    }

    #[test]
    fn merge_then_scope_still_strips_cross_role_fields() {
        let stored = stored_aspirant();
        let payload = ProfileFields {
            university: Some("TUM".into()),
            ..ProfileFields::default()
        };

        let merged = payload.merged_over(&stored).scoped_to(UserRole::Aspirant);
        assert_eq!(merged.university, None);
        assert_eq!(merged.target_country.as_deref(), Some("Germany"));
    }
}

#[cfg(test)]
mod journey_tests {
    use super::*;

    #[test]
    fn empty_checklist_has_zero_progress() {
        let checklist = JourneyChecklist::default();
        assert_eq!(checklist.progress(), 0);
        assert_eq!(checklist.next_step(), Some("Entrance Exams"));
    }

    #[test]
    fn progress_rounds_per_completed_step() {
        let checklist = JourneyChecklist {
            exams: true,
            sop: true,
            lor: false,
            applications: false,
        };
        assert_eq!(checklist.progress(), 50);
        assert_eq!(checklist.next_step(), Some("Letters of Rec."));
    }

    #[test]
    fn full_checklist_has_no_next_step() {
        let checklist = JourneyChecklist {
            exams: true,
            sop: true,
            lor: true,
            applications: true,
        };
        assert_eq!(checklist.progress(), 100);
        assert_eq!(checklist.next_step(), None);
    }

    #[test]
    fn missing_keys_deserialize_as_incomplete() {
        let checklist: JourneyChecklist = serde_json::from_str("{}").unwrap();
        assert_eq!(checklist, JourneyChecklist::default());
    }
}
