use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::UserRole;
use crate::profiles::completeness::{can_connect, completeness};
use crate::profiles::repo::{JourneyChecklist, Profile, ProfileFields, VerificationStatus};

#[derive(Debug, Deserialize)]
pub struct OnboardingRequest {
    pub role: UserRole,
    #[serde(flatten)]
    pub fields: ProfileFields,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(flatten)]
    pub fields: ProfileFields,
}

/// The owner's view of their profile, completeness included.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub is_studying_abroad: bool,
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
    pub verification_status: VerificationStatus,
    pub completeness: u8,
    pub can_connect: bool,
    pub created_at: OffsetDateTime,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        let score = completeness(&p);
        let connect = can_connect(&p);
        Self {
            id: p.id,
            user_id: p.user_id,
            is_studying_abroad: p.is_studying_abroad,
            full_name: p.full_name,
            bio: p.bio,
            target_country: p.target_country,
            intended_course: p.intended_course,
            budget_range: p.budget_range,
            intake_year: p.intake_year,
            exams_taken: p.exams_taken,
            short_goal: p.short_goal,
            current_country: p.current_country,
            university: p.university,
            course: p.course,
            year_of_study: p.year_of_study,
            linkedin: p.linkedin,
            languages: p.languages,
            expertise: p.expertise,
            availability: p.availability,
            verification_status: p.verification_status,
            completeness: score,
            can_connect: connect,
            created_at: p.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct JourneyRequest {
    #[serde(flatten)]
    pub checklist: JourneyChecklist,
}

#[derive(Debug, Serialize)]
pub struct JourneyResponse {
    pub checklist: JourneyChecklist,
    pub progress: u8,
    pub next_step: Option<&'static str>,
}

impl From<JourneyChecklist> for JourneyResponse {
    fn from(checklist: JourneyChecklist) -> Self {
        Self {
            progress: checklist.progress(),
            next_step: checklist.next_step(),
            checklist,
        }
    }
}
