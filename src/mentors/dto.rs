use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::guidance::lifecycle::RequestStatus;
use crate::profiles::repo::{Profile, VerificationStatus};

/// Directory entry for the ranked mentor list.
#[derive(Debug, Serialize)]
pub struct MentorCard {
    pub profile_id: Uuid,
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub current_country: Option<String>,
    pub university: Option<String>,
    pub course: Option<String>,
    pub year_of_study: Option<String>,
    pub languages: Option<String>,
    pub expertise: Option<String>,
    pub availability: Option<String>,
    pub verification_status: VerificationStatus,
    pub match_score: u32,
    pub created_at: OffsetDateTime,
}

impl MentorCard {
    pub fn from_scored(score: u32, p: Profile) -> Self {
        Self {
            profile_id: p.id,
            user_id: p.user_id,
            full_name: p.full_name,
            current_country: p.current_country,
            university: p.university,
            course: p.course,
            year_of_study: p.year_of_study,
            languages: p.languages,
            expertise: p.expertise,
            availability: p.availability,
            verification_status: p.verification_status,
            match_score: score,
            created_at: p.created_at,
        }
    }
}

/// Single mentor page: the card plus the viewer's relationship to them.
#[derive(Debug, Serialize)]
pub struct MentorDetail {
    #[serde(flatten)]
    pub card: MentorCard,
    pub bio: Option<String>,
    pub linkedin: Option<String>,
    pub request_status: Option<RequestStatus>,
    pub is_saved: bool,
}
