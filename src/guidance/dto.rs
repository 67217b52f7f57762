use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::guidance::lifecycle::RequestStatus;
use crate::guidance::repo::{GuidanceMessage, GuidanceRequest};
use crate::profiles::repo::{Profile, VerificationStatus};

#[derive(Debug, Deserialize)]
pub struct CreateRequestBody {
    /// User id of the mentor being asked for guidance.
    pub mentor_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RequestFilter {
    pub status: Option<RequestStatus>,
}

/// Compact profile shown next to a request.
#[derive(Debug, Serialize)]
pub struct CounterpartSummary {
    pub user_id: Uuid,
    pub full_name: Option<String>,
    pub is_studying_abroad: bool,
    pub current_country: Option<String>,
    pub university: Option<String>,
    pub course: Option<String>,
    pub target_country: Option<String>,
    pub intended_course: Option<String>,
    pub verification_status: VerificationStatus,
}

impl From<&Profile> for CounterpartSummary {
    fn from(p: &Profile) -> Self {
        Self {
            user_id: p.user_id,
            full_name: p.full_name.clone(),
            is_studying_abroad: p.is_studying_abroad,
            current_country: p.current_country.clone(),
            university: p.university.clone(),
            course: p.course.clone(),
            target_country: p.target_country.clone(),
            intended_course: p.intended_course.clone(),
            verification_status: p.verification_status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RequestView {
    pub id: Uuid,
    pub aspirant_id: Uuid,
    pub mentor_id: Uuid,
    pub status: RequestStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub counterpart: Option<CounterpartSummary>,
}

impl RequestView {
    pub fn new(request: GuidanceRequest, counterpart: Option<CounterpartSummary>) -> Self {
        Self {
            id: request.id,
            aspirant_id: request.aspirant_id,
            mentor_id: request.mentor_id,
            status: request.status,
            created_at: request.created_at,
            updated_at: request.updated_at,
            counterpart,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    pub content: String,
}

/// Chat message as stored and as pushed over the event stream.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub id: Uuid,
    pub request_id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub created_at: OffsetDateTime,
}

impl From<GuidanceMessage> for MessageResponse {
    fn from(m: GuidanceMessage) -> Self {
        Self {
            id: m.id,
            request_id: m.request_id,
            sender_id: m.sender_id,
            content: m.content,
            created_at: m.created_at,
        }
    }
}
