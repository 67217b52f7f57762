use serde::Deserialize;

use crate::auth::repo::UserRole;
use crate::profiles::repo::VerificationStatus;

#[derive(Debug, Deserialize)]
pub struct DirectoryQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SetRoleBody {
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct SetVerificationBody {
    pub status: VerificationStatus,
}

#[derive(Debug, Deserialize)]
pub struct SetBanBody {
    pub banned: bool,
}
