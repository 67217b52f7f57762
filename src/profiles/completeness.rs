use crate::profiles::repo::Profile;

/// Minimum completeness required before an aspirant may send a
/// guidance request.
pub const CONNECT_THRESHOLD: u8 = 70;

fn filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// Percentage of the role's field checklist that is filled in.
///
/// Aspirants are scored on 7 fields, mentors on 8; each field weighs
/// equally and the result is rounded to a whole percent. Recomputed on
/// every call, never persisted.
pub fn completeness(profile: &Profile) -> u8 {
    let fields: &[&Option<String>] = if profile.is_studying_abroad {
        &[
            &profile.full_name,
            &profile.current_country,
            &profile.university,
            &profile.course,
            &profile.year_of_study,
            &profile.bio,
            &profile.languages,
            &profile.expertise,
        ]
    } else {
        &[
            &profile.full_name,
            &profile.target_country,
            &profile.intended_course,
            &profile.budget_range,
            &profile.intake_year,
            &profile.exams_taken,
            &profile.short_goal,
        ]
    };

    let done = fields.iter().filter(|f| filled(f)).count();
    ((done as f64 / fields.len() as f64) * 100.0).round() as u8
}

pub fn can_connect(profile: &Profile) -> bool {
    completeness(profile) >= CONNECT_THRESHOLD
}
