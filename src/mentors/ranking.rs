use crate::profiles::repo::{Profile, VerificationStatus};

pub const COUNTRY_MATCH_POINTS: u32 = 20;
pub const VERIFIED_POINTS: u32 = 10;
pub const PENDING_POINTS: u32 = 3;
pub const COURSE_MATCH_POINTS: u32 = 5;

fn nonempty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Composite match score of one mentor for one aspirant.
///
/// Country equality and course substring are case-insensitive and only
/// count when both sides are non-empty; an aspirant without a profile
/// (or with blank targets) is scored on verification tier alone.
pub fn score_mentor(aspirant: Option<&Profile>, mentor: &Profile) -> u32 {
    let mut score = 0;

    if let Some(aspirant) = aspirant {
        if let (Some(target), Some(current)) =
            (nonempty(&aspirant.target_country), nonempty(&mentor.current_country))
        {
            if target.to_lowercase() == current.to_lowercase() {
                score += COUNTRY_MATCH_POINTS;
            }
        }

        if let (Some(intended), Some(course)) =
            (nonempty(&aspirant.intended_course), nonempty(&mentor.course))
        {
            if course.to_lowercase().contains(&intended.to_lowercase()) {
                score += COURSE_MATCH_POINTS;
            }
        }
    }

    score += match mentor.verification_status {
        VerificationStatus::Verified => VERIFIED_POINTS,
        VerificationStatus::Pending => PENDING_POINTS,
        VerificationStatus::Unverified => 0,
    };

    score
}

/// Orders mentors by descending score. The sort is stable, so equal
/// scores keep their input order.
pub fn rank_mentors(aspirant: Option<&Profile>, mentors: Vec<Profile>) -> Vec<(u32, Profile)> {
    let mut scored: Vec<(u32, Profile)> = mentors
        .into_iter()
        .map(|m| (score_mentor(aspirant, &m), m))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::repo::JourneyChecklist;
    use sqlx::types::Json;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn aspirant(target_country: &str, intended_course: &str) -> Profile {
        let mut p = blank(false);
        if !target_country.is_empty() {
            p.target_country = Some(target_country.into());
        }
        if !intended_course.is_empty() {
            p.intended_course = Some(intended_course.into());
        }
        p
    }

    fn mentor(country: &str, course: &str, status: VerificationStatus) -> Profile {
        let mut p = blank(true);
        p.current_country = Some(country.into());
        p.course = Some(course.into());
        p.verification_status = status;
        p
    }

    fn blank(is_mentor: bool) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            full_name: None,
            bio: None,
            is_studying_abroad: is_mentor,
            target_country: None,
            intended_course: None,
            budget_range: None,
            intake_year: None,
            exams_taken: None,
            short_goal: None,
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
    fn scores_compose_per_component() {
        let a = aspirant("Germany", "Data Science");

        let m = mentor("Germany", "MSc Data Science", VerificationStatus::Verified);
        assert_eq!(score_mentor(Some(&a), &m), 35);

        let m = mentor("Canada", "Data Science", VerificationStatus::Pending);
        assert_eq!(score_mentor(Some(&a), &m), 8);

        let m = mentor("Canada", "Philosophy", VerificationStatus::Unverified);
        assert_eq!(score_mentor(Some(&a), &m), 0);
    }

    #[test]
    fn country_match_is_case_insensitive() {
        let a = aspirant("germany", "");
        let m = mentor("GERMANY", "Law", VerificationStatus::Unverified);
        assert_eq!(score_mentor(Some(&a), &m), COUNTRY_MATCH_POINTS);
    }

    #[test]
    fn course_is_substring_match() {
        let a = aspirant("", "data science");
        let m = mentor("France", "MSc Data Science and AI", VerificationStatus::Unverified);
        assert_eq!(score_mentor(Some(&a), &m), COURSE_MATCH_POINTS);

        // mentor course is a fragment of the target, not the reverse
        let m = mentor("France", "Data", VerificationStatus::Unverified);
        assert_eq!(score_mentor(Some(&a), &m), 0);
    }

    #[test]
    fn blank_targets_contribute_nothing() {
        let a = aspirant("", "");
        let m = mentor("Germany", "Data Science", VerificationStatus::Verified);
        assert_eq!(score_mentor(Some(&a), &m), VERIFIED_POINTS);
    }

    #[test]
    fn missing_aspirant_scores_by_verification_only() {
        let verified = mentor("Germany", "CS", VerificationStatus::Verified);
        let pending = mentor("Germany", "CS", VerificationStatus::Pending);
        let unverified = mentor("Germany", "CS", VerificationStatus::Unverified);
        assert_eq!(score_mentor(None, &verified), 10);
        assert_eq!(score_mentor(None, &pending), 3);
        assert_eq!(score_mentor(None, &unverified), 0);
    }

    #[test]
    fn example_scenario_ranks_country_match_first() {
        let a = aspirant("Germany", "Data Science");
        let mentor_a = mentor("Germany", "MSc Data Science", VerificationStatus::Verified);
        let mentor_b = mentor("Canada", "Data Science", VerificationStatus::Pending);
        let id_a = mentor_a.id;
        let id_b = mentor_b.id;

        let ranked = rank_mentors(Some(&a), vec![mentor_b, mentor_a]);
        assert_eq!(ranked[0].0, 35);
        assert_eq!(ranked[0].1.id, id_a);
        assert_eq!(ranked[1].0, 8);
        assert_eq!(ranked[1].1.id, id_b);
    }

    #[test]
    fn ranking_is_deterministic() {
        let a = aspirant("Germany", "Data Science");
        let mentors: Vec<Profile> = (0..5)
            .map(|i| {
                mentor(
                    if i % 2 == 0 { "Germany" } else { "Spain" },
                    "Data Science",
                    VerificationStatus::Pending,
                )
            })
            .collect();

        let first: Vec<Uuid> = rank_mentors(Some(&a), mentors.clone())
            .into_iter()
            .map(|(_, m)| m.id)
            .collect();
        let second: Vec<Uuid> = rank_mentors(Some(&a), mentors)
            .into_iter()
            .map(|(_, m)| m.id)
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn equal_scores_keep_input_order() {
        let a = aspirant("Germany", "");
        let m1 = mentor("Spain", "CS", VerificationStatus::Pending);
        let m2 = mentor("Italy", "Law", VerificationStatus::Pending);
        let (id1, id2) = (m1.id, m2.id);

        let ranked = rank_mentors(Some(&a), vec![m1, m2]);
        assert_eq!(ranked[0].1.id, id1);
        assert_eq!(ranked[1].1.id, id2);
    }

    #[test]
    fn empty_target_country_orders_by_verification_tier() {
        let a = aspirant("", "");
        let unverified = mentor("Germany", "CS", VerificationStatus::Unverified);
        let verified = mentor("Spain", "Law", VerificationStatus::Verified);
        let pending = mentor("Italy", "Art", VerificationStatus::Pending);
        let ids = (unverified.id, verified.id, pending.id);

        let ranked = rank_mentors(Some(&a), vec![unverified, verified, pending]);
        assert_eq!(ranked[0].1.id, ids.1);
        assert_eq!(ranked[1].1.id, ids.2);
        assert_eq!(ranked[2].1.id, ids.0);
    }
}
