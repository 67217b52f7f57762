use crate::profiles::repo::Profile;
use crate::questions::repo::Question;

pub const DEFAULT_RELEVANT_LIMIT: usize = 3;

/// Keywords a profile contributes to relevance matching, lowercased and
/// stripped of blanks. Aspirants match on where they want to go and
/// what they want to study; mentors on what they can speak to.
pub fn profile_keywords(profile: &Profile) -> Vec<String> {
    let sources: Vec<&Option<String>> = if profile.is_studying_abroad {
        vec![&profile.course, &profile.university, &profile.current_country]
    } else {
        vec![&profile.target_country, &profile.intended_course]
    };

    sources
        .into_iter()
        .filter_map(|s| s.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn matches(profile: &Profile, keywords: &[String], question: &Question) -> bool {
    let title = question.title.to_lowercase();
    if keywords.iter().any(|k| title.contains(k)) {
        return true;
    }
    // mentors also scan the body; aspirants only the title
    if profile.is_studying_abroad {
        let content = question.content.to_lowercase();
        return keywords.iter().any(|k| content.contains(k));
    }
    false
}

/// Filters the pool down to questions containing at least one profile
/// keyword, preserving pool order, truncated to `limit`. No secondary
/// ranking is applied.
pub fn relevant_questions(profile: &Profile, pool: &[Question], limit: usize) -> Vec<Question> {
    let keywords = profile_keywords(profile);
    if keywords.is_empty() {
        return Vec::new();
    }

    pool.iter()
        .filter(|q| matches(profile, &keywords, q))
        .take(limit)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::repo::{JourneyChecklist, VerificationStatus};
    use sqlx::types::Json;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn question(title: &str, content: &str) -> Question {
        Question {
            id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            author_id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    fn aspirant(target_country: &str, intended_course: &str) -> Profile {
        let mut p = blank(false);
        p.target_country = Some(target_country.into());
        p.intended_course = Some(intended_course.into());
        p
    }

    fn mentor(course: &str, university: &str, country: &str) -> Profile {
        let mut p = blank(true);
        p.course = Some(course.into());
        p.university = Some(university.into());
        p.current_country = Some(country.into());
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
    fn aspirant_matches_title_only() {
        let p = aspirant("Germany", "Data Science");
        let pool = vec![
            question("Cost of living in Germany?", "..."),
            question("Anyone applied recently?", "I want to study in Germany"),
        ];
        let relevant = relevant_questions(&p, &pool, 3);
        assert_eq!(relevant.len(), 1);
        assert_eq!(relevant[0].title, "Cost of living in Germany?");
    }

    #[test]
    fn mentor_matches_title_or_content() {
        let p = mentor("Data Science", "TUM", "Germany");
        let pool = vec![
            question("Anyone applied recently?", "Thinking about TUM for my masters"),
            question("Visa timelines", "nothing matching here"),
        ];
        let relevant = relevant_questions(&p, &pool, 3);
        assert_eq!(relevant.len(), 1);
        assert_eq!(relevant[0].title, "Anyone applied recently?");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let p = aspirant("GERMANY", "");
        let pool = vec![question("moving to germany next fall", "...")];
        assert_eq!(relevant_questions(&p, &pool, 3).len(), 1);
    }

    #[test]
    fn result_truncated_to_limit_in_pool_order() {
        let p = aspirant("Germany", "");
        let pool: Vec<Question> = (0..5)
            .map(|i| question(&format!("Germany question {i}"), ""))
            .collect();
        let relevant = relevant_questions(&p, &pool, 3);
        assert_eq!(relevant.len(), 3);
        assert_eq!(relevant[0].title, "Germany question 0");
        assert_eq!(relevant[2].title, "Germany question 2");
    }

    #[test]
    fn empty_keywords_match_nothing() {
        let p = blank(false);
        let pool = vec![question("Germany question", "content")];
        assert!(relevant_questions(&p, &pool, 3).is_empty());
    }

    #[test]
    fn blank_keywords_are_dropped() {
        let mut p = aspirant("  ", "Data Science");
        p.target_country = Some("  ".into());
        assert_eq!(profile_keywords(&p), vec!["data science".to_string()]);
    }

    #[test]
    fn every_result_contains_a_keyword() {
        let p = aspirant("Germany", "Data Science");
        let pool = vec![
            question("Germany costs", ""),
            question("Unrelated", ""),
            question("Is Data Science worth it?", ""),
        ];
        let keywords = profile_keywords(&p);
        for q in relevant_questions(&p, &pool, 10) {
            let title = q.title.to_lowercase();
            assert!(keywords.iter().any(|k| title.contains(k)));
        }
    }
}
