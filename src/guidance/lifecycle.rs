use serde::{Deserialize, Serialize};

/// Guidance request lifecycle. PENDING is the only non-terminal state;
/// an accepted request unlocks its chat thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    pub fn can_transition(self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Accepted)
                | (RequestStatus::Pending, RequestStatus::Rejected)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::RequestStatus::*;

    #[test]
    fn pending_reaches_both_outcomes() {
        assert!(Pending.can_transition(Accepted));
        assert!(Pending.can_transition(Rejected));
        assert!(!Pending.can_transition(Pending));
    }

    #[test]
    fn terminal_states_reach_nothing() {
        for from in [Accepted, Rejected] {
            for to in [Pending, Accepted, Rejected] {
                assert!(!from.can_transition(to));
            }
        }
    }

    #[test]
    fn terminality() {
        assert!(!Pending.is_terminal());
        assert!(Accepted.is_terminal());
        assert!(Rejected.is_terminal());
    }

    #[test]
    fn wire_format_is_uppercase() {
        assert_eq!(serde_json::to_string(&Pending).unwrap(), "\"PENDING\"");
        assert_eq!(serde_json::to_string(&Accepted).unwrap(), "\"ACCEPTED\"");
    }
}
