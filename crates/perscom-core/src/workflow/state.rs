//! Approval state machine.
//!
//! Pending -> Approved | Denied, exactly once. The machine itself is pure;
//! `RequestStore::resolve` runs it inside the store lock so that lookup and
//! transition form one critical section.

use chrono::{DateTime, Utc};

use crate::domain::{CoreError, Payload, Request, RequestStatus, Reviewer};

/// What the reviewer decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Approve,
    Deny { reason: String },
}

impl Verdict {
    pub fn deny(reason: impl Into<String>) -> Self {
        Verdict::Deny {
            reason: reason.into(),
        }
    }

    pub fn target_status(&self) -> RequestStatus {
        match self {
            Verdict::Approve => RequestStatus::Approved,
            Verdict::Deny { .. } => RequestStatus::Denied,
        }
    }
}

/// A verdict plus who gave it and when.
#[derive(Debug, Clone)]
pub struct Decision {
    pub verdict: Verdict,
    pub reviewer: Reviewer,
    pub decided_at: DateTime<Utc>,
}

pub struct ApprovalStateMachine;

impl ApprovalStateMachine {
    /// Check a decision before touching any record.
    ///
    /// Denials need a non-empty reason (collected by the deny-reason form).
    pub fn validate(decision: &Decision) -> Result<(), CoreError> {
        if let Verdict::Deny { reason } = &decision.verdict
            && reason.trim().is_empty()
        {
            return Err(CoreError::ValidationFailed(
                "A reason is required to deny a request.".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply a decision to a record.
    ///
    /// A record that is already terminal reports `NotFound`: from the
    /// reviewer's point of view it has already been processed.
    pub fn apply<P: Payload>(record: &mut Request<P>, decision: &Decision) -> Result<(), CoreError> {
        Self::validate(decision)?;
        if record.status.is_terminal() {
            return Err(CoreError::NotFound(record.id));
        }

        record.status = decision.verdict.target_status();
        record.reviewer = Some(decision.reviewer.clone());
        record.resolved_at = Some(decision.decided_at);
        if let Verdict::Deny { reason } = &decision.verdict {
            record.deny_reason = Some(reason.trim().to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RequestId, Requester, UserId};
    use crate::store::testing::Note;
    use chrono::TimeZone;

    fn pending() -> Request<Note> {
        Request::new(
            RequestId::Requester(UserId::new(1)),
            Requester {
                id: UserId::new(1),
                display_name: "PFC John Smith".into(),
                account_tag: "jsmith".into(),
            },
            Note::new("medical"),
            Utc.with_ymd_and_hms(2024, 9, 1, 12, 0, 0).unwrap(),
        )
    }

    fn decision(verdict: Verdict) -> Decision {
        Decision {
            verdict,
            reviewer: Reviewer {
                id: UserId::new(99),
                name: "sgt.major".into(),
            },
            decided_at: Utc.with_ymd_and_hms(2024, 9, 2, 8, 30, 0).unwrap(),
        }
    }

    #[test]
    fn approve_sets_status_and_reviewer_together() {
        let mut record = pending();
        assert!(record.reviewer().is_none());

        ApprovalStateMachine::apply(&mut record, &decision(Verdict::Approve)).unwrap();

        assert_eq!(record.status(), RequestStatus::Approved);
        assert_eq!(record.reviewer().unwrap().id, UserId::new(99));
        assert!(record.deny_reason().is_none());
        assert!(record.resolved_at().is_some());
    }

    #[test]
    fn deny_records_the_reason() {
        let mut record = pending();
        ApprovalStateMachine::apply(&mut record, &decision(Verdict::deny("  missing paperwork "))).unwrap();

        assert_eq!(record.status(), RequestStatus::Denied);
        assert_eq!(record.deny_reason(), Some("missing paperwork"));
    }

    #[test]
    fn deny_without_reason_leaves_record_untouched() {
        let mut record = pending();
        let err = ApprovalStateMachine::apply(&mut record, &decision(Verdict::deny("   "))).unwrap_err();

        assert!(matches!(err, CoreError::ValidationFailed(_)));
        assert!(record.is_pending());
        assert!(record.reviewer().is_none());
    }

    #[test]
    fn terminal_records_never_transition_again() {
        let mut record = pending();
        ApprovalStateMachine::apply(&mut record, &decision(Verdict::Approve)).unwrap();

        let err = ApprovalStateMachine::apply(&mut record, &decision(Verdict::deny("late"))).unwrap_err();

        assert!(matches!(err, CoreError::NotFound(_)));
        assert_eq!(record.status(), RequestStatus::Approved);
        assert!(record.deny_reason().is_none());
    }
}
