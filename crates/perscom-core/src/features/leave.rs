//! Leave of absence.

use chrono::{DateTime, Utc};

use crate::domain::{CoreError, FormField, FormSubmission, Payload};
use crate::feature::{Feature, required};

pub struct LeaveOfAbsence;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeavePayload {
    pub reason: String,
    pub return_date: String,
}

impl Payload for LeavePayload {
    fn dedup_fragment(&self) -> String {
        format!("{}|{}", self.reason, self.return_date)
    }

    fn summary(&self) -> String {
        format!("Leave until {}", self.return_date)
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Reason", self.reason.clone()),
            ("Return Date", self.return_date.clone()),
        ]
    }
}

impl Feature for LeaveOfAbsence {
    type Payload = LeavePayload;

    const KEY: &'static str = "loa";
    const TITLE: &'static str = "Leave of Absence";
    const BUTTON_LABEL: &'static str = "Leave of absence";

    fn form(_choice: Option<&str>) -> Option<Vec<FormField>> {
        Some(vec![
            FormField::short("reason", "Reason"),
            FormField::short("date", "Return Date"),
        ])
    }

    fn parse(
        _choice: Option<&str>,
        submission: &FormSubmission,
        _submitted_at: DateTime<Utc>,
    ) -> Result<LeavePayload, CoreError> {
        Ok(LeavePayload {
            reason: required(submission, "reason", "Reason")?.to_string(),
            return_date: required(submission, "date", "Return Date")?.to_string(),
        })
    }
}
