//! Temporary pass for the next operation.
//!
//! Operations run Saturdays at 23:00 UTC. No form: the pass is requested
//! for the next operation as soon as the button is clicked.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};

use crate::domain::{CoreError, FormField, FormSubmission, Payload};
use crate::feature::Feature;

const OPERATION_HOUR: u32 = 23;

pub struct TemporaryPass;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporaryPassPayload {
    pub operation: DateTime<Utc>,
}

impl Payload for TemporaryPassPayload {
    fn dedup_fragment(&self) -> String {
        self.operation.timestamp().to_string()
    }

    fn summary(&self) -> String {
        format!("Temporary pass for {}", self.operation.format("%a, %d %b %Y"))
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![("Operation", format!("<t:{}:F>", self.operation.timestamp()))]
    }
}

/// 23:00 UTC on the coming Saturday (today when `now` is a Saturday).
pub fn next_operation(now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive();
    let days_ahead = (6 - i64::from(today.weekday().num_days_from_sunday()) + 7) % 7;
    let time = NaiveTime::from_hms_opt(OPERATION_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    (today + Duration::days(days_ahead)).and_time(time).and_utc()
}

impl Feature for TemporaryPass {
    type Payload = TemporaryPassPayload;

    const KEY: &'static str = "tpr";
    const TITLE: &'static str = "Temporary Pass";
    const BUTTON_LABEL: &'static str = "Temporary Pass Request";

    fn form(_choice: Option<&str>) -> Option<Vec<FormField>> {
        None
    }

    fn parse(
        _choice: Option<&str>,
        _submission: &FormSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<TemporaryPassPayload, CoreError> {
        Ok(TemporaryPassPayload {
            operation: next_operation(submitted_at),
        })
    }
}
