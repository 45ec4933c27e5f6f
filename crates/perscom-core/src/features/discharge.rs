//! Discharge request, with or without a statement.
//!
//! Records are dropped as soon as they are resolved; only the log keeps them.

use chrono::{DateTime, Utc};

use crate::domain::{ButtonStyle, CoreError, FormField, FormSubmission, Payload};
use crate::feature::{Feature, chosen, required};
use crate::store::Disposal;

const WITH_STATEMENT: &str = "Leave with a Statement";
const WITHOUT_STATEMENT: &str = "Leave without a Statement";

pub struct Discharge;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DischargePayload {
    pub statement: Option<String>,
}

impl Payload for DischargePayload {
    fn dedup_fragment(&self) -> String {
        self.statement.clone().unwrap_or_default()
    }

    fn summary(&self) -> String {
        match self.statement {
            Some(_) => "Discharge (with statement)".to_string(),
            None => "Discharge".to_string(),
        }
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![(
            "Statement",
            self.statement.clone().unwrap_or_else(|| "(none)".to_string()),
        )]
    }
}

impl Feature for Discharge {
    type Payload = DischargePayload;

    const KEY: &'static str = "discharge";
    const TITLE: &'static str = "Discharge";
    const BUTTON_LABEL: &'static str = "Discharge Request";
    const BUTTON_STYLE: ButtonStyle = ButtonStyle::Danger;
    const DISPOSAL: Disposal = Disposal::RemoveOnResolve;
    const MENU_PLACEHOLDER: &'static str = "Leave a discharge statement?";

    fn choices() -> &'static [&'static str] {
        &[WITH_STATEMENT, WITHOUT_STATEMENT]
    }

    fn form(choice: Option<&str>) -> Option<Vec<FormField>> {
        (choice == Some(WITH_STATEMENT)).then(|| vec![FormField::short("statement", "Statement")])
    }

    fn parse(
        choice: Option<&str>,
        submission: &FormSubmission,
        _submitted_at: DateTime<Utc>,
    ) -> Result<DischargePayload, CoreError> {
        let statement = match chosen::<Self>(choice)? {
            WITH_STATEMENT => Some(required(submission, "statement", "Statement")?.to_string()),
            _ => None,
        };
        Ok(DischargePayload { statement })
    }
}
