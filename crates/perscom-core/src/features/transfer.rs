//! Unit transfer. One open request per member.

use chrono::{DateTime, Utc};

use crate::domain::{CoreError, FormField, FormSubmission, Payload};
use crate::feature::{Feature, IdScheme, required};

pub struct Transfer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferPayload {
    pub from: String,
    pub to: String,
}

impl Payload for TransferPayload {
    fn dedup_fragment(&self) -> String {
        self.to.clone()
    }

    fn summary(&self) -> String {
        format!("Transfer from {} to {}", self.from, self.to)
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Current Unit", self.from.clone()),
            ("Desired Unit", self.to.clone()),
        ]
    }
}

impl Feature for Transfer {
    type Payload = TransferPayload;

    const KEY: &'static str = "trans";
    const TITLE: &'static str = "Transfer";
    const BUTTON_LABEL: &'static str = "Transfer";
    const ID_SCHEME: IdScheme = IdScheme::PerRequester;

    fn form(_choice: Option<&str>) -> Option<Vec<FormField>> {
        Some(vec![
            FormField::short("from", "Current Unit"),
            FormField::short("to", "Desired Unit"),
        ])
    }

    fn parse(
        _choice: Option<&str>,
        submission: &FormSubmission,
        _submitted_at: DateTime<Utc>,
    ) -> Result<TransferPayload, CoreError> {
        Ok(TransferPayload {
            from: required(submission, "from", "Current Unit")?.to_string(),
            to: required(submission, "to", "Desired Unit")?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desired_unit_tells_requests_apart() {
        let submission = FormSubmission::new("trans:submit")
            .with("from", "1st Platoon")
            .with("to", "Rangers");
        let payload = Transfer::parse(None, &submission, Utc::now()).unwrap();
        assert_eq!(payload.dedup_fragment(), "Rangers");
    }
}
