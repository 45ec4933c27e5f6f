//! Award recommendation.

use chrono::{DateTime, Utc};

use crate::domain::{CoreError, FormField, FormSubmission, Payload};
use crate::feature::{Feature, IdScheme, chosen, required};

pub struct AwardRecommendation;

const AWARDS: &[&str] = &[
    "Air Service Medal",
    "Army Achievement Medal",
    "Army Commendation Medal",
    "Army NCODEV Ribbon",
    "Bronze Star Medal",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AwardPayload {
    pub award: String,
    pub recipient: String,
    pub operation: String,
    pub citation: String,
}

impl Payload for AwardPayload {
    fn dedup_fragment(&self) -> String {
        format!("{}|{}|{}", self.award, self.recipient, self.operation)
    }

    fn summary(&self) -> String {
        format!("{} for {}", self.award, self.recipient)
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Award", self.award.clone()),
            ("Recipient", self.recipient.clone()),
            ("Operation #", self.operation.clone()),
            ("Citation", self.citation.clone()),
        ]
    }
}

impl Feature for AwardRecommendation {
    type Payload = AwardPayload;

    const KEY: &'static str = "awd";
    const TITLE: &'static str = "Award Recommendation";
    const BUTTON_LABEL: &'static str = "Award Rec";
    const ID_SCHEME: IdScheme = IdScheme::PerRequester;
    const MENU_PLACEHOLDER: &'static str = "Select an award";

    fn choices() -> &'static [&'static str] {
        AWARDS
    }

    fn form(_choice: Option<&str>) -> Option<Vec<FormField>> {
        Some(vec![
            FormField::short("name", "Recipient Name"),
            FormField::short("operation_number", "Operation #"),
            FormField::paragraph("citation", "Citation"),
        ])
    }

    fn parse(
        choice: Option<&str>,
        submission: &FormSubmission,
        _submitted_at: DateTime<Utc>,
    ) -> Result<AwardPayload, CoreError> {
        Ok(AwardPayload {
            award: chosen::<Self>(choice)?.to_string(),
            recipient: required(submission, "name", "Recipient Name")?.to_string(),
            operation: required(submission, "operation_number", "Operation #")?.to_string(),
            citation: required(submission, "citation", "Citation")?.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> FormSubmission {
        FormSubmission::new("awd:submit:Bronze Star Medal")
            .with("name", "Sgt Rock")
            .with("operation_number", "42")
            .with("citation", "Held the line.")
    }

    #[test]
    fn award_must_come_from_the_menu() {
        assert!(AwardRecommendation::parse(Some("Medal of Honor"), &filled(), Utc::now()).is_err());
    }

    #[test]
    fn complete_submission_parses() {
        let payload = AwardRecommendation::parse(Some("Bronze Star Medal"), &filled(), Utc::now()).unwrap();
        assert_eq!(payload.summary(), "Bronze Star Medal for Sgt Rock");
        assert_eq!(payload.details().len(), 4);
    }
}
