//! Squad XML request.
//!
//! One click, no form. Keyed by requester, so a member has at most one
//! pending request.

use chrono::{DateTime, Utc};

use crate::domain::{CoreError, FormField, FormSubmission, Payload};
use crate::feature::{Feature, IdScheme};

pub struct SquadXml;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquadXmlPayload;

impl Payload for SquadXmlPayload {
    fn dedup_fragment(&self) -> String {
        String::new()
    }

    fn summary(&self) -> String {
        "Squad XML".to_string()
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

impl Feature for SquadXml {
    type Payload = SquadXmlPayload;

    const KEY: &'static str = "squad-xml";
    const TITLE: &'static str = "Squad XML";
    const BUTTON_LABEL: &'static str = "Request a Squad XML";
    const ID_SCHEME: IdScheme = IdScheme::PerRequester;

    fn acknowledgement() -> String {
        "Squad XML request submitted.".to_string()
    }

    fn form(_choice: Option<&str>) -> Option<Vec<FormField>> {
        None
    }

    fn parse(
        _choice: Option<&str>,
        _submission: &FormSubmission,
        _submitted_at: DateTime<Utc>,
    ) -> Result<SquadXmlPayload, CoreError> {
        Ok(SquadXmlPayload)
    }
}
