//! Bling Bucks redemption.
//!
//! The log is weekly: the rollover loop empties this feature every week.

use chrono::{DateTime, Utc};

use crate::domain::{CoreError, FormField, FormSubmission, Payload};
use crate::feature::{Feature, chosen, required};

pub const RAFFLE_TICKET: &str = "Raffle Ticket";

const OPTIONS: &[&str] = &[
    RAFFLE_TICKET,
    "Helmet",
    "Insignia",
    "Uniform",
    "Backpack",
    "Vest",
    "Face-wear",
    "Tattoo",
];

pub struct BlingBucks;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlingBucksPayload {
    pub option: String,
    pub tickets: Option<u8>,
    pub description: Option<String>,
}

impl Payload for BlingBucksPayload {
    fn dedup_fragment(&self) -> String {
        format!(
            "{}|{}|{}",
            self.option,
            self.tickets.map(|t| t.to_string()).unwrap_or_default(),
            self.description.as_deref().unwrap_or("")
        )
    }

    fn summary(&self) -> String {
        match self.tickets {
            Some(tickets) => format!("{RAFFLE_TICKET} x{tickets}"),
            None => format!("BB {}", self.option),
        }
    }

    fn details(&self) -> Vec<(&'static str, String)> {
        let mut details = vec![("Option", self.option.clone())];
        if let Some(tickets) = self.tickets {
            details.push(("Number of Tickets", tickets.to_string()));
        }
        if let Some(description) = &self.description {
            details.push(("Description", description.clone()));
        }
        details
    }
}

impl Feature for BlingBucks {
    type Payload = BlingBucksPayload;

    const KEY: &'static str = "bb";
    const TITLE: &'static str = "BB";
    const BUTTON_LABEL: &'static str = "Bling Bucks";
    const MENU_PLACEHOLDER: &'static str = "What would you like to redeem?";

    fn choices() -> &'static [&'static str] {
        OPTIONS
    }

    fn form(choice: Option<&str>) -> Option<Vec<FormField>> {
        if choice == Some(RAFFLE_TICKET) {
            Some(vec![FormField::short("numTicket", "Number of Tickets (max 3)").max_length(1)])
        } else {
            Some(vec![FormField::paragraph("description", "Description (class name and link)")])
        }
    }

    fn parse(
        choice: Option<&str>,
        submission: &FormSubmission,
        _submitted_at: DateTime<Utc>,
    ) -> Result<BlingBucksPayload, CoreError> {
        let option = chosen::<Self>(choice)?;
        if option == RAFFLE_TICKET {
            let tickets = parse_tickets(submission.value("numTicket").unwrap_or(""))?;
            return Ok(BlingBucksPayload {
                option: option.to_string(),
                tickets: Some(tickets),
                description: None,
            });
        }
        Ok(BlingBucksPayload {
            option: option.to_string(),
            tickets: None,
            description: Some(required(submission, "description", "Description")?.to_string()),
        })
    }
}

fn parse_tickets(raw: &str) -> Result<u8, CoreError> {
    match raw {
        "1" => Ok(1),
        "2" => Ok(2),
        "3" => Ok(3),
        _ => Err(CoreError::ValidationFailed(
            "Please enter a number between 1 and 3 for Number of Tickets.".to_string(),
        )),
    }
}
