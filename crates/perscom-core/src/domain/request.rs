//! Request record: requester snapshot + payload + approval state.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{RequestId, UserId};
use super::message::{Actor, MessageRef};

/// Approval state of a request.
///
/// State transitions:
/// - Pending -> Approved
/// - Pending -> Denied
///
/// Approved and Denied are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Denied,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Approved | RequestStatus::Denied)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Denied => "denied",
        }
    }
}

/// Who submitted the request, as seen at submission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub id: UserId,
    pub display_name: String,
    pub account_tag: String,
}

impl From<&Actor> for Requester {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            display_name: actor.display_name.clone(),
            account_tag: actor.account_tag.clone(),
        }
    }
}

/// Who approved or denied the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reviewer {
    pub id: UserId,
    pub name: String,
}

impl From<&Actor> for Reviewer {
    fn from(actor: &Actor) -> Self {
        Self {
            id: actor.id,
            name: actor.account_tag.clone(),
        }
    }
}

/// Feature-specific form data carried by a request.
pub trait Payload: Clone + Debug + Send + Sync + 'static {
    /// Field(s) telling two resolved requests of the same user apart.
    fn dedup_fragment(&self) -> String;

    /// One-line description used in logs and listings.
    fn summary(&self) -> String;

    /// Labelled fields for the approval-channel post.
    fn details(&self) -> Vec<(&'static str, String)>;
}

/// One submitted request.
///
/// Status, reviewer and deny reason are only written by
/// `workflow::ApprovalStateMachine`.
#[derive(Debug, Clone)]
pub struct Request<P> {
    pub id: RequestId,
    pub requester: Requester,
    pub payload: P,
    pub submitted_at: DateTime<Utc>,

    /// Post in the approval channel, once it exists.
    pub approval_message: Option<MessageRef>,

    pub(crate) status: RequestStatus,
    pub(crate) reviewer: Option<Reviewer>,
    pub(crate) deny_reason: Option<String>,
    pub(crate) resolved_at: Option<DateTime<Utc>>,
}

impl<P: Payload> Request<P> {
    pub fn new(id: RequestId, requester: Requester, payload: P, submitted_at: DateTime<Utc>) -> Self {
        Self {
            id,
            requester,
            payload,
            submitted_at,
            approval_message: None,
            status: RequestStatus::Pending,
            reviewer: None,
            deny_reason: None,
            resolved_at: None,
        }
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn reviewer(&self) -> Option<&Reviewer> {
        self.reviewer.as_ref()
    }

    pub fn deny_reason(&self) -> Option<&str> {
        self.deny_reason.as_deref()
    }

    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}
