//! ReportHandle: the running forum-log message of one epoch.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::domain::{MessageRef, Payload, Request, RequestStatus, UserId};

/// Identifies "this specific resolved request" in the log.
///
/// The submission timestamp is part of the key: the same user may submit
/// the same text twice and both resolutions must be logged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    requester: UserId,
    fragment: String,
    submitted_at: DateTime<Utc>,
    status: RequestStatus,
}

impl DedupKey {
    pub fn of<P: Payload>(record: &Request<P>) -> Self {
        Self {
            requester: record.requester.id,
            fragment: record.payload.dedup_fragment(),
            submitted_at: record.submitted_at,
            status: record.status(),
        }
    }
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.requester,
            self.fragment,
            self.submitted_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            self.status.as_str()
        )
    }
}

/// External log message + everything already rendered into it.
///
/// Lives inside the store's ledger so that a rollover resets it in the same
/// critical section that empties the collection.
#[derive(Debug)]
pub struct ReportHandle<P> {
    pub(crate) message: Option<MessageRef>,
    seen: HashSet<DedupKey>,
    entries: Vec<Request<P>>,
    /// Entries exist that have not been written out successfully yet.
    pub(crate) dirty: bool,
}

impl<P: Payload> ReportHandle<P> {
    pub fn new() -> Self {
        Self {
            message: None,
            seen: HashSet::new(),
            entries: Vec::new(),
            dirty: false,
        }
    }

    /// Record a terminal request once. Returns whether it was new.
    pub fn absorb(&mut self, record: &Request<P>) -> bool {
        if !record.status().is_terminal() {
            return false;
        }
        if !self.seen.insert(DedupKey::of(record)) {
            return false;
        }
        self.entries.push(record.clone());
        self.dirty = true;
        true
    }

    pub fn message(&self) -> Option<MessageRef> {
        self.message
    }

    pub fn entries(&self) -> &[Request<P>] {
        &self.entries
    }

    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl<P: Payload> Default for ReportHandle<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot taken under the store lock, written out after the lock is gone.
#[derive(Debug, Clone)]
pub struct ReportDraft<P> {
    pub epoch: u64,
    pub message: Option<MessageRef>,
    pub entries: Vec<Request<P>>,
}
