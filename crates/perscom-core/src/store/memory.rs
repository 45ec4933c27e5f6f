//! In-memory request store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;

use super::{Disposal, NicknameQuery};
use crate::domain::{CoreError, MessageRef, Payload, Request, RequestId};
use crate::report::{ReportDraft, ReportHandle};
use crate::workflow::{ApprovalStateMachine, Decision};

/// Everything guarded by the store lock.
///
/// Design:
/// - `records` is the single source of truth for request state.
/// - `order` keeps insertion order (listing, clear-by-name).
/// - `report` shares the lock so rollover resets records and log together.
struct Ledger<P> {
    records: HashMap<RequestId, Request<P>>,
    order: Vec<RequestId>,
    report: ReportHandle<P>,
    epoch: u64,
}

impl<P: Payload> Ledger<P> {
    fn new() -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
            report: ReportHandle::new(),
            epoch: 0,
        }
    }

    fn insert(&mut self, record: Request<P>) -> Result<(), CoreError> {
        if self.records.contains_key(&record.id) {
            return Err(CoreError::DuplicateKey(record.id));
        }
        self.order.push(record.id);
        self.records.insert(record.id, record);
        Ok(())
    }

    fn remove(&mut self, id: &RequestId) -> Option<Request<P>> {
        let record = self.records.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(record)
    }

    fn ordered(&self) -> impl Iterator<Item = &Request<P>> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }
}

/// Concurrency-safe map from request id to request record.
///
/// Every operation takes the single store-wide lock for its whole duration
/// and returns owned snapshots; no guard ever escapes, so callers cannot
/// hold the lock across a transport call.
pub struct RequestStore<P> {
    ledger: Arc<Mutex<Ledger<P>>>,
}

impl<P> Clone for RequestStore<P> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

impl<P: Payload> Default for RequestStore<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Payload> RequestStore<P> {
    pub fn new() -> Self {
        Self {
            ledger: Arc::new(Mutex::new(Ledger::new())),
        }
    }

    /// Add a new record. Fails with `DuplicateKey` if the id is present.
    pub async fn insert(&self, record: Request<P>) -> Result<(), CoreError> {
        self.ledger.lock().await.insert(record)
    }

    /// Insert, first dropping a *resolved* record with the same id.
    ///
    /// Used by features keyed by requester: a user may submit again once the
    /// previous request is resolved, but not while it is still pending.
    pub async fn insert_replacing_resolved(&self, record: Request<P>) -> Result<(), CoreError> {
        let mut ledger = self.ledger.lock().await;
        if let Some(existing) = ledger.records.get(&record.id) {
            if existing.is_pending() {
                return Err(CoreError::DuplicateKey(record.id));
            }
            ledger.remove(&record.id);
        }
        ledger.insert(record)
    }

    pub async fn get(&self, id: &RequestId) -> Option<Request<P>> {
        self.ledger.lock().await.records.get(id).cloned()
    }

    /// Read-modify-write one record atomically. `None` when absent.
    pub async fn update<R>(&self, id: &RequestId, mutate: impl FnOnce(&mut Request<P>) -> R) -> Option<R> {
        let mut ledger = self.ledger.lock().await;
        ledger.records.get_mut(id).map(mutate)
    }

    /// Remove every matching record, returning them in insertion order.
    pub async fn remove_where(&self, mut predicate: impl FnMut(&Request<P>) -> bool) -> Vec<Request<P>> {
        let mut ledger = self.ledger.lock().await;
        let doomed: Vec<RequestId> = ledger
            .ordered()
            .filter(|record| predicate(record))
            .map(|record| record.id)
            .collect();
        doomed.iter().filter_map(|id| ledger.remove(id)).collect()
    }

    /// Remove the first record (insertion order) matching the predicate.
    pub async fn remove_first(&self, mut predicate: impl FnMut(&Request<P>) -> bool) -> Option<Request<P>> {
        let mut ledger = self.ledger.lock().await;
        let id = ledger.ordered().find(|record| predicate(record)).map(|record| record.id)?;
        ledger.remove(&id)
    }

    /// Administrative clear: at most one record, first match wins.
    pub async fn clear_by_nickname(&self, query: &NicknameQuery) -> Option<Request<P>> {
        self.remove_first(|record| query.matches(&record.requester.display_name))
            .await
    }

    /// Point-in-time snapshot, insertion order.
    pub async fn list(&self) -> Vec<Request<P>> {
        self.ledger.lock().await.ordered().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.ledger.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Look up and transition one record in a single critical section.
    ///
    /// The finalized record is absorbed into the report handle before the
    /// disposal policy runs, so records removed on resolution are still
    /// logged.
    pub async fn resolve(
        &self,
        id: &RequestId,
        decision: &Decision,
        disposal: Disposal,
    ) -> Result<Request<P>, CoreError> {
        ApprovalStateMachine::validate(decision)?;

        let mut guard = self.ledger.lock().await;
        let ledger = &mut *guard;
        let record = ledger.records.get_mut(id).ok_or(CoreError::NotFound(*id))?;
        ApprovalStateMachine::apply(record, decision)?;
        let finalized = record.clone();

        ledger.report.absorb(&finalized);
        if disposal == Disposal::RemoveOnResolve {
            ledger.remove(id);
        }
        Ok(finalized)
    }

    /// Start a new epoch: drop every record (pending or not) and reset the
    /// report handle. Returns how many records were dropped.
    pub async fn clear_epoch(&self) -> usize {
        let mut ledger = self.ledger.lock().await;
        let dropped = ledger.records.len();
        ledger.records.clear();
        ledger.order.clear();
        ledger.report = ReportHandle::new();
        ledger.epoch += 1;
        dropped
    }

    pub async fn epoch(&self) -> u64 {
        self.ledger.lock().await.epoch
    }

    pub async fn report_message(&self) -> Option<MessageRef> {
        self.ledger.lock().await.report.message()
    }

    pub async fn report_seen_len(&self) -> usize {
        self.ledger.lock().await.report.seen_len()
    }

    /// Absorb all terminal records and, if anything is unwritten, snapshot
    /// the full log for the reporter.
    pub(crate) async fn stage_report(&self) -> Option<ReportDraft<P>> {
        let mut guard = self.ledger.lock().await;
        let ledger = &mut *guard;
        for id in &ledger.order {
            if let Some(record) = ledger.records.get(id) {
                ledger.report.absorb(record);
            }
        }
        if !ledger.report.is_dirty() {
            return None;
        }
        Some(ReportDraft {
            epoch: ledger.epoch,
            message: ledger.report.message(),
            entries: ledger.report.entries().to_vec(),
        })
    }

    /// Record a successful write. Ignored if a rollover happened meanwhile.
    pub(crate) async fn commit_report(&self, epoch: u64, message: MessageRef) -> bool {
        let mut ledger = self.ledger.lock().await;
        if ledger.epoch != epoch {
            return false;
        }
        ledger.report.message = Some(message);
        ledger.report.dirty = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RequestStatus, Reviewer, UserId};
    use crate::store::testing::{Note, message_ref, request_from};
    use crate::workflow::Verdict;
    use chrono::Utc;
    use rstest::rstest;

    fn approve_by(reviewer: u64) -> Decision {
        Decision {
            verdict: Verdict::Approve,
            reviewer: Reviewer {
                id: UserId::new(reviewer),
                name: format!("reviewer-{reviewer}"),
            },
            decided_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let store = RequestStore::new();
        let record = request_from(1, "PFC John Smith", "medical");
        store.insert(record.clone()).await.unwrap();

        let err = store.insert(record).await.unwrap_err();
        assert!(matches!(err, CoreError::DuplicateKey(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn update_is_a_noop_for_missing_ids() {
        let store = RequestStore::<Note>::new();
        let missing = RequestId::Requester(UserId::new(404));
        assert!(store.update(&missing, |_| ()).await.is_none());
    }

    #[tokio::test]
    async fn update_mutates_in_place() {
        let store = RequestStore::new();
        let record = request_from(1, "PFC John Smith", "medical");
        let id = record.id;
        store.insert(record).await.unwrap();

        store
            .update(&id, |r| r.payload = Note::new("dental"))
            .await
            .unwrap();

        assert_eq!(store.get(&id).await.unwrap().payload, Note::new("dental"));
    }

    #[tokio::test]
    async fn list_keeps_insertion_order() {
        let store = RequestStore::new();
        for (user, name) in [(3, "C"), (1, "A"), (2, "B")] {
            store.insert(request_from(user, name, "x")).await.unwrap();
        }
        let names: Vec<String> = store
            .list()
            .await
            .into_iter()
            .map(|r| r.requester.display_name)
            .collect();
        assert_eq!(names, ["C", "A", "B"]);
    }

    #[tokio::test]
    async fn remove_where_returns_removed_records() {
        let store = RequestStore::new();
        store.insert(request_from(1, "A", "keep")).await.unwrap();
        store.insert(request_from(2, "B", "drop")).await.unwrap();
        store.insert(request_from(3, "C", "drop")).await.unwrap();

        let removed = store.remove_where(|r| r.payload.text == "drop").await;

        assert_eq!(removed.len(), 2);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn resolve_second_time_reports_not_found() {
        let store = RequestStore::new();
        let record = request_from(1, "A", "medical");
        let id = record.id;
        store.insert(record).await.unwrap();

        store.resolve(&id, &approve_by(9), Disposal::Retain).await.unwrap();
        let err = store.resolve(&id, &approve_by(10), Disposal::Retain).await.unwrap_err();

        assert!(matches!(err, CoreError::NotFound(_)));
        let stored = store.get(&id).await.unwrap();
        assert_eq!(stored.status(), RequestStatus::Approved);
        assert_eq!(stored.reviewer().unwrap().id, UserId::new(9));
    }

    #[tokio::test]
    async fn remove_on_resolve_still_reaches_the_report() {
        let store = RequestStore::new();
        let record = request_from(1, "A", "medical");
        let id = record.id;
        store.insert(record).await.unwrap();

        store
            .resolve(&id, &approve_by(9), Disposal::RemoveOnResolve)
            .await
            .unwrap();

        assert!(store.get(&id).await.is_none());
        assert_eq!(store.report_seen_len().await, 1);
        let draft = store.stage_report().await.unwrap();
        assert_eq!(draft.entries.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_resolutions_have_exactly_one_winner() {
        let store = RequestStore::new();
        let record = request_from(1, "A", "medical");
        let id = record.id;
        store.insert(record).await.unwrap();

        let mut joins = Vec::new();
        for reviewer in 0..16u64 {
            let store = store.clone();
            joins.push(tokio::spawn(async move {
                let decision = if reviewer % 2 == 0 {
                    approve_by(reviewer)
                } else {
                    Decision {
                        verdict: Verdict::deny("no"),
                        ..approve_by(reviewer)
                    }
                };
                store.resolve(&id, &decision, Disposal::Retain).await
            }));
        }

        let mut winners = Vec::new();
        let mut not_found = 0;
        for join in joins {
            match join.await.unwrap() {
                Ok(record) => winners.push(record),
                Err(CoreError::NotFound(_)) => not_found += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(winners.len(), 1);
        assert_eq!(not_found, 15);
        let stored = store.get(&id).await.unwrap();
        assert_eq!(stored.status(), winners[0].status());
        assert_eq!(stored.reviewer(), winners[0].reviewer());
    }

    #[tokio::test]
    async fn replacing_only_works_once_resolved() {
        let store = RequestStore::new();
        let first = request_from(1, "A", "first");
        let id = first.id;
        store.insert(first).await.unwrap();

        let again = request_from(1, "A", "second");
        let err = store.insert_replacing_resolved(again.clone()).await.unwrap_err();
        assert!(matches!(err, CoreError::DuplicateKey(_)));

        store.resolve(&id, &approve_by(9), Disposal::Retain).await.unwrap();
        store.insert_replacing_resolved(again).await.unwrap();

        let stored = store.get(&id).await.unwrap();
        assert!(stored.is_pending());
        assert_eq!(stored.payload, Note::new("second"));
    }

    #[tokio::test]
    async fn clear_epoch_drops_everything_and_resets_the_log() {
        let store = RequestStore::new();
        let done = request_from(1, "A", "done");
        let done_id = done.id;
        store.insert(done).await.unwrap();
        store.insert(request_from(2, "B", "waiting")).await.unwrap();
        store.resolve(&done_id, &approve_by(9), Disposal::Retain).await.unwrap();
        let draft = store.stage_report().await.unwrap();
        assert!(store.commit_report(draft.epoch, message_ref(7)).await);

        let dropped = store.clear_epoch().await;

        assert_eq!(dropped, 2);
        assert!(store.is_empty().await);
        assert_eq!(store.report_message().await, None);
        assert_eq!(store.report_seen_len().await, 0);
        assert_eq!(store.epoch().await, draft.epoch + 1);
    }

    #[tokio::test]
    async fn stale_commit_after_rollover_is_ignored() {
        let store = RequestStore::new();
        let done = request_from(1, "A", "done");
        let id = done.id;
        store.insert(done).await.unwrap();
        store.resolve(&id, &approve_by(9), Disposal::Retain).await.unwrap();
        let draft = store.stage_report().await.unwrap();

        store.clear_epoch().await;

        assert!(!store.commit_report(draft.epoch, message_ref(7)).await);
        assert_eq!(store.report_message().await, None);
    }

    #[rstest]
    #[case("PFC John Smith", "smi", true)]
    #[case("PFC John Smith", "pfc john smith", true)]
    #[case("PFC John Smith", "john", false)]
    #[tokio::test]
    async fn clear_by_nickname_uses_surname_heuristic(
        #[case] display_name: &str,
        #[case] query: &str,
        #[case] removed: bool,
    ) {
        let store = RequestStore::new();
        store.insert(request_from(1, display_name, "x")).await.unwrap();

        let query = NicknameQuery::parse(query).unwrap();
        assert_eq!(store.clear_by_nickname(&query).await.is_some(), removed);
        assert_eq!(store.len().await, usize::from(!removed));
    }

    #[tokio::test]
    async fn clear_by_nickname_removes_only_the_first_match() {
        let store = RequestStore::new();
        let first = request_from(1, "Pvt Adam Smith", "x");
        let first_id = first.id;
        store.insert(first).await.unwrap();
        store.insert(request_from(2, "Cpl Eve Smith", "x")).await.unwrap();

        let query = NicknameQuery::parse("smith").unwrap();
        let removed = store.clear_by_nickname(&query).await.unwrap();

        assert_eq!(removed.id, first_id);
        assert_eq!(store.len().await, 1);
    }
}
