//! Report - 機能ごとのフォーラムログ
//!
//! 終了した申請を重複なく 1 つのメッセージに追記していく。
//! 内容は毎回メモリ上の全エントリから組み立て直し、1 回の書き込みで反映する。

mod handle;
pub mod render;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

pub use self::handle::{DedupKey, ReportDraft, ReportHandle};
pub use self::render::RenderContext;

use crate::domain::{ChannelId, CoreError, MessageRef, OutgoingMessage, Payload};
use crate::ports::{Transport, TransportError};
use crate::store::RequestStore;

/// Discord's message length limit.
pub const DEFAULT_MESSAGE_LIMIT: usize = 2000;

/// What a publish did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Nothing new; no transport call was made.
    Unchanged,
    Created(MessageRef),
    Updated(MessageRef),
    /// Written, but a rollover started a new epoch meanwhile.
    Superseded,
}

/// Writes the running log of one feature to its report channel.
pub struct DeduplicatedReporter {
    title: &'static str,
    channel: ChannelId,
    limit: usize,
    render: RenderContext,
    transport: Arc<dyn Transport>,
    /// Serialises publishes; independent of the store lock.
    flush_lock: Mutex<()>,
}

impl DeduplicatedReporter {
    pub fn new(
        title: &'static str,
        channel: ChannelId,
        transport: Arc<dyn Transport>,
        render: RenderContext,
    ) -> Self {
        Self {
            title,
            channel,
            limit: DEFAULT_MESSAGE_LIMIT,
            render,
            transport,
            flush_lock: Mutex::new(()),
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn channel(&self) -> ChannelId {
        self.channel
    }

    /// Bring the external log up to date with the store.
    ///
    /// # フロー
    /// 1. store ロック内で未記録の終了申請を取り込み、スナップショットを取る
    /// 2. ロック外で全文を組み立てて 1 回書き込む
    /// 3. 成功したら epoch を確認してメッセージ ID を記録
    ///
    /// On failure the handle stays dirty and the next publish retries.
    pub async fn publish<P: Payload>(&self, store: &RequestStore<P>) -> Result<PublishOutcome, CoreError> {
        let _flush = self.flush_lock.lock().await;

        let Some(draft) = store.stage_report().await else {
            return Ok(PublishOutcome::Unchanged);
        };

        let full = render::log_content(self.title, &draft.entries, &self.render);
        let content = render::truncate_to_limit(&full, self.limit);

        let outcome = match draft.message {
            None => PublishOutcome::Created(self.post(content).await?),
            Some(existing) => match self.transport.edit_message(existing, content).await {
                Ok(()) => PublishOutcome::Updated(existing),
                Err(TransportError::MessageNotFound(_)) => {
                    warn!(
                        feature = self.title,
                        message = %existing.message,
                        "report message vanished; posting a new one"
                    );
                    PublishOutcome::Created(self.post(content).await?)
                }
                Err(err) => return Err(err.into()),
            },
        };

        let message = match outcome {
            PublishOutcome::Created(m) | PublishOutcome::Updated(m) => m,
            PublishOutcome::Unchanged | PublishOutcome::Superseded => return Ok(outcome),
        };
        if !store.commit_report(draft.epoch, message).await {
            debug!(feature = self.title, "report written for an epoch that already rolled over");
            return Ok(PublishOutcome::Superseded);
        }
        debug!(
            feature = self.title,
            entries = draft.entries.len(),
            chars = content.chars().count(),
            "report published"
        );
        Ok(outcome)
    }

    async fn post(&self, content: &str) -> Result<MessageRef, CoreError> {
        let message = self
            .transport
            .post_message(self.channel, OutgoingMessage::text(content))
            .await?;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Reviewer, UserId};
    use crate::impls::{InMemoryTransport, Op};
    use crate::store::testing::{Note, request_from};
    use crate::store::Disposal;
    use crate::workflow::{Decision, Verdict};
    use chrono::{Duration, Utc};

    const REPORT: ChannelId = ChannelId::new(900);

    fn approve() -> Decision {
        Decision {
            verdict: Verdict::Approve,
            reviewer: Reviewer {
                id: UserId::new(50),
                name: "captain".into(),
            },
            decided_at: Utc::now(),
        }
    }

    fn reporter(transport: &Arc<InMemoryTransport>) -> DeduplicatedReporter {
        let transport: Arc<dyn Transport> = transport.clone();
        DeduplicatedReporter::new("Leave", REPORT, transport, RenderContext::default())
    }

    async fn resolved_store(texts: &[&str]) -> RequestStore<Note> {
        let store = RequestStore::new();
        for (i, text) in texts.iter().enumerate() {
            let record = request_from(i as u64 + 1, "PFC John Smith", text);
            let id = record.id;
            store.insert(record).await.unwrap();
            store.resolve(&id, &approve(), Disposal::Retain).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn nothing_to_report_makes_no_calls() {
        let transport = Arc::new(InMemoryTransport::new());
        let store = RequestStore::<Note>::new();
        store.insert(request_from(1, "A", "pending")).await.unwrap();

        let outcome = reporter(&transport).publish(&store).await.unwrap();

        assert_eq!(outcome, PublishOutcome::Unchanged);
        assert_eq!(transport.write_count().await, 0);
    }

    #[tokio::test]
    async fn first_publish_posts_then_edits_in_place() {
        let transport = Arc::new(InMemoryTransport::new());
        let reporter = reporter(&transport);
        let store = resolved_store(&["medical"]).await;

        let created = reporter.publish(&store).await.unwrap();
        let PublishOutcome::Created(message) = created else {
            panic!("expected a new post, got {created:?}");
        };
        assert_eq!(store.report_message().await, Some(message));

        let record = request_from(2, "Pvt Jane Doe", "family");
        let id = record.id;
        store.insert(record).await.unwrap();
        store.resolve(&id, &approve(), Disposal::Retain).await.unwrap();

        assert_eq!(reporter.publish(&store).await.unwrap(), PublishOutcome::Updated(message));
        let content = transport.content_of(message).await.unwrap();
        assert!(content.starts_with("**Leave Log:**\n"));
        assert!(content.contains("**medical**"));
        assert!(content.contains("**family**"));
        assert_eq!(transport.messages_in(REPORT).await.len(), 1);
    }

    #[tokio::test]
    async fn republishing_is_idempotent() {
        let transport = Arc::new(InMemoryTransport::new());
        let reporter = reporter(&transport);
        let store = resolved_store(&["medical", "family"]).await;

        reporter.publish(&store).await.unwrap();
        let writes = transport.write_count().await;

        assert_eq!(reporter.publish(&store).await.unwrap(), PublishOutcome::Unchanged);
        assert_eq!(reporter.publish(&store).await.unwrap(), PublishOutcome::Unchanged);
        assert_eq!(transport.write_count().await, writes);
    }

    #[tokio::test]
    async fn identical_payloads_at_different_times_are_both_logged() {
        let transport = Arc::new(InMemoryTransport::new());
        let reporter = reporter(&transport);
        let store = RequestStore::new();
        for offset in 0..2 {
            let mut record = request_from(1, "PFC John Smith", "medical");
            record.id = crate::domain::RequestId::Minted(ulid::Ulid::new());
            record.submitted_at += Duration::seconds(offset);
            let id = record.id;
            store.insert(record).await.unwrap();
            store.resolve(&id, &approve(), Disposal::Retain).await.unwrap();
        }

        let PublishOutcome::Created(message) = reporter.publish(&store).await.unwrap() else {
            panic!("expected a new post");
        };

        let content = transport.content_of(message).await.unwrap();
        assert_eq!(content.matches("**medical**").count(), 2);
    }

    #[tokio::test]
    async fn content_is_cut_to_the_limit() {
        let transport = Arc::new(InMemoryTransport::new());
        let reporter = reporter(&transport).with_limit(2000);
        let long = "x".repeat(400);
        let texts: Vec<&str> = std::iter::repeat_n(long.as_str(), 10).collect();
        let store = resolved_store(&texts).await;

        let PublishOutcome::Created(message) = reporter.publish(&store).await.unwrap() else {
            panic!("expected a new post");
        };

        let content = transport.content_of(message).await.unwrap();
        assert_eq!(content.chars().count(), 2000);
    }

    #[tokio::test]
    async fn failed_write_is_retried_on_next_publish() {
        let transport = Arc::new(InMemoryTransport::new());
        let reporter = reporter(&transport);
        let store = resolved_store(&["medical"]).await;

        transport.fail_next(Op::Post).await;
        assert!(reporter.publish(&store).await.is_err());
        assert_eq!(store.report_message().await, None);

        let outcome = reporter.publish(&store).await.unwrap();
        assert!(matches!(outcome, PublishOutcome::Created(_)));
    }

    #[tokio::test]
    async fn deleted_report_message_is_recreated() {
        let transport = Arc::new(InMemoryTransport::new());
        let reporter = reporter(&transport);
        let store = resolved_store(&["medical"]).await;
        let PublishOutcome::Created(first) = reporter.publish(&store).await.unwrap() else {
            panic!("expected a new post");
        };
        transport.delete_message(first).await.unwrap();

        let record = request_from(9, "Pvt Jane Doe", "family");
        let id = record.id;
        store.insert(record).await.unwrap();
        store.resolve(&id, &approve(), Disposal::Retain).await.unwrap();

        let outcome = reporter.publish(&store).await.unwrap();
        let PublishOutcome::Created(second) = outcome else {
            panic!("expected a repost, got {outcome:?}");
        };
        assert_ne!(first, second);
        assert_eq!(store.report_message().await, Some(second));
    }

    #[tokio::test]
    async fn rollover_starts_a_fresh_message() {
        let transport = Arc::new(InMemoryTransport::new());
        let reporter = reporter(&transport);
        let store = resolved_store(&["medical"]).await;
        let PublishOutcome::Created(first) = reporter.publish(&store).await.unwrap() else {
            panic!("expected a new post");
        };

        store.clear_epoch().await;
        let record = request_from(1, "PFC John Smith", "medical");
        let id = record.id;
        store.insert(record).await.unwrap();
        store.resolve(&id, &approve(), Disposal::Retain).await.unwrap();

        let PublishOutcome::Created(second) = reporter.publish(&store).await.unwrap() else {
            panic!("expected a new post after rollover");
        };
        assert_ne!(first, second);
        let content = transport.content_of(second).await.unwrap();
        assert_eq!(content.matches("**medical**").count(), 1);
    }
}
