//! Coordinator - 1 機能分の申請ライフサイクル
//!
//! # フロー
//! 1. submit: 検証 → ID 採番 → store に登録 → 承認チャンネルに投稿 → DM
//! 2. approve / deny: store ロック内で状態遷移（1 回だけ成功する）
//! 3. ロック解放後: フォーラムログ更新 → DM → 承認メッセージ削除
//!
//! Transport の失敗は状態遷移を巻き戻さない。ログに残して先へ進む。

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use super::notifier::Notifier;
use crate::domain::{
    Action, Actor, ButtonStyle, ChannelId, CoreError, FormField, FormRequest, FormSubmission,
    MessageRef, OutgoingMessage, Payload, Reply, Request, RequestId, Requester, Reviewer,
};
use crate::feature::{Feature, FeatureHandler, IdScheme, Route, chosen};
use crate::ports::{Clock, IdGenerator, Transport};
use crate::report::{DeduplicatedReporter, PublishOutcome, RenderContext, render};
use crate::store::{NicknameQuery, RequestStore};
use crate::workflow::{Decision, Verdict};

pub const DENY_REASON_FIELD: &str = "deny-reason";
const DENY_REASON_MAX: u16 = 400;

/// Collaborators shared by every coordinator of one app.
#[derive(Clone)]
pub struct Wiring {
    pub transport: Arc<dyn Transport>,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
    pub render: RenderContext,
    pub message_limit: usize,
}

/// Channels of one feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channels {
    pub approval: ChannelId,
    pub report: ChannelId,
}

pub struct Coordinator<F: Feature> {
    store: RequestStore<F::Payload>,
    reporter: DeduplicatedReporter,
    notifier: Notifier,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    approval_channel: ChannelId,
    render: RenderContext,
    _feature: PhantomData<fn() -> F>,
}

impl<F: Feature> Coordinator<F> {
    pub fn new(wiring: &Wiring, channels: Channels) -> Self {
        let reporter = DeduplicatedReporter::new(
            F::TITLE,
            channels.report,
            Arc::clone(&wiring.transport),
            wiring.render.clone(),
        )
        .with_limit(wiring.message_limit);
        Self {
            store: RequestStore::new(),
            reporter,
            notifier: Notifier::new(Arc::clone(&wiring.transport)),
            transport: Arc::clone(&wiring.transport),
            clock: Arc::clone(&wiring.clock),
            ids: Arc::clone(&wiring.ids),
            approval_channel: channels.approval,
            render: wiring.render.clone(),
            _feature: PhantomData,
        }
    }

    pub fn store(&self) -> &RequestStore<F::Payload> {
        &self.store
    }

    /// Validate and record a new request, then post it for review.
    ///
    /// If the review post cannot be made the record is withdrawn again, so
    /// the requester can simply retry.
    pub async fn submit(
        &self,
        actor: &Actor,
        choice: Option<&str>,
        submission: &FormSubmission,
    ) -> Result<Request<F::Payload>, CoreError> {
        let now = self.clock.now();
        let payload = F::parse(choice, submission, now)?;
        let id = match F::ID_SCHEME {
            IdScheme::PerRequest => self.ids.generate_request_id(),
            IdScheme::PerRequester => RequestId::Requester(actor.id),
        };
        let mut record = Request::new(id, Requester::from(actor), payload, now);

        match F::ID_SCHEME {
            IdScheme::PerRequest => self.store.insert(record.clone()).await?,
            IdScheme::PerRequester => self.store.insert_replacing_resolved(record.clone()).await?,
        }

        let post = OutgoingMessage::text(render::approval_post(F::TITLE, &record)).with_actions(vec![
            Action::new("Approve", ButtonStyle::Primary, Route::Approve(id).custom_id(F::KEY)),
            Action::new("Deny", ButtonStyle::Danger, Route::Deny(id).custom_id(F::KEY)),
        ]);
        let message = match self.transport.post_message(self.approval_channel, post).await {
            Ok(message) => message,
            Err(err) => {
                warn!(feature = F::KEY, request_id = %id, error = %err, "approval post failed; withdrawing request");
                self.store.remove_where(|r| r.id == id && r.is_pending()).await;
                return Err(err.into());
            }
        };
        self.store
            .update(&id, |r| r.approval_message = Some(message))
            .await;
        record.approval_message = Some(message);

        info!(
            feature = F::KEY,
            request_id = %id,
            requester = %actor.id,
            summary = %record.payload.summary(),
            "request submitted"
        );
        self.notifier
            .notify(
                actor.id,
                &format!("✅ Your {} request has been **submitted**.", F::TITLE),
            )
            .await;
        Ok(record)
    }

    pub async fn approve(
        &self,
        id: RequestId,
        reviewer: &Actor,
        origin: Option<MessageRef>,
    ) -> Result<Request<F::Payload>, CoreError> {
        self.finalize(id, Verdict::Approve, reviewer, origin).await
    }

    /// Form asking the reviewer for a denial reason.
    pub async fn deny_form(&self, id: RequestId) -> Result<FormRequest, CoreError> {
        match self.store.get(&id).await {
            Some(record) if record.is_pending() => Ok(FormRequest {
                custom_id: Route::DenyReason(id).custom_id(F::KEY),
                title: format!("Deny {} Request", F::TITLE),
                fields: vec![
                    FormField::paragraph(DENY_REASON_FIELD, "Reason for denial (required)")
                        .max_length(DENY_REASON_MAX),
                ],
            }),
            _ => Err(CoreError::NotFound(id)),
        }
    }

    pub async fn deny(
        &self,
        id: RequestId,
        reviewer: &Actor,
        reason: &str,
        origin: Option<MessageRef>,
    ) -> Result<Request<F::Payload>, CoreError> {
        self.finalize(id, Verdict::deny(reason), reviewer, origin).await
    }

    /// Transition under the store lock, then do every external call.
    async fn finalize(
        &self,
        id: RequestId,
        verdict: Verdict,
        reviewer: &Actor,
        origin: Option<MessageRef>,
    ) -> Result<Request<F::Payload>, CoreError> {
        let decision = Decision {
            verdict,
            reviewer: Reviewer::from(reviewer),
            decided_at: self.clock.now(),
        };
        let record = self.store.resolve(&id, &decision, F::DISPOSAL).await?;
        info!(
            feature = F::KEY,
            request_id = %id,
            reviewer = %decision.reviewer.name,
            status = record.status().as_str(),
            "request resolved"
        );

        if let Err(err) = self.reporter.publish(&self.store).await {
            warn!(feature = F::KEY, error = %err, "report publish failed; will retry on next change");
        }

        let text = match record.deny_reason() {
            None => format!("✅ Your {} request has been **approved**.", F::TITLE),
            Some(reason) => format!(
                "❌ Your {} request has been **denied**.\n**Reason:** {reason}",
                F::TITLE
            ),
        };
        self.notifier.notify(record.requester.id, &text).await;

        if let Some(message) = origin.or(record.approval_message)
            && let Err(err) = self.transport.delete_message(message).await
        {
            warn!(feature = F::KEY, request_id = %id, error = %err, "could not delete approval message");
        }
        Ok(record)
    }

    /// Remove the first request whose requester matches `raw`.
    pub async fn clear_by_nickname(&self, raw: &str) -> Result<bool, CoreError> {
        let query = NicknameQuery::parse(raw)?;
        let removed = self.store.clear_by_nickname(&query).await;
        if let Some(record) = &removed {
            info!(feature = F::KEY, request_id = %record.id, query = query.as_str(), "request cleared");
        }
        Ok(removed.is_some())
    }

    pub async fn clear_all(&self) -> usize {
        let removed = self.store.remove_where(|_| true).await.len();
        info!(feature = F::KEY, removed, "requests cleared");
        removed
    }

    pub async fn list_text(&self) -> String {
        render::listing(F::TITLE, &self.store.list().await, &self.render)
    }

    /// Start a new reporting period.
    pub async fn rollover(&self) -> usize {
        let dropped = self.store.clear_epoch().await;
        info!(feature = F::KEY, dropped, "rollover: store and report reset");
        dropped
    }

    fn submit_form(&self, choice: Option<&str>, fields: Vec<FormField>) -> FormRequest {
        FormRequest {
            custom_id: Route::Submit {
                choice: choice.map(str::to_string),
            }
            .custom_id(F::KEY),
            title: F::TITLE.to_string(),
            fields,
        }
    }

    fn submitted_reply() -> Reply {
        Reply::Ephemeral(F::acknowledgement())
    }
}

#[async_trait]
impl<F: Feature> FeatureHandler for Coordinator<F> {
    fn key(&self) -> &'static str {
        F::KEY
    }

    fn title(&self) -> &'static str {
        F::TITLE
    }

    fn menu_button(&self) -> Action {
        Action::new(
            F::BUTTON_LABEL,
            F::BUTTON_STYLE,
            Route::Open { choice: None }.custom_id(F::KEY),
        )
    }

    async fn open(&self, actor: &Actor, choice: Option<&str>) -> Result<Reply, CoreError> {
        if choice.is_none() && !F::choices().is_empty() {
            return Ok(Reply::Menu {
                custom_id: Route::Open { choice: None }.custom_id(F::KEY),
                placeholder: F::MENU_PLACEHOLDER.to_string(),
                options: F::choices().iter().map(|c| c.to_string()).collect(),
            });
        }
        if choice.is_some() {
            chosen::<F>(choice)?;
        }
        match F::form(choice) {
            Some(fields) => Ok(Reply::Form(self.submit_form(choice, fields))),
            None => {
                let submission = FormSubmission::new(self.submit_form(choice, Vec::new()).custom_id);
                self.submit(actor, choice, &submission).await?;
                Ok(Self::submitted_reply())
            }
        }
    }

    async fn submit(
        &self,
        actor: &Actor,
        choice: Option<&str>,
        submission: &FormSubmission,
    ) -> Result<Reply, CoreError> {
        Coordinator::submit(self, actor, choice, submission).await?;
        Ok(Self::submitted_reply())
    }

    async fn approve(
        &self,
        id: RequestId,
        reviewer: &Actor,
        origin: Option<MessageRef>,
    ) -> Result<Reply, CoreError> {
        Coordinator::approve(self, id, reviewer, origin).await?;
        Ok(Reply::Ephemeral(format!(
            "{} request approved and user notified.",
            F::TITLE
        )))
    }

    async fn deny_form(&self, id: RequestId) -> Result<Reply, CoreError> {
        Ok(Reply::Form(Coordinator::deny_form(self, id).await?))
    }

    async fn deny(
        &self,
        id: RequestId,
        reviewer: &Actor,
        submission: &FormSubmission,
        origin: Option<MessageRef>,
    ) -> Result<Reply, CoreError> {
        let reason = submission.value(DENY_REASON_FIELD).unwrap_or_default();
        Coordinator::deny(self, id, reviewer, reason, origin).await?;
        Ok(Reply::Ephemeral(format!(
            "{} request denied and user notified.",
            F::TITLE
        )))
    }

    async fn list(&self) -> Reply {
        Reply::Ephemeral(self.list_text().await)
    }

    async fn clear(&self, nickname: Option<&str>) -> Result<Reply, CoreError> {
        let Some(nickname) = nickname else {
            let removed = self.clear_all().await;
            return Ok(Reply::Ephemeral(format!(
                "Cleared {removed} {} request(s).",
                F::TITLE
            )));
        };
        let text = if self.clear_by_nickname(nickname).await? {
            format!("Cleared request for {}.", nickname.trim())
        } else {
            format!("No request found for {}.", nickname.trim())
        };
        Ok(Reply::Ephemeral(text))
    }

    async fn rollover(&self) -> usize {
        Coordinator::rollover(self).await
    }

    async fn publish(&self) -> Result<PublishOutcome, CoreError> {
        self.reporter.publish(&self.store).await
    }
}
