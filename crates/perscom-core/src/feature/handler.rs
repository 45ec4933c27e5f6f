//! FeatureHandler - 型消去された機能ハンドラ
//!
//! `Coordinator<F>` がこの trait を実装し、`FeatureRegistry` が
//! `Arc<dyn FeatureHandler>` として保持する。
//!
//! # Object Safety
//! - ジェネリックなメソッドを持たない
//! - Payload 型は外に出さず、返すのは `Reply` と件数だけ

use async_trait::async_trait;

use crate::domain::{Action, Actor, CoreError, FormSubmission, MessageRef, Reply, RequestId};
use crate::report::PublishOutcome;

#[async_trait]
pub trait FeatureHandler: Send + Sync {
    fn key(&self) -> &'static str;

    fn title(&self) -> &'static str;

    /// Button shown in the request menu.
    fn menu_button(&self) -> Action;

    /// Menu button clicked, or an option picked from the select menu.
    async fn open(&self, actor: &Actor, choice: Option<&str>) -> Result<Reply, CoreError>;

    /// Submission form came back.
    async fn submit(
        &self,
        actor: &Actor,
        choice: Option<&str>,
        submission: &FormSubmission,
    ) -> Result<Reply, CoreError>;

    async fn approve(
        &self,
        id: RequestId,
        reviewer: &Actor,
        origin: Option<MessageRef>,
    ) -> Result<Reply, CoreError>;

    /// Deny clicked: ask for a reason.
    async fn deny_form(&self, id: RequestId) -> Result<Reply, CoreError>;

    /// Deny-reason form came back.
    async fn deny(
        &self,
        id: RequestId,
        reviewer: &Actor,
        submission: &FormSubmission,
        origin: Option<MessageRef>,
    ) -> Result<Reply, CoreError>;

    /// `<feature>-list`
    async fn list(&self) -> Reply;

    /// `<feature>-clear [nickname]`
    async fn clear(&self, nickname: Option<&str>) -> Result<Reply, CoreError>;

    /// Wipe every record and start a fresh report. Returns records dropped.
    async fn rollover(&self) -> usize;

    async fn publish(&self) -> Result<PublishOutcome, CoreError>;
}
