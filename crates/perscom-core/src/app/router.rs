//! Router - インタラクションを機能ハンドラへ振り分ける
//!
//! custom id / コマンド名から feature key を取り出し、レジストリから
//! ハンドラを引いて呼ぶ。エラーは全てここでエフェメラルな返信に変わる。

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{CoreError, Interaction, Reply};
use crate::feature::{Command, CommandKind, FeatureHandler, FeatureRegistry, Route};

pub const NICKNAME_OPTION: &str = "nickname";

#[derive(Clone)]
pub struct Router {
    registry: Arc<FeatureRegistry>,
}

impl Router {
    pub fn new(registry: Arc<FeatureRegistry>) -> Self {
        Self { registry }
    }

    /// Handle one interaction. Never fails: errors become user-facing replies.
    pub async fn handle(&self, interaction: &Interaction) -> Reply {
        match self.dispatch(interaction).await {
            Ok(reply) => reply,
            Err(err) => {
                match &err {
                    CoreError::NotFound(_)
                    | CoreError::ValidationFailed(_)
                    | CoreError::DuplicateKey(_) => debug!(error = %err, "interaction rejected"),
                    _ => warn!(error = %err, "interaction failed"),
                }
                Reply::Ephemeral(err.user_message())
            }
        }
    }

    async fn dispatch(&self, interaction: &Interaction) -> Result<Reply, CoreError> {
        match interaction {
            Interaction::Component {
                custom_id,
                actor,
                message,
                selected,
            } => {
                let (key, route) = Route::parse(custom_id)?;
                let handler = self.handler(key)?;
                match route {
                    Route::Open { choice } => {
                        let choice = choice
                            .as_deref()
                            .or_else(|| selected.first().map(String::as_str));
                        handler.open(actor, choice).await
                    }
                    Route::Approve(id) => handler.approve(id, actor, *message).await,
                    Route::Deny(id) => handler.deny_form(id).await,
                    Route::Submit { .. } | Route::DenyReason(_) => {
                        Err(CoreError::MalformedCustomId(custom_id.clone()))
                    }
                }
            }
            Interaction::FormSubmit {
                submission,
                actor,
                message,
            } => {
                let (key, route) = Route::parse(&submission.custom_id)?;
                let handler = self.handler(key)?;
                match route {
                    Route::Submit { choice } => handler.submit(actor, choice.as_deref(), submission).await,
                    Route::DenyReason(id) => handler.deny(id, actor, submission, *message).await,
                    Route::Open { .. } | Route::Approve(_) | Route::Deny(_) => {
                        Err(CoreError::MalformedCustomId(submission.custom_id.clone()))
                    }
                }
            }
            Interaction::Command { name, options, .. } => {
                let command = Command::parse(name)?;
                let handler = self.handler(command.key)?;
                match command.kind {
                    CommandKind::List => Ok(handler.list().await),
                    CommandKind::Clear => {
                        handler
                            .clear(options.get(NICKNAME_OPTION).map(String::as_str))
                            .await
                    }
                }
            }
        }
    }

    fn handler(&self, key: &str) -> Result<Arc<dyn FeatureHandler>, CoreError> {
        self.registry
            .get(key)
            .ok_or_else(|| CoreError::UnknownFeature(key.to_string()))
    }
}
