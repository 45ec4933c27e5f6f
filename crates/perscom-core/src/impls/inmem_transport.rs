//! InMemoryTransport - 開発用の Transport
//!
//! # 学習ポイント
//! - tokio::sync::Mutex で状態をまとめて保護
//! - 失敗注入（fail_next）でエラー経路をテストする
//! - 呼び出し回数の記録で「余計な書き込みが無いこと」を検証する

use std::collections::{BTreeMap, HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{Action, ChannelId, MessageId, MessageRef, OutgoingMessage, UserId};
use crate::ports::{Transport, TransportError};

const FIRST_SNOWFLAKE: u64 = 1_000;

/// Transport operation, for call counting and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Post,
    Edit,
    Fetch,
    Delete,
    OpenDirect,
    SendDirect,
}

/// A message currently present in some channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub reference: MessageRef,
    pub text: String,
    pub actions: Vec<Action>,
}

#[derive(Default)]
struct State {
    next_snowflake: u64,
    messages: BTreeMap<MessageId, PostedMessage>,
    direct_channels: HashMap<ChannelId, UserId>,
    direct_log: Vec<(UserId, String)>,
    refused: HashSet<UserId>,
    pending_failures: HashMap<Op, usize>,
    calls: HashMap<Op, usize>,
}

impl State {
    fn snowflake(&mut self) -> u64 {
        if self.next_snowflake == 0 {
            self.next_snowflake = FIRST_SNOWFLAKE;
        }
        self.next_snowflake += 1;
        self.next_snowflake
    }

    /// Count the call and consume an injected failure, if any.
    fn enter(&mut self, op: Op) -> Result<(), TransportError> {
        *self.calls.entry(op).or_default() += 1;
        if let Some(remaining) = self.pending_failures.get_mut(&op)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(TransportError::Other(format!("injected {op:?} failure")));
        }
        Ok(())
    }

    fn existing(&mut self, message: MessageRef) -> Result<&mut PostedMessage, TransportError> {
        self.messages
            .get_mut(&message.message)
            .filter(|posted| posted.reference.channel == message.channel)
            .ok_or(TransportError::MessageNotFound(message.message))
    }
}

/// InMemoryTransport は Discord REST の代わりに全てを記録する
///
/// # 使用例
/// ```ignore
/// let transport = Arc::new(InMemoryTransport::new());
/// transport.fail_next(Op::Edit).await;
/// ```
#[derive(Default)]
pub struct InMemoryTransport {
    state: Mutex<State>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call of `op` fail with `TransportError::Other`.
    pub async fn fail_next(&self, op: Op) {
        *self.state.lock().await.pending_failures.entry(op).or_default() += 1;
    }

    /// The user has DMs closed.
    pub async fn refuse_direct(&self, user: UserId) {
        self.state.lock().await.refused.insert(user);
    }

    pub async fn call_count(&self, op: Op) -> usize {
        self.state.lock().await.calls.get(&op).copied().unwrap_or(0)
    }

    /// Posts plus edits: every call that changes visible message text.
    pub async fn write_count(&self) -> usize {
        let state = self.state.lock().await;
        [Op::Post, Op::Edit]
            .iter()
            .map(|op| state.calls.get(op).copied().unwrap_or(0))
            .sum()
    }

    /// Live messages of a channel, oldest first.
    pub async fn messages_in(&self, channel: ChannelId) -> Vec<PostedMessage> {
        self.state
            .lock()
            .await
            .messages
            .values()
            .filter(|posted| posted.reference.channel == channel)
            .cloned()
            .collect()
    }

    pub async fn content_of(&self, message: MessageRef) -> Option<String> {
        self.state
            .lock()
            .await
            .existing(message)
            .ok()
            .map(|posted| posted.text.clone())
    }

    pub async fn exists(&self, message: MessageRef) -> bool {
        self.content_of(message).await.is_some()
    }

    /// Direct messages delivered to `user`, oldest first.
    pub async fn direct_messages_to(&self, user: UserId) -> Vec<String> {
        self.state
            .lock()
            .await
            .direct_log
            .iter()
            .filter(|(to, _)| *to == user)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn post_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> Result<MessageRef, TransportError> {
        let mut state = self.state.lock().await;
        state.enter(Op::Post)?;
        let reference = MessageRef::new(channel, MessageId::new(state.snowflake()));
        debug!(channel = %channel, message = %reference.message, "post");
        state.messages.insert(
            reference.message,
            PostedMessage {
                reference,
                text: message.text,
                actions: message.actions,
            },
        );
        Ok(reference)
    }

    async fn edit_message(&self, message: MessageRef, text: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.enter(Op::Edit)?;
        state.existing(message)?.text = text.to_string();
        Ok(())
    }

    async fn fetch_message(&self, message: MessageRef) -> Result<String, TransportError> {
        let mut state = self.state.lock().await;
        state.enter(Op::Fetch)?;
        Ok(state.existing(message)?.text.clone())
    }

    async fn delete_message(&self, message: MessageRef) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.enter(Op::Delete)?;
        state.existing(message)?;
        state.messages.remove(&message.message);
        Ok(())
    }

    async fn open_direct_channel(&self, user: UserId) -> Result<ChannelId, TransportError> {
        let mut state = self.state.lock().await;
        state.enter(Op::OpenDirect)?;
        if state.refused.contains(&user) {
            return Err(TransportError::DirectMessageRefused(user));
        }
        if let Some((channel, _)) = state.direct_channels.iter().find(|(_, to)| **to == user) {
            return Ok(*channel);
        }
        let channel = ChannelId::new(state.snowflake());
        state.direct_channels.insert(channel, user);
        Ok(channel)
    }

    async fn send_direct(&self, channel: ChannelId, text: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock().await;
        state.enter(Op::SendDirect)?;
        let user = *state
            .direct_channels
            .get(&channel)
            .ok_or(TransportError::ChannelUnavailable(channel))?;
        state.direct_log.push((user, text.to_string()));
        Ok(())
    }
}
