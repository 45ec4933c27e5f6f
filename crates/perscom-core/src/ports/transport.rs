//! Transport port - Discord REST への出口
//!
//! コアが外部に求めるのは「送る・編集する・取得する・消す・DM する」だけです。
//! ゲートウェイ接続や UI の組み立ては実装側（アダプタ）の責務です。
//!
//! # 設計原則
//! - すべて async（呼び出し中に RequestStore のロックを持たない）
//! - 失敗は TransportError で返し、リトライ判断は呼び出し側
//! - タイムアウトは実装側のデフォルトに任せる

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ChannelId, MessageId, MessageRef, OutgoingMessage, UserId};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("channel {0} is unavailable")]
    ChannelUnavailable(ChannelId),

    #[error("message {0} not found")]
    MessageNotFound(MessageId),

    #[error("user {0} does not accept direct messages")]
    DirectMessageRefused(UserId),

    #[error("transport failure: {0}")]
    Other(String),
}

/// Transport は Discord REST API の抽象化
#[async_trait]
pub trait Transport: Send + Sync {
    /// メッセージを投稿（ボタン付きも可）
    async fn post_message(
        &self,
        channel: ChannelId,
        message: OutgoingMessage,
    ) -> Result<MessageRef, TransportError>;

    /// 本文を置き換える
    async fn edit_message(&self, message: MessageRef, text: &str) -> Result<(), TransportError>;

    /// 現在の本文を取得
    async fn fetch_message(&self, message: MessageRef) -> Result<String, TransportError>;

    /// メッセージを削除
    async fn delete_message(&self, message: MessageRef) -> Result<(), TransportError>;

    /// DM チャンネルを開く
    async fn open_direct_channel(&self, user: UserId) -> Result<ChannelId, TransportError>;

    /// DM を送る
    async fn send_direct(&self, channel: ChannelId, text: &str) -> Result<(), TransportError>;
}
