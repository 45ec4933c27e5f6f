//! Domain identifiers (strongly-typed IDs).
//!
//! # 2 種類の ID
//! - **Snowflake<T>**: Discord 側が払い出す 64-bit ID（ユーザー・チャンネル・メッセージ）
//! - **RequestId**: このプロセスが払い出す申請 ID
//!
//! ## Phantom Type パターン
//! `Snowflake<T>` は `T` をマーカーとしてだけ使い（PhantomData）、
//! UserId と ChannelId を取り違えるとコンパイルエラーになります。
//!
//! ## RequestId の 2 方式
//! - `Minted`: ULID ベース。1 ユーザーが複数の申請を同時に持てる（デフォルト）
//! - `Requester`: 申請者の UserId をそのままキーにする。1 ユーザー 1 件まで
//!
//! custom_id に埋め込むため、`r<ulid>` / `u<snowflake>` のトークンとして
//! Display / FromStr で相互変換できます。

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use ulid::Ulid;

use super::errors::CoreError;

/// IdMarker は各 Snowflake 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// パースエラーなどで使う種別名（例: "user"）
    fn kind() -> &'static str;
}

/// Discord の snowflake ID
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Snowflake<T: IdMarker> {
    value: u64,
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Snowflake<T> {
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            _marker: PhantomData,
        }
    }

    pub fn get(&self) -> u64 {
        self.value
    }
}

impl<T: IdMarker> From<u64> for Snowflake<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> fmt::Display for Snowflake<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<T: IdMarker> FromStr for Snowflake<T> {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>()
            .map(Self::new)
            .map_err(|_| CoreError::MalformedCustomId(format!("invalid {} id: {s}", T::kind())))
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// User のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum User {}

impl IdMarker for User {
    fn kind() -> &'static str {
        "user"
    }
}

/// Channel のマーカー型（フォーラムスレッドも含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Channel {}

impl IdMarker for Channel {
    fn kind() -> &'static str {
        "channel"
    }
}

/// Message のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Message {}

impl IdMarker for Message {
    fn kind() -> &'static str {
        "message"
    }
}

/// Identifier of a Discord user (requester, reviewer).
pub type UserId = Snowflake<User>;

/// Identifier of a channel or forum thread.
pub type ChannelId = Snowflake<Channel>;

/// Identifier of a message within a channel.
pub type MessageId = Snowflake<Message>;

/// Identifier of one submitted request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RequestId {
    /// Minted per submission (time-ordered ULID).
    Minted(Ulid),
    /// Keyed by the requester; one in-flight request per user.
    Requester(UserId),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestId::Minted(ulid) => write!(f, "r{ulid}"),
            RequestId::Requester(user) => write!(f, "u{user}"),
        }
    }
}

impl FromStr for RequestId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || CoreError::MalformedCustomId(format!("invalid request token: {s}"));
        if let Some(rest) = s.strip_prefix('r') {
            return Ulid::from_string(rest)
                .map(RequestId::Minted)
                .map_err(|_| malformed());
        }
        if let Some(rest) = s.strip_prefix('u') {
            return rest.parse::<UserId>().map(RequestId::Requester).map_err(|_| malformed());
        }
        Err(malformed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_tokens_parse_back() {
        let minted = RequestId::Minted(Ulid::new());
        let keyed = RequestId::Requester(UserId::new(645668825668517888));

        assert_eq!(minted.to_string().parse::<RequestId>().unwrap(), minted);
        assert_eq!(keyed.to_string().parse::<RequestId>().unwrap(), keyed);
        assert!(keyed.to_string().starts_with('u'));
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!("".parse::<RequestId>().is_err());
        assert!("x123".parse::<RequestId>().is_err());
        assert!("unot-a-number".parse::<RequestId>().is_err());
        assert!("rnot-a-ulid".parse::<RequestId>().is_err());
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<UserId>(), size_of::<u64>());
        assert_eq!(size_of::<ChannelId>(), size_of::<u64>());
    }
}
