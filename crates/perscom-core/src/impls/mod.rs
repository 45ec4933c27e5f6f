//! Impls - ports の実装（開発用・テスト用）
//!
//! # 含まれる実装
//! - **InMemoryTransport**: 記録付きの Transport。CLI デモとテストで使う
//!
//! 本番用の Discord アダプタ（ゲートウェイ接続込み）はこのクレートの外に置く。

pub mod inmem_transport;

pub use self::inmem_transport::{InMemoryTransport, Op, PostedMessage};
