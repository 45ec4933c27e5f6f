//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 外部システム（Discord REST, 時刻, ID 採番）へのインターフェースを提供し、
//! 実装の詳細を隠蔽します。

pub mod clock;
pub mod id_generator;
pub mod transport;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::transport::{Transport, TransportError};
