//! App - アプリケーション層
//!
//! このモジュールは、ports と store / report を組み合わせて申請フローを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: 設定からのワイヤリングと起動時検証
//! - **Coordinator**: 1 機能分の submit / approve / deny / list / clear
//! - **Router**: custom id・コマンドの振り分け
//! - **Notifier**: ベストエフォートの DM
//! - **RolloverScheduler**: 週次の期間切り替え

pub mod builder;
pub mod coordinator;
pub mod notifier;
pub mod rollover_loop;
pub mod router;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::coordinator::{Channels, Coordinator, Wiring};
pub use self::notifier::{Delivery, Notifier};
pub use self::rollover_loop::{RolloverHandle, RolloverScheduler};
pub use self::router::Router;
