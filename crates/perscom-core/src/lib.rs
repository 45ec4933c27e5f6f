//! perscom-core
//!
//! Discord の人事申請ボット（休暇・転属・除隊・表彰推薦・Bling Bucks・教育課程・
//! 臨時外出）のコア。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, request, message, errors）
//! - **ports**: 抽象化レイヤー（Transport, Clock, IdGenerator）
//! - **store**: 申請レコードの保持（単一ロック）
//! - **workflow**: 承認ステートマシン
//! - **report**: 重複なしのフォーラムログ
//! - **feature**: 機能定義の trait と型消去レジストリ
//! - **features**: 各申請の種類
//! - **app**: Coordinator, Router, AppBuilder, RolloverScheduler
//! - **config**: JSON 設定
//! - **impls**: 実装（InMemoryTransport など開発用）

pub mod app;
pub mod config;
pub mod domain;
pub mod feature;
pub mod features;
pub mod impls;
pub mod ports;
pub mod report;
pub mod store;
pub mod workflow;
