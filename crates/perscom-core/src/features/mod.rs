//! Features - 実際の申請の種類
//!
//! それぞれ `Feature` を実装する。Payload とフォームの検証だけを持ち、
//! 状態遷移・ログ・DM は `app::Coordinator` が共通で扱う。

pub mod award;
pub mod bling_bucks;
pub mod catalog;
pub mod discharge;
pub mod leave;
pub mod squad_xml;
pub mod temporary_pass;
pub mod training;
pub mod transfer;

pub use self::award::{AwardRecommendation, AwardPayload};
pub use self::bling_bucks::{BlingBucks, BlingBucksPayload};
pub use self::discharge::{Discharge, DischargePayload};
pub use self::leave::{LeaveOfAbsence, LeavePayload};
pub use self::squad_xml::{SquadXml, SquadXmlPayload};
pub use self::temporary_pass::{TemporaryPass, TemporaryPassPayload};
pub use self::training::{SchoolAndCourse, TrainingPayload};
pub use self::transfer::{Transfer, TransferPayload};
