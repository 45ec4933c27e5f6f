//! Feature - 申請の種類ごとの定義
//!
//! # 学習ポイント
//! - 関連型と関連定数で機能ごとの差分を表現する（`Feature`）
//! - Object-safe な `FeatureHandler` で型消去し、レジストリで管理する
//! - custom id は `Route` でパース／生成する

pub mod handler;
pub mod registry;
pub mod route;

use chrono::{DateTime, Utc};

pub use self::handler::FeatureHandler;
pub use self::registry::{FeatureRegistry, RegistryError};
pub use self::route::{Command, CommandKind, Route};

use crate::domain::{ButtonStyle, CoreError, FormField, FormSubmission, Payload};
use crate::store::Disposal;

/// How request ids are allocated for a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScheme {
    /// A fresh ULID per submission.
    PerRequest,
    /// The requester's user id: one in-flight request per user.
    PerRequester,
}

/// Static description of one request type.
///
/// # 使用例
/// ```ignore
/// pub struct LeaveOfAbsence;
///
/// impl Feature for LeaveOfAbsence {
///     type Payload = LeavePayload;
///     const KEY: &'static str = "loa";
///     const TITLE: &'static str = "Leave of Absence";
///     const BUTTON_LABEL: &'static str = "Leave of absence";
///     ...
/// }
/// ```
pub trait Feature: Send + Sync + 'static {
    type Payload: Payload;

    /// Prefix of every custom id and command of this feature.
    const KEY: &'static str;
    const TITLE: &'static str;
    const BUTTON_LABEL: &'static str;
    const BUTTON_STYLE: ButtonStyle = ButtonStyle::Primary;
    const ID_SCHEME: IdScheme = IdScheme::PerRequest;
    const DISPOSAL: Disposal = Disposal::Retain;
    const MENU_PLACEHOLDER: &'static str = "Select an option";

    /// Options offered in a select menu before the form. Empty: no menu.
    fn choices() -> &'static [&'static str] {
        &[]
    }

    /// Form for the (optional) chosen option. `None` submits right away.
    fn form(choice: Option<&str>) -> Option<Vec<FormField>>;

    /// Ephemeral reply once a request has been recorded.
    fn acknowledgement() -> String {
        format!(
            "✅ Your {} request has been submitted. You will receive updates via DM.",
            Self::TITLE
        )
    }

    /// Validate the submitted values and build the payload.
    fn parse(
        choice: Option<&str>,
        submission: &FormSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self::Payload, CoreError>;
}

/// Read a required field or fail with a user-facing message.
pub fn required<'a>(submission: &'a FormSubmission, field: &str, label: &str) -> Result<&'a str, CoreError> {
    submission
        .value(field)
        .ok_or_else(|| CoreError::ValidationFailed(format!("Please fill in {label}.")))
}

/// The chosen option, which must be one of `F::choices()`.
pub fn chosen<F: Feature>(choice: Option<&str>) -> Result<&'static str, CoreError> {
    choice
        .and_then(|c| F::choices().iter().copied().find(|known| *known == c))
        .ok_or_else(|| CoreError::ValidationFailed("Please pick one of the listed options.".to_string()))
}
