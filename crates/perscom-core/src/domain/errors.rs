//! Errors - エラー型と分類
//!
//! # 分類
//! - NotFound: 申請が無い（処理済み・削除済み・存在しない）。致命的ではない
//! - ValidationFailed: 入力が不正。状態は変更しない
//! - ExternalDeliveryFailed: Transport 側の失敗。状態遷移は巻き戻さない
//! - DuplicateKey: 同じ ID の二重登録（プログラムの不変条件違反）

use thiserror::Error;

use super::ids::RequestId;
use crate::ports::TransportError;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("request {0} not found or already processed")]
    NotFound(RequestId),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("external delivery failed: {0}")]
    ExternalDeliveryFailed(#[from] TransportError),

    #[error("request {0} is already present")]
    DuplicateKey(RequestId),

    #[error("no feature registered for '{0}'")]
    UnknownFeature(String),

    #[error("malformed custom id: {0}")]
    MalformedCustomId(String),
}

impl CoreError {
    /// Text shown (ephemerally) to the user whose interaction failed.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::NotFound(_) => "Request not found or already processed.".to_string(),
            CoreError::ValidationFailed(reason) => reason.clone(),
            CoreError::ExternalDeliveryFailed(_) => {
                "Something went wrong while talking to Discord. Please try again.".to_string()
            }
            CoreError::DuplicateKey(_) => "You already have a pending request.".to_string(),
            CoreError::UnknownFeature(_) | CoreError::MalformedCustomId(_) => {
                "This interaction is no longer supported.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    #[test]
    fn not_found_is_neutral_for_users() {
        let err = CoreError::NotFound(RequestId::Requester(UserId::new(7)));
        assert_eq!(err.user_message(), "Request not found or already processed.");
        assert!(err.to_string().contains("u7"));
    }

    #[test]
    fn validation_reason_is_passed_through() {
        let err = CoreError::ValidationFailed("Please provide at least 3 characters.".into());
        assert_eq!(err.user_message(), "Please provide at least 3 characters.");
    }
}
