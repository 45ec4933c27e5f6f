//! FeatureRegistry - 機能ハンドラの登録と管理
//!
//! # 学習ポイント
//! - HashMap での型消去された trait object の管理
//! - 登録順を保持してメニューの並びを安定させる

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::FeatureHandler;

/// FeatureRegistry は feature key → handler の対応を管理
///
/// # 使用例
/// ```ignore
/// let mut registry = FeatureRegistry::new();
/// registry.register(Arc::new(coordinator))?;
/// let handler = registry.get("loa");
/// ```
#[derive(Default)]
pub struct FeatureRegistry {
    handlers: HashMap<&'static str, Arc<dyn FeatureHandler>>,
    order: Vec<&'static str>,
}

/// RegistryError は FeatureRegistry の操作エラー
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Handler for feature '{0}' is already registered")]
    AlreadyRegistered(String),
}

impl FeatureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn FeatureHandler>) -> Result<(), RegistryError> {
        let key = handler.key();
        if self.handlers.contains_key(key) {
            return Err(RegistryError::AlreadyRegistered(key.to_string()));
        }
        self.handlers.insert(key, handler);
        self.order.push(key);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn FeatureHandler>> {
        self.handlers.get(key).cloned()
    }

    /// Keys in registration order.
    pub fn registered_keys(&self) -> Vec<&'static str> {
        self.order.clone()
    }

    /// Handlers in registration order.
    pub fn handlers(&self) -> impl Iterator<Item = &Arc<dyn FeatureHandler>> {
        self.order.iter().filter_map(|key| self.handlers.get(key))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
