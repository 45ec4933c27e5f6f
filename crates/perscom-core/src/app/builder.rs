//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 設定ファイルから機能ごとのチャンネルを引いて Coordinator を組み立てる

use std::sync::Arc;

use tracing::{info, warn};

use super::coordinator::{Channels, Coordinator, Wiring};
use super::rollover_loop::{RolloverHandle, RolloverScheduler};
use super::router::Router;
use crate::config::BotConfig;
use crate::domain::{ChannelId, CoreError, Interaction, MessageRef, OutgoingMessage, Reply};
use crate::feature::{Feature, FeatureRegistry, RegistryError};
use crate::features::{
    AwardRecommendation, BlingBucks, Discharge, LeaveOfAbsence, SchoolAndCourse, SquadXml,
    TemporaryPass, Transfer, catalog,
};
use crate::ports::{Clock, IdGenerator, SystemClock, Transport, UlidGenerator};
use crate::report::RenderContext;

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new(config, transport)
///     .register::<LeaveOfAbsence>()?
///     .expect_features(&["loa"])
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - register() 時に設定ファイルにチャンネルが無ければ BuildError
/// - build() 時に「期待集合 ⊆ 登録済み集合」をチェック
pub struct AppBuilder {
    config: BotConfig,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    registry: FeatureRegistry,
    expected_features: Option<Vec<String>>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("No enabled settings for feature '{0}' in the config.")]
    MissingFeatureSettings(String),

    #[error("Missing features: {0:?}. These features were expected but not registered.")]
    MissingFeatures(Vec<String>),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl AppBuilder {
    pub fn new(config: BotConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            clock: Arc::new(SystemClock),
            ids: Arc::new(UlidGenerator::new(SystemClock)),
            registry: FeatureRegistry::new(),
            expected_features: None,
        }
    }

    /// Replace the clock. Also resets the id generator to one on this clock,
    /// so call `ids()` afterwards to override it.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.ids = Arc::new(UlidGenerator::new(Arc::clone(&clock)));
        self.clock = clock;
        self
    }

    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    fn wiring(&self) -> Wiring {
        Wiring {
            transport: Arc::clone(&self.transport),
            clock: Arc::clone(&self.clock),
            ids: Arc::clone(&self.ids),
            render: RenderContext::new(self.config.display_offset_minutes, self.config.display_zone.clone()),
            message_limit: self.config.message_limit,
        }
    }

    /// Build a coordinator for `F` from its config entry and register it.
    pub fn register<F: Feature>(mut self) -> Result<Self, BuildError> {
        let settings = self
            .config
            .feature(F::KEY)
            .ok_or_else(|| BuildError::MissingFeatureSettings(F::KEY.to_string()))?;
        let channels = Channels {
            approval: ChannelId::new(settings.approval_channel),
            report: ChannelId::new(settings.report_channel),
        };
        let coordinator = Coordinator::<F>::new(&self.wiring(), channels);
        self.registry.register(Arc::new(coordinator))?;
        Ok(self)
    }

    /// Register `F` only when the config enables it.
    pub fn register_if_configured<F: Feature>(self) -> Result<Self, BuildError> {
        if self.config.feature(F::KEY).is_none() {
            info!(feature = F::KEY, "feature not configured; skipping");
            return Ok(self);
        }
        self.register::<F>()
    }

    /// Every request type this crate ships, in menu order.
    pub fn register_builtin_features(self) -> Result<Self, BuildError> {
        self.register_if_configured::<LeaveOfAbsence>()?
            .register_if_configured::<TemporaryPass>()?
            .register_if_configured::<SquadXml>()?
            .register_if_configured::<SchoolAndCourse>()?
            .register_if_configured::<Transfer>()?
            .register_if_configured::<AwardRecommendation>()?
            .register_if_configured::<BlingBucks>()?
            .register_if_configured::<Discharge>()
    }

    pub fn expect_features(mut self, keys: &[&str]) -> Self {
        self.expected_features = Some(keys.iter().map(|k| k.to_string()).collect());
        self
    }

    pub fn build(self) -> Result<App, BuildError> {
        if let Some(expected) = &self.expected_features {
            let registered = self.registry.registered_keys();
            let missing: Vec<String> = expected
                .iter()
                .filter(|key| !registered.contains(&key.as_str()))
                .cloned()
                .collect();
            if !missing.is_empty() {
                return Err(BuildError::MissingFeatures(missing));
            }
        }
        let registry = Arc::new(self.registry);
        Ok(App {
            router: Router::new(Arc::clone(&registry)),
            registry,
            config: self.config,
            transport: self.transport,
            clock: self.clock,
        })
    }
}

/// App はボットのコア
///
/// - `handle()`: インタラクション 1 件を処理
/// - `post_menu()`: 申請メニューを投稿
/// - `spawn_rollover()`: 週次ロールオーバーを開始
pub struct App {
    registry: Arc<FeatureRegistry>,
    router: Router,
    config: BotConfig,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
}

impl App {
    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    pub async fn handle(&self, interaction: &Interaction) -> Reply {
        self.router.handle(interaction).await
    }

    /// Post the request menu, one message per button row.
    pub async fn post_menu(&self) -> Result<Vec<MessageRef>, CoreError> {
        let Some(channel) = self.config.menu_channel.map(ChannelId::new) else {
            return Ok(Vec::new());
        };
        let buttons = self.registry.handlers().map(|h| h.menu_button());
        let mut posted = Vec::new();
        for row in catalog::button_rows(buttons) {
            let message = OutgoingMessage::default().with_actions(row);
            posted.push(self.transport.post_message(channel, message).await?);
        }
        info!(channel = %channel, messages = posted.len(), "request menu posted");
        Ok(posted)
    }

    /// Start the weekly rollover for the configured feature, if any.
    #[must_use = "dropping the handle detaches the rollover loop"]
    pub fn spawn_rollover(&self) -> Option<RolloverHandle> {
        let key = self.config.rollover.feature.as_deref()?;
        let Some(target) = self.registry.get(key) else {
            warn!(feature = key, "rollover feature is not registered; rollover disabled");
            return None;
        };
        let scheduler = RolloverScheduler::from_settings(&self.config.rollover);
        info!(feature = key, weekday = %scheduler.weekday, at = %scheduler.at, "rollover scheduled");
        Some(scheduler.spawn(target, Arc::clone(&self.clock)))
    }

    /// Flush every feature's report (e.g. before shutdown).
    pub async fn publish_all(&self) {
        for handler in self.registry.handlers() {
            if let Err(err) = handler.publish().await {
                warn!(feature = handler.key(), error = %err, "report publish failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Actor, ButtonStyle, FormSubmission, UserId};
    use crate::impls::InMemoryTransport;
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};

    fn config() -> BotConfig {
        BotConfig::from_json(
            r#"{
                "menu_channel": 10,
                "features": {
                    "loa": { "approval_channel": 1, "report_channel": 2 },
                    "tpr": { "approval_channel": 1, "report_channel": 3 },
                    "squad-xml": { "approval_channel": 1, "report_channel": 7 },
                    "bb": { "approval_channel": 1, "report_channel": 4 },
                    "discharge": { "approval_channel": 1, "report_channel": 5 },
                    "awd": { "approval_channel": 1, "report_channel": 6, "enabled": false }
                }
            }"#,
        )
        .unwrap()
    }

    fn builder() -> (AppBuilder, Arc<InMemoryTransport>) {
        let transport = Arc::new(InMemoryTransport::new());
        (AppBuilder::new(config(), transport.clone()), transport)
    }

    #[test]
    fn test_build_success() {
        let (builder, _) = builder();
        let app = builder
            .register::<LeaveOfAbsence>()
            .unwrap()
            .expect_features(&[LeaveOfAbsence::KEY])
            .build();
        assert!(app.is_ok());
    }

    #[test]
    fn test_build_missing_features() {
        let (builder, _) = builder();
        let app = builder
            .register::<LeaveOfAbsence>()
            .unwrap()
            .expect_features(&[LeaveOfAbsence::KEY, BlingBucks::KEY])
            .build();
        assert!(matches!(
            app,
            Err(BuildError::MissingFeatures(missing)) if missing == vec![BlingBucks::KEY.to_string()]
        ));
    }

    #[test]
    fn test_register_without_settings_fails() {
        let (builder, _) = builder();
        let result = builder.register::<Transfer>();
        assert!(matches!(result, Err(BuildError::MissingFeatureSettings(key)) if key == "trans"));
    }

    #[test]
    fn test_double_registration() {
        let (builder, _) = builder();
        let result = builder
            .register::<LeaveOfAbsence>()
            .unwrap()
            .register::<LeaveOfAbsence>();
        assert!(matches!(
            result,
            Err(BuildError::Registry(RegistryError::AlreadyRegistered(_)))
        ));
    }

    #[test]
    fn test_builtin_features_follow_the_config() {
        let (builder, _) = builder();
        let app = builder.register_builtin_features().unwrap().build().unwrap();
        assert_eq!(app.registry().registered_keys(), ["loa", "tpr", "squad-xml", "bb", "discharge"]);
    }

    #[tokio::test]
    async fn menu_groups_buttons_by_style() {
        let (builder, transport) = builder();
        let app = builder.register_builtin_features().unwrap().build().unwrap();

        let posted = app.post_menu().await.unwrap();

        assert_eq!(posted.len(), 2);
        let rows = transport.messages_in(ChannelId::new(10)).await;
        let labels: Vec<&str> = rows[0].actions.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(
            labels,
            ["Leave of absence", "Temporary Pass Request", "Request a Squad XML", "Bling Bucks"]
        );
        assert_eq!(rows[1].actions[0].style, ButtonStyle::Danger);
    }

    #[tokio::test]
    async fn app_routes_interactions_with_the_injected_clock() {
        let (builder, transport) = builder();
        let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 9, 4, 12, 0, 0).unwrap()));
        let app = builder
            .clock(clock)
            .register::<LeaveOfAbsence>()
            .unwrap()
            .build()
            .unwrap();

        let reply = app
            .handle(&Interaction::FormSubmit {
                submission: FormSubmission::new("loa:submit")
                    .with("reason", "medical")
                    .with("date", "next week"),
                actor: Actor::new(UserId::new(1), "PFC John Smith", "jsmith"),
                message: None,
            })
            .await;

        assert!(reply.text().unwrap().starts_with("✅"));
        let post = &transport.messages_in(ChannelId::new(1)).await[0];
        assert!(post.text.contains("**PFC John Smith**"));
        let listing = app.registry().get("loa").unwrap().list().await;
        assert!(listing.text().unwrap().contains("Wed, 04 Sep 2024 06:00 CST"));
    }

    #[tokio::test]
    async fn rollover_is_skipped_when_its_feature_is_missing() {
        let (builder, _) = builder();
        let app = builder.register::<LeaveOfAbsence>().unwrap().build().unwrap();
        assert!(app.spawn_rollover().is_none());
    }

    #[tokio::test]
    async fn rollover_starts_for_the_configured_feature() {
        let (builder, _) = builder();
        let app = builder.register::<BlingBucks>().unwrap().build().unwrap();
        let handle = app.spawn_rollover().unwrap();
        handle.shutdown_and_join().await;
    }
}
