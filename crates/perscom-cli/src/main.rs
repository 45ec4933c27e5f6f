//! perscom - 申請ボットのコアをインメモリ Transport で動かす
//!
//! ```text
//! perscom [config.json] [--demo]
//! ```
//!
//! 設定ファイルは引数 > `PERSCOM_CONFIG` > 同梱の perscom.example.json の順に探す。

mod telemetry;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use perscom_core::app::{App, AppBuilder};
use perscom_core::config::BotConfig;
use perscom_core::domain::{Actor, ChannelId, FormSubmission, Interaction, UserId};
use perscom_core::impls::InMemoryTransport;

const CONFIG_ENV: &str = "PERSCOM_CONFIG";
const BUNDLED_CONFIG: &str = include_str!("../perscom.example.json");

struct Args {
    config: Option<String>,
    demo: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        config: None,
        demo: false,
    };
    for arg in std::env::args().skip(1) {
        if arg == "--demo" {
            args.demo = true;
        } else if args.config.is_none() {
            args.config = Some(arg);
        }
    }
    args
}

fn load_config(path: Option<String>) -> Result<BotConfig> {
    match path.or_else(|| std::env::var(CONFIG_ENV).ok()) {
        Some(path) => {
            info!(%path, "loading config");
            BotConfig::load(&path).with_context(|| format!("loading {path}"))
        }
        None => {
            info!("no config given; using the bundled example");
            BotConfig::from_json(BUNDLED_CONFIG).context("bundled config")
        }
    }
}

/// Scripted round trip: submit a leave request, approve it, approve again.
async fn run_demo(app: &App, transport: &InMemoryTransport) -> Result<()> {
    let member = Actor::new(UserId::new(1001), "PFC John Smith", "jsmith");
    let officer = Actor::new(UserId::new(1002), "CPT Jane Roe", "captain");
    let approval_channel = app
        .config()
        .feature("loa")
        .map(|settings| ChannelId::new(settings.approval_channel))
        .context("the demo needs the 'loa' feature")?;

    let reply = app
        .handle(&Interaction::FormSubmit {
            submission: FormSubmission::new("loa:submit")
                .with("reason", "Family event")
                .with("date", "Next Sunday"),
            actor: member.clone(),
            message: None,
        })
        .await;
    info!(reply = ?reply, "submitted");

    let post = transport
        .messages_in(approval_channel)
        .await
        .into_iter()
        .find(|m| m.actions.iter().any(|a| a.custom_id.starts_with("loa:approve:")))
        .context("no approval post was made")?;
    let approve = Interaction::Component {
        custom_id: post.actions[0].custom_id.clone(),
        actor: officer,
        message: Some(post.reference),
        selected: Vec::new(),
    };
    info!(reply = ?app.handle(&approve).await, "first approval");
    info!(reply = ?app.handle(&approve).await, "second approval");
    info!(dms = ?transport.direct_messages_to(member.id).await, "requester inbox");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();
    let args = parse_args();
    let config = load_config(args.config)?;

    let transport = Arc::new(InMemoryTransport::new());
    let app = AppBuilder::new(config, transport.clone())
        .register_builtin_features()?
        .build()?;
    info!(features = ?app.registry().registered_keys(), "perscom ready");

    app.post_menu().await.context("posting the request menu")?;
    let rollover = app.spawn_rollover();

    if args.demo {
        run_demo(&app, &transport).await?;
    }

    info!("running; press ctrl-c to stop");
    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;

    info!("shutting down");
    app.publish_all().await;
    if let Some(rollover) = rollover {
        rollover.shutdown_and_join().await;
    }
    Ok(())
}
