//! RolloverLoop - 週次の期間切り替え
//!
//! 決まった曜日・時刻になったら対象機能の store とフォーラムログを空にする。
//! - `shutdown_tx` で停止を要求できる
//! - `shutdown_and_join()` でループの終了を待てる
//! - ハンドルを捨ててもループは止まらない（停止できなくなるだけ）
//!
//! 時計が境界を飛び越えていた場合は `retry_delay` だけ待ってから
//! 取りこぼした境界を 1 つずつ処理する。

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc, Weekday};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::RolloverSettings;
use crate::feature::FeatureHandler;
use crate::ports::Clock;

/// Weekly boundary, in UTC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverScheduler {
    pub weekday: Weekday,
    pub at: NaiveTime,
    /// Used when the computed wait is not positive.
    pub retry_delay: StdDuration,
}

impl RolloverScheduler {
    pub fn new(weekday: Weekday, at: NaiveTime) -> Self {
        Self {
            weekday,
            at,
            retry_delay: StdDuration::from_secs(60),
        }
    }

    pub fn from_settings(settings: &RolloverSettings) -> Self {
        let at = NaiveTime::from_hms_opt(settings.hour, settings.minute, 0).unwrap_or(NaiveTime::MIN);
        Self {
            weekday: settings.weekday,
            at,
            retry_delay: settings.retry_delay(),
        }
    }

    /// First boundary strictly after `after`.
    pub fn next_boundary(&self, after: DateTime<Utc>) -> DateTime<Utc> {
        let today = after.date_naive();
        let days_ahead = (7 + i64::from(self.weekday.num_days_from_monday())
            - i64::from(today.weekday().num_days_from_monday()))
            % 7;
        let candidate = (today + Duration::days(days_ahead)).and_time(self.at).and_utc();
        if candidate > after {
            candidate
        } else {
            candidate + Duration::days(7)
        }
    }

    /// Time left until `boundary`; `None` if it is not in the future.
    pub fn wait_until(boundary: DateTime<Utc>, now: DateTime<Utc>) -> Option<StdDuration> {
        (boundary - now).to_std().ok().filter(|wait| !wait.is_zero())
    }

    pub fn spawn(self, target: Arc<dyn FeatureHandler>, clock: Arc<dyn Clock>) -> RolloverHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            rollover_loop(self, target, clock, &mut shutdown_rx).await;
        });
        RolloverHandle { shutdown_tx, join }
    }
}

/// Running rollover loop.
///
/// Dropping the handle detaches the loop: it keeps rolling over for the
/// life of the runtime but can no longer be stopped.
#[must_use = "dropping the handle detaches the rollover loop"]
pub struct RolloverHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl RolloverHandle {
    pub fn request_shutdown(&self) {
        // receiver may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        let _ = self.join.await;
    }
}

async fn rollover_loop(
    schedule: RolloverScheduler,
    target: Arc<dyn FeatureHandler>,
    clock: Arc<dyn Clock>,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    let feature = target.key();
    // Boundary most recently handled; the next one is always a week later.
    let mut last_fired: Option<DateTime<Utc>> = None;
    // False once the handle is gone and no stop can arrive.
    let mut attached = true;

    loop {
        if *shutdown_rx.borrow() {
            break;
        }

        let now = clock.now();
        let boundary = match last_fired {
            Some(fired) => schedule.next_boundary(fired),
            None => schedule.next_boundary(now),
        };
        let pause = match RolloverScheduler::wait_until(boundary, now) {
            Some(wait) => wait,
            None => {
                warn!(
                    feature,
                    %boundary,
                    %now,
                    retry_in = ?schedule.retry_delay,
                    "rollover boundary already passed"
                );
                schedule.retry_delay
            }
        };
        debug!(feature, %boundary, ?pause, "waiting for rollover");

        tokio::select! {
            changed = shutdown_rx.changed(), if attached => {
                if changed.is_err() {
                    debug!(feature, "rollover handle dropped; running detached");
                    attached = false;
                }
                continue;
            }
            _ = tokio::time::sleep(pause) => {}
        }

        let dropped = target.rollover().await;
        last_fired = Some(boundary);
        info!(feature, %boundary, dropped, "weekly rollover done");
    }
}
