//! IdGenerator port - 申請 ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース。同一ミリ秒内でも単調増加する

use std::sync::Mutex;

use ulid::Ulid;

use crate::domain::RequestId;
use crate::ports::Clock;

/// IdGenerator は申請ごとに一意な ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数のハンドラから同時に呼ばれる）
pub trait IdGenerator: Send + Sync {
    /// 新しい申請 ID を生成
    fn generate_request_id(&self) -> RequestId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock の時刻を timestamp 部分に使い、直前に払い出した値以下になる場合は
/// 直前の値を increment します。プロセス内では ID が重複せず、生成順に並びます。
pub struct UlidGenerator<C> {
    clock: C,
    last: Mutex<Option<Ulid>>,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            last: Mutex::new(None),
        }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis().max(0) as u64;
        let candidate = Ulid::from_parts(timestamp_ms, rand::random());

        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = match *last {
            Some(prev) if candidate <= prev => prev.increment().unwrap_or(candidate),
            _ => candidate,
        };
        *last = Some(next);
        next
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_request_id(&self) -> RequestId {
        RequestId::Minted(self.next_ulid())
    }
}
