//! Store - 申請レコードの保持
//!
//! 機能ごとに 1 つの `RequestStore` を持ち、全操作を単一のロックで直列化する。

mod memory;
mod nickname;

pub use self::memory::RequestStore;
pub use self::nickname::NicknameQuery;

/// What happens to a record once it reaches a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposal {
    /// Keep it until the next rollover or admin clear.
    #[default]
    Retain,
    /// Drop it right after resolution (it is still logged).
    RemoveOnResolve,
}
