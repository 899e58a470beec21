//! 比较核心
//!
//! - `ledger`: 删除段台账，撤销/重做时恢复 diff 标记
//! - `registry` / `pair` / `document`: 比较对的建立、定位与拆除
//! - `scheduler`: 可合并、可取消的延迟任务
//! - `align`: 视觉对齐、滚动同步与差异跳转
//! - `session`: 把上述部件接到宿主通知与命令上

pub mod align;
pub mod document;
pub mod error;
pub mod ledger;
pub mod lock;
pub mod pair;
pub mod registry;
pub mod scheduler;
pub mod session;

pub use align::{Jump, ViewLocation};
pub use document::ComparedDocument;
pub use error::{CompareError, Result};
pub use ledger::{DeletedSection, DeletedSectionLedger};
pub use lock::{NotificationGuard, NotificationLock};
pub use pair::{ComparedPair, PairState};
pub use registry::{CompareRegistry, Staging};
pub use scheduler::{RecomputeRequest, Scheduler, Task, TaskKind};
pub use session::{CompareOutcome, CompareSession};
