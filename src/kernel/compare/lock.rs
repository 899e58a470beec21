//! 通知锁：持有期间宿主通知一律被忽略
//!
//! 代码在主动滚动、激活文档、改写文本之前先取得 guard，
//! 这样由此引发的通知不会再次触发同步或调度。

use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Debug, Default)]
pub struct NotificationLock {
    depth: Rc<Cell<u32>>,
}

impl NotificationLock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_locked(&self) -> bool {
        self.depth.get() > 0
    }

    pub fn depth(&self) -> u32 {
        self.depth.get()
    }

    /// 取得一个作用域 guard，drop 时释放
    pub fn acquire(&self) -> NotificationGuard {
        self.depth.set(self.depth.get() + 1);
        NotificationGuard {
            depth: Rc::clone(&self.depth),
        }
    }
}

#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct NotificationGuard {
    depth: Rc<Cell<u32>>,
}

impl Drop for NotificationGuard {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/compare/lock.rs"]
mod tests;
