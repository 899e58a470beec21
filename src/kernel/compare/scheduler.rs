//! 延迟任务调度
//!
//! 每种任务最多一个处于待执行状态。再次 `post` 会合并负载并重新计时
//! （尾沿防抖）；`cancel` 连同负载一起丢弃。时间由调用方传入，
//! 宿主在自己的事件循环里调用 `pop_due` 取出到期任务。

use std::time::{Duration, Instant};

use crate::models::{BufferId, ViewId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Realign,
    Recompute,
    SettleActivation,
    ClosePair,
    RestoreAfterMinimize,
}

impl TaskKind {
    const ALL: [TaskKind; 5] = [
        TaskKind::Realign,
        TaskKind::Recompute,
        TaskKind::SettleActivation,
        TaskKind::ClosePair,
        TaskKind::RestoreAfterMinimize,
    ];

    fn index(self) -> usize {
        match self {
            TaskKind::Realign => 0,
            TaskKind::Recompute => 1,
            TaskKind::SettleActivation => 2,
            TaskKind::ClosePair => 3,
            TaskKind::RestoreAfterMinimize => 4,
        }
    }
}

/// 编辑后的重新比较请求
///
/// 行号都是改动视图中最近一次编辑之后的行号。`[change_line, end_line)`
/// 覆盖这一批编辑触及的所有行，区间之后的行与编辑前一一对应，
/// 只是整体平移了 `lines_added - lines_deleted` 行。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecomputeRequest {
    /// 发生改动的视图
    pub view: ViewId,
    /// 最早的改动行
    pub change_line: usize,
    /// 改动区间的结束行（不含）
    pub end_line: usize,
    pub lines_added: usize,
    pub lines_deleted: usize,
    /// 置位后忽略增量信息，执行完整比较
    pub full_compare: bool,
}

impl RecomputeRequest {
    /// 单次编辑：在 `change_line` 插入或删除若干行，两者都为 0 时表示改写该行
    pub fn edit(view: ViewId, change_line: usize, lines_added: usize, lines_deleted: usize) -> Self {
        let end_line = if lines_added > 0 {
            change_line + lines_added
        } else if lines_deleted > 0 {
            change_line
        } else {
            change_line + 1
        };
        Self {
            view,
            change_line,
            end_line,
            lines_added,
            lines_deleted,
            full_compare: false,
        }
    }

    pub fn full(view: ViewId) -> Self {
        Self {
            view,
            change_line: 0,
            end_line: 0,
            lines_added: 0,
            lines_deleted: 0,
            full_compare: true,
        }
    }

    /// 净增行数
    pub fn delta(&self) -> isize {
        self.lines_added as isize - self.lines_deleted as isize
    }

    /// 编辑前的结束行（不含）
    pub fn pre_edit_end(&self) -> usize {
        (self.end_line as isize - self.delta()).max(self.change_line as isize) as usize
    }

    fn merge(&mut self, newer: RecomputeRequest) {
        if self.full_compare {
            return;
        }
        if newer.full_compare {
            *self = newer;
            return;
        }
        if newer.view != self.view {
            *self = RecomputeRequest::full(newer.view);
            return;
        }

        // 先把已有区间的结束行搬到新编辑之后的坐标
        let at = newer.change_line;
        let mut end = self.end_line;
        if newer.lines_added > 0 {
            if end > at {
                end += newer.lines_added;
            }
        } else if newer.lines_deleted > 0 {
            let removed_end = at + newer.lines_deleted;
            if end >= removed_end {
                end -= newer.lines_deleted;
            } else if end > at {
                end = at;
            }
        }

        self.change_line = self.change_line.min(at);
        self.end_line = end.max(newer.end_line);
        self.lines_added += newer.lines_added;
        self.lines_deleted += newer.lines_deleted;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    Realign,
    Recompute(RecomputeRequest),
    SettleActivation(BufferId),
    /// 按到达顺序排列的已关闭文档
    ClosePair(Vec<BufferId>),
    RestoreAfterMinimize,
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Realign => TaskKind::Realign,
            Task::Recompute(_) => TaskKind::Recompute,
            Task::SettleActivation(_) => TaskKind::SettleActivation,
            Task::ClosePair(_) => TaskKind::ClosePair,
            Task::RestoreAfterMinimize => TaskKind::RestoreAfterMinimize,
        }
    }

    /// 合并同类任务的负载，`newer` 为后到的一次
    fn merge(&mut self, newer: Task) {
        match (self, newer) {
            (Task::Recompute(current), Task::Recompute(newer)) => current.merge(newer),
            (Task::SettleActivation(current), Task::SettleActivation(newer)) => *current = newer,
            (Task::ClosePair(current), Task::ClosePair(newer)) => {
                for buffer in newer {
                    if !current.contains(&buffer) {
                        current.push(buffer);
                    }
                }
            }
            (current, newer) => *current = newer,
        }
    }
}

#[derive(Clone, Debug)]
struct Armed {
    task: Task,
    deadline: Instant,
    seq: u64,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    slots: [Option<Armed>; 5],
    seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 在 `now + delay` 后执行；已待执行时合并负载并重新计时
    pub fn post(&mut self, task: Task, delay: Duration, now: Instant) {
        let kind = task.kind();
        self.seq += 1;
        let seq = self.seq;
        let deadline = now + delay;
        let slot = &mut self.slots[kind.index()];
        match slot {
            Some(armed) => {
                armed.task.merge(task);
                armed.deadline = deadline;
                armed.seq = seq;
            }
            None => {
                *slot = Some(Armed {
                    task,
                    deadline,
                    seq,
                });
            }
        }
        tracing::trace!(?kind, delay_ms = delay.as_millis() as u64, "task posted");
    }

    /// 幂等；负载一并丢弃
    pub fn cancel(&mut self, kind: TaskKind) {
        if self.slots[kind.index()].take().is_some() {
            tracing::trace!(?kind, "task cancelled");
        }
    }

    pub fn cancel_all(&mut self) {
        for kind in TaskKind::ALL {
            self.cancel(kind);
        }
    }

    pub fn is_pending(&self, kind: TaskKind) -> bool {
        self.slots[kind.index()].is_some()
    }

    pub fn pending(&self, kind: TaskKind) -> Option<&Task> {
        self.slots[kind.index()].as_ref().map(|armed| &armed.task)
    }

    pub fn is_idle(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn deadline(&self, kind: TaskKind) -> Option<Instant> {
        self.slots[kind.index()].as_ref().map(|armed| armed.deadline)
    }

    /// 最早的到期时间，供宿主设置定时器
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.iter().flatten().map(|armed| armed.deadline).min()
    }

    /// 取出一个已到期的任务（到期最早者优先）
    pub fn pop_due(&mut self, now: Instant) -> Option<Task> {
        let index = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|armed| (index, armed)))
            .filter(|(_, armed)| armed.deadline <= now)
            .min_by_key(|(_, armed)| (armed.deadline, armed.seq))
            .map(|(index, _)| index)?;
        self.slots[index].take().map(|armed| armed.task)
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/kernel/compare/scheduler.rs"]
mod tests;
