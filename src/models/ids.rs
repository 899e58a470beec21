//! 标识与基础值类型
//!
//! - `ViewId`: 两个固定视图（主视图 / 副视图）
//! - `BufferId`: 宿主中稳定的文档句柄
//! - `DocSlot`: 视图内的文档槽位（文档在视图间移动时会变化）

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewId {
    Main,
    Sub,
}

impl ViewId {
    pub fn other(self) -> ViewId {
        match self {
            ViewId::Main => ViewId::Sub,
            ViewId::Sub => ViewId::Main,
        }
    }

    pub fn index(self) -> usize {
        match self {
            ViewId::Main => 0,
            ViewId::Sub => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ViewId::Main => "MAIN",
            ViewId::Sub => "SUB",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u64);

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "buf#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocSlot(pub u64);

/// 比较对中的一侧
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Old,
    New,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Old => Side::New,
            Side::New => Side::Old,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Old => "Old",
            Side::New => "New",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VcsKind {
    Svn,
    Git,
}

impl VcsKind {
    pub fn name(self) -> &'static str {
        match self {
            VcsKind::Svn => "SVN",
            VcsKind::Git => "Git",
        }
    }
}

/// 临时文档分类：仅为比较而创建，比较结束后丢弃
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum TempKind {
    #[default]
    None,
    SnapshotOfLastSave,
    SnapshotOfVcsRevision(VcsKind),
}

impl TempKind {
    pub fn is_temp(self) -> bool {
        !matches!(self, TempKind::None)
    }

    /// 标签后缀，如 " ** Last Save"
    pub fn label_suffix(self) -> &'static str {
        match self {
            TempKind::None => "",
            TempKind::SnapshotOfLastSave => " ** Last Save",
            TempKind::SnapshotOfVcsRevision(VcsKind::Svn) => " ** SVN",
            TempKind::SnapshotOfVcsRevision(VcsKind::Git) => " ** Git",
        }
    }
}

/// 引起文本变化的动作来源
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EditAction {
    User,
    Undo,
    Redo,
}

impl EditAction {
    /// 能够撤销该动作所造成删除的动作
    pub fn restoring(self) -> EditAction {
        match self {
            EditAction::Undo => EditAction::Redo,
            EditAction::User | EditAction::Redo => EditAction::Undo,
        }
    }
}

/// 连续行区间 `[start, start + len)`
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct LineRange {
    pub start: usize,
    pub len: usize,
}

impl LineRange {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// 由闭区间 `[first, last]` 构造
    pub fn inclusive(first: usize, last: usize) -> Self {
        let (first, last) = if first <= last {
            (first, last)
        } else {
            (last, first)
        };
        Self {
            start: first,
            len: last - first + 1,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// 最后一行（闭区间），空区间返回 None
    pub fn last(&self) -> Option<usize> {
        if self.len == 0 {
            None
        } else {
            Some(self.start + self.len - 1)
        }
    }

    pub fn contains(&self, line: usize) -> bool {
        line >= self.start && line < self.end()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/models/ids.rs"]
mod tests;
