//! 宿主通知

use crate::models::{BufferId, EditAction, ViewId};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ModificationKind {
    /// 删除即将发生（行仍在）
    BeforeDelete,
    Insert,
    Delete,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Modification {
    pub view: ViewId,
    pub buffer: BufferId,
    pub kind: ModificationKind,
    pub action: EditAction,
    /// 变化起始行
    pub start_line: usize,
    /// 变化结束行（闭区间；单行变化时等于 start_line）
    pub end_line: usize,
    /// 净增行数，删除时为负
    pub lines_added: isize,
}

impl Modification {
    pub fn is_multi_line(&self) -> bool {
        self.end_line > self.start_line
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    Painted,
    UpdateUi { view: ViewId },
    BufferActivated(BufferId),
    FileBeforeClose(BufferId),
    FileSaved(BufferId),
    Modified(Modification),
    Zoom,
    Minimized,
    Restored,
    BeforeShutdown,
}
